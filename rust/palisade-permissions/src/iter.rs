use std::sync::Arc;

use palisade_graph::{Enumeration, GraphError, GraphResult, Triple};

use crate::{Actions, SecurityContext};

type Permit<T> = Box<dyn FnMut(&T) -> bool + Send>;

/// An iterator that yields only the elements whose backing statements the
/// principal is permitted to see.
///
/// Elements are checked as they are reached, against the oracle's answers
/// at that moment. Asking [`SecuredIter::has_next`] any number of times
/// without consuming an element never skips or duplicates one. Closing the
/// iterator (explicitly, by exhausting it, or by dropping it) closes the
/// enumeration it wraps.
pub struct SecuredIter<T> {
    base: Enumeration<T>,
    permit: Permit<T>,
    actions: Actions,
    buffered: Option<T>,
    closed: bool,
}

impl<T> SecuredIter<T>
where
    T: Send + 'static,
{
    /// Yield the elements of `base` that satisfy `permit`
    pub fn new<F>(base: Enumeration<T>, actions: Actions, permit: F) -> Self
    where
        F: FnMut(&T) -> bool + Send + 'static,
    {
        Self {
            base,
            permit: Box::new(permit),
            actions,
            buffered: None,
            closed: false,
        }
    }

    /// Yield the elements of `base` whose statement (as extracted by
    /// `triple_of`) permits every one of `actions`. When the oracle permits
    /// `actions` on [`Triple::ANY`] no per-element checks are made.
    pub fn statements<F>(
        base: Enumeration<T>,
        context: Arc<SecurityContext>,
        actions: Actions,
        triple_of: F,
    ) -> Self
    where
        F: Fn(&T) -> &Triple + Send + 'static,
    {
        if context.permits_all(actions, &Triple::ANY) {
            return Self::new(base, actions, |_| true);
        }
        Self::new(base, actions, move |item| {
            context.permits_all(actions, triple_of(item))
        })
    }

    /// An iterator with no elements
    pub fn empty(actions: Actions) -> Self {
        Self::new(Enumeration::empty(), actions, |_| true)
    }

    /// Transform every permitted element. The checks are made before the
    /// transformation.
    pub fn map_items<U, F>(self, f: F) -> SecuredIter<U>
    where
        U: Send + 'static,
        F: FnMut(T) -> U + Send + 'static,
    {
        let actions = self.actions;
        SecuredIter::new(Enumeration::new(self).map_items(f), actions, |_| true)
    }
}

impl<T> SecuredIter<T> {
    /// The actions every yielded element was required to permit
    pub fn actions(&self) -> Actions {
        self.actions
    }

    /// The next permitted element, without consuming it
    pub fn peek(&mut self) -> Option<&T> {
        if self.buffered.is_none() && !self.closed {
            for candidate in self.base.by_ref() {
                if (self.permit)(&candidate) {
                    self.buffered = Some(candidate);
                    break;
                }
            }
            if self.buffered.is_none() {
                self.close();
            }
        }
        self.buffered.as_ref()
    }

    /// True if another permitted element remains
    pub fn has_next(&mut self) -> bool {
        self.peek().is_some()
    }

    /// The next permitted element, or [`GraphError::EmptyEnumeration`]
    pub fn next_required(&mut self) -> GraphResult<T> {
        self.next().ok_or(GraphError::EmptyEnumeration)
    }

    /// Release the underlying enumeration. Subsequent calls have no effect.
    pub fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.buffered = None;
            self.base.close();
        }
    }

    /// True once the iterator has been closed or exhausted
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl<T> Iterator for SecuredIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.peek();
        self.buffered.take()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use palisade_graph::Node;

    use super::*;
    use crate::{
        Action, GraphId, Principal,
        helpers::{FnOracle, ex},
    };

    fn context(readable: &'static [&'static str]) -> Arc<SecurityContext> {
        Arc::new(SecurityContext::new(
            Principal::new("alice"),
            Arc::new(FnOracle::new(move |_, action, triple| {
                action == Action::Read
                    && triple.is_none_or(|triple| {
                        readable.iter().any(|name| triple.object == Node::literal(*name))
                    })
            })),
            GraphId::new("http://example.com/graph"),
        ))
    }

    fn named(names: &[&str]) -> Vec<Triple> {
        names
            .iter()
            .map(|name| Triple::new(ex("s"), ex("name"), Node::literal(*name)))
            .collect()
    }

    #[test]
    fn it_yields_only_permitted_elements() {
        let iter = SecuredIter::statements(
            Enumeration::new(named(&["a", "b", "c"])),
            context(&["a", "c"]),
            Actions::READ,
            |triple| triple,
        );
        assert_eq!(iter.collect::<Vec<_>>(), named(&["a", "c"]));
    }

    #[test]
    fn it_is_idempotent_before_consumption() {
        let mut iter = SecuredIter::statements(
            Enumeration::new(named(&["a", "b"])),
            context(&["b"]),
            Actions::READ,
            |triple| triple,
        );
        assert!(iter.has_next());
        assert!(iter.has_next());
        assert_eq!(iter.next(), named(&["b"]).pop());
        assert!(!iter.has_next());
        assert!(iter.is_closed());
        assert_eq!(iter.next_required(), Err(GraphError::EmptyEnumeration));
    }

    #[test]
    fn closing_releases_the_base_enumeration() {
        let released = Arc::new(AtomicUsize::new(0));
        let counter = released.clone();
        let base = Enumeration::new(named(&["a", "b"])).on_close(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let mut iter = SecuredIter::statements(base, context(&["a", "b"]), Actions::READ, |t| t)
            .map_items(|triple| triple.object);
        assert!(iter.has_next());
        iter.close();
        iter.close();
        assert_eq!(released.load(Ordering::SeqCst), 1);
        assert_eq!(iter.next(), None);
    }
}
