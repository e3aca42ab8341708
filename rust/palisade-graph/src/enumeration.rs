use crate::{GraphError, GraphResult};

type ReleaseHook = Box<dyn FnOnce() + Send>;

/// A closeable iterator over results from the store. An [`Enumeration`] may
/// hold resources in the store (see [`crate::MemoryGraph::open_cursors`]);
/// those are released exactly once, when the enumeration is closed, when it
/// is exhausted, or when it is dropped, whichever comes first.
pub struct Enumeration<T> {
    inner: Option<Box<dyn Iterator<Item = T> + Send>>,
    release: Vec<ReleaseHook>,
    closed: bool,
}

impl<T> Enumeration<T>
where
    T: Send + 'static,
{
    /// Wrap any iterator as an [`Enumeration`]
    pub fn new<I>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'static,
    {
        Self {
            inner: Some(Box::new(items.into_iter())),
            release: Vec::new(),
            closed: false,
        }
    }

    /// An enumeration with no elements
    pub fn empty() -> Self {
        Self::new(std::iter::empty())
    }

    /// Register a hook that is invoked once when this enumeration is closed
    pub fn on_close<F>(mut self, hook: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.release.push(Box::new(hook));
        self
    }

    /// Transform every element, preserving the close behavior of this
    /// enumeration
    pub fn map_items<U, F>(mut self, f: F) -> Enumeration<U>
    where
        U: Send + 'static,
        F: FnMut(T) -> U + Send + 'static,
    {
        let inner = self.inner.take();
        let release = std::mem::take(&mut self.release);
        self.closed = true;

        Enumeration {
            inner: Some(Box::new(inner.into_iter().flatten().map(f))),
            release,
            closed: false,
        }
    }

    /// Keep only the elements that satisfy the predicate, preserving the
    /// close behavior of this enumeration
    pub fn filter_items<F>(mut self, f: F) -> Enumeration<T>
    where
        F: FnMut(&T) -> bool + Send + 'static,
    {
        let inner = self.inner.take();
        let release = std::mem::take(&mut self.release);
        self.closed = true;

        Enumeration {
            inner: Some(Box::new(inner.into_iter().flatten().filter(f))),
            release,
            closed: false,
        }
    }
}

impl<T> Enumeration<T> {
    /// Release the resources held by this enumeration. Subsequent calls have
    /// no effect, and the enumeration yields no further elements.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        // Dropping the inner iterator closes any enumeration it wraps
        self.inner = None;
        for hook in self.release.drain(..) {
            hook();
        }
    }

    /// True once the enumeration has been closed or exhausted
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// The next element, or [`GraphError::EmptyEnumeration`] if there is none
    pub fn next_required(&mut self) -> GraphResult<T> {
        self.next().ok_or(GraphError::EmptyEnumeration)
    }
}

impl<T> Iterator for Enumeration<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.closed {
            return None;
        }
        match self.inner.as_mut().and_then(|inner| inner.next()) {
            Some(item) => Some(item),
            None => {
                self.close();
                None
            }
        }
    }
}

impl<T> Drop for Enumeration<T> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;

    fn counted(items: Vec<u32>) -> (Enumeration<u32>, Arc<AtomicUsize>) {
        let released = Arc::new(AtomicUsize::new(0));
        let counter = released.clone();
        let enumeration = Enumeration::new(items).on_close(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (enumeration, released)
    }

    #[test]
    fn it_releases_once_when_closed_repeatedly() {
        let (mut enumeration, released) = counted(vec![1, 2, 3]);
        enumeration.close();
        enumeration.close();
        drop(enumeration);
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn it_releases_on_exhaustion() {
        let (enumeration, released) = counted(vec![1, 2]);
        let mut enumeration = enumeration.map_items(|n| n * 2);
        assert_eq!(enumeration.next(), Some(2));
        assert_eq!(released.load(Ordering::SeqCst), 0);
        assert_eq!(enumeration.next(), Some(4));
        assert_eq!(enumeration.next(), None);
        assert_eq!(released.load(Ordering::SeqCst), 1);
        assert!(enumeration.is_closed());
    }

    #[test]
    fn it_releases_on_drop() {
        let (enumeration, released) = counted(vec![1, 2]);
        drop(enumeration.filter_items(|n| *n > 1));
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn it_yields_nothing_after_close() {
        let (mut enumeration, _) = counted(vec![1, 2]);
        enumeration.close();
        assert_eq!(enumeration.next(), None);
        assert_eq!(enumeration.next_required(), Err(GraphError::EmptyEnumeration));
    }
}
