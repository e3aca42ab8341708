use std::sync::Arc;

use crate::{Enumeration, GraphResult, PrefixMapping, Triple};

/// A notification delivered to a [`ChangeListener`]
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    /// Triples that were added to the graph
    Added(Vec<Triple>),
    /// Triples that were removed from the graph
    Removed(Vec<Triple>),
    /// An application-defined event with no triple payload
    Event(String),
}

/// Receives notification of changes to a [`Graph`]
pub trait ChangeListener: Send + Sync {
    /// Called after a change has been applied
    fn on_change(&self, change: &Change);
}

impl<F> ChangeListener for F
where
    F: Fn(&Change) + Send + Sync,
{
    fn on_change(&self, change: &Change) {
        self(change)
    }
}

/// A handle for a registered [`ChangeListener`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(pub(crate) u64);

/// A mutable, transactional set of [`Triple`]s. Implementors must be safe
/// to share between threads; all mutation happens through `&self`.
pub trait Graph: Send + Sync {
    /// Enumerate every triple that matches the pattern
    fn find(&self, pattern: &Triple) -> Enumeration<Triple>;

    /// Add triples to the graph. Triples that are already present are
    /// ignored. A single [`Change::Added`] carrying the newly added triples
    /// is delivered to listeners.
    fn add_all(&self, triples: Vec<Triple>) -> GraphResult<()>;

    /// Remove triples from the graph. Triples that are absent are ignored. A
    /// single [`Change::Removed`] carrying the removed triples is delivered
    /// to listeners.
    fn delete_all(&self, triples: Vec<Triple>) -> GraphResult<()>;

    /// Number of triples in the graph
    fn size(&self) -> usize;

    /// Begin a transaction. Transactions do not nest.
    fn begin(&self) -> GraphResult<()>;

    /// Make the changes since [`Graph::begin`] permanent
    fn commit(&self) -> GraphResult<()>;

    /// Discard the changes since [`Graph::begin`]
    fn abort(&self) -> GraphResult<()>;

    /// True between [`Graph::begin`] and [`Graph::commit`] or [`Graph::abort`]
    fn in_transaction(&self) -> bool;

    /// Register a listener for changes to this graph
    fn register(&self, listener: Arc<dyn ChangeListener>) -> ListenerId;

    /// Remove a previously registered listener. Returns false if the handle
    /// was unknown.
    fn unregister(&self, id: ListenerId) -> bool;

    /// Deliver a change to every registered listener
    fn notify(&self, change: Change);

    /// The prefix mapping associated with this graph
    fn prefixes(&self) -> &PrefixMapping;

    /// Add a single triple
    fn add(&self, triple: Triple) -> GraphResult<()> {
        self.add_all(vec![triple])
    }

    /// Remove a single triple
    fn delete(&self, triple: &Triple) -> GraphResult<()> {
        self.delete_all(vec![triple.clone()])
    }

    /// True if any triple matches the pattern
    fn contains(&self, pattern: &Triple) -> bool {
        let mut found = self.find(pattern);
        let exists = found.next().is_some();
        found.close();
        exists
    }

    /// True when the graph holds no triples
    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Remove every triple
    fn clear(&self) -> GraphResult<()> {
        let everything = self.find(&Triple::ANY).collect();
        self.delete_all(everything)
    }
}
