use std::{
    collections::BTreeSet,
    sync::{
        Arc,
        atomic::{AtomicU64, AtomicUsize, Ordering},
    },
};

use parking_lot::RwLock;

use crate::{
    Change, ChangeListener, Enumeration, Graph, GraphError, GraphResult, ListenerId, Node,
    PrefixMapping, Triple,
};

/// Index key ordered by predicate, then object, then subject
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct PosKey(Node, Node, Node);

impl From<&Triple> for PosKey {
    fn from(triple: &Triple) -> Self {
        PosKey(
            triple.predicate.clone(),
            triple.object.clone(),
            triple.subject.clone(),
        )
    }
}

impl From<PosKey> for Triple {
    fn from(key: PosKey) -> Self {
        Triple::new(key.2, key.0, key.1)
    }
}

#[derive(Debug, Default, Clone)]
struct Indexes {
    spo: BTreeSet<Triple>,
    pos: BTreeSet<PosKey>,
}

impl Indexes {
    fn insert(&mut self, triple: Triple) -> bool {
        if self.spo.contains(&triple) {
            return false;
        }
        self.pos.insert(PosKey::from(&triple));
        self.spo.insert(triple);
        true
    }

    fn remove(&mut self, triple: &Triple) -> bool {
        if !self.spo.remove(triple) {
            return false;
        }
        self.pos.remove(&PosKey::from(triple));
        true
    }

    fn matching(&self, pattern: &Triple) -> Vec<Triple> {
        if !pattern.subject.is_any() {
            let start = Triple::new(pattern.subject.clone(), Node::Any, Node::Any);
            self.spo
                .range(start..)
                .take_while(|triple| triple.subject == pattern.subject)
                .filter(|triple| triple.matches(pattern))
                .cloned()
                .collect()
        } else if !pattern.predicate.is_any() {
            let start = PosKey(pattern.predicate.clone(), Node::Any, Node::Any);
            self.pos
                .range(start..)
                .take_while(|key| key.0 == pattern.predicate)
                .map(|key| Triple::from(key.clone()))
                .filter(|triple| triple.matches(pattern))
                .collect()
        } else {
            self.spo
                .iter()
                .filter(|triple| triple.matches(pattern))
                .cloned()
                .collect()
        }
    }
}

#[derive(Default)]
struct Store {
    indexes: Indexes,
    snapshot: Option<Indexes>,
}

/// A [`Graph`] whose triples are held in memory, indexed by subject and by
/// predicate. Transactions are implemented by snapshotting the indexes on
/// [`Graph::begin`] and restoring them on [`Graph::abort`].
#[derive(Default)]
pub struct MemoryGraph {
    store: RwLock<Store>,
    listeners: RwLock<Vec<(ListenerId, Arc<dyn ChangeListener>)>>,
    next_listener: AtomicU64,
    cursors: Arc<AtomicUsize>,
    prefixes: PrefixMapping,
}

impl MemoryGraph {
    /// The number of enumerations produced by [`Graph::find`] that have not
    /// yet been closed
    pub fn open_cursors(&self) -> usize {
        self.cursors.load(Ordering::SeqCst)
    }
}

impl Graph for MemoryGraph {
    fn find(&self, pattern: &Triple) -> Enumeration<Triple> {
        let matches = self.store.read().indexes.matching(pattern);
        let cursors = self.cursors.clone();

        cursors.fetch_add(1, Ordering::SeqCst);
        Enumeration::new(matches).on_close(move || {
            cursors.fetch_sub(1, Ordering::SeqCst);
        })
    }

    fn add_all(&self, triples: Vec<Triple>) -> GraphResult<()> {
        let added: Vec<Triple> = {
            let mut store = self.store.write();
            triples
                .into_iter()
                .filter(|triple| store.indexes.insert(triple.clone()))
                .collect()
        };

        if !added.is_empty() {
            tracing::trace!(count = added.len(), "Added triples");
            self.notify(Change::Added(added));
        }
        Ok(())
    }

    fn delete_all(&self, triples: Vec<Triple>) -> GraphResult<()> {
        let removed: Vec<Triple> = {
            let mut store = self.store.write();
            triples
                .into_iter()
                .filter(|triple| store.indexes.remove(triple))
                .collect()
        };

        if !removed.is_empty() {
            tracing::trace!(count = removed.len(), "Removed triples");
            self.notify(Change::Removed(removed));
        }
        Ok(())
    }

    fn contains(&self, pattern: &Triple) -> bool {
        let store = self.store.read();
        if pattern.is_concrete() {
            store.indexes.spo.contains(pattern)
        } else {
            !store.indexes.matching(pattern).is_empty()
        }
    }

    fn size(&self) -> usize {
        self.store.read().indexes.spo.len()
    }

    fn begin(&self) -> GraphResult<()> {
        let mut store = self.store.write();
        if store.snapshot.is_some() {
            return Err(GraphError::Transaction(
                "A transaction is already in progress".into(),
            ));
        }
        store.snapshot = Some(store.indexes.clone());
        Ok(())
    }

    fn commit(&self) -> GraphResult<()> {
        let mut store = self.store.write();
        match store.snapshot.take() {
            Some(_) => Ok(()),
            None => Err(GraphError::Transaction(
                "Cannot commit outside of a transaction".into(),
            )),
        }
    }

    fn abort(&self) -> GraphResult<()> {
        let mut store = self.store.write();
        match store.snapshot.take() {
            Some(snapshot) => {
                store.indexes = snapshot;
                Ok(())
            }
            None => Err(GraphError::Transaction(
                "Cannot abort outside of a transaction".into(),
            )),
        }
    }

    fn in_transaction(&self) -> bool {
        self.store.read().snapshot.is_some()
    }

    fn register(&self, listener: Arc<dyn ChangeListener>) -> ListenerId {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::SeqCst));
        self.listeners.write().push((id, listener));
        id
    }

    fn unregister(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(candidate, _)| *candidate != id);
        listeners.len() != before
    }

    fn notify(&self, change: Change) {
        // Listeners may call back into the graph, so no lock is held while
        // they run
        let listeners: Vec<Arc<dyn ChangeListener>> = self
            .listeners
            .read()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();

        for listener in listeners {
            listener.on_change(&change);
        }
    }

    fn prefixes(&self) -> &PrefixMapping {
        &self.prefixes
    }
}
