use std::{collections::BTreeSet, sync::Arc};

use crate::{
    ChangeListener, Container, ContainerKind, Enumeration, Graph, GraphError, GraphResult, List,
    ListenerId, MemoryGraph, Node, PrefixMapping, ReifiedStatement, Resource, Statement, Triple,
    vocab,
};

/// A [`Model`] is the typed object layer over a [`Graph`]: it hands out
/// [`Resource`]s, [`Statement`]s, containers and lists that all read and
/// write through the same underlying graph.
///
/// Cloning a [`Model`] is cheap; every clone shares the graph. Two models are
/// equal when they share the same graph.
#[derive(Clone)]
pub struct Model {
    graph: Arc<dyn Graph>,
}

impl Model {
    /// Wrap an existing graph
    pub fn new(graph: Arc<dyn Graph>) -> Self {
        Self { graph }
    }

    /// A model over a fresh, empty [`MemoryGraph`]
    pub fn memory() -> Self {
        Self::new(Arc::new(MemoryGraph::default()))
    }

    /// The graph this model reads and writes
    pub fn graph(&self) -> &Arc<dyn Graph> {
        &self.graph
    }

    /// Add a single triple
    pub fn add(&self, triple: Triple) -> GraphResult<()> {
        self.graph.add(triple)
    }

    /// Add many triples in one change
    pub fn add_all<I>(&self, triples: I) -> GraphResult<()>
    where
        I: IntoIterator<Item = Triple>,
    {
        self.graph.add_all(triples.into_iter().collect())
    }

    /// Add every triple of another model
    pub fn add_model(&self, other: &Model) -> GraphResult<()> {
        self.graph.add_all(other.triples())
    }

    /// Remove a single triple
    pub fn remove(&self, triple: &Triple) -> GraphResult<()> {
        self.graph.delete(triple)
    }

    /// Remove many triples in one change
    pub fn remove_statements<I>(&self, triples: I) -> GraphResult<()>
    where
        I: IntoIterator<Item = Triple>,
    {
        self.graph.delete_all(triples.into_iter().collect())
    }

    /// Remove every triple matching the pattern, returning how many were
    /// removed
    pub fn remove_all(&self, pattern: &Triple) -> GraphResult<usize> {
        let matching: Vec<Triple> = self.graph.find(pattern).collect();
        let count = matching.len();
        self.graph.delete_all(matching)?;
        Ok(count)
    }

    /// True if any triple matches the pattern
    pub fn contains(&self, pattern: &Triple) -> bool {
        self.graph.contains(pattern)
    }

    /// True if every triple of `other` is in this model
    pub fn contains_all(&self, other: &Model) -> bool {
        other.find(&Triple::ANY).all(|triple| self.contains(&triple))
    }

    /// True if at least one triple of `other` is in this model
    pub fn contains_any(&self, other: &Model) -> bool {
        other.find(&Triple::ANY).any(|triple| self.contains(&triple))
    }

    /// Enumerate the raw triples matching the pattern
    pub fn find(&self, pattern: &Triple) -> Enumeration<Triple> {
        self.graph.find(pattern)
    }

    /// Every triple in the model
    pub fn triples(&self) -> Vec<Triple> {
        self.graph.find(&Triple::ANY).collect()
    }

    /// Enumerate the statements matching the pattern
    pub fn list_statements(&self, pattern: &Triple) -> Enumeration<Statement> {
        let model = self.clone();
        self.graph
            .find(pattern)
            .map_items(move |triple| Statement::new(triple, model.clone()))
    }

    /// Enumerate every distinct subject in the model
    pub fn list_subjects(&self) -> Enumeration<Resource> {
        self.list_subjects_with_property(&Node::Any, None)
    }

    /// Enumerate the distinct subjects that have the given property (and,
    /// if provided, the given value)
    pub fn list_subjects_with_property(
        &self,
        property: &Node,
        value: Option<&Node>,
    ) -> Enumeration<Resource> {
        let pattern = Triple::new(
            Node::Any,
            property.clone(),
            value.cloned().unwrap_or(Node::Any),
        );
        let model = self.clone();
        let mut seen = BTreeSet::new();
        self.graph
            .find(&pattern)
            .filter_items(move |triple| seen.insert(triple.subject.clone()))
            .map_items(move |triple| Resource::new(triple.subject, model.clone()))
    }

    /// Enumerate every distinct object in the model
    pub fn list_objects(&self) -> Enumeration<Node> {
        self.list_objects_of_property(None, &Node::Any)
    }

    /// Enumerate the distinct values of a property, optionally restricted
    /// to a single subject
    pub fn list_objects_of_property(
        &self,
        subject: Option<&Node>,
        property: &Node,
    ) -> Enumeration<Node> {
        let pattern = Triple::new(
            subject.cloned().unwrap_or(Node::Any),
            property.clone(),
            Node::Any,
        );
        let mut seen = BTreeSet::new();
        self.graph
            .find(&pattern)
            .filter_items(move |triple| seen.insert(triple.object.clone()))
            .map_items(|triple| triple.object)
    }

    /// Number of triples in the model
    pub fn size(&self) -> usize {
        self.graph.size()
    }

    /// True when the model holds no triples
    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    /// A new in-memory model holding the triples of both models
    pub fn union(&self, other: &Model) -> GraphResult<Model> {
        let result = Model::memory();
        result.add_all(self.triples())?;
        result.add_all(other.triples())?;
        Ok(result)
    }

    /// A new in-memory model holding the triples found in both models
    pub fn intersection(&self, other: &Model) -> GraphResult<Model> {
        let result = Model::memory();
        result.add_all(
            self.triples()
                .into_iter()
                .filter(|triple| other.contains(triple)),
        )?;
        Ok(result)
    }

    /// A new in-memory model holding the triples of this model that are not
    /// in `other`
    pub fn difference(&self, other: &Model) -> GraphResult<Model> {
        let result = Model::memory();
        result.add_all(
            self.triples()
                .into_iter()
                .filter(|triple| !other.contains(triple)),
        )?;
        Ok(result)
    }

    /// Begin a transaction on the underlying graph
    pub fn begin(&self) -> GraphResult<()> {
        self.graph.begin()
    }

    /// Commit the current transaction
    pub fn commit(&self) -> GraphResult<()> {
        self.graph.commit()
    }

    /// Abort the current transaction
    pub fn abort(&self) -> GraphResult<()> {
        self.graph.abort()
    }

    /// True while a transaction is in progress
    pub fn in_transaction(&self) -> bool {
        self.graph.in_transaction()
    }

    /// Run `work` inside a transaction, committing if it succeeds and
    /// aborting if it fails
    pub fn execute_in_transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&Model) -> Result<T, E>,
        E: From<GraphError>,
    {
        self.begin()?;
        match work(self) {
            Ok(value) => {
                self.commit()?;
                Ok(value)
            }
            Err(error) => {
                self.abort()?;
                Err(error)
            }
        }
    }

    /// Register a change listener
    pub fn register(&self, listener: Arc<dyn ChangeListener>) -> ListenerId {
        self.graph.register(listener)
    }

    /// Unregister a change listener
    pub fn unregister(&self, id: ListenerId) -> bool {
        self.graph.unregister(id)
    }

    /// Deliver an application-defined event to every listener
    pub fn notify_event(&self, event: impl Into<String>) {
        self.graph.notify(crate::Change::Event(event.into()));
    }

    /// The prefix mapping of the underlying graph
    pub fn prefixes(&self) -> &PrefixMapping {
        self.graph.prefixes()
    }

    /// A resource handle for an existing node
    pub fn resource(&self, node: Node) -> GraphResult<Resource> {
        if !node.is_resource() {
            return Err(GraphError::NotAResource(node));
        }
        Ok(Resource::new(node, self.clone()))
    }

    /// A resource handle for a URI. No triples are added.
    pub fn create_resource(&self, uri: &str) -> Resource {
        Resource::new(Node::uri(uri), self.clone())
    }

    /// A resource handle for a fresh blank node. No triples are added.
    pub fn create_blank(&self) -> Resource {
        Resource::new(Node::blank(), self.clone())
    }

    /// Create a resource (blank if `uri` is `None`) and assert its type
    pub fn create_typed_resource(&self, uri: Option<&str>, rdf_type: &Node) -> GraphResult<Resource> {
        let resource = match uri {
            Some(uri) => self.create_resource(uri),
            None => self.create_blank(),
        };
        self.add(resource.type_triple(rdf_type))?;
        Ok(resource)
    }

    /// A statement handle for a triple. The triple is not added.
    pub fn statement(&self, triple: Triple) -> Statement {
        Statement::new(triple, self.clone())
    }

    /// Create a new container of the given kind (blank if `uri` is `None`)
    pub fn create_container(&self, kind: ContainerKind, uri: Option<&str>) -> GraphResult<Container> {
        let resource = self.create_typed_resource(uri, &kind.type_node())?;
        Ok(Container::new(resource, kind))
    }

    /// View `node` as a container of the given kind, asserting its type if
    /// it is not already present
    pub fn get_container(&self, kind: ContainerKind, node: &Node) -> GraphResult<Container> {
        let resource = self.resource(node.clone())?;
        let type_triple = resource.type_triple(&kind.type_node());
        if !self.contains(&type_triple) {
            self.add(type_triple)?;
        }
        Ok(Container::new(resource, kind))
    }

    /// Create a new list holding `values` in order. An empty input yields
    /// the shared empty list.
    pub fn create_list<I>(&self, values: I) -> GraphResult<List>
    where
        I: IntoIterator<Item = Node>,
    {
        let values: Vec<Node> = values.into_iter().collect();
        let cells: Vec<Node> = values.iter().map(|_| Node::blank()).collect();
        let mut triples = Vec::with_capacity(values.len() * 3);

        for (index, (cell, value)) in cells.iter().zip(values).enumerate() {
            let rest = cells.get(index + 1).cloned().unwrap_or_else(vocab::nil);
            triples.extend(List::cell_triples(cell, value, rest));
        }
        self.add_all(triples)?;

        Ok(List::new(
            cells.first().cloned().unwrap_or_else(vocab::nil),
            self.clone(),
        ))
    }

    /// View `node` as a list, asserting the list type on its head cell if
    /// it is not already present
    pub fn get_list(&self, node: &Node) -> GraphResult<List> {
        if *node != vocab::nil() {
            let type_triple = Triple::new(node.clone(), vocab::rdf_type(), vocab::list());
            if !self.contains(&type_triple) {
                self.add(type_triple)?;
            }
        }
        Ok(List::new(node.clone(), self.clone()))
    }

    /// View `node` as a list without writing anything
    pub fn list(&self, node: Node) -> List {
        List::new(node, self.clone())
    }

    /// The empty list
    pub fn nil(&self) -> List {
        List::new(vocab::nil(), self.clone())
    }

    /// Reify `triple` under `uri` (or a fresh blank node). The reified
    /// triple itself is not added.
    pub fn create_reified_statement(
        &self,
        uri: Option<&str>,
        triple: &Triple,
    ) -> GraphResult<ReifiedStatement> {
        let node = uri.map(Node::uri).unwrap_or_else(Node::blank);
        self.add_all(ReifiedStatement::reification_triples(&node, triple))?;
        Ok(ReifiedStatement::new(
            Resource::new(node, self.clone()),
            triple.clone(),
        ))
    }

    /// Interpret `node` as a reification, if it is one
    pub fn reified_statement(&self, node: &Node) -> Option<ReifiedStatement> {
        let value = |property: Node| {
            let mut values = self.find(&Triple::new(node.clone(), property, Node::Any));
            values.next().map(|triple| triple.object)
        };

        let subject = value(vocab::subject())?;
        let predicate = value(vocab::predicate())?;
        let object = value(vocab::object())?;

        Some(ReifiedStatement::new(
            Resource::new(node.clone(), self.clone()),
            Triple::new(subject, predicate, object),
        ))
    }

    /// Every reification in the model, optionally restricted to those of a
    /// single triple
    pub fn list_reified_statements(&self, triple: Option<&Triple>) -> Vec<ReifiedStatement> {
        let pattern = Triple::new(Node::Any, vocab::rdf_type(), vocab::statement());
        self.find(&pattern)
            .filter_map(|candidate| self.reified_statement(&candidate.subject))
            .filter(|reified| triple.is_none_or(|triple| reified.statement() == triple))
            .collect()
    }

    /// True if `triple` has at least one reification
    pub fn is_reified(&self, triple: &Triple) -> bool {
        !self.list_reified_statements(Some(triple)).is_empty()
    }

    /// A reification of `triple`, creating one if none exists
    pub fn get_any_reified_statement(&self, triple: &Triple) -> GraphResult<ReifiedStatement> {
        match self.list_reified_statements(Some(triple)).into_iter().next() {
            Some(reified) => Ok(reified),
            None => self.create_reified_statement(None, triple),
        }
    }

    /// Remove every reification of `triple`
    pub fn remove_all_reifications(&self, triple: &Triple) -> GraphResult<()> {
        let triples: Vec<Triple> = self
            .list_reified_statements(Some(triple))
            .iter()
            .flat_map(|reified| reified.triples())
            .collect();
        self.remove_statements(triples)
    }
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.graph), Arc::as_ptr(&other.graph))
    }
}

impl Eq for Model {}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("size", &self.graph.size())
            .finish()
    }
}
