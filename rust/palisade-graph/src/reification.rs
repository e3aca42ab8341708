use crate::{GraphResult, Node, Resource, Triple, vocab};

/// A resource that describes a [`Triple`] through `rdf:subject`,
/// `rdf:predicate` and `rdf:object` statements. Reifying a triple does not
/// assert it.
#[derive(Clone, PartialEq)]
pub struct ReifiedStatement {
    resource: Resource,
    statement: Triple,
}

impl ReifiedStatement {
    pub(crate) fn new(resource: Resource, statement: Triple) -> Self {
        Self {
            resource,
            statement,
        }
    }

    /// The triples that reify `statement` under `node`
    pub fn reification_triples(node: &Node, statement: &Triple) -> [Triple; 4] {
        [
            Triple::new(node.clone(), vocab::rdf_type(), vocab::statement()),
            Triple::new(node.clone(), vocab::subject(), statement.subject.clone()),
            Triple::new(node.clone(), vocab::predicate(), statement.predicate.clone()),
            Triple::new(node.clone(), vocab::object(), statement.object.clone()),
        ]
    }

    /// The reifying resource
    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    /// The node of the reifying resource
    pub fn node(&self) -> &Node {
        self.resource.node()
    }

    /// The triple being described
    pub fn statement(&self) -> &Triple {
        &self.statement
    }

    /// The triples that make up this reification
    pub fn triples(&self) -> [Triple; 4] {
        Self::reification_triples(self.node(), &self.statement)
    }

    /// Remove this reification. The described triple is left untouched.
    pub fn remove(&self) -> GraphResult<()> {
        self.resource.model().remove_statements(self.triples())
    }
}

impl std::fmt::Debug for ReifiedStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReifiedStatement")
            .field("node", self.node())
            .field("statement", &self.statement)
            .finish()
    }
}
