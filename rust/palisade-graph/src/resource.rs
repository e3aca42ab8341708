use crate::{
    Container, ContainerKind, Enumeration, GraphError, GraphResult, List, Model, Node, Statement,
    Triple, vocab,
};

/// A URI or blank node, bound to the [`Model`] it was obtained from
#[derive(Clone, PartialEq)]
pub struct Resource {
    node: Node,
    model: Model,
}

impl Resource {
    /// A handle for `node` in `model`. Prefer [`Model::resource`], which
    /// rejects literals.
    pub fn new(node: Node, model: Model) -> Self {
        Self { node, model }
    }

    /// The node this resource stands for
    pub fn node(&self) -> &Node {
        &self.node
    }

    /// The model this resource reads and writes
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// True for blank nodes
    pub fn is_anon(&self) -> bool {
        self.node.is_blank()
    }

    /// The URI of this resource, unless it is anonymous
    pub fn uri(&self) -> Option<&str> {
        self.node.as_uri()
    }

    /// The part of the URI after the last `#` or `/`
    pub fn local_name(&self) -> Option<&str> {
        let uri = self.uri()?;
        let split = uri.rfind(['#', '/']).map(|index| index + 1).unwrap_or(0);
        Some(&uri[split..])
    }

    /// The part of the URI up to and including the last `#` or `/`
    pub fn namespace(&self) -> Option<&str> {
        let uri = self.uri()?;
        let split = uri.rfind(['#', '/']).map(|index| index + 1).unwrap_or(0);
        Some(&uri[..split])
    }

    /// The pattern for this resource's statements with the given property
    /// (or any property)
    pub fn property_pattern(&self, property: Option<&Node>) -> Triple {
        Triple::new(
            self.node.clone(),
            property.cloned().unwrap_or(Node::Any),
            Node::Any,
        )
    }

    pub(crate) fn type_triple(&self, rdf_type: &Node) -> Triple {
        Triple::new(self.node.clone(), vocab::rdf_type(), rdf_type.clone())
    }

    /// Assert a property value
    pub fn add_property(&self, property: &Node, value: impl Into<Node>) -> GraphResult<()> {
        self.model.add(Triple::new(
            self.node.clone(),
            property.clone(),
            value.into(),
        ))
    }

    /// Some statement with the given property, if there is one
    pub fn get_property(&self, property: &Node) -> Option<Statement> {
        self.list_properties(Some(property)).next()
    }

    /// Some statement with the given property, or
    /// [`GraphError::PropertyNotFound`]
    pub fn get_required_property(&self, property: &Node) -> GraphResult<Statement> {
        self.get_property(property)
            .ok_or_else(|| GraphError::PropertyNotFound {
                subject: self.node.clone(),
                property: property.clone(),
            })
    }

    /// True if any statement has the given property
    pub fn has_property(&self, property: &Node) -> bool {
        self.model.contains(&self.property_pattern(Some(property)))
    }

    /// True if the given property has the given value
    pub fn has_value(&self, property: &Node, value: &Node) -> bool {
        self.model.contains(&Triple::new(
            self.node.clone(),
            property.clone(),
            value.clone(),
        ))
    }

    /// True if this resource is asserted to have the given type
    pub fn has_type(&self, rdf_type: &Node) -> bool {
        self.model.contains(&self.type_triple(rdf_type))
    }

    /// Enumerate this resource's statements with the given property (or any
    /// property)
    pub fn list_properties(&self, property: Option<&Node>) -> Enumeration<Statement> {
        self.model.list_statements(&self.property_pattern(property))
    }

    /// Remove every statement with the given property, returning how many
    /// were removed
    pub fn remove_all(&self, property: &Node) -> GraphResult<usize> {
        self.model.remove_all(&self.property_pattern(Some(property)))
    }

    /// Remove every statement about this resource
    pub fn remove_properties(&self) -> GraphResult<usize> {
        self.model.remove_all(&self.property_pattern(None))
    }

    /// View this resource as a container of the given kind, if it is typed
    /// as one
    pub fn as_container(&self, kind: ContainerKind) -> Option<Container> {
        self.has_type(&kind.type_node())
            .then(|| Container::new(self.clone(), kind))
    }

    /// View this resource as a list, if it is the empty list or the head of a
    /// list cell
    pub fn as_list(&self) -> Option<List> {
        let is_list = self.node == vocab::nil()
            || self.has_type(&vocab::list())
            || self.has_property(&vocab::first());
        is_list.then(|| List::new(self.node.clone(), self.model.clone()))
    }
}

impl std::fmt::Debug for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Resource").field(&self.node).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_splits_local_names() {
        let model = Model::memory();
        let resource = model.create_resource("http://example.com/ns#thing");
        assert_eq!(resource.local_name(), Some("thing"));
        assert_eq!(resource.namespace(), Some("http://example.com/ns#"));
        assert!(!resource.is_anon());
        assert_eq!(model.create_blank().uri(), None);
    }

    #[test]
    fn it_reports_missing_required_properties() -> anyhow::Result<()> {
        let model = Model::memory();
        let resource = model.create_resource("http://example.com/a");
        let name = Node::uri("http://example.com/name");

        assert_eq!(
            resource.get_required_property(&name).err(),
            Some(GraphError::PropertyNotFound {
                subject: resource.node().clone(),
                property: name.clone(),
            })
        );

        resource.add_property(&name, Node::literal("Alice"))?;
        let statement = resource.get_required_property(&name)?;
        assert_eq!(statement.object(), &Node::literal("Alice"));
        assert_eq!(resource.remove_all(&name)?, 1);
        assert!(!resource.has_property(&name));
        Ok(())
    }
}
