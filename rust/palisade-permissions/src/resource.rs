use std::sync::Arc;

use palisade_graph::{ContainerKind, Node, Resource, Triple, vocab};

use crate::{
    Actions, Checks, PermissionsResult, SecuredAlt, SecuredBag, SecuredItem, SecuredIter,
    SecuredList, SecuredModel, SecuredNode, SecuredSeq, SecuredStatement, SecurityContext,
};

/// A secured [`Resource`].
///
/// The identity of a resource (its node, URI and local name) is not content
/// and is never checked. Everything that reads or writes the resource's
/// statements is.
#[derive(Clone)]
pub struct SecuredResource {
    resource: Resource,
    context: Arc<SecurityContext>,
}

impl SecuredResource {
    pub(crate) fn new(resource: Resource, context: Arc<SecurityContext>) -> Self {
        Self { resource, context }
    }

    /// Unwrap into the base resource
    pub fn into_base(self) -> Resource {
        self.resource
    }

    /// The node this resource stands for
    pub fn node(&self) -> &Node {
        self.resource.node()
    }

    /// True for blank nodes
    pub fn is_anon(&self) -> bool {
        self.resource.is_anon()
    }

    /// The URI, unless the resource is anonymous
    pub fn uri(&self) -> Option<&str> {
        self.resource.uri()
    }

    /// The part of the URI after the last `#` or `/`
    pub fn local_name(&self) -> Option<&str> {
        self.resource.local_name()
    }

    /// The part of the URI up to and including the last `#` or `/`
    pub fn namespace(&self) -> Option<&str> {
        self.resource.namespace()
    }

    /// The secured model this resource belongs to
    pub fn model(&self) -> SecuredModel {
        SecuredModel::with_context(self.resource.model().clone(), self.context.clone())
    }

    /// Assert a property value. Requires [`crate::Action::Update`] on the
    /// graph and [`crate::Action::Create`] on the new statement.
    pub fn add_property(&self, property: &Node, value: impl Into<Node>) -> PermissionsResult<()> {
        self.model().add(Triple::new(
            self.node().clone(),
            property.clone(),
            value.into(),
        ))
    }

    /// The readable statements with the given property (or any property)
    pub fn list_properties(
        &self,
        property: Option<&Node>,
    ) -> PermissionsResult<SecuredIter<SecuredStatement>> {
        self.list_properties_with(property, Actions::READ)
    }

    /// The statements with the given property (or any property) that permit
    /// every one of `actions`
    pub fn list_properties_with(
        &self,
        property: Option<&Node>,
        actions: Actions,
    ) -> PermissionsResult<SecuredIter<SecuredStatement>> {
        self.model()
            .list_statements_with(&self.resource.property_pattern(property), actions)
    }

    /// Some readable statement with the given property
    pub fn get_property(&self, property: &Node) -> PermissionsResult<Option<SecuredStatement>> {
        Ok(self.list_properties(Some(property))?.next())
    }

    /// Some readable statement with the given property. When no statement
    /// exists the error is [`palisade_graph::GraphError::PropertyNotFound`];
    /// when statements exist but none may be read, read denials raise as
    /// usual and are otherwise reported as not found.
    pub fn get_required_property(&self, property: &Node) -> PermissionsResult<SecuredStatement> {
        self.model().get_required_property(self.node(), property)
    }

    /// The value of some readable statement with the given property
    pub fn get_property_value(&self, property: &Node) -> PermissionsResult<Option<SecuredNode>> {
        self.get_property(property)?
            .map(|statement| statement.object())
            .transpose()
            .map(Option::flatten)
    }

    /// The value of some readable statement with the given property whose
    /// value is a resource
    pub fn get_property_resource_value(
        &self,
        property: &Node,
    ) -> PermissionsResult<Option<SecuredResource>> {
        let model = self.resource.model().clone();
        let context = self.context.clone();
        Ok(self
            .list_properties(Some(property))?
            .map(|statement| statement.into_base().triple().object.clone())
            .find(|object| object.is_resource())
            .map(|object| SecuredResource::new(Resource::new(object, model), context)))
    }

    /// True if some readable statement has the given property
    pub fn has_property(&self, property: &Node) -> PermissionsResult<bool> {
        Ok(self.list_properties(Some(property))?.has_next())
    }

    /// True if the statement `(this property value)` exists and may be
    /// read. Read denials on that statement raise as usual.
    pub fn has_value(&self, property: &Node, value: &Node) -> PermissionsResult<bool> {
        let triple = Triple::new(self.node().clone(), property.clone(), value.clone());
        let checks = Checks::new(&self.context);
        Ok(checks.read(&triple)? && self.resource.model().contains(&triple))
    }

    /// True if this resource is asserted to have the given type and that
    /// assertion may be read
    pub fn has_type(&self, rdf_type: &Node) -> PermissionsResult<bool> {
        self.has_value(&vocab::rdf_type(), rdf_type)
    }

    /// True if reading statements with the given property is permitted
    pub fn can_read_property(&self, property: &Node) -> bool {
        self.can_read()
            && self.can_read_statement(&Triple::new(
                self.node().clone(),
                property.clone(),
                Node::Any,
            ))
    }

    /// Remove every statement with the given property. Requires
    /// [`crate::Action::Delete`] on each of them.
    pub fn remove_all(&self, property: &Node) -> PermissionsResult<usize> {
        self.model()
            .remove_all(&self.resource.property_pattern(Some(property)))
    }

    /// Remove every statement about this resource
    pub fn remove_properties(&self) -> PermissionsResult<usize> {
        self.model().remove_all(&self.resource.property_pattern(None))
    }

    fn typed_as(&self, kind: ContainerKind) -> PermissionsResult<bool> {
        let checks = Checks::new(&self.context);
        let type_triple = Triple::new(self.node().clone(), vocab::rdf_type(), kind.type_node());
        Ok(checks.read(&type_triple)? && self.resource.model().contains(&type_triple))
    }

    /// View this resource as a bag, if it is typed as one and the type
    /// statement may be read
    pub fn try_as_bag(&self) -> PermissionsResult<Option<SecuredBag>> {
        Ok(self
            .typed_as(ContainerKind::Bag)?
            .then(|| self.resource.as_container(ContainerKind::Bag))
            .flatten()
            .map(|container| SecuredBag::new(container, self.context.clone())))
    }

    /// View this resource as a sequence, if it is typed as one and the type
    /// statement may be read
    pub fn try_as_seq(&self) -> PermissionsResult<Option<SecuredSeq>> {
        Ok(self
            .typed_as(ContainerKind::Seq)?
            .then(|| self.resource.as_container(ContainerKind::Seq))
            .flatten()
            .map(|container| SecuredSeq::new(container, self.context.clone())))
    }

    /// View this resource as an alternative, if it is typed as one and the
    /// type statement may be read
    pub fn try_as_alt(&self) -> PermissionsResult<Option<SecuredAlt>> {
        Ok(self
            .typed_as(ContainerKind::Alt)?
            .then(|| self.resource.as_container(ContainerKind::Alt))
            .flatten()
            .map(|container| SecuredAlt::new(container, self.context.clone())))
    }

    /// View this resource as a list. The empty list is always a list; any
    /// other resource must have a readable `rdf:type rdf:List` or `rdf:first`
    /// statement.
    pub fn try_as_list(&self) -> PermissionsResult<Option<SecuredList>> {
        let model = self.resource.model();
        if *self.node() == vocab::nil() {
            return Ok(Some(SecuredList::new(
                model.list(self.node().clone()),
                self.context.clone(),
            )));
        }

        let is_list = self.has_type(&vocab::list())?
            || self.list_properties(Some(&vocab::first()))?.has_next();
        Ok(is_list.then(|| SecuredList::new(model.list(self.node().clone()), self.context.clone())))
    }
}

impl SecuredItem for SecuredResource {
    type Base = Resource;

    fn base_item(&self) -> &Resource {
        &self.resource
    }

    fn context(&self) -> &Arc<SecurityContext> {
        &self.context
    }
}

impl std::fmt::Debug for SecuredResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SecuredResource")
            .field(self.resource.node())
            .finish()
    }
}
