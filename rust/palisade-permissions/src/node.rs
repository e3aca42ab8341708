use std::sync::Arc;

use palisade_graph::{Datatype, Literal, Model, Node, Resource};

use crate::{
    Checks, PermissionsResult, SecuredItem, SecuredModel, SecuredResource, SecurityContext,
};

/// A secured [`Literal`]. Its content is only revealed while the graph may
/// be read.
#[derive(Clone)]
pub struct SecuredLiteral {
    literal: Literal,
    model: Model,
    context: Arc<SecurityContext>,
}

impl SecuredLiteral {
    pub(crate) fn new(literal: Literal, model: Model, context: Arc<SecurityContext>) -> Self {
        Self {
            literal,
            model,
            context,
        }
    }

    /// Unwrap into the base literal
    pub fn into_base(self) -> Literal {
        self.literal
    }

    /// The secured model this literal was obtained from
    pub fn model(&self) -> SecuredModel {
        SecuredModel::with_context(self.model.clone(), self.context.clone())
    }

    fn visible(&self) -> PermissionsResult<Option<&Literal>> {
        let checks = Checks::new(&self.context);
        Ok(checks.read_graph()?.then_some(&self.literal))
    }

    /// The lexical form
    pub fn lexical_form(&self) -> PermissionsResult<Option<String>> {
        Ok(self
            .visible()?
            .map(|literal| literal.lexical_form().to_owned()))
    }

    /// The language tag, if any
    pub fn language(&self) -> PermissionsResult<Option<String>> {
        Ok(self
            .visible()?
            .and_then(|literal| literal.language().map(str::to_owned)))
    }

    /// The datatype
    pub fn datatype(&self) -> PermissionsResult<Option<Datatype>> {
        Ok(self.visible()?.map(|literal| literal.datatype().clone()))
    }

    /// The value as a boolean
    pub fn as_bool(&self) -> PermissionsResult<Option<bool>> {
        Ok(self.visible()?.map(Literal::as_bool).transpose()?)
    }

    /// The value as an integer
    pub fn as_i64(&self) -> PermissionsResult<Option<i64>> {
        Ok(self.visible()?.map(Literal::as_i64).transpose()?)
    }

    /// The value as a float
    pub fn as_f64(&self) -> PermissionsResult<Option<f64>> {
        Ok(self.visible()?.map(Literal::as_f64).transpose()?)
    }

    /// The value as a single character
    pub fn as_char(&self) -> PermissionsResult<Option<char>> {
        Ok(self.visible()?.map(Literal::as_char).transpose()?)
    }
}

impl SecuredItem for SecuredLiteral {
    type Base = Literal;

    fn base_item(&self) -> &Literal {
        &self.literal
    }

    fn context(&self) -> &Arc<SecurityContext> {
        &self.context
    }
}

impl std::fmt::Debug for SecuredLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SecuredLiteral").finish_non_exhaustive()
    }
}

/// A secured node: either a resource or a literal
#[derive(Clone, Debug)]
pub enum SecuredNode {
    /// A URI or blank node
    Resource(SecuredResource),
    /// A literal value
    Literal(SecuredLiteral),
}

impl SecuredNode {
    pub(crate) fn new(node: Node, model: &Model, context: Arc<SecurityContext>) -> Self {
        match node {
            Node::Literal(literal) => {
                SecuredNode::Literal(SecuredLiteral::new(literal, model.clone(), context))
            }
            node => SecuredNode::Resource(SecuredResource::new(
                Resource::new(node, model.clone()),
                context,
            )),
        }
    }

    /// The wrapped node. Secured nodes are only handed out for statements
    /// that were permitted, so the node itself is not checked again.
    pub fn node(&self) -> Node {
        match self {
            SecuredNode::Resource(resource) => resource.node().clone(),
            SecuredNode::Literal(literal) => Node::Literal(literal.base_item().clone()),
        }
    }

    /// True for literals
    pub fn is_literal(&self) -> bool {
        matches!(self, SecuredNode::Literal(_))
    }

    /// True for URIs and blank nodes
    pub fn is_resource(&self) -> bool {
        matches!(self, SecuredNode::Resource(_))
    }

    /// The resource, unless this is a literal
    pub fn as_resource(&self) -> Option<&SecuredResource> {
        match self {
            SecuredNode::Resource(resource) => Some(resource),
            SecuredNode::Literal(_) => None,
        }
    }

    /// The literal, unless this is a resource
    pub fn as_literal(&self) -> Option<&SecuredLiteral> {
        match self {
            SecuredNode::Literal(literal) => Some(literal),
            SecuredNode::Resource(_) => None,
        }
    }
}
