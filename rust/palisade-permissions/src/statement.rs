use std::sync::Arc;

use palisade_graph::{GraphError, Literal, Node, Statement, Triple};

use crate::{
    Checks, PermissionsResult, Plan, SecuredItem, SecuredLiteral, SecuredModel, SecuredNode,
    SecuredReifiedStatement, SecuredResource, SecurityContext,
};

/// A secured [`Statement`].
///
/// Every accessor that reveals part of the statement is gated by a read
/// check on the statement itself. In soft mode a refused read yields `None`.
#[derive(Clone)]
pub struct SecuredStatement {
    statement: Statement,
    context: Arc<SecurityContext>,
}

impl SecuredStatement {
    pub(crate) fn new(statement: Statement, context: Arc<SecurityContext>) -> Self {
        Self { statement, context }
    }

    /// Unwrap into the base statement
    pub fn into_base(self) -> Statement {
        self.statement
    }

    /// The secured model this statement belongs to
    pub fn model(&self) -> SecuredModel {
        SecuredModel::with_context(self.statement.model().clone(), self.context.clone())
    }

    fn visible(&self) -> PermissionsResult<bool> {
        Ok(Checks::new(&self.context).read(self.statement.triple())?)
    }

    fn node(&self, node: Node) -> SecuredNode {
        SecuredNode::new(node, self.statement.model(), self.context.clone())
    }

    /// The statement as a triple
    pub fn triple(&self) -> PermissionsResult<Option<Triple>> {
        Ok(self.visible()?.then(|| self.statement.triple().clone()))
    }

    /// The subject
    pub fn subject(&self) -> PermissionsResult<Option<SecuredResource>> {
        Ok(self.visible()?.then(|| {
            SecuredResource::new(self.statement.subject_resource(), self.context.clone())
        }))
    }

    /// The predicate
    pub fn predicate(&self) -> PermissionsResult<Option<Node>> {
        Ok(self.visible()?.then(|| self.statement.predicate().clone()))
    }

    /// The object
    pub fn object(&self) -> PermissionsResult<Option<SecuredNode>> {
        Ok(self
            .visible()?
            .then(|| self.node(self.statement.object().clone())))
    }

    /// The object, which must be a resource
    pub fn resource(&self) -> PermissionsResult<Option<SecuredResource>> {
        if !self.visible()? {
            return Ok(None);
        }
        let resource = self.statement.object_resource()?;
        Ok(Some(SecuredResource::new(resource, self.context.clone())))
    }

    /// The object, which must be a literal
    pub fn literal(&self) -> PermissionsResult<Option<SecuredLiteral>> {
        if !self.visible()? {
            return Ok(None);
        }
        let literal = self.statement.literal()?.clone();
        Ok(Some(SecuredLiteral::new(
            literal,
            self.statement.model().clone(),
            self.context.clone(),
        )))
    }

    fn literal_value<T>(
        &self,
        convert: fn(&Literal) -> palisade_graph::GraphResult<T>,
    ) -> PermissionsResult<Option<T>> {
        if !self.visible()? {
            return Ok(None);
        }
        Ok(Some(convert(self.statement.literal()?)?))
    }

    /// The object as a boolean
    pub fn bool_value(&self) -> PermissionsResult<Option<bool>> {
        self.literal_value(Literal::as_bool)
    }

    /// The object as an integer
    pub fn i64_value(&self) -> PermissionsResult<Option<i64>> {
        self.literal_value(Literal::as_i64)
    }

    /// The object as a float
    pub fn f64_value(&self) -> PermissionsResult<Option<f64>> {
        self.literal_value(Literal::as_f64)
    }

    /// The object as a single character
    pub fn char_value(&self) -> PermissionsResult<Option<char>> {
        self.literal_value(Literal::as_char)
    }

    /// The lexical form of the object
    pub fn string_value(&self) -> PermissionsResult<Option<String>> {
        self.literal_value(|literal| Ok(literal.lexical_form().to_owned()))
    }

    /// The language tag of the object
    pub fn language(&self) -> PermissionsResult<Option<String>> {
        Ok(self
            .literal_value(|literal| Ok(literal.language().map(str::to_owned)))?
            .flatten())
    }

    /// A readable statement with the given property about this statement's
    /// object
    pub fn property(&self, property: &Node) -> PermissionsResult<SecuredStatement> {
        match self.resource()? {
            Some(resource) => resource.get_required_property(property),
            None => Err(GraphError::PropertyNotFound {
                subject: self.statement.object().clone(),
                property: property.clone(),
            }
            .into()),
        }
    }

    /// True if the statement is present in the model and may be read
    pub fn exists(&self) -> PermissionsResult<bool> {
        Ok(self.visible()? && self.statement.exists())
    }

    /// Replace the object, keeping subject and predicate. The replacement is
    /// authorized as a single update rather than a delete and a create.
    pub fn change_object(&self, object: impl Into<Node>) -> PermissionsResult<SecuredStatement> {
        let replacement = self.statement.triple().with_object(object.into());
        Plan::new()
            .update(self.statement.triple().clone(), replacement.clone())
            .authorize(&Checks::new(&self.context))?;

        let changed = self.statement.change_object(replacement.object)?;
        Ok(SecuredStatement::new(changed, self.context.clone()))
    }

    /// Replace the object with a literal value
    pub fn change_literal_object(
        &self,
        value: impl Into<Literal>,
    ) -> PermissionsResult<SecuredStatement> {
        self.change_object(Node::Literal(value.into()))
    }

    /// Remove the statement from the model
    pub fn remove(&self) -> PermissionsResult<()> {
        Plan::new()
            .delete(self.statement.triple().clone())
            .authorize(&Checks::new(&self.context))?;
        Ok(self.statement.remove()?)
    }

    /// Reify this statement under `uri` (or a fresh blank node)
    pub fn create_reified_statement(
        &self,
        uri: Option<&str>,
    ) -> PermissionsResult<SecuredReifiedStatement> {
        self.model()
            .create_reified_statement(uri, self.statement.triple())
    }

    /// True if this statement has a reification that may be read
    pub fn is_reified(&self) -> PermissionsResult<bool> {
        self.model().is_reified(self.statement.triple())
    }

    /// The reifications of this statement that may be read
    pub fn list_reified_statements(&self) -> PermissionsResult<Vec<SecuredReifiedStatement>> {
        self.model()
            .list_reified_statements(Some(self.statement.triple()))
    }

    /// Remove every reification of this statement
    pub fn remove_reification(&self) -> PermissionsResult<()> {
        self.model()
            .remove_all_reifications(self.statement.triple())
    }
}

impl SecuredItem for SecuredStatement {
    type Base = Statement;

    fn base_item(&self) -> &Statement {
        &self.statement
    }

    fn context(&self) -> &Arc<SecurityContext> {
        &self.context
    }
}

impl std::fmt::Debug for SecuredStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SecuredStatement").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use palisade_graph::{Model, Node, Triple};
    use pretty_assertions::assert_eq;

    use crate::{
        Action,
        helpers::{FnOracle, StaticOracle, ex, secured},
    };

    #[test]
    fn soft_mode_hides_denied_statements() -> anyhow::Result<()> {
        let model = Model::memory();
        model.add(Triple::new(ex("s"), ex("p"), Node::literal(true)))?;
        let view = secured(&model, StaticOracle::new([Action::Read]));
        let statement = view
            .list_statements(&Triple::ANY)?
            .next()
            .ok_or_else(|| anyhow::anyhow!("missing statement"))?;
        assert_eq!(statement.bool_value()?, Some(true));

        let hidden = secured(
            &model,
            FnOracle::new(|_, action, triple| action == Action::Read && triple.is_none()).soft(),
        );
        let statement = hidden.statement(statement.into_base().triple().clone())?;
        assert!(statement.is_none());
        Ok(())
    }

    #[test]
    fn value_changes_are_single_updates() -> anyhow::Result<()> {
        let model = Model::memory();
        model.add(Triple::new(ex("s"), ex("p"), Node::literal(1)))?;
        let view = secured(&model, StaticOracle::all());
        let statement = view
            .list_statements(&Triple::ANY)?
            .next()
            .ok_or_else(|| anyhow::anyhow!("missing statement"))?;

        let changed = statement.change_literal_object(2)?;
        assert_eq!(changed.i64_value()?, Some(2));
        assert_eq!(model.size(), 1);
        Ok(())
    }
}
