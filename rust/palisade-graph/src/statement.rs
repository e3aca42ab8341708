use crate::{
    GraphError, GraphResult, Literal, Model, Node, ReifiedStatement, Resource, Triple,
};

/// A [`Triple`] bound to the [`Model`] it was obtained from. A statement
/// handle does not imply that its triple is present in the model; see
/// [`Statement::exists`].
#[derive(Clone, PartialEq)]
pub struct Statement {
    triple: Triple,
    model: Model,
}

impl Statement {
    pub(crate) fn new(triple: Triple, model: Model) -> Self {
        Self { triple, model }
    }

    /// The triple this statement stands for
    pub fn triple(&self) -> &Triple {
        &self.triple
    }

    /// The model this statement belongs to
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// The subject node
    pub fn subject(&self) -> &Node {
        &self.triple.subject
    }

    /// The predicate node
    pub fn predicate(&self) -> &Node {
        &self.triple.predicate
    }

    /// The object node
    pub fn object(&self) -> &Node {
        &self.triple.object
    }

    /// The subject as a [`Resource`]
    pub fn subject_resource(&self) -> Resource {
        Resource::new(self.triple.subject.clone(), self.model.clone())
    }

    /// The object as a [`Resource`], or [`GraphError::NotAResource`] if it is
    /// a literal
    pub fn object_resource(&self) -> GraphResult<Resource> {
        self.model.resource(self.triple.object.clone())
    }

    /// The object as a [`Literal`], or [`GraphError::NotALiteral`]
    pub fn literal(&self) -> GraphResult<&Literal> {
        self.triple
            .object
            .as_literal()
            .ok_or_else(|| GraphError::NotALiteral(self.triple.object.clone()))
    }

    /// True if the triple is present in the model
    pub fn exists(&self) -> bool {
        self.model.contains(&self.triple)
    }

    /// Replace this statement in the model with one that has a different
    /// object, returning the new statement
    pub fn change_object(&self, object: impl Into<Node>) -> GraphResult<Statement> {
        let replacement = self.triple.with_object(object.into());
        if replacement != self.triple {
            self.model.remove(&self.triple)?;
            self.model.add(replacement.clone())?;
        }
        Ok(Statement::new(replacement, self.model.clone()))
    }

    /// Remove this statement from the model
    pub fn remove(&self) -> GraphResult<()> {
        self.model.remove(&self.triple)
    }

    /// Reify this statement under `uri` (or a fresh blank node)
    pub fn create_reified_statement(&self, uri: Option<&str>) -> GraphResult<ReifiedStatement> {
        self.model.create_reified_statement(uri, &self.triple)
    }

    /// True if this statement has at least one reification
    pub fn is_reified(&self) -> bool {
        self.model.is_reified(&self.triple)
    }

    /// Every reification of this statement
    pub fn list_reified_statements(&self) -> Vec<ReifiedStatement> {
        self.model.list_reified_statements(Some(&self.triple))
    }

    /// Remove every reification of this statement
    pub fn remove_reification(&self) -> GraphResult<()> {
        self.model.remove_all_reifications(&self.triple)
    }
}

impl std::fmt::Debug for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Statement").field(&self.triple).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_changes_the_object_in_place() -> anyhow::Result<()> {
        let model = Model::memory();
        let triple = Triple::new(
            Node::uri("http://example.com/a"),
            Node::uri("http://example.com/flag"),
            Node::literal(false),
        );
        model.add(triple.clone())?;

        let changed = model.statement(triple.clone()).change_object(Literal::from(true))?;
        assert!(changed.literal()?.as_bool()?);
        assert!(!model.contains(&triple));
        assert!(changed.exists());
        assert_eq!(model.size(), 1);
        Ok(())
    }
}
