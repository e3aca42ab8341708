use std::sync::Arc;

use palisade_graph::{Node, ReifiedStatement, Triple};

use crate::{
    Checks, PermissionsResult, Plan, SecuredItem, SecuredResource, SecurityContext,
};

/// A secured [`ReifiedStatement`]. The described triple is only revealed
/// when all four reification triples may be read.
#[derive(Clone)]
pub struct SecuredReifiedStatement {
    reified: ReifiedStatement,
    context: Arc<SecurityContext>,
}

impl SecuredReifiedStatement {
    pub(crate) fn new(reified: ReifiedStatement, context: Arc<SecurityContext>) -> Self {
        Self { reified, context }
    }

    /// Unwrap into the base reification
    pub fn into_base(self) -> ReifiedStatement {
        self.reified
    }

    /// The reifying node
    pub fn node(&self) -> &Node {
        self.reified.node()
    }

    /// The reifying resource
    pub fn resource(&self) -> SecuredResource {
        SecuredResource::new(self.reified.resource().clone(), self.context.clone())
    }

    /// The described triple
    pub fn statement(&self) -> PermissionsResult<Option<Triple>> {
        let readable = Checks::new(&self.context).read_all(&self.reified.triples())?;
        Ok(readable.then(|| self.reified.statement().clone()))
    }

    /// Remove this reification. Requires [`crate::Action::Delete`] on each of
    /// its four triples; the described triple is left untouched.
    pub fn remove(&self) -> PermissionsResult<()> {
        Plan::new()
            .delete_all(self.reified.triples())
            .authorize(&Checks::new(&self.context))?;
        Ok(self.reified.remove()?)
    }
}

impl SecuredItem for SecuredReifiedStatement {
    type Base = ReifiedStatement;

    fn base_item(&self) -> &ReifiedStatement {
        &self.reified
    }

    fn context(&self) -> &Arc<SecurityContext> {
        &self.context
    }
}

impl std::fmt::Debug for SecuredReifiedStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SecuredReifiedStatement")
            .field(self.reified.node())
            .finish()
    }
}
