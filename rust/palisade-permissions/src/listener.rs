use std::sync::Arc;

use palisade_graph::{Change, ChangeListener, Triple};

use crate::{Action, Checks, SecurityContext};

/// A [`ChangeListener`] that only passes on what its principal may read.
///
/// Each notification is filtered against the oracle's answers at delivery
/// time. Triples that may not be read are dropped from the payload, and a
/// payload left empty is not delivered at all. Application events carry no
/// triples and are delivered while the graph may be read.
pub struct SecuredListener {
    inner: Arc<dyn ChangeListener>,
    context: Arc<SecurityContext>,
}

impl SecuredListener {
    /// Filter the notifications delivered to `inner`
    pub fn new(inner: Arc<dyn ChangeListener>, context: Arc<SecurityContext>) -> Self {
        Self { inner, context }
    }

    fn visible(&self, checks: &Checks, triples: &[Triple]) -> Vec<Triple> {
        if checks.can_read_everything() {
            return triples.to_vec();
        }
        triples
            .iter()
            .filter(|triple| checks.can(Action::Read, triple))
            .cloned()
            .collect()
    }
}

impl ChangeListener for SecuredListener {
    fn on_change(&self, change: &Change) {
        let checks = Checks::new(&self.context);
        if !checks.can_graph(Action::Read) {
            return;
        }

        let (filtered, offered) = match change {
            Change::Event(_) => return self.inner.on_change(change),
            Change::Added(triples) => (Change::Added(self.visible(&checks, triples)), triples.len()),
            Change::Removed(triples) => {
                (Change::Removed(self.visible(&checks, triples)), triples.len())
            }
        };

        let delivered = match &filtered {
            Change::Added(triples) | Change::Removed(triples) => triples.len(),
            Change::Event(_) => 0,
        };
        if delivered == 0 {
            if offered > 0 && self.context.is_hard_read_error() {
                tracing::warn!(
                    principal = %self.context.principal(),
                    graph = %self.context.graph(),
                    offered,
                    "Withheld a change notification that could not be read"
                );
            }
            return;
        }
        self.inner.on_change(&filtered);
    }
}
