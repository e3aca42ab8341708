use std::fmt::{Debug, Display, Formatter};

use palisade_graph::{Node, Triple};
use serde::{Deserialize, Serialize};

/// The URI of the placeholder that stands for a node that does not exist
/// yet, such as the blank node of a list cell that an operation is about to
/// create
pub const FUTURE_URI: &str = "urn:palisade:permissions:future";

/// The URI of the placeholder that stands for a query variable in a pattern
pub const VARIABLE_URI: &str = "urn:palisade:permissions:variable";

/// The placeholder for a node that an operation is about to create. Oracles
/// are asked about triples containing it when the real node has not been
/// minted yet.
pub fn future() -> Node {
    Node::uri(FUTURE_URI)
}

/// The placeholder for a query variable. Oracles may treat it like
/// [`Node::Any`].
pub fn variable() -> Node {
    Node::uri(VARIABLE_URI)
}

/// A kind of access to a graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Observe content
    Read,
    /// Add statements
    Create,
    /// Replace statements or change the graph as a whole
    Update,
    /// Remove statements
    Delete,
}

impl Action {
    /// Every action, in a fixed order
    pub const ALL: [Action; 4] = [Action::Read, Action::Create, Action::Update, Action::Delete];

    fn bit(self) -> u8 {
        match self {
            Action::Read => 1,
            Action::Create => 1 << 1,
            Action::Update => 1 << 2,
            Action::Delete => 1 << 3,
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        };
        write!(f, "{name}")
    }
}

/// A set of [`Action`]s
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Actions(u8);

impl Actions {
    /// The empty set
    pub const NONE: Actions = Actions(0);

    /// Just [`Action::Read`]
    pub const READ: Actions = Actions(1);

    /// Every action
    pub const ALL: Actions = Actions(0b1111);

    /// A copy of this set that also holds `action`
    pub fn with(self, action: Action) -> Self {
        Actions(self.0 | action.bit())
    }

    /// True if `action` is in the set
    pub fn contains(&self, action: Action) -> bool {
        self.0 & action.bit() != 0
    }

    /// True if the set holds no actions
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// The actions in the set, in the order of [`Action::ALL`]
    pub fn iter(&self) -> impl Iterator<Item = Action> + '_ {
        Action::ALL
            .into_iter()
            .filter(|action| self.contains(*action))
    }
}

impl Debug for Actions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl From<Action> for Actions {
    fn from(action: Action) -> Self {
        Actions::NONE.with(action)
    }
}

impl<const N: usize> From<[Action; N]> for Actions {
    fn from(actions: [Action; N]) -> Self {
        actions.into_iter().collect()
    }
}

impl FromIterator<Action> for Actions {
    fn from_iter<T: IntoIterator<Item = Action>>(iter: T) -> Self {
        iter.into_iter().fold(Actions::NONE, Actions::with)
    }
}

/// The identity on whose behalf a secured view acts. The meaning of the
/// name is up to the [`PolicyOracle`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal(String);

impl Principal {
    /// A principal with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The name of the principal
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Display for Principal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The name of the graph being secured
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphId(String);

impl GraphId {
    /// A graph named by the given URI
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    /// The URI naming the graph
    pub fn uri(&self) -> &str {
        &self.0
    }

    /// The graph name as a node
    pub fn node(&self) -> Node {
        Node::uri(self.0.clone())
    }
}

impl Display for GraphId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{}>", self.0)
    }
}

/// A pluggable decision procedure that answers "may this principal perform
/// this action on this graph (or on this statement of this graph)?"
///
/// Decisions are plain booleans: a [`PolicyOracle`] never fails. Secured
/// views ask the oracle at the moment of each operation and never cache a
/// decision beyond a single operation, so an oracle whose answers change over
/// time is observed immediately.
///
/// Triples passed to the oracle may contain:
///
/// - [`Node::Any`], meaning "every node in this position". An oracle that
///   permits `Read` on [`Triple::ANY`] lets secured views skip per-statement
///   checks.
/// - [`future()`], standing for a node that the operation is about to create
/// - [`variable()`], standing for a query variable
pub trait PolicyOracle: Send + Sync {
    /// May `principal` perform `action` on the graph as a whole?
    fn evaluate_graph(&self, principal: &Principal, action: Action, graph: &GraphId) -> bool;

    /// May `principal` perform `action` on `triple` within the graph?
    fn evaluate(
        &self,
        principal: &Principal,
        action: Action,
        graph: &GraphId,
        triple: &Triple,
    ) -> bool;

    /// May `principal` replace `from` with `to`?
    fn evaluate_update(
        &self,
        principal: &Principal,
        graph: &GraphId,
        from: &Triple,
        to: &Triple,
    ) -> bool;

    /// Are all of `actions` permitted? With no triple, the question is about
    /// the graph as a whole.
    fn evaluate_all(
        &self,
        principal: &Principal,
        actions: Actions,
        graph: &GraphId,
        triple: Option<&Triple>,
    ) -> bool {
        actions.iter().all(|action| match triple {
            Some(triple) => self.evaluate(principal, action, graph, triple),
            None => self.evaluate_graph(principal, action, graph),
        })
    }

    /// Is any of `actions` permitted? With no triple, the question is about
    /// the graph as a whole.
    fn evaluate_any(
        &self,
        principal: &Principal,
        actions: Actions,
        graph: &GraphId,
        triple: Option<&Triple>,
    ) -> bool {
        actions.iter().any(|action| match triple {
            Some(triple) => self.evaluate(principal, action, graph, triple),
            None => self.evaluate_graph(principal, action, graph),
        })
    }

    /// Whether read denials should surface as errors (`true`) or be silently
    /// filtered (`false`). This is the default for views that do not choose a
    /// [`crate::ReadMode`] explicitly.
    fn is_hard_read_error(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::{CountingOracle, StaticOracle};

    #[test]
    fn it_collects_actions() {
        let actions = Actions::from([Action::Read, Action::Delete]);
        assert!(actions.contains(Action::Read));
        assert!(actions.contains(Action::Delete));
        assert!(!actions.contains(Action::Update));
        assert_eq!(
            actions.iter().collect::<Vec<_>>(),
            vec![Action::Read, Action::Delete]
        );
        assert_eq!(Action::ALL.into_iter().collect::<Actions>(), Actions::ALL);
        assert!(Actions::NONE.is_empty());
    }

    #[test]
    fn combined_questions_stop_at_the_first_answer() {
        let principal = Principal::new("alice");
        let graph = GraphId::new("http://example.com/graph");
        let triple = Triple::new(
            Node::uri("http://example.com/s"),
            Node::uri("http://example.com/p"),
            Node::literal("o"),
        );
        let read_then_update = Actions::from([Action::Read, Action::Update]);

        let writer = CountingOracle::new(StaticOracle::new([Action::Update]));
        assert!(!writer.evaluate_all(&principal, read_then_update, &graph, Some(&triple)));
        assert_eq!(writer.calls(), 1);
        assert!(writer.evaluate_any(&principal, read_then_update, &graph, None));
        assert_eq!(writer.calls(), 3);

        let reader = CountingOracle::new(StaticOracle::new([Action::Read]));
        assert!(reader.evaluate_any(&principal, read_then_update, &graph, Some(&triple)));
        assert_eq!(reader.calls(), 1);
        assert!(!reader.evaluate_all(&principal, read_then_update, &graph, None));
        assert_eq!(reader.calls(), 3);
    }
}
