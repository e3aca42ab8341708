//! Oracles and fixtures for exercising secured views in tests.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use palisade_graph::{Model, Node, Triple};

use crate::{Action, Actions, GraphId, PolicyOracle, Principal, SecuredModel, SecurityContext};

/// The graph name used by [`secured`]
pub const TEST_GRAPH: &str = "http://example.com/graph";

/// An oracle that grants a fixed set of actions everywhere
#[derive(Debug, Clone)]
pub struct StaticOracle {
    granted: Actions,
    hard_read_error: bool,
}

impl StaticOracle {
    /// Grant exactly `granted`, raising on read denials
    pub fn new(granted: impl Into<Actions>) -> Self {
        Self {
            granted: granted.into(),
            hard_read_error: true,
        }
    }

    /// Grant everything
    pub fn all() -> Self {
        Self::new(Actions::ALL)
    }

    /// Grant nothing
    pub fn none() -> Self {
        Self::new(Actions::NONE)
    }

    /// Filter read denials instead of raising
    pub fn soft(mut self) -> Self {
        self.hard_read_error = false;
        self
    }
}

impl PolicyOracle for StaticOracle {
    fn evaluate_graph(&self, _principal: &Principal, action: Action, _graph: &GraphId) -> bool {
        self.granted.contains(action)
    }

    fn evaluate(
        &self,
        _principal: &Principal,
        action: Action,
        _graph: &GraphId,
        _triple: &Triple,
    ) -> bool {
        self.granted.contains(action)
    }

    fn evaluate_update(
        &self,
        _principal: &Principal,
        _graph: &GraphId,
        _from: &Triple,
        _to: &Triple,
    ) -> bool {
        self.granted.contains(Action::Update)
    }

    fn is_hard_read_error(&self) -> bool {
        self.hard_read_error
    }
}

type Rule = dyn Fn(&Principal, Action, Option<&Triple>) -> bool + Send + Sync;

/// An oracle backed by a closure. The closure receives `None` for
/// graph-level questions. Updates are permitted when [`Action::Update`] is
/// permitted on both the old and the new statement.
#[derive(Clone)]
pub struct FnOracle {
    rule: Arc<Rule>,
    hard_read_error: bool,
}

impl FnOracle {
    /// An oracle that consults `rule`, raising on read denials
    pub fn new<F>(rule: F) -> Self
    where
        F: Fn(&Principal, Action, Option<&Triple>) -> bool + Send + Sync + 'static,
    {
        Self {
            rule: Arc::new(rule),
            hard_read_error: true,
        }
    }

    /// Filter read denials instead of raising
    pub fn soft(mut self) -> Self {
        self.hard_read_error = false;
        self
    }
}

impl PolicyOracle for FnOracle {
    fn evaluate_graph(&self, principal: &Principal, action: Action, _graph: &GraphId) -> bool {
        (self.rule)(principal, action, None)
    }

    fn evaluate(
        &self,
        principal: &Principal,
        action: Action,
        _graph: &GraphId,
        triple: &Triple,
    ) -> bool {
        (self.rule)(principal, action, Some(triple))
    }

    fn evaluate_update(
        &self,
        principal: &Principal,
        _graph: &GraphId,
        from: &Triple,
        to: &Triple,
    ) -> bool {
        (self.rule)(principal, Action::Update, Some(from))
            && (self.rule)(principal, Action::Update, Some(to))
    }

    fn is_hard_read_error(&self) -> bool {
        self.hard_read_error
    }
}

/// An oracle that counts how many questions it is asked
#[derive(Debug, Default)]
pub struct CountingOracle<O> {
    inner: O,
    calls: AtomicUsize,
}

impl<O> CountingOracle<O> {
    /// Count the questions put to `inner`
    pub fn new(inner: O) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    /// How many questions have been asked so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn count(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl<O> PolicyOracle for CountingOracle<O>
where
    O: PolicyOracle,
{
    fn evaluate_graph(&self, principal: &Principal, action: Action, graph: &GraphId) -> bool {
        self.count();
        self.inner.evaluate_graph(principal, action, graph)
    }

    fn evaluate(
        &self,
        principal: &Principal,
        action: Action,
        graph: &GraphId,
        triple: &Triple,
    ) -> bool {
        self.count();
        self.inner.evaluate(principal, action, graph, triple)
    }

    fn evaluate_update(
        &self,
        principal: &Principal,
        graph: &GraphId,
        from: &Triple,
        to: &Triple,
    ) -> bool {
        self.count();
        self.inner.evaluate_update(principal, graph, from, to)
    }

    fn is_hard_read_error(&self) -> bool {
        self.inner.is_hard_read_error()
    }
}

/// A node in the `http://example.com/` namespace
pub fn ex(local: &str) -> Node {
    Node::uri(format!("http://example.com/{local}"))
}

/// A secured view of `model` for the principal `alice`
pub fn secured<O>(model: &Model, oracle: O) -> SecuredModel
where
    O: PolicyOracle + 'static,
{
    SecuredModel::new(
        model.clone(),
        SecurityContext::new(
            Principal::new("alice"),
            Arc::new(oracle),
            GraphId::new(TEST_GRAPH),
        ),
    )
}

/// A model holding one `name` statement for each of the given people, each
/// as its own subject (`ex:<name>`)
pub fn people(names: &[&str]) -> anyhow::Result<Model> {
    let model = Model::memory();
    model.add_all(names.iter().map(|name| {
        Triple::new(ex(&name.to_lowercase()), ex("name"), Node::literal(*name))
    }))?;
    Ok(model)
}
