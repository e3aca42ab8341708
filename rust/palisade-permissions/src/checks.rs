use std::{cell::RefCell, collections::HashMap};

use palisade_graph::Triple;

use crate::{AccessDenied, Action, Actions, SecurityContext};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Question {
    Graph(Action),
    Statement(Action, Triple),
    Update(Triple, Triple),
}

/// The permission checks made while carrying out a single operation.
///
/// A [`Checks`] remembers every answer the oracle gives so that an operation
/// which touches the same statement more than once asks only once. It lives
/// for exactly one operation; nothing is remembered between operations.
pub struct Checks<'a> {
    context: &'a SecurityContext,
    answers: RefCell<HashMap<Question, bool>>,
}

impl<'a> Checks<'a> {
    /// Begin the checks for one operation
    pub fn new(context: &'a SecurityContext) -> Self {
        Self {
            context,
            answers: RefCell::new(HashMap::new()),
        }
    }

    /// The context decisions are made in
    pub fn context(&self) -> &'a SecurityContext {
        self.context
    }

    fn ask(&self, question: Question) -> bool {
        let cached = self.answers.borrow().get(&question).copied();
        if let Some(answer) = cached {
            return answer;
        }

        let answer = match &question {
            Question::Graph(action) => self.context.permits_graph(*action),
            Question::Statement(action, triple) => self.context.permits(*action, triple),
            Question::Update(from, to) => self.context.permits_update(from, to),
        };
        self.answers.borrow_mut().insert(question, answer);
        answer
    }

    /// May `action` be performed on the graph as a whole?
    pub fn can_graph(&self, action: Action) -> bool {
        self.ask(Question::Graph(action))
    }

    /// May `action` be performed on `triple`?
    pub fn can(&self, action: Action, triple: &Triple) -> bool {
        self.ask(Question::Statement(action, triple.clone()))
    }

    /// May every one of `actions` be performed on `triple`?
    pub fn can_all(&self, actions: impl Into<Actions>, triple: &Triple) -> bool {
        actions.into().iter().all(|action| self.can(action, triple))
    }

    /// May `from` be replaced by `to`?
    pub fn can_update(&self, from: &Triple, to: &Triple) -> bool {
        self.ask(Question::Update(from.clone(), to.clone()))
    }

    /// May every statement be read? When this holds, per-statement read
    /// checks can be skipped.
    pub fn can_read_everything(&self) -> bool {
        self.can(Action::Read, &Triple::ANY)
    }

    fn deny(&self, denied: AccessDenied) -> AccessDenied {
        tracing::debug!(principal = %self.context.principal(), "{denied}");
        denied
    }

    /// Fail unless `action` is permitted on the graph as a whole
    pub fn require_graph(&self, action: Action) -> Result<(), AccessDenied> {
        if self.can_graph(action) {
            return Ok(());
        }
        Err(self.deny(AccessDenied::new(
            action,
            self.context.graph().clone(),
            None,
        )))
    }

    /// Fail unless `action` is permitted on `triple`
    pub fn require(&self, action: Action, triple: &Triple) -> Result<(), AccessDenied> {
        if self.can(action, triple) {
            return Ok(());
        }
        Err(self.deny(AccessDenied::new(
            action,
            self.context.graph().clone(),
            Some(triple.clone()),
        )))
    }

    /// Fail unless `from` may be replaced by `to`
    pub fn require_update(&self, from: &Triple, to: &Triple) -> Result<(), AccessDenied> {
        if self.can_update(from, to) {
            return Ok(());
        }
        Err(self.deny(AccessDenied::Update {
            graph: self.context.graph().clone(),
            from: Some(from.clone()),
            triple: Some(to.clone()),
        }))
    }

    /// The graph-level read gate. Returns `Ok(false)` when reading is denied
    /// and denials are filtered, and fails when denials raise.
    pub fn read_graph(&self) -> Result<bool, AccessDenied> {
        if self.can_graph(Action::Read) {
            Ok(true)
        } else if self.context.is_hard_read_error() {
            Err(self.deny(AccessDenied::Read {
                graph: self.context.graph().clone(),
                triple: None,
            }))
        } else {
            Ok(false)
        }
    }

    /// The graph-level gate for an enumeration filtered by `actions`. Read
    /// is gated as in [`Checks::read_graph`]; any other requested action the
    /// graph refuses leaves nothing to enumerate.
    pub fn enumerate_graph(&self, actions: Actions) -> Result<bool, AccessDenied> {
        Ok(self.read_graph()? && actions.iter().all(|action| self.can_graph(action)))
    }

    /// The read gate for a single statement, including the graph-level gate
    pub fn read(&self, triple: &Triple) -> Result<bool, AccessDenied> {
        if !self.read_graph()? {
            return Ok(false);
        }
        if self.can(Action::Read, triple) {
            Ok(true)
        } else if self.context.is_hard_read_error() {
            Err(self.deny(AccessDenied::Read {
                graph: self.context.graph().clone(),
                triple: Some(triple.clone()),
            }))
        } else {
            Ok(false)
        }
    }

    /// The read gate for several statements at once; all of them must be
    /// readable
    pub fn read_all<'t, I>(&self, triples: I) -> Result<bool, AccessDenied>
    where
        I: IntoIterator<Item = &'t Triple>,
    {
        for triple in triples {
            if !self.read(triple)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// The gate for operations that either find an existing statement or
    /// create it. Passes when the graph may be updated and the statement
    /// created, or when the statement exists and may be read.
    pub fn read_or_create(&self, triple: &Triple, exists: bool) -> Result<(), AccessDenied> {
        if self.can_graph(Action::Update) && self.can(Action::Create, triple) {
            return Ok(());
        }
        if exists && self.can_graph(Action::Read) && self.can(Action::Read, triple) {
            return Ok(());
        }
        if exists {
            self.read(triple)?;
        }
        self.require_graph(Action::Update)?;
        self.require(Action::Create, triple)
    }
}

/// A single statement-level check in a [`Plan`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    /// The statement will be added
    Create(Triple),
    /// The statement will be removed
    Delete(Triple),
    /// One statement will be replaced by another
    Update {
        /// The statement being replaced
        from: Triple,
        /// The replacement
        to: Triple,
    },
}

/// Every check a mutation needs, collected before anything is written. A
/// mutation builds its plan, authorizes it, and only then touches the
/// underlying model, so a refused mutation leaves the model unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    checks: Vec<Check>,
}

impl Plan {
    /// An empty plan. Authorizing it still requires [`Action::Update`] on
    /// the graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require [`Action::Create`] on `triple`
    pub fn create(mut self, triple: Triple) -> Self {
        self.checks.push(Check::Create(triple));
        self
    }

    /// Require [`Action::Create`] on every triple
    pub fn create_all(mut self, triples: impl IntoIterator<Item = Triple>) -> Self {
        self.checks.extend(triples.into_iter().map(Check::Create));
        self
    }

    /// Require [`Action::Delete`] on `triple`
    pub fn delete(mut self, triple: Triple) -> Self {
        self.checks.push(Check::Delete(triple));
        self
    }

    /// Require [`Action::Delete`] on every triple
    pub fn delete_all(mut self, triples: impl IntoIterator<Item = Triple>) -> Self {
        self.checks.extend(triples.into_iter().map(Check::Delete));
        self
    }

    /// Require that `from` may be replaced by `to`
    pub fn update(mut self, from: Triple, to: Triple) -> Self {
        self.checks.push(Check::Update { from, to });
        self
    }

    /// The checks collected so far
    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    fn count(&self, wanted: fn(&Check) -> bool) -> usize {
        self.checks.iter().filter(|check| wanted(check)).count()
    }

    /// Require [`Action::Update`] on the graph, then every collected check.
    /// When more than one statement is created (or deleted), a single
    /// permission for [`Triple::ANY`] stands in for the individual checks.
    pub fn authorize(&self, checks: &Checks) -> Result<(), AccessDenied> {
        checks.require_graph(Action::Update)?;

        let create_anything = self.count(|check| matches!(check, Check::Create(_))) > 1
            && checks.can(Action::Create, &Triple::ANY);
        let delete_anything = self.count(|check| matches!(check, Check::Delete(_))) > 1
            && checks.can(Action::Delete, &Triple::ANY);

        for check in &self.checks {
            match check {
                Check::Create(triple) if !create_anything => {
                    checks.require(Action::Create, triple)?
                }
                Check::Delete(triple) if !delete_anything => {
                    checks.require(Action::Delete, triple)?
                }
                Check::Update { from, to } => checks.require_update(from, to)?,
                _ => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use palisade_graph::Node;

    use super::*;
    use crate::{
        GraphId, Principal,
        helpers::{CountingOracle, StaticOracle},
    };

    fn triple(object: &str) -> Triple {
        Triple::new(
            Node::uri("http://example.com/s"),
            Node::uri("http://example.com/p"),
            Node::literal(object),
        )
    }

    #[test]
    fn it_asks_each_question_once_per_operation() {
        let oracle = Arc::new(CountingOracle::new(StaticOracle::all()));
        let context = SecurityContext::new(
            Principal::new("alice"),
            oracle.clone(),
            GraphId::new("http://example.com/graph"),
        );

        let checks = Checks::new(&context);
        assert!(checks.can(Action::Read, &triple("a")));
        assert!(checks.can(Action::Read, &triple("a")));
        assert!(checks.can_graph(Action::Update));
        assert!(checks.can_graph(Action::Update));
        assert_eq!(oracle.calls(), 2);

        let next_operation = Checks::new(&context);
        assert!(next_operation.can(Action::Read, &triple("a")));
        assert_eq!(oracle.calls(), 3);
    }

    #[test]
    fn plans_stop_at_the_first_refusal() {
        let context = SecurityContext::new(
            Principal::new("alice"),
            Arc::new(StaticOracle::new([Action::Update, Action::Create])),
            GraphId::new("http://example.com/graph"),
        );
        let plan = Plan::new()
            .create(triple("new"))
            .delete(triple("old"));

        let denied = plan.authorize(&Checks::new(&context)).err();
        assert_eq!(
            denied,
            Some(AccessDenied::Delete {
                graph: GraphId::new("http://example.com/graph"),
                triple: Some(triple("old")),
            })
        );
    }

    #[test]
    fn soft_reads_answer_false() {
        let context = SecurityContext::new(
            Principal::new("alice"),
            Arc::new(StaticOracle::none().soft()),
            GraphId::new("http://example.com/graph"),
        );
        let checks = Checks::new(&context);
        assert_eq!(checks.read_graph(), Ok(false));
        assert_eq!(checks.read(&triple("a")), Ok(false));
    }
}
