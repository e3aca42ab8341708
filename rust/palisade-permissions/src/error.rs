use palisade_graph::{GraphError, Triple};
use thiserror::Error;

use crate::{Action, GraphId};

/// Convenience alias for results produced by secured views
pub type PermissionsResult<T> = Result<T, PermissionsError>;

fn describe(triple: &Option<Triple>) -> String {
    match triple {
        Some(triple) => format!(" for {triple}"),
        None => String::new(),
    }
}

fn describe_update(from: &Option<Triple>, to: &Option<Triple>) -> String {
    match (from, to) {
        (Some(from), Some(to)) => format!(" from {from} to {to}"),
        (None, to) => describe(to),
        (Some(from), None) => format!(" from {from}"),
    }
}

/// An action was not permitted. The variant names the action that was
/// refused; the graph is always present, and the triple is present when the
/// refusal was for a specific statement rather than the graph as a whole.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AccessDenied {
    /// Reading was not permitted
    #[error("Read denied on {graph}{}", describe(.triple))]
    Read {
        /// The graph being accessed
        graph: GraphId,
        /// The statement being accessed, if any
        triple: Option<Triple>,
    },

    /// Creating statements was not permitted
    #[error("Create denied on {graph}{}", describe(.triple))]
    Create {
        /// The graph being accessed
        graph: GraphId,
        /// The statement being created, if any
        triple: Option<Triple>,
    },

    /// Updating was not permitted
    #[error("Update denied on {graph}{}", describe_update(.from, .triple))]
    Update {
        /// The graph being accessed
        graph: GraphId,
        /// The statement being replaced, if any
        from: Option<Triple>,
        /// The replacement statement, if any
        triple: Option<Triple>,
    },

    /// Deleting statements was not permitted
    #[error("Delete denied on {graph}{}", describe(.triple))]
    Delete {
        /// The graph being accessed
        graph: GraphId,
        /// The statement being deleted, if any
        triple: Option<Triple>,
    },
}

impl AccessDenied {
    /// A denial of `action` on the graph or on a single statement
    pub fn new(action: Action, graph: GraphId, triple: Option<Triple>) -> Self {
        match action {
            Action::Read => AccessDenied::Read { graph, triple },
            Action::Create => AccessDenied::Create { graph, triple },
            Action::Update => AccessDenied::Update {
                graph,
                from: None,
                triple,
            },
            Action::Delete => AccessDenied::Delete { graph, triple },
        }
    }

    /// The action that was refused
    pub fn action(&self) -> Action {
        match self {
            AccessDenied::Read { .. } => Action::Read,
            AccessDenied::Create { .. } => Action::Create,
            AccessDenied::Update { .. } => Action::Update,
            AccessDenied::Delete { .. } => Action::Delete,
        }
    }

    /// The graph that was being accessed
    pub fn graph(&self) -> &GraphId {
        match self {
            AccessDenied::Read { graph, .. }
            | AccessDenied::Create { graph, .. }
            | AccessDenied::Update { graph, .. }
            | AccessDenied::Delete { graph, .. } => graph,
        }
    }

    /// The statement that was being accessed, if the refusal was not for the
    /// graph as a whole
    pub fn triple(&self) -> Option<&Triple> {
        match self {
            AccessDenied::Read { triple, .. }
            | AccessDenied::Create { triple, .. }
            | AccessDenied::Update { triple, .. }
            | AccessDenied::Delete { triple, .. } => triple.as_ref(),
        }
    }
}

/// The common error type used by this crate
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PermissionsError {
    /// The oracle refused an action
    #[error(transparent)]
    Denied(#[from] AccessDenied),

    /// The underlying model failed
    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl PermissionsError {
    /// The access denial, if this error is one
    pub fn denial(&self) -> Option<&AccessDenied> {
        match self {
            PermissionsError::Denied(denied) => Some(denied),
            PermissionsError::Graph(_) => None,
        }
    }

    /// True if this error is an access denial for `action`
    pub fn is_denied(&self, action: Action) -> bool {
        self.denial().is_some_and(|denied| denied.action() == action)
    }

    /// The underlying model error, if this error is one
    pub fn graph_error(&self) -> Option<&GraphError> {
        match self {
            PermissionsError::Graph(error) => Some(error),
            PermissionsError::Denied(_) => None,
        }
    }
}
