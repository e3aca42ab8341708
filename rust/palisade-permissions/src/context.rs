use std::{fmt::Debug, sync::Arc};

use palisade_graph::Triple;
use serde::{Deserialize, Serialize};

use crate::{Action, Actions, GraphId, PolicyOracle, Principal};

/// How a secured view reports that reading was not permitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadMode {
    /// Raise [`crate::AccessDenied::Read`]
    HardError,
    /// Answer as though the content were absent
    SoftFilter,
}

/// The configuration of a secured view: which graph it guards and how read
/// denials are reported. Typically loaded from JSON:
///
/// ```
/// # use palisade_permissions::{ReadMode, ViewSettings};
/// let settings: ViewSettings = serde_json::from_str(
///     r#"{ "graph": "http://example.com/graph", "read_mode": "soft_filter" }"#,
/// ).unwrap();
/// assert_eq!(settings.read_mode, Some(ReadMode::SoftFilter));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewSettings {
    /// The URI naming the secured graph
    pub graph: String,
    /// Overrides the oracle's [`PolicyOracle::is_hard_read_error`] when set
    #[serde(default)]
    pub read_mode: Option<ReadMode>,
}

impl ViewSettings {
    /// Parse settings from a JSON document
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Everything a secured view needs to make decisions: the principal, the
/// oracle, the graph being guarded and the read mode. A context is fixed at
/// construction and shared (behind an [`Arc`]) by every wrapper a view hands
/// out.
#[derive(Clone)]
pub struct SecurityContext {
    principal: Principal,
    oracle: Arc<dyn PolicyOracle>,
    graph: GraphId,
    read_mode: ReadMode,
}

impl SecurityContext {
    /// A context whose read mode is taken from the oracle
    pub fn new(principal: Principal, oracle: Arc<dyn PolicyOracle>, graph: GraphId) -> Self {
        let read_mode = if oracle.is_hard_read_error() {
            ReadMode::HardError
        } else {
            ReadMode::SoftFilter
        };
        Self {
            principal,
            oracle,
            graph,
            read_mode,
        }
    }

    /// A context configured from [`ViewSettings`]
    pub fn from_settings(
        settings: &ViewSettings,
        principal: Principal,
        oracle: Arc<dyn PolicyOracle>,
    ) -> Self {
        let context = Self::new(principal, oracle, GraphId::new(settings.graph.clone()));
        match settings.read_mode {
            Some(read_mode) => context.with_read_mode(read_mode),
            None => context,
        }
    }

    /// Override the read mode
    pub fn with_read_mode(mut self, read_mode: ReadMode) -> Self {
        self.read_mode = read_mode;
        self
    }

    /// The principal being served
    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    /// The oracle that makes decisions
    pub fn oracle(&self) -> &Arc<dyn PolicyOracle> {
        &self.oracle
    }

    /// The graph being guarded
    pub fn graph(&self) -> &GraphId {
        &self.graph
    }

    /// How read denials are reported
    pub fn read_mode(&self) -> ReadMode {
        self.read_mode
    }

    /// True when read denials raise
    pub fn is_hard_read_error(&self) -> bool {
        self.read_mode == ReadMode::HardError
    }

    /// Ask the oracle about the graph as a whole
    pub fn permits_graph(&self, action: Action) -> bool {
        let permitted = self
            .oracle
            .evaluate_graph(&self.principal, action, &self.graph);
        tracing::trace!(principal = %self.principal, graph = %self.graph, %action, permitted, "Evaluated graph access");
        permitted
    }

    /// Ask the oracle about a single statement
    pub fn permits(&self, action: Action, triple: &Triple) -> bool {
        let permitted = self
            .oracle
            .evaluate(&self.principal, action, &self.graph, triple);
        tracing::trace!(principal = %self.principal, graph = %self.graph, %action, %triple, permitted, "Evaluated statement access");
        permitted
    }

    /// Ask the oracle whether every one of `actions` is permitted on a
    /// statement
    pub fn permits_all(&self, actions: Actions, triple: &Triple) -> bool {
        let permitted =
            self.oracle
                .evaluate_all(&self.principal, actions, &self.graph, Some(triple));
        tracing::trace!(principal = %self.principal, graph = %self.graph, ?actions, %triple, permitted, "Evaluated statement access");
        permitted
    }

    /// Ask the oracle whether any of `actions` is permitted on a statement
    pub fn permits_any(&self, actions: Actions, triple: &Triple) -> bool {
        let permitted =
            self.oracle
                .evaluate_any(&self.principal, actions, &self.graph, Some(triple));
        tracing::trace!(principal = %self.principal, graph = %self.graph, ?actions, %triple, permitted, "Evaluated statement access");
        permitted
    }

    /// Ask the oracle whether `from` may be replaced by `to`
    pub fn permits_update(&self, from: &Triple, to: &Triple) -> bool {
        let permitted = self
            .oracle
            .evaluate_update(&self.principal, &self.graph, from, to);
        tracing::trace!(principal = %self.principal, graph = %self.graph, %from, %to, permitted, "Evaluated update");
        permitted
    }
}

impl Debug for SecurityContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityContext")
            .field("principal", &self.principal)
            .field("graph", &self.graph)
            .field("read_mode", &self.read_mode)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::StaticOracle;

    #[test]
    fn it_defaults_the_read_mode_from_the_oracle() {
        let hard = SecurityContext::new(
            Principal::new("alice"),
            Arc::new(StaticOracle::all()),
            GraphId::new("http://example.com/graph"),
        );
        assert_eq!(hard.read_mode(), ReadMode::HardError);

        let soft = SecurityContext::new(
            Principal::new("alice"),
            Arc::new(StaticOracle::all().soft()),
            GraphId::new("http://example.com/graph"),
        );
        assert_eq!(soft.read_mode(), ReadMode::SoftFilter);
    }

    #[test]
    fn settings_override_the_oracle() -> anyhow::Result<()> {
        let settings = ViewSettings::from_json(
            r#"{ "graph": "http://example.com/graph", "read_mode": "soft_filter" }"#,
        )?;
        let context = SecurityContext::from_settings(
            &settings,
            Principal::new("alice"),
            Arc::new(StaticOracle::all()),
        );
        assert_eq!(context.read_mode(), ReadMode::SoftFilter);
        assert_eq!(context.graph().uri(), "http://example.com/graph");

        let defaulted = ViewSettings::from_json(r#"{ "graph": "http://example.com/graph" }"#)?;
        assert_eq!(defaulted.read_mode, None);
        Ok(())
    }
}
