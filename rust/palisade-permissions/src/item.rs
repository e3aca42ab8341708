use std::sync::Arc;

use palisade_graph::Triple;

use crate::{Action, GraphId, SecurityContext};

/// Common behavior of every secured wrapper.
///
/// A secured item pairs an element of the base model with the
/// [`SecurityContext`] of the view that produced it. The `can_*` probes ask
/// the oracle directly and never fail; they are how callers find out in
/// advance whether an operation would be refused.
pub trait SecuredItem {
    /// The base model element being wrapped
    type Base;

    /// The wrapped element, exactly as it exists in the base model
    fn base_item(&self) -> &Self::Base;

    /// The context decisions are made in
    fn context(&self) -> &Arc<SecurityContext>;

    /// The graph being guarded
    fn graph_id(&self) -> &GraphId {
        self.context().graph()
    }

    /// True when read denials raise rather than filter
    fn is_hard_read_error(&self) -> bool {
        self.context().is_hard_read_error()
    }

    /// May the graph be read?
    fn can_read(&self) -> bool {
        self.context().permits_graph(Action::Read)
    }

    /// May statements be created in the graph?
    fn can_create(&self) -> bool {
        self.context().permits_graph(Action::Create)
    }

    /// May the graph be updated?
    fn can_update(&self) -> bool {
        self.context().permits_graph(Action::Update)
    }

    /// May statements be deleted from the graph?
    fn can_delete(&self) -> bool {
        self.context().permits_graph(Action::Delete)
    }

    /// May `triple` be read?
    fn can_read_statement(&self, triple: &Triple) -> bool {
        self.context().permits(Action::Read, triple)
    }

    /// May `triple` be created?
    fn can_create_statement(&self, triple: &Triple) -> bool {
        self.context().permits(Action::Create, triple)
    }

    /// May `from` be replaced by `to`?
    fn can_update_statement(&self, from: &Triple, to: &Triple) -> bool {
        self.context().permits_update(from, to)
    }

    /// May `triple` be deleted?
    fn can_delete_statement(&self, triple: &Triple) -> bool {
        self.context().permits(Action::Delete, triple)
    }
}
