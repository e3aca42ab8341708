use std::sync::Arc;

use palisade_graph::{Enumeration, GraphError, List, Node, Triple, vocab};

use crate::{
    Action, Actions, Checks, PermissionsResult, Plan, SecuredItem, SecuredIter, SecuredModel,
    SecuredNode, SecurityContext, future,
};

/// A secured linked list.
///
/// A cell is visible when its value triple `(cell rdf:first value)` may be
/// read; positions count visible cells only. Mutations authorize every
/// triple of the cells they create or remove, plus an update for every link
/// they rewrite. Cells that do not exist yet are named by [`future`] when the
/// oracle is asked about them.
#[derive(Clone)]
pub struct SecuredList {
    list: List,
    context: Arc<SecurityContext>,
}

impl SecuredList {
    pub(crate) fn new(list: List, context: Arc<SecurityContext>) -> Self {
        Self { list, context }
    }

    fn wrap(&self, list: List) -> SecuredList {
        SecuredList::new(list, self.context.clone())
    }

    fn secured_node(&self, node: Node) -> SecuredNode {
        SecuredNode::new(node, self.list.model(), self.context.clone())
    }

    /// Unwrap into the base list
    pub fn into_base(self) -> List {
        self.list
    }

    /// The head cell
    pub fn node(&self) -> &Node {
        self.list.node()
    }

    /// The secured model this list belongs to
    pub fn model(&self) -> SecuredModel {
        SecuredModel::with_context(self.list.model().clone(), self.context.clone())
    }

    /// True if this is the shared empty list
    pub fn is_nil(&self) -> bool {
        self.list.is_empty()
    }

    /// The cells whose value triples permit every one of `actions`, head
    /// first, paired with those value triples
    fn visible_cells(&self, actions: Actions) -> PermissionsResult<Vec<(Node, Triple)>> {
        let checks = Checks::new(&self.context);
        if !checks.enumerate_graph(actions)? {
            return Ok(Vec::new());
        }

        let mut cells = Vec::new();
        for cell in self.list.cells()? {
            let value = self.list.value_triple(&cell)?;
            cells.push((cell, value));
        }
        if checks.can_all(actions, &Triple::ANY) {
            return Ok(cells);
        }
        Ok(cells
            .into_iter()
            .filter(|(_, value)| checks.can_all(actions, value))
            .collect())
    }

    fn visible_values(&self) -> PermissionsResult<Vec<Node>> {
        Ok(self
            .visible_cells(Actions::READ)?
            .into_iter()
            .map(|(_, value)| value.object)
            .collect())
    }

    /// The readable values, head first
    pub fn iter(&self) -> PermissionsResult<SecuredIter<SecuredNode>> {
        self.iter_with(Actions::READ)
    }

    /// The readable values whose cells also permit every one of `actions`,
    /// head first
    pub fn iter_with(&self, actions: Actions) -> PermissionsResult<SecuredIter<SecuredNode>> {
        let actions = actions.with(Action::Read);
        let model = self.list.model().clone();
        let context = self.context.clone();
        let cells = Enumeration::new(self.visible_cells(actions)?)
            .map_items(move |(_, value)| SecuredNode::new(value.object, &model, context.clone()));
        Ok(SecuredIter::new(cells, actions, |_| true))
    }

    /// The number of readable cells
    pub fn size(&self) -> PermissionsResult<usize> {
        Ok(self.visible_cells(Actions::READ)?.len())
    }

    /// True if no cell may be read
    pub fn is_empty(&self) -> PermissionsResult<bool> {
        Ok(self.size()? == 0)
    }

    fn empty(&self, operation: &str) -> GraphError {
        GraphError::EmptyList(operation.into())
    }

    fn unchangeable(&self, operation: &str) -> PermissionsResult<()> {
        if self.is_nil() {
            return Err(GraphError::EmptyListUpdate(operation.into()).into());
        }
        Ok(())
    }

    /// The value of the head cell. A head that may not be read is reported
    /// as an empty list in soft mode.
    pub fn head(&self) -> PermissionsResult<SecuredNode> {
        if self.is_nil() {
            return Err(self.empty("read the head of").into());
        }
        let value = self.list.value_triple(self.list.node())?;
        if !Checks::new(&self.context).read(&value)? {
            return Err(self.empty("read the head of").into());
        }
        Ok(self.secured_node(value.object))
    }

    /// The list following the head cell
    pub fn tail(&self) -> PermissionsResult<SecuredList> {
        if self.is_nil() {
            return Err(self.empty("read the tail of").into());
        }
        let rest = self.list.rest_triple(self.list.node())?;
        if !Checks::new(&self.context).read(&rest)? {
            return Err(self.empty("read the tail of").into());
        }
        Ok(self.wrap(self.list.model().list(rest.object)))
    }

    fn visible_cell(&self, index: usize) -> PermissionsResult<(Node, Triple)> {
        let mut cells = self.visible_cells(Actions::READ)?;
        let size = cells.len();
        if index >= size {
            return Err(GraphError::IndexOutOfBounds { index, size }.into());
        }
        Ok(cells.swap_remove(index))
    }

    /// The readable value at `index` (0-based, counting readable cells)
    pub fn get(&self, index: usize) -> PermissionsResult<SecuredNode> {
        let (_, value) = self.visible_cell(index)?;
        Ok(self.secured_node(value.object))
    }

    /// The first readable position at or after `start` holding `value`
    pub fn index_of(&self, value: &Node, start: usize) -> PermissionsResult<Option<usize>> {
        Ok(self
            .visible_values()?
            .iter()
            .enumerate()
            .skip(start)
            .find(|(_, candidate)| *candidate == value)
            .map(|(index, _)| index))
    }

    /// True if a readable cell holds `value`
    pub fn contains(&self, value: &Node) -> PermissionsResult<bool> {
        Ok(self.index_of(value, 0)?.is_some())
    }

    /// Replace the readable value at `index`, authorized as an update of
    /// that cell's value triple. Returns the previous value.
    pub fn replace(&self, index: usize, value: impl Into<Node>) -> PermissionsResult<SecuredNode> {
        self.unchangeable("replace a value in")?;
        let value = value.into();
        let (cell, previous) = self.visible_cell(index)?;
        Plan::new()
            .update(previous.clone(), previous.with_object(value.clone()))
            .authorize(&Checks::new(&self.context))?;

        let previous = self.list.set_value(&cell, value)?;
        Ok(self.secured_node(previous))
    }

    /// Replace the value of the head cell. Returns the previous value if it
    /// may be read.
    pub fn set_head(&self, value: impl Into<Node>) -> PermissionsResult<Option<SecuredNode>> {
        self.unchangeable("set the head of")?;
        let value = value.into();
        let previous = self.list.value_triple(self.list.node())?;
        let checks = Checks::new(&self.context);
        Plan::new()
            .update(previous.clone(), previous.with_object(value.clone()))
            .authorize(&checks)?;

        let readable = checks.can(Action::Read, &previous);
        let previous = self.list.set_value(self.list.node(), value)?;
        Ok(readable.then(|| self.secured_node(previous)))
    }

    /// Point the head cell at a different tail, authorized as an update of
    /// the head's rest triple. Returns the previous tail.
    pub fn set_tail(&self, tail: &SecuredList) -> PermissionsResult<SecuredList> {
        self.unchangeable("set the tail of")?;
        let link = self.list.rest_triple(self.list.node())?;
        Plan::new()
            .update(link.clone(), link.with_object(tail.node().clone()))
            .authorize(&Checks::new(&self.context))?;

        let previous = self.list.set_tail(&tail.list)?;
        Ok(self.wrap(previous))
    }

    /// The creates needed for fresh cells holding `values`, ending in `end`
    pub(crate) fn cells_plan(plan: Plan, values: &[Node], end: Node) -> Plan {
        let count = values.len();
        values
            .iter()
            .enumerate()
            .fold(plan, |plan, (index, value)| {
                let rest = if index + 1 == count {
                    end.clone()
                } else {
                    future()
                };
                plan.create_all(List::cell_triples(&future(), value.clone(), rest))
            })
    }

    /// A new list with a new head cell holding `value` in front of this one
    pub fn cons(&self, value: impl Into<Node>) -> PermissionsResult<SecuredList> {
        let value = value.into();
        Self::cells_plan(Plan::new(), std::slice::from_ref(&value), self.node().clone())
            .authorize(&Checks::new(&self.context))?;
        Ok(self.wrap(self.list.cons(value)?))
    }

    fn link_plan(&self, values: &[Node]) -> PermissionsResult<Plan> {
        let last = self.list.last_cell()?;
        let link = self.list.rest_triple(&last)?;
        let plan = Plan::new().update(link.clone(), link.with_object(future()));
        Ok(Self::cells_plan(plan, values, vocab::nil()))
    }

    /// Append `value` in place. Fails on the empty list, which cannot
    /// change.
    pub fn add(&self, value: impl Into<Node>) -> PermissionsResult<()> {
        self.concatenate([value.into()])
    }

    /// Append `value`, returning the resulting list. On the empty list this
    /// creates a new single-cell list.
    pub fn with(&self, value: impl Into<Node>) -> PermissionsResult<SecuredList> {
        let value = value.into();
        if self.is_nil() {
            return self.model().create_list([value]);
        }
        self.add(value)?;
        Ok(self.clone())
    }

    /// Append `values` in place. Requires an update of the last cell's rest
    /// link and a create of every new cell triple.
    pub fn concatenate<I>(&self, values: I) -> PermissionsResult<()>
    where
        I: IntoIterator<Item = Node>,
    {
        self.unchangeable("concatenate onto")?;
        let values: Vec<Node> = values.into_iter().collect();
        if values.is_empty() {
            return Ok(());
        }
        self.link_plan(&values)?
            .authorize(&Checks::new(&self.context))?;
        Ok(self.list.concatenate(values)?)
    }

    /// Append the readable values of another list in place
    pub fn concatenate_list(&self, other: &SecuredList) -> PermissionsResult<()> {
        self.concatenate(other.visible_values()?)
    }

    /// A new list holding the readable values of this list followed by
    /// `values`
    pub fn append<I>(&self, values: I) -> PermissionsResult<SecuredList>
    where
        I: IntoIterator<Item = Node>,
    {
        let mut all = self.visible_values()?;
        all.extend(values);
        self.model().create_list(all)
    }

    /// A new list holding the readable values of this list
    pub fn copy(&self) -> PermissionsResult<SecuredList> {
        self.model().create_list(self.visible_values()?)
    }

    /// Remove the head cell, returning the tail. Requires
    /// [`crate::Action::Delete`] on every triple of the head cell.
    pub fn remove_head(&self) -> PermissionsResult<SecuredList> {
        if self.is_nil() {
            return Err(self.empty("remove the head of").into());
        }
        Plan::new()
            .delete_all(self.list.cell_statements(self.list.node()))
            .authorize(&Checks::new(&self.context))?;
        Ok(self.wrap(self.list.remove_head()?))
    }

    /// Remove the first readable cell holding `value`, returning the
    /// resulting list. Requires [`crate::Action::Delete`] on the cell's
    /// triples and an update of the link that pointed at it.
    pub fn remove(&self, value: &Node) -> PermissionsResult<SecuredList> {
        let Some((cell, _)) = self
            .visible_cells(Actions::READ)?
            .into_iter()
            .find(|(_, triple)| triple.object == *value)
        else {
            return Ok(self.clone());
        };
        if cell == *self.node() {
            return self.remove_head();
        }

        let mut plan = Plan::new().delete_all(self.list.cell_statements(&cell));
        if let Some(link) = self.list.link_to(&cell)? {
            let next = self.list.rest_triple(&cell)?.object;
            plan = plan.update(link.clone(), link.with_object(next));
        }
        plan.authorize(&Checks::new(&self.context))?;
        Ok(self.wrap(self.list.remove_cell(&cell)?))
    }

    /// Remove every cell, readable or not. Nothing is removed unless every
    /// cell triple may be deleted.
    pub fn remove_list(&self) -> PermissionsResult<()> {
        let triples: Vec<Triple> = self
            .list
            .cells()?
            .iter()
            .flat_map(|cell| self.list.cell_statements(cell))
            .collect();
        Plan::new()
            .delete_all(triples)
            .authorize(&Checks::new(&self.context))?;
        Ok(self.list.remove_list()?)
    }

    /// A description of the first structural problem, if any. Structure is
    /// only reported while the graph may be read.
    pub fn validity_error(&self) -> PermissionsResult<Option<String>> {
        if !Checks::new(&self.context).read_graph()? {
            return Ok(None);
        }
        Ok(self.list.validity_error())
    }

    /// True unless a structural problem is reported
    pub fn is_valid(&self) -> PermissionsResult<bool> {
        Ok(self.validity_error()?.is_none())
    }

    /// True if both lists show equal readable values in the same order
    pub fn same_list_as(&self, other: &SecuredList) -> PermissionsResult<bool> {
        Ok(self.visible_values()? == other.visible_values()?)
    }
}

impl SecuredItem for SecuredList {
    type Base = List;

    fn base_item(&self) -> &List {
        &self.list
    }

    fn context(&self) -> &Arc<SecurityContext> {
        &self.context
    }
}

impl std::fmt::Debug for SecuredList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SecuredList").field(self.list.node()).finish()
    }
}
