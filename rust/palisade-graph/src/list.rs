use std::collections::BTreeSet;

use crate::{GraphError, GraphResult, Model, Node, Triple, vocab};

/// A linked list of cells. Each cell is a node carrying three triples:
/// `(cell rdf:type rdf:List)`, `(cell rdf:first value)` and
/// `(cell rdf:rest next)`, where the last cell's `next` is `rdf:nil`. The
/// node `rdf:nil` itself is the empty list, which is shared by every list and
/// can never be modified.
#[derive(Clone, PartialEq)]
pub struct List {
    node: Node,
    model: Model,
}

impl List {
    pub(crate) fn new(node: Node, model: Model) -> Self {
        Self { node, model }
    }

    /// The three triples that make up a single cell
    pub fn cell_triples(cell: &Node, value: Node, rest: Node) -> [Triple; 3] {
        [
            Triple::new(cell.clone(), vocab::rdf_type(), vocab::list()),
            Triple::new(cell.clone(), vocab::first(), value),
            Triple::new(cell.clone(), vocab::rest(), rest),
        ]
    }

    /// The head cell of this list
    pub fn node(&self) -> &Node {
        &self.node
    }

    /// The model this list belongs to
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// True if this is the empty list
    pub fn is_empty(&self) -> bool {
        self.node == vocab::nil()
    }

    fn single(&self, cell: &Node, property: Node) -> GraphResult<Triple> {
        let mut found = self
            .model
            .find(&Triple::new(cell.clone(), property.clone(), Node::Any));
        let first = found.next();
        let second = found.next();
        match (first, second) {
            (Some(triple), None) => Ok(triple),
            (None, _) => Err(GraphError::InvalidList {
                cell: cell.clone(),
                reason: format!("missing {property}"),
            }),
            (Some(_), Some(_)) => Err(GraphError::InvalidList {
                cell: cell.clone(),
                reason: format!("more than one {property}"),
            }),
        }
    }

    /// The `rdf:first` triple of a cell
    pub fn value_triple(&self, cell: &Node) -> GraphResult<Triple> {
        self.single(cell, vocab::first())
    }

    /// The `rdf:rest` triple of a cell
    pub fn rest_triple(&self, cell: &Node) -> GraphResult<Triple> {
        self.single(cell, vocab::rest())
    }

    /// Every triple describing a cell that is present in the model
    pub fn cell_statements(&self, cell: &Node) -> Vec<Triple> {
        [vocab::rdf_type(), vocab::first(), vocab::rest()]
            .into_iter()
            .flat_map(|property| {
                self.model
                    .find(&Triple::new(cell.clone(), property, Node::Any))
                    .filter(|triple| {
                        triple.predicate != vocab::rdf_type() || triple.object == vocab::list()
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// The cell nodes of this list, head first
    pub fn cells(&self) -> GraphResult<Vec<Node>> {
        let mut cells = Vec::new();
        let mut seen = BTreeSet::new();
        let mut cell = self.node.clone();

        while cell != vocab::nil() {
            if !seen.insert(cell.clone()) {
                return Err(GraphError::InvalidList {
                    cell,
                    reason: "cycle in rdf:rest".into(),
                });
            }
            let next = self.rest_triple(&cell)?.object;
            cells.push(cell);
            cell = next;
        }
        Ok(cells)
    }

    /// The values of this list, head first
    pub fn values(&self) -> GraphResult<Vec<Node>> {
        self.cells()?
            .iter()
            .map(|cell| Ok(self.value_triple(cell)?.object))
            .collect()
    }

    /// The number of cells
    pub fn size(&self) -> GraphResult<usize> {
        Ok(self.cells()?.len())
    }

    /// The value of the head cell
    pub fn head(&self) -> GraphResult<Node> {
        if self.is_empty() {
            return Err(GraphError::EmptyList("read the head of".into()));
        }
        Ok(self.value_triple(&self.node)?.object)
    }

    /// The list following the head cell
    pub fn tail(&self) -> GraphResult<List> {
        if self.is_empty() {
            return Err(GraphError::EmptyList("read the tail of".into()));
        }
        Ok(List::new(
            self.rest_triple(&self.node)?.object,
            self.model.clone(),
        ))
    }

    /// The value at `index` (0-based)
    pub fn get(&self, index: usize) -> GraphResult<Node> {
        let cells = self.cells()?;
        let cell = cells.get(index).ok_or(GraphError::IndexOutOfBounds {
            index,
            size: cells.len(),
        })?;
        Ok(self.value_triple(cell)?.object)
    }

    /// The first position at or after `start` holding `value`
    pub fn index_of(&self, value: &Node, start: usize) -> GraphResult<Option<usize>> {
        Ok(self
            .values()?
            .iter()
            .enumerate()
            .skip(start)
            .find(|(_, candidate)| *candidate == value)
            .map(|(index, _)| index))
    }

    /// True if any cell holds `value`
    pub fn contains(&self, value: &Node) -> GraphResult<bool> {
        Ok(self.index_of(value, 0)?.is_some())
    }

    /// Replace the value at `index`, returning the previous value
    pub fn replace(&self, index: usize, value: impl Into<Node>) -> GraphResult<Node> {
        if self.is_empty() {
            return Err(GraphError::EmptyListUpdate("replace a value in".into()));
        }
        let cells = self.cells()?;
        let cell = cells.get(index).ok_or(GraphError::IndexOutOfBounds {
            index,
            size: cells.len(),
        })?;
        self.set_value(cell, value)
    }

    /// Replace the value held by `cell`, returning the previous value
    pub fn set_value(&self, cell: &Node, value: impl Into<Node>) -> GraphResult<Node> {
        let previous = self.value_triple(cell)?;
        self.model.remove(&previous)?;
        self.model.add(previous.with_object(value.into()))?;
        Ok(previous.object)
    }

    /// Replace the value of the head cell, returning the previous value
    pub fn set_head(&self, value: impl Into<Node>) -> GraphResult<Node> {
        if self.is_empty() {
            return Err(GraphError::EmptyListUpdate("set the head of".into()));
        }
        self.replace(0, value)
    }

    /// Point the head cell at a different tail, returning the previous tail
    pub fn set_tail(&self, tail: &List) -> GraphResult<List> {
        if self.is_empty() {
            return Err(GraphError::EmptyListUpdate("set the tail of".into()));
        }
        let previous = self.rest_triple(&self.node)?;
        self.model.remove(&previous)?;
        self.model.add(previous.with_object(tail.node.clone()))?;
        Ok(List::new(previous.object, self.model.clone()))
    }

    /// A new list with a new head cell holding `value` in front of this list
    pub fn cons(&self, value: impl Into<Node>) -> GraphResult<List> {
        let cell = Node::blank();
        self.model
            .add_all(List::cell_triples(&cell, value.into(), self.node.clone()))?;
        Ok(List::new(cell, self.model.clone()))
    }

    /// Append `value` in place. Fails on the empty list, which cannot change;
    /// see [`List::with`].
    pub fn add(&self, value: impl Into<Node>) -> GraphResult<()> {
        self.concatenate([value.into()])
    }

    /// Append `value`, returning the resulting list. On the empty list this
    /// creates a new single-cell list.
    pub fn with(&self, value: impl Into<Node>) -> GraphResult<List> {
        if self.is_empty() {
            return self.model.create_list([value.into()]);
        }
        self.add(value)?;
        Ok(self.clone())
    }

    /// The last cell of a non-empty list
    pub fn last_cell(&self) -> GraphResult<Node> {
        self.cells()?
            .pop()
            .ok_or_else(|| GraphError::EmptyList("find the last cell of".into()))
    }

    /// Append `values` in place
    pub fn concatenate<I>(&self, values: I) -> GraphResult<()>
    where
        I: IntoIterator<Item = Node>,
    {
        if self.is_empty() {
            return Err(GraphError::EmptyListUpdate("concatenate onto".into()));
        }
        let appended = self.model.create_list(values)?;
        if appended.is_empty() {
            return Ok(());
        }
        let last = self.last_cell()?;
        let link = self.rest_triple(&last)?;
        self.model.remove(&link)?;
        self.model.add(link.with_object(appended.node))
    }

    /// A new list holding the values of this list followed by `values`
    pub fn append<I>(&self, values: I) -> GraphResult<List>
    where
        I: IntoIterator<Item = Node>,
    {
        let mut all = self.values()?;
        all.extend(values);
        self.model.create_list(all)
    }

    /// A new list holding the same values
    pub fn copy(&self) -> GraphResult<List> {
        self.model.create_list(self.values()?)
    }

    /// Remove the head cell, returning the tail
    pub fn remove_head(&self) -> GraphResult<List> {
        if self.is_empty() {
            return Err(GraphError::EmptyList("remove the head of".into()));
        }
        let tail = self.tail()?;
        self.model.remove_statements(self.cell_statements(&self.node))?;
        Ok(tail)
    }

    /// Remove the first cell holding `value`, returning the resulting list
    /// (which is the tail when the head cell is removed)
    pub fn remove(&self, value: &Node) -> GraphResult<List> {
        let cells = self.cells()?;
        match self.index_of(value, 0)? {
            Some(position) => self.remove_cell(&cells[position]),
            None => Ok(self.clone()),
        }
    }

    /// Unlink and remove `cell`, returning the resulting list (which is the
    /// tail when the head cell is removed)
    pub fn remove_cell(&self, cell: &Node) -> GraphResult<List> {
        if *cell == self.node {
            return self.remove_head();
        }
        let Some(link) = self.link_to(cell)? else {
            return Ok(self.clone());
        };
        let next = self.rest_triple(cell)?.object;
        self.model.remove_statements(self.cell_statements(cell))?;
        self.model.remove(&link)?;
        self.model.add(link.with_object(next))?;
        Ok(self.clone())
    }

    /// The `rdf:rest` triple pointing at `cell`, if `cell` is a non-head cell
    /// of this list
    pub fn link_to(&self, cell: &Node) -> GraphResult<Option<Triple>> {
        let cells = self.cells()?;
        let Some(position) = cells.iter().position(|candidate| candidate == cell) else {
            return Ok(None);
        };
        if position == 0 {
            return Ok(None);
        }
        Ok(Some(self.rest_triple(&cells[position - 1])?))
    }

    /// Remove every cell of this list
    pub fn remove_list(&self) -> GraphResult<()> {
        let triples: Vec<Triple> = self
            .cells()?
            .iter()
            .flat_map(|cell| self.cell_statements(cell))
            .collect();
        self.model.remove_statements(triples)
    }

    /// A description of the first structural problem, if any
    pub fn validity_error(&self) -> Option<String> {
        let cells = match self.cells() {
            Ok(cells) => cells,
            Err(error) => return Some(error.to_string()),
        };
        cells
            .iter()
            .find_map(|cell| self.value_triple(cell).err())
            .map(|error| error.to_string())
    }

    /// True if every cell has exactly one value and one rest
    pub fn is_valid(&self) -> bool {
        self.validity_error().is_none()
    }

    /// True if both lists hold equal values in the same order
    pub fn same_list_as(&self, other: &List) -> GraphResult<bool> {
        Ok(self.values()? == other.values()?)
    }
}

impl std::fmt::Debug for List {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("List").field(&self.node).finish()
    }
}
