use serde::{Deserialize, Serialize};

use crate::{GraphError, GraphResult, Model, Node, Resource, Triple, vocab};

/// The three kinds of RDF container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainerKind {
    /// An unordered collection
    Bag,
    /// An ordered collection
    Seq,
    /// A set of alternatives; the first member is the default
    Alt,
}

impl ContainerKind {
    /// The `rdf:type` object that marks a resource as this kind of container
    pub fn type_node(&self) -> Node {
        match self {
            ContainerKind::Bag => vocab::bag(),
            ContainerKind::Seq => vocab::seq(),
            ContainerKind::Alt => vocab::alt(),
        }
    }
}

/// A container resource whose members are attached through the ordinal
/// properties `rdf:_1`, `rdf:_2`, and so on.
#[derive(Clone, PartialEq)]
pub struct Container {
    resource: Resource,
    kind: ContainerKind,
}

impl Container {
    pub(crate) fn new(resource: Resource, kind: ContainerKind) -> Self {
        Self { resource, kind }
    }

    /// What kind of container this is
    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    /// The container as a plain resource
    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    /// The node that names the container
    pub fn node(&self) -> &Node {
        self.resource.node()
    }

    /// The model this container belongs to
    pub fn model(&self) -> &Model {
        self.resource.model()
    }

    /// The membership triple that would place `value` at `index`
    pub fn member_triple(&self, index: u32, value: &Node) -> Triple {
        Triple::new(self.node().clone(), vocab::li(index), value.clone())
    }

    /// Every membership triple with its ordinal, in ordinal order
    pub fn memberships(&self) -> Vec<(u32, Triple)> {
        let mut memberships: Vec<(u32, Triple)> = self
            .model()
            .find(&self.resource.property_pattern(None))
            .filter_map(|triple| vocab::ordinal(&triple.predicate).map(|index| (index, triple)))
            .collect();
        memberships.sort();
        memberships
    }

    /// The number of members
    pub fn size(&self) -> usize {
        self.memberships().len()
    }

    /// Every member, in ordinal order
    pub fn members(&self) -> Vec<Node> {
        self.memberships()
            .into_iter()
            .map(|(_, triple)| triple.object)
            .collect()
    }

    /// True if `value` is a member
    pub fn contains(&self, value: &Node) -> bool {
        self.memberships()
            .iter()
            .any(|(_, triple)| &triple.object == value)
    }

    /// The lowest ordinal at which `value` appears
    pub fn index_of(&self, value: &Node) -> Option<u32> {
        self.memberships()
            .into_iter()
            .find(|(_, triple)| &triple.object == value)
            .map(|(index, _)| index)
    }

    /// The membership triple at `index`
    pub fn membership(&self, index: u32) -> GraphResult<Triple> {
        self.model()
            .find(&Triple::new(self.node().clone(), vocab::li(index), Node::Any))
            .next()
            .ok_or_else(|| GraphError::IndexOutOfBounds {
                index: index as usize,
                size: self.size(),
            })
    }

    /// The member at `index` (1-based)
    pub fn get(&self, index: u32) -> GraphResult<Node> {
        Ok(self.membership(index)?.object)
    }

    /// The ordinal that [`Container::add`] will use next
    pub fn next_index(&self) -> u32 {
        self.memberships()
            .last()
            .map(|(index, _)| index + 1)
            .unwrap_or(1)
    }

    /// Append a member, returning its ordinal
    pub fn add(&self, value: impl Into<Node>) -> GraphResult<u32> {
        let index = self.next_index();
        self.model()
            .add(self.member_triple(index, &value.into()))?;
        Ok(index)
    }

    /// Replace the member at `index`, returning the previous member
    pub fn set(&self, index: u32, value: impl Into<Node>) -> GraphResult<Node> {
        let previous = self.membership(index)?;
        let replacement = previous.with_object(value.into());
        self.model().remove(&previous)?;
        self.model().add(replacement)?;
        Ok(previous.object)
    }

    /// Insert a member at `index`, shifting later members up by one. `index`
    /// may be at most one past the last ordinal.
    pub fn insert(&self, index: u32, value: impl Into<Node>) -> GraphResult<()> {
        let size = self.size();
        if index == 0 || index as usize > size + 1 {
            return Err(GraphError::IndexOutOfBounds {
                index: index as usize,
                size,
            });
        }

        let (removed, mut added) = self.shifted(|ordinal| ordinal >= index, 1);
        added.push(self.member_triple(index, &value.into()));
        self.model().remove_statements(removed)?;
        self.model().add_all(added)
    }

    /// Remove the member at `index`, shifting later members down by one.
    /// Returns the removed member.
    pub fn remove_at(&self, index: u32) -> GraphResult<Node> {
        let removed_member = self.membership(index)?;
        let (mut removed, added) = self.shifted(|ordinal| ordinal > index, -1);
        removed.push(removed_member.clone());
        self.model().remove_statements(removed)?;
        self.model().add_all(added)?;
        Ok(removed_member.object)
    }

    /// The triples that move, and where they move to, when every member
    /// selected by `select` is renumbered by `offset`
    pub fn shifted<F>(&self, select: F, offset: i64) -> (Vec<Triple>, Vec<Triple>)
    where
        F: Fn(u32) -> bool,
    {
        self.memberships()
            .into_iter()
            .filter(|(ordinal, _)| select(*ordinal))
            .map(|(ordinal, triple)| {
                let target = (i64::from(ordinal) + offset) as u32;
                let moved = self.member_triple(target, &triple.object);
                (triple, moved)
            })
            .unzip()
    }

    /// Remove a specific membership triple. For a bag, the last member is
    /// moved into the hole so the ordinals stay dense; ordered containers
    /// shift every later member down.
    pub fn remove_member(&self, member: &Triple) -> GraphResult<()> {
        let Some(index) = vocab::ordinal(&member.predicate) else {
            return Err(GraphError::IndexOutOfBounds {
                index: 0,
                size: self.size(),
            });
        };
        if member.subject != *self.node() || !self.model().contains(member) {
            return Ok(());
        }

        match self.kind {
            ContainerKind::Bag => {
                let last = self.memberships().pop();
                self.model().remove(member)?;
                if let Some((last_index, last)) = last {
                    if last_index != index {
                        self.model().remove(&last)?;
                        self.model().add(self.member_triple(index, &last.object))?;
                    }
                }
                Ok(())
            }
            ContainerKind::Seq | ContainerKind::Alt => self.remove_at(index).map(|_| ()),
        }
    }

    /// The default member of an alternative container
    pub fn default_member(&self) -> GraphResult<Node> {
        self.membership(1)
            .map(|triple| triple.object)
            .map_err(|_| GraphError::AltHasNoDefault(self.node().clone()))
    }

    /// Replace the default member, or add one if there is none
    pub fn set_default(&self, value: impl Into<Node>) -> GraphResult<()> {
        let value = value.into();
        match self.membership(1) {
            Ok(_) => self.set(1, value).map(|_| ()),
            Err(_) => self.model().add(self.member_triple(1, &value)),
        }
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("kind", &self.kind)
            .field("node", self.node())
            .finish()
    }
}
