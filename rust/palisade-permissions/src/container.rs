use std::sync::Arc;

use palisade_graph::{Container, ContainerKind, Enumeration, GraphError, Node, Triple, vocab};

use crate::{
    Action, Actions, Checks, PermissionsError, PermissionsResult, Plan, SecuredItem, SecuredIter,
    SecuredModel, SecuredNode, SecurityContext,
};

/// Behavior shared by the secured bag, sequence and alternative.
///
/// Members are read through their membership triples `(container rdf:_n
/// value)`, so a member is visible exactly when its membership triple may be
/// read. Every mutation is planned in full (including the renumbering of
/// shifted members) and authorized before anything is written.
pub trait SecuredContainer: SecuredItem<Base = Container> {
    /// The container node
    fn node(&self) -> &Node {
        self.base_item().node()
    }

    /// Which kind of container this is
    fn kind(&self) -> ContainerKind {
        self.base_item().kind()
    }

    /// The secured model this container belongs to
    fn model(&self) -> SecuredModel {
        SecuredModel::with_context(self.base_item().model().clone(), self.context().clone())
    }

    /// The readable membership triples that also permit every one of
    /// `actions`, ordered by ordinal
    fn memberships_with(&self, actions: Actions) -> PermissionsResult<SecuredIter<(u32, Triple)>> {
        let actions = actions.with(Action::Read);
        if !Checks::new(self.context()).enumerate_graph(actions)? {
            return Ok(SecuredIter::empty(actions));
        }
        Ok(SecuredIter::statements(
            Enumeration::new(self.base_item().memberships()),
            self.context().clone(),
            actions,
            |(_, triple)| triple,
        ))
    }

    /// The number of readable members
    fn size(&self) -> PermissionsResult<usize> {
        Ok(self.memberships_with(Actions::READ)?.count())
    }

    /// The readable members, ordered by ordinal
    fn members(&self) -> PermissionsResult<SecuredIter<SecuredNode>> {
        self.members_with(Actions::READ)
    }

    /// The readable members whose membership triples also permit every one
    /// of `actions`
    fn members_with(&self, actions: Actions) -> PermissionsResult<SecuredIter<SecuredNode>> {
        let model = self.base_item().model().clone();
        let context = self.context().clone();
        Ok(self
            .memberships_with(actions)?
            .map_items(move |(_, triple)| SecuredNode::new(triple.object, &model, context.clone())))
    }

    /// True if `value` is a readable member
    fn contains(&self, value: &Node) -> PermissionsResult<bool> {
        Ok(self.index_of(value)?.is_some())
    }

    /// The ordinal of the first readable membership holding `value`
    fn index_of(&self, value: &Node) -> PermissionsResult<Option<u32>> {
        Ok(self
            .memberships_with(Actions::READ)?
            .find(|(_, triple)| triple.object == *value)
            .map(|(index, _)| index))
    }

    /// Append a member, returning its ordinal. Requires
    /// [`crate::Action::Create`] on the new membership triple.
    fn add(&self, value: impl Into<Node>) -> PermissionsResult<u32>
    where
        Self: Sized,
    {
        let container = self.base_item();
        let value = value.into();
        Plan::new()
            .create(container.member_triple(container.next_index(), &value))
            .authorize(&Checks::new(self.context()))?;
        Ok(container.add(value)?)
    }

    /// Remove a specific membership triple. In a bag the last member moves
    /// into the hole, which requires [`crate::Action::Update`] on that move;
    /// ordered containers shift every later member down and require
    /// [`crate::Action::Update`] on each shift.
    fn remove_member(&self, member: &Triple) -> PermissionsResult<()> {
        let container = self.base_item();
        let checks = Checks::new(self.context());
        checks.require_graph(Action::Update)?;
        let Some(index) = vocab::ordinal(&member.predicate) else {
            return Err(out_of_bounds(container, &checks, 0));
        };
        checks.require(Action::Delete, member)?;
        if member.subject != *container.node() || !container.model().contains(member) {
            return Ok(());
        }

        let mut plan = Plan::new().delete(member.clone());
        match container.kind() {
            ContainerKind::Bag => {
                if let Some((last_index, last)) = container.memberships().pop() {
                    if last_index != index {
                        let moved = container.member_triple(index, &last.object);
                        plan = plan.update(last, moved);
                    }
                }
            }
            ContainerKind::Seq | ContainerKind::Alt => {
                let (from, to) = container.shifted(|ordinal| ordinal > index, -1);
                for (from, to) in from.into_iter().zip(to) {
                    plan = plan.update(from, to);
                }
            }
        }
        plan.authorize(&checks)?;
        Ok(container.remove_member(member)?)
    }
}

/// An out-of-bounds error that reports only the members that may be read
fn out_of_bounds(container: &Container, checks: &Checks, index: usize) -> PermissionsError {
    let size = match checks.read_graph() {
        Ok(true) => container
            .memberships()
            .iter()
            .filter(|(_, triple)| checks.can(Action::Read, triple))
            .count(),
        Ok(false) => 0,
        Err(denied) => return denied.into(),
    };
    GraphError::IndexOutOfBounds { index, size }.into()
}

/// The membership triple at `index`, reporting a missing one with the
/// readable size
fn membership(container: &Container, checks: &Checks, index: u32) -> PermissionsResult<Triple> {
    container
        .membership(index)
        .map_err(|_| out_of_bounds(container, checks, index as usize))
}

fn previous_value(
    container: &Container,
    context: &Arc<SecurityContext>,
    previous: Triple,
) -> Option<SecuredNode> {
    Checks::new(context)
        .can(Action::Read, &previous)
        .then(|| SecuredNode::new(previous.object, container.model(), context.clone()))
}

macro_rules! secured_container {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $name {
            container: Container,
            context: Arc<SecurityContext>,
        }

        impl $name {
            pub(crate) fn new(container: Container, context: Arc<SecurityContext>) -> Self {
                Self { container, context }
            }

            /// Unwrap into the base container
            pub fn into_base(self) -> Container {
                self.container
            }
        }

        impl SecuredItem for $name {
            type Base = Container;

            fn base_item(&self) -> &Container {
                &self.container
            }

            fn context(&self) -> &Arc<SecurityContext> {
                &self.context
            }
        }

        impl SecuredContainer for $name {}

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_tuple(stringify!($name))
                    .field(self.container.node())
                    .finish()
            }
        }
    };
}

secured_container!(
    /// A secured unordered container
    SecuredBag
);

secured_container!(
    /// A secured ordered container. Ordinals start at 1.
    SecuredSeq
);

secured_container!(
    /// A secured alternative: a container whose first member is its default
    SecuredAlt
);

impl SecuredSeq {
    /// The member at `index`. A member that may not be read is reported as
    /// out of bounds in soft mode.
    pub fn get(&self, index: u32) -> PermissionsResult<SecuredNode> {
        let checks = Checks::new(&self.context);
        let triple = membership(&self.container, &checks, index)?;
        if checks.read(&triple)? {
            return Ok(SecuredNode::new(
                triple.object,
                self.container.model(),
                self.context.clone(),
            ));
        }
        Err(out_of_bounds(&self.container, &checks, index as usize))
    }

    /// Replace the member at `index`, authorized as a single update. Returns
    /// the previous member if it may be read.
    pub fn set(&self, index: u32, value: impl Into<Node>) -> PermissionsResult<Option<SecuredNode>> {
        let value = value.into();
        let checks = Checks::new(&self.context);
        checks.require_graph(Action::Update)?;
        let previous = membership(&self.container, &checks, index)?;
        Plan::new()
            .update(previous.clone(), previous.with_object(value.clone()))
            .authorize(&checks)?;

        self.container.set(index, value)?;
        Ok(previous_value(&self.container, &self.context, previous))
    }

    /// Insert a member at `index`, shifting later members up. Requires
    /// [`crate::Action::Create`] on the new membership and
    /// [`crate::Action::Update`] on every shifted one.
    pub fn insert(&self, index: u32, value: impl Into<Node>) -> PermissionsResult<()> {
        let value = value.into();
        let checks = Checks::new(&self.context);
        checks.require_graph(Action::Update)?;
        if index == 0 || index as usize > self.container.size() + 1 {
            return Err(out_of_bounds(&self.container, &checks, index as usize));
        }

        let (from, to) = self.container.shifted(|ordinal| ordinal >= index, 1);
        let mut plan = Plan::new().create(self.container.member_triple(index, &value));
        for (from, to) in from.into_iter().zip(to) {
            plan = plan.update(from, to);
        }
        plan.authorize(&checks)?;
        Ok(self.container.insert(index, value)?)
    }

    /// Remove the member at `index`, shifting later members down. Requires
    /// [`crate::Action::Delete`] on the removed membership and
    /// [`crate::Action::Update`] on every shifted one. Returns the removed
    /// member if it may be read.
    pub fn remove_at(&self, index: u32) -> PermissionsResult<Option<SecuredNode>> {
        let checks = Checks::new(&self.context);
        checks.require_graph(Action::Update)?;
        let removed = membership(&self.container, &checks, index)?;
        let (from, to) = self.container.shifted(|ordinal| ordinal > index, -1);
        let mut plan = Plan::new().delete(removed.clone());
        for (from, to) in from.into_iter().zip(to) {
            plan = plan.update(from, to);
        }
        plan.authorize(&checks)?;

        self.container.remove_at(index)?;
        Ok(previous_value(&self.container, &self.context, removed))
    }
}

impl SecuredAlt {
    /// The default (first) member. When it may not be read, soft mode
    /// reports that there is no default.
    pub fn default_member(&self) -> PermissionsResult<SecuredNode> {
        let no_default = || GraphError::AltHasNoDefault(self.container.node().clone());
        let triple = self.container.membership(1).map_err(|_| no_default())?;
        if !Checks::new(&self.context).read(&triple)? {
            return Err(no_default().into());
        }
        Ok(SecuredNode::new(
            triple.object,
            self.container.model(),
            self.context.clone(),
        ))
    }

    /// Replace the default member (an update), or add one if there is none
    /// (a create)
    pub fn set_default(&self, value: impl Into<Node>) -> PermissionsResult<()> {
        let value = value.into();
        let plan = match self.container.membership(1) {
            Ok(previous) => {
                let replacement = previous.with_object(value.clone());
                Plan::new().update(previous, replacement)
            }
            Err(_) => Plan::new().create(self.container.member_triple(1, &value)),
        };
        plan.authorize(&Checks::new(&self.context))?;
        Ok(self.container.set_default(value)?)
    }
}
