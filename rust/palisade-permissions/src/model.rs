use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use palisade_graph::{
    ChangeListener, Container, ContainerKind, Enumeration, GraphError, ListenerId, Literal, Model,
    Node, ReifiedStatement, Resource, Triple, vocab,
};

use crate::{
    Action, Actions, Checks, PermissionsResult, Plan, SecuredAlt, SecuredBag, SecuredItem,
    SecuredIter, SecuredList, SecuredListener, SecuredLiteral, SecuredNode,
    SecuredReifiedStatement, SecuredResource, SecuredSeq, SecuredStatement, SecurityContext,
    future, variable,
};

/// Anything that can contribute triples to set algebra and bulk additions.
/// A [`Model`] contributes every triple it holds; a [`SecuredModel`]
/// contributes only the triples its principal may read.
pub trait TripleSource {
    /// The triples this source is willing to reveal
    fn visible_triples(&self) -> PermissionsResult<Vec<Triple>>;
}

impl TripleSource for Model {
    fn visible_triples(&self) -> PermissionsResult<Vec<Triple>> {
        Ok(self.triples())
    }
}

impl TripleSource for SecuredModel {
    fn visible_triples(&self) -> PermissionsResult<Vec<Triple>> {
        Ok(self.list_triples(&Triple::ANY)?.collect())
    }
}

/// The question put to the oracle about every triple matching `pattern`:
/// free positions are named by [`variable`]
fn pattern_question(pattern: &Triple) -> Triple {
    let bind = |node: &Node| {
        if node.is_any() {
            variable()
        } else {
            node.clone()
        }
    };
    Triple::new(
        bind(&pattern.subject),
        bind(&pattern.predicate),
        bind(&pattern.object),
    )
}

/// A [`Model`] as seen by one principal.
///
/// A secured model offers the same operations as the model it wraps, but
/// every read is filtered through the [`crate::PolicyOracle`] and every write
/// is authorized in full before it reaches the model. Everything handed out
/// (resources, statements, containers, lists, iterators) carries the same
/// [`SecurityContext`] and applies the same rules.
///
/// ```
/// # use std::sync::Arc;
/// # use palisade_graph::{Model, Node, Triple};
/// # use palisade_permissions::*;
/// let model = Model::memory();
/// model.add(Triple::new(Node::uri("urn:s"), Node::uri("urn:p"), Node::literal("o")))?;
///
/// let view = SecuredModel::new(
///     model.clone(),
///     SecurityContext::new(
///         Principal::new("guest"),
///         Arc::new(helpers::StaticOracle::none().soft()),
///         GraphId::new("urn:graph"),
///     ),
/// );
/// assert_eq!(view.size()?, 0);
/// assert_eq!(model.size(), 1);
/// # Ok::<(), PermissionsError>(())
/// ```
#[derive(Clone)]
pub struct SecuredModel {
    model: Model,
    context: Arc<SecurityContext>,
}

impl SecuredModel {
    /// Wrap `model` for the principal named in `context`
    pub fn new(model: Model, context: SecurityContext) -> Self {
        Self::with_context(model, Arc::new(context))
    }

    /// Wrap `model` with a context shared by other wrappers
    pub fn with_context(model: Model, context: Arc<SecurityContext>) -> Self {
        Self { model, context }
    }

    /// Unwrap into the base model
    pub fn into_base(self) -> Model {
        self.model
    }

    fn checks(&self) -> Checks<'_> {
        Checks::new(&self.context)
    }

    fn authorize(&self, plan: Plan) -> PermissionsResult<()> {
        Ok(plan.authorize(&self.checks())?)
    }

    fn statement_of(&self, triple: Triple) -> SecuredStatement {
        SecuredStatement::new(self.model.statement(triple), self.context.clone())
    }

    // Writes

    /// Add a triple. Requires [`Action::Update`] on the graph and
    /// [`Action::Create`] on the triple.
    pub fn add(&self, triple: Triple) -> PermissionsResult<()> {
        self.authorize(Plan::new().create(triple.clone()))?;
        Ok(self.model.add(triple)?)
    }

    /// Add several triples. Nothing is added unless every one may be
    /// created.
    pub fn add_all<I>(&self, triples: I) -> PermissionsResult<()>
    where
        I: IntoIterator<Item = Triple>,
    {
        let triples: Vec<Triple> = triples.into_iter().collect();
        self.authorize(Plan::new().create_all(triples.iter().cloned()))?;
        Ok(self.model.add_all(triples)?)
    }

    /// Add every triple `other` is willing to reveal
    pub fn add_model(&self, other: &impl TripleSource) -> PermissionsResult<()> {
        self.add_all(other.visible_triples()?)
    }

    /// Remove a triple. Requires [`Action::Update`] on the graph and
    /// [`Action::Delete`] on the triple.
    pub fn remove(&self, triple: &Triple) -> PermissionsResult<()> {
        self.authorize(Plan::new().delete(triple.clone()))?;
        Ok(self.model.remove(triple)?)
    }

    /// Remove several triples. Nothing is removed unless every one may be
    /// deleted.
    pub fn remove_statements<I>(&self, triples: I) -> PermissionsResult<()>
    where
        I: IntoIterator<Item = Triple>,
    {
        let triples: Vec<Triple> = triples.into_iter().collect();
        self.authorize(Plan::new().delete_all(triples.iter().cloned()))?;
        Ok(self.model.remove_statements(triples)?)
    }

    /// Remove every triple matching `pattern`, readable or not, returning
    /// how many were removed. Nothing is removed unless every match may be
    /// deleted.
    pub fn remove_all(&self, pattern: &Triple) -> PermissionsResult<usize> {
        let checks = self.checks();
        let matching: Vec<Triple> = self.model.find(pattern).collect();

        if matching.len() > 1 && checks.can(Action::Delete, &pattern_question(pattern)) {
            checks.require_graph(Action::Update)?;
        } else {
            Plan::new()
                .delete_all(matching.iter().cloned())
                .authorize(&checks)?;
        }

        let removed = matching.len();
        self.model.remove_statements(matching)?;
        Ok(removed)
    }

    // Reads

    /// True if a readable triple matches `pattern`. Only a refusal to read
    /// the graph as a whole raises; unreadable matches are simply not
    /// counted.
    pub fn contains(&self, pattern: &Triple) -> PermissionsResult<bool> {
        self.contains_checked(&self.checks(), pattern)
    }

    fn contains_checked(&self, checks: &Checks, pattern: &Triple) -> PermissionsResult<bool> {
        if !checks.read_graph()? {
            return Ok(false);
        }
        if pattern.is_concrete() {
            return Ok(checks.can(Action::Read, pattern) && self.model.contains(pattern));
        }
        let everything = checks.can_read_everything();
        Ok(self
            .model
            .find(pattern)
            .any(|triple| everything || checks.can(Action::Read, &triple)))
    }

    /// True if every triple `other` reveals is readable here
    pub fn contains_all(&self, other: &impl TripleSource) -> PermissionsResult<bool> {
        let checks = self.checks();
        for triple in other.visible_triples()? {
            if !self.contains_checked(&checks, &triple)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// True if some triple `other` reveals is readable here
    pub fn contains_any(&self, other: &impl TripleSource) -> PermissionsResult<bool> {
        let checks = self.checks();
        for triple in other.visible_triples()? {
            if self.contains_checked(&checks, &triple)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// The readable triples matching `pattern`
    pub fn list_triples(&self, pattern: &Triple) -> PermissionsResult<SecuredIter<Triple>> {
        self.list_triples_with(pattern, Actions::READ)
    }

    /// The triples matching `pattern` that may be read and also permit
    /// every one of `actions`
    pub fn list_triples_with(
        &self,
        pattern: &Triple,
        actions: Actions,
    ) -> PermissionsResult<SecuredIter<Triple>> {
        let actions = actions.with(Action::Read);
        if !self.checks().enumerate_graph(actions)? {
            return Ok(SecuredIter::empty(actions));
        }
        Ok(SecuredIter::statements(
            self.model.find(pattern),
            self.context.clone(),
            actions,
            |triple| triple,
        ))
    }

    /// The readable statements matching `pattern`
    pub fn list_statements(
        &self,
        pattern: &Triple,
    ) -> PermissionsResult<SecuredIter<SecuredStatement>> {
        self.list_statements_with(pattern, Actions::READ)
    }

    /// The statements matching `pattern` that may be read and also permit
    /// every one of `actions`
    pub fn list_statements_with(
        &self,
        pattern: &Triple,
        actions: Actions,
    ) -> PermissionsResult<SecuredIter<SecuredStatement>> {
        let actions = actions.with(Action::Read);
        if !self.checks().enumerate_graph(actions)? {
            return Ok(SecuredIter::empty(actions));
        }
        let context = self.context.clone();
        Ok(SecuredIter::statements(
            self.model.list_statements(pattern),
            self.context.clone(),
            actions,
            |statement| statement.triple(),
        )
        .map_items(move |statement| SecuredStatement::new(statement, context.clone())))
    }

    fn distinct<T, K, F>(triples: SecuredIter<Triple>, mut key: K, into: F) -> SecuredIter<T>
    where
        T: Send + 'static,
        K: FnMut(&Triple) -> Node + Send + 'static,
        F: FnMut(Triple) -> T + Send + 'static,
    {
        let actions = triples.actions();
        let mut seen = BTreeSet::new();
        let distinct = Enumeration::new(triples)
            .filter_items(move |triple| seen.insert(key(triple)))
            .map_items(into);
        SecuredIter::new(distinct, actions, |_| true)
    }

    /// Every distinct subject of a readable triple
    pub fn list_subjects(&self) -> PermissionsResult<SecuredIter<SecuredResource>> {
        self.list_subjects_with_property(&Node::Any, None)
    }

    /// The distinct subjects of readable triples with the given property
    /// (and, if provided, the given value)
    pub fn list_subjects_with_property(
        &self,
        property: &Node,
        value: Option<&Node>,
    ) -> PermissionsResult<SecuredIter<SecuredResource>> {
        let pattern = Triple::new(
            Node::Any,
            property.clone(),
            value.cloned().unwrap_or(Node::Any),
        );
        let model = self.model.clone();
        let context = self.context.clone();
        Ok(Self::distinct(
            self.list_triples(&pattern)?,
            |triple| triple.subject.clone(),
            move |triple| {
                SecuredResource::new(Resource::new(triple.subject, model.clone()), context.clone())
            },
        ))
    }

    /// Every distinct object of a readable triple
    pub fn list_objects(&self) -> PermissionsResult<SecuredIter<SecuredNode>> {
        self.list_objects_of_property(None, &Node::Any)
    }

    /// The distinct values of readable triples with the given property,
    /// optionally restricted to a single subject
    pub fn list_objects_of_property(
        &self,
        subject: Option<&Node>,
        property: &Node,
    ) -> PermissionsResult<SecuredIter<SecuredNode>> {
        let pattern = Triple::new(
            subject.cloned().unwrap_or(Node::Any),
            property.clone(),
            Node::Any,
        );
        let model = self.model.clone();
        let context = self.context.clone();
        Ok(Self::distinct(
            self.list_triples(&pattern)?,
            |triple| triple.object.clone(),
            move |triple| SecuredNode::new(triple.object, &model, context.clone()),
        ))
    }

    /// Some readable statement with the given subject and property
    pub fn get_property(
        &self,
        subject: &Node,
        property: &Node,
    ) -> PermissionsResult<Option<SecuredStatement>> {
        let pattern = Triple::new(subject.clone(), property.clone(), Node::Any);
        Ok(self.list_statements(&pattern)?.next())
    }

    /// Some readable statement with the given subject and property. When
    /// statements exist but none may be read, hard mode reports the read
    /// denial and soft mode reports [`GraphError::PropertyNotFound`].
    pub fn get_required_property(
        &self,
        subject: &Node,
        property: &Node,
    ) -> PermissionsResult<SecuredStatement> {
        let not_found = || GraphError::PropertyNotFound {
            subject: subject.clone(),
            property: property.clone(),
        };
        let checks = self.checks();
        if !checks.read_graph()? {
            return Err(not_found().into());
        }

        let pattern = Triple::new(subject.clone(), property.clone(), Node::Any);
        let mut denied = None;
        for triple in self.model.find(&pattern) {
            if checks.can(Action::Read, &triple) {
                return Ok(self.statement_of(triple));
            }
            denied.get_or_insert(triple);
        }
        if let Some(triple) = denied {
            checks.read(&triple)?;
        }
        Err(not_found().into())
    }

    /// The number of readable triples
    pub fn size(&self) -> PermissionsResult<usize> {
        let checks = self.checks();
        if !checks.read_graph()? {
            return Ok(0);
        }
        if checks.can_read_everything() {
            return Ok(self.model.size());
        }
        Ok(self.list_triples(&Triple::ANY)?.count())
    }

    /// True when no triple may be read
    pub fn is_empty(&self) -> PermissionsResult<bool> {
        Ok(!self.list_triples(&Triple::ANY)?.has_next())
    }

    // Set algebra

    /// A new in-memory model holding the triples readable here and the
    /// triples `other` reveals
    pub fn union(&self, other: &impl TripleSource) -> PermissionsResult<Model> {
        let result = Model::memory();
        result.add_all(self.visible_triples()?)?;
        result.add_all(other.visible_triples()?)?;
        Ok(result)
    }

    /// A new in-memory model holding the triples that are readable here and
    /// revealed by `other`
    pub fn intersection(&self, other: &impl TripleSource) -> PermissionsResult<Model> {
        let theirs: BTreeSet<Triple> = other.visible_triples()?.into_iter().collect();
        let result = Model::memory();
        result.add_all(
            self.visible_triples()?
                .into_iter()
                .filter(|triple| theirs.contains(triple)),
        )?;
        Ok(result)
    }

    /// A new in-memory model holding the triples readable here that `other`
    /// does not reveal
    pub fn difference(&self, other: &impl TripleSource) -> PermissionsResult<Model> {
        let theirs: BTreeSet<Triple> = other.visible_triples()?.into_iter().collect();
        let result = Model::memory();
        result.add_all(
            self.visible_triples()?
                .into_iter()
                .filter(|triple| !theirs.contains(triple)),
        )?;
        Ok(result)
    }

    // Factories

    /// A resource handle for an existing node. Handles reveal nothing, so
    /// no check is made.
    pub fn resource(&self, node: Node) -> PermissionsResult<SecuredResource> {
        Ok(SecuredResource::new(
            self.model.resource(node)?,
            self.context.clone(),
        ))
    }

    /// A resource handle for a URI. No triples are added.
    pub fn create_resource(&self, uri: &str) -> SecuredResource {
        SecuredResource::new(self.model.create_resource(uri), self.context.clone())
    }

    /// A resource handle for a fresh blank node. No triples are added.
    pub fn create_blank(&self) -> SecuredResource {
        SecuredResource::new(self.model.create_blank(), self.context.clone())
    }

    /// Create a resource (blank if `uri` is `None`) and assert its type
    pub fn create_typed_resource(
        &self,
        uri: Option<&str>,
        rdf_type: &Node,
    ) -> PermissionsResult<SecuredResource> {
        let subject = uri.map(Node::uri).unwrap_or_else(future);
        self.authorize(Plan::new().create(Triple::new(
            subject,
            vocab::rdf_type(),
            rdf_type.clone(),
        )))?;
        Ok(SecuredResource::new(
            self.model.create_typed_resource(uri, rdf_type)?,
            self.context.clone(),
        ))
    }

    /// A literal bound to this view
    pub fn literal(&self, value: impl Into<Literal>) -> SecuredLiteral {
        SecuredLiteral::new(value.into(), self.model.clone(), self.context.clone())
    }

    /// A statement handle for `triple`, which is not added. An existing
    /// triple must be readable (soft mode answers `None`); a handle for a
    /// triple that does not exist yet requires [`Action::Update`] on the
    /// graph and [`Action::Create`] on the triple.
    pub fn statement(&self, triple: Triple) -> PermissionsResult<Option<SecuredStatement>> {
        let checks = self.checks();
        if self.model.contains(&triple) {
            if !checks.read(&triple)? {
                return Ok(None);
            }
        } else {
            checks.require_graph(Action::Update)?;
            checks.require(Action::Create, &triple)?;
        }
        Ok(Some(self.statement_of(triple)))
    }

    // Containers

    fn create_container(&self, kind: ContainerKind, uri: Option<&str>) -> PermissionsResult<Container> {
        let subject = uri.map(Node::uri).unwrap_or_else(future);
        self.authorize(Plan::new().create(Triple::new(
            subject,
            vocab::rdf_type(),
            kind.type_node(),
        )))?;
        Ok(self.model.create_container(kind, uri)?)
    }

    fn get_container(&self, kind: ContainerKind, node: &Node) -> PermissionsResult<Container> {
        let type_triple = Triple::new(node.clone(), vocab::rdf_type(), kind.type_node());
        self.checks()
            .read_or_create(&type_triple, self.model.contains(&type_triple))?;
        Ok(self.model.get_container(kind, node)?)
    }

    /// Create a bag (blank if `uri` is `None`)
    pub fn create_bag(&self, uri: Option<&str>) -> PermissionsResult<SecuredBag> {
        Ok(SecuredBag::new(
            self.create_container(ContainerKind::Bag, uri)?,
            self.context.clone(),
        ))
    }

    /// Create a sequence (blank if `uri` is `None`)
    pub fn create_seq(&self, uri: Option<&str>) -> PermissionsResult<SecuredSeq> {
        Ok(SecuredSeq::new(
            self.create_container(ContainerKind::Seq, uri)?,
            self.context.clone(),
        ))
    }

    /// Create an alternative (blank if `uri` is `None`)
    pub fn create_alt(&self, uri: Option<&str>) -> PermissionsResult<SecuredAlt> {
        Ok(SecuredAlt::new(
            self.create_container(ContainerKind::Alt, uri)?,
            self.context.clone(),
        ))
    }

    /// View `node` as a bag. Asserting a missing type requires
    /// [`Action::Update`] and [`Action::Create`]; an existing type must be
    /// readable.
    pub fn get_bag(&self, node: &Node) -> PermissionsResult<SecuredBag> {
        Ok(SecuredBag::new(
            self.get_container(ContainerKind::Bag, node)?,
            self.context.clone(),
        ))
    }

    /// View `node` as a sequence, asserting its type if needed
    pub fn get_seq(&self, node: &Node) -> PermissionsResult<SecuredSeq> {
        Ok(SecuredSeq::new(
            self.get_container(ContainerKind::Seq, node)?,
            self.context.clone(),
        ))
    }

    /// View `node` as an alternative, asserting its type if needed
    pub fn get_alt(&self, node: &Node) -> PermissionsResult<SecuredAlt> {
        Ok(SecuredAlt::new(
            self.get_container(ContainerKind::Alt, node)?,
            self.context.clone(),
        ))
    }

    // Lists

    /// Create a list holding `values`. Every triple of every new cell must
    /// be creatable; cells are named by [`future`] when the oracle is asked.
    pub fn create_list<I>(&self, values: I) -> PermissionsResult<SecuredList>
    where
        I: IntoIterator<Item = Node>,
    {
        let values: Vec<Node> = values.into_iter().collect();
        if values.is_empty() {
            return Ok(self.nil());
        }
        self.authorize(SecuredList::cells_plan(Plan::new(), &values, vocab::nil()))?;
        Ok(SecuredList::new(
            self.model.create_list(values)?,
            self.context.clone(),
        ))
    }

    /// View `node` as a list, asserting the list type on its head cell if
    /// needed
    pub fn get_list(&self, node: &Node) -> PermissionsResult<SecuredList> {
        if *node != vocab::nil() {
            let type_triple = Triple::new(node.clone(), vocab::rdf_type(), vocab::list());
            self.checks()
                .read_or_create(&type_triple, self.model.contains(&type_triple))?;
        }
        Ok(SecuredList::new(
            self.model.get_list(node)?,
            self.context.clone(),
        ))
    }

    /// The empty list
    pub fn nil(&self) -> SecuredList {
        SecuredList::new(self.model.nil(), self.context.clone())
    }

    // Reification

    /// Reify `triple` under `uri` (or a fresh blank node). All four
    /// reification triples must be creatable.
    pub fn create_reified_statement(
        &self,
        uri: Option<&str>,
        triple: &Triple,
    ) -> PermissionsResult<SecuredReifiedStatement> {
        let node = uri.map(Node::uri).unwrap_or_else(future);
        self.authorize(
            Plan::new().create_all(ReifiedStatement::reification_triples(&node, triple)),
        )?;
        Ok(SecuredReifiedStatement::new(
            self.model.create_reified_statement(uri, triple)?,
            self.context.clone(),
        ))
    }

    /// Interpret `node` as a reification, if it is one and all four of its
    /// triples may be read
    pub fn reified_statement(
        &self,
        node: &Node,
    ) -> PermissionsResult<Option<SecuredReifiedStatement>> {
        let Some(reified) = self.model.reified_statement(node) else {
            return Ok(None);
        };
        if !self.checks().read_all(&reified.triples())? {
            return Ok(None);
        }
        Ok(Some(SecuredReifiedStatement::new(
            reified,
            self.context.clone(),
        )))
    }

    /// The reifications whose four triples may all be read, optionally
    /// restricted to those of a single triple
    pub fn list_reified_statements(
        &self,
        triple: Option<&Triple>,
    ) -> PermissionsResult<Vec<SecuredReifiedStatement>> {
        let checks = self.checks();
        if !checks.read_graph()? {
            return Ok(Vec::new());
        }
        let everything = checks.can_read_everything();
        Ok(self
            .model
            .list_reified_statements(triple)
            .into_iter()
            .filter(|reified| {
                everything
                    || reified
                        .triples()
                        .iter()
                        .all(|triple| checks.can(Action::Read, triple))
            })
            .map(|reified| SecuredReifiedStatement::new(reified, self.context.clone()))
            .collect())
    }

    /// True if `triple` has a readable reification
    pub fn is_reified(&self, triple: &Triple) -> PermissionsResult<bool> {
        Ok(!self.list_reified_statements(Some(triple))?.is_empty())
    }

    /// A readable reification of `triple`, creating one if there is none
    pub fn get_any_reified_statement(
        &self,
        triple: &Triple,
    ) -> PermissionsResult<SecuredReifiedStatement> {
        match self.list_reified_statements(Some(triple))?.into_iter().next() {
            Some(reified) => Ok(reified),
            None => self.create_reified_statement(None, triple),
        }
    }

    /// Remove every reification of `triple`, readable or not. Nothing is
    /// removed unless every reification triple may be deleted.
    pub fn remove_all_reifications(&self, triple: &Triple) -> PermissionsResult<()> {
        let triples: Vec<Triple> = self
            .model
            .list_reified_statements(Some(triple))
            .iter()
            .flat_map(|reified| reified.triples())
            .collect();
        self.authorize(Plan::new().delete_all(triples))?;
        Ok(self.model.remove_all_reifications(triple)?)
    }

    // Transactions

    /// Begin a transaction. Requires [`Action::Update`] on the graph.
    pub fn begin(&self) -> PermissionsResult<()> {
        self.checks().require_graph(Action::Update)?;
        tracing::debug!(principal = %self.context.principal(), graph = %self.context.graph(), "Beginning transaction");
        Ok(self.model.begin()?)
    }

    /// Commit the current transaction. Requires [`Action::Update`] on the
    /// graph.
    pub fn commit(&self) -> PermissionsResult<()> {
        self.checks().require_graph(Action::Update)?;
        tracing::debug!(principal = %self.context.principal(), graph = %self.context.graph(), "Committing transaction");
        Ok(self.model.commit()?)
    }

    /// Abort the current transaction. Requires [`Action::Update`] on the
    /// graph.
    pub fn abort(&self) -> PermissionsResult<()> {
        self.checks().require_graph(Action::Update)?;
        tracing::debug!(principal = %self.context.principal(), graph = %self.context.graph(), "Aborting transaction");
        Ok(self.model.abort()?)
    }

    /// True while a transaction is in progress
    pub fn in_transaction(&self) -> bool {
        self.model.in_transaction()
    }

    /// Run `work` inside a transaction, committing if it succeeds and
    /// aborting if it fails
    pub fn execute_in_transaction<T, F>(&self, work: F) -> PermissionsResult<T>
    where
        F: FnOnce(&SecuredModel) -> PermissionsResult<T>,
    {
        self.begin()?;
        match work(self) {
            Ok(value) => {
                self.commit()?;
                Ok(value)
            }
            Err(error) => {
                self.abort()?;
                Err(error)
            }
        }
    }

    // Listeners

    /// Register a listener that will only be told about triples this
    /// principal may read. In hard mode, registering requires that the graph
    /// may be read.
    pub fn register(&self, listener: Arc<dyn ChangeListener>) -> PermissionsResult<ListenerId> {
        self.checks().read_graph()?;
        Ok(self.model.register(Arc::new(SecuredListener::new(
            listener,
            self.context.clone(),
        ))))
    }

    /// Unregister a listener
    pub fn unregister(&self, id: ListenerId) -> bool {
        self.model.unregister(id)
    }

    /// Deliver an application-defined event to every listener
    pub fn notify_event(&self, event: impl Into<String>) {
        self.model.notify_event(event)
    }

    // Prefixes

    fn prefixes_readable(&self) -> bool {
        self.checks().can_graph(Action::Read)
    }

    /// The namespace bound to `prefix`, while the graph may be read
    pub fn prefix_uri(&self, prefix: &str) -> Option<String> {
        self.prefixes_readable()
            .then(|| self.model.prefixes().ns_prefix_uri(prefix))
            .flatten()
    }

    /// The prefix bound to the namespace `uri`, while the graph may be read
    pub fn uri_prefix(&self, uri: &str) -> Option<String> {
        self.prefixes_readable()
            .then(|| self.model.prefixes().ns_uri_prefix(uri))
            .flatten()
    }

    /// Every prefix binding, or none while the graph may not be read
    pub fn prefix_map(&self) -> BTreeMap<String, String> {
        if !self.prefixes_readable() {
            return BTreeMap::new();
        }
        self.model.prefixes().prefix_map()
    }

    /// Expand a prefixed name. Left unchanged while the graph may not be
    /// read.
    pub fn expand_prefix(&self, prefixed: &str) -> String {
        if !self.prefixes_readable() {
            return prefixed.to_owned();
        }
        self.model.prefixes().expand_prefix(prefixed)
    }

    /// Abbreviate a URI with a bound prefix, while the graph may be read
    pub fn qname_for(&self, uri: &str) -> Option<String> {
        self.prefixes_readable()
            .then(|| self.model.prefixes().qname_for(uri))
            .flatten()
    }

    /// Bind `prefix` to a namespace. Requires [`Action::Update`] on the
    /// graph.
    pub fn set_prefix(&self, prefix: &str, uri: &str) -> PermissionsResult<()> {
        self.checks().require_graph(Action::Update)?;
        self.model.prefixes().set_prefix(prefix, uri);
        Ok(())
    }

    /// Remove the binding for `prefix`. Requires [`Action::Update`] on the
    /// graph.
    pub fn remove_prefix(&self, prefix: &str) -> PermissionsResult<Option<String>> {
        self.checks().require_graph(Action::Update)?;
        Ok(self.model.prefixes().remove_prefix(prefix))
    }
}

impl SecuredItem for SecuredModel {
    type Base = Model;

    fn base_item(&self) -> &Model {
        &self.model
    }

    fn context(&self) -> &Arc<SecurityContext> {
        &self.context
    }
}

impl std::fmt::Debug for SecuredModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecuredModel")
            .field("model", &self.model)
            .field("context", &self.context)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use palisade_graph::MemoryGraph;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        GraphId, Principal,
        helpers::{CountingOracle, FnOracle, StaticOracle, TEST_GRAPH, ex, people, secured},
    };

    #[test]
    fn it_closes_the_cursors_it_opens() -> anyhow::Result<()> {
        let graph = Arc::new(MemoryGraph::default());
        let model = Model::new(graph.clone());
        model.add_all([
            Triple::new(ex("a"), ex("p"), Node::literal(1)),
            Triple::new(ex("b"), ex("p"), Node::literal(2)),
        ])?;
        let view = secured(
            &model,
            FnOracle::new(|_, _, triple| triple.is_none_or(|triple| triple.subject == ex("a"))),
        );

        let mut subjects = view.list_subjects()?;
        assert!(subjects.has_next());
        assert_eq!(graph.open_cursors(), 1);
        subjects.close();
        assert_eq!(graph.open_cursors(), 0);

        assert!(view.contains(&Triple::new(ex("a"), Node::Any, Node::Any))?);
        assert!(!view.contains(&Triple::new(ex("b"), Node::Any, Node::Any))?);
        assert_eq!(graph.open_cursors(), 0);
        Ok(())
    }

    #[test]
    fn bulk_deletes_ask_about_the_pattern() -> anyhow::Result<()> {
        let model = people(&["Alice", "Bob", "Carol"])?;
        let oracle = Arc::new(CountingOracle::new(StaticOracle::all()));
        let view = SecuredModel::new(
            model.clone(),
            SecurityContext::new(
                Principal::new("alice"),
                oracle.clone(),
                GraphId::new(TEST_GRAPH),
            ),
        );

        assert_eq!(view.remove_all(&Triple::new(Node::Any, ex("name"), Node::Any))?, 3);
        assert_eq!(oracle.calls(), 2);
        assert!(model.is_empty());
        Ok(())
    }
}
