use std::sync::Arc;

use anyhow::Result;
use palisade_graph::{Change, GraphError, Model, Node, Triple};
use palisade_permissions::{
    Action, GraphId, PermissionsError, Principal, ReadMode, SecuredItem, SecuredModel,
    SecurityContext, ViewSettings,
    helpers::{CountingOracle, FnOracle, StaticOracle, TEST_GRAPH, ex, people, secured},
};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use testresult::TestResult;

fn note(value: &str) -> Triple {
    Triple::new(ex("a"), ex("note"), Node::literal(value))
}

#[test_log::test]
fn transactions_need_update_on_the_graph() -> TestResult {
    let model = Model::memory();
    let reader = secured(&model, StaticOracle::new([Action::Read]));

    assert!(reader.begin().unwrap_err().is_denied(Action::Update));
    assert!(!model.in_transaction());
    let refused = reader.execute_in_transaction(|view| view.size());
    assert!(refused.unwrap_err().is_denied(Action::Update));

    let writer = secured(&model, StaticOracle::all());
    writer.execute_in_transaction(|view| view.add(note("kept")))?;
    assert!(model.contains(&note("kept")));
    assert!(!writer.in_transaction());

    let failed = writer.execute_in_transaction(|view| {
        view.add(note("discarded"))?;
        Err::<(), _>(PermissionsError::from(GraphError::Transaction(
            "stopped by the caller".into(),
        )))
    });
    assert!(failed.is_err());
    assert!(!model.contains(&note("discarded")));
    assert!(model.contains(&note("kept")));
    Ok(())
}

#[test_log::test]
fn a_refused_write_inside_a_transaction_rolls_back() -> TestResult {
    let model = Model::memory();
    let view = secured(
        &model,
        FnOracle::new(|_, action, triple| {
            action != Action::Create || triple.is_none_or(|triple| *triple != note("forbidden"))
        }),
    );

    let result = view.execute_in_transaction(|view| {
        view.add(note("allowed"))?;
        view.add(note("forbidden"))
    });

    assert!(result.unwrap_err().is_denied(Action::Create));
    assert!(model.is_empty());
    Ok(())
}

#[test_log::test]
fn listeners_only_hear_about_readable_changes() -> TestResult {
    let model = Model::memory();
    let view = secured(
        &model,
        FnOracle::new(|_, action, triple| {
            action == Action::Read
                && triple.is_none_or(|triple| !triple.object.is_any() && *triple != note("secret"))
        }),
    );
    let heard = Arc::new(Mutex::new(Vec::new()));
    let sink = heard.clone();
    let id = view.register(Arc::new(move |change: &Change| sink.lock().push(change.clone())))?;

    model.add_all([note("public"), note("secret")])?;
    model.add(note("secret"))?;
    model.remove(&note("secret"))?;
    view.notify_event("saved");

    assert_eq!(
        *heard.lock(),
        vec![
            Change::Added(vec![note("public")]),
            Change::Event("saved".into()),
        ]
    );

    assert!(view.unregister(id));
    model.add(note("later"))?;
    assert_eq!(heard.lock().len(), 2);
    Ok(())
}

#[test_log::test]
fn registering_a_listener_follows_the_read_mode() -> TestResult {
    let model = Model::memory();

    let hard = secured(&model, StaticOracle::none());
    assert!(hard.register(Arc::new(|_: &Change| {})).unwrap_err().is_denied(Action::Read));

    let heard = Arc::new(Mutex::new(0usize));
    let sink = heard.clone();
    let soft = secured(&model, StaticOracle::none().soft());
    soft.register(Arc::new(move |_: &Change| *sink.lock() += 1))?;

    model.add(note("unseen"))?;
    model.notify_event("unseen");
    assert_eq!(*heard.lock(), 0);
    Ok(())
}

#[test_log::test]
fn prefixes_are_readable_with_the_graph() -> TestResult {
    let model = Model::memory();
    model.prefixes().set_prefix("ex", "http://example.com/");

    let hidden = secured(&model, StaticOracle::none());
    assert_eq!(hidden.prefix_uri("ex"), None);
    assert_eq!(hidden.uri_prefix("http://example.com/"), None);
    assert!(hidden.prefix_map().is_empty());
    assert_eq!(hidden.expand_prefix("ex:alice"), "ex:alice");
    assert_eq!(hidden.qname_for("http://example.com/alice"), None);
    assert!(hidden.set_prefix("other", "urn:other:").unwrap_err().is_denied(Action::Update));

    let reader = secured(&model, StaticOracle::new([Action::Read]));
    assert_eq!(reader.prefix_uri("ex"), Some("http://example.com/".to_owned()));
    assert_eq!(reader.uri_prefix("http://example.com/"), Some("ex".to_owned()));
    assert_eq!(reader.expand_prefix("ex:alice"), "http://example.com/alice");
    assert_eq!(reader.qname_for("http://example.com/alice"), Some("ex:alice".to_owned()));
    assert!(reader.remove_prefix("ex").unwrap_err().is_denied(Action::Update));

    let writer = secured(&model, StaticOracle::all());
    writer.set_prefix("other", "urn:other:")?;
    assert_eq!(writer.remove_prefix("ex")?, Some("http://example.com/".to_owned()));
    assert_eq!(
        writer.prefix_map().into_iter().collect::<Vec<_>>(),
        vec![("other".to_owned(), "urn:other:".to_owned())]
    );
    Ok(())
}

#[test_log::test]
fn settings_choose_the_graph_and_read_mode() -> Result<()> {
    let settings = ViewSettings::from_json(r#"{ "graph": "http://example.com/other" }"#)?;
    assert_eq!(settings.read_mode, None);

    let context = SecurityContext::from_settings(
        &settings,
        Principal::new("alice"),
        Arc::new(StaticOracle::none()),
    );
    assert_eq!(context.graph(), &GraphId::new("http://example.com/other"));
    assert_eq!(context.read_mode(), ReadMode::HardError);

    let soft = ViewSettings::from_json(
        r#"{ "graph": "http://example.com/other", "read_mode": "soft_filter" }"#,
    )?;
    let context = SecurityContext::from_settings(
        &soft,
        Principal::new("alice"),
        Arc::new(StaticOracle::none()),
    );
    let view = SecuredModel::new(people(&["Alice"])?, context);
    assert!(!view.is_hard_read_error());
    assert_eq!(view.size()?, 0);
    Ok(())
}

#[test_log::test]
fn every_wrapper_shares_the_view_context() -> Result<()> {
    let model = people(&["Alice"])?;
    let view = secured(&model, StaticOracle::all());
    let statement = view
        .get_property(&ex("alice"), &ex("name"))?
        .ok_or_else(|| anyhow::anyhow!("alice has a name"))?;

    assert_eq!(statement.graph_id(), &GraphId::new(TEST_GRAPH));
    assert!(Arc::ptr_eq(statement.context(), view.context()));
    let subject = statement
        .subject()?
        .ok_or_else(|| anyhow::anyhow!("the subject is readable"))?;
    assert!(Arc::ptr_eq(subject.context(), view.context()));
    assert_eq!(subject.model().base_item(), &model);
    Ok(())
}

#[test_log::test]
fn questions_are_asked_once_per_operation() -> Result<()> {
    let model = people(&["Alice", "Bob", "Carol", "Dave"])?;
    let oracle = Arc::new(CountingOracle::new(StaticOracle::all()));
    let view = SecuredModel::new(
        model.clone(),
        SecurityContext::new(
            Principal::new("alice"),
            oracle.clone(),
            GraphId::new(TEST_GRAPH),
        ),
    );

    let alice = Triple::new(ex("alice"), ex("name"), Node::literal("Alice"));
    view.statement(alice)?;
    let first = oracle.calls();
    assert_eq!(first, 2);

    view.size()?;
    assert_eq!(oracle.calls(), first + 2);

    let before = oracle.calls();
    assert!(view.contains_all(&model)?);
    assert_eq!(oracle.calls(), before + 1 + 4);

    let before = oracle.calls();
    assert!(!view.contains_any(&people(&["Xavier", "Zed"])?)?);
    assert_eq!(oracle.calls(), before + 1 + 2);
    Ok(())
}
