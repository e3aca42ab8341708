use anyhow::Result;
use palisade_graph::{GraphError, Model, Node, Triple, vocab};
use palisade_permissions::{
    Action, Actions, PermissionsError, SecuredContainer, SecuredItem,
    helpers::{FnOracle, StaticOracle, ex, people, secured},
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn from(subject: &str, sender: &str) -> Triple {
    Triple::new(ex(subject), ex("from"), Node::literal(sender))
}

fn only_from(sender: &'static str) -> FnOracle {
    FnOracle::new(move |_, action, triple| {
        action == Action::Read && triple.is_none_or(|triple| triple.object == Node::literal(sender))
    })
}

proptest! {
    #[test]
    fn only_readable_statements_are_listed(others in 0usize..40) {
        let model = Model::memory();
        for index in 0..4 {
            model.add(from(&format!("bob{index}"), "bob"))?;
        }
        for index in 0..others {
            model.add(from(&format!("carol{index}"), "carol"))?;
        }

        let view = secured(&model, only_from("bob"));
        let pattern = Triple::new(Node::Any, ex("from"), Node::Any);

        prop_assert_eq!(view.list_statements(&pattern)?.count(), 4);
        prop_assert_eq!(view.size()?, 4);
        prop_assert_eq!(model.size(), 4 + others);
    }

    #[test]
    fn contains_agrees_with_the_oracle(stored in any::<u8>(), readable in any::<u8>()) {
        let triples: Vec<Triple> = (0..8)
            .map(|index| from(&format!("message{index}"), &format!("sender{index}")))
            .collect();
        let model = Model::memory();
        let mut visible = Vec::new();
        for (index, triple) in triples.iter().enumerate() {
            if stored & (1 << index) != 0 {
                model.add(triple.clone())?;
            }
            if readable & (1 << index) != 0 {
                visible.push(triple.clone());
            }
        }

        let expected = visible.iter().filter(|triple| model.contains(triple)).count();
        let view = secured(
            &model,
            FnOracle::new(move |_, action, triple| {
                action == Action::Read && triple.is_none_or(|triple| visible.contains(triple))
            }),
        );

        for (index, triple) in triples.iter().enumerate() {
            let bit = 1 << index;
            prop_assert_eq!(view.contains(triple)?, stored & bit != 0 && readable & bit != 0);
        }
        prop_assert_eq!(view.size()?, expected);
        prop_assert_eq!(view.is_empty()?, expected == 0);
    }

    #[test]
    fn has_next_never_skips_or_repeats(peeks in 1usize..5, readable in any::<u8>()) {
        let model = Model::memory();
        for index in 0..8 {
            model.add(from(&format!("message{index}"), &format!("sender{index}")))?;
        }
        let view = secured(
            &model,
            FnOracle::new(move |_, action, triple| {
                action == Action::Read
                    && triple.is_none_or(|triple| {
                        (0..8).any(|index| {
                            readable & (1 << index) != 0
                                && triple.object == Node::literal(format!("sender{index}"))
                        })
                    })
            }),
        );

        let expected: Vec<Triple> = view.list_triples(&Triple::ANY)?.collect();
        let mut peeked = Vec::new();
        let mut iter = view.list_triples(&Triple::ANY)?;
        loop {
            let mut answer = false;
            for _ in 0..peeks {
                answer = iter.has_next();
            }
            if !answer {
                break;
            }
            peeked.push(iter.next_required()?);
        }

        prop_assert_eq!(expected.len(), readable.count_ones() as usize);
        prop_assert_eq!(peeked, expected);
        prop_assert!(iter.is_closed());
    }
}

#[test_log::test]
fn soft_mode_answers_as_though_nothing_were_there() -> Result<()> {
    let model = people(&["Alice", "Bob"])?;
    let view = secured(&model, StaticOracle::none().soft());
    let alice = Triple::new(ex("alice"), ex("name"), Node::literal("Alice"));

    assert_eq!(view.size()?, 0);
    assert!(view.is_empty()?);
    assert!(!view.contains(&alice)?);
    assert_eq!(view.list_statements(&Triple::ANY)?.count(), 0);
    assert_eq!(view.list_subjects()?.count(), 0);
    assert!(view.get_property(&ex("alice"), &ex("name"))?.is_none());
    assert!(view.statement(alice)?.is_none());

    let missing = view.get_required_property(&ex("alice"), &ex("name"));
    assert!(matches!(
        missing,
        Err(PermissionsError::Graph(GraphError::PropertyNotFound { .. }))
    ));
    Ok(())
}

#[test_log::test]
fn hard_mode_raises_on_a_graph_read_denial() -> Result<()> {
    let model = people(&["Alice"])?;
    let view = secured(&model, StaticOracle::none());

    let denied = view.size().unwrap_err();
    assert!(denied.is_denied(Action::Read));
    assert_eq!(denied.denial().and_then(|denied| denied.triple()), None);

    assert!(view.list_statements(&Triple::ANY).is_err());
    assert!(view.contains(&Triple::ANY).is_err());
    Ok(())
}

#[test_log::test]
fn hidden_statements_are_filtered_in_hard_mode_too() -> Result<()> {
    let model = people(&["Alice", "Bob"])?;
    let view = secured(&model, FnOracle::new(|_, _, triple| triple.is_none()));
    let alice = Triple::new(ex("alice"), ex("name"), Node::literal("Alice"));

    assert_eq!(view.size()?, 0);
    assert!(view.is_empty()?);
    assert!(!view.contains(&alice)?);
    assert!(!view.contains(&Triple::new(ex("alice"), Node::Any, Node::Any))?);
    assert_eq!(view.list_triples(&Triple::ANY)?.count(), 0);

    let denied = view
        .get_required_property(&ex("alice"), &ex("name"))
        .unwrap_err();
    assert!(denied.is_denied(Action::Read));
    assert_eq!(denied.denial().and_then(|denied| denied.triple()), Some(&alice));

    assert!(view.statement(alice).is_err());
    Ok(())
}

#[test_log::test]
fn subjects_and_objects_come_from_readable_statements() -> Result<()> {
    let model = people(&["Alice", "Bob", "Carol"])?;
    model.add(Triple::new(ex("alice"), ex("knows"), ex("bob")))?;
    let view = secured(
        &model,
        FnOracle::new(|_, action, triple| {
            action == Action::Read && triple.is_none_or(|triple| triple.subject == ex("alice"))
        }),
    );

    let subjects: Vec<Node> = view
        .list_subjects()?
        .map(|subject| subject.node().clone())
        .collect();
    assert_eq!(subjects, vec![ex("alice")]);

    let mut objects: Vec<Node> = view.list_objects()?.map(|object| object.node()).collect();
    objects.sort();
    let mut expected = vec![ex("bob"), Node::literal("Alice")];
    expected.sort();
    assert_eq!(objects, expected);

    let knows: Vec<Node> = view
        .list_subjects_with_property(&ex("knows"), Some(&ex("bob")))?
        .map(|subject| subject.node().clone())
        .collect();
    assert_eq!(knows, vec![ex("alice")]);
    Ok(())
}

#[test_log::test]
fn set_operations_only_use_what_each_side_reveals() -> Result<()> {
    let left = people(&["Alice", "Bob"])?;
    let right = people(&["Alice", "Bob"])?;
    let alice = Triple::new(ex("alice"), ex("name"), Node::literal("Alice"));
    let bob = Triple::new(ex("bob"), ex("name"), Node::literal("Bob"));

    let view = secured(&left, only_from_alice());

    assert_eq!(view.intersection(&right)?.triples(), vec![alice.clone()]);
    assert_eq!(view.difference(&right)?.size(), 0);
    assert_eq!(view.union(&Model::memory())?.triples(), vec![alice.clone()]);

    let other = secured(&right, only_from_bob());
    assert_eq!(view.intersection(&other)?.size(), 0);
    assert_eq!(view.difference(&other)?.triples(), vec![alice.clone()]);
    let mut union = view.union(&other)?.triples();
    union.sort();
    let mut expected = vec![alice, bob];
    expected.sort();
    assert_eq!(union, expected);

    assert!(!view.contains_any(&other)?);
    assert!(view.contains_all(&Model::memory())?);
    Ok(())
}

fn only_from_alice() -> FnOracle {
    FnOracle::new(|_, action, triple| {
        action == Action::Read && triple.is_none_or(|triple| triple.subject == ex("alice"))
    })
}

fn only_from_bob() -> FnOracle {
    FnOracle::new(|_, action, triple| {
        action == Action::Read && triple.is_none_or(|triple| triple.subject == ex("bob"))
    })
}

#[test_log::test]
fn the_base_item_is_the_wrapped_element() -> Result<()> {
    let model = people(&["Alice"])?;
    let view = secured(&model, StaticOracle::all());

    assert_eq!(*view.base_item(), model);
    let statement = view
        .get_property(&ex("alice"), &ex("name"))?
        .ok_or_else(|| anyhow::anyhow!("alice has no name"))?;
    assert_eq!(
        statement.base_item().triple(),
        &Triple::new(ex("alice"), ex("name"), Node::literal("Alice"))
    );
    let resource = view.resource(ex("alice"))?;
    assert_eq!(resource.base_item().node(), &ex("alice"));
    assert!(std::ptr::eq(resource.base_item(), resource.base_item()));
    Ok(())
}

#[test_log::test]
fn can_questions_answer_without_raising() -> Result<()> {
    let model = people(&["Alice"])?;
    let view = secured(&model, StaticOracle::new([Action::Read]));
    let alice = Triple::new(ex("alice"), ex("name"), Node::literal("Alice"));

    assert!(view.can_read());
    assert!(!view.can_update());
    assert!(view.can_read_statement(&alice));
    assert!(!view.can_delete_statement(&alice));
    Ok(())
}

#[test_log::test]
fn enumerations_can_require_more_than_read() -> Result<()> {
    let model = people(&["Alice", "Bob"])?;
    let writer = secured(&model, StaticOracle::all());
    let seq = writer.create_seq(Some("http://example.com/seq"))?;
    for value in ["a", "b", "c"] {
        seq.add(Node::literal(value))?;
    }
    let list = writer.create_list(["a", "b", "c"].map(|value| Node::literal(value)))?;
    let update = Actions::from([Action::Update]);

    let view = secured(
        &model,
        FnOracle::new(|_, action, triple| {
            action != Action::Update
                || triple.is_none_or(|triple| {
                    !triple.object.is_any()
                        && triple.subject != ex("bob")
                        && triple.object != Node::literal("b")
                })
        }),
    );
    let names = Triple::new(Node::Any, ex("name"), Node::Any);

    assert_eq!(view.list_statements(&names)?.count(), 2);
    let updatable: Vec<Node> = view
        .list_statements_with(&names, update)?
        .map(|statement| statement.base_item().triple().subject.clone())
        .collect();
    assert_eq!(updatable, vec![ex("alice")]);

    let members: Vec<Node> = view
        .get_seq(&ex("seq"))?
        .members_with(update)?
        .map(|member| member.node())
        .collect();
    assert_eq!(members, vec![Node::literal("a"), Node::literal("c")]);

    let cells: Vec<Node> = view
        .get_list(list.node())?
        .iter_with(update)?
        .map(|value| value.node())
        .collect();
    assert_eq!(cells, vec![Node::literal("a"), Node::literal("c")]);
    Ok(())
}

#[test_log::test]
fn a_graph_that_refuses_updates_has_nothing_to_update() -> Result<()> {
    let model = people(&["Alice", "Bob"])?;
    let writer = secured(&model, StaticOracle::all());
    let seq = writer.create_seq(Some("http://example.com/seq"))?;
    seq.add(Node::literal("a"))?;
    let update = Actions::from([Action::Update]);

    let view = secured(
        &model,
        FnOracle::new(|_, action, triple| triple.is_some() || action != Action::Update),
    );

    assert_eq!(view.list_statements(&Triple::ANY)?.count(), model.size());
    assert_eq!(view.list_statements_with(&Triple::ANY, update)?.count(), 0);
    assert_eq!(view.list_triples_with(&Triple::ANY, update)?.count(), 0);

    let seq = view.get_seq(&ex("seq"))?;
    assert_eq!(seq.members()?.count(), 1);
    assert_eq!(seq.members_with(update)?.count(), 0);
    Ok(())
}

fn hiding_types() -> FnOracle {
    FnOracle::new(|_, action, triple| {
        action != Action::Read
            || triple.is_none_or(|triple| {
                !triple.predicate.is_any() && triple.predicate != vocab::rdf_type()
            })
    })
}

#[test_log::test]
fn resources_can_be_viewed_as_collections() -> Result<()> {
    let model = people(&["Alice"])?;
    let writer = secured(&model, StaticOracle::all());
    writer.create_seq(Some("http://example.com/seq"))?;
    writer.create_bag(Some("http://example.com/bag"))?;
    writer.create_alt(Some("http://example.com/alt"))?;
    let list = writer.create_list([Node::literal("a")])?;

    let seq = writer.resource(ex("seq"))?;
    assert!(seq.try_as_seq()?.is_some());
    assert!(seq.try_as_bag()?.is_none());
    assert!(seq.try_as_alt()?.is_none());
    assert!(writer.resource(ex("bag"))?.try_as_bag()?.is_some());
    assert!(writer.resource(ex("alt"))?.try_as_alt()?.is_some());

    assert!(writer.resource(list.node().clone())?.try_as_list()?.is_some());
    assert!(writer.resource(vocab::nil())?.try_as_list()?.is_some());
    let alice = writer.resource(ex("alice"))?;
    assert!(alice.try_as_list()?.is_none());
    assert!(alice.try_as_seq()?.is_none());

    let soft = secured(&model, hiding_types().soft());
    assert!(soft.resource(ex("seq"))?.try_as_seq()?.is_none());
    assert!(soft.resource(ex("bag"))?.try_as_bag()?.is_none());

    let hard = secured(&model, hiding_types());
    let denied = hard.resource(ex("seq"))?.try_as_seq().unwrap_err();
    assert!(denied.is_denied(Action::Read));
    assert!(hard.resource(ex("alt"))?.try_as_alt().unwrap_err().is_denied(Action::Read));
    Ok(())
}
