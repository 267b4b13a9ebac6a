use storyweave::{
    host::memory::{MemoryHost, MemoryStore},
    *,
};

fn lamp(state: &StoryState) -> String {
    state
        .get("lamp")
        .and_then(|value| value.as_text())
        .unwrap_or("missing")
        .to_string()
}

fn story() -> Story<MemoryStore> {
    let store = MemoryStore::new()
        .with_unit("Hall", "The lamp is {0}.")
        .with_unit("Cellar", "Down here the lamp is {0} too.");

    let mut story = Story::new(store);

    let hall = story.set_sub_count("Hall", 1).unwrap();
    story.set_sub_count("Cellar", 1).unwrap();

    story.set_subs("Hall", vec![TextSub::computed(lamp)]).unwrap();
    story
        .set_subs("Cellar", vec![TextSub::computed(lamp)])
        .unwrap();

    story
        .add_link_with(
            hall,
            "light the lamp",
            OutcomeBuilder::to("Cellar").effect(|state| {
                state.set("lamp", "lit");
            }),
        )
        .unwrap();

    story
}

#[test]
pub fn computed_substitutions_read_the_live_variables() {
    let mut session = Session::new(story(), MemoryHost::new(), "Hall");
    session.page_mut().set_continuous(true);
    session.state_mut().set("lamp", "unlit");

    session.start().unwrap();
    session.take_action("Hall", 0).unwrap();

    assert_eq!(
        session.host().renderer.transcript(),
        vec!["The lamp is unlit.", "****", "Down here the lamp is lit too."]
    );
}

#[test]
pub fn rebuilt_units_show_the_variables_from_when_they_were_rendered() {
    let mut session = Session::new(story(), MemoryHost::new(), "Hall");
    session.page_mut().set_continuous(true);
    session.state_mut().set("lamp", "unlit");

    session.start().unwrap();
    session.take_action("Hall", 0).unwrap();

    let transcript = session.host().renderer.transcript();

    session.rebuild_after_reload().unwrap();

    assert_eq!(session.host().renderer.transcript(), transcript);
    assert_eq!(
        session.state().get("lamp").and_then(|value| value.as_text()),
        Some("lit")
    );
}

#[test]
pub fn substitution_count_can_only_be_set_once() {
    let mut story = story();

    match story.set_sub_count("Hall", 2) {
        Err(EngineError::State(StateError::SubCountAlreadySet { unit, count })) => {
            assert_eq!(unit, "Hall");
            assert_eq!(count, 1);
        }
        other => panic!("expected an error, got {:?}", other),
    }
}

#[test]
pub fn setting_the_wrong_number_of_substitutions_yields_error() {
    let mut story = story();

    let err = story
        .set_subs("Hall", vec![TextSub::from("one"), TextSub::from("two")])
        .unwrap_err();

    assert_eq!(
        err.kind,
        ValidationErrorKind::WrongSubstitutionCount {
            expected: 1,
            found: 2
        }
    );
}

#[test]
pub fn units_missing_placeholders_fail_to_render() {
    let store = MemoryStore::new().with_unit("Hall", "Only {0} here.");

    let mut story = Story::new(store);
    story.set_sub_count("Hall", 2).unwrap();
    story
        .set_subs("Hall", vec![TextSub::from("one"), TextSub::from("two")])
        .unwrap();

    let mut session = Session::new(story, MemoryHost::new(), "Hall");

    match session.start() {
        Err(EngineError::Markup(err)) => assert_eq!(
            err.kind,
            MarkupErrorKind::TooFewSubstitutions {
                expected: 2,
                found: 1
            }
        ),
        other => panic!("expected a markup error, got {:?}", other),
    }

    assert_eq!(session.current(), None);
}

#[test]
pub fn preprocessors_transform_the_raw_text() {
    let mut session = Session::new(story(), MemoryHost::new(), "Hall");
    session.state_mut().set("lamp", "dim");
    session.add_preprocessor("Hall", |text| text.replace("lamp", "lantern"));

    session.start().unwrap();

    assert_eq!(
        session.host().renderer.transcript(),
        vec!["The lantern is dim."]
    );
}

#[test]
pub fn detail_links_reveal_their_descriptions() {
    let store = MemoryStore::new()
        .with_unit("Hall", "A {portrait|portrait} hangs here.{?portrait|A stern face.}");

    let mut story = Story::new(store);
    story.make_node("Hall").unwrap();

    let mut session = Session::new(story, MemoryHost::new(), "Hall");
    session.start().unwrap();

    let unit = &session.rendered()[0];
    assert_eq!(unit.texts(), vec!["A portrait hangs here."]);
    assert!(unit.paragraphs[0].0.iter().any(|fragment| matches!(
        fragment,
        Fragment::DetailLink { description, element_id, .. }
            if description == "A stern face." && element_id == "passage-hall-examine-portrait"
    )));
}
