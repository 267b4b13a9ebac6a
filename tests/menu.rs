use storyweave::{
    host::{
        memory::{MemoryHost, MemoryStore},
        Saves,
    },
    log::{MessageKind, Warning},
    *,
};

fn story() -> Story<MemoryStore> {
    let store = MemoryStore::new()
        .with_unit("Title", "A tale of two rooms.")
        .with_unit("Hall", "A long hall.")
        .with_unit("Cellar", "A damp cellar.")
        .with_unit("Help", "How to play.");

    let mut story = Story::new(store);

    story.make_node("Title").unwrap();

    let hall = story.make_node("Hall").unwrap();
    story.add_link(hall, "go down", "Cellar").unwrap();

    story
}

fn session() -> Session<MemoryStore, MemoryHost> {
    let mut session = Session::new(story(), MemoryHost::new(), "Title");

    session.on_begin(OutcomeBuilder::to("Hall")).unwrap();
    session.add_info_link("help", "Help").unwrap();
    session.start().unwrap();

    session
}

fn menu_labels(session: &Session<MemoryStore, MemoryHost>) -> Vec<String> {
    session
        .host()
        .renderer
        .menu_links()
        .iter()
        .map(|link| link.label.clone())
        .collect()
}

#[test]
pub fn the_beginning_offers_to_begin_the_story() {
    let mut session = session();

    assert_eq!(session.current(), Some("Title"));
    assert_eq!(menu_labels(&session), vec!["begin", "load", "save"]);

    session.take_action("StoryMenu", 0).unwrap();

    assert_eq!(session.current(), Some("Hall"));
    assert!(session.path().is_empty());
    assert!(session.host().has(Slot::Auto));
    assert_eq!(
        menu_labels(&session),
        vec!["help", "restart", "load", "save"]
    );
}

#[test]
pub fn fixed_actions_stay_at_the_end_of_the_menu() {
    let mut session = session();

    session
        .add_menu_action(
            "credits",
            OutcomeBuilder::new().effect(|state| {
                state.set("read_credits", true);
            }),
            Some(MenuCondition::Always),
            None,
        )
        .unwrap();

    let labels = session
        .menu()
        .actions()
        .iter()
        .map(|&action| session.story().action(action).get_text().to_string())
        .collect::<Vec<_>>();

    assert_eq!(
        labels,
        vec!["begin", "resume", "help", "credits", "restart", "load", "save"]
    );

    session.take_action("StoryMenu", 3).unwrap();

    assert_eq!(session.current(), Some("Title"));
    assert_eq!(
        session.state().get("read_credits"),
        Some(&Value::Bool(true))
    );
}

#[test]
pub fn the_beginning_offers_to_resume_once_autosaved() {
    let mut session = session();

    session.take_action("StoryMenu", 0).unwrap();
    session.take_action("Hall", 0).unwrap();
    session.restart(false).unwrap();

    assert_eq!(session.current(), Some("Title"));
    assert_eq!(
        menu_labels(&session),
        vec!["resume", "restart", "load", "save"]
    );

    session.take_action("StoryMenu", 1).unwrap();

    assert_eq!(session.current(), Some("Cellar"));
    assert_eq!(session.host().renderer.transcript(), vec!["A damp cellar."]);
}

#[test]
pub fn restarting_from_the_beginning_begins_right_away() {
    let mut session = session();

    session.take_action("StoryMenu", 0).unwrap();
    session.restart(false).unwrap();
    assert_eq!(session.current(), Some("Title"));

    session.take_action("StoryMenu", 3).unwrap();

    assert_eq!(session.current(), Some("Hall"));
    assert!(session.host().metadata.is_empty());

    session.take_action("StoryMenu", 3).unwrap();

    assert_eq!(session.current(), Some("Title"));
    assert!(!session.host().has(Slot::Auto));
}

#[test]
pub fn menu_saves_and_loads_bookmarks() {
    let mut session = session();
    session.take_action("StoryMenu", 0).unwrap();

    match session.take_action("StoryMenu", 4) {
        Err(EngineError::State(StateError::NothingToRestore { slot })) => assert_eq!(slot, 1),
        other => panic!("expected a missing save error, got {:?}", other),
    }

    session.take_action("StoryMenu", 5).unwrap();
    assert!(session.host().has(Slot::Bookmark(0)));

    session.take_action("Hall", 0).unwrap();
    assert_eq!(session.current(), Some("Cellar"));

    session.take_action("StoryMenu", 4).unwrap();

    assert_eq!(session.current(), Some("Hall"));
    assert_eq!(session.host().renderer.transcript(), vec!["A long hall."]);
}

#[test]
pub fn info_links_lead_to_info_nodes_only() {
    let mut session = session();

    let err = session.add_info_link("map", "Hall").unwrap_err();
    assert_eq!(
        err.kind,
        ValidationErrorKind::NotAnInfoNode {
            unit: "Hall".to_string()
        }
    );

    session.take_action("StoryMenu", 0).unwrap();
    session.take_action("StoryMenu", 2).unwrap();

    assert_eq!(session.current(), Some("Help"));
    assert!(session.story().get_node("Help").unwrap().is_out_of_character());

    session.take_action("Help", 0).unwrap();
    assert_eq!(session.current(), Some("Hall"));
}

#[test]
pub fn hidden_menu_actions_can_be_taken_with_a_warning() {
    let mut session = session();
    session.take_action("StoryMenu", 0).unwrap();

    session.take_action("StoryMenu", 0).unwrap();

    assert_eq!(session.current(), Some("Hall"));
    assert!(session.log.warnings.iter().any(|message| matches!(
        &message.message,
        MessageKind::Warning(Warning::HiddenActionTaken { label }) if label == "begin"
    )));
}
