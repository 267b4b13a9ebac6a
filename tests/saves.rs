use storyweave::{
    host::{
        memory::{MemoryHost, MemoryStore},
        Saves,
    },
    *,
};

fn story() -> Story<MemoryStore> {
    let store = MemoryStore::new()
        .with_unit("Hall", "A long hall.")
        .with_unit("Cellar", "A damp cellar with a stack of crates.")
        .with_unit("Attic", "A dusty attic.");

    let mut story = Story::new(store);

    let hall = story.make_node("Hall").unwrap();
    story.add_link(hall, "go down", "Cellar").unwrap();

    let cellar = story.node_for("Cellar").unwrap();
    story.add_link(cellar, "go up", "Attic").unwrap();
    story
        .add_link_with(
            cellar,
            "bookmark",
            OutcomeBuilder::new().command(Command::SaveBookmark),
        )
        .unwrap();

    story
}

fn session() -> Session<MemoryStore, MemoryHost> {
    let mut session = Session::new(story(), MemoryHost::new(), "Hall");
    session.start().unwrap();
    session
}

#[test]
pub fn the_untouched_start_is_not_autosaved() {
    let session = session();

    assert!(!session.host().has(Slot::Auto));
}

#[test]
pub fn navigating_writes_the_autosave() {
    let mut session = session();
    session.take_action("Hall", 0).unwrap();

    let entry = session.host().saves.get(&Slot::Auto).unwrap();

    assert_eq!(entry.state.current.as_deref(), Some("Cellar"));
    assert_eq!(entry.description, "A damp cellar with a stack of crates.\u{2026}");
}

#[test]
pub fn necessary_checks_can_prevent_autosaving() {
    let mut session = Session::new(story(), MemoryHost::new(), "Hall");
    session
        .autosave_policy_mut()
        .add_necessary(|state| state.get("can_save").is_some());

    session.start().unwrap();
    session.take_action("Hall", 0).unwrap();

    assert!(!session.host().has(Slot::Auto));
}

#[test]
pub fn sufficient_checks_allow_autosaving_at_the_start() {
    let mut session = Session::new(story(), MemoryHost::new(), "Hall");
    session.autosave_policy_mut().add_sufficient(|_| true);

    session.start().unwrap();

    assert!(session.host().has(Slot::Auto));
}

#[test]
pub fn bookmarks_restore_the_saved_view() {
    let mut session = session();

    session.take_action("Hall", 0).unwrap();
    assert_eq!(session.save_bookmark().unwrap(), 1);

    session.take_action("Cellar", 0).unwrap();
    assert_eq!(session.current(), Some("Attic"));

    session.restore(1).unwrap();

    assert_eq!(session.current(), Some("Cellar"));
    assert_eq!(
        session.host().renderer.transcript(),
        vec!["A damp cellar with a stack of crates."]
    );
    assert_eq!(session.path().len(), 1);
}

#[test]
pub fn saving_a_bookmark_from_an_action_keeps_the_view() {
    let mut session = session();

    session.take_action("Hall", 0).unwrap();
    session.take_action("Cellar", 1).unwrap();

    assert_eq!(session.current(), Some("Cellar"));
    assert!(session.host().has(Slot::Bookmark(0)));
    assert_eq!(session.host().renderer.action_links().len(), 2);
}

#[test]
pub fn saving_to_full_bookmarks_yields_error() {
    let mut session = session();

    session.save_bookmark().unwrap();

    match session.save_bookmark() {
        Err(EngineError::State(StateError::BookmarksFull { available })) => {
            assert_eq!(available, 1)
        }
        other => panic!("expected a full bookmarks error, got {:?}", other),
    }
}

#[test]
pub fn restoring_an_empty_or_unknown_slot_yields_error() {
    let mut session = session();

    match session.restore(1) {
        Err(EngineError::State(StateError::NothingToRestore { slot })) => assert_eq!(slot, 1),
        other => panic!("expected a missing save error, got {:?}", other),
    }

    match session.restore(2) {
        Err(EngineError::Validation(err)) => assert_eq!(
            err.kind,
            ValidationErrorKind::SlotOutOfRange {
                slot: 2,
                available: 1
            }
        ),
        other => panic!("expected a slot error, got {:?}", other),
    }
}

#[test]
pub fn saves_from_other_versions_can_be_blocked() {
    let mut session = session();

    *session.saves_mut() = SavesManager::new(1, Version::new(1, 0, 0).unwrap());
    session.take_action("Hall", 0).unwrap();
    session.save_bookmark().unwrap();

    *session.saves_mut() = SavesManager::new(1, Version::new(1, 1, 0).unwrap());

    session.restore(1).unwrap();

    session.saves_mut().set_block(true);

    match session.restore(1) {
        Err(EngineError::State(StateError::IncompatibleSave { saved, current })) => {
            assert_eq!(saved.to_string(), "1.0");
            assert_eq!(current.to_string(), "1.1");
        }
        other => panic!("expected an incompatible save error, got {:?}", other),
    }
}

#[test]
pub fn hard_restarts_delete_the_autosave() {
    let mut session = session();
    session.take_action("Hall", 0).unwrap();

    session.restart(false).unwrap();

    assert!(session.host().has(Slot::Auto));
    assert_eq!(session.current(), Some("Hall"));
    assert!(session.path().is_empty());
    assert_eq!(session.host().renderer.transcript(), vec!["A long hall."]);

    session.restart(true).unwrap();

    assert!(!session.host().has(Slot::Auto));
}
