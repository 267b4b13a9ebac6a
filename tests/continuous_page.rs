use storyweave::{
    host::memory::{MemoryHost, MemoryStore},
    log::{Event, MessageKind, ReplaceReason, Warning},
    *,
};

fn story() -> Story<MemoryStore> {
    let store = MemoryStore::new()
        .with_unit("Hall", "A long hall.")
        .with_unit("Cellar", "A damp cellar.")
        .with_unit("Attic", "A dusty attic.")
        .with_unit("Help", "How to play.");

    let mut story = Story::new(store);

    story.make_info_node("Help", true).unwrap();

    let hall = story.make_node("Hall").unwrap();
    story.add_link(hall, "go down", "Cellar").unwrap();
    story.add_link(hall, "stay put", "Hall").unwrap();

    let cellar = story.node_for("Cellar").unwrap();
    story
        .add_link_with(
            cellar,
            "climb the ladder",
            OutcomeBuilder::to("Attic").nobreak(true),
        )
        .unwrap();
    story.add_link(cellar, "help", "Help").unwrap();

    let attic = story.node_for("Attic").unwrap();
    story
        .add_link_with(attic, "back to the hall", OutcomeBuilder::to("Hall").embed(false))
        .unwrap();
    story.add_link(attic, "down again", "Cellar").unwrap();

    story
}

fn session() -> Session<MemoryStore, MemoryHost> {
    let mut session = Session::new(story(), MemoryHost::new(), "Hall");
    session.page_mut().set_continuous(true);
    session.start().unwrap();
    session
}

#[test]
pub fn navigations_embed_beneath_the_view_on_continuous_pages() {
    let mut session = session();

    session.take_action("Hall", 0).unwrap();

    assert_eq!(session.current(), Some("Hall"));
    assert_eq!(session.page().embedded(), &["Cellar".to_string()]);
    assert_eq!(
        session.host().renderer.transcript(),
        vec!["A long hall.", "****", "A damp cellar."]
    );

    let labels = session
        .host()
        .renderer
        .action_links()
        .iter()
        .map(|link| link.label.clone())
        .collect::<Vec<_>>();
    assert_eq!(labels, vec!["climb the ladder", "help"]);

    session.take_action("Cellar", 0).unwrap();

    assert_eq!(session.page().nobreak_flags(), &[false, true]);
    assert_eq!(
        session.host().renderer.transcript(),
        vec!["A long hall.", "****", "A damp cellar.", "A dusty attic."]
    );
}

#[test]
pub fn explicit_replace_starts_a_new_page() {
    let mut session = session();

    session.take_action("Hall", 0).unwrap();
    session.take_action("Cellar", 0).unwrap();
    session.take_action("Attic", 0).unwrap();

    assert_eq!(session.current(), Some("Hall"));
    assert!(session.page().is_empty());
    assert!(session.page().nobreak_flags().is_empty());
    assert_eq!(session.host().renderer.transcript(), vec!["A long hall."]);

    assert_eq!(session.page().history().len(), 2);
    assert_eq!(
        session.page().page_to_text(0).unwrap(),
        "A long hall.\n\n****\n\nA damp cellar.\n\nA dusty attic."
    );
    assert_eq!(session.page().page_to_text(1).unwrap(), "A long hall.");
}

#[test]
pub fn embedding_the_primary_unit_leaves_the_page_untouched() {
    let mut session = session();
    session.take_action("Hall", 0).unwrap();

    let before = session.page().clone();

    // The primary unit links to itself from its second action
    match session.take_action("Hall", 1) {
        Err(EngineError::State(StateError::SelfEmbedding { unit })) => assert_eq!(unit, "Hall"),
        other => panic!("expected a self embedding error, got {:?}", other),
    }

    assert_eq!(session.page(), &before);
}

#[test]
pub fn embedding_a_unit_twice_leaves_the_page_untouched() {
    let mut session = session();

    session.take_action("Hall", 0).unwrap();
    session.take_action("Cellar", 0).unwrap();

    let before = session.page().clone();
    let transcript = session.host().renderer.transcript();

    match session.take_action("Attic", 1) {
        Err(EngineError::State(StateError::DuplicateEmbedding { unit })) => {
            assert_eq!(unit, "Cellar")
        }
        other => panic!("expected a duplicate embedding error, got {:?}", other),
    }

    assert_eq!(session.page(), &before);
    assert_eq!(session.host().renderer.transcript(), transcript);
}

#[test]
pub fn out_of_character_units_always_replace_the_view() {
    let mut session = session();

    session.take_action("Hall", 0).unwrap();
    session.take_action("Cellar", 1).unwrap();

    assert_eq!(session.current(), Some("Help"));
    assert!(session.page().is_empty());
    assert_eq!(session.host().renderer.transcript(), vec!["How to play."]);

    assert!(session.log.warnings.iter().any(|message| matches!(
        message.message,
        MessageKind::Warning(Warning::EmbedForcedToReplace {
            reason: ReplaceReason::OutOfCharacter
        })
    )));

    // Help screens are not part of the narrative history
    assert_eq!(session.page().history().len(), 1);
}

#[test]
pub fn returning_to_the_story_restores_the_view() {
    let mut session = session();

    session.take_action("Hall", 0).unwrap();
    session.take_action("Cellar", 1).unwrap();
    session.take_action("Help", 0).unwrap();

    assert_eq!(session.current(), Some("Hall"));
    assert_eq!(session.page().embedded(), &["Cellar".to_string()]);
    assert_eq!(
        session.host().renderer.transcript(),
        vec!["A long hall.", "****", "A damp cellar."]
    );

    assert!(session.log.events.iter().any(|message| matches!(
        message.message,
        MessageKind::Event(Event::Rebuilt { embedded: 1 })
    )));
}

#[test]
pub fn hooks_run_before_the_unit_is_rendered() {
    let mut story = story();
    let cellar = story.node_for("Cellar").unwrap();

    story.node_mut(cellar).set_hook(|state| {
        state.set("visited_cellar", true);
    });

    let mut session = Session::new(story, MemoryHost::new(), "Hall");
    session.start().unwrap();

    assert!(session.state().get("visited_cellar").is_none());

    session.take_action("Hall", 0).unwrap();

    assert_eq!(
        session.state().get("visited_cellar"),
        Some(&Value::Bool(true))
    );
}

#[test]
pub fn loading_the_cheat_code_toggles_debug_mode() {
    let mut session = Session::new(story(), MemoryHost::new(), "Hall");
    session.debug_mut().set_cheat(&["Hall", "Cellar"]);

    session.start().unwrap();
    assert!(!session.debug().is_on());

    session.take_action("Hall", 0).unwrap();
    assert!(session.debug().is_on());
}

#[test]
pub fn recorded_moments_never_outgrow_the_view() {
    let mut session = session();

    for _ in 0..50 {
        session.take_action("Hall", 0).unwrap();
        assert_eq!(session.state().moments(), 2);

        session.take_action("Cellar", 0).unwrap();
        assert_eq!(session.state().moments(), 3);

        session.take_action("Attic", 0).unwrap();
        assert_eq!(session.state().moments(), 1);
    }

    session.take_action("Hall", 0).unwrap();
    session.rebuild_after_reload().unwrap();

    assert_eq!(
        session.host().renderer.transcript(),
        vec!["A long hall.", "****", "A damp cellar."]
    );
}
