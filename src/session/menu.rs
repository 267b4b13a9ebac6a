//! Built-in actions which lie outside of the story graph.

use std::collections::HashMap;

use crate::{
    consts::{MENU_BEGIN, MENU_LOAD, MENU_RESTART, MENU_RESUME, MENU_SAVE},
    container::Container,
    error::ValidationError,
    graph::{Action, ActionId, Command, OutcomeBuilder, Story},
    host::ContentStore,
};

#[derive(Clone, Copy, Debug, PartialEq)]
/// When a menu action is displayed, in addition to its own visibility.
pub enum MenuCondition {
    Always,
    /// Once the story has moved past its beginning.
    AwayFromStart,
    /// At the beginning, while there is no autosave.
    FreshStart,
    /// At the beginning, while there is an autosave.
    ResumableStart,
    /// Away from the beginning, or whenever there is an autosave.
    Restartable,
}

impl MenuCondition {
    pub fn holds(self, at_start: bool, has_autosave: bool) -> bool {
        match self {
            MenuCondition::Always => true,
            MenuCondition::AwayFromStart => !at_start,
            MenuCondition::FreshStart => at_start && !has_autosave,
            MenuCondition::ResumableStart => at_start && has_autosave,
            MenuCondition::Restartable => !at_start || has_autosave,
        }
    }
}

#[derive(Clone, Debug, Default)]
/// Action list of the session menu.
///
/// The "restart", "load" and "save" actions are kept at the end of the list. A
/// "begin" action leads from the beginning into the story and can be replaced with
/// [`set_begin`][Menu::set_begin]. A "resume" action loads the autosave from the
/// beginning. The actions live in the registry of the story like any other.
pub struct Menu {
    actions: Container<ActionId>,
    conditions: HashMap<ActionId, MenuCondition>,
}

impl Menu {
    /// Whether the built-in actions have been created.
    pub fn is_built(&self) -> bool {
        !self.actions.is_empty()
    }

    /// Create the built-in actions in the registry of the story.
    ///
    /// Does nothing if they already exist.
    pub(crate) fn build<S: ContentStore>(
        &mut self,
        story: &mut Story<S>,
    ) -> Result<(), ValidationError> {
        if self.is_built() {
            return Ok(());
        }

        let tail = vec![
            (
                MENU_RESTART,
                Command::Restart { hard: true },
                MenuCondition::Restartable,
            ),
            (MENU_LOAD, Command::RestoreBookmark, MenuCondition::Always),
            (MENU_SAVE, Command::SaveBookmark, MenuCondition::Always),
        ];

        let mut actions = Vec::with_capacity(tail.len());

        for (label, command, condition) in tail {
            let action = new_action(story, label, OutcomeBuilder::new().command(command))?;
            self.conditions.insert(action, condition);
            actions.push(action);
        }

        self.actions = Container::with_tail(actions, &story.registry().known_actions())?;

        self.set_begin(story, OutcomeBuilder::new().effect(|_| ()))?;
        self.add(
            story,
            MENU_RESUME,
            OutcomeBuilder::new().command(Command::RestoreAutosave),
            MenuCondition::ResumableStart,
            None,
        )?;

        Ok(())
    }

    /// Add an action with a single outcome at `index`, or at the end if `None`.
    /// The fixed actions stay last.
    pub(crate) fn add<S: ContentStore>(
        &mut self,
        story: &mut Story<S>,
        label: &str,
        outcome: OutcomeBuilder,
        condition: MenuCondition,
        index: Option<usize>,
    ) -> Result<ActionId, ValidationError> {
        let action = new_action(story, label, outcome)?;
        let known = story.registry().known_actions();

        self.actions
            .insert(index.unwrap_or(usize::MAX), action, &known)?;
        self.conditions.insert(action, condition);

        Ok(action)
    }

    /// Replace the "begin" action with one carrying out the given outcome.
    pub(crate) fn set_begin<S: ContentStore>(
        &mut self,
        story: &mut Story<S>,
        outcome: OutcomeBuilder,
    ) -> Result<ActionId, ValidationError> {
        let old = self
            .actions
            .get(0)
            .copied()
            .filter(|&action| story.action(action).get_text() == MENU_BEGIN);

        if let Some(action) = old {
            self.actions.delete(0)?;
            self.conditions.remove(&action);
        }

        self.add(story, MENU_BEGIN, outcome, MenuCondition::FreshStart, Some(0))
    }

    pub fn actions(&self) -> &Container<ActionId> {
        &self.actions
    }

    pub fn condition(&self, action: ActionId) -> MenuCondition {
        self.conditions
            .get(&action)
            .copied()
            .unwrap_or(MenuCondition::AwayFromStart)
    }

    /// Find the first menu action with the given display text.
    pub fn get_action<S>(&self, story: &Story<S>, label: &str) -> Option<ActionId>
    where
        S: ContentStore,
    {
        self.actions
            .iter()
            .copied()
            .find(|&action| story.action(action).get_text() == label)
    }
}

fn new_action<S: ContentStore>(
    story: &mut Story<S>,
    label: &str,
    outcome: OutcomeBuilder,
) -> Result<ActionId, ValidationError> {
    let action = story.build_action(None, Action::new(label)?)?;
    story.add_outcome(action, outcome)?;

    Ok(action)
}
