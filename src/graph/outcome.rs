//! Results of taking an action.

use std::fmt;

use crate::{graph::registry::NodeId, state::StoryState};

/// Procedure run against the story variables when an outcome is carried out.
pub type Effect = Box<dyn Fn(&mut StoryState) + Send + Sync>;

/// One concrete result of choosing an action.
///
/// The effect, if any, always runs to completion before the follow-up is handled.
/// Outcomes are built while setting up the story and are not changed during play.
pub struct Outcome {
    id: String,
    effect: Option<Effect>,
    follow_up: FollowUp,
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// What happens after the effect of an outcome has run.
pub enum FollowUp {
    /// Nothing: the view stays as it is.
    Stay,
    /// Load another node.
    Navigate(Direction),
    /// Ask the session to do something outside of the story graph.
    Command(Command),
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Target of a directed outcome and how to display it.
pub struct Direction {
    /// Node to load.
    pub target: NodeId,
    /// Whether to embed the target beneath the current view. `None` uses the
    /// page default.
    pub embed: Option<bool>,
    /// Omit the scene break when embedding.
    pub nobreak: bool,
}

impl Direction {
    pub fn to(target: NodeId) -> Self {
        Direction {
            target,
            embed: None,
            nobreak: false,
        }
    }

    pub fn embed(mut self, embed: bool) -> Self {
        self.embed.replace(embed);
        self
    }

    pub fn nobreak(mut self, nobreak: bool) -> Self {
        self.nobreak = nobreak;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Session-level operations an outcome can end in.
pub enum Command {
    /// Load the autosave, returning to where the reader left the narrative.
    RestoreAutosave,
    /// Save the session to the first free bookmark slot.
    SaveBookmark,
    /// Load the first bookmark which holds a save.
    RestoreBookmark,
    /// Start the story over.
    Restart { hard: bool },
}

impl Outcome {
    pub(crate) fn new(id: String, effect: Option<Effect>, follow_up: FollowUp) -> Self {
        Outcome {
            id,
            effect,
            follow_up,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn has_effect(&self) -> bool {
        self.effect.is_some()
    }

    pub fn follow_up(&self) -> FollowUp {
        self.follow_up
    }

    /// Run the effect against the variables. Does nothing if there is no effect.
    pub fn run_effect(&self, state: &mut StoryState) {
        if let Some(effect) = &self.effect {
            effect(state);
        }
    }
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Outcome")
            .field("id", &self.id)
            .field("effect", &self.effect.as_ref().map(|_| "<effect>"))
            .field("follow_up", &self.follow_up)
            .finish()
    }
}

#[derive(Default)]
/// Description of an outcome to add to an action with
/// [`Story::add_outcome`][crate::graph::Story::add_outcome].
///
/// Targets are given by content unit name. The story resolves them to nodes when
/// the outcome is added, creating nodes as needed.
pub struct OutcomeBuilder {
    pub(crate) effect: Option<Effect>,
    pub(crate) target: Option<Target>,
    pub(crate) embed: Option<bool>,
    pub(crate) nobreak: bool,
}

pub(crate) enum Target {
    Unit(String),
    Command(Command),
}

impl OutcomeBuilder {
    pub fn new() -> Self {
        OutcomeBuilder::default()
    }

    /// Outcome which loads the node of a content unit.
    pub fn to(unit: &str) -> Self {
        OutcomeBuilder::new().target(unit)
    }

    /// Run a procedure against the story variables before any navigation.
    pub fn effect<F>(mut self, effect: F) -> Self
    where
        F: Fn(&mut StoryState) + Send + Sync + 'static,
    {
        self.effect.replace(Box::new(effect));
        self
    }

    /// Load the node of a content unit after the effect. Replaces any command.
    pub fn target(mut self, unit: &str) -> Self {
        self.target.replace(Target::Unit(unit.to_string()));
        self
    }

    /// End in a session command after the effect. Replaces any target unit.
    pub fn command(mut self, command: Command) -> Self {
        self.target.replace(Target::Command(command));
        self
    }

    /// Whether to embed the target. Only used for target units.
    pub fn embed(mut self, embed: bool) -> Self {
        self.embed.replace(embed);
        self
    }

    /// Omit the scene break when embedding the target.
    pub fn nobreak(mut self, nobreak: bool) -> Self {
        self.nobreak = nobreak;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_an_outcome_without_effect_does_nothing() {
        let outcome = Outcome::new("outcome#0".to_string(), None, FollowUp::Stay);
        let mut state = StoryState::new();

        outcome.run_effect(&mut state);

        assert!(state.variables().is_empty());
        assert!(!outcome.has_effect());
    }

    #[test]
    fn effect_writes_to_the_variables() {
        let effect: Effect = Box::new(|state| {
            state.set("door", "open");
        });

        let outcome = Outcome::new("outcome#0".to_string(), Some(effect), FollowUp::Stay);
        let mut state = StoryState::new();

        outcome.run_effect(&mut state);

        assert_eq!(state.get("door").unwrap().as_text(), Some("open"));
    }

    #[test]
    fn direction_builder_sets_hints() {
        let direction = Direction::to(NodeId(3)).embed(true).nobreak(true);

        assert_eq!(direction.target, NodeId(3));
        assert_eq!(direction.embed, Some(true));
        assert!(direction.nobreak);
    }

    #[test]
    fn builder_keeps_the_last_target() {
        let builder = OutcomeBuilder::to("Cellar").command(Command::SaveBookmark);

        assert!(matches!(
            builder.target,
            Some(Target::Command(Command::SaveBookmark))
        ));
        assert!(builder.effect.is_none());
    }
}
