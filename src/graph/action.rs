//! Choices offered to the reader.

use std::fmt;

use crate::{
    container::Container,
    error::{Origin, ValidationError, ValidationErrorKind},
    graph::registry::OutcomeId,
    state::{EngineRng, StoryState},
};

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

/// Check of whether an action is displayed, given the story variables.
pub type Predicate = Box<dyn Fn(&StoryState) -> bool + Send + Sync>;

/// Custom selection: given the variables and the number of outcomes, pick an index.
pub type Selector = Box<dyn Fn(&StoryState, usize) -> usize + Send + Sync>;

/// A labelled, conditionally visible choice holding one or more outcomes.
///
/// Visibility and selection are independent: an action which is not displayed can
/// still be taken programmatically, and its outcome is chosen the same way.
pub struct Action {
    id: String,
    text: String,
    outcomes: Container<OutcomeId>,
    visibility: Visibility,
    policy: SelectionPolicy,
    align: Align,
}

/// Whether an action is displayed.
pub enum Visibility {
    Fixed(bool),
    When(Predicate),
}

impl Visibility {
    pub fn when<F>(check: F) -> Self
    where
        F: Fn(&StoryState) -> bool + Send + Sync + 'static,
    {
        Visibility::When(Box::new(check))
    }
}

impl Default for Visibility {
    fn default() -> Self {
        Visibility::Fixed(true)
    }
}

impl From<bool> for Visibility {
    fn from(visible: bool) -> Self {
        Visibility::Fixed(visible)
    }
}

/// How an action chooses which of its outcomes fires.
pub enum SelectionPolicy {
    /// The first outcome.
    First,
    /// Uniformly random over the current outcomes. Requires the `random` feature,
    /// without which the first outcome is chosen.
    Random,
    /// Set by the story.
    Custom(Selector),
}

impl SelectionPolicy {
    pub fn custom<F>(select: F) -> Self
    where
        F: Fn(&StoryState, usize) -> usize + Send + Sync + 'static,
    {
        SelectionPolicy::Custom(Box::new(select))
    }
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        SelectionPolicy::First
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde_support", derive(Deserialize, Serialize))]
/// Horizontal alignment of the action link.
pub enum Align {
    Left,
    Center,
    Right,
}

impl Default for Align {
    fn default() -> Self {
        Align::Left
    }
}

impl fmt::Display for Align {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Align::Left => write!(f, "left"),
            Align::Center => write!(f, "center"),
            Align::Right => write!(f, "right"),
        }
    }
}

impl Action {
    /// Create an action with the given display text, always visible and selecting its
    /// first outcome.
    ///
    /// # Errors
    /// *   [`EmptyText`][crate::error::ValidationErrorKind::EmptyText]: if the text is
    ///     empty.
    pub fn new(text: &str) -> Result<Self, ValidationError> {
        validate_text(text)?;

        Ok(Action {
            id: String::new(),
            text: text.to_string(),
            outcomes: Container::new(),
            visibility: Visibility::default(),
            policy: SelectionPolicy::default(),
            align: Align::default(),
        })
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_policy(mut self, policy: SelectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn set_id(&mut self, id: String) {
        self.id = id;
    }

    /// Whether the action should be displayed.
    pub fn check(&self, state: &StoryState) -> bool {
        match &self.visibility {
            Visibility::Fixed(visible) => *visible,
            Visibility::When(check) => check(state),
        }
    }

    /// Choose an outcome according to the selection policy.
    ///
    /// Returns `None` if the action has no outcomes, or if a custom policy picks an
    /// index outside of them. A random policy without the `random` feature falls
    /// back to the first outcome.
    pub fn choose(&self, state: &StoryState, rng: &mut EngineRng) -> Option<OutcomeId> {
        self.select(state, rng)
            .and_then(|index| self.outcomes.get(index).copied())
    }

    /// Index picked by the selection policy, or `None` if the action has no outcomes.
    ///
    /// A custom policy may return an index which is out of range.
    pub fn select(&self, state: &StoryState, rng: &mut EngineRng) -> Option<usize> {
        if self.outcomes.is_empty() {
            return None;
        }

        let index = match &self.policy {
            SelectionPolicy::First => 0,
            SelectionPolicy::Random => rng.index(self.outcomes.len()).unwrap_or(0),
            SelectionPolicy::Custom(select) => select(state, self.outcomes.len()),
        };

        Some(index)
    }

    pub fn is_random(&self) -> bool {
        matches!(self.policy, SelectionPolicy::Random)
    }

    pub fn set_visibility(&mut self, visibility: Visibility) {
        self.visibility = visibility;
    }

    pub fn set_choose(&mut self, policy: SelectionPolicy) {
        self.policy = policy;
    }

    pub fn get_text(&self) -> &str {
        &self.text
    }

    /// Replace the display text.
    ///
    /// # Errors
    /// *   [`EmptyText`][crate::error::ValidationErrorKind::EmptyText]: if the text is
    ///     empty. The old text is kept.
    pub fn set_text(&mut self, text: &str) -> Result<(), ValidationError> {
        validate_text(text).map_err(|mut err| {
            err.origin = Origin::id(&self.id);
            err
        })?;

        self.text = text.to_string();
        Ok(())
    }

    pub fn get_align(&self) -> Align {
        self.align
    }

    pub fn set_align(&mut self, align: Align) {
        self.align = align;
    }

    pub fn outcomes(&self) -> &Container<OutcomeId> {
        &self.outcomes
    }

    pub(crate) fn outcomes_mut(&mut self) -> &mut Container<OutcomeId> {
        &mut self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let policy = match self.policy {
            SelectionPolicy::First => "first",
            SelectionPolicy::Random => "random",
            SelectionPolicy::Custom(_) => "custom",
        };

        f.debug_struct("Action")
            .field("id", &self.id)
            .field("text", &self.text)
            .field("outcomes", &self.outcomes)
            .field("policy", &policy)
            .field("align", &self.align)
            .finish()
    }
}

fn validate_text(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        Err(ValidationError::from_kind(
            Origin::default(),
            ValidationErrorKind::EmptyText,
        ))
    } else {
        Ok(())
    }
}
