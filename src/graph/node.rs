use std::fmt;

use crate::{
    container::Container,
    error::{EngineError, Origin, StateError, ValidationError, ValidationErrorKind},
    graph::registry::ActionId,
    state::StoryState,
};

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

/// Ordered list of actions offered by a node.
pub type ActionList = Container<ActionId>;

/// Procedure run immediately before the content of a node is rendered.
pub type Hook = Box<dyn Fn(&mut StoryState) + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde_support", derive(Deserialize, Serialize))]
/// Whether a node belongs to the narrative.
pub enum NodeKind {
    /// Part of the story.
    Narrative,
    /// Outside the narrative flow, such as a help screen or character sheet. These
    /// are never embedded, recorded in the narrative history or autosaved.
    OutOfCharacter,
}

/// A content unit with the actions it offers.
///
/// Nodes do not know whether they are currently displayed; the session tracks that.
pub struct Node {
    id: String,
    unit: String,
    actions: ActionList,
    sub_count: usize,
    hook: Option<Hook>,
    kind: NodeKind,
    excerpt: Option<String>,
}

impl Node {
    pub(crate) fn new(unit: &str, kind: NodeKind) -> Self {
        // Out-of-character nodes keep their built-in action last
        let fixed_end = match kind {
            NodeKind::Narrative => 0,
            NodeKind::OutOfCharacter => 1,
        };

        Node {
            id: String::new(),
            unit: unit.to_string(),
            actions: Container::with_fixed_end(fixed_end),
            sub_count: 0,
            hook: None,
            kind,
            excerpt: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn set_id(&mut self, id: String) {
        self.id = id;
    }

    /// Name of the content unit.
    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_out_of_character(&self) -> bool {
        self.kind == NodeKind::OutOfCharacter
    }

    pub fn actions(&self) -> &ActionList {
        &self.actions
    }

    pub(crate) fn actions_mut(&mut self) -> &mut ActionList {
        &mut self.actions
    }

    /// Number of text substitutions the content unit expects.
    pub fn get_sub_count(&self) -> usize {
        self.sub_count
    }

    /// Set the number of text substitutions the content unit expects.
    ///
    /// # Errors
    /// *   [`SubCountAlreadySet`][crate::error::StateError::SubCountAlreadySet]: if the
    ///     count has already been set. It can only be set once.
    /// *   [`InvalidSubCount`][crate::error::ValidationErrorKind::InvalidSubCount]: if
    ///     the count is zero.
    pub fn set_sub_count(&mut self, count: usize) -> Result<(), EngineError> {
        if self.sub_count != 0 {
            return Err(StateError::SubCountAlreadySet {
                unit: self.unit.clone(),
                count: self.sub_count,
            }
            .into());
        }

        if count == 0 {
            return Err(ValidationError::from_kind(
                Origin::unit(&self.unit).with_id(&self.id),
                ValidationErrorKind::InvalidSubCount,
            )
            .into());
        }

        self.sub_count = count;
        Ok(())
    }

    pub fn set_hook<F>(&mut self, hook: F)
    where
        F: Fn(&mut StoryState) + Send + Sync + 'static,
    {
        self.hook.replace(Box::new(hook));
    }

    /// Run the lifecycle hook. Does nothing if there is none.
    pub fn on_load(&self, state: &mut StoryState) {
        if let Some(hook) = &self.hook {
            hook(state);
        }
    }

    /// Short description of the rendered content, set every time it is rendered.
    pub fn get_excerpt(&self) -> Option<&str> {
        self.excerpt.as_deref()
    }

    pub(crate) fn set_excerpt(&mut self, excerpt: String) {
        self.excerpt.replace(excerpt);
    }

    pub(crate) fn origin(&self) -> Origin {
        Origin::unit(&self.unit).with_id(&self.id)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("unit", &self.unit)
            .field("actions", &self.actions)
            .field("sub_count", &self.sub_count)
            .field("kind", &self.kind)
            .field("excerpt", &self.excerpt)
            .finish()
    }
}
