//! Errors from building a story graph or playing through it.

use std::{error::Error, fmt};

use crate::{
    error::{
        markup::MarkupError,
        utils::{write_origin, Origin},
    },
    session::Version,
};

#[derive(Clone, Debug)]
/// Errors from building or playing a story.
///
/// Most of these are raised while the story graph is being set up and should abort
/// startup: they point to a mistake in the setup code. A few, such as embedding
/// a unit into itself or selecting from an action without outcomes, can surface during
/// play when the graph was built incorrectly. All of them carry enough information
/// to name the unit, node or action which was involved.
pub enum EngineError {
    /// An argument broke a documented precondition.
    Validation(ValidationError),
    /// An operation was invoked when the lifecycle of an object forbids it.
    State(StateError),
    /// The text of a content unit could not be processed.
    Markup(MarkupError),
}

#[derive(Clone, Debug)]
/// Error from an argument which violates the precondition of a constructor or setter.
pub struct ValidationError {
    /// What the argument concerned.
    pub origin: Origin,
    /// Error variant.
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    pub fn from_kind(origin: Origin, kind: ValidationErrorKind) -> Self {
        ValidationError { origin, kind }
    }
}

#[derive(Clone, Debug, PartialEq)]
/// Variant of validation errors.
pub enum ValidationErrorKind {
    /// Tried to register an object with an empty id.
    EmptyId,
    /// Tried to register an id which is already in the catalog.
    DuplicateId { id: String },
    /// Display text of an action was empty.
    EmptyText,
    /// Content store has no unit with this name.
    MissingUnit { unit: String },
    /// The unit is reserved by the host and cannot hold a node.
    ReservedUnit { unit: String },
    /// The unit already belongs to another node.
    UnitAlreadyBound { unit: String },
    /// An element failed the membership check of the container it was inserted into.
    NotAMember,
    /// Index into a container was out of range.
    IndexOutOfRange { index: usize, len: usize },
    /// A substitution count of zero was given.
    InvalidSubCount,
    /// The number of text substitutions does not match the node.
    WrongSubstitutionCount { expected: usize, found: usize },
    /// No node is bound to the unit.
    UnknownNode { unit: String },
    /// A handle does not belong to the registry of this story.
    UnknownHandle { handle: String },
    /// The unit is bound to a node which is not an info node.
    NotAnInfoNode { unit: String },
    /// An outcome was given neither an effect nor a target.
    OutcomeWithoutEffect,
    /// Asked for a snapshot further back than the recorded history.
    SnapshotOutOfRange { offset: usize, available: usize },
    /// Save slot number is larger than the number of bookmarks.
    SlotOutOfRange { slot: usize, available: usize },
    /// Version numbers must be below 1000 and not all zero.
    InvalidVersion { major: u32, minor: u32, patch: u32 },
}

#[derive(Clone, Debug, PartialEq)]
/// Error from calling an operation which the current state of an object forbids.
pub enum StateError {
    /// The substitution count of a node can only be set once.
    SubCountAlreadySet { unit: String, count: usize },
    /// Tried to embed the primary unit into itself.
    SelfEmbedding { unit: String },
    /// Tried to embed a unit which is already embedded on the page.
    DuplicateEmbedding { unit: String },
    /// Tried to autoplay an empty path.
    EmptyPath,
    /// The current view is not associated with a node.
    NoCurrentNode,
    /// No unit has been set to begin the story from.
    NoBeginUnit,
    /// Selected an action which has no outcomes to choose from.
    EmptyAction { unit: String, label: String },
    /// The selection policy of an action picked an outcome it does not have.
    InvalidSelection {
        unit: String,
        label: String,
        index: usize,
        count: usize,
    },
    /// A recorded choice does not exist in the story graph.
    AutoplayDiverged {
        unit: String,
        action: usize,
        outcome: usize,
    },
    /// No save exists in the given slot.
    NothingToRestore { slot: usize },
    /// Every bookmark slot is already filled.
    BookmarksFull { available: usize },
    /// The save was made with a different version of the story.
    IncompatibleSave { saved: Version, current: Version },
}

impl Error for EngineError {}
impl Error for ValidationError {}
impl Error for StateError {}

impl_from_error![
    EngineError;
    [Validation, ValidationError],
    [State, StateError],
    [Markup, MarkupError]
];

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use EngineError::*;

        match self {
            Validation(err) => write!(f, "Invalid argument: {}", err),
            State(err) => write!(f, "Invalid state: {}", err),
            Markup(err) => write!(f, "Invalid markup: {}", err),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use ValidationErrorKind::*;

        write_origin(f, &self.origin)?;

        match &self.kind {
            EmptyId => write!(f, "ids must be nonempty strings"),
            DuplicateId { id } => write!(
                f,
                "the id '{}' is already in the catalog and cannot be registered again",
                id
            ),
            EmptyText => write!(f, "display text must be a nonempty string"),
            MissingUnit { unit } => write!(f, "there is no content unit named '{}'", unit),
            ReservedUnit { unit } => write!(
                f,
                "'{}' is reserved by the host and cannot be assigned to a node",
                unit
            ),
            UnitAlreadyBound { unit } => {
                write!(f, "the content unit '{}' already belongs to a node", unit)
            }
            NotAMember => write!(f, "element does not qualify for the container"),
            IndexOutOfRange { index, len } => write!(
                f,
                "index {} is out of range for a container of length {}",
                index, len
            ),
            InvalidSubCount => write!(f, "substitution counts must be positive"),
            WrongSubstitutionCount { expected, found } => write!(
                f,
                "expected {} text substitutions but {} were given",
                expected, found
            ),
            UnknownNode { unit } => write!(f, "no node is bound to the unit '{}'", unit),
            UnknownHandle { handle } => {
                write!(f, "{} is not registered in this story", handle)
            }
            NotAnInfoNode { unit } => write!(f, "'{}' is not an info node", unit),
            OutcomeWithoutEffect => write!(f, "an outcome must run an effect or load a node"),
            SnapshotOutOfRange { offset, available } => write!(
                f,
                "cannot rewind {} moments when only {} are recorded",
                offset, available
            ),
            SlotOutOfRange { slot, available } => write!(
                f,
                "save slot {} does not exist (there are {} bookmark slots)",
                slot, available
            ),
            InvalidVersion {
                major,
                minor,
                patch,
            } => write!(
                f,
                "version {}.{}.{} is invalid: parts must be below 1000 and not all zero",
                major, minor, patch
            ),
        }
    }
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use StateError::*;

        match self {
            SubCountAlreadySet { unit, count } => write!(
                f,
                "the substitution count of '{}' was already set to {} and cannot be changed",
                unit, count
            ),
            SelfEmbedding { unit } => {
                write!(f, "cannot embed '{}' into itself", unit)
            }
            DuplicateEmbedding { unit } => {
                write!(f, "'{}' is already embedded on the page", unit)
            }
            EmptyPath => write!(f, "cannot autoplay an empty path"),
            NoCurrentNode => write!(f, "the current view is not associated with a node"),
            NoBeginUnit => write!(f, "no unit has been set to begin the story from"),
            EmptyAction { unit, label } => write!(
                f,
                "the action '{}' in '{}' has no outcomes to choose from",
                label, unit
            ),
            InvalidSelection {
                unit,
                label,
                index,
                count,
            } => write!(
                f,
                "the action '{}' in '{}' selected outcome {} but has only {}",
                label, unit, index, count
            ),
            AutoplayDiverged {
                unit,
                action,
                outcome,
            } => write!(
                f,
                "recorded choice (action {}, outcome {}) does not exist in '{}'",
                action, outcome, unit
            ),
            NothingToRestore { slot } => write!(f, "there is no save in slot {}", slot),
            BookmarksFull { available } => write!(
                f,
                "all {} bookmark slots are already filled",
                available
            ),
            IncompatibleSave { saved, current } => write!(
                f,
                "save is from version {} but the current version is {}",
                saved, current
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_printed_with_their_origin() {
        let err = ValidationError::from_kind(
            Origin::unit("Cellar"),
            ValidationErrorKind::UnitAlreadyBound {
                unit: "Cellar".to_string(),
            },
        );

        let message = format!("{}", err);

        assert!(message.starts_with("(unit 'Cellar')"));
        assert!(message.contains("already belongs to a node"));
    }

    #[test]
    fn engine_error_wraps_state_errors_through_from() {
        let err: EngineError = StateError::EmptyPath.into();

        match err {
            EngineError::State(StateError::EmptyPath) => (),
            other => panic!("expected a state error, got {:?}", other),
        }
    }

    #[test]
    fn empty_action_error_names_unit_and_label() {
        let err = StateError::EmptyAction {
            unit: "Hall".to_string(),
            label: "wait".to_string(),
        };

        let message = format!("{}", err);

        assert!(message.contains("'wait'"));
        assert!(message.contains("'Hall'"));
    }

    #[test]
    fn invalid_selection_error_does_not_claim_the_action_is_empty() {
        let err = StateError::InvalidSelection {
            unit: "Hall".to_string(),
            label: "roll".to_string(),
            index: 5,
            count: 2,
        };

        let message = format!("{}", err);

        assert!(message.contains("selected outcome 5 but has only 2"));
        assert!(!message.contains("no outcomes"));
    }
}
