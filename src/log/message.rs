use crate::error::{write_origin, Origin};
use std::fmt;

#[derive(Clone, Debug)]
#[cfg_attr(test, derive(PartialEq))]
/// Log message with additional information.
pub struct LogMessage {
    /// Logged message.
    pub message: MessageKind,
    /// Which part of the story the message concerns.
    pub origin: Origin,
    /// Order in which the message was logged within its session.
    pub sequence: u64,
}

impl LogMessage {
    pub(crate) fn with_kind(message: MessageKind, origin: &Origin, sequence: u64) -> Self {
        LogMessage {
            message,
            origin: origin.clone(),
            sequence,
        }
    }
}

#[derive(Clone, Debug)]
#[cfg_attr(test, derive(PartialEq))]
/// Type of log message with content.
pub enum MessageKind {
    /// Something the engine did.
    Event(Event),
    /// Non-fatal error or incompatibility.
    Warning(Warning),
}

#[derive(Clone, Debug, PartialEq)]
/// Navigation and bookkeeping performed by a session.
pub enum Event {
    /// The view was replaced by a new unit.
    Replaced,
    /// A unit was embedded beneath the current view.
    Embedded { nobreak: bool },
    /// The view was rebuilt from persisted state.
    Rebuilt { embedded: usize },
    /// A recorded choice was replayed.
    AutoplayStep { pointer: usize },
    /// Debug mode was toggled through the cheat code.
    DebugToggled { on: bool },
    /// The session was written to the autosave slot.
    Autosaved,
    /// The session was restarted.
    Restarted { hard: bool },
}

#[derive(Clone, Debug, PartialEq)]
/// A detected non-fatal error or incompatibility.
pub enum Warning {
    /// A random selection policy was used but the `random` feature is not enabled.
    RandomPolicyWithoutRandom,
    /// An embedding navigation was turned into a replacing one.
    EmbedForcedToReplace { reason: ReplaceReason },
    /// An action was taken although its visibility check fails.
    HiddenActionTaken { label: String },
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Why an embedding navigation was turned into a replacing one.
pub enum ReplaceReason {
    /// The target node lies outside the narrative.
    OutOfCharacter,
    /// The current view has no node to embed into.
    NoCurrentNode,
}

impl fmt::Display for LogMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind = match &self.message {
            MessageKind::Event(_) => "EVENT",
            MessageKind::Warning(_) => "WARNING",
        };

        write!(f, "[{}] {}: ", self.sequence, kind)?;
        write_origin(f, &self.origin)?;
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use MessageKind::*;

        match self {
            Event(event) => write!(f, "{}", event),
            Warning(warning) => write!(f, "{}", warning),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Event::*;

        match self {
            Replaced => write!(f, "replaced the view"),
            Embedded { nobreak: false } => write!(f, "embedded beneath a scene break"),
            Embedded { nobreak: true } => write!(f, "embedded without a scene break"),
            Rebuilt { embedded } => {
                write!(f, "rebuilt the view with {} embedded units", embedded)
            }
            AutoplayStep { pointer } => write!(f, "replayed recorded choice {}", pointer),
            DebugToggled { on } => {
                write!(f, "debug mode {}", if *on { "enabled" } else { "disabled" })
            }
            Autosaved => write!(f, "autosaved"),
            Restarted { hard } => {
                write!(f, "restarted{}", if *hard { " (hard)" } else { "" })
            }
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Warning::*;

        match self {
            RandomPolicyWithoutRandom => write!(
                f,
                "an action selects outcomes at random but the `random` feature is not \
                 enabled: chose the first outcome instead (fix: compile `storyweave` with \
                 the `random` feature)"
            ),
            EmbedForcedToReplace { reason } => match reason {
                ReplaceReason::OutOfCharacter => write!(
                    f,
                    "cannot embed a unit which lies outside the narrative: replaced the view"
                ),
                ReplaceReason::NoCurrentNode => write!(
                    f,
                    "cannot embed when the current view has no node: replaced the view"
                ),
            },
            HiddenActionTaken { label } => write!(
                f,
                "took the action '{}' although its visibility check fails",
                label
            ),
        }
    }
}
