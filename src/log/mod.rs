//! Utilities for inspecting what a session did and which problems it worked around.

mod logger;
mod message;

pub use logger::{Logger, LoggerIter};
pub use message::{Event, LogMessage, MessageKind, ReplaceReason, Warning};
