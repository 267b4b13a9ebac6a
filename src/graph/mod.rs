//! Nodes, actions and outcomes, and the story which owns them.

mod action;
mod node;
mod outcome;
mod registry;
mod story;

pub use action::{Action, Align, Predicate, SelectionPolicy, Selector, Visibility};
pub use node::{ActionList, Hook, Node, NodeKind};
pub use outcome::{Command, Direction, Effect, FollowUp, Outcome, OutcomeBuilder};
pub use registry::{ActionId, Handle, NodeId, OutcomeId, Registry};
pub use story::Story;

pub(crate) use story::unknown_node;
