//! Playing through a story, and persisting the play.

mod menu;
mod saves;
mod session;

pub use menu::{Menu, MenuCondition};
pub use saves::{AutosavePolicy, PersistedState, SaveCheck, SavesManager, Slot, Version};
pub use session::Session;
