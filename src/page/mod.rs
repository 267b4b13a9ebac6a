//! The continuous view, the choice log and the debug toggle.

mod debug;
mod page;
mod path;

pub use debug::DebugController;
pub use page::{scenes, Page, PageScenes, Scene};
pub use path::{Edge, Path};

pub(crate) use path::next_autoplay_edge;
