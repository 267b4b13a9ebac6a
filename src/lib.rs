//! Engine for branching, passage based interactive fiction.
//!
//! A story is a graph of nodes, one for every content unit that the reader can reach.
//! Nodes hold actions which the reader can take, and every action holds the outcomes
//! it can result in: an outcome changes the story variables and may navigate to
//! another node. The text of a unit is processed through a small markup with
//! placeholders for substitutions and detail links.
//!
//! Navigations either replace the view or embed the new unit beneath it, building a
//! continuously scrolling page. Every rendered view records the story variables at
//! that moment, so that a page can be rendered again exactly as it was when a save
//! is restored.
//!
//! The engine does not know how text is stored, shown or saved. Those services are
//! provided through the traits in [`host`].
//!
//! # Example
//! ```
//! use storyweave::{
//!     host::memory::{MemoryHost, MemoryStore},
//!     OutcomeBuilder, Session, Story, TextSub,
//! };
//!
//! let store = MemoryStore::new()
//!     .with_unit("Gate", "The gate is {0}.")
//!     .with_unit("Garden", "Roses everywhere.");
//!
//! let mut story = Story::new(store);
//! let gate = story.make_node("Gate").unwrap();
//!
//! story.set_sub_count("Gate", 1).unwrap();
//! story
//!     .set_subs(
//!         "Gate",
//!         vec![TextSub::computed(|state| {
//!             match state.get("visited").and_then(|value| value.as_bool()) {
//!                 Some(true) => "open".to_string(),
//!                 _ => "closed".to_string(),
//!             }
//!         })],
//!     )
//!     .unwrap();
//!
//! story
//!     .add_link_with(
//!         gate,
//!         "open the gate",
//!         OutcomeBuilder::to("Garden").effect(|state| {
//!             state.set("visited", true);
//!         }),
//!     )
//!     .unwrap();
//!
//! let mut session = Session::new(story, MemoryHost::new(), "Gate");
//! session.start().unwrap();
//! assert_eq!(session.host().renderer.transcript(), vec!["The gate is closed."]);
//!
//! session.take_action("Gate", 0).unwrap();
//! assert_eq!(session.current(), Some("Garden"));
//! assert_eq!(session.host().renderer.transcript(), vec!["Roses everywhere."]);
//! ```

#[macro_use]
mod error;

mod consts;
pub mod container;
pub mod graph;
pub mod host;
pub mod log;
pub mod markup;
pub mod page;
pub mod session;
pub mod state;

pub use container::{AnyMember, Container, Membership};
pub use error::{
    EngineError, MarkupError, MarkupErrorKind, Origin, StateError, ValidationError,
    ValidationErrorKind,
};
pub use graph::{
    Action, ActionId, Align, Command, Direction, FollowUp, Node, NodeId, NodeKind, Outcome,
    OutcomeBuilder, OutcomeId, Registry, SelectionPolicy, Story, Visibility,
};
pub use markup::{Fragment, Paragraph, Parser, ProcessedUnit, TextSub};
pub use page::{DebugController, Page, Path};
pub use session::{
    AutosavePolicy, Menu, MenuCondition, PersistedState, SavesManager, Session, Slot, Version,
};
pub use state::{EngineRng, StoryState, Value};
