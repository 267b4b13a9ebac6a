//! Mutable story state: variables, their history and the random number generator.

mod rng;
mod snapshot;
mod variable;

pub use rng::EngineRng;
pub use snapshot::{Rewind, StoryState};
pub use variable::{Value, VariableSet};
