//! Errors from building or walking through a story graph.

#[macro_use]
mod utils;
mod error;
mod markup;

pub use error::{EngineError, StateError, ValidationError, ValidationErrorKind};
pub use markup::{MarkupError, MarkupErrorKind};
pub use utils::Origin;

pub(crate) use utils::write_origin;
