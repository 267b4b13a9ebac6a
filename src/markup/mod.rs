//! Conversion of raw content text into processed units.

mod parser;
mod split;
mod unit;

pub use parser::{Computed, Parser, Preprocessor, TextSub};
pub use unit::{Fragment, Paragraph, ProcessedUnit, Regions};
