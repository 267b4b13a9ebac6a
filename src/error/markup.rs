//! Errors from processing the markup of a content unit.

use std::{error::Error, fmt};

#[derive(Clone, Debug, PartialEq)]
/// Error from processing the text of a content unit before it is rendered.
pub struct MarkupError {
    /// Content unit whose text was processed.
    pub unit: String,
    /// Error variant.
    pub kind: MarkupErrorKind,
}

#[derive(Clone, Debug, PartialEq)]
/// Variant of markup errors.
pub enum MarkupErrorKind {
    /// The node expects more substitutions than placeholders in the text.
    TooFewSubstitutions { expected: usize, found: usize },
    /// A placeholder index is not below the substitution count of the node.
    SubstitutionOutOfRange { index: usize, count: usize },
    /// A placeholder index appears more than once.
    DuplicateSubstitution { index: usize },
    /// A detail link has no matching description.
    DetailWithoutDescription { id: String },
}

impl Error for MarkupError {}

impl fmt::Display for MarkupError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use MarkupErrorKind::*;

        match &self.kind {
            TooFewSubstitutions { expected, found } => write!(
                f,
                "too few text substitutions in '{}' (expected {}, found {})",
                self.unit, expected, found
            ),
            SubstitutionOutOfRange { index, count } => write!(
                f,
                "text substitution index {} out of range in '{}' (count is {})",
                index, self.unit, count
            ),
            DuplicateSubstitution { index } => write!(
                f,
                "duplicate text substitution index {} in '{}'",
                index, self.unit
            ),
            DetailWithoutDescription { id } => write!(
                f,
                "detail link '{}' without description markup in '{}'",
                id, self.unit
            ),
        }
    }
}
