//! Utilities for printing and handling errors.

use std::fmt;

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde_support", derive(Deserialize, Serialize))]
/// Information about which part of a story an item concerns.
///
/// Attached to errors and log messages so that a failure during play can be traced
/// back to the content unit, node, action or outcome that was being handled.
pub struct Origin {
    /// Content unit involved, if any.
    pub unit: Option<String>,
    /// Registry id of the node, action or outcome involved, if any.
    pub id: Option<String>,
}

impl Origin {
    /// Origin which refers to a content unit.
    pub fn unit(unit: &str) -> Self {
        Origin {
            unit: Some(unit.to_string()),
            id: None,
        }
    }

    /// Origin which refers to a registered object.
    pub fn id(id: &str) -> Self {
        Origin {
            unit: None,
            id: Some(id.to_string()),
        }
    }

    /// Add a registry id to the origin.
    pub fn with_id(mut self, id: &str) -> Self {
        self.id.replace(id.to_string());
        self
    }

    /// Whether or not the origin refers to anything at all.
    pub fn is_empty(&self) -> bool {
        self.unit.is_none() && self.id.is_none()
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (&self.unit, &self.id) {
            (Some(unit), Some(id)) => write!(f, "(unit '{}', id '{}')", unit, id),
            (Some(unit), None) => write!(f, "(unit '{}')", unit),
            (None, Some(id)) => write!(f, "(id '{}')", id),
            (None, None) => Ok(()),
        }
    }
}

/// Write origin information in front of an error or log message.
pub(crate) fn write_origin<W: fmt::Write>(buffer: &mut W, origin: &Origin) -> fmt::Result {
    if origin.is_empty() {
        Ok(())
    } else {
        write!(buffer, "{} ", origin)
    }
}

/// Wrapper to implement From for variants when the variant is simply encapsulated
/// in the enum.
///
/// # Example
/// Running
/// ```ignore
/// impl_from_error![
///     MyError;
///     [Variant, ErrorData]
/// ];
/// ```
/// is identical to running
/// ```ignore
/// impl From<ErrorData> for MyError {
///     fn from(err: ErrorData) -> Self {
///         MyError::Variant(err)
///     }
/// }
/// ```
macro_rules! impl_from_error {
    ($for_type:ident; $([$variant:ident, $from_type:ident]),+) => {
        $(
            impl From<$from_type> for $for_type {
                fn from(err: $from_type) -> Self {
                    $for_type::$variant(err)
                }
            }
        )*
    }
}
