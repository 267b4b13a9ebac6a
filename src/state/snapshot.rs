//! Live story variables and their recorded history.
//!
//! Every navigation records a moment: a copy of the live variables. Rendering an
//! embedded unit after a reload has to show the variables as they were when that
//! part of the page was first written, so the live set can be temporarily swapped
//! for a recorded moment through [`StoryState::rewind`]. The returned guard puts the
//! live variables back when it goes out of scope, including during a panic.

use std::ops::Deref;

use crate::{
    error::{Origin, ValidationError, ValidationErrorKind},
    state::variable::{Value, VariableSet},
};

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde_support", derive(Deserialize, Serialize))]
/// Mutable story variables owned by a session.
///
/// Variables are split in two sets. The regular set travels through time: it is
/// recorded in every moment and replaced when rewinding. The static set is never
/// recorded nor rewound.
pub struct StoryState {
    variables: VariableSet,
    statics: VariableSet,
    moments: Vec<VariableSet>,
}

impl StoryState {
    pub fn new() -> Self {
        StoryState::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    /// Set a variable, returning its previous value.
    pub fn set<V: Into<Value>>(&mut self, name: &str, value: V) -> Option<Value> {
        self.variables.insert(name.to_string(), value.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.variables.remove(name)
    }

    pub fn variables(&self) -> &VariableSet {
        &self.variables
    }

    pub fn get_static(&self, name: &str) -> Option<&Value> {
        self.statics.get(name)
    }

    /// Set a static variable, returning its previous value.
    pub fn set_static<V: Into<Value>>(&mut self, name: &str, value: V) -> Option<Value> {
        self.statics.insert(name.to_string(), value.into())
    }

    pub fn statics(&self) -> &VariableSet {
        &self.statics
    }

    /// Record the live variables as a new moment.
    pub fn create_moment(&mut self) {
        self.moments.push(self.variables.clone());
    }

    /// Number of recorded moments.
    pub fn moments(&self) -> usize {
        self.moments.len()
    }

    /// Forget every recorded moment.
    pub fn clear_moments(&mut self) {
        self.moments.clear();
    }

    /// Forget every moment but the latest `count`.
    pub fn retain_moments(&mut self, count: usize) {
        let excess = self.moments.len().saturating_sub(count);
        self.moments.drain(..excess);
    }

    /// Look at the variables `offset` moments back without touching the live set.
    ///
    /// An offset of 0 is the present, which is the live set. An offset of `n` is the
    /// moment recorded `n` navigations before the latest one.
    pub fn peek(&self, offset: usize) -> Option<&VariableSet> {
        if offset == 0 {
            Some(&self.variables)
        } else {
            self.moments
                .len()
                .checked_sub(offset + 1)
                .and_then(|index| self.moments.get(index))
        }
    }

    /// Temporarily replace the live variables with those from `offset` moments back.
    ///
    /// The live set is restored when the returned guard is dropped. Static variables
    /// are untouched. Rewinding by 0 is a no-op.
    ///
    /// # Errors
    /// *   [`SnapshotOutOfRange`][crate::error::ValidationErrorKind::SnapshotOutOfRange]:
    ///     if fewer moments than `offset` are recorded before the latest one.
    ///
    /// # Examples
    /// ```
    /// # use storyweave::StoryState;
    /// let mut state = StoryState::new();
    ///
    /// state.set("lamp", "unlit");
    /// state.create_moment();
    /// state.set("lamp", "lit");
    /// state.create_moment();
    ///
    /// {
    ///     let rewound = state.rewind(1).unwrap();
    ///     assert_eq!(rewound.get("lamp").unwrap().as_text(), Some("unlit"));
    /// }
    ///
    /// assert_eq!(state.get("lamp").unwrap().as_text(), Some("lit"));
    /// ```
    pub fn rewind(&mut self, offset: usize) -> Result<Rewind, ValidationError> {
        if offset == 0 {
            return Ok(Rewind {
                state: self,
                saved: None,
            });
        }

        let moment = self.peek(offset).cloned().ok_or_else(|| {
            ValidationError::from_kind(
                Origin::default(),
                ValidationErrorKind::SnapshotOutOfRange {
                    offset,
                    available: self.moments.len().saturating_sub(1),
                },
            )
        })?;

        let saved = std::mem::replace(&mut self.variables, moment);

        Ok(Rewind {
            state: self,
            saved: Some(saved),
        })
    }

    /// Run a function with the variables from `offset` moments back.
    ///
    /// # Errors
    /// See [`rewind`][StoryState::rewind].
    pub fn with_moment<F, T>(&mut self, offset: usize, f: F) -> Result<T, ValidationError>
    where
        F: FnOnce(&StoryState) -> T,
    {
        let rewound = self.rewind(offset)?;
        Ok(f(&rewound))
    }
}

/// Guard holding a rewound [`StoryState`].
///
/// Dereferences to the state with the historical variables in place. Dropping the
/// guard restores the live variables.
pub struct Rewind<'a> {
    state: &'a mut StoryState,
    saved: Option<VariableSet>,
}

impl<'a> Deref for Rewind<'a> {
    type Target = StoryState;

    fn deref(&self) -> &StoryState {
        &*self.state
    }
}

impl<'a> Drop for Rewind<'a> {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            self.state.variables = saved;
        }
    }
}
