//! Record of the choices made during play.

use std::fmt::Write;

use crate::{
    consts::{PATH_KEY, POINTER_KEY},
    error::StateError,
    host::{MetaValue, Metadata},
};

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde_support", derive(Deserialize, Serialize))]
/// One taken action and its result.
pub struct Edge {
    /// Number of actions of the node the action was taken from.
    pub actions: usize,
    /// Index of the taken action.
    pub action: usize,
    /// Number of outcomes of the taken action.
    pub outcomes: usize,
    /// Index of the outcome which was carried out.
    pub outcome: usize,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde_support", derive(Deserialize, Serialize))]
/// Append-only log of every choice made since the story started.
///
/// Replaying the log from the start of the story reproduces the same walk through
/// the graph, as long as the graph has not changed.
pub struct Path {
    edges: Vec<Edge>,
}

impl Path {
    pub fn new() -> Self {
        Path::default()
    }

    pub fn add_edge(&mut self, actions: usize, action: usize, outcomes: usize, outcome: usize) {
        self.edges.push(Edge {
            actions,
            action,
            outcomes,
            outcome,
        });
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn get(&self, pointer: usize) -> Option<&Edge> {
        self.edges.get(pointer)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Human readable listing of the path, one line per choice.
    ///
    /// # Examples
    /// ```
    /// # use storyweave::Path;
    /// let mut path = Path::new();
    /// path.add_edge(3, 1, 2, 0);
    ///
    /// assert_eq!(path.view(), "took action 2 of 3; got outcome 1 of 2\n");
    /// ```
    pub fn view(&self) -> String {
        let mut buffer = String::new();

        for edge in &self.edges {
            // Writing to a String cannot fail
            let _ = writeln!(
                buffer,
                "took action {} of {}; got outcome {} of {}",
                edge.action + 1,
                edge.actions,
                edge.outcome + 1,
                edge.outcomes
            );
        }

        buffer
    }

    /// Store the path with a pointer to its first choice in the session metadata.
    ///
    /// While the metadata holds a path, a session replays its choices instead of
    /// waiting for the reader. The caller is expected to restart the story.
    ///
    /// # Errors
    /// *   [`EmptyPath`][crate::error::StateError::EmptyPath]: if there are no choices
    ///     to replay.
    pub fn auto_play<M: Metadata + ?Sized>(&self, metadata: &mut M) -> Result<(), StateError> {
        if self.is_empty() {
            return Err(StateError::EmptyPath);
        }

        metadata.memorize(PATH_KEY, MetaValue::Path(self.clone()));
        metadata.memorize(POINTER_KEY, MetaValue::Pointer(0));

        Ok(())
    }
}

/// Take the next recorded choice from the session metadata, if autoplay is active.
///
/// Advances the pointer, or forgets the path once its last choice is taken.
pub(crate) fn next_autoplay_edge<M: Metadata + ?Sized>(metadata: &mut M) -> Option<(usize, Edge)> {
    let path = match metadata.recall(PATH_KEY) {
        Some(MetaValue::Path(path)) => path,
        _ => return None,
    };

    let pointer = match metadata.recall(POINTER_KEY) {
        Some(MetaValue::Pointer(pointer)) => pointer,
        _ => 0,
    };

    match path.get(pointer).copied() {
        Some(edge) if pointer + 1 < path.len() => {
            metadata.memorize(POINTER_KEY, MetaValue::Pointer(pointer + 1));
            Some((pointer, edge))
        }
        edge => {
            metadata.forget(PATH_KEY);
            metadata.forget(POINTER_KEY);
            edge.map(|edge| (pointer, edge))
        }
    }
}
