//! Ownership and identification of every node, action and outcome in a story.
//!
//! Objects are stored in arenas and referred to by copyable handles. Each object is
//! also registered under a unique string id in an append-only catalog: ids are never
//! reused and nothing is ever removed.

use std::collections::HashMap;

use crate::{
    container::Membership,
    error::{Origin, ValidationError, ValidationErrorKind},
    graph::{action::Action, node::Node, outcome::Outcome},
};

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde_support", derive(Deserialize, Serialize))]
/// Handle to a [`Node`] in a [`Registry`].
pub struct NodeId(pub(crate) usize);

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde_support", derive(Deserialize, Serialize))]
/// Handle to an [`Action`] in a [`Registry`].
pub struct ActionId(pub(crate) usize);

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde_support", derive(Deserialize, Serialize))]
/// Handle to an [`Outcome`] in a [`Registry`].
pub struct OutcomeId(pub(crate) usize);

#[derive(Clone, Copy, Debug, PartialEq)]
/// Handle to any registered object.
pub enum Handle {
    Node(NodeId),
    Action(ActionId),
    Outcome(OutcomeId),
}

#[derive(Debug, Default)]
/// Arena and catalog of the story graph.
pub struct Registry {
    catalog: Vec<String>,
    index: HashMap<String, Handle>,
    nodes: Vec<Node>,
    actions: Vec<Action>,
    outcomes: Vec<Outcome>,
    by_unit: HashMap<String, NodeId>,
    generated: usize,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// All registered ids, in the order they were registered.
    pub fn catalog(&self) -> &[String] {
        &self.catalog
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    /// Find the object registered under an id.
    pub fn lookup(&self, id: &str) -> Option<Handle> {
        self.index.get(id).copied()
    }

    /// Get a node by its handle.
    ///
    /// # Panics
    /// If the handle was issued by the registry of another story. Use
    /// [`contains_node`][Registry::contains_node] to check handles of unknown origin.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn action(&self, id: ActionId) -> &Action {
        &self.actions[id.0]
    }

    pub fn action_mut(&mut self, id: ActionId) -> &mut Action {
        &mut self.actions[id.0]
    }

    pub fn outcome(&self, id: OutcomeId) -> &Outcome {
        &self.outcomes[id.0]
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    pub fn contains_action(&self, id: ActionId) -> bool {
        id.0 < self.actions.len()
    }

    pub fn contains_outcome(&self, id: OutcomeId) -> bool {
        id.0 < self.outcomes.len()
    }

    /// Find the node bound to a content unit.
    pub fn node_for(&self, unit: &str) -> Option<NodeId> {
        self.by_unit.get(unit).copied()
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Register a node under the given id, or a generated one.
    ///
    /// # Errors
    /// *   [`EmptyId`][crate::error::ValidationErrorKind::EmptyId]: if the id is empty.
    /// *   [`DuplicateId`][crate::error::ValidationErrorKind::DuplicateId]: if the id is
    ///     already in the catalog.
    /// *   [`UnitAlreadyBound`][crate::error::ValidationErrorKind::UnitAlreadyBound]: if
    ///     the content unit already belongs to a node.
    pub(crate) fn add_node(
        &mut self,
        id: Option<&str>,
        mut node: Node,
    ) -> Result<NodeId, ValidationError> {
        if self.by_unit.contains_key(node.unit()) {
            return Err(ValidationError::from_kind(
                Origin::unit(node.unit()),
                ValidationErrorKind::UnitAlreadyBound {
                    unit: node.unit().to_string(),
                },
            ));
        }

        let handle = NodeId(self.nodes.len());
        let id = self.register(id, "node", Handle::Node(handle))?;

        node.set_id(id);
        self.by_unit.insert(node.unit().to_string(), handle);
        self.nodes.push(node);

        Ok(handle)
    }

    /// Register an action under the given id, or a generated one.
    ///
    /// # Errors
    /// See [`add_node`][Registry::add_node], except for the unit check.
    pub(crate) fn add_action(
        &mut self,
        id: Option<&str>,
        mut action: Action,
    ) -> Result<ActionId, ValidationError> {
        let handle = ActionId(self.actions.len());
        let id = self.register(id, "action", Handle::Action(handle))?;

        action.set_id(id);
        self.actions.push(action);

        Ok(handle)
    }

    /// Register an outcome under a generated id.
    pub(crate) fn add_outcome(&mut self, outcome: impl FnOnce(String) -> Outcome) -> OutcomeId {
        let handle = OutcomeId(self.outcomes.len());
        let id = self.generate_id("outcome");

        self.catalog.push(id.clone());
        self.index.insert(id.clone(), Handle::Outcome(handle));
        self.outcomes.push(outcome(id));

        handle
    }

    /// Membership check for action lists: the action must be registered here.
    pub fn known_actions(&self) -> impl Membership<ActionId> {
        let count = self.actions.len();
        move |id: &ActionId| id.0 < count
    }

    /// Membership check for actions: the outcome must be registered here.
    pub fn known_outcomes(&self) -> impl Membership<OutcomeId> {
        let count = self.outcomes.len();
        move |id: &OutcomeId| id.0 < count
    }

    fn register(
        &mut self,
        id: Option<&str>,
        kind: &str,
        handle: Handle,
    ) -> Result<String, ValidationError> {
        let id = match id {
            Some(id) => {
                self.validate_id(id)?;
                id.to_string()
            }
            None => self.generate_id(kind),
        };

        self.catalog.push(id.clone());
        self.index.insert(id.clone(), handle);

        Ok(id)
    }

    fn validate_id(&self, id: &str) -> Result<(), ValidationError> {
        if id.is_empty() {
            Err(ValidationError::from_kind(
                Origin::default(),
                ValidationErrorKind::EmptyId,
            ))
        } else if self.index.contains_key(id) {
            Err(ValidationError::from_kind(
                Origin::id(id),
                ValidationErrorKind::DuplicateId { id: id.to_string() },
            ))
        } else {
            Ok(())
        }
    }

    fn generate_id(&mut self, kind: &str) -> String {
        loop {
            let id = format!("{}#{}", kind, self.generated);
            self.generated += 1;

            if !self.index.contains_key(&id) {
                return id;
            }
        }
    }
}
