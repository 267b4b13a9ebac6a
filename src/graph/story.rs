//! Setting up the story graph.

use crate::{
    consts::{RESERVED_UNITS, RETURN_TO_STORY},
    error::{EngineError, Origin, ValidationError, ValidationErrorKind},
    graph::{
        action::{Action, Visibility},
        node::{Node, NodeKind},
        outcome::{Command, Direction, FollowUp, Outcome, OutcomeBuilder, Target},
        registry::{ActionId, NodeId, OutcomeId, Registry},
    },
    host::ContentStore,
    markup::{Parser, TextSub},
    state::StoryState,
};

#[derive(Debug)]
/// Story graph of nodes, actions and outcomes over the units of a content store.
///
/// The graph is built by setup code before play begins. Every object is owned by
/// the story's [`Registry`] and referred to by handles, which is what every method
/// here takes and returns.
///
/// # Examples
/// ```
/// # use storyweave::{host::memory::MemoryStore, Story};
/// let store = MemoryStore::new()
///     .with_unit("Hall", "A long hall.")
///     .with_unit("Cellar", "A damp cellar.");
///
/// let mut story = Story::new(store);
///
/// let hall = story.make_node("Hall").unwrap();
/// story.add_link(hall, "go down", "Cellar").unwrap();
///
/// assert!(story.get_node("Cellar").is_some());
/// assert!(story.get_action(hall, "go down").is_some());
/// ```
pub struct Story<S> {
    store: S,
    registry: Registry,
    parser: Parser,
}

impl<S: ContentStore> Story<S> {
    pub fn new(store: S) -> Self {
        Story {
            store,
            registry: Registry::new(),
            parser: Parser::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn parser(&self) -> &Parser {
        &self.parser
    }

    pub fn node(&self, node: NodeId) -> &Node {
        self.registry.node(node)
    }

    pub fn node_mut(&mut self, node: NodeId) -> &mut Node {
        self.registry.node_mut(node)
    }

    pub fn action(&self, action: ActionId) -> &Action {
        self.registry.action(action)
    }

    pub fn action_mut(&mut self, action: ActionId) -> &mut Action {
        self.registry.action_mut(action)
    }

    pub fn outcome(&self, outcome: OutcomeId) -> &Outcome {
        self.registry.outcome(outcome)
    }

    /// Create a node for a content unit.
    ///
    /// # Errors
    /// *   [`MissingUnit`][crate::error::ValidationErrorKind::MissingUnit]: if the
    ///     content store has no such unit.
    /// *   [`ReservedUnit`][crate::error::ValidationErrorKind::ReservedUnit]: if the
    ///     unit is reserved by the host.
    /// *   [`UnitAlreadyBound`][crate::error::ValidationErrorKind::UnitAlreadyBound]:
    ///     if another node already uses the unit.
    pub fn make_node(&mut self, unit: &str) -> Result<NodeId, ValidationError> {
        self.build_node(unit, NodeKind::Narrative)
    }

    /// Create an out-of-character node, such as a help screen.
    ///
    /// The node comes with an action labelled "return to story" which restores the
    /// autosave. It stays the last action of the node. `visible` sets whether it is
    /// displayed.
    ///
    /// # Errors
    /// See [`make_node`][Story::make_node].
    pub fn make_info_node(&mut self, unit: &str, visible: bool) -> Result<NodeId, ValidationError> {
        let node = self.build_node(unit, NodeKind::OutOfCharacter)?;

        let action = Action::new(RETURN_TO_STORY)?.with_visibility(Visibility::from(visible));
        let action = self.registry.add_action(None, action)?;

        self.add_outcome(
            action,
            OutcomeBuilder::new().command(Command::RestoreAutosave),
        )?;
        self.push_action(node, action)?;

        Ok(node)
    }

    fn build_node(&mut self, unit: &str, kind: NodeKind) -> Result<NodeId, ValidationError> {
        let error = |kind| Err(ValidationError::from_kind(Origin::unit(unit), kind));

        if !self.store.has(unit) {
            return error(ValidationErrorKind::MissingUnit {
                unit: unit.to_string(),
            });
        }

        if RESERVED_UNITS.contains(&unit) {
            return error(ValidationErrorKind::ReservedUnit {
                unit: unit.to_string(),
            });
        }

        self.registry.add_node(None, Node::new(unit, kind))
    }

    /// Get the node of a content unit.
    pub fn get_node(&self, unit: &str) -> Option<&Node> {
        self.node_for(unit).map(|node| self.registry.node(node))
    }

    /// Get the handle to the node of a content unit.
    pub fn node_for(&self, unit: &str) -> Option<NodeId> {
        self.registry.node_for(unit)
    }

    /// Get the node of a content unit, creating it if there is none.
    pub(crate) fn node_or_make(&mut self, unit: &str) -> Result<NodeId, ValidationError> {
        match self.node_for(unit) {
            Some(node) => Ok(node),
            None => self.make_node(unit),
        }
    }

    /// Register an action which has been built by hand, under the given id or a
    /// generated one. The action is not added to any node.
    ///
    /// # Errors
    /// *   [`EmptyId`][crate::error::ValidationErrorKind::EmptyId]: if the id is empty.
    /// *   [`DuplicateId`][crate::error::ValidationErrorKind::DuplicateId]: if the id is
    ///     already registered.
    pub fn build_action(
        &mut self,
        id: Option<&str>,
        action: Action,
    ) -> Result<ActionId, ValidationError> {
        self.registry.add_action(id, action)
    }

    /// Add an action to the end of the action list of a node.
    ///
    /// # Errors
    /// *   [`NotAMember`][crate::error::ValidationErrorKind::NotAMember]: if the action
    ///     is not registered in this story.
    pub fn push_action(&mut self, node: NodeId, action: ActionId) -> Result<(), ValidationError> {
        let known = self.registry.known_actions();
        let origin = self.registry.node(node).origin();

        self.registry
            .node_mut(node)
            .actions_mut()
            .push(vec![action], &known)
            .map_err(|err| with_origin(err, origin))
    }

    /// Insert an action into the action list of a node. An index past the end, or
    /// inside the fixed tail of the list, inserts the action just before the tail.
    ///
    /// # Errors
    /// See [`push_action`][Story::push_action].
    pub fn insert_action(
        &mut self,
        node: NodeId,
        index: usize,
        action: ActionId,
    ) -> Result<(), ValidationError> {
        let known = self.registry.known_actions();
        let origin = self.registry.node(node).origin();

        self.registry
            .node_mut(node)
            .actions_mut()
            .insert(index, action, &known)
            .map_err(|err| with_origin(err, origin))
    }

    /// Find the first action of a node with the given display text.
    pub fn get_action(&self, node: NodeId, label: &str) -> Option<ActionId> {
        self.registry
            .node(node)
            .actions()
            .iter()
            .copied()
            .find(|&action| self.registry.action(action).get_text() == label)
    }

    /// Build an action with a single outcome which runs `effect`, and insert it into
    /// the action list of a node at `index`, or at the end if `None`.
    ///
    /// # Errors
    /// *   [`EmptyText`][crate::error::ValidationErrorKind::EmptyText]: if the label is
    ///     empty.
    pub fn add_action<F>(
        &mut self,
        node: NodeId,
        label: &str,
        effect: F,
        visibility: Visibility,
        index: Option<usize>,
    ) -> Result<ActionId, ValidationError>
    where
        F: Fn(&mut StoryState) + Send + Sync + 'static,
    {
        let action = Action::new(label)?.with_visibility(visibility);
        let action = self.registry.add_action(None, action)?;

        self.add_outcome(action, OutcomeBuilder::new().effect(effect))?;
        self.insert_action(node, index.unwrap_or(usize::MAX), action)?;

        Ok(action)
    }

    /// Add an outcome to the end of an action.
    ///
    /// A target unit without a node gets one.
    ///
    /// # Errors
    /// *   [`OutcomeWithoutEffect`][crate::error::ValidationErrorKind::OutcomeWithoutEffect]:
    ///     if the outcome has neither an effect nor a target.
    /// *   Any error from [`make_node`][Story::make_node] when creating the target node.
    pub fn add_outcome(
        &mut self,
        action: ActionId,
        outcome: OutcomeBuilder,
    ) -> Result<OutcomeId, ValidationError> {
        let OutcomeBuilder {
            effect,
            target,
            embed,
            nobreak,
        } = outcome;

        let follow_up = match target {
            Some(Target::Unit(unit)) => {
                let mut direction = Direction::to(self.node_or_make(&unit)?).nobreak(nobreak);

                if let Some(embed) = embed {
                    direction = direction.embed(embed);
                }

                FollowUp::Navigate(direction)
            }
            Some(Target::Command(command)) => FollowUp::Command(command),
            None if effect.is_some() => FollowUp::Stay,
            None => {
                return Err(ValidationError::from_kind(
                    Origin::id(self.registry.action(action).id()),
                    ValidationErrorKind::OutcomeWithoutEffect,
                ));
            }
        };

        let outcome = self
            .registry
            .add_outcome(|id| Outcome::new(id, effect, follow_up));
        let known = self.registry.known_outcomes();

        self.registry
            .action_mut(action)
            .outcomes_mut()
            .push(vec![outcome], &known)?;

        Ok(outcome)
    }

    /// Add an action which loads the node of a content unit, creating the node if
    /// there is none.
    ///
    /// # Errors
    /// See [`add_link_with`][Story::add_link_with].
    pub fn add_link(
        &mut self,
        node: NodeId,
        label: &str,
        unit: &str,
    ) -> Result<ActionId, ValidationError> {
        self.add_link_with(node, label, OutcomeBuilder::to(unit))
    }

    /// Add an action with a single outcome to the end of the action list of a node.
    ///
    /// # Errors
    /// *   [`EmptyText`][crate::error::ValidationErrorKind::EmptyText]: if the label is
    ///     empty.
    /// *   Any error from [`add_outcome`][Story::add_outcome].
    pub fn add_link_with(
        &mut self,
        node: NodeId,
        label: &str,
        outcome: OutcomeBuilder,
    ) -> Result<ActionId, ValidationError> {
        let action = self.registry.add_action(None, Action::new(label)?)?;

        self.add_outcome(action, outcome)?;
        self.push_action(node, action)?;

        Ok(action)
    }

    /// Set the number of text substitutions of a unit, creating its node if there
    /// is none.
    ///
    /// # Errors
    /// *   Any error from [`make_node`][Story::make_node] when creating the node.
    /// *   Any error from [`Node::set_sub_count`].
    pub fn set_sub_count(&mut self, unit: &str, count: usize) -> Result<NodeId, EngineError> {
        let node = self.node_or_make(unit)?;
        self.registry.node_mut(node).set_sub_count(count)?;

        Ok(node)
    }

    /// Set the text substitutions of a unit.
    ///
    /// # Errors
    /// *   [`UnknownNode`][crate::error::ValidationErrorKind::UnknownNode]: if no node
    ///     is bound to the unit.
    /// *   Any error from [`Parser::set_subs`].
    pub fn set_subs(&mut self, unit: &str, subs: Vec<TextSub>) -> Result<(), ValidationError> {
        let node = self.node_for(unit).ok_or_else(|| unknown_node(unit))?;
        self.parser.set_subs(self.registry.node(node), subs)
    }

    /// Register a transform for the raw text of a unit.
    pub fn add_preprocessor<F>(&mut self, unit: &str, preprocessor: F)
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.parser.add_preprocessor(unit, preprocessor);
    }

    /// Add every action of a node to the end of another.
    ///
    /// The fixed actions at the end of the source list, like the "return to story"
    /// action of an info node, are not copied.
    ///
    /// # Errors
    /// See [`push_action`][Story::push_action].
    pub fn copy_actions(&mut self, from: NodeId, to: NodeId) -> Result<(), ValidationError> {
        let actions = self.registry.node(from).actions();
        let copied = actions.as_slice()[..actions.len() - actions.fixed_end().min(actions.len())]
            .to_vec();

        let known = self.registry.known_actions();
        let origin = self.registry.node(to).origin();

        self.registry
            .node_mut(to)
            .actions_mut()
            .push(copied, &known)
            .map_err(|err| with_origin(err, origin))
    }

    /// Run the lifecycle hook of a node.
    pub fn on_load(&self, node: NodeId, state: &mut StoryState) {
        self.registry.node(node).on_load(state);
    }
}

pub(crate) fn unknown_node(unit: &str) -> ValidationError {
    ValidationError::from_kind(
        Origin::unit(unit),
        ValidationErrorKind::UnknownNode {
            unit: unit.to_string(),
        },
    )
}

fn with_origin(mut err: ValidationError, origin: Origin) -> ValidationError {
    err.origin = origin;
    err
}
