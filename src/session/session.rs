//! Playing through a story.

use crate::{
    consts::{AUTOSTART_KEY, HISTORY_UNIT, MAIN_REGION, MENU_BEGIN, MENU_REGION, MENU_UNIT},
    error::{EngineError, Origin, StateError, ValidationError, ValidationErrorKind},
    graph::{
        unknown_node, ActionId, Command, FollowUp, NodeId, OutcomeBuilder, OutcomeId, Story,
    },
    host::{ActionLink, Block, ContentStore, Host, MetaValue},
    log::{Event, Logger, ReplaceReason, Warning},
    markup::{ProcessedUnit, Regions, TextSub},
    page::{next_autoplay_edge, scenes, DebugController, Edge, Page, Path},
    session::{
        menu::{Menu, MenuCondition},
        saves::{AutosavePolicy, PersistedState, SavesManager, Slot},
    },
    state::{EngineRng, StoryState},
};

/// Recorded choice due to be taken next while autoplaying.
type Pending = Option<(NodeId, Edge)>;

/// One play session of a story.
///
/// The session owns the story graph, the host services and all mutable state: the
/// story variables with their recorded moments, the page and the path. Every
/// navigation goes through [`load`][Session::load], which renders the unit of a
/// node either as a new view or embedded beneath the current one.
///
/// Operations run to completion one at a time. A navigation caused by an outcome
/// finishes the action which caused it. While autoplaying, every navigation hands
/// the next recorded choice back to the operation which started the playback, which
/// takes them in turn.
///
/// # Examples
/// ```
/// # use storyweave::{
/// #     host::memory::{MemoryHost, MemoryStore},
/// #     Session, Story,
/// # };
/// let store = MemoryStore::new()
///     .with_unit("Hall", "A long hall.")
///     .with_unit("Cellar", "A damp cellar.");
///
/// let mut story = Story::new(store);
/// let hall = story.make_node("Hall").unwrap();
/// story.add_link(hall, "go down", "Cellar").unwrap();
///
/// let mut session = Session::new(story, MemoryHost::new(), "Hall");
/// session.page_mut().set_continuous(true);
///
/// session.start().unwrap();
/// session.take_action("Hall", 0).unwrap();
///
/// assert_eq!(session.page().embedded(), &["Cellar".to_string()]);
/// assert_eq!(
///     session.host().renderer.transcript(),
///     vec!["A long hall.", "****", "A damp cellar."]
/// );
/// ```
pub struct Session<S, H> {
    story: Story<S>,
    host: H,
    state: StoryState,
    page: Page,
    path: Path,
    rng: EngineRng,
    /// Primary unit of the view.
    current: Option<String>,
    /// Units of the view as they were rendered: the primary unit, then every
    /// embedded unit.
    rendered: Vec<ProcessedUnit>,
    begin: String,
    debug: DebugController,
    saves: SavesManager,
    autosave: AutosavePolicy,
    menu: Menu,
    /// Record of navigations and warnings.
    pub log: Logger,
}

impl<S: ContentStore, H: Host> Session<S, H> {
    /// Create a session which begins the story at the given unit.
    pub fn new(story: Story<S>, host: H, begin: &str) -> Self {
        Session {
            story,
            host,
            state: StoryState::new(),
            page: Page::new(false),
            path: Path::new(),
            rng: EngineRng::default(),
            current: None,
            rendered: Vec::new(),
            begin: begin.to_string(),
            debug: DebugController::new(),
            saves: SavesManager::default(),
            autosave: AutosavePolicy::new(),
            menu: Menu::default(),
            log: Logger::default(),
        }
    }

    pub fn story(&self) -> &Story<S> {
        &self.story
    }

    pub fn story_mut(&mut self) -> &mut Story<S> {
        &mut self.story
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn state(&self) -> &StoryState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut StoryState {
        &mut self.state
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Primary unit of the view.
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Units of the view as they were last rendered.
    pub fn rendered(&self) -> &[ProcessedUnit] {
        &self.rendered
    }

    pub fn debug(&self) -> &DebugController {
        &self.debug
    }

    pub fn debug_mut(&mut self) -> &mut DebugController {
        &mut self.debug
    }

    pub fn saves(&self) -> &SavesManager {
        &self.saves
    }

    pub fn saves_mut(&mut self) -> &mut SavesManager {
        &mut self.saves
    }

    pub fn autosave_policy_mut(&mut self) -> &mut AutosavePolicy {
        &mut self.autosave
    }

    /// Replace the random number generator, for instance with a seeded one.
    pub fn set_rng(&mut self, rng: EngineRng) {
        self.rng = rng;
    }

    /// Register a transform for the raw text of a unit.
    pub fn add_preprocessor<F>(&mut self, unit: &str, preprocessor: F)
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.story.add_preprocessor(unit, preprocessor);
    }

    /// Set the text substitutions of a unit.
    ///
    /// # Errors
    /// See [`Story::set_subs`].
    pub fn set_subs(&mut self, unit: &str, subs: Vec<TextSub>) -> Result<(), ValidationError> {
        self.story.set_subs(unit, subs)
    }

    /// Load the node of the unit the story begins at, as a new view.
    ///
    /// If the story was restarted from its beginning, or debug mode is on, the
    /// "begin" action of the menu is then taken.
    ///
    /// # Errors
    /// *   [`NoBeginUnit`][crate::error::StateError::NoBeginUnit]: if the session was
    ///     created without a begin unit.
    /// *   [`UnknownNode`][crate::error::ValidationErrorKind::UnknownNode]: if the begin
    ///     unit has no node.
    /// *   Any error from [`load`][Session::load].
    pub fn start(&mut self) -> Result<(), EngineError> {
        let next = self.begin()?;
        self.play(next)
    }

    /// Load a node, either replacing the view or embedding it beneath the view.
    ///
    /// If `embed` is `None` the page decides: continuous pages embed. Out-of-character
    /// nodes always replace the view, as do navigations from a view without a node.
    /// The node's lifecycle hook runs right before its unit is rendered.
    ///
    /// # Errors
    /// *   [`UnknownHandle`][crate::error::ValidationErrorKind::UnknownHandle]: if the
    ///     node belongs to another story.
    /// *   [`SelfEmbedding`][crate::error::StateError::SelfEmbedding]: if embedding the
    ///     primary unit of the view.
    /// *   [`DuplicateEmbedding`][crate::error::StateError::DuplicateEmbedding]: if
    ///     embedding a unit which is already embedded.
    /// *   [`MarkupError`][crate::error::MarkupError]: if the unit text cannot be
    ///     processed.
    pub fn load(
        &mut self,
        node: NodeId,
        embed: Option<bool>,
        nobreak: bool,
    ) -> Result<(), EngineError> {
        if !self.story.registry().contains_node(node) {
            return Err(unknown_handle(format!("{:?}", node)).into());
        }

        let next = self.navigate(node, embed, nobreak)?;
        self.play(next)
    }

    /// Load the node of a content unit.
    ///
    /// # Errors
    /// *   [`UnknownNode`][crate::error::ValidationErrorKind::UnknownNode]: if no node
    ///     is bound to the unit.
    /// *   Any error from [`load`][Session::load].
    pub fn load_unit(
        &mut self,
        unit: &str,
        embed: Option<bool>,
        nobreak: bool,
    ) -> Result<(), EngineError> {
        let node = self.story.node_for(unit).ok_or_else(|| unknown_node(unit))?;
        self.load(node, embed, nobreak)
    }

    /// Take an action of a node: choose an outcome, record the choice and carry the
    /// outcome out.
    ///
    /// Actions which are not displayed can still be taken, but a warning is logged.
    /// Menu actions are taken through the unit `StoryMenu`, which is the unit their
    /// links name.
    ///
    /// # Errors
    /// *   [`UnknownNode`][crate::error::ValidationErrorKind::UnknownNode]: if no node
    ///     is bound to the unit.
    /// *   [`IndexOutOfRange`][crate::error::ValidationErrorKind::IndexOutOfRange]: if
    ///     the node has no action at the index.
    /// *   [`EmptyAction`][crate::error::StateError::EmptyAction]: if the action has no
    ///     outcomes.
    /// *   [`InvalidSelection`][crate::error::StateError::InvalidSelection]: if the
    ///     selection policy picked an outcome the action does not have.
    /// *   Any error from carrying out the outcome.
    pub fn take_action(&mut self, unit: &str, index: usize) -> Result<(), EngineError> {
        if unit == MENU_UNIT {
            return self.take_menu_action(index);
        }

        let node = self.story.node_for(unit).ok_or_else(|| unknown_node(unit))?;

        let (action, count) = {
            let actions = self.story.node(node).actions();

            let action = actions.get(index).copied().ok_or_else(|| {
                ValidationError::from_kind(
                    self.story.node(node).origin(),
                    ValidationErrorKind::IndexOutOfRange {
                        index,
                        len: actions.len(),
                    },
                )
            })?;

            (action, actions.len())
        };

        let visible = self.story.action(action).check(&self.state);
        self.warn_if_hidden(unit, action, visible);

        let (chosen, outcome) = self.choose(unit, action)?;
        let outcomes = self.story.action(action).len();

        self.path.add_edge(count, index, outcomes, chosen);

        let next = self.follow(outcome)?;
        self.play(next)
    }

    /// Take an action of the menu. Menu actions are not recorded in the path.
    ///
    /// # Errors
    /// *   [`IndexOutOfRange`][crate::error::ValidationErrorKind::IndexOutOfRange]: if
    ///     the menu has no action at the index.
    /// *   Any error from choosing or carrying out the outcome, as for
    ///     [`take_action`][Session::take_action].
    pub fn take_menu_action(&mut self, index: usize) -> Result<(), EngineError> {
        self.menu.build(&mut self.story)?;

        let action = self.menu.actions().get(index).copied().ok_or_else(|| {
            ValidationError::from_kind(
                Origin::unit(MENU_UNIT),
                ValidationErrorKind::IndexOutOfRange {
                    index,
                    len: self.menu.actions().len(),
                },
            )
        })?;

        let visible = self.menu_shows(action);
        self.warn_if_hidden(MENU_UNIT, action, visible);

        let (_, outcome) = self.choose(MENU_UNIT, action)?;

        let next = self.follow(outcome)?;
        self.play(next)
    }

    /// Take the "begin" action of the menu if it is displayed. Returns whether it was
    /// taken.
    ///
    /// # Errors
    /// Any error from carrying out the action.
    pub fn auto_start(&mut self) -> Result<bool, EngineError> {
        match self.begin_action()? {
            Some(next) => {
                self.play(next)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Run the effect of an outcome, then follow it up.
    ///
    /// An outcome without a target offers the choices of the view again.
    ///
    /// # Errors
    /// *   [`UnknownHandle`][crate::error::ValidationErrorKind::UnknownHandle]: if the
    ///     outcome belongs to another story.
    /// *   Any error from the navigation or command which follows the effect.
    pub fn carry_out(&mut self, outcome: OutcomeId) -> Result<(), EngineError> {
        if !self.story.registry().contains_outcome(outcome) {
            return Err(unknown_handle(format!("{:?}", outcome)).into());
        }

        let next = self.follow(outcome)?;
        self.play(next)
    }

    /// Carry out a session command.
    ///
    /// # Errors
    /// *   [`NothingToRestore`][crate::error::StateError::NothingToRestore]: if
    ///     restoring a bookmark while none holds a save.
    /// *   Any error from [`restore`][Session::restore],
    ///     [`save_bookmark`][Session::save_bookmark] or [`restart`][Session::restart].
    pub fn execute(&mut self, command: Command) -> Result<(), EngineError> {
        let next = self.command(command)?;
        self.play(next)
    }

    /// Render the view again from the page: the primary unit, then every embedded
    /// unit from oldest to newest.
    ///
    /// Every unit is rendered with the story variables as they were when it was
    /// first rendered. Only the innermost unit is given its actions.
    ///
    /// # Errors
    /// *   [`NoCurrentNode`][crate::error::StateError::NoCurrentNode]: if the session
    ///     has no view.
    /// *   [`UnknownNode`][crate::error::ValidationErrorKind::UnknownNode]: if a unit of
    ///     the view has no node.
    /// *   Any error from rendering a unit.
    pub fn rebuild_after_reload(&mut self) -> Result<(), EngineError> {
        let next = self.rebuild()?;
        self.play(next)
    }

    /// Start the story over. A hard restart also deletes the autosave. Made from the
    /// beginning of the story, it then takes the "begin" action right away.
    ///
    /// If the session metadata holds a recorded path, the story plays it back.
    ///
    /// # Errors
    /// See [`start`][Session::start].
    pub fn restart(&mut self, hard: bool) -> Result<(), EngineError> {
        let next = self.start_over(hard)?;
        self.play(next)
    }

    /// Play the recorded path again from the start of the story.
    ///
    /// Recorded choices are taken one after another without waiting for the reader.
    ///
    /// # Errors
    /// *   [`EmptyPath`][crate::error::StateError::EmptyPath]: if no choice has been
    ///     made.
    /// *   Any error from [`restart`][Session::restart] or from replaying a choice.
    pub fn auto_play(&mut self) -> Result<(), EngineError> {
        self.path.auto_play(&mut self.host)?;
        self.restart(false)
    }

    /// Save the session to the first empty bookmark and return its number.
    ///
    /// # Errors
    /// *   [`BookmarksFull`][crate::error::StateError::BookmarksFull]: if every
    ///     bookmark holds a save.
    pub fn save_bookmark(&mut self) -> Result<usize, EngineError> {
        let state = self.persist();
        let description = self.description();

        Ok(self
            .saves
            .save_bookmark(&mut self.host, &description, &state)?)
    }

    /// Load the save with the given number (0 is the autosave) and rebuild the view.
    ///
    /// # Errors
    /// *   Any error from [`SavesManager::load`].
    /// *   Any error from [`resume`][Session::resume].
    pub fn restore(&mut self, number: usize) -> Result<(), EngineError> {
        let next = self.reload(number)?;
        self.play(next)
    }

    /// Replace the session state with a persisted one and rebuild the view.
    ///
    /// # Errors
    /// See [`rebuild_after_reload`][Session::rebuild_after_reload].
    pub fn resume(&mut self, saved: PersistedState) -> Result<(), EngineError> {
        let next = self.resume_view(saved)?;
        self.play(next)
    }

    /// Everything needed to resume the session later.
    pub fn persist(&self) -> PersistedState {
        PersistedState {
            version: self.saves.version(),
            current: self.current.clone(),
            state: self.state.clone(),
            page: self.page.clone(),
            path: self.path.clone(),
            rng: self.rng.clone(),
        }
    }

    /// Excerpt of the innermost unit of the view, used to describe saves.
    pub fn description(&self) -> String {
        self.current
            .as_deref()
            .map(|primary| self.page.innermost(primary))
            .and_then(|unit| self.story.get_node(unit))
            .and_then(|node| node.get_excerpt())
            .unwrap_or_default()
            .to_string()
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    /// Add an action with a single outcome to the menu, at `index` or at the end if
    /// `None`. The "restart", "load" and "save" actions stay last.
    ///
    /// Without a condition the action is displayed once the story has moved past its
    /// beginning.
    ///
    /// # Errors
    /// *   [`EmptyText`][crate::error::ValidationErrorKind::EmptyText]: if the label is
    ///     empty.
    /// *   Any error from [`Story::add_outcome`].
    pub fn add_menu_action(
        &mut self,
        label: &str,
        outcome: OutcomeBuilder,
        condition: Option<MenuCondition>,
        index: Option<usize>,
    ) -> Result<ActionId, ValidationError> {
        self.menu.build(&mut self.story)?;

        let condition = condition.unwrap_or(MenuCondition::AwayFromStart);
        self.menu
            .add(&mut self.story, label, outcome, condition, index)
    }

    /// Set what the "begin" action of the menu does, replacing the previous one.
    ///
    /// # Errors
    /// See [`add_menu_action`][Session::add_menu_action].
    pub fn on_begin(&mut self, outcome: OutcomeBuilder) -> Result<ActionId, ValidationError> {
        self.menu.build(&mut self.story)?;
        self.menu.set_begin(&mut self.story, outcome)
    }

    /// Add a menu action which loads an info node, creating the node if the unit has
    /// none.
    ///
    /// # Errors
    /// *   [`NotAnInfoNode`][crate::error::ValidationErrorKind::NotAnInfoNode]: if the
    ///     unit is bound to a narrative node.
    /// *   Any error from [`Story::make_info_node`] or
    ///     [`add_menu_action`][Session::add_menu_action].
    pub fn add_info_link(&mut self, label: &str, unit: &str) -> Result<ActionId, ValidationError> {
        match self.story.node_for(unit) {
            Some(node) if !self.story.node(node).is_out_of_character() => {
                return Err(ValidationError::from_kind(
                    Origin::unit(unit),
                    ValidationErrorKind::NotAnInfoNode {
                        unit: unit.to_string(),
                    },
                ));
            }
            Some(_) => (),
            None => {
                self.story.make_info_node(unit, true)?;
            }
        }

        self.add_menu_action(label, OutcomeBuilder::to(unit).embed(false), None, None)
    }

    /// Links of every menu action which is currently displayed.
    pub fn menu_links(&self) -> Vec<ActionLink> {
        self.menu
            .actions()
            .iter()
            .enumerate()
            .filter(|(_, action)| self.menu_shows(**action))
            .map(|(index, &action)| {
                let action = self.story.action(action);

                ActionLink {
                    unit: MENU_UNIT.to_string(),
                    index,
                    label: action.get_text().to_string(),
                    align: action.get_align(),
                }
            })
            .collect()
    }

    fn current_node(&self) -> Option<NodeId> {
        self.current
            .as_deref()
            .and_then(|unit| self.story.node_for(unit))
    }

    fn innermost_node(&self) -> Option<NodeId> {
        self.current
            .as_deref()
            .map(|primary| self.page.innermost(primary))
            .and_then(|unit| self.story.node_for(unit))
    }

    /// Whether the view shows the begin unit and nothing beneath it.
    fn at_start(&self) -> bool {
        self.current.as_deref() == Some(self.begin.as_str()) && self.page.is_empty()
    }

    fn menu_shows(&self, action: ActionId) -> bool {
        self.menu
            .condition(action)
            .holds(self.at_start(), self.host.has(Slot::Auto))
            && self.story.action(action).check(&self.state)
    }

    /// Take recorded choices until none is left.
    fn play(&mut self, mut next: Pending) -> Result<(), EngineError> {
        while let Some((node, edge)) = next {
            next = self.replay(node, edge)?;
        }

        Ok(())
    }

    fn begin(&mut self) -> Result<Pending, EngineError> {
        if self.begin.is_empty() {
            return Err(StateError::NoBeginUnit.into());
        }

        self.menu.build(&mut self.story)?;

        let node = self
            .story
            .node_for(&self.begin)
            .ok_or_else(|| unknown_node(&self.begin))?;

        let next = self.navigate(node, Some(false), false)?;

        let requested = matches!(
            self.host.recall(AUTOSTART_KEY),
            Some(MetaValue::Flag(true))
        );
        self.host.forget(AUTOSTART_KEY);

        if next.is_none() && (requested || self.debug.is_on()) {
            Ok(self.begin_action()?.flatten())
        } else {
            Ok(next)
        }
    }

    /// Carry out the "begin" action if it is displayed.
    fn begin_action(&mut self) -> Result<Option<Pending>, EngineError> {
        self.menu.build(&mut self.story)?;

        let action = match self.menu.get_action(&self.story, MENU_BEGIN) {
            Some(action) if self.menu_shows(action) => action,
            _ => return Ok(None),
        };

        let (_, outcome) = self.choose(MENU_UNIT, action)?;
        self.follow(outcome).map(Some)
    }

    fn navigate(
        &mut self,
        node: NodeId,
        embed: Option<bool>,
        nobreak: bool,
    ) -> Result<Pending, EngineError> {
        let (unit, out_of_character) = {
            let node = self.story.node(node);
            (node.unit().to_string(), node.is_out_of_character())
        };

        let origin = Origin::unit(&unit);

        if self.debug.observe(&unit) {
            let on = self.debug.is_on();
            self.log.add_event(Event::DebugToggled { on }, &origin);
        }

        let mut embed = embed.unwrap_or_else(|| self.page.is_continuous());

        if embed && out_of_character {
            self.force_replace(ReplaceReason::OutOfCharacter, &origin);
            embed = false;
        } else if embed && self.current_node().is_none() {
            self.force_replace(ReplaceReason::NoCurrentNode, &origin);
            embed = false;
        }

        if embed {
            self.page.check_embed(self.current.as_deref(), &unit)?;
        }

        self.story.on_load(node, &mut self.state);

        if embed {
            self.embed(node, nobreak)
        } else {
            self.replace(node)
        }
    }

    fn warn_if_hidden(&mut self, unit: &str, action: ActionId, visible: bool) {
        if !visible {
            let action = self.story.action(action);
            let origin = Origin::unit(unit).with_id(action.id());
            let label = action.get_text().to_string();

            self.log
                .add_warning(Warning::HiddenActionTaken { label }, &origin);
        }
    }

    /// Select an outcome of an action, returning its index and handle.
    fn choose(&mut self, unit: &str, action: ActionId) -> Result<(usize, OutcomeId), EngineError> {
        let action = self.story.action(action);
        let origin = Origin::unit(unit).with_id(action.id());

        if action.is_random() && !EngineRng::ENABLED {
            self.log
                .add_warning(Warning::RandomPolicyWithoutRandom, &origin);
        }

        let index = action
            .select(&self.state, &mut self.rng)
            .ok_or_else(|| StateError::EmptyAction {
                unit: unit.to_string(),
                label: action.get_text().to_string(),
            })?;

        let outcome = action.outcomes().get(index).copied().ok_or_else(|| {
            StateError::InvalidSelection {
                unit: unit.to_string(),
                label: action.get_text().to_string(),
                index,
                count: action.len(),
            }
        })?;

        Ok((index, outcome))
    }

    fn follow(&mut self, outcome: OutcomeId) -> Result<Pending, EngineError> {
        let outcome = self.story.outcome(outcome);
        outcome.run_effect(&mut self.state);

        match outcome.follow_up() {
            FollowUp::Stay => self.offer_choices(),
            FollowUp::Navigate(direction) => {
                self.navigate(direction.target, direction.embed, direction.nobreak)
            }
            FollowUp::Command(command) => self.command(command),
        }
    }

    fn command(&mut self, command: Command) -> Result<Pending, EngineError> {
        match command {
            Command::RestoreAutosave => self.reload(0),
            Command::SaveBookmark => {
                self.save_bookmark()?;
                self.offer_choices()
            }
            Command::RestoreBookmark => {
                let number = self
                    .saves
                    .first_bookmark(&self.host)
                    .ok_or(StateError::NothingToRestore { slot: 1 })?;

                self.reload(number)
            }
            Command::Restart { hard } => self.start_over(hard),
        }
    }

    fn rebuild(&mut self) -> Result<Pending, EngineError> {
        let primary = self.current.clone().ok_or(StateError::NoCurrentNode)?;
        let primary_node = self
            .story
            .node_for(&primary)
            .ok_or_else(|| unknown_node(&primary))?;

        self.clear_view();

        let depth = self.page.len();
        let mut rendered = Vec::with_capacity(depth + 1);

        let processed = self.render(primary_node, depth)?;
        self.host.replace(MAIN_REGION, Block::Unit(&processed));
        rendered.push(processed);

        let embedded = self
            .page
            .embedded()
            .iter()
            .cloned()
            .zip(self.page.nobreak_flags().iter().copied())
            .collect::<Vec<_>>();

        for (i, (unit, nobreak)) in embedded.into_iter().enumerate() {
            let node = self.story.node_for(&unit).ok_or_else(|| unknown_node(&unit))?;
            let processed = self.render(node, depth - (i + 1))?;
            let next = rendered[i].regions().next;

            if !nobreak {
                self.host.append(&next, Block::SceneBreak);
            }

            self.host.append(&next, Block::Unit(&processed));
            rendered.push(processed);
        }

        self.rendered = rendered;

        self.log
            .add_event(Event::Rebuilt { embedded: depth }, &Origin::unit(&primary));

        if let Some(unit) = self.rendered.last() {
            let body = unit.regions().body;
            self.host.scroll_to(&body);
        }

        self.offer_choices()
    }

    fn start_over(&mut self, hard: bool) -> Result<Pending, EngineError> {
        if hard {
            if self.at_start() {
                self.host.memorize(AUTOSTART_KEY, MetaValue::Flag(true));
            }

            self.host.delete(Slot::Auto);
        }

        self.clear_view();

        self.state = StoryState::new();
        self.page = Page::new(self.page.is_continuous());
        self.path = Path::new();
        self.current = None;

        self.log
            .add_event(Event::Restarted { hard }, &Origin::default());

        self.begin()
    }

    fn reload(&mut self, number: usize) -> Result<Pending, EngineError> {
        let saved = self.saves.load(&self.host, number)?;
        self.resume_view(saved)
    }

    fn resume_view(&mut self, saved: PersistedState) -> Result<Pending, EngineError> {
        self.clear_view();

        self.state = saved.state;
        self.page = saved.page;
        self.path = saved.path;
        self.rng = saved.rng;
        self.current = saved.current;

        self.rebuild()
    }

    fn force_replace(&mut self, reason: ReplaceReason, origin: &Origin) {
        self.log
            .add_warning(Warning::EmbedForcedToReplace { reason }, origin);
    }

    fn replace(&mut self, node: NodeId) -> Result<Pending, EngineError> {
        let processed = self.render(node, 0)?;
        let origin = Origin::unit(&processed.unit);

        self.state.create_moment();
        self.clear_view();
        self.page.clear_embedded();
        self.state.retain_moments(1);

        self.current = Some(processed.unit.clone());
        self.host.replace(MAIN_REGION, Block::Unit(&processed));
        self.host.scroll_to_top();
        self.rendered = vec![processed];

        self.log.add_event(Event::Replaced, &origin);

        self.record_history(false);
        self.try_autosave();
        self.offer_choices()
    }

    fn embed(&mut self, node: NodeId, nobreak: bool) -> Result<Pending, EngineError> {
        let processed = self.render(node, 0)?;
        let origin = Origin::unit(&processed.unit);

        let innermost = self
            .rendered
            .last()
            .map(|unit| unit.regions())
            .ok_or(StateError::NoCurrentNode)?;

        self.page
            .push_embedded(self.current.as_deref(), &processed.unit, nobreak)?;

        self.host.clear(&innermost.actions);

        if !nobreak {
            self.host.append(&innermost.next, Block::SceneBreak);
        }

        self.host.append(&innermost.next, Block::Unit(&processed));
        self.host.scroll_to(&processed.regions().body);
        self.rendered.push(processed);

        // A rebuild reads one moment per unit of the view
        self.state.create_moment();
        self.state.retain_moments(self.page.len() + 1);
        self.log.add_event(Event::Embedded { nobreak }, &origin);

        self.record_history(true);
        self.try_autosave();
        self.offer_choices()
    }

    /// Process the text of a node's unit with the variables from `offset` moments
    /// back, and store the excerpt of the result in the node.
    fn render(&mut self, node: NodeId, offset: usize) -> Result<ProcessedUnit, EngineError> {
        let processed = {
            let node = self.story.node(node);
            let unit = node.unit();

            let mut text = self.story.store().text(unit).ok_or_else(|| {
                ValidationError::from_kind(
                    node.origin(),
                    ValidationErrorKind::MissingUnit {
                        unit: unit.to_string(),
                    },
                )
            })?;

            if unit == HISTORY_UNIT {
                text.push_str("\n\n");
                text.push_str(&self.page.history_text());
            }

            let dom_id = self.story.store().dom_id(unit);
            let rewound = self.state.rewind(offset)?;

            self.story.parser().process(node, &dom_id, &text, &rewound)?
        };

        self.story
            .node_mut(node)
            .set_excerpt(processed.excerpt());

        Ok(processed)
    }

    /// Display the actions of the innermost unit and the menu, or hand back the next
    /// recorded choice while autoplaying.
    fn offer_choices(&mut self) -> Result<Pending, EngineError> {
        let node = match self.innermost_node() {
            Some(node) => node,
            None => return Ok(None),
        };

        if let Some((pointer, edge)) = next_autoplay_edge(&mut self.host) {
            let unit = self.story.node(node).unit().to_string();
            self.log
                .add_event(Event::AutoplayStep { pointer }, &Origin::unit(&unit));

            return Ok(Some((node, edge)));
        }

        let node = self.story.node(node);
        let unit = node.unit();
        let region = Regions::of(&self.story.store().dom_id(unit)).actions;

        self.host.clear(&region);

        for (index, &action) in node.actions().iter().enumerate() {
            let action = self.story.action(action);

            if action.check(&self.state) {
                let link = ActionLink {
                    unit: unit.to_string(),
                    index,
                    label: action.get_text().to_string(),
                    align: action.get_align(),
                };

                self.host.append(&region, Block::Action(&link));
            }
        }

        self.host.clear(MENU_REGION);

        for link in self.menu_links() {
            self.host.append(MENU_REGION, Block::Action(&link));
        }

        Ok(None)
    }

    /// Take a recorded choice.
    fn replay(&mut self, node: NodeId, edge: Edge) -> Result<Pending, EngineError> {
        let actions = self.story.node(node).actions();

        let diverged = || StateError::AutoplayDiverged {
            unit: self.story.node(node).unit().to_string(),
            action: edge.action,
            outcome: edge.outcome,
        };

        let action = actions
            .get(edge.action)
            .map(|&action| self.story.action(action))
            .ok_or_else(diverged)?;
        let outcome = action
            .outcomes()
            .get(edge.outcome)
            .copied()
            .ok_or_else(diverged)?;

        self.path
            .add_edge(actions.len(), edge.action, action.len(), edge.outcome);

        self.follow(outcome)
    }

    fn record_history(&mut self, embedded: bool) {
        let scenes = scenes(&self.rendered, self.page.nobreak_flags());
        self.page.record(scenes, embedded);
    }

    /// Write the autosave if the policy allows it.
    fn try_autosave(&mut self) {
        let out_of_character = self
            .current_node()
            .map(|node| self.story.node(node).is_out_of_character())
            .unwrap_or(false);

        if self
            .autosave
            .allows(&self.state, !self.at_start() && !out_of_character)
        {
            let state = self.persist();
            let description = self.description();

            self.host.save(Slot::Auto, &description, &state);
            self.log.add_event(Event::Autosaved, &Origin::default());
        }
    }

    /// Remove every unit of the view from the renderer.
    fn clear_view(&mut self) {
        for unit in self.rendered.drain(..) {
            let regions = unit.regions();

            self.host.clear(&regions.body);
            self.host.clear(&regions.actions);
            self.host.clear(&regions.next);
        }

        self.host.clear(MAIN_REGION);
    }
}

fn unknown_handle(handle: String) -> ValidationError {
    ValidationError::from_kind(
        Origin::default(),
        ValidationErrorKind::UnknownHandle { handle },
    )
}
