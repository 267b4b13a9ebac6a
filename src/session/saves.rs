//! Story versions, save slots and the rules for autosaving.

use std::fmt;

use crate::{
    error::{EngineError, Origin, StateError, ValidationError, ValidationErrorKind},
    host::Saves,
    page::{Page, Path},
    state::{EngineRng, StoryState},
};

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

const VERSION_PART_LIMIT: u32 = 1000;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde_support", derive(Deserialize, Serialize))]
/// Three-part version of a story, stamped into every save.
///
/// Every part is below 1000 and the version is never 0.0.0, which lets a version
/// be stored as a single integer.
pub struct Version {
    major: u32,
    minor: u32,
    patch: u32,
}

impl Version {
    /// # Errors
    /// *   [`InvalidVersion`][crate::error::ValidationErrorKind::InvalidVersion]: if a
    ///     part is 1000 or larger, or if every part is 0.
    pub fn new(major: u32, minor: u32, patch: u32) -> Result<Self, ValidationError> {
        let parts = [major, minor, patch];

        if parts.iter().any(|&part| part >= VERSION_PART_LIMIT) || parts == [0, 0, 0] {
            return Err(ValidationError::from_kind(
                Origin::default(),
                ValidationErrorKind::InvalidVersion {
                    major,
                    minor,
                    patch,
                },
            ));
        }

        Ok(Version {
            major,
            minor,
            patch,
        })
    }

    /// Read a version from its integer form.
    ///
    /// # Errors
    /// See [`new`][Version::new].
    pub fn from_integer(value: u32) -> Result<Self, ValidationError> {
        let patch = value % VERSION_PART_LIMIT;
        let minor = (value / VERSION_PART_LIMIT) % VERSION_PART_LIMIT;
        let major = value / (VERSION_PART_LIMIT * VERSION_PART_LIMIT);

        Version::new(major, minor, patch)
    }

    /// Version as a single integer: 32.3.86 is 32003086.
    pub fn as_integer(&self) -> u32 {
        (self.major * VERSION_PART_LIMIT + self.minor) * VERSION_PART_LIMIT + self.patch
    }

    pub fn major(&self) -> u32 {
        self.major
    }

    pub fn minor(&self) -> u32 {
        self.minor
    }

    pub fn patch(&self) -> u32 {
        self.patch
    }
}

impl Default for Version {
    fn default() -> Self {
        Version {
            major: 0,
            minor: 0,
            patch: 1,
        }
    }
}

impl fmt::Display for Version {
    /// Dot separated parts. The patch is left out when it is 0.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;

        if self.patch > 0 {
            write!(f, ".{}", self.patch)?;
        }

        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde_support", derive(Deserialize, Serialize))]
/// Slot in the save storage.
pub enum Slot {
    Auto,
    /// Bookmark slot, counting from 0.
    Bookmark(usize),
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde_support", derive(Deserialize, Serialize))]
/// Everything needed to resume a session.
///
/// The story graph is not included: it is built by setup code every time the story
/// starts.
pub struct PersistedState {
    pub version: Version,
    /// Primary unit of the view.
    pub current: Option<String>,
    pub state: StoryState,
    pub page: Page,
    pub path: Path,
    pub rng: EngineRng,
}

#[derive(Clone, Debug, PartialEq)]
/// Numbered access to the autosave and the bookmarks.
///
/// Saves are numbered the way a reader sees them: 0 is the autosave and bookmarks
/// count from 1.
pub struct SavesManager {
    bookmarks: usize,
    block: bool,
    version: Version,
}

impl SavesManager {
    /// Create a manager for saves of the given story version, with the given number
    /// of bookmark slots. Saves from other versions can be loaded.
    pub fn new(bookmarks: usize, version: Version) -> Self {
        SavesManager {
            bookmarks,
            block: false,
            version,
        }
    }

    pub fn bookmarks(&self) -> usize {
        self.bookmarks
    }

    pub fn set_bookmarks(&mut self, bookmarks: usize) {
        self.bookmarks = bookmarks;
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Set whether to refuse saves made with another version of the story.
    pub fn set_block(&mut self, block: bool) {
        self.block = block;
    }

    /// Slot of a save number.
    ///
    /// # Errors
    /// *   [`SlotOutOfRange`][crate::error::ValidationErrorKind::SlotOutOfRange]: if
    ///     the number is larger than the number of bookmarks.
    pub fn slot(&self, number: usize) -> Result<Slot, ValidationError> {
        match number {
            0 => Ok(Slot::Auto),
            n if n <= self.bookmarks => Ok(Slot::Bookmark(n - 1)),
            n => Err(ValidationError::from_kind(
                Origin::default(),
                ValidationErrorKind::SlotOutOfRange {
                    slot: n,
                    available: self.bookmarks,
                },
            )),
        }
    }

    /// Fetch a save by number.
    ///
    /// # Errors
    /// *   [`SlotOutOfRange`][crate::error::ValidationErrorKind::SlotOutOfRange]: see
    ///     [`slot`][SavesManager::slot].
    /// *   [`NothingToRestore`][crate::error::StateError::NothingToRestore]: if the slot
    ///     is empty.
    /// *   [`IncompatibleSave`][crate::error::StateError::IncompatibleSave]: if saves
    ///     from other versions are blocked and the save is from another version.
    pub fn load<H>(&self, saves: &H, number: usize) -> Result<PersistedState, EngineError>
    where
        H: Saves + ?Sized,
    {
        let saved = saves
            .load(self.slot(number)?)
            .ok_or(StateError::NothingToRestore { slot: number })?;

        if self.block && saved.version != self.version {
            return Err(StateError::IncompatibleSave {
                saved: saved.version,
                current: self.version,
            }
            .into());
        }

        Ok(saved)
    }

    /// Save to the first empty bookmark slot and return its number.
    ///
    /// # Errors
    /// *   [`BookmarksFull`][crate::error::StateError::BookmarksFull]: if every slot
    ///     holds a save.
    pub fn save_bookmark<H>(
        &self,
        saves: &mut H,
        description: &str,
        state: &PersistedState,
    ) -> Result<usize, StateError>
    where
        H: Saves + ?Sized,
    {
        let index = (0..self.bookmarks)
            .find(|&index| !saves.has(Slot::Bookmark(index)))
            .ok_or(StateError::BookmarksFull {
                available: self.bookmarks,
            })?;

        saves.save(Slot::Bookmark(index), description, state);

        Ok(index + 1)
    }

    /// Number of the first bookmark which holds a save.
    pub fn first_bookmark<H>(&self, saves: &H) -> Option<usize>
    where
        H: Saves + ?Sized,
    {
        (0..self.bookmarks)
            .find(|&index| saves.has(Slot::Bookmark(index)))
            .map(|index| index + 1)
    }
}

impl Default for SavesManager {
    fn default() -> Self {
        SavesManager::new(1, Version::default())
    }
}

/// Check of the story variables which decides whether the session may autosave.
pub type SaveCheck = Box<dyn Fn(&StoryState) -> bool + Send + Sync>;

#[derive(Default)]
/// Rules for when the session writes the autosave.
///
/// Saving is allowed if any sufficient check passes. Otherwise it is allowed if every
/// necessary check passes, including the built-in ones: the view must not be the
/// untouched start of the story, and must not be out of character.
pub struct AutosavePolicy {
    sufficient: Vec<SaveCheck>,
    necessary: Vec<SaveCheck>,
}

impl AutosavePolicy {
    pub fn new() -> Self {
        AutosavePolicy::default()
    }

    pub fn add_sufficient<F>(&mut self, check: F)
    where
        F: Fn(&StoryState) -> bool + Send + Sync + 'static,
    {
        self.sufficient.push(Box::new(check));
    }

    pub fn add_necessary<F>(&mut self, check: F)
    where
        F: Fn(&StoryState) -> bool + Send + Sync + 'static,
    {
        self.necessary.push(Box::new(check));
    }

    /// Whether saving is allowed, given the result of the built-in checks.
    pub fn allows(&self, state: &StoryState, builtin: bool) -> bool {
        self.sufficient.iter().any(|check| check(state))
            || (builtin && self.necessary.iter().all(|check| check(state)))
    }
}

impl fmt::Debug for AutosavePolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("AutosavePolicy")
            .field("sufficient", &self.sufficient.len())
            .field("necessary", &self.necessary.len())
            .finish()
    }
}
