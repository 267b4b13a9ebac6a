//! Services a session relies on but does not implement.
//!
//! The engine never touches content storage, presentation or persistence directly.
//! A host provides them through the traits in this module: a [`ContentStore`] is
//! owned by the [`Story`][crate::graph::Story], while a [`Host`] (a renderer, a
//! metadata store and a save manager in one) is owned by the
//! [`Session`][crate::session::Session].
//!
//! In-memory implementations of every trait are available in [`memory`], which are
//! used for headless play and testing.

pub mod memory;

use crate::{
    consts::DOM_ID_PREFIX,
    graph::Align,
    markup::ProcessedUnit,
    page::Path,
    session::{PersistedState, Slot},
};

/// Source of the raw text of content units.
pub trait ContentStore {
    /// Whether a unit with this name exists.
    fn has(&self, unit: &str) -> bool;

    /// Raw text of a unit, if it exists.
    fn text(&self, unit: &str) -> Option<String>;

    /// Stable identifier of the rendering target of a unit.
    ///
    /// Regions created for the unit are scoped by this identifier so that several
    /// embedded units never collide. Defaults to `passage-` followed by a slug of
    /// the unit name.
    fn dom_id(&self, unit: &str) -> String {
        format!("{}{}", DOM_ID_PREFIX, slugify(unit))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Content handed to a [`Renderer`].
pub enum Block<'a> {
    /// A processed content unit. Rendering it creates the body, actions and next
    /// regions named by [`ProcessedUnit::regions`].
    Unit(&'a ProcessedUnit),
    /// Separator between two scenes.
    SceneBreak,
    /// Clickable affordance for an action.
    Action(&'a ActionLink),
}

#[derive(Clone, Debug, PartialEq)]
/// Action affordance. Activating it should call
/// [`Session::take_action`][crate::session::Session::take_action] with the unit and
/// index.
pub struct ActionLink {
    pub unit: String,
    pub index: usize,
    pub label: String,
    pub align: Align,
}

/// Presentation of processed content in named regions.
pub trait Renderer {
    /// Replace the content of a region.
    fn replace(&mut self, region: &str, block: Block);

    /// Add content to the end of a region.
    fn append(&mut self, region: &str, block: Block);

    /// Remove all content from a region.
    fn clear(&mut self, region: &str);

    /// Bring a region into view.
    fn scroll_to(&mut self, region: &str);

    fn scroll_to_top(&mut self);
}

#[derive(Clone, Debug, PartialEq)]
/// Value kept in the session metadata.
pub enum MetaValue {
    Flag(bool),
    Pointer(usize),
    Path(Path),
}

/// Key-value store for transient session flags which survive a full restart.
pub trait Metadata {
    fn memorize(&mut self, key: &str, value: MetaValue);

    fn recall(&self, key: &str) -> Option<MetaValue>;

    fn forget(&mut self, key: &str);
}

/// Storage for the autosave and bookmarks.
pub trait Saves {
    /// Write a save, overwriting what the slot holds.
    fn save(&mut self, slot: Slot, description: &str, state: &PersistedState);

    fn load(&self, slot: Slot) -> Option<PersistedState>;

    fn has(&self, slot: Slot) -> bool;

    fn delete(&mut self, slot: Slot);
}

/// Every service a session needs besides the content store.
pub trait Host: Renderer + Metadata + Saves {}

impl<T> Host for T where T: Renderer + Metadata + Saves {}

/// Lowercase the name and replace every run of other characters than letters and
/// digits with a single '-'.
fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());

    for c in name.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_are_lowercase_and_dashed() {
        assert_eq!(slugify("Hall"), "hall");
        assert_eq!(slugify("The Old  Cellar!"), "the-old-cellar");
        assert_eq!(slugify("  Attic 2 "), "attic-2");
    }

    #[test]
    fn default_dom_id_is_prefixed_slug() {
        struct Empty;

        impl ContentStore for Empty {
            fn has(&self, _: &str) -> bool {
                false
            }

            fn text(&self, _: &str) -> Option<String> {
                None
            }
        }

        assert_eq!(Empty.dom_id("Dark Hall"), "passage-dark-hall");
    }
}
