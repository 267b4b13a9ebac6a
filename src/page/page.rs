//! Composition of the continuously scrolling view.

use crate::{consts::SCENE_BREAK, error::StateError, markup::ProcessedUnit};

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

/// Paragraphs of one scene.
pub type Scene = Vec<String>;

/// Scenes of one page.
pub type PageScenes = Vec<Scene>;

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde_support", derive(Deserialize, Serialize))]
/// Which units make up the current view, and what the reader has seen so far.
///
/// The view always starts with a primary unit, which the page does not hold. Units
/// embedded beneath it are listed in the order they were embedded, each with a flag
/// for whether its scene break was omitted. The page is persisted along with the
/// session so that the view can be rebuilt.
pub struct Page {
    embedded: Vec<String>,
    nobreak: Vec<bool>,
    continuous: bool,
    history: Vec<PageScenes>,
}

impl Page {
    /// Create an empty page. If `continuous` is set, navigations embed by default.
    pub fn new(continuous: bool) -> Self {
        Page {
            continuous,
            ..Default::default()
        }
    }

    pub fn is_continuous(&self) -> bool {
        self.continuous
    }

    pub fn set_continuous(&mut self, continuous: bool) {
        self.continuous = continuous;
    }

    /// Units embedded beneath the primary unit, oldest first.
    pub fn embedded(&self) -> &[String] {
        &self.embedded
    }

    /// Whether the scene break was omitted for each embedded unit.
    pub fn nobreak_flags(&self) -> &[bool] {
        &self.nobreak
    }

    /// Number of embedded units.
    pub fn len(&self) -> usize {
        self.embedded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.embedded.is_empty()
    }

    /// Unit which is rendered last: the latest embedded one, or the primary unit.
    pub fn innermost<'a>(&'a self, primary: &'a str) -> &'a str {
        self.embedded
            .last()
            .map(|unit| unit.as_str())
            .unwrap_or(primary)
    }

    /// Check that a unit can be embedded beneath the view.
    ///
    /// # Errors
    /// *   [`SelfEmbedding`][crate::error::StateError::SelfEmbedding]: if the unit is
    ///     the primary unit.
    /// *   [`DuplicateEmbedding`][crate::error::StateError::DuplicateEmbedding]: if the
    ///     unit is already embedded.
    pub fn check_embed(&self, primary: Option<&str>, unit: &str) -> Result<(), StateError> {
        if primary == Some(unit) {
            Err(StateError::SelfEmbedding {
                unit: unit.to_string(),
            })
        } else if self.embedded.iter().any(|embedded| embedded == unit) {
            Err(StateError::DuplicateEmbedding {
                unit: unit.to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Add a unit to the end of the embedded list. The page is left untouched if the
    /// unit cannot be embedded.
    ///
    /// # Errors
    /// See [`check_embed`][Page::check_embed].
    pub(crate) fn push_embedded(
        &mut self,
        primary: Option<&str>,
        unit: &str,
        nobreak: bool,
    ) -> Result<(), StateError> {
        self.check_embed(primary, unit)?;

        self.embedded.push(unit.to_string());
        self.nobreak.push(nobreak);

        Ok(())
    }

    pub(crate) fn clear_embedded(&mut self) {
        self.embedded.clear();
        self.nobreak.clear();
    }

    /// Narrative history: every recorded page, as scenes of paragraphs.
    pub fn history(&self) -> &[PageScenes] {
        &self.history
    }

    /// Record the scenes of the view after a navigation.
    ///
    /// A replacing navigation starts a new page, while an embedding one updates the
    /// latest page. Views without narrative content are not recorded.
    pub(crate) fn record(&mut self, scenes: PageScenes, embedded: bool) {
        if scenes.is_empty() {
            return;
        }

        match self.history.last_mut() {
            Some(last) if embedded => *last = scenes,
            _ => self.history.push(scenes),
        }
    }

    /// Text of a recorded page: paragraphs separated by blank lines and scenes by
    /// scene breaks.
    pub fn page_to_text(&self, index: usize) -> Option<String> {
        self.history.get(index).map(|scenes| scenes_to_text(scenes))
    }

    /// Text of every recorded page, separated by scene breaks.
    pub fn history_text(&self) -> String {
        self.history
            .iter()
            .map(|scenes| scenes_to_text(scenes))
            .collect::<Vec<_>>()
            .join(&scene_separator())
    }
}

/// Group the paragraphs of rendered units into scenes.
///
/// `nobreak` holds the flag of every unit after the first. A new scene starts at
/// every unit which was embedded with a scene break, and at every paragraph which
/// is a scene break by itself. Out-of-character units are skipped.
pub fn scenes(units: &[ProcessedUnit], nobreak: &[bool]) -> PageScenes {
    let mut scenes = vec![Scene::new()];

    for (i, unit) in units.iter().enumerate() {
        if unit.out_of_character {
            continue;
        }

        let joins_previous = i > 0 && nobreak.get(i - 1).copied().unwrap_or(false);

        if !joins_previous {
            scenes.push(Scene::new());
        }

        for text in unit.texts() {
            if text.trim() == SCENE_BREAK {
                scenes.push(Scene::new());
            } else if let Some(scene) = scenes.last_mut() {
                scene.push(text);
            }
        }
    }

    scenes.retain(|scene| !scene.is_empty());
    scenes
}

fn scenes_to_text(scenes: &[Scene]) -> String {
    scenes
        .iter()
        .map(|scene| scene.join("\n\n"))
        .collect::<Vec<_>>()
        .join(&scene_separator())
}

fn scene_separator() -> String {
    format!("\n\n{}\n\n", SCENE_BREAK)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::markup::{Fragment, Paragraph};

    fn unit(name: &str, paragraphs: &[&str], out_of_character: bool) -> ProcessedUnit {
        ProcessedUnit {
            unit: name.to_string(),
            dom_id: format!("passage-{}", name.to_lowercase()),
            paragraphs: paragraphs
                .iter()
                .map(|text| Paragraph(vec![Fragment::Text(text.to_string())]))
                .collect(),
            out_of_character,
        }
    }

    #[test]
    fn embedding_the_primary_unit_yields_error() {
        let mut page = Page::new(true);

        let err = page.push_embedded(Some("Hall"), "Hall", false).unwrap_err();

        assert_eq!(
            err,
            StateError::SelfEmbedding {
                unit: "Hall".to_string()
            }
        );
        assert!(page.is_empty());
    }

    #[test]
    fn embedding_a_unit_twice_leaves_page_unchanged() {
        let mut page = Page::new(true);

        page.push_embedded(Some("Hall"), "Cellar", true).unwrap();
        page.push_embedded(Some("Hall"), "Attic", false).unwrap();

        let before = page.clone();
        let err = page.push_embedded(Some("Hall"), "Cellar", false).unwrap_err();

        assert_eq!(
            err,
            StateError::DuplicateEmbedding {
                unit: "Cellar".to_string()
            }
        );
        assert_eq!(page, before);
        assert_eq!(page.embedded().len(), page.nobreak_flags().len());
        assert_eq!(page.nobreak_flags(), &[true, false]);
    }

    #[test]
    fn innermost_unit_is_latest_embedded_or_primary() {
        let mut page = Page::new(false);
        assert_eq!(page.innermost("Hall"), "Hall");

        page.push_embedded(Some("Hall"), "Cellar", false).unwrap();
        assert_eq!(page.innermost("Hall"), "Cellar");

        page.clear_embedded();
        assert!(page.nobreak_flags().is_empty());
        assert_eq!(page.innermost("Hall"), "Hall");
    }

    #[test]
    fn scenes_are_split_at_breaks_unless_nobreak() {
        let units = vec![
            unit("Hall", &["A hall.", "****", "Later."], false),
            unit("Cellar", &["A cellar."], false),
            unit("Help", &["How to play."], true),
            unit("Attic", &["An attic."], false),
        ];

        let scenes = scenes(&units, &[true, false, false]);

        assert_eq!(
            scenes,
            vec![
                vec!["A hall.".to_string()],
                vec!["Later.".to_string(), "A cellar.".to_string()],
                vec!["An attic.".to_string()],
            ]
        );
    }

    #[test]
    fn replacing_pushes_and_embedding_updates_history() {
        let mut page = Page::new(true);

        page.record(vec![vec!["A hall.".to_string()]], false);
        page.record(
            vec![vec!["A hall.".to_string()], vec!["A cellar.".to_string()]],
            true,
        );
        page.record(Vec::new(), false);
        page.record(vec![vec!["An attic.".to_string()]], false);

        assert_eq!(page.history().len(), 2);
        assert_eq!(
            page.page_to_text(0).unwrap(),
            "A hall.\n\n****\n\nA cellar."
        );
        assert_eq!(
            page.history_text(),
            "A hall.\n\n****\n\nA cellar.\n\n****\n\nAn attic."
        );
        assert!(page.page_to_text(2).is_none());
    }
}
