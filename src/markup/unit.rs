//! Processed content ready to be handed to a renderer.

use crate::consts::{ACTIONS_SUFFIX, BODY_SUFFIX, ELLIPSIS, EXCERPT_WORDS, NEXT_SUFFIX};

#[derive(Clone, Debug, PartialEq)]
/// Content unit after its markup has been processed.
pub struct ProcessedUnit {
    /// Name of the content unit.
    pub unit: String,
    /// Rendering target identifier which scopes the regions of this unit.
    pub dom_id: String,
    /// Paragraphs of the body.
    pub paragraphs: Vec<Paragraph>,
    /// Whether the unit lies outside of the narrative.
    pub out_of_character: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
/// Paragraph of processed text.
pub struct Paragraph(pub Vec<Fragment>);

#[derive(Clone, Debug, PartialEq)]
/// Piece of a paragraph.
pub enum Fragment {
    /// Plain text.
    Text(String),
    /// Link which reveals a description in the slot with the same element id.
    DetailLink {
        label: String,
        element_id: String,
        description: String,
    },
    /// Empty element into which a description is revealed.
    DetailSlot { element_id: String },
}

#[derive(Clone, Debug, PartialEq)]
/// Names of the regions a rendered unit provides.
pub struct Regions {
    /// Holds the processed text.
    pub body: String,
    /// Holds the action links.
    pub actions: String,
    /// Holds the next embedded unit.
    pub next: String,
}

impl Regions {
    pub fn of(dom_id: &str) -> Self {
        Regions {
            body: format!("{}{}", dom_id, BODY_SUFFIX),
            actions: format!("{}{}", dom_id, ACTIONS_SUFFIX),
            next: format!("{}{}", dom_id, NEXT_SUFFIX),
        }
    }
}

impl Paragraph {
    /// Text content of the paragraph, as a reader sees it before revealing details.
    pub fn text(&self) -> String {
        self.0
            .iter()
            .map(|fragment| match fragment {
                Fragment::Text(text) => text.as_str(),
                Fragment::DetailLink { label, .. } => label.as_str(),
                Fragment::DetailSlot { .. } => "",
            })
            .collect()
    }
}

impl ProcessedUnit {
    pub fn regions(&self) -> Regions {
        Regions::of(&self.dom_id)
    }

    /// Text of every nonempty paragraph.
    pub fn texts(&self) -> Vec<String> {
        self.paragraphs
            .iter()
            .map(|paragraph| paragraph.text())
            .filter(|text| !text.trim().is_empty())
            .collect()
    }

    /// Short description of the body: its first words followed by an ellipsis.
    ///
    /// # Examples
    /// ```
    /// # use storyweave::{Fragment, Paragraph, ProcessedUnit};
    /// let unit = ProcessedUnit {
    ///     unit: "Hall".to_string(),
    ///     dom_id: "passage-hall".to_string(),
    ///     paragraphs: vec![Paragraph(vec![Fragment::Text(
    ///         "You stand in a long hall lined with old portraits.".to_string(),
    ///     )])],
    ///     out_of_character: false,
    /// };
    ///
    /// assert_eq!(unit.excerpt(), "You stand in a long hall lined with\u{2026}");
    /// ```
    pub fn excerpt(&self) -> String {
        let text = self.texts().join(" ");
        let mut excerpt = text
            .split_whitespace()
            .take(EXCERPT_WORDS)
            .collect::<Vec<_>>()
            .join(" ");

        excerpt.push(ELLIPSIS);
        excerpt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_with_text(paragraphs: &[&str]) -> ProcessedUnit {
        ProcessedUnit {
            unit: "Hall".to_string(),
            dom_id: "passage-hall".to_string(),
            paragraphs: paragraphs
                .iter()
                .map(|text| Paragraph(vec![Fragment::Text(text.to_string())]))
                .collect(),
            out_of_character: false,
        }
    }

    #[test]
    fn regions_are_scoped_by_dom_id() {
        let regions = Regions::of("passage-hall");

        assert_eq!(regions.body, "passage-hall-body");
        assert_eq!(regions.actions, "passage-hall-actions");
        assert_eq!(regions.next, "passage-hall-next");
    }

    #[test]
    fn paragraph_text_shows_link_labels_but_not_descriptions() {
        let paragraph = Paragraph(vec![
            Fragment::Text("An old ".to_string()),
            Fragment::DetailLink {
                label: "door".to_string(),
                element_id: "passage-hall-examine-door".to_string(),
                description: "Oak, iron-banded.".to_string(),
            },
            Fragment::Text(".".to_string()),
            Fragment::DetailSlot {
                element_id: "passage-hall-examine-door".to_string(),
            },
        ]);

        assert_eq!(paragraph.text(), "An old door.");
    }

    #[test]
    fn excerpt_of_short_text_keeps_every_word() {
        let unit = unit_with_text(&["Dust.", "More  dust."]);
        assert_eq!(unit.excerpt(), "Dust. More dust.\u{2026}");
    }

    #[test]
    fn excerpt_of_empty_body_is_an_ellipsis() {
        let unit = unit_with_text(&[" "]);

        assert!(unit.texts().is_empty());
        assert_eq!(unit.excerpt(), "\u{2026}");
    }
}
