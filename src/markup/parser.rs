//! Processing of the node markup in content units.
//!
//! Before a unit is rendered its raw text goes through these steps, in order:
//!
//! 1.  Preprocessors registered for the unit transform the raw text.
//! 2.  Text substitution placeholders `{n}` are replaced by the substitutions set for
//!     the node. Substitutions which are computed from the story variables are
//!     evaluated against the variables that are passed in, which may be rewound.
//! 3.  Detail markup is turned into links and slots. `{label|id}` is a link which
//!     reveals the description given by `{?id|description}` in the place where the
//!     description markup was written.
//! 4.  The text is split into paragraphs at blank lines.

use std::{collections::HashMap, fmt};

use crate::{
    consts::{DESCRIPTION_MARKER, DETAIL_SEPARATOR, EXAMINE_INFIX, SUB_CLOSE, SUB_OPEN},
    error::{MarkupError, MarkupErrorKind, Origin, ValidationError, ValidationErrorKind},
    graph::Node,
    markup::{
        split::{is_detail_id, split_embraced, split_paragraphs, Part, Piece},
        unit::{Fragment, Paragraph, ProcessedUnit},
    },
    state::StoryState,
};

/// Substitution computed from the story variables when the unit is rendered.
pub type Computed = Box<dyn Fn(&StoryState) -> String + Send + Sync>;

/// Transform applied to the raw text of a unit before its markup is processed.
pub type Preprocessor = Box<dyn Fn(&str) -> String + Send + Sync>;

/// Text inserted in place of a `{n}` placeholder.
pub enum TextSub {
    Text(String),
    Computed(Computed),
}

impl TextSub {
    pub fn computed<F>(sub: F) -> Self
    where
        F: Fn(&StoryState) -> String + Send + Sync + 'static,
    {
        TextSub::Computed(Box::new(sub))
    }

    fn evaluate(&self, state: &StoryState) -> String {
        match self {
            TextSub::Text(text) => text.clone(),
            TextSub::Computed(sub) => sub(state),
        }
    }
}

impl From<&str> for TextSub {
    fn from(text: &str) -> Self {
        TextSub::Text(text.to_string())
    }
}

impl From<String> for TextSub {
    fn from(text: String) -> Self {
        TextSub::Text(text)
    }
}

impl fmt::Debug for TextSub {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TextSub::Text(text) => write!(f, "Text({:?})", text),
            TextSub::Computed(_) => write!(f, "Computed"),
        }
    }
}

#[derive(Default)]
/// Converts the raw text of content units into processed, renderable content.
pub struct Parser {
    subs: HashMap<String, Vec<TextSub>>,
    preprocessors: HashMap<String, Vec<Preprocessor>>,
}

/// Markup found in a unit before links are paired with their descriptions.
enum Token {
    Text(String),
    Link {
        label: String,
        id: String,
        description: Option<String>,
    },
    Description { id: String, text: String },
}

enum Item {
    Fragment(Fragment),
    Break,
}

impl Parser {
    pub fn new() -> Self {
        Parser::default()
    }

    /// Set the text substitutions of a node.
    ///
    /// # Errors
    /// *   [`WrongSubstitutionCount`][crate::error::ValidationErrorKind::WrongSubstitutionCount]:
    ///     if the number of substitutions differs from the sub count of the node.
    pub fn set_subs(&mut self, node: &Node, subs: Vec<TextSub>) -> Result<(), ValidationError> {
        if subs.len() != node.get_sub_count() {
            return Err(ValidationError::from_kind(
                Origin::unit(node.unit()).with_id(node.id()),
                ValidationErrorKind::WrongSubstitutionCount {
                    expected: node.get_sub_count(),
                    found: subs.len(),
                },
            ));
        }

        self.subs.insert(node.unit().to_string(), subs);
        Ok(())
    }

    pub fn get_subs(&self, unit: &str) -> Option<&[TextSub]> {
        self.subs.get(unit).map(|subs| subs.as_slice())
    }

    /// Register a transform for the raw text of a unit. Transforms run in the order
    /// they were added.
    pub fn add_preprocessor<F>(&mut self, unit: &str, preprocessor: F)
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.preprocessors
            .entry(unit.to_string())
            .or_default()
            .push(Box::new(preprocessor));
    }

    /// Apply the preprocessors registered for a unit.
    pub fn preprocess(&self, unit: &str, text: &str) -> String {
        match self.preprocessors.get(unit) {
            Some(preprocessors) => preprocessors
                .iter()
                .fold(text.to_string(), |text, preprocess| preprocess(&text)),
            None => text.to_string(),
        }
    }

    /// Process the markup of a node's content unit.
    ///
    /// # Errors
    /// *   [`TooFewSubstitutions`][crate::error::MarkupErrorKind::TooFewSubstitutions]:
    ///     if the node expects more placeholders than the text has.
    /// *   [`SubstitutionOutOfRange`][crate::error::MarkupErrorKind::SubstitutionOutOfRange]:
    ///     if a placeholder index is not below the sub count.
    /// *   [`DuplicateSubstitution`][crate::error::MarkupErrorKind::DuplicateSubstitution]:
    ///     if a placeholder appears twice.
    /// *   [`DetailWithoutDescription`][crate::error::MarkupErrorKind::DetailWithoutDescription]:
    ///     if a detail link has no description.
    pub fn process(
        &self,
        node: &Node,
        dom_id: &str,
        text: &str,
        state: &StoryState,
    ) -> Result<ProcessedUnit, MarkupError> {
        let text = self.preprocess(node.unit(), text);
        let text = self.insert_subs(node, &text, state)?;
        let tokens = pair_details(node.unit(), tokenize_details(&text))?;

        Ok(ProcessedUnit {
            unit: node.unit().to_string(),
            dom_id: dom_id.to_string(),
            paragraphs: build_paragraphs(dom_id, tokens),
            out_of_character: node.is_out_of_character(),
        })
    }

    /// Replace `{n}` placeholders with the substitutions of the node.
    ///
    /// Inserted text is not scanned for further placeholders. Nodes without a sub
    /// count are returned untouched.
    fn insert_subs(
        &self,
        node: &Node,
        text: &str,
        state: &StoryState,
    ) -> Result<String, MarkupError> {
        let count = node.get_sub_count();

        if count == 0 {
            return Ok(text.to_string());
        }

        let subs = self.get_subs(node.unit()).unwrap_or(&[]);
        let error = |kind| MarkupError {
            unit: node.unit().to_string(),
            kind,
        };

        let mut found = vec![false; count];
        let mut buffer = String::with_capacity(text.len());

        for part in split_embraced(text) {
            match part {
                Part::Embraced(inner) if is_placeholder(inner) => {
                    let index = inner.parse::<usize>().unwrap_or(usize::MAX);

                    if index >= count {
                        return Err(error(MarkupErrorKind::SubstitutionOutOfRange {
                            index,
                            count,
                        }));
                    }

                    if found[index] {
                        return Err(error(MarkupErrorKind::DuplicateSubstitution { index }));
                    }

                    found[index] = true;

                    if let Some(sub) = subs.get(index) {
                        buffer.push_str(&sub.evaluate(state));
                    }
                }
                Part::Embraced(inner) => {
                    buffer.push(SUB_OPEN);
                    buffer.push_str(inner);
                    buffer.push(SUB_CLOSE);
                }
                Part::Text(text) => buffer.push_str(text),
            }
        }

        let num_found = found.iter().filter(|&&found| found).count();

        if num_found < count {
            return Err(error(MarkupErrorKind::TooFewSubstitutions {
                expected: count,
                found: num_found,
            }));
        }

        Ok(buffer)
    }
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Parser")
            .field("subs", &self.subs)
            .field(
                "preprocessors",
                &self.preprocessors.keys().collect::<Vec<_>>(),
            )
            .finish()
    }
}

fn is_placeholder(content: &str) -> bool {
    !content.is_empty() && content.bytes().all(|b| b.is_ascii_digit())
}

/// Split text into plain text, detail links and descriptions.
fn tokenize_details(text: &str) -> Vec<Token> {
    split_embraced(text)
        .into_iter()
        .map(|part| match part {
            Part::Text(text) => Token::Text(text.to_string()),
            Part::Embraced(inner) => parse_detail(inner).unwrap_or_else(|| {
                Token::Text(format!("{}{}{}", SUB_OPEN, inner, SUB_CLOSE))
            }),
        })
        .collect()
}

fn parse_detail(content: &str) -> Option<Token> {
    if let Some(rest) = content.strip_prefix(DESCRIPTION_MARKER) {
        let (id, text) = split_at_separator(rest)?;

        if is_detail_id(id) && !text.is_empty() {
            return Some(Token::Description {
                id: id.to_string(),
                text: text.to_string(),
            });
        }

        return None;
    }

    let (label, id) = split_at_separator(content)?;

    if !label.is_empty() && is_detail_id(id) {
        Some(Token::Link {
            label: label.to_string(),
            id: id.to_string(),
            description: None,
        })
    } else {
        None
    }
}

fn split_at_separator(content: &str) -> Option<(&str, &str)> {
    let index = content.find(DETAIL_SEPARATOR)?;
    Some((&content[..index], &content[index + 1..]))
}

/// Pair every detail link with the first unused description of the same id.
///
/// Descriptions without a link are dropped.
fn pair_details(unit: &str, mut tokens: Vec<Token>) -> Result<Vec<Token>, MarkupError> {
    let mut used = vec![false; tokens.len()];

    for i in 0..tokens.len() {
        let id = match &tokens[i] {
            Token::Link { id, .. } => id.clone(),
            _ => continue,
        };

        let found = tokens.iter().enumerate().position(|(j, token)| match token {
            Token::Description { id: other, .. } => *other == id && !used[j],
            _ => false,
        });

        let j = found.ok_or_else(|| MarkupError {
            unit: unit.to_string(),
            kind: MarkupErrorKind::DetailWithoutDescription { id: id.clone() },
        })?;

        used[j] = true;

        let text = match &tokens[j] {
            Token::Description { text, .. } => text.clone(),
            _ => String::new(),
        };

        if let Token::Link { description, .. } = &mut tokens[i] {
            description.replace(text);
        }
    }

    Ok(tokens
        .into_iter()
        .zip(used)
        .filter(|(token, used)| !matches!(token, Token::Description { .. }) || *used)
        .map(|(token, _)| token)
        .collect())
}

fn build_paragraphs(dom_id: &str, tokens: Vec<Token>) -> Vec<Paragraph> {
    let element_id = |id: &str| format!("{}{}{}", dom_id, EXAMINE_INFIX, id);

    let mut items = Vec::new();

    for token in tokens {
        match token {
            Token::Text(text) => {
                items.extend(split_paragraphs(&text).into_iter().map(|piece| match piece {
                    Piece::Text(text) => Item::Fragment(Fragment::Text(text)),
                    Piece::Break => Item::Break,
                }));
            }
            Token::Link {
                label,
                id,
                description,
            } => items.push(Item::Fragment(Fragment::DetailLink {
                label,
                element_id: element_id(&id),
                description: description.unwrap_or_default(),
            })),
            Token::Description { id, .. } => items.push(Item::Fragment(Fragment::DetailSlot {
                element_id: element_id(&id),
            })),
        }
    }

    let mut paragraphs = Vec::new();
    let mut current = Vec::new();

    for item in items {
        match item {
            Item::Fragment(fragment) => current.push(fragment),
            Item::Break => finish_paragraph(&mut paragraphs, &mut current),
        }
    }

    finish_paragraph(&mut paragraphs, &mut current);

    paragraphs
}

fn finish_paragraph(paragraphs: &mut Vec<Paragraph>, current: &mut Vec<Fragment>) {
    if let Some(Fragment::Text(text)) = current.first_mut() {
        *text = text.trim_start().to_string();
    }

    if let Some(Fragment::Text(text)) = current.last_mut() {
        *text = text.trim_end().to_string();
    }

    current.retain(|fragment| match fragment {
        Fragment::Text(text) => !text.is_empty(),
        _ => true,
    });

    if !current.is_empty() {
        paragraphs.push(Paragraph(std::mem::take(current)));
    }
}
