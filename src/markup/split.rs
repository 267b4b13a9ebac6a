//! Utilities for splitting content text.

use crate::consts::{SUB_CLOSE, SUB_OPEN};

#[derive(Clone, Copy, Debug, PartialEq)]
/// Text and embraced parts of a content unit.
pub enum Part<'a> {
    /// Pure text.
    Text(&'a str),
    /// Text which was enclosed in '{}' braces, without the braces.
    Embraced(&'a str),
}

/// Split text into parts of pure text and text enclosed in curly braces.
///
/// Braces do not nest: an embraced part ends at the first closing brace. An opening
/// brace without a closing one is kept as text.
///
/// # Notes
/// *   Works for strings with multibyte characters, since the braces are searched for
///     by byte index.
pub fn split_embraced(content: &str) -> Vec<Part> {
    let mut parts = Vec::new();
    let mut rest = content;

    while let Some(open) = rest.find(SUB_OPEN) {
        let after_open = &rest[open + 1..];

        let close = match after_open.find(SUB_CLOSE) {
            Some(close) => close,
            None => break,
        };

        if open > 0 {
            parts.push(Part::Text(&rest[..open]));
        }

        parts.push(Part::Embraced(&after_open[..close]));
        rest = &after_open[close + 1..];
    }

    if !rest.is_empty() {
        parts.push(Part::Text(rest));
    }

    parts
}

/// Whether a string is a valid detail id: a letter followed by letters, digits or '_'.
pub fn is_detail_id(id: &str) -> bool {
    let mut chars = id.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[derive(Clone, Debug, PartialEq)]
/// Text with paragraph breaks marked out.
pub enum Piece {
    Text(String),
    Break,
}

/// Split text at blank lines.
///
/// Line breaks inside a paragraph are collapsed to single spaces. A newline at the
/// very start or end of the text is not a paragraph break by itself, since the text
/// may continue in a neighbouring part.
pub fn split_paragraphs(text: &str) -> Vec<Piece> {
    let text = text.replace('\r', "");
    let lines = text.split('\n').collect::<Vec<_>>();
    let last = lines.len() - 1;

    let mut pieces = Vec::new();
    let mut buffer = String::new();
    let mut after_break = false;

    for (i, line) in lines.iter().enumerate() {
        if i > 0 && i < last && line.trim().is_empty() {
            if !buffer.is_empty() {
                pieces.push(Piece::Text(collapse_breaks(&buffer)));
                buffer.clear();
            }

            pieces.push(Piece::Break);
            after_break = true;

            continue;
        }

        if i > 0 && !after_break {
            buffer.push('\n');
        }

        buffer.push_str(line);
        after_break = false;
    }

    if !buffer.is_empty() {
        pieces.push(Piece::Text(collapse_breaks(&buffer)));
    }

    pieces
}

/// Replace every run of whitespace which contains a line break with a single space.
fn collapse_breaks(text: &str) -> String {
    let mut collapsed = String::with_capacity(text.len());
    let mut run = String::new();

    for c in text.chars() {
        if c.is_whitespace() {
            run.push(c);
        } else {
            flush_whitespace(&mut collapsed, &mut run);
            collapsed.push(c);
        }
    }

    flush_whitespace(&mut collapsed, &mut run);

    collapsed
}

fn flush_whitespace(buffer: &mut String, run: &mut String) {
    if run.contains('\n') {
        buffer.push(' ');
    } else {
        buffer.push_str(run);
    }

    run.clear();
}
