//! Buffer → segment parsing.
//!
//! Parsing is pure and re-entrant: it reads the buffer at call time,
//! produces a fresh segment list, and keeps no memoized state. It is called
//! on every render, so correctness must not depend on call frequency.

pub mod grammar;
pub mod segment;

pub use segment::{Segment, StyleKind};

use crate::stores::EmbedId;

/// Parse a text buffer into an ordered sequence of typed segments.
///
/// Tie-break rules (grammar alternation order, leftmost-first):
/// 1. `**`/`__` runs are claimed as bold/underline before single-delimiter
///    italic may fire on the same characters.
/// 2. Unmatched or unterminated delimiters degrade to literal text.
/// 3. The current image form is attempted before the legacy width-only form.
///
/// Malformed tokens fail open: anything the grammar does not claim is
/// emitted as [`Segment::Text`].
pub fn parse(buffer: &str) -> Vec<Segment> {
    let mut out = Vec::new();
    let mut pending = String::new();
    let mut last_end = 0;

    for m in grammar::token_regex().find_iter(buffer) {
        pending.push_str(&buffer[last_end..m.start()]);
        last_end = m.end();

        match classify_token(m.as_str()) {
            Some(segment) => {
                flush_text(&mut out, &mut pending);
                out.push(segment);
            }
            // Grammar matched but the payload didn't parse (e.g. an id out
            // of f64 range): keep it as literal text.
            None => pending.push_str(m.as_str()),
        }
    }

    pending.push_str(&buffer[last_end..]);
    flush_text(&mut out, &mut pending);
    out
}

fn flush_text(out: &mut Vec<Segment>, pending: &mut String) {
    if !pending.is_empty() {
        out.push(Segment::Text(std::mem::take(pending)));
    }
}

/// Classify one grammar match. Spans are identified by their delimiter,
/// embeds by re-matching the capturing token regexes.
fn classify_token(token: &str) -> Option<Segment> {
    if let Some(content) = strip_pair(token, "**") {
        return Some(Segment::Styled {
            kind: StyleKind::Bold,
            content: content.to_string(),
        });
    }
    if let Some(content) = strip_pair(token, "__") {
        return Some(Segment::Styled {
            kind: StyleKind::Underline,
            content: content.to_string(),
        });
    }
    if let Some(content) = strip_pair(token, "*").or_else(|| strip_pair(token, "_")) {
        return Some(Segment::Styled {
            kind: StyleKind::Italic,
            content: content.to_string(),
        });
    }
    if token.starts_with("[IMAGE:") {
        // Current (width×height) form first, then legacy width-only.
        if let Some(caps) = grammar::current_image_regex().captures(token) {
            return Some(Segment::ImageRef {
                id: parse_id(&caps[1])?,
                width: caps[2].parse().ok()?,
                height: Some(caps[3].parse().ok()?),
            });
        }
        if let Some(caps) = grammar::legacy_image_regex().captures(token) {
            return Some(Segment::ImageRef {
                id: parse_id(&caps[1])?,
                width: caps[2].parse().ok()?,
                height: None,
            });
        }
        return None;
    }
    if let Some(caps) = grammar::lines_regex().captures(token) {
        return Some(Segment::LinesRef {
            id: parse_id(&caps[1])?,
        });
    }
    None
}

fn parse_id(text: &str) -> Option<EmbedId> {
    let id: f64 = text.parse().ok()?;
    id.is_finite().then_some(id)
}

fn strip_pair<'a>(token: &'a str, delimiter: &str) -> Option<&'a str> {
    // Minimum content length: the token must be longer than both delimiters.
    if token.len() <= 2 * delimiter.len() {
        return None;
    }
    token
        .strip_prefix(delimiter)
        .and_then(|rest| rest.strip_suffix(delimiter))
}
