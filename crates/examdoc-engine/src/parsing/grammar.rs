//! Lexical shape of spans and embed tokens.
//!
//! Two image encodings must both be recognized on read: the legacy
//! width-only form `[IMAGE:<id>:<w>px]` and the current form
//! `[IMAGE:<id>:<w>x<h>px]`. Writes always emit the current form.

use std::sync::OnceLock;

use regex::Regex;

use crate::stores::EmbedId;

/// Decimal id as it appears inside a token: digits with an optional
/// fractional part (ids are `timestamp + random()`).
const ID_PATTERN: &str = r"\d+(?:\.\d+)?";

/// The single split pattern driving the parser. Alternatives are listed in
/// match-priority order; the regex crate's leftmost-first semantics make a
/// `**`/`__` run claim its characters before the single-delimiter italic
/// rule may fire, and the current image form is attempted before the legacy
/// one. Delimiter content requires at least one non-delimiter character, so
/// a bare `**` or `__` never matches.
pub(crate) fn token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pattern = format!(
            r"\*\*[^*]+\*\*|\*[^*]+\*|__[^_]+__|_[^_]+_|\[IMAGE:{id}:\d+x\d+px\]|\[IMAGE:{id}:\d+px\]|\[LINES:{id}\]",
            id = ID_PATTERN
        );
        Regex::new(&pattern).expect("invalid token regex")
    })
}

/// Current image token with id/width/height captures.
pub(crate) fn current_image_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"\[IMAGE:({ID_PATTERN}):(\d+)x(\d+)px\]"))
            .expect("invalid current image regex")
    })
}

/// Legacy width-only image token with id/width captures.
pub(crate) fn legacy_image_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"\[IMAGE:({ID_PATTERN}):(\d+)px\]"))
            .expect("invalid legacy image regex")
    })
}

/// Lines token with an id capture.
pub(crate) fn lines_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"\[LINES:({ID_PATTERN})\]")).expect("invalid lines regex")
    })
}

/// Canonical textual form of an id. `f64`'s `Display` prints the shortest
/// representation that round-trips, so whole ids carry no trailing `.0`.
pub fn format_id(id: EmbedId) -> String {
    format!("{id}")
}

/// Render the current-format image token (the only form ever written).
pub fn image_token(id: EmbedId, width: u32, height: u32) -> String {
    format!("[IMAGE:{}:{}x{}px]", format_id(id), width, height)
}

/// Render a lines token.
pub fn lines_token(id: EmbedId) -> String {
    format!("[LINES:{}]", format_id(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_formatting_is_bit_exact() {
        assert_eq!(image_token(1.0, 300, 200), "[IMAGE:1:300x200px]");
        assert_eq!(
            image_token(1755904712345.25, 50, 80),
            "[IMAGE:1755904712345.25:50x80px]"
        );
        assert_eq!(lines_token(2.0), "[LINES:2]");
    }

    #[test]
    fn format_id_round_trips_through_parse() {
        for id in [1.0, 12345.0009, 1755904712345.4271_f64] {
            let text = format_id(id);
            assert_eq!(text.parse::<f64>().unwrap(), id);
        }
    }

    #[test]
    fn both_image_encodings_are_recognized() {
        assert!(current_image_regex().is_match("[IMAGE:1:50x80px]"));
        assert!(!current_image_regex().is_match("[IMAGE:1:50px]"));
        assert!(legacy_image_regex().is_match("[IMAGE:1:50px]"));
        assert!(lines_regex().is_match("[LINES:2.5]"));
    }
}
