//! Span formatting: wrap or unwrap a selected range with a style's
//! delimiter pair, leaving everything outside the selection untouched.

use std::ops::Range;

use crate::editing::document::{DocumentState, clamp_to_char_boundary};
use crate::editing::mutations::MutationError;
use crate::parsing::StyleKind;

/// Toggle `kind` on the selected byte range of `buffer`.
///
/// A selection already wrapped by exactly the requested delimiter pair is
/// unwrapped (so toggling twice round-trips); anything else is wrapped with
/// the canonical delimiter. An empty selection is rejected with
/// [`MutationError::EmptySelection`] rather than silently no-op-ing, so the
/// host can prompt the user.
pub fn toggle_style(
    buffer: &str,
    selection: Range<usize>,
    kind: StyleKind,
) -> Result<String, MutationError> {
    let start = clamp_to_char_boundary(buffer, selection.start);
    let end = clamp_to_char_boundary(buffer, selection.end);
    if start >= end {
        return Err(MutationError::EmptySelection);
    }

    let selected = &buffer[start..end];
    let toggled = match unwrap_delimiters(selected, kind) {
        Some(inner) => inner.to_string(),
        None => {
            let delimiter = kind.delimiter();
            format!("{delimiter}{selected}{delimiter}")
        }
    };

    let mut out = String::with_capacity(buffer.len() + 2 * kind.delimiter().len());
    out.push_str(&buffer[..start]);
    out.push_str(&toggled);
    out.push_str(&buffer[end..]);
    Ok(out)
}

impl DocumentState {
    /// [`toggle_style`] applied to this document's own buffer.
    pub fn toggle_style(
        &mut self,
        selection: Range<usize>,
        kind: StyleKind,
    ) -> Result<(), MutationError> {
        let toggled = toggle_style(self.buffer(), selection, kind)?;
        self.replace_buffer(toggled);
        Ok(())
    }
}

/// If `selected` is wrapped by the style's delimiter pair (canonical or, for
/// italic, the underscore alternate) with non-empty content, return the
/// content.
fn unwrap_delimiters(selected: &str, kind: StyleKind) -> Option<&str> {
    let strip = |delimiter: &str| -> Option<&str> {
        if selected.len() <= 2 * delimiter.len() {
            return None;
        }
        selected
            .strip_prefix(delimiter)
            .and_then(|rest| rest.strip_suffix(delimiter))
    };

    strip(kind.delimiter()).or_else(|| kind.alternate_delimiter().and_then(strip))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn toggling_bold_wraps_selection() {
        let buffer = "a cat sat";
        assert_eq!(
            toggle_style(buffer, 2..5, StyleKind::Bold).unwrap(),
            "a **cat** sat"
        );
    }

    #[test]
    fn toggling_bold_twice_round_trips() {
        let once = toggle_style("a cat sat", 2..5, StyleKind::Bold).unwrap();
        assert_eq!(once, "a **cat** sat");

        // The host re-selects the now-expanded run including its delimiters
        let twice = toggle_style(&once, 2..9, StyleKind::Bold).unwrap();
        assert_eq!(twice, "a cat sat");
    }

    #[rstest]
    #[case(StyleKind::Italic, "a *cat* sat")]
    #[case(StyleKind::Underline, "a __cat__ sat")]
    fn each_style_wraps_with_its_delimiter(#[case] kind: StyleKind, #[case] expected: &str) {
        assert_eq!(toggle_style("a cat sat", 2..5, kind).unwrap(), expected);
    }

    #[test]
    fn underscore_italic_unwraps_too() {
        assert_eq!(
            toggle_style("a _cat_ sat", 2..7, StyleKind::Italic).unwrap(),
            "a cat sat"
        );
    }

    #[test]
    fn empty_selection_is_rejected() {
        assert_eq!(
            toggle_style("a cat sat", 3..3, StyleKind::Bold),
            Err(MutationError::EmptySelection)
        );
        assert_eq!(
            toggle_style("", 0..5, StyleKind::Bold),
            Err(MutationError::EmptySelection)
        );
    }

    #[test]
    fn text_outside_selection_is_untouched() {
        let buffer = "prefix [IMAGE:1:50px] target suffix";
        let toggled = toggle_style(buffer, 22..28, StyleKind::Underline).unwrap();
        assert_eq!(toggled, "prefix [IMAGE:1:50px] __target__ suffix");
    }

    #[test]
    fn document_method_applies_in_place() {
        let mut state = DocumentState::new();
        state.replace_buffer("a cat sat".to_string());

        state.toggle_style(2..5, StyleKind::Bold).unwrap();

        assert_eq!(state.buffer(), "a **cat** sat");
    }
}
