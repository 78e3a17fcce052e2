//! The mutation API: every operation updates the text buffer and the stores
//! together in one call, in a fixed order per operation (record before
//! token on insert, record before strip on remove), so no caller ever has
//! to coordinate the two halves.

use regex::Regex;

use crate::editing::document::{DocumentState, allocate_embed_id, clamp_to_char_boundary};
use crate::parsing::grammar;
use crate::stores::{EmbedId, ImageRecord, LineStyle, LinesConfig, Position, id_matches};

/// Bounds for `number_of_lines` on an answer-line block.
pub const MIN_LINES: f64 = 0.5;
pub const MAX_LINES: f64 = 400.0;

/// Named rejection conditions at the mutation boundary. The caller decides
/// user-facing messaging; nothing here is fatal or retried.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MutationError {
    #[error("no image record for id {0}")]
    UnknownImage(EmbedId),
    #[error("image dimensions must be positive")]
    ZeroDimension,
    #[error("resize requires at least one dimension")]
    NoDimensions,
    #[error("line height must be positive")]
    ZeroLineHeight,
    #[error("nothing selected")]
    EmptySelection,
}

/// Where a new embed token lands in the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertAt {
    /// Byte offset, clamped to the nearest char boundary at or before it.
    Cursor(usize),
    /// Append to the end of the buffer.
    End,
}

/// What produced the image, which also picks the default presentation size:
/// uploads land at 300×200, finished canvas drawings at 600×400.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    Upload { name: String, url: String },
    Canvas { name: String, url: String },
}

impl ImageSource {
    fn default_size(&self) -> (u32, u32) {
        match self {
            ImageSource::Upload { .. } => (300, 200),
            ImageSource::Canvas { .. } => (600, 400),
        }
    }

    fn into_parts(self) -> (String, String) {
        match self {
            ImageSource::Upload { name, url } | ImageSource::Canvas { name, url } => (name, url),
        }
    }
}

/// Requested configuration for a new answer-line block, before clamping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinesSpec {
    pub number_of_lines: f64,
    pub line_height: u32,
    pub line_style: LineStyle,
    pub opacity: f64,
}

impl DocumentState {
    /// Insert an image embed: creates the record (store first), then splices
    /// the current-format token. Returns the freshly allocated id.
    pub fn insert_image(&mut self, source: ImageSource, at: InsertAt) -> EmbedId {
        let id = allocate_embed_id();
        let (width, height) = source.default_size();
        let (name, url) = source.into_parts();

        self.images_mut().put(ImageRecord {
            id,
            url,
            name,
            width,
            height,
        });
        self.splice_token(&grammar::image_token(id, width, height), at);

        tracing::debug!(id, width, height, "inserted image embed");
        id
    }

    /// Remove an image embed: deletes the record and any position override,
    /// then strips *all* textual occurrences of both token encodings for
    /// this id (a resized id may appear in either form if the host mixed
    /// raw edits in).
    pub fn remove_image(&mut self, id: EmbedId) {
        self.images_mut().remove(id);
        self.positions_mut().remove(id);

        let stripped = rewrite_image_tokens(self.buffer(), id, |_| String::new());
        *self.buffer_mut() = stripped;

        tracing::debug!(id, "removed image embed");
    }

    /// Resize an image: updates the record (keeping any dimension not
    /// supplied) and rewrites every prior token occurrence (legacy or
    /// current) to the current format with the new dimensions.
    pub fn resize_image(
        &mut self,
        id: EmbedId,
        new_width: Option<u32>,
        new_height: Option<u32>,
    ) -> Result<(), MutationError> {
        if new_width.is_none() && new_height.is_none() {
            return Err(MutationError::NoDimensions);
        }
        if new_width == Some(0) || new_height == Some(0) {
            return Err(MutationError::ZeroDimension);
        }

        let (width, height) = {
            let record = self
                .images_mut()
                .update_dimensions(id, new_width, new_height)
                .ok_or(MutationError::UnknownImage(id))?;
            (record.width, record.height)
        };

        let rewritten = rewrite_image_tokens(self.buffer(), id, |token_id| {
            grammar::image_token(token_id, width, height)
        });
        *self.buffer_mut() = rewritten;

        tracing::debug!(id, width, height, "resized image embed");
        Ok(())
    }

    /// Drag an image out of text flow. Store-side overlay only; the buffer
    /// is untouched.
    pub fn set_image_position(&mut self, id: EmbedId, x: f64, y: f64) {
        self.positions_mut().put(id, Position { x, y });
    }

    /// Return an image to inline flow order.
    pub fn clear_image_position(&mut self, id: EmbedId) {
        self.positions_mut().remove(id);
    }

    /// Insert an answer-line block: clamps the requested config, stores it,
    /// then splices the `[LINES:<id>]` token.
    pub fn insert_lines(
        &mut self,
        spec: LinesSpec,
        at: InsertAt,
    ) -> Result<EmbedId, MutationError> {
        if spec.line_height == 0 {
            return Err(MutationError::ZeroLineHeight);
        }

        let id = allocate_embed_id();
        self.lines_mut().put(LinesConfig {
            id,
            number_of_lines: clamp_line_count(spec.number_of_lines),
            line_height: spec.line_height,
            line_style: spec.line_style,
            opacity: clamp_opacity(spec.opacity),
        });
        self.splice_token(&grammar::lines_token(id), at);

        tracing::debug!(id, "inserted answer-line block");
        Ok(id)
    }

    /// Remove an answer-line block: deletes the record, then strips the
    /// first textual occurrence of its token.
    pub fn remove_lines(&mut self, id: EmbedId) {
        self.lines_mut().remove(id);

        let first_match = grammar::lines_regex()
            .captures_iter(self.buffer())
            .find(|caps| {
                caps[1]
                    .parse::<f64>()
                    .is_ok_and(|found| id_matches(found, id))
            })
            .and_then(|caps| caps.get(0).map(|m| m.range()));
        if let Some(range) = first_match {
            self.buffer_mut().replace_range(range, "");
        }

        tracing::debug!(id, "removed answer-line block");
    }

    fn splice_token(&mut self, token: &str, at: InsertAt) {
        match at {
            InsertAt::End => self.buffer_mut().push_str(token),
            InsertAt::Cursor(offset) => {
                let pos = clamp_to_char_boundary(self.buffer(), offset);
                self.buffer_mut().insert_str(pos, token);
            }
        }
    }
}

/// Snap to half-line steps and clamp into `[MIN_LINES, MAX_LINES]`. The
/// half line is the grammar's only sub-line unit.
fn clamp_line_count(requested: f64) -> f64 {
    if !requested.is_finite() {
        return MIN_LINES;
    }
    ((requested * 2.0).round() / 2.0).clamp(MIN_LINES, MAX_LINES)
}

fn clamp_opacity(requested: f64) -> f64 {
    if !requested.is_finite() {
        return 1.0;
    }
    requested.clamp(0.1, 1.0)
}

/// Apply both image token regexes, current form first and then legacy, and
/// replace every occurrence whose id matches within tolerance. An id that
/// was resized may be present in either encoding, so both passes always run.
fn rewrite_image_tokens(
    buffer: &str,
    id: EmbedId,
    replacement: impl Fn(EmbedId) -> String,
) -> String {
    let pass = |re: &Regex, input: &str| -> String {
        re.replace_all(input, |caps: &regex::Captures<'_>| {
            match caps[1].parse::<f64>() {
                Ok(found) if id_matches(found, id) => replacement(found),
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
    };

    let after_current = pass(grammar::current_image_regex(), buffer);
    pass(grammar::legacy_image_regex(), &after_current)
}
