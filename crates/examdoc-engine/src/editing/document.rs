use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

use crate::stores::{EmbedId, ImageStore, LinesStore, PositionStore};

/// The complete state of one rich-content document: the text buffer plus
/// the three side-table stores its embed tokens refer to.
///
/// This is an explicit value passed through every API call: there is no
/// ambient registry, and no resource is shared across documents. The host
/// UI owns one `DocumentState` per question/answer body, mutates it through
/// the methods in `editing::mutations`, and re-renders by calling
/// [`crate::render::render`] on every display refresh.
///
/// The buffer alone implies no structure; structure is recovered by parsing.
/// The host may also replace the buffer wholesale from an editable text
/// surface ([`DocumentState::replace_buffer`]); that is the principal
/// source of buffer/store inconsistency, surfaced by
/// [`crate::reconcile::reconcile`] and by render-time diagnostics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentState {
    buffer: String,
    images: ImageStore,
    positions: PositionStore,
    lines: LinesStore,
}

impl DocumentState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Replace the buffer with text from the host's editing surface.
    ///
    /// This is the direct, unmediated edit path: the stores are left
    /// untouched, so tokens and records may desynchronize. Render-time
    /// placeholders keep that recoverable.
    pub fn replace_buffer(&mut self, text: String) {
        self.buffer = text;
    }

    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    pub fn images_mut(&mut self) -> &mut ImageStore {
        &mut self.images
    }

    pub fn positions(&self) -> &PositionStore {
        &self.positions
    }

    pub fn positions_mut(&mut self) -> &mut PositionStore {
        &mut self.positions
    }

    pub fn lines(&self) -> &LinesStore {
        &self.lines
    }

    pub fn lines_mut(&mut self) -> &mut LinesStore {
        &mut self.lines
    }

    pub(crate) fn buffer_mut(&mut self) -> &mut String {
        &mut self.buffer
    }
}

/// Allocate a fresh embed id: milliseconds since the epoch plus a random
/// fraction in `[0, 1)`, unique within a session without a central counter.
/// The fraction comes from UUIDv4 entropy.
pub(crate) fn allocate_embed_id() -> EmbedId {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0) as f64;
    let entropy = (Uuid::new_v4().as_u128() & u128::from(u64::MAX)) as u64;
    millis + entropy as f64 / (u64::MAX as f64 + 1.0)
}

/// Clamp a byte offset to the nearest char boundary at or before it.
/// Out-of-range offsets clamp to the buffer end rather than erroring.
pub(crate) fn clamp_to_char_boundary(text: &str, offset: usize) -> usize {
    let mut pos = offset.min(text.len());
    while !text.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}
