//! Post-hoc consistency check between the buffer and the stores.
//!
//! The mutation API keeps the two sides in lockstep, but the host's raw
//! editing surface can desynchronize them. This pass surfaces every orphan
//! and drift as a report; it never repairs anything itself (missing
//! records are deliberately not auto-synthesized; the render-time
//! placeholder plus this report are the recovery surface).

use crate::editing::DocumentState;
use crate::parsing::{self, Segment};
use crate::stores::{EmbedId, id_matches};

/// A token whose cached dimensions no longer match the image record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionDrift {
    pub id: EmbedId,
    /// Width/height as embedded in the token (`None` height = legacy form).
    pub token: (u32, Option<u32>),
    /// Width/height held by the image record.
    pub record: (u32, u32),
}

/// Everything `reconcile` found. An empty report means buffer and stores
/// are referentially consistent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    /// Image tokens with no backing record (render as placeholders).
    pub missing_images: Vec<EmbedId>,
    /// Lines tokens with no backing configuration.
    pub missing_lines: Vec<EmbedId>,
    /// Image records no token references. Retained on purpose, listed for
    /// information only.
    pub orphaned_images: Vec<EmbedId>,
    /// Lines configurations no token references.
    pub orphaned_lines: Vec<EmbedId>,
    /// Position overrides whose image record is gone.
    pub orphaned_positions: Vec<EmbedId>,
    /// Tokens whose cached size disagrees with their record.
    pub dimension_drift: Vec<DimensionDrift>,
}

impl ReconcileReport {
    /// True when no token lacks a record, no overlay lacks its image, and
    /// no cached size drifted. Orphaned records do not count against
    /// consistency; they are legal leftovers awaiting re-insertion.
    pub fn is_consistent(&self) -> bool {
        self.missing_images.is_empty()
            && self.missing_lines.is_empty()
            && self.orphaned_positions.is_empty()
            && self.dimension_drift.is_empty()
    }
}

/// Compare the parsed buffer against the three stores. Pure and read-only;
/// usable in tests and optionally at load time.
pub fn reconcile(state: &DocumentState) -> ReconcileReport {
    let segments = parsing::parse(state.buffer());
    let mut report = ReconcileReport::default();

    let mut image_token_ids: Vec<EmbedId> = Vec::new();
    let mut lines_token_ids: Vec<EmbedId> = Vec::new();

    for segment in &segments {
        match segment {
            Segment::ImageRef { id, width, height } => {
                image_token_ids.push(*id);
                match state.images().get(*id) {
                    None => report.missing_images.push(*id),
                    Some(record) => {
                        let width_drifted = *width != record.width;
                        let height_drifted = height.is_some_and(|h| h != record.height);
                        if width_drifted || height_drifted {
                            report.dimension_drift.push(DimensionDrift {
                                id: *id,
                                token: (*width, *height),
                                record: (record.width, record.height),
                            });
                        }
                    }
                }
            }
            Segment::LinesRef { id } => {
                lines_token_ids.push(*id);
                if state.lines().get(*id).is_none() {
                    report.missing_lines.push(*id);
                }
            }
            Segment::Text(_) | Segment::Styled { .. } => {}
        }
    }

    let referenced = |ids: &[EmbedId], id: EmbedId| ids.iter().any(|t| id_matches(*t, id));

    for record in state.images().iter() {
        if !referenced(&image_token_ids, record.id) {
            report.orphaned_images.push(record.id);
        }
    }
    for config in state.lines().iter() {
        if !referenced(&lines_token_ids, config.id) {
            report.orphaned_lines.push(config.id);
        }
    }
    for (id, _) in state.positions().iter() {
        if state.images().get(id).is_none() {
            report.orphaned_positions.push(id);
        }
    }

    if !report.is_consistent() {
        tracing::debug!(?report, "document state is inconsistent");
    }
    report
}
