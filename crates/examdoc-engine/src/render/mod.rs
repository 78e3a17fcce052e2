//! Segment + store resolution into a render plan.
//!
//! The renderer never fails the whole document because one embed is broken:
//! every embed resolves to either a drawable item or a diagnostic
//! placeholder carrying enough information for manual recovery.

use crate::editing::DocumentState;
use crate::parsing::{self, Segment, StyleKind};
use crate::stores::{EmbedId, LineStyle, Position};

/// Which panel the plan is rendered into. Only selects the presentation
/// max-width hint; it changes nothing about resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTarget {
    Question,
    Answer,
    Editor,
}

impl RenderTarget {
    /// Maximum content width in px for this surface.
    pub fn max_width(self) -> u32 {
        match self {
            RenderTarget::Question => 700,
            RenderTarget::Answer => 700,
            RenderTarget::Editor => 560,
        }
    }
}

/// One full- or half-height ruled line within a lines block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitHeight {
    Full,
    Half,
}

/// A single ruled line ready to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuledUnit {
    pub height: UnitHeight,
    pub line_height: u32,
    pub line_style: LineStyle,
    pub opacity: f64,
}

/// One drawable (or diagnostic) item of the render plan, in document order.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderItem {
    /// Literal text.
    Text(String),
    /// A styled run.
    Styled { kind: StyleKind, content: String },
    /// A resolved image. `width`/`height` are the *requested* size from the
    /// token, authoritative for presentation; `height: None` renders
    /// aspect-preserving (legacy token). `position` is present only when the
    /// image has been dragged out of text flow.
    Image {
        id: EmbedId,
        url: String,
        name: String,
        width: u32,
        height: Option<u32>,
        position: Option<Position>,
    },
    /// A resolved answer-line block, already expanded into ruled units.
    Lines { id: EmbedId, units: Vec<RuledUnit> },
    /// An image token with no backing record. Recoverable: shown in place,
    /// never thrown.
    MissingImage {
        id: EmbedId,
        width: u32,
        height: Option<u32>,
        warning: String,
    },
    /// A lines token with no backing configuration (distinct from
    /// `MissingImage`), including a suggested recovery.
    MissingLines { id: EmbedId, warning: String },
}

impl RenderItem {
    /// Whether this item is a diagnostic placeholder rather than content.
    pub fn is_diagnostic(&self) -> bool {
        matches!(
            self,
            RenderItem::MissingImage { .. } | RenderItem::MissingLines { .. }
        )
    }
}

/// Immutable render plan for one document surface.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPlan {
    pub target: RenderTarget,
    pub max_width: u32,
    pub items: Vec<RenderItem>,
}

impl RenderPlan {
    pub fn diagnostics(&self) -> impl Iterator<Item = &RenderItem> {
        self.items.iter().filter(|item| item.is_diagnostic())
    }

    pub fn has_diagnostics(&self) -> bool {
        self.diagnostics().next().is_some()
    }
}

/// Parse the buffer and resolve every segment against the stores.
///
/// Pure: reads the document at call time, safe to call on every display
/// refresh.
pub fn render(state: &DocumentState, target: RenderTarget) -> RenderPlan {
    let items = parsing::parse(state.buffer())
        .into_iter()
        .map(|segment| resolve_segment(state, segment))
        .collect();

    RenderPlan {
        target,
        max_width: target.max_width(),
        items,
    }
}

fn resolve_segment(state: &DocumentState, segment: Segment) -> RenderItem {
    match segment {
        Segment::Text(content) => RenderItem::Text(content),
        Segment::Styled { kind, content } => RenderItem::Styled { kind, content },
        Segment::ImageRef { id, width, height } => match state.images().get(id) {
            Some(record) => RenderItem::Image {
                id,
                url: record.url.clone(),
                name: record.name.clone(),
                width,
                height,
                position: state.positions().get(id),
            },
            None => {
                tracing::warn!(id, "image token has no backing record");
                RenderItem::MissingImage {
                    id,
                    width,
                    height,
                    warning: format!(
                        "image {id} is referenced in the text but missing from the image list; \
                         re-upload it or delete the [IMAGE:...] token"
                    ),
                }
            }
        },
        Segment::LinesRef { id } => match state.lines().get(id) {
            Some(config) => RenderItem::Lines {
                id,
                units: expand_units(config.number_of_lines, config.line_height, config.line_style, config.opacity),
            },
            None => {
                tracing::warn!(id, "lines token has no backing configuration");
                RenderItem::MissingLines {
                    id,
                    warning: format!(
                        "answer-line block {id} has no configuration; remove the [LINES:...] \
                         token and insert a new block to restore it"
                    ),
                }
            }
        },
    }
}

/// `floor(n)` full-height units plus one half-height unit when `n` has a
/// fractional remainder.
fn expand_units(
    number_of_lines: f64,
    line_height: u32,
    line_style: LineStyle,
    opacity: f64,
) -> Vec<RuledUnit> {
    let full = number_of_lines.floor().max(0.0) as usize;
    let unit = |height| RuledUnit {
        height,
        line_height,
        line_style,
        opacity,
    };

    let mut units = vec![unit(UnitHeight::Full); full];
    if number_of_lines.fract() > 0.0 {
        units.push(unit(UnitHeight::Half));
    }
    units
}
