use crate::stores::EmbedId;

/// Inline markup styles supported by the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleKind {
    Bold,
    Italic,
    Underline,
}

impl StyleKind {
    /// Canonical delimiter written when toggling this style on.
    pub fn delimiter(self) -> &'static str {
        match self {
            StyleKind::Bold => "**",
            StyleKind::Italic => "*",
            StyleKind::Underline => "__",
        }
    }

    /// Alternate delimiter accepted on read (`_italic_`).
    pub fn alternate_delimiter(self) -> Option<&'static str> {
        match self {
            StyleKind::Italic => Some("_"),
            _ => None,
        }
    }
}

/// One unit of parsed output, in left-to-right document order.
///
/// Segments are transient: produced fresh on every parse, never persisted.
/// Both image token encodings (legacy width-only and current width×height)
/// normalize to the single `ImageRef` shape here; `height: None` means the
/// legacy form, rendered aspect-preserving.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Plain text outside any special construct.
    Text(String),
    /// A styled run. Styles do not nest: a run belongs to the outermost
    /// delimiter pair that can claim it.
    Styled { kind: StyleKind, content: String },
    /// An inline image embed. Token dimensions are a presentation-size cache
    /// of the image record's own width/height.
    ImageRef {
        id: EmbedId,
        width: u32,
        height: Option<u32>,
    },
    /// An answer-line block embed.
    LinesRef { id: EmbedId },
}
