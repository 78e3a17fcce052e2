pub mod editing;
pub mod io;
pub mod parsing;
pub mod reconcile;
pub mod render;
pub mod stores;
pub mod wire;

// Re-export key types for easier usage
pub use editing::{
    DocumentState, ImageSource, InsertAt, LinesSpec, MutationError, toggle_style,
};
pub use parsing::{Segment, StyleKind, parse};
pub use reconcile::{ReconcileReport, reconcile};
pub use render::{RenderItem, RenderPlan, RenderTarget, render};
pub use stores::{
    EmbedId, ID_TOLERANCE, ImageRecord, LineStyle, LinesConfig, Position, id_matches,
};
pub use wire::{ContentPayload, WireError};
