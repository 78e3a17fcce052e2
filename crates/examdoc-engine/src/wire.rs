//! The serialized form that crosses the persistence boundary: the text
//! buffer plus three JSON-shaped side-channels. The persistence collaborator
//! round-trips these four fields verbatim; re-parsing a round-tripped buffer
//! against the round-tripped stores reproduces an equivalent render plan.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::editing::DocumentState;
use crate::parsing::grammar::format_id;
use crate::stores::{ImageRecord, LinesConfig, Position};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum WireError {
    /// A position-map key that is not a decimal id.
    #[error("invalid position key {0:?}: expected a decimal id")]
    InvalidPositionKey(String),
}

/// One side of a question record (question body or answer body).
///
/// Position-map keys are the id's string form because JSON object keys must
/// be strings; they are parsed back with the same tolerance rules as every
/// other id lookup. Field order is insensitive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentPayload {
    pub text: String,
    pub inline_images: Vec<ImageRecord>,
    pub image_positions: BTreeMap<String, Position>,
    pub answer_lines: Vec<LinesConfig>,
}

impl ContentPayload {
    pub fn from_state(state: &DocumentState) -> Self {
        Self {
            text: state.buffer().to_string(),
            inline_images: state.images().iter().cloned().collect(),
            image_positions: state
                .positions()
                .iter()
                .map(|(id, pos)| (format_id(id), pos))
                .collect(),
            answer_lines: state.lines().iter().cloned().collect(),
        }
    }

    pub fn into_state(self) -> Result<DocumentState, WireError> {
        let mut state = DocumentState::new();
        state.replace_buffer(self.text);
        for record in self.inline_images {
            state.images_mut().put(record);
        }
        for (key, position) in self.image_positions {
            let id: f64 = key
                .parse()
                .map_err(|_| WireError::InvalidPositionKey(key.clone()))?;
            state.positions_mut().put(id, position);
        }
        for config in self.answer_lines {
            state.lines_mut().put(config);
        }
        Ok(state)
    }
}

impl DocumentState {
    pub fn to_payload(&self) -> ContentPayload {
        ContentPayload::from_state(self)
    }

    pub fn from_payload(payload: ContentPayload) -> Result<Self, WireError> {
        payload.into_state()
    }
}
