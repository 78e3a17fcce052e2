//! JSON load/save of the wire payload. Persistence proper (network, record
//! ids, auth) belongs to an external collaborator; this module only
//! round-trips the four wire fields through a file.

use std::fs;
use std::path::{Path, PathBuf};

use crate::editing::DocumentState;
use crate::wire::{ContentPayload, WireError};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed content payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid wire data: {0}")]
    Wire(#[from] WireError),
}

/// Read a content payload file and rebuild the document state.
pub fn load_content(path: &Path) -> Result<DocumentState, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    let json = fs::read_to_string(path)?;
    let payload: ContentPayload = serde_json::from_str(&json)?;
    Ok(payload.into_state()?)
}

/// Write the document state's wire payload as pretty JSON.
pub fn save_content(path: &Path, state: &DocumentState) -> Result<(), IoError> {
    // Create parent directories if they don't exist
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(&state.to_payload())?;
    fs::write(path, json)?;
    Ok(())
}
