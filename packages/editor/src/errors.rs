//! Error types for the editor

use scriptform_parser::EditError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid document settings: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("Edit rejected: {0}")]
    Edit(#[from] EditError),

    #[error("Document is not file-backed")]
    NotFileBacked,
}
