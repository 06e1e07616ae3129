//! Error types for the document layer

use folio_common::ValidationError;
use folio_model::EditorError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Editor error: {0}")]
    Editor(#[from] EditorError),

    #[error("Invalid tree: {0}")]
    Validation(#[from] ValidationError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Document is not file-backed")]
    NotFileBacked,
}

pub type DocumentResult<T> = Result<T, DocumentError>;
