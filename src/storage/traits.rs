//! Saver trait and error types

use crate::model::Chapter;
use thiserror::Error;

/// Errors that can occur while persisting a chapter
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("Failed to write chapter: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for save operations
pub type SaveResult<T> = Result<T, SaveError>;

/// Trait for persistence backends
///
/// Called synchronously, once per successfully parsed page, before the
/// crawler advances. Any error aborts the run.
pub trait Saver {
    /// Persists one chapter
    fn save(&mut self, chapter: &Chapter) -> SaveResult<()>;
}
