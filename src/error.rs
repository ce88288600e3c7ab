//! Error types shared by every WordMemo module

use thiserror::Error;

/// Errors raised by the WordMemo core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Not enough words for a quiz: need at least {required}, found {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Invalid session state: {0}")]
    SessionState(String),

    #[error("Import failed: {0}")]
    Import(String),
}

impl CoreError {
    /// True for errors caused by the caller's input rather than by storage
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            CoreError::Validation(_)
                | CoreError::NotFound(_)
                | CoreError::InsufficientData { .. }
                | CoreError::SessionState(_)
                | CoreError::Import(_)
        )
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
