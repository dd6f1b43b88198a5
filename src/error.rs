//! Error types for the bookshelf core.
//!
//! Library code returns [`ShelfError`] so callers can tell a rejected form
//! apart from a missing record or a host without durable storage. The binary
//! and the TUI wrap these in `anyhow` the same way the SQLite helpers do.

use thiserror::Error;

/// Result alias used across the core modules.
pub type Result<T> = std::result::Result<T, ShelfError>;

#[derive(Error, Debug)]
pub enum ShelfError {
    /// Form input failed validation. Nothing was mutated.
    #[error("{reason}")]
    Validation { field: Field, reason: String },

    /// The operation targeted an id that is not in the collection.
    #[error("book {id} not found")]
    NotFound { id: i64 },

    /// Every id the id source can produce is taken.
    #[error("no book ids left; remove a book before adding another")]
    IdsExhausted,

    /// The host has no durable storage; changes only live in memory.
    #[error("storage unavailable: {reason}")]
    StorageUnavailable { reason: String },

    /// The storage backend failed while reading or writing.
    #[error("storage error: {0}")]
    Storage(String),

    /// The persisted payload exists but is not a list of books.
    #[error("stored bookshelf is corrupted: {reason}")]
    Corrupted { reason: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("configuration error: {reason}")]
    Config { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Book form fields, used to point validation errors at the right input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Author,
    Year,
}

impl ShelfError {
    pub fn validation(field: Field, reason: impl Into<String>) -> Self {
        ShelfError::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn storage(reason: impl Into<String>) -> Self {
        ShelfError::Storage(reason.into())
    }

    /// NotFound is never shown to the user: the UI only issues operations on
    /// ids it is currently displaying.
    pub fn is_silent(&self) -> bool {
        matches!(self, ShelfError::NotFound { .. })
    }
}

impl From<rusqlite::Error> for ShelfError {
    fn from(err: rusqlite::Error) -> Self {
        ShelfError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_is_the_reason() {
        let err = ShelfError::validation(Field::Title, "Title is required.");
        assert_eq!(err.to_string(), "Title is required.");
        assert!(!err.is_silent());
    }

    #[test]
    fn not_found_is_silent() {
        let err = ShelfError::NotFound { id: 7 };
        assert!(err.is_silent());
        assert_eq!(err.to_string(), "book 7 not found");
    }
}
