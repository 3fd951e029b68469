//! Error types for Aromatag.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Content-level problem (empty/whitespace-only text). Recorded as a
    /// failed item, never retried within the same run.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Lost an atomic claim race. Safe and expected under concurrency;
    /// counted as skipped, not failed.
    #[error("Claim conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Lexicon error: {0}")]
    Lexicon(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
