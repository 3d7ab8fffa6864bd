//! Unified error types for the crate.

use thiserror::Error;

/// Top-level error for case-vec operations.
#[derive(Debug, Error)]
pub enum IngestError {
    /// I/O or filesystem errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing / serialization errors.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The archive container cannot be opened or read.
    #[error("bad archive: {0}")]
    BadArchive(String),

    /// Invalid or unsupported configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Mismatch between a produced vector and the collection dimension.
    #[error("vector size mismatch: got {got}, want {want}")]
    VectorSizeMismatch { got: usize, want: usize },

    /// Case id too large for the integer payload field.
    #[error("case id {0} exceeds the payload integer range")]
    IdOutOfRange(u64),

    /// Embedding model failures (wrapped).
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Qdrant client errors (wrapped).
    #[error("qdrant error: {0}")]
    Qdrant(String),

    /// HTTP errors from the bulk-archive fetcher.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}
