//! Error types for rp-generate

use thiserror::Error;

/// Data generation errors
#[derive(Error, Debug)]
pub enum GenerateError {
    /// Output could not be written (G001)
    #[error("[G001] Failed to write '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// CSV serialization failed (G002)
    #[error("[G002] CSV write failed for '{path}': {source}")]
    Csv { path: String, source: csv::Error },

    /// Generator settings cannot produce data (G003)
    #[error("[G003] Invalid generator settings: {0}")]
    InvalidSettings(String),
}

/// Result type alias for GenerateError
pub type GenerateResult<T> = Result<T, GenerateError>;
