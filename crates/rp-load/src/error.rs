//! Error types for rp-load

use thiserror::Error;

/// Loader errors
#[derive(Error, Debug)]
pub enum LoadError {
    /// Object store operation failed (L001)
    #[error("[L001] Object store error: {0}")]
    Storage(#[from] object_store::Error),

    /// Local file could not be read (L002)
    #[error("[L002] Failed to read '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// Uploaded CSV could not be scanned (L003)
    #[error("[L003] Failed to scan CSV '{path}': {source}")]
    Csv { path: String, source: csv::Error },

    /// Bulk load statement failed (L004)
    #[error("[L004] {0}")]
    Database(#[from] rp_db::DbError),

    /// No uploaded files exist for an entity (L005)
    #[error("[L005] No uploaded files found for '{entity}' under '{prefix}'")]
    NoFiles { entity: String, prefix: String },
}

/// Result type alias for LoadError
pub type LoadResult<T> = Result<T, LoadError>;
