//! Error types for rp-transform

use thiserror::Error;

/// Model compilation and execution errors
#[derive(Error, Debug)]
pub enum TransformError {
    /// Core error (T001)
    #[error("[T001] {0}")]
    Core(#[from] rp_core::CoreError),

    /// Template rendering failed (T002)
    #[error("[T002] Failed to render model '{model}': {source}")]
    Render {
        model: String,
        source: rp_jinja::JinjaError,
    },

    /// Rendered SQL is not a single valid query (T003)
    #[error("[T003] Invalid SQL in model '{model}': {source}")]
    Parse {
        model: String,
        source: rp_sql::SqlError,
    },

    /// Warehouse error outside of model execution (T004)
    #[error("[T004] {0}")]
    Database(#[from] rp_db::DbError),

    /// Model files could not be read (T005)
    #[error("[T005] Failed to read '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Result type alias for TransformError
pub type TransformResult<T> = Result<T, TransformError>;
