//! Error types for rp-test

use thiserror::Error;

/// Errors building the set of data tests
#[derive(Error, Debug)]
pub enum TestGenError {
    /// Core error (Q001)
    #[error("[Q001] {0}")]
    Core(#[from] rp_core::CoreError),

    /// Assertion template failed to render (Q002)
    #[error("[Q002] Failed to render assertion '{name}': {source}")]
    Render {
        name: String,
        source: rp_jinja::JinjaError,
    },

    /// Assertion files could not be read (Q003)
    #[error("[Q003] Failed to read '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Result type alias for TestGenError
pub type TestGenResult<T> = Result<T, TestGenError>;
