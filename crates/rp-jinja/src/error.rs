//! Error types for rp-jinja

use thiserror::Error;

/// Jinja templating errors
#[derive(Error, Debug)]
pub enum JinjaError {
    /// Template render error (J001)
    #[error("[J001] Jinja render error: {0}")]
    RenderError(String),

    /// Invalid config key (J003)
    #[error("[J003] Invalid config key '{key}'. Valid keys: materialized, layer")]
    InvalidConfigKey { key: String },

    /// Invalid config value (J004)
    #[error("[J004] Invalid value for config key '{key}': {message}")]
    InvalidConfigValue { key: String, message: String },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for JinjaError
pub type JinjaResult<T> = Result<T, JinjaError>;

impl From<minijinja::Error> for JinjaError {
    fn from(err: minijinja::Error) -> Self {
        JinjaError::RenderError(err.to_string())
    }
}
