//! Error types for rp-core

use thiserror::Error;

/// Core error type for the retail pipeline
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Failed to parse configuration file
    #[error("[E002] Failed to parse config: {message}")]
    ConfigParseError { message: String },

    /// E003: Invalid configuration value
    #[error("[E003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E005: Model not found
    #[error("[E005] Model not found: {name}")]
    ModelNotFound { name: String },

    /// E006: Model could not be parsed or rendered
    #[error("[E006] Failed to parse model '{name}': {message}")]
    ModelParseError { name: String, message: String },

    /// E007: Circular dependency detected
    #[error("[E007] Circular dependency detected: {cycle}")]
    CircularDependency { cycle: String },

    /// E008: Duplicate model name
    #[error("[E008] Duplicate model name: {name}")]
    DuplicateModel { name: String },

    /// E009: Empty name where a non-empty identifier is required
    #[error("[E009] Empty name for {context}")]
    EmptyName { context: String },

    /// E010: Unsupported model schema version
    #[error("[E010] Unsupported schema version {version} (expected 1)")]
    UnsupportedSchemaVersion { version: u32 },

    /// E011: Invalid data test definition
    #[error("[E011] Invalid test '{name}': {message}")]
    TestValidationError { name: String, message: String },

    /// E014: IO error
    #[error("[E014] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// E016: IO error with file path context
    #[error("[E016] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// E015: Schema/YAML parse error
    #[error("[E015] Schema parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
