//! Error types for rp-dashboard

use thiserror::Error;

/// Dashboard errors. Panel query failures are not errors: they are logged
/// and the panel renders empty.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// Start date after end date (B001)
    #[error("[B001] Invalid date range: {start} is after {end}")]
    InvalidDateRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    /// JSON output failed (B002)
    #[error("[B002] Failed to serialize dashboard: {0}")]
    Json(#[from] serde_json::Error),

    /// Output could not be written (B003)
    #[error("[B003] {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for DashboardError
pub type DashboardResult<T> = Result<T, DashboardError>;
