//! rp-sql - SQL parsing layer for the retail pipeline
//!
//! Parses rendered model SQL with sqlparser-rs (DuckDB dialect) and extracts
//! the relations each model reads from.

pub mod dialect;
pub mod error;
pub mod extractor;
pub mod parser;

pub use dialect::{DuckDbDialect, SqlDialect};
pub use error::{SqlError, SqlResult};
pub use extractor::{categorize_dependencies, extract_dependencies, Dependencies};
pub use parser::SqlParser;
