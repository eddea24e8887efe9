//! rp-db - Warehouse abstraction layer for the retail pipeline
//!
//! This crate provides the `Database` trait and its DuckDB implementation,
//! plus the typed `QueryResult` returned by read queries.

pub mod duckdb;
pub mod error;
pub mod result;
pub mod traits;

pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use result::{CellValue, QueryResult};
pub use traits::Database;
