//! rp-load - Raw data loader for the retail pipeline
//!
//! Uploads generated CSV files into a date-partitioned object store and
//! bulk-loads each entity into its raw warehouse table.

pub mod copy;
pub mod error;
pub mod loader;
pub mod storage;

pub use copy::{CopyDefinition, LoadSummary, TableLoad};
pub use error::{LoadError, LoadResult};
pub use loader::Loader;
pub use storage::{RawStore, UploadedObject};
