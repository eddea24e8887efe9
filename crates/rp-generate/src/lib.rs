//! rp-generate - Synthetic retail data generator
//!
//! Produces stores, products, customers and day-partitioned transactions as
//! CSV files with referential integrity. Output is deterministic for a seed.

mod dirty;
pub mod error;
pub mod generator;
pub mod rows;
mod writer;

pub use error::{GenerateError, GenerateResult};
pub use generator::{GenerationSummary, RetailGenerator};
pub use writer::transaction_partition_dir;
