//! rp-transform - Model compilation and execution for the retail pipeline
//!
//! Ships the staging and mart models, renders them through rp-jinja, extracts
//! their dependencies with rp-sql and materializes them in dependency order.

pub mod catalog;
pub mod compile;
pub mod error;
pub mod runner;

pub use catalog::ModelCatalog;
pub use compile::{compile, CompiledModel, CompiledProject};
pub use error::{TransformError, TransformResult};
pub use runner::{ModelRunResult, ModelRunner, RunResults, RunStatus};
