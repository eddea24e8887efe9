//! rp-test - Data tests for the retail pipeline
//!
//! Schema tests declared in model YAML become SQL returning violating rows;
//! singular assertions check the invariants that span models (fact filters,
//! dimension reconciliation, tier conformance). Zero rows means pass.

pub mod assertions;
pub mod error;
pub mod generator;
pub mod runner;

pub use assertions::{builtin_assertions, TestPlan};
pub use error::{TestGenError, TestGenResult};
pub use generator::{GeneratedTest, TestKind};
pub use runner::{TestResult, TestRunner, TestStatus, TestSummary};
