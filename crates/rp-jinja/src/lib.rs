//! rp-jinja - Jinja templating layer for the retail pipeline
//!
//! Model templates are rendered with `config()`, `var()`, `source()` and
//! `ref()`, plus SQL helpers that expand the shared tier and calendar rules
//! (`customer_value_tier()`, `store_performance_tier()`,
//! `product_performance_category()`, `day_type()`, `time_of_day()`).

pub mod environment;
pub mod error;
pub mod functions;

pub use environment::{JinjaEnvironment, RelationMap};
pub use error::{JinjaError, JinjaResult};
