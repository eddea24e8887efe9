//! rp-core - Core library for the retail pipeline
//!
//! This crate provides shared types, configuration parsing, the raw entity
//! layout, tier and calendar rules, and DAG building used across all pipeline
//! components.

pub mod calendar;
pub mod config;
pub mod dag;
pub mod entity;
pub mod error;
pub mod model;
pub mod model_name;
pub mod sql_utils;
pub mod tier;

pub use calendar::{DayType, TimeOfDay};
pub use config::{Config, Layer, SchemaConfig};
pub use dag::ModelDag;
pub use entity::Entity;
pub use error::{CoreError, CoreResult};
pub use model::{Materialization, Model, ModelSchema};
pub use model_name::ModelName;
pub use tier::{CustomerValueTier, ProductPerformanceCategory, StorePerformanceTier, Tier};
