//! rp-dashboard - Retail analytics dashboard
//!
//! Each panel is one aggregate query over `fact_sales`, narrowed by the
//! dashboard filters. Query results are cached per query text for a fixed
//! time-to-live, and a snapshot of all panels renders as terminal text
//! (tables and horizontal bars) or JSON.

pub mod cache;
pub mod dashboard;
pub mod error;
pub mod filters;
pub mod panels;
pub mod render;

pub use cache::{QueryCache, CACHE_TTL};
pub use dashboard::{Dashboard, DashboardSnapshot, PanelData};
pub use error::{DashboardError, DashboardResult};
pub use filters::{DateRange, FilterOptions, Filters};
pub use panels::{Panel, PanelKind};
pub use render::{render_json, render_text};
