//! Supplier capacity risk views.
//!
//! Loads the capacity, forecast and organization datasets and turns a
//! merged table plus user-selected parameters into chart-ready aggregates
//! and a flagged high-risk table.

pub mod charts;
pub mod components;
pub mod error;
pub mod filter;
pub mod loader;
pub mod pipelines;
pub mod selector;
pub mod source;
pub mod types;

pub use error::{LoadError, LoadResult};
pub use loader::{CsvDatasetSource, DatasetSource, Datasets};
pub use pipelines::risk_dashboard::{select_view, RiskDashboardPipeline};
pub use types::{DashboardView, OrgUtilization, RiskRow, SkuDemand, ViewQuery};
