//! Supplier capacity model: record types, the dataset merger, the merge
//! cache and reporting-window resolution.

pub mod cache;
pub mod error;
pub mod merge;
pub mod records;
pub mod table;
pub mod thresholds;
pub mod window;

pub use cache::{DatasetFingerprint, MergeCache};
pub use error::{ViewError, ViewResult};
pub use merge::{merge, utilization};
pub use records::{CapacityRecord, ForecastRecord, MergedRecord, OrgRecord};
pub use table::MergedTable;
pub use window::QuarterWindow;
