//! Centralized thresholds for supplier capacity risk flagging.
//!
//! Changing a value here affects BOTH the merged `utilization` column
//! (in `merge.rs`) and the high-risk filter in the view pipeline
//! (`capacity-pipeline/components/high_risk_filter.rs`).

/// Utilization percentage above which a geonode/SKU pair is at risk.
/// Strictly greater-than: a row at exactly 80% is not flagged.
pub const HIGH_RISK_UTILIZATION_PCT: f64 = 80.0;

/// Demand change above which demand counts as growing.
/// Strictly greater-than: flat demand is not flagged.
pub const HIGH_RISK_DEMAND_CHANGE: f64 = 0.0;

/// Length of the reporting window in days. Fixed-length quarter,
/// not aligned to calendar quarters.
pub const WINDOW_DAYS: u64 = 90;

/// Scale applied to the days/capacity ratio to express it as a percentage.
pub const UTILIZATION_SCALE: f64 = 100.0;
