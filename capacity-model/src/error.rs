//! View parameter errors.
//!
//! Data-quality issues (missing join keys, zero capacity) are never errors;
//! only caller-contract violations surface here.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("Merged table is empty: no years available to select")]
    EmptyTable,

    #[error("Year {year} is not present in the data (available: {available:?})")]
    UnknownYear { year: i32, available: Vec<i32> },

    #[error("Start date {start_date} is outside {year}'s range [{min}, {max}]")]
    StartDateOutOfRange {
        start_date: NaiveDate,
        year: i32,
        min: NaiveDate,
        max: NaiveDate,
    },
}

/// Result type alias for view parameter resolution.
pub type ViewResult<T> = Result<T, ViewError>;
