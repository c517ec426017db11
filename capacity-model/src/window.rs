//! Quarter window resolution and validation.

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

use crate::error::{ViewError, ViewResult};
use crate::table::MergedTable;
use crate::thresholds::WINDOW_DAYS;

/// A validated reporting window: `[start, end)` restricted to `year`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct QuarterWindow {
    pub year: i32,
    pub start: NaiveDate,
    /// Exclusive bound, `start + WINDOW_DAYS`.
    pub end: NaiveDate,
}

impl QuarterWindow {
    /// Validate `year` and `start` against the table and build the window.
    ///
    /// `year` must be one of `table.years()`. `start` defaults to the
    /// earliest date of that year and otherwise must fall within the
    /// year's `[min, max]` start_date range.
    pub fn resolve(
        table: &MergedTable,
        year: i32,
        start: Option<NaiveDate>,
    ) -> ViewResult<Self> {
        let Some((min, max)) = table.date_bounds(year) else {
            if table.is_empty() {
                return Err(ViewError::EmptyTable);
            }
            return Err(ViewError::UnknownYear {
                year,
                available: table.years(),
            });
        };

        let start = start.unwrap_or(min);
        if start < min || start > max {
            return Err(ViewError::StartDateOutOfRange {
                start_date: start,
                year,
                min,
                max,
            });
        }

        Ok(Self {
            year,
            start,
            end: start + Days::new(WINDOW_DAYS),
        })
    }

    /// Same year, on or after `start`, strictly before `end`.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date >= self.start && date < self.end
    }
}
