use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};

use crate::records::MergedRecord;

/// The merged, read-only table produced once per dataset load.
///
/// Views never mutate it; share it behind an `Arc` across readers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MergedTable {
    rows: Vec<MergedRecord>,
}

impl MergedTable {
    pub fn new(rows: Vec<MergedRecord>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[MergedRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct years present in `start_date`, ascending.
    pub fn years(&self) -> Vec<i32> {
        self.rows
            .iter()
            .map(|r| r.start_date.year())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Earliest and latest `start_date` within `year`, if the year is present.
    pub fn date_bounds(&self, year: i32) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self
            .rows
            .iter()
            .map(|r| r.start_date)
            .filter(|d| d.year() == year);
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }
}
