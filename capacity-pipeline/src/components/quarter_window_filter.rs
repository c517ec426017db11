use capacity_model::MergedRecord;

use crate::filter::{Filter, FilterResult};
use crate::types::WindowedQuery;

/// Keeps rows whose start_date falls in the query's quarter window:
/// same year, on or after the start, strictly before start + 90 days.
pub struct QuarterWindowFilter;

impl Filter<WindowedQuery, MergedRecord> for QuarterWindowFilter {
    fn filter(
        &self,
        query: &WindowedQuery,
        candidates: Vec<MergedRecord>,
    ) -> FilterResult<MergedRecord> {
        FilterResult::partition(candidates, |r| query.window.contains(r.start_date))
    }
}
