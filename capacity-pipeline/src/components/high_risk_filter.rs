use capacity_model::MergedRecord;

use crate::filter::{Filter, FilterResult};
use crate::types::WindowedQuery;

/// Keeps rows that [`MergedRecord::is_high_risk`] flags: utilization above
/// 80% and positive demand change.
///
/// Rows with undefined utilization (zero capacity) are always removed.
pub struct HighRiskFilter;

impl Filter<WindowedQuery, MergedRecord> for HighRiskFilter {
    fn filter(
        &self,
        _query: &WindowedQuery,
        candidates: Vec<MergedRecord>,
    ) -> FilterResult<MergedRecord> {
        FilterResult::partition(candidates, MergedRecord::is_high_risk)
    }
}
