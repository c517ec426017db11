use std::collections::HashSet;

use capacity_model::MergedRecord;

use crate::filter::{Filter, FilterResult};
use crate::types::WindowedQuery;

/// Keeps rows for one of the selected SKUs.
///
/// Only feeds the demand chart; the utilization chart ignores it.
pub struct SkuFilter;

impl Filter<WindowedQuery, MergedRecord> for SkuFilter {
    fn enable(&self, query: &WindowedQuery) -> bool {
        query.query.sku_filter.is_some()
    }

    fn filter(
        &self,
        query: &WindowedQuery,
        candidates: Vec<MergedRecord>,
    ) -> FilterResult<MergedRecord> {
        let selected: HashSet<&str> = query
            .query
            .sku_filter
            .iter()
            .flatten()
            .map(String::as_str)
            .collect();
        FilterResult::partition(candidates, |r| selected.contains(r.sku_id.as_str()))
    }
}
