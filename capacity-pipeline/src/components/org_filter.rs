use std::collections::HashSet;

use capacity_model::MergedRecord;

use crate::filter::{Filter, FilterResult};
use crate::types::WindowedQuery;

/// Keeps rows owned by one of the selected organizations.
///
/// Only feeds the utilization chart; the demand chart ignores it.
pub struct OrgFilter;

impl Filter<WindowedQuery, MergedRecord> for OrgFilter {
    fn enable(&self, query: &WindowedQuery) -> bool {
        query.query.org_filter.is_some()
    }

    fn filter(
        &self,
        query: &WindowedQuery,
        candidates: Vec<MergedRecord>,
    ) -> FilterResult<MergedRecord> {
        let selected: HashSet<&str> = query
            .query
            .org_filter
            .iter()
            .flatten()
            .map(String::as_str)
            .collect();
        FilterResult::partition(candidates, |r| selected.contains(r.org_id.as_str()))
    }
}
