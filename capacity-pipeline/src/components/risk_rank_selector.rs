use capacity_model::MergedRecord;

use crate::selector::Selector;
use crate::types::WindowedQuery;

/// Orders high-risk rows by utilization, highest first, truncated to the
/// query's `risk_limit` when one is set.
pub struct RiskRankSelector;

impl Selector<WindowedQuery, MergedRecord> for RiskRankSelector {
    fn score(&self, candidate: &MergedRecord) -> f64 {
        candidate.utilization.unwrap_or(f64::NAN)
    }

    fn size(&self, query: &WindowedQuery) -> Option<usize> {
        query.query.risk_limit
    }
}
