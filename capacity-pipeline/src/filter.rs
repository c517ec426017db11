/// Result of a filter operation, partitioning rows into kept and removed.
pub struct FilterResult<C> {
    pub kept: Vec<C>,
    pub removed: Vec<C>,
}

impl<C> FilterResult<C> {
    /// Split `candidates` by a predicate, preserving input order in both halves.
    pub fn partition<F>(candidates: Vec<C>, keep: F) -> Self
    where
        F: FnMut(&C) -> bool,
    {
        let (kept, removed) = candidates.into_iter().partition(keep);
        Self { kept, removed }
    }
}

/// Filters run sequentially and partition rows into kept and removed sets.
pub trait Filter<Q, C> {
    /// Decide if this filter should run for the given query.
    fn enable(&self, _query: &Q) -> bool {
        true
    }

    /// Evaluate each row against the filter's criteria. Kept rows continue
    /// to the next filter; removed rows are excluded from the view.
    fn filter(&self, query: &Q, candidates: Vec<C>) -> FilterResult<C>;

    /// Returns a stable name for logging.
    fn name(&self) -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }
}

/// Run `filters` in order, skipping disabled ones.
///
/// Returns the rows that survived every enabled filter.
pub fn apply_filters<Q, C>(
    filters: &[Box<dyn Filter<Q, C>>],
    query: &Q,
    candidates: Vec<C>,
) -> Vec<C> {
    let mut kept = candidates;
    for filter in filters {
        if !filter.enable(query) {
            continue;
        }
        let result = filter.filter(query, kept);
        log::debug!(
            "filter={} kept={} removed={}",
            filter.name(),
            result.kept.len(),
            result.removed.len()
        );
        kept = result.kept;
    }
    kept
}

/// `"my_crate::module::MyType"` → `"MyType"`.
pub(crate) fn short_type_name(full: &'static str) -> &'static str {
    full.rsplit("::").next().unwrap_or(full)
}
