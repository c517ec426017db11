use std::cmp::Ordering;

/// Selectors sort and optionally truncate a row list after filtering.
pub trait Selector<Q, C> {
    /// Default selection: sort descending by score, then truncate to `size`.
    fn select(&self, query: &Q, candidates: Vec<C>) -> Vec<C> {
        let mut sorted = self.sort(candidates);
        if let Some(limit) = self.size(query) {
            sorted.truncate(limit);
        }
        sorted
    }

    /// Extract the score from a row to use for sorting.
    fn score(&self, candidate: &C) -> f64;

    /// Sort rows by score, descending. Stable on ties.
    ///
    /// NaN scores go to the end so undefined values never rank first.
    fn sort(&self, candidates: Vec<C>) -> Vec<C> {
        let mut sorted = candidates;
        sorted.sort_by(|a, b| {
            let sa = self.score(a);
            let sb = self.score(b);
            match (sa.is_nan(), sb.is_nan()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => sb.partial_cmp(&sa).unwrap_or(Ordering::Equal),
            }
        });
        sorted
    }

    /// Maximum number of rows to keep. Defaults to no truncation.
    fn size(&self, _query: &Q) -> Option<usize> {
        None
    }
}
