/// Produces the rows a view is computed from.
pub trait Source<Q, C> {
    /// Decide if this source should run for the given query.
    fn enable(&self, _query: &Q) -> bool {
        true
    }

    /// Fetch rows for the given query.
    fn get_candidates(&self, query: &Q) -> Vec<C>;
}
