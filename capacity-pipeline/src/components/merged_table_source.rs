use std::sync::Arc;

use capacity_model::{MergedRecord, MergedTable};

use crate::source::Source;
use crate::types::WindowedQuery;

/// Serves rows from the shared, already-merged table. Never re-joins.
pub struct MergedTableSource {
    table: Arc<MergedTable>,
}

impl MergedTableSource {
    pub fn new(table: Arc<MergedTable>) -> Self {
        Self { table }
    }
}

impl Source<WindowedQuery, MergedRecord> for MergedTableSource {
    fn enable(&self, _query: &WindowedQuery) -> bool {
        !self.table.is_empty()
    }

    fn get_candidates(&self, _query: &WindowedQuery) -> Vec<MergedRecord> {
        self.table.rows().to_vec()
    }
}
