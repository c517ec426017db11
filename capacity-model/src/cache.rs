//! Memoized merge keyed by a content hash of the three inputs.
//!
//! The cache holds at most one entry: the table for the most recently
//! merged datasets. Call `invalidate` on reload to force a fresh merge.

use std::fmt;
use std::sync::Arc;

use chrono::Datelike;

use crate::merge::merge;
use crate::records::{CapacityRecord, ForecastRecord, OrgRecord};
use crate::table::MergedTable;

/// blake3 digest over the content of the three input record sets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DatasetFingerprint([u8; 32]);

impl DatasetFingerprint {
    pub fn of(
        capacity: &[CapacityRecord],
        forecast: &[ForecastRecord],
        orgs: &[OrgRecord],
    ) -> Self {
        let mut hasher = blake3::Hasher::new();
        feed_set(&mut hasher, b"capacity", capacity);
        feed_set(&mut hasher, b"forecast", forecast);
        feed_set(&mut hasher, b"orgs", orgs);
        Self(*hasher.finalize().as_bytes())
    }
}

impl fmt::Display for DatasetFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0[..8] {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

/// Records that can contribute their content to a fingerprint.
trait Fingerprint {
    fn feed(&self, hasher: &mut blake3::Hasher);
}

fn feed_set<T: Fingerprint>(hasher: &mut blake3::Hasher, tag: &[u8], records: &[T]) {
    hasher.update(tag);
    hasher.update(&(records.len() as u64).to_le_bytes());
    for r in records {
        r.feed(hasher);
    }
}

fn feed_key(hasher: &mut blake3::Hasher, key: &Option<String>) {
    match key {
        Some(k) => {
            hasher.update(&[1]);
            hasher.update(&(k.len() as u64).to_le_bytes());
            hasher.update(k.as_bytes());
        }
        None => {
            hasher.update(&[0]);
        }
    }
}

fn feed_f64(hasher: &mut blake3::Hasher, v: f64) {
    hasher.update(&v.to_bits().to_le_bytes());
}

impl Fingerprint for CapacityRecord {
    fn feed(&self, hasher: &mut blake3::Hasher) {
        feed_key(hasher, &self.geonode_id);
        feed_key(hasher, &self.sku_id);
        feed_f64(hasher, self.num_of_max_prod_days);
        feed_f64(hasher, self.max_capacity);
    }
}

impl Fingerprint for ForecastRecord {
    fn feed(&self, hasher: &mut blake3::Hasher) {
        feed_key(hasher, &self.geonode_id);
        feed_key(hasher, &self.sku_id);
        hasher.update(&self.start_date.num_days_from_ce().to_le_bytes());
        feed_f64(hasher, self.forecast);
    }
}

impl Fingerprint for OrgRecord {
    fn feed(&self, hasher: &mut blake3::Hasher) {
        feed_key(hasher, &self.geonode_id);
        feed_key(hasher, &self.org_id);
    }
}

struct CachedMerge {
    fingerprint: DatasetFingerprint,
    table: Arc<MergedTable>,
}

/// Single-writer cache for the merged table.
#[derive(Default)]
pub struct MergeCache {
    entry: Option<CachedMerge>,
}

impl MergeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table when the inputs are unchanged, otherwise
    /// merge and replace the entry.
    pub fn get_or_merge(
        &mut self,
        capacity: &[CapacityRecord],
        forecast: &[ForecastRecord],
        orgs: &[OrgRecord],
    ) -> Arc<MergedTable> {
        let fingerprint = DatasetFingerprint::of(capacity, forecast, orgs);
        if let Some(ref cached) = self.entry {
            if cached.fingerprint == fingerprint {
                log::debug!("merge cache hit fingerprint={}", fingerprint);
                return Arc::clone(&cached.table);
            }
        }

        log::debug!("merge cache miss fingerprint={}", fingerprint);
        let table = Arc::new(merge(capacity, forecast, orgs));
        self.entry = Some(CachedMerge {
            fingerprint,
            table: Arc::clone(&table),
        });
        table
    }

    /// Drop the cached table.
    pub fn invalidate(&mut self) {
        if self.entry.take().is_some() {
            log::debug!("merge cache invalidated");
        }
    }

    pub fn fingerprint(&self) -> Option<DatasetFingerprint> {
        self.entry.as_ref().map(|e| e.fingerprint)
    }
}
