//! Input and merged record types.
//!
//! Join keys on the input records are optional: a record with an absent
//! (or blank) key can never match and is excluded by the merger rather
//! than rejected at load time.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::thresholds::{HIGH_RISK_DEMAND_CHANGE, HIGH_RISK_UTILIZATION_PCT};

/// One production-capacity observation for a geonode/SKU pair.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CapacityRecord {
    pub geonode_id: Option<String>,
    pub sku_id: Option<String>,
    pub num_of_max_prod_days: f64,
    pub max_capacity: f64,
}

/// One forecast period for a geonode/SKU pair.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub geonode_id: Option<String>,
    pub sku_id: Option<String>,
    #[serde(deserialize_with = "deserialize_date")]
    pub start_date: NaiveDate,
    pub forecast: f64,
}

/// Maps a geonode to its owning organization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrgRecord {
    pub geonode_id: Option<String>,
    pub org_id: Option<String>,
}

/// A denormalized capacity × forecast × org row with derived columns.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MergedRecord {
    pub geonode_id: String,
    pub sku_id: String,
    pub org_id: String,
    pub num_of_max_prod_days: f64,
    pub max_capacity: f64,
    pub start_date: NaiveDate,
    pub forecast: f64,
    /// `num_of_max_prod_days / max_capacity * 100`, or `None` when the
    /// ratio is undefined (zero or non-finite capacity).
    pub utilization: Option<f64>,
    /// Sum of `forecast` over every merged row sharing this row's
    /// (geonode_id, sku_id).
    pub demand_change: f64,
}

impl MergedRecord {
    /// Utilization above threshold while demand is growing.
    ///
    /// Rows with undefined utilization are never high-risk.
    pub fn is_high_risk(&self) -> bool {
        self.utilization
            .is_some_and(|u| u > HIGH_RISK_UTILIZATION_PCT)
            && self.demand_change > HIGH_RISK_DEMAND_CHANGE
    }
}

/// Return the key as a usable join value, treating blank as absent.
pub(crate) fn join_key(key: &Option<String>) -> Option<&str> {
    key.as_deref().map(str::trim).filter(|k| !k.is_empty())
}

/// Parse a date cell, discarding any time component.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS[.fff]`
/// and RFC 3339 timestamps.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_date(&s).ok_or_else(|| {
        serde::de::Error::custom(format!("expected a calendar date, got '{}'", s))
    })
}
