use chrono::NaiveDate;
use serde::Serialize;

use capacity_model::{MergedRecord, QuarterWindow};

// ---------------------------------------------------------------------------
// Query types
// ---------------------------------------------------------------------------

/// User-selected view parameters.
#[derive(Clone, Debug, Default)]
pub struct ViewQuery {
    pub request_id: String,
    pub year: i32,
    /// Window start; `None` selects the earliest date of `year`.
    pub start_date: Option<NaiveDate>,
    /// Organizations for the utilization chart; `None` selects all.
    pub org_filter: Option<Vec<String>>,
    /// SKUs for the demand chart; `None` selects all.
    pub sku_filter: Option<Vec<String>>,
    /// Truncate the risk table to this many rows.
    pub risk_limit: Option<usize>,
}

/// A query whose window has been validated against the merged table.
#[derive(Clone, Debug)]
pub struct WindowedQuery {
    pub query: ViewQuery,
    pub window: QuarterWindow,
}

impl WindowedQuery {
    pub fn request_id(&self) -> &str {
        &self.query.request_id
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// One bar of the utilization-by-organization chart.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OrgUtilization {
    pub org_id: String,
    /// Mean of defined utilization values; `None` if every row was undefined.
    pub avg_utilization: Option<f64>,
    pub rows: usize,
}

/// One bar of the demand-by-SKU chart.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SkuDemand {
    pub sku_id: String,
    /// Sum of each (geonode_id, sku_id) group's demand_change, counted once per group.
    pub demand_change: f64,
    pub groups: usize,
}

/// A flagged high-risk row.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RiskRow {
    pub geonode_id: String,
    pub sku_id: String,
    pub org_id: String,
    pub start_date: NaiveDate,
    pub utilization: f64,
    pub demand_change: f64,
}

impl RiskRow {
    /// Project a merged row; `None` when utilization is undefined.
    pub fn from_record(record: &MergedRecord) -> Option<Self> {
        Some(Self {
            geonode_id: record.geonode_id.clone(),
            sku_id: record.sku_id.clone(),
            org_id: record.org_id.clone(),
            start_date: record.start_date,
            utilization: record.utilization?,
            demand_change: record.demand_change,
        })
    }
}

/// Everything the rendering layer needs for one parameter selection.
///
/// `org_view` and `sku_view` are independent projections of the temporal
/// view: the org filter never narrows the demand chart and the SKU filter
/// never narrows the utilization chart.
#[derive(Clone, Debug, Serialize)]
pub struct DashboardView {
    pub request_id: String,
    pub window: QuarterWindow,
    /// Rows in the temporal view.
    pub temporal_rows: usize,
    /// Distinct org_id values in the temporal view, ascending.
    pub org_options: Vec<String>,
    /// Distinct sku_id values in the temporal view, ascending.
    pub sku_options: Vec<String>,
    #[serde(skip)]
    pub org_view: Vec<MergedRecord>,
    #[serde(skip)]
    pub sku_view: Vec<MergedRecord>,
    pub utilization_by_org: Vec<OrgUtilization>,
    pub demand_by_sku: Vec<SkuDemand>,
    /// High-risk rows, highest utilization first.
    pub high_risk: Vec<RiskRow>,
    /// Number of high-risk rows before any `risk_limit` truncation.
    pub high_risk_total: usize,
}

impl DashboardView {
    pub fn is_empty(&self) -> bool {
        self.temporal_rows == 0
    }
}
