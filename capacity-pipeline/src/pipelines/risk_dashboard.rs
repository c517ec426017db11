use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;

use capacity_model::{MergedRecord, MergedTable, QuarterWindow, ViewResult};

use crate::charts::{demand_by_sku, distinct, utilization_by_org};
use crate::components::high_risk_filter::HighRiskFilter;
use crate::components::merged_table_source::MergedTableSource;
use crate::components::org_filter::OrgFilter;
use crate::components::quarter_window_filter::QuarterWindowFilter;
use crate::components::risk_rank_selector::RiskRankSelector;
use crate::components::sku_filter::SkuFilter;
use crate::filter::{apply_filters, Filter};
use crate::selector::Selector;
use crate::source::Source;
use crate::types::{DashboardView, RiskRow, ViewQuery, WindowedQuery};

type RowFilters = Vec<Box<dyn Filter<WindowedQuery, MergedRecord>>>;

/// The supplier capacity risk dashboard.
///
/// Pipeline flow:
/// 1. Resolve and validate the quarter window against the merged table
/// 2. MergedTableSource serves the cached merged rows
/// 3. QuarterWindowFilter produces the temporal view
/// 4. OrgFilter narrows a copy of the temporal view for the utilization chart
/// 5. SkuFilter narrows a separate copy for the demand chart
/// 6. HighRiskFilter flags rows of the full temporal view
/// 7. RiskRankSelector orders (and optionally truncates) the risk table
///
/// Steps 4 and 5 are independent projections, not a cross-filter: each chart
/// answers one question and must not go empty because the other dimension's
/// selection excludes every row. Do not chain them.
pub struct RiskDashboardPipeline {
    source: Box<dyn Source<WindowedQuery, MergedRecord>>,
    window_filters: RowFilters,
    org_filters: RowFilters,
    sku_filters: RowFilters,
    risk_filters: RowFilters,
    selector: RiskRankSelector,
    table: Arc<MergedTable>,
}

impl RiskDashboardPipeline {
    pub fn new(table: Arc<MergedTable>) -> Self {
        Self {
            source: Box::new(MergedTableSource::new(Arc::clone(&table))),
            window_filters: vec![Box::new(QuarterWindowFilter)],
            org_filters: vec![Box::new(OrgFilter)],
            sku_filters: vec![Box::new(SkuFilter)],
            risk_filters: vec![Box::new(HighRiskFilter)],
            selector: RiskRankSelector,
            table,
        }
    }

    /// Compute every view for one parameter selection.
    ///
    /// Fails only on caller-contract violations (unknown year, start date
    /// outside the year's range). An empty window is a valid, empty result.
    pub fn execute(&self, query: ViewQuery) -> ViewResult<DashboardView> {
        let window = QuarterWindow::resolve(&self.table, query.year, query.start_date)?;
        let query = WindowedQuery { query, window };

        let rows = if self.source.enable(&query) {
            self.source.get_candidates(&query)
        } else {
            Vec::new()
        };
        let temporal = apply_filters(&self.window_filters, &query, rows);

        let org_options = distinct(&temporal, |r| r.org_id.as_str());
        let sku_options = distinct(&temporal, |r| r.sku_id.as_str());
        log_unknown(query.request_id(), "org", &query.query.org_filter, &org_options);
        log_unknown(query.request_id(), "sku", &query.query.sku_filter, &sku_options);

        let org_view = apply_filters(&self.org_filters, &query, temporal.clone());
        let sku_view = apply_filters(&self.sku_filters, &query, temporal.clone());

        let flagged = apply_filters(&self.risk_filters, &query, temporal.clone());
        let high_risk_total = flagged.len();
        let high_risk: Vec<RiskRow> = self
            .selector
            .select(&query, flagged)
            .iter()
            .filter_map(RiskRow::from_record)
            .collect();

        log::info!(
            "request_id={} window={}..{} temporal={} org_view={} sku_view={} high_risk={}",
            query.request_id(),
            window.start,
            window.end,
            temporal.len(),
            org_view.len(),
            sku_view.len(),
            high_risk_total
        );

        Ok(DashboardView {
            request_id: query.query.request_id.clone(),
            window,
            temporal_rows: temporal.len(),
            org_options,
            sku_options,
            utilization_by_org: utilization_by_org(&org_view),
            demand_by_sku: demand_by_sku(&sku_view),
            org_view,
            sku_view,
            high_risk,
            high_risk_total,
        })
    }
}

/// Compute the chart and risk views for one parameter selection against an
/// already-merged table.
pub fn select_view(
    merged: &Arc<MergedTable>,
    year: i32,
    start_date: NaiveDate,
    org_filter: Option<Vec<String>>,
    sku_filter: Option<Vec<String>>,
) -> ViewResult<DashboardView> {
    RiskDashboardPipeline::new(Arc::clone(merged)).execute(ViewQuery {
        request_id: format!("view-{}-{}", year, start_date),
        year,
        start_date: Some(start_date),
        org_filter,
        sku_filter,
        risk_limit: None,
    })
}

fn log_unknown(
    request_id: &str,
    dimension: &str,
    requested: &Option<Vec<String>>,
    options: &[String],
) {
    let Some(requested) = requested else {
        return;
    };
    let present: HashSet<&str> = options.iter().map(String::as_str).collect();
    for value in requested {
        if !present.contains(value.as_str()) {
            log::debug!(
                "request_id={} {} '{}' not in temporal view, ignored",
                request_id,
                dimension,
                value
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capacity_model::{merge, CapacityRecord, ForecastRecord, OrgRecord, ViewError};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn scenario_table() -> Arc<MergedTable> {
        let capacity = vec![
            CapacityRecord {
                geonode_id: Some("1".into()),
                sku_id: Some("A".into()),
                num_of_max_prod_days: 90.0,
                max_capacity: 100.0,
            },
            CapacityRecord {
                geonode_id: Some("2".into()),
                sku_id: Some("B".into()),
                num_of_max_prod_days: 10.0,
                max_capacity: 0.0,
            },
        ];
        let forecast = vec![
            ForecastRecord {
                geonode_id: Some("1".into()),
                sku_id: Some("A".into()),
                start_date: d(2024, 1, 1),
                forecast: 50.0,
            },
            ForecastRecord {
                geonode_id: Some("1".into()),
                sku_id: Some("A".into()),
                start_date: d(2024, 2, 1),
                forecast: -10.0,
            },
            ForecastRecord {
                geonode_id: Some("2".into()),
                sku_id: Some("B".into()),
                start_date: d(2024, 1, 15),
                forecast: 500.0,
            },
        ];
        let orgs = vec![
            OrgRecord {
                geonode_id: Some("1".into()),
                org_id: Some("X".into()),
            },
            OrgRecord {
                geonode_id: Some("2".into()),
                org_id: Some("Y".into()),
            },
        ];
        Arc::new(merge(&capacity, &forecast, &orgs))
    }

    #[test]
    fn scenario_flags_both_rows_and_skips_zero_capacity() {
        let view = select_view(&scenario_table(), 2024, d(2024, 1, 1), None, None).unwrap();
        assert_eq!(view.temporal_rows, 3);
        assert_eq!(view.high_risk.len(), 2);
        assert!(view.high_risk.iter().all(|r| r.geonode_id == "1" && r.sku_id == "A"));
        assert!(view.high_risk.iter().all(|r| (r.demand_change - 40.0).abs() < 1e-9));
    }

    #[test]
    fn org_filter_does_not_narrow_the_demand_chart() {
        let view = select_view(
            &scenario_table(),
            2024,
            d(2024, 1, 1),
            Some(vec!["Y".into()]),
            None,
        )
        .unwrap();
        assert!(view.org_view.iter().all(|r| r.org_id == "Y"));
        assert_eq!(view.sku_view.len(), 3);
        assert_eq!(view.demand_by_sku.len(), 2);
        assert_eq!(view.high_risk.len(), 2);
    }

    #[test]
    fn empty_selection_empties_only_its_chart() {
        let view = select_view(
            &scenario_table(),
            2024,
            d(2024, 1, 1),
            None,
            Some(Vec::new()),
        )
        .unwrap();
        assert!(view.sku_view.is_empty());
        assert!(view.demand_by_sku.is_empty());
        assert_eq!(view.org_view.len(), 3);
    }

    #[test]
    fn risk_limit_truncates_but_reports_total() {
        let pipeline = RiskDashboardPipeline::new(scenario_table());
        let view = pipeline
            .execute(ViewQuery {
                request_id: "test-limit".into(),
                year: 2024,
                risk_limit: Some(1),
                ..ViewQuery::default()
            })
            .unwrap();
        assert_eq!(view.high_risk.len(), 1);
        assert_eq!(view.high_risk_total, 2);
    }

    #[test]
    fn invalid_parameters_fail_fast() {
        let table = scenario_table();
        assert!(matches!(
            select_view(&table, 2023, d(2023, 1, 1), None, None),
            Err(ViewError::UnknownYear { .. })
        ));
        assert!(matches!(
            select_view(&table, 2024, d(2024, 3, 1), None, None),
            Err(ViewError::StartDateOutOfRange { .. })
        ));
    }
}
