//! Dataset Merger.
//!
//! Inner-joins capacity ⋈ forecast on (geonode_id, sku_id), then ⋈ org on
//! geonode_id, and derives `utilization` and `demand_change`.
//!
//! Output order follows the capacity input, then forecast input order within
//! a capacity row, then org input order. Duplicate keys in any input fan out
//! into multiple rows.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::records::{join_key, CapacityRecord, ForecastRecord, MergedRecord, OrgRecord};
use crate::table::MergedTable;
use crate::thresholds::UTILIZATION_SCALE;

/// A joined row before the derived columns are computed.
struct JoinedRow<'a> {
    geonode_id: &'a str,
    sku_id: &'a str,
    org_id: &'a str,
    num_of_max_prod_days: f64,
    max_capacity: f64,
    start_date: NaiveDate,
    forecast: f64,
}

/// Capacity utilization as a percentage.
///
/// Returns `None` when `max_capacity` is zero or the ratio is not finite,
/// so undefined values never reach charts or risk checks.
pub fn utilization(num_of_max_prod_days: f64, max_capacity: f64) -> Option<f64> {
    if max_capacity == 0.0 {
        return None;
    }
    let pct = num_of_max_prod_days / max_capacity * UTILIZATION_SCALE;
    pct.is_finite().then_some(pct)
}

/// Join the three record sets into one denormalized table.
///
/// Records missing a join key are dropped (logged at debug). An empty
/// input set yields an empty table.
pub fn merge(
    capacity: &[CapacityRecord],
    forecast: &[ForecastRecord],
    orgs: &[OrgRecord],
) -> MergedTable {
    let mut forecast_index: HashMap<(&str, &str), Vec<&ForecastRecord>> = HashMap::new();
    for (i, f) in forecast.iter().enumerate() {
        match (join_key(&f.geonode_id), join_key(&f.sku_id)) {
            (Some(g), Some(s)) => forecast_index.entry((g, s)).or_default().push(f),
            _ => log::debug!("forecast row {} missing join key, excluded", i),
        }
    }

    let mut org_index: HashMap<&str, Vec<&str>> = HashMap::new();
    for (i, o) in orgs.iter().enumerate() {
        match (join_key(&o.geonode_id), join_key(&o.org_id)) {
            (Some(g), Some(org)) => org_index.entry(g).or_default().push(org),
            _ => log::debug!("org row {} missing geonode_id or org_id, excluded", i),
        }
    }

    let mut joined = Vec::new();
    for (i, c) in capacity.iter().enumerate() {
        let (Some(geonode_id), Some(sku_id)) = (join_key(&c.geonode_id), join_key(&c.sku_id))
        else {
            log::debug!("capacity row {} missing join key, excluded", i);
            continue;
        };
        let Some(periods) = forecast_index.get(&(geonode_id, sku_id)) else {
            log::debug!("no forecast for geonode={} sku={}", geonode_id, sku_id);
            continue;
        };
        let Some(owners) = org_index.get(geonode_id) else {
            log::debug!("no organization for geonode={}", geonode_id);
            continue;
        };
        for f in periods {
            for &org_id in owners {
                joined.push(JoinedRow {
                    geonode_id,
                    sku_id,
                    org_id,
                    num_of_max_prod_days: c.num_of_max_prod_days,
                    max_capacity: c.max_capacity,
                    start_date: f.start_date,
                    forecast: f.forecast,
                });
            }
        }
    }

    let demand = demand_totals(&joined);

    let rows: Vec<MergedRecord> = joined
        .iter()
        .map(|j| {
            let utilization = utilization(j.num_of_max_prod_days, j.max_capacity);
            if utilization.is_none() {
                log::debug!(
                    "undefined utilization for geonode={} sku={} (max_capacity={})",
                    j.geonode_id,
                    j.sku_id,
                    j.max_capacity
                );
            }
            MergedRecord {
                geonode_id: j.geonode_id.to_string(),
                sku_id: j.sku_id.to_string(),
                org_id: j.org_id.to_string(),
                num_of_max_prod_days: j.num_of_max_prod_days,
                max_capacity: j.max_capacity,
                start_date: j.start_date,
                forecast: j.forecast,
                utilization,
                demand_change: demand
                    .get(&(j.geonode_id, j.sku_id))
                    .copied()
                    .unwrap_or_default(),
            }
        })
        .collect();

    log::info!(
        "merged {} capacity x {} forecast x {} org records into {} rows",
        capacity.len(),
        forecast.len(),
        orgs.len(),
        rows.len()
    );

    MergedTable::new(rows)
}

/// Group-by (geonode_id, sku_id) and sum `forecast` over the joined rows.
///
/// Totals are computed once per group and joined back, so every row in a
/// group carries the identical value.
fn demand_totals<'a>(joined: &[JoinedRow<'a>]) -> HashMap<(&'a str, &'a str), f64> {
    let mut totals: HashMap<(&str, &str), f64> = HashMap::new();
    for j in joined {
        *totals.entry((j.geonode_id, j.sku_id)).or_insert(0.0) += j.forecast;
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cap(g: &str, s: &str, days: f64, max: f64) -> CapacityRecord {
        CapacityRecord {
            geonode_id: Some(g.into()),
            sku_id: Some(s.into()),
            num_of_max_prod_days: days,
            max_capacity: max,
        }
    }

    fn fc(g: &str, s: &str, date: &str, forecast: f64) -> ForecastRecord {
        ForecastRecord {
            geonode_id: Some(g.into()),
            sku_id: Some(s.into()),
            start_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            forecast,
        }
    }

    fn org(g: &str, o: &str) -> OrgRecord {
        OrgRecord {
            geonode_id: Some(g.into()),
            org_id: Some(o.into()),
        }
    }

    #[test]
    fn utilization_is_a_percentage() {
        assert_eq!(utilization(90.0, 100.0), Some(90.0));
        assert_eq!(utilization(0.0, 50.0), Some(0.0));
        assert_eq!(utilization(10.0, 0.0), None);
        assert_eq!(utilization(0.0, 0.0), None);
        assert_eq!(utilization(f64::NAN, 10.0), None);
    }

    #[test]
    fn single_supplier_scenario() {
        let table = merge(
            &[cap("1", "A", 90.0, 100.0)],
            &[
                fc("1", "A", "2024-01-01", 50.0),
                fc("1", "A", "2024-02-01", -10.0),
            ],
            &[org("1", "X")],
        );
        assert_eq!(table.len(), 2);
        for row in table.rows() {
            assert_eq!(row.org_id, "X");
            assert!((row.utilization.unwrap() - 90.0).abs() < 1e-9);
            assert!((row.demand_change - 40.0).abs() < 1e-9);
        }
        assert_eq!(table.rows()[0].forecast, 50.0);
        assert_eq!(table.rows()[1].forecast, -10.0);
    }

    #[test]
    fn unmatched_rows_are_dropped() {
        let table = merge(
            &[
                cap("1", "A", 10.0, 100.0),
                cap("2", "B", 10.0, 100.0),
                cap("3", "C", 1.0, 2.0),
            ],
            &[
                fc("1", "A", "2024-01-01", 5.0),
                fc("2", "B", "2024-01-01", 5.0),
            ],
            &[org("1", "X")],
        );
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].geonode_id, "1");
    }

    #[test]
    fn missing_keys_are_excluded_not_errors() {
        let mut no_sku = cap("1", "A", 10.0, 100.0);
        no_sku.sku_id = None;
        let mut blank_geo = fc("1", "A", "2024-01-01", 5.0);
        blank_geo.geonode_id = Some("  ".into());
        let table = merge(
            &[no_sku, cap("1", "A", 20.0, 100.0)],
            &[blank_geo, fc("1", "A", "2024-01-08", 7.0)],
            &[
                org("1", "X"),
                OrgRecord {
                    geonode_id: Some("1".into()),
                    org_id: None,
                },
            ],
        );
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].demand_change, 7.0);
        assert_eq!(table.rows()[0].utilization, Some(20.0));
    }

    #[test]
    fn duplicate_keys_fan_out_and_demand_sums_merged_rows() {
        let table = merge(
            &[cap("1", "A", 10.0, 100.0)],
            &[
                fc("1", "A", "2024-01-01", 5.0),
                fc("1", "A", "2024-01-15", 3.0),
            ],
            &[org("1", "X"), org("1", "Y")],
        );
        assert_eq!(table.len(), 4);
        // Each forecast appears once per owning org.
        assert!(table.rows().iter().all(|r| r.demand_change == 16.0));
        let orgs: Vec<&str> = table.rows().iter().map(|r| r.org_id.as_str()).collect();
        assert_eq!(orgs, vec!["X", "Y", "X", "Y"]);
    }

    #[test]
    fn zero_capacity_yields_undefined_utilization() {
        let table = merge(
            &[cap("2", "B", 10.0, 0.0)],
            &[fc("2", "B", "2024-01-01", 100.0)],
            &[org("2", "Z")],
        );
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].utilization, None);
        assert!(!table.rows()[0].is_high_risk());
    }

    #[test]
    fn any_empty_input_gives_empty_table() {
        let c = [cap("1", "A", 10.0, 100.0)];
        let f = [fc("1", "A", "2024-01-01", 5.0)];
        let o = [org("1", "X")];
        assert!(merge(&[], &f, &o).is_empty());
        assert!(merge(&c, &[], &o).is_empty());
        assert!(merge(&c, &f, &[]).is_empty());
    }

    #[test]
    fn groups_do_not_leak_into_each_other() {
        let table = merge(
            &[
                cap("1", "A", 10.0, 100.0),
                cap("1", "B", 10.0, 100.0),
            ],
            &[
                fc("1", "A", "2024-01-01", 5.0),
                fc("1", "B", "2024-01-01", -2.0),
                fc("1", "A", "2024-02-01", 1.0),
            ],
            &[org("1", "X")],
        );
        for row in table.rows() {
            let expected = if row.sku_id == "A" { 6.0 } else { -2.0 };
            assert_eq!(row.demand_change, expected);
        }
    }
}
