//! Chart aggregations over filtered views.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use capacity_model::MergedRecord;

use crate::types::{OrgUtilization, SkuDemand};

/// Average defined utilization per organization, ordered by org_id.
pub fn utilization_by_org(rows: &[MergedRecord]) -> Vec<OrgUtilization> {
    let mut groups: BTreeMap<&str, (f64, usize, usize)> = BTreeMap::new();
    for r in rows {
        let entry = groups.entry(r.org_id.as_str()).or_insert((0.0, 0, 0));
        if let Some(u) = r.utilization {
            entry.0 += u;
            entry.1 += 1;
        }
        entry.2 += 1;
    }
    groups
        .into_iter()
        .map(|(org_id, (sum, defined, total))| OrgUtilization {
            org_id: org_id.to_string(),
            avg_utilization: (defined > 0).then(|| sum / defined as f64),
            rows: total,
        })
        .collect()
}

/// Total demand change per SKU, ordered by sku_id.
///
/// `demand_change` is already a group total broadcast onto every row of
/// its (geonode_id, sku_id) group, so each group contributes once. This is a
/// sum over groups, not the row-weighted mean a seaborn bar plot of the
/// same column would draw: a group with many forecast periods does not pull
/// the bar toward its own value.
pub fn demand_by_sku(rows: &[MergedRecord]) -> Vec<SkuDemand> {
    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    let mut totals: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for r in rows {
        let entry = totals.entry(r.sku_id.as_str()).or_insert((0.0, 0));
        if seen.insert((r.geonode_id.as_str(), r.sku_id.as_str())) {
            entry.0 += r.demand_change;
            entry.1 += 1;
        }
    }
    totals
        .into_iter()
        .map(|(sku_id, (demand_change, groups))| SkuDemand {
            sku_id: sku_id.to_string(),
            demand_change,
            groups,
        })
        .collect()
}

/// Distinct values of a column, ascending.
pub fn distinct<'a, F>(rows: &'a [MergedRecord], column: F) -> Vec<String>
where
    F: Fn(&'a MergedRecord) -> &'a str,
{
    rows.iter()
        .map(column)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(String::from)
        .collect()
}
