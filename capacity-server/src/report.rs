use std::io::{self, Write};

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use capacity_model::{MergedTable, QuarterWindow};
use capacity_pipeline::{DashboardView, OrgUtilization, RiskRow, SkuDemand};

const BAR_WIDTH: usize = 30;

const MITIGATION_OPTIONS: [&str; 6] = [
    "Production adjustments: Work with high-risk suppliers to adjust their production schedules, shift resources, or implement capacity optimization strategies.",
    "Seek alternative suppliers: Explore alternative suppliers or reallocate orders to suppliers with lower capacity utilization and better ability to handle demand fluctuations.",
    "Demand smoothing: Implement strategies to smooth out demand patterns and reduce fluctuations that may strain supplier capacity.",
    "Capacity expansion: Collaborate with critical suppliers to invest in capacity expansion projects, such as facility upgrades, equipment purchases, or process improvements.",
    "Supplier development: Work closely with suppliers facing capacity challenges to identify bottlenecks, provide training and support, and help them implement best practices.",
    "Risk mitigation strategies: Develop contingency plans and risk mitigation strategies for suppliers with high capacity risks.",
];

pub const NO_HIGH_RISK: &str = "No high-risk suppliers found for the selected filters.";
pub const NO_MERGED_DATA: &str = "No rows left after joining the capacity, forecast and organization datasets.";

// ---------------------------------------------------------------------------
// JSON output contract
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ReportJson<'a> {
    generated_at: String,
    request_id: &'a str,
    window: &'a QuarterWindow,
    year_options: Vec<i32>,
    date_bounds: Option<DateBoundsJson>,
    org_options: &'a [String],
    sku_options: &'a [String],
    utilization_by_org: &'a [OrgUtilization],
    demand_by_sku: &'a [SkuDemand],
    high_risk: &'a [RiskRow],
    summary: SummaryJson,
}

#[derive(Serialize)]
struct DateBoundsJson {
    min: NaiveDate,
    max: NaiveDate,
}

#[derive(Serialize)]
struct SummaryJson {
    merged_rows: usize,
    temporal_rows: usize,
    high_risk_total: usize,
    high_risk_shown: usize,
    load_ms: u128,
    view_ms: u128,
}

/// Timings reported alongside a view.
#[derive(Clone, Copy, Debug, Default)]
pub struct Timings {
    pub load_ms: u128,
    pub view_ms: u128,
}

pub fn render_json<W: Write>(
    out: &mut W,
    view: &DashboardView,
    table: &MergedTable,
    timings: Timings,
) -> io::Result<()> {
    let report = ReportJson {
        generated_at: Utc::now().to_rfc3339(),
        request_id: &view.request_id,
        window: &view.window,
        year_options: table.years(),
        date_bounds: table
            .date_bounds(view.window.year)
            .map(|(min, max)| DateBoundsJson { min, max }),
        org_options: &view.org_options,
        sku_options: &view.sku_options,
        utilization_by_org: &view.utilization_by_org,
        demand_by_sku: &view.demand_by_sku,
        high_risk: &view.high_risk,
        summary: SummaryJson {
            merged_rows: table.len(),
            temporal_rows: view.temporal_rows,
            high_risk_total: view.high_risk_total,
            high_risk_shown: view.high_risk.len(),
            load_ms: timings.load_ms,
            view_ms: timings.view_ms,
        },
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)
}

// ---------------------------------------------------------------------------
// Human-readable output
// ---------------------------------------------------------------------------

/// Format a number with comma thousands separators and one decimal.
pub fn format_quantity(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let tenths = (amount.abs() * 10.0).round() as u64;
    let whole = tenths / 10;
    let frac = tenths % 10;

    let s = whole.to_string();
    let mut grouped = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}{}.{}", sign, grouped.chars().rev().collect::<String>(), frac)
}

/// A horizontal bar scaled against `max`, drawn with `░` for negative values.
fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 || !value.is_finite() {
        return String::new();
    }
    let len = ((value.abs() / max) * BAR_WIDTH as f64).round() as usize;
    let ch = if value < 0.0 { '\u{2591}' } else { '\u{2588}' };
    std::iter::repeat(ch).take(len.min(BAR_WIDTH)).collect()
}

pub fn render_human<W: Write>(
    out: &mut W,
    view: &DashboardView,
    table: &MergedTable,
    timings: Timings,
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "  \u{2554}{}\u{2557}", "\u{2550}".repeat(62))?;
    writeln!(out, "  \u{2551}{:^62}\u{2551}", "SUPPLIER CAPACITY RISK ANALYSIS")?;
    writeln!(out, "  \u{255a}{}\u{255d}", "\u{2550}".repeat(62))?;
    writeln!(out)?;

    let w = &view.window;
    writeln!(
        out,
        "  Year {}  \u{00b7}  {} \u{2192} {} (exclusive)  \u{00b7}  {} of {} rows in window",
        w.year,
        w.start,
        w.end,
        view.temporal_rows,
        table.len()
    )?;
    if let Some((min, max)) = table.date_bounds(w.year) {
        writeln!(
            out,
            "  Years available: {:?}  \u{00b7}  start dates for {}: {} .. {}",
            table.years(),
            w.year,
            min,
            max
        )?;
    }
    writeln!(out)?;

    writeln!(out, "  Capacity Utilization Distribution by Organization")?;
    writeln!(out, "  {:\u{2500}<64}", "")?;
    if view.utilization_by_org.is_empty() {
        writeln!(out, "  No data for the selected organizations in this window.")?;
    } else {
        let max = view
            .utilization_by_org
            .iter()
            .filter_map(|b| b.avg_utilization)
            .fold(0.0_f64, f64::max);
        for b in &view.utilization_by_org {
            match b.avg_utilization {
                Some(u) => writeln!(
                    out,
                    "  {:12} {:30} {:>7.1}%  ({} rows)",
                    b.org_id,
                    bar(u, max),
                    u,
                    b.rows
                )?,
                None => writeln!(
                    out,
                    "  {:12} {:30} {:>8}  ({} rows, zero capacity)",
                    b.org_id, "", "n/a", b.rows
                )?,
            }
        }
    }
    writeln!(out)?;

    writeln!(out, "  Demand Change by Product")?;
    writeln!(out, "  {:\u{2500}<64}", "")?;
    if view.demand_by_sku.is_empty() {
        writeln!(out, "  No data for the selected products in this window.")?;
    } else {
        let max = view
            .demand_by_sku
            .iter()
            .map(|b| b.demand_change.abs())
            .fold(0.0_f64, f64::max);
        for b in &view.demand_by_sku {
            writeln!(
                out,
                "  {:12} {:30} {:>12}",
                b.sku_id,
                bar(b.demand_change, max),
                format_quantity(b.demand_change)
            )?;
        }
    }
    writeln!(out)?;

    writeln!(out, "  High-Risk Suppliers")?;
    writeln!(out, "  {:\u{2500}<64}", "")?;
    if view.high_risk.is_empty() {
        writeln!(out, "  {}", NO_HIGH_RISK)?;
    } else {
        writeln!(
            out,
            "  {:10} {:12} {:10} {:10} {:>8} {:>12}",
            "geonode", "sku", "org", "start", "util %", "demand chg"
        )?;
        for r in &view.high_risk {
            writeln!(
                out,
                "  {:10} {:12} {:10} {:10} {:>8.1} {:>12}",
                r.geonode_id,
                r.sku_id,
                r.org_id,
                r.start_date.to_string(),
                r.utilization,
                format_quantity(r.demand_change)
            )?;
        }
        if view.high_risk_total > view.high_risk.len() {
            writeln!(
                out,
                "  ... {} more not shown",
                view.high_risk_total - view.high_risk.len()
            )?;
        }
    }
    writeln!(out)?;

    writeln!(out, "  Potential Mitigation Options")?;
    writeln!(out, "  {:\u{2500}<64}", "")?;
    for (i, option) in MITIGATION_OPTIONS.iter().enumerate() {
        writeln!(out, "  {}. {}", i + 1, option)?;
    }
    writeln!(out)?;

    writeln!(
        out,
        "  \u{23f1}  Data loaded in {}ms \u{00b7} View computed in {}ms",
        timings.load_ms, timings.view_ms
    )?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use capacity_model::{merge, CapacityRecord, ForecastRecord, OrgRecord};
    use capacity_pipeline::select_view;

    fn table(forecast: f64) -> Arc<MergedTable> {
        Arc::new(merge(
            &[CapacityRecord {
                geonode_id: Some("1".into()),
                sku_id: Some("A".into()),
                num_of_max_prod_days: 90.0,
                max_capacity: 100.0,
            }],
            &[ForecastRecord {
                geonode_id: Some("1".into()),
                sku_id: Some("A".into()),
                start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                forecast,
            }],
            &[OrgRecord {
                geonode_id: Some("1".into()),
                org_id: Some("X".into()),
            }],
        ))
    }

    fn render(forecast: f64, json: bool) -> String {
        let t = table(forecast);
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let view = select_view(&t, 2024, start, None, None).unwrap();
        let mut buf = Vec::new();
        if json {
            render_json(&mut buf, &view, &t, Timings::default()).unwrap();
        } else {
            render_human(&mut buf, &view, &t, Timings::default()).unwrap();
        }
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn format_quantity_groups_thousands() {
        assert_eq!(format_quantity(0.0), "0.0");
        assert_eq!(format_quantity(40.0), "40.0");
        assert_eq!(format_quantity(1234567.25), "1,234,567.3");
        assert_eq!(format_quantity(-1500.0), "-1,500.0");
    }

    #[test]
    fn bar_scales_to_max() {
        assert_eq!(bar(50.0, 100.0).chars().count(), 15);
        assert_eq!(bar(100.0, 100.0).chars().count(), BAR_WIDTH);
        assert!(bar(-10.0, 10.0).starts_with('\u{2591}'));
        assert!(bar(5.0, 0.0).is_empty());
    }

    #[test]
    fn human_report_lists_high_risk_rows() {
        let text = render(50.0, false);
        assert!(text.contains("High-Risk Suppliers"));
        assert!(text.contains("90.0"));
        assert!(!text.contains(NO_HIGH_RISK));
        assert!(text.contains("Potential Mitigation Options"));
    }

    #[test]
    fn human_report_shows_empty_risk_state() {
        let text = render(-5.0, false);
        assert!(text.contains(NO_HIGH_RISK));
    }

    #[test]
    fn json_report_is_valid_json() {
        let text = render(50.0, true);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["summary"]["high_risk_total"], 1);
        assert_eq!(value["window"]["start"], "2024-01-01");
        assert_eq!(value["window"]["end"], "2024-03-31");
        assert_eq!(value["year_options"][0], 2024);
        assert_eq!(value["high_risk"][0]["sku_id"], "A");
    }
}
