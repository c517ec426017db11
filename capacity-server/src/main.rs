//! Supplier capacity risk report.
//!
//! ```bash
//! capacity-server --capacity fixtures/capacity.csv --forecast fixtures/forecast.csv --orgs fixtures/orgs.csv
//! capacity-server ... --year 2024 --start-date 2024-02-01 --org ORG-A --json
//! capacity-server ... --interactive
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use clap::Parser;
use thiserror::Error;

use capacity_model::records::parse_date;
use capacity_model::{MergeCache, MergedTable, ViewError};
use capacity_pipeline::{
    CsvDatasetSource, DatasetSource, LoadError, RiskDashboardPipeline, ViewQuery,
};

mod report;
mod session;

use report::{Timings, NO_MERGED_DATA};
use session::Session;

// ---------------------------------------------------------------------------
// CLI arguments
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "capacity-server")]
#[command(about = "Supplier capacity risk analysis over capacity, forecast and organization CSVs")]
#[command(version)]
struct Args {
    /// Capacity CSV (geonode_id, sku_id, num_of_max_prod_days, max_capacity)
    #[arg(long, env = "CAPACITY_CSV")]
    capacity: PathBuf,

    /// Forecast CSV (geonode_id, sku_id, start_date, forecast)
    #[arg(long, env = "FORECAST_CSV")]
    forecast: PathBuf,

    /// Geonode to organization CSV (geonode_id, org_id)
    #[arg(long, env = "ORG_CSV")]
    orgs: PathBuf,

    /// Year to report on (default: earliest year in the data)
    #[arg(long)]
    year: Option<i32>,

    /// Window start date, YYYY-MM-DD (default: first date of the year)
    #[arg(long, value_parser = parse_date_arg)]
    start_date: Option<NaiveDate>,

    /// Organizations for the utilization chart (comma-separated, default: all)
    #[arg(long = "org", value_delimiter = ',')]
    org: Option<Vec<String>>,

    /// Products for the demand chart (comma-separated, default: all)
    #[arg(long = "sku", value_delimiter = ',')]
    sku: Option<Vec<String>>,

    /// Number of high-risk rows to show (default: all)
    #[arg(long)]
    top: Option<usize>,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,

    /// Read parameter changes from stdin and re-render after each one
    #[arg(short, long)]
    interactive: bool,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).ok_or_else(|| format!("expected a date as YYYY-MM-DD, got '{}'", s))
}

#[derive(Debug, Error)]
enum AppError {
    #[error("Error loading data: {0}")]
    Load(#[from] LoadError),

    #[error("Invalid parameters: {0}")]
    View(#[from] ViewError),

    #[error("Output error: {0}")]
    Io(#[from] io::Error),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();
}

fn initial_query(args: &Args, table: &MergedTable) -> ViewQuery {
    ViewQuery {
        request_id: "report-001".into(),
        year: args
            .year
            .or_else(|| table.years().first().copied())
            .unwrap_or_default(),
        start_date: args.start_date,
        org_filter: args.org.clone(),
        sku_filter: args.sku.clone(),
        risk_limit: args.top,
    }
}

fn run(args: Args) -> Result<(), AppError> {
    let source = CsvDatasetSource::new(
        args.capacity.clone(),
        args.forecast.clone(),
        args.orgs.clone(),
    );

    let load_start = Instant::now();
    let data = source.load()?;
    let mut cache = MergeCache::new();
    let table = cache.get_or_merge(&data.capacity, &data.forecast, &data.orgs);
    let load_ms = load_start.elapsed().as_millis();

    let query = initial_query(&args, &table);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.interactive {
        let mut session = Session::new(source, cache, table, query, args.json, load_ms);
        session.run(io::stdin().lock(), &mut out)?;
        return Ok(());
    }

    if table.is_empty() {
        writeln!(out, "{}", NO_MERGED_DATA)?;
        return Ok(());
    }

    let view_start = Instant::now();
    let view = RiskDashboardPipeline::new(Arc::clone(&table)).execute(query)?;
    let timings = Timings {
        load_ms,
        view_ms: view_start.elapsed().as_millis(),
    };

    if args.json {
        report::render_json(&mut out, &view, &table, timings)?;
    } else {
        report::render_human(&mut out, &view, &table, timings)?;
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("{}", e);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn filters_split_on_commas_and_repeat() {
        let args = Args::try_parse_from([
            "capacity-server",
            "--capacity",
            "c.csv",
            "--forecast",
            "f.csv",
            "--orgs",
            "o.csv",
            "--org",
            "ORG-1,ORG-2",
            "--org",
            "ORG-3",
            "--start-date",
            "2024-02-01",
        ])
        .unwrap();
        assert_eq!(
            args.org,
            Some(vec!["ORG-1".into(), "ORG-2".into(), "ORG-3".into()])
        );
        assert_eq!(args.sku, None);
        assert_eq!(args.start_date, NaiveDate::from_ymd_opt(2024, 2, 1));
    }

    #[test]
    fn bad_start_date_is_rejected_by_the_parser() {
        let result = Args::try_parse_from([
            "capacity-server",
            "--capacity",
            "c.csv",
            "--forecast",
            "f.csv",
            "--orgs",
            "o.csv",
            "--start-date",
            "02/01/2024",
        ]);
        assert!(result.is_err());
    }
}
