//! Interactive parameter session.
//!
//! Holds the merged table for the life of the session and re-runs the view
//! on every parameter change. Only `reload` touches the input files.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;

use capacity_model::records::parse_date;
use capacity_model::{MergeCache, MergedTable};
use capacity_pipeline::{DatasetSource, RiskDashboardPipeline, ViewQuery};

use crate::report::{self, Timings, NO_MERGED_DATA};

const HELP: &str = "\
Commands:
  year <YYYY>          select a year (start date resets to the year's first date)
  start <YYYY-MM-DD>   select the window start date
  orgs <a,b,...|all>   organizations for the utilization chart
  skus <a,b,...|all>   products for the demand chart
  top <N|all>          limit the high-risk table
  show                 render the current view
  options              list available years and date range
  reload               re-read the input files
  help                 show this message
  quit                 leave the session";

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Year(i32),
    Start(NaiveDate),
    Orgs(Option<Vec<String>>),
    Skus(Option<Vec<String>>),
    Top(Option<usize>),
    Show,
    Options,
    Reload,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((w, r)) => (w, r.trim()),
            None => (line, ""),
        };
        match word.to_lowercase().as_str() {
            "year" => rest
                .parse()
                .map(Command::Year)
                .map_err(|_| format!("year requires an integer, got '{}'", rest)),
            "start" => parse_date(rest)
                .map(Command::Start)
                .ok_or_else(|| format!("start requires a date (YYYY-MM-DD), got '{}'", rest)),
            "orgs" => Ok(Command::Orgs(parse_selection(rest))),
            "skus" => Ok(Command::Skus(parse_selection(rest))),
            "top" => match rest {
                "all" | "" => Ok(Command::Top(None)),
                n => n
                    .parse::<usize>()
                    .ok()
                    .filter(|&n| n > 0)
                    .map(|n| Command::Top(Some(n)))
                    .ok_or_else(|| {
                        format!("top requires a positive integer or 'all', got '{}'", n)
                    }),
            },
            "show" | "" => Ok(Command::Show),
            "options" => Ok(Command::Options),
            "reload" => Ok(Command::Reload),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(format!("unknown command '{}' (try 'help')", other)),
        }
    }
}

/// `all` (or nothing) clears the selection; otherwise a comma-separated list.
fn parse_selection(rest: &str) -> Option<Vec<String>> {
    if rest.is_empty() || rest.eq_ignore_ascii_case("all") {
        return None;
    }
    Some(
        rest.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
    )
}

pub struct Session<S: DatasetSource> {
    source: S,
    cache: MergeCache,
    table: Arc<MergedTable>,
    query: ViewQuery,
    json: bool,
    load_ms: u128,
    views_run: u64,
}

impl<S: DatasetSource> Session<S> {
    pub fn new(
        source: S,
        cache: MergeCache,
        table: Arc<MergedTable>,
        query: ViewQuery,
        json: bool,
        load_ms: u128,
    ) -> Self {
        Self {
            source,
            cache,
            table,
            query,
            json,
            load_ms,
            views_run: 0,
        }
    }

    /// Read commands until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> io::Result<()> {
        writeln!(out, "{}", HELP)?;
        self.render(out)?;
        write!(out, "> ")?;
        out.flush()?;

        for line in input.lines() {
            let line = line?;
            match Command::parse(&line) {
                Ok(Command::Quit) => break,
                Ok(command) => self.apply(command, out)?,
                Err(e) => writeln!(out, "Error: {}", e)?,
            }
            write!(out, "> ")?;
            out.flush()?;
        }
        writeln!(out)
    }

    fn apply<W: Write>(&mut self, command: Command, out: &mut W) -> io::Result<()> {
        let previous = self.query.clone();
        match command {
            Command::Year(year) => {
                self.query.year = year;
                self.query.start_date = None;
            }
            Command::Start(date) => self.query.start_date = Some(date),
            Command::Orgs(selection) => self.query.org_filter = selection,
            Command::Skus(selection) => self.query.sku_filter = selection,
            Command::Top(limit) => self.query.risk_limit = limit,
            Command::Show => {}
            Command::Options => return self.print_options(out),
            Command::Reload => self.reload(out)?,
            Command::Help => return writeln!(out, "{}", HELP),
            Command::Quit => return Ok(()),
        }
        if !self.render(out)? {
            self.query = previous;
        }
        Ok(())
    }

    fn reload<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let started = Instant::now();
        match self.source.load() {
            Ok(data) => {
                self.cache.invalidate();
                self.table = self
                    .cache
                    .get_or_merge(&data.capacity, &data.forecast, &data.orgs);
                self.load_ms = started.elapsed().as_millis();
                writeln!(out, "Reloaded {} merged rows.", self.table.len())?;
                if !self.table.years().contains(&self.query.year) {
                    if let Some(&first) = self.table.years().first() {
                        self.query.year = first;
                        self.query.start_date = None;
                    }
                }
                if let Some(start) = self.query.start_date {
                    let in_range = self
                        .table
                        .date_bounds(self.query.year)
                        .is_some_and(|(min, max)| min <= start && start <= max);
                    if !in_range {
                        log::debug!("start date {} outside reloaded data, reset", start);
                        self.query.start_date = None;
                    }
                }
            }
            Err(e) => {
                log::warn!("reload failed: {}", e);
                writeln!(out, "Error: {} (keeping previously loaded data)", e)?;
            }
        }
        Ok(())
    }

    fn print_options<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "Years: {:?}", self.table.years())?;
        if let Some((min, max)) = self.table.date_bounds(self.query.year) {
            writeln!(out, "Start dates for {}: {} .. {}", self.query.year, min, max)?;
        }
        Ok(())
    }

    /// Render the current view. Returns `false` when the parameters were rejected.
    fn render<W: Write>(&mut self, out: &mut W) -> io::Result<bool> {
        if self.table.is_empty() {
            writeln!(out, "{}", NO_MERGED_DATA)?;
            return Ok(true);
        }

        self.views_run += 1;
        let mut query = self.query.clone();
        query.request_id = format!("session-{:04}", self.views_run);

        let started = Instant::now();
        let pipeline = RiskDashboardPipeline::new(Arc::clone(&self.table));
        match pipeline.execute(query) {
            Ok(view) => {
                let timings = Timings {
                    load_ms: self.load_ms,
                    view_ms: started.elapsed().as_millis(),
                };
                if self.json {
                    report::render_json(out, &view, &self.table, timings)?;
                } else {
                    report::render_human(out, &view, &self.table, timings)?;
                }
                Ok(true)
            }
            Err(e) => {
                writeln!(out, "Error: {}", e)?;
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capacity_model::{CapacityRecord, ForecastRecord, OrgRecord};
    use capacity_pipeline::{Datasets, LoadResult};
    use std::cell::Cell;

    struct FixedSource {
        loads: Cell<usize>,
        /// Later loads drop the June forecast, shrinking 2024's date range.
        shrink_on_reload: bool,
    }

    impl DatasetSource for FixedSource {
        fn load(&self) -> LoadResult<Datasets> {
            self.loads.set(self.loads.get() + 1);
            let date = |m| NaiveDate::from_ymd_opt(2024, m, 1).unwrap();
            let last_month = if self.shrink_on_reload && self.loads.get() > 1 {
                2
            } else {
                6
            };
            Ok(Datasets {
                capacity: vec![CapacityRecord {
                    geonode_id: Some("1".into()),
                    sku_id: Some("A".into()),
                    num_of_max_prod_days: 90.0,
                    max_capacity: 100.0,
                }],
                forecast: vec![
                    ForecastRecord {
                        geonode_id: Some("1".into()),
                        sku_id: Some("A".into()),
                        start_date: date(1),
                        forecast: 50.0,
                    },
                    ForecastRecord {
                        geonode_id: Some("1".into()),
                        sku_id: Some("A".into()),
                        start_date: date(last_month),
                        forecast: -10.0,
                    },
                ],
                orgs: vec![OrgRecord {
                    geonode_id: Some("1".into()),
                    org_id: Some("X".into()),
                }],
            })
        }
    }

    fn session() -> Session<FixedSource> {
        session_with(false)
    }

    fn session_with(shrink_on_reload: bool) -> Session<FixedSource> {
        let source = FixedSource {
            loads: Cell::new(0),
            shrink_on_reload,
        };
        let data = source.load().unwrap();
        let mut cache = MergeCache::new();
        let table = cache.get_or_merge(&data.capacity, &data.forecast, &data.orgs);
        let query = ViewQuery {
            year: 2024,
            ..ViewQuery::default()
        };
        Session::new(source, cache, table, query, false, 0)
    }

    fn run(session: &mut Session<FixedSource>, script: &str) -> String {
        let mut out = Vec::new();
        session.run(script.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn parse_commands() {
        assert_eq!(Command::parse("year 2024"), Ok(Command::Year(2024)));
        assert_eq!(
            Command::parse("start 2024-02-01"),
            Ok(Command::Start(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()))
        );
        assert_eq!(
            Command::parse("orgs X, Y"),
            Ok(Command::Orgs(Some(vec!["X".into(), "Y".into()])))
        );
        assert_eq!(Command::parse("skus all"), Ok(Command::Skus(None)));
        assert_eq!(Command::parse("top 3"), Ok(Command::Top(Some(3))));
        assert_eq!(Command::parse("top all"), Ok(Command::Top(None)));
        assert!(Command::parse("top 0").is_err());
        assert!(Command::parse("top -2").is_err());
        assert_eq!(Command::parse("  QUIT "), Ok(Command::Quit));
        assert_eq!(Command::parse(""), Ok(Command::Show));
        assert!(Command::parse("year twenty").is_err());
        assert!(Command::parse("start tomorrow").is_err());
        assert!(Command::parse("launch").is_err());
    }

    #[test]
    fn parameter_changes_reuse_the_loaded_table() {
        let mut s = session();
        let out = run(&mut s, "start 2024-06-01\norgs X\nquit\n");
        assert_eq!(s.source.loads.get(), 1);
        assert_eq!(s.views_run, 3);
        assert!(out.contains("High-Risk Suppliers"));
        assert!(!out.contains(report::NO_HIGH_RISK));
    }

    #[test]
    fn rejected_parameters_are_rolled_back() {
        let mut s = session();
        let out = run(&mut s, "start 2024-12-01\nyear 1999\n");
        assert!(out.contains("outside 2024's range"));
        assert!(out.contains("not present in the data"));
        assert_eq!(s.query.start_date, None);
        assert_eq!(s.query.year, 2024);
    }

    #[test]
    fn reload_rereads_the_source() {
        let mut s = session();
        run(&mut s, "reload\n");
        assert_eq!(s.source.loads.get(), 2);
        assert!(s.cache.fingerprint().is_some());
    }

    #[test]
    fn reload_resets_a_start_date_outside_the_new_range() {
        let mut s = session_with(true);
        let out = run(&mut s, "start 2024-06-01\nreload\nskus A\n");
        assert_eq!(s.source.loads.get(), 2);
        assert_eq!(s.query.start_date, None);
        assert_eq!(s.query.sku_filter, Some(vec!["A".to_string()]));
        assert!(!out.contains("outside 2024's range"));
    }
}
