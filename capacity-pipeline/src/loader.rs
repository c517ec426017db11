//! CSV dataset loader.
//!
//! Parses the three input files into model records. Expected columns:
//!   capacity: geonode_id, sku_id, num_of_max_prod_days, max_capacity
//!   forecast: geonode_id, sku_id, start_date, forecast
//!   orgs:     geonode_id, org_id
//!
//! Extra columns are ignored. Blank key cells load as absent keys and are
//! left for the merger to exclude.

use std::io::Read;
use std::path::{Path, PathBuf};

use capacity_model::{CapacityRecord, ForecastRecord, OrgRecord};
use serde::de::DeserializeOwned;

use crate::error::{LoadError, LoadResult};

/// The three record sets the merger consumes.
#[derive(Clone, Debug, Default)]
pub struct Datasets {
    pub capacity: Vec<CapacityRecord>,
    pub forecast: Vec<ForecastRecord>,
    pub orgs: Vec<OrgRecord>,
}

/// Anything that can yield the three input record sets.
pub trait DatasetSource {
    fn load(&self) -> LoadResult<Datasets>;
}

/// Loads each dataset from its own CSV file.
#[derive(Clone, Debug)]
pub struct CsvDatasetSource {
    pub capacity_path: PathBuf,
    pub forecast_path: PathBuf,
    pub orgs_path: PathBuf,
}

impl CsvDatasetSource {
    pub fn new(
        capacity_path: impl Into<PathBuf>,
        forecast_path: impl Into<PathBuf>,
        orgs_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            capacity_path: capacity_path.into(),
            forecast_path: forecast_path.into(),
            orgs_path: orgs_path.into(),
        }
    }
}

impl DatasetSource for CsvDatasetSource {
    fn load(&self) -> LoadResult<Datasets> {
        let datasets = Datasets {
            capacity: load_file(&self.capacity_path, "capacity")?,
            forecast: load_file(&self.forecast_path, "forecast")?,
            orgs: load_file(&self.orgs_path, "orgs")?,
        };
        log::info!(
            "loaded {} capacity, {} forecast, {} org records",
            datasets.capacity.len(),
            datasets.forecast.len(),
            datasets.orgs.len()
        );
        Ok(datasets)
    }
}

/// Load capacity records from a CSV reader.
pub fn load_capacity<R: Read>(reader: R) -> LoadResult<Vec<CapacityRecord>> {
    load_records(reader, "capacity")
}

/// Load forecast records from a CSV reader.
pub fn load_forecast<R: Read>(reader: R) -> LoadResult<Vec<ForecastRecord>> {
    load_records(reader, "forecast")
}

/// Load geonode → organization records from a CSV reader.
pub fn load_orgs<R: Read>(reader: R) -> LoadResult<Vec<OrgRecord>> {
    load_records(reader, "orgs")
}

fn load_file<T: DeserializeOwned>(path: &Path, dataset: &'static str) -> LoadResult<Vec<T>> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_records(file, dataset)
}

fn load_records<T, R>(reader: R, dataset: &'static str) -> LoadResult<Vec<T>>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (line_num, result) in csv_reader.deserialize().enumerate() {
        let record: T = result.map_err(|e| LoadError::Csv {
            dataset,
            line: line_num + 2,
            message: e.to_string(),
        })?;
        records.push(record);
    }

    Ok(records)
}
