//! The census export: GeoJSON in, four CSV tables out.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::analyzers::aggregate::{aggregate_global, aggregate_neighborhoods};
use crate::analyzers::sample::{DEFAULT_SAMPLE_SIZE, DEFAULT_SEED, sample_records};
use crate::output::{read_records, write_table};
use crate::parser::load_collection;
use crate::record::FlatRecord;

pub const INPUT_FILE: &str = "censo_arboreo.geojson";
pub const RECORDS_FILE: &str = "censo_arboreo_processed.csv";
pub const NEIGHBORHOODS_FILE: &str = "bairro_stats.csv";
pub const GLOBAL_FILE: &str = "global_stats.csv";
pub const SAMPLE_FILE: &str = "heatmap_data.csv";

/// Settings shared by every run.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Directory holding the input GeoJSON and receiving the CSV tables.
    pub data_dir: PathBuf,
    pub sample_size: usize,
    pub seed: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            sample_size: DEFAULT_SAMPLE_SIZE,
            seed: DEFAULT_SEED,
        }
    }
}

impl ExportConfig {
    pub fn input_path(&self) -> PathBuf {
        self.data_dir.join(INPUT_FILE)
    }

    pub fn output_paths(&self) -> OutputPaths {
        OutputPaths {
            records: self.data_dir.join(RECORDS_FILE),
            neighborhoods: self.data_dir.join(NEIGHBORHOODS_FILE),
            global: self.data_dir.join(GLOBAL_FILE),
            sample: self.data_dir.join(SAMPLE_FILE),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OutputPaths {
    pub records: PathBuf,
    pub neighborhoods: PathBuf,
    pub global: PathBuf,
    pub sample: PathBuf,
}

/// What a run produced, logged as JSON once the last table is written.
#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    pub records: usize,
    pub neighborhoods: usize,
    pub species: usize,
    pub sampled: usize,
    pub outputs: OutputPaths,
}

/// Runs the full export: parses `input` (or the default input under the data
/// directory) and writes all four tables.
#[tracing::instrument(skip(config), fields(data_dir = %config.data_dir.display()))]
pub fn export(config: &ExportConfig, input: Option<&Path>) -> Result<ExportSummary> {
    let input = input.map(Path::to_path_buf).unwrap_or_else(|| config.input_path());
    let paths = config.output_paths();

    info!(path = %input.display(), "Loading census feature collection");
    let collection = load_collection(&input)?;
    info!(features = collection.features.len(), "Features loaded");

    let records = collection
        .features
        .iter()
        .enumerate()
        .map(|(i, feature)| {
            FlatRecord::from_feature(feature).with_context(|| format!("feature #{i} is malformed"))
        })
        .collect::<Result<Vec<_>>>()?;

    write_table(&paths.records, &records)?;
    info!(path = %paths.records.display(), records = records.len(), "Full dataset written");

    write_derived_tables(&records, config, paths)
}

/// Regenerates the aggregate and sample tables from a previously written
/// full-dataset table, without touching the GeoJSON.
#[tracing::instrument(skip(config), fields(data_dir = %config.data_dir.display()))]
pub fn rebuild(config: &ExportConfig) -> Result<ExportSummary> {
    let paths = config.output_paths();

    info!(path = %paths.records.display(), "Loading processed records");
    let records = read_records(&paths.records)?;
    info!(records = records.len(), "Records loaded");

    write_derived_tables(&records, config, paths)
}

/// Writes the neighborhood, global and sample tables for `records`.
pub fn write_derived_tables(
    records: &[FlatRecord],
    config: &ExportConfig,
    paths: OutputPaths,
) -> Result<ExportSummary> {
    let neighborhoods = aggregate_neighborhoods(records)?;
    write_table(&paths.neighborhoods, &neighborhoods)?;
    info!(
        path = %paths.neighborhoods.display(),
        neighborhoods = neighborhoods.len(),
        "Neighborhood statistics written"
    );

    let global = aggregate_global(records)?;
    write_table(&paths.global, std::slice::from_ref(&global))?;
    info!(
        path = %paths.global.display(),
        trees = global.total_arvores,
        species = global.total_especies,
        "Global statistics written"
    );

    let sample = sample_records(records, config.sample_size, config.seed);
    write_table(&paths.sample, &sample)?;
    info!(
        path = %paths.sample.display(),
        points = sample.len(),
        seed = config.seed,
        "Heatmap sample written"
    );

    Ok(ExportSummary {
        records: records.len(),
        neighborhoods: neighborhoods.len(),
        species: global.total_especies,
        sampled: sample.len(),
        outputs: paths,
    })
}
