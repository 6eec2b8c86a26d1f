//! GeoJSON parser for the tree census feature collection.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// A GeoJSON `FeatureCollection`, reduced to the parts the export reads.
#[derive(Debug, Deserialize)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

/// One tree: a point geometry plus its census attributes.
#[derive(Debug, Deserialize)]
pub struct Feature {
    /// GeoJSON allows `"properties": null`, which is read as an empty map.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub properties: Map<String, Value>,
    pub geometry: Geometry,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    pub coordinates: Vec<f64>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decodes a feature collection from raw bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not valid JSON, or if any feature lacks
/// a `geometry.coordinates` array of numbers.
pub fn parse_collection(bytes: &[u8]) -> Result<FeatureCollection> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Reads and decodes the feature collection stored at `path`.
pub fn load_collection(path: &Path) -> Result<FeatureCollection> {
    let file =
        File::open(path).with_context(|| format!("opening census file {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("decoding feature collection {}", path.display()))
}
