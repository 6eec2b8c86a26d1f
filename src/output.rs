//! Output formatting and persistence for census tables.
//!
//! Supports writing any serializable row type as a CSV table, reading the
//! full-dataset table back, and logging a run summary as JSON.

use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use tracing::{debug, info};

use crate::record::FlatRecord;
use csv::WriterBuilder;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Logs a value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// A row type with a fixed column layout.
///
/// `HEADERS` must list the serialized fields in declaration order.
pub trait TableRow: Serialize {
    const HEADERS: &'static [&'static str];
}

/// Writes `rows` as a CSV table with a header row, replacing `path`.
///
/// The header comes from [`TableRow::HEADERS`], so an empty table still gets
/// one. The table is encoded in memory, written to a sibling `.tmp` file and
/// renamed into place; `path` never holds a partially written table and the
/// `.tmp` file is removed if anything fails.
pub fn write_table<T: TableRow>(path: &Path, rows: &[T]) -> Result<()> {
    debug!(path = %path.display(), rows = rows.len(), "Writing CSV table");

    let mut writer = WriterBuilder::new().has_headers(false).from_writer(Vec::new());
    writer.write_record(T::HEADERS)?;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("writing row to {}", path.display()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("encoding {}: {}", path.display(), e.error()))?;

    let tmp = tmp_path(path);
    if let Err(e) = fs::write(&tmp, &bytes).and_then(|()| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(e).with_context(|| format!("writing {}", path.display()));
    }

    Ok(())
}

/// Reads a full-dataset table previously written by [`write_table`].
pub fn read_records(path: &Path) -> Result<Vec<FlatRecord>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut rdr = csv::Reader::from_reader(file);

    let mut rows = Vec::new();
    for (line, result) in rdr.deserialize().enumerate() {
        let record: FlatRecord =
            result.with_context(|| format!("reading row {} of {}", line + 1, path.display()))?;
        rows.push(record);
    }

    Ok(rows)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
