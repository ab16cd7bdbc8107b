//! Conversions from instrument/text exports into tables.
//!
//! NOAA-style text files carry `#`-prefixed metadata lines followed by
//! tab-separated data. [`text_to_csv`] strips the metadata and writes plain
//! CSV; [`record_from_csv`] turns such a CSV into an [`ArchiveRecord`].

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::archive::{ArchiveRecord, Column, MEASURED};
use crate::error::{Result, ValidationError};

/// Default CSV path for a text export: `.txt` swapped for `.csv`.
pub fn default_csv_path(input: &Path) -> PathBuf {
    input.with_extension("csv")
}

/// Strip `#` lines from a tab-separated text export and write it as CSV.
///
/// Invalid UTF-8 is replaced rather than rejected. Blank lines are dropped.
/// Returns the path written.
pub fn text_to_csv(input: &Path, output: Option<&Path>) -> Result<PathBuf> {
    let bytes = fs::read(input)?;
    let text = String::from_utf8_lossy(&bytes);
    let output = output.map_or_else(|| default_csv_path(input), Path::to_path_buf);

    let mut writer = csv::WriterBuilder::new().flexible(true).from_path(&output)?;
    let mut rows = 0usize;
    for line in text.lines() {
        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }
        writer.write_record(line.trim().split('\t').map(str::trim))?;
        rows += 1;
    }
    writer.flush()?;

    debug!(input = %input.display(), output = %output.display(), rows, "converted text export");
    Ok(output)
}

/// Split a header such as `age (yr BP)` or `d18O [permil]` into name and unit.
fn split_header(header: &str) -> (String, String) {
    let header = header.trim();
    for (open, close) in [('(', ')'), ('[', ']')] {
        if let (Some(start), true) = (header.rfind(open), header.ends_with(close)) {
            let name = header[..start].trim();
            let unit = header[start + 1..header.len() - 1].trim();
            if !name.is_empty() {
                return (name.to_string(), unit.to_string());
            }
        }
    }
    (header.to_string(), String::new())
}

/// Read a headed CSV into a record of measured columns.
///
/// Numeric cells become numbers, empty cells `null`, anything else is kept
/// as text so it can be reported when the column is used as a series.
pub fn record_from_csv(path: &Path, dataset_name: &str) -> Result<ArchiveRecord> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(ValidationError::EmptyCollection(format!(
            "{} has no header row",
            path.display()
        ))
        .into());
    }

    let mut columns: Vec<Column> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let (variable_name, units) = split_header(h);
            Column {
                number: i + 1,
                variable_name,
                units,
                variable_type: MEASURED.into(),
                values: Vec::new(),
                event: None,
            }
        })
        .collect();

    for row in reader.records() {
        let row = row?;
        for (i, column) in columns.iter_mut().enumerate() {
            let cell = row.get(i).unwrap_or("").trim();
            let value = if cell.is_empty() {
                Value::Null
            } else if let Ok(n) = cell.parse::<f64>() {
                Value::from(n)
            } else {
                Value::String(cell.to_string())
            };
            column.values.push(value);
        }
    }

    Ok(ArchiveRecord {
        dataset_name: dataset_name.to_string(),
        columns,
    })
}
