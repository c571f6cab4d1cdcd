use std::path::Path;

use chrono::NaiveDateTime;
use log::info;
use serde_json::Value as JsonValue;

use super::filter::TripFilter;
use super::model::{is_missing, FieldValue, RawTable, TripDataset, TripRecord, END_TIME, START_TIME};
use crate::config::CityRegistry;
use crate::error::{BikeshareError, Result};

/// Timestamp layouts seen in bike share exports.
const TIMESTAMP_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the trips of `city` and keep the ones matching `filter`.
///
/// ```text
///  source file ──► read_table ──► drop_missing_timestamps ──► parse_trips ──► filter
/// ```
pub fn load_and_filter(
    registry: &CityRegistry,
    city: &str,
    filter: &TripFilter,
) -> Result<TripDataset> {
    let source = registry
        .source(city)
        .ok_or_else(|| BikeshareError::UnknownCity(city.to_string()))?;

    let mut table = read_table(&source.path)?;
    info!("Read {} rows from {}", table.len(), source.path.display());

    let dropped = drop_missing_timestamps(&mut table, &source.path)?;
    if dropped > 0 {
        info!("Dropped {dropped} rows without start/end time");
    }

    let mut dataset = parse_trips(table, &source.path)?;
    filter.apply(&mut dataset);
    info!(
        "{} trips for {city} (month={}, day={})",
        dataset.len(),
        filter.month,
        filter.day
    );
    Ok(dataset)
}

/// Read a whole data source. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – header row, one trip per line
/// * `.json` – `[{ "Start Time": "...", "End Time": "...", ... }, ...]`
pub fn read_table(path: &Path) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "json" => read_json(path),
        _ => read_csv(path),
    }
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

fn read_csv(path: &Path) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| BikeshareError::data_source(path, e))?;

    let column_names: Vec<String> = reader
        .headers()
        .map_err(|e| BikeshareError::data_source(path, e))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = result.map_err(|e| BikeshareError::data_source(path, e))?;
        // Short rows are padded with nulls; long rows do not fit the table.
        if record.len() > column_names.len() {
            return Err(BikeshareError::data_source(
                path,
                format!(
                    "row {i} has {} fields, header has {}",
                    record.len(),
                    column_names.len()
                ),
            ));
        }
        let row = (0..column_names.len())
            .map(|i| record.get(i).map(str::to_string))
            .collect();
        rows.push(row);
    }

    Ok(RawTable { column_names, rows })
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Records-oriented JSON (`df.to_json(orient='records')`). Columns are the
/// union of all keys, in first-seen order.
fn read_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).map_err(|e| BikeshareError::data_source(path, e))?;
    let root: JsonValue =
        serde_json::from_str(&text).map_err(|e| BikeshareError::data_source(path, e))?;

    let records = root
        .as_array()
        .ok_or_else(|| BikeshareError::data_source(path, "expected a top-level JSON array"))?;

    let mut column_names: Vec<String> = Vec::new();
    let mut objects = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec.as_object().ok_or_else(|| {
            BikeshareError::data_source(path, format!("row {i} is not a JSON object"))
        })?;
        for key in obj.keys() {
            if !column_names.contains(key) {
                column_names.push(key.clone());
            }
        }
        objects.push(obj);
    }

    let rows = objects
        .into_iter()
        .map(|obj| {
            column_names
                .iter()
                .map(|col| obj.get(col).and_then(json_to_cell))
                .collect()
        })
        .collect();

    Ok(RawTable { column_names, rows })
}

fn json_to_cell(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Cleaning and parsing
// ---------------------------------------------------------------------------

fn timestamp_columns(table: &RawTable, path: &Path) -> Result<(usize, usize)> {
    let find = |column: &str| {
        table
            .column_index(column)
            .ok_or_else(|| BikeshareError::MissingColumn {
                path: path.to_path_buf(),
                column: column.to_string(),
            })
    };
    Ok((find(START_TIME)?, find(END_TIME)?))
}

fn cell_present(row: &[Option<String>], idx: usize) -> bool {
    row.get(idx)
        .and_then(|c| c.as_deref())
        .is_some_and(|c| !is_missing(c))
}

/// Remove rows with no start or end time. Returns how many were dropped.
pub fn drop_missing_timestamps(table: &mut RawTable, path: &Path) -> Result<usize> {
    let (start_idx, end_idx) = timestamp_columns(table, path)?;
    let before = table.rows.len();
    table
        .rows
        .retain(|row| cell_present(row, start_idx) && cell_present(row, end_idx));
    Ok(before - table.rows.len())
}

/// Parse a timestamp in any of the accepted layouts.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
}

/// Turn cleaned rows into trips. Every row must carry parseable timestamps.
pub fn parse_trips(table: RawTable, path: &Path) -> Result<TripDataset> {
    let (start_idx, end_idx) = timestamp_columns(&table, path)?;

    let mut records = Vec::with_capacity(table.rows.len());
    for (row_no, row) in table.rows.iter().enumerate() {
        let timestamp = |idx: usize, column: &str| {
            let text = row.get(idx).and_then(|c| c.as_deref()).unwrap_or("");
            parse_timestamp(text).ok_or_else(|| BikeshareError::Parse {
                row: row_no,
                column: column.to_string(),
                value: text.to_string(),
            })
        };
        let start_time = timestamp(start_idx, START_TIME)?;
        let end_time = timestamp(end_idx, END_TIME)?;

        let fields = row
            .iter()
            .map(|cell| FieldValue::infer(cell.as_deref()))
            .collect();
        records.push(TripRecord {
            start_time,
            end_time,
            fields,
        });
    }

    Ok(TripDataset::new(table.column_names, records))
}
