use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;

use crate::data::model::{TripDataset, END_TIME, START_TIME};

const TIMESTAMP_DISPLAY: &str = "%Y-%m-%d %H:%M:%S";

/// One-line size summary, e.g. `1200 rows × 7 columns (8400 cells)`.
pub fn size_line(dataset: &TripDataset) -> String {
    format!(
        "{} rows × {} columns ({} cells)",
        dataset.len(),
        dataset.num_columns(),
        dataset.size()
    )
}

/// Render the first `rows` trips as a bordered text table.
///
/// The timestamp columns show the parsed values; every other column is shown
/// as loaded.
pub fn render_preview(dataset: &TripDataset, rows: usize) -> Result<String> {
    if dataset.column_names.is_empty() {
        return Ok(String::new());
    }

    let head = &dataset.records[..rows.min(dataset.len())];

    let fields: Vec<Field> = dataset
        .column_names
        .iter()
        .map(|name| Field::new(name, DataType::Utf8, true))
        .collect();

    let columns: Vec<ArrayRef> = dataset
        .column_names
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let cells: Vec<Option<String>> = head
                .iter()
                .map(|record| match name.as_str() {
                    START_TIME => Some(record.start_time.format(TIMESTAMP_DISPLAY).to_string()),
                    END_TIME => Some(record.end_time.format(TIMESTAMP_DISPLAY).to_string()),
                    _ => record.fields.get(idx).map(|v| v.to_string()),
                })
                .collect();
            Arc::new(StringArray::from(cells)) as ArrayRef
        })
        .collect();

    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)
        .context("building preview table")?;
    let table = pretty_format_batches(&[batch]).context("formatting preview table")?;
    Ok(table.to_string())
}
