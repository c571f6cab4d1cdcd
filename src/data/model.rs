use std::fmt;

use chrono::NaiveDateTime;

/// Column holding the trip start timestamp.
pub const START_TIME: &str = "Start Time";
/// Column holding the trip end timestamp.
pub const END_TIME: &str = "End Time";

// ---------------------------------------------------------------------------
// FieldValue – a single cell of a trip row
// ---------------------------------------------------------------------------

/// A loosely-typed cell, inferred from the source text the way a dataframe
/// reader would (integers, floats, otherwise text).
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Null,
}

impl FieldValue {
    /// Infer the type of a text cell. Missing cells become `Null`.
    pub fn infer(cell: Option<&str>) -> Self {
        let Some(s) = cell else {
            return FieldValue::Null;
        };
        if is_missing(s) {
            return FieldValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return FieldValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return FieldValue::Float(f);
        }
        FieldValue::Text(s.to_string())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{s}"),
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Null => write!(f, "NaN"),
        }
    }
}

/// Markers a dataframe reader treats as "not available" by default.
const NA_MARKERS: [&str; 7] = ["NaN", "nan", "NA", "N/A", "null", "NULL", "None"];

/// Whether a raw cell counts as missing: blank or one of the NA markers.
pub fn is_missing(cell: &str) -> bool {
    let trimmed = cell.trim();
    trimmed.is_empty() || NA_MARKERS.contains(&trimmed)
}

// ---------------------------------------------------------------------------
// RawTable – untyped rows straight from the source file
// ---------------------------------------------------------------------------

/// Column names plus rows of optional text cells. `None` is a cell the source
/// marked as null (JSON `null`, or a CSV row shorter than the header).
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub column_names: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_names.iter().position(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

// ---------------------------------------------------------------------------
// TripRecord – one ride
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct TripRecord {
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    /// Every column of the source row, in source column order.
    pub fields: Vec<FieldValue>,
}

// ---------------------------------------------------------------------------
// TripDataset – the loaded trips of one city
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripDataset {
    pub column_names: Vec<String>,
    pub records: Vec<TripRecord>,
}

impl TripDataset {
    pub fn new(column_names: Vec<String>, records: Vec<TripRecord>) -> Self {
        TripDataset {
            column_names,
            records,
        }
    }

    /// Number of trips.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn num_columns(&self) -> usize {
        self.column_names.len()
    }

    /// Number of cells: rows × columns.
    pub fn size(&self) -> usize {
        self.len() * self.num_columns()
    }
}
