use std::path::PathBuf;

use thiserror::Error;

/// Boxed underlying cause of a data source failure (io, csv or json).
pub type SourceCause = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum BikeshareError {
    /// Operator input that the prompt rejects and asks for again.
    #[error("{0}")]
    Validation(String),

    #[error("no data source registered for city '{0}'")]
    UnknownCity(String),

    #[error("cannot read data source {}", path.display())]
    DataSource {
        path: PathBuf,
        #[source]
        source: SourceCause,
    },

    #[error("{} has no '{column}' column", path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error("row {row}: '{value}' in '{column}' is not a valid timestamp")]
    Parse {
        row: usize,
        column: String,
        value: String,
    },

    #[error("invalid city registry {}: {reason}", path.display())]
    Registry { path: PathBuf, reason: String },

    #[error("input closed")]
    InputClosed,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BikeshareError {
    pub(crate) fn data_source(path: impl Into<PathBuf>, source: impl Into<SourceCause>) -> Self {
        BikeshareError::DataSource {
            path: path.into(),
            source: source.into(),
        }
    }
}

pub type Result<T, E = BikeshareError> = std::result::Result<T, E>;
