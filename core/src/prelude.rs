use crate::records::LocationRecord;
use crate::render::Palette;

/// Errors surfaced to the user by the load / filter / render pipeline.
#[derive(thiserror::Error, Debug)]
pub enum MigrationError {
    #[error("missing required column: {0}")]
    MissingColumn(String),
    #[error("unreadable CSV input: {0}")]
    Csv(#[from] csv::Error),
    #[error("no data to display for the current selection")]
    EmptySelection,
    #[error("No valid rows: {0} unparseable rows skipped.")]
    NoValidRows(usize),
    #[error("invalid interval: {0}")]
    InvalidInterval(String),
    #[error("unknown view mode: {0}")]
    UnknownViewMode(String),
    #[error("unknown frame mode: {0}")]
    UnknownFrameMode(String),
}

pub type MigrationResult<T> = Result<T, MigrationError>;

/// Reason a single CSV row was excluded from the dataset.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RowError {
    #[error("malformed row: {0}")]
    Malformed(String),
    #[error("missing value for column {0}")]
    MissingField(String),
    #[error("non-numeric {column}: {value:?}")]
    InvalidCoordinate { column: String, value: String },
    #[error("{column} {value} outside [{min}, {max}]")]
    CoordinateOutOfRange {
        column: String,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("unparseable timestamp: {0:?}")]
    InvalidTimestamp(String),
}

/// Shared seam for the static and animated renderers.
pub trait MapRenderer {
    type Output;

    fn render(&self, records: &[LocationRecord], palette: &Palette) -> Self::Output;
}
