use std::fmt;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Load-time errors
// ---------------------------------------------------------------------------

/// The file has no usable header, or lacks an identifying column.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("no header row found")]
    NoHeader,
    #[error("required column '{0}' is missing")]
    MissingRequiredColumn(String),
}

/// Anything that aborts a load. The previously loaded dataset stays active.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("malformed input: {0}")]
    Malformed(String),
}

/// A cell that could not be coerced to the column's type.
///
/// These never abort a load: the cell becomes [`Value::Missing`] (or the row
/// is dropped when the cell is `Year` or `Player_Name`) and the error is kept
/// on the dataset for reporting.
///
/// [`Value::Missing`]: super::model::Value::Missing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellTypeError {
    /// Zero-based data row (header excluded).
    pub row: usize,
    pub column: String,
    pub text: String,
    /// The whole row was discarded because of this cell.
    pub row_dropped: bool,
}

impl fmt::Display for CellTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "row {}, column '{}': cannot read '{}'",
            self.row, self.column, self.text
        )?;
        if self.row_dropped {
            write!(f, " (row dropped)")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Recomputation errors
// ---------------------------------------------------------------------------

/// Errors that reject a single filter/aggregate/chart request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    #[error("column '{0}' is not present in the dataset")]
    Column(String),

    #[error("select at least one metric")]
    NoMetrics,

    #[error("{0} charts need a secondary metric")]
    MissingSecondaryMetric(String),

    #[error("{0} charts cannot be drawn from a summary table")]
    UnsupportedChart(String),
}
