use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("schema error at line {line}: field \"{field}\" {reason}")]
    Schema {
        field: String,
        line: u64,
        reason: String,
    },
    #[error("invalid window: start {start} is after end {end}")]
    InvalidWindow { start: NaiveDate, end: NaiveDate },
    #[error("window {start}..={end} is outside the dataset range {min}..={max}")]
    WindowOutOfRange {
        start: NaiveDate,
        end: NaiveDate,
        min: NaiveDate,
        max: NaiveDate,
    },
    #[error("dataset has no records")]
    EmptyDataset,
    #[error("I/O error {0}: {1}")]
    Io(PathBuf, std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl EngineError {
    pub(crate) fn schema(field: &str, line: u64, reason: impl Into<String>) -> Self {
        EngineError::Schema {
            field: field.to_string(),
            line,
            reason: reason.into(),
        }
    }
}
