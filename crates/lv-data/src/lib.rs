//! Data sources for the linked views
//!
//! Every source produces two Arrow record batches, one per table, which are
//! then extracted into the core model by [`schema`].

pub mod schema;
pub mod sources;

use arrow::error::ArrowError;
use lv_core::{LinkError, LinkedData, LinkedViewOptions};
use thiserror::Error;
use tokio::task::JoinError;

// Re-exports
pub use schema::{ColumnNames, TableKind};
pub use sources::{CsvPairSource, LinkedDataSource, WidgetPayloadSource};

/// Errors that can occur in data operations
#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Arrow error: {0}")]
    Arrow(ArrowError),

    #[error("CSV parsing error: {0}")]
    Csv(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{table} table has no column '{column}' (available: {available:?})")]
    MissingColumn {
        table: TableKind,
        column: String,
        available: Vec<String>,
    },

    #[error("{table} table, column '{column}', row {row}: {reason}")]
    Malformed {
        table: TableKind,
        column: String,
        row: usize,
        reason: String,
    },

    #[error(transparent)]
    Link(#[from] LinkError),

    #[error("Join error: {0}")]
    Join(#[from] JoinError),
}

impl From<csv::Error> for DataError {
    fn from(error: csv::Error) -> Self {
        match error.kind() {
            csv::ErrorKind::Io(io_err) => DataError::Io(std::io::Error::new(io_err.kind(), error.to_string())),
            _ => DataError::Csv(error.to_string()),
        }
    }
}

impl From<ArrowError> for DataError {
    fn from(error: ArrowError) -> Self {
        DataError::Arrow(error)
    }
}

impl DataError {
    /// Whether the input itself is at fault, as opposed to I/O
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            DataError::MissingColumn { .. }
                | DataError::Malformed { .. }
                | DataError::Link(LinkError::MalformedInput { .. })
                | DataError::Csv(_)
                | DataError::Json(_)
        )
    }
}

/// Tables loaded by a source, plus any options it carried
#[derive(Debug, Clone, Default)]
pub struct LoadedData {
    pub data: LinkedData,
    pub options: Option<LinkedViewOptions>,
}
