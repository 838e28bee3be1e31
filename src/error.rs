use thiserror::Error;

/// Required columns missing from the loaded table's header row.
///
/// This is fatal for the whole run: no derivation, aggregation, or export
/// happens for a table that fails schema validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("missing required columns: {}", .missing.join(", "))]
pub struct SchemaError {
    pub missing: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
