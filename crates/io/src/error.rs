use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No loader is registered for this file extension.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// The workbook could not be opened or a sheet could not be read.
    #[error("the file is not a valid spreadsheet or is corrupted: {0}")]
    Workbook(String),

    #[error("sheet '{0}' not found")]
    SheetNotFound(String),

    #[error("{0} contains no header row")]
    NoHeader(String),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is absent from one of the sources.
    #[error("{source_name} data is missing required column '{column}'")]
    MissingColumn { source_name: &'static str, column: String },

    #[error("invalid JSON for reference data: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Parsed JSON that is not an array of objects.
    #[error("invalid reference data: {0}")]
    InvalidReference(String),

    #[error("cannot encode result as JSON: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("cannot write report: {0}")]
    Report(#[from] rust_xlsxwriter::XlsxError),
}

impl IoError {
    /// True when the input itself is malformed, as opposed to a filesystem failure.
    pub fn is_input_error(&self) -> bool {
        !matches!(self, Self::Read { .. } | Self::Write { .. } | Self::Encode(_) | Self::Report(_))
    }
}
