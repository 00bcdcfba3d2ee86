// Loader selection by file extension and the spreadsheet-side entry point.

use std::fmt;
use std::path::Path;

use tally_recon::{ReconConfig, Row};

use crate::error::IoError;
use crate::table::Table;

/// Loader chosen for an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetFormat {
    /// Anything calamine opens: xlsx, xlsm, xls, xlsb, ods.
    Workbook,
    Csv,
    Tsv,
}

impl SpreadsheetFormat {
    pub fn from_path(path: &Path) -> Result<Self, IoError> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(Self::Workbook),
            "csv" => Ok(Self::Csv),
            "tsv" | "tab" => Ok(Self::Tsv),
            "" => Err(IoError::UnsupportedFormat("(no extension)".into())),
            other => Err(IoError::UnsupportedFormat(format!(".{other}"))),
        }
    }
}

impl fmt::Display for SpreadsheetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Workbook => write!(f, "workbook"),
            Self::Csv => write!(f, "csv"),
            Self::Tsv => write!(f, "tsv"),
        }
    }
}

/// Read the uploaded file into rows keyed by the canonical field names.
pub fn load_spreadsheet(path: &Path, config: &ReconConfig) -> Result<Vec<Row>, IoError> {
    let format = SpreadsheetFormat::from_path(path)?;
    tracing::debug!(path = %path.display(), %format, "loading spreadsheet");

    let table: Table = match format {
        SpreadsheetFormat::Workbook => crate::xlsx::import(path, config.spreadsheet.sheet.as_deref())?,
        SpreadsheetFormat::Csv => crate::csv::import(path)?,
        SpreadsheetFormat::Tsv => crate::csv::import_tsv(path)?,
    };

    let rows = table.into_rows(&config.columns, config.spreadsheet.keep_extra_columns)?;
    tracing::info!(rows = rows.len(), %format, "spreadsheet loaded");
    Ok(rows)
}
