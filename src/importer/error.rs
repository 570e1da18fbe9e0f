// ==========================================
// Cutlist Intake - Importer Error Types
// ==========================================
// Scope: failures that stop a whole file/grid from being read.
// Per-row and per-line problems are not errors: they are recorded
// on the parse result and the batch continues.
// ==========================================

use thiserror::Error;

/// Importer error type
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== files =====
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("unsupported file format: {0} (expected .csv/.tsv/.txt/.xlsx/.xlsm/.xls/.ods)")]
    UnsupportedFormat(String),

    #[error("failed to read file: {0}")]
    FileReadError(String),

    #[error("workbook parse failed: {0}")]
    WorkbookParseError(String),

    #[error("CSV parse failed: {0}")]
    CsvParseError(String),

    #[error("workbook contains no sheets")]
    EmptyWorkbook,

    // ===== grid / mapping =====
    #[error("header row {header_row} is outside the grid ({rows} rows)")]
    HeaderRowOutOfRange { header_row: usize, rows: usize },

    #[error("column mapping failed: {0}")]
    ColumnMappingError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::WorkbookParseError(err.to_string())
    }
}

/// Result alias
pub type ImportResult<T> = Result<T, ImportError>;
