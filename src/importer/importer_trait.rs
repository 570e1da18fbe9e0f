// ==========================================
// Cutlist Intake - Importer Traits
// ==========================================
// Scope: interfaces of the file-reading stage (no implementations)
// Implementors: CsvParser, ExcelParser (file_parser.rs)
// ==========================================

use crate::importer::error::ImportResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Row-major grid of trimmed cell strings.
pub type Grid = Vec<Vec<String>>;

/// One named sheet of a workbook (CSV files produce a single sheet).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub rows: Grid,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Grid) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Widest row (rows may be ragged).
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

// ==========================================
// FileParser Trait
// ==========================================
// Implementors: CsvParser, ExcelParser
pub trait FileParser: Send + Sync {
    /// Read a file into sheets of cell strings.
    ///
    /// # Errors
    /// - `FileNotFound` / `UnsupportedFormat` before any read
    /// - `CsvParseError` / `WorkbookParseError` / `FileReadError` while reading
    fn parse_workbook(&self, file_path: &Path) -> ImportResult<Workbook>;
}
