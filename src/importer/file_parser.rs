// ==========================================
// Cutlist Intake - File Parsers
// ==========================================
// Supports: CSV / TSV / TXT (csv crate), XLSX / XLSM / XLS / ODS (calamine)
// Output: Workbook of string grids, no field interpretation here
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::{FileParser, Grid, Sheet, Workbook};
use calamine::{open_workbook_auto, Reader};
use csv::ReaderBuilder;
use std::fs;
use std::path::Path;
use tracing::{debug, instrument};

const CSV_EXTENSIONS: &[&str] = &["csv", "tsv", "txt"];
const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "ods"];

/// Delimiters tried by `detect_delimiter`, in tie-break order.
const DELIMITER_CANDIDATES: [u8; 3] = [b',', b';', b'\t'];

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn ensure_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

// ==========================================
// CSV text → grid
// ==========================================

/// Pick the delimiter that occurs most often (outside quotes) in the first non-empty line.
/// Ties keep the earlier candidate; no candidate at all → comma.
pub fn detect_delimiter(text: &str) -> u8 {
    let Some(line) = text.lines().find(|l| !l.trim().is_empty()) else {
        return b',';
    };

    let mut counts = [0usize; DELIMITER_CANDIDATES.len()];
    let mut in_quotes = false;
    for byte in line.bytes() {
        if byte == b'"' {
            in_quotes = !in_quotes;
            continue;
        }
        if in_quotes {
            continue;
        }
        if let Some(pos) = DELIMITER_CANDIDATES.iter().position(|d| *d == byte) {
            counts[pos] += 1;
        }
    }

    let mut best = 0;
    for (idx, count) in counts.iter().enumerate() {
        if *count > counts[best] {
            best = idx;
        }
    }
    DELIMITER_CANDIDATES[best]
}

/// Split CSV text into a grid (quote-aware, ragged rows allowed).
///
/// `delimiter = None` auto-detects comma / semicolon / tab.
pub fn csv_to_grid(text: &str, delimiter: Option<u8>) -> ImportResult<Grid> {
    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(text));
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record?;
        grid.push(record.iter().map(|v| v.trim().to_string()).collect());
    }
    Ok(grid)
}

// ==========================================
// CsvParser
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    #[instrument(skip(self), fields(path = %file_path.display()))]
    fn parse_workbook(&self, file_path: &Path) -> ImportResult<Workbook> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if !CSV_EXTENSIONS.contains(&ext.as_str()) {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let text = fs::read_to_string(file_path)?;
        let delimiter = if ext == "tsv" { Some(b'\t') } else { None };
        let rows = csv_to_grid(&text, delimiter)?;

        let name = file_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Sheet1")
            .to_string();
        debug!(rows = rows.len(), "csv file read");

        Ok(Workbook {
            sheets: vec![Sheet::new(name, rows)],
        })
    }
}

// ==========================================
// ExcelParser
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    #[instrument(skip(self), fields(path = %file_path.display()))]
    fn parse_workbook(&self, file_path: &Path) -> ImportResult<Workbook> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if !WORKBOOK_EXTENSIONS.contains(&ext.as_str()) {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(file_path)?;
        let sheet_names = workbook.sheet_names();
        if sheet_names.is_empty() {
            return Err(ImportError::EmptyWorkbook);
        }

        let mut sheets = Vec::with_capacity(sheet_names.len());
        for name in sheet_names {
            let range = workbook.worksheet_range(&name)?;
            let rows: Grid = range
                .rows()
                .map(|row| row.iter().map(|cell| cell.to_string().trim().to_string()).collect())
                .collect();
            debug!(sheet = %name, rows = rows.len(), "worksheet read");
            sheets.push(Sheet::new(name, rows));
        }

        Ok(Workbook { sheets })
    }
}

// ==========================================
// UniversalFileParser (dispatch by extension)
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<Workbook> {
        let path = file_path.as_ref();
        let ext = extension_of(path);

        if CSV_EXTENSIONS.contains(&ext.as_str()) {
            CsvParser.parse_workbook(path)
        } else if WORKBOOK_EXTENSIONS.contains(&ext.as_str()) {
            ExcelParser.parse_workbook(path)
        } else {
            Err(ImportError::UnsupportedFormat(ext))
        }
    }

    pub fn is_supported(path: &Path) -> bool {
        let ext = extension_of(path);
        CSV_EXTENSIONS.contains(&ext.as_str()) || WORKBOOK_EXTENSIONS.contains(&ext.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), b',');
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), b';');
        assert_eq!(detect_delimiter("a\tb\tc"), b'\t');
        // commas inside quotes don't count
        assert_eq!(detect_delimiter("\"a,b,c\";d;e"), b';');
        assert_eq!(detect_delimiter("single"), b',');
        assert_eq!(detect_delimiter(""), b',');
    }

    #[test]
    fn test_csv_to_grid_quotes_and_ragged_rows() {
        let grid = csv_to_grid("Name,L,W\n\"Door, left\",720,400\nShelf,500\n", None).unwrap();
        assert_eq!(grid.len(), 3);
        assert_eq!(grid[1][0], "Door, left");
        assert_eq!(grid[2].len(), 2);
    }

    #[test]
    fn test_csv_to_grid_semicolon_decimal_comma() {
        let grid = csv_to_grid("Length;Width\n720,5;560\n", None).unwrap();
        assert_eq!(grid[1], vec!["720,5".to_string(), "560".to_string()]);
    }

    #[test]
    fn test_csv_parser_valid_file() {
        let mut temp_file = NamedTempFile::with_suffix(".csv").unwrap();
        writeln!(temp_file, "Part,Length,Width,Qty").unwrap();
        writeln!(temp_file, "Side,720,560,2").unwrap();
        writeln!(temp_file, "Top,800, 560 ,1").unwrap();

        let workbook = CsvParser.parse_workbook(temp_file.path()).unwrap();
        assert_eq!(workbook.sheets.len(), 1);
        let rows = &workbook.sheets[0].rows;
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2][2], "560");
    }

    #[test]
    fn test_csv_parser_file_not_found() {
        let result = CsvParser.parse_workbook(Path::new("non_existent.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_universal_parser_rejects_unknown_extension() {
        let temp_file = NamedTempFile::with_suffix(".pdf").unwrap();
        let result = UniversalFileParser.parse(temp_file.path());
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(ext)) if ext == "pdf"));
    }

    #[test]
    fn test_tsv_uses_tab() {
        let mut temp_file = NamedTempFile::with_suffix(".tsv").unwrap();
        writeln!(temp_file, "L\tW\tNote").unwrap();
        writeln!(temp_file, "720\t560\ta,b").unwrap();

        let workbook = UniversalFileParser.parse(temp_file.path()).unwrap();
        assert_eq!(workbook.sheets[0].rows[1][2], "a,b");
    }

    #[test]
    fn test_is_supported() {
        assert!(UniversalFileParser::is_supported(Path::new("parts.XLSX")));
        assert!(UniversalFileParser::is_supported(Path::new("parts.ods")));
        assert!(!UniversalFileParser::is_supported(Path::new("parts.doc")));
    }
}
