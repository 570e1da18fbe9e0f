// ==========================================
// Cutlist Intake - Importer Layer
// ==========================================
// Scope: raw input → draft CutParts
// Supports: free text lines, string grids, CSV/TSV/TXT, XLSX/XLSM/XLS/ODS
// ==========================================

pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod importer_trait;
pub mod sheet_selector;
pub mod tabular_parser;
pub mod text_normalizer;
pub mod text_parser;

pub use error::{ImportError, ImportResult};
pub use field_mapper::{auto_detect_mapping, ColumnMapping, ColumnRef, PartField, ResolvedMapping};
pub use file_parser::{csv_to_grid, detect_delimiter, CsvParser, ExcelParser, UniversalFileParser};
pub use importer_trait::{FileParser, Grid, Sheet, Workbook};
pub use sheet_selector::{score_sheet, select_sheet};
pub use tabular_parser::{parse_grid, RowParseResult, TabularParseResult};
pub use text_normalizer::{
    extract_keywords, fuzzy_score, is_truthy, normalize_text, parse_number, shares_color_keyword,
};
pub use text_parser::{
    parse_edge_codes, parse_line, parse_text_batch, quick_parse, ParseStats, TextBatchResult,
    TextParseResult,
};
