// ==========================================
// Cutlist Intake - Parser Options
// ==========================================
// Scope: explicit option structs for the text and tabular parsers
// Defaults: documented on each field, applied through `Default`
// ==========================================

use crate::domain::types::{DimOrder, SourceMethod, UnitSystem};
use crate::importer::field_mapper::ColumnMapping;
use serde::{Deserialize, Serialize};

/// Default panel thickness when none is given (mm).
pub const DEFAULT_THICKNESS_MM: f64 = 18.0;

/// Default auto-accept threshold.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.6;

// ==========================================
// TextParseOptions
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextParseOptions {
    /// Thickness when the line carries none (default 18 mm)
    pub default_thickness_mm: f64,
    /// Material id when the line carries none (default: "default" sentinel)
    pub default_material_id: Option<String>,
    /// How to read "A x B" (default: infer, larger value is L)
    pub dim_order: DimOrder,
    /// Unit of bare numbers (default mm)
    pub units: UnitSystem,
    /// Provenance written into the audit record (default paste_parser)
    pub source_method: SourceMethod,
    /// Threshold applied by `quick_parse` (default 0.6, follows the org setting)
    pub min_confidence: f64,
}

impl Default for TextParseOptions {
    fn default() -> Self {
        Self {
            default_thickness_mm: DEFAULT_THICKNESS_MM,
            default_material_id: None,
            dim_order: DimOrder::Infer,
            units: UnitSystem::Mm,
            source_method: SourceMethod::PasteParser,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
        }
    }
}

// ==========================================
// TabularParseOptions
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabularParseOptions {
    /// Row holding the column headers (default 0)
    pub header_row_index: usize,
    /// First data row (default: header_row_index + 1)
    pub data_row_start: Option<usize>,
    /// Exclusive end of the data rows (default: end of grid)
    pub data_row_end: Option<usize>,
    /// Explicit mapping; auto-detected from the header row when None
    pub mapping: Option<ColumnMapping>,
    pub default_thickness_mm: f64,
    pub default_material_id: Option<String>,
    /// Unit of numeric cells (default mm)
    pub units: UnitSystem,
    pub source_method: SourceMethod,
}

impl Default for TabularParseOptions {
    fn default() -> Self {
        Self {
            header_row_index: 0,
            data_row_start: None,
            data_row_end: None,
            mapping: None,
            default_thickness_mm: DEFAULT_THICKNESS_MM,
            default_material_id: None,
            units: UnitSystem::Mm,
            source_method: SourceMethod::ExcelTable,
        }
    }
}

impl TabularParseOptions {
    pub fn first_data_row(&self) -> usize {
        self.data_row_start.unwrap_or(self.header_row_index + 1)
    }
}
