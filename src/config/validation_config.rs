// ==========================================
// Cutlist Intake - Validator Configuration
// ==========================================
// Scope: thresholds for part and cutlist validation
// Org overrides: sheet size / allowed thicknesses (see OrgSettingsReader)
// ==========================================

use serde::{Deserialize, Serialize};

/// Standard sheet used for the oversize check (mm).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SheetSize {
    #[serde(rename = "L")]
    pub l: f64,
    #[serde(rename = "W")]
    pub w: f64,
}

impl Default for SheetSize {
    fn default() -> Self {
        Self { l: 2800.0, w: 2070.0 }
    }
}

// ==========================================
// PartValidationConfig
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartValidationConfig {
    /// Smallest allowed L or W (default 10 mm)
    pub min_dimension_mm: f64,
    /// Largest allowed L or W (default 5000 mm)
    pub max_dimension_mm: f64,
    /// Below this area → warning (default 1000 mm²)
    pub min_area_mm2: f64,
    /// Above this area → error (default 15 m²)
    pub max_area_mm2: f64,
    /// Thicknesses stocked by the shop; others → warning. Empty disables the check.
    pub allowed_thicknesses_mm: Vec<f64>,
    /// Material ids with a visible grain direction
    pub grained_material_ids: Vec<String>,
    /// Largest quantity per part (default 1000)
    pub max_quantity: u32,
    pub standard_sheet: SheetSize,
    /// Skip the sheet-size check entirely
    pub allow_oversize: bool,
    /// Labels longer than this → warning (default 100)
    pub max_label_len: usize,
}

impl Default for PartValidationConfig {
    fn default() -> Self {
        Self {
            min_dimension_mm: 10.0,
            max_dimension_mm: 5000.0,
            min_area_mm2: 1_000.0,
            max_area_mm2: 15_000_000.0,
            allowed_thicknesses_mm: vec![
                3.0, 6.0, 9.0, 12.0, 15.0, 16.0, 18.0, 19.0, 22.0, 25.0, 30.0, 32.0, 36.0, 38.0,
            ],
            grained_material_ids: Vec::new(),
            max_quantity: 1000,
            standard_sheet: SheetSize::default(),
            allow_oversize: false,
            max_label_len: 100,
        }
    }
}

// ==========================================
// CutlistValidationConfig
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CutlistValidationConfig {
    pub part: PartValidationConfig,
    /// Max distinct parts per cutlist (default 1000)
    pub max_unique_parts: usize,
    /// Max pieces (sum of qty) per cutlist (default 10000)
    pub max_total_pieces: u64,
    /// Require every referenced material/edgeband id to be declared in the document
    pub require_defined_references: bool,
}

impl Default for CutlistValidationConfig {
    fn default() -> Self {
        Self {
            part: PartValidationConfig::default(),
            max_unique_parts: 1000,
            max_total_pieces: 10_000,
            require_defined_references: false,
        }
    }
}
