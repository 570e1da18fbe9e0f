// ==========================================
// Cutlist Intake - Domain Type Definitions
// ==========================================
// Scope: small enums shared by parsers, matcher and validators
// Serialization: wire names match the cutlist document format
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Grain direction
// ==========================================
// Descriptive only: `allow_rotation` on the part is authoritative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Grain {
    #[default]
    #[serde(rename = "none")]
    None,
    #[serde(rename = "along_L")]
    AlongL,
    #[serde(rename = "along_W")]
    AlongW,
}

impl Grain {
    pub fn is_constrained(&self) -> bool {
        !matches!(self, Grain::None)
    }
}

impl fmt::Display for Grain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grain::None => write!(f, "none"),
            Grain::AlongL => write!(f, "along_L"),
            Grain::AlongW => write!(f, "along_W"),
        }
    }
}

// ==========================================
// Edge identifier
// ==========================================
// L1/L2 are the long edges, W1/W2 the short edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EdgeId {
    L1,
    L2,
    W1,
    W2,
}

impl EdgeId {
    pub const ALL: [EdgeId; 4] = [EdgeId::L1, EdgeId::L2, EdgeId::W1, EdgeId::W2];

    /// Parse an edge code such as "l1" or "W2" (case-insensitive).
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "L1" => Some(EdgeId::L1),
            "L2" => Some(EdgeId::L2),
            "W1" => Some(EdgeId::W1),
            "W2" => Some(EdgeId::W2),
            _ => None,
        }
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeId::L1 => write!(f, "L1"),
            EdgeId::L2 => write!(f, "L2"),
            EdgeId::W1 => write!(f, "W1"),
            EdgeId::W2 => write!(f, "W2"),
        }
    }
}

// ==========================================
// Unit system for numeric input
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Mm,
    Cm,
    Inch,
}

impl UnitSystem {
    /// Factor converting a value in this unit to millimeters.
    pub fn to_mm_factor(&self) -> f64 {
        match self {
            UnitSystem::Mm => 1.0,
            UnitSystem::Cm => 10.0,
            UnitSystem::Inch => 25.4,
        }
    }

    /// Parse a unit suffix as written in free text ("mm", "cm", "in", "\"").
    pub fn from_suffix(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "mm" => Some(UnitSystem::Mm),
            "cm" => Some(UnitSystem::Cm),
            "in" | "inch" | "inches" | "\"" => Some(UnitSystem::Inch),
            _ => None,
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitSystem::Mm => write!(f, "mm"),
            UnitSystem::Cm => write!(f, "cm"),
            UnitSystem::Inch => write!(f, "inch"),
        }
    }
}

// ==========================================
// Dimension order policy
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DimOrder {
    /// First value is L
    #[serde(rename = "LxW")]
    LxW,
    /// First value is W
    #[serde(rename = "WxL")]
    WxL,
    /// Larger value becomes L
    #[default]
    #[serde(rename = "infer")]
    Infer,
}

// ==========================================
// Source method (provenance)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceMethod {
    #[default]
    Manual,
    PasteParser,
    ExcelTable,
    CsvImport,
    Voice,
    FileUpload,
    Api,
}

impl fmt::Display for SourceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SourceMethod::Manual => "manual",
            SourceMethod::PasteParser => "paste_parser",
            SourceMethod::ExcelTable => "excel_table",
            SourceMethod::CsvImport => "csv_import",
            SourceMethod::Voice => "voice",
            SourceMethod::FileUpload => "file_upload",
            SourceMethod::Api => "api",
        };
        write!(f, "{}", s)
    }
}

// ==========================================
// Validation severity
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,   // blocks acceptance
    Warning, // informational
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}
