// ==========================================
// Cutlist Intake - Validation Domain Model
// ==========================================
// Scope: diagnostics produced by the part / cutlist validators
// Rule: errors block acceptance, warnings never do
// ==========================================

use crate::domain::types::Severity;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// ValidationCode - machine-readable code
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationCode {
    // ===== required fields =====
    MissingPartId,
    InvalidSize,
    InvalidThickness,
    InvalidQuantity,
    MissingMaterial,

    // ===== ranges =====
    DimensionTooSmall,
    DimensionTooLarge,
    AreaTooSmall,
    AreaTooLarge,
    QuantityTooLarge,
    LengthLessThanWidth,
    OversizedPart,
    RotationRequired,
    NonStandardThickness,
    GrainDirectionUnset,
    LabelTooLong,

    // ===== cross-part =====
    DuplicatePartId,

    // ===== cutlist =====
    NoParts,
    TooManyParts,
    TooManyPieces,
    MissingJobId,
    MissingJobName,
    UndefinedMaterial,
    UndefinedEdgeband,
    CapabilityMismatch,
    MaterialThicknessConflict,
}

impl fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Wire name, e.g. OVERSIZED_PART
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        write!(f, "{}", json.trim_matches('"'))
    }
}

// ==========================================
// ValidationIssue
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String, // field path, e.g. "size.L"
    pub message: String,
    pub code: ValidationCode,
    pub severity: Severity,
}

impl ValidationIssue {
    pub fn error(field: &str, code: ValidationCode, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
            code,
            severity: Severity::Error,
        }
    }

    pub fn warning(field: &str, code: ValidationCode, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
            code,
            severity: Severity::Warning,
        }
    }
}

// ==========================================
// PartValidationResult
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartValidationResult {
    pub index: usize,
    pub part_id: String,
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl PartValidationResult {
    pub fn new(index: usize, part_id: impl Into<String>) -> Self {
        Self {
            index,
            part_id: part_id.into(),
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Route an issue to errors or warnings by severity.
    pub fn push(&mut self, issue: ValidationIssue) {
        match issue.severity {
            Severity::Error => {
                self.valid = false;
                self.errors.push(issue);
            }
            Severity::Warning => self.warnings.push(issue),
        }
    }

    pub fn has_code(&self, code: ValidationCode) -> bool {
        self.errors.iter().chain(&self.warnings).any(|i| i.code == code)
    }
}

// ==========================================
// CutlistSummary / CutlistValidationResult
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CutlistSummary {
    pub total_parts: usize,
    pub valid_parts: usize,
    pub invalid_parts: usize,
    pub total_pieces: u64,
    pub materials_used: Vec<String>,
    pub has_edging: bool,
    pub has_cnc: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutlistValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub part_results: Vec<PartValidationResult>,
    pub summary: CutlistSummary,
}

// ==========================================
// QuickValidation - fast-path import check
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuickValidation {
    pub valid: bool,
    pub usable_parts: usize,
    pub duplicate_ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_display_uses_wire_name() {
        assert_eq!(ValidationCode::OversizedPart.to_string(), "OVERSIZED_PART");
        assert_eq!(ValidationCode::DuplicatePartId.to_string(), "DUPLICATE_PART_ID");
    }

    #[test]
    fn test_push_routes_by_severity() {
        let mut result = PartValidationResult::new(0, "p1");
        result.push(ValidationIssue::warning(
            "label",
            ValidationCode::LabelTooLong,
            "long",
        ));
        assert!(result.valid);
        result.push(ValidationIssue::error("qty", ValidationCode::InvalidQuantity, "zero"));
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.has_code(ValidationCode::LabelTooLong));
    }
}
