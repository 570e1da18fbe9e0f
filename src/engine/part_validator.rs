// ==========================================
// Cutlist Intake - Part Validator
// ==========================================
// Scope: field-level and cross-part rules for CutPart
// Output: PartValidationResult per part (errors block acceptance, warnings never do)
// Rule: read-only, never mutates the part
// ==========================================

use crate::config::validation_config::PartValidationConfig;
use crate::domain::part::CutPart;
use crate::domain::validation::{PartValidationResult, ValidationCode, ValidationIssue};
use std::collections::HashMap;
use tracing::debug;

const THICKNESS_TOLERANCE_MM: f64 = 0.01;

#[derive(Debug, Clone, Default)]
pub struct PartValidator {
    config: PartValidationConfig,
}

impl PartValidator {
    pub fn new(config: PartValidationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PartValidationConfig {
        &self.config
    }

    /// Validate a single part. `index` is its position in the batch.
    pub fn validate_part(&self, part: &CutPart, index: usize) -> PartValidationResult {
        let mut result = PartValidationResult::new(index, part.part_id.clone());

        self.check_required(part, &mut result);
        if part.size.is_positive() {
            self.check_dimensions(part, &mut result);
            self.check_sheet_fit(part, &mut result);
        }
        self.check_thickness(part, &mut result);
        self.check_grain(part, &mut result);
        self.check_label(part, &mut result);

        if part.qty > self.config.max_quantity {
            result.push(ValidationIssue::error(
                "qty",
                ValidationCode::QuantityTooLarge,
                format!("quantity {} exceeds maximum {}", part.qty, self.config.max_quantity),
            ));
        }

        result
    }

    /// Validate a batch; every part sharing an id receives DUPLICATE_PART_ID.
    pub fn validate_parts(&self, parts: &[CutPart]) -> Vec<PartValidationResult> {
        let mut id_counts: HashMap<&str, usize> = HashMap::new();
        for part in parts {
            if !part.part_id.trim().is_empty() {
                *id_counts.entry(part.part_id.as_str()).or_insert(0) += 1;
            }
        }

        let results: Vec<PartValidationResult> = parts
            .iter()
            .enumerate()
            .map(|(index, part)| {
                let mut result = self.validate_part(part, index);
                let count = id_counts.get(part.part_id.as_str()).copied().unwrap_or(0);
                if count > 1 {
                    result.push(ValidationIssue::error(
                        "part_id",
                        ValidationCode::DuplicatePartId,
                        format!("part id '{}' used by {} parts", part.part_id, count),
                    ));
                }
                result
            })
            .collect();

        debug!(
            parts = parts.len(),
            invalid = results.iter().filter(|r| !r.valid).count(),
            "parts validated"
        );
        results
    }

    // ===== required fields =====
    fn check_required(&self, part: &CutPart, result: &mut PartValidationResult) {
        if part.part_id.trim().is_empty() {
            result.push(ValidationIssue::error(
                "part_id",
                ValidationCode::MissingPartId,
                "part id is required",
            ));
        }
        if !part.size.is_positive() {
            result.push(ValidationIssue::error(
                "size",
                ValidationCode::InvalidSize,
                format!("size {}x{} must be positive", part.size.l, part.size.w),
            ));
        }
        if !part.thickness_mm.is_finite() || part.thickness_mm <= 0.0 {
            result.push(ValidationIssue::error(
                "thickness_mm",
                ValidationCode::InvalidThickness,
                format!("thickness {} must be positive", part.thickness_mm),
            ));
        }
        if part.qty == 0 {
            result.push(ValidationIssue::error(
                "qty",
                ValidationCode::InvalidQuantity,
                "quantity must be at least 1",
            ));
        }
        if part.material_id.trim().is_empty() {
            result.push(ValidationIssue::error(
                "material_id",
                ValidationCode::MissingMaterial,
                "material is required",
            ));
        }
    }

    // ===== dimension / area ranges =====
    fn check_dimensions(&self, part: &CutPart, result: &mut PartValidationResult) {
        let cfg = &self.config;
        for (field, value) in [("size.L", part.size.l), ("size.W", part.size.w)] {
            if value < cfg.min_dimension_mm {
                result.push(ValidationIssue::error(
                    field,
                    ValidationCode::DimensionTooSmall,
                    format!("{} mm is below minimum {} mm", value, cfg.min_dimension_mm),
                ));
            } else if value > cfg.max_dimension_mm {
                result.push(ValidationIssue::error(
                    field,
                    ValidationCode::DimensionTooLarge,
                    format!("{} mm exceeds maximum {} mm", value, cfg.max_dimension_mm),
                ));
            }
        }

        let area = part.size.area_mm2();
        if area < cfg.min_area_mm2 {
            result.push(ValidationIssue::warning(
                "size",
                ValidationCode::AreaTooSmall,
                format!("area {} mm² is below {} mm²", area, cfg.min_area_mm2),
            ));
        } else if area > cfg.max_area_mm2 {
            result.push(ValidationIssue::error(
                "size",
                ValidationCode::AreaTooLarge,
                format!("area {} mm² exceeds {} mm²", area, cfg.max_area_mm2),
            ));
        }

        if part.size.l < part.size.w {
            result.push(ValidationIssue::warning(
                "size",
                ValidationCode::LengthLessThanWidth,
                format!("length {} is less than width {}", part.size.l, part.size.w),
            ));
        }
    }

    // ===== standard sheet =====
    fn check_sheet_fit(&self, part: &CutPart, result: &mut PartValidationResult) {
        if self.config.allow_oversize {
            return;
        }
        let sheet = self.config.standard_sheet;
        let (l, w) = (part.size.l, part.size.w);
        let fits_as_is = l <= sheet.l && w <= sheet.w;
        let fits_rotated = l <= sheet.w && w <= sheet.l;

        if !fits_as_is && !fits_rotated {
            result.push(ValidationIssue::error(
                "size",
                ValidationCode::OversizedPart,
                format!("{}x{} does not fit sheet {}x{}", l, w, sheet.l, sheet.w),
            ));
        } else if !fits_as_is && !part.allow_rotation {
            result.push(ValidationIssue::error(
                "allow_rotation",
                ValidationCode::RotationRequired,
                format!(
                    "{}x{} only fits sheet {}x{} rotated, but rotation is disabled",
                    l, w, sheet.l, sheet.w
                ),
            ));
        }
    }

    fn check_thickness(&self, part: &CutPart, result: &mut PartValidationResult) {
        let allowed = &self.config.allowed_thicknesses_mm;
        if allowed.is_empty() || !part.thickness_mm.is_finite() || part.thickness_mm <= 0.0 {
            return;
        }
        let stocked = allowed
            .iter()
            .any(|t| (t - part.thickness_mm).abs() < THICKNESS_TOLERANCE_MM);
        if !stocked {
            result.push(ValidationIssue::warning(
                "thickness_mm",
                ValidationCode::NonStandardThickness,
                format!("{} mm is not a stocked thickness", part.thickness_mm),
            ));
        }
    }

    fn check_grain(&self, part: &CutPart, result: &mut PartValidationResult) {
        let grained = self
            .config
            .grained_material_ids
            .iter()
            .any(|id| id == &part.material_id);
        if grained && !part.grain.is_constrained() && part.allow_rotation {
            result.push(ValidationIssue::warning(
                "grain",
                ValidationCode::GrainDirectionUnset,
                format!(
                    "material '{}' is grained but no grain direction is set",
                    part.material_id
                ),
            ));
        }
    }

    fn check_label(&self, part: &CutPart, result: &mut PartValidationResult) {
        if let Some(label) = &part.label {
            let len = label.chars().count();
            if len > self.config.max_label_len {
                result.push(ValidationIssue::warning(
                    "label",
                    ValidationCode::LabelTooLong,
                    format!("label has {} characters (max {})", len, self.config.max_label_len),
                ));
            }
        }
    }
}
