// ==========================================
// Cutlist Intake - Cutlist Validator
// ==========================================
// Scope: document-level rules on top of per-part validation
// Checks: size limits, job info, references, capabilities, thickness consistency
// Output: CutlistValidationResult with summary
// ==========================================

use crate::config::validation_config::CutlistValidationConfig;
use crate::domain::cutlist::Cutlist;
use crate::domain::part::{CutPart, PartOps};
use crate::domain::validation::{
    CutlistSummary, CutlistValidationResult, PartValidationResult, QuickValidation,
    ValidationCode, ValidationIssue,
};
use crate::engine::part_validator::PartValidator;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::{info, instrument};

#[derive(Debug, Clone, Default)]
pub struct CutlistValidator {
    config: CutlistValidationConfig,
    part_validator: PartValidator,
}

impl CutlistValidator {
    pub fn new(config: CutlistValidationConfig) -> Self {
        let part_validator = PartValidator::new(config.part.clone());
        Self {
            config,
            part_validator,
        }
    }

    pub fn part_validator(&self) -> &PartValidator {
        &self.part_validator
    }

    #[instrument(skip(self, cutlist), fields(doc_id = %cutlist.doc_id, parts = cutlist.parts.len()))]
    pub fn validate(&self, cutlist: &Cutlist) -> CutlistValidationResult {
        let part_results = self.part_validator.validate_parts(&cutlist.parts);
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        // === size limits ===
        if cutlist.parts.is_empty() {
            errors.push(ValidationIssue::error(
                "parts",
                ValidationCode::NoParts,
                "cutlist has no parts",
            ));
        }
        if cutlist.parts.len() > self.config.max_unique_parts {
            errors.push(ValidationIssue::error(
                "parts",
                ValidationCode::TooManyParts,
                format!(
                    "{} parts exceed maximum {}",
                    cutlist.parts.len(),
                    self.config.max_unique_parts
                ),
            ));
        }
        let total_pieces = cutlist.total_pieces();
        if total_pieces > self.config.max_total_pieces {
            errors.push(ValidationIssue::error(
                "parts",
                ValidationCode::TooManyPieces,
                format!(
                    "{} pieces exceed maximum {}",
                    total_pieces, self.config.max_total_pieces
                ),
            ));
        }

        // === job info ===
        if is_blank(cutlist.job.job_id.as_deref()) {
            warnings.push(ValidationIssue::warning(
                "job.job_id",
                ValidationCode::MissingJobId,
                "job id is not set",
            ));
        }
        if is_blank(cutlist.job.name.as_deref()) {
            warnings.push(ValidationIssue::warning(
                "job.name",
                ValidationCode::MissingJobName,
                "job name is not set",
            ));
        }

        if self.config.require_defined_references {
            errors.extend(undefined_references(cutlist));
        }
        warnings.extend(capability_mismatches(cutlist));
        warnings.extend(thickness_conflicts(&cutlist.parts));

        let summary = summarize(cutlist, &part_results);
        let valid = errors.is_empty() && part_results.iter().all(|r| r.valid);

        info!(
            valid,
            errors = errors.len(),
            warnings = warnings.len(),
            invalid_parts = summary.invalid_parts,
            total_pieces = summary.total_pieces,
            "cutlist validated"
        );

        CutlistValidationResult {
            valid,
            errors,
            warnings,
            part_results,
            summary,
        }
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// Material / edgeband ids not declared by the document.
fn undefined_references(cutlist: &Cutlist) -> Vec<ValidationIssue> {
    let materials: HashSet<&str> = cutlist
        .materials
        .iter()
        .map(|m| m.material_id.as_str())
        .collect();
    let edgebands: HashSet<&str> = cutlist
        .edgebands
        .iter()
        .map(|e| e.edgeband_id.as_str())
        .collect();

    let mut issues = Vec::new();
    for (index, part) in cutlist.parts.iter().enumerate() {
        if !materials.contains(part.material_id.as_str()) {
            issues.push(ValidationIssue::error(
                &format!("parts[{}].material_id", index),
                ValidationCode::UndefinedMaterial,
                format!("material '{}' is not defined", part.material_id),
            ));
        }
        let refs: BTreeSet<&str> = part.edgeband_refs().into_iter().collect();
        for edgeband_id in refs {
            if !edgebands.contains(edgeband_id) {
                issues.push(ValidationIssue::error(
                    &format!("parts[{}].ops.edging", index),
                    ValidationCode::UndefinedEdgeband,
                    format!("edgeband '{}' is not defined", edgeband_id),
                ));
            }
        }
    }
    issues
}

/// Operations requested without the capability, and capabilities declared but unused.
fn capability_mismatches(cutlist: &Cutlist) -> Vec<ValidationIssue> {
    let caps = cutlist.capabilities;
    let parts = &cutlist.parts;
    let uses_edging = parts.iter().any(|p| p.has_edging());
    let uses = |pick: fn(&PartOps) -> bool| {
        parts.iter().any(|p| p.ops.as_ref().is_some_and(pick))
    };
    let uses_holes = uses(|ops| !ops.holes.is_empty());
    let uses_grooves = uses(|ops| !ops.grooves.is_empty());
    let uses_routing = uses(|ops| !ops.routing.is_empty());

    let checks = [
        ("capabilities.edging", "edging", uses_edging, caps.edging),
        ("capabilities.cnc_holes", "CNC holes", uses_holes, caps.cnc_holes),
        ("capabilities.cnc_grooves", "CNC grooves", uses_grooves, caps.cnc_grooves),
        ("capabilities.cnc_routing", "CNC routing", uses_routing, caps.cnc_routing),
    ];

    let mut issues = Vec::new();
    for (field, name, used, declared) in checks {
        if used && !declared {
            issues.push(ValidationIssue::warning(
                field,
                ValidationCode::CapabilityMismatch,
                format!("parts request {} but the capability is not enabled", name),
            ));
        } else if declared && !used && !parts.is_empty() {
            issues.push(ValidationIssue::warning(
                field,
                ValidationCode::CapabilityMismatch,
                format!("{} is enabled but no part uses it", name),
            ));
        }
    }
    issues
}

/// One warning per material used at more than one thickness.
fn thickness_conflicts(parts: &[CutPart]) -> Vec<ValidationIssue> {
    let mut by_material: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for part in parts {
        let seen = by_material.entry(part.material_id.as_str()).or_default();
        if !seen.iter().any(|t| (t - part.thickness_mm).abs() < 0.01) {
            seen.push(part.thickness_mm);
        }
    }

    by_material
        .into_iter()
        .filter(|(_, thicknesses)| thicknesses.len() > 1)
        .map(|(material_id, thicknesses)| {
            let list: Vec<String> = thicknesses.iter().map(|t| format!("{}mm", t)).collect();
            ValidationIssue::warning(
                "parts",
                ValidationCode::MaterialThicknessConflict,
                format!(
                    "material '{}' used at several thicknesses: {}",
                    material_id,
                    list.join(", ")
                ),
            )
        })
        .collect()
}

fn summarize(
    cutlist: &Cutlist,
    part_results: &[PartValidationResult],
) -> CutlistSummary {
    let valid_parts = part_results.iter().filter(|r| r.valid).count();
    let materials_used: BTreeSet<String> = cutlist
        .parts
        .iter()
        .map(|p| p.material_id.clone())
        .collect();
    CutlistSummary {
        total_parts: cutlist.parts.len(),
        valid_parts,
        invalid_parts: cutlist.parts.len() - valid_parts,
        total_pieces: cutlist.total_pieces(),
        materials_used: materials_used.into_iter().collect(),
        has_edging: cutlist.parts.iter().any(|p| p.has_edging()),
        has_cnc: cutlist.parts.iter().any(|p| p.has_cnc()),
    }
}

/// Fast import check: usable when at least one part has positive L, W and qty.
pub fn quick_validate(parts: &[CutPart]) -> QuickValidation {
    let usable_parts = parts
        .iter()
        .filter(|p| p.size.is_positive() && p.qty > 0)
        .count();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for part in parts {
        *counts.entry(part.part_id.as_str()).or_insert(0) += 1;
    }
    let duplicate_ids: BTreeSet<String> = counts
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(id, _)| id.to_string())
        .collect();

    QuickValidation {
        valid: usable_parts > 0,
        usable_parts,
        duplicate_ids: duplicate_ids.into_iter().collect(),
    }
}
