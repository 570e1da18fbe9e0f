// ==========================================
// Cutlist Intake - Domain Layer
// ==========================================
// Scope: parts, catalog entries, validation diagnostics, cutlist document
// Rule: no data access, no parsing or matching logic
// ==========================================

pub mod catalog;
pub mod cutlist;
pub mod part;
pub mod types;
pub mod validation;

// Re-exports
pub use catalog::{EdgebandDef, MatchResult, MatchType, MaterialDef, OrgDefaults};
pub use cutlist::{Capabilities, Cutlist, JobInfo};
pub use part::{
    clamp_confidence, generate_part_id, CutPart, EdgeSpec, EdgingOps, GrooveOp, HoleOp,
    PartAudit, PartOps, PartPatch, PartSize, RoutingOp, DEFAULT_MATERIAL_ID,
};
pub use types::{DimOrder, EdgeId, Grain, Severity, SourceMethod, UnitSystem};
pub use validation::{
    CutlistSummary, CutlistValidationResult, PartValidationResult, QuickValidation,
    ValidationCode, ValidationIssue,
};
