// ==========================================
// Cutlist Intake - Engine Layer
// ==========================================
// Scope: catalog matching, validation, intake pipeline, cutlist editing
// Rule: no SQL here; data access goes through repository / config traits
// ==========================================

pub mod cutlist_editor;
pub mod cutlist_validator;
pub mod error;
pub mod intake;
pub mod matcher;
pub mod part_validator;

// Re-exports
pub use cutlist_editor::{merge_parts, CutlistEditor, EditCommand, DEFAULT_HISTORY_LIMIT};
pub use cutlist_validator::{quick_validate, CutlistValidator};
pub use error::{IntakeError, IntakeResult};
pub use intake::{IntakeDecision, IntakeItem, IntakeOutcome, IntakePipeline};
pub use matcher::{MatchStats, MatcherContext};
pub use part_validator::PartValidator;
