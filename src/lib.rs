// ==========================================
// Cutlist Intake - Core Library
// ==========================================
// Scope: free text / spreadsheet rows → structured CutParts
// Stack: Rust + SQLite (catalog, org settings, accepted parts)
// Pipeline: parse → match catalog → validate → accept / review / reject
// ==========================================

// ==========================================
// Modules
// ==========================================

// Domain layer - parts, catalog, diagnostics
pub mod domain;

// Repository layer - catalog reads, part sink
pub mod repository;

// Engine layer - matcher, validators, pipeline, editor
pub mod engine;

// Importer layer - text / grid / file parsing
pub mod importer;

// Configuration layer
pub mod config;

// Database infrastructure (connection setup, PRAGMAs, schema)
pub mod db;

// Logging
pub mod logging;

// ==========================================
// Re-exports
// ==========================================

// Domain
pub use domain::{
    Capabilities, CutPart, Cutlist, EdgeId, EdgebandDef, Grain, JobInfo, MatchResult,
    MatchType, MaterialDef, PartPatch, PartSize, SourceMethod, ValidationCode, ValidationIssue,
};

// Engine
pub use engine::{
    quick_validate, CutlistEditor, CutlistValidator, IntakeDecision, IntakeError,
    IntakeOutcome, IntakePipeline, MatcherContext, PartValidator,
};

// Importer
pub use importer::{parse_grid, parse_line, parse_text_batch, quick_parse, ImportError};

// Config / repository
pub use config::{ConfigManager, IntakeConfig};
pub use repository::{RepositoryError, SqliteCatalogRepository};

// ==========================================
// Constants
// ==========================================

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const APP_NAME: &str = "cutlist-intake";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
