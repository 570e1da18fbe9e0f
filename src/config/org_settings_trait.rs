// ==========================================
// Cutlist Intake - Org Settings Reader Trait
// ==========================================
// Scope: read-only organization settings used by the pipeline
// Implementors: ConfigManager (config_kv table)
// Rule: no writes, no business logic
// ==========================================

use crate::config::validation_config::SheetSize;
use crate::domain::catalog::OrgDefaults;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

#[async_trait]
pub trait OrgSettingsReader: Send + Sync {
    /// Default material / edgeband ids (each may be unset).
    async fn get_org_defaults(&self, org_id: &str) -> RepositoryResult<OrgDefaults>;

    /// Standard sheet for the oversize check.
    ///
    /// # Default
    /// - 2800 × 2070 mm
    async fn get_standard_sheet(&self, org_id: &str) -> RepositoryResult<SheetSize>;

    /// Stocked thicknesses; None keeps the built-in list.
    async fn get_allowed_thicknesses(&self, org_id: &str) -> RepositoryResult<Option<Vec<f64>>>;

    /// Auto-accept threshold; None keeps the configured value.
    async fn get_min_confidence(&self, org_id: &str) -> RepositoryResult<Option<f64>>;
}
