// ==========================================
// Cutlist Intake - Catalog / Part Sink Traits
// ==========================================
// Scope: data access used by the pipeline (no business rules)
// Implementors: SqliteCatalogRepository (rusqlite)
// ==========================================

use crate::domain::catalog::{EdgebandDef, MaterialDef};
use crate::domain::part::CutPart;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// CatalogRepository Trait
// ==========================================
// Used by: MatcherContext::load (once per org per session)
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Active sheet materials of an organization, in catalog order.
    async fn list_active_materials(&self, org_id: &str) -> RepositoryResult<Vec<MaterialDef>>;

    /// Active edgebands of an organization, in catalog order.
    async fn list_active_edgebands(&self, org_id: &str) -> RepositoryResult<Vec<EdgebandDef>>;
}

// ==========================================
// PartSink Trait
// ==========================================
// Used by: IntakePipeline when persisting accepted parts
#[async_trait]
pub trait PartSink: Send + Sync {
    /// Write accepted parts of one intake batch.
    ///
    /// # Returns
    /// - Ok(n): parts written (all or nothing)
    async fn save_parts(
        &self,
        org_id: &str,
        batch_id: &str,
        parts: &[CutPart],
    ) -> RepositoryResult<usize>;
}
