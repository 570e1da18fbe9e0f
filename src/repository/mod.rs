// ==========================================
// Cutlist Intake - Repository Layer
// ==========================================
// Scope: catalog reads and part sink writes (rusqlite)
// Rule: no business rules in repositories
// ==========================================

pub mod catalog_repo;
pub mod catalog_repo_impl;
pub mod error;

pub use catalog_repo::{CatalogRepository, PartSink};
pub use catalog_repo_impl::SqliteCatalogRepository;
pub use error::{RepositoryError, RepositoryResult};
