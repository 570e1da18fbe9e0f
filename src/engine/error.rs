// ==========================================
// Cutlist Intake - Engine Layer Errors
// ==========================================
// Scope: pipeline and editor failures
// Wraps: ImportError (files, grids), RepositoryError (catalog, settings, sink)
// ==========================================

use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    // ===== editor =====
    #[error("part not found: {0}")]
    PartNotFound(String),

    #[error("no edit to {0}")]
    EmptyHistory(&'static str),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type IntakeResult<T> = Result<T, IntakeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_errors_keep_message() {
        let err: IntakeError = ImportError::EmptyWorkbook.into();
        assert_eq!(err.to_string(), "workbook contains no sheets");

        let err: IntakeError = RepositoryError::LockError("poisoned".to_string()).into();
        assert!(matches!(err, IntakeError::Repository(_)));

        assert_eq!(
            IntakeError::PartNotFound("p_1".to_string()).to_string(),
            "part not found: p_1"
        );
        assert_eq!(IntakeError::EmptyHistory("undo").to_string(), "no edit to undo");
    }
}
