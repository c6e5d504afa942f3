use thiserror::Error;

use crate::statement::LintIssue;
use storage::services::abuse::AbuseViolation;

pub type Result<T> = std::result::Result<T, IngestError>;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Storage error: {0}")]
    StorageError(#[from] storage::error::StorageError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Statement failed lint: {}", join_issues(.0))]
    LintError(Vec<LintIssue>),

    #[error("Rejected by abuse policy: {0}")]
    PolicyError(AbuseViolation),

    #[error("Validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),
}

fn join_issues(issues: &[LintIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
