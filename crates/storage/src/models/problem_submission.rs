use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::StatementFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    New,
    InReview,
    Accepted,
    Rejected,
    Duplicate,
}

text_enum!(SubmissionStatus, "submission status" {
    New => "new",
    InReview => "in_review",
    Accepted => "accepted",
    Rejected => "rejected",
    Duplicate => "duplicate",
});

impl SubmissionStatus {
    /// Whether a review decision can still be recorded.
    pub fn is_pending(&self) -> bool {
        matches!(self, SubmissionStatus::New | SubmissionStatus::InReview)
    }
}

/// A user-proposed problem waiting for review before it enters the archive.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProblemSubmission {
    pub submission_id: i64,
    pub submitter_id: Option<i64>,
    pub title: String,
    pub statement: String,
    #[sqlx(try_from = "String")]
    pub statement_format: StatementFormat,
    pub statement_plaintext: String,
    pub proposed_tags: String,
    pub proposed_difficulty: i64,
    #[sqlx(try_from = "String")]
    pub status: SubmissionStatus,
    pub linked_problem_id: Option<i64>,
    pub reviewer_id: Option<i64>,
    pub decision_note: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
