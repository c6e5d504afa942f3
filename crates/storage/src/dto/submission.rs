use serde::Deserialize;
use validator::Validate;

use crate::models::StatementFormat;

/// Payload for proposing a new problem.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSubmissionRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: String,

    #[validate(length(min = 1, message = "Statement must not be empty"))]
    pub statement: String,

    #[serde(default)]
    pub statement_format: StatementFormat,

    #[validate(length(max = 255))]
    #[serde(default)]
    pub proposed_tags: String,

    #[validate(range(min = 1, max = 10))]
    #[serde(default = "default_difficulty")]
    pub proposed_difficulty: i64,
}

fn default_difficulty() -> i64 {
    3
}
