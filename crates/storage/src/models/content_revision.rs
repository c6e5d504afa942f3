use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::TargetRef;

/// Before/after text of a moderator redaction, linked to the log row that
/// caused it. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContentRevision {
    pub revision_id: i64,
    pub target_kind: String,
    pub target_id: i64,
    pub previous_text: String,
    pub new_text: String,
    pub edited_by: Option<i64>,
    pub moderation_log_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewContentRevision {
    pub target: TargetRef,
    pub previous_text: String,
    pub new_text: String,
    pub edited_by: Option<i64>,
    pub moderation_log_id: i64,
}
