use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;

use super::RatingConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingRunStatus {
    Applied,
    RolledBack,
    Failed,
}

text_enum!(RatingRunStatus, "rating run status" {
    Applied => "applied",
    RolledBack => "rolled_back",
    Failed => "failed",
});

/// Header of one rating computation.
///
/// An original run has `is_rollback = false` and no parent. A rollback run
/// has `is_rollback = true` and `parent_run_id` pointing at the run it
/// reverses. The schema enforces both shapes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RatingRun {
    pub run_id: i64,
    pub contest_id: i64,
    pub triggered_by: Option<i64>,
    #[sqlx(try_from = "String")]
    pub status: RatingRunStatus,
    pub is_rollback: bool,
    pub parent_run_id: Option<i64>,
    pub config_snapshot: Json<RatingConfig>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl RatingRun {
    pub fn can_be_rolled_back(&self) -> bool {
        !self.is_rollback && self.status == RatingRunStatus::Applied
    }
}

#[derive(Debug, Clone)]
pub struct NewRatingRun {
    pub contest_id: i64,
    pub triggered_by: Option<i64>,
    pub status: RatingRunStatus,
    /// Set only for rollback runs; `is_rollback` is derived from it.
    pub parent_run_id: Option<i64>,
    pub config_snapshot: RatingConfig,
    pub notes: String,
}

impl NewRatingRun {
    pub fn applied(contest_id: i64, triggered_by: Option<i64>, config: &RatingConfig) -> Self {
        Self {
            contest_id,
            triggered_by,
            status: RatingRunStatus::Applied,
            parent_run_id: None,
            config_snapshot: config.clone(),
            notes: String::new(),
        }
    }

    /// A rollback run reuses the snapshot of the run it reverses.
    pub fn rollback_of(parent: &RatingRun, triggered_by: Option<i64>) -> Self {
        Self {
            contest_id: parent.contest_id,
            triggered_by,
            status: RatingRunStatus::RolledBack,
            parent_run_id: Some(parent.run_id),
            config_snapshot: parent.config_snapshot.0.clone(),
            notes: format!("Rollback of run {}", parent.run_id),
        }
    }
}

/// One participant's before/after rating within a run. Never updated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RatingRunEntry {
    pub entry_id: i64,
    pub run_id: i64,
    pub user_id: i64,
    pub previous_rating: f64,
    pub new_rating: f64,
    pub delta: f64,
}
