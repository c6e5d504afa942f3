use serde::Serialize;

use crate::models::{RatingRun, RatingRunEntry};

/// A run header together with its complete entry set.
#[derive(Debug, Clone, Serialize)]
pub struct RatingRunDetail {
    pub run: RatingRun,
    pub entries: Vec<RatingRunEntry>,
}

impl RatingRunDetail {
    pub fn entry_for(&self, user_id: i64) -> Option<&RatingRunEntry> {
        self.entries.iter().find(|entry| entry.user_id == user_id)
    }
}

/// One step of a user's rating history, newest first when listed.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RatingHistoryEntry {
    pub run_id: i64,
    pub contest_id: i64,
    pub is_rollback: bool,
    pub previous_rating: f64,
    pub new_rating: f64,
    pub delta: f64,
}
