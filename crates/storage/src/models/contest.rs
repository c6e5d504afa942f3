use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Contest {
    pub contest_id: i64,
    pub title: String,
    pub slug: String,
    pub is_rated: bool,
    pub created_at: DateTime<Utc>,
}

/// One participant's standing in a contest. `rating_delta` is overwritten by
/// each rating run.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContestResult {
    pub result_id: i64,
    pub contest_id: i64,
    pub user_id: i64,
    pub score: f64,
    pub rank: i64,
    pub rating_delta: f64,
}

/// A contest result joined with the participant's live rating, in the order
/// the rating engine consumes it.
#[derive(Debug, Clone, FromRow)]
pub struct RankedResult {
    pub result_id: i64,
    pub user_id: i64,
    pub rank: i64,
    pub score: f64,
    pub rating: f64,
}
