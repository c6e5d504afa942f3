use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Solution {
    pub solution_id: i64,
    pub problem_id: i64,
    pub author_id: i64,
    pub title: String,
    pub content: String,
    pub is_hidden: bool,
    pub is_moderator_edited: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub comment_id: i64,
    pub problem_id: Option<i64>,
    pub solution_id: Option<i64>,
    pub author_id: i64,
    pub content: String,
    pub is_hidden: bool,
    pub is_moderator_edited: bool,
    pub created_at: DateTime<Utc>,
}
