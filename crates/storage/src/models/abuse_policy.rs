use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Posting limits and blocked terms applied to community content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, Validate)]
pub struct AbusePolicy {
    #[validate(range(min = 1))]
    pub comment_limit_per_minute: i64,
    #[validate(range(min = 1))]
    pub comment_limit_per_hour: i64,
    #[validate(range(min = 0))]
    pub max_external_links_per_post: i64,
    /// Comma- or newline-separated terms, matched case-insensitively.
    pub bad_word_list: String,
}

impl Default for AbusePolicy {
    fn default() -> Self {
        Self {
            comment_limit_per_minute: 10,
            comment_limit_per_hour: 120,
            max_external_links_per_post: 3,
            bad_word_list: String::new(),
        }
    }
}

impl AbusePolicy {
    pub fn bad_words(&self) -> impl Iterator<Item = String> + '_ {
        self.bad_word_list
            .split([',', '\n'])
            .map(|word| word.trim().to_lowercase())
            .filter(|word| !word.is_empty())
    }
}
