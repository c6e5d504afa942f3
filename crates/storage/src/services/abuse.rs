use chrono::{Duration, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::AbusePolicy;
use crate::repository::community::CommunityRepository;

lazy_static! {
    static ref EXTERNAL_LINK: Regex = Regex::new(r"(?i)https?://").expect("Invalid URL regex");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbuseViolation {
    TooManyLinks,
    BlockedTerm,
    MinuteLimit,
    HourLimit,
}

impl std::fmt::Display for AbuseViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            AbuseViolation::TooManyLinks => "Too many external links in one post.",
            AbuseViolation::BlockedTerm => "Content includes blocked terms.",
            AbuseViolation::MinuteLimit => "Posting limit exceeded for this minute.",
            AbuseViolation::HourLimit => "Posting limit exceeded for this hour.",
        };
        f.write_str(message)
    }
}

/// Content-only checks: link count, then blocked terms.
pub fn check_text(policy: &AbusePolicy, text: &str) -> Option<AbuseViolation> {
    if EXTERNAL_LINK.find_iter(text).count() as i64 > policy.max_external_links_per_post {
        return Some(AbuseViolation::TooManyLinks);
    }

    let lowered = text.to_lowercase();
    if policy.bad_words().any(|word| lowered.contains(&word)) {
        return Some(AbuseViolation::BlockedTerm);
    }

    None
}

/// First policy violation for a new post, if any. Rate limits count the
/// author's comments and solutions and are skipped for anonymous posts.
pub async fn check_post(
    pool: &SqlitePool,
    policy: &AbusePolicy,
    text: &str,
    author_id: Option<i64>,
) -> Result<Option<AbuseViolation>> {
    if text.is_empty() {
        return Ok(None);
    }
    if let Some(violation) = check_text(policy, text) {
        return Ok(Some(violation));
    }
    let Some(author_id) = author_id else {
        return Ok(None);
    };

    let now = Utc::now();
    let mut conn = pool.acquire().await?;
    let mut posts = CommunityRepository::new(&mut conn);

    let last_minute = posts
        .count_posts_since(author_id, now - Duration::minutes(1))
        .await?;
    if last_minute >= policy.comment_limit_per_minute {
        return Ok(Some(AbuseViolation::MinuteLimit));
    }

    let last_hour = posts
        .count_posts_since(author_id, now - Duration::hours(1))
        .await?;
    if last_hour >= policy.comment_limit_per_hour {
        return Ok(Some(AbuseViolation::HourLimit));
    }

    Ok(None)
}
