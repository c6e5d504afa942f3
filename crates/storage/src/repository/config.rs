use sqlx::SqliteConnection;
use validator::Validate;

use crate::error::Result;
use crate::models::{AbusePolicy, RatingConfig};

/// Singleton configuration rows. Each table holds at most one row with id 1,
/// created with defaults on first read.
pub struct ConfigRepository<'a> {
    conn: &'a mut SqliteConnection,
}

impl<'a> ConfigRepository<'a> {
    pub fn new(conn: &'a mut SqliteConnection) -> Self {
        Self { conn }
    }

    pub async fn load_rating_config(&mut self) -> Result<RatingConfig> {
        sqlx::query("INSERT OR IGNORE INTO rating_config (config_id) VALUES (1)")
            .execute(&mut *self.conn)
            .await?;

        let config = sqlx::query_as::<_, RatingConfig>(
            r#"
            SELECT base_rating, k_factor, small_contest_threshold, small_contest_k_multiplier,
                   rating_floor, rating_cap
            FROM rating_config
            WHERE config_id = 1
            "#,
        )
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(config)
    }

    pub async fn save_rating_config(&mut self, config: &RatingConfig) -> Result<()> {
        config.validate()?;

        sqlx::query(
            r#"
            INSERT INTO rating_config (
                config_id, base_rating, k_factor, small_contest_threshold,
                small_contest_k_multiplier, rating_floor, rating_cap
            )
            VALUES (1, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (config_id) DO UPDATE SET
                base_rating = excluded.base_rating,
                k_factor = excluded.k_factor,
                small_contest_threshold = excluded.small_contest_threshold,
                small_contest_k_multiplier = excluded.small_contest_k_multiplier,
                rating_floor = excluded.rating_floor,
                rating_cap = excluded.rating_cap
            "#,
        )
        .bind(config.base_rating)
        .bind(config.k_factor)
        .bind(config.small_contest_threshold)
        .bind(config.small_contest_k_multiplier)
        .bind(config.rating_floor)
        .bind(config.rating_cap)
        .execute(&mut *self.conn)
        .await?;

        tracing::info!(k_factor = config.k_factor, "Rating configuration saved");
        Ok(())
    }

    pub async fn load_abuse_policy(&mut self) -> Result<AbusePolicy> {
        sqlx::query("INSERT OR IGNORE INTO abuse_policy (policy_id) VALUES (1)")
            .execute(&mut *self.conn)
            .await?;

        let policy = sqlx::query_as::<_, AbusePolicy>(
            r#"
            SELECT comment_limit_per_minute, comment_limit_per_hour,
                   max_external_links_per_post, bad_word_list
            FROM abuse_policy
            WHERE policy_id = 1
            "#,
        )
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(policy)
    }

    pub async fn save_abuse_policy(&mut self, policy: &AbusePolicy) -> Result<()> {
        policy.validate()?;

        sqlx::query(
            r#"
            INSERT INTO abuse_policy (
                policy_id, comment_limit_per_minute, comment_limit_per_hour,
                max_external_links_per_post, bad_word_list
            )
            VALUES (1, ?, ?, ?, ?)
            ON CONFLICT (policy_id) DO UPDATE SET
                comment_limit_per_minute = excluded.comment_limit_per_minute,
                comment_limit_per_hour = excluded.comment_limit_per_hour,
                max_external_links_per_post = excluded.max_external_links_per_post,
                bad_word_list = excluded.bad_word_list
            "#,
        )
        .bind(policy.comment_limit_per_minute)
        .bind(policy.comment_limit_per_hour)
        .bind(policy.max_external_links_per_post)
        .bind(&policy.bad_word_list)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }
}
