use chrono::Utc;
use sqlx::SqliteConnection;
use sqlx::types::Json;

use crate::dto::rating::RatingHistoryEntry;
use crate::error::{Result, StorageError};
use crate::models::{NewRatingRun, RatingRun, RatingRunEntry, RatingRunStatus};

/// Repository for rating runs and their entries
pub struct RatingRepository<'a> {
    conn: &'a mut SqliteConnection,
}

impl<'a> RatingRepository<'a> {
    pub fn new(conn: &'a mut SqliteConnection) -> Self {
        Self { conn }
    }

    pub async fn create_run(&mut self, run: &NewRatingRun) -> Result<RatingRun> {
        let run = sqlx::query_as::<_, RatingRun>(
            r#"
            INSERT INTO rating_runs (
                contest_id, triggered_by, status, is_rollback, parent_run_id,
                config_snapshot, notes, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING run_id, contest_id, triggered_by, status, is_rollback, parent_run_id,
                      config_snapshot, notes, created_at
            "#,
        )
        .bind(run.contest_id)
        .bind(run.triggered_by)
        .bind(run.status.as_str())
        .bind(run.parent_run_id.is_some())
        .bind(run.parent_run_id)
        .bind(Json(&run.config_snapshot))
        .bind(&run.notes)
        .bind(Utc::now())
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(run)
    }

    pub async fn find_run(&mut self, run_id: i64) -> Result<RatingRun> {
        let run = sqlx::query_as::<_, RatingRun>(
            r#"
            SELECT run_id, contest_id, triggered_by, status, is_rollback, parent_run_id,
                   config_snapshot, notes, created_at
            FROM rating_runs
            WHERE run_id = ?
            "#,
        )
        .bind(run_id)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(run)
    }

    /// Runs for a contest, newest first.
    pub async fn list_runs_for_contest(&mut self, contest_id: i64) -> Result<Vec<RatingRun>> {
        let runs = sqlx::query_as::<_, RatingRun>(
            r#"
            SELECT run_id, contest_id, triggered_by, status, is_rollback, parent_run_id,
                   config_snapshot, notes, created_at
            FROM rating_runs
            WHERE contest_id = ?
            ORDER BY created_at DESC, run_id DESC
            "#,
        )
        .bind(contest_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(runs)
    }

    /// Flip an applied original run to `rolled_back`. Returns `false` when
    /// the run is not in a state that allows it, so two concurrent rollbacks
    /// cannot both succeed.
    pub async fn mark_rolled_back(&mut self, run_id: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE rating_runs
            SET status = ?
            WHERE run_id = ? AND status = ? AND is_rollback = 0
            "#,
        )
        .bind(RatingRunStatus::RolledBack.as_str())
        .bind(run_id)
        .bind(RatingRunStatus::Applied.as_str())
        .execute(&mut *self.conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn insert_entry(
        &mut self,
        run_id: i64,
        user_id: i64,
        previous_rating: f64,
        new_rating: f64,
        delta: f64,
    ) -> Result<RatingRunEntry> {
        let entry = sqlx::query_as::<_, RatingRunEntry>(
            r#"
            INSERT INTO rating_run_entries (run_id, user_id, previous_rating, new_rating, delta)
            VALUES (?, ?, ?, ?, ?)
            RETURNING entry_id, run_id, user_id, previous_rating, new_rating, delta
            "#,
        )
        .bind(run_id)
        .bind(user_id)
        .bind(previous_rating)
        .bind(new_rating)
        .bind(delta)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(entry)
    }

    pub async fn entries_for_run(&mut self, run_id: i64) -> Result<Vec<RatingRunEntry>> {
        let entries = sqlx::query_as::<_, RatingRunEntry>(
            r#"
            SELECT entry_id, run_id, user_id, previous_rating, new_rating, delta
            FROM rating_run_entries
            WHERE run_id = ?
            ORDER BY entry_id ASC
            "#,
        )
        .bind(run_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(entries)
    }

    pub async fn count_entries(&mut self, run_id: i64) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM rating_run_entries WHERE run_id = ?")
                .bind(run_id)
                .fetch_one(&mut *self.conn)
                .await?;

        Ok(count)
    }

    /// Every rating change recorded for a user, newest first.
    pub async fn history_for_user(&mut self, user_id: i64) -> Result<Vec<RatingHistoryEntry>> {
        let history = sqlx::query_as::<_, RatingHistoryEntry>(
            r#"
            SELECT r.run_id, r.contest_id, r.is_rollback,
                   e.previous_rating, e.new_rating, e.delta
            FROM rating_run_entries e
            INNER JOIN rating_runs r ON r.run_id = e.run_id
            WHERE e.user_id = ?
            ORDER BY r.created_at DESC, r.run_id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(history)
    }
}
