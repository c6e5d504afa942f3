use sqlx::SqliteConnection;

use crate::error::{Result, StorageError};
use crate::models::{Contest, ContestResult, RankedResult};

/// Repository for contests and their standings
pub struct ContestRepository<'a> {
    conn: &'a mut SqliteConnection,
}

impl<'a> ContestRepository<'a> {
    pub fn new(conn: &'a mut SqliteConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&mut self, title: &str, slug: &str, is_rated: bool) -> Result<Contest> {
        let contest = sqlx::query_as::<_, Contest>(
            r#"
            INSERT INTO contests (title, slug, is_rated)
            VALUES (?, ?, ?)
            RETURNING contest_id, title, slug, is_rated, created_at
            "#,
        )
        .bind(title)
        .bind(slug)
        .bind(is_rated)
        .fetch_one(&mut *self.conn)
        .await
        .map_err(|e| {
            let err = StorageError::from(e);
            if err.is_unique_violation() {
                return StorageError::ConstraintViolation("Slug already exists".to_string());
            }
            err
        })?;

        Ok(contest)
    }

    pub async fn find_by_id(&mut self, contest_id: i64) -> Result<Contest> {
        let contest = sqlx::query_as::<_, Contest>(
            r#"
            SELECT contest_id, title, slug, is_rated, created_at
            FROM contests
            WHERE contest_id = ?
            "#,
        )
        .bind(contest_id)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(contest)
    }

    pub async fn find_by_slug(&mut self, slug: &str) -> Result<Contest> {
        let contest = sqlx::query_as::<_, Contest>(
            r#"
            SELECT contest_id, title, slug, is_rated, created_at
            FROM contests
            WHERE slug = ?
            "#,
        )
        .bind(slug)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(contest)
    }

    pub async fn add_result(
        &mut self,
        contest_id: i64,
        user_id: i64,
        score: f64,
        rank: i64,
    ) -> Result<ContestResult> {
        let result = sqlx::query_as::<_, ContestResult>(
            r#"
            INSERT INTO contest_results (contest_id, user_id, score, rank)
            VALUES (?, ?, ?, ?)
            RETURNING result_id, contest_id, user_id, score, rank, rating_delta
            "#,
        )
        .bind(contest_id)
        .bind(user_id)
        .bind(score)
        .bind(rank)
        .fetch_one(&mut *self.conn)
        .await
        .map_err(|e| {
            let err = StorageError::from(e);
            if err.is_unique_violation() {
                return StorageError::ConstraintViolation(
                    "User already has a result in this contest".to_string(),
                );
            }
            err
        })?;

        Ok(result)
    }

    pub async fn list_results(&mut self, contest_id: i64) -> Result<Vec<ContestResult>> {
        let results = sqlx::query_as::<_, ContestResult>(
            r#"
            SELECT result_id, contest_id, user_id, score, rank, rating_delta
            FROM contest_results
            WHERE contest_id = ?
            ORDER BY rank ASC, score DESC, result_id ASC
            "#,
        )
        .bind(contest_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(results)
    }

    /// Standings joined with each participant's live rating, best rank first
    /// and higher score breaking ties.
    pub async fn ranked_results(&mut self, contest_id: i64) -> Result<Vec<RankedResult>> {
        let results = sqlx::query_as::<_, RankedResult>(
            r#"
            SELECT cr.result_id, cr.user_id, cr.rank, cr.score, u.rating
            FROM contest_results cr
            INNER JOIN users u ON u.user_id = cr.user_id
            WHERE cr.contest_id = ?
            ORDER BY cr.rank ASC, cr.score DESC, cr.result_id ASC
            "#,
        )
        .bind(contest_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(results)
    }

    /// Clear the delta a rolled-back run left on a participant's result.
    pub async fn reset_rating_delta(&mut self, contest_id: i64, user_id: i64) -> Result<()> {
        sqlx::query(
            "UPDATE contest_results SET rating_delta = 0 WHERE contest_id = ? AND user_id = ?",
        )
        .bind(contest_id)
        .bind(user_id)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    pub async fn set_rating_delta(&mut self, result_id: i64, delta: f64) -> Result<()> {
        sqlx::query("UPDATE contest_results SET rating_delta = ? WHERE result_id = ?")
            .bind(delta)
            .bind(result_id)
            .execute(&mut *self.conn)
            .await?;

        Ok(())
    }
}
