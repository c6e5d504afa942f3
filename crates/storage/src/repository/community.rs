use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use crate::error::{Result, StorageError};
use crate::models::{Comment, Solution};

/// Repository for user-authored solutions and comments
pub struct CommunityRepository<'a> {
    conn: &'a mut SqliteConnection,
}

impl<'a> CommunityRepository<'a> {
    pub fn new(conn: &'a mut SqliteConnection) -> Self {
        Self { conn }
    }

    pub async fn create_solution(
        &mut self,
        problem_id: i64,
        author_id: i64,
        title: &str,
        content: &str,
    ) -> Result<Solution> {
        let solution = sqlx::query_as::<_, Solution>(
            r#"
            INSERT INTO solutions (problem_id, author_id, title, content, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING solution_id, problem_id, author_id, title, content, is_hidden,
                      is_moderator_edited, created_at
            "#,
        )
        .bind(problem_id)
        .bind(author_id)
        .bind(title)
        .bind(content)
        .bind(Utc::now())
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(solution)
    }

    pub async fn create_comment(
        &mut self,
        problem_id: Option<i64>,
        solution_id: Option<i64>,
        author_id: i64,
        content: &str,
    ) -> Result<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (problem_id, solution_id, author_id, content, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING comment_id, problem_id, solution_id, author_id, content, is_hidden,
                      is_moderator_edited, created_at
            "#,
        )
        .bind(problem_id)
        .bind(solution_id)
        .bind(author_id)
        .bind(content)
        .bind(Utc::now())
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(comment)
    }

    pub async fn find_solution(&mut self, solution_id: i64) -> Result<Solution> {
        let solution = sqlx::query_as::<_, Solution>(
            r#"
            SELECT solution_id, problem_id, author_id, title, content, is_hidden,
                   is_moderator_edited, created_at
            FROM solutions
            WHERE solution_id = ?
            "#,
        )
        .bind(solution_id)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(solution)
    }

    pub async fn find_comment(&mut self, comment_id: i64) -> Result<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            SELECT comment_id, problem_id, solution_id, author_id, content, is_hidden,
                   is_moderator_edited, created_at
            FROM comments
            WHERE comment_id = ?
            "#,
        )
        .bind(comment_id)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(comment)
    }

    pub async fn save_solution(&mut self, solution: &Solution) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE solutions
            SET content = ?, is_hidden = ?, is_moderator_edited = ?
            WHERE solution_id = ?
            "#,
        )
        .bind(&solution.content)
        .bind(solution.is_hidden)
        .bind(solution.is_moderator_edited)
        .bind(solution.solution_id)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    pub async fn save_comment(&mut self, comment: &Comment) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE comments
            SET content = ?, is_hidden = ?, is_moderator_edited = ?
            WHERE comment_id = ?
            "#,
        )
        .bind(&comment.content)
        .bind(comment.is_hidden)
        .bind(comment.is_moderator_edited)
        .bind(comment.comment_id)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    /// Comments plus solutions written by `author_id` at or after `since`.
    pub async fn count_posts_since(&mut self, author_id: i64, since: DateTime<Utc>) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT
                (SELECT COUNT(*) FROM comments WHERE author_id = ? AND created_at >= ?)
              + (SELECT COUNT(*) FROM solutions WHERE author_id = ? AND created_at >= ?)
            "#,
        )
        .bind(author_id)
        .bind(since)
        .bind(author_id)
        .bind(since)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(count)
    }
}
