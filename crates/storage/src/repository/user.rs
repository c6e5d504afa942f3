use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use crate::error::{Result, StorageError};
use crate::models::User;

/// Repository for User database operations
pub struct UserRepository<'a> {
    conn: &'a mut SqliteConnection,
}

impl<'a> UserRepository<'a> {
    pub fn new(conn: &'a mut SqliteConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&mut self, email: &str, display_name: &str) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, display_name)
            VALUES (?, ?)
            RETURNING user_id, email, handle, display_name, bio, rating, is_active,
                      is_banned, is_shadow_banned, is_profile_hidden, is_readonly,
                      mute_expires_at, created_at
            "#,
        )
        .bind(email)
        .bind(display_name)
        .fetch_one(&mut *self.conn)
        .await
        .map_err(|e| {
            let err = StorageError::from(e);
            if err.is_unique_violation() {
                return StorageError::ConstraintViolation("Email already exists".to_string());
            }
            err
        })?;

        Ok(user)
    }

    pub async fn find_by_id(&mut self, user_id: i64) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, email, handle, display_name, bio, rating, is_active,
                   is_banned, is_shadow_banned, is_profile_hidden, is_readonly,
                   mute_expires_at, created_at
            FROM users
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(user)
    }

    pub async fn update_rating(&mut self, user_id: i64, rating: f64) -> Result<()> {
        let result = sqlx::query("UPDATE users SET rating = ? WHERE user_id = ?")
            .bind(rating)
            .bind(user_id)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }

    /// Persist the profile fields moderation may touch.
    pub async fn save_profile(&mut self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET bio = ?, is_profile_hidden = ?
            WHERE user_id = ?
            "#,
        )
        .bind(&user.bio)
        .bind(user.is_profile_hidden)
        .bind(user.user_id)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    pub async fn set_mute(&mut self, user_id: i64, until: Option<DateTime<Utc>>) -> Result<()> {
        sqlx::query("UPDATE users SET mute_expires_at = ? WHERE user_id = ?")
            .bind(until)
            .bind(user_id)
            .execute(&mut *self.conn)
            .await?;

        Ok(())
    }

    /// Banning also deactivates the account; lifting the ban reactivates it.
    pub async fn set_banned(&mut self, user_id: i64, banned: bool) -> Result<()> {
        sqlx::query("UPDATE users SET is_banned = ?, is_active = ? WHERE user_id = ?")
            .bind(banned)
            .bind(!banned)
            .bind(user_id)
            .execute(&mut *self.conn)
            .await?;

        Ok(())
    }

    pub async fn set_shadow_banned(&mut self, user_id: i64, shadow_banned: bool) -> Result<()> {
        sqlx::query("UPDATE users SET is_shadow_banned = ? WHERE user_id = ?")
            .bind(shadow_banned)
            .bind(user_id)
            .execute(&mut *self.conn)
            .await?;

        Ok(())
    }
}
