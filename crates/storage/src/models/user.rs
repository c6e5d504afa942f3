use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::{Result, StorageError};

/// A platform account. Owns the live `rating` projection and the
/// moderation flags that user-state actions mutate.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub user_id: i64,
    pub email: String,
    pub handle: Option<String>,
    pub display_name: String,
    pub bio: String,
    pub rating: f64,
    pub is_active: bool,
    pub is_banned: bool,
    pub is_shadow_banned: bool,
    pub is_profile_hidden: bool,
    pub is_readonly: bool,
    pub mute_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_muted_at(&self, now: DateTime<Utc>) -> bool {
        self.mute_expires_at.is_some_and(|until| until > now)
    }

    pub fn can_post_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && !self.is_banned && !self.is_readonly && !self.is_muted_at(now)
    }
}

/// The principal performing an operation. Capability booleans come from the
/// identity layer; this crate only checks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: i64,
    pub is_admin: bool,
    pub is_moderator: bool,
}

impl Actor {
    pub fn admin(user_id: i64) -> Self {
        Self {
            user_id,
            is_admin: true,
            is_moderator: true,
        }
    }

    pub fn moderator(user_id: i64) -> Self {
        Self {
            user_id,
            is_admin: false,
            is_moderator: true,
        }
    }

    pub fn require_moderator(&self) -> Result<()> {
        if self.is_admin || self.is_moderator {
            Ok(())
        } else {
            Err(StorageError::Forbidden("moderator capability required"))
        }
    }

    pub fn require_admin(&self) -> Result<()> {
        if self.is_admin {
            Ok(())
        } else {
            Err(StorageError::Forbidden("admin capability required"))
        }
    }
}
