use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use sqlx::types::Json;

use super::{TargetKind, TargetRef};

/// The closed vocabulary of moderation actions. Anything outside it fails to
/// parse; there is no fallback action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationAction {
    Hide,
    Unhide,
    Redact,
    Warn,
    Mute,
    Ban,
    ShadowBan,
    Dismiss,
    Resolve,
    Escalate,
}

text_enum!(ModerationAction, "moderation action" {
    Hide => "hide",
    Unhide => "unhide",
    Redact => "redact",
    Warn => "warn",
    Mute => "mute",
    Ban => "ban",
    ShadowBan => "shadow_ban",
    Dismiss => "dismiss",
    Resolve => "resolve",
    Escalate => "escalate",
});

impl ModerationAction {
    /// Actions that mutate user state rather than content.
    pub fn is_user_state(&self) -> bool {
        matches!(
            self,
            ModerationAction::Warn
                | ModerationAction::Mute
                | ModerationAction::Ban
                | ModerationAction::ShadowBan
        )
    }

    pub fn requires_admin(&self) -> bool {
        matches!(self, ModerationAction::Ban | ModerationAction::ShadowBan)
    }
}

/// One row of the moderation ledger. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ModerationLog {
    pub log_id: i64,
    pub actor_id: Option<i64>,
    #[sqlx(try_from = "String")]
    pub action: ModerationAction,
    pub reason: String,
    pub report_id: Option<i64>,
    pub target_kind: Option<String>,
    pub target_id: Option<i64>,
    pub target_user_id: Option<i64>,
    pub metadata: Json<Value>,
    pub created_at: DateTime<Utc>,
}

impl ModerationLog {
    pub fn target(&self) -> Option<TargetRef> {
        let kind: TargetKind = self.target_kind.as_deref()?.parse().ok()?;
        Some(TargetRef::new(kind, self.target_id?))
    }
}

#[derive(Debug, Clone)]
pub struct NewModerationLog {
    pub actor_id: Option<i64>,
    pub action: ModerationAction,
    pub reason: String,
    pub report_id: Option<i64>,
    pub target: Option<TargetRef>,
    pub target_user_id: Option<i64>,
    pub metadata: Value,
}

impl NewModerationLog {
    pub fn new(actor_id: i64, action: ModerationAction, reason: impl Into<String>) -> Self {
        Self {
            actor_id: Some(actor_id),
            action,
            reason: reason.into(),
            report_id: None,
            target: None,
            target_user_id: None,
            metadata: Value::Object(Default::default()),
        }
    }

    pub fn with_report(mut self, report_id: Option<i64>) -> Self {
        self.report_id = report_id;
        self
    }

    pub fn with_target(mut self, target: Option<TargetRef>) -> Self {
        self.target = target;
        self
    }

    pub fn with_target_user(mut self, user_id: i64) -> Self {
        self.target_user_id = Some(user_id);
        self
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }
}
