use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::models::{ModerationAction, TargetRef};

/// Filter over the moderation ledger. Every field narrows the result; an
/// empty filter matches every row.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditFilter {
    pub actor_id: Option<i64>,
    pub target: Option<TargetRef>,
    pub target_user_id: Option<i64>,
    pub report_id: Option<i64>,
    pub action: Option<ModerationAction>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl AuditFilter {
    pub fn by_actor(actor_id: i64) -> Self {
        Self {
            actor_id: Some(actor_id),
            ..Self::default()
        }
    }

    pub fn by_target(target: TargetRef) -> Self {
        Self {
            target: Some(target),
            ..Self::default()
        }
    }

    pub fn by_target_user(user_id: i64) -> Self {
        Self {
            target_user_id: Some(user_id),
            ..Self::default()
        }
    }

    pub fn by_report(report_id: i64) -> Self {
        Self {
            report_id: Some(report_id),
            ..Self::default()
        }
    }

    pub fn with_action(mut self, action: ModerationAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn between(mut self, since: Option<DateTime<Utc>>, until: Option<DateTime<Utc>>) -> Self {
        self.since = since;
        self.until = until;
        self
    }
}
