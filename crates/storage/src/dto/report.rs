use serde::Deserialize;
use validator::Validate;

use crate::models::{ModerationAction, ReportReason, TargetRef};

/// Payload for filing a report against a piece of content or a profile.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateReportRequest {
    pub target: TargetRef,
    pub reason_code: ReportReason,

    #[validate(length(max = 4000, message = "Details must be at most 4000 characters"))]
    #[serde(default)]
    pub details: String,

    #[validate(range(min = 1, max = 5, message = "Severity must be between 1 and 5"))]
    #[serde(default = "default_severity")]
    pub severity: i64,
}

fn default_severity() -> i64 {
    1
}

impl CreateReportRequest {
    pub fn new(target: TargetRef, reason_code: ReportReason) -> Self {
        Self {
            target,
            reason_code,
            details: String::new(),
            severity: default_severity(),
        }
    }
}

/// A moderator's decision on a report, dispatched against the report's
/// target.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportActionRequest {
    pub action: ModerationAction,
    #[serde(default)]
    pub reason: String,
    /// Required for `redact`.
    pub replacement_text: Option<String>,
    /// Mute length for `mute`. Defaults to 7, never less than 1.
    pub mute_days: Option<i64>,
}

impl ReportActionRequest {
    pub fn new(action: ModerationAction, reason: impl Into<String>) -> Self {
        Self {
            action,
            reason: reason.into(),
            replacement_text: None,
            mute_days: None,
        }
    }

    pub fn with_replacement(mut self, text: impl Into<String>) -> Self {
        self.replacement_text = Some(text.into());
        self
    }

    pub fn with_mute_days(mut self, days: i64) -> Self {
        self.mute_days = Some(days);
        self
    }

    pub fn mute_days(&self) -> i64 {
        self.mute_days.unwrap_or(DEFAULT_MUTE_DAYS).max(1)
    }
}

pub const DEFAULT_MUTE_DAYS: i64 = 7;
