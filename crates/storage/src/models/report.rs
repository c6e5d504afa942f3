use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{ModerationAction, TargetKind, TargetRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportReason {
    Spam,
    Harassment,
    Plagiarism,
    Hate,
    Abuse,
    Other,
}

text_enum!(ReportReason, "report reason" {
    Spam => "spam",
    Harassment => "harassment",
    Plagiarism => "plagiarism",
    Hate => "hate",
    Abuse => "abuse",
    Other => "other",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Open,
    InReview,
    Resolved,
    Dismissed,
    Escalated,
}

text_enum!(ReportStatus, "report status" {
    Open => "open",
    InReview => "in_review",
    Resolved => "resolved",
    Dismissed => "dismissed",
    Escalated => "escalated",
});

impl ReportStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReportStatus::Resolved | ReportStatus::Dismissed | ReportStatus::Escalated
        )
    }

    pub fn can_transition_to(&self, next: ReportStatus) -> bool {
        match self {
            ReportStatus::Open => next != ReportStatus::Open,
            ReportStatus::InReview => next.is_terminal(),
            _ => false,
        }
    }

    /// The log action recorded when a report is closed with this status.
    pub fn closing_action(&self) -> ModerationAction {
        match self {
            ReportStatus::Resolved => ModerationAction::Resolve,
            ReportStatus::Escalated => ModerationAction::Escalate,
            _ => ModerationAction::Dismiss,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Report {
    pub report_id: i64,
    pub reporter_id: i64,
    #[sqlx(try_from = "String")]
    pub target_kind: TargetKind,
    pub target_id: i64,
    #[sqlx(try_from = "String")]
    pub reason_code: ReportReason,
    pub details: String,
    pub severity: i64,
    #[sqlx(try_from = "String")]
    pub status: ReportStatus,
    pub assignee_id: Option<i64>,
    pub resolution_note: String,
    pub resolved_by: Option<i64>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Report {
    pub fn target(&self) -> TargetRef {
        TargetRef::new(self.target_kind, self.target_id)
    }
}
