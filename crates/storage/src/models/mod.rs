use thiserror::Error;

/// Error returned when a stored or user-supplied string does not name a known
/// variant of one of the closed vocabularies below.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind}: {value:?}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// Implements the text round-trip used to store closed vocabularies in TEXT
/// columns: `as_str`, `Display`, `FromStr` and `TryFrom<String>` (the latter
/// is what `#[sqlx(try_from = "String")]` decodes through).
macro_rules! text_enum {
    ($name:ident, $kind:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::models::ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err($crate::models::ParseEnumError::new($kind, other)),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::models::ParseEnumError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

pub mod abuse_policy;
pub mod community;
pub mod content_revision;
pub mod contest;
pub mod moderation_log;
pub mod problem;
pub mod problem_submission;
pub mod rating_config;
pub mod rating_run;
pub mod report;
pub mod target;
pub mod user;

pub use abuse_policy::AbusePolicy;
pub use community::{Comment, Solution};
pub use content_revision::{ContentRevision, NewContentRevision};
pub use contest::{Contest, ContestResult, RankedResult};
pub use moderation_log::{ModerationAction, ModerationLog, NewModerationLog};
pub use problem::{NewProblem, Problem, ProblemStatus, StatementFormat};
pub use problem_submission::{ProblemSubmission, SubmissionStatus};
pub use rating_config::RatingConfig;
pub use rating_run::{NewRatingRun, RatingRun, RatingRunEntry, RatingRunStatus};
pub use report::{Report, ReportReason, ReportStatus};
pub use target::{
    ContentTarget, Moderatable, TargetKind, TargetRef, TextChange, TextField, VisibilityChange,
    VisibilityField,
};
pub use user::{Actor, User};
