//! Moderation targets.
//!
//! Reports and log rows point at content through a typed `(kind, id)` pair.
//! Once loaded, a target is one of a closed set of models, each exposing the
//! capabilities it actually has through [`Moderatable`]. Visibility goes
//! through exactly one path per kind, in priority order: hidden flag, status
//! field, profile-hidden flag. Text goes through content, statement or bio.

use serde::{Deserialize, Serialize};

use super::{Comment, Problem, ProblemStatus, Solution, User};
use crate::plaintext::normalize_to_plaintext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Comment,
    Solution,
    Problem,
    Profile,
}

text_enum!(TargetKind, "target kind" {
    Comment => "comment",
    Solution => "solution",
    Problem => "problem",
    Profile => "profile",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetRef {
    pub kind: TargetKind,
    pub id: i64,
}

impl TargetRef {
    pub fn new(kind: TargetKind, id: i64) -> Self {
        Self { kind, id }
    }
}

impl std::fmt::Display for TargetRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.kind, self.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityField {
    HiddenFlag,
    Status,
    ProfileHidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityChange {
    pub field: VisibilityField,
    pub was_hidden: bool,
    pub hidden: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Content,
    Statement,
    Bio,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChange {
    pub field: TextField,
    pub previous: String,
    pub new: String,
    pub moderator_edited: bool,
}

pub trait Moderatable {
    fn target_ref(&self) -> TargetRef;

    /// The user responsible for the content, used by user-state actions
    /// taken from a report.
    fn responsible_user(&self) -> Option<i64>;

    /// Set visibility through this target's visibility capability. `None`
    /// means the target has no such capability.
    fn try_set_hidden(&mut self, hidden: bool) -> Option<VisibilityChange>;

    fn text(&self) -> Option<&str>;

    /// Overwrite the designated text field. `None` when the target has no
    /// text capability or the text is already equal.
    fn try_set_text(&mut self, text: &str) -> Option<TextChange>;
}

fn replace_text(
    field: TextField,
    slot: &mut String,
    text: &str,
    edited_flag: Option<&mut bool>,
) -> Option<TextChange> {
    if slot == text {
        return None;
    }
    let previous = std::mem::replace(slot, text.to_string());
    let moderator_edited = match edited_flag {
        Some(flag) => {
            *flag = true;
            true
        }
        None => false,
    };
    Some(TextChange {
        field,
        previous,
        new: text.to_string(),
        moderator_edited,
    })
}

impl Moderatable for Comment {
    fn target_ref(&self) -> TargetRef {
        TargetRef::new(TargetKind::Comment, self.comment_id)
    }

    fn responsible_user(&self) -> Option<i64> {
        Some(self.author_id)
    }

    fn try_set_hidden(&mut self, hidden: bool) -> Option<VisibilityChange> {
        let was_hidden = std::mem::replace(&mut self.is_hidden, hidden);
        Some(VisibilityChange {
            field: VisibilityField::HiddenFlag,
            was_hidden,
            hidden,
        })
    }

    fn text(&self) -> Option<&str> {
        Some(&self.content)
    }

    fn try_set_text(&mut self, text: &str) -> Option<TextChange> {
        replace_text(
            TextField::Content,
            &mut self.content,
            text,
            Some(&mut self.is_moderator_edited),
        )
    }
}

impl Moderatable for Solution {
    fn target_ref(&self) -> TargetRef {
        TargetRef::new(TargetKind::Solution, self.solution_id)
    }

    fn responsible_user(&self) -> Option<i64> {
        Some(self.author_id)
    }

    fn try_set_hidden(&mut self, hidden: bool) -> Option<VisibilityChange> {
        let was_hidden = std::mem::replace(&mut self.is_hidden, hidden);
        Some(VisibilityChange {
            field: VisibilityField::HiddenFlag,
            was_hidden,
            hidden,
        })
    }

    fn text(&self) -> Option<&str> {
        Some(&self.content)
    }

    fn try_set_text(&mut self, text: &str) -> Option<TextChange> {
        replace_text(
            TextField::Content,
            &mut self.content,
            text,
            Some(&mut self.is_moderator_edited),
        )
    }
}

impl Moderatable for Problem {
    fn target_ref(&self) -> TargetRef {
        TargetRef::new(TargetKind::Problem, self.problem_id)
    }

    // Archived problems have no author.
    fn responsible_user(&self) -> Option<i64> {
        None
    }

    fn try_set_hidden(&mut self, hidden: bool) -> Option<VisibilityChange> {
        let was_hidden = self.status == ProblemStatus::Hidden;
        self.status = if hidden {
            ProblemStatus::Hidden
        } else {
            ProblemStatus::Active
        };
        Some(VisibilityChange {
            field: VisibilityField::Status,
            was_hidden,
            hidden,
        })
    }

    fn text(&self) -> Option<&str> {
        Some(&self.statement)
    }

    /// Keeps `statement_plaintext` in step with the new statement.
    fn try_set_text(&mut self, text: &str) -> Option<TextChange> {
        let change = replace_text(TextField::Statement, &mut self.statement, text, None)?;
        self.statement_plaintext = normalize_to_plaintext(&self.statement, self.statement_format);
        Some(change)
    }
}

impl Moderatable for User {
    fn target_ref(&self) -> TargetRef {
        TargetRef::new(TargetKind::Profile, self.user_id)
    }

    fn responsible_user(&self) -> Option<i64> {
        Some(self.user_id)
    }

    fn try_set_hidden(&mut self, hidden: bool) -> Option<VisibilityChange> {
        let was_hidden = std::mem::replace(&mut self.is_profile_hidden, hidden);
        Some(VisibilityChange {
            field: VisibilityField::ProfileHidden,
            was_hidden,
            hidden,
        })
    }

    fn text(&self) -> Option<&str> {
        Some(&self.bio)
    }

    fn try_set_text(&mut self, text: &str) -> Option<TextChange> {
        replace_text(TextField::Bio, &mut self.bio, text, None)
    }
}

/// A loaded moderation target.
#[derive(Debug, Clone)]
pub enum ContentTarget {
    Comment(Comment),
    Solution(Solution),
    Problem(Problem),
    Profile(User),
}

impl ContentTarget {
    fn inner(&self) -> &dyn Moderatable {
        match self {
            ContentTarget::Comment(c) => c,
            ContentTarget::Solution(s) => s,
            ContentTarget::Problem(p) => p,
            ContentTarget::Profile(u) => u,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Moderatable {
        match self {
            ContentTarget::Comment(c) => c,
            ContentTarget::Solution(s) => s,
            ContentTarget::Problem(p) => p,
            ContentTarget::Profile(u) => u,
        }
    }
}

impl Moderatable for ContentTarget {
    fn target_ref(&self) -> TargetRef {
        self.inner().target_ref()
    }

    fn responsible_user(&self) -> Option<i64> {
        self.inner().responsible_user()
    }

    fn try_set_hidden(&mut self, hidden: bool) -> Option<VisibilityChange> {
        self.inner_mut().try_set_hidden(hidden)
    }

    fn text(&self) -> Option<&str> {
        self.inner().text()
    }

    fn try_set_text(&mut self, text: &str) -> Option<TextChange> {
        self.inner_mut().try_set_text(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StatementFormat;
    use chrono::Utc;

    fn comment() -> Comment {
        Comment {
            comment_id: 7,
            problem_id: Some(1),
            solution_id: None,
            author_id: 3,
            content: "original".to_string(),
            is_hidden: false,
            is_moderator_edited: false,
            created_at: Utc::now(),
        }
    }

    fn problem() -> Problem {
        Problem {
            problem_id: 9,
            label: "P1".to_string(),
            title: "Sample".to_string(),
            statement: "Prove it.".to_string(),
            statement_format: StatementFormat::Plain,
            statement_plaintext: "Prove it.".to_string(),
            editorial_difficulty: 3,
            status: ProblemStatus::Active,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_comment_hides_through_flag() {
        let mut target = ContentTarget::Comment(comment());
        let change = target.try_set_hidden(true).unwrap();
        assert_eq!(change.field, VisibilityField::HiddenFlag);
        assert!(!change.was_hidden);

        let again = target.try_set_hidden(true).unwrap();
        assert!(again.was_hidden);
        assert!(matches!(target, ContentTarget::Comment(ref c) if c.is_hidden));
    }

    #[test]
    fn test_problem_hides_through_status() {
        let mut target = ContentTarget::Problem(problem());
        let change = target.try_set_hidden(true).unwrap();
        assert_eq!(change.field, VisibilityField::Status);
        assert!(matches!(target, ContentTarget::Problem(ref p) if p.status == ProblemStatus::Hidden));

        target.try_set_hidden(false);
        assert!(matches!(target, ContentTarget::Problem(ref p) if p.status == ProblemStatus::Active));
    }

    #[test]
    fn test_redact_sets_moderator_flag_when_supported() {
        let mut c = comment();
        let change = c.try_set_text("[redacted]").unwrap();
        assert_eq!(change.previous, "original");
        assert!(change.moderator_edited);
        assert!(c.is_moderator_edited);

        let mut p = problem();
        let change = p.try_set_text("New statement").unwrap();
        assert_eq!(change.field, TextField::Statement);
        assert!(!change.moderator_edited);
        assert_eq!(p.statement_plaintext, "New statement");
    }

    #[test]
    fn test_equal_text_is_not_a_change() {
        let mut c = comment();
        assert!(c.try_set_text("original").is_none());
        assert!(!c.is_moderator_edited);
    }

    #[test]
    fn test_target_ref_display() {
        assert_eq!(comment().target_ref().to_string(), "comment#7");
    }
}
