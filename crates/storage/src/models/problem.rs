use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemStatus {
    Active,
    Hidden,
    Experimental,
}

text_enum!(ProblemStatus, "problem status" {
    Active => "active",
    Hidden => "hidden",
    Experimental => "experimental",
});

/// Markup a problem statement is written in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementFormat {
    #[default]
    Plain,
    Latex,
    MarkdownTex,
}

text_enum!(StatementFormat, "statement format" {
    Plain => "plain",
    Latex => "latex",
    MarkdownTex => "markdown_tex",
});

impl StatementFormat {
    /// Whether the source may contain TeX macros.
    pub fn is_tex(&self) -> bool {
        matches!(self, StatementFormat::Latex | StatementFormat::MarkdownTex)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Problem {
    pub problem_id: i64,
    pub label: String,
    pub title: String,
    pub statement: String,
    #[sqlx(try_from = "String")]
    pub statement_format: StatementFormat,
    pub statement_plaintext: String,
    pub editorial_difficulty: i64,
    #[sqlx(try_from = "String")]
    pub status: ProblemStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProblem {
    pub label: String,
    pub title: String,
    pub statement: String,
    pub statement_format: StatementFormat,
    pub statement_plaintext: String,
    pub editorial_difficulty: i64,
}
