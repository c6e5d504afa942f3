use std::fmt;

use serde::Serialize;
use storage::models::StatementFormat;

/// Commands that can reach the filesystem or shell when a statement is
/// compiled.
pub const DISALLOWED_COMMANDS: [&str; 5] = [r"\write18", r"\input", r"\include", r"\openout", r"\read"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "command", rename_all = "snake_case")]
pub enum LintIssue {
    NullByte,
    DisallowedCommand(&'static str),
    UnbalancedBraces,
}

impl fmt::Display for LintIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LintIssue::NullByte => f.write_str("LaTeX content contains a null byte."),
            LintIssue::DisallowedCommand(command) => {
                write!(f, "Disallowed LaTeX command detected: {command}")
            }
            LintIssue::UnbalancedBraces => f.write_str("Unbalanced braces in LaTeX content."),
        }
    }
}

/// Check a statement for content that must not be published. Plain text is
/// never linted.
pub fn lint(source: &str, format: StatementFormat) -> Vec<LintIssue> {
    if !format.is_tex() {
        return Vec::new();
    }

    let mut issues = Vec::new();

    if source.contains('\0') {
        issues.push(LintIssue::NullByte);
    }

    for command in DISALLOWED_COMMANDS {
        if source.contains(command) {
            issues.push(LintIssue::DisallowedCommand(command));
        }
    }

    if !braces_balanced(source) {
        issues.push(LintIssue::UnbalancedBraces);
    }

    issues
}

/// A backslash escapes the following character, so `\{` and `\}` are not
/// counted. A closing brace with nothing open fails immediately.
fn braces_balanced(source: &str) -> bool {
    let mut depth: i64 = 0;
    let mut escaped = false;

    for ch in source.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }

    depth == 0
}
