//! Statement hygiene for TeX-flavoured problem text.
//!
//! `lint` reports problems without touching the source; `normalize_to_plaintext`
//! produces the search/preview text stored next to every statement.

mod lint;

pub use lint::{DISALLOWED_COMMANDS, LintIssue, lint};
pub use storage::plaintext::normalize_to_plaintext;
