use lazy_static::lazy_static;
use regex::Regex;

use crate::models::StatementFormat;

lazy_static! {
    static ref MACRO: Regex =
        Regex::new(r"\\[a-zA-Z]+\*?(?:\[[^\]]*\])?(?:\{[^{}]*\})?").expect("Invalid macro regex");
    static ref MARKUP: Regex = Regex::new(r"[$`*_#~]").expect("Invalid markup regex");
    static ref GROUPING: Regex = Regex::new(r"[{}\\]").expect("Invalid grouping regex");
    static ref WHITESPACE: Regex = Regex::new(r"\s+").expect("Invalid whitespace regex");
}

/// Reduce a statement to searchable text. Macros are dropped together with
/// their first optional and first required argument.
pub fn normalize_to_plaintext(source: &str, format: StatementFormat) -> String {
    if format == StatementFormat::Plain {
        return source.trim().to_string();
    }

    let text = MACRO.replace_all(source, " ");
    let text = MARKUP.replace_all(&text, " ");
    let text = GROUPING.replace_all(&text, " ");
    let text = WHITESPACE.replace_all(&text, " ");

    text.trim().to_string()
}
