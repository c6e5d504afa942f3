pub mod config;
pub mod error;
pub mod ingestion;
pub mod statement;

pub use config::Config;
pub use error::{IngestError, Result};
pub use statement::{LintIssue, lint, normalize_to_plaintext};
