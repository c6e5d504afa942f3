use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// User recorded as reviewer / trigger for operations run from the CLI.
    pub operator_id: Option<i64>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let operator_id = match std::env::var("BACKOFFICE_OPERATOR_ID") {
            Ok(raw) => Some(
                raw.parse()
                    .context("BACKOFFICE_OPERATOR_ID must be a user id")?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .context("Cannot load DATABASE_URL env variable")?,
            operator_id,
        })
    }
}
