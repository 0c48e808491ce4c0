//! Error types for the migration.
//!
//! Most failures are caught and logged where they happen (a table that cannot
//! be exported, a record the Worker rejects). The ones that escape to `main`
//! abort the run.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Non-success HTTP status from either backend.
    #[error("HTTP {status} from {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    /// A source row lacks a field the import cannot do without.
    #[error("{table} row is missing required field '{field}'")]
    MissingField {
        table: &'static str,
        field: &'static str,
    },
}

impl MigrationError {
    pub fn missing_field(table: &'static str, field: &'static str) -> Self {
        Self::MissingField { table, field }
    }
}

pub type Result<T> = std::result::Result<T, MigrationError>;
