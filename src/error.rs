use thiserror::Error;
use uuid::Uuid;

use crate::llm::ProviderError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Analysis not found: {0}")]
    NotFound(String),

    #[error("Analysis {0} is already recorded")]
    DuplicateReport(Uuid),

    #[error("Every requested dimension failed for analysis {request_id}")]
    TotalFailure { request_id: Uuid },

    #[error("Analysis {request_id} cannot be used: {reason}")]
    ReportUnusable { request_id: Uuid, reason: String },

    #[error("Analysis {0} was cancelled")]
    Cancelled(Uuid),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Errors the caller caused, as opposed to failures of the service or its providers.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidRequest(_)
                | Error::NotFound(_)
                | Error::DuplicateReport(_)
                | Error::ReportUnusable { .. }
        )
    }
}
