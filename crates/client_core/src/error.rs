use shared::error::{ApiError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiClientError {
    #[error("invalid api base url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} answered {status}: {error}")]
    Status {
        endpoint: String,
        status: u16,
        error: ApiError,
    },
    #[error("unexpected response shape from {endpoint}: {source}")]
    Schema {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid request: {0}")]
    Validation(String),
}

impl ApiClientError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ApiClientError::Status { error, .. } => error.code,
            ApiClientError::Validation(_) => ErrorCode::Validation,
            _ => ErrorCode::Internal,
        }
    }

    pub fn is_schema_mismatch(&self) -> bool {
        matches!(self, ApiClientError::Schema { .. })
    }
}
