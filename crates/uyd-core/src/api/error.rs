use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::auth::StoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP error! status: {status}")]
    Status {
        status: StatusCode,
        detail: Option<String>,
        body: String,
    },

    #[error("No refresh token available")]
    MissingCredential,

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Credential store error: {0}")]
    Store(#[from] StoreError),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let cut = (0..=MAX_ERROR_BODY_LENGTH)
                .rev()
                .find(|&i| body.is_char_boundary(i))
                .unwrap_or(0);
            format!("{}... (truncated, {} total bytes)", &body[..cut], body.len())
        }
    }

    /// Pull the `detail` field out of an error body.
    /// The backend sends either a plain string or a list of validation issues.
    fn parse_detail(body: &str) -> Option<String> {
        match serde_json::from_str::<Value>(body).ok()?.get("detail")? {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    pub fn from_status(status: StatusCode, body: &str) -> Self {
        ApiError::Status {
            status,
            detail: Self::parse_detail(body),
            body: Self::truncate_body(body),
        }
    }

    /// HTTP status for errors that came back from the server
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::NetworkError(e) => e.status(),
            _ => None,
        }
    }

    /// Server-supplied `detail` message, if any
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}
