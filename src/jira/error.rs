//! Error types for Jira API operations.

use thiserror::Error;

/// Errors that can occur during Jira API operations.
#[derive(Debug, Error)]
pub enum JiraError {
    /// Configuration is missing or incomplete.
    #[error("Jira configuration required: {0}")]
    ConfigMissing(String),

    /// Authentication or authorization failed (HTTP 401/403).
    #[error("Authentication failed ({status}): {message}")]
    Auth { status: u16, message: String },

    /// The requested resource does not exist (HTTP 404).
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// The request payload was rejected by the server (HTTP 400).
    #[error("Bad request: {message}")]
    Validation { message: String },

    /// API rate limit exceeded (HTTP 429).
    #[error("Rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    /// API request failed with an unexpected status.
    #[error("Jira API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl JiraError {
    /// The HTTP status code associated with this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Auth { status, .. } | Self::Api { status, .. } => Some(*status),
            Self::NotFound { .. } => Some(404),
            Self::Validation { .. } => Some(400),
            Self::RateLimited { .. } => Some(429),
            _ => None,
        }
    }
}

/// Result type alias for Jira operations.
pub type Result<T> = core::result::Result<T, JiraError>;
