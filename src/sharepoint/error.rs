//! Error types for SharePoint / Microsoft Graph operations.

use thiserror::Error;

/// Errors that can occur during SharePoint or Graph API operations.
#[derive(Debug, Error)]
pub enum SharePointError {
    /// Configuration is missing or incomplete.
    #[error("SharePoint configuration required: {0}")]
    ConfigMissing(String),

    /// OAuth2 token acquisition failed.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The request was rejected as unauthenticated or unauthorized (401/403).
    #[error("Access denied ({status}): {message}")]
    Forbidden { status: u16, message: String },

    /// The requested resource does not exist (HTTP 404).
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// A request parameter failed local validation; no network call was made.
    #[error("Invalid argument: {0}")]
    Validation(String),

    /// API rate limit exceeded (HTTP 429).
    #[error("Rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    /// API request failed with an unexpected status.
    #[error("API error ({status}): {message}")]
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

    /// Local file error during upload/download.
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),
}

impl SharePointError {
    /// The HTTP status code associated with this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Forbidden { status, .. } | Self::Api { status, .. } => Some(*status),
            Self::NotFound { .. } => Some(404),
            Self::RateLimited { .. } => Some(429),
            _ => None,
        }
    }
}

/// Result type alias for SharePoint operations.
pub type Result<T> = core::result::Result<T, SharePointError>;
