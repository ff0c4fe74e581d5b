//! Jira API client.
//!
//! Low-level HTTP client that handles authentication and raw requests.
//! Higher-level operations are implemented via traits on entity types.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use url::Url;

use crate::jira::config::{AuthType, JiraConfig};
use crate::jira::error::{JiraError, Result};

const USER_AGENT: &str = concat!("collabapi/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Low-level Jira Cloud API client.
///
/// Handles authentication and HTTP requests. Entity-specific operations
/// are implemented via the `Get`, `List`, `Create`, `Update`, and `Delete`
/// traits on model types.
///
/// This struct is cheaply cloneable; clones reference the same underlying
/// connection pool.
///
/// # Example
///
/// ```no_run
/// use collabapi::jira::{JiraClient, JiraConfig};
///
/// # async fn example() -> collabapi::jira::Result<()> {
/// let client = JiraClient::from_env()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct JiraClient {
    http: Client,
    base_url: Arc<Url>,
    config: Arc<JiraConfig>,
}

impl std::fmt::Debug for JiraClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraClient")
            .field("base_url", &self.base_url.as_str())
            .field("auth_type", &self.config.auth_type)
            .finish_non_exhaustive()
    }
}

impl JiraClient {
    /// Create a client from environment variables.
    ///
    /// See [`JiraConfig::from_env`] for the variable set.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is missing.
    pub fn from_env() -> Result<Self> {
        Self::new(JiraConfig::from_env()?)
    }

    /// Create a new client from an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot be constructed.
    pub fn new(config: JiraConfig) -> Result<Self> {
        let base_url = config.base_url()?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(JiraError::Http)?;

        Ok(Self {
            http,
            base_url: Arc::new(base_url),
            config: Arc::new(config),
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The configuration this client was built from.
    pub fn config(&self) -> &JiraConfig {
        &self.config
    }

    /// Apply the configured authentication mode to a request.
    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.config.auth_type {
            AuthType::Bearer => builder.bearer_auth(&self.config.api_token),
            AuthType::Basic => {
                builder.basic_auth(&self.config.email, Some(&self.config.api_token))
            }
        }
    }

    /// Make a GET request.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = self.base_url.join(path)?;
        let response = self
            .authed(self.http.get(url))
            .send()
            .await
            .map_err(JiraError::Http)?;
        Self::check_response(response).await
    }

    /// Make a GET request with query parameters.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_with_query<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<Response> {
        let url = self.base_url.join(path)?;
        let response = self
            .authed(self.http.get(url))
            .query(query)
            .send()
            .await
            .map_err(JiraError::Http)?;
        Self::check_response(response).await
    }

    /// Make a POST request with a JSON body.
    #[tracing::instrument(skip(self, body))]
    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response> {
        let url = self.base_url.join(path)?;
        let response = self
            .authed(self.http.post(url))
            .json(body)
            .send()
            .await
            .map_err(JiraError::Http)?;
        Self::check_response(response).await
    }

    /// Make a PUT request with a JSON body.
    #[tracing::instrument(skip(self, body))]
    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response> {
        let url = self.base_url.join(path)?;
        let response = self
            .authed(self.http.put(url))
            .json(body)
            .send()
            .await
            .map_err(JiraError::Http)?;
        Self::check_response(response).await
    }

    /// Make a DELETE request.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, path: &str) -> Result<Response> {
        let url = self.base_url.join(path)?;
        let response = self
            .authed(self.http.delete(url))
            .send()
            .await
            .map_err(JiraError::Http)?;
        Self::check_response(response).await
    }

    /// Make a DELETE request with query parameters.
    #[tracing::instrument(skip(self, query))]
    pub async fn delete_with_query<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<Response> {
        let url = self.base_url.join(path)?;
        let response = self
            .authed(self.http.delete(url))
            .query(query)
            .send()
            .await
            .map_err(JiraError::Http)?;
        Self::check_response(response).await
    }

    /// Check response status and convert errors.
    async fn check_response(response: Response) -> Result<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(JiraError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        let code = status.as_u16();
        let message = Self::extract_error_message(response, status).await;

        Err(match code {
            401 | 403 => JiraError::Auth {
                status: code,
                message,
            },
            404 => JiraError::NotFound { message },
            400 => JiraError::Validation { message },
            _ => JiraError::Api {
                status: code,
                message,
            },
        })
    }

    /// Extract error message from a failed response.
    ///
    /// Jira error bodies carry either an `errorMessages` array or an
    /// `errors` object keyed by field name.
    async fn extract_error_message(response: Response, status: reqwest::StatusCode) -> String {
        let body = match response.text().await {
            Ok(b) => b,
            Err(_) => return format!("HTTP {status}"),
        };

        if let Ok(json) = serde_json::from_str::<serde_json::Value>(&body) {
            let mut parts: Vec<String> = Vec::new();
            if let Some(messages) = json.get("errorMessages").and_then(|m| m.as_array()) {
                parts.extend(messages.iter().filter_map(|m| m.as_str()).map(String::from));
            }
            if let Some(errors) = json.get("errors").and_then(|e| e.as_object()) {
                parts.extend(
                    errors
                        .iter()
                        .filter_map(|(field, msg)| msg.as_str().map(|m| format!("{field}: {m}"))),
                );
            }
            if !parts.is_empty() {
                return parts.join("; ");
            }
        }

        if body.is_empty() {
            format!("HTTP {status}")
        } else {
            body
        }
    }
}
