//! Low-level HTTP clients for the Microsoft Graph API and the SharePoint
//! REST API.
//!
//! Both share one [`TokenProvider`] but request tokens for different scopes:
//! [`GraphClient`] uses the Graph scope, [`RestClient`] a per-hostname
//! SharePoint scope. The REST client exists only for operations Graph does
//! not expose, such as reading site role assignments and group memberships.

use std::sync::Arc;

use reqwest::Response;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::sharepoint::auth::TokenProvider;
use crate::sharepoint::config::SharePointConfig;
use crate::sharepoint::error::{Result, SharePointError};

/// OAuth2 scope for Microsoft Graph.
pub const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

const USER_AGENT: &str = concat!("collabapi/", env!("CARGO_PKG_VERSION"));

/// Maximum number of pages [`GraphClient::get_paged`] will follow.
const MAX_PAGES: u32 = 1000;

/// Thin HTTP wrapper around the Microsoft Graph API.
///
/// Attaches bearer tokens to every request, follows `@odata.nextLink`
/// pagination in [`get_paged`](Self::get_paged), and maps HTTP error codes
/// to typed errors.
#[derive(Clone)]
pub struct GraphClient {
    http: reqwest::Client,
    base_url: Url,
    tokens: Arc<dyn TokenProvider>,
}

impl std::fmt::Debug for GraphClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct PagedResponse<T> {
    #[serde(default = "Vec::new")]
    value: Vec<T>,
    #[serde(rename = "@odata.nextLink", default)]
    next_link: Option<String>,
}

impl GraphClient {
    pub fn new(config: &SharePointConfig, tokens: Arc<dyn TokenProvider>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(SharePointError::Http)?;
        Ok(Self {
            http,
            base_url: config.graph_base_url.clone(),
            tokens,
        })
    }

    fn url(&self, endpoint: &str) -> Result<Url> {
        Ok(self.base_url.join(endpoint.trim_start_matches('/'))?)
    }

    async fn bearer(&self) -> Result<String> {
        self.tokens.get_token(GRAPH_SCOPE).await
    }

    /// Perform a GET and deserialize the JSON body.
    #[tracing::instrument(skip(self))]
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let response = self
            .http
            .get(self.url(endpoint)?)
            .bearer_auth(self.bearer().await?)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(SharePointError::Http)?;
        let response = check_response(response).await?;
        response.json().await.map_err(SharePointError::Http)
    }

    /// Retrieve all pages of a Graph collection.
    ///
    /// Follows `@odata.nextLink` until absent and merges the `value` arrays
    /// into one list, preserving server order. One request is in flight at a
    /// time.
    #[tracing::instrument(skip(self))]
    pub async fn get_paged<T: DeserializeOwned>(&self, endpoint: &str) -> Result<Vec<T>> {
        let mut url = Some(self.url(endpoint)?);
        let mut items = Vec::new();
        let mut pages = 0u32;

        while let Some(current) = url.take() {
            let response = self
                .http
                .get(current)
                .bearer_auth(self.bearer().await?)
                .header("Accept", "application/json")
                .send()
                .await
                .map_err(SharePointError::Http)?;
            let response = check_response(response).await?;
            let body: PagedResponse<T> = response.json().await.map_err(SharePointError::Http)?;
            items.extend(body.value);

            pages += 1;
            // Safety limit to prevent infinite loops
            if pages >= MAX_PAGES {
                tracing::warn!("Reached pagination limit of {} pages, stopping", MAX_PAGES);
                break;
            }
            url = match body.next_link {
                Some(next) => Some(Url::parse(&next)?),
                None => None,
            };
        }
        Ok(items)
    }

    /// Perform a PUT with a binary body and deserialize the JSON response.
    #[tracing::instrument(skip(self, data))]
    pub async fn put_bytes<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<T> {
        let response = self
            .http
            .put(self.url(endpoint)?)
            .bearer_auth(self.bearer().await?)
            .header("Content-Type", content_type)
            .header("Accept", "application/json")
            .body(data)
            .send()
            .await
            .map_err(SharePointError::Http)?;
        let response = check_response(response).await?;
        response.json().await.map_err(SharePointError::Http)
    }

    /// Perform a GET and return the raw body bytes.
    ///
    /// Redirects are followed: Graph content reads commonly redirect to
    /// pre-authenticated blob-storage URLs.
    #[tracing::instrument(skip(self))]
    pub async fn get_raw(&self, endpoint: &str) -> Result<Vec<u8>> {
        let response = self
            .http
            .get(self.url(endpoint)?)
            .bearer_auth(self.bearer().await?)
            .send()
            .await
            .map_err(SharePointError::Http)?;
        let response = check_response(response).await?;
        Ok(response.bytes().await.map_err(SharePointError::Http)?.to_vec())
    }
}

/// HTTP client for the SharePoint REST API (`/_api/...` endpoints).
pub struct RestClient {
    http: reqwest::Client,
    tokens: Arc<dyn TokenProvider>,
    base_url: String,
    scope: String,
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl RestClient {
    /// Build a REST client for one SharePoint hostname.
    ///
    /// The token scope is always derived from `hostname`; the base URL can
    /// be overridden through the configuration for testing.
    pub fn new(
        config: &SharePointConfig,
        tokens: Arc<dyn TokenProvider>,
        hostname: &str,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(SharePointError::Http)?;
        let base_url = match &config.rest_base_url {
            Some(url) => url.as_str().trim_end_matches('/').to_string(),
            None => format!("https://{hostname}"),
        };
        Ok(Self {
            http,
            tokens,
            base_url,
            scope: format!("https://{hostname}/.default"),
        })
    }

    /// Perform a GET against `{base}{site_path}{api_path}` and return the
    /// parsed JSON payload.
    #[tracing::instrument(skip(self))]
    pub async fn get_value(&self, site_path: &str, api_path: &str) -> Result<Value> {
        let url = Url::parse(&format!("{}{site_path}{api_path}", self.base_url))?;
        let token = self.tokens.get_token(&self.scope).await?;
        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .header("Accept", "application/json;odata=nometadata")
            .send()
            .await
            .map_err(SharePointError::Http)?;
        let response = check_response(response).await?;
        response.json().await.map_err(SharePointError::Http)
    }

    /// Perform a GET and extract the list portion of the response.
    ///
    /// Handles both OData v4 (`{"value": [...]}`) and OData v3
    /// (`{"d": {"results": [...]}}`) shapes.
    pub async fn get_list(&self, site_path: &str, api_path: &str) -> Result<Vec<Value>> {
        let payload = self.get_value(site_path, api_path).await?;
        if let Some(items) = payload.get("value").and_then(Value::as_array) {
            return Ok(items.clone());
        }
        Ok(payload
            .get("d")
            .and_then(|d| d.get("results"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }
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
        return Err(SharePointError::RateLimited {
            retry_after_secs: retry_after,
        });
    }

    let code = status.as_u16();
    let message = extract_error_message(response, status).await;

    Err(match code {
        401 | 403 => SharePointError::Forbidden {
            status: code,
            message,
        },
        404 => SharePointError::NotFound { message },
        _ => SharePointError::Api {
            status: code,
            message,
        },
    })
}

/// Extract an error message from a failed response body.
///
/// Graph wraps errors as `{"error": {"message": "..."}}`; SharePoint REST
/// uses `{"odata.error": {"message": {"value": "..."}}}`.
async fn extract_error_message(response: Response, status: reqwest::StatusCode) -> String {
    let body = match response.text().await {
        Ok(b) => b,
        Err(_) => return format!("HTTP {status}"),
    };

    if let Ok(json) = serde_json::from_str::<Value>(&body) {
        if let Some(message) = json
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str)
        {
            return message.to_string();
        }
        if let Some(message) = json
            .get("odata.error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.get("value"))
            .and_then(Value::as_str)
        {
            return message.to_string();
        }
    }

    if body.is_empty() {
        format!("HTTP {status}")
    } else {
        body
    }
}
