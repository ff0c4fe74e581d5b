//! OAuth2 token acquisition for the Microsoft identity platform.
//!
//! [`TokenProvider`] is the seam between the HTTP layer and authentication:
//! anything with `get_token` and `invalidate` qualifies. The default
//! implementation, [`ClientCredentialsTokenProvider`], performs the
//! server-to-server client-credentials grant and caches tokens in memory per
//! scope. Tokens are never refreshed automatically; callers that hit an auth
//! failure invalidate the scope and retry.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;
use url::Url;

use crate::sharepoint::config::SharePointConfig;
use crate::sharepoint::error::{Result, SharePointError};

/// A source of OAuth2 bearer tokens, keyed by scope.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Return a valid bearer token for `scope`.
    async fn get_token(&self, scope: &str) -> Result<String>;

    /// Drop the cached token for `scope` so the next call re-authenticates.
    async fn invalidate(&self, scope: &str);
}

/// Fetches and caches tokens via the OAuth2 client-credentials grant.
///
/// The cache is keyed by scope string (the Graph scope and each
/// site-specific scope are separate entries) and is only ever evicted by an
/// explicit [`invalidate`](TokenProvider::invalidate) call.
pub struct ClientCredentialsTokenProvider {
    http: reqwest::Client,
    token_url: Url,
    client_id: String,
    client_secret: String,
    cache: Mutex<HashMap<String, String>>,
}

impl std::fmt::Debug for ClientCredentialsTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentialsTokenProvider")
            .field("token_url", &self.token_url.as_str())
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
}

impl ClientCredentialsTokenProvider {
    /// Build a provider for the tenant in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token endpoint URL cannot be constructed or
    /// the HTTP client cannot be built.
    pub fn new(config: &SharePointConfig) -> Result<Self> {
        let token_url = config
            .login_base_url
            .join(&format!("{}/oauth2/v2.0/token", config.tenant_id))?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(SharePointError::Http)?;
        Ok(Self {
            http,
            token_url,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            cache: Mutex::new(HashMap::new()),
        })
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_token(&self, scope: &str) -> Result<String> {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type", "client_credentials"),
            ("scope", scope),
        ];
        let response = self
            .http
            .post(self.token_url.clone())
            .form(&params)
            .send()
            .await
            .map_err(SharePointError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SharePointError::Authentication(format!(
                "token request failed (HTTP {}): {body}",
                status.as_u16()
            )));
        }

        let body: TokenResponse = response.json().await.map_err(SharePointError::Http)?;
        body.access_token.ok_or_else(|| {
            SharePointError::Authentication("no access_token in OAuth2 response".to_string())
        })
    }
}

#[async_trait]
impl TokenProvider for ClientCredentialsTokenProvider {
    async fn get_token(&self, scope: &str) -> Result<String> {
        {
            let cache = self.cache.lock().await;
            if let Some(token) = cache.get(scope) {
                return Ok(token.clone());
            }
        }
        let token = self.fetch_token(scope).await?;
        let mut cache = self.cache.lock().await;
        cache.insert(scope.to_string(), token.clone());
        Ok(token)
    }

    async fn invalidate(&self, scope: &str) {
        self.cache.lock().await.remove(scope);
    }
}
