//! SharePoint / Microsoft Graph connection configuration.

use std::env;
use std::time::Duration;

use url::Url;

use crate::sharepoint::error::{Result, SharePointError};

const DEFAULT_GRAPH_URL: &str = "https://graph.microsoft.com/v1.0/";
const DEFAULT_LOGIN_URL: &str = "https://login.microsoftonline.com/";

/// Credentials and runtime settings for [`SharePointClient`].
///
/// [`SharePointClient`]: crate::sharepoint::SharePointClient
#[derive(Debug, Clone)]
pub struct SharePointConfig {
    /// Azure AD tenant ID (GUID).
    pub tenant_id: String,
    /// App registration client ID (GUID).
    pub client_id: String,
    /// Client secret for the app registration.
    pub client_secret: String,
    /// Per-request wall-clock timeout.
    pub timeout: Duration,
    /// Graph API base URL.
    pub graph_base_url: Url,
    /// Identity-provider base URL for token requests.
    pub login_base_url: Url,
    /// Override for the SharePoint REST base URL. When `None`, it is derived
    /// from the hostname of each call as `https://{hostname}`. Primarily
    /// useful for pointing at a mock server.
    pub rest_base_url: Option<Url>,
}

impl SharePointConfig {
    /// Build a configuration with default endpoints and timeout.
    pub fn new(tenant_id: &str, client_id: &str, client_secret: &str) -> Self {
        Self {
            tenant_id: tenant_id.to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            timeout: Duration::from_secs(30),
            graph_base_url: Url::parse(DEFAULT_GRAPH_URL).expect("default Graph URL is valid"),
            login_base_url: Url::parse(DEFAULT_LOGIN_URL).expect("default login URL is valid"),
            rest_base_url: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Required: `SHAREPOINT_TENANT_ID`, `SHAREPOINT_CLIENT_ID`,
    /// `SHAREPOINT_CLIENT_SECRET`. Optional endpoint overrides:
    /// `SHAREPOINT_GRAPH_URL`, `SHAREPOINT_LOGIN_URL`, `SHAREPOINT_REST_URL`.
    ///
    /// # Errors
    ///
    /// Returns [`SharePointError::ConfigMissing`] naming every absent
    /// required variable.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let tenant_id = get("SHAREPOINT_TENANT_ID");
        let client_id = get("SHAREPOINT_CLIENT_ID");
        let client_secret = get("SHAREPOINT_CLIENT_SECRET");

        let missing: Vec<&str> = [
            ("SHAREPOINT_TENANT_ID", tenant_id.is_none()),
            ("SHAREPOINT_CLIENT_ID", client_id.is_none()),
            ("SHAREPOINT_CLIENT_SECRET", client_secret.is_none()),
        ]
        .iter()
        .filter_map(|(name, absent)| absent.then_some(*name))
        .collect();

        if !missing.is_empty() {
            return Err(SharePointError::ConfigMissing(format!(
                "missing environment variables: {}",
                missing.join(", ")
            )));
        }

        let parse_base = |raw: String| -> Result<Url> {
            let with_slash = if raw.ends_with('/') { raw } else { format!("{raw}/") };
            Ok(Url::parse(&with_slash)?)
        };

        let mut config = Self::new(
            &tenant_id.unwrap_or_default(),
            &client_id.unwrap_or_default(),
            &client_secret.unwrap_or_default(),
        );
        if let Some(raw) = get("SHAREPOINT_GRAPH_URL") {
            config.graph_base_url = parse_base(raw)?;
        }
        if let Some(raw) = get("SHAREPOINT_LOGIN_URL") {
            config.login_base_url = parse_base(raw)?;
        }
        if let Some(raw) = get("SHAREPOINT_REST_URL") {
            config.rest_base_url = Some(parse_base(raw)?);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        let map: HashMap<&str, &str> = vars.iter().copied().collect();
        move |name| map.get(name).map(|v| (*v).to_string())
    }

    #[test]
    fn test_all_missing_variables_listed() {
        let err = SharePointConfig::from_lookup(lookup(&[])).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("SHAREPOINT_TENANT_ID"));
        assert!(message.contains("SHAREPOINT_CLIENT_ID"));
        assert!(message.contains("SHAREPOINT_CLIENT_SECRET"));
    }

    #[test]
    fn test_default_endpoints() {
        let config = SharePointConfig::from_lookup(lookup(&[
            ("SHAREPOINT_TENANT_ID", "tenant"),
            ("SHAREPOINT_CLIENT_ID", "client"),
            ("SHAREPOINT_CLIENT_SECRET", "secret"),
        ]))
        .unwrap();
        assert_eq!(config.graph_base_url.as_str(), DEFAULT_GRAPH_URL);
        assert_eq!(config.login_base_url.as_str(), DEFAULT_LOGIN_URL);
        assert!(config.rest_base_url.is_none());
    }

    #[test]
    fn test_endpoint_overrides() {
        let config = SharePointConfig::from_lookup(lookup(&[
            ("SHAREPOINT_TENANT_ID", "tenant"),
            ("SHAREPOINT_CLIENT_ID", "client"),
            ("SHAREPOINT_CLIENT_SECRET", "secret"),
            ("SHAREPOINT_GRAPH_URL", "http://127.0.0.1:9000/v1.0"),
            ("SHAREPOINT_REST_URL", "http://127.0.0.1:9001"),
        ]))
        .unwrap();
        assert_eq!(config.graph_base_url.as_str(), "http://127.0.0.1:9000/v1.0/");
        assert_eq!(
            config.rest_base_url.unwrap().as_str(),
            "http://127.0.0.1:9001/"
        );
    }
}
