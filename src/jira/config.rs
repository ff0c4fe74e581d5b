//! Jira Cloud connection configuration.

use std::env;

use url::Url;

use crate::jira::error::{JiraError, Result};

/// How requests to Jira are authenticated.
///
/// Selected by configuration, never auto-detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthType {
    /// Classic API token over HTTP Basic auth (email + token).
    #[default]
    Basic,
    /// OAuth 2.0 / scoped token sent as `Authorization: Bearer <token>`.
    /// Email is not required in this mode.
    Bearer,
}

/// Jira Cloud connection configuration.
///
/// Construct once at startup (usually with [`JiraConfig::from_env`]) and hand
/// it to [`JiraClient::new`](crate::jira::JiraClient::new).
#[derive(Debug, Clone)]
pub struct JiraConfig {
    /// Jira Cloud domain, e.g. `your-org.atlassian.net`.
    pub domain: String,
    /// API token (or bearer token, depending on `auth_type`).
    pub api_token: String,
    /// Account email; required for basic auth.
    pub email: String,
    /// Authentication mode.
    pub auth_type: AuthType,
    /// Project key used as default by search helpers.
    pub default_project: Option<String>,
    /// Full base URL override. When set, `domain` is only informational.
    /// Primarily useful for pointing at a mock server.
    pub base_url: Option<Url>,
}

impl JiraConfig {
    /// Load configuration from environment variables.
    ///
    /// Required: `JIRA_DOMAIN`, `JIRA_API_TOKEN`, and `JIRA_EMAIL` when
    /// `JIRA_AUTH_TYPE` is `basic` (the default). Optional: `JIRA_PROJECT`,
    /// `JIRA_BASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns [`JiraError::ConfigMissing`] naming every absent required
    /// variable.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// `from_env` passes `std::env::var`; tests pass a map.
    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let domain = get("JIRA_DOMAIN");
        let api_token = get("JIRA_API_TOKEN");
        let email = get("JIRA_EMAIL").unwrap_or_default();

        let auth_type = match get("JIRA_AUTH_TYPE").as_deref().map(str::to_lowercase) {
            Some(ref s) if s == "bearer" => AuthType::Bearer,
            _ => AuthType::Basic,
        };

        let mut missing = Vec::new();
        if domain.is_none() {
            missing.push("JIRA_DOMAIN");
        }
        if api_token.is_none() {
            missing.push("JIRA_API_TOKEN");
        }
        if auth_type == AuthType::Basic && email.is_empty() {
            missing.push("JIRA_EMAIL");
        }
        if !missing.is_empty() {
            return Err(JiraError::ConfigMissing(format!(
                "missing environment variables: {}",
                missing.join(", ")
            )));
        }

        let base_url = match get("JIRA_BASE_URL") {
            Some(raw) => Some(Url::parse(&ensure_trailing_slash(&raw))?),
            None => None,
        };

        Ok(Self {
            domain: domain.unwrap_or_default(),
            api_token: api_token.unwrap_or_default(),
            email,
            auth_type,
            default_project: get("JIRA_PROJECT"),
            base_url,
        })
    }

    /// Base URL of the Jira REST API v3 for this configuration.
    pub fn base_url(&self) -> Result<Url> {
        match &self.base_url {
            Some(url) => Ok(url.clone()),
            None => Ok(Url::parse(&format!("https://{}/rest/api/3/", self.domain))?),
        }
    }
}

fn ensure_trailing_slash(raw: &str) -> String {
    if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
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
    fn test_basic_auth_requires_email() {
        let err = JiraConfig::from_lookup(lookup(&[
            ("JIRA_DOMAIN", "org.atlassian.net"),
            ("JIRA_API_TOKEN", "tok"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("JIRA_EMAIL"));
    }

    #[test]
    fn test_bearer_auth_does_not_require_email() {
        let config = JiraConfig::from_lookup(lookup(&[
            ("JIRA_DOMAIN", "org.atlassian.net"),
            ("JIRA_API_TOKEN", "tok"),
            ("JIRA_AUTH_TYPE", "bearer"),
        ]))
        .unwrap();
        assert_eq!(config.auth_type, AuthType::Bearer);
    }

    #[test]
    fn test_all_missing_variables_listed() {
        let err = JiraConfig::from_lookup(lookup(&[])).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("JIRA_DOMAIN"));
        assert!(message.contains("JIRA_API_TOKEN"));
        assert!(message.contains("JIRA_EMAIL"));
    }

    #[test]
    fn test_base_url_from_domain() {
        let config = JiraConfig::from_lookup(lookup(&[
            ("JIRA_DOMAIN", "org.atlassian.net"),
            ("JIRA_API_TOKEN", "tok"),
            ("JIRA_EMAIL", "me@org.com"),
        ]))
        .unwrap();
        assert_eq!(
            config.base_url().unwrap().as_str(),
            "https://org.atlassian.net/rest/api/3/"
        );
    }

    #[test]
    fn test_base_url_override_gets_trailing_slash() {
        let config = JiraConfig::from_lookup(lookup(&[
            ("JIRA_DOMAIN", "org.atlassian.net"),
            ("JIRA_API_TOKEN", "tok"),
            ("JIRA_EMAIL", "me@org.com"),
            ("JIRA_BASE_URL", "http://127.0.0.1:9000/rest/api/3"),
        ]))
        .unwrap();
        assert_eq!(
            config.base_url().unwrap().as_str(),
            "http://127.0.0.1:9000/rest/api/3/"
        );
    }
}
