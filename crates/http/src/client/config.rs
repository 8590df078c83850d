//! Session client configuration

use super::ClientError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable holding the backend origin
pub const BACKEND_URL_ENV: &str = "PLACER_BACKEND_URL";
/// Environment variable holding the request timeout in seconds
pub const TIMEOUT_ENV: &str = "PLACER_HTTP_TIMEOUT_SECS";

/// Backend auth endpoint paths, relative to the backend origin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthEndpoints {
    pub login: String,
    pub register: String,
    pub refresh: String,
    pub logout: String,
}

impl Default for AuthEndpoints {
    fn default() -> Self {
        Self {
            login: "/api/auth/login".to_string(),
            register: "/api/auth/register".to_string(),
            refresh: "/api/auth/refresh".to_string(),
            logout: "/api/auth/logout".to_string(),
        }
    }
}

/// Configuration for [`SessionClient`](super::SessionClient)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Backend origin, e.g. `https://api.example.com`
    pub base_url: String,
    #[serde(default)]
    pub endpoints: AuthEndpoints,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Request timeout; ignored in the browser
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_user_agent() -> String {
    format!("placer-client/{}", env!("CARGO_PKG_VERSION"))
}

impl SessionConfig {
    /// Configuration with default endpoints for the given backend origin
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            endpoints: AuthEndpoints::default(),
            user_agent: default_user_agent(),
            timeout_secs: None,
        }
    }

    /// Load from `PLACER_BACKEND_URL` and `PLACER_HTTP_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ClientError> {
        let base_url = lookup(BACKEND_URL_ENV)
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ClientError::Configuration(format!("{BACKEND_URL_ENV} is not set")))?;

        let timeout_secs = lookup(TIMEOUT_ENV)
            .map(|raw| {
                raw.trim().parse::<u64>().map_err(|e| {
                    ClientError::Configuration(format!("{TIMEOUT_ENV} must be whole seconds: {e}"))
                })
            })
            .transpose()?;

        Ok(Self {
            timeout_secs,
            ..Self::new(base_url)
        })
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Validated base URL without a trailing slash
    pub(crate) fn normalized_base_url(&self) -> Result<String, ClientError> {
        let base_url = self.base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ClientError::Configuration("base_url is required".into()));
        }

        url::Url::parse(&base_url)
            .map_err(|e| ClientError::Configuration(format!("invalid base_url {base_url:?}: {e}")))?;

        Ok(base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_reads_url_and_timeout() {
        let config = SessionConfig::from_lookup(lookup(&[
            (BACKEND_URL_ENV, "https://api.example.com/"),
            (TIMEOUT_ENV, "15"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "https://api.example.com/");
        assert_eq!(config.timeout(), Some(Duration::from_secs(15)));
        assert_eq!(config.endpoints, AuthEndpoints::default());
        assert_eq!(
            config.normalized_base_url().unwrap(),
            "https://api.example.com"
        );
    }

    #[test]
    fn test_from_lookup_requires_backend_url() {
        let result = SessionConfig::from_lookup(lookup(&[]));
        assert!(matches!(result, Err(ClientError::Configuration(_))));

        let result = SessionConfig::from_lookup(lookup(&[(BACKEND_URL_ENV, "  ")]));
        assert!(matches!(result, Err(ClientError::Configuration(_))));
    }

    #[test]
    fn test_from_lookup_rejects_bad_timeout() {
        let result = SessionConfig::from_lookup(lookup(&[
            (BACKEND_URL_ENV, "http://localhost:8080"),
            (TIMEOUT_ENV, "soon"),
        ]));
        assert!(matches!(result, Err(ClientError::Configuration(_))));
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let config = SessionConfig::new("not a url");
        assert!(matches!(
            config.normalized_base_url(),
            Err(ClientError::Configuration(_))
        ));
    }

    #[test]
    fn test_deserialize_with_partial_endpoints() {
        let config: SessionConfig = serde_json::from_str(
            r#"{"base_url": "http://localhost:8080", "endpoints": {"register": "/api/auth/signup"}}"#,
        )
        .unwrap();

        assert_eq!(config.endpoints.register, "/api/auth/signup");
        assert_eq!(config.endpoints.login, "/api/auth/login");
        assert!(config.user_agent.starts_with("placer-client/"));
        assert_eq!(config.timeout_secs, None);
    }
}
