//! Workspace client configuration.
//!
//! Identifies one workspace on the management API. Build it explicitly for
//! tests or load it from `MLENT_*` environment variables.

use url::Url;

/// Management API version sent with every request.
pub const DEFAULT_API_VERSION: &str = "2023-10-01";

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for a single workspace.
///
/// Custom `Debug` implementation redacts the `token` field.
#[derive(Clone)]
pub struct ClientConfig {
    /// Management API root (e.g. `https://management.azure.com`).
    pub endpoint: Url,
    pub subscription_id: String,
    pub resource_group: String,
    pub workspace: String,
    /// Bearer token for API authentication.
    pub token: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Value of the `api-version` query parameter.
    pub api_version: String,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("subscription_id", &self.subscription_id)
            .field("resource_group", &self.resource_group)
            .field("workspace", &self.workspace)
            .field("token", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .field("api_version", &self.api_version)
            .finish()
    }
}

impl ClientConfig {
    /// Create a configuration with the default timeout and API version.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if `endpoint` is not an absolute
    /// `http(s)` URL.
    pub fn new(
        endpoint: &str,
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        workspace: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            endpoint: parse_endpoint("endpoint", endpoint)?,
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            workspace: workspace.into(),
            token: token.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            api_version: DEFAULT_API_VERSION.to_string(),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `MLENT_ENDPOINT` (required)
    /// - `MLENT_SUBSCRIPTION_ID` (required)
    /// - `MLENT_RESOURCE_GROUP` (required)
    /// - `MLENT_WORKSPACE` (required)
    /// - `MLENT_TOKEN` (required)
    /// - `MLENT_TIMEOUT_SECS` (default: 30)
    /// - `MLENT_API_VERSION` (default: [`DEFAULT_API_VERSION`])
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env), reading variables through
    /// `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |var: &'static str| {
            lookup(var)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(var))
        };

        let endpoint = parse_endpoint("MLENT_ENDPOINT", &required("MLENT_ENDPOINT")?)?;
        Ok(Self {
            endpoint,
            subscription_id: required("MLENT_SUBSCRIPTION_ID")?,
            resource_group: required("MLENT_RESOURCE_GROUP")?,
            workspace: required("MLENT_WORKSPACE")?,
            token: required("MLENT_TOKEN")?,
            timeout_secs: lookup("MLENT_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            api_version: lookup("MLENT_API_VERSION")
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
        })
    }
}

fn parse_endpoint(var: &str, raw: &str) -> Result<Url, ConfigError> {
    let url =
        Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl(
            var.to_string(),
            format!("{raw} is not an http(s) base URL"),
        ));
    }
    Ok(url)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("token contains characters not allowed in an HTTP header")]
    InvalidToken,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    const FULL: &[(&str, &str)] = &[
        ("MLENT_ENDPOINT", "https://management.example.com"),
        ("MLENT_SUBSCRIPTION_ID", "sub-1"),
        ("MLENT_RESOURCE_GROUP", "rg-1"),
        ("MLENT_WORKSPACE", "ws-1"),
        ("MLENT_TOKEN", "secret-token"),
    ];

    #[test]
    fn test_from_lookup_defaults() {
        let cfg = ClientConfig::from_lookup(env(FULL)).unwrap();
        assert_eq!(cfg.endpoint.as_str(), "https://management.example.com/");
        assert_eq!(cfg.workspace, "ws-1");
        assert_eq!(cfg.timeout_secs, 30);
        assert_eq!(cfg.api_version, DEFAULT_API_VERSION);
    }

    #[test]
    fn test_missing_variable_is_named() {
        let partial: Vec<(&str, &str)> = FULL
            .iter()
            .copied()
            .filter(|(k, _)| *k != "MLENT_WORKSPACE")
            .collect();
        let err = ClientConfig::from_lookup(env(&partial)).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("MLENT_WORKSPACE")));
    }

    #[test]
    fn test_blank_variable_counts_as_missing() {
        let mut pairs = FULL.to_vec();
        pairs.push(("MLENT_TOKEN", "  "));
        let mut map: HashMap<&str, &str> = HashMap::new();
        for (k, v) in pairs {
            map.insert(k, v);
        }
        let err = ClientConfig::from_lookup(|var| map.get(var).map(|v| v.to_string())).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("MLENT_TOKEN")));
    }

    #[test]
    fn test_timeout_override() {
        let mut pairs = FULL.to_vec();
        pairs.push(("MLENT_TIMEOUT_SECS", "5"));
        let cfg = ClientConfig::from_lookup(env(&pairs)).unwrap();
        assert_eq!(cfg.timeout_secs, 5);
    }

    #[test]
    fn test_rejects_non_http_endpoint() {
        assert!(matches!(
            ClientConfig::new("mailto:ops@example.com", "s", "r", "w", "t"),
            Err(ConfigError::InvalidUrl(..))
        ));
        assert!(matches!(
            ClientConfig::new("not a url", "s", "r", "w", "t"),
            Err(ConfigError::InvalidUrl(..))
        ));
    }

    #[test]
    fn test_debug_redacts_token() {
        let cfg = ClientConfig::new("https://m.example.com", "s", "r", "w", "secret-token").unwrap();
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
