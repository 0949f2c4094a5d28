//! Workspace client error types.

use mlent_schema::SchemaError;

/// Errors from remote component lookups.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP transport error, after retries.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// No component is registered under this name and version.
    #[error("component {name}:{version} not found")]
    NotFound { name: String, version: String },
    /// The API returned a non-2xx status other than 404.
    #[error("{endpoint} returned {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// The response body was not a component version resource.
    #[error("failed to deserialize response from {endpoint}: {reason}")]
    Deserialization { endpoint: String, reason: String },
    /// The returned component spec does not build into a component.
    #[error("component {name}:{version} returned by the service is invalid: {source}")]
    InvalidComponent {
        name: String,
        version: String,
        source: SchemaError,
    },
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),
}
