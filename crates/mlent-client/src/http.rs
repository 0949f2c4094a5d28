//! # HTTP Workspace Client
//!
//! Blocking `reqwest` client for the workspace management API. Only the
//! component lookup used by `load_component` is implemented:
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET | `/subscriptions/{sub}/resourceGroups/{rg}/providers/Microsoft.MachineLearningServices/workspaces/{ws}/components/{name}/versions/{version}` | Get component version |
//!
//! The `properties.componentSpec` object of the response is built through
//! the same component registry used for local YAML, with the default
//! origin. Transport errors are retried (see `retry`); HTTP statuses are
//! not.

use std::time::Duration;

use mlent_core::{Document, EntityFamily, Origin};
use mlent_entities::{embedded_validator, resolve_subtype, Component, LoadContext};
use mlent_schema::SchemaError;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::config::{ClientConfig, ConfigError};
use crate::error::ClientError;
use crate::{ComponentOperations, MlClient};

const PROVIDER: &str = "Microsoft.MachineLearningServices";

/// Response body of a component version lookup. Unmodeled fields are
/// ignored.
#[derive(Debug, Deserialize)]
struct ComponentVersionResource {
    properties: ComponentVersionProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ComponentVersionProperties {
    component_spec: Value,
}

/// Workspace client backed by the management REST API.
#[derive(Debug)]
pub struct HttpMlClient {
    http: reqwest::blocking::Client,
    config: ClientConfig,
}

impl HttpMlClient {
    /// Create a client from configuration.
    ///
    /// Must not be called from inside an async runtime; the blocking
    /// client owns its own.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    reqwest::header::AUTHORIZATION,
                    reqwest::header::HeaderValue::from_str(&format!("Bearer {}", config.token))
                        .map_err(|_| ConfigError::InvalidToken)?,
                );
                headers.insert(
                    reqwest::header::ACCEPT,
                    reqwest::header::HeaderValue::from_static("application/json"),
                );
                headers
            })
            .build()
            .map_err(|e| ClientError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self { http, config })
    }

    /// The configuration this client was built from.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn component_url(&self, name: &str, version: &str) -> Result<Url, ClientError> {
        let mut url = self.config.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ConfigError::InvalidUrl("endpoint".into(), "cannot be a base URL".into())
            })?
            .pop_if_empty()
            .extend([
                "subscriptions",
                self.config.subscription_id.as_str(),
                "resourceGroups",
                self.config.resource_group.as_str(),
                "providers",
                PROVIDER,
                "workspaces",
                self.config.workspace.as_str(),
                "components",
                name,
                "versions",
                version,
            ]);
        url.query_pairs_mut()
            .append_pair("api-version", &self.config.api_version);
        Ok(url)
    }
}

impl MlClient for HttpMlClient {
    fn components(&self) -> &dyn ComponentOperations {
        self
    }
}

impl ComponentOperations for HttpMlClient {
    /// Calls `GET .../components/{name}/versions/{version}`.
    fn get(&self, name: &str, version: &str) -> Result<Component, ClientError> {
        let endpoint = format!("GET /components/{name}/versions/{version}");
        let url = self.component_url(name, version)?;
        tracing::debug!(%url, "fetching component");

        let resp = crate::retry::retry_send(|| self.http.get(url.clone()).send()).map_err(|e| {
            ClientError::Http {
                endpoint: endpoint.clone(),
                source: e,
            }
        })?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound {
                name: name.to_string(),
                version: version.to_string(),
            });
        }

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().unwrap_or_else(|e| {
                tracing::debug!(%endpoint, error = %e, "failed to read error response body");
                String::new()
            });
            return Err(ClientError::Api {
                endpoint,
                status,
                body,
            });
        }

        let resource: ComponentVersionResource =
            resp.json().map_err(|e| ClientError::Deserialization {
                endpoint: endpoint.clone(),
                reason: e.to_string(),
            })?;

        build_component(resource.properties.component_spec, name, version, &endpoint)
    }
}

/// Build a returned component spec. The requested name and version fill in
/// for fields the service leaves out.
fn build_component(
    mut spec: Value,
    name: &str,
    version: &str,
    endpoint: &str,
) -> Result<Component, ClientError> {
    if let Value::Object(map) = &mut spec {
        map.entry("name").or_insert_with(|| Value::from(name));
        map.entry("version").or_insert_with(|| Value::from(version));
    }
    let document = Document::from_json(spec, EntityFamily::Component).map_err(|e| {
        ClientError::Deserialization {
            endpoint: endpoint.to_string(),
            reason: format!("componentSpec: {e}"),
        }
    })?;

    let invalid = |source: SchemaError| ClientError::InvalidComponent {
        name: name.to_string(),
        version: version.to_string(),
        source,
    };
    let validator = embedded_validator().map_err(invalid)?;
    let resolved = resolve_subtype::<Component>(&document).map_err(invalid)?;
    let ctx = LoadContext::new(Origin::default_marker(), validator);
    (resolved.spec.build)(document.into_value(), &ctx).map_err(invalid)
}
