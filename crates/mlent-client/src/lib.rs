//! # mlent-client: Remote Workspace Access
//!
//! `load_component` can fetch a registered component instead of parsing a
//! local YAML file. It does so through the [`MlClient`] capability defined
//! here, injected by the caller as `&dyn MlClient`.
//!
//! Two implementations ship with the crate:
//!
//! - [`HttpMlClient`]: blocking `reqwest` client for the workspace
//!   management REST API, configured by [`ClientConfig`].
//! - [`InMemoryMlClient`]: components held in memory, for tests and
//!   offline use.
//!
//! Network timeouts and retries belong to the client. The loader never
//! retries.

pub mod config;
pub mod error;
pub mod http;
pub mod memory;
pub(crate) mod retry;

pub use config::{ClientConfig, ConfigError, DEFAULT_API_VERSION};
pub use error::ClientError;
pub use http::HttpMlClient;
pub use memory::InMemoryMlClient;

use mlent_entities::Component;

/// Component lookups on a workspace or registry.
pub trait ComponentOperations: Send + Sync {
    /// Fetch the component registered as `name` at `version`.
    fn get(&self, name: &str, version: &str) -> Result<Component, ClientError>;
}

/// A connected workspace.
pub trait MlClient: Send + Sync {
    fn components(&self) -> &dyn ComponentOperations;
}
