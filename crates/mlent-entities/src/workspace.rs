//! # Workspace-level resources
//!
//! Workspaces, registries and workspace connections. None of these
//! families is polymorphic, and none supports structured validation:
//! schema failures reach the caller as the raw `SchemaError`.

use std::path::Path;

use mlent_core::{Document, EntityFamily};
use mlent_schema::SchemaError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::{Identity, StringMap, Tags};
use crate::paths::ResolvePaths;
use crate::registry::{build_resolved, LoadContext, Resource, SubtypeSpec};

/// Customer-managed encryption key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerManagedKey {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_vault: Option<String>,
    pub key_uri: String,
}

/// Matches `schemas/workspace.schema.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hbi_workspace: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_account: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_registry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_vault: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_insights: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_build_compute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_network_access: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_user_assigned_identity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_managed_key: Option<CustomerManagedKey>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicationLocation {
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_config: Option<Value>,
}

/// Matches `schemas/registry.schema.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_network_access: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_registry: Option<String>,
    pub replication_locations: Vec<ReplicationLocation>,
}

/// Secret material for a connection. Which fields are present depends on
/// `credential_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionCredentials {
    #[serde(rename = "type")]
    pub credential_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pat: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sas_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_access_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

/// Matches `schemas/workspace_connection.schema.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceConnection {
    pub name: String,
    /// Connection category (`git`, `python_feed`, `s3`, ...).
    #[serde(rename = "type")]
    pub connection_type: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<StringMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<ConnectionCredentials>,
}

impl ResolvePaths for Workspace {
    fn resolve_paths(&mut self, _: &Path) {}
}

impl ResolvePaths for Registry {
    fn resolve_paths(&mut self, _: &Path) {}
}

impl ResolvePaths for WorkspaceConnection {
    fn resolve_paths(&mut self, _: &Path) {}
}

fn build_workspace(value: Value, ctx: &LoadContext<'_>) -> Result<Workspace, SchemaError> {
    build_resolved(value, "workspace.schema.json", ctx)
}

fn build_registry(value: Value, ctx: &LoadContext<'_>) -> Result<Registry, SchemaError> {
    build_resolved(value, "registry.schema.json", ctx)
}

fn build_connection(
    value: Value,
    ctx: &LoadContext<'_>,
) -> Result<WorkspaceConnection, SchemaError> {
    build_resolved(value, "workspace_connection.schema.json", ctx)
}

static WORKSPACE_SUBTYPES: [SubtypeSpec<Workspace>; 1] = [SubtypeSpec {
    discriminator: "workspace",
    schema: "workspace.schema.json",
    build: build_workspace,
}];

static REGISTRY_SUBTYPES: [SubtypeSpec<Registry>; 1] = [SubtypeSpec {
    discriminator: "registry",
    schema: "registry.schema.json",
    build: build_registry,
}];

static CONNECTION_SUBTYPES: [SubtypeSpec<WorkspaceConnection>; 1] = [SubtypeSpec {
    discriminator: "workspace_connection",
    schema: "workspace_connection.schema.json",
    build: build_connection,
}];

impl Resource for Workspace {
    const FAMILY: EntityFamily = EntityFamily::Workspace;
    const STRUCTURED_VALIDATION: bool = false;
    const DEFAULT_SUBTYPE: Option<&'static str> = Some("workspace");

    fn subtypes() -> &'static [SubtypeSpec<Self>] {
        &WORKSPACE_SUBTYPES
    }

    fn discriminator(_: &Document) -> Option<String> {
        None
    }
}

impl Resource for Registry {
    const FAMILY: EntityFamily = EntityFamily::Registry;
    const STRUCTURED_VALIDATION: bool = false;
    const DEFAULT_SUBTYPE: Option<&'static str> = Some("registry");

    fn subtypes() -> &'static [SubtypeSpec<Self>] {
        &REGISTRY_SUBTYPES
    }

    fn discriminator(_: &Document) -> Option<String> {
        None
    }
}

impl Resource for WorkspaceConnection {
    const FAMILY: EntityFamily = EntityFamily::WorkspaceConnection;
    const STRUCTURED_VALIDATION: bool = false;
    const DEFAULT_SUBTYPE: Option<&'static str> = Some("workspace_connection");

    fn subtypes() -> &'static [SubtypeSpec<Self>] {
        &CONNECTION_SUBTYPES
    }

    // `type` names the connection category.
    fn discriminator(_: &Document) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::embedded_validator;
    use mlent_core::Origin;
    use serde_json::json;

    fn ctx() -> LoadContext<'static> {
        LoadContext::new(Origin::default_marker(), embedded_validator().unwrap())
    }

    #[test]
    fn test_workspace() {
        let ws = build_workspace(
            json!({"name": "mlw-basic", "location": "eastus", "hbi_workspace": false}),
            &ctx(),
        )
        .unwrap();
        assert_eq!(ws.location.as_deref(), Some("eastus"));
    }

    #[test]
    fn test_registry_needs_a_replication_location() {
        let err = build_registry(
            json!({"name": "shared", "replication_locations": []}),
            &ctx(),
        )
        .unwrap_err();
        let SchemaError::ValidationFailed { violations, .. } = err else {
            panic!("expected ValidationFailed");
        };
        assert_eq!(violations.violations()[0].field(), "replication_locations");
    }

    #[test]
    fn test_connection_type_kept() {
        let conn = build_connection(
            json!({
                "name": "my_git",
                "type": "git",
                "target": "https://github.com/org/repo",
                "credentials": {"type": "pat", "pat": "secret"}
            }),
            &ctx(),
        )
        .unwrap();
        assert_eq!(conn.connection_type, "git");
        assert_eq!(conn.credentials.unwrap().credential_type, "pat");
    }
}
