//! Online and batch endpoints.

use std::collections::BTreeMap;
use std::path::Path;

use mlent_core::{Document, EntityFamily};
use mlent_schema::SchemaError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::{Identity, StringMap, Tags};
use crate::paths::ResolvePaths;
use crate::registry::{build_resolved, type_field, LoadContext, Resource, SubtypeSpec};

/// Deployment name → percentage of traffic.
pub type Traffic = BTreeMap<String, u32>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagedOnlineEndpoint {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<StringMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traffic: Option<Traffic>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mirror_traffic: Option<Traffic>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_network_access: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KubernetesOnlineEndpoint {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<StringMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_mode: Option<String>,
    /// Attached Kubernetes compute hosting the endpoint.
    pub compute: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traffic: Option<Traffic>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OnlineEndpoint {
    Managed(ManagedOnlineEndpoint),
    Kubernetes(KubernetesOnlineEndpoint),
}

impl OnlineEndpoint {
    pub fn name(&self) -> &str {
        match self {
            OnlineEndpoint::Managed(e) => &e.name,
            OnlineEndpoint::Kubernetes(e) => &e.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchEndpointDefaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_name: Option<String>,
}

/// Matches `schemas/batch_endpoint.schema.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEndpoint {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<StringMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<BatchEndpointDefaults>,
}

impl ResolvePaths for ManagedOnlineEndpoint {
    fn resolve_paths(&mut self, _: &Path) {}
}

impl ResolvePaths for KubernetesOnlineEndpoint {
    fn resolve_paths(&mut self, _: &Path) {}
}

impl ResolvePaths for BatchEndpoint {
    fn resolve_paths(&mut self, _: &Path) {}
}

fn build_managed(value: Value, ctx: &LoadContext<'_>) -> Result<OnlineEndpoint, SchemaError> {
    build_resolved(value, "managed_online_endpoint.schema.json", ctx).map(OnlineEndpoint::Managed)
}

fn build_kubernetes(value: Value, ctx: &LoadContext<'_>) -> Result<OnlineEndpoint, SchemaError> {
    build_resolved(value, "kubernetes_online_endpoint.schema.json", ctx)
        .map(OnlineEndpoint::Kubernetes)
}

fn build_batch(value: Value, ctx: &LoadContext<'_>) -> Result<BatchEndpoint, SchemaError> {
    build_resolved(value, "batch_endpoint.schema.json", ctx)
}

static ONLINE_SUBTYPES: [SubtypeSpec<OnlineEndpoint>; 2] = [
    SubtypeSpec {
        discriminator: "managed",
        schema: "managed_online_endpoint.schema.json",
        build: build_managed,
    },
    SubtypeSpec {
        discriminator: "kubernetes",
        schema: "kubernetes_online_endpoint.schema.json",
        build: build_kubernetes,
    },
];

static BATCH_SUBTYPES: [SubtypeSpec<BatchEndpoint>; 1] = [SubtypeSpec {
    discriminator: "batch",
    schema: "batch_endpoint.schema.json",
    build: build_batch,
}];

impl Resource for OnlineEndpoint {
    const FAMILY: EntityFamily = EntityFamily::OnlineEndpoint;
    const STRUCTURED_VALIDATION: bool = true;
    const DEFAULT_SUBTYPE: Option<&'static str> = Some("managed");

    fn subtypes() -> &'static [SubtypeSpec<Self>] {
        &ONLINE_SUBTYPES
    }

    /// An explicit `type` wins. Otherwise an endpoint bound to a `compute`
    /// is a Kubernetes endpoint and anything else is managed.
    fn discriminator(document: &Document) -> Option<String> {
        if let Some(explicit) = type_field(document) {
            return Some(explicit);
        }
        let inferred = if document.get("compute").is_some() {
            "kubernetes"
        } else {
            "managed"
        };
        Some(inferred.to_string())
    }
}

impl Resource for BatchEndpoint {
    const FAMILY: EntityFamily = EntityFamily::BatchEndpoint;
    const STRUCTURED_VALIDATION: bool = true;
    const DEFAULT_SUBTYPE: Option<&'static str> = Some("batch");

    fn subtypes() -> &'static [SubtypeSpec<Self>] {
        &BATCH_SUBTYPES
    }

    fn discriminator(_: &Document) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{embedded_validator, resolve_subtype};
    use mlent_core::Origin;
    use serde_json::json;

    fn build(value: Value) -> Result<OnlineEndpoint, SchemaError> {
        let doc = Document::from_json(value, EntityFamily::OnlineEndpoint).unwrap();
        let resolved = resolve_subtype::<OnlineEndpoint>(&doc)?;
        let ctx = LoadContext::new(Origin::default_marker(), embedded_validator().unwrap());
        (resolved.spec.build)(doc.into_value(), &ctx)
    }

    #[test]
    fn test_compute_field_selects_kubernetes() {
        let endpoint = build(json!({"name": "k8s-ep", "compute": "azureml:k8s", "auth_mode": "key"})).unwrap();
        assert!(matches!(endpoint, OnlineEndpoint::Kubernetes(_)));
    }

    #[test]
    fn test_no_compute_selects_managed() {
        let endpoint = build(json!({"name": "ep", "traffic": {"blue": 100}})).unwrap();
        let OnlineEndpoint::Managed(managed) = endpoint else {
            panic!("expected managed endpoint");
        };
        assert_eq!(managed.traffic.unwrap()["blue"], 100);
    }

    #[test]
    fn test_inferred_discriminator_is_reported() {
        let doc = Document::from_json(json!({"name": "ep"}), EntityFamily::OnlineEndpoint).unwrap();
        let resolved = resolve_subtype::<OnlineEndpoint>(&doc).unwrap();
        assert_eq!(resolved.type_str.as_deref(), Some("managed"));
    }

    #[test]
    fn test_explicit_type_beats_compute() {
        let err = build(json!({"type": "managed", "name": "ep", "compute": "azureml:k8s"})).unwrap_err();
        let SchemaError::ValidationFailed { violations, .. } = err else {
            panic!("expected ValidationFailed");
        };
        // The managed schema has no `compute` field.
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations.violations()[0].kind,
            mlent_core::ValidationErrorType::UnknownField
        );
    }

    #[test]
    fn test_traffic_out_of_range() {
        let err = build(json!({"name": "ep", "traffic": {"blue": 150}})).unwrap_err();
        let SchemaError::ValidationFailed { violations, .. } = err else {
            panic!("expected ValidationFailed");
        };
        assert_eq!(violations.violations()[0].field(), "traffic.blue");
    }

    #[test]
    fn test_batch_endpoint() {
        let doc = Document::from_json(
            json!({"name": "batch-ep", "auth_mode": "aad_token", "defaults": {"deployment_name": "d1"}}),
            EntityFamily::BatchEndpoint,
        )
        .unwrap();
        let resolved = resolve_subtype::<BatchEndpoint>(&doc).unwrap();
        let ctx = LoadContext::new(Origin::default_marker(), embedded_validator().unwrap());
        let endpoint = (resolved.spec.build)(doc.into_value(), &ctx).unwrap();
        assert_eq!(endpoint.defaults.unwrap().deployment_name.as_deref(), Some("d1"));
    }
}
