//! # Deployments
//!
//! Online deployments are `managed` (default) or `kubernetes`; both share
//! [`OnlineDeploymentSettings`]. Batch deployments have a single shape.

use std::collections::BTreeMap;
use std::path::Path;

use mlent_core::{Document, EntityFamily};
use mlent_schema::SchemaError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::{
    CodeConfiguration, EnvironmentRef, ModelRef, Probe, Resources, RetrySettings, StringMap, Tags,
};
use crate::paths::ResolvePaths;
use crate::registry::{build_resolved, LoadContext, Resource, SubtypeSpec};

const MANAGED_SCHEMA: &str = "managed_online_deployment.schema.json";
const KUBERNETES_SCHEMA: &str = "kubernetes_online_deployment.schema.json";
const BATCH_SCHEMA: &str = "batch_deployment.schema.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrent_requests_per_instance: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_queue_wait_ms: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleSettings {
    #[serde(rename = "type")]
    pub scale_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_instances: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_instances: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polling_interval: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_utilization_percentage: Option<u32>,
}

/// Fields shared by managed and Kubernetes online deployments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnlineDeploymentSettings {
    pub name: String,
    pub endpoint_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<StringMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_configuration: Option<CodeConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<EnvironmentRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_variables: Option<StringMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_insights_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_settings: Option<RequestSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liveness_probe: Option<Probe>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readiness_probe: Option<Probe>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_settings: Option<ScaleSettings>,
}

impl ResolvePaths for OnlineDeploymentSettings {
    fn resolve_paths(&mut self, base_dir: &Path) {
        self.model.resolve_paths(base_dir);
        self.code_configuration.resolve_paths(base_dir);
        self.environment.resolve_paths(base_dir);
    }
}

/// Matches `schemas/managed_online_deployment.schema.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagedOnlineDeployment {
    #[serde(flatten)]
    pub settings: OnlineDeploymentSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub egress_public_network_access: Option<String>,
}

impl ResolvePaths for ManagedOnlineDeployment {
    fn resolve_paths(&mut self, base_dir: &Path) {
        self.settings.resolve_paths(base_dir);
    }
}

/// Kubernetes resource requests or limits (`cpu`, `memory`,
/// `nvidia.com/gpu`).
pub type ResourceQuantities = BTreeMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KubernetesResources {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests: Option<ResourceQuantities>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<ResourceQuantities>,
}

/// Matches `schemas/kubernetes_online_deployment.schema.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KubernetesOnlineDeployment {
    #[serde(flatten)]
    pub settings: OnlineDeploymentSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<KubernetesResources>,
}

impl ResolvePaths for KubernetesOnlineDeployment {
    fn resolve_paths(&mut self, base_dir: &Path) {
        self.settings.resolve_paths(base_dir);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OnlineDeployment {
    Managed(ManagedOnlineDeployment),
    Kubernetes(KubernetesOnlineDeployment),
}

impl OnlineDeployment {
    pub fn settings(&self) -> &OnlineDeploymentSettings {
        match self {
            OnlineDeployment::Managed(d) => &d.settings,
            OnlineDeployment::Kubernetes(d) => &d.settings,
        }
    }
}

fn build_managed(value: Value, ctx: &LoadContext<'_>) -> Result<OnlineDeployment, SchemaError> {
    build_resolved(value, MANAGED_SCHEMA, ctx).map(OnlineDeployment::Managed)
}

fn build_kubernetes(value: Value, ctx: &LoadContext<'_>) -> Result<OnlineDeployment, SchemaError> {
    build_resolved(value, KUBERNETES_SCHEMA, ctx).map(OnlineDeployment::Kubernetes)
}

static ONLINE_SUBTYPES: [SubtypeSpec<OnlineDeployment>; 2] = [
    SubtypeSpec {
        discriminator: "managed",
        schema: MANAGED_SCHEMA,
        build: build_managed,
    },
    SubtypeSpec {
        discriminator: "kubernetes",
        schema: KUBERNETES_SCHEMA,
        build: build_kubernetes,
    },
];

impl Resource for OnlineDeployment {
    const FAMILY: EntityFamily = EntityFamily::OnlineDeployment;
    const STRUCTURED_VALIDATION: bool = true;
    const DEFAULT_SUBTYPE: Option<&'static str> = Some("managed");

    fn subtypes() -> &'static [SubtypeSpec<Self>] {
        &ONLINE_SUBTYPES
    }
}

// ---------------------------------------------------------------------------
// Batch
// ---------------------------------------------------------------------------

/// Matches `schemas/batch_deployment.schema.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchDeployment {
    /// `model` or `pipeline`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub deployment_type: Option<String>,
    pub name: String,
    pub endpoint_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<StringMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_configuration: Option<CodeConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<EnvironmentRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_variables: Option<StringMap>,
    pub compute: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Resources>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mini_batch_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrency_per_instance: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_threshold: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_settings: Option<RetrySettings>,
}

impl ResolvePaths for BatchDeployment {
    fn resolve_paths(&mut self, base_dir: &Path) {
        self.model.resolve_paths(base_dir);
        self.code_configuration.resolve_paths(base_dir);
        self.environment.resolve_paths(base_dir);
    }
}

fn build_batch(value: Value, ctx: &LoadContext<'_>) -> Result<BatchDeployment, SchemaError> {
    build_resolved(value, BATCH_SCHEMA, ctx)
}

static BATCH_SUBTYPES: [SubtypeSpec<BatchDeployment>; 1] = [SubtypeSpec {
    discriminator: "batch",
    schema: BATCH_SCHEMA,
    build: build_batch,
}];

impl Resource for BatchDeployment {
    const FAMILY: EntityFamily = EntityFamily::BatchDeployment;
    const STRUCTURED_VALIDATION: bool = true;
    const DEFAULT_SUBTYPE: Option<&'static str> = Some("batch");

    fn subtypes() -> &'static [SubtypeSpec<Self>] {
        &BATCH_SUBTYPES
    }

    // `type` says what is deployed (model or pipeline), not which schema
    // applies.
    fn discriminator(_: &Document) -> Option<String> {
        None
    }
}
