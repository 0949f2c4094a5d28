//! Compute targets. `type` is mandatory: there is no default subtype.

use std::path::Path;

use mlent_core::EntityFamily;
use mlent_schema::SchemaError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::{Identity, Tags};
use crate::paths::ResolvePaths;
use crate::registry::{build_resolved, LoadContext, Resource, SubtypeSpec};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Compute {
    #[serde(rename = "amlcompute")]
    AmlCompute(AmlCompute),
    #[serde(rename = "computeinstance")]
    ComputeInstance(ComputeInstance),
    #[serde(rename = "virtualmachine")]
    VirtualMachine(VirtualMachine),
    Kubernetes(KubernetesCompute),
}

impl Compute {
    pub fn name(&self) -> &str {
        match self {
            Compute::AmlCompute(c) => &c.name,
            Compute::ComputeInstance(c) => &c.name,
            Compute::VirtualMachine(c) => &c.name,
            Compute::Kubernetes(c) => &c.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SshSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_key_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_private_key_file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vnet_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet: Option<String>,
}

/// Autoscaling training cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmlCompute {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_instances: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_instances: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idle_time_before_scale_down: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_public_access_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_settings: Option<SshSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_settings: Option<NetworkSettings>,
}

impl ResolvePaths for AmlCompute {
    fn resolve_paths(&mut self, _: &Path) {}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOnBehalfOf {
    pub user_tenant_id: String,
    pub user_object_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupScript {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_minutes: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupScripts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_script: Option<SetupScript>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub startup_script: Option<SetupScript>,
}

/// Single-user development VM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputeInstance {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_on_behalf_of: Option<CreateOnBehalfOf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idle_time_before_shutdown_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_node_public_ip: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup_scripts: Option<SetupScripts>,
}

impl ResolvePaths for ComputeInstance {
    fn resolve_paths(&mut self, base_dir: &Path) {
        if let Some(scripts) = &mut self.setup_scripts {
            for script in [&mut scripts.creation_script, &mut scripts.startup_script]
                .into_iter()
                .flatten()
            {
                script.path.resolve_paths(base_dir);
            }
        }
    }
}

/// An existing VM attached by resource id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualMachine {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub resource_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_settings: Option<SshSettings>,
}

impl ResolvePaths for VirtualMachine {
    fn resolve_paths(&mut self, base_dir: &Path) {
        if let Some(ssh) = &mut self.ssh_settings {
            ssh.ssh_private_key_file.resolve_paths(base_dir);
        }
    }
}

/// An existing Kubernetes cluster attached by resource id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KubernetesCompute {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub resource_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
}

impl ResolvePaths for KubernetesCompute {
    fn resolve_paths(&mut self, _: &Path) {}
}

fn build_aml(value: Value, ctx: &LoadContext<'_>) -> Result<Compute, SchemaError> {
    build_resolved(value, "amlcompute.schema.json", ctx).map(Compute::AmlCompute)
}

fn build_instance(value: Value, ctx: &LoadContext<'_>) -> Result<Compute, SchemaError> {
    build_resolved(value, "computeinstance.schema.json", ctx).map(Compute::ComputeInstance)
}

fn build_vm(value: Value, ctx: &LoadContext<'_>) -> Result<Compute, SchemaError> {
    build_resolved(value, "virtualmachine.schema.json", ctx).map(Compute::VirtualMachine)
}

fn build_kubernetes(value: Value, ctx: &LoadContext<'_>) -> Result<Compute, SchemaError> {
    build_resolved(value, "kubernetes_compute.schema.json", ctx).map(Compute::Kubernetes)
}

static COMPUTE_SUBTYPES: [SubtypeSpec<Compute>; 4] = [
    SubtypeSpec {
        discriminator: "amlcompute",
        schema: "amlcompute.schema.json",
        build: build_aml,
    },
    SubtypeSpec {
        discriminator: "computeinstance",
        schema: "computeinstance.schema.json",
        build: build_instance,
    },
    SubtypeSpec {
        discriminator: "virtualmachine",
        schema: "virtualmachine.schema.json",
        build: build_vm,
    },
    SubtypeSpec {
        discriminator: "kubernetes",
        schema: "kubernetes_compute.schema.json",
        build: build_kubernetes,
    },
];

impl Resource for Compute {
    const FAMILY: EntityFamily = EntityFamily::Compute;
    const STRUCTURED_VALIDATION: bool = false;
    const DEFAULT_SUBTYPE: Option<&'static str> = None;

    fn subtypes() -> &'static [SubtypeSpec<Self>] {
        &COMPUTE_SUBTYPES
    }
}
