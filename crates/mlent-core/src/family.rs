//! # Entity Families: Single Source of Truth
//!
//! Defines the `EntityFamily` enum naming every kind of configuration entity
//! the loaders can produce. Every `match` on `EntityFamily` is exhaustive,
//! so adding a family forces each consumer (loaders, the CLI, error
//! reporting) to handle it at compile time.
//!
//! The family is also the error target: parse and validation failures
//! report which family was being loaded.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::UnknownFamilyError;

/// All entity families that can be loaded from YAML.
///
/// | # | Family | Loader |
/// |---|--------|--------|
/// |  1 | Job | `load_job` |
/// |  2 | Workspace | `load_workspace` |
/// |  3 | Registry | `load_registry` |
/// |  4 | Datastore | `load_datastore` |
/// |  5 | Code | `load_code` |
/// |  6 | Compute | `load_compute` |
/// |  7 | Component | `load_component` |
/// |  8 | Model | `load_model` |
/// |  9 | Data | `load_data` |
/// | 10 | Environment | `load_environment` |
/// | 11 | OnlineDeployment | `load_online_deployment` |
/// | 12 | BatchDeployment | `load_batch_deployment` |
/// | 13 | OnlineEndpoint | `load_online_endpoint` |
/// | 14 | BatchEndpoint | `load_batch_endpoint` |
/// | 15 | WorkspaceConnection | `load_workspace_connection` |
/// | 16 | Schedule | `load_schedule` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityFamily {
    /// Command, sweep, pipeline and spark jobs.
    Job,
    /// Workspace definitions.
    Workspace,
    /// Asset registries shared across workspaces.
    Registry,
    /// Storage account attachments.
    Datastore,
    /// Code snapshots.
    Code,
    /// Compute targets (clusters, instances, attached VMs, Kubernetes).
    Compute,
    /// Reusable command, parallel and pipeline components.
    Component,
    /// Registered models.
    Model,
    /// Data assets.
    Data,
    /// Runtime environments.
    Environment,
    /// Deployments behind an online endpoint.
    OnlineDeployment,
    /// Deployments behind a batch endpoint.
    BatchDeployment,
    /// Real-time scoring endpoints.
    OnlineEndpoint,
    /// Batch scoring endpoints.
    BatchEndpoint,
    /// Connections from a workspace to external services.
    WorkspaceConnection,
    /// Job schedules.
    Schedule,
}

/// Total number of entity families.
pub const ENTITY_FAMILY_COUNT: usize = 16;

impl EntityFamily {
    /// Returns all families in loader order.
    pub fn all() -> &'static [EntityFamily] {
        &[
            Self::Job,
            Self::Workspace,
            Self::Registry,
            Self::Datastore,
            Self::Code,
            Self::Compute,
            Self::Component,
            Self::Model,
            Self::Data,
            Self::Environment,
            Self::OnlineDeployment,
            Self::BatchDeployment,
            Self::OnlineEndpoint,
            Self::BatchEndpoint,
            Self::WorkspaceConnection,
            Self::Schedule,
        ]
    }

    /// Returns the snake_case identifier, matching the serde format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Job => "job",
            Self::Workspace => "workspace",
            Self::Registry => "registry",
            Self::Datastore => "datastore",
            Self::Code => "code",
            Self::Compute => "compute",
            Self::Component => "component",
            Self::Model => "model",
            Self::Data => "data",
            Self::Environment => "environment",
            Self::OnlineDeployment => "online_deployment",
            Self::BatchDeployment => "batch_deployment",
            Self::OnlineEndpoint => "online_endpoint",
            Self::BatchEndpoint => "batch_endpoint",
            Self::WorkspaceConnection => "workspace_connection",
            Self::Schedule => "schedule",
        }
    }

    /// Human-readable name used in error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Job => "Job",
            Self::Workspace => "Workspace",
            Self::Registry => "Registry",
            Self::Datastore => "Datastore",
            Self::Code => "Code",
            Self::Compute => "Compute",
            Self::Component => "Component",
            Self::Model => "Model",
            Self::Data => "Data",
            Self::Environment => "Environment",
            Self::OnlineDeployment => "OnlineDeployment",
            Self::BatchDeployment => "BatchDeployment",
            Self::OnlineEndpoint => "OnlineEndpoint",
            Self::BatchEndpoint => "BatchEndpoint",
            Self::WorkspaceConnection => "WorkspaceConnection",
            Self::Schedule => "Schedule",
        }
    }
}

impl std::fmt::Display for EntityFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for EntityFamily {
    type Err = UnknownFamilyError;

    /// Parse a family from its snake_case identifier. Hyphens are accepted
    /// in place of underscores so CLI input like `online-endpoint` works.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.replace('-', "_");
        Self::all()
            .iter()
            .copied()
            .find(|family| family.as_str() == normalized)
            .ok_or_else(|| UnknownFamilyError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_families_count() {
        assert_eq!(EntityFamily::all().len(), ENTITY_FAMILY_COUNT);
    }

    #[test]
    fn test_all_families_unique() {
        let mut seen = std::collections::HashSet::new();
        for f in EntityFamily::all() {
            assert!(seen.insert(f.as_str()), "Duplicate family: {f}");
        }
    }

    #[test]
    fn test_as_str_roundtrip() {
        for family in EntityFamily::all() {
            let parsed: EntityFamily = family.as_str().parse().unwrap();
            assert_eq!(*family, parsed);
        }
    }

    #[test]
    fn test_from_str_accepts_hyphens() {
        assert_eq!(
            "online-endpoint".parse::<EntityFamily>().unwrap(),
            EntityFamily::OnlineEndpoint
        );
        assert_eq!(
            "workspace-connection".parse::<EntityFamily>().unwrap(),
            EntityFamily::WorkspaceConnection
        );
    }

    #[test]
    fn test_from_str_invalid() {
        assert!("jobs".parse::<EntityFamily>().is_err());
        assert!("Job".parse::<EntityFamily>().is_err());
        assert!("".parse::<EntityFamily>().is_err());
    }

    #[test]
    fn test_serde_format_matches_as_str() {
        for family in EntityFamily::all() {
            let json = serde_json::to_string(family).unwrap();
            assert_eq!(json, format!("\"{}\"", family.as_str()));
        }
    }
}
