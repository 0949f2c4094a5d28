//! # Shared Entity Types
//!
//! Building blocks used by several families. Each type matches a
//! definition in `schemas/common.schema.json`.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::assets::Environment;
use crate::paths::ResolvePaths;

/// Free-form string tags.
pub type Tags = BTreeMap<String, String>;

/// Scalar-valued property bag (`environment_variables`, `properties`, ...).
pub type StringMap = BTreeMap<String, Value>;

/// Asset versions may be written as `1`, `1.5` or `"2024-01"`; all are
/// kept as strings.
pub(crate) fn version_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "version must be a string or number, got {other}"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Compute-side settings
// ---------------------------------------------------------------------------

/// Matches `common.schema.json#/$defs/resources`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resources {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shm_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Value>,
}

/// Managed identity configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(rename = "type")]
    pub identity_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_assigned_identities: Option<Vec<Value>>,
}

/// Distributed training launcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Distribution {
    Mpi {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        process_count_per_instance: Option<u32>,
    },
    Pytorch {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        process_count_per_instance: Option<u32>,
    },
    Tensorflow {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        worker_count: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parameter_server_count: Option<u32>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrySettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
}

/// Liveness/readiness probe timings, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Probe {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_delay: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_threshold: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_threshold: Option<u32>,
}

// ---------------------------------------------------------------------------
// Job inputs and outputs
// ---------------------------------------------------------------------------

/// A job input binding: either a literal or a data asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobInput {
    Asset {
        #[serde(rename = "type")]
        input_type: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mode: Option<String>,
    },
    Literal(Value),
}

impl ResolvePaths for JobInput {
    fn resolve_paths(&mut self, base_dir: &Path) {
        if let JobInput::Asset { path, .. } = self {
            path.resolve_paths(base_dir);
        }
    }
}

/// A job output binding. A bare key (`model_output:`) means "default
/// output" and deserializes as `None` in the surrounding map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobOutput {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub output_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

/// Declared component input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSpec {
    #[serde(rename = "type")]
    pub input_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<Value>>,
}

/// Declared component output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSpec {
    #[serde(rename = "type")]
    pub output_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

// ---------------------------------------------------------------------------
// Asset references
// ---------------------------------------------------------------------------

/// An environment given by reference (`azureml:env:1`) or inline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnvironmentRef {
    Reference(String),
    Inline(Box<Environment>),
}

impl ResolvePaths for EnvironmentRef {
    fn resolve_paths(&mut self, base_dir: &Path) {
        if let EnvironmentRef::Inline(environment) = self {
            environment.resolve_paths(base_dir);
        }
    }
}

/// A model declared inline in a deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "version_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub version: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub model_type: Option<String>,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A model given by reference or inline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModelRef {
    Reference(String),
    Inline(InlineModel),
}

impl ResolvePaths for ModelRef {
    fn resolve_paths(&mut self, base_dir: &Path) {
        if let ModelRef::Inline(model) = self {
            model.path.resolve_paths(base_dir);
        }
    }
}

/// Scoring code of a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub scoring_script: String,
}

impl ResolvePaths for CodeConfiguration {
    fn resolve_paths(&mut self, base_dir: &Path) {
        self.code.resolve_paths(base_dir);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Versioned {
        #[serde(default, deserialize_with = "version_string")]
        version: Option<String>,
    }

    #[test]
    fn test_version_accepts_numbers_and_strings() {
        let v: Versioned = serde_json::from_value(json!({"version": 3})).unwrap();
        assert_eq!(v.version.as_deref(), Some("3"));
        let v: Versioned = serde_json::from_value(json!({"version": "2024.1"})).unwrap();
        assert_eq!(v.version.as_deref(), Some("2024.1"));
        let v: Versioned = serde_json::from_value(json!({})).unwrap();
        assert!(v.version.is_none());
        assert!(serde_json::from_value::<Versioned>(json!({"version": [1]})).is_err());
    }

    #[test]
    fn test_job_input_literal_and_asset() {
        let literal: JobInput = serde_json::from_value(json!(0.01)).unwrap();
        assert_eq!(literal, JobInput::Literal(json!(0.01)));

        let mut asset: JobInput =
            serde_json::from_value(json!({"type": "uri_folder", "path": "data"})).unwrap();
        asset.resolve_paths(Path::new("jobs"));
        let JobInput::Asset { path, .. } = asset else {
            panic!("expected asset input");
        };
        assert_eq!(path.unwrap(), Path::new("jobs").join("data").to_string_lossy());
    }

    #[test]
    fn test_distribution_tagged() {
        let d: Distribution =
            serde_json::from_value(json!({"type": "pytorch", "process_count_per_instance": 4}))
                .unwrap();
        assert_eq!(
            d,
            Distribution::Pytorch {
                process_count_per_instance: Some(4)
            }
        );
        assert_eq!(serde_json::to_value(&d).unwrap()["type"], "pytorch");
    }

    #[test]
    fn test_environment_ref_reference_is_not_a_path() {
        let mut env: EnvironmentRef = serde_json::from_value(json!("azureml:sklearn:1")).unwrap();
        env.resolve_paths(Path::new("jobs"));
        assert_eq!(env, EnvironmentRef::Reference("azureml:sklearn:1".to_string()));
    }
}
