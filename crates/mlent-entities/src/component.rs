//! # Components
//!
//! Reusable, versioned job templates. Subtypes: `command` (default),
//! `parallel` and `pipeline`.

use std::collections::BTreeMap;
use std::path::Path;

use mlent_core::EntityFamily;
use mlent_schema::SchemaError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::{
    version_string, Distribution, EnvironmentRef, InputSpec, OutputSpec, Resources,
    RetrySettings, Tags,
};
use crate::job::PipelineStep;
use crate::paths::ResolvePaths;
use crate::registry::{build_resolved, LoadContext, Resource, SubtypeSpec};

const COMMAND_COMPONENT_SCHEMA: &str = "command_component.schema.json";
const PARALLEL_COMPONENT_SCHEMA: &str = "parallel_component.schema.json";
const PIPELINE_COMPONENT_SCHEMA: &str = "pipeline_component.schema.json";

/// A component of any subtype.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Component {
    Command(CommandComponent),
    Parallel(ParallelComponent),
    Pipeline(PipelineComponent),
}

impl Component {
    pub fn component_type(&self) -> &'static str {
        match self {
            Component::Command(_) => "command",
            Component::Parallel(_) => "parallel",
            Component::Pipeline(_) => "pipeline",
        }
    }

    pub fn metadata(&self) -> &ComponentMetadata {
        match self {
            Component::Command(c) => &c.metadata,
            Component::Parallel(c) => &c.metadata,
            Component::Pipeline(c) => &c.metadata,
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata().name
    }

    pub fn version(&self) -> Option<&str> {
        self.metadata().version.as_deref()
    }
}

/// Interface and identity shared by all component subtypes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentMetadata {
    pub name: String,
    #[serde(default, deserialize_with = "version_string", skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_deterministic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<BTreeMap<String, InputSpec>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<BTreeMap<String, OutputSpec>>,
}

/// Matches `schemas/command_component.schema.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandComponent {
    #[serde(flatten)]
    pub metadata: ComponentMetadata,
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub environment: EnvironmentRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Resources>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution: Option<Distribution>,
}

impl ResolvePaths for CommandComponent {
    fn resolve_paths(&mut self, base_dir: &Path) {
        self.code.resolve_paths(base_dir);
        self.environment.resolve_paths(base_dir);
    }
}

/// The function each parallel mini-batch runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallelTask {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub entry_script: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_arguments: Option<String>,
    pub environment: EnvironmentRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub append_row_to: Option<String>,
}

/// Matches `schemas/parallel_component.schema.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallelComponent {
    #[serde(flatten)]
    pub metadata: ComponentMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Resources>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mini_batch_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_threshold: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mini_batch_error_threshold: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrency_per_instance: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_settings: Option<RetrySettings>,
    pub task: ParallelTask,
}

impl ResolvePaths for ParallelComponent {
    fn resolve_paths(&mut self, base_dir: &Path) {
        self.task.code.resolve_paths(base_dir);
        self.task.environment.resolve_paths(base_dir);
    }
}

/// Matches `schemas/pipeline_component.schema.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineComponent {
    #[serde(flatten)]
    pub metadata: ComponentMetadata,
    pub jobs: BTreeMap<String, PipelineStep>,
}

impl ResolvePaths for PipelineComponent {
    fn resolve_paths(&mut self, base_dir: &Path) {
        self.jobs.resolve_paths(base_dir);
    }
}

fn build_command(value: Value, ctx: &LoadContext<'_>) -> Result<Component, SchemaError> {
    build_resolved(value, COMMAND_COMPONENT_SCHEMA, ctx).map(Component::Command)
}

fn build_parallel(value: Value, ctx: &LoadContext<'_>) -> Result<Component, SchemaError> {
    build_resolved(value, PARALLEL_COMPONENT_SCHEMA, ctx).map(Component::Parallel)
}

fn build_pipeline(value: Value, ctx: &LoadContext<'_>) -> Result<Component, SchemaError> {
    build_resolved(value, PIPELINE_COMPONENT_SCHEMA, ctx).map(Component::Pipeline)
}

static COMPONENT_SUBTYPES: [SubtypeSpec<Component>; 3] = [
    SubtypeSpec {
        discriminator: "command",
        schema: COMMAND_COMPONENT_SCHEMA,
        build: build_command,
    },
    SubtypeSpec {
        discriminator: "parallel",
        schema: PARALLEL_COMPONENT_SCHEMA,
        build: build_parallel,
    },
    SubtypeSpec {
        discriminator: "pipeline",
        schema: PIPELINE_COMPONENT_SCHEMA,
        build: build_pipeline,
    },
];

impl Resource for Component {
    const FAMILY: EntityFamily = EntityFamily::Component;
    const STRUCTURED_VALIDATION: bool = true;
    const DEFAULT_SUBTYPE: Option<&'static str> = Some("command");

    fn subtypes() -> &'static [SubtypeSpec<Self>] {
        &COMPONENT_SUBTYPES
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{embedded_validator, resolve_subtype};
    use mlent_core::{Document, Origin};
    use serde_json::json;

    fn build(value: Value, origin: &str) -> Result<Component, SchemaError> {
        let doc = Document::from_json(value, EntityFamily::Component).unwrap();
        let resolved = resolve_subtype::<Component>(&doc)?;
        let ctx = LoadContext::new(Origin::new(origin), embedded_validator().unwrap());
        (resolved.spec.build)(doc.into_value(), &ctx)
    }

    #[test]
    fn test_command_component() {
        let component = build(
            json!({
                "name": "train_model",
                "version": 1,
                "command": "python train.py --data ${{inputs.data}}",
                "code": "./src",
                "environment": "azureml:sklearn:1",
                "inputs": {"data": {"type": "uri_folder"}, "epochs": {"type": "integer", "default": 10}},
                "outputs": {"model": {"type": "mlflow_model"}}
            }),
            "components/train.yml",
        )
        .unwrap();
        assert_eq!(component.component_type(), "command");
        assert_eq!(component.name(), "train_model");
        assert_eq!(component.version(), Some("1"));
        let Component::Command(command) = component else {
            panic!("expected command component");
        };
        assert_eq!(
            command.code.unwrap(),
            Path::new("components").join("./src").to_string_lossy()
        );
        let inputs = command.metadata.inputs.unwrap();
        assert_eq!(inputs["epochs"].default, Some(json!(10)));
    }

    #[test]
    fn test_parallel_component() {
        let component = build(
            json!({
                "type": "parallel",
                "name": "batch_score",
                "mini_batch_size": "10kb",
                "input_data": "${{inputs.data}}",
                "task": {
                    "type": "run_function",
                    "code": "score",
                    "entry_script": "score.py",
                    "environment": "azureml:env:2"
                }
            }),
            "./",
        )
        .unwrap();
        let Component::Parallel(parallel) = component else {
            panic!("expected parallel component");
        };
        assert_eq!(parallel.task.entry_script, "score.py");
    }

    #[test]
    fn test_component_requires_name() {
        let err = build(json!({"command": "echo", "environment": "azureml:e:1"}), "./").unwrap_err();
        let SchemaError::ValidationFailed { violations, .. } = err else {
            panic!("expected ValidationFailed");
        };
        assert_eq!(violations.violations()[0].field(), "name");
    }

    #[test]
    fn test_serialized_component_round_trips_through_registry() {
        let component = build(
            json!({"name": "c", "command": "echo", "environment": "azureml:e:1"}),
            "./",
        )
        .unwrap();
        let value = serde_json::to_value(&component).unwrap();
        assert_eq!(value["type"], "command");
        assert_eq!(build(value, "./").unwrap(), component);
    }
}
