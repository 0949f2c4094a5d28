//! # Jobs
//!
//! Four job subtypes selected by `type`:
//!
//! - `command` (default): one command in one environment.
//! - `sweep`: hyperparameter search over a command trial.
//! - `pipeline`: a graph of steps, each bound to a component.
//! - `spark`: a Spark application.

use std::collections::BTreeMap;
use std::path::Path;

use mlent_core::EntityFamily;
use mlent_schema::SchemaError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::{
    Distribution, EnvironmentRef, Identity, JobInput, JobOutput, Resources, StringMap, Tags,
};
use crate::paths::ResolvePaths;
use crate::registry::{build_resolved, LoadContext, Resource, SubtypeSpec};

pub(crate) const COMMAND_JOB_SCHEMA: &str = "command_job.schema.json";
pub(crate) const SWEEP_JOB_SCHEMA: &str = "sweep_job.schema.json";
pub(crate) const PIPELINE_JOB_SCHEMA: &str = "pipeline_job.schema.json";
pub(crate) const SPARK_JOB_SCHEMA: &str = "spark_job.schema.json";

/// A job of any subtype.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Job {
    Command(CommandJob),
    Sweep(SweepJob),
    Pipeline(PipelineJob),
    Spark(SparkJob),
}

impl Job {
    /// Discriminator of this job.
    pub fn job_type(&self) -> &'static str {
        match self {
            Job::Command(_) => "command",
            Job::Sweep(_) => "sweep",
            Job::Pipeline(_) => "pipeline",
            Job::Spark(_) => "spark",
        }
    }

    /// Shared metadata.
    pub fn metadata(&self) -> &JobMetadata {
        match self {
            Job::Command(j) => &j.metadata,
            Job::Sweep(j) => &j.metadata,
            Job::Pipeline(j) => &j.metadata,
            Job::Spark(j) => &j.metadata,
        }
    }

    /// Job name, when the document gives one.
    pub fn name(&self) -> Option<&str> {
        self.metadata().name.as_deref()
    }
}

/// Fields every job subtype accepts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experiment_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<StringMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<BTreeMap<String, JobInput>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<BTreeMap<String, Option<JobOutput>>>,
}

impl ResolvePaths for JobMetadata {
    fn resolve_paths(&mut self, base_dir: &Path) {
        self.inputs.resolve_paths(base_dir);
    }
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandLimits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

/// Matches `schemas/command_job.schema.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandJob {
    #[serde(flatten)]
    pub metadata: JobMetadata,
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub environment: EnvironmentRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_variables: Option<StringMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Resources>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution: Option<Distribution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<CommandLimits>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub services: Option<Value>,
}

impl ResolvePaths for CommandJob {
    fn resolve_paths(&mut self, base_dir: &Path) {
        self.metadata.resolve_paths(base_dir);
        self.code.resolve_paths(base_dir);
        self.environment.resolve_paths(base_dir);
    }
}

// ---------------------------------------------------------------------------
// Sweep
// ---------------------------------------------------------------------------

/// The command each sweep trial runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialSpec {
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub environment: EnvironmentRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_variables: Option<StringMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Resources>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution: Option<Distribution>,
}

/// One dimension of the search space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchDomain {
    /// `choice`, `uniform`, `loguniform`, ...
    #[serde(rename = "type")]
    pub domain_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mu: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sigma: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    pub goal: String,
    pub primary_metric: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepLimits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_total_trials: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrent_trials: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trial_timeout: Option<u64>,
}

/// Early termination policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarlyTermination {
    #[serde(rename = "type")]
    pub policy_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation_interval: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_evaluation: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slack_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slack_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncation_percentage: Option<u32>,
}

/// Matches `schemas/sweep_job.schema.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepJob {
    #[serde(flatten)]
    pub metadata: JobMetadata,
    pub trial: TrialSpec,
    pub search_space: BTreeMap<String, SearchDomain>,
    pub sampling_algorithm: String,
    pub objective: Objective,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<SweepLimits>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub early_termination: Option<EarlyTermination>,
}

impl ResolvePaths for SweepJob {
    fn resolve_paths(&mut self, base_dir: &Path) {
        self.metadata.resolve_paths(base_dir);
        self.trial.code.resolve_paths(base_dir);
        self.trial.environment.resolve_paths(base_dir);
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_compute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_datastore: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continue_on_step_failure: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_rerun: Option<bool>,
}

/// One node of a pipeline graph.
///
/// `component` is either a registry reference or a path to a component
/// YAML file. Fields the step carries beyond the common ones (an inline
/// command, for instance) are kept in `settings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineStep {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub step_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Value>,
    #[serde(flatten)]
    pub settings: BTreeMap<String, Value>,
}

impl ResolvePaths for PipelineStep {
    fn resolve_paths(&mut self, base_dir: &Path) {
        self.component.resolve_paths(base_dir);
        if let Some(Value::String(code)) = self.settings.get_mut("code") {
            code.resolve_paths(base_dir);
        }
    }
}

/// Matches `schemas/pipeline_job.schema.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineJob {
    #[serde(flatten)]
    pub metadata: JobMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<PipelineSettings>,
    pub jobs: BTreeMap<String, PipelineStep>,
}

impl ResolvePaths for PipelineJob {
    fn resolve_paths(&mut self, base_dir: &Path) {
        self.metadata.resolve_paths(base_dir);
        self.jobs.resolve_paths(base_dir);
    }
}

// ---------------------------------------------------------------------------
// Spark
// ---------------------------------------------------------------------------

/// Entry point of a Spark job: a Python file or a JVM class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparkEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparkResources {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_version: Option<String>,
}

/// Matches `schemas/spark_job.schema.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparkJob {
    #[serde(flatten)]
    pub metadata: JobMetadata,
    pub code: String,
    pub entry: SparkEntry,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conf: Option<StringMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub py_files: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jars: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archives: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<EnvironmentRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<SparkResources>,
}

impl ResolvePaths for SparkJob {
    // Only `code` is resolved; py_files, jars and the rest are relative to it.
    fn resolve_paths(&mut self, base_dir: &Path) {
        self.metadata.resolve_paths(base_dir);
        self.code.resolve_paths(base_dir);
        self.environment.resolve_paths(base_dir);
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

fn build_command(value: Value, ctx: &LoadContext<'_>) -> Result<Job, SchemaError> {
    build_resolved(value, COMMAND_JOB_SCHEMA, ctx).map(Job::Command)
}

fn build_sweep(value: Value, ctx: &LoadContext<'_>) -> Result<Job, SchemaError> {
    build_resolved(value, SWEEP_JOB_SCHEMA, ctx).map(Job::Sweep)
}

fn build_pipeline(value: Value, ctx: &LoadContext<'_>) -> Result<Job, SchemaError> {
    build_resolved(value, PIPELINE_JOB_SCHEMA, ctx).map(Job::Pipeline)
}

fn build_spark(value: Value, ctx: &LoadContext<'_>) -> Result<Job, SchemaError> {
    build_resolved(value, SPARK_JOB_SCHEMA, ctx).map(Job::Spark)
}

static JOB_SUBTYPES: [SubtypeSpec<Job>; 4] = [
    SubtypeSpec {
        discriminator: "command",
        schema: COMMAND_JOB_SCHEMA,
        build: build_command,
    },
    SubtypeSpec {
        discriminator: "sweep",
        schema: SWEEP_JOB_SCHEMA,
        build: build_sweep,
    },
    SubtypeSpec {
        discriminator: "pipeline",
        schema: PIPELINE_JOB_SCHEMA,
        build: build_pipeline,
    },
    SubtypeSpec {
        discriminator: "spark",
        schema: SPARK_JOB_SCHEMA,
        build: build_spark,
    },
];

impl Resource for Job {
    const FAMILY: EntityFamily = EntityFamily::Job;
    const STRUCTURED_VALIDATION: bool = true;
    const DEFAULT_SUBTYPE: Option<&'static str> = Some("command");

    fn subtypes() -> &'static [SubtypeSpec<Self>] {
        &JOB_SUBTYPES
    }
}
