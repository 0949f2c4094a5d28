//! # Assets
//!
//! Versioned assets: code snapshots, models, data and environments. All
//! four families have a single shape, and each one points at local files
//! that are resolved against the document origin.

use std::path::Path;

use mlent_core::{Document, EntityFamily};
use mlent_schema::SchemaError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::{version_string, StringMap, Tags};
use crate::paths::ResolvePaths;
use crate::registry::{build_resolved, LoadContext, Resource, SubtypeSpec};

const CODE_SCHEMA: &str = "code.schema.json";
const MODEL_SCHEMA: &str = "model.schema.json";
const DATA_SCHEMA: &str = "data.schema.json";
const ENVIRONMENT_SCHEMA: &str = "environment.schema.json";

// ---------------------------------------------------------------------------
// Code
// ---------------------------------------------------------------------------

/// A code snapshot uploaded alongside jobs and components.
/// Matches `schemas/code.schema.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Code {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "version_string", skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
    /// Local directory or remote URI.
    pub path: String,
}

impl ResolvePaths for Code {
    fn resolve_paths(&mut self, base_dir: &Path) {
        self.path.resolve_paths(base_dir);
    }
}

fn build_code(value: Value, ctx: &LoadContext<'_>) -> Result<Code, SchemaError> {
    build_resolved(value, CODE_SCHEMA, ctx)
}

static CODE_SUBTYPES: [SubtypeSpec<Code>; 1] = [SubtypeSpec {
    discriminator: "code",
    schema: CODE_SCHEMA,
    build: build_code,
}];

impl Resource for Code {
    const FAMILY: EntityFamily = EntityFamily::Code;
    const STRUCTURED_VALIDATION: bool = true;
    const DEFAULT_SUBTYPE: Option<&'static str> = Some("code");

    fn subtypes() -> &'static [SubtypeSpec<Self>] {
        &CODE_SUBTYPES
    }

    fn discriminator(_: &Document) -> Option<String> {
        None
    }
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// A registered model.
/// Matches `schemas/model.schema.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub name: String,
    #[serde(default, deserialize_with = "version_string", skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// `custom_model`, `mlflow_model` or `triton_model`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub model_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<StringMap>,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flavors: Option<Value>,
}

impl ResolvePaths for Model {
    fn resolve_paths(&mut self, base_dir: &Path) {
        self.path.resolve_paths(base_dir);
    }
}

fn build_model(value: Value, ctx: &LoadContext<'_>) -> Result<Model, SchemaError> {
    build_resolved(value, MODEL_SCHEMA, ctx)
}

static MODEL_SUBTYPES: [SubtypeSpec<Model>; 1] = [SubtypeSpec {
    discriminator: "model",
    schema: MODEL_SCHEMA,
    build: build_model,
}];

impl Resource for Model {
    const FAMILY: EntityFamily = EntityFamily::Model;
    const STRUCTURED_VALIDATION: bool = true;
    const DEFAULT_SUBTYPE: Option<&'static str> = Some("model");

    fn subtypes() -> &'static [SubtypeSpec<Self>] {
        &MODEL_SUBTYPES
    }

    // `type` is the model format, not a subtype selector.
    fn discriminator(_: &Document) -> Option<String> {
        None
    }
}

// ---------------------------------------------------------------------------
// Data
// ---------------------------------------------------------------------------

/// A data asset.
/// Matches `schemas/data.schema.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Data {
    pub name: String,
    #[serde(default, deserialize_with = "version_string", skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// `uri_file`, `uri_folder` or `mltable`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<StringMap>,
    pub path: String,
}

impl ResolvePaths for Data {
    fn resolve_paths(&mut self, base_dir: &Path) {
        self.path.resolve_paths(base_dir);
    }
}

fn build_data(value: Value, ctx: &LoadContext<'_>) -> Result<Data, SchemaError> {
    build_resolved(value, DATA_SCHEMA, ctx)
}

static DATA_SUBTYPES: [SubtypeSpec<Data>; 1] = [SubtypeSpec {
    discriminator: "data",
    schema: DATA_SCHEMA,
    build: build_data,
}];

impl Resource for Data {
    const FAMILY: EntityFamily = EntityFamily::Data;
    const STRUCTURED_VALIDATION: bool = true;
    const DEFAULT_SUBTYPE: Option<&'static str> = Some("data");

    fn subtypes() -> &'static [SubtypeSpec<Self>] {
        &DATA_SUBTYPES
    }

    fn discriminator(_: &Document) -> Option<String> {
        None
    }
}

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

/// Docker build context of an environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildContext {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dockerfile_path: Option<String>,
}

/// A runtime environment: a base image plus optional conda file, or a
/// Docker build context.
/// Matches `schemas/environment.schema.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "version_string", skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conda_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<BuildContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inference_config: Option<Value>,
}

impl ResolvePaths for Environment {
    fn resolve_paths(&mut self, base_dir: &Path) {
        self.conda_file.resolve_paths(base_dir);
        if let Some(build) = &mut self.build {
            build.path.resolve_paths(base_dir);
        }
    }
}

fn build_environment(value: Value, ctx: &LoadContext<'_>) -> Result<Environment, SchemaError> {
    build_resolved(value, ENVIRONMENT_SCHEMA, ctx)
}

static ENVIRONMENT_SUBTYPES: [SubtypeSpec<Environment>; 1] = [SubtypeSpec {
    discriminator: "environment",
    schema: ENVIRONMENT_SCHEMA,
    build: build_environment,
}];

impl Resource for Environment {
    const FAMILY: EntityFamily = EntityFamily::Environment;
    const STRUCTURED_VALIDATION: bool = true;
    const DEFAULT_SUBTYPE: Option<&'static str> = Some("environment");

    fn subtypes() -> &'static [SubtypeSpec<Self>] {
        &ENVIRONMENT_SUBTYPES
    }

    fn discriminator(_: &Document) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{embedded_validator, resolve_subtype};
    use mlent_core::{Origin, ValidationErrorType};
    use serde_json::json;

    fn ctx(origin: &str) -> LoadContext<'static> {
        LoadContext::new(Origin::new(origin), embedded_validator().unwrap())
    }

    #[test]
    fn test_model_type_is_not_a_discriminator() {
        let doc = Document::from_json(
            json!({"name": "m", "path": "m.pkl", "type": "mlflow_model"}),
            EntityFamily::Model,
        )
        .unwrap();
        let resolved = resolve_subtype::<Model>(&doc).unwrap();
        assert!(resolved.type_str.is_none());
        let model = (resolved.spec.build)(doc.into_value(), &ctx("models/m.yml")).unwrap();
        assert_eq!(model.model_type.as_deref(), Some("mlflow_model"));
        assert_eq!(model.path, Path::new("models").join("m.pkl").to_string_lossy());
    }

    #[test]
    fn test_numeric_version_kept_as_string() {
        let model = build_model(json!({"name": "m", "version": 2, "path": "m.pkl"}), &ctx("./")).unwrap();
        assert_eq!(model.version.as_deref(), Some("2"));
    }

    #[test]
    fn test_data_remote_path_untouched() {
        let data = build_data(
            json!({"name": "d", "type": "uri_file", "path": "https://example.com/titanic.csv"}),
            &ctx("data/d.yml"),
        )
        .unwrap();
        assert_eq!(data.path, "https://example.com/titanic.csv");
    }

    #[test]
    fn test_data_rejects_unknown_type() {
        let err = build_data(json!({"name": "d", "type": "parquet", "path": "x"}), &ctx("./")).unwrap_err();
        let SchemaError::ValidationFailed { violations, .. } = err else {
            panic!("expected ValidationFailed");
        };
        assert_eq!(violations.violations()[0].field(), "type");
    }

    #[test]
    fn test_environment_paths_resolved() {
        let env = build_environment(
            json!({"name": "e", "image": "mcr.microsoft.com/base:latest", "conda_file": "conda.yml"}),
            &ctx("envs/e.yml"),
        )
        .unwrap();
        assert_eq!(
            env.conda_file.unwrap(),
            Path::new("envs").join("conda.yml").to_string_lossy()
        );
        assert_eq!(env.image.as_deref(), Some("mcr.microsoft.com/base:latest"));
    }

    #[test]
    fn test_environment_needs_image_or_build() {
        let err = build_environment(json!({"name": "e"}), &ctx("./")).unwrap_err();
        assert!(matches!(err, SchemaError::ValidationFailed { .. }));
    }

    #[test]
    fn test_code_requires_path() {
        let err = build_code(json!({"name": "c"}), &ctx("./")).unwrap_err();
        let SchemaError::ValidationFailed { violations, .. } = err else {
            panic!("expected ValidationFailed");
        };
        assert_eq!(violations.violations()[0].kind, ValidationErrorType::MissingValue);
        assert_eq!(violations.violations()[0].field(), "path");
    }
}
