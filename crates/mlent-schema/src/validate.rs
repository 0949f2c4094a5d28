//! # Schema Validation
//!
//! Runtime validation of entity documents against JSON Schema definitions
//! (Draft 2020-12).
//!
//! ## Schema Resolution
//!
//! Schemas are registered by filename (e.g. `command_job.schema.json`) and
//! carry `$id` URIs of the form `https://schemas.mlent.dev/<filename>`.
//! Cross-schema `$ref`s (mostly into `common.schema.json`) are resolved by
//! [`LocalSchemaRetriever`] from the loaded set. The validator never goes
//! to the network.
//!
//! ## Failure shape
//!
//! A failed validation yields [`SchemaError::ValidationFailed`] with one
//! [`Violation`] per problem: the JSON Pointer of the offending value, the
//! schema keyword path and a readable message.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use jsonschema::error::ValidationErrorKind;
use jsonschema::{Retrieve, Uri, ValidationOptions, Validator};
use mlent_core::ValidationErrorType;
use serde_json::Value;
use thiserror::Error;

/// URI prefix of every schema `$id` in this workspace.
pub const SCHEMA_URI_PREFIX: &str = "https://schemas.mlent.dev/";

/// Resolves `$ref` URIs against schemas already loaded in memory.
struct LocalSchemaRetriever {
    schemas_by_uri: Arc<HashMap<String, Value>>,
}

impl Retrieve for LocalSchemaRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();

        if let Some(value) = self.schemas_by_uri.get(uri_str) {
            return Ok(value.clone());
        }

        let filename = uri_str.rsplit('/').next().unwrap_or(uri_str);
        if let Some(value) = self.schemas_by_uri.get(filename) {
            return Ok(value.clone());
        }

        // Draft metaschemas and anything else unregistered accept everything.
        Ok(serde_json::json!({}))
    }
}

/// Raw schema failure, before translation into a user-facing error.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The document did not conform to the schema.
    #[error("validation failed against schema '{schema_name}':\n{violations}")]
    ValidationFailed {
        /// Schema that was validated against.
        schema_name: String,
        /// Every individual problem found.
        violations: ValidationViolations,
    },

    /// The document passed the schema but could not be mapped onto the
    /// entity type.
    #[error("cannot build entity from schema '{schema_name}': {reason}")]
    Deserialization {
        /// Schema of the entity being built.
        schema_name: String,
        /// Serde's explanation.
        reason: String,
    },

    /// A schema could not be parsed or was not registered.
    #[error("schema load error for '{schema_name}': {reason}")]
    SchemaLoadError {
        /// Schema filename.
        schema_name: String,
        /// Why it could not be loaded.
        reason: String,
    },

    /// The compiled validator could not be built.
    #[error("validator build error for schema '{schema_name}': {reason}")]
    ValidatorBuildError {
        /// Schema filename.
        schema_name: String,
        /// Reason reported by `jsonschema`.
        reason: String,
    },
}

impl SchemaError {
    /// Name of the schema involved.
    pub fn schema_name(&self) -> &str {
        match self {
            Self::ValidationFailed { schema_name, .. }
            | Self::Deserialization { schema_name, .. }
            | Self::SchemaLoadError { schema_name, .. }
            | Self::ValidatorBuildError { schema_name, .. } => schema_name,
        }
    }

    /// Single-violation failure, used for problems found outside the
    /// schema itself (e.g. an unresolvable discriminator).
    pub fn single(
        schema_name: impl Into<String>,
        field: &str,
        message: impl Into<String>,
        kind: ValidationErrorType,
    ) -> Self {
        let instance_path = if field.is_empty() {
            String::new()
        } else {
            format!("/{}", field.replace('.', "/"))
        };
        Self::ValidationFailed {
            schema_name: schema_name.into(),
            violations: ValidationViolations {
                violations: vec![Violation {
                    instance_path,
                    schema_path: String::new(),
                    message: message.into(),
                    kind,
                    property: None,
                }],
            },
        }
    }

    /// Re-root every violation under `field`, for documents validated as a
    /// sub-tree of a larger one (a schedule's inline `create_job`).
    pub fn nest(self, field: &str) -> Self {
        match self {
            Self::ValidationFailed {
                schema_name,
                violations,
            } => {
                let prefix = format!("/{}", field.replace('.', "/"));
                let violations = violations
                    .violations
                    .into_iter()
                    .map(|mut v| {
                        v.instance_path = format!("{prefix}{}", v.instance_path);
                        v
                    })
                    .collect();
                Self::ValidationFailed {
                    schema_name,
                    violations: ValidationViolations { violations },
                }
            }
            other => other,
        }
    }
}

/// A single validation violation.
#[derive(Debug, Clone)]
pub struct Violation {
    /// JSON Pointer to the violating value in the document.
    pub instance_path: String,
    /// JSON Pointer within the schema that triggered the error.
    pub schema_path: String,
    /// Human-readable description.
    pub message: String,
    /// Classification of the failure.
    pub kind: ValidationErrorType,
    /// For missing required fields, the name of the missing property.
    pub property: Option<String>,
}

impl Violation {
    /// Dotted field path (`resources.instance_count`), including the missing
    /// property for required-field violations. Empty for the document root.
    pub fn field(&self) -> String {
        let mut segments: Vec<String> = self
            .instance_path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| s.replace("~1", "/").replace("~0", "~"))
            .collect();
        if let Some(property) = &self.property {
            segments.push(property.clone());
        }
        segments.join(".")
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = self.field();
        if field.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", field, self.message)
        }
    }
}

/// Collection of validation violations.
#[derive(Debug, Clone, Default)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// A schema validator backed by the `jsonschema` crate.
///
/// Holds every registered schema by filename. Validators are compiled on
/// first use with all other schemas available for `$ref` resolution, then
/// kept for the lifetime of the `SchemaValidator`.
#[derive(Clone, Default)]
pub struct SchemaValidator {
    schemas: HashMap<String, Value>,
    schemas_by_uri: Arc<HashMap<String, Value>>,
    compiled: HashMap<String, Arc<OnceLock<Result<Validator, String>>>>,
}

impl fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let compiled = self.compiled.values().filter(|slot| slot.get().is_some()).count();
        f.debug_struct("SchemaValidator")
            .field("schemas", &self.schema_names())
            .field("compiled", &compiled)
            .finish()
    }
}

impl SchemaValidator {
    /// Build a validator from `(filename, json text)` pairs.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::SchemaLoadError` for the first source that is
    /// not valid JSON.
    pub fn from_sources<'a>(
        sources: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, SchemaError> {
        let mut schemas = HashMap::new();
        for (name, text) in sources {
            let value: Value =
                serde_json::from_str(text).map_err(|e| SchemaError::SchemaLoadError {
                    schema_name: name.to_string(),
                    reason: format!("invalid JSON: {e}"),
                })?;
            schemas.insert(name.to_string(), value);
        }

        let mut schemas_by_uri: HashMap<String, Value> = HashMap::new();
        for (filename, value) in &schemas {
            schemas_by_uri.insert(format!("{SCHEMA_URI_PREFIX}{filename}"), value.clone());
            if let Some(id_str) = value.get("$id").and_then(|v| v.as_str()) {
                schemas_by_uri.insert(id_str.to_string(), value.clone());
            }
            schemas_by_uri.insert(filename.clone(), value.clone());
        }

        let compiled = schemas
            .keys()
            .map(|name| (name.clone(), Arc::new(OnceLock::new())))
            .collect();

        Ok(Self {
            schemas,
            schemas_by_uri: Arc::new(schemas_by_uri),
            compiled,
        })
    }

    /// Returns the number of loaded schemas.
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    /// Returns the names of all loaded schemas, sorted alphabetically.
    pub fn schema_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }

    /// Look up a loaded schema by filename.
    pub fn get_schema(&self, name: &str) -> Option<&Value> {
        self.schemas.get(name)
    }

    fn build_options(&self) -> ValidationOptions {
        let mut opts = jsonschema::options();
        opts.with_draft(jsonschema::Draft::Draft202012);
        opts.with_retriever(LocalSchemaRetriever {
            schemas_by_uri: Arc::clone(&self.schemas_by_uri),
        });
        opts
    }

    /// The compiled `Validator` for a schema, compiling it on first use.
    ///
    /// # Errors
    ///
    /// `SchemaLoadError` if the schema is not registered,
    /// `ValidatorBuildError` if it does not compile.
    pub fn build_validator(&self, schema_name: &str) -> Result<&Validator, SchemaError> {
        let (schema_value, slot) = self
            .schemas
            .get(schema_name)
            .zip(self.compiled.get(schema_name))
            .ok_or_else(|| SchemaError::SchemaLoadError {
                schema_name: schema_name.to_string(),
                reason: "schema not registered".to_string(),
            })?;

        slot.get_or_init(|| {
            tracing::debug!(schema = schema_name, "compiling schema");
            self.build_options()
                .build(schema_value)
                .map_err(|e| e.to_string())
        })
        .as_ref()
        .map_err(|reason| SchemaError::ValidatorBuildError {
            schema_name: schema_name.to_string(),
            reason: reason.clone(),
        })
    }

    /// Validate a JSON value against a named schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::ValidationFailed` listing every violation.
    pub fn validate_document(&self, instance: &Value, schema_name: &str) -> Result<(), SchemaError> {
        let validator = self.build_validator(schema_name)?;

        let errors: Vec<Violation> = validator
            .iter_errors(instance)
            .map(|e| {
                let (kind, property) = classify(&e.kind);
                Violation {
                    instance_path: e.instance_path.to_string(),
                    schema_path: e.schema_path.to_string(),
                    message: e.to_string(),
                    kind,
                    property,
                }
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            tracing::debug!(
                schema = schema_name,
                violations = errors.len(),
                "document failed schema validation"
            );
            Err(SchemaError::ValidationFailed {
                schema_name: schema_name.to_string(),
                violations: ValidationViolations { violations: errors },
            })
        }
    }
}

fn classify(kind: &ValidationErrorKind) -> (ValidationErrorType, Option<String>) {
    match kind {
        ValidationErrorKind::Required { property } => (
            ValidationErrorType::MissingValue,
            Some(
                property
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| property.to_string()),
            ),
        ),
        ValidationErrorKind::AdditionalProperties { .. } => (ValidationErrorType::UnknownField, None),
        ValidationErrorKind::Enum { .. }
        | ValidationErrorKind::Constant { .. }
        | ValidationErrorKind::Type { .. }
        | ValidationErrorKind::Pattern { .. }
        | ValidationErrorKind::Minimum { .. }
        | ValidationErrorKind::Maximum { .. }
        | ValidationErrorKind::MinLength { .. } => (ValidationErrorType::InvalidValue, None),
        _ => (ValidationErrorType::GenericType, None),
    }
}
