//! # Subtype Registry
//!
//! Each entity family implements [`Resource`]: a static table of
//! [`SubtypeSpec`]s keyed by discriminator, an optional default subtype,
//! and a function reading the discriminator out of a document.
//!
//! Resolution rules ([`resolve_subtype`]):
//!
//! - A known discriminator selects its subtype.
//! - An unknown discriminator falls back to the default subtype. That
//!   subtype's schema pins `type`, so validation reports the bad value and
//!   the caller can attach guidance naming the observed type.
//! - A missing discriminator selects the default subtype.
//! - Families without a default report a violation on `type` instead.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use mlent_core::{Document, EntityFamily, Origin, ValidationErrorType};
use mlent_schema::{SchemaError, SchemaValidator};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::paths::{self, ResolvePaths};

/// Builds one concrete subtype from a document value.
pub type BuildFn<E> = fn(Value, &LoadContext<'_>) -> Result<E, SchemaError>;

/// One concrete subtype of a family.
pub struct SubtypeSpec<E: 'static> {
    /// Value of the discriminator selecting this subtype.
    pub discriminator: &'static str,
    /// Embedded schema the document is validated against.
    pub schema: &'static str,
    /// Constructor.
    pub build: BuildFn<E>,
}

impl<E> std::fmt::Debug for SubtypeSpec<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubtypeSpec")
            .field("discriminator", &self.discriminator)
            .field("schema", &self.schema)
            .finish()
    }
}

/// An entity family with a discriminator registry.
pub trait Resource: Sized + 'static {
    /// Error target reported for this family.
    const FAMILY: EntityFamily;

    /// Whether schema failures are translated into a structured
    /// `SchemaValidationError` or surfaced raw.
    const STRUCTURED_VALIDATION: bool;

    /// Discriminator of the subtype used when none (or an unknown one) is
    /// given. `None` means the discriminator is required.
    const DEFAULT_SUBTYPE: Option<&'static str>;

    /// Every concrete subtype.
    fn subtypes() -> &'static [SubtypeSpec<Self>];

    /// Read the discriminator from a document. Defaults to the `type` field.
    fn discriminator(document: &Document) -> Option<String> {
        type_field(document)
    }
}

/// The `type` field as a string. Numbers and booleans are stringified so
/// that an ill-typed discriminator is still reported by value.
pub fn type_field(document: &Document) -> Option<String> {
    match document.get("type")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Outcome of [`resolve_subtype`].
#[derive(Debug)]
pub struct Resolved<E: 'static> {
    /// Subtype that will build the entity.
    pub spec: &'static SubtypeSpec<E>,
    /// Discriminator observed in (or inferred from) the document.
    pub type_str: Option<String>,
}

/// Pick the concrete subtype for `document`.
///
/// # Errors
///
/// A single-violation `SchemaError` on `type` when the family has no
/// default and the discriminator is missing or unknown.
pub fn resolve_subtype<E: Resource>(document: &Document) -> Result<Resolved<E>, SchemaError> {
    let subtypes = E::subtypes();
    let observed = E::discriminator(document);
    let find = |wanted: &str| subtypes.iter().find(|s| s.discriminator == wanted);

    if let Some(spec) = observed.as_deref().and_then(find) {
        return Ok(Resolved {
            spec,
            type_str: observed,
        });
    }

    if let Some(spec) = E::DEFAULT_SUBTYPE.and_then(find) {
        if let Some(unknown) = &observed {
            tracing::debug!(
                family = %E::FAMILY,
                discriminator = %unknown,
                fallback = spec.discriminator,
                "unknown discriminator, using default subtype"
            );
        }
        return Ok(Resolved {
            spec,
            type_str: observed,
        });
    }

    let schema_name = format!("{}.schema.json", E::FAMILY.as_str());
    let allowed: Vec<&str> = subtypes.iter().map(|s| s.discriminator).collect();
    Err(match observed {
        None => SchemaError::single(
            schema_name,
            "type",
            "Missing data for required field.",
            ValidationErrorType::MissingValue,
        ),
        Some(unknown) => SchemaError::single(
            schema_name,
            "type",
            format!("{unknown:?} is not one of {allowed:?}"),
            ValidationErrorType::InvalidValue,
        ),
    })
}

/// Everything a subtype constructor needs besides the document itself.
#[derive(Debug, Clone)]
pub struct LoadContext<'v> {
    /// Where the document came from.
    pub origin: Origin,
    /// Directory relative file references resolve against.
    pub base_dir: PathBuf,
    /// Validator holding the embedded schemas.
    pub validator: &'v SchemaValidator,
}

impl<'v> LoadContext<'v> {
    /// Context for a document loaded from `origin`.
    pub fn new(origin: Origin, validator: &'v SchemaValidator) -> Self {
        let base_dir = origin.base_dir();
        Self {
            origin,
            base_dir,
            validator,
        }
    }

    /// Resolve a file reference found in the document.
    pub fn resolve(&self, reference: &str) -> String {
        paths::resolve_reference(&self.base_dir, reference)
    }

    /// Base directory as a path.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

/// Validate `value` against `schema`, then deserialize it.
///
/// # Errors
///
/// `ValidationFailed` from the schema, or `Deserialization` when serde
/// rejects a value the schema allowed.
pub fn build_from_schema<T: DeserializeOwned>(
    value: Value,
    schema: &str,
    ctx: &LoadContext<'_>,
) -> Result<T, SchemaError> {
    ctx.validator.validate_document(&value, schema)?;
    serde_json::from_value(value).map_err(|e| SchemaError::Deserialization {
        schema_name: schema.to_string(),
        reason: e.to_string(),
    })
}

/// [`build_from_schema`] followed by relative path resolution.
pub(crate) fn build_resolved<T: DeserializeOwned + ResolvePaths>(
    value: Value,
    schema: &str,
    ctx: &LoadContext<'_>,
) -> Result<T, SchemaError> {
    let mut entity: T = build_from_schema(value, schema, ctx)?;
    entity.resolve_paths(ctx.base_dir());
    Ok(entity)
}

/// Every schema compiled into the crate, by filename.
pub const EMBEDDED_SCHEMAS: &[(&str, &str)] = &[
    ("common.schema.json", include_str!("../schemas/common.schema.json")),
    ("command_job.schema.json", include_str!("../schemas/command_job.schema.json")),
    ("sweep_job.schema.json", include_str!("../schemas/sweep_job.schema.json")),
    ("pipeline_job.schema.json", include_str!("../schemas/pipeline_job.schema.json")),
    ("spark_job.schema.json", include_str!("../schemas/spark_job.schema.json")),
    ("command_component.schema.json", include_str!("../schemas/command_component.schema.json")),
    ("parallel_component.schema.json", include_str!("../schemas/parallel_component.schema.json")),
    ("pipeline_component.schema.json", include_str!("../schemas/pipeline_component.schema.json")),
    ("amlcompute.schema.json", include_str!("../schemas/amlcompute.schema.json")),
    ("computeinstance.schema.json", include_str!("../schemas/computeinstance.schema.json")),
    ("virtualmachine.schema.json", include_str!("../schemas/virtualmachine.schema.json")),
    ("kubernetes_compute.schema.json", include_str!("../schemas/kubernetes_compute.schema.json")),
    ("azure_blob_datastore.schema.json", include_str!("../schemas/azure_blob_datastore.schema.json")),
    ("azure_file_datastore.schema.json", include_str!("../schemas/azure_file_datastore.schema.json")),
    (
        "azure_data_lake_gen1_datastore.schema.json",
        include_str!("../schemas/azure_data_lake_gen1_datastore.schema.json"),
    ),
    (
        "azure_data_lake_gen2_datastore.schema.json",
        include_str!("../schemas/azure_data_lake_gen2_datastore.schema.json"),
    ),
    ("code.schema.json", include_str!("../schemas/code.schema.json")),
    ("model.schema.json", include_str!("../schemas/model.schema.json")),
    ("data.schema.json", include_str!("../schemas/data.schema.json")),
    ("environment.schema.json", include_str!("../schemas/environment.schema.json")),
    ("workspace.schema.json", include_str!("../schemas/workspace.schema.json")),
    ("registry.schema.json", include_str!("../schemas/registry.schema.json")),
    ("workspace_connection.schema.json", include_str!("../schemas/workspace_connection.schema.json")),
    (
        "managed_online_deployment.schema.json",
        include_str!("../schemas/managed_online_deployment.schema.json"),
    ),
    (
        "kubernetes_online_deployment.schema.json",
        include_str!("../schemas/kubernetes_online_deployment.schema.json"),
    ),
    ("batch_deployment.schema.json", include_str!("../schemas/batch_deployment.schema.json")),
    (
        "managed_online_endpoint.schema.json",
        include_str!("../schemas/managed_online_endpoint.schema.json"),
    ),
    (
        "kubernetes_online_endpoint.schema.json",
        include_str!("../schemas/kubernetes_online_endpoint.schema.json"),
    ),
    ("batch_endpoint.schema.json", include_str!("../schemas/batch_endpoint.schema.json")),
    ("schedule.schema.json", include_str!("../schemas/schedule.schema.json")),
];

/// Process-wide validator over [`EMBEDDED_SCHEMAS`].
///
/// # Errors
///
/// `SchemaLoadError` if an embedded schema is not valid JSON.
pub fn embedded_validator() -> Result<&'static SchemaValidator, SchemaError> {
    static VALIDATOR: OnceLock<Result<SchemaValidator, (String, String)>> = OnceLock::new();
    VALIDATOR
        .get_or_init(|| {
            SchemaValidator::from_sources(EMBEDDED_SCHEMAS.iter().copied())
                .map_err(|e| (e.schema_name().to_string(), e.to_string()))
        })
        .as_ref()
        .map_err(|(schema_name, reason)| SchemaError::SchemaLoadError {
            schema_name: schema_name.clone(),
            reason: reason.clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Compute, Job, OnlineEndpoint};
    use serde_json::json;

    fn doc(value: Value) -> Document {
        Document::from_json(value, EntityFamily::Job).unwrap()
    }

    #[test]
    fn test_scalar_discriminators_are_stringified() {
        assert_eq!(type_field(&doc(json!({"type": 5}))).as_deref(), Some("5"));
        assert_eq!(type_field(&doc(json!({"type": true}))).as_deref(), Some("true"));
        assert_eq!(type_field(&doc(json!({"type": ["a"]}))), None);
        assert_eq!(type_field(&doc(json!({"name": "x"}))), None);
    }

    #[test]
    fn test_numeric_discriminator_is_kept_for_guidance() {
        let resolved = resolve_subtype::<Job>(&doc(json!({"type": 5, "command": "echo"}))).unwrap();
        assert_eq!(resolved.spec.discriminator, "command");
        assert_eq!(resolved.type_str.as_deref(), Some("5"));
    }

    #[test]
    fn test_embedded_schemas_all_compile() {
        let validator = embedded_validator().unwrap();
        assert_eq!(validator.schema_count(), EMBEDDED_SCHEMAS.len());
        for (name, _) in EMBEDDED_SCHEMAS {
            validator
                .build_validator(name)
                .unwrap_or_else(|e| panic!("{name}: {e}"));
        }
    }

    #[test]
    fn test_every_subtype_schema_is_embedded() {
        let validator = embedded_validator().unwrap();
        let schemas = Job::subtypes()
            .iter()
            .map(|s| s.schema)
            .chain(Compute::subtypes().iter().map(|s| s.schema))
            .chain(OnlineEndpoint::subtypes().iter().map(|s| s.schema));
        for schema in schemas {
            assert!(validator.get_schema(schema).is_some(), "{schema} missing");
        }
    }

    #[test]
    fn test_known_discriminator() {
        let resolved = resolve_subtype::<Job>(&doc(json!({"type": "sweep"}))).unwrap();
        assert_eq!(resolved.spec.discriminator, "sweep");
        assert_eq!(resolved.type_str.as_deref(), Some("sweep"));
    }

    #[test]
    fn test_missing_discriminator_uses_default() {
        let resolved = resolve_subtype::<Job>(&doc(json!({"command": "echo"}))).unwrap();
        assert_eq!(resolved.spec.discriminator, "command");
        assert!(resolved.type_str.is_none());
    }

    #[test]
    fn test_unknown_discriminator_falls_back_with_observed_type() {
        let resolved = resolve_subtype::<Job>(&doc(json!({"type": "comand"}))).unwrap();
        assert_eq!(resolved.spec.discriminator, "command");
        assert_eq!(resolved.type_str.as_deref(), Some("comand"));
    }

    #[test]
    fn test_no_default_requires_discriminator() {
        let err = resolve_subtype::<Compute>(&doc(json!({"name": "cpu"}))).unwrap_err();
        let SchemaError::ValidationFailed { violations, .. } = err else {
            panic!("expected ValidationFailed");
        };
        assert_eq!(violations.violations()[0].field(), "type");
        assert_eq!(violations.violations()[0].kind, ValidationErrorType::MissingValue);
    }

    #[test]
    fn test_no_default_rejects_unknown_discriminator() {
        let err = resolve_subtype::<Compute>(&doc(json!({"type": "mainframe"}))).unwrap_err();
        let SchemaError::ValidationFailed { violations, .. } = err else {
            panic!("expected ValidationFailed");
        };
        assert_eq!(violations.violations()[0].kind, ValidationErrorType::InvalidValue);
        assert!(violations.violations()[0].message.contains("amlcompute"));
    }

    #[test]
    fn test_context_base_dir_follows_origin() {
        let validator = SchemaValidator::default();
        let ctx = LoadContext::new(Origin::new("jobs/train.yml"), &validator);
        assert_eq!(ctx.base_dir(), Path::new("jobs"));
        assert_eq!(ctx.resolve("src"), Path::new("jobs").join("src").to_string_lossy());
        assert_eq!(ctx.resolve("azureml:src:1"), "azureml:src:1");
    }
}
