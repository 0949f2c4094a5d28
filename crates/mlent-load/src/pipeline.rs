//! # The `load_common` Pipeline
//!
//! ```text
//! LoadArgs ─► resolve_source ─► load_yaml_document ─► apply_overrides
//!          ─► resolve_subtype ─► SubtypeSpec::build ─► entity
//!                                        │
//!                                        └─(SchemaError)─► translate_schema_error
//! ```
//!
//! Overrides are applied before type resolution, so an override of the
//! discriminator selects a different subtype.

use mlent_core::{apply_overrides, load_yaml_document, Origin, Override};
use mlent_entities::{embedded_validator, resolve_subtype, LoadContext, Resource};
use mlent_schema::{
    SchemaDescription, SchemaError, TryRaiseOptions, ValidationResultBuilder,
};

use crate::args::{LoadArgs, ResolvedSource};
use crate::error::LoadError;

/// Load an entity of family `E` from YAML.
///
/// # Errors
///
/// - [`LoadError::NoSource`] when no source input was supplied.
/// - [`LoadError::Io`] when the source cannot be read.
/// - [`LoadError::Parse`] for empty, non-mapping or malformed YAML.
/// - [`LoadError::Override`] for an unusable override entry.
/// - [`LoadError::SchemaValidation`] for schema failures of families with
///   structured validation, [`LoadError::Schema`] for the others.
pub fn load_common<E: Resource>(args: LoadArgs<'_>) -> Result<E, LoadError> {
    let (resolved, params_override) = args.into_parts();
    load_resolved::<E>(resolved, &params_override)
}

/// Run the pipeline on an already-resolved source.
pub(crate) fn load_resolved<E: Resource>(
    resolved: ResolvedSource<'_>,
    params_override: &[Override],
) -> Result<E, LoadError> {
    let ResolvedSource { source, origin, .. } = resolved;
    let source = source.ok_or(LoadError::NoSource { target: E::FAMILY })?;

    tracing::debug!(
        family = %E::FAMILY,
        source = %source.describe(),
        origin = %origin,
        overrides = params_override.len(),
        "loading entity"
    );

    let mut document = load_yaml_document(source, E::FAMILY)?;
    apply_overrides(&mut document, params_override)?;

    let validator = embedded_validator()?;
    let type_str = E::discriminator(&document);
    let built = resolve_subtype::<E>(&document).and_then(|resolved| {
        tracing::debug!(
            family = %E::FAMILY,
            subtype = resolved.spec.discriminator,
            schema = resolved.spec.schema,
            "resolved subtype"
        );
        let ctx = LoadContext::new(origin.clone(), validator);
        (resolved.spec.build)(document.into_value(), &ctx)
    });

    built.map_err(|err| translate_schema_error::<E>(err, &origin, type_str.as_deref()))
}

/// Guidance appended to structured errors when a discriminator was seen.
pub fn type_guidance(type_str: &str) -> String {
    format!(
        "If you are trying to configure an entity that is not of type {type_str}, \
         please specify the correct type in the 'type' property."
    )
}

/// Convert a raw schema failure into the error the caller sees.
///
/// Families with structured validation get a [`LoadError::SchemaValidation`]
/// built from the violations and the origin. Everything else, and failures
/// to load the schemas themselves, come back unchanged.
fn translate_schema_error<E: Resource>(
    err: SchemaError,
    origin: &Origin,
    type_str: Option<&str>,
) -> LoadError {
    let translatable = matches!(
        err,
        SchemaError::ValidationFailed { .. } | SchemaError::Deserialization { .. }
    );
    if !E::STRUCTURED_VALIDATION || !translatable {
        return LoadError::Schema(err);
    }

    let result = ValidationResultBuilder::from_validation_error(&err, origin);
    let options = TryRaiseOptions {
        error_target: E::FAMILY,
        schema: SchemaDescription {
            name: err.schema_name().to_string(),
            base_path: origin.base_dir(),
        },
        additional_message: type_str.map(type_guidance),
    };
    match result.try_raise(options) {
        Err(structured) => LoadError::SchemaValidation(structured),
        Ok(()) => LoadError::Schema(err),
    }
}
