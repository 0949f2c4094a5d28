//! # mlent-schema: Entity Document Validation
//!
//! Provides runtime JSON Schema validation of parsed entity documents and
//! the translation of raw schema failures into user-facing errors.
//!
//! ## Runtime Validation (`validate`)
//!
//! [`SchemaValidator`] holds a set of named schemas (Draft 2020-12),
//! registers them for cross-schema `$ref` resolution without network
//! access, and validates documents against one of them. Failures come back
//! as a raw [`SchemaError`] listing every [`Violation`].
//!
//! ## Error Translation (`result`)
//!
//! [`ValidationResultBuilder::from_validation_error`] turns a raw
//! [`SchemaError`] plus the document origin into a [`ValidationResult`]
//! (field path → messages, with file locations when the origin is a file).
//! [`ValidationResult::try_raise`] then produces a [`SchemaValidationError`]
//! carrying the error target, the schema description and optional type
//! guidance.
//!
//! ## Crate Policy
//!
//! - Depends only on `mlent-core` internally.
//! - Schema validation is the trust boundary for entity documents: invalid
//!   documents are rejected with the field path and a readable message.

pub mod result;
pub mod validate;

pub use result::{
    Diagnostic, SchemaDescription, SchemaValidationError, TryRaiseOptions, ValidationResult,
    ValidationResultBuilder,
};
pub use validate::{SchemaError, SchemaValidator, ValidationViolations, Violation, SCHEMA_URI_PREFIX};
