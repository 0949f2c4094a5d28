//! # mlent-core: Foundational Types for Entity Loading
//!
//! This crate is the leaf of the mlent workspace. It defines everything the
//! loading pipeline needs before an entity type is known:
//!
//! 1. **`EntityFamily`**: the single enum naming every entity family
//!    (job, workspace, component, ...). It doubles as the error target
//!    carried by every user-facing error.
//!
//! 2. **`Source` and `Origin`**: where a YAML document comes from, and the
//!    string used later to resolve file references found inside it.
//!
//! 3. **`Document`**: a parsed, non-empty YAML mapping, converted to a
//!    JSON object tree for schema validation.
//!
//! 4. **`Override`**: field-path overwrites applied on top of a parsed
//!    document.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `mlent-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod document;
pub mod error;
pub mod family;
pub mod overrides;
pub mod source;

pub use document::{load_yaml_document, yaml_to_json_value, Document, MaterializeError};
pub use error::{
    ErrorCategory, MissingValueError, OverrideError, ParseError, ParseErrorKind,
    UnknownFamilyError, ValidationErrorType,
};
pub use family::{EntityFamily, ENTITY_FAMILY_COUNT};
pub use overrides::{apply_overrides, overrides_from_value, Override};
pub use source::{derive_origin, NamedStream, Origin, Source, DEFAULT_RELATIVE_ORIGIN};
