//! # Error Types: Loader Error Taxonomy
//!
//! Defines the user-facing errors raised before an entity type is known.
//! All errors use `thiserror` for derive-based `Display` and `Error`.
//!
//! ## Design
//!
//! - Every user error carries the [`EntityFamily`] it was raised for, an
//!   [`ErrorCategory`] and a [`ValidationErrorType`].
//! - I/O failures are never wrapped here. They travel as `std::io::Error`
//!   up to the caller.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::family::EntityFamily;

/// Who is responsible for an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The input supplied by the caller is wrong.
    UserError,
    /// Something failed inside the loader or a collaborator.
    SystemError,
}

/// Classification of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorType {
    /// The document could not be turned into a mapping.
    CannotParse,
    /// A required value was not supplied.
    MissingValue,
    /// A value was present but rejected.
    InvalidValue,
    /// A field not known to the schema was supplied.
    UnknownField,
    /// Catch-all for schema failures that fit no other bucket.
    GenericType,
}

/// Why a YAML document could not be materialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The document was empty, null, or an empty mapping.
    EmptyDocument,
    /// The top level parsed, but is not a mapping.
    WrongShape {
        /// YAML type actually found (`sequence`, `string`, ...).
        actual: &'static str,
    },
    /// The text is not valid YAML.
    Malformed {
        /// Parser message.
        reason: String,
    },
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDocument => f.write_str("Target yaml file is empty"),
            Self::WrongShape { actual } => {
                write!(f, "Expect dict but get {actual} after parsing yaml file")
            }
            Self::Malformed { reason } => write!(f, "Error while parsing yaml file: {reason}"),
        }
    }
}

/// A document that is empty or not shaped like a mapping.
///
/// Always a user error and never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}")]
pub struct ParseError {
    /// Family being loaded when the document was rejected.
    pub target: EntityFamily,
    /// What went wrong.
    pub kind: ParseErrorKind,
}

impl ParseError {
    /// Build an error for `target`.
    pub fn new(target: EntityFamily, kind: ParseErrorKind) -> Self {
        Self { target, kind }
    }

    /// Always [`ErrorCategory::UserError`].
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::UserError
    }

    /// Always [`ValidationErrorType::CannotParse`].
    pub fn error_type(&self) -> ValidationErrorType {
        ValidationErrorType::CannotParse
    }
}

/// Neither a local source nor a complete remote identifier was supplied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct MissingValueError {
    /// Family being loaded.
    pub target: EntityFamily,
    /// User-facing message.
    pub message: String,
}

impl MissingValueError {
    /// Build an error for `target`.
    pub fn new(target: EntityFamily, message: impl Into<String>) -> Self {
        Self {
            target,
            message: message.into(),
        }
    }

    /// Always [`ErrorCategory::UserError`].
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::UserError
    }

    /// Always [`ValidationErrorType::MissingValue`].
    pub fn error_type(&self) -> ValidationErrorType {
        ValidationErrorType::MissingValue
    }
}

/// An override entry was not a mapping.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OverrideError {
    /// The override list itself was not a sequence.
    #[error("params_override must be a list of mappings, got {actual}")]
    NotAList {
        /// JSON type found instead.
        actual: &'static str,
    },

    /// Entry `index` of the override list was not a mapping.
    #[error("params_override entry {index} must be a mapping, got {actual}")]
    EntryNotMapping {
        /// Zero-based position in the list.
        index: usize,
        /// JSON type found instead.
        actual: &'static str,
    },

    /// A field path was empty or contained an empty segment.
    #[error("invalid override field path {path:?}")]
    InvalidPath {
        /// The offending path.
        path: String,
    },
}

/// A family name that does not match any [`EntityFamily`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown entity family: {0:?}")]
pub struct UnknownFamilyError(pub String);
