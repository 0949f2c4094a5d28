//! # Load Errors
//!
//! One enum covering every way a `load_*` call can fail. User errors
//! (`Parse`, `SchemaValidation`, `MissingValue`, `Override`, `NoSource`)
//! carry an [`ErrorCategory`] and a [`ValidationErrorType`], as do raw
//! `Schema` failures caused by the document itself. I/O failures pass
//! through as the original `std::io::Error`.

use mlent_client::ClientError;
use mlent_core::{
    EntityFamily, ErrorCategory, MaterializeError, MissingValueError, OverrideError, ParseError,
    ValidationErrorType,
};
use mlent_schema::{SchemaError, SchemaValidationError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    /// Empty, non-mapping or malformed YAML.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Structured schema failure, for families that support it.
    #[error(transparent)]
    SchemaValidation(#[from] SchemaValidationError),

    /// Raw schema failure, for families without structured validation.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Neither a local source nor a remote identifier was supplied.
    #[error(transparent)]
    MissingValue(#[from] MissingValueError),

    /// The source could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A `params_override` entry could not be applied.
    #[error(transparent)]
    Override(#[from] OverrideError),

    /// No `source`, positional arg or `path` was supplied.
    #[error("no source supplied for {target}; pass a source path, stream or text")]
    NoSource { target: EntityFamily },

    /// The remote client failed to fetch a component.
    #[error(transparent)]
    Remote(#[from] ClientError),
}

impl From<MaterializeError> for LoadError {
    fn from(err: MaterializeError) -> Self {
        match err {
            MaterializeError::Io(e) => Self::Io(e),
            MaterializeError::Parse(e) => Self::Parse(e),
        }
    }
}

impl LoadError {
    /// `None` for I/O, remote and schema-registry failures.
    pub fn category(&self) -> Option<ErrorCategory> {
        match self {
            Self::Parse(e) => Some(e.category()),
            Self::SchemaValidation(e) => Some(e.category()),
            Self::MissingValue(e) => Some(e.category()),
            Self::Override(_) | Self::NoSource { .. } => Some(ErrorCategory::UserError),
            Self::Schema(SchemaError::ValidationFailed { .. })
            | Self::Schema(SchemaError::Deserialization { .. }) => Some(ErrorCategory::UserError),
            Self::Schema(_) | Self::Io(_) | Self::Remote(_) => None,
        }
    }

    pub fn error_type(&self) -> Option<ValidationErrorType> {
        match self {
            Self::Parse(e) => Some(e.error_type()),
            Self::SchemaValidation(e) => Some(e.error_type()),
            Self::MissingValue(e) => Some(e.error_type()),
            Self::Override(_) => Some(ValidationErrorType::InvalidValue),
            Self::NoSource { .. } => Some(ValidationErrorType::MissingValue),
            Self::Schema(SchemaError::ValidationFailed { violations, .. }) => Some(
                violations
                    .violations()
                    .first()
                    .map_or(ValidationErrorType::GenericType, |v| v.kind),
            ),
            Self::Schema(SchemaError::Deserialization { .. }) => {
                Some(ValidationErrorType::InvalidValue)
            }
            Self::Schema(_) | Self::Io(_) | Self::Remote(_) => None,
        }
    }
}
