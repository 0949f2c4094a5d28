//! # Validation Results and Error Translation
//!
//! Turns a raw [`SchemaError`] into the structured, user-facing
//! [`SchemaValidationError`]:
//!
//! 1. [`ValidationResultBuilder::from_validation_error`] flattens the raw
//!    failure into one [`Diagnostic`] per field. When the origin names a
//!    readable file, each diagnostic also records the line the field sits
//!    on.
//! 2. [`ValidationResult::try_raise`] attaches the error target, a
//!    description of the schema, and optional guidance text.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use mlent_core::{EntityFamily, ErrorCategory, Origin, ValidationErrorType};
use thiserror::Error;

use crate::validate::SchemaError;

/// Field label used for problems at the document root.
const ROOT_FIELD: &str = "(root)";

/// One field-level problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Dotted field path, or `(root)`.
    pub field: String,
    /// Human-readable message.
    pub message: String,
    /// Classification of the problem.
    pub kind: ValidationErrorType,
    /// `"<file>#line <n>"` when the field could be found in the origin file.
    pub location: Option<String>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)?;
        if let Some(location) = &self.location {
            write!(f, " ({location})")?;
        }
        Ok(())
    }
}

/// Aggregate of field-level problems for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    origin: Origin,
    diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    /// True when no problems were recorded.
    pub fn is_success(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// The origin the document was loaded from.
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// All diagnostics, in the order they were found.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Field path → messages.
    pub fn messages(&self) -> BTreeMap<String, Vec<String>> {
        let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for d in &self.diagnostics {
            map.entry(d.field.clone()).or_default().push(d.message.clone());
        }
        map
    }

    /// Record another problem.
    pub fn append_error(&mut self, field: impl Into<String>, message: impl Into<String>, kind: ValidationErrorType) {
        let field = normalize_field(field.into());
        let location = locate_field(&self.origin, &field);
        self.diagnostics.push(Diagnostic {
            field,
            message: message.into(),
            kind,
            location,
        });
    }

    /// Return `Ok(())` on success, otherwise the structured error.
    pub fn try_raise(self, options: TryRaiseOptions) -> Result<(), SchemaValidationError> {
        if self.is_success() {
            return Ok(());
        }
        tracing::debug!(
            target_family = %options.error_target,
            schema = %options.schema.name,
            diagnostics = self.diagnostics.len(),
            "raising schema validation error"
        );
        Err(SchemaValidationError {
            target: options.error_target,
            schema: options.schema,
            result: self,
            additional_message: options.additional_message,
        })
    }
}

/// Constructors for [`ValidationResult`].
pub struct ValidationResultBuilder;

impl ValidationResultBuilder {
    /// An empty, successful result.
    pub fn success(origin: &Origin) -> ValidationResult {
        ValidationResult {
            origin: origin.clone(),
            diagnostics: Vec::new(),
        }
    }

    /// Flatten a raw schema failure into a result for `origin`.
    pub fn from_validation_error(error: &SchemaError, origin: &Origin) -> ValidationResult {
        let mut result = Self::success(origin);
        match error {
            SchemaError::ValidationFailed { violations, .. } => {
                for v in violations.violations() {
                    result.append_error(v.field(), v.message.clone(), v.kind);
                }
            }
            SchemaError::Deserialization { reason, .. } => {
                result.append_error(ROOT_FIELD, reason.clone(), ValidationErrorType::InvalidValue);
            }
            SchemaError::SchemaLoadError { .. } | SchemaError::ValidatorBuildError { .. } => {
                result.append_error(ROOT_FIELD, error.to_string(), ValidationErrorType::GenericType);
            }
        }
        result
    }
}

/// The schema a document was checked against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDescription {
    /// Schema filename.
    pub name: String,
    /// Directory relative references were resolved against.
    pub base_path: PathBuf,
}

impl fmt::Display for SchemaDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (base path: {})", self.name, self.base_path.display())
    }
}

/// Context attached when raising a [`SchemaValidationError`].
#[derive(Debug, Clone)]
pub struct TryRaiseOptions {
    /// Family being loaded.
    pub error_target: EntityFamily,
    /// Schema the document was validated against.
    pub schema: SchemaDescription,
    /// Extra guidance appended to the message.
    pub additional_message: Option<String>,
}

/// Structured, user-facing schema validation failure.
#[derive(Error, Debug, Clone)]
pub struct SchemaValidationError {
    /// Family being loaded.
    pub target: EntityFamily,
    /// Schema the document failed.
    pub schema: SchemaDescription,
    /// Field-level problems.
    pub result: ValidationResult,
    /// Guidance about the discriminator, when one was resolved.
    pub additional_message: Option<String>,
}

impl SchemaValidationError {
    /// Always [`ErrorCategory::UserError`].
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::UserError
    }

    /// Classification of the first problem.
    pub fn error_type(&self) -> ValidationErrorType {
        self.result
            .diagnostics()
            .first()
            .map(|d| d.kind)
            .unwrap_or(ValidationErrorType::GenericType)
    }
}

impl fmt::Display for SchemaValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} validation failed against schema {} (origin: {}):",
            self.target,
            self.schema,
            self.result.origin()
        )?;
        for d in self.result.diagnostics() {
            writeln!(f, "  {d}")?;
        }
        if let Some(extra) = &self.additional_message {
            write!(f, "{extra}")?;
        }
        Ok(())
    }
}

fn normalize_field(field: String) -> String {
    if field.is_empty() {
        ROOT_FIELD.to_string()
    } else {
        field
    }
}

/// Find the line holding `field` in the origin file.
///
/// Walks the dotted path one key at a time, each search starting below the
/// previous match. Sequence indices are skipped.
fn locate_field(origin: &Origin, field: &str) -> Option<String> {
    if origin.is_default() || field == ROOT_FIELD {
        return None;
    }
    let path = Path::new(origin.as_str());
    if !path.is_file() {
        return None;
    }
    let text = std::fs::read_to_string(path).ok()?;
    let lines: Vec<&str> = text.lines().collect();

    let mut start = 0;
    let mut found = None;
    for segment in field.split('.').filter(|s| s.parse::<usize>().is_err()) {
        let key = format!("{segment}:");
        let offset = lines[start..].iter().position(|line| {
            let t = line.trim_start().trim_start_matches("- ");
            t.starts_with(&key)
        })?;
        start += offset;
        found = Some(start);
        start += 1;
    }
    found.map(|idx| format!("{}#line {}", origin, idx + 1))
}
