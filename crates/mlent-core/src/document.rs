//! # Document Materialization
//!
//! Reads a [`Source`] and parses it into a [`Document`]: a non-empty
//! mapping, converted from YAML into a JSON object tree so it can be
//! patched by overrides and checked by JSON Schema.
//!
//! ## Invariant
//!
//! A `Document` is always a mapping with at least one key. Empty and
//! non-mapping documents are rejected with a [`ParseError`] before any
//! entity construction is attempted.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::error::{ParseError, ParseErrorKind};
use crate::family::EntityFamily;
use crate::source::Source;

/// A parsed, non-empty top-level mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct Document(Map<String, Value>);

/// Failure while reading or parsing a source.
#[derive(Error, Debug)]
pub enum MaterializeError {
    /// The source could not be read. Passed through untranslated.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The text was read but is not a usable document.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl Document {
    /// Parse YAML text into a document for `target`.
    ///
    /// # Errors
    ///
    /// - `EmptyDocument` for blank, comment-only, null or `{}` documents.
    /// - `WrongShape` when the top level is not a mapping.
    /// - `Malformed` when the text is not YAML.
    pub fn parse(text: &str, target: EntityFamily) -> Result<Self, ParseError> {
        if is_blank_yaml(text) {
            return Err(ParseError::new(target, ParseErrorKind::EmptyDocument));
        }

        let yaml: serde_yaml::Value = serde_yaml::from_str(text).map_err(|e| {
            ParseError::new(
                target,
                ParseErrorKind::Malformed {
                    reason: e.to_string(),
                },
            )
        })?;

        let yaml = match yaml {
            serde_yaml::Value::Tagged(tagged) => tagged.value,
            other => other,
        };

        match &yaml {
            serde_yaml::Value::Null => {
                return Err(ParseError::new(target, ParseErrorKind::EmptyDocument))
            }
            serde_yaml::Value::Mapping(_) => {}
            other => {
                return Err(ParseError::new(
                    target,
                    ParseErrorKind::WrongShape {
                        actual: yaml_type_name(other),
                    },
                ))
            }
        }

        let json = yaml_to_json_value(&yaml).map_err(|reason| {
            ParseError::new(target, ParseErrorKind::Malformed { reason })
        })?;
        Self::from_json(json, target)
    }

    /// Wrap an already-parsed JSON value, applying the same shape rules as
    /// [`Document::parse`].
    pub fn from_json(value: Value, target: EntityFamily) -> Result<Self, ParseError> {
        match value {
            Value::Object(map) if map.is_empty() => {
                Err(ParseError::new(target, ParseErrorKind::EmptyDocument))
            }
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Err(ParseError::new(target, ParseErrorKind::EmptyDocument)),
            other => Err(ParseError::new(
                target,
                ParseErrorKind::WrongShape {
                    actual: json_type_name(&other),
                },
            )),
        }
    }

    /// Look up a top-level field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Look up a top-level string field.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Borrow the underlying mapping.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Mutable access, used when applying overrides.
    pub fn as_map_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.0
    }

    /// Consume into a JSON object value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// Read `source` and parse it into a [`Document`].
pub fn load_yaml_document(
    source: Source<'_>,
    target: EntityFamily,
) -> Result<Document, MaterializeError> {
    let text = source.read_to_string()?;
    Ok(Document::parse(&text, target)?)
}

fn is_blank_yaml(text: &str) -> bool {
    text.lines().all(|line| {
        let t = line.trim();
        t.is_empty() || t.starts_with('#') || t == "---" || t == "..."
    })
}

fn yaml_type_name(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "bool",
        serde_yaml::Value::Number(_) => "number",
        serde_yaml::Value::String(_) => "string",
        serde_yaml::Value::Sequence(_) => "sequence",
        serde_yaml::Value::Mapping(_) => "mapping",
        serde_yaml::Value::Tagged(_) => "tagged",
    }
}

/// YAML-flavoured name of a JSON value's type.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// Entity documents use only the JSON-compatible subset of YAML. Tags are
/// dropped, and scalar map keys are stringified.
pub fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(serde_json::Number::from(i)))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(serde_json::Number::from(u)))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => {
            let items: Result<Vec<Value>, String> = seq.iter().map(yaml_to_json_value).collect();
            Ok(Value::Array(items?))
        }
        serde_yaml::Value::Mapping(map) => {
            let mut json_map = Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML map key type: {other:?}")),
                };
                json_map.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(json_map))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}
