//! # Field Overrides
//!
//! Callers can overwrite fields of a parsed document without editing the
//! YAML, e.g. `[{"name": "a"}, {"resources.instance_count": 2}]`. Keys are
//! dotted field paths. Entries apply in list order, so the last entry
//! writing a path wins. Missing intermediate mappings are created, and
//! non-mapping intermediates are replaced.

use serde_json::{Map, Value};

use crate::document::{json_type_name, Document};
use crate::error::OverrideError;

/// One override entry: a mapping of field paths to replacement values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Override(Map<String, Value>);

impl Override {
    /// Single-path override.
    pub fn new(path: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut map = Map::new();
        map.insert(path.into(), value.into());
        Self(map)
    }

    /// Override built from an existing mapping.
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Iterate `(path, value)` pairs in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Value written for `path` by this entry, if any.
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.0.get(path)
    }
}

/// Build an override list from an untyped value.
///
/// # Errors
///
/// Returns [`OverrideError::NotAList`] unless `value` is a sequence (or
/// null, meaning "no overrides"), and [`OverrideError::EntryNotMapping`] for
/// the first entry that is not a mapping.
pub fn overrides_from_value(value: Value) -> Result<Vec<Override>, OverrideError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(map) => Ok(Override(map)),
                other => Err(OverrideError::EntryNotMapping {
                    index,
                    actual: json_type_name(&other),
                }),
            })
            .collect(),
        other => Err(OverrideError::NotAList {
            actual: json_type_name(&other),
        }),
    }
}

/// Apply `overrides` to `document` in order.
///
/// # Errors
///
/// Returns [`OverrideError::InvalidPath`] for empty paths or paths with an
/// empty segment (`"a..b"`). Entries before the bad one stay applied.
pub fn apply_overrides(document: &mut Document, overrides: &[Override]) -> Result<(), OverrideError> {
    for entry in overrides {
        for (path, value) in entry.entries() {
            set_path(document.as_map_mut(), path, value.clone())?;
        }
    }
    Ok(())
}

fn set_path(root: &mut Map<String, Value>, path: &str, value: Value) -> Result<(), OverrideError> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(OverrideError::InvalidPath {
            path: path.to_string(),
        });
    }

    let (last, parents) = match segments.split_last() {
        Some(split) => split,
        None => {
            return Err(OverrideError::InvalidPath {
                path: path.to_string(),
            })
        }
    };

    let mut current = root;
    for segment in parents {
        let slot = current
            .entry((*segment).to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        current = slot.as_object_mut().ok_or_else(|| OverrideError::InvalidPath {
            path: path.to_string(),
        })?;
    }
    current.insert((*last).to_string(), value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::family::EntityFamily;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        Document::from_json(value, EntityFamily::Job).unwrap()
    }

    #[test]
    fn test_last_override_wins() {
        let mut d = doc(json!({"command": "python train.py"}));
        apply_overrides(&mut d, &[Override::new("name", "a"), Override::new("name", "b")]).unwrap();
        assert_eq!(d.get_str("name"), Some("b"));
    }

    #[test]
    fn test_override_replaces_document_value() {
        let mut d = doc(json!({"name": "from-yaml"}));
        apply_overrides(&mut d, &[Override::new("name", "from-override")]).unwrap();
        assert_eq!(d.get_str("name"), Some("from-override"));
    }

    #[test]
    fn test_nested_path_creates_mappings() {
        let mut d = doc(json!({"name": "x"}));
        apply_overrides(&mut d, &[Override::new("resources.instance_count", 4)]).unwrap();
        assert_eq!(d.get("resources"), Some(&json!({"instance_count": 4})));
    }

    #[test]
    fn test_nested_path_keeps_siblings() {
        let mut d = doc(json!({"resources": {"instance_count": 1, "shm_size": "2g"}}));
        apply_overrides(&mut d, &[Override::new("resources.instance_count", 3)]).unwrap();
        assert_eq!(
            d.get("resources"),
            Some(&json!({"instance_count": 3, "shm_size": "2g"}))
        );
    }

    #[test]
    fn test_scalar_intermediate_is_replaced() {
        let mut d = doc(json!({"environment": "azureml:env:1"}));
        apply_overrides(&mut d, &[Override::new("environment.image", "ubuntu")]).unwrap();
        assert_eq!(d.get("environment"), Some(&json!({"image": "ubuntu"})));
    }

    #[test]
    fn test_invalid_paths_rejected() {
        let mut d = doc(json!({"name": "x"}));
        for path in ["", "a..b", ".a", "a."] {
            let err = apply_overrides(&mut d, &[Override::new(path, 1)]).unwrap_err();
            assert!(matches!(err, OverrideError::InvalidPath { .. }), "path {path:?}");
        }
    }

    #[test]
    fn test_overrides_from_value() {
        let list = overrides_from_value(json!([{"name": "a"}, {"display_name": "b", "tags.x": 1}]))
            .unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].get("tags.x"), Some(&json!(1)));
        assert!(overrides_from_value(Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_overrides_from_value_rejects_non_mapping_entry() {
        let err = overrides_from_value(json!([{"name": "a"}, "name=b"])).unwrap_err();
        assert_eq!(
            err,
            OverrideError::EntryNotMapping {
                index: 1,
                actual: "string"
            }
        );
        let err = overrides_from_value(json!({"name": "a"})).unwrap_err();
        assert_eq!(err, OverrideError::NotAList { actual: "mapping" });
    }
}
