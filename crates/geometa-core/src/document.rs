//! # Sidecar Documents
//!
//! [`Document`] is the nested mapping that describes a dataset and is
//! written next to it. Internally it is a `serde_json::Value` so that the
//! same value can be validated, reconciled, and serialized to YAML
//! without conversion at every step.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::descriptor::NAN_TEXT;
use crate::error::GeometaError;

/// A sidecar metadata document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Value);

impl Document {
    /// Wrap an existing value.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// A document with no properties.
    pub fn empty() -> Self {
        Self(Value::Object(Map::new()))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Look up a nested property by key path.
    pub fn get(&self, path: &[&str]) -> Option<&Value> {
        path.iter().try_fold(&self.0, |node, key| node.get(*key))
    }

    /// Look up a nested string property.
    pub fn get_str(&self, path: &[&str]) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    pub fn get_mut(&mut self, path: &[&str]) -> Option<&mut Value> {
        path.iter()
            .try_fold(&mut self.0, |node, key| node.get_mut(*key))
    }

    /// Set a nested property, creating intermediate mappings as needed.
    ///
    /// Intermediate values that are not mappings are replaced. An empty
    /// path replaces the whole document.
    pub fn set(&mut self, path: &[&str], value: Value) {
        set_in(&mut self.0, path, value);
    }

    /// Remove a nested property, returning it if it existed.
    pub fn remove(&mut self, path: &[&str]) -> Option<Value> {
        let (last, parents) = path.split_last()?;
        self.get_mut(parents)?.as_object_mut()?.remove(*last)
    }

    /// Serialize to YAML.
    pub fn to_yaml_string(&self) -> Result<String, GeometaError> {
        serde_yaml::to_string(&self.0).map_err(|e| GeometaError::Serialization(e.to_string()))
    }

    /// Parse a YAML (or JSON) string.
    pub fn from_yaml_str(content: &str) -> Result<Self, GeometaError> {
        let yaml: serde_yaml::Value = serde_yaml::from_str(content)
            .map_err(|e| GeometaError::Serialization(format!("invalid YAML: {e}")))?;
        yaml_to_json_value(&yaml)
            .map(Self)
            .map_err(GeometaError::Serialization)
    }
}

impl From<Value> for Document {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

fn set_in(node: &mut Value, path: &[&str], value: Value) {
    let Some((key, rest)) = path.split_first() else {
        *node = value;
        return;
    };
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    if let Value::Object(map) = node {
        let child = map.entry((*key).to_string()).or_insert(Value::Null);
        set_in(child, rest, value);
    }
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// Sidecars and schemas use only the JSON-compatible subset of YAML.
/// Tags are dropped and scalar map keys are stringified.
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
                // No JSON form: NaN keeps its `NoData` text, infinities are null.
                Ok(match serde_json::Number::from_f64(f) {
                    Some(number) => Value::Number(number),
                    None if f.is_nan() => Value::String(NAN_TEXT.to_string()),
                    None => Value::Null,
                })
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_creates_intermediate_objects() {
        let mut doc = Document::empty();
        doc.set(&["identification", "license", "name"], json!("CC-BY-4.0"));
        assert_eq!(
            doc.get_str(&["identification", "license", "name"]),
            Some("CC-BY-4.0")
        );
    }

    #[test]
    fn set_replaces_non_object_parent() {
        let mut doc = Document::new(json!({"spatial": "oops"}));
        doc.set(&["spatial", "datatype"], json!("grid"));
        assert_eq!(doc.as_value(), &json!({"spatial": {"datatype": "grid"}}));
    }

    #[test]
    fn remove_nested() {
        let mut doc = Document::new(json!({"a": {"b": 1, "c": 2}}));
        assert_eq!(doc.remove(&["a", "b"]), Some(json!(1)));
        assert_eq!(doc.as_value(), &json!({"a": {"c": 2}}));
        assert_eq!(doc.remove(&["missing", "b"]), None);
    }

    #[test]
    fn yaml_round_trip_preserves_values() {
        let doc = Document::new(json!({
            "mcf": {"version": "1.0"},
            "identification": {"title": "Title", "keywords": {"default": {"keywords": ["a"]}}}
        }));
        let text = doc.to_yaml_string().unwrap();
        assert_eq!(Document::from_yaml_str(&text).unwrap(), doc);
    }

    #[test]
    fn yaml_numeric_keys_are_stringified() {
        let doc = Document::from_yaml_str("1: one\ntrue: yes\n").unwrap();
        assert_eq!(doc.get_str(&["1"]), Some("one"));
        assert_eq!(doc.get_str(&["true"]), Some("yes"));
    }

    #[test]
    fn yaml_nan_decodes_as_nodata_text() {
        let doc = Document::from_yaml_str("nodata: .nan\nupper: .inf\n").unwrap();
        assert_eq!(doc.get_str(&["nodata"]), Some(NAN_TEXT));
        assert_eq!(doc.get(&["upper"]), Some(&Value::Null));
        let nodata: crate::NoData =
            serde_json::from_value(doc.get(&["nodata"]).unwrap().clone()).unwrap();
        assert!(nodata.0.is_some_and(f64::is_nan));
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        assert!(Document::from_yaml_str("a: [unclosed").is_err());
    }
}
