use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::path::Path;
use crate::error::{Error, Result};

/// A node of a deserialized source document.
///
/// Mapping keys are kept in a `BTreeMap`: source order carries no meaning for
/// schemas, and sorted iteration keeps every downstream stage deterministic.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Sequence(Vec<Value>),
    Mapping(BTreeMap<String, Value>),
}

impl Value {
    /// Short name of the variant, used in shape-mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Sequence(_) => "list",
            Value::Mapping(_) => "mapping",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, Value::Mapping(_))
    }

    /// Like [`Value::as_mapping`] but reports where the wrong shape was found.
    pub fn expect_mapping(&self, at: &Path) -> Result<&BTreeMap<String, Value>> {
        self.as_mapping().ok_or_else(|| Error::ShapeMismatch {
            path: at.to_string(),
            expected: "mapping",
            found: self.kind(),
        })
    }

    /// Member of a mapping. Always `None` for non-mappings.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_mapping().and_then(|map| map.get(key))
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Walks `path` from this node. List elements are addressed by decimal index.
    pub fn lookup(&self, path: &Path) -> Option<&Value> {
        path.segments()
            .iter()
            .try_fold(self, |node, segment| match node {
                Value::Mapping(map) => map.get(segment.as_str()),
                Value::Sequence(items) => segment
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| items.get(index)),
                _ => None,
            })
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::String(s) => f.write_str(s),
            Value::Sequence(_) | Value::Mapping(_) => {
                let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

/// Integral values print without a fractional part (`40`, not `40.0`).
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl From<serde_yaml::Value> for Value {
    fn from(value: serde_yaml::Value) -> Self {
        use serde_yaml::Value as Yaml;

        match value {
            Yaml::Null => Value::Null,
            Yaml::Bool(b) => Value::Bool(b),
            Yaml::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            Yaml::String(s) => Value::String(s),
            Yaml::Sequence(items) => Value::Sequence(items.into_iter().map(Value::from).collect()),
            Yaml::Mapping(map) => Value::Mapping(
                map.into_iter()
                    .map(|(key, value)| (mapping_key(key), Value::from(value)))
                    .collect(),
            ),
            Yaml::Tagged(tagged) => Value::from(tagged.value),
        }
    }
}

// YAML allows non-string keys (`200:` under `responses`, `true:`), the
// document model addresses everything by string.
fn mapping_key(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        other => Value::from(other).to_string(),
    }
}
