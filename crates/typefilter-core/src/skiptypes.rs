//! Skip-type configuration.
//!
//! Skip types come in one of two shapes, never both in the same run:
//!
//! ```toml
//! # applied to every class
//! skiptypes = ["uint32", [["vector", "float64", "const"], "&"]]
//! ```
//!
//! ```toml
//! # applied only to the named classes
//! [skiptypes]
//! classA = ["float64", [["int32", "const"], "&"]]
//! classB = ["classA", ["vector", "float32"]]
//! ```
//!
//! A missing, null or empty value leaves the filter disabled.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ConfigError;
use crate::types::TypeExpr;

/// The types to exclude from a description model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SkipTypes {
    /// Nothing configured; filtering is a no-op.
    #[default]
    Unset,
    /// Patterns applied to every class.
    Global(Vec<TypeExpr>),
    /// Patterns applied only to the class with the given name.
    PerClass(BTreeMap<String, Vec<TypeExpr>>),
}

impl SkipTypes {
    /// Interpret a raw configuration value.
    ///
    /// Empty lists and empty mappings are treated as unset. Scalars are a
    /// configuration mistake and are reported as [`ConfigError::InvalidShape`].
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        match value {
            Value::Null => Ok(SkipTypes::Unset),
            Value::Array(items) => {
                let patterns = compile_list(items, None)?;
                Ok(SkipTypes::Global(patterns).normalized())
            }
            Value::Object(entries) => {
                let mut per_class = BTreeMap::new();
                for (class, patterns) in entries {
                    let Value::Array(items) = patterns else {
                        return Err(ConfigError::InvalidClassEntry {
                            class: class.clone(),
                            found: value_kind(patterns).to_string(),
                        });
                    };
                    per_class.insert(class.clone(), compile_list(items, Some(class))?);
                }
                Ok(SkipTypes::PerClass(per_class).normalized())
            }
            other => Err(ConfigError::InvalidShape {
                found: value_kind(other).to_string(),
            }),
        }
    }

    /// Returns true when no pattern would ever be applied.
    pub fn is_unset(&self) -> bool {
        matches!(self, SkipTypes::Unset)
    }

    /// Total number of patterns across all lists.
    pub fn pattern_count(&self) -> usize {
        match self {
            SkipTypes::Unset => 0,
            SkipTypes::Global(patterns) => patterns.len(),
            SkipTypes::PerClass(map) => map.values().map(Vec::len).sum(),
        }
    }

    fn normalized(self) -> Self {
        match &self {
            SkipTypes::Global(patterns) if patterns.is_empty() => SkipTypes::Unset,
            SkipTypes::PerClass(map) if map.is_empty() => SkipTypes::Unset,
            _ => self,
        }
    }
}

impl<'de> Deserialize<'de> for SkipTypes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        SkipTypes::from_value(&value).map_err(serde::de::Error::custom)
    }
}

/// Convert one pattern list, rejecting patterns that contain `()`.
fn compile_list(items: &[Value], class: Option<&str>) -> Result<Vec<TypeExpr>, ConfigError> {
    let mut patterns = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let pattern = TypeExpr::from_value(item);
        if pattern.has_empty_composite() {
            let location = match class {
                Some(class) => format!("entry {} for class '{}'", index, class),
                None => format!("entry {}", index),
            };
            return Err(ConfigError::EmptyComposite {
                location,
                pattern: item.to_string(),
            });
        }
        patterns.push(pattern);
    }
    Ok(patterns)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
