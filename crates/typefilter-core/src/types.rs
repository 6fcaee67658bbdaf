//! Type expressions used throughout the description model.
//!
//! A type is written either as a single identifier (`float64`, `classA`, `&`)
//! or as a nested sequence of sub-expressions, e.g. the const reference to a
//! vector of doubles is `(("vector", "float64", "const"), "&")`. Atoms that
//! are neither identifiers nor sequences (array extents, booleans, null) are
//! kept as opaque leaves so that a malformed description never aborts a pass.
//!
//! ## Serialized Form
//!
//! - JSON/TOML string → [`TypeExpr::Leaf`]
//! - JSON/TOML array → [`TypeExpr::Composite`]
//! - anything else → [`TypeExpr::Opaque`] (canonical JSON text retained)

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

// ============================================================================
// TypeExpr
// ============================================================================

/// A recursive type expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeExpr {
    /// A single identifier (primitive, class name, qualifier or modifier).
    Leaf(String),
    /// An opaque atom, stored as its canonical JSON text.
    Opaque(String),
    /// An ordered sequence of sub-expressions.
    Composite(Vec<TypeExpr>),
}

impl TypeExpr {
    /// Create a leaf expression.
    pub fn leaf(name: impl Into<String>) -> Self {
        TypeExpr::Leaf(name.into())
    }

    /// Create a composite expression from its parts.
    pub fn composite(parts: impl IntoIterator<Item = TypeExpr>) -> Self {
        TypeExpr::Composite(parts.into_iter().collect())
    }

    /// Returns true for [`TypeExpr::Leaf`].
    pub fn is_leaf(&self) -> bool {
        matches!(self, TypeExpr::Leaf(_))
    }

    /// Returns the identifier of a leaf.
    pub fn as_leaf(&self) -> Option<&str> {
        match self {
            TypeExpr::Leaf(name) => Some(name),
            _ => None,
        }
    }

    /// Returns true if an empty composite appears anywhere in the expression.
    pub fn has_empty_composite(&self) -> bool {
        match self {
            TypeExpr::Composite(items) => {
                items.is_empty() || items.iter().any(Self::has_empty_composite)
            }
            _ => false,
        }
    }

    /// Build a type expression from a JSON value.
    ///
    /// Never fails: values that are neither strings nor arrays become
    /// [`TypeExpr::Opaque`].
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(s) => TypeExpr::Leaf(s.clone()),
            Value::Array(items) => TypeExpr::Composite(items.iter().map(Self::from_value).collect()),
            other => TypeExpr::Opaque(other.to_string()),
        }
    }

    /// Convert back into a JSON value.
    pub fn to_value(&self) -> Value {
        match self {
            TypeExpr::Leaf(s) => Value::String(s.clone()),
            TypeExpr::Composite(items) => Value::Array(items.iter().map(Self::to_value).collect()),
            TypeExpr::Opaque(text) => {
                serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.clone()))
            }
        }
    }
}

impl From<&str> for TypeExpr {
    fn from(name: &str) -> Self {
        TypeExpr::Leaf(name.to_string())
    }
}

impl From<String> for TypeExpr {
    fn from(name: String) -> Self {
        TypeExpr::Leaf(name)
    }
}

impl From<Vec<TypeExpr>> for TypeExpr {
    fn from(parts: Vec<TypeExpr>) -> Self {
        TypeExpr::Composite(parts)
    }
}

/// Renders the tuple notation accepted by [`crate::pattern::parse_type_expr`].
impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Leaf(name) => {
                if needs_quotes(name) {
                    write!(f, "{:?}", name)
                } else {
                    write!(f, "{}", name)
                }
            }
            TypeExpr::Opaque(text) => write!(f, "{}", text),
            TypeExpr::Composite(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                if items.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Leaves that would not survive a round trip through the bare notation.
fn needs_quotes(name: &str) -> bool {
    name.is_empty()
        || name.chars().all(|c| c.is_ascii_digit())
        || name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '(' | ')' | ',' | '"' | '\''))
}

impl Serialize for TypeExpr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TypeExpr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(TypeExpr::from_value(&value))
    }
}
