//! Description model: modules, classes, attributes and methods.
//!
//! The model is produced by an upstream describer and handed to the filter
//! fully built. Only class descriptors are inspected; functions, variables
//! and any other descriptors are carried through untouched, as are descriptor
//! fields the filter has no use for (parents, docstrings, ...).
//!
//! ## JSON Shape
//!
//! ```json
//! {
//!   "geometry": {
//!     "Blah": {
//!       "name": "Blah",
//!       "parents": [],
//!       "attrs": { "x": "float64" },
//!       "methods": [
//!         {
//!           "name": "f",
//!           "params": [{ "name": "n", "type": "int32" }],
//!           "returns": [["vector", "float64", "const"], "&"]
//!         }
//!       ]
//!     },
//!     "foo": { "name": "foo", "signatures": [] }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::types::TypeExpr;

// ============================================================================
// Methods
// ============================================================================

/// A method parameter. Only `ty` takes part in filtering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Param {
    /// Parameter name.
    pub name: String,
    /// Parameter type.
    #[serde(rename = "type")]
    pub ty: TypeExpr,
    /// Default value, kept as canonical JSON text so it is written back as read.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "default_json")]
    pub default: Option<String>,
}

impl Param {
    /// Create a parameter without a default value.
    pub fn new(name: impl Into<String>, ty: impl Into<TypeExpr>) -> Self {
        Param {
            name: name.into(),
            ty: ty.into(),
            default: None,
        }
    }

    /// Attach a default value.
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into().to_string());
        self
    }

    /// The default value as JSON.
    pub fn default_value(&self) -> Option<Value> {
        self.default.as_deref().map(json_from_text)
    }
}

fn json_from_text(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Defaults may be any JSON value; store the canonical text.
mod default_json {
    use super::*;

    pub fn serialize<S: Serializer>(
        default: &Option<String>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        default.as_deref().map(json_from_text).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        // an explicit null is kept so it is written back
        Ok(Some(Value::deserialize(deserializer)?.to_string()))
    }
}

/// Identity of a method: its name plus its ordered parameter list.
///
/// Overloads differ only in their parameters, so the whole signature is the
/// key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodKey {
    /// Method name.
    pub name: String,
    /// Parameters in declaration order.
    pub params: Vec<Param>,
}

impl MethodKey {
    pub fn new(name: impl Into<String>, params: Vec<Param>) -> Self {
        MethodKey {
            name: name.into(),
            params,
        }
    }
}

impl fmt::Display for MethodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", param.name, param.ty)?;
            match param.default_value() {
                Some(Value::String(text)) => write!(f, " = {}", text)?,
                Some(other) => write!(f, " = {}", other)?,
                None => {}
            }
        }
        write!(f, ")")
    }
}

/// Methods of a class keyed by signature, in declaration order.
///
/// The value is the return type (`None` for constructors and destructors).
/// Signatures are unique; loading a list that repeats one is an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Methods {
    entries: Vec<(MethodKey, Option<TypeExpr>)>,
}

impl Methods {
    pub fn new() -> Self {
        Methods::default()
    }

    /// Insert a method, replacing the return type of an existing signature
    /// in place.
    pub fn insert(&mut self, key: MethodKey, returns: Option<TypeExpr>) -> Option<Option<TypeExpr>> {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, returns)),
            None => {
                self.entries.push((key, returns));
                None
            }
        }
    }

    /// Return type of a signature.
    pub fn get(&self, key: &MethodKey) -> Option<&Option<TypeExpr>> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, r)| r)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &MethodKey> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MethodKey, &Option<TypeExpr>)> {
        self.entries.iter().map(|(k, r)| (k, r))
    }

    /// Keep only the methods for which `f` returns true, preserving order.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&MethodKey, &mut Option<TypeExpr>) -> bool,
    {
        self.entries.retain_mut(|(key, returns)| f(key, returns));
    }
}

/// Methods serialize as a list since JSON object keys must be strings.
#[derive(Serialize, Deserialize)]
struct MethodEntry {
    name: String,
    #[serde(default)]
    params: Vec<Param>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    returns: Option<TypeExpr>,
}

impl Serialize for Methods {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entries: Vec<MethodEntry> = self
            .iter()
            .map(|(key, returns)| MethodEntry {
                name: key.name.clone(),
                params: key.params.clone(),
                returns: returns.clone(),
            })
            .collect();
        entries.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Methods {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut methods = Methods::new();
        for entry in Vec::<MethodEntry>::deserialize(deserializer)? {
            let key = MethodKey::new(entry.name, entry.params);
            if methods.get(&key).is_some() {
                return Err(D::Error::custom(format!(
                    "duplicate method signature {}",
                    key
                )));
            }
            methods.entries.push((key, entry.returns));
        }
        Ok(methods)
    }
}

// ============================================================================
// Descriptors
// ============================================================================

/// Description of a class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDesc {
    /// Class name; per-class skip types are looked up by this name.
    pub name: String,
    /// Attribute name to attribute type.
    pub attrs: BTreeMap<String, TypeExpr>,
    /// Methods keyed by signature.
    pub methods: Methods,
    /// Remaining descriptor fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ClassDesc {
    /// Create an empty class description.
    pub fn new(name: impl Into<String>) -> Self {
        ClassDesc {
            name: name.into(),
            attrs: BTreeMap::new(),
            methods: Methods::new(),
            extra: Map::new(),
        }
    }

    /// Add an attribute.
    pub fn with_attr(mut self, name: impl Into<String>, ty: impl Into<TypeExpr>) -> Self {
        self.attrs.insert(name.into(), ty.into());
        self
    }

    /// Add a method.
    pub fn with_method(
        mut self,
        name: impl Into<String>,
        params: Vec<Param>,
        returns: Option<TypeExpr>,
    ) -> Self {
        self.methods.insert(MethodKey::new(name, params), returns);
        self
    }

    /// Look up a method by name, ignoring overloads beyond the first.
    pub fn method_named(&self, name: &str) -> Option<(&MethodKey, &Option<TypeExpr>)> {
        self.methods.iter().find(|(key, _)| key.name == name)
    }
}

/// A top-level descriptor inside a module.
///
/// An object carrying both `attrs` and `methods` is a class and must parse
/// as one; a malformed class is an error rather than a silent pass-through.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Description {
    /// A class description (has `name`, `attrs` and `methods`).
    Class(ClassDesc),
    /// Any other descriptor, carried through untouched.
    Other(Value),
}

impl<'de> Deserialize<'de> for Description {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let is_class = value
            .as_object()
            .is_some_and(|obj| obj.contains_key("attrs") && obj.contains_key("methods"));
        if !is_class {
            return Ok(Description::Other(value));
        }
        ClassDesc::deserialize(value)
            .map(Description::Class)
            .map_err(D::Error::custom)
    }
}

impl Description {
    pub fn as_class(&self) -> Option<&ClassDesc> {
        match self {
            Description::Class(class) => Some(class),
            Description::Other(_) => None,
        }
    }

    pub fn as_class_mut(&mut self) -> Option<&mut ClassDesc> {
        match self {
            Description::Class(class) => Some(class),
            Description::Other(_) => None,
        }
    }
}

// ============================================================================
// Environment
// ============================================================================

/// The whole description model: module name to entity name to descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Environment {
    modules: BTreeMap<String, BTreeMap<String, Description>>,
}

impl Environment {
    /// Create an empty environment.
    pub fn new() -> Self {
        Environment::default()
    }

    /// Insert a descriptor, replacing any previous one with the same name.
    pub fn insert(
        &mut self,
        module: impl Into<String>,
        entity: impl Into<String>,
        desc: Description,
    ) -> Option<Description> {
        self.modules
            .entry(module.into())
            .or_default()
            .insert(entity.into(), desc)
    }

    /// Insert a class descriptor under its own name.
    pub fn insert_class(&mut self, module: impl Into<String>, class: ClassDesc) {
        let entity = class.name.clone();
        self.insert(module, entity, Description::Class(class));
    }

    /// Descriptors of one module.
    pub fn module(&self, module: &str) -> Option<&BTreeMap<String, Description>> {
        self.modules.get(module)
    }

    /// Module names in order.
    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    /// Look up a class descriptor by module and entity name.
    pub fn class(&self, module: &str, entity: &str) -> Option<&ClassDesc> {
        self.modules.get(module)?.get(entity)?.as_class()
    }

    /// Iterate over every class descriptor with the name of its module.
    pub fn classes(&self) -> impl Iterator<Item = (&str, &ClassDesc)> {
        self.modules.iter().flat_map(|(module, entities)| {
            entities
                .values()
                .filter_map(move |desc| desc.as_class().map(|class| (module.as_str(), class)))
        })
    }

    /// Iterate mutably over every class descriptor with the name of its module.
    pub fn classes_mut(&mut self) -> impl Iterator<Item = (&str, &mut ClassDesc)> {
        self.modules.iter_mut().flat_map(|(module, entities)| {
            entities
                .values_mut()
                .filter_map(move |desc| desc.as_class_mut().map(|class| (module.as_str(), class)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "geometry": {
                "Blah": {
                    "name": "Blah",
                    "parents": ["Base"],
                    "attrs": { "x": "float64", "dims": ["int32", 3] },
                    "methods": [
                        {
                            "name": "f",
                            "params": [{ "name": "n", "type": "int32", "default": 0 }],
                            "returns": [["vector", "float64", "const"], "&"]
                        },
                        { "name": "Blah", "params": [] }
                    ]
                },
                "foo": { "name": "foo", "signatures": [["int32"]] }
            }
        })
    }

    #[test]
    fn test_deserialize_classes_and_other_descriptors() {
        let env: Environment = serde_json::from_value(sample()).unwrap();
        let blah = env.class("geometry", "Blah").unwrap();
        assert_eq!(blah.attrs.len(), 2);
        assert_eq!(blah.extra.get("parents"), Some(&json!(["Base"])));

        let (key, returns) = blah.method_named("f").unwrap();
        assert_eq!(key.params[0].default_value(), Some(json!(0)));
        assert!(returns.is_some());
        let (_, ctor_returns) = blah.method_named("Blah").unwrap();
        assert!(ctor_returns.is_none());

        assert!(env.class("geometry", "foo").is_none());
        assert!(matches!(
            env.module("geometry").unwrap().get("foo"),
            Some(Description::Other(_))
        ));
    }

    #[test]
    fn test_classes_iterator_skips_other_descriptors() {
        let env: Environment = serde_json::from_value(sample()).unwrap();
        let names: Vec<&str> = env.classes().map(|(_, c)| c.name.as_str()).collect();
        assert_eq!(names, ["Blah"]);
    }

    #[test]
    fn test_serialize_keeps_unknown_fields() {
        let env: Environment = serde_json::from_value(sample()).unwrap();
        let out = serde_json::to_value(&env).unwrap();
        assert_eq!(out["geometry"]["Blah"]["parents"], json!(["Base"]));
        assert_eq!(out["geometry"]["foo"], sample()["geometry"]["foo"]);
        assert_eq!(out["geometry"]["Blah"]["attrs"]["dims"], json!(["int32", 3]));
    }

    #[test]
    fn test_method_key_display() {
        let key = MethodKey::new(
            "resize",
            vec![
                Param::new("n", "int32"),
                Param::new("fill", "float64").with_default(0.5),
                Param::new("tag", "str").with_default("none"),
            ],
        );
        assert_eq!(
            key.to_string(),
            "resize(n: int32, fill: float64 = 0.5, tag: str = none)"
        );
    }

    #[test]
    fn test_round_trip_is_lossless() {
        let input = json!({
            "m": {
                "K": {
                    "name": "K",
                    "attrs": {},
                    "methods": [
                        {
                            "name": "k",
                            "params": [
                                { "name": "r", "type": "int32", "default": 1 },
                                { "name": "s", "type": "str", "default": "1" },
                                { "name": "p", "type": ["K", "*"], "default": null }
                            ],
                            "returns": "void"
                        },
                        { "name": "K", "params": [] },
                        { "name": "a", "params": [], "returns": "int32" }
                    ]
                }
            }
        });
        let env: Environment = serde_json::from_value(input.clone()).unwrap();
        assert_eq!(serde_json::to_value(&env).unwrap(), input);
    }

    #[test]
    fn test_methods_keep_declaration_order() {
        let mut methods = Methods::new();
        methods.insert(MethodKey::new("z", vec![]), None);
        methods.insert(MethodKey::new("a", vec![]), None);
        let replaced = methods.insert(MethodKey::new("z", vec![]), Some("int32".into()));
        assert_eq!(replaced, Some(None));

        let names: Vec<&str> = methods.keys().map(|k| k.name.as_str()).collect();
        assert_eq!(names, ["z", "a"]);

        methods.retain(|key, _| key.name != "z");
        assert_eq!(methods.len(), 1);
        assert!(methods.get(&MethodKey::new("a", vec![])).is_some());
    }

    #[test]
    fn test_duplicate_method_signature_is_rejected() {
        let input = json!({
            "m": {
                "A": {
                    "name": "A",
                    "attrs": {},
                    "methods": [
                        { "name": "f", "params": [], "returns": "int32" },
                        { "name": "f", "params": [], "returns": "float64" }
                    ]
                }
            }
        });
        let err = serde_json::from_value::<Environment>(input).unwrap_err();
        assert!(err.to_string().contains("duplicate method signature f()"));
    }

    #[test]
    fn test_overloads_are_distinct_methods() {
        let input = json!([
            { "name": "f", "params": [{ "name": "a", "type": "int32" }] },
            { "name": "f", "params": [{ "name": "a", "type": "float64" }] }
        ]);
        let methods: Methods = serde_json::from_value(input).unwrap();
        assert_eq!(methods.len(), 2);
    }

    #[test]
    fn test_malformed_class_is_an_error() {
        let input = json!({ "m": { "A": { "name": "A", "attrs": [], "methods": [] } } });
        assert!(serde_json::from_value::<Environment>(input).is_err());
    }

    #[test]
    fn test_builder_and_insert_class() {
        let mut env = Environment::new();
        env.insert_class(
            "m",
            ClassDesc::new("A")
                .with_attr("x", "float64")
                .with_method("g", vec![Param::new("a", "int32")], None),
        );
        let class = env.class("m", "A").unwrap();
        assert_eq!(class.attrs.get("x"), Some(&TypeExpr::leaf("float64")));
        assert_eq!(class.methods.len(), 1);
        assert_eq!(env.module_names().collect::<Vec<_>>(), ["m"]);
    }
}
