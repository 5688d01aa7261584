//! Bound objects produced by applying a schema to arguments

use super::error::{BindError, Result};
use super::schema::Schema;
use super::value::Value;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Instance whose attributes are exactly the flattened schema's parameters
#[derive(Debug, Clone)]
pub struct BoundObject {
    schema: String,
    lineage: Vec<String>,
    object_id: u64,
    attributes: Vec<(String, Value)>,
}

impl BoundObject {
    pub(crate) fn new(schema: &Schema, attributes: Vec<(String, Value)>) -> Self {
        Self {
            schema: schema.name().to_string(),
            lineage: schema.lineage_names(),
            object_id: NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed),
            attributes,
        }
    }

    pub fn schema_name(&self) -> &str {
        &self.schema
    }

    /// Unique per constructed object, not part of equality
    pub fn object_id(&self) -> u64 {
        self.object_id
    }

    /// True if `schema` is this object's schema or one of its ancestors
    pub fn derives_from(&self, schema: &str) -> bool {
        self.lineage.iter().any(|name| name == schema)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|(k, _)| k.as_str())
    }

    pub fn attributes(&self) -> &[(String, Value)] {
        &self.attributes
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_int)
    }

    /// Typed read used by `Bindable` implementations
    pub fn str_attr(&self, name: &str) -> Result<String> {
        self.get_str(name)
            .map(str::to_string)
            .ok_or_else(|| self.mismatch(name, "str"))
    }

    pub fn bool_attr(&self, name: &str) -> Result<bool> {
        self.get_bool(name).ok_or_else(|| self.mismatch(name, "bool"))
    }

    pub fn int_attr(&self, name: &str) -> Result<i64> {
        self.get_int(name).ok_or_else(|| self.mismatch(name, "int"))
    }

    fn mismatch(&self, name: &str, expected: &str) -> BindError {
        BindError::TypeMismatch {
            schema: self.schema.clone(),
            parameter: name.to_string(),
            expected: expected.to_string(),
            found: self
                .get(name)
                .map(Value::kind)
                .unwrap_or("nothing")
                .to_string(),
        }
    }

    pub fn into_values(self) -> Vec<(String, Value)> {
        self.attributes
    }
}

impl PartialEq for BoundObject {
    fn eq(&self, other: &Self) -> bool {
        self.schema == other.schema && self.attributes == other.attributes
    }
}

impl fmt::Display for BoundObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{object_id: {}", self.schema, self.object_id)?;
        for (name, value) in &self.attributes {
            write!(f, ", {}: {}", name, value)?;
        }
        write!(f, "}}")
    }
}

/// Statically typed configuration built through a schema
///
/// # Example
///
/// ```
/// use saltlog::binder::{Bindable, BoundObject, ParameterSpec, Result, Schema, TypeTag};
/// use std::sync::Arc;
///
/// struct Endpoint {
///     host: String,
///     port: i64,
/// }
///
/// impl Bindable for Endpoint {
///     fn schema() -> Arc<Schema> {
///         Schema::new("Endpoint")
///             .param(ParameterSpec::new("host").typed(TypeTag::Str))
///             .param(ParameterSpec::new("port").default(80).typed(TypeTag::Int))
///             .shared()
///     }
///
///     fn from_bound(object: BoundObject) -> Result<Self> {
///         Ok(Self {
///             host: object.str_attr("host")?,
///             port: object.int_attr("port")?,
///         })
///     }
/// }
///
/// let endpoint = Endpoint::from_json(serde_json::json!({"host": "localhost", "port": "8080"})).unwrap();
/// assert_eq!(endpoint.host, "localhost");
/// assert_eq!(endpoint.port, 8080);
/// ```
pub trait Bindable: Sized {
    fn schema() -> Arc<Schema>;

    fn from_bound(object: BoundObject) -> Result<Self>;

    fn bind(args: super::Arguments) -> Result<Self> {
        Self::from_bound(Self::schema().bind(args)?)
    }

    fn from_json(json: serde_json::Value) -> Result<Self> {
        Self::bind(super::Arguments::from_json(json))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::{Arguments, ParameterSpec};

    #[test]
    fn test_display_includes_object_id_and_nested_values() {
        let schema = Schema::new("A").param(ParameterSpec::new("p0"));
        let inner = schema.bind(Arguments::positional(["xxx"])).unwrap();
        let outer = schema
            .bind(Arguments::positional([Value::from(vec![inner])]))
            .unwrap();

        let rendered = outer.to_string();
        assert!(rendered.contains("object_id"));
        assert!(rendered.contains("xxx"));
    }

    #[test]
    fn test_equality_ignores_object_id() {
        let schema = Schema::new("A").param(ParameterSpec::new("p0"));
        let a = schema.bind(Arguments::positional([1])).unwrap();
        let b = schema.bind(Arguments::positional([1])).unwrap();
        assert_ne!(a.object_id(), b.object_id());
        assert_eq!(a, b);
    }

    #[test]
    fn test_typed_reads() {
        let schema = Schema::new("A")
            .param(ParameterSpec::new("s").default("v"))
            .param(ParameterSpec::new("b").default(true));
        let obj = schema.bind(Arguments::new()).unwrap();
        assert_eq!(obj.str_attr("s").unwrap(), "v");
        assert!(obj.bool_attr("b").unwrap());
        assert!(matches!(
            obj.int_attr("s"),
            Err(BindError::TypeMismatch { .. })
        ));
        assert!(matches!(
            obj.str_attr("missing"),
            Err(BindError::TypeMismatch { .. })
        ));
    }
}
