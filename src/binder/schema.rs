//! Parameter schemas and their flattening across ancestors

use super::arguments::Arguments;
use super::value::Value;
use std::fmt;
use std::sync::Arc;

/// Converts a raw value before type validation
pub type Parser = Arc<dyn Fn(Value) -> std::result::Result<Value, String> + Send + Sync>;

/// Transforms a value after validation, applied to defaults as well
pub type Adapter = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Rewrites a whole call before binding
pub type ArgumentsParser =
    Arc<dyn Fn(Arguments) -> std::result::Result<Arguments, String> + Send + Sync>;

/// Declared type of a parameter
#[derive(Clone)]
pub enum TypeTag {
    Bool,
    Int,
    Float,
    Str,
    DateTime,
    /// A closed set of variant names
    OneOf(Vec<String>),
    /// Element-wise validated list
    List(Box<TypeTag>),
    /// A nested bound object; raw data binds recursively
    Schema(Arc<Schema>),
}

impl TypeTag {
    pub fn one_of<I, S>(choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TypeTag::OneOf(choices.into_iter().map(Into::into).collect())
    }

    pub fn list_of(inner: TypeTag) -> Self {
        TypeTag::List(Box::new(inner))
    }

    /// Human readable name used in error reports
    pub fn name(&self) -> String {
        match self {
            TypeTag::Bool => "bool".to_string(),
            TypeTag::Int => "int".to_string(),
            TypeTag::Float => "float".to_string(),
            TypeTag::Str => "str".to_string(),
            TypeTag::DateTime => "datetime".to_string(),
            TypeTag::OneOf(choices) => format!("one of [{}]", choices.join(", ")),
            TypeTag::List(inner) => format!("list of {}", inner.name()),
            TypeTag::Schema(schema) => schema.name().to_string(),
        }
    }

    /// Strict check, no coercion. Null satisfies every tag.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (TypeTag::Bool, Value::Bool(_)) => true,
            (TypeTag::Int, Value::Int(_)) => true,
            (TypeTag::Float, Value::Float(_)) => true,
            (TypeTag::Str, Value::Str(_)) => true,
            (TypeTag::DateTime, Value::DateTime(_)) => true,
            (TypeTag::OneOf(choices), Value::Str(s)) => choices.iter().any(|c| c == s),
            (TypeTag::List(inner), Value::List(items)) => items.iter().all(|v| inner.accepts(v)),
            (TypeTag::Schema(schema), Value::Object(obj)) => obj.derives_from(schema.name()),
            _ => false,
        }
    }
}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeTag({})", self.name())
    }
}

/// One named parameter of a schema
#[derive(Clone)]
pub struct ParameterSpec {
    pub(crate) name: String,
    pub(crate) default: Option<Value>,
    pub(crate) type_tag: Option<TypeTag>,
    pub(crate) parser: Option<Parser>,
    pub(crate) adapter: Option<Adapter>,
}

impl ParameterSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
            type_tag: None,
            parser: None,
            adapter: None,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn typed(mut self, tag: TypeTag) -> Self {
        self.type_tag = Some(tag);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn parser<F>(mut self, parser: F) -> Self
    where
        F: Fn(Value) -> std::result::Result<Value, String> + Send + Sync + 'static,
    {
        self.parser = Some(Arc::new(parser));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn adapter<F>(mut self, adapter: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.adapter = Some(Arc::new(adapter));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn type_tag(&self) -> Option<&TypeTag> {
        self.type_tag.as_ref()
    }
}

impl fmt::Debug for ParameterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterSpec")
            .field("name", &self.name)
            .field("default", &self.default)
            .field("type_tag", &self.type_tag)
            .field("parser", &self.parser.is_some())
            .field("adapter", &self.adapter.is_some())
            .finish()
    }
}

/// Ordered parameter declarations of one variant plus its parent schemas
///
/// # Example
///
/// ```
/// use saltlog::binder::{Arguments, ParameterSpec, Schema};
/// use std::sync::Arc;
///
/// let base = Arc::new(
///     Schema::new("Base")
///         .param(ParameterSpec::new("a").default("x"))
///         .param(ParameterSpec::new("b")),
/// );
/// let derived = Schema::new("Derived")
///     .extends(base)
///     .param(ParameterSpec::new("b").default("y"));
///
/// let names: Vec<_> = derived.flatten().iter().map(|p| p.name().to_string()).collect();
/// assert_eq!(names, ["a", "b"]);
///
/// let obj = derived.bind(Arguments::new()).unwrap();
/// assert_eq!(obj.get_str("b"), Some("y"));
/// ```
#[derive(Clone)]
pub struct Schema {
    name: String,
    parents: Vec<Arc<Schema>>,
    params: Vec<ParameterSpec>,
    arguments_parser: Option<ArgumentsParser>,
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parents: Vec::new(),
            params: Vec::new(),
            arguments_parser: None,
        }
    }

    /// Add a parent; parents listed first take precedence in lineage order
    #[must_use = "builder methods return a new value"]
    pub fn extends(mut self, parent: Arc<Schema>) -> Self {
        self.parents.push(parent);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn param(mut self, spec: ParameterSpec) -> Self {
        self.params.push(spec);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn arguments_parser<F>(mut self, parser: F) -> Self
    where
        F: Fn(Arguments) -> std::result::Result<Arguments, String> + Send + Sync + 'static,
    {
        self.arguments_parser = Some(Arc::new(parser));
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameters declared on this schema only
    pub fn own_params(&self) -> &[ParameterSpec] {
        &self.params
    }

    /// All schemas contributing to this one, most-base first, self last
    ///
    /// Depth-first over parents left to right; a shared ancestor is placed at
    /// its last visit so it lands before every schema deriving from it.
    pub fn lineage(&self) -> Vec<&Schema> {
        fn visit<'a>(schema: &'a Schema, out: &mut Vec<&'a Schema>) {
            out.push(schema);
            for parent in &schema.parents {
                visit(parent, out);
            }
        }

        let mut visited = Vec::new();
        visit(self, &mut visited);

        let mut lineage: Vec<&Schema> = Vec::with_capacity(visited.len());
        for schema in visited.into_iter().rev() {
            if !lineage.iter().any(|s| std::ptr::eq(*s, schema)) {
                lineage.push(schema);
            }
        }
        lineage
    }

    /// Effective ordered parameters
    ///
    /// A name redeclared by a more derived schema replaces the earlier spec
    /// in place; new names append.
    pub fn flatten(&self) -> Vec<ParameterSpec> {
        let mut merged: Vec<ParameterSpec> = Vec::new();
        for schema in self.lineage() {
            for spec in &schema.params {
                match merged.iter_mut().find(|p| p.name == spec.name) {
                    Some(slot) => *slot = spec.clone(),
                    None => merged.push(spec.clone()),
                }
            }
        }
        merged
    }

    /// Names of every schema in the lineage
    pub fn lineage_names(&self) -> Vec<String> {
        self.lineage().iter().map(|s| s.name.clone()).collect()
    }

    /// The most derived whole-call parser, if any
    pub(crate) fn effective_arguments_parser(&self) -> Option<&ArgumentsParser> {
        self.lineage()
            .into_iter()
            .rev()
            .find_map(|s| s.arguments_parser.as_ref())
    }

    /// Listing of valid parameters and their defaults
    pub fn usage(&self) -> String {
        usage_of(&self.flatten())
    }
}

pub(crate) fn usage_of(params: &[ParameterSpec]) -> String {
    let lines: Vec<String> = params
        .iter()
        .map(|p| match &p.default {
            Some(default) => format!("{}: {}", p.name, default),
            None => p.name.clone(),
        })
        .collect();
    format!("\nPossible parameters:\n\t{}", lines.join("\n\t"))
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field(
                "parents",
                &self.parents.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
            )
            .field("params", &self.params)
            .finish()
    }
}
