//! Positional and keyword arguments of a construction call

use super::value::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    positional: Vec<Value>,
    keyword: Vec<(String, Value)>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from positional values only
    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            positional: values.into_iter().map(Into::into).collect(),
            keyword: Vec::new(),
        }
    }

    /// Build from keyword values only
    pub fn keywords<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            positional: Vec::new(),
            keyword: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Raw JSON configuration: objects become keywords, arrays positionals
    pub fn from_json(json: serde_json::Value) -> Self {
        Self::from_value(Value::from(json))
    }

    /// Expand a raw value the way nested schemas do
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Map(entries) => Self {
                positional: Vec::new(),
                keyword: entries,
            },
            Value::List(items) => Self {
                positional: items,
                keyword: Vec::new(),
            },
            other => Self {
                positional: vec![other],
                keyword: Vec::new(),
            },
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keyword.push((name.into(), value.into()));
        self
    }

    pub fn positional_values(&self) -> &[Value] {
        &self.positional
    }

    pub fn keyword_values(&self) -> &[(String, Value)] {
        &self.keyword
    }

    /// Keyword lookup; the last occurrence wins
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.keyword
            .iter()
            .rev()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.positional.len() + self.keyword.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keyword.is_empty()
    }

    pub fn into_parts(self) -> (Vec<Value>, Vec<(String, Value)>) {
        (self.positional, self.keyword)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let args = Arguments::new().arg(1).arg("two").kwarg("three", 3.0);
        assert_eq!(args.len(), 3);
        assert_eq!(args.positional_values()[1], Value::from("two"));
        assert_eq!(args.get("three"), Some(&Value::Float(3.0)));
        assert_eq!(args.get("four"), None);
    }

    #[test]
    fn test_from_json() {
        let args = Arguments::from_json(serde_json::json!({"root": "/tmp", "combine": false}));
        assert!(args.positional_values().is_empty());
        assert_eq!(args.get("combine"), Some(&Value::Bool(false)));

        let args = Arguments::from_json(serde_json::json!(["a", 1]));
        assert_eq!(args.positional_values(), &[Value::from("a"), Value::Int(1)]);

        let args = Arguments::from_json(serde_json::json!("single"));
        assert_eq!(args.positional_values(), &[Value::from("single")]);
    }

    #[test]
    fn test_from_json_keeps_key_order() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"root": "/tmp", "combine": false, "logger_id": "svc"}"#)
                .unwrap();
        let args = Arguments::from_json(json);
        let names: Vec<&str> = args.keyword_values().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, ["root", "combine", "logger_id"]);
    }
}
