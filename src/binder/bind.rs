//! Resolution of arguments against a flattened schema

use super::arguments::Arguments;
use super::error::{BindError, Result};
use super::object::BoundObject;
use super::schema::{usage_of, ParameterSpec, Schema, TypeTag};
use super::value::Value;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

const TRUE_WORDS: &[&str] = &["y", "yes", "true", "t", "on", "1"];
const FALSE_WORDS: &[&str] = &["n", "no", "false", "f", "off", "0"];

impl Schema {
    /// Bind a call to this schema
    ///
    /// Checks run in order: arity, duplicates, missing, unknown, then each
    /// value goes through parser, type check and adapter. Nothing is returned
    /// unless every parameter resolves.
    pub fn bind(&self, args: Arguments) -> Result<BoundObject> {
        let args = match self.effective_arguments_parser() {
            Some(parser) => parser(args).map_err(|message| BindError::Parse {
                schema: self.name().to_string(),
                parameter: "<arguments>".to_string(),
                message,
            })?,
            None => args,
        };

        let params = self.flatten();
        let (positional, keyword) = args.into_parts();

        if positional.len() > params.len() {
            return Err(BindError::Arity {
                schema: self.name().to_string(),
                extra: (params.len()..positional.len())
                    .map(|i| format!("arg at position {}", i + 1))
                    .collect(),
                usage: usage_of(&params),
            });
        }

        let positional_count = positional.len();
        let mut resolved: Vec<Option<Value>> = vec![None; params.len()];
        for (slot, value) in resolved.iter_mut().zip(positional) {
            *slot = Some(value);
        }

        let duplicates: Vec<String> = params[..positional_count]
            .iter()
            .filter(|p| keyword.iter().any(|(k, _)| *k == p.name))
            .map(|p| p.name.clone())
            .collect();
        if !duplicates.is_empty() {
            return Err(BindError::Duplicate {
                schema: self.name().to_string(),
                names: duplicates,
                usage: usage_of(&params),
            });
        }

        let mut unknown = Vec::new();
        for (name, value) in keyword {
            match params.iter().position(|p| p.name == name) {
                Some(idx) => resolved[idx] = Some(value),
                None => {
                    if !unknown.contains(&name) {
                        unknown.push(name);
                    }
                }
            }
        }

        let mut missing = Vec::new();
        for (slot, spec) in resolved.iter_mut().zip(&params) {
            if slot.is_none() {
                match &spec.default {
                    Some(default) => *slot = Some(default.clone()),
                    None => missing.push(spec.name.clone()),
                }
            }
        }
        if !missing.is_empty() {
            return Err(BindError::Missing {
                schema: self.name().to_string(),
                names: missing,
                usage: usage_of(&params),
            });
        }
        if !unknown.is_empty() {
            return Err(BindError::Unknown {
                schema: self.name().to_string(),
                names: unknown,
                usage: usage_of(&params),
            });
        }

        let mut attributes = Vec::with_capacity(params.len());
        for (spec, raw) in params.iter().zip(resolved) {
            let raw = raw.unwrap_or(Value::Null);
            attributes.push((spec.name.clone(), self.resolve(spec, raw)?));
        }

        Ok(BoundObject::new(self, attributes))
    }

    fn resolve(&self, spec: &ParameterSpec, raw: Value) -> Result<Value> {
        let value = match (&spec.parser, &spec.type_tag) {
            (Some(parser), tag) => {
                let parsed = parser(raw).map_err(|message| BindError::Parse {
                    schema: self.name().to_string(),
                    parameter: spec.name.clone(),
                    message,
                })?;
                if let Some(tag) = tag {
                    if !tag.accepts(&parsed) {
                        return Err(BindError::TypeMismatch {
                            schema: self.name().to_string(),
                            parameter: spec.name.clone(),
                            expected: tag.name(),
                            found: parsed.kind().to_string(),
                        });
                    }
                }
                parsed
            }
            (None, Some(tag)) => self.coerce(&spec.name, tag, raw)?,
            (None, None) => raw,
        };

        Ok(match &spec.adapter {
            Some(adapter) => adapter(value),
            None => value,
        })
    }

    /// Built-in conversion of a raw value into the tagged type
    fn coerce(&self, parameter: &str, tag: &TypeTag, raw: Value) -> Result<Value> {
        let parse_error = |message: String| BindError::Parse {
            schema: self.name().to_string(),
            parameter: parameter.to_string(),
            message,
        };

        match (tag, raw) {
            (_, Value::Null) => Ok(Value::Null),

            (TypeTag::Bool, Value::Bool(b)) => Ok(Value::Bool(b)),
            (TypeTag::Bool, Value::Int(i @ (0 | 1))) => Ok(Value::Bool(i == 1)),
            (TypeTag::Bool, Value::Str(s)) => parse_bool(&s).map(Value::Bool).map_err(parse_error),

            (TypeTag::Int, Value::Int(i)) => Ok(Value::Int(i)),
            (TypeTag::Int, Value::Str(s)) => s
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|e| parse_error(format!("'{}': {}", s, e))),

            (TypeTag::Float, Value::Float(f)) => Ok(Value::Float(f)),
            (TypeTag::Float, Value::Int(i)) => Ok(Value::Float(i as f64)),
            (TypeTag::Float, Value::Str(s)) => s
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|e| parse_error(format!("'{}': {}", s, e))),

            (TypeTag::Str, Value::Str(s)) => Ok(Value::Str(s)),
            (TypeTag::Str, scalar @ (Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::DateTime(_))) => {
                Ok(Value::Str(scalar.to_string()))
            }

            (TypeTag::DateTime, Value::DateTime(dt)) => Ok(Value::DateTime(dt)),
            (TypeTag::DateTime, Value::Str(s)) => {
                parse_datetime(&s).map(Value::DateTime).map_err(parse_error)
            }
            (TypeTag::DateTime, Value::Int(secs)) => {
                from_epoch(secs as f64).map(Value::DateTime).map_err(parse_error)
            }
            (TypeTag::DateTime, Value::Float(secs)) => {
                from_epoch(secs).map(Value::DateTime).map_err(parse_error)
            }

            (TypeTag::OneOf(choices), Value::Str(s)) => {
                if choices.iter().any(|c| *c == s) {
                    Ok(Value::Str(s))
                } else {
                    Err(parse_error(format!(
                        "'{}' is not one of [{}]",
                        s,
                        choices.join(", ")
                    )))
                }
            }

            (TypeTag::List(inner), Value::List(items)) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| self.coerce(&format!("{}[{}]", parameter, i), inner, item))
                .collect::<Result<Vec<_>>>()
                .map(Value::List),
            (TypeTag::List(inner), single) => {
                let item = self.coerce(&format!("{}[0]", parameter), inner, single)?;
                Ok(Value::List(vec![item]))
            }

            (TypeTag::Schema(schema), Value::Object(obj)) => {
                if obj.derives_from(schema.name()) {
                    Ok(Value::Object(obj))
                } else {
                    Err(self.mismatch(parameter, tag, obj.schema_name()))
                }
            }
            (TypeTag::Schema(schema), raw) => schema
                .bind(Arguments::from_value(raw))
                .map(Value::Object)
                .map_err(|e| e.nested_in(self.name(), parameter)),

            (tag, other) => Err(self.mismatch(parameter, tag, other.kind())),
        }
    }

    fn mismatch(&self, parameter: &str, tag: &TypeTag, found: &str) -> BindError {
        BindError::TypeMismatch {
            schema: self.name().to_string(),
            parameter: parameter.to_string(),
            expected: tag.name(),
            found: found.to_string(),
        }
    }
}

fn parse_bool(s: &str) -> std::result::Result<bool, String> {
    let lowered = s.trim().to_lowercase();
    if TRUE_WORDS.contains(&lowered.as_str()) {
        Ok(true)
    } else if FALSE_WORDS.contains(&lowered.as_str()) {
        Ok(false)
    } else {
        Err(format!("'{}' is not a boolean", s))
    }
}

/// Epoch seconds or an ISO-8601 datetime, naive values read as UTC
fn parse_datetime(s: &str) -> std::result::Result<DateTime<Utc>, String> {
    let s = s.trim();
    if let Ok(secs) = s.parse::<f64>() {
        return from_epoch(secs);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    Err(format!("'{}' is not a datetime", s))
}

fn from_epoch(secs: f64) -> std::result::Result<DateTime<Utc>, String> {
    if !secs.is_finite() {
        return Err(format!("{} is not a valid timestamp", secs));
    }
    let micros = (secs * 1_000_000.0).round() as i64;
    let whole = micros.div_euclid(1_000_000);
    let nanos = (micros.rem_euclid(1_000_000) * 1_000) as u32;
    DateTime::from_timestamp(whole, nanos).ok_or_else(|| format!("{} is out of range", secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn letters() -> Schema {
        Schema::new("Letters")
            .param(ParameterSpec::new("a"))
            .param(ParameterSpec::new("b").default("bx"))
    }

    #[test]
    fn test_positional_and_keyword() {
        let obj = letters()
            .bind(Arguments::new().arg(1).kwarg("b", 2))
            .unwrap();
        assert_eq!(obj.get("a"), Some(&Value::Int(1)));
        assert_eq!(obj.get("b"), Some(&Value::Int(2)));
        assert_eq!(obj.names().collect::<Vec<_>>(), ["a", "b"]);
    }

    #[test]
    fn test_arity_error() {
        let err = letters()
            .bind(Arguments::positional([1, 2, 3]))
            .unwrap_err();
        assert!(matches!(err, BindError::Arity { .. }));
        assert_eq!(err.names(), vec!["arg at position 3"]);
    }

    #[test]
    fn test_duplicate_error_reports_conflicts() {
        let err = letters()
            .bind(Arguments::new().arg(1).arg(2).kwarg("a", 3).kwarg("b", 4))
            .unwrap_err();
        assert!(matches!(err, BindError::Duplicate { .. }));
        assert_eq!(err.names(), vec!["a", "b"]);
    }

    #[test]
    fn test_missing_error_carries_usage() {
        let err = letters().bind(Arguments::new()).unwrap_err();
        assert!(matches!(err, BindError::Missing { .. }));
        assert_eq!(err.names(), vec!["a"]);
        assert!(err.to_string().contains("Possible parameters:"));
        assert!(err.to_string().contains("b: bx"));
    }

    #[test]
    fn test_unknown_error() {
        let err = letters()
            .bind(Arguments::new().arg(1).kwarg("zzz", 0))
            .unwrap_err();
        assert!(matches!(err, BindError::Unknown { .. }));
        assert_eq!(err.names(), vec!["zzz"]);
    }

    #[test]
    fn test_missing_is_reported_before_unknown() {
        let err = letters()
            .bind(Arguments::new().kwarg("zzz", 0))
            .unwrap_err();
        assert!(matches!(err, BindError::Missing { .. }));
    }

    #[test]
    fn test_empty_schema() {
        let obj = Schema::new("Empty").bind(Arguments::new()).unwrap();
        assert!(obj.is_empty());
    }

    #[test]
    fn test_parser_then_adapter() {
        let double = |v: Value| match v {
            Value::Str(s) => Value::Str(format!("{}{}", s, s)),
            other => other,
        };
        let schema = Schema::new("Twice").param(
            ParameterSpec::new("p")
                .parser(move |v| Ok(double(v)))
                .adapter(double),
        );
        let obj = schema.bind(Arguments::positional(["k"])).unwrap();
        assert_eq!(obj.get_str("p"), Some("kkkk"));
    }

    #[test]
    fn test_parser_output_checked_strictly() {
        let schema = Schema::new("B").param(
            ParameterSpec::new("p0")
                .parser(|v| match v {
                    Value::Str(s) => s
                        .parse::<f64>()
                        .map(|f| Value::Float(f + 1.0))
                        .map_err(|e| e.to_string()),
                    other => Ok(other),
                })
                .typed(TypeTag::Int),
        );
        let err = schema.bind(Arguments::positional(["1"])).unwrap_err();
        assert!(matches!(err, BindError::TypeMismatch { .. }));
        assert!(err.to_string().contains("expected int"));
    }

    #[test]
    fn test_parser_failure() {
        let schema = Schema::new("P")
            .param(ParameterSpec::new("p").parser(|_| Err("nope".to_string())));
        let err = schema.bind(Arguments::positional([1])).unwrap_err();
        assert!(matches!(err, BindError::Parse { .. }));
    }

    #[test]
    fn test_default_coercion_applies_to_defaults() {
        let schema = Schema::new("A")
            .param(ParameterSpec::new("p1").default("P0").typed(TypeTag::one_of(["P0", "P1", "P2"])))
            .param(ParameterSpec::new("p2").default("1").typed(TypeTag::Int))
            .param(ParameterSpec::new("p3").default("y").typed(TypeTag::Bool));

        let obj = schema.bind(Arguments::new()).unwrap();
        assert_eq!(obj.get_str("p1"), Some("P0"));
        assert_eq!(obj.get_int("p2"), Some(1));
        assert_eq!(obj.get_bool("p3"), Some(true));

        let obj = schema
            .bind(Arguments::new().kwarg("p1", "P2").kwarg("p2", "50").kwarg("p3", "off"))
            .unwrap();
        assert_eq!(obj.get_str("p1"), Some("P2"));
        assert_eq!(obj.get_int("p2"), Some(50));
        assert_eq!(obj.get_bool("p3"), Some(false));

        let err = schema.bind(Arguments::new().kwarg("p1", "P9")).unwrap_err();
        assert!(matches!(err, BindError::Parse { .. }));
    }

    #[test]
    fn test_type_mismatch_without_coercion_path() {
        let schema = Schema::new("A").param(ParameterSpec::new("n").typed(TypeTag::Int));
        let err = schema
            .bind(Arguments::positional([Value::from(vec![1])]))
            .unwrap_err();
        assert_eq!(
            err,
            BindError::TypeMismatch {
                schema: "A".into(),
                parameter: "n".into(),
                expected: "int".into(),
                found: "list".into(),
            }
        );
    }

    #[test]
    fn test_datetime_epoch_and_iso_agree() {
        let schema = Schema::new("T").param(ParameterSpec::new("at").typed(TypeTag::DateTime));
        let from_epoch = schema.bind(Arguments::positional(["1577689633.5"])).unwrap();
        let from_iso = schema
            .bind(Arguments::positional(["2019-12-30T07:07:13.500000"]))
            .unwrap();
        assert_eq!(from_epoch.get("at"), from_iso.get("at"));
    }

    #[test]
    fn test_nested_schema_from_raw_data() {
        let inner = Schema::new("A")
            .param(ParameterSpec::new("p0").typed(TypeTag::Str))
            .param(ParameterSpec::new("p1").default(0).typed(TypeTag::Int))
            .shared();
        let outer = Schema::new("B")
            .param(ParameterSpec::new("one").typed(TypeTag::Schema(Arc::clone(&inner))))
            .param(ParameterSpec::new("many").typed(TypeTag::list_of(TypeTag::Schema(Arc::clone(&inner)))));

        let obj = outer
            .bind(
                Arguments::new()
                    .arg(Value::from(vec!["x"]))
                    .arg(Value::from(vec!["a", "b"])),
            )
            .unwrap();

        let one = obj.get("one").and_then(Value::as_object).unwrap();
        assert_eq!(one.get_str("p0"), Some("x"));
        assert_eq!(one.get_int("p1"), Some(0));

        let many = obj.get("many").and_then(Value::as_list).unwrap();
        assert_eq!(many.len(), 2);
        assert_eq!(many[1].as_object().and_then(|o| o.get_str("p0")), Some("b"));

        let obj = outer
            .bind(Arguments::from_json(serde_json::json!({
                "one": {"p0": "k", "p1": "7"},
                "many": [{"p0": "m"}]
            })))
            .unwrap();
        let one = obj.get("one").and_then(Value::as_object).unwrap();
        assert_eq!(one.get_int("p1"), Some(7));
    }

    #[test]
    fn test_nested_error_names_path() {
        let inner = Schema::new("A")
            .param(ParameterSpec::new("n").typed(TypeTag::Int))
            .shared();
        let outer = Schema::new("B").param(ParameterSpec::new("child").typed(TypeTag::Schema(inner)));
        let err = outer
            .bind(Arguments::positional([Value::Map(vec![("n".into(), Value::from("abc"))])]))
            .unwrap_err();
        assert_eq!(err.names(), vec!["child.n"]);
    }

    #[test]
    fn test_list_wraps_scalar_and_accepts_bound_objects() {
        let a = Schema::new("A").param(ParameterSpec::new("pA0")).shared();
        let b = Schema::new("B")
            .param(ParameterSpec::new("pB0").typed(TypeTag::list_of(TypeTag::Schema(Arc::clone(&a)))))
            .param(ParameterSpec::new("pB1").typed(TypeTag::list_of(TypeTag::Int)));

        let a0 = a.bind(Arguments::positional(["pA0"])).unwrap();
        let b0 = b
            .bind(Arguments::new().arg(a0.clone()).arg(1))
            .unwrap();
        assert_eq!(b0.get("pB0"), Some(&Value::List(vec![Value::Object(a0)])));
        assert_eq!(b0.get("pB1"), Some(&Value::from(vec![1])));
    }

    #[test]
    fn test_object_of_wrong_schema_rejected() {
        let a = Schema::new("A").param(ParameterSpec::new("x")).shared();
        let other = Schema::new("Other").param(ParameterSpec::new("x"));
        let b = Schema::new("B").param(ParameterSpec::new("child").typed(TypeTag::Schema(a)));

        let foreign = other.bind(Arguments::positional([1])).unwrap();
        let err = b.bind(Arguments::positional([foreign])).unwrap_err();
        assert!(matches!(err, BindError::TypeMismatch { .. }));
    }

    #[test]
    fn test_derived_object_satisfies_base_tag() {
        let base = Schema::new("Base").param(ParameterSpec::new("x")).shared();
        let derived = Schema::new("Derived").extends(Arc::clone(&base));
        let holder = Schema::new("Holder").param(ParameterSpec::new("item").typed(TypeTag::Schema(base)));

        let item = derived.bind(Arguments::positional([1])).unwrap();
        assert!(holder.bind(Arguments::positional([item])).is_ok());
    }

    #[test]
    fn test_arguments_parser_rewrites_call() {
        let schema = Schema::new("Words")
            .param(ParameterSpec::new("p0"))
            .param(ParameterSpec::new("p1"))
            .param(ParameterSpec::new("p2"))
            .arguments_parser(|args| {
                let first = args
                    .positional_values()
                    .first()
                    .and_then(Value::as_str)
                    .ok_or_else(|| "expected a string".to_string())?;
                Ok(Arguments::positional(first.split_whitespace()))
            });

        let obj = schema.bind(Arguments::positional(["p0 p1 p2"])).unwrap();
        assert_eq!(obj.get_str("p2"), Some("p2"));

        let err = schema.bind(Arguments::new()).unwrap_err();
        assert!(matches!(err, BindError::Parse { .. }));
    }
}
