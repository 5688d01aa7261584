//! Rendering the parameters of a guarded call

use crate::binder::{Arguments, Schema, Value};

/// Arguments of a guarded operation that can be written into a failure record
///
/// Captured values resolve in three layers, later layers replacing earlier
/// ones by name: the signature's defaults, then positional values named by
/// signature order (`arg_<i>` past its end or without a signature), then
/// keyword values.
pub trait Parameters {
    fn positional(&self) -> Vec<String>;

    fn keyword(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Ordered `(name, rendered value)` pairs
    fn captured(&self, signature: Option<&Schema>) -> Vec<(String, String)> {
        let params = signature.map(Schema::flatten).unwrap_or_default();
        let mut captured: Vec<(String, String)> = params
            .iter()
            .filter_map(|spec| {
                spec.default_value()
                    .map(|value| (spec.name().to_string(), value.to_string()))
            })
            .collect();

        for (index, value) in self.positional().into_iter().enumerate() {
            let name = params
                .get(index)
                .map(|spec| spec.name().to_string())
                .unwrap_or_else(|| format!("arg_{}", index));
            upsert(&mut captured, name, value);
        }
        for (name, value) in self.keyword() {
            upsert(&mut captured, name, value);
        }
        captured
    }
}

fn upsert(captured: &mut Vec<(String, String)>, name: String, value: String) {
    match captured.iter_mut().find(|(existing, _)| *existing == name) {
        Some(entry) => entry.1 = value,
        None => captured.push((name, value)),
    }
}

impl Parameters for () {
    fn positional(&self) -> Vec<String> {
        Vec::new()
    }
}

impl Parameters for Arguments {
    fn positional(&self) -> Vec<String> {
        self.positional_values().iter().map(Value::to_string).collect()
    }

    fn keyword(&self) -> Vec<(String, String)> {
        self.keyword_values()
            .iter()
            .map(|(name, value)| (name.clone(), value.to_string()))
            .collect()
    }
}

macro_rules! scalar_parameters {
    ($($ty:ty),*) => {
        $(
            impl Parameters for $ty {
                fn positional(&self) -> Vec<String> {
                    vec![self.to_string()]
                }
            }
        )*
    };
}

scalar_parameters!(bool, char, i8, i16, i32, i64, u8, u16, u32, u64, usize, isize, f32, f64, String, &str);

macro_rules! tuple_parameters {
    ($($name:ident),+) => {
        impl<$($name: std::fmt::Display),+> Parameters for ($($name,)+) {
            #[allow(non_snake_case)]
            fn positional(&self) -> Vec<String> {
                let ($($name,)+) = self;
                vec![$($name.to_string()),+]
            }
        }
    };
}

tuple_parameters!(A);
tuple_parameters!(A, B);
tuple_parameters!(A, B, C);
tuple_parameters!(A, B, C, D);
tuple_parameters!(A, B, C, D, E);
tuple_parameters!(A, B, C, D, E, F);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::ParameterSpec;

    fn signature() -> Schema {
        Schema::new("divide")
            .param(ParameterSpec::new("numerator"))
            .param(ParameterSpec::new("denominator").default(1))
            .param(ParameterSpec::new("label").default("ratio"))
    }

    #[test]
    fn test_tuples_without_signature() {
        let captured = (3, "x").captured(None);
        assert_eq!(
            captured,
            [("arg_0".to_string(), "3".to_string()), ("arg_1".to_string(), "x".to_string())]
        );
        assert!(().captured(None).is_empty());
        assert_eq!(42u32.captured(None), [("arg_0".to_string(), "42".to_string())]);
    }

    #[test]
    fn test_defaults_then_positional_then_keyword() {
        let args = Arguments::positional([10]).kwarg("label", "custom");
        let captured = args.captured(Some(&signature()));

        assert_eq!(
            captured,
            [
                ("denominator".to_string(), "1".to_string()),
                ("label".to_string(), "custom".to_string()),
                ("numerator".to_string(), "10".to_string()),
            ]
        );
    }

    #[test]
    fn test_extra_positionals_are_numbered() {
        let captured = (1, 2, 3, 4).captured(Some(&signature()));
        let names: Vec<&str> = captured.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["denominator", "label", "numerator", "arg_3"]);
        assert_eq!(captured[0].1, "2");
    }
}
