//! Binding errors
//!
//! Every arity/duplicate/missing/unknown error carries the usage listing of
//! the flattened schema so callers can correct the call.

pub type Result<T> = std::result::Result<T, BindError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BindError {
    /// More positional arguments than schema parameters
    #[error("{schema}: the following args were extra: {}{usage}", .extra.join(", "))]
    Arity {
        schema: String,
        extra: Vec<String>,
        usage: String,
    },

    /// A parameter supplied both positionally and by keyword
    #[error("{schema}: the following args were provided twice: {}{usage}", .names.join(", "))]
    Duplicate {
        schema: String,
        names: Vec<String>,
        usage: String,
    },

    /// Parameters with neither a value nor a default
    #[error("{schema}: the following args were missing: {}{usage}", .names.join(", "))]
    Missing {
        schema: String,
        names: Vec<String>,
        usage: String,
    },

    /// Keyword arguments absent from the schema
    #[error("{schema}: the following args were unknown: {}{usage}", .names.join(", "))]
    Unknown {
        schema: String,
        names: Vec<String>,
        usage: String,
    },

    /// A value does not satisfy the declared type tag
    #[error("{schema}: parameter '{parameter}' expected {expected}, got {found}")]
    TypeMismatch {
        schema: String,
        parameter: String,
        expected: String,
        found: String,
    },

    /// A declared or built-in parser rejected its input
    #[error("{schema}: parameter '{parameter}' could not be parsed: {message}")]
    Parse {
        schema: String,
        parameter: String,
        message: String,
    },
}

impl BindError {
    /// Names reported by the error, in schema order
    pub fn names(&self) -> Vec<&str> {
        match self {
            BindError::Arity { extra, .. } => extra.iter().map(String::as_str).collect(),
            BindError::Duplicate { names, .. }
            | BindError::Missing { names, .. }
            | BindError::Unknown { names, .. } => names.iter().map(String::as_str).collect(),
            BindError::TypeMismatch { parameter, .. } | BindError::Parse { parameter, .. } => {
                vec![parameter.as_str()]
            }
        }
    }

    /// Rebind the error to a parameter path when raised by a nested schema
    pub(crate) fn nested_in(self, parent: &str, parameter: &str) -> Self {
        let prefix = |inner: String| format!("{}.{}", parameter, inner);
        match self {
            BindError::TypeMismatch {
                parameter: inner,
                expected,
                found,
                ..
            } => BindError::TypeMismatch {
                schema: parent.to_string(),
                parameter: prefix(inner),
                expected,
                found,
            },
            BindError::Parse {
                parameter: inner,
                message,
                ..
            } => BindError::Parse {
                schema: parent.to_string(),
                parameter: prefix(inner),
                message,
            },
            other => other,
        }
    }
}
