//! Failure context of a guarded call and the critical error it escalates to

use crate::core::{format_timestamp, Payload};
use chrono::Local;
use std::any::Any;
use std::error::Error;
use std::panic::Location;
use std::sync::atomic::{AtomicU64, Ordering};

static CORRELATION_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Raised by a critical guard; `id` links back to the logged failure record
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("critical failure in {origin} (id: {id})")]
pub struct CriticalFailure {
    pub id: String,
    pub origin: String,
}

impl CriticalFailure {
    /// New failure with a fresh correlation id
    pub fn new(origin: impl Into<String>) -> Self {
        let origin = origin.into();
        Self {
            id: correlation_id(&origin),
            origin,
        }
    }
}

/// `<timestamp>_<origin>#<sequence>`, unique within the process
pub fn correlation_id(origin: &str) -> String {
    let sequence = CORRELATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{}_{}#{}", format_timestamp(&Local::now()), origin, sequence)
}

/// What went wrong in one attempt
#[derive(Debug, Clone)]
pub enum Cause {
    /// The operation returned an error
    Error { kind: String, message: String },
    /// The operation panicked
    Panic { message: String },
    /// A nested guard already escalated; its id is reused
    Critical(CriticalFailure),
}

impl Cause {
    pub(crate) fn from_error<E>(error: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        let kind = short_type_name(std::any::type_name::<E>());
        let boxed: Box<dyn Error + Send + Sync> = error.into();
        match boxed.downcast::<CriticalFailure>() {
            Ok(critical) => Cause::Critical(*critical),
            Err(other) => Cause::Error {
                kind,
                message: other.to_string(),
            },
        }
    }

    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Cause::Panic { message }
    }

    pub fn kind(&self) -> &str {
        match self {
            Cause::Error { kind, .. } => kind,
            Cause::Panic { .. } => "panic",
            Cause::Critical(_) => "CriticalFailure",
        }
    }
}

/// Structured description of a single failed attempt
#[derive(Debug, Clone)]
pub struct ExceptionContext {
    pub id: String,
    pub origin: String,
    pub cause: Cause,
    pub location: &'static Location<'static>,
    /// Zero-based index of the failed attempt
    pub attempt: u64,
    pub parameters: Vec<(String, String)>,
}

impl ExceptionContext {
    pub(crate) fn new(
        origin: &str,
        cause: Cause,
        location: &'static Location<'static>,
        attempt: u64,
        parameters: Vec<(String, String)>,
    ) -> Self {
        let id = match &cause {
            Cause::Critical(inner) => inner.id.clone(),
            _ => correlation_id(origin),
        };
        Self {
            id,
            origin: origin.to_string(),
            cause,
            location,
            attempt,
            parameters,
        }
    }

    /// The error a critical guard raises for this failure
    pub fn escalate(&self) -> CriticalFailure {
        match &self.cause {
            Cause::Critical(inner) => inner.clone(),
            _ => CriticalFailure {
                id: self.id.clone(),
                origin: self.origin.clone(),
            },
        }
    }

    /// Payload of the failure record
    ///
    /// A propagated critical failure logs only `id`, `catcher`, `attempt` and
    /// the parameters, since its origin already logged the details.
    pub fn to_payload(&self) -> Payload {
        let mut payload = Payload::new().with("id", &self.id);
        payload = match &self.cause {
            Cause::Critical(_) => payload.with("catcher", &self.origin),
            Cause::Error { message, .. } | Cause::Panic { message } => payload
                .with("File", self.location.file())
                .with("Origin", &self.origin)
                .with("Type", self.cause.kind())
                .with("Line", self.location.line())
                .with("Msg", message),
        };
        payload = payload.with("attempt", self.attempt);
        for (name, value) in &self.parameters {
            payload = payload.with(format!("Parameter: {}", name), value);
        }
        payload
    }
}

/// Strip module paths from a type name, keeping generic structure
fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment_start = 0;
    let mut chars = full.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ':' && chars.peek() == Some(&':') {
            chars.next();
            out.truncate(segment_start);
        } else {
            out.push(c);
            if !(c.is_alphanumeric() || c == '_') {
                segment_start = out.len();
            }
        }
    }
    out
}
