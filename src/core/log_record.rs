//! Log record structure

use super::error::Result;
use super::log_level::Level;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// ISO-8601, microseconds, no offset: `2019-08-08T02:37:25.635229`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

pub fn format_timestamp(at: &DateTime<Local>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Ordered tag to message mapping carried by a record
///
/// # Example
///
/// ```
/// use saltlog::Payload;
///
/// let payload = Payload::new().with("tagA", "messageA").with("tagB", 42);
/// assert_eq!(payload.get("tagB"), Some("42"));
///
/// let same: Payload = [("tagA", "messageA"), ("tagB", "42")].into();
/// assert_eq!(payload, same);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload(Vec<(String, String)>);

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag; an existing tag keeps its position and takes the new message
    #[must_use = "builder methods return a new value"]
    pub fn with(mut self, tag: impl Into<String>, message: impl ToString) -> Self {
        self.insert(tag, message);
        self
    }

    pub fn insert(&mut self, tag: impl Into<String>, message: impl ToString) {
        let tag = tag.into();
        let message = message.to_string();
        match self.0.iter_mut().find(|(t, _)| *t == tag) {
            Some(slot) => slot.1 = message,
            None => self.0.push((tag, message)),
        }
    }

    pub fn get(&self, tag: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, m)| m.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(t, m)| (t.as_str(), m.as_str()))
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(t, _)| t.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for Payload {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut payload = Payload::new();
        for (tag, message) in iter {
            payload.insert(tag, message);
        }
        payload
    }
}

impl<K: Into<String>, V: ToString, const N: usize> From<[(K, V); N]> for Payload {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<K: Into<String>, V: ToString> From<Vec<(K, V)>> for Payload {
    fn from(entries: Vec<(K, V)>) -> Self {
        entries.into_iter().collect()
    }
}

/// Immutable log entry handed from producers to the worker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    level: Level,
    payload: Payload,
    timestamp: String,
}

impl LogRecord {
    /// Stamp a record with the current local time
    pub fn new(level: Level, payload: impl Into<Payload>) -> Self {
        Self::at(level, payload, format_timestamp(&Local::now()))
    }

    pub fn at(level: Level, payload: impl Into<Payload>, timestamp: impl Into<String>) -> Self {
        Self {
            level,
            payload: payload.into(),
            timestamp: timestamp.into(),
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
