//! Sink trait for log persistence backends

use super::{error::Result, log_record::LogRecord};

/// A backend persisting records for one logger
///
/// Only the logger's worker thread calls `persist`, so implementations need
/// no internal locking.
pub trait LogSink: Send {
    /// Persist a record and return its rendered text, if the sink renders one
    fn persist(&mut self, record: &LogRecord) -> Result<Option<String>>;

    /// Identifier of the owning logger
    fn logger_id(&self) -> &str;

    fn name(&self) -> &str;
}

impl<S: LogSink + ?Sized> LogSink for Box<S> {
    fn persist(&mut self, record: &LogRecord) -> Result<Option<String>> {
        (**self).persist(record)
    }

    fn logger_id(&self) -> &str {
        (**self).logger_id()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
