//! # saltlog
//!
//! Schema-bound configuration, asynchronous multi-backend logging and
//! guarded operation calls.
//!
//! ## Features
//!
//! - **Attribute binding**: declarative schemas with inheritance, positional
//!   and keyword arguments, coercion, parsers and adapters
//! - **Asynchronous logging**: one FIFO worker per logger, ordered shutdown
//!   that drains every queued record
//! - **Sinks**: console, text files, CSV and SQLite
//! - **Exception guard**: retries, hooks, parameter capture and critical
//!   escalation with a correlation id
//!
//! ## Example
//!
//! ```
//! use saltlog::prelude::*;
//!
//! let logger = AsyncLogger::new(ConsoleSink::quiet("app"));
//! logger.start()?;
//! logger.info([("Server", "started")]);
//! logger.stop();
//! # Ok::<(), saltlog::LoggerError>(())
//! ```

pub mod binder;
pub mod core;
pub mod guard;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::binder::{Arguments, Bindable, BoundObject, ParameterSpec, Schema, TypeTag, Value};
    pub use crate::core::{
        shutdown_all, AsyncLogger, Level, LogRecord, LogSink, LoggerError, LoggerScope, Payload,
        Result,
    };
    pub use crate::guard::{
        handle_exception, set_exception_logger, CriticalFailure, Guard, GuardOptions, ParamPolicy,
    };
    pub use crate::sinks::{ConsoleConfig, ConsoleSink, CsvSink, FileConfig, FileSink};
    #[cfg(feature = "sqlite")]
    pub use crate::sinks::{SqliteConfig, SqliteSink};
}

pub use crate::binder::{
    Adapter, Arguments, ArgumentsParser, BindError, Bindable, BoundObject, ParameterSpec, Parser,
    Schema, TypeTag, Value,
};
pub use crate::core::{
    format_timestamp, live_logger_count, shutdown_all, AsyncLogger, Level, LogRecord, LogSink,
    LoggerError, LoggerMetrics, LoggerScope, Payload, Result, STARTED_TAG, STOPPED_TAG,
    STOP_SIGNAL_TAG, TIMESTAMP_FORMAT,
};
pub use crate::guard::{
    correlation_id, exception_logger, handle_exception, set_exception_logger, Cause,
    CriticalFailure, ExceptionContext, Guard, GuardOptions, Hook, ParamPolicy, Parameters,
};
pub use crate::sinks::{logger_schema, ConsoleConfig, ConsoleSink, CsvSink, FileConfig, FileSink};
#[cfg(feature = "sqlite")]
pub use crate::sinks::{SqliteConfig, SqliteSink};
