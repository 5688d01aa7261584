//! Core logger types and traits

pub mod error;
pub mod log_level;
pub mod log_record;
pub mod logger;
pub mod metrics;
pub mod registry;
pub mod sink;

pub use error::{LoggerError, Result};
pub use log_level::Level;
pub use log_record::{format_timestamp, LogRecord, Payload, TIMESTAMP_FORMAT};
pub use logger::{AsyncLogger, LoggerScope, STARTED_TAG, STOPPED_TAG, STOP_SIGNAL_TAG};
pub use metrics::LoggerMetrics;
pub use registry::{live_logger_count, shutdown_all};
pub use sink::LogSink;
