//! Sink implementations
//!
//! Every sink renders the console block; file based sinks share the
//! `root/logger_id/` layout.

pub mod console;
pub mod csv;
pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use console::{logger_schema, ConsoleConfig, ConsoleSink, DEFAULT_LOGGER_ID};
pub use csv::CsvSink;
pub use file::{FileConfig, FileSink, COMBINED_FILE_STEM};
#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteConfig, SqliteSink, MEMORY_DATABASE};
