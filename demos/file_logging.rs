//! File logging example
//!
//! Configures file and CSV sinks from JSON and writes to both.
//!
//! Run with: cargo run --example file_logging

use saltlog::prelude::*;
use saltlog::shutdown_all;

fn main() -> Result<()> {
    println!("=== saltlog - File Logging Example ===\n");

    let text = AsyncLogger::new(FileSink::from_json(serde_json::json!({
        "logger_id": "demo-text",
        "root": "logs",
        "overwrite": true,
        "print_log": false
    }))?);
    let csv = AsyncLogger::new(CsvSink::from_json(serde_json::json!({
        "logger_id": "demo-csv",
        "root": "logs",
        "overwrite": true,
        "combine": false,
        "print_log": false
    }))?);

    text.start()?;
    csv.start()?;

    println!("1. Logging to text and CSV files:");
    for logger in [&text, &csv] {
        logger.info([("Application", "started")]);
        logger.debug([("Configuration", "loaded from defaults")]);
        logger.warn([("Plugin", "optional plugin missing")]);
    }

    println!("2. Performing some operations:");
    for i in 1..=5 {
        let progress = format!("{}/5", i);
        text.info([("Processing", progress.as_str())]);
        csv.info([("Processing", progress.as_str())]);
    }

    // Drains and stops both loggers
    let stopped = shutdown_all();

    println!("\n=== Example completed successfully! ===");
    println!("Stopped {} loggers", stopped);
    println!("Check 'logs/demo-text/combined.log' and 'logs/demo-csv/*.log'");

    Ok(())
}
