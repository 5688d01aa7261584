//! Basic logger usage example
//!
//! Demonstrates an asynchronous console logger, every level, and the
//! automatic lifecycle records.
//!
//! Run with: cargo run --example basic_usage

use saltlog::prelude::*;
use saltlog::{info, warn};

fn main() -> Result<()> {
    println!("=== saltlog - Basic Usage Example ===\n");

    // Console sink configured through its schema: logger_id, print_log, use_colors
    let sink = ConsoleSink::from_args(Arguments::positional(["basic"]).kwarg("use_colors", true))?;
    let logger = AsyncLogger::new(sink);

    println!("1. Logging at different levels:");
    logger.run_scoped(|logger| {
        logger.debug([("tagA", "messageA"), ("tagB", "messageB")]);
        logger.info([("tag", "Nothing to see here!")]);
        logger.warn([("disk", "85% used")]);
        logger.error([("request", "GET /health"), ("status", "503")]);
        logger.critical([("tag", "Something went very wrong")]);
    })?;

    println!("\n2. Scoped acquisition with macros:");
    {
        let scope = logger.scope()?;
        info!(scope, "user" => "ada", "action" => "login");
        warn!(scope, "retry" => 3, "of" => 5);
    }

    println!("\n=== Example completed successfully! ===");
    println!(
        "{} records persisted, {} failed",
        logger.metrics().persisted_count(),
        logger.metrics().failed_count()
    );

    Ok(())
}
