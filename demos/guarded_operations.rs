//! Guarded operations example
//!
//! Retries a flaky operation, falls back on a bad input, and escalates a
//! critical failure through a nested guard with one correlation id.
//!
//! Run with: cargo run --example guarded_operations

use saltlog::prelude::*;
use std::sync::atomic::{AtomicU32, Ordering};

fn main() -> Result<()> {
    println!("=== saltlog - Guarded Operations Example ===\n");

    let logger = AsyncLogger::new(ConsoleSink::default());
    logger.start()?;
    set_exception_logger(logger.clone());

    println!("1. Retrying a flaky operation:");
    let calls = AtomicU32::new(0);
    let fetch = handle_exception(
        GuardOptions::new()
            .level(Level::Warn)
            .attempts(3)
            .log_start(true)
            .log_end(true)
            .name("fetch"),
        |url: &str| {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(format!("timeout fetching {}", url))
            } else {
                Ok(200)
            }
        },
    );
    println!("   status: {:?}", fetch.call("https://example.com"));

    println!("2. Falling back on bad input:");
    let signature = Schema::new("parse_port")
        .param(ParameterSpec::new("text"))
        .param(ParameterSpec::new("radix").default(10))
        .shared();
    let parse = handle_exception(
        GuardOptions::new()
            .level(Level::Error)
            .fallback(8080)
            .signature(signature)
            .log_params(ParamPolicy::All)
            .name("parse_port"),
        |args: Arguments| {
            let text = args.get("text").map(ToString::to_string).unwrap_or_default();
            text.parse::<u16>()
        },
    );
    println!(
        "   port: {:?}",
        parse.call(Arguments::new().kwarg("text", "eighty"))
    );

    println!("3. Escalating a critical failure:");
    let inner = handle_exception(GuardOptions::<()>::new().name("write_ledger"), |_: ()| {
        Err("ledger is read-only")
    });
    let outer = handle_exception(GuardOptions::new().name("settle"), |_: ()| inner.call(()));
    match outer.call(()) {
        Ok(_) => println!("   settled"),
        Err(failure) => println!("   aborted: {}", failure),
    }

    logger.stop();
    println!("\n=== Example completed successfully! ===");

    Ok(())
}
