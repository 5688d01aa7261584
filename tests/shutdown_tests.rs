//! Process-wide state: the live-logger registry and the default exception
//! logger
//!
//! Kept in its own test binary because `shutdown_all` stops every logger in
//! the process.

use parking_lot::Mutex;
use saltlog::prelude::*;
use saltlog::{exception_logger, live_logger_count, STOPPED_TAG};
use std::sync::Arc;

#[derive(Clone, Default)]
struct Collected(Arc<Mutex<Vec<LogRecord>>>);

impl Collected {
    fn tags(&self) -> Vec<String> {
        self.0
            .lock()
            .iter()
            .flat_map(|r| r.payload().tags().map(str::to_string).collect::<Vec<_>>())
            .collect()
    }
}

impl LogSink for Collected {
    fn persist(&mut self, record: &LogRecord) -> saltlog::Result<Option<String>> {
        self.0.lock().push(record.clone());
        Ok(None)
    }

    fn logger_id(&self) -> &str {
        "shutdown"
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[test]
fn test_shutdown_all_and_default_exception_logger() {
    assert_eq!(live_logger_count(), 0);
    assert_eq!(shutdown_all(), 0);

    let first = Collected::default();
    let second = Collected::default();
    let exceptions = Collected::default();

    let a = AsyncLogger::new(first.clone());
    let b = AsyncLogger::new(second.clone());
    let default_logger = AsyncLogger::new(exceptions.clone());
    a.start().unwrap();
    b.start().unwrap();
    default_logger.start().unwrap();
    assert_eq!(live_logger_count(), 3);

    // Set-once: only the first installation takes effect
    assert!(set_exception_logger(default_logger.clone()));
    assert!(!set_exception_logger(a.clone()));
    assert_eq!(exception_logger().map(AsyncLogger::id), Some("shutdown"));

    let guard = handle_exception(
        GuardOptions::new().level(Level::Warn).name("parse-input"),
        |_: ()| "x".parse::<i32>(),
    );
    assert_eq!(guard.call(()), Ok(None));

    for i in 0..100 {
        a.info([("n", i)]);
        b.info([("n", i)]);
    }

    // Unstarted loggers are not in the registry
    let idle = AsyncLogger::new(Collected::default());
    assert!(!idle.is_registered());

    assert_eq!(shutdown_all(), 3);
    assert_eq!(live_logger_count(), 0);
    assert!(!a.is_alive() && !b.is_alive() && !default_logger.is_alive());

    for sink in [&first, &second] {
        let tags = sink.tags();
        assert_eq!(tags.len(), 103);
        assert_eq!(tags.last().map(String::as_str), Some(STOPPED_TAG));
    }

    let tags = exceptions.tags();
    assert!(tags.contains(&"Origin".to_string()));
    assert!(exceptions
        .0
        .lock()
        .iter()
        .any(|r| r.level() == Level::Warn && r.payload().get("Origin") == Some("parse-input")));
}
