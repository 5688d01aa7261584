//! Logging macros for payloads of `tag => message` pairs.
//!
//! Messages are anything implementing `ToString`; pairs keep their order.
//!
//! # Examples
//!
//! ```
//! use saltlog::{info, AsyncLogger, ConsoleSink};
//!
//! let logger = AsyncLogger::new(ConsoleSink::quiet("macros"));
//! logger.start().unwrap();
//!
//! info!(logger, "Server" => "started");
//!
//! let port = 8080;
//! info!(logger, "Server" => "listening", "port" => port);
//! logger.stop();
//! ```

/// Log a payload at an explicit level.
///
/// # Examples
///
/// ```
/// # use saltlog::{AsyncLogger, ConsoleSink};
/// # let logger = AsyncLogger::new(ConsoleSink::quiet("doc"));
/// use saltlog::{log, Level};
/// log!(logger, Level::Info, "Simple" => "message");
/// log!(logger, Level::Error, "code" => 500, "reason" => "internal");
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($tag:expr => $message:expr),+ $(,)?) => {
        $logger.log($level, $crate::Payload::new()$(.with($tag, $message))+)
    };
}

/// Log a debug-level payload.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($pairs:tt)+) => {
        $crate::log!($logger, $crate::Level::Debug, $($pairs)+)
    };
}

/// Log an info-level payload.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($pairs:tt)+) => {
        $crate::log!($logger, $crate::Level::Info, $($pairs)+)
    };
}

/// Log a warning-level payload.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($pairs:tt)+) => {
        $crate::log!($logger, $crate::Level::Warn, $($pairs)+)
    };
}

/// Log an error-level payload.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($pairs:tt)+) => {
        $crate::log!($logger, $crate::Level::Error, $($pairs)+)
    };
}

/// Log a critical-level payload.
///
/// # Examples
///
/// ```
/// # use saltlog::{AsyncLogger, ConsoleSink};
/// # let logger = AsyncLogger::new(ConsoleSink::quiet("doc"));
/// use saltlog::critical;
/// critical!(logger, "Failure" => "disk full", "free" => 0);
/// ```
#[macro_export]
macro_rules! critical {
    ($logger:expr, $($pairs:tt)+) => {
        $crate::log!($logger, $crate::Level::Critical, $($pairs)+)
    };
}

/// Build binder [`Arguments`](crate::Arguments): positional values, then
/// after a `;` the keyword pairs.
///
/// ```
/// use saltlog::{args, Arguments};
///
/// let args = args!["svc", true; "combine" => false];
/// assert_eq!(args, Arguments::positional(["svc"]).arg(true).kwarg("combine", false));
/// assert!(args![].is_empty());
/// ```
#[macro_export]
macro_rules! args {
    () => {
        $crate::Arguments::new()
    };
    ($($value:expr),* $(,)? $(; $($name:expr => $kwvalue:expr),* $(,)?)?) => {
        $crate::Arguments::new()
            $(.arg($value))*
            $($(.kwarg($name, $kwvalue))*)?
    };
}

#[cfg(test)]
mod tests {
    use crate::binder::{Arguments, Value};
    use crate::core::{AsyncLogger, Level, LogRecord, LogSink, Result};
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Collected(Arc<Mutex<Vec<LogRecord>>>);

    impl LogSink for Collected {
        fn persist(&mut self, record: &LogRecord) -> Result<Option<String>> {
            self.0.lock().push(record.clone());
            Ok(None)
        }

        fn logger_id(&self) -> &str {
            "macros"
        }

        fn name(&self) -> &str {
            "memory"
        }
    }

    #[test]
    fn test_level_macros() {
        let sink = Collected::default();
        let logger = AsyncLogger::new(sink.clone());

        debug!(logger, "a" => 1);
        info!(logger, "b" => "two");
        warn!(logger, "c" => 3.5, "d" => true);
        error!(logger, "e" => "x",);
        critical!(logger, "f" => String::from("y"));
        log!(logger, Level::Info, "g" => 'z');
        logger.start().unwrap();
        logger.stop();

        let records = sink.0.lock();
        let levels: Vec<Level> = records.iter().map(LogRecord::level).collect();
        assert_eq!(
            &levels[..6],
            [Level::Debug, Level::Info, Level::Warn, Level::Error, Level::Critical, Level::Info]
        );
        let tags: Vec<&str> = records[2].payload().tags().collect();
        assert_eq!(tags, ["c", "d"]);
        assert_eq!(records[2].payload().get("c"), Some("3.5"));
    }

    #[test]
    fn test_args_macro() {
        let args = args![1, "two"];
        assert_eq!(args.positional_values(), [Value::Int(1), Value::Str("two".into())]);

        let args = args![; "name" => "svc", "print_log" => false];
        assert!(args.positional_values().is_empty());
        assert_eq!(args.get("name"), Some(&Value::Str("svc".into())));

        assert_eq!(args![], Arguments::new());
    }
}
