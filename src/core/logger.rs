//! Asynchronous logger: one FIFO queue and one worker thread per instance

use super::{
    error::{LoggerError, Result},
    log_level::Level,
    log_record::{LogRecord, Payload},
    metrics::LoggerMetrics,
    registry,
    sink::LogSink,
};
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

pub const STARTED_TAG: &str = "Logger started";
pub const STOP_SIGNAL_TAG: &str = "Logger stop signal";
pub const STOPPED_TAG: &str = "Logger stopped";

static NEXT_LOGGER_KEY: AtomicU64 = AtomicU64::new(1);

enum Command {
    Record(LogRecord),
    Exit,
}

type SharedSink = Arc<Mutex<Box<dyn LogSink>>>;

pub(crate) struct LoggerInner {
    key: u64,
    id: String,
    sender: Sender<Command>,
    receiver: Receiver<Command>,
    sink: SharedSink,
    worker: Mutex<Option<thread::JoinHandle<()>>>,
    alive: AtomicBool,
    metrics: Arc<LoggerMetrics>,
}

impl LoggerInner {
    pub(crate) fn key(&self) -> u64 {
        self.key
    }

    fn enqueue(&self, record: LogRecord) {
        self.metrics.record_enqueued();
        // The queue owns a receiver for its whole lifetime, so this cannot disconnect
        let _ = self.sender.send(Command::Record(record));
    }

    fn start(self: &Arc<Self>) -> Result<()> {
        let mut worker = self.worker.lock();
        if worker.is_some() {
            return Ok(());
        }

        let receiver = self.receiver.clone();
        let sink = Arc::clone(&self.sink);
        let metrics = Arc::clone(&self.metrics);
        let handle = thread::Builder::new()
            .name(format!("saltlog-{}", self.id))
            .spawn(move || run_worker(receiver, sink, metrics))
            .map_err(|e| {
                LoggerError::io_operation("starting logger", "cannot spawn worker thread", e)
            })?;

        *worker = Some(handle);
        self.alive.store(true, Ordering::Release);
        self.enqueue(LogRecord::new(
            Level::Info,
            [(STARTED_TAG, "Logger started!")],
        ));
        registry::register(self);
        Ok(())
    }

    pub(crate) fn stop(&self) {
        let mut worker = self.worker.lock();
        let Some(handle) = worker.take() else {
            return;
        };

        self.enqueue(LogRecord::new(
            Level::Info,
            [(STOP_SIGNAL_TAG, "Logger stopping signal received!")],
        ));
        let _ = self.sender.send(Command::Exit);

        // Wait for the worker to drain everything queued before the sentinel
        if let Err(e) = handle.join() {
            eprintln!(
                "[LOGGER ERROR] Worker of logger '{}' panicked during shutdown: {:?}",
                self.id, e
            );
        }

        self.alive.store(false, Ordering::Release);
        registry::unregister(self.key);
    }
}

impl Drop for LoggerInner {
    fn drop(&mut self) {
        self.stop();

        let pending = self.metrics.pending();
        if pending > 0 {
            eprintln!(
                "[LOGGER WARNING] Logger '{}' dropped with {} records never persisted",
                self.id, pending
            );
        }
    }
}

fn run_worker(receiver: Receiver<Command>, sink: SharedSink, metrics: Arc<LoggerMetrics>) {
    loop {
        match receiver.recv() {
            Ok(Command::Record(record)) => persist(&sink, &record, &metrics),
            Ok(Command::Exit) | Err(_) => break,
        }
    }

    metrics.record_enqueued();
    persist(
        &sink,
        &LogRecord::new(Level::Info, [(STOPPED_TAG, "Logger stopped!")]),
        &metrics,
    );
}

/// Persist one record with panic isolation so a broken sink cannot kill the worker
fn persist(sink: &SharedSink, record: &LogRecord, metrics: &LoggerMetrics) {
    let mut sink = sink.lock();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| sink.persist(record)));

    match result {
        Ok(Ok(_)) => {
            metrics.record_persisted();
        }
        Ok(Err(e)) => {
            eprintln!("[LOGGER ERROR] Sink '{}' failed: {}", sink.name(), e);
            metrics.record_failed();
        }
        Err(panic_info) => {
            let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_info.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };
            eprintln!(
                "[LOGGER CRITICAL] Sink '{}' panicked: {}. Logger continues.",
                sink.name(),
                panic_msg
            );
            metrics.record_failed();
        }
    }
}

/// Handle to an asynchronous logger
///
/// `log` only enqueues; the worker started by `start` persists records in
/// enqueue order through the sink. Clones share the same queue and worker.
/// Dropping the last handle stops a running logger.
///
/// # Example
///
/// ```
/// use saltlog::{AsyncLogger, ConsoleSink, Level};
///
/// let logger = AsyncLogger::new(ConsoleSink::quiet("demo"));
/// logger.start().unwrap();
/// logger.log(Level::Debug, [("tagA", "messageA"), ("tagB", "messageB")]);
/// logger.info([("tag", "Nothing to see here!")]);
/// logger.stop();
/// assert_eq!(logger.metrics().persisted_count(), 5);
/// ```
#[derive(Clone)]
pub struct AsyncLogger {
    inner: Arc<LoggerInner>,
}

impl AsyncLogger {
    pub fn new<S: LogSink + 'static>(sink: S) -> Self {
        let (sender, receiver) = unbounded();
        let id = sink.logger_id().to_string();
        Self {
            inner: Arc::new(LoggerInner {
                key: NEXT_LOGGER_KEY.fetch_add(1, Ordering::Relaxed),
                id,
                sender,
                receiver,
                sink: Arc::new(Mutex::new(Box::new(sink))),
                worker: Mutex::new(None),
                alive: AtomicBool::new(false),
                metrics: Arc::new(LoggerMetrics::new()),
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn is_alive(&self) -> bool {
        self.inner.alive.load(Ordering::Acquire)
    }

    /// Spawn the worker and register the logger; no-op when already running
    pub fn start(&self) -> Result<()> {
        self.inner.start()
    }

    /// Drain the queue, join the worker and deregister; no-op when not running
    pub fn stop(&self) {
        self.inner.stop();
    }

    /// Enqueue a record stamped with the current time; never blocks
    pub fn log(&self, level: Level, payload: impl Into<Payload>) {
        self.inner.enqueue(LogRecord::new(level, payload));
    }

    #[inline]
    pub fn debug(&self, payload: impl Into<Payload>) {
        self.log(Level::Debug, payload);
    }

    #[inline]
    pub fn info(&self, payload: impl Into<Payload>) {
        self.log(Level::Info, payload);
    }

    #[inline]
    pub fn warn(&self, payload: impl Into<Payload>) {
        self.log(Level::Warn, payload);
    }

    #[inline]
    pub fn error(&self, payload: impl Into<Payload>) {
        self.log(Level::Error, payload);
    }

    #[inline]
    pub fn critical(&self, payload: impl Into<Payload>) {
        self.log(Level::Critical, payload);
    }

    /// Whether the process-wide registry currently tracks this logger
    pub fn is_registered(&self) -> bool {
        registry::is_registered(self.inner.key)
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.inner.metrics
    }

    /// Start the logger for the lifetime of the returned guard
    pub fn scope(&self) -> Result<LoggerScope<'_>> {
        self.start()?;
        Ok(LoggerScope { logger: self })
    }

    /// Run `f` with the logger started, stopping it afterwards even on panic
    pub fn run_scoped<R>(&self, f: impl FnOnce(&AsyncLogger) -> R) -> Result<R> {
        let scope = self.scope()?;
        Ok(f(&scope))
    }
}

impl std::fmt::Debug for AsyncLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncLogger")
            .field("id", &self.inner.id)
            .field("alive", &self.is_alive())
            .finish()
    }
}

/// RAII guard from [`AsyncLogger::scope`]
pub struct LoggerScope<'a> {
    logger: &'a AsyncLogger,
}

impl Deref for LoggerScope<'_> {
    type Target = AsyncLogger;

    fn deref(&self) -> &AsyncLogger {
        self.logger
    }
}

impl Drop for LoggerScope<'_> {
    fn drop(&mut self) {
        self.logger.stop();
    }
}
