//! Process-wide registry of running loggers
//!
//! Empty at startup. `start` registers a logger and `stop` removes it; the
//! registry keeps weak handles only, so it never extends a logger's life.
//! Call [`shutdown_all`] once at controlled program exit to drain every
//! logger still running.

use super::logger::LoggerInner;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};

static LIVE_LOGGERS: Mutex<Vec<(u64, Weak<LoggerInner>)>> = Mutex::new(Vec::new());

pub(crate) fn register(logger: &Arc<LoggerInner>) {
    let mut live = LIVE_LOGGERS.lock();
    if !live.iter().any(|(key, _)| *key == logger.key()) {
        live.push((logger.key(), Arc::downgrade(logger)));
    }
}

pub(crate) fn unregister(key: u64) {
    LIVE_LOGGERS.lock().retain(|(k, _)| *k != key);
}

/// Stop every registered logger, draining their queues
///
/// Returns the number of loggers stopped.
pub fn shutdown_all() -> usize {
    let live: Vec<Arc<LoggerInner>> = {
        let mut registry = LIVE_LOGGERS.lock();
        registry.retain(|(_, weak)| weak.strong_count() > 0);
        registry.iter().filter_map(|(_, weak)| weak.upgrade()).collect()
    };

    let count = live.len();
    for logger in live {
        logger.stop();
    }
    count
}

/// Number of loggers currently registered as running
pub fn live_logger_count() -> usize {
    LIVE_LOGGERS
        .lock()
        .iter()
        .filter(|(_, weak)| weak.strong_count() > 0)
        .count()
}

/// Whether a logger with this key is registered
pub(crate) fn is_registered(key: u64) -> bool {
    LIVE_LOGGERS.lock().iter().any(|(k, _)| *k == key)
}
