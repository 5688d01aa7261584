//! Exception guard: logged, retried and escalated operation calls
//!
//! A [`Guard`] runs an operation, turns each failure into a structured
//! record on its logger (or the process-wide exception logger) and either
//! retries, falls back, or escalates with a [`CriticalFailure`] whose id
//! appears in the logged record.

mod context;
mod guarded;
mod options;
mod params;

pub use context::{correlation_id, Cause, CriticalFailure, ExceptionContext};
pub use guarded::Guard;
pub use options::{GuardOptions, Hook, ParamPolicy};
pub use params::Parameters;

use crate::core::AsyncLogger;
use std::sync::OnceLock;

static EXCEPTION_LOGGER: OnceLock<AsyncLogger> = OnceLock::new();

/// Install the process-wide exception logger
///
/// Only the first call takes effect; returns whether this call installed it.
pub fn set_exception_logger(logger: AsyncLogger) -> bool {
    EXCEPTION_LOGGER.set(logger).is_ok()
}

/// Logger used by guards configured without one
pub fn exception_logger() -> Option<&'static AsyncLogger> {
    EXCEPTION_LOGGER.get()
}

/// Guard `op` with `options`
#[track_caller]
pub fn handle_exception<F, T>(options: GuardOptions<T>, op: F) -> Guard<F, T> {
    Guard::new(op, options)
}
