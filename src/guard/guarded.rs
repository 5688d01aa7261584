//! The retrying, logging wrapper around an operation

use super::context::{Cause, CriticalFailure, ExceptionContext};
use super::options::{GuardOptions, Hook};
use super::params::Parameters;
use crate::core::{Level, Payload};
use std::error::Error;
use std::panic::{self, AssertUnwindSafe, Location};

/// Wraps an operation `Fn(A) -> Result<T, E>` with failure logging, retries
/// and escalation
///
/// Each call runs `before` once, then up to `attempts` attempts. A failed
/// attempt (an `Err` or a panic) is logged at the configured level and runs
/// `on_failure`; at CRITICAL the guard returns a [`CriticalFailure`] at once,
/// otherwise it moves on to the next attempt. `after` runs at the end of
/// every attempt. Exhausting the attempts yields the fallback.
///
/// # Example
///
/// ```
/// use saltlog::{handle_exception, GuardOptions, Level};
///
/// let parse = handle_exception(
///     GuardOptions::new().level(Level::Warn).fallback(-1),
///     |text: &str| text.parse::<i32>(),
/// );
///
/// assert_eq!(parse.call("42"), Ok(Some(42)));
/// assert_eq!(parse.call("forty-two"), Ok(Some(-1)));
/// ```
pub struct Guard<F, T> {
    op: F,
    options: GuardOptions<T>,
    origin: String,
    location: &'static Location<'static>,
}

impl<F, T> Guard<F, T> {
    /// Records report the caller's location as `File` and `Line`
    #[track_caller]
    pub fn new(op: F, options: GuardOptions<T>) -> Self {
        let origin = options
            .name
            .clone()
            .unwrap_or_else(|| std::any::type_name::<F>().to_string());
        Self {
            op,
            options,
            origin,
            location: Location::caller(),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn options(&self) -> &GuardOptions<T> {
        &self.options
    }

    /// Run the operation under the guard
    ///
    /// `Ok(Some(value))` on success, `Ok(fallback)` once non-critical
    /// attempts are exhausted, `Err` on a critical failure.
    pub fn call<A, E>(&self, args: A) -> Result<Option<T>, CriticalFailure>
    where
        F: Fn(A) -> Result<T, E>,
        A: Clone + Parameters,
        E: Into<Box<dyn Error + Send + Sync>>,
        T: Clone,
    {
        run_hook(&self.options.before);

        let mut attempt: u64 = 0;
        while self.options.attempts == 0 || attempt < u64::from(self.options.attempts) {
            attempt += 1;
            if self.options.log_start {
                self.emit(
                    Level::Info,
                    Payload::new().with(format!("Started {}", attempt), &self.origin),
                );
            }

            let outcome = panic::catch_unwind(AssertUnwindSafe(|| (self.op)(args.clone())));
            let cause = match outcome {
                Ok(Ok(value)) => {
                    if self.options.log_end {
                        self.emit(Level::Info, Payload::new().with("Finished", &self.origin));
                    }
                    run_hook(&self.options.on_success);
                    run_hook(&self.options.after);
                    return Ok(Some(value));
                }
                Ok(Err(error)) => Cause::from_error(error),
                Err(payload) => Cause::from_panic(payload),
            };

            let context = self.context(cause, attempt - 1, &args);
            self.emit(self.options.level, context.to_payload());
            run_hook(&self.options.on_failure);
            run_hook(&self.options.after);

            if self.options.level == Level::Critical {
                return Err(context.escalate());
            }
        }

        Ok(self.options.fallback.clone())
    }

    fn context<A: Parameters>(&self, cause: Cause, attempt: u64, args: &A) -> ExceptionContext {
        let parameters = if self.options.log_params.is_none() {
            Vec::new()
        } else {
            let captured = args.captured(self.options.signature.as_deref());
            self.options.log_params.select(captured)
        };
        ExceptionContext::new(&self.origin, cause, self.location, attempt, parameters)
    }

    fn emit(&self, level: Level, payload: Payload) {
        if !self.options.log {
            return;
        }
        if let Some(logger) = self.options.logger.as_ref().or_else(|| super::exception_logger()) {
            logger.log(level, payload);
        }
    }
}

impl<F, T> std::fmt::Debug for Guard<F, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Guard")
            .field("origin", &self.origin)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

fn run_hook(hook: &Option<Hook>) {
    if let Some(hook) = hook {
        hook();
    }
}
