//! Guard configuration

use crate::binder::Schema;
use crate::core::{AsyncLogger, Level};
use std::fmt;
use std::sync::Arc;

/// Callback run around guarded calls
pub type Hook = Arc<dyn Fn() + Send + Sync>;

/// Which captured parameters a failure record carries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ParamPolicy {
    #[default]
    None,
    All,
    /// Only these names, in this order; names not captured are skipped
    Named(Vec<String>),
}

impl ParamPolicy {
    pub fn named<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ParamPolicy::Named(names.into_iter().map(Into::into).collect())
    }

    pub fn is_none(&self) -> bool {
        matches!(self, ParamPolicy::None)
    }

    pub(crate) fn select(&self, captured: Vec<(String, String)>) -> Vec<(String, String)> {
        match self {
            ParamPolicy::None => Vec::new(),
            ParamPolicy::All => captured,
            ParamPolicy::Named(names) => names
                .iter()
                .filter_map(|name| captured.iter().find(|(captured, _)| captured == name).cloned())
                .collect(),
        }
    }
}

/// Options for [`Guard`](super::Guard)
///
/// Defaults: level CRITICAL, logging on, one attempt, no fallback, no
/// parameters logged.
///
/// # Example
///
/// ```
/// use saltlog::{GuardOptions, Level, ParamPolicy};
///
/// let options: GuardOptions<u32> = GuardOptions::new()
///     .level(Level::Warn)
///     .attempts(3)
///     .fallback(0)
///     .log_params(ParamPolicy::All);
/// assert_eq!(options.attempt_limit(), Some(3));
/// ```
pub struct GuardOptions<T> {
    pub(crate) level: Level,
    pub(crate) log: bool,
    pub(crate) logger: Option<AsyncLogger>,
    pub(crate) fallback: Option<T>,
    pub(crate) before: Option<Hook>,
    pub(crate) after: Option<Hook>,
    pub(crate) on_success: Option<Hook>,
    pub(crate) on_failure: Option<Hook>,
    pub(crate) log_params: ParamPolicy,
    pub(crate) log_start: bool,
    pub(crate) log_end: bool,
    pub(crate) attempts: u32,
    pub(crate) signature: Option<Arc<Schema>>,
    pub(crate) name: Option<String>,
}

impl<T> Default for GuardOptions<T> {
    fn default() -> Self {
        Self {
            level: Level::Critical,
            log: true,
            logger: None,
            fallback: None,
            before: None,
            after: None,
            on_success: None,
            on_failure: None,
            log_params: ParamPolicy::None,
            log_start: false,
            log_end: false,
            attempts: 1,
            signature: None,
            name: None,
        }
    }
}

impl<T> GuardOptions<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Level of failure records; CRITICAL re-raises after logging
    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn log(mut self, log: bool) -> Self {
        self.log = log;
        self
    }

    /// Target logger; without one the process-wide exception logger is used
    #[must_use = "builder methods return a new value"]
    pub fn logger(mut self, logger: AsyncLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn fallback(mut self, value: T) -> Self {
        self.fallback = Some(value);
        self
    }

    /// Runs once per call, before the first attempt
    #[must_use = "builder methods return a new value"]
    pub fn before(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.before = Some(Arc::new(hook));
        self
    }

    /// Runs after every attempt, including one that escalates
    #[must_use = "builder methods return a new value"]
    pub fn after(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.after = Some(Arc::new(hook));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn on_success(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_success = Some(Arc::new(hook));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn on_failure(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_failure = Some(Arc::new(hook));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn log_params(mut self, policy: ParamPolicy) -> Self {
        self.log_params = policy;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn log_start(mut self, enabled: bool) -> Self {
        self.log_start = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn log_end(mut self, enabled: bool) -> Self {
        self.log_end = enabled;
        self
    }

    /// Attempts per call; 0 retries until success or escalation
    #[must_use = "builder methods return a new value"]
    pub fn attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    /// Names and defaults used to label captured parameters
    #[must_use = "builder methods return a new value"]
    pub fn signature(mut self, schema: Arc<Schema>) -> Self {
        self.signature = Some(schema);
        self
    }

    /// Origin reported in records; defaults to the operation's type name
    #[must_use = "builder methods return a new value"]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn failure_level(&self) -> Level {
        self.level
    }

    /// `None` when retrying without limit
    pub fn attempt_limit(&self) -> Option<u32> {
        (self.attempts > 0).then_some(self.attempts)
    }
}

impl<T: fmt::Debug> fmt::Debug for GuardOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardOptions")
            .field("level", &self.level)
            .field("log", &self.log)
            .field("logger", &self.logger.as_ref().map(AsyncLogger::id))
            .field("fallback", &self.fallback)
            .field("log_params", &self.log_params)
            .field("log_start", &self.log_start)
            .field("log_end", &self.log_end)
            .field("attempts", &self.attempts)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
