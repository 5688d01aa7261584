//! Console sink and the base logger configuration schema

use crate::binder::{Bindable, BoundObject, ParameterSpec, Result as BindResult, Schema, TypeTag, Value};
use crate::core::{LogRecord, LogSink, Result};
use std::sync::{Arc, OnceLock};

#[cfg(feature = "console")]
use colored::Colorize;

pub const DEFAULT_LOGGER_ID: &str = "sal-logger";

const TAG_WIDTH: usize = 20;
const ID_WIDTH: usize = 20;
const LEVEL_WIDTH: usize = 8;
const WRAP_WIDTH: usize = 100;
const MESSAGE_INDENT: &str = "\t\t";
const RULE_WIDTH: usize = 116;

/// Parameters shared by every sink: `logger_id`, `print_log`, `use_colors`
pub fn logger_schema() -> Arc<Schema> {
    static SCHEMA: OnceLock<Arc<Schema>> = OnceLock::new();
    SCHEMA
        .get_or_init(|| {
            Schema::new("Logger")
                .param(
                    ParameterSpec::new("logger_id")
                        .default(DEFAULT_LOGGER_ID)
                        .parser(|value| match value {
                            Value::Str(s) if s.trim().is_empty() => {
                                Err("logger_id must not be empty".to_string())
                            }
                            Value::Str(s) => Ok(Value::Str(s.trim().to_string())),
                            other => Ok(other),
                        })
                        .typed(TypeTag::Str),
                )
                .param(ParameterSpec::new("print_log").default(true).typed(TypeTag::Bool))
                .param(ParameterSpec::new("use_colors").default(false).typed(TypeTag::Bool))
                .shared()
        })
        .clone()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub logger_id: String,
    pub print_log: bool,
    pub use_colors: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            logger_id: DEFAULT_LOGGER_ID.to_string(),
            print_log: true,
            use_colors: false,
        }
    }
}

impl Bindable for ConsoleConfig {
    fn schema() -> Arc<Schema> {
        static SCHEMA: OnceLock<Arc<Schema>> = OnceLock::new();
        SCHEMA
            .get_or_init(|| Schema::new("ConsoleSink").extends(logger_schema()).shared())
            .clone()
    }

    fn from_bound(object: BoundObject) -> BindResult<Self> {
        Self::read(&object)
    }
}

impl ConsoleConfig {
    /// Read the base logger attributes from any object deriving the base schema
    pub(crate) fn read(object: &BoundObject) -> BindResult<Self> {
        Ok(Self {
            logger_id: object.str_attr("logger_id")?,
            print_log: object.bool_attr("print_log")?,
            use_colors: object.bool_attr("use_colors")?,
        })
    }
}

/// Renders records as bordered text blocks and optionally prints them
///
/// ```text
/// [2019-08-08T02:42:01.145719][sal-logger          ] [DEBUG   ]:
///     tagA                :
///         messageA
/// ====================================================================...
/// ```
pub struct ConsoleSink {
    config: ConsoleConfig,
}

impl ConsoleSink {
    pub fn new(config: ConsoleConfig) -> Self {
        Self { config }
    }

    /// A console sink that renders without printing
    pub fn quiet(logger_id: impl Into<String>) -> Self {
        Self::new(ConsoleConfig {
            logger_id: logger_id.into(),
            print_log: false,
            use_colors: false,
        })
    }

    pub fn from_args(args: crate::binder::Arguments) -> Result<Self> {
        Ok(Self::new(ConsoleConfig::bind(args)?))
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    /// Plain text block for a record
    pub fn render(&self, record: &LogRecord) -> String {
        self.render_with_level(record, &format!("{:<LEVEL_WIDTH$}", record.level().as_str()))
    }

    fn render_with_level(&self, record: &LogRecord, level: &str) -> String {
        let body: Vec<String> = record
            .payload()
            .iter()
            .map(|(tag, message)| format!("\t{:<TAG_WIDTH$}:\n{}", tag, wrap_message(message)))
            .collect();

        format!(
            "[{}][{:<ID_WIDTH$}] [{}]:\n{}\n{}",
            record.timestamp(),
            self.config.logger_id,
            level,
            body.join("\n"),
            "=".repeat(RULE_WIDTH)
        )
    }

    /// Render, print when enabled, and hand back the plain text
    pub(crate) fn emit(&self, record: &LogRecord) -> String {
        let text = self.render(record);
        if self.config.print_log {
            if self.config.use_colors {
                println!("{}", self.colored(record));
            } else {
                println!("{}", text);
            }
        }
        text
    }

    #[cfg(feature = "console")]
    fn colored(&self, record: &LogRecord) -> String {
        let level = format!("{:<LEVEL_WIDTH$}", record.level().as_str())
            .color(record.level().color_code())
            .to_string();
        self.render_with_level(record, &level)
    }

    #[cfg(not(feature = "console"))]
    fn colored(&self, record: &LogRecord) -> String {
        self.render(record)
    }
}

impl LogSink for ConsoleSink {
    fn persist(&mut self, record: &LogRecord) -> Result<Option<String>> {
        Ok(Some(self.emit(record)))
    }

    fn logger_id(&self) -> &str {
        &self.config.logger_id
    }

    fn name(&self) -> &str {
        "console"
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new(ConsoleConfig::default())
    }
}

/// Greedy word wrap at `WRAP_WIDTH` counting the indent; whitespace runs
/// collapse and overlong words are split
fn wrap_message(message: &str) -> String {
    let available = WRAP_WIDTH - MESSAGE_INDENT.len();
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in message.split_whitespace() {
        let mut word = word;
        loop {
            let current_len = current.chars().count();
            let word_len = word.chars().count();
            let needed = if current.is_empty() { word_len } else { current_len + 1 + word_len };

            if needed <= available {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(word);
                break;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                continue;
            }
            let split = word
                .char_indices()
                .nth(available)
                .map(|(i, _)| i)
                .unwrap_or(word.len());
            lines.push(word[..split].to_string());
            word = &word[split..];
            if word.is_empty() {
                break;
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines
        .iter()
        .map(|line| format!("{}{}", MESSAGE_INDENT, line))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::{Arguments, BindError};
    use crate::core::Level;

    fn record() -> LogRecord {
        LogRecord::at(
            Level::Debug,
            [("tagA", "messageA"), ("tagB", "messageB")],
            "2019-08-08T02:42:01.145719",
        )
    }

    #[test]
    fn test_render_layout() {
        let sink = ConsoleSink::quiet("sal-logger");
        let text = sink.render(&record());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "[2019-08-08T02:42:01.145719][sal-logger          ] [DEBUG   ]:");
        assert_eq!(lines[1], "\ttagA                :");
        assert_eq!(lines[2], "\t\tmessageA");
        assert_eq!(lines[3], "\ttagB                :");
        assert_eq!(lines[4], "\t\tmessageB");
        assert_eq!(lines[5], "=".repeat(116));
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn test_quiet_sink_still_returns_text() {
        let mut sink = ConsoleSink::quiet("q");
        let text = sink.persist(&record()).unwrap();
        assert!(text.unwrap().contains("messageB"));
    }

    #[test]
    fn test_wrap_long_messages() {
        let message = vec!["word"; 60].join(" ");
        let wrapped = wrap_message(&message);
        for line in wrapped.lines() {
            assert!(line.starts_with("\t\t"));
            assert!(line.chars().count() <= WRAP_WIDTH);
        }
        assert!(wrapped.lines().count() > 1);

        let long_word = "x".repeat(250);
        let wrapped = wrap_message(&long_word);
        assert_eq!(wrapped.lines().count(), 3);
        assert_eq!(wrapped.replace("\t\t", "").replace('\n', ""), long_word);
    }

    #[test]
    fn test_wrap_collapses_newlines() {
        assert_eq!(wrap_message("a\nb  c"), "\t\ta b c");
        assert_eq!(wrap_message(""), "");
    }

    #[test]
    fn test_config_binding() {
        let config = ConsoleConfig::bind(Arguments::new()).unwrap();
        assert_eq!(config, ConsoleConfig::default());

        let config = ConsoleConfig::bind(Arguments::positional(["svc", "no"])).unwrap();
        assert_eq!(config.logger_id, "svc");
        assert!(!config.print_log);

        let err = ConsoleConfig::bind(Arguments::new().kwarg("logger_id", "  ")).unwrap_err();
        assert!(matches!(err, BindError::Parse { .. }));

        let err = ConsoleConfig::bind(Arguments::new().kwarg("logger_id", 5)).unwrap_err();
        assert!(matches!(err, BindError::TypeMismatch { .. }));
    }
}
