//! Text file sink
//!
//! Logs live under `root/logger_id/`, either one `<LEVEL>.log` per level or a
//! single `combined.log`.

use super::console::{ConsoleConfig, ConsoleSink};
use crate::binder::{Arguments, Bindable, BoundObject, ParameterSpec, Result as BindResult, Schema, TypeTag};
use crate::core::{Level, LogRecord, LogSink, LoggerError, Result};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

pub const COMBINED_FILE_STEM: &str = "combined";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileConfig {
    pub console: ConsoleConfig,
    /// Truncate existing logs when the sink is created
    pub overwrite: bool,
    /// Write every level to `combined.log`
    pub combine: bool,
    pub root: PathBuf,
}

impl FileConfig {
    pub fn new(logger_id: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            console: ConsoleConfig {
                logger_id: logger_id.into(),
                ..ConsoleConfig::default()
            },
            overwrite: false,
            combine: true,
            root: root.into(),
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_combine(mut self, combine: bool) -> Self {
        self.combine = combine;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_print_log(mut self, print_log: bool) -> Self {
        self.console.print_log = print_log;
        self
    }

    pub(crate) fn read(object: &BoundObject) -> BindResult<Self> {
        Ok(Self {
            console: ConsoleConfig::read(object)?,
            overwrite: object.bool_attr("overwrite")?,
            combine: object.bool_attr("combine")?,
            root: PathBuf::from(object.str_attr("root")?),
        })
    }

    /// Directory holding this logger's files
    pub fn log_dir(&self) -> PathBuf {
        self.root.join(&self.console.logger_id)
    }
}

impl Bindable for FileConfig {
    fn schema() -> Arc<Schema> {
        static SCHEMA: OnceLock<Arc<Schema>> = OnceLock::new();
        SCHEMA
            .get_or_init(|| {
                Schema::new("FileSink")
                    .extends(ConsoleConfig::schema())
                    .param(ParameterSpec::new("overwrite").default(false).typed(TypeTag::Bool))
                    .param(ParameterSpec::new("combine").default(true).typed(TypeTag::Bool))
                    .param(ParameterSpec::new("root").default(".").typed(TypeTag::Str))
                    .shared()
            })
            .clone()
    }

    fn from_bound(object: BoundObject) -> BindResult<Self> {
        Self::read(&object)
    }
}

/// Per-logger directory and the files records are appended to
pub(crate) struct FileLayout {
    dir: PathBuf,
    combine: bool,
    files: HashMap<PathBuf, File>,
}

impl FileLayout {
    /// Create the directory and truncate the relevant files when overwriting
    pub(crate) fn open(config: &FileConfig) -> Result<Self> {
        let dir = config.log_dir();
        fs::create_dir_all(&dir).map_err(|e| {
            LoggerError::io_operation(
                "creating log directory",
                format!("cannot create '{}'", dir.display()),
                e,
            )
        })?;

        let layout = Self {
            dir,
            combine: config.combine,
            files: HashMap::new(),
        };

        if config.overwrite {
            let paths: Vec<PathBuf> = if layout.combine {
                vec![layout.path_for(Level::Info)]
            } else {
                Level::ALL.iter().map(|level| layout.path_for(*level)).collect()
            };
            for path in paths {
                File::create(&path).map_err(|e| {
                    LoggerError::io_operation(
                        "truncating log file",
                        format!("cannot truncate '{}'", path.display()),
                        e,
                    )
                })?;
            }
        }

        Ok(layout)
    }

    pub(crate) fn dir(&self) -> &Path {
        &self.dir
    }

    pub(crate) fn path_for(&self, level: Level) -> PathBuf {
        let stem = if self.combine {
            COMBINED_FILE_STEM
        } else {
            level.as_str()
        };
        self.dir.join(format!("{}.log", stem))
    }

    pub(crate) fn append(&mut self, level: Level, text: &str) -> Result<()> {
        let path = self.path_for(level);
        if !self.files.contains_key(&path) {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|e| {
                    LoggerError::io_operation(
                        "opening log file",
                        format!("cannot open '{}'", path.display()),
                        e,
                    )
                })?;
            self.files.insert(path.clone(), file);
        }

        let file = self
            .files
            .get_mut(&path)
            .ok_or_else(|| LoggerError::sink("file", "log file handle missing"))?;
        file.write_all(text.as_bytes()).map_err(|e| {
            LoggerError::io_operation(
                "writing log file",
                format!("cannot write to '{}'", path.display()),
                e,
            )
        })?;
        Ok(())
    }
}

/// Appends console-rendered blocks to text files
pub struct FileSink {
    console: ConsoleSink,
    layout: FileLayout,
}

impl FileSink {
    pub fn new(config: FileConfig) -> Result<Self> {
        let layout = FileLayout::open(&config)?;
        Ok(Self {
            console: ConsoleSink::new(config.console),
            layout,
        })
    }

    pub fn from_args(args: Arguments) -> Result<Self> {
        Self::new(FileConfig::bind(args)?)
    }

    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        Self::new(FileConfig::from_json(json)?)
    }

    pub fn log_dir(&self) -> &Path {
        self.layout.dir()
    }

    /// File a record of `level` goes to
    pub fn path_for(&self, level: Level) -> PathBuf {
        self.layout.path_for(level)
    }
}

impl LogSink for FileSink {
    fn persist(&mut self, record: &LogRecord) -> Result<Option<String>> {
        let text = self.console.emit(record);
        self.layout.append(record.level(), &format!("{}\n", text))?;
        Ok(Some(text))
    }

    fn logger_id(&self) -> &str {
        self.console.logger_id()
    }

    fn name(&self) -> &str {
        "file"
    }
}
