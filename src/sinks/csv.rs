//! CSV sink: one row per payload tag, `timestamp,logger_id,LEVEL,tag,message`

use super::console::ConsoleSink;
use super::file::{FileConfig, FileLayout};
use crate::binder::{Arguments, Bindable};
use crate::core::{Level, LogRecord, LogSink, Result};
use std::path::{Path, PathBuf};

/// Prints like [`ConsoleSink`] and appends CSV rows to the file layout of
/// [`FileSink`](super::FileSink)
pub struct CsvSink {
    console: ConsoleSink,
    layout: FileLayout,
}

impl CsvSink {
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

    pub fn path_for(&self, level: Level) -> PathBuf {
        self.layout.path_for(level)
    }

    fn rows(&self, record: &LogRecord) -> String {
        let mut out = String::new();
        for (tag, message) in record.payload().iter() {
            let fields = [
                record.timestamp(),
                self.console.logger_id(),
                record.level().as_str(),
                tag,
                message,
            ];
            let row: Vec<String> = fields.iter().map(|field| quote(field)).collect();
            out.push_str(&row.join(","));
            out.push('\n');
        }
        out
    }
}

impl LogSink for CsvSink {
    fn persist(&mut self, record: &LogRecord) -> Result<Option<String>> {
        self.console.emit(record);
        let rows = self.rows(record);
        self.layout.append(record.level(), &rows)?;
        Ok(Some(rows))
    }

    fn logger_id(&self) -> &str {
        self.console.logger_id()
    }

    fn name(&self) -> &str {
        "csv"
    }
}

/// Minimal quoting: only fields holding a comma, quote or line break are
/// wrapped, with inner quotes doubled
fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_quote() {
        assert_eq!(quote("plain"), "plain");
        assert_eq!(quote("a,b"), "\"a,b\"");
        assert_eq!(quote("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(quote("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_one_row_per_tag() -> Result<()> {
        let dir = tempdir()?;
        let config = FileConfig::new("rows", dir.path()).with_print_log(false);
        let mut sink = CsvSink::new(config)?;

        let record = LogRecord::at(
            Level::Warn,
            [("disk", "90% used"), ("path", "/var, /tmp")],
            "2019-08-08T02:42:01.145719",
        );
        let rows = sink.persist(&record)?.unwrap_or_default();

        let content = fs::read_to_string(sink.path_for(Level::Warn))?;
        assert_eq!(content, rows);
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines,
            [
                "2019-08-08T02:42:01.145719,rows,WARN,disk,90% used",
                "2019-08-08T02:42:01.145719,rows,WARN,path,\"/var, /tmp\"",
            ]
        );
        Ok(())
    }

    #[test]
    fn test_split_layout() -> Result<()> {
        let dir = tempdir()?;
        let sink = CsvSink::from_args(
            Arguments::new()
                .kwarg("logger_id", "split")
                .kwarg("combine", false)
                .kwarg("root", dir.path().to_string_lossy().to_string()),
        )?;
        assert_eq!(sink.path_for(Level::Info), dir.path().join("split").join("INFO.log"));
        assert_eq!(sink.log_dir(), dir.path().join("split"));
        Ok(())
    }
}
