//! Relational sink backed by SQLite
//!
//! Tables are `<logger_id>_<LEVEL>` (one per level) or `<logger_id>_combined`,
//! created on construction. Each record is written in its own transaction,
//! one row per payload tag.

use super::console::{ConsoleConfig, ConsoleSink};
use crate::binder::{Arguments, Bindable, BoundObject, ParameterSpec, Result as BindResult, Schema, TypeTag};
use crate::core::{Level, LogRecord, LogSink, Result};
use rusqlite::{params, Connection};
use std::sync::{Arc, OnceLock};

pub const MEMORY_DATABASE: &str = ":memory:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteConfig {
    pub console: ConsoleConfig,
    /// Drop and recreate the tables on construction
    pub overwrite: bool,
    /// One `<id>_combined` table with a `level` column
    pub combine: bool,
    /// Database path or `:memory:`
    pub database: String,
}

impl SqliteConfig {
    pub fn new(logger_id: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            console: ConsoleConfig {
                logger_id: logger_id.into(),
                ..ConsoleConfig::default()
            },
            overwrite: false,
            combine: false,
            database: database.into(),
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
}

impl Bindable for SqliteConfig {
    fn schema() -> Arc<Schema> {
        static SCHEMA: OnceLock<Arc<Schema>> = OnceLock::new();
        SCHEMA
            .get_or_init(|| {
                Schema::new("SqliteSink")
                    .extends(ConsoleConfig::schema())
                    .param(ParameterSpec::new("overwrite").default(false).typed(TypeTag::Bool))
                    .param(ParameterSpec::new("combine").default(false).typed(TypeTag::Bool))
                    .param(ParameterSpec::new("database").typed(TypeTag::Str))
                    .shared()
            })
            .clone()
    }

    fn from_bound(object: BoundObject) -> BindResult<Self> {
        Ok(Self {
            console: ConsoleConfig::read(&object)?,
            overwrite: object.bool_attr("overwrite")?,
            combine: object.bool_attr("combine")?,
            database: object.str_attr("database")?,
        })
    }
}

pub struct SqliteSink {
    console: ConsoleSink,
    combine: bool,
    connection: Connection,
}

impl SqliteSink {
    pub fn new(config: SqliteConfig) -> Result<Self> {
        let connection = Connection::open(&config.database)?;
        Self::with_connection(config, connection)
    }

    /// Use an already opened connection; `config.database` is ignored
    pub fn with_connection(config: SqliteConfig, connection: Connection) -> Result<Self> {
        let sink = Self {
            console: ConsoleSink::new(config.console),
            combine: config.combine,
            connection,
        };

        for table in sink.tables() {
            if config.overwrite {
                sink.connection
                    .execute(&format!("DROP TABLE IF EXISTS {}", quote_ident(&table)), [])?;
            }
            sink.connection.execute(&sink.create_sql(&table), [])?;
        }
        Ok(sink)
    }

    pub fn from_args(args: Arguments) -> Result<Self> {
        Self::new(SqliteConfig::bind(args)?)
    }

    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        Self::new(SqliteConfig::from_json(json)?)
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Table a record of `level` is written to
    pub fn table_for(&self, level: Level) -> String {
        let suffix = if self.combine { "combined" } else { level.as_str() };
        format!("{}_{}", self.console.logger_id(), suffix)
    }

    fn tables(&self) -> Vec<String> {
        if self.combine {
            vec![self.table_for(Level::Info)]
        } else {
            Level::ALL.iter().map(|level| self.table_for(*level)).collect()
        }
    }

    fn create_sql(&self, table: &str) -> String {
        let level_column = if self.combine { "level TEXT, " } else { "" };
        format!(
            "CREATE TABLE IF NOT EXISTS {} (id INTEGER PRIMARY KEY AUTOINCREMENT, \
             log_datetime TEXT, {}title TEXT, message TEXT)",
            quote_ident(table),
            level_column
        )
    }
}

impl LogSink for SqliteSink {
    fn persist(&mut self, record: &LogRecord) -> Result<Option<String>> {
        let text = self.console.emit(record);
        let table = quote_ident(&self.table_for(record.level()));
        let combine = self.combine;

        let tx = self.connection.transaction()?;
        {
            let sql = if combine {
                format!(
                    "INSERT INTO {} (log_datetime, level, title, message) VALUES (?1, ?2, ?3, ?4)",
                    table
                )
            } else {
                format!(
                    "INSERT INTO {} (log_datetime, title, message) VALUES (?1, ?2, ?3)",
                    table
                )
            };
            let mut stmt = tx.prepare_cached(&sql)?;
            for (tag, message) in record.payload().iter() {
                if combine {
                    stmt.execute(params![record.timestamp(), record.level().as_str(), tag, message])?;
                } else {
                    stmt.execute(params![record.timestamp(), tag, message])?;
                }
            }
        }
        tx.commit()?;
        Ok(Some(text))
    }

    fn logger_id(&self) -> &str {
        self.console.logger_id()
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::BindError;
    use crate::core::LoggerError;

    fn record(level: Level) -> LogRecord {
        LogRecord::at(level, [("tagA", "a"), ("tagB", "b")], "2019-08-08T02:42:01.145719")
    }

    fn count(sink: &SqliteSink, table: &str) -> i64 {
        sink.connection()
            .query_row(&format!("SELECT COUNT(*) FROM {}", quote_ident(table)), [], |row| {
                row.get(0)
            })
            .unwrap()
    }

    #[test]
    fn test_tables_per_level() -> Result<()> {
        let config = SqliteConfig::new("db", MEMORY_DATABASE).with_print_log(false);
        let mut sink = SqliteSink::new(config)?;

        sink.persist(&record(Level::Error))?;

        assert_eq!(count(&sink, "db_ERROR"), 2);
        assert_eq!(count(&sink, "db_INFO"), 0);

        let (title, message): (String, String) = sink.connection().query_row(
            "SELECT title, message FROM \"db_ERROR\" ORDER BY id LIMIT 1",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        assert_eq!((title.as_str(), message.as_str()), ("tagA", "a"));
        Ok(())
    }

    #[test]
    fn test_combined_table_has_level() -> Result<()> {
        let config = SqliteConfig::new("db", MEMORY_DATABASE)
            .with_combine(true)
            .with_print_log(false);
        let mut sink = SqliteSink::new(config)?;

        sink.persist(&record(Level::Debug))?;
        sink.persist(&record(Level::Critical))?;

        assert_eq!(count(&sink, "db_combined"), 4);
        let levels: Vec<String> = sink
            .connection()
            .prepare("SELECT level FROM \"db_combined\" ORDER BY id")?
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<_>>()?;
        assert_eq!(levels, ["DEBUG", "DEBUG", "CRITICAL", "CRITICAL"]);
        Ok(())
    }

    #[test]
    fn test_overwrite_drops_rows() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("logs.db").to_string_lossy().to_string();

        {
            let mut sink = SqliteSink::new(SqliteConfig::new("db", &path).with_print_log(false))?;
            sink.persist(&record(Level::Info))?;
        }
        {
            let sink = SqliteSink::new(SqliteConfig::new("db", &path).with_print_log(false))?;
            assert_eq!(count(&sink, "db_INFO"), 2);
        }
        let config = SqliteConfig::new("db", &path)
            .with_overwrite(true)
            .with_print_log(false);
        let sink = SqliteSink::new(config)?;
        assert_eq!(count(&sink, "db_INFO"), 0);
        Ok(())
    }

    #[test]
    fn test_database_is_required() {
        let err = SqliteSink::from_args(Arguments::new().kwarg("logger_id", "db")).err();
        match err {
            Some(LoggerError::Binding(BindError::Missing { names, .. })) => {
                assert_eq!(names, ["database"]);
            }
            other => panic!("unexpected result: {:?}", other.map(|e| e.to_string())),
        }
    }

    #[test]
    fn test_schema_defaults() {
        let names: Vec<String> = SqliteConfig::schema()
            .flatten()
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        assert_eq!(
            names,
            ["logger_id", "print_log", "use_colors", "overwrite", "combine", "database"]
        );
    }
}
