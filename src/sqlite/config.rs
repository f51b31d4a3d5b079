use std::path::PathBuf;
use std::time::Duration;

use crate::connectivity::ConnectionProvider;
use crate::error::PortableSqlError;
use crate::script::ConnectionSettings;

use super::connection::SqliteConnection;

/// Options for opening `SQLite` connections.
#[derive(Debug, Clone)]
pub struct SqliteOptions {
    pub db_path: PathBuf,
    pub busy_timeout: Duration,
    pub foreign_keys: bool,
}

impl SqliteOptions {
    #[must_use]
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            busy_timeout: Duration::from_secs(5),
            foreign_keys: true,
        }
    }

    /// Options from generic connection settings. `sqlite:` and `file:`
    /// prefixes are stripped from the URL; user and password are ignored.
    #[must_use]
    pub fn from_settings(settings: &ConnectionSettings) -> Self {
        let url = settings.url.trim();
        let url = url.strip_prefix("jdbc:").unwrap_or(url);
        let url = url.strip_prefix("sqlite:").unwrap_or(url);
        Self::new(url.strip_prefix("//").unwrap_or(url))
    }
}

/// Fluent builder for `SQLite` options.
#[derive(Debug, Clone)]
pub struct SqliteOptionsBuilder {
    opts: SqliteOptions,
}

impl SqliteOptionsBuilder {
    #[must_use]
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            opts: SqliteOptions::new(db_path),
        }
    }

    #[must_use]
    pub fn busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.opts.busy_timeout = busy_timeout;
        self
    }

    #[must_use]
    pub fn foreign_keys(mut self, foreign_keys: bool) -> Self {
        self.opts.foreign_keys = foreign_keys;
        self
    }

    #[must_use]
    pub fn finish(self) -> SqliteOptions {
        self.opts
    }

    #[must_use]
    pub fn build(self) -> SqliteConnectionProvider {
        SqliteConnectionProvider::new(self.finish())
    }
}

/// Opens a fresh connection to the configured database file per `acquire`.
#[derive(Debug, Clone)]
pub struct SqliteConnectionProvider {
    options: SqliteOptions,
}

impl SqliteConnectionProvider {
    #[must_use]
    pub fn new(options: SqliteOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub fn builder(db_path: impl Into<PathBuf>) -> SqliteOptionsBuilder {
        SqliteOptionsBuilder::new(db_path)
    }

    #[must_use]
    pub fn options(&self) -> &SqliteOptions {
        &self.options
    }
}

impl ConnectionProvider for SqliteConnectionProvider {
    type Connection = SqliteConnection;

    fn acquire(&self) -> Result<SqliteConnection, PortableSqlError> {
        let conn = rusqlite::Connection::open(&self.options.db_path).map_err(|e| {
            PortableSqlError::ConnectionError(format!(
                "Failed to open SQLite database {}: {e}",
                self.options.db_path.display()
            ))
        })?;
        conn.busy_timeout(self.options.busy_timeout)?;
        if self.options.foreign_keys {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        }
        Ok(SqliteConnection::new(conn))
    }
}
