use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dialect::DatabaseType;
use crate::error::PortableSqlError;

use super::encoding::ScriptEncoding;

/// Where a script runner connects.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    pub url: String,
    pub user: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
}

impl ConnectionSettings {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            user: None,
            password: None,
        }
    }
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Options for [`ScriptRunner`](super::ScriptRunner).
///
/// Keys may be given in `snake_case` or `camelCase`:
///
/// ```rust
/// use portable_sql::prelude::*;
///
/// let options = ScriptRunnerOptions::from_json(
///     r#"{"connection": {"url": "sqlite:app.db"}, "errorContinue": true, "delimiter": "/"}"#,
/// )
/// .unwrap();
/// assert!(options.error_continue);
/// assert_eq!(options.delimiter, "/");
/// assert_eq!(options.effective_database_type(), DatabaseType::Sqlite);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptRunnerOptions {
    pub connection: ConnectionSettings,
    pub delimiter: String,
    #[serde(alias = "errorContinue")]
    pub error_continue: bool,
    #[serde(alias = "autoCommit")]
    pub auto_commit: bool,
    #[serde(alias = "rollbackOnly")]
    pub rollback_only: bool,
    pub encoding: ScriptEncoding,
    /// Detected from the connection URL when unset.
    #[serde(alias = "databaseType")]
    pub database_type: Option<DatabaseType>,
}

impl Default for ScriptRunnerOptions {
    fn default() -> Self {
        Self {
            connection: ConnectionSettings::default(),
            delimiter: ";".to_string(),
            error_continue: false,
            auto_commit: false,
            rollback_only: false,
            encoding: ScriptEncoding::default(),
            database_type: None,
        }
    }
}

impl ScriptRunnerOptions {
    #[must_use]
    pub fn new(connection: ConnectionSettings) -> Self {
        Self {
            connection,
            ..Self::default()
        }
    }

    /// # Errors
    /// Returns `PortableSqlError::ConfigError` if the JSON does not describe valid options.
    pub fn from_json(json: &str) -> Result<Self, PortableSqlError> {
        let options: Self = serde_json::from_str(json)
            .map_err(|e| PortableSqlError::ConfigError(format!("script runner options: {e}")))?;
        options.validate()?;
        Ok(options)
    }

    /// # Errors
    /// Returns `PortableSqlError::ConfigError` for an empty delimiter or for
    /// `auto_commit` combined with `rollback_only`.
    pub fn validate(&self) -> Result<(), PortableSqlError> {
        if self.delimiter.is_empty() {
            return Err(PortableSqlError::ConfigError(
                "script delimiter must not be empty".into(),
            ));
        }
        if self.auto_commit && self.rollback_only {
            return Err(PortableSqlError::ConfigError(
                "rollback_only cannot be combined with auto_commit".into(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn effective_database_type(&self) -> DatabaseType {
        self.database_type
            .unwrap_or_else(|| DatabaseType::from_url(&self.connection.url))
    }
}

/// Fluent builder for [`ScriptRunnerOptions`].
#[derive(Debug, Clone)]
pub struct ScriptRunnerOptionsBuilder {
    opts: ScriptRunnerOptions,
}

impl ScriptRunnerOptionsBuilder {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            opts: ScriptRunnerOptions::new(ConnectionSettings::new(url)),
        }
    }

    #[must_use]
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.opts.connection.user = Some(user.into());
        self
    }

    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.opts.connection.password = Some(password.into());
        self
    }

    #[must_use]
    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.opts.delimiter = delimiter.into();
        self
    }

    #[must_use]
    pub fn error_continue(mut self, error_continue: bool) -> Self {
        self.opts.error_continue = error_continue;
        self
    }

    #[must_use]
    pub fn auto_commit(mut self, auto_commit: bool) -> Self {
        self.opts.auto_commit = auto_commit;
        self
    }

    #[must_use]
    pub fn rollback_only(mut self, rollback_only: bool) -> Self {
        self.opts.rollback_only = rollback_only;
        self
    }

    #[must_use]
    pub fn encoding(mut self, encoding: ScriptEncoding) -> Self {
        self.opts.encoding = encoding;
        self
    }

    #[must_use]
    pub fn database_type(mut self, database_type: DatabaseType) -> Self {
        self.opts.database_type = Some(database_type);
        self
    }

    #[must_use]
    pub fn finish(self) -> ScriptRunnerOptions {
        self.opts
    }
}
