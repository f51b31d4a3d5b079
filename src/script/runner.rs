use std::path::Path;

use tracing::{debug, info, warn};

use crate::command::classify;
use crate::connectivity::{ConnectionProvider, DbConnection};
use crate::error::PortableSqlError;

use super::options::ScriptRunnerOptions;
use super::splitter::split_statements;

/// Lifecycle of a [`ScriptRunner`]. A runner can be reused; every run starts
/// again from `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunnerState {
    #[default]
    Idle,
    Running,
    Completed,
    Aborted,
}

/// A statement that failed while the runner continued past errors.
#[derive(Debug)]
pub struct ScriptFailure {
    /// 1-based position of the statement in the script.
    pub index: usize,
    pub sql: String,
    pub error: PortableSqlError,
}

/// Outcome of one script run. Produced even when statements failed.
#[derive(Debug, Default)]
pub struct ScriptRunResult {
    pub source_name: String,
    pub total_sql_count: usize,
    pub good_sql_count: usize,
    pub failures: Vec<ScriptFailure>,
}

impl ScriptRunResult {
    #[must_use]
    pub fn new(source_name: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failed_sql_count(&self) -> usize {
        self.failures.len()
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Executes delimiter-separated SQL scripts over one connection per run.
#[derive(Debug)]
pub struct ScriptRunner<C> {
    provider: C,
    options: ScriptRunnerOptions,
    state: RunnerState,
}

impl<C: ConnectionProvider> ScriptRunner<C> {
    /// # Errors
    /// Returns `PortableSqlError::ConfigError` if the options are inconsistent.
    pub fn new(provider: C, options: ScriptRunnerOptions) -> Result<Self, PortableSqlError> {
        options.validate()?;
        Ok(Self {
            provider,
            options,
            state: RunnerState::Idle,
        })
    }

    #[must_use]
    pub fn state(&self) -> RunnerState {
        self.state
    }

    #[must_use]
    pub fn options(&self) -> &ScriptRunnerOptions {
        &self.options
    }

    /// Read, decode and run a script file.
    ///
    /// # Errors
    /// Returns `PortableSqlError::ScriptSource` if the file cannot be read or
    /// decoded, otherwise the errors of [`run_text`](Self::run_text).
    pub fn run_file(
        &mut self,
        path: impl AsRef<Path>,
    ) -> Result<ScriptRunResult, PortableSqlError> {
        let path = path.as_ref();
        let source_name = path.display().to_string();
        let bytes = std::fs::read(path).map_err(|e| PortableSqlError::ScriptSource {
            source_name: source_name.clone(),
            message: e.to_string(),
        })?;
        let text = self.options.encoding.decode(&bytes, &source_name)?;
        self.run_text(&source_name, &text)
    }

    /// Split `text` and execute each statement in order.
    ///
    /// Without auto-commit the whole run is one transaction, committed at the
    /// end, or rolled back when the run aborts or `rollback_only` is set.
    ///
    /// # Errors
    /// Returns a connection or transaction error, or, when `error_continue` is
    /// off, the classified error of the first failing statement.
    pub fn run_text(
        &mut self,
        source_name: &str,
        text: &str,
    ) -> Result<ScriptRunResult, PortableSqlError> {
        self.options.validate()?;
        self.state = RunnerState::Running;
        let result = self.execute_script(source_name, text);
        self.state = if result.is_ok() {
            RunnerState::Completed
        } else {
            RunnerState::Aborted
        };
        result
    }

    fn execute_script(
        &self,
        source_name: &str,
        text: &str,
    ) -> Result<ScriptRunResult, PortableSqlError> {
        let dialect = self.options.effective_database_type().dialect();
        let statements = split_statements(
            text,
            &self.options.delimiter,
            !dialect.is_line_comment_supported(),
        );
        info!(
            source = source_name,
            statements = statements.len(),
            database = ?dialect.database_type(),
            "running script"
        );

        let mut conn = self.provider.acquire()?;
        if !self.options.auto_commit {
            conn.begin()?;
        }

        let mut result = ScriptRunResult::new(source_name);
        for (idx, sql) in statements.into_iter().enumerate() {
            result.total_sql_count += 1;
            debug!(
                source = source_name,
                statement = idx + 1,
                sql = %sql,
                "executing script statement"
            );
            match conn.execute_raw(&sql) {
                Ok(()) => result.good_sql_count += 1,
                Err(err) => {
                    let err = classify(err, dialect, &sql, &[]);
                    if !self.options.error_continue {
                        abandon(&mut conn, source_name);
                        return Err(err);
                    }
                    warn!(
                        source = source_name,
                        statement = idx + 1,
                        error = %err,
                        "script statement failed, continuing"
                    );
                    result.failures.push(ScriptFailure {
                        index: idx + 1,
                        sql,
                        error: err,
                    });
                }
            }
        }

        if conn.in_transaction() {
            if self.options.rollback_only {
                conn.rollback()?;
            } else {
                conn.commit()?;
            }
        }
        info!(
            source = source_name,
            total = result.total_sql_count,
            good = result.good_sql_count,
            failed = result.failed_sql_count(),
            rolled_back = self.options.rollback_only,
            "script finished"
        );
        Ok(result)
    }
}

fn abandon(conn: &mut impl DbConnection, source_name: &str) {
    if conn.in_transaction()
        && let Err(err) = conn.rollback()
    {
        warn!(source = source_name, error = %err, "rollback after script failure failed");
    }
}

#[cfg(feature = "sqlite")]
impl ScriptRunner<crate::sqlite::SqliteConnectionProvider> {
    /// Runner over a `SQLite` database named by `options.connection.url`.
    ///
    /// # Errors
    /// Returns `PortableSqlError::ConfigError` if the options are inconsistent.
    pub fn sqlite(mut options: ScriptRunnerOptions) -> Result<Self, PortableSqlError> {
        use crate::dialect::DatabaseType;
        use crate::sqlite::{SqliteConnectionProvider, SqliteOptions};

        options.database_type.get_or_insert(DatabaseType::Sqlite);
        let provider =
            SqliteConnectionProvider::new(SqliteOptions::from_settings(&options.connection));
        Self::new(provider, options)
    }
}

/// Runs several script files in order with one runner and collects the
/// results.
#[derive(Debug)]
pub struct ScriptFireMan<C> {
    runner: ScriptRunner<C>,
}

/// Aggregated results of [`ScriptFireMan::fire`].
#[derive(Debug, Default)]
pub struct ScriptFireResult {
    pub runs: Vec<ScriptRunResult>,
}

impl ScriptFireResult {
    #[must_use]
    pub fn total_sql_count(&self) -> usize {
        self.runs.iter().map(|r| r.total_sql_count).sum()
    }

    #[must_use]
    pub fn good_sql_count(&self) -> usize {
        self.runs.iter().map(|r| r.good_sql_count).sum()
    }

    #[must_use]
    pub fn failed_sql_count(&self) -> usize {
        self.runs.iter().map(ScriptRunResult::failed_sql_count).sum()
    }
}

impl<C: ConnectionProvider> ScriptFireMan<C> {
    #[must_use]
    pub fn new(runner: ScriptRunner<C>) -> Self {
        Self { runner }
    }

    #[must_use]
    pub fn runner(&self) -> &ScriptRunner<C> {
        &self.runner
    }

    /// Run every file in order. Stops at the first file whose run aborts.
    ///
    /// # Errors
    /// Returns the error of the aborting file.
    pub fn fire<P: AsRef<Path>>(
        &mut self,
        paths: &[P],
    ) -> Result<ScriptFireResult, PortableSqlError> {
        let mut fired = ScriptFireResult::default();
        for path in paths {
            fired.runs.push(self.runner.run_file(path)?);
        }
        info!(
            files = fired.runs.len(),
            total = fired.total_sql_count(),
            good = fired.good_sql_count(),
            "script fire finished"
        );
        Ok(fired)
    }
}
