use std::fmt;

use tracing::debug;

use crate::clause::QueryClause;
use crate::connectivity::{CursorMode, DbConnection};
use crate::dialect::{DatabaseType, DialectStrategy};
use crate::error::PortableSqlError;
use crate::results::ResultSet;
use crate::types::RowValues;

use super::mapper::{ResultMapper, ResultSetMapper, StatementOutcome};
use super::{SqlCommand, classify, decorate_sql};

/// `select <columns> from <table> where <condition>` with an optional window.
///
/// The condition is rendered once, when the command is built. Leading rows are
/// skipped with an absolutely positioned scrollable cursor where the product
/// supports one, and by reading and discarding rows everywhere else.
///
/// ```rust
/// use portable_sql::prelude::*;
///
/// let active = OrScopeQueryClauseGroup::with_clauses(vec![
///     Box::new(ComparisonClause::equal("status", RowValues::Text("active".into()))),
///     Box::new(ComparisonClause::is_null("status")),
/// ]);
/// let select = ConditionSelectCommand::new(DatabaseType::H2, "member", &["id", "name"], &active)
///     .skip(20)
///     .max_rows(10);
/// assert_eq!(
///     select.sql(),
///     "select id, name from member where (status = ? or status is null)"
/// );
/// assert_eq!(select.params(), &[RowValues::Text("active".into())]);
/// ```
pub struct ConditionSelectCommand<M = ResultSetMapper> {
    dialect: &'static dyn DialectStrategy,
    base_sql: String,
    sql: String,
    params: Vec<RowValues>,
    skip: usize,
    max_rows: Option<usize>,
    mapper: M,
}

impl ConditionSelectCommand<ResultSetMapper> {
    /// An empty column list selects `*`.
    #[must_use]
    pub fn new(
        database_type: DatabaseType,
        table: &str,
        columns: &[&str],
        condition: &dyn QueryClause,
    ) -> Self {
        let rendered = condition.render();
        let column_list = if columns.is_empty() {
            "*".to_string()
        } else {
            columns.join(", ")
        };
        let base_sql = format!(
            "select {column_list} from {table} where {}",
            rendered.fragment
        );
        Self {
            dialect: database_type.dialect(),
            sql: base_sql.clone(),
            base_sql,
            params: rendered.values,
            skip: 0,
            max_rows: None,
            mapper: ResultSetMapper,
        }
    }
}

impl<M> ConditionSelectCommand<M> {
    #[must_use]
    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    #[must_use]
    pub fn max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = Some(max_rows);
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: &str) -> Self {
        self.sql = decorate_sql(self.dialect, Some(title), &self.base_sql);
        self
    }

    #[must_use]
    pub fn with_mapper<N: ResultMapper>(self, mapper: N) -> ConditionSelectCommand<N> {
        ConditionSelectCommand {
            dialect: self.dialect,
            base_sql: self.base_sql,
            sql: self.sql,
            params: self.params,
            skip: self.skip,
            max_rows: self.max_rows,
            mapper,
        }
    }

    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    #[must_use]
    pub fn params(&self) -> &[RowValues] {
        &self.params
    }

    fn fetch(&self, conn: &mut dyn DbConnection) -> Result<ResultSet, PortableSqlError> {
        let scrollable = self.skip > 0 && self.dialect.is_scrollable_cursor_supported();
        let mode = if scrollable {
            CursorMode::Scrollable
        } else {
            CursorMode::ForwardOnly
        };
        let mut stmt = conn.prepare(&self.sql)?;
        let mut cursor = stmt.open_cursor(&self.params, mode)?;
        if self.skip > 0 {
            let positioned = if scrollable {
                cursor.absolute(self.skip)?
            } else {
                cursor.skip_rows(self.skip)?
            };
            if !positioned {
                let mut empty = ResultSet::with_capacity(0);
                empty.set_column_names(std::sync::Arc::new(cursor.column_names().to_vec()));
                return Ok(empty);
            }
        }
        ResultSet::from_cursor(cursor.as_mut(), self.max_rows)
    }
}

impl<M> fmt::Debug for ConditionSelectCommand<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionSelectCommand")
            .field("database_type", &self.dialect.database_type())
            .field("sql", &self.sql)
            .field("skip", &self.skip)
            .field("max_rows", &self.max_rows)
            .finish_non_exhaustive()
    }
}

impl<M: ResultMapper> SqlCommand<()> for ConditionSelectCommand<M> {
    type Output = M::Output;

    fn sql(&self) -> &str {
        &self.sql
    }

    fn execute(
        &self,
        conn: &mut dyn DbConnection,
        _args: (),
    ) -> Result<M::Output, PortableSqlError> {
        debug!(
            sql = %self.sql,
            params = ?self.params,
            skip = self.skip,
            "executing condition select"
        );
        let result_set = self
            .fetch(conn)
            .map_err(|e| classify(e, self.dialect, &self.sql, &self.params))?;
        self.mapper
            .map(StatementOutcome::Rows(result_set), &self.sql, &self.params)
    }
}
