use std::fmt;

use crate::connectivity::{CallBinding, Cursor, CursorMode, DbConnection, PreparedStatement};
use crate::error::PortableSqlError;
use crate::types::RowValues;

use super::params::Params;
use super::query::sqlite_extract_value_sync;

/// Blocking `SQLite` connection.
pub struct SqliteConnection {
    pub(crate) conn: rusqlite::Connection,
    pub(crate) in_transaction: bool,
}

impl SqliteConnection {
    #[must_use]
    pub fn new(conn: rusqlite::Connection) -> Self {
        Self {
            conn,
            in_transaction: false,
        }
    }

    /// Private in-memory database, mostly for tests.
    ///
    /// # Errors
    /// Returns `PortableSqlError::ConnectionError` if SQLite cannot allocate the database.
    pub fn open_in_memory() -> Result<Self, PortableSqlError> {
        rusqlite::Connection::open_in_memory()
            .map(Self::new)
            .map_err(|e| PortableSqlError::ConnectionError(format!("SQLite in-memory open: {e}")))
    }

    /// Borrow the underlying rusqlite connection.
    #[must_use]
    pub fn raw(&self) -> &rusqlite::Connection {
        &self.conn
    }

    fn ensure_tx(&self, ctx: &str, expected: bool) -> Result<(), PortableSqlError> {
        if self.in_transaction == expected {
            Ok(())
        } else if expected {
            Err(PortableSqlError::ExecutionError(format!(
                "SQLite transaction not active ({ctx})"
            )))
        } else {
            Err(PortableSqlError::ExecutionError(format!(
                "SQLite transaction already active ({ctx})"
            )))
        }
    }
}

impl fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteConnection")
            .field("path", &self.conn.path())
            .field("in_transaction", &self.in_transaction)
            .finish()
    }
}

impl DbConnection for SqliteConnection {
    fn prepare(&mut self, sql: &str) -> Result<Box<dyn PreparedStatement + '_>, PortableSqlError> {
        // `{call ...}` escapes never parse as SQLite SQL
        if sql.trim_start().starts_with('{') {
            return Err(PortableSqlError::Unimplemented(
                "SQLite has no stored procedures".into(),
            ));
        }
        let stmt = self.conn.prepare(sql)?;
        Ok(Box::new(SqlitePreparedStatement {
            stmt,
            batch: Vec::new(),
        }))
    }

    fn execute_raw(&mut self, sql: &str) -> Result<(), PortableSqlError> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    fn begin(&mut self) -> Result<(), PortableSqlError> {
        self.ensure_tx("begin", false)?;
        self.conn.execute_batch("BEGIN")?;
        self.in_transaction = true;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), PortableSqlError> {
        self.ensure_tx("commit", true)?;
        self.conn.execute_batch("COMMIT")?;
        self.in_transaction = false;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), PortableSqlError> {
        self.ensure_tx("rollback", true)?;
        // the transaction is gone either way
        self.in_transaction = false;
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }

    fn in_transaction(&self) -> bool {
        self.in_transaction
    }
}

/// Statement compiled on a [`SqliteConnection`].
pub struct SqlitePreparedStatement<'conn> {
    stmt: rusqlite::Statement<'conn>,
    batch: Vec<Params>,
}

impl PreparedStatement for SqlitePreparedStatement<'_> {
    fn execute_update(&mut self, params: &[RowValues]) -> Result<usize, PortableSqlError> {
        let params = Params::convert(params)?;
        let affected = self
            .stmt
            .execute(rusqlite::params_from_iter(params.as_values()))?;
        Ok(affected)
    }

    fn add_batch(&mut self, params: Vec<RowValues>) -> Result<(), PortableSqlError> {
        self.batch.push(Params::convert(&params)?);
        Ok(())
    }

    fn execute_batch(&mut self) -> Result<Vec<usize>, PortableSqlError> {
        let rows = std::mem::take(&mut self.batch);
        let mut counts = Vec::with_capacity(rows.len());
        for params in &rows {
            counts.push(
                self.stmt
                    .execute(rusqlite::params_from_iter(params.as_values()))?,
            );
        }
        Ok(counts)
    }

    fn open_cursor(
        &mut self,
        params: &[RowValues],
        mode: CursorMode,
    ) -> Result<Box<dyn Cursor + '_>, PortableSqlError> {
        if mode == CursorMode::Scrollable {
            return Err(PortableSqlError::Unimplemented(
                "SQLite cursors are forward-only".into(),
            ));
        }
        let column_names: Vec<String> = self
            .stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        let params = Params::convert(params)?;
        let rows = self
            .stmt
            .query(rusqlite::params_from_iter(params.as_values()))?;
        Ok(Box::new(SqliteCursor { rows, column_names }))
    }

    fn execute_call(
        &mut self,
        _bindings: &[CallBinding],
    ) -> Result<Vec<RowValues>, PortableSqlError> {
        Err(PortableSqlError::Unimplemented(
            "SQLite has no stored procedures".into(),
        ))
    }
}

/// Forward-only cursor over a running `SQLite` query.
pub struct SqliteCursor<'stmt> {
    rows: rusqlite::Rows<'stmt>,
    column_names: Vec<String>,
}

impl Cursor for SqliteCursor<'_> {
    fn column_names(&self) -> &[String] {
        &self.column_names
    }

    fn fetch_row(&mut self) -> Result<Option<Vec<RowValues>>, PortableSqlError> {
        let col_count = self.column_names.len();
        let Some(row) = self.rows.next()? else {
            return Ok(None);
        };
        let mut row_values = Vec::with_capacity(col_count);
        for i in 0..col_count {
            row_values.push(sqlite_extract_value_sync(row, i)?);
        }
        Ok(Some(row_values))
    }
}
