//! The narrow backend surface commands and the script runner execute through.
//!
//! Backends report database failures as [`PortableSqlError::Vendor`]; the
//! command layer attaches SQL text and classifies them. A backend that cannot
//! do something (stored procedures on SQLite, scrollable cursors) returns
//! [`PortableSqlError::Unimplemented`].

use crate::error::PortableSqlError;
use crate::types::{DeclaredType, RowValues};

/// How a cursor may move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorMode {
    #[default]
    ForwardOnly,
    Scrollable,
}

/// One bind position of a procedure call.
#[derive(Debug, Clone, PartialEq)]
pub struct CallBinding {
    /// 1-based placeholder index
    pub index: usize,
    /// Value for IN/INOUT positions
    pub value: Option<RowValues>,
    /// Registered type for OUT/INOUT/RETURN positions
    pub out_type: Option<DeclaredType>,
}

/// Yields connection handles. Pooling, if any, lives behind this.
pub trait ConnectionProvider {
    type Connection: DbConnection;

    /// # Errors
    /// Returns `PortableSqlError::ConnectionError` if no connection can be opened.
    fn acquire(&self) -> Result<Self::Connection, PortableSqlError>;
}

pub trait DbConnection {
    /// Compile `sql` into a reusable statement.
    ///
    /// # Errors
    /// Returns a vendor error if the database rejects the SQL.
    fn prepare(&mut self, sql: &str) -> Result<Box<dyn PreparedStatement + '_>, PortableSqlError>;

    /// Run one statement without parameters, discarding any rows it returns.
    ///
    /// # Errors
    /// Returns a vendor error if execution fails.
    fn execute_raw(&mut self, sql: &str) -> Result<(), PortableSqlError>;

    /// # Errors
    /// Returns an error if a transaction is already open or the database refuses.
    fn begin(&mut self) -> Result<(), PortableSqlError>;

    /// # Errors
    /// Returns an error if no transaction is open or the commit fails.
    fn commit(&mut self) -> Result<(), PortableSqlError>;

    /// # Errors
    /// Returns an error if no transaction is open or the rollback fails.
    fn rollback(&mut self) -> Result<(), PortableSqlError>;

    fn in_transaction(&self) -> bool;
}

pub trait PreparedStatement {
    /// Bind one row and execute, returning the affected row count.
    ///
    /// # Errors
    /// Returns a vendor error if binding or execution fails.
    fn execute_update(&mut self, params: &[RowValues]) -> Result<usize, PortableSqlError>;

    /// Queue one row for [`execute_batch`](Self::execute_batch).
    ///
    /// # Errors
    /// Returns an error if the backend rejects the row at queue time.
    fn add_batch(&mut self, params: Vec<RowValues>) -> Result<(), PortableSqlError>;

    /// Execute every queued row, returning one count per row in queue order.
    ///
    /// # Errors
    /// Returns a vendor error from the first failing row.
    fn execute_batch(&mut self) -> Result<Vec<usize>, PortableSqlError>;

    /// Bind and open a cursor over the statement's rows.
    ///
    /// # Errors
    /// Returns a vendor error, or `Unimplemented` for an unsupported mode.
    fn open_cursor(
        &mut self,
        params: &[RowValues],
        mode: CursorMode,
    ) -> Result<Box<dyn Cursor + '_>, PortableSqlError>;

    /// Execute a `{call ...}` string. The result holds one value per binding
    /// in `bindings` order: the OUT value for out positions, `Null` otherwise.
    ///
    /// # Errors
    /// Returns a vendor error, or `Unimplemented` on backends without procedures.
    fn execute_call(
        &mut self,
        bindings: &[CallBinding],
    ) -> Result<Vec<RowValues>, PortableSqlError>;
}

/// An open result. Dropping it closes it.
pub trait Cursor {
    fn column_names(&self) -> &[String];

    /// # Errors
    /// Returns a vendor error if the next row cannot be read.
    fn fetch_row(&mut self) -> Result<Option<Vec<RowValues>>, PortableSqlError>;

    /// Position just past the given number of rows (0 = start). Returns
    /// `false` when the result has fewer rows.
    ///
    /// # Errors
    /// Returns `Unimplemented` for forward-only cursors.
    fn absolute(&mut self, _row: usize) -> Result<bool, PortableSqlError> {
        Err(PortableSqlError::Unimplemented(
            "absolute positioning needs a scrollable cursor".into(),
        ))
    }

    /// Skip `count` rows by reading and discarding them.
    ///
    /// # Errors
    /// Returns a vendor error if reading fails.
    fn skip_rows(&mut self, count: usize) -> Result<bool, PortableSqlError> {
        for _ in 0..count {
            if self.fetch_row()?.is_none() {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
