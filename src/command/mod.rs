//! Executable commands.
//!
//! Every command renders its SQL once, at construction, then runs any number
//! of times against a [`DbConnection`]. Vendor failures raised while running
//! are classified by the command's dialect: uniqueness violations surface as
//! [`PortableSqlError::EntityAlreadyExists`], everything else from the
//! database as [`PortableSqlError::SqlFailure`]. Conversion errors pass
//! through untouched.

mod auto;
mod batch;
mod entity;
mod mapper;
mod procedure;
mod select;

pub use auto::{AutoCommand, AutoKind};
pub use batch::BatchAutoCommand;
pub use entity::{ColumnMeta, EntityMeta, EntityRow};
pub use mapper::{
    BatchCountMapper, CheckedRowCountMapper, GeneratedKeyMapper, MapWith, NoResultMapper,
    ResultMapper, ResultSetMapper, RowCountMapper, StatementOutcome,
};
pub use procedure::ProcedureCommand;
pub use select::ConditionSelectCommand;

use crate::connectivity::{CursorMode, DbConnection};
use crate::dialect::DialectStrategy;
use crate::error::PortableSqlError;
use crate::results::ResultSet;
use crate::types::RowValues;

/// A prepared unit of work taking `A` per execution.
pub trait SqlCommand<A> {
    type Output;

    /// The SQL text sent to the database, title comment included.
    fn sql(&self) -> &str;

    /// # Errors
    /// Returns the classified database failure, or a conversion or mapping error.
    fn execute(
        &self,
        conn: &mut dyn DbConnection,
        args: A,
    ) -> Result<Self::Output, PortableSqlError>;
}

/// Prefix `sql` with a title comment in whatever style the dialect accepts.
#[must_use]
pub fn decorate_sql(dialect: &dyn DialectStrategy, title: Option<&str>, sql: &str) -> String {
    let Some(title) = title.map(str::trim).filter(|t| !t.is_empty()) else {
        return sql.to_string();
    };
    if dialect.is_block_comment_supported() {
        format!("/* {} */ {sql}", title.replace("*/", "* /"))
    } else if dialect.is_line_comment_supported() {
        format!("-- {}\n{sql}", title.replace(['\r', '\n'], " "))
    } else {
        sql.to_string()
    }
}

/// Attach statement context to a failure and let the dialect decide whether it
/// is a uniqueness violation.
#[must_use]
pub fn classify(
    err: PortableSqlError,
    dialect: &dyn DialectStrategy,
    sql: &str,
    params: &[RowValues],
) -> PortableSqlError {
    match err {
        PortableSqlError::Vendor(source) => {
            if dialect
                .is_unique_constraint_exception(source.sql_state.as_deref(), source.error_code)
            {
                PortableSqlError::EntityAlreadyExists {
                    sql: sql.to_string(),
                    params: params.to_vec(),
                    source,
                }
            } else {
                PortableSqlError::SqlFailure {
                    sql: sql.to_string(),
                    params: params.to_vec(),
                    source,
                }
            }
        }
        other => other,
    }
}

fn first_row(conn: &mut dyn DbConnection, sql: &str) -> Result<ResultSet, PortableSqlError> {
    let mut stmt = conn.prepare(sql)?;
    let mut cursor = stmt.open_cursor(&[], CursorMode::ForwardOnly)?;
    ResultSet::from_cursor(cursor.as_mut(), Some(1))
}

/// Run a single-value query such as a sequence or identity read.
pub(crate) fn query_single_value(
    conn: &mut dyn DbConnection,
    dialect: &dyn DialectStrategy,
    sql: &str,
) -> Result<Option<RowValues>, PortableSqlError> {
    let result_set = first_row(conn, sql).map_err(|e| classify(e, dialect, sql, &[]))?;
    Ok(result_set.first_value().filter(|v| !v.is_null()).cloned())
}
