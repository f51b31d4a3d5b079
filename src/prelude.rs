//! Convenient imports for common functionality.
//!
//! This module re-exports the types most callers need to build conditions,
//! commands and script runs.

pub use crate::clause::{
    AndScopeQueryClauseGroup, ComparisonClause, ComparisonOperator, OrScopeQueryClauseGroup,
    QueryClause, RawClause, RenderedClause,
};
pub use crate::command::{
    AutoCommand, BatchAutoCommand, BatchCountMapper, CheckedRowCountMapper, ColumnMeta,
    ConditionSelectCommand, EntityMeta, EntityRow, GeneratedKeyMapper, MapWith, NoResultMapper,
    ProcedureCommand, ResultMapper, ResultSetMapper, RowCountMapper, SqlCommand,
    StatementOutcome,
};
pub use crate::connectivity::{
    CallBinding, ConnectionProvider, Cursor, CursorMode, DbConnection, PreparedStatement,
};
pub use crate::dialect::{DatabaseType, DialectStrategy};
pub use crate::error::{PortableSqlError, VendorError};
pub use crate::procedure::{
    ParameterAccessor, ParameterDescriptor, ParameterMetadata, ParameterMode, ProcedureMetadata,
    ProcedureMetadataBuilder,
};
pub use crate::results::{CustomDbRow, ResultSet};
pub use crate::script::{
    ConnectionSettings, RunnerState, ScriptEncoding, ScriptFireMan, ScriptFireResult,
    ScriptRunResult, ScriptRunner, ScriptRunnerOptions, ScriptRunnerOptionsBuilder,
};
pub use crate::types::{DeclaredType, RowValues};
pub use crate::value_type::{ValueType, ValueTypeRegistry};

#[cfg(feature = "sqlite")]
pub use crate::sqlite::{SqliteConnection, SqliteConnectionProvider, SqliteOptions};
