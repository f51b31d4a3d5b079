use std::fmt;

use tracing::debug;

use crate::connectivity::DbConnection;
use crate::dialect::{DatabaseType, DialectStrategy};
use crate::error::PortableSqlError;
use crate::types::RowValues;
use crate::value_type::ValueTypeRegistry;

use super::auto::{AutoKind, AutoStatement, with_identity_insert};
use super::entity::{EntityMeta, EntityRow};
use super::mapper::{BatchCountMapper, ResultMapper, StatementOutcome};
use super::{SqlCommand, classify, decorate_sql};

/// Insert, update or delete many rows with one statement template.
///
/// Every row is bound against the same SQL and the whole list goes to the
/// database as a single batch. For inserts, a sequence column without a value
/// is filled per row before the batch is prepared. Identity keys are not read
/// back for batches.
pub struct BatchAutoCommand<M = BatchCountMapper> {
    dialect: &'static dyn DialectStrategy,
    statement: AutoStatement,
    sql: String,
    mapper: M,
}

impl BatchAutoCommand<BatchCountMapper> {
    /// # Errors
    /// Returns `PortableSqlError::ConfigError` for an empty or unknown property,
    /// or a sequence column on a product without sequences.
    pub fn insert(
        database_type: DatabaseType,
        entity: &EntityMeta,
        properties: &[&str],
        registry: &ValueTypeRegistry,
    ) -> Result<Self, PortableSqlError> {
        let dialect = database_type.dialect();
        let statement = AutoStatement::insert(dialect, entity, properties, registry)?;
        Ok(Self::from_statement(dialect, statement))
    }

    /// # Errors
    /// Same rules as [`AutoCommand::update`](super::AutoCommand::update).
    pub fn update(
        database_type: DatabaseType,
        entity: &EntityMeta,
        properties: &[&str],
        registry: &ValueTypeRegistry,
    ) -> Result<Self, PortableSqlError> {
        let statement = AutoStatement::update(entity, properties, registry)?;
        Ok(Self::from_statement(database_type.dialect(), statement))
    }

    /// # Errors
    /// Returns `PortableSqlError::ConfigError` when the table has no primary key.
    pub fn delete(
        database_type: DatabaseType,
        entity: &EntityMeta,
        registry: &ValueTypeRegistry,
    ) -> Result<Self, PortableSqlError> {
        let statement = AutoStatement::delete(entity, registry)?;
        Ok(Self::from_statement(database_type.dialect(), statement))
    }

    fn from_statement(dialect: &'static dyn DialectStrategy, statement: AutoStatement) -> Self {
        Self {
            dialect,
            sql: statement.base_sql.clone(),
            statement,
            mapper: BatchCountMapper,
        }
    }
}

impl<M> BatchAutoCommand<M> {
    #[must_use]
    pub fn with_mapper<N: ResultMapper>(self, mapper: N) -> BatchAutoCommand<N> {
        BatchAutoCommand {
            dialect: self.dialect,
            statement: self.statement,
            sql: self.sql,
            mapper,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: &str) -> Self {
        self.sql = decorate_sql(self.dialect, Some(title), &self.statement.base_sql);
        self
    }

    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    #[must_use]
    pub fn kind(&self) -> AutoKind {
        self.statement.kind
    }

    fn run_batch(
        &self,
        conn: &mut dyn DbConnection,
        rows: Vec<Vec<RowValues>>,
    ) -> Result<Vec<usize>, PortableSqlError> {
        let mut stmt = conn.prepare(&self.sql)?;
        for params in rows {
            stmt.add_batch(params)?;
        }
        stmt.execute_batch()
    }
}

impl<M> fmt::Debug for BatchAutoCommand<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchAutoCommand")
            .field("database_type", &self.dialect.database_type())
            .field("kind", &self.statement.kind)
            .field("sql", &self.sql)
            .finish_non_exhaustive()
    }
}

impl<'r, R, M> SqlCommand<&'r [R]> for BatchAutoCommand<M>
where
    R: EntityRow,
    M: ResultMapper,
{
    type Output = M::Output;

    fn sql(&self) -> &str {
        &self.sql
    }

    fn execute(
        &self,
        conn: &mut dyn DbConnection,
        rows: &'r [R],
    ) -> Result<M::Output, PortableSqlError> {
        let fill = self.statement.kind == AutoKind::Insert;
        let mut bound_rows = Vec::with_capacity(rows.len());
        for row in rows {
            let (params, _) = self.statement.bind_row(conn, self.dialect, row, fill)?;
            bound_rows.push(params);
        }
        let flat: Vec<RowValues> = bound_rows.iter().flatten().cloned().collect();
        debug!(sql = %self.sql, rows = bound_rows.len(), params = ?flat, "executing batch command");

        if bound_rows.is_empty() {
            return self
                .mapper
                .map(StatementOutcome::BatchCounts(Vec::new()), &self.sql, &flat);
        }

        let result = if self.statement.identity_toggle {
            with_identity_insert(conn, self.dialect, &self.statement.table, |conn| {
                self.run_batch(conn, bound_rows)
            })
        } else {
            self.run_batch(conn, bound_rows)
        };
        let counts = result.map_err(|e| classify(e, self.dialect, &self.sql, &flat))?;
        self.mapper
            .map(StatementOutcome::BatchCounts(counts), &self.sql, &flat)
    }
}
