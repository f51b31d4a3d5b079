use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::connectivity::{CallBinding, DbConnection};
use crate::dialect::{DatabaseType, DialectStrategy};
use crate::error::PortableSqlError;
use crate::procedure::ProcedureMetadata;
use crate::types::RowValues;

use super::mapper::{NoResultMapper, ResultMapper, StatementOutcome};
use super::{SqlCommand, classify};

/// Calls a stored procedure, reading IN values from and writing OUT values to
/// a caller-owned parameter container.
///
/// Bound values are never logged for procedure calls.
pub struct ProcedureCommand<P, M = NoResultMapper> {
    dialect: &'static dyn DialectStrategy,
    metadata: Arc<ProcedureMetadata<P>>,
    sql: String,
    mapper: M,
}

impl<P> ProcedureCommand<P, NoResultMapper> {
    #[must_use]
    pub fn new(database_type: DatabaseType, metadata: Arc<ProcedureMetadata<P>>) -> Self {
        let sql = metadata.build_call_sql();
        Self {
            dialect: database_type.dialect(),
            metadata,
            sql,
            mapper: NoResultMapper,
        }
    }
}

impl<P, M> ProcedureCommand<P, M> {
    #[must_use]
    pub fn with_mapper<N: ResultMapper>(self, mapper: N) -> ProcedureCommand<P, N> {
        ProcedureCommand {
            dialect: self.dialect,
            metadata: self.metadata,
            sql: self.sql,
            mapper,
        }
    }

    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    #[must_use]
    pub fn metadata(&self) -> &ProcedureMetadata<P> {
        &self.metadata
    }

    fn bindings(
        &self,
        container: &P,
    ) -> Result<(Vec<CallBinding>, Vec<RowValues>), PortableSqlError> {
        let parameters = self.metadata.parameters();
        let mut bindings = Vec::with_capacity(parameters.len());
        let mut in_values = Vec::new();
        for parameter in parameters {
            let value = if parameter.is_in_type() {
                let raw = parameter.get_value(container).unwrap_or(RowValues::Null);
                let bound = parameter.value_type().to_bind(&raw).map_err(|e| {
                    PortableSqlError::ParameterError(format!(
                        "parameter {} of {}: {e}",
                        parameter.name(),
                        self.metadata.procedure_name()
                    ))
                })?;
                in_values.push(bound.clone());
                Some(bound)
            } else {
                None
            };
            bindings.push(CallBinding {
                index: parameter.ordinal(),
                value,
                out_type: parameter.is_out_type().then(|| parameter.declared_type()),
            });
        }
        Ok((bindings, in_values))
    }
}

impl<P, M> fmt::Debug for ProcedureCommand<P, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcedureCommand")
            .field("database_type", &self.dialect.database_type())
            .field("procedure", &self.metadata.procedure_name())
            .field("sql", &self.sql)
            .finish_non_exhaustive()
    }
}

impl<'c, P, M> SqlCommand<&'c mut P> for ProcedureCommand<P, M>
where
    M: ResultMapper,
{
    type Output = M::Output;

    fn sql(&self) -> &str {
        &self.sql
    }

    fn execute(
        &self,
        conn: &mut dyn DbConnection,
        container: &'c mut P,
    ) -> Result<M::Output, PortableSqlError> {
        let (bindings, in_values) = self.bindings(container)?;
        debug!(procedure = %self.metadata.procedure_name(), "calling stored procedure");

        let returned = conn
            .prepare(&self.sql)
            .and_then(|mut stmt| stmt.execute_call(&bindings))
            .map_err(|e| classify(e, self.dialect, &self.sql, &in_values))?;
        if returned.len() != bindings.len() {
            return Err(PortableSqlError::ExecutionError(format!(
                "{} returned {} values for {} bindings",
                self.metadata.procedure_name(),
                returned.len(),
                bindings.len()
            )));
        }

        for (parameter, value) in self.metadata.parameters().iter().zip(returned) {
            if parameter.is_out_type() {
                let value = parameter.value_type().from_column(value)?;
                parameter.set_value(container, value);
            }
        }
        self.mapper.map(StatementOutcome::Called, &self.sql, &in_values)
    }
}
