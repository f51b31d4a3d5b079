use crate::error::PortableSqlError;
use crate::results::ResultSet;
use crate::types::RowValues;

/// What a statement produced, before mapping.
#[derive(Debug, Clone)]
pub enum StatementOutcome {
    RowCount {
        count: usize,
        /// Sequence or identity value assigned by an insert.
        generated_key: Option<RowValues>,
    },
    BatchCounts(Vec<usize>),
    Rows(ResultSet),
    /// A procedure call; OUT values were already written to the container.
    Called,
}

impl StatementOutcome {
    fn kind(&self) -> &'static str {
        match self {
            StatementOutcome::RowCount { .. } => "row count",
            StatementOutcome::BatchCounts(_) => "batch counts",
            StatementOutcome::Rows(_) => "rows",
            StatementOutcome::Called => "procedure call",
        }
    }
}

fn unexpected(mapper: &str, outcome: &StatementOutcome) -> PortableSqlError {
    PortableSqlError::ExecutionError(format!(
        "{mapper} cannot map a {} outcome",
        outcome.kind()
    ))
}

/// Turns a [`StatementOutcome`] into the command's return value.
pub trait ResultMapper: Send + Sync {
    type Output;

    /// # Errors
    /// Returns an error when the outcome has the wrong shape or fails a check.
    fn map(
        &self,
        outcome: StatementOutcome,
        sql: &str,
        params: &[RowValues],
    ) -> Result<Self::Output, PortableSqlError>;
}

/// Affected rows. Batch counts are summed.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowCountMapper;

impl ResultMapper for RowCountMapper {
    type Output = usize;

    fn map(
        &self,
        outcome: StatementOutcome,
        _sql: &str,
        _params: &[RowValues],
    ) -> Result<usize, PortableSqlError> {
        match outcome {
            StatementOutcome::RowCount { count, .. } => Ok(count),
            StatementOutcome::BatchCounts(counts) => Ok(counts.iter().sum()),
            other => Err(unexpected("RowCountMapper", &other)),
        }
    }
}

/// Affected rows, failing with `EntityAlreadyDeleted` when nothing matched.
/// Meant for updates and deletes by primary key.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckedRowCountMapper;

impl ResultMapper for CheckedRowCountMapper {
    type Output = usize;

    fn map(
        &self,
        outcome: StatementOutcome,
        sql: &str,
        params: &[RowValues],
    ) -> Result<usize, PortableSqlError> {
        match outcome {
            StatementOutcome::RowCount { count: 0, .. } => {
                Err(PortableSqlError::EntityAlreadyDeleted {
                    sql: sql.to_string(),
                    params: params.to_vec(),
                })
            }
            StatementOutcome::RowCount { count, .. } => Ok(count),
            StatementOutcome::BatchCounts(counts) => {
                if counts.contains(&0) {
                    Err(PortableSqlError::EntityAlreadyDeleted {
                        sql: sql.to_string(),
                        params: params.to_vec(),
                    })
                } else {
                    Ok(counts.iter().sum())
                }
            }
            other => Err(unexpected("CheckedRowCountMapper", &other)),
        }
    }
}

/// The key generated by an insert, if any.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeneratedKeyMapper;

impl ResultMapper for GeneratedKeyMapper {
    type Output = Option<RowValues>;

    fn map(
        &self,
        outcome: StatementOutcome,
        _sql: &str,
        _params: &[RowValues],
    ) -> Result<Option<RowValues>, PortableSqlError> {
        match outcome {
            StatementOutcome::RowCount { generated_key, .. } => Ok(generated_key),
            other => Err(unexpected("GeneratedKeyMapper", &other)),
        }
    }
}

/// One count per batch row, in input order.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchCountMapper;

impl ResultMapper for BatchCountMapper {
    type Output = Vec<usize>;

    fn map(
        &self,
        outcome: StatementOutcome,
        _sql: &str,
        _params: &[RowValues],
    ) -> Result<Vec<usize>, PortableSqlError> {
        match outcome {
            StatementOutcome::BatchCounts(counts) => Ok(counts),
            StatementOutcome::RowCount { count, .. } => Ok(vec![count]),
            other => Err(unexpected("BatchCountMapper", &other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResultSetMapper;

impl ResultMapper for ResultSetMapper {
    type Output = ResultSet;

    fn map(
        &self,
        outcome: StatementOutcome,
        _sql: &str,
        _params: &[RowValues],
    ) -> Result<ResultSet, PortableSqlError> {
        match outcome {
            StatementOutcome::Rows(result_set) => Ok(result_set),
            other => Err(unexpected("ResultSetMapper", &other)),
        }
    }
}

/// Discards whatever the statement produced.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResultMapper;

impl ResultMapper for NoResultMapper {
    type Output = ();

    fn map(
        &self,
        _outcome: StatementOutcome,
        _sql: &str,
        _params: &[RowValues],
    ) -> Result<(), PortableSqlError> {
        Ok(())
    }
}

/// Adapts a closure into a mapper.
///
/// ```rust
/// use portable_sql::prelude::*;
///
/// let first_name = MapWith(|outcome: StatementOutcome| match outcome {
///     StatementOutcome::Rows(rs) => Ok(rs.first_value().and_then(|v| v.as_text()).map(String::from)),
///     _ => Ok::<_, PortableSqlError>(None),
/// });
/// let mapped = first_name.map(StatementOutcome::Called, "select 1", &[]).unwrap();
/// assert_eq!(mapped, None);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct MapWith<F>(pub F);

impl<F, T> ResultMapper for MapWith<F>
where
    F: Fn(StatementOutcome) -> Result<T, PortableSqlError> + Send + Sync,
{
    type Output = T;

    fn map(
        &self,
        outcome: StatementOutcome,
        _sql: &str,
        _params: &[RowValues],
    ) -> Result<T, PortableSqlError> {
        (self.0)(outcome)
    }
}
