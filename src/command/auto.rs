use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::connectivity::DbConnection;
use crate::dialect::{DatabaseType, DialectStrategy};
use crate::error::PortableSqlError;
use crate::types::RowValues;
use crate::value_type::{ValueType, ValueTypeRegistry};

use super::entity::{ColumnMeta, EntityMeta, EntityRow};
use super::mapper::{ResultMapper, RowCountMapper, StatementOutcome};
use super::{SqlCommand, classify, decorate_sql, query_single_value};

/// Which statement an auto command renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoKind {
    Insert,
    Update,
    Delete,
}

/// A column bound by position in the rendered statement.
#[derive(Debug, Clone)]
pub(crate) struct BoundColumn {
    pub(crate) property: String,
    pub(crate) column: String,
    pub(crate) sequence_sql: Option<String>,
    pub(crate) value_type: Arc<dyn ValueType>,
}

/// SQL template and bind plan shared by the single-row and batch commands.
#[derive(Debug, Clone)]
pub(crate) struct AutoStatement {
    pub(crate) kind: AutoKind,
    pub(crate) table: String,
    pub(crate) base_sql: String,
    pub(crate) bound: Vec<BoundColumn>,
    /// Identity column omitted from an insert, read back afterwards.
    pub(crate) identity_read_back: Option<Arc<dyn ValueType>>,
    /// Identity column supplied explicitly; the insert runs between the
    /// dialect's disable/enable statements.
    pub(crate) identity_toggle: bool,
}

fn resolve_column(
    column: &ColumnMeta,
    registry: &ValueTypeRegistry,
) -> Result<Arc<dyn ValueType>, PortableSqlError> {
    registry.resolve(column.declared_type, column.element_type)
}

fn lookup<'m>(entity: &'m EntityMeta, property: &str) -> Result<&'m ColumnMeta, PortableSqlError> {
    entity.column_for(property).ok_or_else(|| {
        PortableSqlError::ConfigError(format!(
            "table {} has no property {property}",
            entity.table
        ))
    })
}

fn bind(
    column: &ColumnMeta,
    registry: &ValueTypeRegistry,
) -> Result<BoundColumn, PortableSqlError> {
    Ok(BoundColumn {
        property: column.property.clone(),
        column: column.column.clone(),
        sequence_sql: None,
        value_type: resolve_column(column, registry)?,
    })
}

fn primary_key_columns<'m>(
    entity: &'m EntityMeta,
) -> Result<Vec<&'m ColumnMeta>, PortableSqlError> {
    let keys: Vec<&ColumnMeta> = entity.primary_keys().collect();
    if keys.is_empty() {
        return Err(PortableSqlError::ConfigError(format!(
            "table {} has no primary key",
            entity.table
        )));
    }
    Ok(keys)
}

impl AutoStatement {
    pub(crate) fn insert(
        dialect: &dyn DialectStrategy,
        entity: &EntityMeta,
        properties: &[&str],
        registry: &ValueTypeRegistry,
    ) -> Result<Self, PortableSqlError> {
        if properties.is_empty() {
            return Err(PortableSqlError::ConfigError(format!(
                "insert into {} needs at least one property",
                entity.table
            )));
        }
        let mut bound = Vec::with_capacity(properties.len());
        for property in properties {
            let column = lookup(entity, property)?;
            let mut bound_column = bind(column, registry)?;
            if let Some(sequence) = &column.sequence {
                bound_column.sequence_sql = Some(sequence_sql(dialect, entity, sequence)?);
            }
            bound.push(bound_column);
        }
        // sequence columns the caller left out are still inserted
        for column in &entity.columns {
            if let Some(sequence) = &column.sequence
                && !properties.contains(&column.property.as_str())
            {
                let mut bound_column = bind(column, registry)?;
                bound_column.sequence_sql = Some(sequence_sql(dialect, entity, sequence)?);
                bound.push(bound_column);
            }
        }

        let (identity_read_back, identity_toggle) = match entity.identity_column() {
            Some(identity) if properties.contains(&identity.property.as_str()) => (None, true),
            Some(identity) => (Some(resolve_column(identity, registry)?), false),
            None => (None, false),
        };

        let columns: Vec<&str> = bound.iter().map(|b| b.column.as_str()).collect();
        let placeholders = vec!["?"; bound.len()].join(", ");
        let base_sql = format!(
            "insert into {} ({}) values ({placeholders})",
            entity.table,
            columns.join(", ")
        );
        Ok(Self {
            kind: AutoKind::Insert,
            table: entity.table.clone(),
            base_sql,
            bound,
            identity_read_back,
            identity_toggle,
        })
    }

    pub(crate) fn update(
        entity: &EntityMeta,
        properties: &[&str],
        registry: &ValueTypeRegistry,
    ) -> Result<Self, PortableSqlError> {
        if properties.is_empty() {
            return Err(PortableSqlError::ConfigError(format!(
                "update of {} needs at least one property",
                entity.table
            )));
        }
        let keys = primary_key_columns(entity)?;
        let mut bound = Vec::with_capacity(properties.len() + keys.len());
        for property in properties {
            let column = lookup(entity, property)?;
            if column.primary_key {
                return Err(PortableSqlError::ConfigError(format!(
                    "primary key {property} of {} cannot be updated",
                    entity.table
                )));
            }
            bound.push(bind(column, registry)?);
        }
        let set_list: Vec<String> = bound.iter().map(|b| format!("{} = ?", b.column)).collect();
        for key in &keys {
            bound.push(bind(key, registry)?);
        }
        let base_sql = format!(
            "update {} set {} where {}",
            entity.table,
            set_list.join(", "),
            key_predicate(&keys)
        );
        Ok(Self {
            kind: AutoKind::Update,
            table: entity.table.clone(),
            base_sql,
            bound,
            identity_read_back: None,
            identity_toggle: false,
        })
    }

    pub(crate) fn delete(
        entity: &EntityMeta,
        registry: &ValueTypeRegistry,
    ) -> Result<Self, PortableSqlError> {
        let keys = primary_key_columns(entity)?;
        let bound = keys
            .iter()
            .map(|key| bind(key, registry))
            .collect::<Result<Vec<_>, _>>()?;
        let base_sql = format!("delete from {} where {}", entity.table, key_predicate(&keys));
        Ok(Self {
            kind: AutoKind::Delete,
            table: entity.table.clone(),
            base_sql,
            bound,
            identity_read_back: None,
            identity_toggle: false,
        })
    }

    /// Bind values for one row in placeholder order. Missing properties are an
    /// error unless `fill_sequences` lets a sequence column be fetched.
    pub(crate) fn bind_row<R: EntityRow + ?Sized>(
        &self,
        conn: &mut dyn DbConnection,
        dialect: &dyn DialectStrategy,
        row: &R,
        fill_sequences: bool,
    ) -> Result<(Vec<RowValues>, Option<RowValues>), PortableSqlError> {
        let mut params = Vec::with_capacity(self.bound.len());
        let mut generated_key = None;
        for bound in &self.bound {
            let value = match (row.property_value(&bound.property), &bound.sequence_sql) {
                (Some(value), _) if !value.is_null() => value,
                (_, Some(sequence_sql)) if fill_sequences => {
                    let next = query_single_value(conn, dialect, sequence_sql)?.ok_or_else(|| {
                        PortableSqlError::ExecutionError(format!(
                            "sequence query returned no value: {sequence_sql}"
                        ))
                    })?;
                    let next = bound.value_type.from_column(next)?;
                    generated_key = Some(next.clone());
                    next
                }
                (Some(value), _) => value,
                (None, _) => {
                    return Err(PortableSqlError::ParameterError(format!(
                        "row has no value for {}.{}",
                        self.table, bound.property
                    )));
                }
            };
            params.push(bound.value_type.to_bind(&value)?);
        }
        Ok((params, generated_key))
    }
}

fn sequence_sql(
    dialect: &dyn DialectStrategy,
    entity: &EntityMeta,
    sequence: &str,
) -> Result<String, PortableSqlError> {
    dialect.build_sequence_next_val_sql(sequence).ok_or_else(|| {
        PortableSqlError::ConfigError(format!(
            "{:?} has no sequences; cannot fill {} from {sequence}",
            dialect.database_type(),
            entity.table
        ))
    })
}

fn key_predicate(keys: &[&ColumnMeta]) -> String {
    keys.iter()
        .map(|k| format!("{} = ?", k.column))
        .collect::<Vec<_>>()
        .join(" and ")
}

/// Run `work` between the dialect's identity disable and enable statements.
/// Enabling is attempted even when `work` fails; the first error wins.
pub(crate) fn with_identity_insert<T>(
    conn: &mut dyn DbConnection,
    dialect: &dyn DialectStrategy,
    table: &str,
    work: impl FnOnce(&mut dyn DbConnection) -> Result<T, PortableSqlError>,
) -> Result<T, PortableSqlError> {
    if !dialect.is_identity_toggle_required() {
        return work(conn);
    }
    let disable = dialect.build_identity_disable_sql(table);
    conn.execute_raw(&disable)
        .map_err(|e| classify(e, dialect, &disable, &[]))?;
    let result = work(&mut *conn);
    let enable = dialect.build_identity_enable_sql(table);
    let restored = conn
        .execute_raw(&enable)
        .map_err(|e| classify(e, dialect, &enable, &[]));
    let value = result?;
    restored?;
    Ok(value)
}

/// Insert, update or delete one entity row.
///
/// ```rust
/// use portable_sql::prelude::*;
///
/// let member = EntityMeta::new("member")
///     .column(ColumnMeta::new("id", "member_id", DeclaredType::Integer).primary_key())
///     .column(ColumnMeta::new("name", "member_name", DeclaredType::Text));
/// let registry = ValueTypeRegistry::new();
///
/// let update = AutoCommand::update(DatabaseType::Postgres, &member, &["name"], &registry).unwrap();
/// assert_eq!(update.sql(), "update member set member_name = ? where member_id = ?");
///
/// let delete = AutoCommand::delete(DatabaseType::Postgres, &member, &registry)
///     .unwrap()
///     .with_title("purge member");
/// assert_eq!(delete.sql(), "/* purge member */ delete from member where member_id = ?");
/// ```
pub struct AutoCommand<M = RowCountMapper> {
    dialect: &'static dyn DialectStrategy,
    statement: AutoStatement,
    sql: String,
    mapper: M,
}

impl AutoCommand<RowCountMapper> {
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

    /// Update `properties` of the row identified by the primary key.
    ///
    /// # Errors
    /// Returns `PortableSqlError::ConfigError` when the table has no primary key,
    /// or `properties` is empty, unknown, or includes a key column.
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
            mapper: RowCountMapper,
        }
    }
}

impl<M> AutoCommand<M> {
    #[must_use]
    pub fn with_mapper<N: ResultMapper>(self, mapper: N) -> AutoCommand<N> {
        AutoCommand {
            dialect: self.dialect,
            statement: self.statement,
            sql: self.sql,
            mapper,
        }
    }

    /// Prefix the statement with a comment naming it.
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

    fn run_update(
        &self,
        conn: &mut dyn DbConnection,
        params: &[RowValues],
    ) -> Result<usize, PortableSqlError> {
        let mut stmt = conn.prepare(&self.sql)?;
        stmt.execute_update(params)
    }
}

impl<M> fmt::Debug for AutoCommand<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoCommand")
            .field("database_type", &self.dialect.database_type())
            .field("kind", &self.statement.kind)
            .field("sql", &self.sql)
            .finish_non_exhaustive()
    }
}

impl<'r, R, M> SqlCommand<&'r R> for AutoCommand<M>
where
    R: EntityRow + ?Sized,
    M: ResultMapper,
{
    type Output = M::Output;

    fn sql(&self) -> &str {
        &self.sql
    }

    fn execute(
        &self,
        conn: &mut dyn DbConnection,
        row: &'r R,
    ) -> Result<M::Output, PortableSqlError> {
        let fill = self.statement.kind == AutoKind::Insert;
        let (params, mut generated_key) = self.statement.bind_row(conn, self.dialect, row, fill)?;
        debug!(sql = %self.sql, params = ?params, "executing auto command");

        let result = if self.statement.identity_toggle {
            with_identity_insert(conn, self.dialect, &self.statement.table, |conn| {
                self.run_update(conn, &params)
            })
        } else {
            self.run_update(conn, &params)
        };
        let count = result.map_err(|e| classify(e, self.dialect, &self.sql, &params))?;

        if let Some(value_type) = &self.statement.identity_read_back
            && let Some(identity_sql) = self.dialect.identity_select_sql()
            && let Some(key) = query_single_value(conn, self.dialect, identity_sql)?
        {
            generated_key = Some(value_type.from_column(key)?);
        }

        self.mapper.map(
            StatementOutcome::RowCount {
                count,
                generated_key,
            },
            &self.sql,
            &params,
        )
    }
}
