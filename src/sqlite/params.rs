use rusqlite::types::Value;

use crate::error::PortableSqlError;
use crate::types::RowValues;

/// Convert a single `RowValues` to a rusqlite `Value`.
///
/// SQLite has no boolean, timestamp, JSON or array storage class: booleans
/// become 0/1, timestamps ISO text, JSON and arrays JSON text.
#[must_use]
pub fn row_value_to_sqlite_value(value: &RowValues) -> Value {
    match value {
        RowValues::Int(i) => Value::Integer(*i),
        RowValues::Float(f) => Value::Real(*f),
        RowValues::Text(s) => Value::Text(s.clone()),
        RowValues::Bool(b) => Value::Integer(i64::from(*b)),
        RowValues::Timestamp(dt) => Value::Text(dt.format("%F %T%.f").to_string()),
        RowValues::Null => Value::Null,
        RowValues::JSON(jval) => Value::Text(jval.to_string()),
        RowValues::Blob(bytes) => Value::Blob(bytes.clone()),
        RowValues::Array(_) => Value::Text(value.to_json().to_string()),
    }
}

/// Unified `SQLite` parameter container.
#[derive(Debug, Clone, Default)]
pub struct Params(pub Vec<Value>);

impl Params {
    /// Convert bound row values into `SQLite` values.
    ///
    /// # Errors
    ///
    /// Returns `PortableSqlError::ParameterError` for a nested array, which has
    /// no SQLite representation.
    pub fn convert(params: &[RowValues]) -> Result<Self, PortableSqlError> {
        let mut vec_values = Vec::with_capacity(params.len());
        for p in params {
            if let RowValues::Array(items) = p
                && items.iter().any(|item| matches!(item, RowValues::Array(_)))
            {
                return Err(PortableSqlError::ParameterError(
                    "nested arrays cannot be bound on SQLite".into(),
                ));
            }
            vec_values.push(row_value_to_sqlite_value(p));
        }
        Ok(Params(vec_values))
    }

    /// Borrow the underlying values.
    #[must_use]
    pub fn as_values(&self) -> &[Value] {
        &self.0
    }
}
