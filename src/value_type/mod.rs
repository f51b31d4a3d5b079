//! Converters between caller values and bind/column values of a declared type.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use crate::error::PortableSqlError;
use crate::types::{DeclaredType, RowValues};

/// Moves a value of one declared type across the bind/column boundary.
pub trait ValueType: Debug + Send + Sync {
    fn declared_type(&self) -> DeclaredType;

    /// Value to hand to the placeholder.
    ///
    /// # Errors
    /// Returns `PortableSqlError::ParameterError` if `value` cannot represent the declared type.
    fn to_bind(&self, value: &RowValues) -> Result<RowValues, PortableSqlError>;

    /// Value read back from a result column or OUT parameter.
    ///
    /// # Errors
    /// Returns `PortableSqlError::ParameterError` if the database value does not fit the declared type.
    fn from_column(&self, value: RowValues) -> Result<RowValues, PortableSqlError>;
}

fn mismatch(expected: DeclaredType, value: &RowValues) -> PortableSqlError {
    PortableSqlError::ParameterError(format!("cannot convert {value:?} to {expected}"))
}

/// Whole floats in `[-2^63, 2^63)` convert to `i64` without saturating.
const I64_MIN_F64: f64 = -9.223_372_036_854_775_808e18;
const I64_END_F64: f64 = 9.223_372_036_854_775_808e18;

#[derive(Debug, Clone, Copy)]
pub struct IntegerType;

impl IntegerType {
    fn convert(value: &RowValues) -> Result<RowValues, PortableSqlError> {
        match value {
            RowValues::Null | RowValues::Int(_) => Ok(value.clone()),
            RowValues::Bool(b) => Ok(RowValues::Int(i64::from(*b))),
            RowValues::Text(s) => s
                .trim()
                .parse::<i64>()
                .map(RowValues::Int)
                .map_err(|_| mismatch(DeclaredType::Integer, value)),
            #[allow(clippy::cast_possible_truncation)]
            RowValues::Float(f) if f.fract() == 0.0 && (I64_MIN_F64..I64_END_F64).contains(f) => {
                Ok(RowValues::Int(*f as i64))
            }
            other => Err(mismatch(DeclaredType::Integer, other)),
        }
    }
}

impl ValueType for IntegerType {
    fn declared_type(&self) -> DeclaredType {
        DeclaredType::Integer
    }

    fn to_bind(&self, value: &RowValues) -> Result<RowValues, PortableSqlError> {
        Self::convert(value)
    }

    fn from_column(&self, value: RowValues) -> Result<RowValues, PortableSqlError> {
        Self::convert(&value)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FloatType;

impl FloatType {
    fn convert(value: &RowValues) -> Result<RowValues, PortableSqlError> {
        match value {
            RowValues::Null | RowValues::Float(_) => Ok(value.clone()),
            #[allow(clippy::cast_precision_loss)]
            RowValues::Int(i) => Ok(RowValues::Float(*i as f64)),
            RowValues::Text(s) => s
                .trim()
                .parse::<f64>()
                .map(RowValues::Float)
                .map_err(|_| mismatch(DeclaredType::Float, value)),
            other => Err(mismatch(DeclaredType::Float, other)),
        }
    }
}

impl ValueType for FloatType {
    fn declared_type(&self) -> DeclaredType {
        DeclaredType::Float
    }

    fn to_bind(&self, value: &RowValues) -> Result<RowValues, PortableSqlError> {
        Self::convert(value)
    }

    fn from_column(&self, value: RowValues) -> Result<RowValues, PortableSqlError> {
        Self::convert(&value)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TextType;

impl ValueType for TextType {
    fn declared_type(&self) -> DeclaredType {
        DeclaredType::Text
    }

    fn to_bind(&self, value: &RowValues) -> Result<RowValues, PortableSqlError> {
        match value {
            RowValues::Null | RowValues::Text(_) => Ok(value.clone()),
            RowValues::Int(i) => Ok(RowValues::Text(i.to_string())),
            RowValues::Float(f) => Ok(RowValues::Text(f.to_string())),
            RowValues::Bool(b) => Ok(RowValues::Text(b.to_string())),
            RowValues::Timestamp(dt) => Ok(RowValues::Text(dt.format("%F %T%.f").to_string())),
            RowValues::JSON(json) => Ok(RowValues::Text(json.to_string())),
            other => Err(mismatch(DeclaredType::Text, other)),
        }
    }

    fn from_column(&self, value: RowValues) -> Result<RowValues, PortableSqlError> {
        self.to_bind(&value)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BooleanType;

impl BooleanType {
    fn convert(value: &RowValues) -> Result<RowValues, PortableSqlError> {
        if value.is_null() {
            return Ok(RowValues::Null);
        }
        if let Some(b) = value.as_bool() {
            return Ok(RowValues::Bool(b));
        }
        match value.as_text().map(|s| s.trim().to_ascii_lowercase()) {
            Some(s) if matches!(s.as_str(), "true" | "t" | "1" | "y") => Ok(RowValues::Bool(true)),
            Some(s) if matches!(s.as_str(), "false" | "f" | "0" | "n") => {
                Ok(RowValues::Bool(false))
            }
            _ => Err(mismatch(DeclaredType::Boolean, value)),
        }
    }
}

impl ValueType for BooleanType {
    fn declared_type(&self) -> DeclaredType {
        DeclaredType::Boolean
    }

    fn to_bind(&self, value: &RowValues) -> Result<RowValues, PortableSqlError> {
        Self::convert(value)
    }

    fn from_column(&self, value: RowValues) -> Result<RowValues, PortableSqlError> {
        Self::convert(&value)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TimestampType;

impl TimestampType {
    fn convert(value: &RowValues) -> Result<RowValues, PortableSqlError> {
        if value.is_null() {
            return Ok(RowValues::Null);
        }
        value
            .as_timestamp()
            .map(RowValues::Timestamp)
            .ok_or_else(|| mismatch(DeclaredType::Timestamp, value))
    }
}

impl ValueType for TimestampType {
    fn declared_type(&self) -> DeclaredType {
        DeclaredType::Timestamp
    }

    fn to_bind(&self, value: &RowValues) -> Result<RowValues, PortableSqlError> {
        Self::convert(value)
    }

    fn from_column(&self, value: RowValues) -> Result<RowValues, PortableSqlError> {
        Self::convert(&value)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct JsonType;

impl ValueType for JsonType {
    fn declared_type(&self) -> DeclaredType {
        DeclaredType::Json
    }

    fn to_bind(&self, value: &RowValues) -> Result<RowValues, PortableSqlError> {
        match value {
            RowValues::Null | RowValues::JSON(_) => Ok(value.clone()),
            RowValues::Text(s) => serde_json::from_str(s)
                .map(RowValues::JSON)
                .map_err(|e| PortableSqlError::ParameterError(format!("invalid JSON text: {e}"))),
            other => Ok(RowValues::JSON(other.to_json())),
        }
    }

    fn from_column(&self, value: RowValues) -> Result<RowValues, PortableSqlError> {
        self.to_bind(&value)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BlobType;

impl ValueType for BlobType {
    fn declared_type(&self) -> DeclaredType {
        DeclaredType::Blob
    }

    fn to_bind(&self, value: &RowValues) -> Result<RowValues, PortableSqlError> {
        match value {
            RowValues::Null | RowValues::Blob(_) => Ok(value.clone()),
            RowValues::Text(s) => Ok(RowValues::Blob(s.as_bytes().to_vec())),
            other => Err(mismatch(DeclaredType::Blob, other)),
        }
    }

    fn from_column(&self, value: RowValues) -> Result<RowValues, PortableSqlError> {
        self.to_bind(&value)
    }
}

/// Multi-valued binding; every element goes through the element converter.
#[derive(Debug, Clone)]
pub struct ArrayType {
    element: Arc<dyn ValueType>,
}

impl ArrayType {
    #[must_use]
    pub fn new(element: Arc<dyn ValueType>) -> Self {
        Self { element }
    }

    #[must_use]
    pub fn element_type(&self) -> DeclaredType {
        self.element.declared_type()
    }
}

impl ValueType for ArrayType {
    fn declared_type(&self) -> DeclaredType {
        DeclaredType::Array
    }

    fn to_bind(&self, value: &RowValues) -> Result<RowValues, PortableSqlError> {
        match value {
            RowValues::Null => Ok(RowValues::Null),
            RowValues::Array(items) => items
                .iter()
                .map(|item| self.element.to_bind(item))
                .collect::<Result<Vec<_>, _>>()
                .map(RowValues::Array),
            // a JSON array read back from a backend without native arrays
            RowValues::Text(_) | RowValues::JSON(_) => self.from_column(value.clone()),
            other => Err(mismatch(DeclaredType::Array, other)),
        }
    }

    fn from_column(&self, value: RowValues) -> Result<RowValues, PortableSqlError> {
        let json = match value {
            RowValues::Text(s) => serde_json::from_str::<serde_json::Value>(&s)
                .map_err(|e| PortableSqlError::ParameterError(format!("invalid array text: {e}")))?,
            RowValues::JSON(json) => json,
            other => return self.to_bind(&other),
        };
        let items = match json {
            serde_json::Value::Array(items) => items,
            other => {
                return Err(PortableSqlError::ParameterError(format!(
                    "expected a JSON array, got {other}"
                )));
            }
        };
        items
            .into_iter()
            .map(|item| self.element.from_column(json_to_row_value(item)))
            .collect::<Result<Vec<_>, _>>()
            .map(RowValues::Array)
    }
}

fn json_to_row_value(json: serde_json::Value) -> RowValues {
    match json {
        serde_json::Value::Null => RowValues::Null,
        serde_json::Value::Bool(b) => RowValues::Bool(b),
        serde_json::Value::Number(n) => n
            .as_i64()
            .map(RowValues::Int)
            .or_else(|| n.as_f64().map(RowValues::Float))
            .unwrap_or(RowValues::Null),
        serde_json::Value::String(s) => RowValues::Text(s),
        other => RowValues::JSON(other),
    }
}

/// Declared type → converter lookup, seeded with the built-ins.
///
/// Registering a converter for a declared type replaces the built-in for every
/// parameter resolved afterwards.
#[derive(Debug, Clone)]
pub struct ValueTypeRegistry {
    converters: HashMap<DeclaredType, Arc<dyn ValueType>>,
}

impl Default for ValueTypeRegistry {
    fn default() -> Self {
        let mut converters: HashMap<DeclaredType, Arc<dyn ValueType>> = HashMap::new();
        converters.insert(DeclaredType::Integer, Arc::new(IntegerType));
        converters.insert(DeclaredType::Float, Arc::new(FloatType));
        converters.insert(DeclaredType::Text, Arc::new(TextType));
        converters.insert(DeclaredType::Boolean, Arc::new(BooleanType));
        converters.insert(DeclaredType::Timestamp, Arc::new(TimestampType));
        converters.insert(DeclaredType::Json, Arc::new(JsonType));
        converters.insert(DeclaredType::Blob, Arc::new(BlobType));
        Self { converters }
    }
}

impl ValueTypeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, converter: Arc<dyn ValueType>) {
        self.converters.insert(converter.declared_type(), converter);
    }

    /// Converter for `declared`, with `element` required for arrays.
    ///
    /// # Errors
    /// Returns `PortableSqlError::ConfigError` for an array without an element type,
    /// nested arrays, or a type with no registered converter.
    pub fn resolve(
        &self,
        declared: DeclaredType,
        element: Option<DeclaredType>,
    ) -> Result<Arc<dyn ValueType>, PortableSqlError> {
        if declared == DeclaredType::Array {
            let element = element.ok_or_else(|| {
                PortableSqlError::ConfigError("array type requires an element type".into())
            })?;
            if element == DeclaredType::Array {
                return Err(PortableSqlError::ConfigError(
                    "nested array types are not supported".into(),
                ));
            }
            if let Some(custom) = self.converters.get(&DeclaredType::Array) {
                return Ok(Arc::clone(custom));
            }
            let element = self.resolve(element, None)?;
            return Ok(Arc::new(ArrayType::new(element)));
        }
        self.converters.get(&declared).cloned().ok_or_else(|| {
            PortableSqlError::ConfigError(format!("no value type registered for {declared}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_accepts_numeric_text_and_rejects_words() {
        let registry = ValueTypeRegistry::new();
        let int = registry.resolve(DeclaredType::Integer, None).unwrap();
        assert_eq!(int.to_bind(&RowValues::Text(" 42 ".into())).unwrap(), RowValues::Int(42));
        assert_eq!(int.to_bind(&RowValues::Bool(true)).unwrap(), RowValues::Int(1));
        assert!(matches!(
            int.to_bind(&RowValues::Text("forty-two".into())),
            Err(PortableSqlError::ParameterError(_))
        ));
    }

    #[test]
    fn integer_rejects_floats_outside_i64() {
        let registry = ValueTypeRegistry::new();
        let int = registry.resolve(DeclaredType::Integer, None).unwrap();
        assert_eq!(int.to_bind(&RowValues::Float(-3.0)).unwrap(), RowValues::Int(-3));
        assert_eq!(
            int.to_bind(&RowValues::Float(-9.223_372_036_854_775_808e18)).unwrap(),
            RowValues::Int(i64::MIN)
        );
        for value in [1e30, -1e30, 9.223_372_036_854_775_808e18, f64::INFINITY, 2.5] {
            assert!(
                matches!(
                    int.to_bind(&RowValues::Float(value)),
                    Err(PortableSqlError::ParameterError(_))
                ),
                "{value} should not coerce"
            );
        }
    }

    #[test]
    fn null_passes_through_every_scalar_type() {
        let registry = ValueTypeRegistry::new();
        for declared in [
            DeclaredType::Integer,
            DeclaredType::Float,
            DeclaredType::Text,
            DeclaredType::Boolean,
            DeclaredType::Timestamp,
            DeclaredType::Json,
            DeclaredType::Blob,
        ] {
            let converter = registry.resolve(declared, None).unwrap();
            assert_eq!(converter.to_bind(&RowValues::Null).unwrap(), RowValues::Null);
        }
    }

    #[test]
    fn boolean_reads_integer_columns() {
        let boolean = BooleanType;
        assert_eq!(boolean.from_column(RowValues::Int(0)).unwrap(), RowValues::Bool(false));
        assert!(boolean.from_column(RowValues::Int(7)).is_err());
    }

    #[test]
    fn array_requires_element_type() {
        let registry = ValueTypeRegistry::new();
        assert!(matches!(
            registry.resolve(DeclaredType::Array, None),
            Err(PortableSqlError::ConfigError(_))
        ));
    }

    #[test]
    fn array_converts_each_element() {
        let registry = ValueTypeRegistry::new();
        let array = registry
            .resolve(DeclaredType::Array, Some(DeclaredType::Integer))
            .unwrap();
        let bound = array
            .to_bind(&RowValues::Array(vec![RowValues::Text("1".into()), RowValues::Int(2)]))
            .unwrap();
        assert_eq!(bound, RowValues::Array(vec![RowValues::Int(1), RowValues::Int(2)]));

        let bad = array.to_bind(&RowValues::Array(vec![RowValues::Text("x".into())]));
        assert!(bad.is_err());
    }

    #[test]
    fn array_reads_json_text_columns() {
        let array = ArrayType::new(Arc::new(TextType));
        let read = array.from_column(RowValues::Text(r#"["a","b"]"#.into())).unwrap();
        assert_eq!(
            read,
            RowValues::Array(vec![RowValues::Text("a".into()), RowValues::Text("b".into())])
        );
    }

    #[test]
    fn registered_converter_overrides_builtin() {
        #[derive(Debug)]
        struct Upper;
        impl ValueType for Upper {
            fn declared_type(&self) -> DeclaredType {
                DeclaredType::Text
            }
            fn to_bind(&self, value: &RowValues) -> Result<RowValues, PortableSqlError> {
                Ok(RowValues::Text(value.as_text().unwrap_or_default().to_uppercase()))
            }
            fn from_column(&self, value: RowValues) -> Result<RowValues, PortableSqlError> {
                Ok(value)
            }
        }

        let mut registry = ValueTypeRegistry::new();
        registry.register(Arc::new(Upper));
        let text = registry.resolve(DeclaredType::Text, None).unwrap();
        assert_eq!(
            text.to_bind(&RowValues::Text("abc".into())).unwrap(),
            RowValues::Text("ABC".into())
        );
    }
}
