use std::fmt;

use thiserror::Error;

use crate::types::RowValues;

/// A failure reported by the backing database, in the vendor's own terms.
///
/// The connectivity layer only knows the SQLSTATE (when the driver exposes one)
/// and the vendor's numeric code; interpreting them is the job of a
/// [`DialectStrategy`](crate::dialect::DialectStrategy).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorError {
    pub sql_state: Option<String>,
    pub error_code: i32,
    pub message: String,
}

impl VendorError {
    #[must_use]
    pub fn new(sql_state: Option<String>, error_code: i32, message: impl Into<String>) -> Self {
        Self {
            sql_state,
            error_code,
            message: message.into(),
        }
    }
}

impl fmt::Display for VendorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sql_state {
            Some(state) => write!(
                f,
                "{} (SQLSTATE {state}, code {})",
                self.message, self.error_code
            ),
            None => write!(f, "{} (code {})", self.message, self.error_code),
        }
    }
}

impl std::error::Error for VendorError {}

#[derive(Debug, Error)]
pub enum PortableSqlError {
    /// Raw backend failure, not yet attributed to a statement.
    #[error(transparent)]
    Vendor(#[from] VendorError),

    #[error("Entity already exists: {source}\nSQL: {sql}\nParams: {params:?}")]
    EntityAlreadyExists {
        sql: String,
        params: Vec<RowValues>,
        source: VendorError,
    },

    #[error("SQL failure: {source}\nSQL: {sql}\nParams: {params:?}")]
    SqlFailure {
        sql: String,
        params: Vec<RowValues>,
        source: VendorError,
    },

    #[error("Entity already deleted (no row affected)\nSQL: {sql}\nParams: {params:?}")]
    EntityAlreadyDeleted { sql: String, params: Vec<RowValues> },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parameter conversion error: {0}")]
    ParameterError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    #[error("Unimplemented feature: {0}")]
    Unimplemented(String),

    #[error("Cannot read script {source_name}: {message}")]
    ScriptSource {
        source_name: String,
        message: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PortableSqlError {
    /// The vendor error behind this failure, if the backend raised one.
    #[must_use]
    pub fn vendor_error(&self) -> Option<&VendorError> {
        match self {
            PortableSqlError::Vendor(source)
            | PortableSqlError::EntityAlreadyExists { source, .. }
            | PortableSqlError::SqlFailure { source, .. } => Some(source),
            _ => None,
        }
    }

    /// The SQL text this failure is attached to, if any.
    #[must_use]
    pub fn sql(&self) -> Option<&str> {
        match self {
            PortableSqlError::EntityAlreadyExists { sql, .. }
            | PortableSqlError::SqlFailure { sql, .. }
            | PortableSqlError::EntityAlreadyDeleted { sql, .. } => Some(sql),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, PortableSqlError::EntityAlreadyExists { .. })
    }
}
