use super::{DatabaseType, DialectStrategy};

/// Fallback for products nothing else matched.
///
/// Claims no optional capability, so SQL rendered through it sticks to the
/// common subset.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnknownDialect;

impl DialectStrategy for UnknownDialect {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Unknown
    }

    fn build_sequence_next_val_sql(&self, _sequence_name: &str) -> Option<String> {
        None
    }

    fn identity_select_sql(&self) -> Option<&'static str> {
        None
    }

    fn build_identity_enable_sql(&self, _table_name: &str) -> String {
        self.no_op_sql().to_string()
    }

    fn build_identity_disable_sql(&self, _table_name: &str) -> String {
        self.no_op_sql().to_string()
    }

    fn is_block_comment_supported(&self) -> bool {
        false
    }

    fn is_line_comment_supported(&self) -> bool {
        false
    }

    fn is_scrollable_cursor_supported(&self) -> bool {
        false
    }

    fn is_unique_constraint_exception(&self, _sql_state: Option<&str>, _error_code: i32) -> bool {
        false
    }
}
