use super::{DatabaseType, DialectStrategy};

/// MySQL and MariaDB. Auto-increment columns stand in for sequences.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDialect;

impl DialectStrategy for MySqlDialect {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::MySql
    }

    fn build_sequence_next_val_sql(&self, _sequence_name: &str) -> Option<String> {
        None
    }

    fn identity_select_sql(&self) -> Option<&'static str> {
        Some("select last_insert_id()")
    }

    fn build_identity_enable_sql(&self, _table_name: &str) -> String {
        self.no_op_sql().to_string()
    }

    fn build_identity_disable_sql(&self, _table_name: &str) -> String {
        self.no_op_sql().to_string()
    }

    fn is_block_comment_supported(&self) -> bool {
        true
    }

    fn is_line_comment_supported(&self) -> bool {
        true
    }

    fn is_scrollable_cursor_supported(&self) -> bool {
        true
    }

    fn is_unique_constraint_exception(&self, _sql_state: Option<&str>, error_code: i32) -> bool {
        // ER_DUP_ENTRY, ER_DUP_ENTRY_WITH_KEY_NAME
        matches!(error_code, 1062 | 1586)
    }
}
