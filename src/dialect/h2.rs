use super::{DatabaseType, DialectStrategy};

/// H2 Database Engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct H2Dialect;

impl DialectStrategy for H2Dialect {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::H2
    }

    fn build_sequence_next_val_sql(&self, sequence_name: &str) -> Option<String> {
        Some(format!("select next value for {sequence_name}"))
    }

    fn identity_select_sql(&self) -> Option<&'static str> {
        Some("select identity()")
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
        // DUPLICATE_KEY_1 (23505 since 1.4, 23001 before)
        matches!(error_code, 23505 | 23001)
    }
}
