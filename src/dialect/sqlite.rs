use super::{DatabaseType, DialectStrategy};

/// SQLite.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl DialectStrategy for SqliteDialect {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Sqlite
    }

    fn build_sequence_next_val_sql(&self, _sequence_name: &str) -> Option<String> {
        None
    }

    fn identity_select_sql(&self) -> Option<&'static str> {
        Some("select last_insert_rowid()")
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
        false
    }

    fn is_unique_constraint_exception(&self, _sql_state: Option<&str>, error_code: i32) -> bool {
        // SQLITE_CONSTRAINT_UNIQUE, SQLITE_CONSTRAINT_PRIMARYKEY
        matches!(error_code, 2067 | 1555)
    }
}
