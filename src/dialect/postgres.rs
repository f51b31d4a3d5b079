use super::{DatabaseType, DialectStrategy};

/// PostgreSQL.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl DialectStrategy for PostgresDialect {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Postgres
    }

    fn build_sequence_next_val_sql(&self, sequence_name: &str) -> Option<String> {
        Some(format!("select nextval('{sequence_name}')"))
    }

    fn identity_select_sql(&self) -> Option<&'static str> {
        Some("select lastval()")
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

    fn is_unique_constraint_exception(&self, sql_state: Option<&str>, _error_code: i32) -> bool {
        // unique_violation
        sql_state == Some("23505")
    }
}
