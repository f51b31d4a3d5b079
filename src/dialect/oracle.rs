use super::{DatabaseType, DialectStrategy};

/// Oracle Database.
#[derive(Debug, Clone, Copy, Default)]
pub struct OracleDialect;

impl DialectStrategy for OracleDialect {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Oracle
    }

    fn build_sequence_next_val_sql(&self, sequence_name: &str) -> Option<String> {
        Some(format!("select {sequence_name}.nextval from dual"))
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
        true
    }

    fn is_line_comment_supported(&self) -> bool {
        true
    }

    fn is_scrollable_cursor_supported(&self) -> bool {
        true
    }

    fn is_unique_constraint_exception(&self, _sql_state: Option<&str>, error_code: i32) -> bool {
        // ORA-00001
        error_code == 1
    }

    fn no_op_sql(&self) -> &'static str {
        "select 1 from dual"
    }
}
