use super::{DatabaseType, DialectStrategy};

/// IBM DB2.
#[derive(Debug, Clone, Copy, Default)]
pub struct Db2Dialect;

impl DialectStrategy for Db2Dialect {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Db2
    }

    fn build_sequence_next_val_sql(&self, sequence_name: &str) -> Option<String> {
        Some(format!("values nextval for {sequence_name}"))
    }

    fn identity_select_sql(&self) -> Option<&'static str> {
        Some("values identity_val_local()")
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
        error_code == -803
    }

    fn no_op_sql(&self) -> &'static str {
        "values 1"
    }
}
