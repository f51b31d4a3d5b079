use super::{DatabaseType, DialectStrategy};

/// Firebird.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirebirdDialect;

impl DialectStrategy for FirebirdDialect {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Firebird
    }

    fn build_sequence_next_val_sql(&self, sequence_name: &str) -> Option<String> {
        Some(format!("select gen_id({sequence_name}, 1) from rdb$database"))
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
        false
    }

    fn is_unique_constraint_exception(&self, _sql_state: Option<&str>, error_code: i32) -> bool {
        // isc_unique_key_violation, isc_no_dup
        matches!(error_code, 335_544_665 | 335_544_349)
    }

    fn no_op_sql(&self) -> &'static str {
        "select 1 from rdb$database"
    }
}
