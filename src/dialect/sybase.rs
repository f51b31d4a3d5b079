use super::{DatabaseType, DialectStrategy};

/// Sybase ASE.
#[derive(Debug, Clone, Copy, Default)]
pub struct SybaseDialect;

impl DialectStrategy for SybaseDialect {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Sybase
    }

    fn build_sequence_next_val_sql(&self, _sequence_name: &str) -> Option<String> {
        None
    }

    fn identity_select_sql(&self) -> Option<&'static str> {
        Some("select @@identity")
    }

    fn build_identity_enable_sql(&self, table_name: &str) -> String {
        format!("set identity_insert {table_name} off")
    }

    fn build_identity_disable_sql(&self, table_name: &str) -> String {
        format!("set identity_insert {table_name} on")
    }

    fn is_identity_toggle_required(&self) -> bool {
        true
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
        matches!(error_code, 2601 | 2627)
    }
}
