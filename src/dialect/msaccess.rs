use super::{DatabaseType, DialectStrategy};

/// Microsoft Access (Jet/ACE). Neither comment form survives the driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct MsAccessDialect;

impl DialectStrategy for MsAccessDialect {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::MsAccess
    }

    fn build_sequence_next_val_sql(&self, _sequence_name: &str) -> Option<String> {
        None
    }

    fn identity_select_sql(&self) -> Option<&'static str> {
        Some("select @@identity")
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

    fn is_unique_constraint_exception(&self, _sql_state: Option<&str>, error_code: i32) -> bool {
        // Jet: duplicate values in index, primary key, or relationship
        error_code == 3022
    }
}
