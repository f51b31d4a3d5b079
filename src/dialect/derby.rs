use super::{DatabaseType, DialectStrategy};

/// Apache Derby.
#[derive(Debug, Clone, Copy, Default)]
pub struct DerbyDialect;

impl DialectStrategy for DerbyDialect {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Derby
    }

    fn build_sequence_next_val_sql(&self, sequence_name: &str) -> Option<String> {
        Some(format!("values next value for {sequence_name}"))
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

    fn is_unique_constraint_exception(&self, sql_state: Option<&str>, _error_code: i32) -> bool {
        sql_state == Some("23505")
    }

    fn no_op_sql(&self) -> &'static str {
        "values 1"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_duplicate_keys() {
        let dialect = DerbyDialect;
        assert!(dialect.is_unique_constraint_exception(Some("23505"), 20000));
        assert!(!dialect.is_unique_constraint_exception(Some("23503"), 20000));
    }
}
