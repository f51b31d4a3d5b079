use super::{DatabaseType, DialectStrategy};

/// Microsoft SQL Server (2012 and later for sequences).
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServerDialect;

impl DialectStrategy for SqlServerDialect {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::SqlServer
    }

    fn build_sequence_next_val_sql(&self, sequence_name: &str) -> Option<String> {
        Some(format!("select next value for {sequence_name}"))
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
        true
    }

    fn is_unique_constraint_exception(&self, _sql_state: Option<&str>, error_code: i32) -> bool {
        // 2627: primary key / unique constraint, 2601: unique index
        matches!(error_code, 2601 | 2627)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_duplicate_keys() {
        let dialect = SqlServerDialect;
        assert!(dialect.is_unique_constraint_exception(Some("23000"), 2627));
        assert!(!dialect.is_unique_constraint_exception(Some("23000"), 547));
    }

    #[test]
    fn identity_insert_toggles() {
        let dialect = SqlServerDialect;
        assert_eq!(
            dialect.build_identity_disable_sql("MEMBER"),
            "set identity_insert MEMBER on"
        );
        assert_eq!(
            dialect.build_identity_enable_sql("MEMBER"),
            "set identity_insert MEMBER off"
        );
    }
}
