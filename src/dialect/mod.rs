//! Per-product SQL and error-code variance.
//!
//! Nothing outside this module branches on a database product: callers hold a
//! `&'static dyn DialectStrategy` (usually from [`DatabaseType::dialect`]) and
//! ask it. Supporting a new product means adding a unit struct here and a
//! [`DatabaseType`] variant.

mod db2;
mod derby;
mod firebird;
mod h2;
mod msaccess;
mod mysql;
mod oracle;
mod postgres;
mod sqlite;
mod sqlserver;
mod sybase;
mod unknown;

pub use db2::Db2Dialect;
pub use derby::DerbyDialect;
pub use firebird::FirebirdDialect;
pub use h2::H2Dialect;
pub use msaccess::MsAccessDialect;
pub use mysql::MySqlDialect;
pub use oracle::OracleDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;
pub use sqlserver::SqlServerDialect;
pub use sybase::SybaseDialect;
pub use unknown::UnknownDialect;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// The database products this crate renders SQL for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    #[value(name = "mysql")]
    MySql,
    Postgres,
    Oracle,
    Db2,
    #[value(name = "sqlserver")]
    SqlServer,
    H2,
    Derby,
    Sqlite,
    #[value(name = "msaccess")]
    MsAccess,
    Firebird,
    Sybase,
    /// Anything unrecognized; answers every capability conservatively.
    Unknown,
}

impl DatabaseType {
    #[must_use]
    pub fn dialect(self) -> &'static dyn DialectStrategy {
        match self {
            DatabaseType::MySql => &MySqlDialect,
            DatabaseType::Postgres => &PostgresDialect,
            DatabaseType::Oracle => &OracleDialect,
            DatabaseType::Db2 => &Db2Dialect,
            DatabaseType::SqlServer => &SqlServerDialect,
            DatabaseType::H2 => &H2Dialect,
            DatabaseType::Derby => &DerbyDialect,
            DatabaseType::Sqlite => &SqliteDialect,
            DatabaseType::MsAccess => &MsAccessDialect,
            DatabaseType::Firebird => &FirebirdDialect,
            DatabaseType::Sybase => &SybaseDialect,
            DatabaseType::Unknown => &UnknownDialect,
        }
    }

    /// Guess the product from a connection URL such as
    /// `jdbc:postgresql://host/db`, `postgres://...` or `sqlite:app.db`.
    #[must_use]
    pub fn from_url(url: &str) -> Self {
        let lower = url.trim().to_ascii_lowercase();
        let scheme = lower.strip_prefix("jdbc:").unwrap_or(&lower);
        let prefixes: [(&str, DatabaseType); 13] = [
            ("mysql", DatabaseType::MySql),
            ("mariadb", DatabaseType::MySql),
            ("postgres", DatabaseType::Postgres),
            ("oracle", DatabaseType::Oracle),
            ("db2", DatabaseType::Db2),
            ("sqlserver", DatabaseType::SqlServer),
            ("mssql", DatabaseType::SqlServer),
            ("h2", DatabaseType::H2),
            ("derby", DatabaseType::Derby),
            ("sqlite", DatabaseType::Sqlite),
            ("ucanaccess", DatabaseType::MsAccess),
            ("firebird", DatabaseType::Firebird),
            ("sybase", DatabaseType::Sybase),
        ];
        prefixes
            .iter()
            .find(|(prefix, _)| scheme.starts_with(prefix))
            .map_or(DatabaseType::Unknown, |(_, db_type)| *db_type)
    }

    /// Every supported product, in declaration order.
    #[must_use]
    pub fn all() -> &'static [DatabaseType] {
        &[
            DatabaseType::MySql,
            DatabaseType::Postgres,
            DatabaseType::Oracle,
            DatabaseType::Db2,
            DatabaseType::SqlServer,
            DatabaseType::H2,
            DatabaseType::Derby,
            DatabaseType::Sqlite,
            DatabaseType::MsAccess,
            DatabaseType::Firebird,
            DatabaseType::Sybase,
            DatabaseType::Unknown,
        ]
    }
}

/// SQL-text and error-semantics variance of one database product.
///
/// Implementations are stateless; every method is a pure function of its
/// arguments.
pub trait DialectStrategy: Send + Sync {
    fn database_type(&self) -> DatabaseType;

    /// SQL that fetches the next value of `sequence_name`, or `None` when the
    /// product has no sequences.
    fn build_sequence_next_val_sql(&self, sequence_name: &str) -> Option<String>;

    /// SQL reading the identity value last generated on this connection, or
    /// `None` when the product has no such function.
    fn identity_select_sql(&self) -> Option<&'static str>;

    /// Turn identity generation back on for `table_name` after explicit
    /// identity inserts.
    fn build_identity_enable_sql(&self, table_name: &str) -> String;

    /// Allow explicit values in `table_name`'s identity column.
    fn build_identity_disable_sql(&self, table_name: &str) -> String;

    fn is_block_comment_supported(&self) -> bool;

    fn is_line_comment_supported(&self) -> bool;

    fn is_scrollable_cursor_supported(&self) -> bool;

    /// Whether the vendor error identified by `sql_state` / `error_code` is a
    /// uniqueness violation. Unknown pairs are `false`.
    fn is_unique_constraint_exception(&self, sql_state: Option<&str>, error_code: i32) -> bool;

    /// Whether explicit identity values need the disable/enable statements
    /// around them. Products answering `false` return [`no_op_sql`](Self::no_op_sql)
    /// from both builders.
    fn is_identity_toggle_required(&self) -> bool {
        false
    }

    /// A statement that does nothing and is valid on this product.
    fn no_op_sql(&self) -> &'static str {
        "select 1"
    }
}
