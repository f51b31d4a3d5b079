// SQLite backend for the connectivity traits, over rusqlite.
//
// - config: connection options and the provider
// - params: conversion of bound values into SQLite values
// - query: value extraction from SQLite rows
// - connection: connection, prepared statement and cursor

pub mod config;
pub mod connection;
pub mod params;
pub mod query;

pub use config::{SqliteConnectionProvider, SqliteOptions, SqliteOptionsBuilder};
pub use connection::{SqliteConnection, SqliteCursor, SqlitePreparedStatement};
pub use params::{Params, row_value_to_sqlite_value};
pub use query::sqlite_extract_value_sync;

use crate::error::VendorError;

impl From<rusqlite::Error> for VendorError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(failure, message) => VendorError::new(
                None,
                failure.extended_code,
                message.unwrap_or_else(|| failure.to_string()),
            ),
            other => VendorError::new(None, 0, other.to_string()),
        }
    }
}

impl From<rusqlite::Error> for crate::error::PortableSqlError {
    fn from(err: rusqlite::Error) -> Self {
        crate::error::PortableSqlError::Vendor(err.into())
    }
}
