use std::collections::HashMap;
use std::sync::Arc;

use super::row::{CustomDbRow, build_index};
use crate::connectivity::Cursor;
use crate::error::PortableSqlError;
use crate::types::RowValues;

/// Rows drained from a cursor, with column names shared by every row.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    /// The rows returned by the query
    pub results: Vec<CustomDbRow>,
    /// Number of rows collected
    pub rows_affected: usize,
    column_names: Option<Arc<Vec<String>>>,
    column_index: Arc<HashMap<String, usize>>,
}

impl ResultSet {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> ResultSet {
        ResultSet {
            results: Vec::with_capacity(capacity),
            ..ResultSet::default()
        }
    }

    /// Set the column names for this result set (to be shared by all rows)
    pub fn set_column_names(&mut self, column_names: Arc<Vec<String>>) {
        self.column_index = Arc::new(build_index(&column_names));
        self.column_names = Some(column_names);
    }

    #[must_use]
    pub fn get_column_names(&self) -> Option<&Arc<Vec<String>>> {
        self.column_names.as_ref()
    }

    /// Add a row to the result set. Ignored until column names are set.
    pub fn add_row_values(&mut self, row_values: Vec<RowValues>) {
        if let Some(column_names) = &self.column_names {
            self.results.push(CustomDbRow {
                column_names: Arc::clone(column_names),
                rows: row_values,
                column_index_cache: Arc::clone(&self.column_index),
            });
            self.rows_affected += 1;
        }
    }

    /// Drain up to `max_rows` rows (all when `None`) from an open cursor.
    ///
    /// # Errors
    /// Returns the cursor's error if fetching a row fails.
    pub fn from_cursor(
        cursor: &mut dyn Cursor,
        max_rows: Option<usize>,
    ) -> Result<ResultSet, PortableSqlError> {
        let mut result_set = ResultSet::with_capacity(max_rows.unwrap_or(10).min(1024));
        result_set.set_column_names(Arc::new(cursor.column_names().to_vec()));
        while max_rows.is_none_or(|max| result_set.results.len() < max) {
            match cursor.fetch_row()? {
                Some(values) => result_set.add_row_values(values),
                None => break,
            }
        }
        Ok(result_set)
    }

    /// First column of the first row, the shape of identity and sequence queries.
    #[must_use]
    pub fn first_value(&self) -> Option<&RowValues> {
        self.results.first().and_then(|row| row.get_by_index(0))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
