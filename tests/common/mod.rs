#![allow(dead_code)]

use std::collections::VecDeque;

use portable_sql::prelude::*;

/// Scripted in-memory connection recording everything it is asked to do.
#[derive(Debug, Default)]
pub struct FakeConnection {
    /// SQL passed to `prepare` or `execute_raw`, in order.
    pub log: Vec<String>,
    /// Parameters of every `execute_update` / batch row.
    pub bound: Vec<Vec<RowValues>>,
    pub calls: Vec<Vec<CallBinding>>,
    pub cursor_modes: Vec<CursorMode>,
    pub call_results: VecDeque<Result<Vec<RowValues>, VendorError>>,
    pub update_results: VecDeque<Result<usize, VendorError>>,
    /// Rows served to any cursor whose SQL contains the key.
    pub query_rows: Vec<(String, Vec<String>, Vec<Vec<RowValues>>)>,
    /// `execute_raw` fails when the SQL contains one of these.
    pub failing_raw: Vec<(String, VendorError)>,
    pub in_tx: bool,
    pub commits: usize,
    pub rollbacks: usize,
}

impl FakeConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(mut self, key: &str, columns: &[&str], rows: Vec<Vec<RowValues>>) -> Self {
        self.query_rows.push((
            key.to_string(),
            columns.iter().map(|c| c.to_string()).collect(),
            rows,
        ));
        self
    }
}

impl DbConnection for FakeConnection {
    fn prepare(&mut self, sql: &str) -> Result<Box<dyn PreparedStatement + '_>, PortableSqlError> {
        self.log.push(sql.to_string());
        Ok(Box::new(FakeStatement {
            conn: self,
            sql: sql.to_string(),
            batch: Vec::new(),
        }))
    }

    fn execute_raw(&mut self, sql: &str) -> Result<(), PortableSqlError> {
        self.log.push(sql.to_string());
        if let Some((_, err)) = self
            .failing_raw
            .iter()
            .find(|(key, _)| sql.contains(key.as_str()))
        {
            return Err(PortableSqlError::Vendor(err.clone()));
        }
        Ok(())
    }

    fn begin(&mut self) -> Result<(), PortableSqlError> {
        self.in_tx = true;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), PortableSqlError> {
        self.in_tx = false;
        self.commits += 1;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), PortableSqlError> {
        self.in_tx = false;
        self.rollbacks += 1;
        Ok(())
    }

    fn in_transaction(&self) -> bool {
        self.in_tx
    }
}

pub struct FakeStatement<'c> {
    conn: &'c mut FakeConnection,
    sql: String,
    batch: Vec<Vec<RowValues>>,
}

impl PreparedStatement for FakeStatement<'_> {
    fn execute_update(&mut self, params: &[RowValues]) -> Result<usize, PortableSqlError> {
        self.conn.bound.push(params.to_vec());
        self.conn
            .update_results
            .pop_front()
            .unwrap_or(Ok(1))
            .map_err(PortableSqlError::Vendor)
    }

    fn add_batch(&mut self, params: Vec<RowValues>) -> Result<(), PortableSqlError> {
        self.batch.push(params);
        Ok(())
    }

    fn execute_batch(&mut self) -> Result<Vec<usize>, PortableSqlError> {
        let rows = std::mem::take(&mut self.batch);
        let counts = vec![1; rows.len()];
        self.conn.bound.extend(rows);
        Ok(counts)
    }

    fn open_cursor(
        &mut self,
        _params: &[RowValues],
        mode: CursorMode,
    ) -> Result<Box<dyn Cursor + '_>, PortableSqlError> {
        self.conn.cursor_modes.push(mode);
        let (columns, rows) = self
            .conn
            .query_rows
            .iter()
            .find(|(key, _, _)| self.sql.contains(key.as_str()))
            .map(|(_, columns, rows)| (columns.clone(), rows.clone()))
            .unwrap_or_default();
        Ok(Box::new(FakeCursor {
            columns,
            rows: rows.into(),
            scrollable: mode == CursorMode::Scrollable,
        }))
    }

    fn execute_call(
        &mut self,
        bindings: &[CallBinding],
    ) -> Result<Vec<RowValues>, PortableSqlError> {
        self.conn.calls.push(bindings.to_vec());
        self.conn
            .call_results
            .pop_front()
            .unwrap_or_else(|| Ok(vec![RowValues::Null; bindings.len()]))
            .map_err(PortableSqlError::Vendor)
    }
}

pub struct FakeCursor {
    columns: Vec<String>,
    rows: VecDeque<Vec<RowValues>>,
    scrollable: bool,
}

impl Cursor for FakeCursor {
    fn column_names(&self) -> &[String] {
        &self.columns
    }

    fn fetch_row(&mut self) -> Result<Option<Vec<RowValues>>, PortableSqlError> {
        Ok(self.rows.pop_front())
    }

    fn absolute(&mut self, row: usize) -> Result<bool, PortableSqlError> {
        if !self.scrollable {
            return Err(PortableSqlError::Unimplemented("forward-only".into()));
        }
        let available = row <= self.rows.len();
        self.rows.drain(..row.min(self.rows.len()));
        Ok(available)
    }
}

pub fn int(v: i64) -> RowValues {
    RowValues::Int(v)
}

pub fn text(v: &str) -> RowValues {
    RowValues::Text(v.to_string())
}
