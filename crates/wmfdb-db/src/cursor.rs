//! Cursors: running statements on an open connection and buffering rows.

use std::collections::{HashMap, VecDeque};
use std::marker::PhantomData;

use sqlx::mysql::{MySqlConnection, MySqlRow};
use sqlx::{Column, Row};
use tracing::debug;
use wmfdb_core::{Result, WmfdbError};

use crate::query;
use crate::value::{DecodeResult, Value, decode_column};

/// How a cursor shapes the rows it returns.
pub trait RowFormat: Send {
    type Row: Send;

    fn build(row: &MySqlRow, columns: &[String]) -> DecodeResult<Self::Row>;
}

/// Rows as positional values.
#[derive(Debug)]
pub struct Tuple;

/// Rows keyed by column name.
#[derive(Debug)]
pub struct Dict;

impl RowFormat for Tuple {
    type Row = Vec<Value>;

    fn build(row: &MySqlRow, columns: &[String]) -> DecodeResult<Self::Row> {
        (0..columns.len()).map(|i| decode_column(row, i)).collect()
    }
}

impl RowFormat for Dict {
    type Row = HashMap<String, Value>;

    fn build(row: &MySqlRow, columns: &[String]) -> DecodeResult<Self::Row> {
        columns
            .iter()
            .enumerate()
            .map(|(i, name)| Ok((name.clone(), decode_column(row, i)?)))
            .collect()
    }
}

/// What the last statement left behind: column names, unread rows and the
/// row count (`-1` until something has run).
struct ResultBuffer<R> {
    columns: Vec<String>,
    rows: VecDeque<R>,
    rowcount: i64,
}

impl<R> ResultBuffer<R> {
    const fn new() -> Self {
        Self {
            columns: Vec::new(),
            rows: VecDeque::new(),
            rowcount: -1,
        }
    }

    fn clear(&mut self) {
        self.columns.clear();
        self.rows.clear();
        self.rowcount = -1;
    }

    fn set_affected(&mut self, affected: u64) {
        self.rowcount = i64::try_from(affected).unwrap_or(i64::MAX);
    }

    fn set_rows(&mut self, columns: Vec<String>, rows: Vec<R>) -> u64 {
        let count = rows.len();
        self.columns = columns;
        self.rows = rows.into();
        self.rowcount = i64::try_from(count).unwrap_or(i64::MAX);
        u64::try_from(count).unwrap_or(u64::MAX)
    }

    fn pop(&mut self) -> Option<R> {
        self.rows.pop_front()
    }

    fn take_all(&mut self) -> Vec<R> {
        Vec::from(std::mem::take(&mut self.rows))
    }

    fn meta(&self) -> (Vec<String>, i64) {
        (self.columns.clone(), self.rowcount)
    }
}

/// A cursor over one connection.
///
/// Queries are rendered client-side (see [`Cursor::mogrify`]) and sent as
/// plain text, so what is logged is exactly what runs.
pub struct Cursor<'c, F: RowFormat> {
    conn: &'c mut MySqlConnection,
    addr: String,
    default_timeout: Option<f64>,
    result: ResultBuffer<F::Row>,
    _format: PhantomData<F>,
}

impl<'c, F: RowFormat> Cursor<'c, F> {
    pub(crate) const fn new(
        conn: &'c mut MySqlConnection,
        addr: String,
        default_timeout: Option<f64>,
    ) -> Self {
        Self {
            conn,
            addr,
            default_timeout,
            result: ResultBuffer::new(),
            _format: PhantomData,
        }
    }

    /// Address of the instance this cursor runs against.
    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub const fn default_timeout(&self) -> Option<f64> {
        self.default_timeout
    }

    /// The query text that would be sent to the server.
    pub fn mogrify(&self, query: &str, args: &[Value], timeout: Option<f64>) -> Result<String> {
        query::mogrify(
            query,
            args,
            query::resolve_timeout(self.default_timeout, timeout),
        )
    }

    /// Run a statement and return the number of affected rows.
    ///
    /// Any result set the statement produces is discarded; use
    /// [`Cursor::query`] to read rows.
    pub async fn execute(
        &mut self,
        query: &str,
        args: &[Value],
        timeout: Option<f64>,
    ) -> Result<u64> {
        let sql = self.mogrify(query, args, timeout)?;
        debug!(addr = %self.addr, query = %sql, "Executing query");
        self.result.clear();
        let done = sqlx::raw_sql(&sql)
            .execute(&mut *self.conn)
            .await
            .map_err(|e| WmfdbError::db(&self.addr, e.to_string()))?;
        let affected = done.rows_affected();
        self.result.set_affected(affected);
        Ok(affected)
    }

    /// Run a query, buffer its whole result set and return the row count.
    pub async fn query(
        &mut self,
        query: &str,
        args: &[Value],
        timeout: Option<f64>,
    ) -> Result<u64> {
        let sql = self.mogrify(query, args, timeout)?;
        debug!(addr = %self.addr, query = %sql, "Executing query");
        self.result.clear();
        let rows = sqlx::raw_sql(&sql)
            .fetch_all(&mut *self.conn)
            .await
            .map_err(|e| WmfdbError::db(&self.addr, e.to_string()))?;

        // Column names are only known from a returned row.
        let columns = rows.first().map_or_else(Vec::new, column_names);
        let built = rows
            .iter()
            .map(|row| F::build(row, &columns))
            .collect::<DecodeResult<Vec<_>>>()
            .map_err(|e| WmfdbError::db(&self.addr, e.to_string()))?;
        Ok(self.result.set_rows(columns, built))
    }

    /// Next buffered row, if any.
    pub fn fetch_one(&mut self) -> Option<F::Row> {
        self.result.pop()
    }

    /// All remaining buffered rows.
    pub fn fetch_all(&mut self) -> Vec<F::Row> {
        self.result.take_all()
    }

    /// Column names and row count of the last statement.
    ///
    /// Before anything has run this is `([], -1)`.
    pub fn result_meta(&self) -> (Vec<String>, i64) {
        self.result.meta()
    }
}

impl<F: RowFormat> std::fmt::Debug for Cursor<'_, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor")
            .field("addr", &self.addr)
            .field("default_timeout", &self.default_timeout)
            .field("columns", &self.result.columns)
            .field("buffered", &self.result.rows.len())
            .field("rowcount", &self.result.rowcount)
            .finish_non_exhaustive()
    }
}

fn column_names(row: &MySqlRow) -> Vec<String> {
    row.columns().iter().map(|c| c.name().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|c| (*c).to_string()).collect()
    }

    #[test]
    fn test_nothing_run_yet() {
        let mut buf = ResultBuffer::<Vec<Value>>::new();
        assert_eq!(buf.meta(), (vec![], -1));
        assert!(buf.pop().is_none());
        assert!(buf.take_all().is_empty());
    }

    #[test]
    fn test_rows_are_fetched_in_order() {
        let mut buf = ResultBuffer::new();
        let rows: Vec<_> = (1..=3).map(|i| vec![Value::Int(i)]).collect();
        assert_eq!(buf.set_rows(names(&["n"]), rows), 3);
        assert_eq!(buf.meta(), (names(&["n"]), 3));

        assert_eq!(buf.pop(), Some(vec![Value::Int(1)]));
        let rest = vec![vec![Value::Int(2)], vec![Value::Int(3)]];
        assert_eq!(buf.take_all(), rest);
        assert!(buf.pop().is_none());
        // Draining the rows keeps the metadata of the statement.
        assert_eq!(buf.meta(), (names(&["n"]), 3));
    }

    #[test]
    fn test_empty_result_set() {
        let mut buf = ResultBuffer::<Vec<Value>>::new();
        assert_eq!(buf.set_rows(Vec::new(), Vec::new()), 0);
        assert_eq!(buf.meta(), (vec![], 0));
    }

    #[test]
    fn test_statement_replaces_previous_result() {
        let mut buf = ResultBuffer::new();
        buf.set_rows(names(&["a", "b"]), vec![vec![Value::Null, Value::Null]]);

        buf.clear();
        buf.set_affected(7);
        assert_eq!(buf.meta(), (vec![], 7));
        assert!(buf.pop().is_none());

        buf.clear();
        assert_eq!(buf.meta(), (vec![], -1));
    }

    #[test]
    fn test_affected_count_saturates() {
        let mut buf = ResultBuffer::<Vec<Value>>::new();
        buf.set_affected(u64::MAX);
        assert_eq!(buf.meta().1, i64::MAX);
    }
}
