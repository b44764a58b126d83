//! Collaborator contracts for the raw connection boundary.
//!
//! The wire protocol itself lives outside this crate; a backend integrates by
//! implementing [`Driver`] over its client library. Everything the
//! materializer and the encoders need from the backend is expressed here:
//! execute-and-fetch, literal escaping, bind-marker syntax, and the
//! prepare/execute-prepared/deallocate trio used by the prepared-statement
//! cache.

use crate::error::{DriverError, RowSqlError};
use crate::types::Value;

/// Quoting and placeholder syntax of a backend's SQL dialect.
pub trait SqlDialect {
    /// Escape the inside of a single-quoted string literal (without the
    /// surrounding quotes).
    fn escape_string(&self, input: &str) -> String;

    /// Positional bind marker for a 1-based index (`$1`, `?`, ...).
    fn bind_marker(&self, index: usize) -> String;
}

/// A synchronous raw connection.
///
/// One blocking call per logical round trip; callers sharing a driver must
/// serialize access around each send/read pair (see
/// [`Connection`](crate::Connection), which wraps the driver in a mutex).
pub trait Driver: SqlDialect {
    /// Structured result handle returned by executes.
    type Rows: RawRows;
    /// Row-at-a-time result handle; dropping it releases unread rows.
    type Stream<'a>: RawStream
    where
        Self: 'a;

    /// Identity of the physical connection, used to scope statement handles.
    fn connection_id(&self) -> u64;

    /// Execute fully rendered SQL and fetch the whole result.
    fn execute(&mut self, sql: &str) -> Result<Self::Rows, DriverError>;

    /// Execute fully rendered SQL in row-at-a-time mode.
    fn execute_stream(&mut self, sql: &str) -> Result<Self::Stream<'_>, DriverError>;

    /// Allocate a server-side prepared statement under `name`.
    fn prepare(&mut self, name: &str, sql: &str) -> Result<(), DriverError>;

    /// Execute a previously prepared statement with an ordered bind list.
    fn execute_prepared(&mut self, name: &str, binds: &[Value]) -> Result<Self::Rows, DriverError>;

    /// Release a server-side prepared statement.
    fn deallocate(&mut self, name: &str) -> Result<(), DriverError>;
}

/// Structured result boundary: column-name ordering, row count, per-cell read
/// by (row, column-index).
pub trait RawRows {
    /// Column names in result order; `None` marks an anonymous column (a
    /// computed expression without an alias).
    fn column_names(&self) -> &[Option<String>];

    /// Number of tuples fetched.
    fn row_count(&self) -> usize;

    /// Read one cell by position. Positional reads are the only access path
    /// the materializer uses.
    fn value(&self, row: usize, col: usize) -> Value;

    /// Affected-row count for DML statements.
    fn rows_affected(&self) -> u64;
}

/// Row-at-a-time result boundary used by streaming queries.
pub trait RawStream {
    /// Column names in result order, available before the first row.
    fn column_names(&self) -> &[Option<String>];

    /// Fetch the next row's cells, or `None` when the result is exhausted.
    fn next_row(&mut self) -> Result<Option<Vec<Value>>, DriverError>;
}

/// Pluggable encoder for native array literals and binds.
///
/// Without one configured, array parameters expand element-wise (an `IN (...)`
/// expansion) and empty arrays encode as `NULL`. With one configured, a whole
/// array becomes a single native token or bind value.
pub trait ArrayEncoder {
    /// Render the array as one driver-native literal token for inline SQL.
    fn encode_literal(&self, values: &[Value]) -> Result<String, RowSqlError>;

    /// Render the array as one bind value carrying a native encoding.
    fn encode_bind(&self, values: &[Value]) -> Result<Value, RowSqlError>;
}
