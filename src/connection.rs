use std::fmt;
use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::decorator::Decorator;
use crate::driver::{ArrayEncoder, Driver, RawRows, RawStream};
use crate::encoder::{InlineEncoder, PreparedBinder};
use crate::error::RowSqlError;
use crate::materializer::MaterializerCache;
use crate::params::Params;
use crate::prepared_cache::PreparedCache;
use crate::results::{Row, normalize_columns};
use crate::types::Value;
use crate::{materializer, prepared_cache};

/// How a call's parameters reach the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrepareMode {
    /// Inline/literal mode: placeholders become quoted literals in the SQL
    /// text.
    #[default]
    Direct,
    /// Prepared/bind mode: placeholders become native bind markers and the
    /// statement is cached server-side.
    Prepared,
}

/// Cache sizes and optional array encoding for one connection.
#[derive(Clone)]
pub struct ConnectionConfig {
    /// Bound on distinct cached column shapes.
    pub materializer_cache_size: usize,
    /// Bound on distinct server-side prepared statements.
    pub prepared_cache_size: usize,
    /// Native array encoding; `None` means element-wise expansion and
    /// empty-array-as-NULL.
    pub array_encoder: Option<Arc<dyn ArrayEncoder + Send + Sync>>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            materializer_cache_size: materializer::DEFAULT_MAX_SIZE,
            prepared_cache_size: prepared_cache::DEFAULT_MAX_SIZE,
            array_encoder: None,
        }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("materializer_cache_size", &self.materializer_cache_size)
            .field("prepared_cache_size", &self.prepared_cache_size)
            .field("array_encoder", &self.array_encoder.is_some())
            .finish()
    }
}

/// Query façade over one raw driver connection.
///
/// The driver sits behind a mutex so concurrent logical callers serialize
/// around each send/read pair; interleaving two in-flight queries on one
/// physical connection corrupts protocol framing. The shape cache and the
/// prepared-statement cache are connection-scoped and mutex-guarded so their
/// lookup-insert-evict sequences stay atomic.
///
/// ```rust
/// use rowsql::{Connection, Params};
/// use rowsql::test_utils::{MockDriver, MockRows};
/// use rowsql::Value;
///
/// let driver = MockDriver::new();
/// driver.push_result(MockRows::new(&["id", "name"], vec![
///     vec![Value::Int(1), Value::Text("alice".into())],
/// ]));
/// let conn = Connection::new(driver);
/// let rows = conn.query("select id, name from users where id = ?",
///     &Params::positional([Value::Int(1)])).unwrap();
/// assert_eq!(rows[0].get("name"), Some(&Value::Text("alice".into())));
/// ```
pub struct Connection<D: Driver> {
    driver: Mutex<D>,
    materializers: Mutex<MaterializerCache>,
    prepared: Mutex<PreparedCache>,
    array_encoder: Option<Arc<dyn ArrayEncoder + Send + Sync>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl<D: Driver> Connection<D> {
    pub fn new(driver: D) -> Self {
        Self::with_config(driver, ConnectionConfig::default())
    }

    pub fn with_config(driver: D, config: ConnectionConfig) -> Self {
        Self {
            driver: Mutex::new(driver),
            materializers: Mutex::new(MaterializerCache::new(config.materializer_cache_size)),
            prepared: Mutex::new(PreparedCache::new(config.prepared_cache_size)),
            array_encoder: config.array_encoder,
        }
    }

    /// Run a query and materialize every row.
    ///
    /// # Errors
    /// Encoding failures and driver failures; driver errors propagate
    /// unchanged.
    pub fn query(&self, sql: &str, params: &Params) -> Result<Vec<Row>, RowSqlError> {
        self.query_with(sql, params, PrepareMode::Direct)
    }

    pub fn query_with(
        &self,
        sql: &str,
        params: &Params,
        mode: PrepareMode,
    ) -> Result<Vec<Row>, RowSqlError> {
        self.run(sql, params, mode, None)
    }

    /// Run a query and materialize rows with a decorator's operations
    /// attached. Rows from plain [`Connection::query`] calls on the same
    /// shape are unaffected.
    pub fn query_decorator(
        &self,
        decorator: &Arc<Decorator>,
        sql: &str,
        params: &Params,
    ) -> Result<Vec<Row>, RowSqlError> {
        self.query_decorator_with(decorator, sql, params, PrepareMode::Direct)
    }

    pub fn query_decorator_with(
        &self,
        decorator: &Arc<Decorator>,
        sql: &str,
        params: &Params,
        mode: PrepareMode,
    ) -> Result<Vec<Row>, RowSqlError> {
        self.run(sql, params, mode, Some(decorator))
    }

    /// Run a query and return all cells as one flat list in row-major order.
    pub fn query_single(&self, sql: &str, params: &Params) -> Result<Vec<Value>, RowSqlError> {
        self.query_single_with(sql, params, PrepareMode::Direct)
    }

    pub fn query_single_with(
        &self,
        sql: &str,
        params: &Params,
        mode: PrepareMode,
    ) -> Result<Vec<Value>, RowSqlError> {
        let mut driver = lock(&self.driver);
        let rows = self.execute_raw(&mut driver, sql, params, mode)?;
        let cols = rows.column_names().len();
        let mut out = Vec::with_capacity(rows.row_count() * cols);
        for r in 0..rows.row_count() {
            for c in 0..cols {
                out.push(rows.value(r, c));
            }
        }
        Ok(out)
    }

    /// Run a query and return rows as plain value tuples (no shape cache
    /// interaction).
    pub fn query_array(&self, sql: &str, params: &Params) -> Result<Vec<Vec<Value>>, RowSqlError> {
        self.query_array_with(sql, params, PrepareMode::Direct)
    }

    pub fn query_array_with(
        &self,
        sql: &str,
        params: &Params,
        mode: PrepareMode,
    ) -> Result<Vec<Vec<Value>>, RowSqlError> {
        let mut driver = lock(&self.driver);
        let rows = self.execute_raw(&mut driver, sql, params, mode)?;
        let cols = rows.column_names().len();
        Ok((0..rows.row_count())
            .map(|r| (0..cols).map(|c| rows.value(r, c)).collect())
            .collect())
    }

    /// Run a query and return each row as ordered (name, value) pairs.
    pub fn query_hash(
        &self,
        sql: &str,
        params: &Params,
    ) -> Result<Vec<Vec<(String, Value)>>, RowSqlError> {
        self.query_hash_with(sql, params, PrepareMode::Direct)
    }

    pub fn query_hash_with(
        &self,
        sql: &str,
        params: &Params,
        mode: PrepareMode,
    ) -> Result<Vec<Vec<(String, Value)>>, RowSqlError> {
        let mut driver = lock(&self.driver);
        let rows = self.execute_raw(&mut driver, sql, params, mode)?;
        let names = normalize_columns(rows.column_names());
        Ok((0..rows.row_count())
            .map(|r| {
                names
                    .iter()
                    .enumerate()
                    .map(|(c, name)| (name.clone(), rows.value(r, c)))
                    .collect()
            })
            .collect())
    }

    /// Run a DML statement and return the affected-row count.
    pub fn exec(&self, sql: &str, params: &Params) -> Result<u64, RowSqlError> {
        self.exec_with(sql, params, PrepareMode::Direct)
    }

    pub fn exec_with(
        &self,
        sql: &str,
        params: &Params,
        mode: PrepareMode,
    ) -> Result<u64, RowSqlError> {
        let mut driver = lock(&self.driver);
        let rows = self.execute_raw(&mut driver, sql, params, mode)?;
        Ok(rows.rows_affected())
    }

    /// Run a query row-at-a-time, invoking `f` per materialized row.
    ///
    /// Returning `ControlFlow::Break` stops early without error; dropping
    /// the underlying stream releases server-side resources for the unread
    /// remainder. Streaming always runs in inline mode and holds the
    /// connection's exclusion for the whole iteration.
    pub fn query_each<F>(&self, sql: &str, params: &Params, mut f: F) -> Result<(), RowSqlError>
    where
        F: FnMut(Row) -> ControlFlow<()>,
    {
        let mut driver = lock(&self.driver);
        let encoded =
            InlineEncoder::with_array_encoder(&*driver, self.array_encoder()).encode(sql, params)?;
        let mut stream = driver.execute_stream(&encoded)?;
        let shape = lock(&self.materializers).shape_for(stream.column_names());
        while let Some(values) = stream.next_row()? {
            if let ControlFlow::Break(()) = f(shape.row_from_values(values)) {
                break;
            }
        }
        Ok(())
    }

    /// Scoped prepared-mode view: calls made through it run with
    /// [`PrepareMode::Prepared`]. This is explicit context propagation, not
    /// an ambient flag; the underlying connection is unaffected.
    pub fn prepared(&self) -> PreparedConnection<'_, D> {
        PreparedConnection { conn: self }
    }

    /// Driver escape primitive passthrough.
    pub fn escape_string(&self, input: &str) -> String {
        lock(&self.driver).escape_string(input)
    }

    fn array_encoder(&self) -> Option<&dyn ArrayEncoder> {
        self.array_encoder
            .as_deref()
            .map(|encoder| encoder as &dyn ArrayEncoder)
    }

    fn run(
        &self,
        sql: &str,
        params: &Params,
        mode: PrepareMode,
        decorator: Option<&Arc<Decorator>>,
    ) -> Result<Vec<Row>, RowSqlError> {
        let mut driver = lock(&self.driver);
        let rows = self.execute_raw(&mut driver, sql, params, mode)?;
        Ok(lock(&self.materializers).materialize(&rows, decorator))
    }

    fn execute_raw(
        &self,
        driver: &mut D,
        sql: &str,
        params: &Params,
        mode: PrepareMode,
    ) -> Result<D::Rows, RowSqlError> {
        match mode {
            PrepareMode::Direct => {
                let encoded = InlineEncoder::with_array_encoder(&*driver, self.array_encoder())
                    .encode(sql, params)?;
                driver.execute(&encoded).map_err(RowSqlError::from)
            }
            PrepareMode::Prepared => {
                let (bound_sql, binds) =
                    PreparedBinder::with_array_encoder(&*driver, self.array_encoder())
                        .bind(sql, params)?;
                let mut cache = lock(&self.prepared);
                let name = cache.prepare_statement(driver, &bound_sql)?;
                match driver.execute_prepared(&name, &binds) {
                    Err(err) if err.is_stale_statement() => {
                        tracing::debug!(error = %err, "stale prepared statement, re-preparing once");
                        cache.invalidate(driver, &bound_sql);
                        let name = cache.prepare_statement(driver, &bound_sql)?;
                        driver
                            .execute_prepared(&name, &binds)
                            .map_err(RowSqlError::from)
                    }
                    other => other.map_err(RowSqlError::from),
                }
            }
        }
    }
}

/// Borrowed view of a [`Connection`] that runs every call in prepared mode.
pub struct PreparedConnection<'a, D: Driver> {
    conn: &'a Connection<D>,
}

impl<D: Driver> PreparedConnection<'_, D> {
    pub fn query(&self, sql: &str, params: &Params) -> Result<Vec<Row>, RowSqlError> {
        self.conn.query_with(sql, params, PrepareMode::Prepared)
    }

    pub fn query_decorator(
        &self,
        decorator: &Arc<Decorator>,
        sql: &str,
        params: &Params,
    ) -> Result<Vec<Row>, RowSqlError> {
        self.conn
            .query_decorator_with(decorator, sql, params, PrepareMode::Prepared)
    }

    pub fn query_single(&self, sql: &str, params: &Params) -> Result<Vec<Value>, RowSqlError> {
        self.conn
            .query_single_with(sql, params, PrepareMode::Prepared)
    }

    pub fn query_array(&self, sql: &str, params: &Params) -> Result<Vec<Vec<Value>>, RowSqlError> {
        self.conn
            .query_array_with(sql, params, PrepareMode::Prepared)
    }

    pub fn query_hash(
        &self,
        sql: &str,
        params: &Params,
    ) -> Result<Vec<Vec<(String, Value)>>, RowSqlError> {
        self.conn.query_hash_with(sql, params, PrepareMode::Prepared)
    }

    pub fn exec(&self, sql: &str, params: &Params) -> Result<u64, RowSqlError> {
        self.conn.exec_with(sql, params, PrepareMode::Prepared)
    }
}
