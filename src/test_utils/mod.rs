//! In-memory driver for tests and examples.
//!
//! [`MockDriver`] implements the full raw-connection boundary over scripted
//! results, records every call it receives, and can inject failures
//! (stale-statement errors, broken deallocation). Cloning a `MockDriver`
//! shares its state, so a test can keep a handle for scripting and
//! inspection after moving the driver into a [`Connection`](crate::Connection).

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::coders;
use crate::driver::{Driver, RawRows, RawStream, SqlDialect};
use crate::error::{DriverError, DriverErrorKind};
use crate::types::Value;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// How a text cell should be decoded by [`MockRows::decoded`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Numeric,
    TimestampUtc,
    Inet,
}

/// Scripted structured result.
#[derive(Debug, Clone, Default)]
pub struct MockRows {
    columns: Vec<Option<String>>,
    rows: Vec<Vec<Value>>,
    affected: u64,
}

impl MockRows {
    pub fn new(columns: &[&str], rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns: columns.iter().map(|c| Some((*c).to_string())).collect(),
            rows,
            affected: 0,
        }
    }

    /// Result with possibly-anonymous columns (`None` entries).
    pub fn with_columns(columns: Vec<Option<String>>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns,
            rows,
            affected: 0,
        }
    }

    /// Result whose cells arrive as driver text and pass through the
    /// [`coders`] decode policy, the way a real text-protocol driver would
    /// feed the materializer.
    pub fn decoded(columns: &[&str], kinds: &[ColumnKind], text_rows: Vec<Vec<&str>>) -> Self {
        let rows = text_rows
            .into_iter()
            .map(|cells| {
                cells
                    .iter()
                    .zip(kinds)
                    .map(|(text, kind)| match kind {
                        ColumnKind::Text => Value::Text((*text).to_string()),
                        ColumnKind::Numeric => coders::decode_numeric(text),
                        ColumnKind::TimestampUtc => coders::decode_timestamp_utc(text),
                        ColumnKind::Inet => coders::decode_inet(text),
                    })
                    .collect()
            })
            .collect();
        Self::new(columns, rows)
    }

    /// Empty result (e.g. for scripted DDL).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// DML result carrying only an affected-row count.
    #[must_use]
    pub fn affected(count: u64) -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            affected: count,
        }
    }
}

impl RawRows for MockRows {
    fn column_names(&self) -> &[Option<String>] {
        &self.columns
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn value(&self, row: usize, col: usize) -> Value {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(col))
            .cloned()
            .unwrap_or(Value::Null)
    }

    fn rows_affected(&self) -> u64 {
        self.affected
    }
}

/// Row-at-a-time view over a scripted result.
pub struct MockStream {
    columns: Vec<Option<String>>,
    rows: VecDeque<Vec<Value>>,
}

impl RawStream for MockStream {
    fn column_names(&self) -> &[Option<String>] {
        &self.columns
    }

    fn next_row(&mut self) -> Result<Option<Vec<Value>>, DriverError> {
        Ok(self.rows.pop_front())
    }
}

/// Everything the mock driver was asked to do, in call order per category.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    /// SQL passed to plain executes.
    pub executes: Vec<String>,
    /// SQL passed to streaming executes.
    pub streams: Vec<String>,
    /// (statement name, SQL) pairs passed to prepare.
    pub prepares: Vec<(String, String)>,
    /// (statement name, binds) pairs passed to execute-prepared.
    pub prepared_executes: Vec<(String, Vec<Value>)>,
    /// Statement names passed to deallocate.
    pub deallocates: Vec<String>,
}

#[derive(Default)]
struct MockState {
    results: VecDeque<MockRows>,
    prepared: HashMap<String, String>,
    fail_prepared_execute: VecDeque<DriverError>,
    echo_binds: bool,
    broken_deallocate: bool,
    log: CallLog,
}

/// Scriptable in-memory driver with a call log.
#[derive(Clone)]
pub struct MockDriver {
    id: u64,
    state: Arc<Mutex<MockState>>,
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDriver {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Queue the result returned by the next execute (plain, streaming, or
    /// prepared when bind echoing is off).
    pub fn push_result(&self, rows: MockRows) {
        self.state().results.push_back(rows);
    }

    /// When on, execute-prepared answers with a single row echoing its bind
    /// values under columns `v0..vN`, instead of consuming scripted results.
    pub fn set_echo_binds(&self, on: bool) {
        self.state().echo_binds = on;
    }

    /// Inject a failure for the next execute-prepared call. Queueing several
    /// simulates a recurring failure.
    pub fn fail_next_prepared_execute(&self, err: DriverError) {
        self.state().fail_prepared_execute.push_back(err);
    }

    /// When on, deallocate reports the connection as lost (but still logs).
    pub fn set_broken_deallocate(&self, on: bool) {
        self.state().broken_deallocate = on;
    }

    /// Snapshot of the call log.
    #[must_use]
    pub fn log(&self) -> CallLog {
        self.state().log.clone()
    }

    /// Statement names currently allocated "server-side".
    #[must_use]
    pub fn live_statements(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state().prepared.keys().cloned().collect();
        names.sort();
        names
    }

    fn take_result(state: &mut MockState) -> MockRows {
        state.results.pop_front().unwrap_or_default()
    }
}

impl SqlDialect for MockDriver {
    fn escape_string(&self, input: &str) -> String {
        input.replace('\'', "''")
    }

    fn bind_marker(&self, index: usize) -> String {
        format!("${index}")
    }
}

impl Driver for MockDriver {
    type Rows = MockRows;
    type Stream<'a>
        = MockStream
    where
        Self: 'a;

    fn connection_id(&self) -> u64 {
        self.id
    }

    fn execute(&mut self, sql: &str) -> Result<Self::Rows, DriverError> {
        let mut state = self.state();
        state.log.executes.push(sql.to_string());
        Ok(Self::take_result(&mut state))
    }

    fn execute_stream(&mut self, sql: &str) -> Result<Self::Stream<'_>, DriverError> {
        let mut state = self.state();
        state.log.streams.push(sql.to_string());
        let rows = Self::take_result(&mut state);
        Ok(MockStream {
            columns: rows.columns,
            rows: rows.rows.into(),
        })
    }

    fn prepare(&mut self, name: &str, sql: &str) -> Result<(), DriverError> {
        let mut state = self.state();
        state.log.prepares.push((name.to_string(), sql.to_string()));
        state.prepared.insert(name.to_string(), sql.to_string());
        Ok(())
    }

    fn execute_prepared(&mut self, name: &str, binds: &[Value]) -> Result<Self::Rows, DriverError> {
        let mut state = self.state();
        state
            .log
            .prepared_executes
            .push((name.to_string(), binds.to_vec()));
        if let Some(err) = state.fail_prepared_execute.pop_front() {
            return Err(err);
        }
        if !state.prepared.contains_key(name) {
            return Err(DriverError::new(
                DriverErrorKind::Other,
                format!("unknown prepared statement: {name}"),
            ));
        }
        if state.echo_binds {
            let columns: Vec<Option<String>> =
                (0..binds.len()).map(|i| Some(format!("v{i}"))).collect();
            return Ok(MockRows::with_columns(columns, vec![binds.to_vec()]));
        }
        Ok(Self::take_result(&mut state))
    }

    fn deallocate(&mut self, name: &str) -> Result<(), DriverError> {
        let mut state = self.state();
        state.log.deallocates.push(name.to_string());
        if state.broken_deallocate {
            return Err(DriverError::new(
                DriverErrorKind::ConnectionLost,
                "connection is closed",
            ));
        }
        state.prepared.remove(name);
        Ok(())
    }
}
