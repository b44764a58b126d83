use std::fmt;
use std::sync::Arc;

use crate::error::RowSqlError;
use crate::results::Row;
use crate::types::Value;

/// Operation attached to materialized rows by a [`Decorator`]; a pure
/// function of the row's own column values.
pub type DecoratorOp = Arc<dyn Fn(&Row) -> Result<Value, RowSqlError> + Send + Sync>;

/// A named bundle of extra operations attachable to materialized rows.
///
/// Identity is the decorator's name: the materializer caches one derived
/// accessor per (column shape, decorator name) pair, so repeated use is
/// cheap and the base (undecorated) accessor is never mutated.
///
/// ```rust
/// use rowsql::{Decorator, Value};
///
/// let ratio = Decorator::new("ratio").op("ratio", |row| {
///     let num = row.get("num").and_then(|v| v.as_int()).unwrap_or(0);
///     let den = row.get("den").and_then(|v| v.as_int()).unwrap_or(1);
///     Ok(Value::Float(num as f64 / den as f64))
/// });
/// # let _ = ratio;
/// ```
pub struct Decorator {
    name: String,
    ops: Vec<(String, DecoratorOp)>,
}

impl Decorator {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ops: Vec::new(),
        }
    }

    /// Add a named operation (builder style).
    #[must_use]
    pub fn op<F>(mut self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Row) -> Result<Value, RowSqlError> + Send + Sync + 'static,
    {
        self.ops.push((name.into(), Arc::new(func)));
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Names of the operations this decorator defines, in insertion order.
    pub fn operations(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().map(|(name, _)| name.as_str())
    }

    pub(crate) fn find(&self, op: &str) -> Option<&DecoratorOp> {
        self.ops
            .iter()
            .find(|(name, _)| name == op)
            .map(|(_, func)| func)
    }
}

impl fmt::Debug for Decorator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decorator")
            .field("name", &self.name)
            .field("ops", &self.ops.iter().map(|(n, _)| n).collect::<Vec<_>>())
            .finish()
    }
}
