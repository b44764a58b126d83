use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::RowSqlError;
use crate::types::Value;

use super::RowShape;

/// One materialized row.
///
/// Rows own their values (value semantics, no shared mutable state between
/// rows) and hold no reference to the cache that compiled their shape.
#[derive(Debug)]
pub struct Row {
    shape: Arc<RowShape>,
    values: Vec<Value>,
}

impl Row {
    pub(crate) fn new(shape: Arc<RowShape>, values: Vec<Value>) -> Self {
        Self { shape, values }
    }

    /// Read a column by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.shape
            .column_index(name)
            .and_then(|i| self.values.get(i))
    }

    /// Read a column by position (the fast path).
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Overwrite a column's value.
    ///
    /// # Errors
    /// Returns [`RowSqlError::UnknownColumn`] when the shape has no such
    /// column.
    pub fn set(&mut self, name: &str, value: Value) -> Result<(), RowSqlError> {
        match self
            .shape
            .column_index(name)
            .and_then(|i| self.values.get_mut(i))
        {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(RowSqlError::UnknownColumn(name.to_string())),
        }
    }

    /// Column names in result order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        self.shape.columns()
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Ordered field-to-value mapping, for serialization and debugging.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(String, Value)> {
        self.shape
            .columns()
            .iter()
            .cloned()
            .zip(self.values.iter().cloned())
            .collect()
    }

    /// The compiled accessor backing this row. Mainly useful as an identity
    /// probe (`Arc::ptr_eq`) to verify accessor reuse.
    #[must_use]
    pub fn shape(&self) -> &Arc<RowShape> {
        &self.shape
    }

    /// Whether this row's shape carries the named decorator operation.
    #[must_use]
    pub fn has_operation(&self, op: &str) -> bool {
        self.shape
            .decorator()
            .is_some_and(|d| d.find(op).is_some())
    }

    /// Invoke a decorator operation attached to this row's shape.
    ///
    /// # Errors
    /// Returns [`RowSqlError::UnknownOperation`] for undecorated rows or
    /// operations the decorator does not define.
    pub fn invoke(&self, op: &str) -> Result<Value, RowSqlError> {
        let func = self
            .shape
            .decorator()
            .and_then(|d| d.find(op))
            .ok_or_else(|| RowSqlError::UnknownOperation(op.to_string()))?;
        func(self)
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.shape.columns().iter().zip(&self.values) {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
