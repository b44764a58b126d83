use std::collections::HashMap;
use std::sync::Arc;

use crate::decorator::Decorator;
use crate::driver::RawRows;
use crate::types::Value;

use super::Row;

/// Anonymous-column marker some drivers report for unaliased expressions.
const ANONYMOUS_COLUMN: &str = "?column?";

/// Compiled accessor for one ordered column-name sequence.
///
/// Built once per distinct shape by the
/// [`MaterializerCache`](crate::MaterializerCache) and reused for every
/// result with the same columns. Rows are constructed by positional reads;
/// the name→index table exists so `Row::get` stays O(1) without per-row
/// bookkeeping.
#[derive(Debug)]
pub struct RowShape {
    columns: Arc<Vec<String>>,
    index: HashMap<String, usize>,
    decorator: Option<Arc<Decorator>>,
}

impl RowShape {
    pub(crate) fn new(columns: Vec<String>) -> Arc<Self> {
        let index = columns
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Arc::new(Self {
            columns: Arc::new(columns),
            index,
            decorator: None,
        })
    }

    /// Derive a decorated variant without touching the base shape.
    pub(crate) fn decorated(base: &Arc<RowShape>, decorator: Arc<Decorator>) -> Arc<Self> {
        Arc::new(Self {
            columns: Arc::clone(&base.columns),
            index: base.index.clone(),
            decorator: Some(decorator),
        })
    }

    /// Column names in result order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    #[must_use]
    pub fn decorator(&self) -> Option<&Arc<Decorator>> {
        self.decorator.as_ref()
    }

    /// Construct one row by fixed-order positional reads.
    pub(crate) fn materialize<R: RawRows>(self: &Arc<Self>, rows: &R, row: usize) -> Row {
        let values = (0..self.columns.len())
            .map(|col| rows.value(row, col))
            .collect();
        Row::new(Arc::clone(self), values)
    }

    /// Construct one row from already-fetched cells (streaming path).
    /// Short driver rows read as NULL in the trailing columns.
    pub(crate) fn row_from_values(self: &Arc<Self>, mut values: Vec<Value>) -> Row {
        values.resize(self.columns.len(), Value::Null);
        Row::new(Arc::clone(self), values)
    }
}

/// Guarantee every column has a valid attribute name: absent, empty, or
/// anonymous-marker names become `column{i}` by position.
pub(crate) fn normalize_columns(raw: &[Option<String>]) -> Vec<String> {
    raw.iter()
        .enumerate()
        .map(|(i, name)| match name {
            Some(n) if !n.is_empty() && n.as_str() != ANONYMOUS_COLUMN => n.clone(),
            _ => format!("column{i}"),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_columns_get_positional_names() {
        let raw = vec![
            None,
            Some("title".to_string()),
            Some(ANONYMOUS_COLUMN.to_string()),
            Some(String::new()),
        ];
        assert_eq!(
            normalize_columns(&raw),
            vec!["column0", "title", "column2", "column3"]
        );
    }
}
