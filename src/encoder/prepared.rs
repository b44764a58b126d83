use crate::driver::{ArrayEncoder, SqlDialect};
use crate::error::RowSqlError;
use crate::params::{ParamStyle, Params};
use crate::types::Value;

use super::{longest_key_match, substitute_named, substitute_positional};

/// Rewrites placeholders into driver-native positional bind markers and
/// collects the raw values into an ordered bind list.
///
/// Array parameters expand to one marker per element joined by `", "` (an
/// `IN (...)` expansion) unless an [`ArrayEncoder`] is configured, in which
/// case the whole array becomes a single bind value carrying the native
/// encoding. An empty array without an encoder binds a single `NULL`.
pub struct PreparedBinder<'a, D: SqlDialect + ?Sized> {
    dialect: &'a D,
    array_encoder: Option<&'a dyn ArrayEncoder>,
}

impl<'a, D: SqlDialect + ?Sized> PreparedBinder<'a, D> {
    pub fn new(dialect: &'a D) -> Self {
        Self {
            dialect,
            array_encoder: None,
        }
    }

    pub fn with_array_encoder(dialect: &'a D, array_encoder: Option<&'a dyn ArrayEncoder>) -> Self {
        Self {
            dialect,
            array_encoder,
        }
    }

    /// Rewrite `sql` and produce the ordered bind list.
    ///
    /// # Errors
    /// Same placeholder and parameter-set rules as inline encoding; value
    /// domains are not restricted here since raw values travel as binds.
    pub fn bind(&self, sql: &str, params: &Params) -> Result<(String, Vec<Value>), RowSqlError> {
        let mut binds = Vec::new();
        let rewritten = match params.classify()? {
            ParamStyle::None => sql.to_string(),
            ParamStyle::Positional(values) => substitute_positional(sql, |i| {
                let value = values.get(i).ok_or_else(|| {
                    RowSqlError::Encoding(format!(
                        "placeholder {} has no matching positional parameter",
                        i + 1
                    ))
                })?;
                self.bind_value(value, &mut binds)
            })?,
            ParamStyle::Named(pairs) => substitute_named(sql, |ident| {
                match longest_key_match(pairs, ident) {
                    Some((len, value)) => Ok(Some((len, self.bind_value(value, &mut binds)?))),
                    None => Ok(None),
                }
            })?,
        };
        Ok((rewritten, binds))
    }

    fn bind_value(&self, value: &Value, binds: &mut Vec<Value>) -> Result<String, RowSqlError> {
        match value {
            // Pre-escaped fragments are spliced into the SQL, not bound.
            Value::Literal(lit) => Ok(lit.as_str().to_string()),
            Value::Array(items) => {
                if let Some(encoder) = self.array_encoder {
                    binds.push(encoder.encode_bind(items)?);
                    return Ok(self.dialect.bind_marker(binds.len()));
                }
                if items.is_empty() {
                    binds.push(Value::Null);
                    return Ok(self.dialect.bind_marker(binds.len()));
                }
                let markers = items
                    .iter()
                    .map(|item| {
                        binds.push(item.clone());
                        self.dialect.bind_marker(binds.len())
                    })
                    .collect::<Vec<_>>();
                Ok(markers.join(", "))
            }
            other => {
                binds.push(other.clone());
                Ok(self.dialect.bind_marker(binds.len()))
            }
        }
    }
}
