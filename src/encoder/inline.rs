use crate::driver::{ArrayEncoder, SqlDialect};
use crate::error::RowSqlError;
use crate::params::{ParamStyle, Params};
use crate::types::Value;

use super::{longest_key_match, substitute_named, substitute_positional};

/// Renders every placeholder as a driver-escaped, correctly quoted literal.
///
/// The encoder operates on copies and never mutates the caller's template or
/// parameter containers; encoding the same input twice yields byte-identical
/// SQL.
pub struct InlineEncoder<'a, D: SqlDialect + ?Sized> {
    dialect: &'a D,
    array_encoder: Option<&'a dyn ArrayEncoder>,
}

impl<'a, D: SqlDialect + ?Sized> InlineEncoder<'a, D> {
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

    /// Substitute all placeholders in `sql` with quoted literals.
    ///
    /// # Errors
    /// Fails when the template has more `?` than positional parameters, when
    /// positional and named parameters are mixed, or when a value's domain
    /// has no quoting rule (e.g. blobs).
    pub fn encode(&self, sql: &str, params: &Params) -> Result<String, RowSqlError> {
        match params.classify()? {
            ParamStyle::None => Ok(sql.to_string()),
            ParamStyle::Positional(values) => substitute_positional(sql, |i| {
                let value = values.get(i).ok_or_else(|| {
                    RowSqlError::Encoding(format!(
                        "placeholder {} has no matching positional parameter",
                        i + 1
                    ))
                })?;
                self.quote_value(value)
            }),
            ParamStyle::Named(pairs) => substitute_named(sql, |ident| {
                match longest_key_match(pairs, ident) {
                    Some((len, value)) => Ok(Some((len, self.quote_value(value)?))),
                    None => Ok(None),
                }
            }),
        }
    }

    /// Quote a single value according to its domain.
    pub fn quote_value(&self, value: &Value) -> Result<String, RowSqlError> {
        match value {
            Value::Null => Ok("NULL".to_string()),
            Value::Bool(true) => Ok("true".to_string()),
            Value::Bool(false) => Ok("false".to_string()),
            Value::Int(v) => Ok(v.to_string()),
            // Rust's float Display never uses scientific notation, but its
            // NaN/inf tokens are not SQL literals.
            Value::Float(v) if !v.is_finite() => Err(RowSqlError::Encoding(format!(
                "non-finite float {v} has no SQL literal form"
            ))),
            Value::Float(v) => Ok(v.to_string()),
            // Decimal renders in full fixed-point form, so no precision is
            // lost to exponent notation.
            Value::Decimal(v) => Ok(v.to_string()),
            Value::Text(v) => Ok(self.quote_str(v)),
            Value::Timestamp(v) => Ok(format!("'{}'", Value::format_timestamp(v))),
            Value::Date(v) => Ok(format!("'{v}'")),
            Value::Inet(v) => Ok(format!("'{v}'")),
            Value::Json(v) => Ok(self.quote_str(&v.to_string())),
            Value::Array(items) => self.quote_array(items),
            Value::Literal(lit) => Ok(lit.as_str().to_string()),
            Value::Blob(_) => Err(RowSqlError::UnsupportedType(value.type_name())),
        }
    }

    fn quote_str(&self, v: &str) -> String {
        format!("'{}'", self.dialect.escape_string(v))
    }

    fn quote_array(&self, items: &[Value]) -> Result<String, RowSqlError> {
        if let Some(encoder) = self.array_encoder {
            return encoder.encode_literal(items);
        }
        if items.is_empty() {
            // No array encoder configured: an empty list has no valid
            // element-wise expansion, so it degrades to NULL.
            return Ok("NULL".to_string());
        }
        let quoted = items
            .iter()
            .map(|item| self.quote_value(item))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(quoted.join(", "))
    }
}
