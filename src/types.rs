use std::net::IpAddr;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::ser::{Serialize, SerializeSeq, Serializer};
use serde_json::Value as JsonValue;

/// A pre-escaped SQL fragment that the encoders splice in verbatim.
///
/// Use this to compose pre-built sub-queries into a parameterized template
/// without the fragment being quoted as a string:
/// ```rust
/// use rowsql::{Params, SqlLiteral, Value};
///
/// let params = Params::positional([Value::Literal(SqlLiteral::new("now()"))]);
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlLiteral(String);

impl SqlLiteral {
    pub fn new(fragment: impl Into<String>) -> Self {
        Self(fragment.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<SqlLiteral> for Value {
    fn from(lit: SqlLiteral) -> Self {
        Value::Literal(lit)
    }
}

/// Values that can be stored in a database row or used as query parameters.
///
/// One enum is shared across parameter encoding and row materialization so
/// helper code never branches on driver types. `Decimal` exists so SQL
/// `numeric` columns round-trip exactly; `Timestamp` is always UTC.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// NULL value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Arbitrary-precision decimal value
    Decimal(Decimal),
    /// Text/string value
    Text(String),
    /// Timestamp value, normalized to UTC
    Timestamp(DateTime<Utc>),
    /// Calendar date value
    Date(NaiveDate),
    /// Network address value
    Inet(IpAddr),
    /// JSON value
    Json(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
    /// Array of scalar values
    Array(Vec<Value>),
    /// Pre-escaped SQL fragment, inlined verbatim by the encoders
    Literal(SqlLiteral),
}

impl Value {
    /// Check if this value is NULL.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        if let Value::Int(v) = self { Some(*v) } else { None }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let Value::Text(v) = self {
            Some(v)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            Value::Int(0) => Some(false),
            Value::Int(1) => Some(true),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let Value::Float(v) = self { Some(*v) } else { None }
    }

    #[must_use]
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Decimal(v) => Some(*v),
            Value::Int(v) => Some(Decimal::from(*v)),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        if let Value::Timestamp(v) = self {
            Some(*v)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        if let Value::Array(v) = self {
            Some(v)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let Value::Blob(v) = self {
            Some(v)
        } else {
            None
        }
    }

    /// Human-readable domain name, used in error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Decimal(_) => "decimal",
            Value::Text(_) => "text",
            Value::Timestamp(_) => "timestamp",
            Value::Date(_) => "date",
            Value::Inet(_) => "inet",
            Value::Json(_) => "json",
            Value::Blob(_) => "blob",
            Value::Array(_) => "array",
            Value::Literal(_) => "sql literal",
        }
    }

    /// Render a timestamp the way the inline encoder quotes it (RFC 3339,
    /// UTC, fractional seconds only when present).
    #[must_use]
    pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<IpAddr> for Value {
    fn from(v: IpAddr) -> Self {
        Value::Inet(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Int(v) => serializer.serialize_i64(*v),
            Value::Float(v) => serializer.serialize_f64(*v),
            // Serialized as a string so precision survives JSON round trips.
            Value::Decimal(v) => serializer.serialize_str(&v.to_string()),
            Value::Text(v) => serializer.serialize_str(v),
            Value::Timestamp(v) => serializer.serialize_str(&Value::format_timestamp(v)),
            Value::Date(v) => serializer.serialize_str(&v.to_string()),
            Value::Inet(v) => serializer.serialize_str(&v.to_string()),
            Value::Json(v) => v.serialize(serializer),
            Value::Blob(v) => serializer.serialize_bytes(v),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Literal(lit) => serializer.serialize_str(lit.as_str()),
        }
    }
}
