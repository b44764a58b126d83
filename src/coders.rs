//! Decode helpers for driver text cells.
//!
//! Drivers (and the bundled mock) route numeric, timestamp, and network
//! address cells through these so the decoding policy stays consistent:
//! exact decimals instead of lossy floats, timestamps-without-zone read as
//! UTC, structured addresses instead of plain strings. A cell that does not
//! parse never fails the query; it is passed through as raw text with a
//! warning, since losing an entire result over one unparseable cell is worse
//! than returning the raw value.

use std::net::IpAddr;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::types::Value;

/// Decode a SQL `numeric` cell to an exact decimal value.
#[must_use]
pub fn decode_numeric(text: &str) -> Value {
    match Decimal::from_str(text) {
        Ok(decimal) => Value::Decimal(decimal),
        Err(_) => {
            tracing::warn!(cell = %text, "unexpected numeric format, passing through raw text");
            Value::Text(text.to_string())
        }
    }
}

/// Decode a timestamp-without-timezone cell, interpreting it as UTC.
///
/// Accepts `YYYY-MM-DD HH:MM:SS` with optional fractional seconds and an
/// optional `T` separator.
#[must_use]
pub fn decode_timestamp_utc(text: &str) -> Value {
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Value::Timestamp(naive.and_utc());
        }
    }
    tracing::warn!(cell = %text, "unexpected timestamp format, passing through raw text");
    Value::Text(text.to_string())
}

/// Decode an `inet` cell to a structured address.
///
/// Addresses carrying a network mask (CIDR notation) have no lossless
/// `IpAddr` representation and fall back to text.
#[must_use]
pub fn decode_inet(text: &str) -> Value {
    match IpAddr::from_str(text) {
        Ok(addr) => Value::Inet(addr),
        Err(_) => {
            tracing::warn!(cell = %text, "unexpected inet format, passing through raw text");
            Value::Text(text.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn numeric_decodes_exactly() {
        let value = decode_numeric("123456789.123456789");
        assert_eq!(
            value,
            Value::Decimal(Decimal::from_str("123456789.123456789").unwrap())
        );
    }

    #[test]
    fn malformed_numeric_fails_soft() {
        assert_eq!(decode_numeric("12,5"), Value::Text("12,5".to_string()));
    }

    #[test]
    fn naive_timestamp_reads_as_utc() {
        let value = decode_timestamp_utc("2021-03-04 05:06:07.25");
        let expected = Utc.with_ymd_and_hms(2021, 3, 4, 5, 6, 7).unwrap()
            + chrono::Duration::milliseconds(250);
        assert_eq!(value, Value::Timestamp(expected));
    }

    #[test]
    fn malformed_timestamp_fails_soft() {
        assert_eq!(
            decode_timestamp_utc("yesterday-ish"),
            Value::Text("yesterday-ish".to_string())
        );
    }

    #[test]
    fn inet_decodes_to_structured_address() {
        assert_eq!(
            decode_inet("192.168.1.1"),
            Value::Inet("192.168.1.1".parse().unwrap())
        );
        // CIDR has no IpAddr representation; soft fallback.
        assert_eq!(
            decode_inet("10.0.0.0/8"),
            Value::Text("10.0.0.0/8".to_string())
        );
    }
}
