//! Placeholder substitution for `?` and `:name` templates.
//!
//! Two strategies share the scanners in this module: [`InlineEncoder`] renders
//! every placeholder as a quoted literal, [`PreparedBinder`] rewrites
//! placeholders into driver-native bind markers plus an ordered bind list.

mod inline;
mod prepared;

pub use inline::InlineEncoder;
pub use prepared::PreparedBinder;

use crate::error::RowSqlError;
use crate::types::Value;

/// Substitute `?` markers strictly left to right.
///
/// The replacement closure receives the 0-based placeholder index; it fails
/// when the template has more `?` than there are positional parameters.
pub(crate) fn substitute_positional<F>(sql: &str, mut replacement: F) -> Result<String, RowSqlError>
where
    F: FnMut(usize) -> Result<String, RowSqlError>,
{
    let bytes = sql.as_bytes();
    let mut out = String::with_capacity(sql.len());
    let mut copied = 0;
    let mut next = 0;
    for (i, b) in bytes.iter().enumerate() {
        if *b == b'?' {
            out.push_str(&sql[copied..i]);
            out.push_str(&replacement(next)?);
            next += 1;
            copied = i + 1;
        }
    }
    out.push_str(&sql[copied..]);
    Ok(out)
}

/// Substitute `:name` markers.
///
/// A colon directly preceded by another colon never starts a placeholder, so
/// `::int` typecasts survive. The replacement closure receives the maximal
/// identifier following the colon and reports how many of its bytes it
/// actually matched (boundary-aware longest-key matching lives in the
/// caller); returning `None` leaves the text verbatim.
pub(crate) fn substitute_named<F>(sql: &str, mut replacement: F) -> Result<String, RowSqlError>
where
    F: FnMut(&str) -> Result<Option<(usize, String)>, RowSqlError>,
{
    let bytes = sql.as_bytes();
    let mut out = String::with_capacity(sql.len());
    let mut copied = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b':' && (i == 0 || bytes[i - 1] != b':') {
            let start = i + 1;
            let mut end = start;
            while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_') {
                end += 1;
            }
            if end > start
                && let Some((consumed, text)) = replacement(&sql[start..end])?
            {
                out.push_str(&sql[copied..i]);
                out.push_str(&text);
                i = start + consumed;
                copied = i;
                continue;
            }
        }
        i += 1;
    }
    out.push_str(&sql[copied..]);
    Ok(out)
}

/// Longest-first match of a scanned identifier against the named keys, so
/// `:arg2` is never corrupted while substituting `:arg20` and vice versa.
pub(crate) fn longest_key_match<'a>(
    pairs: &'a [(String, Value)],
    ident: &str,
) -> Option<(usize, &'a Value)> {
    let mut best: Option<(usize, &'a Value)> = None;
    for (key, value) in pairs {
        if ident.starts_with(key.as_str()) && best.is_none_or(|(len, _)| key.len() > len) {
            best = Some((key.len(), value));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_scan_is_left_to_right() {
        let out = substitute_positional("a ? b ? c", |i| Ok(i.to_string()));
        assert_eq!(out.unwrap(), "a 0 b 1 c");
    }

    #[test]
    fn double_colon_never_starts_a_placeholder() {
        let out = substitute_named("select :x::int, y::text", |ident| {
            Ok((ident.starts_with('x')).then(|| (1, "5".to_string())))
        });
        assert_eq!(out.unwrap(), "select 5::int, y::text");
    }

    #[test]
    fn longest_key_wins() {
        let pairs = vec![
            ("a".to_string(), Value::Int(1)),
            ("a2".to_string(), Value::Int(2)),
        ];
        let (len, value) = longest_key_match(&pairs, "a2").unwrap();
        assert_eq!(len, 2);
        assert_eq!(value, &Value::Int(2));
        let (len, _) = longest_key_match(&pairs, "a3").unwrap();
        assert_eq!(len, 1);
    }
}
