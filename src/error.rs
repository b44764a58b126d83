use std::fmt;

use thiserror::Error;

/// Errors surfaced by the materialization and parameter-binding core.
#[derive(Debug, Error)]
pub enum RowSqlError {
    /// A placeholder could not be substituted (e.g. more `?` markers than
    /// positional parameters).
    #[error("parameter encoding error: {0}")]
    Encoding(String),

    /// A value's domain cannot be rendered safely in the requested mode.
    #[error("cannot encode value of unsupported type: {0}")]
    UnsupportedType(&'static str),

    /// The parameter set itself is malformed (mixed positional and named).
    #[error("parameter error: {0}")]
    Parameter(String),

    /// A row was asked to write a column its shape does not contain.
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    /// A decorator operation was invoked that the row's shape does not carry.
    #[error("unknown decorator operation: {0}")]
    UnknownOperation(String),

    /// Underlying driver failure, propagated unchanged.
    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// Classification of failures reported by the raw driver boundary.
///
/// Only `StaleStatement` carries special semantics in this crate: it triggers
/// a single re-prepare-and-retry of a cached prepared statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverErrorKind {
    /// SQL could not be parsed by the server.
    Syntax,
    /// A constraint (unique, foreign key, ...) was violated.
    Constraint,
    /// The physical connection is closed or broken.
    ConnectionLost,
    /// A cached prepared-statement plan is no longer valid server-side.
    StaleStatement,
    /// Anything else.
    Other,
}

impl fmt::Display for DriverErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DriverErrorKind::Syntax => "syntax",
            DriverErrorKind::Constraint => "constraint",
            DriverErrorKind::ConnectionLost => "connection lost",
            DriverErrorKind::StaleStatement => "stale statement",
            DriverErrorKind::Other => "other",
        };
        f.write_str(s)
    }
}

/// An execute/fetch failure reported by the raw driver.
#[derive(Debug, Clone, Error)]
#[error("driver error ({kind}): {message}")]
pub struct DriverError {
    /// Failure classification.
    pub kind: DriverErrorKind,
    /// Driver-supplied message.
    pub message: String,
}

impl DriverError {
    pub fn new(kind: DriverErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Shorthand for an unclassified failure.
    pub fn other(message: impl Into<String>) -> Self {
        Self::new(DriverErrorKind::Other, message)
    }

    #[must_use]
    pub fn is_stale_statement(&self) -> bool {
        self.kind == DriverErrorKind::StaleStatement
    }
}
