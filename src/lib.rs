//! Lightweight row materialization and parameter binding for raw SQL driver
//! connections.
//!
//! `rowsql` sits directly atop a synchronous driver connection (expressed as
//! the [`Driver`] trait) and owns the two hard parts of a minimal data-access
//! layer:
//!
//! - **Result materialization**: raw result sets become [`Row`] objects
//!   through a bounded LRU cache of per-column-shape compiled accessors, with
//!   optional [`Decorator`] behavior attached per call.
//! - **Parameter encoding**: `?` and `:name` placeholders become either
//!   safely quoted literals (inline mode) or driver-native bind markers plus
//!   an ordered bind list (prepared mode), backed by a bounded LRU of
//!   server-side prepared statements.
//!
//! It is not an ORM: no SQL parsing, no associations, no schema
//! introspection, no pooling.

pub mod coders;
pub mod driver;
pub mod encoder;
pub mod prelude;

mod connection;
mod decorator;
mod error;
mod materializer;
mod params;
mod prepared_cache;
mod results;
mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use connection::{Connection, ConnectionConfig, PrepareMode, PreparedConnection};
pub use decorator::{Decorator, DecoratorOp};
pub use driver::{ArrayEncoder, Driver, RawRows, RawStream, SqlDialect};
pub use encoder::{InlineEncoder, PreparedBinder};
pub use error::{DriverError, DriverErrorKind, RowSqlError};
pub use materializer::MaterializerCache;
pub use params::Params;
pub use prepared_cache::{PreparedCache, PreparedStatementHandle};
pub use results::{Row, RowShape};
pub use types::{SqlLiteral, Value};
