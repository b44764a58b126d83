//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types to make it easier to
//! get started with the library.

pub use crate::connection::{Connection, ConnectionConfig, PrepareMode, PreparedConnection};
pub use crate::decorator::Decorator;
pub use crate::driver::{ArrayEncoder, Driver, RawRows, RawStream, SqlDialect};
pub use crate::encoder::{InlineEncoder, PreparedBinder};
pub use crate::error::{DriverError, DriverErrorKind, RowSqlError};
pub use crate::materializer::MaterializerCache;
pub use crate::params::Params;
pub use crate::prepared_cache::PreparedCache;
pub use crate::results::{Row, RowShape};
pub use crate::types::{SqlLiteral, Value};

#[cfg(any(test, feature = "test-utils"))]
pub use crate::test_utils::{MockDriver, MockRows};
