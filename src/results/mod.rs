//! Materialized row representation.
//!
//! A [`RowShape`] is the compiled accessor for one ordered column-name
//! sequence; [`Row`] instances hold their own values and share the shape
//! through an `Arc`.

mod row;
mod shape;

pub use row::Row;
pub use shape::RowShape;

pub(crate) use shape::normalize_columns;
