//! Decode data-warehouse query results into plain Rust structs.
//!
//! A warehouse client hands back rows of typed columns, including nested
//! and repeated "record" columns, as a [`Schema`]/[`Row`] pair. This crate
//! maps one such pair onto a struct deriving [`FromRow`]: columns match
//! fields by name (lowerCamelCase field identifiers resolve to
//! lower_snake_case columns, or use an explicit `#[rowmap(column = "...")]`
//! override), scalar values parse through a fixed set of converters, and
//! nested or repeated record columns decode recursively.
//!
//! # Example
//!
//! ```
//! use rowmap::{Field, FieldValue, FromRow, Row, Schema};
//!
//! #[derive(Debug, PartialEq, FromRow)]
//! struct TripSummary {
//!     pickup_zone: String,
//!     trip_miles: f64,
//!     #[rowmap(column = "n_trips")]
//!     trips: i64,
//!     tip: Option<f64>,
//! }
//!
//! # fn main() -> Result<(), rowmap::MapError> {
//! // Normally both halves come straight from the query client.
//! let schema = Schema::new(vec![
//!     Field::primitive("pickup_zone"),
//!     Field::primitive("trip_miles"),
//!     Field::primitive("n_trips"),
//!     Field::primitive("tip"),
//! ]);
//!
//! let row = Row::new(vec![
//!     FieldValue::primitive("JFK Airport"),
//!     FieldValue::primitive("17.2"),
//!     FieldValue::primitive("12"),
//!     FieldValue::Null,
//! ]);
//!
//! let trip: TripSummary = rowmap::map(&schema, &row)?;
//! assert_eq!(trip.pickup_zone, "JFK Airport");
//! assert_eq!(trip.trips, 12);
//! assert_eq!(trip.tip, None);
//! # Ok(())
//! # }
//! ```
//!
//! Decoding is purely synchronous and call-scoped: no I/O, no shared
//! mutable state, and recursion bounded by schema nesting. Any failure
//! aborts the whole `map` call; there are no partial results.

#![warn(
    anonymous_parameters,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    nonstandard_style,
    rust_2018_idioms,
    single_use_lifetimes,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unused_extern_crates,
    unused_qualifications,
    variant_size_differences
)]

mod convert;
mod error;
mod mapper;
mod schema;

pub use convert::{Convert, ConvertError};
pub use error::MapError;
pub use mapper::{
    DecodeValue, FromRow, check_record, column_name, decode_column, decode_record, map,
};
pub use schema::{Field, FieldKind, FieldValue, Row, Schema};

pub use rowmap_derive::FromRow;
