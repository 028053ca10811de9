//! The decode-time error taxonomy.

use crate::convert::ConvertError;

/// An error produced while decoding a row.
///
/// Every variant is fatal: the enclosing [`map`](crate::map) call aborts
/// immediately, including any in-progress recursion into nested records, and
/// nothing is partially decoded or defaulted.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// The schema has no column with the resolved name, or the row carries
    /// no value at that column's position.
    #[error("column '{column}' not found in result")]
    ColumnNotFound {
        /// The resolved source column name.
        column: String,
    },

    /// A raw value was present but not parseable as the declared scalar
    /// type; the upstream data is malformed.
    #[error("column '{column}' has a malformed value")]
    ScalarParse {
        /// The source column name.
        column: String,
        /// The converter failure.
        #[source]
        source: ConvertError,
    },

    /// The destination field's type cannot be produced from the column.
    /// Typically a record-typed field met a scalar column (no subfields).
    #[error("no conversion from column '{column}' to {target}")]
    NoConverter {
        /// The source column name.
        column: String,
        /// The destination type.
        target: &'static str,
    },

    /// A null column fed a destination field that is not `Option`.
    #[error("column '{column}' is null, but the destination field is not optional")]
    UnexpectedNull {
        /// The source column name.
        column: String,
    },

    /// The raw value is tagged differently than the destination shape
    /// requires, e.g. a repeated value for a plain scalar field.
    #[error("column '{column}' holds a {found} value, expected {expected}")]
    UnexpectedShape {
        /// The source column name.
        column: String,
        /// The shape the destination field requires.
        expected: &'static str,
        /// The shape the value actually carries.
        found: &'static str,
    },
}
