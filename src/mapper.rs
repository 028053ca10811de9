//! The recursive structural mapper.
//!
//! [`map`] walks a destination struct's fields in declaration order. Each
//! field resolves its source column by name, then dispatches through
//! [`DecodeValue`]: scalars parse via [`Convert`], `Option` absorbs SQL
//! NULL, `Vec` walks repeated columns, and derived structs recurse into
//! record columns with the column's subfields schema.

use chrono::{DateTime, Utc};
use tracing::trace;

use crate::{
    convert::Convert,
    error::MapError,
    schema::{Field, FieldValue, Row, Schema},
};

/// Decodes one result row into `T`.
///
/// The schema and row must come from the same result set, positionally
/// aligned; a misaligned pair surfaces as [`MapError::ColumnNotFound`] or a
/// shape error, never as a panic. The first failing field aborts the whole
/// call.
pub fn map<T: FromRow>(schema: &Schema, row: &Row) -> Result<T, MapError> {
    trace!(
        target_type = std::any::type_name::<T>(),
        columns = schema.len(),
        "decoding row"
    );
    T::from_row(schema, row)
}

/// A struct that can be decoded from one result row.
///
/// Implement this with `#[derive(FromRow)]`; the derive resolves each
/// field's source column (an explicit `#[rowmap(column = "...")]` override,
/// or the field identifier via [`column_name`]) and decodes fields in
/// declaration order.
pub trait FromRow: Sized {
    /// Decodes an instance from a schema/row pair.
    fn from_row(schema: &Schema, row: &Row) -> Result<Self, MapError>;
}

/// A type that can be decoded from one column of a result row.
///
/// This is the per-field dispatch seam. Impls exist for the six scalar
/// types of [`Convert`], for `Option<T>` (SQL nullability), for `Vec<T>`
/// (repeated columns), and for every `#[derive(FromRow)]` struct (record
/// columns). A destination type without an impl is rejected at compile
/// time.
pub trait DecodeValue: Sized {
    /// Decodes this type from one column definition and its value.
    fn decode(field: &Field, value: &FieldValue) -> Result<Self, MapError>;

    /// Checks that the column can feed this type at all, before any null
    /// handling. Record-typed destinations require subfields even when the
    /// value is null; scalars accept any column.
    fn check_field(_field: &Field) -> Result<(), MapError> {
        Ok(())
    }
}

macro_rules! scalar_decode {
    ($($ty:ty),* $(,)?) => {
        $(
            impl DecodeValue for $ty {
                fn decode(field: &Field, value: &FieldValue) -> Result<Self, MapError> {
                    match value {
                        FieldValue::Null => Err(MapError::UnexpectedNull {
                            column: field.name.clone(),
                        }),
                        FieldValue::Primitive(text) => {
                            <$ty as Convert>::convert(text).map_err(|source| {
                                MapError::ScalarParse {
                                    column: field.name.clone(),
                                    source,
                                }
                            })
                        }
                        other => Err(MapError::UnexpectedShape {
                            column: field.name.clone(),
                            expected: "primitive",
                            found: other.shape(),
                        }),
                    }
                }
            }
        )*
    };
}

scalar_decode!(String, i32, i64, f64, bool, DateTime<Utc>);

impl<T: DecodeValue> DecodeValue for Option<T> {
    /// SQL NULL becomes `None` for any destination shape, with no
    /// conversion or recursion attempted.
    fn decode(field: &Field, value: &FieldValue) -> Result<Self, MapError> {
        T::check_field(field)?;
        match value {
            FieldValue::Null => Ok(None),
            _ => T::decode(field, value).map(Some),
        }
    }
}

impl<T: DecodeValue> DecodeValue for Vec<T> {
    /// Elements decode in source order against the same column definition,
    /// so repeated-record elements recurse with the column's subfields
    /// schema. An empty repeated value is an empty `Vec`, never absent.
    fn decode(field: &Field, value: &FieldValue) -> Result<Self, MapError> {
        match value {
            FieldValue::Null => Err(MapError::UnexpectedNull {
                column: field.name.clone(),
            }),
            FieldValue::Repeated(elements) => elements
                .iter()
                .map(|element| T::decode(field, element))
                .collect(),
            other => Err(MapError::UnexpectedShape {
                column: field.name.clone(),
                expected: "repeated",
                found: other.shape(),
            }),
        }
    }
}

/// Looks up a column by name and decodes its value.
///
/// This is the per-field step of [`map`]; derived [`FromRow`] impls call it
/// once per destination field.
pub fn decode_column<T: DecodeValue>(
    schema: &Schema,
    row: &Row,
    column: &str,
) -> Result<T, MapError> {
    let Some((index, field)) = schema.lookup(column) else {
        return Err(MapError::ColumnNotFound {
            column: column.to_string(),
        });
    };

    // A row shorter than its schema surfaces here, not as a panic.
    let value = row.get(index).ok_or_else(|| MapError::ColumnNotFound {
        column: column.to_string(),
    })?;

    T::decode(field, value)
}

/// Decodes a record-shaped column into a nested [`FromRow`] struct.
///
/// Used by derived [`DecodeValue`] impls when a struct appears as a nested
/// or repeated-record field. The recursive call always uses the column's
/// subfields schema, never the enclosing one; a column without subfields
/// cannot satisfy a record-typed field.
pub fn decode_record<T: FromRow>(field: &Field, value: &FieldValue) -> Result<T, MapError> {
    let subfields = record_subfields::<T>(field)?;

    match value {
        FieldValue::Null => Err(MapError::UnexpectedNull {
            column: field.name.clone(),
        }),
        FieldValue::Record(row) => T::from_row(subfields, row),
        other => Err(MapError::UnexpectedShape {
            column: field.name.clone(),
            expected: "record",
            found: other.shape(),
        }),
    }
}

/// Checks that a column can feed a record-typed destination.
///
/// This is [`DecodeValue::check_field`] for derived structs: a column
/// without subfields is [`MapError::NoConverter`] even when the value is
/// null.
pub fn check_record<T: FromRow>(field: &Field) -> Result<(), MapError> {
    record_subfields::<T>(field).map(|_| ())
}

fn record_subfields<'a, T: FromRow>(field: &'a Field) -> Result<&'a Schema, MapError> {
    field.subfields().ok_or_else(|| MapError::NoConverter {
        column: field.name.clone(),
        target: std::any::type_name::<T>(),
    })
}

/// Derives the source column name for a destination field: lowerCamelCase
/// becomes lower_snake_case.
///
/// This is the sole matching strategy; there is no fuzzy or
/// case-insensitive fallback. An explicit `#[rowmap(column = "...")]`
/// override bypasses it entirely.
pub fn column_name(param: &str) -> String {
    let mut name = String::with_capacity(param.len() + 4);
    for c in param.chars() {
        if c.is_ascii_uppercase() {
            name.push('_');
            name.push(c.to_ascii_lowercase());
        } else {
            name.push(c);
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn column_name_derivation() {
        assert_eq!(column_name("firstName"), "first_name");
        assert_eq!(column_name("intValue"), "int_value");
        assert_eq!(column_name("value"), "value");
        assert_eq!(column_name("aB"), "a_b");
    }

    #[test]
    fn scalar_columns() -> anyhow::Result<()> {
        let schema = Schema::new(vec![Field::primitive("n"), Field::primitive("s")]);
        let row = Row::new(vec![
            FieldValue::primitive("42"),
            FieldValue::primitive("hello"),
        ]);

        assert_eq!(decode_column::<i32>(&schema, &row, "n")?, 42);
        assert_eq!(decode_column::<String>(&schema, &row, "s")?, "hello");
        assert_eq!(decode_column::<Option<i64>>(&schema, &row, "n")?, Some(42));

        Ok(())
    }

    #[test]
    fn null_columns() {
        let schema = Schema::new(vec![Field::primitive("n")]);
        let row = Row::new(vec![FieldValue::Null]);

        // Null is None for Option fields of any scalar type and an error
        // otherwise.
        assert_eq!(
            decode_column::<Option<i32>>(&schema, &row, "n").unwrap(),
            None
        );
        assert_eq!(
            decode_column::<Option<String>>(&schema, &row, "n").unwrap(),
            None
        );
        assert_matches!(
            decode_column::<i32>(&schema, &row, "n"),
            Err(MapError::UnexpectedNull { column }) if column == "n"
        );
    }

    #[test]
    fn missing_column_and_short_row() {
        let schema = Schema::new(vec![Field::primitive("a"), Field::primitive("b")]);
        let row = Row::new(vec![FieldValue::primitive("1")]);

        assert_matches!(
            decode_column::<i32>(&schema, &row, "c"),
            Err(MapError::ColumnNotFound { column }) if column == "c"
        );
        // "b" exists in the schema but the row is short.
        assert_matches!(
            decode_column::<i32>(&schema, &row, "b"),
            Err(MapError::ColumnNotFound { column }) if column == "b"
        );
    }

    #[test]
    fn repeated_primitives_preserve_order() -> anyhow::Result<()> {
        let schema = Schema::new(vec![Field::repeated("xs")]);
        let row = Row::new(vec![FieldValue::repeated(vec![
            FieldValue::primitive("3"),
            FieldValue::primitive("1"),
            FieldValue::primitive("2"),
        ])]);

        assert_eq!(decode_column::<Vec<i32>>(&schema, &row, "xs")?, [3, 1, 2]);

        Ok(())
    }

    #[test]
    fn empty_repeated_is_empty_not_null() -> anyhow::Result<()> {
        let schema = Schema::new(vec![Field::repeated("xs")]);
        let row = Row::new(vec![FieldValue::repeated(vec![])]);

        assert_eq!(decode_column::<Vec<String>>(&schema, &row, "xs")?, Vec::<String>::new());

        Ok(())
    }

    #[test]
    fn shape_mismatches() {
        let schema = Schema::new(vec![Field::repeated("xs")]);
        let row = Row::new(vec![FieldValue::repeated(vec![])]);

        assert_matches!(
            decode_column::<i32>(&schema, &row, "xs"),
            Err(MapError::UnexpectedShape {
                expected: "primitive",
                found: "repeated",
                ..
            })
        );

        let schema = Schema::new(vec![Field::primitive("x")]);
        let row = Row::new(vec![FieldValue::primitive("1")]);
        assert_matches!(
            decode_column::<Vec<i32>>(&schema, &row, "x"),
            Err(MapError::UnexpectedShape {
                expected: "repeated",
                found: "primitive",
                ..
            })
        );
    }

    // A hand-written impl, standing in for the derive.
    #[derive(Debug, PartialEq)]
    struct Point {
        x: i64,
        y: i64,
    }

    impl FromRow for Point {
        fn from_row(schema: &Schema, row: &Row) -> Result<Self, MapError> {
            Ok(Self {
                x: decode_column(schema, row, &column_name("x"))?,
                y: decode_column(schema, row, &column_name("y"))?,
            })
        }
    }

    impl DecodeValue for Point {
        fn decode(field: &Field, value: &FieldValue) -> Result<Self, MapError> {
            decode_record(field, value)
        }

        fn check_field(field: &Field) -> Result<(), MapError> {
            check_record::<Self>(field)
        }
    }

    fn point_schema() -> Schema {
        Schema::new(vec![Field::primitive("x"), Field::primitive("y")])
    }

    fn point_row(x: &str, y: &str) -> Row {
        Row::new(vec![FieldValue::primitive(x), FieldValue::primitive(y)])
    }

    #[test]
    fn record_recursion_uses_subfields_schema() -> anyhow::Result<()> {
        // The outer schema has no "x"/"y"; decoding only succeeds if the
        // recursive call switches to the subfields schema.
        let schema = Schema::new(vec![
            Field::primitive("label"),
            Field::record("origin", point_schema()),
        ]);
        let row = Row::new(vec![
            FieldValue::primitive("start"),
            FieldValue::record(point_row("4", "5")),
        ]);

        let point: Point = decode_column(&schema, &row, "origin")?;
        assert_eq!(point, Point { x: 4, y: 5 });

        Ok(())
    }

    #[test]
    fn null_record_is_absent() -> anyhow::Result<()> {
        let schema = Schema::new(vec![Field::record("origin", point_schema())]);
        let row = Row::new(vec![FieldValue::Null]);

        // No recursive decode is attempted on a null record.
        assert_eq!(decode_column::<Option<Point>>(&schema, &row, "origin")?, None);

        Ok(())
    }

    #[test]
    fn record_field_needs_subfields() {
        let schema = Schema::new(vec![Field::primitive("origin")]);
        let row = Row::new(vec![FieldValue::primitive("oops")]);

        assert_matches!(
            decode_column::<Point>(&schema, &row, "origin"),
            Err(MapError::NoConverter { column, .. }) if column == "origin"
        );

        // The subfields check comes before null handling, so even a null
        // value in a subfield-less column rejects an optional record field.
        let row = Row::new(vec![FieldValue::Null]);
        assert_matches!(
            decode_column::<Option<Point>>(&schema, &row, "origin"),
            Err(MapError::NoConverter { column, .. }) if column == "origin"
        );
    }

    #[test]
    fn repeated_records_decode_each_element() -> anyhow::Result<()> {
        let schema = Schema::new(vec![Field::repeated_record("points", point_schema())]);
        let row = Row::new(vec![FieldValue::repeated(vec![
            FieldValue::record(point_row("1", "2")),
            FieldValue::record(point_row("3", "4")),
        ])]);

        let points: Vec<Point> = decode_column(&schema, &row, "points")?;
        assert_eq!(
            points,
            [Point { x: 1, y: 2 }, Point { x: 3, y: 4 }]
        );

        Ok(())
    }
}
