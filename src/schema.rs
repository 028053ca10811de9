//! The in-memory model of one query result: a schema describing the columns,
//! and rows of values positionally aligned with it.
//!
//! Both halves are produced by the warehouse client and borrowed, read-only,
//! for the duration of one [`map`](crate::map) call.

use serde::{Deserialize, Serialize};

/// An ordered description of a result row's columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    /// Creates a schema from an ordered list of fields.
    ///
    /// Field names are expected to be unique within one schema; lookup
    /// returns the first match.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// The number of columns.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema has no columns.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The fields, in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Finds a column by exact name, returning its position and definition.
    pub fn lookup(&self, name: &str) -> Option<(usize, &Field)> {
        self.fields
            .iter()
            .enumerate()
            .find(|(_, field)| field.name == name)
    }
}

/// One column in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// The column name.
    pub name: String,
    /// The column shape.
    pub kind: FieldKind,
}

/// The shape of a column: scalar or record, single or repeated.
///
/// Record shapes carry the schema of their sub-columns, so a schema is a
/// tree and "subfields present iff record-kind" holds by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// A scalar column.
    Primitive,
    /// A struct-typed column; values are nested rows.
    Record(Schema),
    /// An array-typed column of scalars.
    RepeatedPrimitive,
    /// An array-typed column of nested rows.
    RepeatedRecord(Schema),
}

impl Field {
    /// A scalar column.
    pub fn primitive(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Primitive,
        }
    }

    /// A struct-typed column with the given sub-columns.
    pub fn record(name: impl Into<String>, subfields: Schema) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Record(subfields),
        }
    }

    /// An array-typed column of scalars.
    pub fn repeated(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::RepeatedPrimitive,
        }
    }

    /// An array-typed column of nested rows with the given sub-columns.
    pub fn repeated_record(name: impl Into<String>, subfields: Schema) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::RepeatedRecord(subfields),
        }
    }

    /// The nested schema, for record-shaped columns.
    pub fn subfields(&self) -> Option<&Schema> {
        match &self.kind {
            FieldKind::Record(subfields) | FieldKind::RepeatedRecord(subfields) => Some(subfields),
            FieldKind::Primitive | FieldKind::RepeatedPrimitive => None,
        }
    }
}

/// The values for one result row, positionally aligned with a [`Schema`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: Vec<FieldValue>,
}

impl Row {
    /// Creates a row from values in schema order.
    pub fn new(values: Vec<FieldValue>) -> Self {
        Self { values }
    }

    /// The number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the row has no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The values, in schema order.
    pub fn values(&self) -> &[FieldValue] {
        &self.values
    }

    /// The value at a column position.
    pub fn get(&self, index: usize) -> Option<&FieldValue> {
        self.values.get(index)
    }
}

/// One column's value within a [`Row`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// SQL NULL.
    Null,
    /// A scalar value, in its textual wire form.
    ///
    /// The warehouse hands every primitive back as text: integers and floats
    /// as decimal text, booleans as `true`/`false`, timestamps as epoch
    /// seconds with an optional fractional part.
    Primitive(String),
    /// A nested row, aligned with the column's subfields schema.
    Record(Row),
    /// An ordered list of values, each itself scalar or record.
    Repeated(Vec<FieldValue>),
}

impl FieldValue {
    /// A scalar value from its textual wire form.
    pub fn primitive(text: impl Into<String>) -> Self {
        Self::Primitive(text.into())
    }

    /// A nested row value.
    pub fn record(row: Row) -> Self {
        Self::Record(row)
    }

    /// A repeated value.
    pub fn repeated(values: Vec<FieldValue>) -> Self {
        Self::Repeated(values)
    }

    /// Whether this value is SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The shape tag, for error messages.
    pub(crate) fn shape(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Primitive(_) => "primitive",
            Self::Record(_) => "record",
            Self::Repeated(_) => "repeated",
        }
    }
}
