//! Scalar value conversion.
//!
//! The warehouse carries every primitive column value as text, so each
//! supported destination scalar parses that wire form. The set of
//! [`Convert`] impls is the whole converter registry; it is fixed at compile
//! time and looked up by exact type, with no subtype fallback.

use chrono::{DateTime, Utc};

/// An error converting a raw column value into a typed scalar.
#[derive(Debug, Clone, thiserror::Error)]
#[error("cannot interpret {text:?} as {target}")]
pub struct ConvertError {
    /// Name of the target scalar type.
    pub target: &'static str,
    /// The raw column text that failed to parse.
    pub text: String,
}

/// A scalar destination type that can be produced from a raw column value.
///
/// Null handling lives above this trait: converters only ever see the text
/// of a non-null column.
pub trait Convert: Sized {
    /// Name used in error messages.
    const TARGET: &'static str;

    /// Parses the textual wire form of a non-null column value.
    fn convert(text: &str) -> Result<Self, ConvertError>;
}

impl Convert for String {
    const TARGET: &'static str = "a string";

    fn convert(text: &str) -> Result<Self, ConvertError> {
        Ok(text.to_string())
    }
}

macro_rules! parsed_scalars {
    ($($ty:ty => $target:literal),* $(,)?) => {
        $(
            impl Convert for $ty {
                const TARGET: &'static str = $target;

                fn convert(text: &str) -> Result<Self, ConvertError> {
                    text.parse().map_err(|_| ConvertError {
                        target: $target,
                        text: text.to_string(),
                    })
                }
            }
        )*
    };
}

parsed_scalars! {
    i32 => "a 32-bit integer",
    i64 => "a 64-bit integer",
    f64 => "a double-precision float",
    bool => "a boolean",
}

impl Convert for DateTime<Utc> {
    const TARGET: &'static str = "a timestamp";

    fn convert(text: &str) -> Result<Self, ConvertError> {
        parse_epoch_micros(text)
            .and_then(DateTime::from_timestamp_micros)
            .ok_or_else(|| ConvertError {
                target: Self::TARGET,
                text: text.to_string(),
            })
    }
}

/// Parses the timestamp wire form: epoch seconds with an optional fractional
/// part, at up to microsecond precision (e.g. `"1708753724.0"`). The instant
/// is always UTC.
fn parse_epoch_micros(text: &str) -> Option<i64> {
    let (seconds, fraction) = match text.split_once('.') {
        Some((seconds, fraction)) => (seconds, fraction),
        None => (text, ""),
    };

    let seconds: i64 = seconds.parse().ok()?;
    if fraction.len() > 6 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let mut micros: i64 = 0;
    if !fraction.is_empty() {
        micros = format!("{fraction:0<6}").parse().ok()?;
        if text.starts_with('-') {
            micros = -micros;
        }
    }

    seconds.checked_mul(1_000_000)?.checked_add(micros)
}
