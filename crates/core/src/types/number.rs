//! Numeric product fields (`quantity`, `price`).
//!
//! Both are stored as [`Decimal`] and written to JSON as numbers: integral
//! values as integers, everything else as floats.
//!
//! Update payloads are accepted leniently as [`NumericInput`]. Numbers and
//! numeric strings become decimals; any other value is kept verbatim so the
//! store, not the request parser, decides that it cannot be saved.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serializer};
use thiserror::Error;

/// A value that cannot be stored in a numeric field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} is not a number: {value}")]
pub struct InvalidNumber {
    pub field: &'static str,
    pub value: String,
}

/// A numeric field exactly as a client supplied it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumericInput {
    /// A JSON number or a string that parses as one.
    Number(Decimal),
    /// Anything else, rendered as text.
    Other(String),
}

impl NumericInput {
    /// The decimal value, or [`InvalidNumber`] naming `field`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidNumber` if the input was not numeric.
    pub fn to_decimal(&self, field: &'static str) -> Result<Decimal, InvalidNumber> {
        match self {
            Self::Number(value) => Ok(*value),
            Self::Other(value) => Err(InvalidNumber {
                field,
                value: value.clone(),
            }),
        }
    }
}

impl From<Decimal> for NumericInput {
    fn from(value: Decimal) -> Self {
        Self::Number(value)
    }
}

fn parse_text(text: &str) -> NumericInput {
    Decimal::from_str(text.trim())
        .or_else(|_| Decimal::from_scientific(text.trim()))
        .map_or_else(|_| NumericInput::Other(text.to_owned()), NumericInput::Number)
}

struct NumericInputVisitor;

impl<'de> Visitor<'de> for NumericInputVisitor {
    type Value = NumericInput;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(NumericInput::Number(Decimal::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(NumericInput::Number(Decimal::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        // Shortest round-trip text keeps 9.99 as 9.99
        Ok(parse_text(&v.to_string()))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(parse_text(v))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(NumericInput::Other(v.to_string()))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(NumericInput::Other("[array]".to_string()))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(NumericInput::Other("[object]".to_string()))
    }
}

impl<'de> Deserialize<'de> for NumericInput {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NumericInputVisitor)
    }
}

/// Serde adapter for `Option<Decimal>` fields written as JSON numbers.
///
/// Deserialization accepts numbers and numeric strings and rejects anything
/// else.
pub mod number_option {
    use super::{Decimal, Deserializer, Serializer, ToPrimitive};

    /// Write integral values as integers and the rest as floats.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(value: &Option<Decimal>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            None => serializer.serialize_none(),
            Some(value) => match value.fract().is_zero().then(|| value.to_i64()).flatten() {
                Some(integer) => serializer.serialize_some(&integer),
                None => serializer.serialize_some(&value.to_f64().unwrap_or_default()),
            },
        }
    }

    /// # Errors
    ///
    /// Returns an error for values that are neither numbers nor numeric strings.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Decimal>, D::Error> {
        rust_decimal::serde::float_option::deserialize(deserializer)
    }
}
