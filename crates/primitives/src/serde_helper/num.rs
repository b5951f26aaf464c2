//! Numeric helpers

use crate::quantity::parse_quantity;
use serde::{de, Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrQuantity {
    Int(u64),
    Quantity(String),
}

impl NumberOrQuantity {
    fn into_u64<E: de::Error>(self) -> Result<u64, E> {
        match self {
            Self::Int(value) => Ok(value),
            Self::Quantity(value) => parse_quantity(&value).map_err(E::custom),
        }
    }
}

/// Deserializes an `u64` accepting a hex quantity string, a decimal string or a number.
pub fn from_u64_hex_or_decimal<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    NumberOrQuantity::deserialize(deserializer)?.into_u64()
}

/// Like [`from_u64_hex_or_decimal`], but `null` yields `None`.
pub fn from_u64_hex_or_decimal_opt<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrQuantity>::deserialize(deserializer)? {
        Some(value) => value.into_u64().map(Some),
        None => Ok(None),
    }
}
