//! JSON-RPC quantity encoding for block numbers.

use crate::BlockNumber;

/// Error returned when a string is neither a `0x`-prefixed hex quantity nor a decimal number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid quantity: {0:?}")]
pub struct InvalidQuantity(pub String);

/// Encodes a block number as a `0x`-prefixed, lowercase hex quantity without leading zeros.
///
/// ```
/// use txwatch_primitives::to_quantity;
/// assert_eq!(to_quantity(0), "0x0");
/// assert_eq!(to_quantity(200), "0xc8");
/// ```
pub fn to_quantity(number: BlockNumber) -> String {
    format!("{number:#x}")
}

/// Parses a quantity returned by a node.
///
/// Accepts `0x`-prefixed hex (either case) and plain decimal strings.
pub fn parse_quantity(value: &str) -> Result<BlockNumber, InvalidQuantity> {
    let value = value.trim();
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) if !hex.is_empty() => u64::from_str_radix(hex, 16),
        Some(_) => return Err(InvalidQuantity(value.to_string())),
        None => value.parse::<u64>(),
    };
    parsed.map_err(|_| InvalidQuantity(value.to_string()))
}
