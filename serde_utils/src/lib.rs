//! Encodings used by the Engine API.
//!
//! Quantities are `0x`-prefixed hexadecimal numbers without leading zeros.
//! Byte strings are `0x`-prefixed hexadecimal strings of any even length.
//! Non-human-readable formats receive plain bytes.

pub mod prefixed_hex_or_bytes;
pub mod prefixed_hex_or_bytes_array;
pub mod prefixed_hex_quantity;

mod shared;
