//! # Hex / Byte Conversion
//!
//! Credentials are handed to us as hex strings (one hex pair per byte). The
//! radio stack on the device stores some of them in natural order and some
//! of them least-significant-byte first, so every conversion takes the
//! desired [`ByteOrder`] explicitly. Nothing here guesses the order from the
//! data.

use thiserror::Error;

/// Order in which the hex pairs of a string end up in memory.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ByteOrder {
    /// Byte `i` is hex pair `i` of the string (keys, session keys).
    Forward,
    /// Byte `i` is hex pair `N - 1 - i` of the string (EUIs, LSBF).
    Reversed,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HexError {
    #[error("odd number of hex characters ({0})")]
    OddLength(usize),

    #[error("invalid hex character {c:?} at position {index}")]
    InvalidCharacter { c: char, index: usize },

    #[error("expected exactly {expected} hex characters, but had {actual}")]
    WrongLength { expected: usize, actual: usize },
}

/// Convert a hex string into bytes.
///
/// With [`ByteOrder::Reversed`] the last hex pair of the input becomes the
/// first byte of the output. Upper- and lower-case digits are accepted.
pub fn to_bytes(hex_str: &str, order: ByteOrder) -> Result<Vec<u8>, HexError> {
    check_ascii(hex_str)?;
    if hex_str.len() % 2 != 0 {
        return Err(HexError::OddLength(hex_str.len()));
    }
    let mut bytes = hex::decode(hex_str).map_err(|e| match e {
        hex::FromHexError::InvalidHexCharacter { c, index } => HexError::InvalidCharacter { c, index },
        _ => HexError::OddLength(hex_str.len()),
    })?;
    if order == ByteOrder::Reversed {
        bytes.reverse();
    }
    Ok(bytes)
}

/// Reject non-ASCII input up front so that lengths and positions count
/// characters.
fn check_ascii(hex_str: &str) -> Result<(), HexError> {
    match hex_str.chars().enumerate().find(|(_, c)| !c.is_ascii()) {
        Some((index, c)) => Err(HexError::InvalidCharacter { c, index }),
        None => Ok(()),
    }
}

/// Convert a hex string of exactly `2 * N` characters into an `N` byte array.
pub fn decode_field<const N: usize>(hex_str: &str, order: ByteOrder) -> Result<[u8; N], HexError> {
    check_ascii(hex_str)?;
    if hex_str.len() != 2 * N {
        return Err(HexError::WrongLength {
            expected: 2 * N,
            actual: hex_str.len(),
        });
    }
    let mut field = [0; N];
    field.copy_from_slice(&to_bytes(hex_str, order)?);
    Ok(field)
}

/// Return `n` zero bytes.
///
/// Goes through [`to_bytes`] like every other field so that the zero fill
/// and real credentials share one code path.
pub fn all_zeros(n: usize) -> Result<Vec<u8>, HexError> {
    to_bytes(&"00".repeat(n), ByteOrder::Forward)
}

/// Fixed-size variant of [`all_zeros`].
pub fn zero_field<const N: usize>() -> Result<[u8; N], HexError> {
    decode_field(&"00".repeat(N), ByteOrder::Forward)
}

/// Encode bytes as lower-case hex, the inverse of a forward conversion.
pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Render bytes as a comma separated list of C byte literals, e.g.
/// `0x01, 0xAB`.
pub fn join_byte_literals(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("0x{:02X}", b))
        .collect::<Vec<_>>()
        .join(", ")
}
