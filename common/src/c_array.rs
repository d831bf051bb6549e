//! Print EUIs and keys as C array literals, e.g. `{ 0x77, 0x66, ... }`.
//!
//! EUIs are inverted in memory, keys are not.

use thiserror::Error;

use crate::credentials::{EUI_LEN, KEY_LEN};
use crate::hex_bytes::{decode_field, join_byte_literals, ByteOrder, HexError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArrayFormatError {
    #[error("EUI needs exactly {expected} hex characters, but had {actual}")]
    EuiLength { expected: usize, actual: usize },

    #[error("AppKey needs exactly {expected} hex characters, but had {actual}")]
    KeyLength { expected: usize, actual: usize },

    #[error(transparent)]
    Hex(#[from] HexError),

    #[error("Unexpected number of arguments ({0}), expected <eui> or <deveui> <appeui> <appkey>")]
    ArgumentCount(usize),
}

fn literal(bytes: &[u8]) -> String {
    format!("{{ {} }}", join_byte_literals(bytes))
}

/// Format an 8 byte EUI in reversed (LSBF) order.
pub fn format_eui(eui: &str) -> Result<String, ArrayFormatError> {
    let actual = eui.chars().count();
    if actual != 2 * EUI_LEN {
        return Err(ArrayFormatError::EuiLength {
            expected: 2 * EUI_LEN,
            actual,
        });
    }
    let bytes: [u8; EUI_LEN] = decode_field(eui, ByteOrder::Reversed)?;
    Ok(literal(&bytes))
}

/// Format a 16 byte key in forward order.
pub fn format_key(key: &str) -> Result<String, ArrayFormatError> {
    let actual = key.chars().count();
    if actual != 2 * KEY_LEN {
        return Err(ArrayFormatError::KeyLength {
            expected: 2 * KEY_LEN,
            actual,
        });
    }
    let bytes: [u8; KEY_LEN] = decode_field(key, ByteOrder::Forward)?;
    Ok(literal(&bytes))
}

/// Format positional command line arguments.
///
/// One argument is a single EUI. Three arguments are DevEUI, AppEUI and
/// AppKey. One output line per argument.
pub fn format_arguments<S: AsRef<str>>(args: &[S]) -> Result<Vec<String>, ArrayFormatError> {
    match args {
        [eui] => Ok(vec![format_eui(eui.as_ref())?]),
        [dev_eui, app_eui, app_key] => Ok(vec![
            format_eui(dev_eui.as_ref())?,
            format_eui(app_eui.as_ref())?,
            format_key(app_key.as_ref())?,
        ]),
        other => Err(ArrayFormatError::ArgumentCount(other.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_eui_reverses() {
        assert_eq!(
            format_eui("0011223344556677").unwrap(),
            "{ 0x77, 0x66, 0x55, 0x44, 0x33, 0x22, 0x11, 0x00 }"
        );
    }

    #[test]
    fn test_format_key_forward() {
        assert_eq!(
            format_key("000102030405060708090a0b0c0d0e0f").unwrap(),
            "{ 0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F }"
        );
    }

    #[test]
    fn test_format_key_zeros() {
        let formatted = format_key(&"00".repeat(16)).unwrap();
        assert!(formatted.starts_with("{ ") && formatted.ends_with(" }"));
        assert_eq!(formatted.matches("0x00").count(), 16);
        assert_eq!(formatted.matches(", ").count(), 15);
    }

    #[test]
    fn test_format_eui_wrong_length() {
        let err = format_eui("00112233").unwrap_err();
        assert_eq!(
            err,
            ArrayFormatError::EuiLength {
                expected: 16,
                actual: 8
            }
        );
        assert_eq!(
            err.to_string(),
            "EUI needs exactly 16 hex characters, but had 8"
        );
    }

    #[test]
    fn test_format_key_wrong_length() {
        // An EUI is not a key
        assert_eq!(
            format_key("0011223344556677"),
            Err(ArrayFormatError::KeyLength {
                expected: 32,
                actual: 16
            })
        );
    }

    #[test]
    fn test_format_eui_non_hex() {
        assert!(matches!(
            format_eui("00112233445566xx"),
            Err(ArrayFormatError::Hex(HexError::InvalidCharacter { c: 'x', .. }))
        ));
    }

    #[test]
    fn test_format_arguments() {
        assert_eq!(
            format_arguments(&["0102030405060708"]).unwrap(),
            vec!["{ 0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01 }"]
        );

        let lines = format_arguments(&[
            "0102030405060708",
            "1112131415161718",
            "000102030405060708090a0b0c0d0e0f",
        ])
        .unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "{ 0x18, 0x17, 0x16, 0x15, 0x14, 0x13, 0x12, 0x11 }");
        assert!(lines[2].starts_with("{ 0x00, 0x01, 0x02"));
    }

    #[test]
    fn test_format_arguments_count() {
        let none: [&str; 0] = [];
        assert_eq!(
            format_arguments(&none),
            Err(ArrayFormatError::ArgumentCount(0))
        );
        assert_eq!(
            format_arguments(&["a", "b"]),
            Err(ArrayFormatError::ArgumentCount(2))
        );
    }

    #[test]
    fn test_format_eui_counts_characters() {
        assert_eq!(
            format_eui("éééééééé"),
            Err(ArrayFormatError::EuiLength {
                expected: 16,
                actual: 8
            })
        );
        assert_eq!(
            format_eui("00112233445566é7"),
            Err(ArrayFormatError::Hex(HexError::InvalidCharacter { c: 'é', index: 14 }))
        );
    }
}
