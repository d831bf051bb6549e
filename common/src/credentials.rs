//! # Device Credentials
//!
//! Every device is provisioned either via OTAA (over-the-air activation) or
//! via ABP (activation by personalization). The generated firmware header
//! declares the symbols of both methods unconditionally and selects one of
//! them with a `#define`, so a [`CredentialSet`] always carries all fields.
//! The triple belonging to the other method is filled with zeros.
//!
//! ## Column Layout
//!
//! ```text
//!        +---------+------------+------------+------------+
//!        | 0       | 1          | 2          | 3          |
//!        +---------+------------+------------+------------+
//!   OTAA | name    | DevEUI     | AppEUI     | AppKey     |
//!   ABP  | name    | DevAddr    | NwkSKey    | AppSKey    |
//!        +---------+------------+------------+------------+
//! ```
//!
//! EUIs are stored LSB first on the device, keys are stored as-is. DevAddr
//! is a decimal number.

use core::fmt;
use std::num::ParseIntError;

use thiserror::Error;

use crate::hex_bytes::{decode_field, zero_field, ByteOrder, HexError};

pub const EUI_LEN: usize = 8;
pub const KEY_LEN: usize = 16;

/// Number of fields a device record must have (name + three credentials).
pub const RECORD_FIELDS: usize = 4;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(serde::Deserialize, serde::Serialize))]
pub enum ActivationMode {
    #[cfg_attr(feature = "serde_support", serde(rename = "otaa"))]
    Otaa,
    #[cfg_attr(feature = "serde_support", serde(rename = "abp"))]
    Abp,
}

impl ActivationMode {
    /// Name of the mode macro in the generated header.
    pub fn macro_name(&self) -> &'static str {
        match self {
            Self::Otaa => "OTAA",
            Self::Abp => "ABP",
        }
    }
}

impl fmt::Display for ActivationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.macro_name())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("expected at least {expected} fields, but record had {actual}")]
    MissingFields { expected: usize, actual: usize },

    #[error("invalid {field}: {source}")]
    InvalidHex {
        field: &'static str,
        #[source]
        source: HexError,
    },

    #[error("device name {0:?} is not a plain file name")]
    InvalidName(String),

    #[error("cannot parse dev addr {value:?}: {source}")]
    InvalidDevAddr {
        value: String,
        #[source]
        source: ParseIntError,
    },
}

/// One row of a device table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceRecord {
    /// Device name, also used as output file name
    pub name: String,
    /// The three mode dependent credential columns
    pub columns: [String; 3],
}

impl DeviceRecord {
    /// Build a record from the fields of one table row.
    ///
    /// Fields beyond the fourth are ignored. The name becomes a file name, so
    /// it must be non-empty and must not contain path separators or be `.`/`..`.
    pub fn from_fields<I, S>(fields: I) -> Result<Self, CredentialError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields
            .into_iter()
            .take(RECORD_FIELDS)
            .map(Into::into)
            .collect();
        let [name, first, second, third] = <[String; RECORD_FIELDS]>::try_from(fields)
            .map_err(|fields| CredentialError::MissingFields {
                expected: RECORD_FIELDS,
                actual: fields.len(),
            })?;
        if !is_plain_file_name(&name) {
            return Err(CredentialError::InvalidName(name));
        }
        Ok(Self {
            name,
            columns: [first, second, third],
        })
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\', '\0'])
}

/// Credentials of one activation method, before flattening.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Activation {
    Otaa {
        dev_eui: [u8; EUI_LEN],
        app_eui: [u8; EUI_LEN],
        app_key: [u8; KEY_LEN],
    },
    Abp {
        dev_addr: u32,
        nwk_skey: [u8; KEY_LEN],
        app_skey: [u8; KEY_LEN],
    },
}

impl Activation {
    fn parse(record: &DeviceRecord, mode: ActivationMode) -> Result<Self, CredentialError> {
        let [first, second, third] = &record.columns;
        match mode {
            ActivationMode::Otaa => Ok(Self::Otaa {
                dev_eui: hex_field("DevEUI", first, ByteOrder::Reversed)?,
                app_eui: hex_field("AppEUI", second, ByteOrder::Reversed)?,
                app_key: hex_field("AppKey", third, ByteOrder::Forward)?,
            }),
            ActivationMode::Abp => {
                let dev_addr = first.parse::<u32>().map_err(|source| {
                    CredentialError::InvalidDevAddr {
                        value: first.clone(),
                        source,
                    }
                })?;
                Ok(Self::Abp {
                    dev_addr,
                    nwk_skey: hex_field("NwkSKey", second, ByteOrder::Forward)?,
                    app_skey: hex_field("AppSKey", third, ByteOrder::Forward)?,
                })
            }
        }
    }
}

fn hex_field<const N: usize>(
    field: &'static str,
    value: &str,
    order: ByteOrder,
) -> Result<[u8; N], CredentialError> {
    decode_field(value, order).map_err(|source| CredentialError::InvalidHex { field, source })
}

fn zeros<const N: usize>(field: &'static str) -> Result<[u8; N], CredentialError> {
    zero_field().map_err(|source| CredentialError::InvalidHex { field, source })
}

/// All credential symbols of one device, as declared in the firmware header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CredentialSet {
    pub mode: ActivationMode,
    /// Device EUI (LSBF)
    pub dev_eui: [u8; EUI_LEN],
    /// Application EUI (LSBF)
    pub app_eui: [u8; EUI_LEN],
    /// Application root key
    pub app_key: [u8; KEY_LEN],
    /// Device address (ABP only)
    pub dev_addr: u32,
    /// Network session key (ABP only)
    pub nwk_skey: [u8; KEY_LEN],
    /// Application session key (ABP only)
    pub app_skey: [u8; KEY_LEN],
}

impl CredentialSet {
    fn flatten(activation: Activation) -> Result<Self, CredentialError> {
        match activation {
            Activation::Otaa {
                dev_eui,
                app_eui,
                app_key,
            } => Ok(Self {
                mode: ActivationMode::Otaa,
                dev_eui,
                app_eui,
                app_key,
                dev_addr: 0,
                nwk_skey: zeros("NwkSKey")?,
                app_skey: zeros("AppSKey")?,
            }),
            Activation::Abp {
                dev_addr,
                nwk_skey,
                app_skey,
            } => Ok(Self {
                mode: ActivationMode::Abp,
                dev_eui: zeros("DevEUI")?,
                app_eui: zeros("AppEUI")?,
                app_key: zeros("AppKey")?,
                dev_addr,
                nwk_skey,
                app_skey,
            }),
        }
    }
}

/// Resolve the credentials of one device record for the given mode.
pub fn build_credentials(
    record: &DeviceRecord,
    mode: ActivationMode,
) -> Result<CredentialSet, CredentialError> {
    CredentialSet::flatten(Activation::parse(record, mode)?)
}
