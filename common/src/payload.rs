//! # Uplink Payload
//!
//! The feather coverage testers send a 2 byte application payload with every
//! uplink:
//!
//! ```text
//!     0           8          16
//!     +-----------+-----------+
//!     | VBat      | RSSI      |
//!     +-----------+-----------+
//! ```
//!
//! - `VBat`: The upper 8 bits of the 10 bit battery voltage ADC reading. The
//!   reading is shifted back by 3 bits (the lowest bits are lost) and
//!   scaled to the 3.3 V ADC reference.
//! - `RSSI`: Signed RSSI of the previously received downlink, offset by the
//!   radio front-end. See the LMIC radio driver (`radio.c`) and the RFM95
//!   datasheet (section 5.5.5).
//!
//! Bytes after the second one are ignored.

use thiserror::Error;

/// Number of bytes the payload must at least contain.
pub const PAYLOAD_LEN: usize = 2;

/// Shift restoring the ADC scale of the transmitted voltage byte.
pub const VOLTAGE_SHIFT: u32 = 3;
/// ADC reference voltage in volts.
pub const ADC_REFERENCE_VOLTS: f64 = 3.3;
/// Full scale of the 10 bit ADC.
pub const ADC_FULL_SCALE: f64 = 1024.0;
/// Offset between the transmitted RSSI byte and dBm.
pub const RSSI_OFFSET_DBM: i16 = 64;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    #[error("insufficient data: expected at least {expected} bytes, got {actual}")]
    InsufficientData { expected: usize, actual: usize },
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TelemetryPayload {
    /// Battery voltage at transmission time, in volts
    pub voltage: f64,
    /// RSSI of the previous downlink, in dBm
    pub rssi: i16,
}

impl TelemetryPayload {
    pub fn decode(data: &[u8]) -> Result<Self, PayloadError> {
        if data.len() < PAYLOAD_LEN {
            return Err(PayloadError::InsufficientData {
                expected: PAYLOAD_LEN,
                actual: data.len(),
            });
        }
        Ok(Self {
            voltage: Self::convert_voltage(data[0]),
            rssi: Self::convert_rssi(data[1]),
        })
    }

    /// Convert the raw voltage byte to volts.
    pub fn convert_voltage(raw: u8) -> f64 {
        f64::from(u16::from(raw) << VOLTAGE_SHIFT) * ADC_REFERENCE_VOLTS / ADC_FULL_SCALE
    }

    /// Convert the raw RSSI byte to dBm.
    pub fn convert_rssi(raw: u8) -> i16 {
        i16::from(raw as i8) - RSSI_OFFSET_DBM
    }
}
