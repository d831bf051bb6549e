//! Codecs shared by the LoRaLab host tools: device credentials, firmware
//! headers and uplink payloads.

pub mod c_array;
pub mod credentials;
pub mod header;
pub mod hex_bytes;
pub mod payload;
