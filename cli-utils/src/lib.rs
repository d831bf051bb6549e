//! Host tools for provisioning LoRaLab devices and exporting their uplinks.

pub mod config;
pub mod devices;
pub mod export;
pub mod generator;
pub mod logging;
pub mod uplink;
