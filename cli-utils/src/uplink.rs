//! Stored uplinks of the feather coverage testers.

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One uplink as stored by the network server integration.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct UplinkEntry {
    pub id: i64,
    pub device_name: String,
    #[serde(default)]
    pub device_otaa_dev_eui: String,
    #[serde(default)]
    pub device_otaa_app_eui: String,
    #[serde(default)]
    pub device_f_cnt_up: u32,
    /// Uplink frequency in Hz
    #[serde(default)]
    pub frequency: u64,
    #[serde(default)]
    pub data_rate: String,
    /// FRMPayload, hex encoded
    pub payload_raw: String,
    pub reception_time: DateTime<Utc>,
    /// One entry per gateway that received the uplink
    #[serde(default)]
    pub receptions: Vec<Reception>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Reception {
    pub time: DateTime<Utc>,
    pub rssi: i32,
    #[serde(default)]
    pub snr: Option<f64>,
    pub gateway_eui: String,
}

/// Selects uplinks received within `since..=until`, optionally restricted to
/// some AppEUIs.
#[derive(Clone, Debug, PartialEq)]
pub struct UplinkFilter {
    pub since: DateTime<Utc>,
    pub until: DateTime<Utc>,
    /// Empty means all devices
    pub app_euis: Vec<String>,
}

impl UplinkFilter {
    pub fn matches(&self, entry: &UplinkEntry) -> bool {
        let in_window = entry.reception_time >= self.since && entry.reception_time <= self.until;
        let app_eui_selected = self.app_euis.is_empty()
            || self
                .app_euis
                .iter()
                .any(|eui| eui.eq_ignore_ascii_case(&entry.device_otaa_app_eui));
        in_window && app_eui_selected
    }
}

pub trait UplinkSource {
    /// Fetch all uplinks matching `filter`, in storage order.
    fn fetch(&self, filter: &UplinkFilter) -> Result<Vec<UplinkEntry>>;
}

/// Uplinks exported from the database as a JSON array.
pub struct JsonDumpSource {
    path: PathBuf,
}

impl JsonDumpSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl UplinkSource for JsonDumpSource {
    fn fetch(&self, filter: &UplinkFilter) -> Result<Vec<UplinkEntry>> {
        let file = File::open(&self.path)
            .with_context(|| format!("Could not open uplink dump {}", self.path.display()))?;
        let entries: Vec<UplinkEntry> = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Could not parse uplink dump {}", self.path.display()))?;
        Ok(entries
            .into_iter()
            .filter(|entry| filter.matches(entry))
            .collect())
    }
}
