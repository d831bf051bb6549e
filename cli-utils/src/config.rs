//! Optional TOML configuration shared by the tools.
//!
//! Every value can also be given on the command line; command line flags win
//! over the file, the file wins over the built-in defaults.
//!
//! ```toml
//! [generator]
//! otaa_devices = "environments/otaa-devices.csv"
//! abp_devices = "environments/abp-devices.csv"
//! out_dir = "platformio/device-identifiers"
//! dev_addr_format = "hex"
//! on_error = "continue"
//!
//! [export]
//! source = "dumps/uplinks.json"
//! app_euis = ["0000000200000001"]
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use loralab_common::header::DevAddrFormat;
use serde::Deserialize;

use crate::generator::FailurePolicy;

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Default, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// CSV file with OTAA device configurations
    pub otaa_devices: Option<PathBuf>,
    /// CSV file with ABP device configurations
    pub abp_devices: Option<PathBuf>,
    /// Output directory for generated header files
    pub out_dir: Option<PathBuf>,
    /// File name suffix of generated header files
    pub suffix: Option<String>,
    /// Header template replacing the built-in LMIC skeleton
    pub template: Option<PathBuf>,
    pub dev_addr_format: Option<DevAddrFormat>,
    pub on_error: Option<FailurePolicy>,
}

impl GeneratorConfig {
    /// Fill unset values from `base`.
    pub fn or(self, base: GeneratorConfig) -> Self {
        Self {
            otaa_devices: self.otaa_devices.or(base.otaa_devices),
            abp_devices: self.abp_devices.or(base.abp_devices),
            out_dir: self.out_dir.or(base.out_dir),
            suffix: self.suffix.or(base.suffix),
            template: self.template.or(base.template),
            dev_addr_format: self.dev_addr_format.or(base.dev_addr_format),
            on_error: self.on_error.or(base.on_error),
        }
    }
}

#[derive(Debug, Default, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ExportConfig {
    /// JSON dump of the uplink table
    pub source: Option<PathBuf>,
    /// Only export uplinks of these AppEUIs
    #[serde(default)]
    pub app_euis: Vec<String>,
}

impl Config {
    pub fn from_toml(source: &str) -> Result<Self> {
        toml::from_str(source).context("Could not parse config file")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("Could not read config file {}", path.display()))?;
        Self::from_toml(&source)
    }

    /// Load the config file if one was given, otherwise use an empty config.
    pub fn load_optional(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
