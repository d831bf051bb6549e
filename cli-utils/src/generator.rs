//! Batch generation of device identifier headers.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{Context, Result};
use log::{error, info};
use loralab_common::{
    credentials::{build_credentials, ActivationMode, DeviceRecord},
    header::HeaderTemplate,
};
use serde::Deserialize;

use crate::{config::GeneratorConfig, devices};

pub const DEFAULT_OUT_DIR: &str = "platformio/device-identifiers";
pub const DEFAULT_SUFFIX: &str = ".h";

/// What to do when a single device cannot be generated.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop at the first failing device
    Abort,
    /// Log the failure, generate the remaining devices, fail at the end
    Continue,
}

impl Default for FailurePolicy {
    fn default() -> Self {
        Self::Abort
    }
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "abort" => Ok(Self::Abort),
            "continue" => Ok(Self::Continue),
            other => Err(format!(
                "invalid failure policy {:?}, expected \"abort\" or \"continue\"",
                other
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratorOptions {
    pub out_dir: PathBuf,
    pub suffix: String,
    pub on_error: FailurePolicy,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            suffix: DEFAULT_SUFFIX.to_string(),
            on_error: FailurePolicy::default(),
        }
    }
}

/// A device that could not be generated.
#[derive(Debug)]
pub struct DeviceFailure {
    pub device: String,
    pub error: anyhow::Error,
}

impl fmt::Display for DeviceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:#}", self.device, self.error)
    }
}

#[derive(Debug, Default)]
pub struct GenerationReport {
    /// Written header files, in input order
    pub written: Vec<PathBuf>,
    /// Failed devices (only filled with `FailurePolicy::Continue`)
    pub failed: Vec<DeviceFailure>,
}

impl GenerationReport {
    pub fn merge(&mut self, other: GenerationReport) {
        self.written.extend(other.written);
        self.failed.extend(other.failed);
    }
}

/// Path of the header file for `record`.
pub fn output_path(record: &DeviceRecord, options: &GeneratorOptions) -> PathBuf {
    options
        .out_dir
        .join(format!("{}{}", record.name, options.suffix))
}

/// Render and write the header of a single device.
///
/// An existing file with the same name is overwritten.
pub fn generate_header(
    record: &DeviceRecord,
    mode: ActivationMode,
    template: &HeaderTemplate,
    options: &GeneratorOptions,
) -> Result<PathBuf> {
    let path = output_path(record, options);
    info!("processing {:?}", path.file_name().unwrap_or_default());

    let creds = build_credentials(record, mode)
        .with_context(|| format!("Invalid {} credentials for device {:?}", mode, record.name))?;
    fs::write(&path, template.render(&creds))
        .with_context(|| format!("cannot open output file {}", path.display()))?;
    Ok(path)
}

/// Generate one header per record, in input order.
///
/// With `FailurePolicy::Abort` the first error is returned and files written
/// for earlier records stay in place.
pub fn generate_all(
    records: &[DeviceRecord],
    mode: ActivationMode,
    template: &HeaderTemplate,
    options: &GeneratorOptions,
) -> Result<GenerationReport> {
    fs::create_dir_all(&options.out_dir).with_context(|| {
        format!(
            "Could not create output directory {}",
            options.out_dir.display()
        )
    })?;

    let mut report = GenerationReport::default();
    for record in records {
        match generate_header(record, mode, template, options) {
            Ok(path) => report.written.push(path),
            Err(e) => match options.on_error {
                FailurePolicy::Abort => return Err(e),
                FailurePolicy::Continue => {
                    let failure = DeviceFailure {
                        device: record.name.clone(),
                        error: e,
                    };
                    error!("{}", failure);
                    report.failed.push(failure);
                }
            },
        }
    }
    Ok(report)
}

/// Fully resolved generator settings.
#[derive(Clone, Debug)]
pub struct GeneratorSettings {
    pub otaa_devices: Option<PathBuf>,
    pub abp_devices: Option<PathBuf>,
    pub template: HeaderTemplate,
    pub options: GeneratorOptions,
}

impl GeneratorSettings {
    pub fn from_config(config: GeneratorConfig) -> Result<Self> {
        if config.otaa_devices.is_none() && config.abp_devices.is_none() {
            anyhow::bail!("No device files configured, use --otaa-devices and/or --abp-devices");
        }
        let template = match &config.template {
            Some(path) => load_template(path)?,
            None => HeaderTemplate::default(),
        }
        .with_dev_addr_format(config.dev_addr_format.unwrap_or_default());
        let defaults = GeneratorOptions::default();
        Ok(Self {
            otaa_devices: config.otaa_devices,
            abp_devices: config.abp_devices,
            template,
            options: GeneratorOptions {
                out_dir: config.out_dir.unwrap_or(defaults.out_dir),
                suffix: config.suffix.unwrap_or(defaults.suffix),
                on_error: config.on_error.unwrap_or(defaults.on_error),
            },
        })
    }
}

fn load_template(path: &Path) -> Result<HeaderTemplate> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Could not read template {}", path.display()))?;
    HeaderTemplate::new(source).with_context(|| format!("Invalid template {}", path.display()))
}

/// Generate the OTAA devices, then the ABP devices.
pub fn run(settings: &GeneratorSettings) -> Result<GenerationReport> {
    let tables = [
        (ActivationMode::Otaa, &settings.otaa_devices),
        (ActivationMode::Abp, &settings.abp_devices),
    ];
    let mut report = GenerationReport::default();
    for (mode, path) in tables {
        let path = match path {
            Some(path) => path,
            None => continue,
        };
        let records = devices::read_device_file(path)?;
        info!(
            "read {} {} devices from {}",
            records.len(),
            mode,
            path.display()
        );
        report.merge(generate_all(
            &records,
            mode,
            &settings.template,
            &settings.options,
        )?);
    }
    Ok(report)
}
