//! Generate LMIC device identifier headers from OTAA and ABP device tables.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use log::info;
use loralab_cli_utils::{
    config::{Config, GeneratorConfig},
    generator::{self, FailurePolicy, GeneratorSettings},
    logging,
};
use loralab_common::header::DevAddrFormat;

/// Generate one firmware header per device.
///
/// OTAA devices are read first, then ABP devices. Flags override the values
/// of the config file.
#[derive(Parser)]
struct Opts {
    /// Path to a configuration file in TOML format.
    #[clap(short, long)]
    config: Option<PathBuf>,
    /// File with OTAA device configurations (name;deveui;appeui;appkey)
    #[clap(long)]
    otaa_devices: Option<PathBuf>,
    /// File with ABP device configurations (name;devaddr;nwkskey;appskey)
    #[clap(long)]
    abp_devices: Option<PathBuf>,
    /// Output directory for generated header files
    #[clap(short, long)]
    out: Option<PathBuf>,
    /// File name suffix of generated header files [default: .h]
    #[clap(long)]
    suffix: Option<String>,
    /// Header template to use instead of the built-in LMIC skeleton
    #[clap(long)]
    template: Option<PathBuf>,
    /// How to print DEVADDR: "decimal" or "hex" [default: decimal]
    #[clap(long)]
    dev_addr_format: Option<DevAddrFormat>,
    /// What to do if a device fails: "abort" or "continue" [default: abort]
    #[clap(long)]
    on_error: Option<FailurePolicy>,
}

impl Opts {
    fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            otaa_devices: self.otaa_devices.clone(),
            abp_devices: self.abp_devices.clone(),
            out_dir: self.out.clone(),
            suffix: self.suffix.clone(),
            template: self.template.clone(),
            dev_addr_format: self.dev_addr_format,
            on_error: self.on_error,
        }
    }
}

fn main() -> Result<()> {
    logging::init();

    // Parse command line args
    let opts: Opts = Opts::parse();

    // Command line flags win over the config file
    let config = Config::load_optional(opts.config.as_deref())?;
    let settings = GeneratorSettings::from_config(opts.generator_config().or(config.generator))?;

    let report = generator::run(&settings)?;
    if !report.failed.is_empty() {
        bail!(
            "{} of {} devices failed",
            report.failed.len(),
            report.failed.len() + report.written.len()
        );
    }

    info!("done!");
    Ok(())
}
