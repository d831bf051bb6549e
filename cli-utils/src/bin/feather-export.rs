//! Export the uplinks of the feather coverage testers as CSV.

use std::{io, path::PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use clap::Parser;
use log::info;
use loralab_cli_utils::{
    config::Config,
    export::{self, default_window, parse_local_time, window_end},
    logging,
    uplink::{JsonDumpSource, UplinkFilter},
};

/// Decode stored uplinks and print one CSV row per gateway reception.
#[derive(Parser)]
struct Opts {
    /// Path to a configuration file in TOML format.
    #[clap(short, long)]
    config: Option<PathBuf>,
    /// JSON dump of the uplink table
    #[clap(short, long)]
    source: Option<PathBuf>,
    /// Do not write the CSV header
    #[clap(long)]
    without_header: bool,
    /// Since when to export the data (YYYY/MM/DD HH:MM:SS, local time) [default: today 00:01]
    #[clap(long)]
    since: Option<String>,
    /// Until when to export the data (YYYY/MM/DD HH:MM:SS, local time) [default: since + 23:58]
    #[clap(long)]
    until: Option<String>,
    /// Only export uplinks of this AppEUI, may be repeated
    #[clap(long = "app-eui")]
    app_euis: Vec<String>,
}

fn main() -> Result<()> {
    logging::init();

    // Parse command line args
    let opts: Opts = Opts::parse();
    let config = Config::load_optional(opts.config.as_deref())?.export;

    // Parse since/until time
    let (default_since, _) = default_window(&Local::now())?;
    let since = match &opts.since {
        Some(since) => parse_local_time(since)?,
        None => default_since,
    };
    let until = match &opts.until {
        Some(until) => parse_local_time(until)?,
        None => window_end(&since),
    };

    let source_path = opts
        .source
        .or(config.source)
        .context("No uplink source given, use --source or the [export] config table")?;
    let app_euis = if opts.app_euis.is_empty() {
        config.app_euis
    } else {
        opts.app_euis
    };

    let filter = UplinkFilter {
        since: since.with_timezone(&Utc),
        until: until.with_timezone(&Utc),
        app_euis,
    };
    info!("exporting uplinks from {} until {}", since, until);

    let source = JsonDumpSource::new(&source_path);
    let stdout = io::stdout();
    let rows = export::export(&source, &filter, &Local, stdout.lock(), !opts.without_header)?;
    info!("exported {} receptions", rows);
    Ok(())
}
