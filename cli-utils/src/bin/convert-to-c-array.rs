//! Print EUIs and keys as C arrays.
//!
//!     convert-to-c-array <eui>
//!     convert-to-c-array <deveui> <appeui> <appkey>
//!
//! EUIs are printed in reversed (LSBF) order, the key as-is.

use anyhow::{Context, Result};
use clap::Parser;
use loralab_cli_utils::logging;
use loralab_common::c_array::format_arguments;

#[derive(Parser)]
struct Opts {
    /// A single EUI, or DevEUI, AppEUI and AppKey
    #[clap(required = true)]
    values: Vec<String>,
}

fn main() -> Result<()> {
    logging::init();

    let opts: Opts = Opts::parse();
    let lines = format_arguments(&opts.values).context("Could not convert arguments")?;
    for line in lines {
        println!("{}", line);
    }
    Ok(())
}
