//! # datawash
//!
//! Command-line front end for the cleaning engine.
//!
//! ```bash
//! datawash summary -i orders.csv
//! datawash apply -i orders.csv -o clean.csv -a fill_median -p column=qty
//! datawash run -s pipeline.json -i orders.csv
//! ```
//!
//! Command output goes to stdout; logs go to stderr and to rolling files
//! (see [`datawash::logging`]). Set `RUST_LOG=debug` for per-action detail.

#![expect(clippy::print_stdout)] // Command output is printed

mod cli;

use anyhow::Result;
use clap::Parser as _;
use datawash::config::{get_config_path, load_app_config_from};
use datawash::logging;

fn main() -> Result<()> {
    if let Err(e) = logging::init("info") {
        logging::init_console("info")?;
        tracing::warn!("File logging unavailable: {e:#}");
    }

    let cli = cli::Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(get_config_path);
    let settings = load_app_config_from(&config_path);

    cli::run_command(cli.command, &settings, &config_path)
}
