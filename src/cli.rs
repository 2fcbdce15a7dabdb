use anyhow::{Context as _, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use datawash::config::{AppSettings, save_app_config_to};
use datawash::engine::{self, ActionStatus, Params};
use datawash::io::{load_dataset, save_dataset};
use datawash::logging::get_current_log_path;
use datawash::pipeline::{PipelineSpec, run_pipeline};
use datawash::profile::{distinct_values, render_preview, summarize};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "datawash", version, about = "Iterative cleaning of tabular datasets")]
pub struct Cli {
    /// Settings file (defaults to <config_dir>/datawash/config.json)
    #[arg(long, global = true, env = "DATAWASH_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Apply a single cleaning action and save the result
    Apply {
        /// Input file (CSV, XLSX/XLS, Parquet)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file. Defaults to <output_dir>/<stem>_cleaned.<format>.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Action identifier, e.g. `fill_median` or `derive_column`
        #[arg(short, long)]
        action: String,

        /// Action parameter as key=value (repeatable)
        #[arg(short, long = "param", value_parser = parse_key_val)]
        params: Vec<(String, String)>,
    },
    /// Run a JSON pipeline spec against an input file
    Run {
        /// Pipeline spec file
        #[arg(short, long)]
        spec: PathBuf,

        #[arg(short, long)]
        input: PathBuf,

        /// Output file. Overrides the spec's `output.path_template`.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show row and column counts, column types, missing values and a preview
    Summary {
        #[arg(short, long)]
        input: PathBuf,

        /// Preview rows (defaults to the configured `preview_row_limit`)
        #[arg(short, long)]
        rows: Option<usize>,
    },
    /// List the distinct values of a column
    Values {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        column: String,
    },
    /// Show the effective settings
    Config {
        /// Write the current settings to the settings file
        #[arg(long)]
        init: bool,
    },
}

pub fn run_command(command: Commands, settings: &AppSettings, config_path: &Path) -> Result<()> {
    match command {
        Commands::Apply {
            input,
            output,
            action,
            params,
        } => handle_apply(settings, &input, output, &action, params),
        Commands::Run {
            spec,
            input,
            output,
        } => handle_run(settings, &spec, &input, output),
        Commands::Summary { input, rows } => handle_summary(settings, &input, rows),
        Commands::Values { input, column } => handle_values(settings, &input, &column),
        Commands::Config { init } => handle_config(settings, config_path, init),
    }
}

fn handle_apply(
    settings: &AppSettings,
    input: &Path,
    output: Option<PathBuf>,
    action: &str,
    params: Vec<(String, String)>,
) -> Result<()> {
    let dataset = load_dataset(input, &settings.import_options())?;
    let params: Params = params.into_iter().collect();

    let outcome = engine::apply(&dataset, action, &params);
    println!("{}", outcome.report.summary());
    match &outcome.report.status {
        ActionStatus::Applied => {}
        ActionStatus::Skipped(e) => bail!("Action skipped, nothing written: {e}"),
        ActionStatus::Rejected(e) => bail!("{e}"),
    }

    let output = output.unwrap_or_else(|| settings.default_output_path(input));
    save_dataset(&outcome.dataset, &output)?;
    println!(
        "Wrote {} rows × {} columns to {}",
        outcome.dataset.height(),
        outcome.dataset.width(),
        output.display()
    );
    Ok(())
}

fn handle_run(
    settings: &AppSettings,
    spec_path: &Path,
    input: &Path,
    output: Option<PathBuf>,
) -> Result<()> {
    let spec = PipelineSpec::from_file(spec_path)?;
    let output = output.or_else(|| {
        spec.output
            .path_template
            .is_empty()
            .then(|| settings.default_output_path(input))
    });

    let report = run_pipeline(&spec, input, output.as_deref(), &settings.import_options())
        .with_context(|| format!("Pipeline '{}' failed", spec.name))?;

    for warning in &report.warnings {
        println!("warning: {warning}");
    }
    println!("{}", report.summary());
    println!("Output written to {}", report.output_path.display());
    Ok(())
}

fn handle_summary(settings: &AppSettings, input: &Path, rows: Option<usize>) -> Result<()> {
    let dataset = load_dataset(input, &settings.import_options())?;
    println!("{}", summarize(&dataset));
    println!();
    println!(
        "{}",
        render_preview(&dataset, rows.unwrap_or(settings.preview_row_limit))
    );
    Ok(())
}

fn handle_values(settings: &AppSettings, input: &Path, column: &str) -> Result<()> {
    let dataset = load_dataset(input, &settings.import_options())?;
    let col = dataset
        .column(column)
        .ok_or_else(|| anyhow!("Column '{column}' does not exist"))?;
    for value in distinct_values(col) {
        println!("{value}");
    }
    Ok(())
}

fn handle_config(settings: &AppSettings, config_path: &Path, init: bool) -> Result<()> {
    if init {
        save_app_config_to(settings, config_path)?;
        println!("Settings written to {}", config_path.display());
    }
    println!("Settings file: {}", config_path.display());
    if let Ok(log_path) = get_current_log_path() {
        println!("Log file: {}", log_path.display());
    }
    println!("{}", serde_json::to_string_pretty(settings)?);
    Ok(())
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing parameter name in '{s}'"));
    }
    Ok((key.to_owned(), value.to_owned()))
}
