//! Pipeline execution engine.
//!
//! Loads the input, validates the spec against its columns, runs each step
//! through the dispatcher and writes the result. Steps the dispatcher skips
//! do not stop the run; they are collected as warnings in the report.

use super::spec::{OutputConfig, PipelineSpec};
use super::validation::validate_pipeline;
use crate::dataset::Dataset;
use crate::engine::{self, ActionStatus};
use crate::io::{ImportOptions, load_dataset, save_dataset};
use anyhow::{Context as _, Result, anyhow, bail};
use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Report generated after pipeline execution
#[derive(Debug, Clone)]
pub struct RunReport {
    pub rows_before: usize,
    pub columns_before: usize,
    pub rows_after: usize,
    pub columns_after: usize,

    /// Number of steps successfully applied
    pub steps_applied: usize,

    /// One line per skipped step
    pub warnings: Vec<String>,

    /// Where the result was written
    pub output_path: PathBuf,

    pub duration: Duration,
}

impl RunReport {
    pub fn summary(&self) -> String {
        format!(
            "Pipeline completed: rows {} → {}, columns {} → {}, {} step(s) applied, {} skipped, {:.2}s",
            self.rows_before,
            self.rows_after,
            self.columns_before,
            self.columns_after,
            self.steps_applied,
            self.warnings.len(),
            self.duration.as_secs_f64()
        )
    }
}

/// Outcome of running the steps on an in-memory dataset.
#[derive(Debug, Clone)]
pub struct StepsOutcome {
    pub dataset: Dataset,
    pub steps_applied: usize,
    pub warnings: Vec<String>,
}

/// Execute a pipeline spec on an input file.
///
/// # Errors
///
/// Returns error if the input cannot be loaded, validation fails, no output
/// path can be resolved, the output exists and `overwrite` is false, or the
/// output cannot be written.
pub fn run_pipeline(
    spec: &PipelineSpec,
    input_path: &Path,
    output_override: Option<&Path>,
    options: &ImportOptions,
) -> Result<RunReport> {
    let start = Instant::now();

    let input = load_dataset(input_path, options).context("Failed to load input file")?;

    let validation_errors = validate_pipeline(spec, &input.column_names());
    if !validation_errors.is_empty() {
        bail!(
            "Pipeline validation failed:\n{}",
            validation_errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    let output_path = resolve_output_path(&spec.output, output_override, Local::now().date_naive())?;
    if output_path.exists() && !spec.output.overwrite {
        bail!(
            "Output file already exists and overwrite is false: {}",
            output_path.display()
        );
    }

    info!(pipeline = %spec.name, steps = spec.steps.len(), "Running pipeline");
    let outcome = execute_steps(spec, &input);

    save_dataset(&outcome.dataset, &output_path)?;

    let report = RunReport {
        rows_before: input.height(),
        columns_before: input.width(),
        rows_after: outcome.dataset.height(),
        columns_after: outcome.dataset.width(),
        steps_applied: outcome.steps_applied,
        warnings: outcome.warnings,
        output_path,
        duration: start.elapsed(),
    };
    info!("{}", report.summary());
    Ok(report)
}

/// Run every step in order on `input`. Each step sees the previous step's
/// output; skipped and rejected steps leave the dataset as it was.
pub fn execute_steps(spec: &PipelineSpec, input: &Dataset) -> StepsOutcome {
    let mut dataset = input.clone();
    let mut steps_applied = 0;
    let mut warnings = Vec::new();

    for (idx, step) in spec.steps.iter().enumerate() {
        let outcome = engine::apply(&dataset, &step.action, &step.params());
        match &outcome.report.status {
            ActionStatus::Applied => steps_applied += 1,
            ActionStatus::Skipped(e) | ActionStatus::Rejected(e) => {
                let message = format!("Step {}: {e} (skipped)", idx + 1);
                warn!("{message}");
                warnings.push(message);
            }
        }
        dataset = outcome.dataset;
    }

    StepsOutcome {
        dataset,
        steps_applied,
        warnings,
    }
}

/// The override wins over the spec's template. A path without an extension
/// takes the configured output format's.
fn resolve_output_path(
    config: &OutputConfig,
    output_override: Option<&Path>,
    today: NaiveDate,
) -> Result<PathBuf> {
    let mut path = match output_override {
        Some(path) => path.to_path_buf(),
        None if !config.path_template.is_empty() => {
            expand_path_template(&config.path_template, today)
        }
        None => {
            return Err(anyhow!(
                "No output path specified (provide --output or set output.path_template in spec)"
            ));
        }
    };
    if path.extension().is_none()
        && let Some(format) = config.format
    {
        path.set_extension(format.extension());
    }
    Ok(path)
}

/// Expand path template variables (currently only `{date}`, as YYYY-MM-DD).
pub fn expand_path_template(template: &str, today: NaiveDate) -> PathBuf {
    PathBuf::from(template.replace("{date}", &today.format("%Y-%m-%d").to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Column;
    use crate::io::FileFormat;

    fn input() -> Result<Dataset> {
        Ok(Dataset::new(vec![
            Column::texts("name", [Some(" Ann "), Some("Bob"), Some("Bob")]),
            Column::integers("qty", [Some(2), None, None]),
        ])?)
    }

    #[test]
    fn test_execute_steps_collects_warnings() -> Result<()> {
        let spec = PipelineSpec::new("t")
            .with_step("normalize_trim", [("column", "name")])
            .with_step("fill_value", [("column", "qty"), ("value", "0")])
            .with_step("drop_duplicate_rows", Vec::<(String, String)>::new())
            .with_step("fill_mean", [("column", "name")])
            .with_step("explode", Vec::<(String, String)>::new());

        let outcome = execute_steps(&spec, &input()?);
        assert_eq!(outcome.steps_applied, 3);
        assert_eq!(outcome.dataset.height(), 2);
        assert_eq!(outcome.warnings.len(), 2);
        assert!(
            outcome
                .warnings
                .first()
                .is_some_and(|w| w.starts_with("Step 4:")),
            "{:?}",
            outcome.warnings
        );
        Ok(())
    }

    #[test]
    fn test_expand_path_template() -> Result<()> {
        let day = NaiveDate::from_ymd_opt(2024, 5, 17).context("valid date")?;
        assert_eq!(
            expand_path_template("out/{date}/clean.csv", day),
            PathBuf::from("out/2024-05-17/clean.csv")
        );
        Ok(())
    }

    #[test]
    fn test_resolve_output_path() -> Result<()> {
        let day = NaiveDate::from_ymd_opt(2024, 1, 2).context("valid date")?;
        let config = OutputConfig {
            format: Some(FileFormat::Parquet),
            path_template: "clean_{date}".to_owned(),
            overwrite: true,
        };
        assert_eq!(
            resolve_output_path(&config, None, day)?,
            PathBuf::from("clean_2024-01-02.parquet")
        );
        assert_eq!(
            resolve_output_path(&config, Some(Path::new("x.csv")), day)?,
            PathBuf::from("x.csv")
        );
        assert!(resolve_output_path(&OutputConfig::default(), None, day).is_err());
        Ok(())
    }
}
