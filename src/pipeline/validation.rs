//! Pipeline specification validation.
//!
//! Validates pipeline specs against the input columns before execution,
//! catching unknown actions, missing parameters and references to columns
//! that will not exist at that point of the run.

use super::spec::{PipelineSpec, SPEC_VERSION};
use crate::engine::Action;
use std::collections::HashSet;
use std::fmt;

/// Validation error with helpful context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub step_index: Option<usize>,
    pub message: String,
}

impl ValidationError {
    fn step(step_index: usize, message: impl Into<String>) -> Self {
        Self {
            step_index: Some(step_index),
            message: message.into(),
        }
    }

    fn spec(message: impl Into<String>) -> Self {
        Self {
            step_index: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(idx) = self.step_index {
            write!(f, "Step {}: {}", idx + 1, self.message)
        } else {
            write!(f, "Spec: {}", self.message)
        }
    }
}

/// Validate a pipeline spec against the columns of its input.
///
/// Column tracking follows each step's declared effect (`add_column` and
/// `derive_column` produce a column, `drop_column` removes one). Type fit is
/// left to the dispatcher, which reports such steps as skipped at run time.
pub fn validate_pipeline(spec: &PipelineSpec, input_columns: &[&str]) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if spec.version != SPEC_VERSION {
        errors.push(ValidationError::spec(format!(
            "Unsupported spec version '{}', expected '{SPEC_VERSION}'",
            spec.version
        )));
    }

    let mut columns: HashSet<String> = input_columns.iter().map(|&c| c.to_owned()).collect();

    for (idx, step) in spec.steps.iter().enumerate() {
        match step.to_action() {
            Ok(action) => validate_step(&action, idx, &mut columns, &mut errors),
            Err(e) => errors.push(ValidationError::step(idx, e.to_string())),
        }
    }

    errors
}

/// Validate a single step and update column tracking
fn validate_step(
    action: &Action,
    idx: usize,
    columns: &mut HashSet<String>,
    errors: &mut Vec<ValidationError>,
) {
    for required in action.required_columns() {
        if !columns.contains(required) {
            errors.push(ValidationError::step(
                idx,
                format!("{}: column '{required}' does not exist", action.kind()),
            ));
        }
    }

    if let Action::AddColumn { name } = action
        && columns.contains(name)
    {
        errors.push(ValidationError::step(
            idx,
            format!("add_column: column '{name}' already exists"),
        ));
    }

    if let Some(removed) = action.removed_column() {
        columns.remove(removed);
    }
    if let Some(produced) = action.produced_column() {
        columns.insert(produced.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUT: [&str; 3] = ["id", "name", "qty"];

    #[test]
    fn test_validate_valid_pipeline() {
        let spec = PipelineSpec::new("ok")
            .with_step("normalize_trim", [("column", "name")])
            .with_step("fill_mean", [("column", "qty")])
            .with_step(
                "derive_column",
                [
                    ("operator", "percent"),
                    ("source_a", "qty"),
                    ("target_name", "pct"),
                ],
            )
            .with_step("drop_column", [("column", "pct")]);

        assert_eq!(validate_pipeline(&spec, &INPUT), Vec::new());
    }

    #[test]
    fn test_validate_tracks_dropped_columns() {
        let spec = PipelineSpec::new("dropped")
            .with_step("drop_column", [("column", "qty")])
            .with_step("fill_mean", [("column", "qty")]);

        let errors = validate_pipeline(&spec, &INPUT);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.first().and_then(|e| e.step_index), Some(1));
        assert!(errors.iter().any(|e| e.message.contains("'qty' does not exist")));
    }

    #[test]
    fn test_validate_added_column_is_visible_later() {
        let spec = PipelineSpec::new("added")
            .with_step("add_column", [("name", "notes")])
            .with_step("fill_value", [("column", "notes"), ("value", "n/a")])
            .with_step("add_column", [("name", "notes")]);

        let errors = validate_pipeline(&spec, &INPUT);
        assert_eq!(errors.len(), 1);
        assert!(errors.iter().all(|e| e.step_index == Some(2)));
    }

    #[test]
    fn test_validate_reports_parse_errors() {
        let mut spec = PipelineSpec::new("broken")
            .with_step("explode", [("column", "id")])
            .with_step("fill_value", [("column", "qty")]);
        spec.version = "9".to_owned();

        let errors = validate_pipeline(&spec, &INPUT);
        let rendered: Vec<String> = errors.iter().map(ToString::to_string).collect();
        assert_eq!(rendered.len(), 3, "{rendered:?}");
        assert!(rendered.iter().any(|e| e.starts_with("Spec: Unsupported spec version")));
        assert!(rendered.iter().any(|e| e.starts_with("Step 1: Unknown action")));
        assert!(rendered.iter().any(|e| e.starts_with("Step 2:") && e.contains("'value'")));
    }
}
