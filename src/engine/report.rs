//! Diagnostics returned alongside every dispatched action.

use super::action::ActionKind;
use crate::dataset::{ColumnType, Dataset};
use std::fmt;

/// Why an action did not change the dataset.
///
/// None of these are fatal. `UnknownAction` is surfaced to the caller as a
/// rejection; the rest turn the action into a reported no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    UnknownAction(String),
    MissingParameter {
        action: ActionKind,
        parameter: &'static str,
    },
    InvalidParameter {
        parameter: &'static str,
        value: String,
        reason: String,
    },
    InapplicableColumn {
        column: String,
        reason: String,
    },
    /// The operation has nothing to work with (no numeric values to average,
    /// too few values for quartiles).
    EmptyResult(String),
}

impl ActionError {
    pub(crate) fn missing(action: ActionKind, parameter: &'static str) -> Self {
        Self::MissingParameter { action, parameter }
    }

    pub(crate) fn invalid(
        parameter: &'static str,
        value: &str,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            parameter,
            value: value.to_owned(),
            reason: reason.into(),
        }
    }

    pub(crate) fn inapplicable(column: &str, reason: impl Into<String>) -> Self {
        Self::InapplicableColumn {
            column: column.to_owned(),
            reason: reason.into(),
        }
    }

    pub(crate) fn no_such_column(column: &str) -> Self {
        Self::inapplicable(column, "column does not exist")
    }
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownAction(id) => write!(f, "Unknown action '{id}'"),
            Self::MissingParameter { action, parameter } => {
                write!(f, "{action}: missing required parameter '{parameter}'")
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => write!(f, "Invalid value '{value}' for '{parameter}': {reason}"),
            Self::InapplicableColumn { column, reason } => write!(f, "Column '{column}': {reason}"),
            Self::EmptyResult(msg) => write!(f, "Nothing to do: {msg}"),
        }
    }
}

impl std::error::Error for ActionError {}

/// Side effects of an applied action worth telling the user about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Note {
    /// Non-null cells that could not be converted or evaluated became null.
    CellsNulled { column: String, count: usize },
    /// The column's declared type changed.
    Retyped {
        column: String,
        from: ColumnType,
        to: ColumnType,
    },
    RowsRemoved(usize),
    CellsReplaced { column: String, count: usize },
    /// A `custom` expression failed to parse; the target column is all null.
    ExpressionRejected { column: String, message: String },
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CellsNulled { column, count } => {
                write!(f, "{count} value(s) in '{column}' could not be converted and are now missing")
            }
            Self::Retyped { column, from, to } => {
                write!(f, "column '{column}' changed type from {from} to {to}")
            }
            Self::RowsRemoved(count) => write!(f, "{count} row(s) removed"),
            Self::CellsReplaced { column, count } => {
                write!(f, "{count} value(s) replaced in '{column}'")
            }
            Self::ExpressionRejected { column, message } => {
                write!(f, "expression for '{column}' rejected: {message}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionStatus {
    Applied,
    /// The action was understood but could not run; the dataset is unchanged.
    Skipped(ActionError),
    /// The action identifier is unknown; the dataset is unchanged.
    Rejected(ActionError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionReport {
    /// Identifier as supplied by the caller.
    pub action: String,
    pub status: ActionStatus,
    pub notes: Vec<Note>,
}

impl ActionReport {
    pub fn is_applied(&self) -> bool {
        self.status == ActionStatus::Applied
    }

    pub fn error(&self) -> Option<&ActionError> {
        match &self.status {
            ActionStatus::Applied => None,
            ActionStatus::Skipped(err) | ActionStatus::Rejected(err) => Some(err),
        }
    }

    /// One-line description for logs and the CLI.
    pub fn summary(&self) -> String {
        let mut line = match &self.status {
            ActionStatus::Applied => format!("{}: applied", self.action),
            ActionStatus::Skipped(err) => format!("{}: skipped ({err})", self.action),
            ActionStatus::Rejected(err) => format!("{}: rejected ({err})", self.action),
        };
        for note in &self.notes {
            line.push_str("; ");
            line.push_str(&note.to_string());
        }
        line
    }
}

/// Result of dispatching one action: always a dataset, plus what happened.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    pub dataset: Dataset,
    pub report: ActionReport,
}

impl ActionOutcome {
    pub fn error(&self) -> Option<&ActionError> {
        self.report.error()
    }

    pub fn into_parts(self) -> (Dataset, Option<ActionError>) {
        let error = self.report.error().cloned();
        (self.dataset, error)
    }
}
