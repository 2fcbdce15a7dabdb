//! The action dispatcher.
//!
//! [`apply`] takes a dataset snapshot, an action identifier and a
//! `string -> string` parameter bag and always hands back a dataset:
//!
//! - the transformed copy when the action ran ([`ActionStatus::Applied`]),
//! - an unchanged copy plus a diagnostic when parameters are missing or
//!   invalid, the target column does not fit, or there is nothing to do
//!   ([`ActionStatus::Skipped`]),
//! - an unchanged copy when the identifier is unknown
//!   ([`ActionStatus::Rejected`]).
//!
//! The input snapshot is never mutated, so callers can keep it as the
//! current state until they decide to adopt the result.
//!
//! ```
//! use datawash::dataset::{Column, Dataset};
//! use datawash::engine;
//! use std::collections::HashMap;
//!
//! let ds = Dataset::new(vec![Column::integers("n", [Some(1), None, Some(3)])]).unwrap();
//! let params = HashMap::from([("column".to_owned(), "n".to_owned())]);
//! let outcome = engine::apply(&ds, "fill_median", &params);
//! assert!(outcome.report.is_applied());
//! assert_eq!(outcome.dataset.column("n").unwrap().null_count(), 0);
//! ```

pub mod action;
mod dispatch;
pub mod report;

#[cfg(test)]
mod tests;

pub use action::{
    Action, ActionKind, DEFAULT_TARGET, DeriveOperator, DeriveSpec, FillStrategy, Params,
};
pub use report::{ActionError, ActionOutcome, ActionReport, ActionStatus, Note};

use crate::dataset::Dataset;
use tracing::{debug, info};

/// Parse and apply one action identified by name.
pub fn apply(dataset: &Dataset, action: &str, params: &Params) -> ActionOutcome {
    let kind = match action.parse::<ActionKind>() {
        Ok(kind) => kind,
        Err(err) => {
            debug!(action, "Rejected unknown action");
            return unchanged(dataset, action, ActionStatus::Rejected(err));
        }
    };

    match Action::parse(kind, params) {
        Ok(parsed) => apply_action(dataset, &parsed),
        Err(err) => {
            debug!(action = kind.as_str(), error = %err, "Skipped action");
            unchanged(dataset, kind.as_str(), ActionStatus::Skipped(err))
        }
    }
}

/// Apply an already parsed action.
pub fn apply_action(dataset: &Dataset, action: &Action) -> ActionOutcome {
    let name = action.kind().as_str();
    match dispatch::execute(dataset, action) {
        Ok((out, notes)) => {
            info!(
                action = name,
                rows = out.height(),
                columns = out.width(),
                "Applied {action}"
            );
            ActionOutcome {
                dataset: out,
                report: ActionReport {
                    action: name.to_owned(),
                    status: ActionStatus::Applied,
                    notes,
                },
            }
        }
        Err(err) => {
            debug!(action = name, error = %err, "Skipped action");
            unchanged(dataset, name, ActionStatus::Skipped(err))
        }
    }
}

fn unchanged(dataset: &Dataset, action: &str, status: ActionStatus) -> ActionOutcome {
    ActionOutcome {
        dataset: dataset.clone(),
        report: ActionReport {
            action: action.to_owned(),
            status,
            notes: Vec::new(),
        },
    }
}
