//! Applicability checks and delegation to the operation library.

use super::action::{Action, DeriveOperator, DeriveSpec, FillStrategy};
use super::report::{ActionError, Note};
use crate::dataset::{CellValue, Column, ColumnType, Dataset};
use crate::expr::Expression;
use crate::ops::{Transformed, coerce, derive, fill, outliers, replace, rows, text};
use tracing::debug;

/// Run a parsed action against a snapshot. On success returns the new
/// snapshot and any notes; on error the caller keeps the input unchanged.
pub(crate) fn execute(
    dataset: &Dataset,
    action: &Action,
) -> Result<(Dataset, Vec<Note>), ActionError> {
    let mut notes = Vec::new();
    let out = match action {
        Action::DropMissingRows => {
            let out = rows::drop_missing_rows(dataset);
            note_rows_removed(dataset, &out, &mut notes);
            out
        }

        Action::Fill { column, strategy } => {
            let source = require(dataset, column)?;
            let filled = fill_column(source, strategy)?;
            swap_column(dataset, source, Transformed::clean(filled), &mut notes)?
        }

        Action::DropDuplicateRows { subset } => {
            let out = rows::drop_duplicate_rows(dataset, subset.as_deref());
            note_rows_removed(dataset, &out, &mut notes);
            out
        }

        Action::DropColumn { column } => {
            require(dataset, column)?;
            let mut out = dataset.clone();
            out.remove_column(column);
            out
        }

        Action::AddColumn { name } => {
            if dataset.has_column(name) {
                return Err(ActionError::inapplicable(name, "column already exists"));
            }
            let cells = vec![CellValue::Text(String::new()); dataset.height()];
            let column = Column::from_parts(name.as_str(), ColumnType::Text, cells);
            put(dataset.clone(), column)?
        }

        Action::DeriveColumn(spec) => derive_column(dataset, spec, &mut notes)?,

        Action::ReplaceValue { column, old, new } | Action::FixTypo { column, old, new } => {
            let source = require(dataset, column)?;
            let (replaced, count) = replace::replace_exact(source, old, new);
            if count > 0 {
                notes.push(Note::CellsReplaced {
                    column: column.clone(),
                    count,
                });
            }
            swap_column(dataset, source, Transformed::clean(replaced), &mut notes)?
        }

        Action::Normalize { column, mode } => {
            let source = require(dataset, column)?;
            let normalized = text::normalize(source, *mode);
            swap_column(dataset, source, Transformed::clean(normalized), &mut notes)?
        }

        Action::CastType { column, target } => {
            let source = require(dataset, column)?;
            swap_column(dataset, source, coerce::cast(source, *target), &mut notes)?
        }

        Action::FilterOutliersIqr { column } => {
            let source = require_numeric(dataset, column)?;
            // Bounds come from the full column before any row is dropped.
            let bounds = outliers::iqr_bounds(source).ok_or_else(|| {
                ActionError::EmptyResult(format!(
                    "'{column}' has fewer than {} numeric values",
                    outliers::MIN_VALUES
                ))
            })?;
            let keep = outliers::keep_mask(source, bounds);
            let mut out = dataset.clone();
            out.retain_rows(&keep);
            note_rows_removed(dataset, &out, &mut notes);
            out
        }
    };
    Ok((out, notes))
}

fn fill_column(source: &Column, strategy: &FillStrategy) -> Result<Column, ActionError> {
    let name = source.name();
    let filled = match strategy {
        FillStrategy::Constant(literal) => fill::fill_constant(source, literal),
        FillStrategy::Forward => fill::fill_forward(source),
        FillStrategy::Backward => fill::fill_backward(source),
        FillStrategy::Median | FillStrategy::Mean => {
            if !source.is_numeric() {
                return Err(not_numeric(source));
            }
            let statistic = if *strategy == FillStrategy::Median {
                fill::Statistic::Median
            } else {
                fill::Statistic::Mean
            };
            fill::fill_statistic(source, statistic)
                .ok_or_else(|| ActionError::EmptyResult(format!("'{name}' has no numeric values")))?
        }
        FillStrategy::Mode => fill::fill_mode(source)
            .ok_or_else(|| ActionError::EmptyResult(format!("'{name}' has no values")))?,
    };
    Ok(filled)
}

fn derive_column(
    dataset: &Dataset,
    spec: &DeriveSpec,
    notes: &mut Vec<Note>,
) -> Result<Dataset, ActionError> {
    let target = spec.target.as_str();
    let derived = match &spec.operator {
        DeriveOperator::Binary {
            op,
            source_a,
            source_b,
        } => {
            let a = require_numeric(dataset, source_a)?;
            let b = require_numeric(dataset, source_b)?;
            derive::binary(a, b, *op, target)
        }
        DeriveOperator::Unary { op, source } => {
            derive::unary(require(dataset, source)?, *op, target)
        }
        DeriveOperator::Custom { source, expression } => {
            let column = require(dataset, source)?;
            match Expression::parse(expression) {
                Ok(parsed) => derive::custom(column, &parsed, target),
                Err(err) => {
                    debug!(expression = %expression, error = %err, "Custom expression rejected");
                    notes.push(Note::ExpressionRejected {
                        column: target.to_owned(),
                        message: err.to_string(),
                    });
                    Transformed::clean(derive::null_column(target, dataset.height()))
                }
            }
        }
    };

    if let Some(previous) = dataset.column(target) {
        return swap_column(dataset, previous, derived, notes);
    }
    note_nulled(&derived, notes);
    put(dataset.clone(), derived.column)
}

/// Replace `previous` with the transformed column, noting degraded cells and
/// any change of declared type.
fn swap_column(
    dataset: &Dataset,
    previous: &Column,
    transformed: Transformed,
    notes: &mut Vec<Note>,
) -> Result<Dataset, ActionError> {
    note_nulled(&transformed, notes);
    let column = transformed.column;
    if column.kind() != previous.kind() {
        notes.push(Note::Retyped {
            column: column.name().to_owned(),
            from: previous.kind(),
            to: column.kind(),
        });
    }
    put(dataset.clone(), column)
}

fn put(mut dataset: Dataset, column: Column) -> Result<Dataset, ActionError> {
    let name = column.name().to_owned();
    dataset
        .put_column(column)
        .map_err(|err| ActionError::inapplicable(&name, err.to_string()))?;
    Ok(dataset)
}

fn note_nulled(transformed: &Transformed, notes: &mut Vec<Note>) {
    if transformed.nulled > 0 {
        debug!(
            column = transformed.column.name(),
            count = transformed.nulled,
            "Cells degraded to null"
        );
        notes.push(Note::CellsNulled {
            column: transformed.column.name().to_owned(),
            count: transformed.nulled,
        });
    }
}

fn note_rows_removed(before: &Dataset, after: &Dataset, notes: &mut Vec<Note>) {
    let removed = before.height().saturating_sub(after.height());
    if removed > 0 {
        notes.push(Note::RowsRemoved(removed));
    }
}

fn require<'a>(dataset: &'a Dataset, column: &str) -> Result<&'a Column, ActionError> {
    dataset
        .column(column)
        .ok_or_else(|| ActionError::no_such_column(column))
}

fn require_numeric<'a>(dataset: &'a Dataset, column: &str) -> Result<&'a Column, ActionError> {
    let found = require(dataset, column)?;
    if found.is_numeric() {
        Ok(found)
    } else {
        Err(not_numeric(found))
    }
}

fn not_numeric(column: &Column) -> ActionError {
    ActionError::inapplicable(
        column.name(),
        format!("expected a numeric column, found {}", column.kind()),
    )
}
