//! Row-level filters. Column order and column types are never touched.

use crate::dataset::Dataset;
use std::collections::HashSet;

/// Remove every row that has a null in any column.
pub fn drop_missing_rows(dataset: &Dataset) -> Dataset {
    let keep: Vec<bool> = (0..dataset.height())
        .map(|row| {
            dataset
                .columns()
                .iter()
                .all(|c| c.get(row).is_some_and(|cell| !cell.is_null()))
        })
        .collect();

    let mut out = dataset.clone();
    out.retain_rows(&keep);
    out
}

/// Keep the first occurrence of every distinct row.
///
/// With a subset only the named columns are compared. If any subset name is
/// unknown, or the subset is empty, the whole row is compared instead.
/// Nulls compare equal to each other.
pub fn drop_duplicate_rows(dataset: &Dataset, subset: Option<&[String]>) -> Dataset {
    let keep = first_occurrences(dataset, subset);
    let mut out = dataset.clone();
    out.retain_rows(&keep);
    out
}

/// Number of rows that duplicate an earlier row.
pub fn duplicate_count(dataset: &Dataset, subset: Option<&[String]>) -> usize {
    first_occurrences(dataset, subset)
        .iter()
        .filter(|keep| !**keep)
        .count()
}

fn first_occurrences(dataset: &Dataset, subset: Option<&[String]>) -> Vec<bool> {
    let positions = comparison_positions(dataset, subset);
    let mut seen = HashSet::with_capacity(dataset.height());
    (0..dataset.height())
        .map(|row| seen.insert(dataset.row_key(row, &positions)))
        .collect()
}

fn comparison_positions(dataset: &Dataset, subset: Option<&[String]>) -> Vec<usize> {
    let whole_row = || (0..dataset.width()).collect();
    match subset {
        Some(names) if !names.is_empty() => names
            .iter()
            .map(|name| dataset.column_index(name))
            .collect::<Option<Vec<_>>>()
            .unwrap_or_else(whole_row),
        _ => whole_row(),
    }
}
