//! Interquartile-range outlier detection.

use super::stats;
use crate::dataset::Column;

/// Fewer values than this give quartiles too unstable to filter on.
pub const MIN_VALUES: usize = 4;

/// Closed bounds `[Q1 - 1.5 * IQR, Q3 + 1.5 * IQR]` over the non-null numeric
/// values, or `None` when there are fewer than [`MIN_VALUES`] of them.
pub fn iqr_bounds(column: &Column) -> Option<(f64, f64)> {
    let values = stats::numeric_values(column);
    if values.len() < MIN_VALUES {
        return None;
    }
    let (q1, q3) = stats::quartiles(&values)?;
    let iqr = q3 - q1;
    Some((q1 - 1.5 * iqr, q3 + 1.5 * iqr))
}

/// One flag per row: `true` when the cell lies inside the bounds. Nulls and
/// non-numeric cells are outside.
pub fn keep_mask(column: &Column, (lower, upper): (f64, f64)) -> Vec<bool> {
    column
        .cells()
        .iter()
        .map(|cell| cell.as_f64().is_some_and(|v| v >= lower && v <= upper))
        .collect()
}
