//! Summary statistics over column cells. Nulls are always ignored.
//!
//! Mean, median and quantiles are computed by Polars over the column's
//! numeric values; mode works on cells of any type.

use crate::dataset::{CellKey, CellValue, Column};
use polars::prelude::{ChunkAgg as _, ChunkQuantile as _, Float64Chunked, QuantileMethod};
use std::collections::HashMap;

/// Non-null numeric values of a column, in row order.
pub fn numeric_values(column: &Column) -> Float64Chunked {
    let values: Vec<f64> = column.cells().iter().filter_map(CellValue::as_f64).collect();
    Float64Chunked::from_vec(column.name().into(), values)
}

pub fn mean(values: &Float64Chunked) -> Option<f64> {
    values.mean()
}

/// Median; the average of the two middle values for an even count.
pub fn median(values: &Float64Chunked) -> Option<f64> {
    values.median()
}

/// Quantile with linear interpolation between the closest ranks
/// (position `q * (n - 1)` in the sorted values). `None` for no values or a
/// `q` outside `[0, 1]`.
pub fn quantile(values: &Float64Chunked, q: f64) -> Option<f64> {
    values.quantile(q, QuantileMethod::Linear).ok().flatten()
}

/// First and third quartile.
pub fn quartiles(values: &Float64Chunked) -> Option<(f64, f64)> {
    Some((quantile(values, 0.25)?, quantile(values, 0.75)?))
}

/// Most frequent non-null cell. Ties go to the value seen first in row order.
pub fn mode(column: &Column) -> Option<&CellValue> {
    let mut counts: HashMap<CellKey<'_>, (usize, usize)> = HashMap::new();
    for (row, cell) in column.cells().iter().enumerate() {
        if cell.is_null() {
            continue;
        }
        counts.entry(cell.key()).or_insert((0, row)).0 += 1;
    }

    let (_, first_row) = counts
        .into_values()
        .max_by(|(count_a, row_a), (count_b, row_b)| {
            count_a.cmp(count_b).then_with(|| row_b.cmp(row_a))
        })?;
    column.get(first_row)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(v: &[f64]) -> Float64Chunked {
        numeric_values(&Column::floats("v", v.iter().copied().map(Some)))
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&values(&[5.0, 1.0, 3.0])), Some(3.0));
        assert_eq!(median(&values(&[4.0, 1.0, 3.0, 2.0])), Some(2.5));
        assert_eq!(median(&values(&[])), None);
    }

    #[test]
    fn test_linear_quartiles() {
        let v = values(&[1.0, 2.0, 2.0, 3.0, 3.0, 3.0, 4.0, 4.0, 100.0]);
        assert_eq!(quartiles(&v), Some((2.0, 4.0)));

        // Interpolated: positions 0.75 and 2.25 over [1, 2, 3, 4].
        assert_eq!(quartiles(&values(&[4.0, 3.0, 2.0, 1.0])), Some((1.75, 3.25)));
        assert_eq!(quantile(&values(&[1.0, 2.0]), 1.5), None);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&values(&[1.0, 2.0, 6.0])), Some(3.0));
        assert_eq!(mean(&values(&[])), None);
    }

    #[test]
    fn test_nan_and_text_are_not_values() {
        let col = Column::floats("v", [Some(1.0), Some(f64::NAN), None, Some(3.0)]);
        let v = numeric_values(&col);
        assert_eq!(v.len(), 2);
        assert_eq!(mean(&v), Some(2.0));

        let col = Column::infer("m", vec![CellValue::from("7"), CellValue::Integer(4)]);
        assert_eq!(numeric_values(&col).len(), 1);
    }

    #[test]
    fn test_mode_ties_break_by_first_seen() {
        let col = Column::texts("c", [Some("b"), Some("a"), Some("a"), Some("b"), None]);
        assert_eq!(mode(&col), Some(&CellValue::from("b")));

        let col = Column::integers("n", [None, Some(7), Some(3), Some(3)]);
        assert_eq!(mode(&col), Some(&CellValue::Integer(3)));
    }

    #[test]
    fn test_mode_of_all_null_column() {
        let col = Column::integers("n", [None, None]);
        assert_eq!(mode(&col), None);
    }
}
