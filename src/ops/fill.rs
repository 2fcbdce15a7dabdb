//! Missing-value imputation. Only null cells are ever written.

use super::coerce::literal_for;
use super::stats;
use crate::dataset::{CellValue, Column, ColumnType};

/// Statistic used by [`fill_statistic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statistic {
    Mean,
    Median,
}

/// Replace nulls with a user literal, interpreted in the column's type when
/// it parses. A literal that does not fit turns the column `Mixed`.
pub fn fill_constant(column: &Column, literal: &str) -> Column {
    let fill = literal_for(column.kind(), literal);
    fill_with(column, &fill)
}

fn fill_with(column: &Column, fill: &CellValue) -> Column {
    if column.null_count() == 0 {
        return column.clone();
    }
    let cells = column
        .cells()
        .iter()
        .map(|c| if c.is_null() { fill.clone() } else { c.clone() })
        .collect();
    column.with_cells(cells)
}

/// Propagate the last non-null value downwards. Leading nulls stay null.
pub fn fill_forward(column: &Column) -> Column {
    let mut last = CellValue::Null;
    let cells = column
        .cells()
        .iter()
        .map(|c| {
            if c.is_null() {
                last.clone()
            } else {
                last = c.clone();
                c.clone()
            }
        })
        .collect();
    column.with_cells(cells)
}

/// Propagate the next non-null value upwards. Trailing nulls stay null.
pub fn fill_backward(column: &Column) -> Column {
    let mut next = CellValue::Null;
    let mut cells: Vec<CellValue> = column
        .cells()
        .iter()
        .rev()
        .map(|c| {
            if c.is_null() {
                next.clone()
            } else {
                next = c.clone();
                c.clone()
            }
        })
        .collect();
    cells.reverse();
    column.with_cells(cells)
}

/// Fill nulls of a numeric column with its mean or median.
///
/// Returns `None` when the column has no numeric values. An integer column
/// stays integer if the statistic is whole and is promoted to float otherwise.
pub fn fill_statistic(column: &Column, statistic: Statistic) -> Option<Column> {
    let values = stats::numeric_values(column);
    let value = match statistic {
        Statistic::Mean => stats::mean(&values)?,
        Statistic::Median => stats::median(&values)?,
    };

    match column.kind() {
        ColumnType::Integer if value.fract() == 0.0 => {
            Some(fill_with(column, &CellValue::Integer(value as i64)))
        }
        ColumnType::Integer => {
            let promoted = column
                .cells()
                .iter()
                .map(|c| match c {
                    CellValue::Null => CellValue::Float(value),
                    other => other.as_f64().map_or(CellValue::Null, CellValue::Float),
                })
                .collect();
            Some(Column::from_parts(column.name(), ColumnType::Float, promoted))
        }
        _ => Some(fill_with(column, &CellValue::Float(value))),
    }
}

/// Fill nulls with the most frequent value. `None` for an all-null column.
pub fn fill_mode(column: &Column) -> Option<Column> {
    let mode = stats::mode(column)?.clone();
    Some(fill_with(column, &mode))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_median_keeps_integers() {
        let col = Column::integers("n", [Some(1), None, Some(3), None, Some(5)]);
        let filled = fill_statistic(&col, Statistic::Median).expect("numeric column");
        assert_eq!(filled, Column::integers("n", [Some(1), Some(3), Some(3), Some(3), Some(5)]));
    }

    #[test]
    fn test_fill_mean_promotes_fractional_statistic() {
        let col = Column::integers("n", [Some(1), None, Some(2)]);
        let filled = fill_statistic(&col, Statistic::Mean).expect("numeric column");
        assert_eq!(filled, Column::floats("n", [Some(1.0), Some(1.5), Some(2.0)]));
    }

    #[test]
    fn test_fill_statistic_without_values() {
        let col = Column::floats("f", [None, None]);
        assert!(fill_statistic(&col, Statistic::Mean).is_none());
    }

    #[test]
    fn test_forward_and_backward() {
        let col = Column::texts("c", [None, Some("a"), None, Some("b"), None]);
        assert_eq!(
            fill_forward(&col),
            Column::texts("c", [None, Some("a"), Some("a"), Some("b"), Some("b")])
        );
        assert_eq!(
            fill_backward(&col),
            Column::texts("c", [Some("a"), Some("a"), Some("b"), Some("b"), None])
        );
    }

    #[test]
    fn test_fill_constant_typed_and_untyped() {
        let col = Column::integers("n", [Some(1), None]);
        assert_eq!(fill_constant(&col, "0"), Column::integers("n", [Some(1), Some(0)]));

        let mixed = fill_constant(&col, "unknown");
        assert_eq!(mixed.kind(), ColumnType::Mixed);
        assert_eq!(mixed.get(1), Some(&CellValue::from("unknown")));
    }

    #[test]
    fn test_fill_mode() {
        let col = Column::texts("c", [Some("x"), None, Some("y"), Some("y")]);
        assert_eq!(
            fill_mode(&col),
            Some(Column::texts("c", [Some("x"), Some("y"), Some("y"), Some("y")]))
        );
    }
}
