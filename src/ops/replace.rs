//! Exact value substitution, used for both `replace_value` and typo fixes.

use super::coerce::literal_for;
use crate::dataset::{CellValue, Column};

/// Replace every non-null cell whose text representation equals `old` with
/// `new`, interpreted in the column's type when it parses.
///
/// Returns the new column and the number of cells replaced. There is no
/// substring or fuzzy matching; nulls are never matched.
pub fn replace_exact(column: &Column, old: &str, new: &str) -> (Column, usize) {
    let replacement = literal_for(column.kind(), new);
    let mut replaced = 0;
    let cells: Vec<CellValue> = column
        .cells()
        .iter()
        .map(|cell| {
            if cell.to_text().is_some_and(|text| text == old) {
                replaced += 1;
                replacement.clone()
            } else {
                cell.clone()
            }
        })
        .collect();

    if replaced == 0 {
        return (column.clone(), 0);
    }
    (column.with_cells(cells), replaced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::ColumnType;

    #[test]
    fn test_exact_match_only() {
        let col = Column::texts("city", [Some("Pariss"), Some("Pariss Hilton"), None]);
        let (out, count) = replace_exact(&col, "Pariss", "Paris");
        assert_eq!(count, 1);
        assert_eq!(out, Column::texts("city", [Some("Paris"), Some("Pariss Hilton"), None]));
    }

    #[test]
    fn test_numeric_match_keeps_type() {
        let col = Column::integers("code", [Some(-1), Some(5), Some(-1)]);
        let (out, count) = replace_exact(&col, "-1", "0");
        assert_eq!(count, 2);
        assert_eq!(out, Column::integers("code", [Some(0), Some(5), Some(0)]));
    }

    #[test]
    fn test_untyped_replacement_makes_column_mixed() {
        let col = Column::integers("code", [Some(-1), Some(5)]);
        let (out, _) = replace_exact(&col, "-1", "unknown");
        assert_eq!(out.kind(), ColumnType::Mixed);
    }

    #[test]
    fn test_no_match_is_unchanged() {
        let col = Column::texts("c", [Some("a")]);
        assert_eq!(replace_exact(&col, "b", "c"), (col.clone(), 0));
    }
}
