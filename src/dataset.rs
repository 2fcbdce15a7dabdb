//! The in-memory tabular model the engine operates on.
//!
//! A [`Dataset`] is an ordered list of uniquely named [`Column`]s that all have
//! the same number of cells. Both invariants are checked on construction and
//! preserved by every crate-internal mutation, so any `Dataset` value a caller
//! holds is well formed.
//!
//! Datasets are plain values: the engine clones the snapshot it is given and
//! returns the transformed copy, leaving the caller's snapshot untouched.

pub mod column;
pub mod value;

pub use column::Column;
pub use value::{CellKey, CellValue, ColumnType, DATETIME_FORMAT};

use crate::error::{DatawashError, Result};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    columns: Vec<Column>,
    height: usize,
}

impl Dataset {
    /// Build a dataset, validating unique names and equal column lengths.
    ///
    /// # Errors
    ///
    /// Returns [`DatawashError::Schema`] on a duplicate name or a column whose
    /// length differs from the first column.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let height = columns.first().map_or(0, Column::len);
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name()) {
                return Err(DatawashError::Schema(format!(
                    "duplicate column name '{}'",
                    column.name()
                )));
            }
            if column.len() != height {
                return Err(DatawashError::Schema(format!(
                    "column '{}' has {} rows, expected {height}",
                    column.name(),
                    column.len()
                )));
            }
        }
        Ok(Self { columns, height })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.height == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// Cells of one row, in column order.
    pub fn row(&self, idx: usize) -> Option<Vec<&CellValue>> {
        if idx >= self.height {
            return None;
        }
        self.columns.iter().map(|c| c.get(idx)).collect()
    }

    /// Hashable identity of a row restricted to the given column positions.
    pub(crate) fn row_key(&self, idx: usize, positions: &[usize]) -> Vec<CellKey<'_>> {
        positions
            .iter()
            .filter_map(|&p| self.columns.get(p))
            .map(|c| c.get(idx).map_or(CellKey::Null, CellValue::key))
            .collect()
    }

    /// Replace the column with the same name in place, or append it.
    pub(crate) fn put_column(&mut self, column: Column) -> Result<()> {
        if column.len() != self.height && !(self.columns.is_empty() && self.height == 0) {
            return Err(DatawashError::Schema(format!(
                "column '{}' has {} rows, expected {}",
                column.name(),
                column.len(),
                self.height
            )));
        }
        if self.columns.is_empty() {
            self.height = column.len();
        }
        match self.column_index(column.name()) {
            Some(idx) => {
                if let Some(slot) = self.columns.get_mut(idx) {
                    *slot = column;
                }
            }
            None => self.columns.push(column),
        }
        Ok(())
    }

    pub(crate) fn remove_column(&mut self, name: &str) -> Option<Column> {
        let idx = self.column_index(name)?;
        Some(self.columns.remove(idx))
    }

    /// Keep only the rows whose flag is `true`. `keep` must have one flag per row.
    pub(crate) fn retain_rows(&mut self, keep: &[bool]) {
        debug_assert_eq!(keep.len(), self.height, "one flag per row");
        self.columns = self.columns.iter().map(|c| c.retain_rows(keep)).collect();
        self.height = keep.iter().filter(|k| **k).count();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> Result<Dataset> {
        Dataset::new(vec![
            Column::texts("name", [Some("Ann"), Some("Bo"), None]),
            Column::integers("age", [Some(31), None, Some(45)]),
        ])
    }

    #[test]
    fn test_new_validates_lengths() {
        let result = Dataset::new(vec![
            Column::integers("a", [Some(1), Some(2)]),
            Column::integers("b", [Some(1)]),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_new_validates_unique_names() {
        let result = Dataset::new(vec![
            Column::integers("a", [Some(1)]),
            Column::integers("a", [Some(2)]),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_row_access() -> Result<()> {
        let ds = people()?;
        assert_eq!(ds.height(), 3);
        assert_eq!(ds.width(), 2);
        let row = ds.row(1).expect("row 1 exists");
        assert_eq!(row, vec![&CellValue::from("Bo"), &CellValue::Null]);
        assert!(ds.row(3).is_none());
        Ok(())
    }

    #[test]
    fn test_put_column_keeps_position() -> Result<()> {
        let mut ds = people()?;
        ds.put_column(Column::integers("name", [Some(1), Some(2), Some(3)]))?;
        assert_eq!(ds.column_names(), vec!["name", "age"]);
        assert_eq!(ds.column("name").map(Column::kind), Some(ColumnType::Integer));

        assert!(ds.put_column(Column::integers("short", [Some(1)])).is_err());
        Ok(())
    }

    #[test]
    fn test_retain_rows() -> Result<()> {
        let mut ds = people()?;
        ds.retain_rows(&[true, false, true]);
        assert_eq!(ds.height(), 2);
        assert_eq!(
            ds.column("age").map(Column::cells),
            Some(&[CellValue::Integer(31), CellValue::Integer(45)][..])
        );
        Ok(())
    }
}
