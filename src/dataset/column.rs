use super::value::{CellValue, ColumnType};
use crate::error::{DatawashError, Result};

/// A named, typed sequence of cells aligned to the rows of a dataset.
///
/// A typed column only ever holds nulls or cells of its own variant;
/// [`ColumnType::Mixed`] columns hold anything.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    kind: ColumnType,
    cells: Vec<CellValue>,
}

impl Column {
    /// Build a column with an explicit type, rejecting cells that do not fit it.
    pub fn new(name: impl Into<String>, kind: ColumnType, cells: Vec<CellValue>) -> Result<Self> {
        let name = name.into();
        if let Some((idx, cell)) = cells.iter().enumerate().find(|(_, c)| !kind.admits(c)) {
            return Err(DatawashError::Schema(format!(
                "column '{name}' is declared {kind} but row {idx} holds {cell:?}"
            )));
        }
        Ok(Self { name, kind, cells })
    }

    /// Build a column whose type is inferred from its non-null cells: one
    /// shared variant gives that type, anything else (including no values at
    /// all) gives `Mixed`.
    pub fn infer(name: impl Into<String>, cells: Vec<CellValue>) -> Self {
        let kind = infer_kind(&cells);
        Self {
            name: name.into(),
            kind,
            cells,
        }
    }

    pub fn texts<S: Into<String>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = Option<S>>,
    ) -> Self {
        let cells = values
            .into_iter()
            .map(|v| v.map_or(CellValue::Null, |s| CellValue::Text(s.into())))
            .collect();
        Self::from_parts(name, ColumnType::Text, cells)
    }

    pub fn integers(name: impl Into<String>, values: impl IntoIterator<Item = Option<i64>>) -> Self {
        let cells = values.into_iter().map(CellValue::from).collect();
        Self::from_parts(name, ColumnType::Integer, cells)
    }

    pub fn floats(name: impl Into<String>, values: impl IntoIterator<Item = Option<f64>>) -> Self {
        let cells = values.into_iter().map(CellValue::from).collect();
        Self::from_parts(name, ColumnType::Float, cells)
    }

    /// Internal constructor for operations that already guarantee the cells
    /// fit `kind`.
    pub(crate) fn from_parts(
        name: impl Into<String>,
        kind: ColumnType,
        cells: Vec<CellValue>,
    ) -> Self {
        debug_assert!(
            cells.iter().all(|c| kind.admits(c)),
            "cells must agree with the declared column type"
        );
        Self {
            name: name.into(),
            kind,
            cells,
        }
    }

    /// Same name, new cells. The declared type is kept when every cell still
    /// fits it and falls back to `Mixed` otherwise.
    pub(crate) fn with_cells(&self, cells: Vec<CellValue>) -> Self {
        let kind = if cells.iter().all(|c| self.kind.admits(c)) {
            self.kind
        } else {
            ColumnType::Mixed
        };
        Self {
            name: self.name.clone(),
            kind,
            cells,
        }
    }

    pub(crate) fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Keep only the rows whose flag is `true`.
    pub(crate) fn retain_rows(&self, keep: &[bool]) -> Self {
        let cells = self
            .cells
            .iter()
            .zip(keep)
            .filter(|(_, k)| **k)
            .map(|(c, _)| c.clone())
            .collect();
        Self {
            name: self.name.clone(),
            kind: self.kind,
            cells,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ColumnType {
        self.kind
    }

    pub fn cells(&self) -> &[CellValue] {
        &self.cells
    }

    pub fn get(&self, row: usize) -> Option<&CellValue> {
        self.cells.get(row)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn is_numeric(&self) -> bool {
        self.kind.is_numeric()
    }

    pub fn null_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_null()).count()
    }
}

fn infer_kind(cells: &[CellValue]) -> ColumnType {
    let mut kinds = cells.iter().filter_map(CellValue::kind);
    match kinds.next() {
        None => ColumnType::Mixed,
        Some(first) if kinds.all(|k| k == first) => first,
        Some(_) => ColumnType::Mixed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_foreign_cells() {
        let err = Column::new(
            "age",
            ColumnType::Integer,
            vec![CellValue::Integer(1), CellValue::from("two")],
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_infer_kind() {
        let col = Column::infer("a", vec![CellValue::Null, CellValue::Float(1.5)]);
        assert_eq!(col.kind(), ColumnType::Float);

        let col = Column::infer("b", vec![CellValue::Integer(1), CellValue::from("x")]);
        assert_eq!(col.kind(), ColumnType::Mixed);

        let col = Column::infer("c", vec![CellValue::Null, CellValue::Null]);
        assert_eq!(col.kind(), ColumnType::Mixed);
    }

    #[test]
    fn test_with_cells_falls_back_to_mixed() {
        let col = Column::integers("n", [Some(1), None]);
        let same = col.with_cells(vec![CellValue::Integer(1), CellValue::Integer(2)]);
        assert_eq!(same.kind(), ColumnType::Integer);

        let mixed = col.with_cells(vec![CellValue::Integer(1), CellValue::from("n/a")]);
        assert_eq!(mixed.kind(), ColumnType::Mixed);
    }
}
