//! Dataset overview for front ends: shape, per-column types and missing
//! counts, duplicate rows, distinct values and a plain-text preview.

use crate::dataset::{CellValue, Column, ColumnType, Dataset};
use crate::ops::rows;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub kind: ColumnType,
    pub null_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
    pub row_count: usize,
    pub column_count: usize,
    pub duplicate_rows: usize,
    pub columns: Vec<ColumnSummary>,
}

impl DatasetSummary {
    pub fn total_missing(&self) -> usize {
        self.columns.iter().map(|c| c.null_count).sum()
    }
}

impl fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Rows: {}", self.row_count)?;
        writeln!(f, "Columns: {}", self.column_count)?;
        writeln!(f, "Duplicate rows: {}", self.duplicate_rows)?;
        writeln!(f, "Missing values: {}", self.total_missing())?;
        let width = self
            .columns
            .iter()
            .map(|c| c.name.chars().count())
            .max()
            .unwrap_or(0);
        for col in &self.columns {
            writeln!(
                f,
                "  {:<width$}  {:<8}  missing: {}",
                col.name,
                col.kind.as_str(),
                col.null_count
            )?;
        }
        Ok(())
    }
}

pub fn summarize(dataset: &Dataset) -> DatasetSummary {
    DatasetSummary {
        row_count: dataset.height(),
        column_count: dataset.width(),
        duplicate_rows: rows::duplicate_count(dataset, None),
        columns: dataset
            .columns()
            .iter()
            .map(|c| ColumnSummary {
                name: c.name().to_owned(),
                kind: c.kind(),
                null_count: c.null_count(),
            })
            .collect(),
    }
}

/// Distinct text representations of the non-null cells, in first-seen order.
/// These are the candidates offered for typo correction.
pub fn distinct_values(column: &Column) -> Vec<String> {
    let mut seen = HashSet::new();
    column
        .cells()
        .iter()
        .filter_map(CellValue::to_text)
        .filter(|text| seen.insert(text.clone()))
        .collect()
}

/// Plain-text table of the first `limit` rows. Nulls render as empty cells.
pub fn render_preview(dataset: &Dataset, limit: usize) -> String {
    let shown = dataset.height().min(limit);
    let header: Vec<String> = dataset.column_names().into_iter().map(str::to_owned).collect();
    let body: Vec<Vec<String>> = (0..shown)
        .map(|row| {
            dataset
                .columns()
                .iter()
                .map(|c| c.get(row).map(CellValue::to_string).unwrap_or_default())
                .collect()
        })
        .collect();

    let widths: Vec<usize> = header
        .iter()
        .enumerate()
        .map(|(i, name)| {
            body.iter()
                .filter_map(|r| r.get(i))
                .map(|s| s.chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    push_row(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, &rule, &widths);
    for row in &body {
        push_row(&mut out, row, &widths);
    }
    if dataset.height() > shown {
        out.push_str(&format!("... {} more row(s)\n", dataset.height() - shown));
    }
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect();
    out.push_str(line.join(" | ").trim_end());
    out.push('\n');
}
