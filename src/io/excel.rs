//! Spreadsheet import (calamine) and `.xlsx` export (`rust_xlsxwriter`).

use crate::dataset::{CellValue, Column, ColumnType, Dataset};
use crate::ops::coerce::parse_datetime;
use anyhow::{Context as _, Result, anyhow};
use calamine::{Data, DataType as _, Range, Reader as _, open_workbook_auto};
use rust_xlsxwriter::Workbook;
use std::collections::HashSet;
use std::path::Path;

/// Read one worksheet. The first row holds the headers; `sheet` selects by
/// name, then by 0-based index, and defaults to the first sheet.
pub(super) fn read_workbook(path: &Path, sheet: Option<&str>) -> Result<Dataset> {
    let mut workbook = open_workbook_auto(path)?;
    if workbook.sheet_names().is_empty() {
        return Err(anyhow!("Workbook has no worksheets"));
    }

    let range = match sheet {
        Some(sel) if workbook.sheet_names().iter().any(|name| name == sel) => workbook
            .worksheet_range(sel)
            .with_context(|| format!("Failed to read sheet '{sel}'"))?,
        Some(sel) => {
            let idx = sel
                .parse::<usize>()
                .map_err(|_| anyhow!("No sheet named '{sel}'"))?;
            workbook
                .worksheet_range_at(idx)
                .ok_or_else(|| anyhow!("No sheet named '{sel}' or at index {idx}"))??
        }
        None => workbook
            .worksheet_range_at(0)
            .ok_or_else(|| anyhow!("Workbook has no first sheet"))??,
    };
    dataset_from_range(&range)
}

fn dataset_from_range(range: &Range<Data>) -> Result<Dataset> {
    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Dataset::default());
    };
    let body: Vec<&[Data]> = rows.collect();
    let names = header_names(header_row);

    let columns = names
        .into_iter()
        .enumerate()
        .map(|(idx, name)| {
            let cells = body
                .iter()
                .map(|row| row.get(idx).map_or(CellValue::Null, cell_value))
                .collect();
            column_from_cells(name, cells)
        })
        .collect();
    Ok(Dataset::new(columns)?)
}

/// Blank headers become `column_N`; repeated headers get a `.1`, `.2`, ...
/// suffix so names stay unique.
fn header_names(row: &[Data]) -> Vec<String> {
    let mut seen = HashSet::new();
    row.iter()
        .enumerate()
        .map(|(idx, cell)| {
            let raw = cell.as_string().unwrap_or_else(|| cell.to_string());
            let base = match raw.trim() {
                "" => format!("column_{}", idx + 1),
                trimmed => trimmed.to_owned(),
            };
            let mut name = base.clone();
            let mut n = 0;
            while !seen.insert(name.clone()) {
                n += 1;
                name = format!("{base}.{n}");
            }
            name
        })
        .collect()
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Null,
        Data::Int(v) => CellValue::Integer(*v),
        Data::Float(v) => CellValue::from(*v),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_datetime()
            .map_or_else(|| CellValue::Text(cell.to_string()), CellValue::Datetime),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

/// Spreadsheets store every number as a float, so a numeric column whose
/// values are all whole is read as integer. A text column whose values all
/// parse as dates is read as datetime.
fn column_from_cells(name: String, cells: Vec<CellValue>) -> Column {
    let non_null: Vec<&CellValue> = cells.iter().filter(|c| !c.is_null()).collect();
    if non_null.is_empty() {
        return Column::from_parts(name, ColumnType::Text, cells);
    }

    let all_whole = non_null.iter().all(|c| match c {
        CellValue::Integer(_) => true,
        CellValue::Float(v) => v.fract() == 0.0 && v.abs() < 9.0e15,
        _ => false,
    });
    if all_whole {
        let ints = cells
            .iter()
            .map(|c| match c {
                CellValue::Integer(v) => CellValue::Integer(*v),
                CellValue::Float(v) => CellValue::Integer(*v as i64),
                _ => CellValue::Null,
            })
            .collect();
        return Column::from_parts(name, ColumnType::Integer, ints);
    }

    let all_dates = non_null.iter().all(|c| match c {
        CellValue::Text(s) => parse_datetime(s).is_some(),
        other => matches!(other, CellValue::Datetime(_)),
    });
    if all_dates {
        let dates = cells
            .iter()
            .map(|c| match c {
                CellValue::Text(s) => parse_datetime(s).into(),
                other => other.clone(),
            })
            .collect();
        return Column::from_parts(name, ColumnType::Datetime, dates);
    }

    let only_numbers = non_null
        .iter()
        .all(|c| matches!(c, CellValue::Integer(_) | CellValue::Float(_)));
    if only_numbers {
        let floats = cells.iter().map(|c| c.as_f64().into()).collect();
        return Column::from_parts(name, ColumnType::Float, floats);
    }

    Column::infer(name, cells)
}

pub(super) fn write_workbook(dataset: &Dataset, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (col_idx, column) in dataset.columns().iter().enumerate() {
        let col = u16::try_from(col_idx).context("Too many columns for a worksheet")?;
        sheet.write_string(0, col, column.name())?;

        for (row_idx, cell) in column.cells().iter().enumerate() {
            let row = u32::try_from(row_idx + 1).context("Too many rows for a worksheet")?;
            match cell {
                CellValue::Null => {}
                CellValue::Integer(v) => {
                    sheet.write_number(row, col, *v as f64)?;
                }
                CellValue::Float(v) => {
                    sheet.write_number(row, col, *v)?;
                }
                other => {
                    sheet.write_string(row, col, other.to_string())?;
                }
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}
