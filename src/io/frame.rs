//! Conversion between [`Dataset`] and Polars frames, plus the CSV and
//! Parquet readers and writers built on them.

use super::ImportOptions;
use crate::dataset::{CellValue, Column, ColumnType, DATETIME_FORMAT, Dataset};
use anyhow::{Context as _, Result};
use chrono::DateTime;
use polars::prelude::{
    Column as FrameColumn, CsvWriter, DataFrame, DataType, LazyCsvReader, LazyFileListReader,
    NamedFrom as _, ParquetReader, ParquetWriter, PolarsResult, SerReader as _, SerWriter as _,
    Series, TimeUnit,
};
use std::fs::File;
use std::path::Path;

const MILLIS: DataType = DataType::Datetime(TimeUnit::Milliseconds, None);

pub(super) fn read_csv(path: &Path, options: &ImportOptions) -> Result<Dataset> {
    let df = LazyCsvReader::new(path)
        .with_infer_schema_length(options.infer_schema_length)
        .with_has_header(true)
        .with_try_parse_dates(options.try_parse_dates)
        .finish()?
        .collect()?;
    dataset_from_frame(&df)
}

pub(super) fn read_parquet(path: &Path) -> Result<Dataset> {
    let file = File::open(path).context("Failed to open Parquet file")?;
    let df = ParquetReader::new(file).finish()?;
    dataset_from_frame(&df)
}

pub(super) fn write_csv(dataset: &Dataset, path: &Path) -> Result<()> {
    let mut df = frame_from_dataset(dataset)?;
    let file = File::create(path).context("Failed to create CSV file")?;
    CsvWriter::new(file)
        .include_header(true)
        .with_datetime_format(Some(DATETIME_FORMAT.into()))
        .finish(&mut df)?;
    Ok(())
}

pub(super) fn write_parquet(dataset: &Dataset, path: &Path) -> Result<()> {
    let mut df = frame_from_dataset(dataset)?;
    let file = File::create(path).context("Failed to create Parquet file")?;
    ParquetWriter::new(file).finish(&mut df)?;
    Ok(())
}

/// Map each Polars column onto the closest declared type. Integers of every
/// width become `integer`, floats `float`, dates and datetimes `datetime`;
/// everything else (strings, booleans, ...) is read as text.
pub(crate) fn dataset_from_frame(df: &DataFrame) -> Result<Dataset> {
    let columns = df
        .get_columns()
        .iter()
        .map(column_from_frame)
        .collect::<Result<Vec<_>>>()?;
    Ok(Dataset::new(columns)?)
}

fn column_from_frame(col: &FrameColumn) -> Result<Column> {
    let name = col.name().as_str();
    let series = col.as_materialized_series();
    let dtype = series.dtype();

    let column = if dtype.is_integer() {
        let cast = series.cast(&DataType::Int64)?;
        Column::integers(name, cast.i64()?)
    } else if dtype.is_float() {
        let cast = series.cast(&DataType::Float64)?;
        Column::floats(name, cast.f64()?)
    } else if matches!(dtype, DataType::Date | DataType::Datetime(_, _)) {
        let millis = series.cast(&MILLIS)?.cast(&DataType::Int64)?;
        let cells = millis
            .i64()?
            .into_iter()
            .map(|ms| {
                ms.and_then(DateTime::from_timestamp_millis)
                    .map(|dt| dt.naive_utc())
                    .into()
            })
            .collect();
        Column::new(name, ColumnType::Datetime, cells)?
    } else {
        let cast = series.cast(&DataType::String)?;
        Column::texts(name, cast.str()?)
    };
    Ok(column)
}

pub(crate) fn frame_from_dataset(dataset: &Dataset) -> PolarsResult<DataFrame> {
    let columns = dataset
        .columns()
        .iter()
        .map(frame_column)
        .collect::<PolarsResult<Vec<_>>>()?;
    DataFrame::new(columns)
}

/// Mixed columns are written as text so every cell survives.
fn frame_column(column: &Column) -> PolarsResult<FrameColumn> {
    let name = column.name().into();
    let cells = column.cells();
    let series = match column.kind() {
        ColumnType::Integer => {
            let values: Vec<Option<i64>> = cells
                .iter()
                .map(|c| match c {
                    CellValue::Integer(v) => Some(*v),
                    _ => None,
                })
                .collect();
            Series::new(name, values)
        }
        ColumnType::Float => {
            let values: Vec<Option<f64>> = cells.iter().map(CellValue::as_f64).collect();
            Series::new(name, values)
        }
        ColumnType::Datetime => {
            let values: Vec<Option<i64>> = cells
                .iter()
                .map(|c| match c {
                    CellValue::Datetime(dt) => Some(dt.and_utc().timestamp_millis()),
                    _ => None,
                })
                .collect();
            Series::new(name, values).cast(&MILLIS)?
        }
        ColumnType::Text | ColumnType::Mixed => {
            let values: Vec<Option<String>> = cells.iter().map(CellValue::to_text).collect();
            Series::new(name, values)
        }
    };
    Ok(FrameColumn::from(series))
}
