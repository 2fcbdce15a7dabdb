//! Type coercion.
//!
//! Casts are best effort per value: a cell that cannot be represented in the
//! target type becomes null and is counted, the rest of the column converts.

use super::Transformed;
use crate::dataset::{CellValue, Column, ColumnType};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fmt;
use std::str::FromStr;

/// Target of a `cast_type` action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastTarget {
    Text,
    Integer,
    Float,
    Datetime,
}

impl CastTarget {
    pub fn column_type(self) -> ColumnType {
        match self {
            Self::Text => ColumnType::Text,
            Self::Integer => ColumnType::Integer,
            Self::Float => ColumnType::Float,
            Self::Datetime => ColumnType::Datetime,
        }
    }
}

impl FromStr for CastTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "str" | "string" => Ok(Self::Text),
            "int" | "integer" | "int64" => Ok(Self::Integer),
            "float" | "float64" | "double" => Ok(Self::Float),
            "datetime" | "date" => Ok(Self::Datetime),
            other => Err(format!("unknown target type '{other}'")),
        }
    }
}

impl fmt::Display for CastTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_type().as_str())
    }
}

/// Cast a column of any type to `target`. The result is always typed
/// `target.column_type()`.
pub fn cast(column: &Column, target: CastTarget) -> Transformed {
    let mut nulled = 0;
    let cells = column
        .cells()
        .iter()
        .map(|cell| {
            if cell.is_null() {
                return CellValue::Null;
            }
            let converted = convert(cell, target);
            if converted.is_null() {
                nulled += 1;
            }
            converted
        })
        .collect();

    Transformed {
        column: Column::from_parts(column.name(), target.column_type(), cells),
        nulled,
    }
}

fn convert(cell: &CellValue, target: CastTarget) -> CellValue {
    match (target, cell) {
        (CastTarget::Text, other) => other.to_text().map_or(CellValue::Null, CellValue::Text),

        (CastTarget::Integer, CellValue::Integer(v)) => CellValue::Integer(*v),
        (CastTarget::Integer, CellValue::Float(v)) => float_to_integer(*v).into(),
        (CastTarget::Integer, CellValue::Text(s)) => parse_integer(s).into(),

        (CastTarget::Float, CellValue::Integer(v)) => CellValue::Float(*v as f64),
        (CastTarget::Float, CellValue::Float(v)) => CellValue::from(*v),
        (CastTarget::Float, CellValue::Text(s)) => parse_float(s).into(),

        (CastTarget::Datetime, CellValue::Datetime(dt)) => CellValue::Datetime(*dt),
        (CastTarget::Datetime, CellValue::Text(s)) => parse_datetime(s).into(),

        _ => CellValue::Null,
    }
}

/// Parse an integer, accepting whole decimal forms such as `"3.0"`.
pub fn parse_integer(s: &str) -> Option<i64> {
    let s = s.trim();
    s.parse::<i64>()
        .ok()
        .or_else(|| parse_float(s).and_then(float_to_integer))
}

/// Parse a finite float. `NaN` and infinities count as failures.
pub fn parse_float(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Only whole, in-range floats convert; fractional values are a failure
/// rather than a silent truncation.
fn float_to_integer(v: f64) -> Option<i64> {
    let in_range = v >= i64::MIN as f64 && v < i64::MAX as f64;
    (v.is_finite() && v.fract() == 0.0 && in_range).then_some(v as i64)
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y", "%Y%m%d"];

/// Best-effort datetime parsing over ISO-like, RFC 3339 and common date
/// layouts. Dates without a time component land on midnight.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Interpret a user-supplied literal (form field, CLI argument) as a value
/// of the given column type. Literals that do not parse stay text.
pub fn literal_for(kind: ColumnType, literal: &str) -> CellValue {
    let typed = match kind {
        ColumnType::Integer => parse_integer(literal).map(CellValue::Integer),
        ColumnType::Float => parse_float(literal).map(CellValue::Float),
        ColumnType::Datetime => parse_datetime(literal).map(CellValue::Datetime),
        ColumnType::Text | ColumnType::Mixed => None,
    };
    typed.unwrap_or_else(|| CellValue::Text(literal.to_owned()))
}
