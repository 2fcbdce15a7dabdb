//! Cell values and declared column types.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Format used for the text representation of datetime cells.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single cell. `Null` is the missing-value sentinel and is distinct from
/// `Text(String::new())`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
    Datetime(NaiveDateTime),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The column type this cell naturally belongs to, `None` for nulls.
    pub fn kind(&self) -> Option<ColumnType> {
        match self {
            Self::Null => None,
            Self::Text(_) => Some(ColumnType::Text),
            Self::Integer(_) => Some(ColumnType::Integer),
            Self::Float(_) => Some(ColumnType::Float),
            Self::Datetime(_) => Some(ColumnType::Datetime),
        }
    }

    /// Numeric view of the cell. Only integer and float cells qualify.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(v) => Some(*v as f64),
            Self::Float(v) if !v.is_nan() => Some(*v),
            _ => None,
        }
    }

    /// Text representation used by normalization, string matching and export.
    /// Nulls have none.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Text(s) => Some(s.clone()),
            Self::Integer(v) => Some(v.to_string()),
            Self::Float(v) => Some(format_float(*v)),
            Self::Datetime(dt) => Some(dt.format(DATETIME_FORMAT).to_string()),
        }
    }

    /// Hashable identity of the cell, used for duplicate detection and mode.
    pub fn key(&self) -> CellKey<'_> {
        match self {
            Self::Null => CellKey::Null,
            Self::Text(s) => CellKey::Text(s),
            Self::Integer(v) => CellKey::Integer(*v),
            Self::Float(v) => CellKey::Float(canonical_bits(*v)),
            Self::Datetime(dt) => CellKey::Datetime(*dt),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_text() {
            Some(text) => f.write_str(&text),
            None => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

/// NaN is a missing value, not a float.
impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        if value.is_nan() {
            Self::Null
        } else {
            Self::Float(value)
        }
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        Self::Datetime(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Borrowed, hashable identity of a [`CellValue`].
///
/// Floats compare by bit pattern after folding `-0.0` into `0.0` and every NaN
/// into one canonical NaN, so two equal-looking floats always hash together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKey<'a> {
    Null,
    Text(&'a str),
    Integer(i64),
    Float(u64),
    Datetime(NaiveDateTime),
}

fn canonical_bits(v: f64) -> u64 {
    if v.is_nan() {
        f64::NAN.to_bits()
    } else if v == 0.0 {
        0.0_f64.to_bits()
    } else {
        v.to_bits()
    }
}

/// Whole floats keep a trailing `.0` so their text form still reads as a float.
fn format_float(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 {
        format!("{v:.1}")
    } else {
        v.to_string()
    }
}

/// Declared type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Integer,
    Float,
    Datetime,
    /// Untyped column; may hold cells of any variant.
    Mixed,
}

impl ColumnType {
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }

    /// Whether a cell may live in a column of this type.
    pub fn admits(self, cell: &CellValue) -> bool {
        match cell.kind() {
            None => true,
            Some(kind) => self == Self::Mixed || self == kind,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Datetime => "datetime",
            Self::Mixed => "mixed",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
