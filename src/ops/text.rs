//! Text normalization.

use crate::dataset::{CellValue, Column, ColumnType};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextNormalization {
    Lowercase,
    Trim,
    /// Keep ASCII letters and whitespace, drop everything else.
    Alnum,
}

impl TextNormalization {
    pub fn apply(self, text: &str) -> String {
        match self {
            Self::Lowercase => text.to_lowercase(),
            Self::Trim => text.trim().to_owned(),
            Self::Alnum => text
                .chars()
                .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace())
                .collect(),
        }
    }
}

impl fmt::Display for TextNormalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Lowercase => "lowercase",
            Self::Trim => "trim",
            Self::Alnum => "alnum",
        };
        f.write_str(name)
    }
}

/// Normalize the text representation of every non-null cell.
///
/// Accepts a column of any type; the result is always a text column and
/// nulls stay null.
pub fn normalize(column: &Column, mode: TextNormalization) -> Column {
    let cells = column
        .cells()
        .iter()
        .map(|cell| {
            cell.to_text()
                .map_or(CellValue::Null, |text| CellValue::Text(mode.apply(&text)))
        })
        .collect();
    Column::from_parts(column.name(), ColumnType::Text, cells)
}
