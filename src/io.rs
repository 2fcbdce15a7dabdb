//! Import and export of datasets.
//!
//! CSV and Parquet go through Polars, spreadsheets through calamine (read)
//! and `rust_xlsxwriter` (write). The file extension decides the format and
//! unsupported extensions are rejected before any file is touched.

mod excel;
mod frame;

use crate::dataset::Dataset;
use crate::error::DatawashError;
use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Spreadsheet extensions accepted on import.
pub const EXCEL_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Csv,
    #[serde(alias = "xlsx")]
    Excel,
    Parquet,
}

impl FileFormat {
    /// Detect the format from a path's extension.
    ///
    /// # Errors
    ///
    /// Returns [`DatawashError::UnsupportedFormat`] for a missing or unknown
    /// extension.
    pub fn from_path(path: &Path) -> Result<Self, DatawashError> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_lowercase();
        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            "parquet" => Ok(Self::Parquet),
            e if EXCEL_EXTENSIONS.contains(&e) => Ok(Self::Excel),
            "" => Err(DatawashError::UnsupportedFormat(format!(
                "'{}' has no file extension",
                path.display()
            ))),
            other => Err(DatawashError::UnsupportedFormat(format!(".{other}"))),
        }
    }

    /// Extension used when writing this format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Excel => "xlsx",
            Self::Parquet => "parquet",
        }
    }
}

impl FromStr for FileFormat {
    type Err = DatawashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "excel" | "xlsx" => Ok(Self::Excel),
            "parquet" => Ok(Self::Parquet),
            other => Err(DatawashError::UnsupportedFormat(other.to_owned())),
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Reader settings, normally taken from [`crate::config::AppSettings`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    /// Rows scanned to infer CSV column types; `None` scans everything.
    pub infer_schema_length: Option<usize>,
    pub try_parse_dates: bool,
    /// Worksheet name or 0-based index; the first sheet when unset.
    pub excel_sheet: Option<String>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            infer_schema_length: Some(10_000),
            try_parse_dates: true,
            excel_sheet: None,
        }
    }
}

/// Load a dataset from a CSV, spreadsheet or Parquet file.
///
/// # Errors
///
/// Returns an error for an unsupported extension, an unreadable file, or a
/// file whose columns cannot form a valid dataset (e.g. duplicate headers).
pub fn load_dataset(path: &Path, options: &ImportOptions) -> Result<Dataset> {
    let format = FileFormat::from_path(path)?;
    let dataset = match format {
        FileFormat::Csv => frame::read_csv(path, options)
            .with_context(|| format!("Failed to read CSV {}", path.display()))?,
        FileFormat::Parquet => frame::read_parquet(path)
            .with_context(|| format!("Failed to read Parquet {}", path.display()))?,
        FileFormat::Excel => excel::read_workbook(path, options.excel_sheet.as_deref())
            .with_context(|| format!("Failed to read workbook {}", path.display()))?,
    };
    info!(
        path = %path.display(),
        %format,
        rows = dataset.height(),
        columns = dataset.width(),
        "Loaded dataset"
    );
    Ok(dataset)
}

/// Write a dataset, choosing the format from the extension. Column order is
/// preserved and nulls become empty cells.
///
/// # Errors
///
/// Returns an error for an unsupported extension (spreadsheets are written
/// as `.xlsx` only) or if the file cannot be written.
pub fn save_dataset(dataset: &Dataset, path: &Path) -> Result<()> {
    let format = FileFormat::from_path(path)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    match format {
        FileFormat::Csv => frame::write_csv(dataset, path)
            .with_context(|| format!("Failed to write CSV {}", path.display()))?,
        FileFormat::Parquet => frame::write_parquet(dataset, path)
            .with_context(|| format!("Failed to write Parquet {}", path.display()))?,
        FileFormat::Excel => {
            let is_xlsx = path
                .extension()
                .and_then(|s| s.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("xlsx"));
            if !is_xlsx {
                return Err(DatawashError::UnsupportedFormat(format!(
                    "spreadsheets can only be written as .xlsx, not {}",
                    path.display()
                ))
                .into());
            }
            excel::write_workbook(dataset, path)
                .with_context(|| format!("Failed to write workbook {}", path.display()))?;
        }
    }
    info!(
        path = %path.display(),
        %format,
        rows = dataset.height(),
        columns = dataset.width(),
        "Saved dataset"
    );
    Ok(())
}
