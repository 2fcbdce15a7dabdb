//! Persistent application settings.
//!
//! Settings live in `<config_dir>/datawash/config.json` unless the
//! `DATAWASH_CONFIG` environment variable (or the CLI's `--config` flag)
//! points elsewhere. A missing or unreadable file means defaults.

use crate::io::{FileFormat, ImportOptions};
use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Environment variable overriding the settings file location.
pub const CONFIG_ENV: &str = "DATAWASH_CONFIG";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct AppSettings {
    /// Rows scanned to infer CSV column types (`null` scans the whole file)
    pub infer_schema_length: Option<usize>,
    /// Whether the CSV reader should detect date and datetime columns
    pub try_parse_dates: bool,
    /// Rows shown by `summary` previews (default: 10)
    pub preview_row_limit: usize,
    /// Format used when an output path is derived rather than given
    pub default_output_format: FileFormat,
    /// Directory for derived output paths
    pub output_dir: String,
    /// Worksheet to import from spreadsheets, by name or 0-based index
    pub excel_sheet: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            infer_schema_length: Some(10_000),
            try_parse_dates: true,
            preview_row_limit: 10,
            default_output_format: FileFormat::Csv,
            output_dir: "outputs".to_owned(),
            excel_sheet: None,
        }
    }
}

impl AppSettings {
    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            infer_schema_length: self.infer_schema_length,
            try_parse_dates: self.try_parse_dates,
            excel_sheet: self.excel_sheet.clone(),
        }
    }

    /// Output path for `input` when none is given:
    /// `<output_dir>/<stem>_cleaned.<default format>`.
    pub fn default_output_path(&self, input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("dataset");
        Path::new(&self.output_dir).join(format!(
            "{stem}_cleaned.{}",
            self.default_output_format.extension()
        ))
    }
}

pub fn get_config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("datawash")
        .join("config.json")
}

pub fn load_app_config() -> AppSettings {
    load_app_config_from(&get_config_path())
}

/// Read settings from `path`, falling back to defaults when the file is
/// missing or cannot be parsed.
pub fn load_app_config_from(path: &Path) -> AppSettings {
    if !path.exists() {
        return AppSettings::default();
    }
    let parsed = std::fs::read_to_string(path)
        .context("Failed to read settings")
        .and_then(|content| serde_json::from_str(&content).context("Failed to parse settings"));
    match parsed {
        Ok(settings) => settings,
        Err(e) => {
            warn!(path = %path.display(), error = %format!("{e:#}"), "Using default settings");
            AppSettings::default()
        }
    }
}

/// # Errors
///
/// Returns error if the settings directory cannot be created or the file
/// cannot be written.
pub fn save_app_config(settings: &AppSettings) -> Result<()> {
    save_app_config_to(settings, &get_config_path())
}

/// # Errors
///
/// Returns error if the parent directory cannot be created or the file
/// cannot be written.
pub fn save_app_config_to(settings: &AppSettings, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let content = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write settings to {}", path.display()))?;
    Ok(())
}
