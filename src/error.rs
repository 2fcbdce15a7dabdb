//! Centralized error handling for datawash.
//!
//! Two layers of errors exist in this crate:
//!
//! - [`DatawashError`] covers everything that can fail *around* the engine:
//!   reading and writing files, building datasets whose invariants do not
//!   hold, configuration, and session lookups.
//! - [`crate::engine::ActionError`] describes why a single action was skipped
//!   or rejected. Those are never fatal; the engine always hands back a
//!   dataset.
//!
//! ## The `From` Trait for Error Conversion
//!
//! `From<E>` is implemented for the library errors we touch so that `?`
//! converts them automatically:
//!
//! ```no_run
//! use datawash::error::Result;
//! use std::fs;
//!
//! fn read_spec(path: &str) -> Result<String> {
//!     let content = fs::read_to_string(path)?;
//!     Ok(content)
//! }
//! ```
//!
//! ## Context Extension Trait
//!
//! [`ResultExt`] adds `.context()` to any `Result` whose error converts into
//! [`DatawashError`]:
//!
//! ```no_run
//! use datawash::error::ResultExt as _;
//! use std::fs;
//!
//! fn load() -> datawash::error::Result<String> {
//!     let text = fs::read_to_string("data.csv").context("Failed to load dataset")?;
//!     Ok(text)
//! }
//! ```

use std::fmt;

/// Main error type for datawash operations.
#[derive(Debug)]
pub enum DatawashError {
    /// I/O errors (file operations)
    Io(std::io::Error),

    /// Data processing errors (Polars, spreadsheet readers and writers)
    DataProcessing(String),

    /// A dataset or column violates a structural invariant
    Schema(String),

    /// Configuration errors
    Config(String),

    /// File extension or format not supported by the import/export layer
    UnsupportedFormat(String),

    /// Unknown session identifier or poisoned session state
    Session(String),

    /// Generic error with context
    Other(String),
}

impl fmt::Display for DatawashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::DataProcessing(msg) => write!(f, "Data processing error: {msg}"),
            Self::Schema(msg) => write!(f, "Schema error: {msg}"),
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::UnsupportedFormat(ext) => write!(f, "Unsupported file format: {ext}"),
            Self::Session(msg) => write!(f, "Session error: {msg}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for DatawashError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DatawashError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<anyhow::Error> for DatawashError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(format!("{err:#}"))
    }
}

impl From<serde_json::Error> for DatawashError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(format!("JSON error: {err}"))
    }
}

impl From<polars::error::PolarsError> for DatawashError {
    fn from(err: polars::error::PolarsError) -> Self {
        Self::DataProcessing(err.to_string())
    }
}

impl From<calamine::Error> for DatawashError {
    fn from(err: calamine::Error) -> Self {
        Self::DataProcessing(format!("Spreadsheet read error: {err}"))
    }
}

impl From<rust_xlsxwriter::XlsxError> for DatawashError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Self::DataProcessing(format!("Spreadsheet write error: {err}"))
    }
}

impl From<DatawashError> for String {
    fn from(err: DatawashError) -> Self {
        err.to_string()
    }
}

/// Result type alias for datawash operations.
pub type Result<T> = std::result::Result<T, DatawashError>;

/// Extension trait to add context to results.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> Result<T>;

    /// Add context using a closure (lazy evaluation).
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<DatawashError>,
{
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err: DatawashError = e.into();
            DatawashError::Other(format!("{}: {}", msg.into(), err))
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err: DatawashError = e.into();
            DatawashError::Other(format!("{}: {}", f(), err))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DatawashError::Schema("duplicate column name 'id'".to_owned());
        assert_eq!(err.to_string(), "Schema error: duplicate column name 'id'");
    }

    #[test]
    fn test_unsupported_format_display() {
        let err = DatawashError::UnsupportedFormat("txt".to_owned());
        let s: String = err.into();
        assert_eq!(s, "Unsupported file format: txt");
    }

    #[test]
    fn test_result_context() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file.csv",
        ));

        let result: Result<()> = result.context("Failed to read file");
        let Err(err) = result else {
            panic!("context must keep the error");
        };
        assert!(err.to_string().contains("Failed to read file"));
        assert!(err.to_string().contains("file.csv"));
    }
}
