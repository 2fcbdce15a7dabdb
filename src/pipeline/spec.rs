//! Pipeline specification data structures.
//!
//! A pipeline is a named, versioned list of dispatcher actions stored as
//! JSON. Step parameters may be written as JSON strings, numbers, booleans or
//! arrays; they are flattened to the dispatcher's `string -> string` bag
//! before parsing.

use crate::engine::{Action, ActionError, ActionKind, Params};
use crate::io::FileFormat;
use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Current pipeline spec version
pub const SPEC_VERSION: &str = "0.1";

/// Root pipeline specification structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineSpec {
    /// Specification version for future migrations
    pub version: String,

    /// Human-readable pipeline name
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Ordered sequence of actions
    #[serde(default)]
    pub steps: Vec<Step>,

    #[serde(default)]
    pub output: OutputConfig,
}

impl PipelineSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: SPEC_VERSION.to_owned(),
            name: name.into(),
            description: None,
            steps: Vec::new(),
            output: OutputConfig::default(),
        }
    }

    /// Append a step, builder style.
    #[must_use]
    pub fn with_step<K, V>(mut self, action: &str, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.steps.push(Step {
            action: action.to_owned(),
            params: params
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        });
        self
    }

    /// Load a pipeline spec from a JSON file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or is not a valid spec.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read pipeline spec {}", path.display()))?;
        Self::from_json(&content)
    }

    /// # Errors
    ///
    /// Returns error if `json` is not a valid spec.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse pipeline spec JSON")
    }

    /// # Errors
    ///
    /// Returns error if the file cannot be written.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = self.to_json()?;
        std::fs::write(path.as_ref(), json).context("Failed to write pipeline spec file")
    }

    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize pipeline spec")
    }
}

/// One dispatcher action and its parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Step {
    pub action: String,
    #[serde(default)]
    pub params: BTreeMap<String, Value>,
}

impl Step {
    /// Flatten JSON values into the dispatcher's parameter bag. Strings are
    /// taken as is, arrays are joined with commas (the `subset` form), and
    /// `null` leaves the parameter out.
    pub fn params(&self) -> Params {
        self.params
            .iter()
            .filter_map(|(key, value)| Some((key.clone(), param_text(value)?)))
            .collect()
    }

    /// # Errors
    ///
    /// Returns the dispatcher's diagnostic for an unknown action id or a
    /// missing or malformed parameter.
    pub fn to_action(&self) -> Result<Action, ActionError> {
        let kind: ActionKind = self.action.parse()?;
        Action::parse(kind, &self.params())
    }
}

fn param_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(param_text)
                .collect::<Vec<_>>()
                .join(","),
        ),
        other => Some(other.to_string()),
    }
}

/// Output file configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputConfig {
    /// Format used when the output path has no extension
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<FileFormat>,

    /// Output path template (supports {date} substitution)
    #[serde(default)]
    pub path_template: String,

    /// Whether to overwrite existing files
    #[serde(default = "default_true")]
    pub overwrite: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            path_template: String::new(),
            overwrite: true,
        }
    }
}

fn default_true() -> bool {
    true
}
