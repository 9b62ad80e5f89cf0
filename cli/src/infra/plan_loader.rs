//! Reading plan documents from disk or stdin.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use surge_common::Plan;

use crate::domain::PlanLoadError;

/// Serialization format of a plan document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanFormat {
    Json,
    Yaml,
    Toml,
}

impl PlanFormat {
    /// Pick the format from a file extension.
    ///
    /// # Errors
    ///
    /// Returns [`PlanLoadError::UnsupportedFormat`] for unknown extensions.
    pub fn from_path(path: &Path) -> Result<Self, PlanLoadError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match ext.as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "toml" => Ok(Self::Toml),
            _ => Err(PlanLoadError::UnsupportedFormat(ext)),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Yaml => "YAML",
            Self::Toml => "TOML",
        }
    }
}

/// Parse a plan document.
///
/// A JSON document of the form `{"toml": "<plan>"}` carries a TOML plan
/// inside a string and is unwrapped first.
///
/// # Errors
///
/// Returns [`PlanLoadError::Malformed`] if the text is not a plan in the
/// given format.
pub fn parse_plan(text: &str, format: PlanFormat) -> Result<Plan, PlanLoadError> {
    let malformed = |message: String| PlanLoadError::Malformed {
        format: format.name(),
        message,
    };
    match format {
        PlanFormat::Json => {
            let value: serde_json::Value =
                serde_json::from_str(text).map_err(|e| malformed(e.to_string()))?;
            if let Some(inner) = value.get("toml").and_then(serde_json::Value::as_str) {
                return parse_plan(inner, PlanFormat::Toml);
            }
            serde_json::from_value(value).map_err(|e| malformed(e.to_string()))
        }
        PlanFormat::Yaml => serde_yaml::from_str(text).map_err(|e| malformed(e.to_string())),
        PlanFormat::Toml => toml::from_str(text).map_err(|e| malformed(e.to_string())),
    }
}

/// Load a plan from `source`, or from stdin (as JSON) when `source` is
/// `None` or `-`.
///
/// # Errors
///
/// Returns an error if the document cannot be read or parsed.
pub fn load_plan(source: Option<&Path>) -> Result<Plan> {
    match source {
        Some(path) if path != Path::new("-") => {
            let format = PlanFormat::from_path(path)?;
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("cannot read {}", path.display()))?;
            parse_plan(&text, format).with_context(|| format!("cannot load {}", path.display()))
        }
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("cannot read plan from stdin")?;
            parse_plan(&text, PlanFormat::Json).context("cannot load plan from stdin")
        }
    }
}
