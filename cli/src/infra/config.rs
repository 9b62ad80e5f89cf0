//! Loading runner `Settings` from a YAML file or `SURGE_*` environment
//! variables.

use std::path::Path;

use anyhow::{Context, Result};

use crate::domain::Settings;

/// Prefix of the environment variables settings are read from, e.g.
/// `SURGE_CLUSTER_HELPER`, `SURGE_SHUTDOWN_MARGIN_SECS`.
pub const ENV_PREFIX: &str = "SURGE_";

/// Load settings from `path` when given, otherwise from the environment.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if an
/// environment variable holds a value of the wrong type.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(path) => load_file(path),
        None => settings_from_vars(std::env::vars()),
    }
}

fn load_file(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(Settings::default());
    }
    serde_yaml::from_str(&content).with_context(|| format!("cannot parse {}", path.display()))
}

/// Build settings from `SURGE_*` pairs; unrelated variables are ignored.
///
/// # Errors
///
/// Returns an error if a `SURGE_*` value cannot be parsed into its field.
pub fn settings_from_vars<I>(vars: I) -> Result<Settings>
where
    I: IntoIterator<Item = (String, String)>,
{
    envy::prefixed(ENV_PREFIX)
        .from_iter(vars)
        .with_context(|| format!("failed to load settings from {ENV_PREFIX}* env vars"))
}
