//! Template rendering for deployment descriptors.
//!
//! A template is plain text containing `{{key}}` tokens. Tokens are replaced
//! from merged option documents, then the result is parsed in the template's
//! own format and re-emitted as YAML.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::{Map, Value};
use thiserror::Error;

#[allow(clippy::expect_used)]
static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^ }]+)\}\}").expect("valid token regex"));

#[derive(Debug, Error)]
pub enum ConfigureError {
    #[error("Unknown file type for {path}")]
    UnknownType { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse {path} as {format}: {message}")]
    Parse {
        path: PathBuf,
        format: DocumentType,
        message: String,
    },

    #[error("options file {path} is not a mapping")]
    NotAMapping { path: PathBuf },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot render output as YAML: {0}")]
    Render(String),
}

/// Serialization format of a template or options document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentType {
    Toml,
    Yaml,
    Json,
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Toml => "TOML",
            Self::Yaml => "YAML",
            Self::Json => "JSON",
        })
    }
}

impl DocumentType {
    /// Resolve the type from an explicit hint, falling back to the
    /// extension of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigureError::UnknownType`] when neither names a known
    /// format.
    pub fn detect(path: &Path, hint: Option<&str>) -> Result<Self, ConfigureError> {
        let name = match hint {
            Some(hint) => hint.to_ascii_lowercase(),
            None => path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or_default()
                .to_ascii_lowercase(),
        };
        match name.as_str() {
            "toml" | "tml" => Ok(Self::Toml),
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" | "js" => Ok(Self::Json),
            _ => Err(ConfigureError::UnknownType {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Parse `text` into a format-neutral value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigureError::Parse`] when `text` is not valid in this
    /// format.
    pub fn parse(self, path: &Path, text: &str) -> Result<Value, ConfigureError> {
        let parsed = match self {
            Self::Toml => toml::from_str::<Value>(text).map_err(|e| e.to_string()),
            Self::Yaml => serde_yaml::from_str::<Value>(text).map_err(|e| e.to_string()),
            Self::Json => serde_json::from_str::<Value>(text).map_err(|e| e.to_string()),
        };
        parsed.map_err(|message| ConfigureError::Parse {
            path: path.to_path_buf(),
            format: self,
            message,
        })
    }
}

fn read(path: &Path) -> Result<String, ConfigureError> {
    std::fs::read_to_string(path).map_err(|source| ConfigureError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Load and merge option documents left to right; later keys win.
///
/// # Errors
///
/// Returns an error if a file cannot be read or parsed, or is not a mapping.
pub fn load_options(paths: &[PathBuf], format: DocumentType) -> Result<Map<String, Value>, ConfigureError> {
    let mut merged = Map::new();
    for path in paths {
        match format.parse(path, &read(path)?)? {
            Value::Object(values) => merged.extend(values),
            // An empty YAML document parses as null.
            Value::Null => {}
            _ => return Err(ConfigureError::NotAMapping { path: path.clone() }),
        }
    }
    Ok(merged)
}

/// Text a value is substituted as. Strings go in verbatim, everything else
/// as single-line YAML flow text. Empty values are not substituted.
fn replacement(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Array(a) if a.is_empty() => None,
        Value::Object(o) if o.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        // JSON is a subset of YAML flow syntax.
        other => Some(other.to_string()),
    }
}

/// Replace every `{{key}}` whose key has a non-empty value in `options`.
/// Unknown tokens are left as they are.
#[must_use]
pub fn substitute(template: &str, options: &Map<String, Value>) -> String {
    TOKEN_RE
        .replace_all(template, |caps: &Captures<'_>| {
            options
                .get(&caps[1])
                .and_then(replacement)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Inputs of one rendering run.
#[derive(Debug)]
pub struct Job {
    pub template: PathBuf,
    pub template_type: Option<String>,
    pub options: Vec<PathBuf>,
    pub option_type: Option<String>,
}

/// Render `job` to YAML text.
///
/// # Errors
///
/// Returns the first [`ConfigureError`] met while reading, parsing or
/// rendering.
pub fn render(job: &Job) -> Result<String, ConfigureError> {
    let template_type = DocumentType::detect(&job.template, job.template_type.as_deref())?;
    let options = match job.options.first() {
        Some(first) => {
            let option_type = DocumentType::detect(first, job.option_type.as_deref())?;
            load_options(&job.options, option_type)?
        }
        None => Map::new(),
    };
    let text = substitute(&read(&job.template)?, &options);
    let document = template_type.parse(&job.template, &text)?;
    serde_yaml::to_string(&document).map_err(|e| ConfigureError::Render(e.to_string()))
}

/// Render `job` and write the YAML to `output`.
///
/// # Errors
///
/// Returns an error if rendering fails or `output` cannot be written.
pub fn render_to(job: &Job, output: &Path) -> Result<(), ConfigureError> {
    let yaml = render(job)?;
    std::fs::write(output, yaml).map_err(|source| ConfigureError::Write {
        path: output.to_path_buf(),
        source,
    })
}
