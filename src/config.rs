//! Configuration handling for scaffolder templates.
//! A template directory may carry a `scaffolder.json`, `scaffolder.yml` or
//! `scaffolder.yaml` file; without one the defaults apply.

use crate::builder::DEFAULT_TEMPLATE_SUFFIX;
use crate::error::{Error, Result};
use log::debug;
use serde::Deserialize;
use std::path::Path;

/// Supported configuration file names
pub const CONFIG_FILES: [&str; 3] = ["scaffolder.json", "scaffolder.yml", "scaffolder.yaml"];

/// Template-level settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Source directory, relative to the template root, that the walk starts from.
    pub prefix: String,
    pub template_suffix: String,
    pub merge: bool,
    /// Register the JSON deep-merge function for `.json` destinations.
    pub merge_json: bool,
    /// Glob patterns of source paths to leave out.
    pub ignore: Vec<String>,
    /// Commands run inside the output directory after generation.
    pub post_commands: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            template_suffix: DEFAULT_TEMPLATE_SUFFIX.to_string(),
            merge: false,
            merge_json: false,
            ignore: Vec::new(),
            post_commands: Vec::new(),
        }
    }
}

/// Parses JSON first, then YAML.
fn parse_document<T: serde::de::DeserializeOwned>(content: &str, what: &str) -> Result<T> {
    match serde_json::from_str(content) {
        Ok(value) => Ok(value),
        Err(_) => serde_yaml::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Invalid {what} format: {e}"))),
    }
}

/// Parses configuration content in JSON or YAML.
pub fn parse_config(content: &str) -> Result<Config> {
    parse_document(content, "configuration")
}

/// Loads the configuration of a template directory.
///
/// # Returns
/// * The first configuration file found, parsed
/// * `Config::default()` when the directory has none
pub fn load_config<P: AsRef<Path>>(template_dir: P) -> Result<Config> {
    for file in CONFIG_FILES {
        let config_path = template_dir.as_ref().join(file);
        if config_path.exists() {
            debug!("Loading configuration from {}", config_path.display());
            let content = std::fs::read_to_string(&config_path)?;
            return parse_config(&content);
        }
    }
    debug!("No configuration file found (tried: {})", CONFIG_FILES.join(", "));
    Ok(Config::default())
}

/// Parses a build context in JSON or YAML. Empty input yields an empty object.
pub fn parse_context(content: &str) -> Result<serde_json::Value> {
    if content.trim().is_empty() {
        return Ok(serde_json::Value::Object(serde_json::Map::new()));
    }
    parse_document(content, "context")
}

/// Reads a build context file.
pub fn load_context<P: AsRef<Path>>(path: P) -> Result<serde_json::Value> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::ConfigError(format!("Cannot read context file '{}': {}", path.display(), e))
    })?;
    parse_context(&content)
}
