// ABOUTME: Configuration module for the mdsite generator
// ABOUTME: Provides build options and loads the YAML site configuration

use crate::errors::{Result, SiteError};
use log::debug;
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the layout file looked up inside the templates directory
pub const LAYOUT_FILE: &str = "layout.html";

/// Options for a single build, derived from the command line
#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub output_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub docs_dir: PathBuf,
    pub config_file: PathBuf,
    pub highlighting: String,
    pub css_file: PathBuf,
    pub clean: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./public"),
            templates_dir: PathBuf::from("./templates"),
            docs_dir: PathBuf::from("./docs"),
            config_file: PathBuf::from("./config.yml"),
            highlighting: "pygments".to_string(),
            css_file: PathBuf::from("./public/assets/css/style.css"),
            clean: false,
        }
    }
}

impl BuildConfig {
    /// Create a new configuration with default paths
    pub fn new() -> Self {
        Self::default()
    }

    /// Path to the shared layout template
    pub fn layout_path(&self) -> PathBuf {
        self.templates_dir.join(LAYOUT_FILE)
    }
}

/// Site-wide configuration loaded from YAML, read-only for the whole run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteConfig(Mapping);

impl SiteConfig {
    pub fn new(mapping: Mapping) -> Self {
        Self(mapping)
    }

    pub fn as_mapping(&self) -> &Mapping {
        &self.0
    }

    /// Look up a top-level key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Parse YAML text into a site configuration.
///
/// An empty document yields an empty mapping. Any other top-level shape
/// than a mapping is rejected.
pub fn parse_site_config(source: &str, path: &Path) -> Result<SiteConfig> {
    let value: Value = serde_yaml::from_str(source).map_err(|e| SiteError::YamlError {
        path: path.to_path_buf(),
        source: e,
    })?;

    match value {
        Value::Null => Ok(SiteConfig::default()),
        Value::Mapping(mapping) => Ok(SiteConfig(mapping)),
        other => Err(SiteError::ConfigError(format!(
            "top level of {:?} must be a mapping, found {}",
            path,
            describe(&other)
        ))),
    }
}

/// Load the YAML site configuration from a file
pub fn load_site_config(path: &Path) -> Result<SiteConfig> {
    debug!("Loading site configuration: {:?}", path);

    let source = fs::read_to_string(path).map_err(|e| SiteError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_site_config(&source, path)
}

/// Short name of a YAML value's kind, for error messages
pub(crate) fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
