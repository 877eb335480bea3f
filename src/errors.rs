// ABOUTME: Error types for the mdsite generator
// ABOUTME: Provides structured error handling for each stage of the build pipeline

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("Failed to read {path:?}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path:?}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory error for {path:?}: {source}")]
    DirectoryError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML in {path:?}: {source}")]
    YamlError {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid front matter in {path:?}: {message}")]
    FrontMatterError { path: PathBuf, message: String },

    #[error("Markdown conversion error: {0}")]
    MarkdownError(String),

    #[error("Failed to minify stylesheet {path:?}: {message}")]
    StylesheetError { path: PathBuf, message: String },

    #[error("Failed to render {page}: {source}")]
    TemplateError {
        page: String,
        #[source]
        source: liquid::Error,
    },

    #[error("Input validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, SiteError>;
