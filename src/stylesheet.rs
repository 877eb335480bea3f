// ABOUTME: Stylesheet handling for the mdsite generator
// ABOUTME: Reads the site CSS file and minifies it for inline embedding

use crate::errors::{Result, SiteError};
use log::{info, warn};
use std::borrow::Cow;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Minified CSS shared read-only by every page of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stylesheet {
    css: String,
}

impl Stylesheet {
    pub fn as_bytes(&self) -> &[u8] {
        self.css.as_bytes()
    }

    pub fn as_str(&self) -> &str {
        &self.css
    }

    pub fn is_empty(&self) -> bool {
        self.css.is_empty()
    }

    pub fn len(&self) -> usize {
        self.css.len()
    }
}

/// Minify CSS source text
pub fn minify_css(source: &str, path: &Path) -> Result<Stylesheet> {
    let minified = minifier::css::minify(source).map_err(|message| SiteError::StylesheetError {
        path: path.to_path_buf(),
        message: message.to_string(),
    })?;

    Ok(Stylesheet {
        css: minified.to_string(),
    })
}

/// Read and minify the CSS file at `path`.
///
/// A missing file is not an error: a warning is logged and an empty
/// stylesheet is returned. Bytes that are not valid UTF-8 are replaced
/// with U+FFFD.
pub fn minify_stylesheet(path: &Path) -> Result<Stylesheet> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("CSS file {:?} does not exist", path);
            return Ok(Stylesheet::default());
        }
        Err(e) => {
            return Err(SiteError::ReadError {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    let source = String::from_utf8_lossy(&bytes);
    if matches!(source, Cow::Owned(_)) {
        warn!("CSS file {:?} is not valid UTF-8, replacing invalid bytes", path);
    }

    let stylesheet = minify_css(&source, path)?;
    info!(
        "Minified stylesheet {:?} ({} -> {} bytes)",
        path,
        source.len(),
        stylesheet.len()
    );
    Ok(stylesheet)
}
