// ABOUTME: Utility functions for the mdsite generator
// ABOUTME: Provides directory handling, slug derivation and page writing helpers

use crate::errors::{Result, SiteError};
use log::{debug, info};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

/// Ensure a directory exists, creating it and its parents if necessary
pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| SiteError::DirectoryError {
            path: path.to_path_buf(),
            source: e,
        })?;
    } else if !path.is_dir() {
        return Err(SiteError::ValidationError(format!(
            "Path exists but is not a directory: {:?}",
            path
        )));
    }
    Ok(())
}

/// List the entries directly inside `dir`, sorted by file name
pub fn list_directory(dir: &Path) -> Result<Vec<PathBuf>> {
    let to_error = |e| SiteError::DirectoryError {
        path: dir.to_path_buf(),
        source: e,
    };

    let mut entries = fs::read_dir(dir)
        .map_err(to_error)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(to_error)?;
    entries.sort();
    Ok(entries)
}

/// Whether `path` carries the given extension (without the leading dot)
pub fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension() == Some(OsStr::new(ext))
}

/// Whether `path` names a Markdown source document
pub fn is_markdown_file(path: &Path) -> bool {
    has_extension(path, "md")
}

/// Remove every entry directly inside `dir` with the given extension.
///
/// Listing failures are returned. Failing to remove a single entry is
/// ignored. Returns the number of entries removed.
pub fn clear_dir_with_extension(dir: &Path, ext: &str) -> Result<usize> {
    let mut removed = 0;

    for path in list_directory(dir)? {
        if !has_extension(&path, ext) {
            continue;
        }

        let outcome = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };

        match outcome {
            Ok(()) => removed += 1,
            Err(e) => debug!("Could not remove {:?}: {}", path, e),
        }
    }

    Ok(removed)
}

/// Derive the slug of a source document: its file name without extension
pub fn slug_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Write a rendered page, replacing any existing file
pub fn write_html_to_file(html_content: &str, output_path: &Path) -> Result<()> {
    info!("Writing HTML to file: {:?}", output_path);

    fs::write(output_path, html_content).map_err(|e| SiteError::WriteError {
        path: output_path.to_path_buf(),
        source: e,
    })
}
