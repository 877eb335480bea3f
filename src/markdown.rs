// ABOUTME: Markdown processing module for the mdsite generator
// ABOUTME: Converts markdown to HTML fragments and extracts YAML front matter

use crate::config::describe;
use crate::errors::{Result, SiteError};
use crate::utils::slug_from_path;
use comrak::adapters::{HeadingAdapter, HeadingMeta};
use comrak::nodes::{NodeValue, Sourcepos};
use comrak::plugins::syntect::{SyntectAdapter, SyntectAdapterBuilder};
use comrak::{format_html_with_plugins, parse_document, Anchorizer, Arena, Options, Plugins};
use log::{debug, warn};
use serde_yaml::{Mapping, Value};
use std::borrow::Cow;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use syntect::highlighting::ThemeSet;

/// Front matter of a single document
pub type Metadata = Mapping;

/// Delimiter line that opens and closes a front matter block
pub const FRONT_MATTER_DELIMITER: &str = "---";

/// Theme used when the requested style is not known
pub const FALLBACK_THEME: &str = "InspiredGitHub";

/// Pygments and Chroma style names mapped onto bundled syntect themes
const STYLE_ALIASES: &[(&str, &str)] = &[
    ("pygments", "InspiredGitHub"),
    ("default", "InspiredGitHub"),
    ("friendly", "InspiredGitHub"),
    ("github", "InspiredGitHub"),
    ("solarized-dark", "Solarized (dark)"),
    ("solarized-light", "Solarized (light)"),
    ("base16", "base16-ocean.dark"),
    ("ocean", "base16-ocean.dark"),
    ("eighties", "base16-eighties.dark"),
    ("mocha", "base16-mocha.dark"),
];

/// One markdown source file after conversion
#[derive(Debug, Clone)]
pub struct Document {
    pub path: PathBuf,
    pub slug: String,
    pub source: Vec<u8>,
    pub html: String,
    pub meta: Metadata,
}

impl Document {
    /// File name of the rendered page
    pub fn output_file_name(&self) -> String {
        format!("{}.html", self.slug)
    }
}

/// Resolve a highlighting style name to a theme present in `themes`.
///
/// Exact theme names win, then the alias table. Anything else falls back
/// to [`FALLBACK_THEME`] with a warning.
pub fn resolve_theme(style: &str, themes: &ThemeSet) -> String {
    if themes.themes.contains_key(style) {
        return style.to_string();
    }

    let lowered = style.to_lowercase();
    if let Some((_, theme)) = STYLE_ALIASES.iter().find(|(alias, _)| *alias == lowered) {
        debug!("Highlighting style {:?} mapped to theme {:?}", style, theme);
        return theme.to_string();
    }

    warn!(
        "Unknown highlighting style {:?}, falling back to {:?}",
        style, FALLBACK_THEME
    );
    FALLBACK_THEME.to_string()
}

/// Writes `<hN id="...">` with a GitHub-style anchor on the heading itself.
///
/// Ids are unique within one document, so a fresh adapter is used per
/// conversion.
#[derive(Default)]
struct HeadingIds {
    anchorizer: Mutex<Anchorizer>,
}

impl HeadingAdapter for HeadingIds {
    fn enter(
        &self,
        output: &mut dyn Write,
        heading: &HeadingMeta,
        _sourcepos: Option<Sourcepos>,
    ) -> io::Result<()> {
        let id = self
            .anchorizer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .anchorize(heading.content.clone());
        write!(output, "<h{} id=\"{}\">", heading.level, id)
    }

    fn exit(&self, output: &mut dyn Write, heading: &HeadingMeta) -> io::Result<()> {
        writeln!(output, "</h{}>", heading.level)
    }
}

/// Markdown converter with the extension set fixed for a whole run
pub struct MarkdownProcessor {
    options: Options<'static>,
    highlighter: SyntectAdapter,
    theme: String,
}

impl MarkdownProcessor {
    pub fn new(highlighting_style: &str) -> Self {
        let mut options = Options::default();
        options.extension.table = true;
        options.extension.math_dollars = true;
        options.extension.front_matter_delimiter = Some(FRONT_MATTER_DELIMITER.to_string());
        options.render.hardbreaks = true;
        options.render.unsafe_ = true; // Allow raw HTML

        let themes = ThemeSet::load_defaults();
        let theme = resolve_theme(highlighting_style, &themes);
        let highlighter = SyntectAdapterBuilder::new()
            .theme_set(themes)
            .theme(&theme)
            .build();

        Self {
            options,
            highlighter,
            theme,
        }
    }

    /// Name of the syntect theme used for code blocks
    pub fn theme(&self) -> &str {
        &self.theme
    }

    /// Convert markdown source into an HTML fragment and its front matter.
    ///
    /// `origin` only names the source in error messages.
    pub fn convert(&self, source: &str, origin: &Path) -> Result<(String, Metadata)> {
        let arena = Arena::new();
        let root = parse_document(&arena, source, &self.options);

        let front_matter = root.children().find_map(|node| match &node.data.borrow().value {
            NodeValue::FrontMatter(raw) => Some(raw.clone()),
            _ => None,
        });
        let meta = match front_matter {
            Some(raw) => parse_front_matter(&raw, origin)?,
            None => Metadata::new(),
        };

        let headings = HeadingIds::default();
        let mut plugins = Plugins::default();
        plugins.render.codefence_syntax_highlighter = Some(&self.highlighter);
        plugins.render.heading_adapter = Some(&headings);

        let mut html = Vec::new();
        format_html_with_plugins(root, &self.options, &mut html, &plugins).map_err(|e| {
            SiteError::MarkdownError(format!("failed to render {:?}: {}", origin, e))
        })?;
        let html = String::from_utf8(html).map_err(|e| {
            SiteError::MarkdownError(format!("rendered {:?} is not UTF-8: {}", origin, e))
        })?;

        Ok((html, meta))
    }

    /// Load a markdown file and convert it into a [`Document`].
    ///
    /// Bytes that are not valid UTF-8 are replaced with U+FFFD.
    pub fn parse_file(&self, path: &Path) -> Result<Document> {
        debug!("Parsing markdown file: {:?}", path);

        let source = fs::read(path).map_err(|e| SiteError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let text = String::from_utf8_lossy(&source);
        if matches!(text, Cow::Owned(_)) {
            warn!("{:?} is not valid UTF-8, replacing invalid bytes", path);
        }

        let (html, meta) = self.convert(&text, path)?;

        Ok(Document {
            path: path.to_path_buf(),
            slug: slug_from_path(path),
            source,
            html,
            meta,
        })
    }
}

/// Parse the raw front matter block captured by comrak, delimiters included
fn parse_front_matter(raw: &str, origin: &Path) -> Result<Metadata> {
    let body = strip_delimiters(raw);
    let to_error = |message: String| SiteError::FrontMatterError {
        path: origin.to_path_buf(),
        message,
    };

    let value: Value = serde_yaml::from_str(body).map_err(|e| to_error(e.to_string()))?;
    match value {
        Value::Null => Ok(Metadata::new()),
        Value::Mapping(mapping) => Ok(mapping),
        other => Err(to_error(format!(
            "expected a mapping, found {}",
            describe(&other)
        ))),
    }
}

fn strip_delimiters(raw: &str) -> &str {
    let trimmed = raw.trim();
    let body = trimmed
        .strip_prefix(FRONT_MATTER_DELIMITER)
        .unwrap_or(trimmed);
    body.strip_suffix(FRONT_MATTER_DELIMITER).unwrap_or(body)
}
