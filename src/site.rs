// ABOUTME: Site building module for the mdsite generator
// ABOUTME: Walks the docs directory and writes the home page and every article

use crate::config::{load_site_config, BuildConfig};
use crate::errors::Result;
use crate::markdown::MarkdownProcessor;
use crate::stylesheet::minify_stylesheet;
use crate::template::{load_template, Bindings, PageRenderer};
use crate::utils::{
    clear_dir_with_extension, ensure_directory_exists, is_markdown_file, list_directory,
    write_html_to_file,
};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::time::Instant;

/// File name of the home page
pub const INDEX_FILE: &str = "index.html";

/// Pages written by one build, in the order they were written
#[derive(Debug, Clone, Default)]
pub struct BuildSummary {
    pub pages: Vec<PathBuf>,
}

impl BuildSummary {
    /// Number of article pages, excluding the home page
    pub fn article_count(&self) -> usize {
        self.pages.len().saturating_sub(1)
    }
}

/// Build the whole site described by `config`.
///
/// Stops at the first error; pages written before it are left in place.
pub fn build_site(config: &BuildConfig) -> Result<BuildSummary> {
    let start_time = Instant::now();
    let output_dir = &config.output_dir;

    if config.clean {
        info!("Cleaning {:?}", output_dir);
        let removed = clear_dir_with_extension(output_dir, "html")?;
        debug!("Removed {} stale HTML files", removed);
    }

    ensure_directory_exists(output_dir)?;

    let site_config = load_site_config(&config.config_file)?;
    let layout = load_template(&config.layout_path())?;
    let markdown = MarkdownProcessor::new(&config.highlighting);
    let stylesheet = minify_stylesheet(&config.css_file)?;
    let renderer = PageRenderer::new()?;

    let mut summary = BuildSummary::default();

    let index_html = renderer.render(&layout, &Bindings::home(&site_config, &stylesheet))?;
    let index_path = output_dir.join(INDEX_FILE);
    write_html_to_file(&index_html, &index_path)?;
    summary.pages.push(index_path);

    for path in list_directory(&config.docs_dir)? {
        if !is_markdown_file(&path) || !path.is_file() {
            debug!("Skipping {:?}", path);
            continue;
        }

        let document = markdown.parse_file(&path)?;
        let file_name = document.output_file_name();
        if file_name == INDEX_FILE {
            warn!("{:?} overwrites the home page", path);
        }

        let bindings = Bindings::article(&site_config, &document, &stylesheet);
        let html = renderer.render(&layout, &bindings)?;
        let page_path = output_dir.join(file_name);
        write_html_to_file(&html, &page_path)?;
        summary.pages.push(page_path);
    }

    info!(
        "Generated {} pages ({} articles) in {:.2} seconds",
        summary.pages.len(),
        summary.article_count(),
        start_time.elapsed().as_secs_f64()
    );

    Ok(summary)
}
