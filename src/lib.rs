// ABOUTME: Library module for the mdsite program.
// ABOUTME: Contains the build pipeline from markdown sources to HTML pages.

// Reexport modules
pub mod config;
pub mod errors;
pub mod markdown;
pub mod site;
pub mod stylesheet;
pub mod template;
pub mod utils;
pub mod variables;

// Reexport common types and functions
pub use config::{BuildConfig, SiteConfig, load_site_config};
pub use errors::{Result, SiteError};
pub use markdown::{Document, MarkdownProcessor, Metadata};
pub use site::{BuildSummary, build_site};
pub use stylesheet::{Stylesheet, minify_stylesheet};
pub use template::{Bindings, PageKind, PageRenderer, load_template};
pub use variables::{Globals, TemplateObject, TemplateValue};

#[cfg(test)]
mod tests;
