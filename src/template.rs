// ABOUTME: Template module for the mdsite generator
// ABOUTME: Loads the layout template and renders pages through Liquid

use crate::config::SiteConfig;
use crate::errors::{Result, SiteError};
use crate::markdown::Document;
use crate::stylesheet::Stylesheet;
use crate::variables::{Globals, TemplateObject, TemplateValue};
use liquid::{Parser, ParserBuilder};
use log::debug;
use std::fs;
use std::path::Path;

/// Load a layout template as raw text; parsing is deferred to render time
pub fn load_template(path: &Path) -> Result<String> {
    debug!("Loading layout template: {:?}", path);

    fs::read_to_string(path).map_err(|e| SiteError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Which kind of page a render produces, exposed to templates as `page`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Home,
    Article,
}

impl PageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageKind::Home => "home",
            PageKind::Article => "article",
        }
    }
}

/// Variables bound into the layout for one render
#[derive(Debug, Clone, Copy)]
pub enum Bindings<'a> {
    Home {
        config: &'a SiteConfig,
        stylesheet: &'a Stylesheet,
    },
    Article {
        config: &'a SiteConfig,
        document: &'a Document,
        stylesheet: &'a Stylesheet,
    },
}

impl<'a> Bindings<'a> {
    pub fn home(config: &'a SiteConfig, stylesheet: &'a Stylesheet) -> Self {
        Bindings::Home { config, stylesheet }
    }

    pub fn article(
        config: &'a SiteConfig,
        document: &'a Document,
        stylesheet: &'a Stylesheet,
    ) -> Self {
        Bindings::Article {
            config,
            document,
            stylesheet,
        }
    }

    pub fn kind(&self) -> PageKind {
        match self {
            Bindings::Home { .. } => PageKind::Home,
            Bindings::Article { .. } => PageKind::Article,
        }
    }

    /// Human-readable page name for log and error messages
    pub fn page_name(&self) -> String {
        match self {
            Bindings::Home { .. } => "home page".to_string(),
            Bindings::Article { document, .. } => format!("article {:?}", document.slug),
        }
    }

    /// Build the Liquid globals for this render
    pub fn to_globals(&self) -> Globals {
        let mut globals = TemplateObject::new();
        globals.insert("page", TemplateValue::scalar(self.kind().as_str()));

        match self {
            Bindings::Home { config, stylesheet } => {
                insert_shared(&mut globals, config, stylesheet);
            }
            Bindings::Article {
                config,
                document,
                stylesheet,
            } => {
                insert_shared(&mut globals, config, stylesheet);
                globals.insert("meta", TemplateObject::from_mapping(&document.meta));
                globals.insert("slug", TemplateValue::scalar(document.slug.clone()));
                globals.insert("content", TemplateValue::scalar(document.html.clone()));
            }
        }

        Globals(globals)
    }
}

fn insert_shared(globals: &mut TemplateObject, config: &SiteConfig, stylesheet: &Stylesheet) {
    globals.insert("config", TemplateObject::from_mapping(config.as_mapping()));
    globals.insert(
        "stylesheet",
        TemplateValue::scalar(stylesheet.as_str().to_string()),
    );
}

/// Renders pages through Liquid with the standard tag and filter library
pub struct PageRenderer {
    parser: Parser,
}

impl PageRenderer {
    pub fn new() -> Result<Self> {
        let parser = ParserBuilder::with_stdlib()
            .build()
            .map_err(|e| SiteError::TemplateError {
                page: "layout".to_string(),
                source: e,
            })?;
        Ok(Self { parser })
    }

    /// Parse `template` and render it with `bindings`.
    ///
    /// Syntax errors and unknown filters fail the render; variables the page
    /// does not bind render as nil.
    pub fn render(&self, template: &str, bindings: &Bindings) -> Result<String> {
        let to_error = |e| SiteError::TemplateError {
            page: bindings.page_name(),
            source: e,
        };

        let template = self.parser.parse(template).map_err(to_error)?;
        let globals = bindings.to_globals();
        template.render(&globals).map_err(to_error)
    }
}
