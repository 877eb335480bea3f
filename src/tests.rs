use super::*;
use crate::config::parse_site_config;
use crate::markdown::{resolve_theme, FALLBACK_THEME};
use crate::stylesheet::minify_css;
use crate::variables::{Globals, TemplateObject, TemplateValue};
use crate::utils::{clear_dir_with_extension, slug_from_path};
use liquid::model::{ObjectView, ValueView};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use syntect::highlighting::ThemeSet;
use tempfile::{NamedTempFile, TempDir};

fn create_temp_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes()).expect("Failed to write to temp file");
    file
}

fn sample_document(slug: &str, html: &str, meta: Mapping) -> Document {
    Document {
        path: PathBuf::from(format!("docs/{}.md", slug)),
        slug: slug.to_string(),
        source: Vec::new(),
        html: html.to_string(),
        meta,
    }
}

#[test]
fn test_load_site_config_nested_values() {
    let yaml = "site:\n  title: Demo\n  pages: 3\n  ratio: 1.5\nauthors:\n  - name: Ada\n  - name: Grace\ndraft: false\n";
    let file = create_temp_file(yaml);

    let config = load_site_config(file.path()).expect("config should load");

    let site = config.get("site").expect("site key");
    assert_eq!(site["title"], Value::String("Demo".to_string()));
    assert_eq!(site["pages"].as_i64(), Some(3));
    assert_eq!(site["ratio"].as_f64(), Some(1.5));

    let authors = config.get("authors").and_then(Value::as_sequence).expect("authors");
    assert_eq!(authors.len(), 2);
    assert_eq!(authors[1]["name"].as_str(), Some("Grace"));
    assert_eq!(config.get("draft"), Some(&Value::Bool(false)));
}

#[test]
fn test_empty_site_config_is_empty_mapping() {
    let config = parse_site_config("", Path::new("config.yml")).expect("empty config");
    assert!(config.is_empty());
}

#[test]
fn test_site_config_must_be_mapping() {
    let err = parse_site_config("- a\n- b\n", Path::new("config.yml")).unwrap_err();
    assert!(matches!(err, SiteError::ConfigError(_)), "got {:?}", err);
}

#[test]
fn test_malformed_site_config_is_an_error() {
    let err = parse_site_config("site: [unclosed\n", Path::new("config.yml")).unwrap_err();
    assert!(matches!(err, SiteError::YamlError { .. }), "got {:?}", err);
}

#[test]
fn test_missing_site_config_is_an_error() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let err = load_site_config(&dir.path().join("missing.yml")).unwrap_err();
    assert!(matches!(err, SiteError::ReadError { .. }), "got {:?}", err);
}

#[test]
fn test_load_template_returns_raw_text() {
    let file = create_temp_file("<p>{{ page }}</p>{% if x %}");
    let template = load_template(file.path()).expect("template should load");
    assert_eq!(template, "<p>{{ page }}</p>{% if x %}");
}

#[test]
fn test_front_matter_is_extracted() {
    let processor = MarkdownProcessor::new("pygments");
    let source = "---\ntitle: Hello\ntags:\n  - rust\n  - web\n---\n\n# Body\n";

    let (html, meta) = processor
        .convert(source, Path::new("hello.md"))
        .expect("conversion should succeed");

    let expected: Mapping = serde_yaml::from_str("title: Hello\ntags:\n  - rust\n  - web\n").unwrap();
    assert_eq!(meta, expected);
    assert!(!html.contains("title: Hello"), "front matter leaked: {}", html);
    assert!(html.contains("Body"));
}

#[test]
fn test_no_front_matter_gives_empty_metadata() {
    let processor = MarkdownProcessor::new("pygments");
    let (_, meta) = processor
        .convert("# Just a heading\n", Path::new("plain.md"))
        .unwrap();
    assert!(meta.is_empty());
}

#[test]
fn test_invalid_front_matter_is_an_error() {
    let processor = MarkdownProcessor::new("pygments");
    let err = processor
        .convert("---\ntitle: [broken\n---\n\ntext\n", Path::new("bad.md"))
        .unwrap_err();
    assert!(matches!(err, SiteError::FrontMatterError { .. }), "got {:?}", err);
}

#[test]
fn test_markdown_extensions() {
    let processor = MarkdownProcessor::new("pygments");
    let source = "# Hi\n\nline one\nline two\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\n<div class=\"raw\">kept</div>\n\nInline $x^2$ math.\n";

    let (html, _) = processor.convert(source, Path::new("ext.md")).unwrap();

    assert!(html.contains("<h1 id=\"hi\">Hi</h1>"), "{}", html);
    assert!(html.contains("<br />"), "{}", html);
    assert!(html.contains("<table>"), "{}", html);
    assert!(html.contains("<div class=\"raw\">kept</div>"), "{}", html);
    assert!(html.contains("data-math-style"), "{}", html);
}

#[test]
fn test_code_blocks_are_highlighted() {
    let processor = MarkdownProcessor::new("pygments");
    let source = "```rust\nfn main() {\n    println!(\"hi\");\n}\n```\n";

    let (html, _) = processor.convert(source, Path::new("code.md")).unwrap();

    assert!(html.contains("<pre"), "{}", html);
    assert!(html.contains("style=\""), "{}", html);
}

#[test]
fn test_resolve_theme() {
    let themes = ThemeSet::load_defaults();
    assert_eq!(resolve_theme("InspiredGitHub", &themes), "InspiredGitHub");
    assert_eq!(resolve_theme("Solarized (dark)", &themes), "Solarized (dark)");
    assert_eq!(resolve_theme("pygments", &themes), "InspiredGitHub");
    assert_eq!(resolve_theme("Monokai-Extended-Nope", &themes), FALLBACK_THEME);
    assert_eq!(MarkdownProcessor::new("mocha").theme(), "base16-mocha.dark");
}

#[test]
fn test_parse_file_derives_slug() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("foo-bar.md");
    fs::write(&path, "Some *text*.\n").unwrap();

    let document = MarkdownProcessor::new("pygments").parse_file(&path).unwrap();

    assert_eq!(document.slug, "foo-bar");
    assert_eq!(document.output_file_name(), "foo-bar.html");
    assert_eq!(document.source, b"Some *text*.\n");
    assert!(document.html.contains("<em>text</em>"));
}

#[test]
fn test_non_utf8_markdown_is_read_lossily() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("latin1.md");
    fs::write(&path, b"# Caf\xe9\n\nna\xefve text\n").unwrap();

    let document = MarkdownProcessor::new("pygments").parse_file(&path).unwrap();

    assert_eq!(document.source, b"# Caf\xe9\n\nna\xefve text\n");
    assert!(document.html.contains("Caf\u{FFFD}"), "{}", document.html);
    assert!(document.html.contains("na\u{FFFD}ve text"), "{}", document.html);
}

#[test]
fn test_heading_ids_are_unique_per_document() {
    let processor = MarkdownProcessor::new("pygments");
    let source = "# Hi\n\n## Hi\n\n### Getting *Started*!\n";

    let (html, _) = processor.convert(source, Path::new("ids.md")).unwrap();
    assert!(html.contains("<h1 id=\"hi\">Hi</h1>"), "{}", html);
    assert!(html.contains("<h2 id=\"hi-1\">Hi</h2>"), "{}", html);
    assert!(
        html.contains("<h3 id=\"getting-started\">Getting <em>Started</em>!</h3>"),
        "{}",
        html
    );
    assert!(!html.contains("class=\"anchor\""), "{}", html);

    let (again, _) = processor.convert("# Hi\n", Path::new("again.md")).unwrap();
    assert!(again.contains("<h1 id=\"hi\">Hi</h1>"), "{}", again);
}

#[test]
fn test_slug_from_path() {
    assert_eq!(slug_from_path(Path::new("docs/foo-bar.md")), "foo-bar");
    assert_eq!(slug_from_path(Path::new("notes.v2.md")), "notes.v2");
}

#[test]
fn test_clear_dir_only_removes_matching_extension() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    fs::write(dir.path().join("a.html"), "old").unwrap();
    fs::write(dir.path().join("b.txt"), "keep").unwrap();

    let removed = clear_dir_with_extension(dir.path(), "html").unwrap();

    assert_eq!(removed, 1);
    assert!(!dir.path().join("a.html").exists());
    assert!(dir.path().join("b.txt").exists());
}

#[test]
fn test_clear_missing_dir_is_an_error() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let err = clear_dir_with_extension(&dir.path().join("nope"), "html").unwrap_err();
    assert!(matches!(err, SiteError::DirectoryError { .. }), "got {:?}", err);
}

#[test]
fn test_minify_css_strips_comments_and_whitespace() {
    let source = "/* header styles */\nbody {\n    color: red;\n    margin: 0 auto;\n}\n\n\nh1   {  font-weight: bold; }\n";

    let first = minify_css(source, Path::new("style.css")).unwrap();
    let second = minify_css(source, Path::new("style.css")).unwrap();

    assert!(!first.as_str().contains("/*"), "{}", first.as_str());
    assert!(!first.as_str().contains("header styles"));
    assert!(!first.as_str().contains('\n'));
    assert!(first.as_str().contains("color:red"), "{}", first.as_str());
    assert!(first.len() < source.len());
    assert_eq!(first.as_bytes(), second.as_bytes());
}

#[test]
fn test_missing_stylesheet_is_empty() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let stylesheet = minify_stylesheet(&dir.path().join("missing.css")).unwrap();
    assert!(stylesheet.is_empty());
}

#[test]
fn test_non_utf8_stylesheet_is_read_lossily() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("latin1.css");
    fs::write(&path, b"/* caf\xe9 */\nbody {\n    color: red;\n}\n").unwrap();

    let stylesheet = minify_stylesheet(&path).unwrap();

    assert!(stylesheet.as_str().contains("color:red"), "{}", stylesheet.as_str());
}

#[test]
fn test_yaml_values_convert_to_template_values() {
    let yaml: Value = serde_yaml::from_str(
        "name: Demo\ncount: 2\nratio: 0.5\nenabled: true\nnothing: ~\nitems: [a, 1]\n",
    )
    .unwrap();
    let mut globals = TemplateObject::new();
    globals.insert("v", TemplateValue::from_yaml(&yaml));

    let template = liquid::ParserBuilder::with_stdlib()
        .build()
        .unwrap()
        .parse("{{ v.name }}|{{ v.count | plus: 1 }}|{{ v.ratio }}|{{ v.enabled }}|{{ v.items | size }}|{{ v.items[0] }}|{{ v.nothing }}")
        .unwrap();

    assert_eq!(
        template.render(&Globals(globals)).unwrap(),
        "Demo|3|0.5|true|2|a|"
    );
}

#[test]
fn test_render_home_bindings() {
    let config = SiteConfig::new(serde_yaml::from_str("site:\n  title: Demo\n").unwrap());
    let stylesheet = minify_css("body { color: red; }", Path::new("s.css")).unwrap();
    let renderer = PageRenderer::new().unwrap();

    let template = "{{ page }}|{{ config.site.title }}|<style>{{ stylesheet }}</style>";
    let html = renderer
        .render(template, &Bindings::home(&config, &stylesheet))
        .unwrap();

    assert_eq!(html, format!("home|Demo|<style>{}</style>", stylesheet.as_str()));
}

#[test]
fn test_render_article_bindings() {
    let config = SiteConfig::new(serde_yaml::from_str("site:\n  title: Demo\n").unwrap());
    let meta: Mapping = serde_yaml::from_str("title: First post\n").unwrap();
    let document = sample_document("first", "<p>Hello</p>", meta);
    let stylesheet = Stylesheet::default();
    let renderer = PageRenderer::new().unwrap();

    let template = "{% if page == \"article\" %}{{ meta.title }}:{{ slug }}:{{ content }}{% else %}list{% endif %}[{{ stylesheet }}]";
    let bindings = Bindings::article(&config, &document, &stylesheet);
    let html = renderer.render(template, &bindings).unwrap();

    assert_eq!(bindings.kind(), PageKind::Article);
    assert_eq!(html, "First post:first:<p>Hello</p>[]");
}

#[test]
fn test_render_errors_name_the_page() {
    let config = SiteConfig::default();
    let stylesheet = Stylesheet::default();
    let document = sample_document("broken", "", Mapping::new());
    let renderer = PageRenderer::new().unwrap();

    let err = renderer
        .render("{% if page %}", &Bindings::article(&config, &document, &stylesheet))
        .unwrap_err();
    match err {
        SiteError::TemplateError { page, .. } => assert!(page.contains("broken")),
        other => panic!("unexpected error: {:?}", other),
    }

    let err = renderer
        .render("{{ page | no_such_filter }}", &Bindings::home(&config, &stylesheet))
        .unwrap_err();
    match err {
        SiteError::TemplateError { page, .. } => assert_eq!(page, "home page"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_unbound_variables_render_empty() {
    let config = SiteConfig::new(serde_yaml::from_str("site:\n  title: Demo\n").unwrap());
    let stylesheet = Stylesheet::default();
    let document = sample_document("plain", "<p>Plain</p>", Mapping::new());
    let renderer = PageRenderer::new().unwrap();
    let home = Bindings::home(&config, &stylesheet);
    let article = Bindings::article(&config, &document, &stylesheet);

    assert_eq!(renderer.render("[{{ content }}]", &home).unwrap(), "[]");
    assert_eq!(renderer.render("[{{ meta.title }}]", &home).unwrap(), "[]");
    assert_eq!(renderer.render("[{{ meta.title }}]", &article).unwrap(), "[]");
    assert_eq!(
        renderer
            .render("[{{ meta.author.name }}|{{ meta.tags[3] }}]", &article)
            .unwrap(),
        "[|]"
    );
    assert_eq!(
        renderer
            .render("{% if meta.title %}titled{% else %}untitled{% endif %}", &article)
            .unwrap(),
        "untitled"
    );
    assert_eq!(
        renderer
            .render("{{ config.site.subtitle | default: \"none\" }}", &article)
            .unwrap(),
        "none"
    );
    assert_eq!(
        renderer.render("{{ config.size }}|{{ meta.size }}", &article).unwrap(),
        "1|0"
    );
    assert_eq!(
        renderer
            .render("{% assign content = \"set\" %}{{ content }}", &home)
            .unwrap(),
        "set"
    );
}

#[test]
fn test_mapping_keys_are_stringified() {
    let mapping: Mapping = serde_yaml::from_str("true: yes\n2: two\n").unwrap();
    let object = TemplateObject::from_mapping(&mapping);

    assert_eq!(object.size(), 2);
    assert!(object.contains_key("true"));
    assert!(object.contains_key("2"));
    assert!(!object.contains_key("missing"));
    assert!(object.get("missing").expect("missing keys are nil").is_nil());
}
