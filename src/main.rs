// ABOUTME: Main entry point for the mdsite program.
// ABOUTME: Provides the CLI interface and runs a site build from the library.

use anyhow::Context;
use clap::{ArgAction, Parser};
use log::error;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output directory
    #[arg(long, allow_hyphen_values = true, default_value = "./public")]
    output: PathBuf,

    /// Templates directory containing layout.html
    #[arg(long, allow_hyphen_values = true, default_value = "./templates")]
    templates: PathBuf,

    /// Markdown documents directory
    #[arg(long, allow_hyphen_values = true, default_value = "./docs")]
    docs: PathBuf,

    /// YAML configuration file
    #[arg(long, allow_hyphen_values = true, default_value = "./config.yml")]
    config: PathBuf,

    /// Syntax highlighting style
    #[arg(long, allow_hyphen_values = true, default_value = "pygments")]
    highlighting: String,

    /// CSS file to minify and pass as a template variable
    #[arg(long, allow_hyphen_values = true, default_value = "./public/assets/css/style.css")]
    css: PathBuf,

    /// Remove HTML files in output directory before processing
    #[arg(
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value_t = false,
        default_missing_value = "true"
    )]
    clean: bool,
}

impl From<Cli> for mdsite::BuildConfig {
    fn from(cli: Cli) -> Self {
        Self {
            output_dir: cli.output,
            templates_dir: cli.templates,
            docs_dir: cli.docs,
            config_file: cli.config,
            highlighting: cli.highlighting,
            css_file: cli.css,
            clean: cli.clean,
        }
    }
}

/// Long flags that take a separate value (`-output dir`)
const VALUE_FLAGS: &[&str] = &["output", "templates", "docs", "config", "highlighting", "css"];

/// Long flags that stand alone
const SWITCH_FLAGS: &[&str] = &["clean", "help", "version"];

/// Accept single-dash long flags (`-output dir`, `-clean=true`) by
/// rewriting them to their double-dash form.
///
/// Only tokens naming a known flag are rewritten, and the token after a
/// value flag is always passed through as its value.
fn normalize_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut expecting_value = false;
    args.into_iter()
        .enumerate()
        .map(|(i, arg)| {
            if i == 0 || std::mem::take(&mut expecting_value) {
                return arg;
            }
            let Some(flag) = arg.strip_prefix('-').filter(|rest| !rest.starts_with('-')) else {
                return arg;
            };
            let (name, inline_value) = match flag.split_once('=') {
                Some((name, _)) => (name, true),
                None => (flag, false),
            };
            if VALUE_FLAGS.contains(&name) {
                expecting_value = !inline_value;
                format!("-{}", arg)
            } else if SWITCH_FLAGS.contains(&name) {
                format!("-{}", arg)
            } else {
                arg
            }
        })
        .collect()
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse_from(normalize_args(std::env::args()));
    let config = mdsite::BuildConfig::from(cli);

    let result = mdsite::build_site(&config)
        .with_context(|| format!("Failed to build site into {:?}", config.output_dir));

    match result {
        Ok(summary) => {
            println!(
                "Site generated successfully: {} pages in {:?}",
                summary.pages.len(),
                config.output_dir
            );
        }
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
