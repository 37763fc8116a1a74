use crate::commands::{read_document, write_output};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use lectern_renderer::{render_html, HtmlOptions, RenderMode};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Document JSON file
    pub input: PathBuf,

    /// Leave out editing controls
    #[arg(long)]
    pub read_only: bool,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Single-line HTML (overrides config)
    #[arg(long)]
    pub compact: bool,
}

pub fn render(args: RenderArgs, config: &Config) -> Result<()> {
    let document = read_document(&args.input)?;
    let mode = if args.read_only {
        RenderMode::ReadOnly
    } else {
        RenderMode::Editable
    };
    let html_options = if args.compact {
        HtmlOptions::compact()
    } else {
        config.html_options()
    };

    let html = render_html(&document, &config.render_options(mode), &html_options);
    write_output(args.out.as_deref(), html.trim_end())?;

    if let Some(out) = &args.out {
        eprintln!(
            "  {} {} → {}",
            "✓".green(),
            args.input.display(),
            out.display()
        );
    }
    Ok(())
}
