mod commands;
mod config;
mod script;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{check, edit, render, CheckArgs, EditArgs, RenderArgs};
use config::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Lectern CLI - render, check and script structured topic documents
#[derive(Parser, Debug)]
#[command(name = "lectern")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ./lectern.config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a document to HTML
    Render(RenderArgs),

    /// Report structural problems in a document
    Check(CheckArgs),

    /// Replay an editing script against a document
    Edit(EditArgs),
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => {
            let cwd = std::env::current_dir()?.display().to_string();
            Config::load(&cwd)?
        }
    };

    match cli.command {
        Command::Render(args) => render(args, &config),
        Command::Edit(args) => edit(args, &config),
        Command::Check(args) => {
            if check(args)? > 0 {
                // Exit with error code if there are violations
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
