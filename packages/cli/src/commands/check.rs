use crate::commands::read_document;
use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Document JSON file to check
    pub input: PathBuf,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

/// Returns the number of violations found.
pub fn check(args: CheckArgs) -> Result<usize> {
    let document = read_document(&args.input)?;
    let violations = document.validate();

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&violations)?),
        "text" => {
            println!("{}", args.input.display());
            for violation in &violations {
                println!("  {} {}", "error".red().bold(), violation);
            }
            if violations.is_empty() {
                println!("  {} No issues found!", "✓".green());
            } else {
                println!();
                println!("  {} {}", "Errors:".red(), violations.len());
            }
        }
        other => bail!("Unknown format: {other}. Use: text or json"),
    }
    Ok(violations.len())
}
