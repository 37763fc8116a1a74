pub mod check;
pub mod edit;
pub mod render;

pub use check::{check, CheckArgs};
pub use edit::{edit, EditArgs};
pub use render::{render, RenderArgs};

use anyhow::{Context, Result};
use lectern_model::Document;
use std::path::Path;

/// Reads a document JSON file.
pub(crate) fn read_document(path: &Path) -> Result<Document> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    Document::from_json(&json).with_context(|| format!("{} is not a valid document", path.display()))
}

/// Writes `content` to `out`, or stdout when no file is given.
pub(crate) fn write_output(out: Option<&Path>, content: &str) -> Result<()> {
    match out {
        Some(path) => std::fs::write(path, content)
            .with_context(|| format!("cannot write {}", path.display())),
        None => {
            println!("{}", content);
            Ok(())
        }
    }
}
