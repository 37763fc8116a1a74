use crate::commands::{read_document, write_output};
use crate::config::Config;
use crate::script::{parse_script, ScriptLine, Step};
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use lectern_editor::{
    Command, DataTransfer, EditSession, Editor, ImageFile, NoPrompt, Notice, NoticeLevel, Notifier,
    ScriptedPrompt,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Document JSON file to start from
    pub input: PathBuf,

    /// Editing script to replay
    #[arg(short, long)]
    pub script: PathBuf,

    /// Output file for the edited document (defaults to stdout)
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

/// Prints notices the way the browser client would toast them.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => eprintln!("  {} {}", "✓".green(), notice.message),
            NoticeLevel::Error => eprintln!("  {} {}", "✗".red(), notice.message.red()),
        }
    }
}

pub fn edit(args: EditArgs, config: &Config) -> Result<()> {
    let document = read_document(&args.input)?;
    let source = fs::read_to_string(&args.script)
        .with_context(|| format!("cannot read {}", args.script.display()))?;
    let steps = parse_script(&source)?;
    let base = args.script.parent().unwrap_or_else(|| Path::new("."));

    eprintln!("{}", "✏️  Replaying edit script...".bright_blue().bold());

    let editor = Editor::with_options(document, config.editor_options());
    let mut session = EditSession::new(editor, Box::new(ConsoleNotifier));
    session.editor_mut().focus();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let effective = runtime.block_on(run_script(&mut session, &steps, base))?;

    let json = session.document().to_json_pretty()?;
    write_output(args.out.as_deref(), &json)?;

    eprintln!();
    eprintln!("✨ {} Edit complete!", "Done".green().bold());
    eprintln!("   Steps: {} ({} with effect)", steps.len(), effective);
    let violations = session.document().validate();
    if !violations.is_empty() {
        eprintln!("   {} {}", "Invalid result:".red(), violations.len());
    }
    Ok(())
}

/// Replays `steps` against the session. Returns how many had an effect.
pub(crate) async fn run_script(session: &mut EditSession, steps: &[ScriptLine], base: &Path) -> Result<usize> {
    let mut effective = 0;
    for ScriptLine { line, step } in steps {
        let applied = apply_step(session, step, base)
            .await
            .with_context(|| format!("line {line}"))?;
        if applied {
            effective += 1;
        } else {
            tracing::debug!(line, ?step, "step had no effect");
        }
    }
    Ok(effective)
}

async fn apply_step(session: &mut EditSession, step: &Step, base: &Path) -> Result<bool> {
    let applied = match step {
        Step::Type(text) => session.editor_mut().insert_text(text),
        Step::Paste(text) => {
            let before = session.editor().version();
            session.insert_data(DataTransfer::text(text.clone()));
            session.editor().version() != before
        }
        Step::Key(event) => session.handle_key_down(event, &mut NoPrompt).handled,
        Step::Mark(mark) => session.execute(&Command::ToggleMark(*mark), &mut NoPrompt),
        Step::Block(format) => session.execute(&Command::ToggleBlock(*format), &mut NoPrompt),
        Step::Select(range) => session.editor_mut().select(range.clone()),
        Step::SelectAll => session.editor_mut().select_all(),
        Step::Move(delta) => session.editor_mut().move_selection(*delta),
        Step::Extend(delta) => session.editor_mut().extend_selection(*delta),
        Step::Link { url, text } => {
            // An empty display text falls back to the configured default
            let mut prompt = ScriptedPrompt::new([url.clone(), text.clone().unwrap_or_default()]);
            session.execute(&Command::InsertLink, &mut prompt)
        }
        Step::EditLink { path, url } => {
            session.execute(&Command::EditLinkUrl(path.clone()), &mut ScriptedPrompt::new([url.clone()]))
        }
        Step::Image(file) => {
            let file = read_image(&base.join(file))?;
            session.insert_data(DataTransfer::files(vec![file]));
            session.settle().await > 0
        }
        Step::ImageUrl(url) => session.execute(&Command::InsertImage, &mut ScriptedPrompt::new([url.clone()])),
        Step::RemoveImage(path) => session.execute(&Command::RemoveImage(path.clone()), &mut NoPrompt),
        Step::Undo => session.execute(&Command::Undo, &mut NoPrompt),
        Step::Redo => session.execute(&Command::Redo, &mut NoPrompt),
    };
    Ok(applied)
}

fn read_image(path: &Path) -> Result<ImageFile> {
    let bytes = fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    Ok(ImageFile::new(name, mime_for(path), bytes))
}

fn mime_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "txt" | "md" => "text/plain",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectern_model::{Document, ElementKind, Node};
    use tempfile::TempDir;

    fn session(children: Vec<Node>) -> EditSession {
        let mut session = EditSession::new(Editor::new(Document::new(children)), Box::new(ConsoleNotifier));
        session.editor_mut().focus();
        session
    }

    #[test]
    fn test_mime_for_extension() {
        assert_eq!(mime_for(Path::new("a.PNG")), "image/png");
        assert_eq!(mime_for(Path::new("notes.txt")), "text/plain");
        assert_eq!(mime_for(Path::new("blob")), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_script_builds_document() {
        let steps = parse_script(
            "select 0.0:0\n\
             type Title\n\
             select all\n\
             block heading-one\n\
             key Right\n\
             key Enter\n\
             type see \n\
             link https://docs.dev docs\n",
        )
        .unwrap();
        let mut session = session(vec![Node::paragraph("")]);
        let effective = run_script(&mut session, &steps, Path::new(".")).await.unwrap();
        assert_eq!(effective, steps.len());

        let doc = session.document();
        assert_eq!(doc.children[0], Node::element(ElementKind::HeadingOne, vec![Node::text("Title")]));
        assert_eq!(doc.children[1].kind(), Some(&ElementKind::HeadingOne));
        assert_eq!(
            doc.children[1].children().unwrap()[1],
            Node::link("https://docs.dev", "docs")
        );
    }

    #[tokio::test]
    async fn test_image_files_from_disk() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("dot.png"), [1u8, 2, 3]).unwrap();
        fs::write(dir.path().join("notes.txt"), "hello").unwrap();

        let steps = parse_script("image dot.png\nimage notes.txt\n").unwrap();
        let mut session = session(vec![Node::paragraph("A")]);
        let effective = run_script(&mut session, &steps, dir.path()).await.unwrap();
        assert_eq!(effective, 1);
        assert_eq!(
            session.document(),
            &Document::new(vec![
                Node::paragraph("A"),
                Node::image("data:image/png;base64,AQID", "dot.png"),
                Node::paragraph(""),
            ])
        );
    }

    #[tokio::test]
    async fn test_missing_image_reports_line() {
        let dir = TempDir::new().unwrap();
        let steps = parse_script("undo\nimage gone.png\n").unwrap();
        let mut session = session(vec![Node::paragraph("A")]);
        let err = run_script(&mut session, &steps, dir.path()).await.unwrap_err();
        assert_eq!(err.to_string(), "line 2");
    }
}
