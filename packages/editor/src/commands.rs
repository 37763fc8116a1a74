//! # Command Dispatch
//!
//! Toolbar buttons and keyboard chords both end up here. A [`Command`] is
//! executed against an [`Editor`]; anything that needs user input (a link
//! url, its display text) is asked through a [`Prompt`]. Whatever happens,
//! including a cancelled prompt, the editor has focus afterwards.

use crate::editor::Editor;
use crate::transforms::BlockFormat;
use lectern_model::{Mark, Path};
use std::collections::VecDeque;
use tracing::{debug, instrument};

pub const URL_PROMPT: &str = "Enter the URL:";
pub const LINK_TEXT_PROMPT: &str = "Enter the link text:";
pub const EDIT_URL_PROMPT: &str = "Edit URL:";
pub const IMAGE_URL_PROMPT: &str = "Enter the image URL:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ToggleMark(Mark),
    ToggleBlock(BlockFormat),
    /// Insert an image from a url supplied through the prompt.
    InsertImage,
    InsertLink,
    EditLinkUrl(Path),
    RemoveImage(Path),
    Undo,
    Redo,
}

/// Asks the user for a line of input. `None` means the dialog was cancelled.
pub trait Prompt {
    fn ask(&mut self, message: &str, default: Option<&str>) -> Option<String>;
}

/// Prompt that declines everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPrompt;

impl Prompt for NoPrompt {
    fn ask(&mut self, _message: &str, _default: Option<&str>) -> Option<String> {
        None
    }
}

/// Replays queued answers in order and records what was asked.
#[derive(Debug, Default, Clone)]
pub struct ScriptedPrompt {
    answers: VecDeque<Option<String>>,
    asked: Vec<String>,
}

impl ScriptedPrompt {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(|a| Some(a.into())).collect(),
            asked: Vec::new(),
        }
    }

    /// Queues a cancelled dialog.
    pub fn cancel(mut self) -> Self {
        self.answers.push_back(None);
        self
    }

    pub fn answer(mut self, answer: impl Into<String>) -> Self {
        self.answers.push_back(Some(answer.into()));
        self
    }

    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

impl Prompt for ScriptedPrompt {
    fn ask(&mut self, message: &str, _default: Option<&str>) -> Option<String> {
        self.asked.push(message.to_string());
        self.answers.pop_front().flatten()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    Mark(Mark),
    Block(BlockFormat),
    InsertImage,
    InsertLink,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolbarGroup {
    Marks,
    Blocks,
    Lists,
    Inserts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolbarButton {
    pub action: ToolbarAction,
    /// Format name, shared with the element type or mark name.
    pub format: &'static str,
    pub label: &'static str,
    pub tooltip: &'static str,
    pub group: ToolbarGroup,
}

impl ToolbarButton {
    pub fn command(&self) -> Command {
        match self.action {
            ToolbarAction::Mark(mark) => Command::ToggleMark(mark),
            ToolbarAction::Block(format) => Command::ToggleBlock(format),
            ToolbarAction::InsertImage => Command::InsertImage,
            ToolbarAction::InsertLink => Command::InsertLink,
        }
    }

    /// Whether the button shows as pressed for the current selection.
    pub fn is_active(&self, editor: &Editor) -> bool {
        match self.action {
            ToolbarAction::Mark(mark) => editor.is_mark_active(mark),
            ToolbarAction::Block(format) => editor.is_block_active(&format.kind()),
            ToolbarAction::InsertLink => editor.is_link_active(),
            ToolbarAction::InsertImage => false,
        }
    }
}

const fn button(
    action: ToolbarAction,
    format: &'static str,
    label: &'static str,
    tooltip: &'static str,
    group: ToolbarGroup,
) -> ToolbarButton {
    ToolbarButton { action, format, label, tooltip, group }
}

pub static TOOLBAR: [ToolbarButton; 12] = [
    button(ToolbarAction::Mark(Mark::Bold), "bold", "B", "Bold (Ctrl+B)", ToolbarGroup::Marks),
    button(ToolbarAction::Mark(Mark::Italic), "italic", "I", "Italic (Ctrl+I)", ToolbarGroup::Marks),
    button(ToolbarAction::Mark(Mark::Underline), "underline", "U", "Underline (Ctrl+U)", ToolbarGroup::Marks),
    button(ToolbarAction::Mark(Mark::Code), "code", "<>", "Inline Code (Ctrl+`)", ToolbarGroup::Marks),
    button(ToolbarAction::Block(BlockFormat::HeadingOne), "heading-one", "H1", "Heading 1", ToolbarGroup::Blocks),
    button(ToolbarAction::Block(BlockFormat::HeadingTwo), "heading-two", "H2", "Heading 2", ToolbarGroup::Blocks),
    button(ToolbarAction::Block(BlockFormat::HeadingThree), "heading-three", "H3", "Heading 3", ToolbarGroup::Blocks),
    button(ToolbarAction::Block(BlockFormat::BlockQuote), "block-quote", "\u{201c}", "Block Quote", ToolbarGroup::Blocks),
    button(ToolbarAction::Block(BlockFormat::BulletedList), "bulleted-list", "\u{2022}", "Bulleted List", ToolbarGroup::Lists),
    button(ToolbarAction::Block(BlockFormat::NumberedList), "numbered-list", "1.", "Numbered List", ToolbarGroup::Lists),
    button(ToolbarAction::InsertImage, "image", "Img", "Insert Image", ToolbarGroup::Inserts),
    button(ToolbarAction::InsertLink, "link", "Link", "Insert Link (Ctrl+K)", ToolbarGroup::Inserts),
];

pub fn toolbar_button(format: &str) -> Option<&'static ToolbarButton> {
    TOOLBAR.iter().find(|b| b.format == format)
}

/// Runs `command` and hands focus back to the editor. Read-only editors
/// refuse every command. Returns whether the document or history changed.
#[instrument(skip(editor, prompt))]
pub fn execute(editor: &mut Editor, command: &Command, prompt: &mut dyn Prompt) -> bool {
    if editor.is_read_only() {
        debug!("command ignored on a read-only editor");
        return false;
    }
    let changed = match command {
        Command::ToggleMark(mark) => editor.toggle_mark(*mark),
        Command::ToggleBlock(format) => editor.toggle_block(*format),
        Command::InsertImage => match prompt.ask(IMAGE_URL_PROMPT, None) {
            Some(url) => editor.insert_image(url.trim(), ""),
            None => false,
        },
        Command::InsertLink => insert_link(editor, prompt),
        Command::EditLinkUrl(path) => edit_link(editor, path, prompt),
        Command::RemoveImage(path) => editor.remove_image(path),
        Command::Undo => editor.undo(),
        Command::Redo => editor.redo(),
    };
    editor.focus();
    changed
}

fn insert_link(editor: &mut Editor, prompt: &mut dyn Prompt) -> bool {
    let Some(url) = prompt.ask(URL_PROMPT, None).filter(|u| !u.trim().is_empty()) else {
        return false;
    };
    let url = url.trim();
    if editor.selection().is_some_and(|range| range.is_expanded()) {
        return editor.insert_link(url, None);
    }
    let default_text = editor.options().default_link_text.clone();
    match prompt.ask(LINK_TEXT_PROMPT, Some(&default_text)) {
        Some(text) => editor.insert_link(url, Some(&text)),
        None => false,
    }
}

fn edit_link(editor: &mut Editor, path: &Path, prompt: &mut dyn Prompt) -> bool {
    let Some(current) = editor
        .document()
        .get(path)
        .and_then(|node| node.kind())
        .and_then(|kind| kind.url())
        .map(str::to_string)
    else {
        return false;
    };
    match prompt.ask(EDIT_URL_PROMPT, Some(&current)) {
        Some(url) => editor.edit_link_url(path, url.trim()),
        None => false,
    }
}
