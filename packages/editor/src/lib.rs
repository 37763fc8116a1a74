//! # Lectern Editor
//!
//! Editing engine for structured topic content.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ input: key chords, toolbar, drop/paste      │
//! │  - keyboard: chord → Command                │
//! │  - commands: Command → editor operation     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: transactions over one Document      │
//! │  - transforms: wrap/unwrap/insert/remove    │
//! │  - mutations: invertible low-level ops      │
//! │  - post_effects: normalization rules        │
//! │  - undo_stack: batched local history        │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ renderer: Document → virtual DOM / HTML     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The tree is the source of truth**: rendered output is derived
//! 2. **Atomic operations**: a failed transaction leaves nothing behind
//! 3. **Stale locations are no-ops**: a path that no longer resolves is skipped
//! 4. **Normalized after every change**: voids keep one empty leaf, lists hold list items
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lectern_editor::{BlockFormat, Editor};
//! use lectern_model::{Document, Mark, Node};
//!
//! let mut editor = Editor::new(Document::new(vec![Node::paragraph("Hello")]));
//! editor.select_all();
//! editor.toggle_block(BlockFormat::HeadingOne);
//! editor.toggle_mark(Mark::Bold);
//! editor.undo();
//! ```

mod commands;
mod editor;
mod errors;
mod images;
mod keyboard;
mod loader;
mod mutations;
mod options;
mod post_effects;
mod queries;
mod session;
mod transforms;
mod undo_stack;
mod voids;

pub use commands::{
    execute, toolbar_button, Command, NoPrompt, Prompt, ScriptedPrompt, ToolbarAction, ToolbarButton,
    ToolbarGroup, EDIT_URL_PROMPT, IMAGE_URL_PROMPT, LINK_TEXT_PROMPT, TOOLBAR, URL_PROMPT,
};
pub use editor::Editor;
pub use errors::EditorError;
pub use images::{
    to_data_url, DataTransfer, DataUrlResolver, ImageCompletion, ImageError, ImageFile, ImagePolicy,
    ImageResolver,
};
pub use keyboard::{chord_command, handle_key_down, Key, KeyEvent, KeyOutcome, KeyParseError, Modifiers};
pub use loader::ImageLoader;
pub use mutations::{Affinity, Mutation, MutationError, MutationResult, NodeProperties};
pub use options::{EditorOptions, DEFAULT_LINK_TEXT};
pub use post_effects::{PostEffect, PostEffectEngine};
pub use session::{
    CollectingNotifier, DocumentSource, EditSession, MemorySink, MemorySource, Notice, NoticeLevel,
    Notifier, SubmitError, SubmitSink, Submission, TracingNotifier, SUBMIT_SUCCESS,
};
pub use transforms::{BlockFormat, InsertAt};
pub use undo_stack::{MutationBatch, UndoStack, TYPING};

// Re-export the model for convenience
pub use lectern_model as model;
