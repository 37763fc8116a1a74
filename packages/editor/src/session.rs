//! # Edit Session
//!
//! One user's editing of one topic: the editor plus the collaborators
//! around it.
//!
//! - a [`DocumentSource`] hydrates the content by id,
//! - a [`Notifier`] shows transient notices (rejected files, validation),
//! - an [`ImageResolver`] turns dropped or pasted files into urls,
//! - a [`SubmitSink`] receives the finished [`Submission`].
//!
//! Image files resolve in the background. Their insertions land when the
//! session drains completions ([`EditSession::apply_ready`] or
//! [`EditSession::settle`]), each as its own transaction at the selection
//! current at that time.

use crate::commands::{self, Command, Prompt};
use crate::editor::Editor;
use crate::errors::EditorError;
use crate::images::{DataTransfer, DataUrlResolver, ImageCompletion, ImageResolver};
use crate::keyboard::{self, KeyEvent, KeyOutcome};
use crate::loader::ImageLoader;
use crate::options::EditorOptions;
use lectern_model::Document;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tracing::{error, info, instrument, warn};

pub const SUBMIT_SUCCESS: &str = "Topic created successfully!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }
}

/// Toast-style notification surface.
pub trait Notifier {
    fn notify(&self, notice: Notice);
}

/// Sends notices to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => info!(message = %notice.message, "notice"),
            NoticeLevel::Error => warn!(message = %notice.message, "notice"),
        }
    }
}

/// Keeps every notice. Clones share the same list.
#[derive(Debug, Default, Clone)]
pub struct CollectingNotifier {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.notices()
            .into_iter()
            .filter(|n| n.level == NoticeLevel::Error)
            .map(|n| n.message)
            .collect()
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap_or_else(PoisonError::into_inner).push(notice);
    }
}

/// Store the topic content is fetched from.
pub trait DocumentSource {
    fn fetch(&self, content_id: &str) -> Result<Document, EditorError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    documents: HashMap<String, Document>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, content_id: impl Into<String>, document: Document) {
        self.documents.insert(content_id.into(), document);
    }
}

impl DocumentSource for MemorySource {
    fn fetch(&self, content_id: &str) -> Result<Document, EditorError> {
        self.documents
            .get(content_id)
            .cloned()
            .ok_or_else(|| EditorError::Source(format!("no content with id `{content_id}`")))
    }
}

/// Everything handed to persistence on submit: the whole document, no deltas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub title: String,
    pub description: String,
    pub content: Document,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("Title is required")]
    TitleRequired,

    #[error("{0}")]
    Rejected(String),

    #[error("Failed to create topic. Please try again.")]
    Unavailable,
}

/// Persistence collaborator. A successful submit may carry a message for
/// the user.
pub trait SubmitSink {
    fn submit(&mut self, submission: &Submission) -> Result<Option<String>, SubmitError>;
}

/// Keeps submissions in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub submissions: Vec<Submission>,
}

impl SubmitSink for MemorySink {
    fn submit(&mut self, submission: &Submission) -> Result<Option<String>, SubmitError> {
        self.submissions.push(submission.clone());
        Ok(None)
    }
}

pub struct EditSession {
    editor: Editor,
    notifier: Box<dyn Notifier>,
    resolver: Arc<dyn ImageResolver>,
    loader: ImageLoader,
    title: String,
    description: String,
}

impl EditSession {
    pub fn new(editor: Editor, notifier: Box<dyn Notifier>) -> Self {
        Self {
            editor,
            notifier,
            resolver: Arc::new(DataUrlResolver),
            loader: ImageLoader::new(),
            title: String::new(),
            description: String::new(),
        }
    }

    /// Fetches `content_id` and opens it for editing.
    #[instrument(skip(source, options, notifier))]
    pub fn open(
        source: &dyn DocumentSource,
        content_id: &str,
        options: EditorOptions,
        notifier: Box<dyn Notifier>,
    ) -> Result<Self, EditorError> {
        let document = source.fetch(content_id)?;
        Ok(Self::new(Editor::with_options(document, options), notifier))
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn ImageResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut Editor {
        &mut self.editor
    }

    pub fn document(&self) -> &Document {
        self.editor.document()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn execute(&mut self, command: &Command, prompt: &mut dyn Prompt) -> bool {
        commands::execute(&mut self.editor, command, prompt)
    }

    pub fn handle_key_down(&mut self, event: &KeyEvent, prompt: &mut dyn Prompt) -> KeyOutcome {
        keyboard::handle_key_down(&mut self.editor, event, prompt)
    }

    /// Handles a drop or paste. Files are checked against the image policy,
    /// one error notice per rejected file, and the rest start resolving.
    /// A transfer without files inserts its text. Returns the number of
    /// image resolutions started.
    #[instrument(skip(self, transfer), fields(files = transfer.files.len()))]
    pub fn insert_data(&mut self, transfer: DataTransfer) -> usize {
        if self.editor.is_read_only() {
            return 0;
        }
        if transfer.files.is_empty() {
            if let Some(text) = transfer.text.filter(|t| !t.is_empty()) {
                self.editor.insert_plain_text(&text);
            }
            return 0;
        }

        let (accepted, rejected) = self.editor.options().image_policy.partition(transfer.files);
        for err in rejected {
            warn!(file = err.file_name(), %err, "file rejected");
            self.notifier.notify(Notice::error(err.to_string()));
        }
        let started = accepted.len();
        for file in accepted {
            self.loader.spawn(self.resolver.clone(), file);
        }
        started
    }

    pub fn pending_images(&self) -> usize {
        self.loader.in_flight()
    }

    /// Applies the resolutions that have already finished.
    pub fn apply_ready(&mut self) -> usize {
        let mut applied = 0;
        while let Some(completion) = self.loader.try_next() {
            if self.apply_completion(completion) {
                applied += 1;
            }
        }
        applied
    }

    /// Waits for every in-flight resolution and applies each as it lands.
    pub async fn settle(&mut self) -> usize {
        let mut applied = 0;
        while let Some(completion) = self.loader.next().await {
            if self.apply_completion(completion) {
                applied += 1;
            }
        }
        applied
    }

    fn apply_completion(&mut self, completion: ImageCompletion) -> bool {
        match completion.result {
            Ok(url) => self.editor.insert_image(&url, &completion.name),
            Err(err) => {
                error!(file = %completion.name, %err, "image could not be read");
                self.notifier.notify(Notice::error(err.to_string()));
                false
            }
        }
    }

    /// Hands the document to `sink`. A blank title is refused before
    /// anything is sent. On success the form starts over with an empty
    /// document.
    #[instrument(skip(self, sink))]
    pub fn submit(&mut self, sink: &mut dyn SubmitSink) -> Result<(), EditorError> {
        if self.title.trim().is_empty() {
            let err = SubmitError::TitleRequired;
            self.notifier.notify(Notice::error(err.to_string()));
            return Err(err.into());
        }
        let submission = Submission {
            title: self.title.clone(),
            description: self.description.clone(),
            content: self.editor.document().clone(),
        };
        match sink.submit(&submission) {
            Ok(message) => {
                info!(title = %submission.title, "topic submitted");
                self.notifier
                    .notify(Notice::success(message.unwrap_or_else(|| SUBMIT_SUCCESS.to_string())));
                self.title.clear();
                self.description.clear();
                self.editor = Editor::with_options(Document::empty(), self.editor.options().clone());
                Ok(())
            }
            Err(err) => {
                error!(%err, "submit failed");
                self.notifier.notify(Notice::error(err.to_string()));
                Err(err.into())
            }
        }
    }
}

impl std::fmt::Debug for EditSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditSession")
            .field("editor", &self.editor)
            .field("title", &self.title)
            .field("loader", &self.loader)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::ImageFile;
    use lectern_model::{Node, Point};

    fn session(children: Vec<Node>) -> (EditSession, CollectingNotifier) {
        let notifier = CollectingNotifier::new();
        let session = EditSession::new(Editor::new(Document::new(children)), Box::new(notifier.clone()));
        (session, notifier)
    }

    #[test]
    fn test_oversized_file_rejected_once() {
        let (mut session, notifier) = session(vec![Node::paragraph("A")]);
        let big = ImageFile::new("huge.png", "image/png", vec![0; 5 * 1024 * 1024 + 1]);
        assert_eq!(session.insert_data(DataTransfer::files(vec![big])), 0);
        assert_eq!(session.apply_ready(), 0);
        assert_eq!(session.document(), &Document::new(vec![Node::paragraph("A")]));
        assert_eq!(notifier.errors(), ["Image \"huge.png\" exceeds the 5MB limit and was skipped."]);
    }

    #[test]
    fn test_paste_text_without_files() {
        let (mut session, _) = session(vec![Node::paragraph("A")]);
        session.editor_mut().select_point(Point::new([0, 0], 1));
        session.insert_data(DataTransfer::text("B\nC"));
        assert_eq!(session.document().plain_text(), "AB\nC");
    }

    #[test]
    fn test_empty_title_is_not_submitted() {
        let (mut session, notifier) = session(vec![Node::paragraph("A")]);
        let mut sink = MemorySink::default();
        session.set_title("   ");
        assert!(matches!(
            session.submit(&mut sink),
            Err(EditorError::Submit(SubmitError::TitleRequired))
        ));
        assert!(sink.submissions.is_empty());
        assert_eq!(notifier.errors(), ["Title is required"]);
    }

    #[test]
    fn test_submit_resets_form() {
        let (mut session, notifier) = session(vec![Node::paragraph("Body")]);
        let mut sink = MemorySink::default();
        session.set_title("Intro");
        session.set_description("first");
        session.submit(&mut sink).unwrap();
        assert_eq!(sink.submissions[0].content, Document::new(vec![Node::paragraph("Body")]));
        assert_eq!(notifier.notices(), [Notice::success(SUBMIT_SUCCESS)]);
        assert_eq!(session.title(), "");
        assert_eq!(session.document(), &Document::empty());
    }

    #[test]
    fn test_open_unknown_id() {
        let source = MemorySource::new();
        let result = EditSession::open(&source, "missing", EditorOptions::default(), Box::new(TracingNotifier));
        assert!(matches!(result, Err(EditorError::Source(_))));
    }
}
