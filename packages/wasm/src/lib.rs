use lectern_editor::{
    chord_command, toolbar_button, BlockFormat, CollectingNotifier, Command, DataTransfer,
    EditSession, Editor, ImageFile, Key, KeyEvent, MemorySink, Modifiers, NoPrompt, ScriptedPrompt,
    TOOLBAR,
};
use lectern_model::{Document, Mark, Path, Point, Range};
use lectern_renderer::{render_document, render_html, HtmlOptions, RenderOptions};
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error(context: &str, err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{}: {}", context, err))
}

fn parse_document(json: &str) -> Result<Document, JsValue> {
    Document::from_json(json).map_err(|e| js_error("Document error", e))
}

fn parse_path(path: &str) -> Result<Path, JsValue> {
    path.parse::<Path>().map_err(|e| js_error("Path error", e))
}

fn render_options(read_only: bool) -> RenderOptions {
    if read_only {
        RenderOptions::read_only()
    } else {
        RenderOptions::default()
    }
}

/// Render a document JSON to HTML
#[wasm_bindgen(js_name = renderHtml)]
pub fn render_html_js(json: &str, read_only: bool) -> Result<String, JsValue> {
    let document = parse_document(json)?;
    Ok(render_html(&document, &render_options(read_only), &HtmlOptions::compact()))
}

/// Check a document JSON and return its violations as JSON
#[wasm_bindgen(js_name = validate)]
pub fn validate_js(json: &str) -> Result<String, JsValue> {
    let document = parse_document(json)?;
    serde_json::to_string(&document.validate()).map_err(|e| js_error("Serialization error", e))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ButtonState {
    format: &'static str,
    label: &'static str,
    tooltip: &'static str,
    active: bool,
}

/// A live editing session driven by the browser.
#[wasm_bindgen]
pub struct EditorHandle {
    session: EditSession,
    notifier: CollectingNotifier,
    notices_seen: usize,
}

#[wasm_bindgen]
impl EditorHandle {
    #[wasm_bindgen(constructor)]
    pub fn new(json: &str) -> Result<EditorHandle, JsValue> {
        let document = parse_document(json)?;
        let notifier = CollectingNotifier::new();
        let session = EditSession::new(Editor::new(document), Box::new(notifier.clone()));
        Ok(EditorHandle {
            session,
            notifier,
            notices_seen: 0,
        })
    }

    #[wasm_bindgen(js_name = documentJson)]
    pub fn document_json(&self) -> Result<String, JsValue> {
        self.session
            .document()
            .to_json()
            .map_err(|e| js_error("Serialization error", e))
    }

    #[wasm_bindgen(js_name = selectionJson)]
    pub fn selection_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.editor().selection())
            .map_err(|e| js_error("Serialization error", e))
    }

    pub fn focus(&mut self) {
        self.session.editor_mut().focus();
    }

    pub fn blur(&mut self) {
        self.session.editor_mut().blur();
    }

    pub fn select(
        &mut self,
        anchor_path: &str,
        anchor_offset: usize,
        focus_path: &str,
        focus_offset: usize,
    ) -> Result<bool, JsValue> {
        let range = Range::new(
            Point::new(parse_path(anchor_path)?, anchor_offset),
            Point::new(parse_path(focus_path)?, focus_offset),
        );
        Ok(self.session.editor_mut().select(range))
    }

    /// Handles a keydown. Returns `"ignored"`, `"handled"` (prevent the
    /// native action) or `"link"` when the host should open its link dialog
    /// and call `insertLink`.
    #[wasm_bindgen(js_name = keyDown)]
    pub fn key_down(&mut self, key: &str, ctrl: bool, meta: bool, shift: bool, alt: bool) -> String {
        let Some(key) = browser_key(key) else {
            return "ignored".to_string();
        };
        let event = KeyEvent::new(key, Modifiers { ctrl, meta, shift, alt });
        if chord_command(&event) == Some(Command::InsertLink)
            && self.session.editor().is_focused()
            && !self.session.editor().is_read_only()
        {
            return "link".to_string();
        }
        let outcome = self.session.handle_key_down(&event, &mut NoPrompt);
        if outcome.prevent_default { "handled" } else { "ignored" }.to_string()
    }

    #[wasm_bindgen(js_name = insertText)]
    pub fn insert_text(&mut self, text: &str) -> bool {
        self.session.editor_mut().insert_text(text)
    }

    #[wasm_bindgen(js_name = pasteText)]
    pub fn paste_text(&mut self, text: &str) {
        self.session.insert_data(DataTransfer::text(text));
    }

    #[wasm_bindgen(js_name = toggleMark)]
    pub fn toggle_mark(&mut self, name: &str) -> Result<bool, JsValue> {
        let mark = Mark::from_name(name).ok_or_else(|| js_error("Unknown mark", name))?;
        Ok(self.session.execute(&Command::ToggleMark(mark), &mut NoPrompt))
    }

    #[wasm_bindgen(js_name = toggleBlock)]
    pub fn toggle_block(&mut self, name: &str) -> Result<bool, JsValue> {
        let format = BlockFormat::from_name(name).ok_or_else(|| js_error("Unknown block format", name))?;
        Ok(self.session.execute(&Command::ToggleBlock(format), &mut NoPrompt))
    }

    /// Answers for the link dialog. Without a selection `text` becomes the
    /// link's display text.
    #[wasm_bindgen(js_name = insertLink)]
    pub fn insert_link(&mut self, url: &str, text: Option<String>) -> bool {
        let mut prompt = ScriptedPrompt::new([url.to_string(), text.unwrap_or_default()]);
        self.session.execute(&Command::InsertLink, &mut prompt)
    }

    #[wasm_bindgen(js_name = editLinkUrl)]
    pub fn edit_link_url(&mut self, path: &str, url: &str) -> Result<bool, JsValue> {
        let command = Command::EditLinkUrl(parse_path(path)?);
        Ok(self.session.execute(&command, &mut ScriptedPrompt::new([url])))
    }

    #[wasm_bindgen(js_name = insertImageUrl)]
    pub fn insert_image_url(&mut self, url: &str) -> bool {
        self.session.execute(&Command::InsertImage, &mut ScriptedPrompt::new([url]))
    }

    #[wasm_bindgen(js_name = removeImage)]
    pub fn remove_image(&mut self, path: &str) -> Result<bool, JsValue> {
        let command = Command::RemoveImage(parse_path(path)?);
        Ok(self.session.execute(&command, &mut NoPrompt))
    }

    /// A dropped or pasted file. Rejections show up in `takeNotices`.
    #[wasm_bindgen(js_name = insertFile)]
    pub fn insert_file(&mut self, name: &str, mime: &str, bytes: Vec<u8>) -> usize {
        self.session
            .insert_data(DataTransfer::files(vec![ImageFile::new(name, mime, bytes)]));
        self.session.apply_ready()
    }

    pub fn undo(&mut self) -> bool {
        self.session.execute(&Command::Undo, &mut NoPrompt)
    }

    pub fn redo(&mut self) -> bool {
        self.session.execute(&Command::Redo, &mut NoPrompt)
    }

    /// Toolbar buttons with their pressed state, as JSON.
    #[wasm_bindgen(js_name = toolbarState)]
    pub fn toolbar_state(&self) -> Result<String, JsValue> {
        let editor = self.session.editor();
        let buttons: Vec<ButtonState> = TOOLBAR
            .iter()
            .map(|button| ButtonState {
                format: button.format,
                label: button.label,
                tooltip: button.tooltip,
                active: button.is_active(editor),
            })
            .collect();
        serde_json::to_string(&buttons).map_err(|e| js_error("Serialization error", e))
    }

    #[wasm_bindgen(js_name = isActive)]
    pub fn is_active(&self, format: &str) -> bool {
        toolbar_button(format).is_some_and(|button| button.is_active(self.session.editor()))
    }

    /// Notices raised since the last call, as JSON.
    #[wasm_bindgen(js_name = takeNotices)]
    pub fn take_notices(&mut self) -> Result<String, JsValue> {
        let notices = self.notifier.notices();
        let fresh = &notices[self.notices_seen.min(notices.len())..];
        self.notices_seen = notices.len();
        serde_json::to_string(fresh).map_err(|e| js_error("Serialization error", e))
    }

    #[wasm_bindgen(js_name = renderHtml)]
    pub fn render_html(&self, read_only: bool) -> String {
        render_html(self.session.document(), &render_options(read_only), &HtmlOptions::compact())
    }

    #[wasm_bindgen(js_name = renderVdom)]
    pub fn render_vdom(&self) -> Result<String, JsValue> {
        let vdom = render_document(self.session.document(), &RenderOptions::default());
        serde_json::to_string(&vdom).map_err(|e| js_error("Serialization error", e))
    }

    /// Validates the form and returns the submission JSON for the host to
    /// send. The form is cleared afterwards.
    pub fn submit(&mut self, title: &str, description: &str) -> Result<String, JsValue> {
        self.session.set_title(title);
        self.session.set_description(description);
        let mut sink = MemorySink::default();
        self.session.submit(&mut sink).map_err(|e| js_error("Submit error", e))?;
        let submission = sink.submissions.pop().ok_or_else(|| JsValue::from_str("Nothing submitted"))?;
        serde_json::to_string(&submission).map_err(|e| js_error("Serialization error", e))
    }
}

/// Maps a `KeyboardEvent.key` value.
fn browser_key(key: &str) -> Option<Key> {
    if key == " " {
        return Some(Key::Char(' '));
    }
    key.parse::<KeyEvent>().ok().map(|event| event.key)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"[{"type":"paragraph","children":[{"text":"Hello"}]}]"#;

    #[test]
    fn test_render_html() {
        let html = render_html_js(DOC, true).unwrap();
        assert!(html.contains("<p class=\"lectern-paragraph\"><span data-leaf=\"true\">Hello</span></p>"));
        assert!(render_html_js("not json", true).is_err());
    }

    #[test]
    fn test_handle_round_trip() {
        let mut handle = EditorHandle::new(DOC).unwrap();
        handle.focus();
        assert_eq!(handle.key_down("!", false, false, false, false), "handled");
        assert_eq!(handle.key_down("k", true, false, false, false), "link");
        assert!(handle.insert_link("https://x.dev", Some("site".to_string())));
        let json = handle.document_json().unwrap();
        assert!(json.contains("Hello!"));
        assert!(json.contains(r#""url":"https://x.dev""#));
        assert!(handle.undo());
        assert!(!handle.document_json().unwrap().contains("https://x.dev"));
    }

    #[test]
    fn test_rejected_file_notice() {
        let mut handle = EditorHandle::new(DOC).unwrap();
        handle.focus();
        assert_eq!(handle.insert_file("a.txt", "text/plain", vec![1]), 0);
        let notices = handle.take_notices().unwrap();
        assert!(notices.contains("is not an image"));
        assert_eq!(handle.take_notices().unwrap(), "[]");
        assert_eq!(handle.insert_file("a.png", "image/png", vec![1]), 1);
        assert!(handle.document_json().unwrap().contains("data:image/png;base64,AQ=="));
    }

    #[test]
    fn test_toolbar_state() {
        let mut handle = EditorHandle::new(DOC).unwrap();
        handle.focus();
        handle.select("0.0", 0, "0.0", 5).unwrap();
        handle.toggle_mark("bold").unwrap();
        assert!(handle.is_active("bold"));
        let state = handle.toolbar_state().unwrap();
        assert!(state.contains(r#""format":"bold","label":"B","tooltip":"Bold (Ctrl+B)","active":true"#));
    }
}
