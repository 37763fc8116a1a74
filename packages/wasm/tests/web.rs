#![cfg(target_arch = "wasm32")]

use lectern_wasm::{render_html_js, EditorHandle};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

const DOC: &str = r#"[{"type":"paragraph","children":[{"text":"Hi"}]}]"#;

#[wasm_bindgen_test]
fn renders_read_only_html() {
    let html = render_html_js(DOC, true).unwrap();
    assert!(!html.contains("contenteditable"));
}

#[wasm_bindgen_test]
fn typing_through_the_handle() {
    let mut handle = EditorHandle::new(DOC).unwrap();
    handle.focus();
    assert_eq!(handle.key_down("!", false, false, false, false), "handled");
    assert!(handle.document_json().unwrap().contains("Hi!"));
    assert!(handle.render_html(false).contains("contenteditable"));
}
