//! # Lectern Renderer
//!
//! Turns a document into a virtual DOM and HTML.
//!
//! ```text
//! Document ──render_document──▶ VNode ──to_html──▶ String
//!                                  │
//!                                  └──shape_of──▶ Shape (mode-independent)
//! ```
//!
//! Rendering has two modes. [`RenderMode::Editable`] adds the editing
//! controls (image delete button, link edit hint, placeholder);
//! [`RenderMode::ReadOnly`] leaves them out and is otherwise identical.

mod html;
mod render;
mod shape;
mod vdom;

pub use html::{escape_html, render_html, to_html, HtmlOptions};
pub use render::{
    mark_tag, mark_tags, render_document, render_element, render_leaf, render_node, RenderMode,
    RenderOptions, DEFAULT_PLACEHOLDER, IMAGE_ALT_FALLBACK,
};
pub use shape::{shape_of, structurally_equivalent, Shape};
pub use vdom::{VNode, AFFORDANCE_ATTR};
