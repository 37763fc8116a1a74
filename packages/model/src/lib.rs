//! # Lectern Model
//!
//! The document tree shared by the editor and the renderer.
//!
//! ```text
//! Document
//!  ├─ paragraph / heading-* / block-quote ── leaves + inline links
//!  ├─ bulleted-list / numbered-list ──────── list-item ── leaves + inline links
//!  └─ image (void) ───────────────────────── one empty placeholder leaf
//! ```
//!
//! Nodes are addressed by [`Path`]; carets by [`Point`] (leaf path plus char
//! offset); selections by [`Range`]. The JSON shape produced by serde is the
//! persisted content format.

mod document;
mod error;
mod kind;
mod node;
mod path;
mod range;
mod validate;

pub use document::Document;
pub use error::{ModelError, ModelResult};
pub use kind::{ElementKind, Mark, Marks};
pub use node::{Element, Node, Text};
pub use path::Path;
pub use range::{Point, Range};
pub use validate::{Violation, ViolationKind};
