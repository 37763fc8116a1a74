//! Document → virtual DOM.
//!
//! Rendering is a pure fold: every node is rendered from its own properties
//! and the already-rendered output of its children, depth-first. The two
//! modes produce the same structure; the editable one adds controls for
//! deleting images, the click-to-edit hint on links and the placeholder.

use crate::vdom::VNode;
use lectern_model::{Document, ElementKind, Mark, Marks, Node, Path, Text};
use tracing::{debug, instrument};

pub const DEFAULT_PLACEHOLDER: &str = "Start typing your content here...";
pub const IMAGE_ALT_FALLBACK: &str = "Embedded content";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    #[default]
    Editable,
    ReadOnly,
}

impl RenderMode {
    pub fn is_editable(&self) -> bool {
        matches!(self, RenderMode::Editable)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub mode: RenderMode,
    /// Shown while an editable document is blank
    pub placeholder: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            mode: RenderMode::Editable,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }
}

impl RenderOptions {
    pub fn read_only() -> Self {
        Self {
            mode: RenderMode::ReadOnly,
            ..Self::default()
        }
    }
}

/// Renders the whole document inside its editing surface.
#[instrument(skip_all, fields(blocks = document.children.len(), mode = ?options.mode))]
pub fn render_document(document: &Document, options: &RenderOptions) -> VNode {
    let mut surface = VNode::element("div").with_attr("class", "lectern-surface");
    if options.mode.is_editable() {
        surface = surface
            .with_attr("contenteditable", "true")
            .with_attr("role", "textbox")
            .with_attr("aria-multiline", "true");
        if document.is_blank() && !options.placeholder.is_empty() {
            debug!("blank document; showing placeholder");
            surface = surface.with_child(
                VNode::element("span")
                    .affordance("placeholder")
                    .with_attr("contenteditable", "false")
                    .with_attr("class", "lectern-placeholder")
                    .with_child(VNode::text(&options.placeholder)),
            );
        }
    }

    let blocks = document
        .children
        .iter()
        .enumerate()
        .map(|(i, node)| render_node(node, &Path::new(vec![i]), options.mode))
        .collect();
    surface.with_children(blocks)
}

/// Renders `node` (found at `path`) and everything below it.
pub fn render_node(node: &Node, path: &Path, mode: RenderMode) -> VNode {
    match node {
        Node::Text(text) => render_leaf(text),
        Node::Element(element) => {
            let children = element
                .children
                .iter()
                .enumerate()
                .map(|(i, child)| render_node(child, &path.child(i), mode))
                .collect();
            render_element(&element.kind, path, children, mode)
        }
    }
}

/// Maps one element to its visual form, given its rendered children.
pub fn render_element(kind: &ElementKind, path: &Path, children: Vec<VNode>, mode: RenderMode) -> VNode {
    let node = match kind {
        ElementKind::Paragraph => block("p", kind),
        ElementKind::HeadingOne => block("h1", kind),
        ElementKind::HeadingTwo => block("h2", kind),
        ElementKind::HeadingThree => block("h3", kind),
        ElementKind::BlockQuote => block("blockquote", kind),
        ElementKind::BulletedList => block("ul", kind),
        ElementKind::NumberedList => block("ol", kind),
        ElementKind::ListItem => block("li", kind),
        ElementKind::Image { url, alt } => return render_image(url, alt, path, children, mode),
        ElementKind::Link { url } => {
            let mut link = VNode::element("a")
                .with_attr("href", url)
                .with_attr("target", "_blank")
                .with_attr("rel", "noopener noreferrer")
                .with_attr("class", "lectern-link");
            if mode.is_editable() {
                link = link.with_attr("title", format!("{url} (Ctrl+Click to edit)"));
            }
            link
        }
    };
    node.with_key(path.to_string()).with_children(children)
}

fn block(tag: &str, kind: &ElementKind) -> VNode {
    VNode::element(tag).with_attr("class", format!("lectern-{}", kind.type_name()))
}

fn render_image(url: &str, alt: &str, path: &Path, children: Vec<VNode>, mode: RenderMode) -> VNode {
    let alt = if alt.is_empty() { IMAGE_ALT_FALLBACK } else { alt };
    let frame = VNode::element("div").with_attr("class", "lectern-image-frame").with_child(
        VNode::element("img")
            .with_attr("src", url)
            .with_attr("alt", alt)
            .with_attr("class", "lectern-image-img"),
    );
    let mut image = VNode::element("div")
        .with_key(path.to_string())
        .with_attr("class", "lectern-image")
        .with_attr("contenteditable", "false")
        .with_child(frame);
    if mode.is_editable() {
        image = image.with_child(
            VNode::element("button")
                .affordance("delete-image")
                .with_attr("type", "button")
                .with_attr("aria-label", "Delete image")
                .with_attr("data-path", path.to_string())
                .with_attr("class", "lectern-image-delete"),
        );
    }
    image.with_children(children)
}

/// A text leaf: a span around its text, with each active mark wrapping the
/// previous one in bold, italic, underline, code order.
pub fn render_leaf(text: &Text) -> VNode {
    let mut content = VNode::text(&text.text);
    for mark in Mark::ALL {
        if text.marks.get(mark) {
            content = VNode::element(mark_tag(mark)).with_child(content);
        }
    }
    VNode::element("span").with_attr("data-leaf", "true").with_child(content)
}

pub fn mark_tag(mark: Mark) -> &'static str {
    match mark {
        Mark::Bold => "strong",
        Mark::Italic => "em",
        Mark::Underline => "u",
        Mark::Code => "code",
    }
}

/// Tags wrapping a leaf with `marks`, outermost first.
pub fn mark_tags(marks: &Marks) -> Vec<&'static str> {
    Mark::ALL
        .into_iter()
        .rev()
        .filter(|mark| marks.get(*mark))
        .map(mark_tag)
        .collect()
}
