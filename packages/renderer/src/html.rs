use crate::render::{render_document, RenderOptions};
use crate::vdom::VNode;
use lectern_model::Document;

/// Options for HTML output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlOptions {
    /// Pretty print HTML
    pub pretty: bool,
    /// Indentation string
    pub indent: String,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            indent: "  ".to_string(),
        }
    }
}

impl HtmlOptions {
    pub fn compact() -> Self {
        Self {
            pretty: false,
            ..Self::default()
        }
    }
}

struct Context<'a> {
    options: &'a HtmlOptions,
    depth: usize,
    buffer: String,
}

impl<'a> Context<'a> {
    fn new(options: &'a HtmlOptions) -> Self {
        Self {
            options,
            depth: 0,
            buffer: String::new(),
        }
    }

    fn add(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn newline(&mut self) {
        if self.options.pretty {
            self.buffer.push('\n');
        }
    }

    fn add_indent(&mut self) {
        if self.options.pretty {
            for _ in 0..self.depth {
                self.buffer.push_str(&self.options.indent);
            }
        }
    }

    fn indent(&mut self) {
        self.depth += 1;
    }

    fn dedent(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
        }
    }

    fn get_output(self) -> String {
        self.buffer
    }
}

/// Renders `document` straight to markup.
pub fn render_html(document: &Document, render: &RenderOptions, html: &HtmlOptions) -> String {
    to_html(&render_document(document, render), html)
}

/// Serializes a virtual DOM tree.
pub fn to_html(node: &VNode, options: &HtmlOptions) -> String {
    let mut ctx = Context::new(options);
    write_block(node, &mut ctx);
    ctx.get_output()
}

/// Writes a node on its own line. Elements that hold only inline content
/// stay on that line.
fn write_block(node: &VNode, ctx: &mut Context) {
    ctx.add_indent();
    match node {
        VNode::Element { tag, children, .. } if has_block_children(children) => {
            open_tag(node, ctx);
            ctx.newline();
            ctx.indent();
            for child in children {
                write_block(child, ctx);
            }
            ctx.dedent();
            ctx.add_indent();
            ctx.add(&format!("</{}>", tag));
        }
        _ => write_inline(node, ctx),
    }
    ctx.newline();
}

fn write_inline(node: &VNode, ctx: &mut Context) {
    match node {
        VNode::Text { content } => ctx.add(&escape_html(content)),
        VNode::Element { tag, children, .. } => {
            open_tag(node, ctx);
            if children.is_empty() && is_self_closing(tag) {
                return;
            }
            for child in children {
                write_inline(child, ctx);
            }
            ctx.add(&format!("</{}>", tag));
        }
    }
}

fn open_tag(node: &VNode, ctx: &mut Context) {
    let VNode::Element { tag, attributes, children, .. } = node else {
        return;
    };
    ctx.add(&format!("<{}", tag));
    for (name, value) in attributes {
        ctx.add(&format!(" {}=\"{}\"", name, escape_html(value)));
    }
    if children.is_empty() && is_self_closing(tag) {
        ctx.add(" />");
    } else {
        ctx.add(">");
    }
}

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn is_self_closing(tag: &str) -> bool {
    matches!(tag, "img" | "br" | "hr" | "input" | "wbr")
}

fn is_inline_tag(tag: &str) -> bool {
    matches!(
        tag,
        "span" | "strong" | "em" | "u" | "code" | "a" | "img" | "br" | "button"
    )
}

fn has_block_children(children: &[VNode]) -> bool {
    children
        .iter()
        .any(|child| child.tag().is_some_and(|tag| !is_inline_tag(tag)))
}
