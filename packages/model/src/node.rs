use crate::kind::{ElementKind, Marks};
use serde::{Deserialize, Serialize};

/// A text run with its marks.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Text {
    pub text: String,
    #[serde(flatten)]
    pub marks: Marks,
}

impl Text {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Marks::default(),
        }
    }

    pub fn with_marks(text: impl Into<String>, marks: Marks) -> Self {
        Self {
            text: text.into(),
            marks,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Length in chars.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Byte index of a char offset, clamped to the end of the text.
    pub fn byte_index(&self, offset: usize) -> usize {
        self.text
            .char_indices()
            .nth(offset)
            .map(|(index, _)| index)
            .unwrap_or(self.text.len())
    }

    /// Chars in `[from, to)`.
    pub fn slice(&self, from: usize, to: usize) -> &str {
        let start = self.byte_index(from);
        let end = self.byte_index(to.max(from));
        &self.text[start..end]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    #[serde(flatten)]
    pub kind: ElementKind,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(kind: ElementKind, children: Vec<Node>) -> Self {
        Self { kind, children }
    }

    pub fn string(&self) -> String {
        self.children.iter().map(Node::string).collect()
    }
}

/// A document node: an element or a text leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Element(Element),
    Text(Text),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(Text::new(text))
    }

    pub fn marked(text: impl Into<String>, marks: Marks) -> Self {
        Node::Text(Text::with_marks(text, marks))
    }

    pub fn element(kind: ElementKind, children: Vec<Node>) -> Self {
        Node::Element(Element::new(kind, children))
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::element(ElementKind::Paragraph, vec![Node::text(text)])
    }

    /// An image with its empty placeholder leaf.
    pub fn image(url: impl Into<String>, alt: impl Into<String>) -> Self {
        Self::element(ElementKind::image(url, alt), vec![Node::text("")])
    }

    pub fn link(url: impl Into<String>, text: impl Into<String>) -> Self {
        Self::element(ElementKind::link(url), vec![Node::text(text)])
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Node::Text(text) => Some(text),
            Node::Element(_) => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut Text> {
        match self {
            Node::Text(text) => Some(text),
            Node::Element(_) => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    pub fn kind(&self) -> Option<&ElementKind> {
        self.as_element().map(|element| &element.kind)
    }

    pub fn children(&self) -> Option<&[Node]> {
        self.as_element().map(|element| element.children.as_slice())
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        self.as_element_mut().map(|element| &mut element.children)
    }

    pub fn is_void(&self) -> bool {
        self.kind().is_some_and(ElementKind::is_void)
    }

    /// Text leaves and inline elements.
    pub fn is_inline(&self) -> bool {
        match self {
            Node::Text(_) => true,
            Node::Element(element) => element.kind.is_inline(),
        }
    }

    pub fn is_block(&self) -> bool {
        !self.is_inline()
    }

    /// Concatenated text of every leaf below this node.
    pub fn string(&self) -> String {
        match self {
            Node::Text(text) => text.text.clone(),
            Node::Element(element) => element.string(),
        }
    }
}

impl From<Text> for Node {
    fn from(text: Text) -> Self {
        Node::Text(text)
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}
