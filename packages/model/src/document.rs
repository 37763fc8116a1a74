use crate::error::ModelResult;
use crate::kind::ElementKind;
use crate::node::{Node, Text};
use crate::path::Path;
use crate::range::Point;
use serde::{Deserialize, Serialize};

/// The persisted unit: an ordered list of top-level blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    pub children: Vec<Node>,
}

impl Document {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    /// A single empty paragraph.
    pub fn empty() -> Self {
        Self::new(vec![Node::paragraph("")])
    }

    pub fn from_json(json: &str) -> ModelResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> ModelResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> ModelResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// True for a document holding nothing but one empty text block.
    pub fn is_blank(&self) -> bool {
        match self.children.as_slice() {
            [] => true,
            [only] => {
                only.kind().is_some_and(ElementKind::is_text_block) && only.string().is_empty()
                    && only.children().is_some_and(|c| c.iter().all(Node::is_text))
            }
            _ => false,
        }
    }

    pub fn get(&self, path: &Path) -> Option<&Node> {
        let (first, rest) = path.split_first()?;
        let mut node = self.children.get(*first)?;
        for index in rest {
            node = node.children()?.get(*index)?;
        }
        Some(node)
    }

    pub fn get_mut(&mut self, path: &Path) -> Option<&mut Node> {
        let (first, rest) = path.split_first()?;
        let mut node = self.children.get_mut(*first)?;
        for index in rest {
            node = node.children_mut()?.get_mut(*index)?;
        }
        Some(node)
    }

    /// Children of the node at `parent`; the root path yields the top level.
    pub fn children_at(&self, parent: &Path) -> Option<&[Node]> {
        if parent.is_root() {
            return Some(&self.children);
        }
        self.get(parent)?.children()
    }

    pub fn children_at_mut(&mut self, parent: &Path) -> Option<&mut Vec<Node>> {
        if parent.is_root() {
            return Some(&mut self.children);
        }
        self.get_mut(parent)?.children_mut()
    }

    pub fn text(&self, path: &Path) -> Option<&Text> {
        self.get(path)?.as_text()
    }

    pub fn has(&self, path: &Path) -> bool {
        self.get(path).is_some()
    }

    /// Every node in depth-first pre-order, paired with its path.
    pub fn nodes(&self) -> Vec<(Path, &Node)> {
        let mut out = Vec::new();
        collect_nodes(&self.children, &Path::root(), &mut out);
        out
    }

    /// Every text leaf in document order.
    pub fn leaves(&self) -> Vec<(Path, &Text)> {
        self.nodes()
            .into_iter()
            .filter_map(|(path, node)| node.as_text().map(|text| (path, text)))
            .collect()
    }

    /// True when some ancestor of `path` (or the node itself) is void.
    pub fn in_void(&self, path: &Path) -> bool {
        path.ancestors()
            .into_iter()
            .chain(std::iter::once(path.clone()))
            .filter_map(|p| self.get(&p))
            .any(Node::is_void)
    }

    /// Leaves a caret may sit in: leaves outside any void element.
    pub fn editable_leaves(&self) -> Vec<(Path, &Text)> {
        let mut out = Vec::new();
        collect_editable(&self.children, &Path::root(), &mut out);
        out
    }

    pub fn start_point(&self) -> Option<Point> {
        self.editable_leaves()
            .into_iter()
            .next()
            .map(|(path, _)| Point::new(path, 0))
    }

    pub fn end_point(&self) -> Option<Point> {
        self.editable_leaves()
            .into_iter()
            .last()
            .map(|(path, text)| Point::new(path, text.len()))
    }

    /// Plain text with blocks separated by newlines.
    pub fn plain_text(&self) -> String {
        let mut lines = Vec::new();
        collect_lines(&self.children, &mut lines);
        lines.join("\n")
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}

fn collect_nodes<'a>(nodes: &'a [Node], parent: &Path, out: &mut Vec<(Path, &'a Node)>) {
    for (index, node) in nodes.iter().enumerate() {
        let path = parent.child(index);
        out.push((path.clone(), node));
        if let Some(children) = node.children() {
            collect_nodes(children, &path, out);
        }
    }
}

fn collect_editable<'a>(nodes: &'a [Node], parent: &Path, out: &mut Vec<(Path, &'a Text)>) {
    for (index, node) in nodes.iter().enumerate() {
        let path = parent.child(index);
        match node {
            Node::Text(text) => out.push((path, text)),
            Node::Element(element) if !element.kind.is_void() => {
                collect_editable(&element.children, &path, out)
            }
            Node::Element(_) => {}
        }
    }
}

fn collect_lines(nodes: &[Node], lines: &mut Vec<String>) {
    for node in nodes {
        match node.kind() {
            Some(kind) if kind.is_text_block() => lines.push(node.string()),
            Some(ElementKind::Image { .. }) => {}
            Some(_) => collect_lines(node.children().unwrap_or_default(), lines),
            None => lines.push(node.string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::ElementKind;

    fn sample() -> Document {
        Document::new(vec![
            Node::paragraph("Intro"),
            Node::element(
                ElementKind::BulletedList,
                vec![
                    Node::element(ElementKind::ListItem, vec![Node::text("one")]),
                    Node::element(
                        ElementKind::ListItem,
                        vec![
                            Node::text("see "),
                            Node::link("https://example.com", "here"),
                            Node::text(""),
                        ],
                    ),
                ],
            ),
            Node::image("a.png", "diagram"),
        ])
    }

    #[test]
    fn test_empty_document() {
        let doc = Document::empty();
        assert!(doc.is_blank());
        assert_eq!(doc.to_json().unwrap(), r#"[{"type":"paragraph","children":[{"text":""}]}]"#);
    }

    #[test]
    fn test_get_by_path() {
        let doc = sample();
        assert_eq!(doc.text(&Path::from([1, 0, 0])).unwrap().text, "one");
        assert_eq!(
            doc.get(&Path::from([1, 1, 1])).unwrap().kind(),
            Some(&ElementKind::link("https://example.com"))
        );
        assert!(doc.get(&Path::from([5])).is_none());
        assert!(doc.get(&Path::root()).is_none());
        assert_eq!(doc.children_at(&Path::root()).unwrap().len(), 3);
    }

    #[test]
    fn test_editable_leaves_skip_voids() {
        let doc = sample();
        let editable: Vec<String> = doc
            .editable_leaves()
            .into_iter()
            .map(|(path, _)| path.to_string())
            .collect();
        assert_eq!(editable, vec!["0.0", "1.0.0", "1.1.0", "1.1.2"]);
        assert!(doc.in_void(&Path::from([1, 1, 1, 0])));
        assert!(doc.in_void(&Path::from([2, 0])));
        assert!(!doc.in_void(&Path::from([1, 1, 0])));
    }

    #[test]
    fn test_json_round_trip() {
        let doc = sample();
        let json = doc.to_json().unwrap();
        assert_eq!(Document::from_json(&json).unwrap(), doc);
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let result = Document::from_json(r#"[{"type":"table","children":[{"text":""}]}]"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(sample().plain_text(), "Intro\none\nsee here");
    }
}
