//! Structural invariant checks.
//!
//! The editor keeps documents valid through normalization; this checker is
//! for documents arriving from outside (hydration, the CLI `check` command)
//! and for tests.

use crate::document::Document;
use crate::kind::ElementKind;
use crate::node::Node;
use crate::path::Path;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationKind {
    EmptyDocument,
    EmptyElement,
    VoidChildren,
    ListChild,
    OrphanListItem,
    BlockInTextBlock,
    InlineAtRoot,
    ElementInLink,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub path: Path,
    pub kind: ViolationKind,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self.kind {
            ViolationKind::EmptyDocument => "document has no blocks",
            ViolationKind::EmptyElement => "element has no children",
            ViolationKind::VoidChildren => "void element children are not a single placeholder",
            ViolationKind::ListChild => "list contains a node other than list-item",
            ViolationKind::OrphanListItem => "list-item outside a list",
            ViolationKind::BlockInTextBlock => "block nested inside a text block",
            ViolationKind::InlineAtRoot => "text or inline node at the top level",
            ViolationKind::ElementInLink => "link contains an element",
        };
        if self.path.is_root() {
            write!(f, "{}", message)
        } else {
            write!(f, "{} at {}", message, self.path)
        }
    }
}

impl Document {
    /// Every invariant violation, in document order.
    pub fn validate(&self) -> Vec<Violation> {
        let mut violations = Vec::new();
        if self.children.is_empty() {
            violations.push(Violation {
                path: Path::root(),
                kind: ViolationKind::EmptyDocument,
            });
        }
        for (index, node) in self.children.iter().enumerate() {
            let path = Path::from([index]);
            match node.kind() {
                None => push(&mut violations, &path, ViolationKind::InlineAtRoot),
                Some(kind) if kind.is_inline() => {
                    push(&mut violations, &path, ViolationKind::InlineAtRoot)
                }
                Some(ElementKind::ListItem) => {
                    push(&mut violations, &path, ViolationKind::OrphanListItem)
                }
                Some(_) => {}
            }
            check_node(node, &path, &mut violations);
        }
        violations
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

fn push(violations: &mut Vec<Violation>, path: &Path, kind: ViolationKind) {
    violations.push(Violation {
        path: path.clone(),
        kind,
    });
}

fn check_node(node: &Node, path: &Path, violations: &mut Vec<Violation>) {
    let Some(element) = node.as_element() else {
        return;
    };
    let children = &element.children;

    match &element.kind {
        ElementKind::Image { .. } => {
            let placeholder = matches!(children.as_slice(), [Node::Text(text)] if text.is_empty());
            if !placeholder {
                push(violations, path, ViolationKind::VoidChildren);
            }
            return;
        }
        ElementKind::Link { .. } => {
            if children.is_empty() {
                push(violations, path, ViolationKind::EmptyElement);
            }
            if children.iter().any(|child| !child.is_text()) {
                push(violations, path, ViolationKind::ElementInLink);
            }
            return;
        }
        kind if kind.is_list_container() => {
            if children.is_empty() {
                push(violations, path, ViolationKind::EmptyElement);
            }
            for (index, child) in children.iter().enumerate() {
                if child.kind() != Some(&ElementKind::ListItem) {
                    push(violations, &path.child(index), ViolationKind::ListChild);
                }
            }
        }
        _ => {
            if children.is_empty() {
                push(violations, path, ViolationKind::EmptyElement);
            }
            for (index, child) in children.iter().enumerate() {
                if child.is_block() {
                    push(violations, &path.child(index), ViolationKind::BlockInTextBlock);
                }
            }
        }
    }

    for (index, child) in children.iter().enumerate() {
        check_node(child, &path.child(index), violations);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_document() {
        let doc = Document::new(vec![
            Node::paragraph("Hello"),
            Node::element(
                ElementKind::NumberedList,
                vec![Node::element(ElementKind::ListItem, vec![Node::text("a")])],
            ),
            Node::image("a.png", ""),
        ]);
        assert!(doc.is_valid());
    }

    #[test]
    fn test_reports_each_violation() {
        let doc = Document::new(vec![
            Node::text("stray"),
            Node::element(ElementKind::BulletedList, vec![Node::paragraph("p")]),
            Node::element(ElementKind::image("a.png", ""), vec![Node::text("typed")]),
            Node::element(ElementKind::Paragraph, vec![]),
        ]);
        let kinds: Vec<ViolationKind> = doc.validate().into_iter().map(|v| v.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ViolationKind::InlineAtRoot,
                ViolationKind::ListChild,
                ViolationKind::VoidChildren,
                ViolationKind::EmptyElement,
            ]
        );
    }

    #[test]
    fn test_empty_document_violation() {
        let violations = Document::new(vec![]).validate();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].to_string(), "document has no blocks");
    }
}
