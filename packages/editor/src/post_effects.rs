//! # Post-Effect System
//!
//! Transactions trigger cascading effects to maintain document integrity.
//!
//! ## Design
//!
//! After a transform has run, the tree may break a structural rule: a list
//! left without items, a link wrapped around nothing, two leaves with the
//! same marks side by side. Each [`PostEffect`] checks one rule and returns
//! the mutations that repair the first violation it finds. The editor applies
//! them like any other mutation, so the selection follows and the repair is
//! part of the same undo step, then asks again until every effect is quiet.
//!
//! Post-effects are:
//! - **Deterministic**: Same document always produces the same repair
//! - **Local**: Each repair touches one violation
//! - **Ordered**: Structural rules run before cosmetic ones

use crate::mutations::{Mutation, NodeProperties};
use lectern_model::{Document, ElementKind, Marks, Node, Path};

/// A structural rule checked after every transaction
pub trait PostEffect: std::fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Mutations repairing the first violation found; empty when none
    fn analyze(&self, doc: &Document) -> Vec<Mutation>;
}

/// Top level holds blocks only, and at least one of them.
#[derive(Debug)]
pub struct RootBlocks;

impl PostEffect for RootBlocks {
    fn name(&self) -> &'static str {
        "root-blocks"
    }

    fn analyze(&self, doc: &Document) -> Vec<Mutation> {
        if doc.children.is_empty() {
            return vec![Mutation::InsertNode {
                path: Path::from([0]),
                node: Node::paragraph(""),
            }];
        }
        for (index, node) in doc.children.iter().enumerate() {
            let path = Path::from([index]);
            if node.is_inline() {
                return wrap(&path, node, ElementKind::Paragraph);
            }
            if node.kind() == Some(&ElementKind::ListItem) {
                return vec![set_kind(&path, ElementKind::ListItem, ElementKind::Paragraph)];
            }
        }
        vec![]
    }
}

/// Lists hold list items only; empty lists disappear.
#[derive(Debug)]
pub struct ListStructure;

impl PostEffect for ListStructure {
    fn name(&self) -> &'static str {
        "list-structure"
    }

    fn analyze(&self, doc: &Document) -> Vec<Mutation> {
        for (path, node) in doc.nodes() {
            if !node.kind().is_some_and(ElementKind::is_list_container) {
                continue;
            }
            let children = node.children().unwrap_or_default();
            if children.is_empty() {
                return vec![remove(&path, node)];
            }
            for (index, child) in children.iter().enumerate() {
                let child_path = path.child(index);
                match child.kind() {
                    Some(ElementKind::ListItem) => continue,
                    Some(kind) if kind.is_text_block() => {
                        return vec![set_kind(&child_path, kind.clone(), ElementKind::ListItem)];
                    }
                    Some(kind) if kind.is_list_container() => return lift(&child_path, child),
                    Some(kind) if kind.is_block() => {
                        // Block voids move out after the list
                        if let Some(after) = path.next() {
                            return vec![Mutation::MoveNode {
                                path: child_path,
                                new_path: after,
                            }];
                        }
                    }
                    _ => return wrap(&child_path, child, ElementKind::ListItem),
                }
            }
        }
        vec![]
    }
}

/// Text blocks hold leaves and inline elements; links hold leaves only.
#[derive(Debug)]
pub struct InlineContent;

impl PostEffect for InlineContent {
    fn name(&self) -> &'static str {
        "inline-content"
    }

    fn analyze(&self, doc: &Document) -> Vec<Mutation> {
        for (path, node) in doc.nodes() {
            let Some(kind) = node.kind() else {
                continue;
            };
            let children = node.children().unwrap_or_default();

            if kind.is_text_block() {
                for (index, child) in children.iter().enumerate() {
                    if !child.is_block() {
                        continue;
                    }
                    let child_path = path.child(index);
                    if child.is_void() {
                        if let Some(after) = path.next() {
                            return vec![Mutation::MoveNode {
                                path: child_path,
                                new_path: after,
                            }];
                        }
                    }
                    return lift(&child_path, child);
                }
            }

            if kind.is_inline() {
                for (index, child) in children.iter().enumerate() {
                    if child.is_text() {
                        continue;
                    }
                    let child_path = path.child(index);
                    return vec![
                        remove(&child_path, child),
                        Mutation::InsertNode {
                            path: child_path,
                            node: Node::text(child.string()),
                        },
                    ];
                }
            }
        }
        vec![]
    }
}

/// Images keep exactly one empty placeholder leaf; links need visible text.
#[derive(Debug)]
pub struct VoidChildren;

impl PostEffect for VoidChildren {
    fn name(&self) -> &'static str {
        "void-children"
    }

    fn analyze(&self, doc: &Document) -> Vec<Mutation> {
        for (path, node) in doc.nodes() {
            match node.kind() {
                Some(ElementKind::Image { .. }) => {
                    let children = node.children().unwrap_or_default();
                    if children == [Node::text("")] {
                        continue;
                    }
                    let mut fixes: Vec<Mutation> = children
                        .iter()
                        .enumerate()
                        .rev()
                        .map(|(index, child)| remove(&path.child(index), child))
                        .collect();
                    fixes.push(Mutation::InsertNode {
                        path: path.child(0),
                        node: Node::text(""),
                    });
                    return fixes;
                }
                Some(ElementKind::Link { .. }) if node.string().is_empty() => {
                    return vec![remove(&path, node)];
                }
                _ => {}
            }
        }
        vec![]
    }
}

/// Non-void elements keep at least one child.
#[derive(Debug)]
pub struct EnsureChildren;

impl PostEffect for EnsureChildren {
    fn name(&self) -> &'static str {
        "ensure-children"
    }

    fn analyze(&self, doc: &Document) -> Vec<Mutation> {
        for (path, node) in doc.nodes() {
            let Some(element) = node.as_element() else {
                continue;
            };
            if element.children.is_empty() && !element.kind.is_void() {
                return vec![Mutation::InsertNode {
                    path: path.child(0),
                    node: Node::text(""),
                }];
            }
        }
        vec![]
    }
}

/// Inline elements always have a leaf on each side to put the caret in.
#[derive(Debug)]
pub struct InlineSpacing;

impl PostEffect for InlineSpacing {
    fn name(&self) -> &'static str {
        "inline-spacing"
    }

    fn analyze(&self, doc: &Document) -> Vec<Mutation> {
        for (path, node) in doc.nodes() {
            if !node.kind().is_some_and(ElementKind::is_text_block) {
                continue;
            }
            let children = node.children().unwrap_or_default();
            for (index, child) in children.iter().enumerate() {
                if child.is_text() {
                    continue;
                }
                if index == 0 || !children[index - 1].is_text() {
                    return vec![spacer(path.child(index))];
                }
                if index + 1 == children.len() || !children[index + 1].is_text() {
                    return vec![spacer(path.child(index + 1))];
                }
            }
        }
        vec![]
    }
}

/// Adjacent leaves with equal marks merge; empty leaves next to another leaf
/// are dropped.
#[derive(Debug)]
pub struct MergeLeaves;

impl PostEffect for MergeLeaves {
    fn name(&self) -> &'static str {
        "merge-leaves"
    }

    fn analyze(&self, doc: &Document) -> Vec<Mutation> {
        for (path, node) in doc.nodes() {
            let Some(children) = node.children() else {
                continue;
            };
            for (index, pair) in children.windows(2).enumerate() {
                let (Node::Text(left), Node::Text(right)) = (&pair[0], &pair[1]) else {
                    continue;
                };
                let right_path = path.child(index + 1);
                if left.marks == right.marks {
                    return vec![Mutation::MergeNode {
                        path: right_path,
                        position: left.len(),
                        properties: NodeProperties::Text(right.marks),
                    }];
                }
                if right.is_empty() {
                    return vec![remove(&right_path, &pair[1])];
                }
                if left.is_empty() {
                    return vec![remove(&path.child(index), &pair[0])];
                }
            }
        }
        vec![]
    }
}

/// Ordered set of post-effects run after each transaction
#[derive(Debug, Default)]
pub struct PostEffectEngine {
    effects: Vec<Box<dyn PostEffect>>,
}

impl PostEffectEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The rules every document is kept to
    pub fn standard() -> Self {
        let mut engine = Self::new();
        engine.register(Box::new(RootBlocks));
        engine.register(Box::new(ListStructure));
        engine.register(Box::new(InlineContent));
        engine.register(Box::new(VoidChildren));
        engine.register(Box::new(EnsureChildren));
        engine.register(Box::new(InlineSpacing));
        engine.register(Box::new(MergeLeaves));
        engine
    }

    pub fn register(&mut self, effect: Box<dyn PostEffect>) {
        self.effects.push(effect);
    }

    /// The first effect with something to repair, and its repair
    pub fn next_fix(&self, doc: &Document) -> Option<(&'static str, Vec<Mutation>)> {
        self.effects.iter().find_map(|effect| {
            let fixes = effect.analyze(doc);
            (!fixes.is_empty()).then(|| (effect.name(), fixes))
        })
    }
}

fn remove(path: &Path, node: &Node) -> Mutation {
    Mutation::RemoveNode {
        path: path.clone(),
        node: node.clone(),
    }
}

fn spacer(path: Path) -> Mutation {
    Mutation::InsertNode {
        path,
        node: Node::marked("", Marks::default()),
    }
}

fn set_kind(path: &Path, from: ElementKind, to: ElementKind) -> Mutation {
    Mutation::SetNode {
        path: path.clone(),
        properties: NodeProperties::Element(from),
        new_properties: NodeProperties::Element(to),
    }
}

/// Replaces `node` with a `kind` element holding it.
fn wrap(path: &Path, node: &Node, kind: ElementKind) -> Vec<Mutation> {
    vec![
        remove(path, node),
        Mutation::InsertNode {
            path: path.clone(),
            node: Node::element(kind, vec![node.clone()]),
        },
    ]
}

/// Replaces `node` with its own children.
fn lift(path: &Path, node: &Node) -> Vec<Mutation> {
    let mut fixes = vec![remove(path, node)];
    if let (Some(parent), Some(index)) = (path.parent(), path.index()) {
        for (offset, child) in node.children().unwrap_or_default().iter().enumerate() {
            fixes.push(Mutation::InsertNode {
                path: parent.child(index + offset),
                node: child.clone(),
            });
        }
    }
    fixes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settle(mut doc: Document) -> Document {
        let engine = PostEffectEngine::standard();
        for _ in 0..100 {
            match engine.next_fix(&doc) {
                Some((_, fixes)) => {
                    for fix in fixes {
                        fix.apply(&mut doc).unwrap();
                    }
                }
                None => return doc,
            }
        }
        panic!("normalization did not settle");
    }

    #[test]
    fn test_empty_document_gets_paragraph() {
        assert_eq!(settle(Document::new(vec![])), Document::empty());
    }

    #[test]
    fn test_stray_text_at_root_is_wrapped() {
        let doc = settle(Document::new(vec![Node::text("loose")]));
        assert_eq!(doc, Document::new(vec![Node::paragraph("loose")]));
    }

    #[test]
    fn test_empty_list_is_removed() {
        let doc = settle(Document::new(vec![
            Node::paragraph("a"),
            Node::element(ElementKind::BulletedList, vec![]),
        ]));
        assert_eq!(doc, Document::new(vec![Node::paragraph("a")]));
    }

    #[test]
    fn test_paragraph_in_list_becomes_item() {
        let doc = settle(Document::new(vec![Node::element(
            ElementKind::NumberedList,
            vec![Node::paragraph("x")],
        )]));
        assert_eq!(
            doc.get(&Path::from([0, 0])).unwrap().kind(),
            Some(&ElementKind::ListItem)
        );
    }

    #[test]
    fn test_image_placeholder_is_restored() {
        let doc = settle(Document::new(vec![Node::element(
            ElementKind::image("a.png", ""),
            vec![Node::text("typed"), Node::text("more")],
        )]));
        assert_eq!(doc.children[0], Node::image("a.png", ""));
    }

    #[test]
    fn test_link_gets_spacers_and_empty_link_is_dropped() {
        let doc = settle(Document::new(vec![Node::element(
            ElementKind::Paragraph,
            vec![Node::link("https://a.dev", "a"), Node::link("https://b.dev", "")],
        )]));
        let children = doc.children[0].children().unwrap();
        assert_eq!(children.len(), 3);
        assert!(children[0].is_text());
        assert_eq!(children[1].kind(), Some(&ElementKind::link("https://a.dev")));
        assert!(children[2].is_text());
    }

    #[test]
    fn test_adjacent_leaves_merge() {
        let doc = settle(Document::new(vec![Node::element(
            ElementKind::Paragraph,
            vec![Node::text("a"), Node::text("b"), Node::text("")],
        )]));
        assert_eq!(doc, Document::new(vec![Node::paragraph("ab")]));
    }

    #[test]
    fn test_nested_paragraph_is_lifted() {
        let doc = settle(Document::new(vec![Node::element(
            ElementKind::BlockQuote,
            vec![Node::paragraph("inner")],
        )]));
        assert_eq!(
            doc,
            Document::new(vec![Node::element(ElementKind::BlockQuote, vec![Node::text("inner")])])
        );
    }
}
