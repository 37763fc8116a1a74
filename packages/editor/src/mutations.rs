//! # Mutations
//!
//! The low-level operations every editing transform is built from.
//!
//! ## Design Principles
//!
//! 1. **Validated**: each mutation checks its location before touching the tree
//! 2. **Invertible**: every mutation carries enough state to build its inverse
//! 3. **Path-transforming**: a mutation knows how it shifts any other path or
//!    point, so selections and references follow structural changes
//!
//! ## Mutation Semantics
//!
//! ### SplitNode / MergeNode
//! - Split keeps `[0, position)` in place and inserts the remainder as the
//!   next sibling, carrying `properties`
//! - Merge appends the node at `path` into its previous sibling; `position`
//!   is the previous sibling's length before the merge
//!
//! ### MoveNode
//! - `new_path` is where the node ends up, measured in the tree with the node
//!   already removed; the inverse is the same move with the paths swapped

use lectern_model::{Document, ElementKind, Marks, Node, Path, Point, Text};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Properties a split/set mutation carries: an element's kind or a leaf's marks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeProperties {
    Element(ElementKind),
    Text(Marks),
}

impl NodeProperties {
    pub fn of(node: &Node) -> Self {
        match node {
            Node::Element(element) => Self::Element(element.kind.clone()),
            Node::Text(text) => Self::Text(text.marks),
        }
    }
}

/// Tie-break for a point sitting exactly where text is inserted or a node is
/// split: `Forward` moves with the new content, `Backward` stays behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affinity {
    Forward,
    Backward,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    InsertNode {
        path: Path,
        node: Node,
    },

    RemoveNode {
        path: Path,
        node: Node,
    },

    InsertText {
        path: Path,
        offset: usize,
        text: String,
    },

    RemoveText {
        path: Path,
        offset: usize,
        text: String,
    },

    SplitNode {
        path: Path,
        position: usize,
        properties: NodeProperties,
    },

    MergeNode {
        path: Path,
        position: usize,
        properties: NodeProperties,
    },

    MoveNode {
        path: Path,
        new_path: Path,
    },

    SetNode {
        path: Path,
        properties: NodeProperties,
        new_properties: NodeProperties,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Node not found: {0}")]
    NodeNotFound(Path),

    #[error("Parent not found: {0}")]
    ParentNotFound(Path),

    #[error("Node is not text: {0}")]
    NotText(Path),

    #[error("Node is not an element: {0}")]
    NotAnElement(Path),

    #[error("Offset {offset} out of range at {path}")]
    OffsetOutOfRange { path: Path, offset: usize },

    #[error("Text at {0} does not match the mutation")]
    TextMismatch(Path),

    #[error("Invalid structure: {0}")]
    InvalidStructure(String),
}

pub type MutationResult<T> = Result<T, MutationError>;

impl Mutation {
    pub fn path(&self) -> &Path {
        match self {
            Self::InsertNode { path, .. }
            | Self::RemoveNode { path, .. }
            | Self::InsertText { path, .. }
            | Self::RemoveText { path, .. }
            | Self::SplitNode { path, .. }
            | Self::MergeNode { path, .. }
            | Self::MoveNode { path, .. }
            | Self::SetNode { path, .. } => path,
        }
    }

    /// Apply mutation to the document with validation
    pub fn apply(&self, doc: &mut Document) -> MutationResult<()> {
        self.validate(doc)?;

        match self {
            Self::InsertNode { path, node } => Self::apply_insert_node(doc, path, node.clone()),
            Self::RemoveNode { path, .. } => Self::apply_remove_node(doc, path).map(|_| ()),
            Self::InsertText { path, offset, text } => {
                let leaf = text_mut(doc, path)?;
                let at = leaf.byte_index(*offset);
                leaf.text.insert_str(at, text);
                Ok(())
            }
            Self::RemoveText { path, offset, text } => {
                let leaf = text_mut(doc, path)?;
                let start = leaf.byte_index(*offset);
                let end = leaf.byte_index(offset + text.chars().count());
                leaf.text.replace_range(start..end, "");
                Ok(())
            }
            Self::SplitNode {
                path,
                position,
                properties,
            } => Self::apply_split(doc, path, *position, properties),
            Self::MergeNode { path, .. } => Self::apply_merge(doc, path),
            Self::MoveNode { path, new_path } => Self::apply_move(doc, path, new_path),
            Self::SetNode {
                path,
                new_properties,
                ..
            } => Self::apply_set(doc, path, new_properties),
        }
    }

    /// Validate mutation without applying
    pub fn validate(&self, doc: &Document) -> MutationResult<()> {
        match self {
            Self::InsertNode { path, .. } => {
                let (parent, index) = split_path(path)?;
                let siblings = doc
                    .children_at(&parent)
                    .ok_or(MutationError::ParentNotFound(parent))?;
                if index > siblings.len() {
                    return Err(MutationError::OffsetOutOfRange {
                        path: path.clone(),
                        offset: index,
                    });
                }
                Ok(())
            }

            Self::RemoveNode { path, .. } => node_at(doc, path).map(|_| ()),

            Self::InsertText { path, offset, .. } => {
                let leaf = text_at(doc, path)?;
                if *offset > leaf.len() {
                    return Err(MutationError::OffsetOutOfRange {
                        path: path.clone(),
                        offset: *offset,
                    });
                }
                Ok(())
            }

            Self::RemoveText { path, offset, text } => {
                let leaf = text_at(doc, path)?;
                let end = offset + text.chars().count();
                if end > leaf.len() {
                    return Err(MutationError::OffsetOutOfRange {
                        path: path.clone(),
                        offset: end,
                    });
                }
                if leaf.slice(*offset, end) != text {
                    return Err(MutationError::TextMismatch(path.clone()));
                }
                Ok(())
            }

            Self::SplitNode {
                path,
                position,
                properties,
            } => {
                split_path(path)?;
                let size = match (node_at(doc, path)?, properties) {
                    (Node::Text(leaf), NodeProperties::Text(_)) => leaf.len(),
                    (Node::Element(element), NodeProperties::Element(_)) => element.children.len(),
                    _ => {
                        return Err(MutationError::InvalidStructure(format!(
                            "split properties do not match node at {}",
                            path
                        )))
                    }
                };
                if *position > size {
                    return Err(MutationError::OffsetOutOfRange {
                        path: path.clone(),
                        offset: *position,
                    });
                }
                Ok(())
            }

            Self::MergeNode { path, position, .. } => {
                let node = node_at(doc, path)?;
                let previous_path = path.previous().ok_or_else(|| {
                    MutationError::InvalidStructure(format!("{} has no previous sibling", path))
                })?;
                let size = match (node_at(doc, &previous_path)?, node) {
                    (Node::Text(prev), Node::Text(_)) => prev.len(),
                    (Node::Element(prev), Node::Element(_)) => prev.children.len(),
                    _ => {
                        return Err(MutationError::InvalidStructure(format!(
                            "cannot merge {} into a node of another type",
                            path
                        )))
                    }
                };
                if size != *position {
                    return Err(MutationError::OffsetOutOfRange {
                        path: previous_path,
                        offset: *position,
                    });
                }
                Ok(())
            }

            Self::MoveNode { path, new_path } => {
                node_at(doc, path)?;
                let (parent, index) = split_path(new_path)?;
                // new_path is measured after removal; map its parent back
                let original_parent = if path.ends_at_or_before(&parent) {
                    bump(&parent, path.len() - 1, 1)
                } else {
                    parent.clone()
                };
                let mut size = doc
                    .children_at(&original_parent)
                    .ok_or(MutationError::ParentNotFound(parent))?
                    .len();
                if path.parent().as_ref() == Some(&original_parent) {
                    size -= 1;
                }
                if index > size {
                    return Err(MutationError::OffsetOutOfRange {
                        path: new_path.clone(),
                        offset: index,
                    });
                }
                Ok(())
            }

            Self::SetNode {
                path,
                new_properties,
                ..
            } => match (node_at(doc, path)?, new_properties) {
                (Node::Element(_), NodeProperties::Element(_)) => Ok(()),
                (Node::Text(_), NodeProperties::Text(_)) => Ok(()),
                (Node::Text(_), NodeProperties::Element(_)) => {
                    Err(MutationError::NotAnElement(path.clone()))
                }
                (Node::Element(_), NodeProperties::Text(_)) => {
                    Err(MutationError::NotText(path.clone()))
                }
            },
        }
    }

    /// The mutation that undoes this one.
    pub fn inverse(&self) -> MutationResult<Mutation> {
        Ok(match self {
            Self::InsertNode { path, node } => Self::RemoveNode {
                path: path.clone(),
                node: node.clone(),
            },
            Self::RemoveNode { path, node } => Self::InsertNode {
                path: path.clone(),
                node: node.clone(),
            },
            Self::InsertText { path, offset, text } => Self::RemoveText {
                path: path.clone(),
                offset: *offset,
                text: text.clone(),
            },
            Self::RemoveText { path, offset, text } => Self::InsertText {
                path: path.clone(),
                offset: *offset,
                text: text.clone(),
            },
            Self::SplitNode {
                path,
                position,
                properties,
            } => Self::MergeNode {
                path: path.next().ok_or_else(|| root_error(path))?,
                position: *position,
                properties: properties.clone(),
            },
            Self::MergeNode {
                path,
                position,
                properties,
            } => Self::SplitNode {
                path: path.previous().ok_or_else(|| root_error(path))?,
                position: *position,
                properties: properties.clone(),
            },
            Self::MoveNode { path, new_path } => Self::MoveNode {
                path: new_path.clone(),
                new_path: path.clone(),
            },
            Self::SetNode {
                path,
                properties,
                new_properties,
            } => Self::SetNode {
                path: path.clone(),
                properties: new_properties.clone(),
                new_properties: properties.clone(),
            },
        })
    }

    /// Where `p` ends up once this mutation is applied; `None` if removed.
    pub fn transform_path(&self, p: &Path) -> Option<Path> {
        match self {
            Self::InsertNode { path, .. } => Some(shift_for_insert(p, path)),

            Self::RemoveNode { path, .. } => {
                if path.contains(p) {
                    None
                } else {
                    Some(shift_for_remove(p, path))
                }
            }

            Self::InsertText { .. } | Self::RemoveText { .. } | Self::SetNode { .. } => {
                Some(p.clone())
            }

            Self::SplitNode { path, position, .. } => {
                let depth = path.len();
                if p == path {
                    Some(p.clone())
                } else if path.ends_before(p) {
                    Some(bump(p, depth - 1, 1))
                } else if path.is_ancestor_of(p) && p[depth] >= *position {
                    let mut indices = p.to_vec();
                    indices[depth - 1] += 1;
                    indices[depth] -= position;
                    Some(Path::new(indices))
                } else {
                    Some(p.clone())
                }
            }

            Self::MergeNode { path, position, .. } => {
                let depth = path.len();
                if path.contains(p) {
                    let mut indices = p.to_vec();
                    indices[depth - 1] -= 1;
                    if p.len() > depth {
                        indices[depth] += position;
                    }
                    Some(Path::new(indices))
                } else if path.ends_before(p) {
                    Some(bump(p, depth - 1, -1))
                } else {
                    Some(p.clone())
                }
            }

            Self::MoveNode { path, new_path } => {
                if path.contains(p) {
                    Some(new_path.join(&p[path.len()..]))
                } else {
                    Some(shift_for_insert(&shift_for_remove(p, path), new_path))
                }
            }
        }
    }

    /// Where `point` ends up once this mutation is applied. Points inside a
    /// removed node yield `None`; the editor relocates those itself.
    pub fn transform_point(&self, point: &Point, affinity: Affinity) -> Option<Point> {
        match self {
            Self::InsertText { path, offset, text } if &point.path == path => {
                let moves = *offset < point.offset
                    || (*offset == point.offset && affinity == Affinity::Forward);
                let shift = if moves { text.chars().count() } else { 0 };
                Some(Point::new(path.clone(), point.offset + shift))
            }

            Self::RemoveText { path, offset, text } if &point.path == path => {
                let mut next = point.clone();
                if point.offset > *offset {
                    next.offset -= (point.offset - offset).min(text.chars().count());
                }
                Some(next)
            }

            Self::SplitNode { path, position, .. } if &point.path == path => {
                let moves = *position < point.offset
                    || (*position == point.offset && affinity == Affinity::Forward);
                if moves {
                    Some(Point::new(path.next()?, point.offset - position))
                } else {
                    Some(point.clone())
                }
            }

            Self::MergeNode { path, position, .. } if &point.path == path => {
                Some(Point::new(path.previous()?, point.offset + position))
            }

            _ => Some(Point::new(self.transform_path(&point.path)?, point.offset)),
        }
    }

    fn apply_insert_node(doc: &mut Document, path: &Path, node: Node) -> MutationResult<()> {
        let (parent, index) = split_path(path)?;
        let siblings = doc
            .children_at_mut(&parent)
            .ok_or(MutationError::ParentNotFound(parent))?;
        if index > siblings.len() {
            return Err(MutationError::OffsetOutOfRange {
                path: path.clone(),
                offset: index,
            });
        }
        siblings.insert(index, node);
        Ok(())
    }

    fn apply_remove_node(doc: &mut Document, path: &Path) -> MutationResult<Node> {
        let (parent, index) = split_path(path)?;
        let siblings = doc
            .children_at_mut(&parent)
            .ok_or(MutationError::ParentNotFound(parent))?;
        if index >= siblings.len() {
            return Err(MutationError::NodeNotFound(path.clone()));
        }
        Ok(siblings.remove(index))
    }

    fn apply_split(
        doc: &mut Document,
        path: &Path,
        position: usize,
        properties: &NodeProperties,
    ) -> MutationResult<()> {
        let node = doc
            .get_mut(path)
            .ok_or_else(|| MutationError::NodeNotFound(path.clone()))?;
        let right = match (node, properties) {
            (Node::Text(leaf), NodeProperties::Text(marks)) => {
                let at = leaf.byte_index(position);
                Node::marked(leaf.text.split_off(at), *marks)
            }
            (Node::Element(element), NodeProperties::Element(kind)) => {
                Node::element(kind.clone(), element.children.split_off(position))
            }
            _ => {
                return Err(MutationError::InvalidStructure(format!(
                    "split properties do not match node at {}",
                    path
                )))
            }
        };
        let next = path.next().ok_or_else(|| root_error(path))?;
        Self::apply_insert_node(doc, &next, right)
    }

    fn apply_merge(doc: &mut Document, path: &Path) -> MutationResult<()> {
        let previous_path = path.previous().ok_or_else(|| root_error(path))?;
        let node = Self::apply_remove_node(doc, path)?;
        let previous = doc
            .get_mut(&previous_path)
            .ok_or_else(|| MutationError::NodeNotFound(previous_path.clone()))?;
        match (previous, node) {
            (Node::Text(prev), Node::Text(leaf)) => prev.text.push_str(&leaf.text),
            (Node::Element(prev), Node::Element(element)) => prev.children.extend(element.children),
            _ => {
                return Err(MutationError::InvalidStructure(format!(
                    "cannot merge {} into a node of another type",
                    path
                )))
            }
        }
        Ok(())
    }

    fn apply_move(doc: &mut Document, path: &Path, new_path: &Path) -> MutationResult<()> {
        let node = Self::apply_remove_node(doc, path)?;
        if let Err(err) = Self::apply_insert_node(doc, new_path, node.clone()) {
            Self::apply_insert_node(doc, path, node)?;
            return Err(err);
        }
        Ok(())
    }

    fn apply_set(doc: &mut Document, path: &Path, properties: &NodeProperties) -> MutationResult<()> {
        let node = doc
            .get_mut(path)
            .ok_or_else(|| MutationError::NodeNotFound(path.clone()))?;
        match (node, properties) {
            (Node::Element(element), NodeProperties::Element(kind)) => element.kind = kind.clone(),
            (Node::Text(leaf), NodeProperties::Text(marks)) => leaf.marks = *marks,
            (Node::Text(_), _) => return Err(MutationError::NotAnElement(path.clone())),
            (Node::Element(_), _) => return Err(MutationError::NotText(path.clone())),
        }
        Ok(())
    }
}

fn root_error(path: &Path) -> MutationError {
    MutationError::InvalidStructure(format!("'{}' has no siblings", path))
}

fn split_path(path: &Path) -> MutationResult<(Path, usize)> {
    path.parent()
        .zip(path.index())
        .ok_or_else(|| MutationError::InvalidStructure("the root cannot be addressed".to_string()))
}

fn node_at<'a>(doc: &'a Document, path: &Path) -> MutationResult<&'a Node> {
    doc.get(path)
        .ok_or_else(|| MutationError::NodeNotFound(path.clone()))
}

fn text_at<'a>(doc: &'a Document, path: &Path) -> MutationResult<&'a Text> {
    node_at(doc, path)?
        .as_text()
        .ok_or_else(|| MutationError::NotText(path.clone()))
}

fn text_mut<'a>(doc: &'a mut Document, path: &Path) -> MutationResult<&'a mut Text> {
    doc.get_mut(path)
        .ok_or_else(|| MutationError::NodeNotFound(path.clone()))?
        .as_text_mut()
        .ok_or_else(|| MutationError::NotText(path.clone()))
}

fn bump(p: &Path, depth: usize, delta: isize) -> Path {
    let mut indices = p.to_vec();
    indices[depth] = indices[depth].saturating_add_signed(delta);
    Path::new(indices)
}

fn shift_for_insert(p: &Path, inserted: &Path) -> Path {
    if inserted.ends_at_or_before(p) {
        bump(p, inserted.len() - 1, 1)
    } else {
        p.clone()
    }
}

fn shift_for_remove(p: &Path, removed: &Path) -> Path {
    if removed.ends_before(p) {
        bump(p, removed.len() - 1, -1)
    } else {
        p.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectern_model::Mark;

    fn doc() -> Document {
        Document::new(vec![
            Node::paragraph("Hello world"),
            Node::element(
                ElementKind::BulletedList,
                vec![
                    Node::element(ElementKind::ListItem, vec![Node::text("one")]),
                    Node::element(ElementKind::ListItem, vec![Node::text("two")]),
                ],
            ),
        ])
    }

    fn apply_and_invert(mutation: Mutation) {
        let original = doc();
        let mut edited = original.clone();
        mutation.apply(&mut edited).unwrap();
        assert_ne!(edited, original);
        mutation.inverse().unwrap().apply(&mut edited).unwrap();
        assert_eq!(edited, original);
    }

    #[test]
    fn test_insert_and_remove_text() {
        let mut d = doc();
        Mutation::InsertText {
            path: Path::from([0, 0]),
            offset: 5,
            text: ",".to_string(),
        }
        .apply(&mut d)
        .unwrap();
        assert_eq!(d.text(&Path::from([0, 0])).unwrap().text, "Hello, world");

        Mutation::RemoveText {
            path: Path::from([0, 0]),
            offset: 0,
            text: "Hello".to_string(),
        }
        .apply(&mut d)
        .unwrap();
        assert_eq!(d.text(&Path::from([0, 0])).unwrap().text, ", world");
    }

    #[test]
    fn test_remove_text_must_match() {
        let mut d = doc();
        let result = Mutation::RemoveText {
            path: Path::from([0, 0]),
            offset: 0,
            text: "Jello".to_string(),
        }
        .apply(&mut d);
        assert_eq!(result, Err(MutationError::TextMismatch(Path::from([0, 0]))));
        assert_eq!(d, doc());
    }

    #[test]
    fn test_stale_paths_fail_validation() {
        let d = doc();
        let stale = Mutation::SetNode {
            path: Path::from([7]),
            properties: NodeProperties::Element(ElementKind::Paragraph),
            new_properties: NodeProperties::Element(ElementKind::HeadingOne),
        };
        assert_eq!(stale.validate(&d), Err(MutationError::NodeNotFound(Path::from([7]))));

        let wrong_type = Mutation::InsertText {
            path: Path::from([1, 0]),
            offset: 0,
            text: "x".to_string(),
        };
        assert_eq!(wrong_type.validate(&d), Err(MutationError::NotText(Path::from([1, 0]))));
    }

    #[test]
    fn test_split_text_and_element() {
        let mut d = doc();
        Mutation::SplitNode {
            path: Path::from([0, 0]),
            position: 5,
            properties: NodeProperties::Text(Marks::default()),
        }
        .apply(&mut d)
        .unwrap();
        assert_eq!(d.text(&Path::from([0, 1])).unwrap().text, " world");

        Mutation::SplitNode {
            path: Path::from([0]),
            position: 1,
            properties: NodeProperties::Element(ElementKind::Paragraph),
        }
        .apply(&mut d)
        .unwrap();
        assert_eq!(d.children.len(), 3);
        assert_eq!(d.get(&Path::from([1])).unwrap().string(), " world");
    }

    #[test]
    fn test_inverses_restore_document() {
        apply_and_invert(Mutation::InsertNode {
            path: Path::from([1]),
            node: Node::paragraph("new"),
        });
        apply_and_invert(Mutation::RemoveNode {
            path: Path::from([1, 0]),
            node: Node::element(ElementKind::ListItem, vec![Node::text("one")]),
        });
        apply_and_invert(Mutation::SplitNode {
            path: Path::from([1]),
            position: 1,
            properties: NodeProperties::Element(ElementKind::BulletedList),
        });
        apply_and_invert(Mutation::MoveNode {
            path: Path::from([1, 1]),
            new_path: Path::from([0]),
        });
        apply_and_invert(Mutation::SetNode {
            path: Path::from([0, 0]),
            properties: NodeProperties::Text(Marks::default()),
            new_properties: NodeProperties::Text(Marks::default().with(Mark::Bold)),
        });
    }

    #[test]
    fn test_move_into_next_sibling() {
        let mut d = doc();
        // [0] moves into what was [1], which sits at [0] once [0] is gone
        Mutation::MoveNode {
            path: Path::from([0]),
            new_path: Path::from([0, 0]),
        }
        .apply(&mut d)
        .unwrap();
        assert_eq!(d.children.len(), 1);
        assert_eq!(d.get(&Path::from([0, 0])).unwrap().string(), "Hello world");
    }

    #[test]
    fn test_move_into_own_subtree_is_rejected() {
        // Once [1] is removed there is no [1, 0] left to move into
        let d = doc();
        let mutation = Mutation::MoveNode {
            path: Path::from([1]),
            new_path: Path::from([1, 0, 0]),
        };
        assert_eq!(mutation.validate(&d), Err(MutationError::ParentNotFound(Path::from([1, 0]))));
    }

    #[test]
    fn test_transform_path() {
        let insert = Mutation::InsertNode {
            path: Path::from([1]),
            node: Node::paragraph(""),
        };
        assert_eq!(insert.transform_path(&Path::from([1, 0])), Some(Path::from([2, 0])));
        assert_eq!(insert.transform_path(&Path::from([0, 0])), Some(Path::from([0, 0])));

        let remove = Mutation::RemoveNode {
            path: Path::from([0]),
            node: Node::paragraph(""),
        };
        assert_eq!(remove.transform_path(&Path::from([0, 0])), None);
        assert_eq!(remove.transform_path(&Path::from([1, 1])), Some(Path::from([0, 1])));

        let split = Mutation::SplitNode {
            path: Path::from([1]),
            position: 1,
            properties: NodeProperties::Element(ElementKind::BulletedList),
        };
        assert_eq!(split.transform_path(&Path::from([1, 1, 0])), Some(Path::from([2, 0, 0])));
        assert_eq!(split.transform_path(&Path::from([1, 0, 0])), Some(Path::from([1, 0, 0])));

        let merge = Mutation::MergeNode {
            path: Path::from([2]),
            position: 1,
            properties: NodeProperties::Element(ElementKind::BulletedList),
        };
        assert_eq!(merge.transform_path(&Path::from([2, 0, 0])), Some(Path::from([1, 1, 0])));

        let mv = Mutation::MoveNode {
            path: Path::from([0]),
            new_path: Path::from([1]),
        };
        assert_eq!(mv.transform_path(&Path::from([0, 0])), Some(Path::from([1, 0])));
        assert_eq!(mv.transform_path(&Path::from([1, 0])), Some(Path::from([0, 0])));
    }

    #[test]
    fn test_transform_point_affinity() {
        let insert = Mutation::InsertText {
            path: Path::from([0, 0]),
            offset: 2,
            text: "ab".to_string(),
        };
        let at = Point::new([0, 0], 2);
        assert_eq!(insert.transform_point(&at, Affinity::Forward), Some(Point::new([0, 0], 4)));
        assert_eq!(insert.transform_point(&at, Affinity::Backward), Some(at.clone()));

        let split = Mutation::SplitNode {
            path: Path::from([0, 0]),
            position: 2,
            properties: NodeProperties::Text(Marks::default()),
        };
        assert_eq!(split.transform_point(&Point::new([0, 0], 5), Affinity::Forward), Some(Point::new([0, 1], 3)));
        assert_eq!(split.transform_point(&at, Affinity::Backward), Some(at));

        let merge = Mutation::MergeNode {
            path: Path::from([0, 1]),
            position: 2,
            properties: NodeProperties::Text(Marks::default()),
        };
        assert_eq!(merge.transform_point(&Point::new([0, 1], 3), Affinity::Forward), Some(Point::new([0, 0], 5)));
    }

    #[test]
    fn test_mutation_serialization() {
        let mutation = Mutation::InsertText {
            path: Path::from([0, 0]),
            offset: 3,
            text: "abc".to_string(),
        };
        let json = serde_json::to_string(&mutation).unwrap();
        assert!(json.contains("\"op\":\"insert_text\""));
        let back: Mutation = serde_json::from_str(&json).unwrap();
        assert_eq!(mutation, back);
    }
}
