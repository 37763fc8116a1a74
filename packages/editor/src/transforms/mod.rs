//! # Transforms
//!
//! The editing operations exposed by [`Editor`], each one a transaction
//! built from [`Mutation`]s:
//!
//! - `nodes`: set node type, wrap, unwrap, insert and remove nodes
//! - `text`: typing, breaks, deletion
//! - `selection`: caret movement
//! - `format`: mark and block toggles
//!
//! Public operations return `false` when their location no longer resolves
//! and nothing was changed. The helpers in this module are the shared
//! building blocks: they emit mutations and let the transaction carry the
//! selection along.

mod format;
mod nodes;
mod selection;
mod text;

pub use format::BlockFormat;
pub use nodes::InsertAt;

use crate::editor::Editor;
use crate::mutations::{Mutation, MutationError, MutationResult, NodeProperties};
use lectern_model::{ElementKind, Node, Path, Point, Text};

pub(crate) fn parent_and_index(path: &Path) -> MutationResult<(Path, usize)> {
    path.parent()
        .zip(path.index())
        .ok_or_else(|| MutationError::InvalidStructure("the root cannot be addressed".to_string()))
}

impl Editor {
    pub(crate) fn node(&self, path: &Path) -> MutationResult<Node> {
        self.document()
            .get(path)
            .cloned()
            .ok_or_else(|| MutationError::NodeNotFound(path.clone()))
    }

    pub(crate) fn leaf(&self, path: &Path) -> MutationResult<Text> {
        self.document()
            .text(path)
            .cloned()
            .ok_or_else(|| MutationError::NotText(path.clone()))
    }

    pub(crate) fn child_count(&self, path: &Path) -> MutationResult<usize> {
        self.document()
            .children_at(path)
            .map(<[Node]>::len)
            .ok_or_else(|| MutationError::NotAnElement(path.clone()))
    }

    pub(crate) fn remove_at(&mut self, path: &Path) -> MutationResult<()> {
        let node = self.node(path)?;
        self.apply(Mutation::RemoveNode {
            path: path.clone(),
            node,
        })
    }

    pub(crate) fn insert_at(&mut self, path: Path, node: Node) -> MutationResult<()> {
        self.apply(Mutation::InsertNode { path, node })
    }

    /// Sets the kind of a non-void element. Returns whether anything changed.
    pub(crate) fn set_kind(&mut self, path: &Path, kind: ElementKind) -> MutationResult<bool> {
        let node = self.node(path)?;
        let current = node
            .kind()
            .ok_or_else(|| MutationError::NotAnElement(path.clone()))?;
        if current.is_void() || *current == kind {
            return Ok(false);
        }
        self.apply(Mutation::SetNode {
            path: path.clone(),
            properties: NodeProperties::Element(current.clone()),
            new_properties: NodeProperties::Element(kind),
        })?;
        Ok(true)
    }

    /// Splits the leaf at `point` unless the point is on one of its edges.
    /// Returns the index, among the leaf's siblings, of the first node after
    /// the point.
    pub(crate) fn split_leaf(&mut self, point: &Point) -> MutationResult<usize> {
        let leaf = self.leaf(&point.path)?;
        let (_, index) = parent_and_index(&point.path)?;
        if point.offset == 0 {
            return Ok(index);
        }
        if point.offset < leaf.len() {
            self.apply(Mutation::SplitNode {
                path: point.path.clone(),
                position: point.offset,
                properties: NodeProperties::Text(leaf.marks),
            })?;
        }
        Ok(index + 1)
    }

    /// Splits every element from the leaf at `point` up to `top` where the
    /// point is not already on an edge. Returns the path, next to `top`,
    /// where a node now fits between the two halves.
    pub(crate) fn split_up_to(&mut self, point: &Point, top: &Path) -> MutationResult<Path> {
        if !top.is_ancestor_of(&point.path) {
            return Err(MutationError::InvalidStructure(format!(
                "{} is not inside {}",
                point, top
            )));
        }
        let mut index = self.split_leaf(point)?;
        let (mut current, _) = parent_and_index(&point.path)?;
        loop {
            let size = self.child_count(&current)?;
            let (parent, position) = parent_and_index(&current)?;
            let next = if index == 0 {
                position
            } else if index >= size {
                position + 1
            } else {
                let kind = self
                    .node(&current)?
                    .kind()
                    .cloned()
                    .ok_or_else(|| MutationError::NotAnElement(current.clone()))?;
                self.apply(Mutation::SplitNode {
                    path: current.clone(),
                    position: index,
                    properties: NodeProperties::Element(kind),
                })?;
                position + 1
            };
            if &current == top {
                return Ok(parent.child(next));
            }
            index = next;
            current = parent;
        }
    }

    /// Moves children `first..=last` of `target` up into its parent, in
    /// place, splitting `target` around them. Siblings outside the span stay
    /// wrapped.
    pub(crate) fn lift_children(&mut self, target: &Path, first: usize, last: usize) -> MutationResult<()> {
        let node = self.node(target)?;
        let kind = node
            .kind()
            .cloned()
            .ok_or_else(|| MutationError::NotAnElement(target.clone()))?;
        let size = node.children().map(<[Node]>::len).unwrap_or_default();
        if first > last || last >= size {
            return Err(MutationError::InvalidStructure(format!(
                "cannot lift children {}..={} of {}",
                first, last, target
            )));
        }

        if last + 1 < size {
            self.apply(Mutation::SplitNode {
                path: target.clone(),
                position: last + 1,
                properties: NodeProperties::Element(kind.clone()),
            })?;
        }
        let target = if first > 0 {
            self.apply(Mutation::SplitNode {
                path: target.clone(),
                position: first,
                properties: NodeProperties::Element(kind),
            })?;
            target
                .next()
                .ok_or_else(|| MutationError::InvalidStructure("the root cannot be split".to_string()))?
        } else {
            target.clone()
        };

        let (parent, index) = parent_and_index(&target)?;
        let count = last - first + 1;
        for offset in 0..count {
            let wrapper = parent.child(index + offset);
            self.apply(Mutation::MoveNode {
                path: wrapper.child(0),
                new_path: wrapper,
            })?;
        }
        self.remove_at(&parent.child(index + count))
    }

    /// Appends the children of `from` to `into` and removes the emptied
    /// `from`.
    pub(crate) fn move_children_into(&mut self, from: &Path, into: &Path) -> MutationResult<()> {
        let count = self.child_count(from)?;
        let base = self.child_count(into)?;
        for offset in 0..count {
            self.apply(Mutation::MoveNode {
                path: from.child(0),
                new_path: into.child(base + offset),
            })?;
        }
        self.remove_at(from)
    }

    /// Makes sure the first child of `block` is a leaf and returns the
    /// block's start.
    pub(crate) fn ensure_leading_leaf(&mut self, block: &Path) -> MutationResult<Point> {
        let first = block.child(0);
        if !self.document().get(&first).is_some_and(Node::is_text) {
            self.insert_at(first.clone(), Node::text(""))?;
        }
        Ok(Point::new(first, 0))
    }

    /// The caret position right after the inline node at `path`, inserting
    /// an empty leaf there when needed.
    pub(crate) fn point_after_inline(&mut self, path: &Path) -> MutationResult<Point> {
        let next = path
            .next()
            .ok_or_else(|| MutationError::InvalidStructure("the root has no siblings".to_string()))?;
        if !self.document().get(&next).is_some_and(Node::is_text) {
            self.insert_at(next.clone(), Node::text(""))?;
        }
        Ok(Point::new(next, 0))
    }
}
