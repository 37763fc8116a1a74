//! Read-only lookups over the document and the current selection.

use crate::editor::Editor;
use lectern_model::{Document, ElementKind, Mark, Marks, Node, Path, Point, Range, Text};
use std::cmp::Ordering;

/// True when the node at `path` overlaps `[start, end]` in document order.
pub(crate) fn intersects(path: &Path, start: &Point, end: &Point) -> bool {
    path.compare(&start.path) != Ordering::Less && path.compare(&end.path) != Ordering::Greater
}

/// Nearest text block containing `path` (the node itself included).
pub(crate) fn text_block_above(doc: &Document, path: &Path) -> Option<Path> {
    let mut candidates = path.ancestors();
    candidates.push(path.clone());
    candidates
        .into_iter()
        .rev()
        .find(|p| doc.get(p).and_then(Node::kind).is_some_and(ElementKind::is_text_block))
}

/// Text blocks overlapping `range`, in document order.
pub(crate) fn text_blocks_in(doc: &Document, range: &Range) -> Vec<Path> {
    let (start, end) = range.edges();
    doc.nodes()
        .into_iter()
        .filter(|(path, node)| {
            node.kind().is_some_and(ElementKind::is_text_block) && intersects(path, &start, &end)
        })
        .map(|(path, _)| path)
        .collect()
}

/// Elements overlapping `range` that satisfy `matches`, in document order.
pub(crate) fn elements_in<F>(doc: &Document, range: &Range, matches: F) -> Vec<Path>
where
    F: Fn(&ElementKind) -> bool,
{
    let (start, end) = range.edges();
    doc.nodes()
        .into_iter()
        .filter(|(path, node)| node.kind().is_some_and(&matches) && intersects(path, &start, &end))
        .map(|(path, _)| path)
        .collect()
}

/// Editable leaves of the subtree at `path`.
pub(crate) fn leaves_under<'a>(doc: &'a Document, path: &Path) -> Vec<(Path, &'a Text)> {
    doc.editable_leaves()
        .into_iter()
        .filter(|(leaf, _)| path.contains(leaf))
        .collect()
}

pub(crate) fn block_start(doc: &Document, block: &Path) -> Option<Point> {
    leaves_under(doc, block)
        .into_iter()
        .next()
        .map(|(path, _)| Point::new(path, 0))
}

pub(crate) fn block_end(doc: &Document, block: &Path) -> Option<Point> {
    leaves_under(doc, block)
        .into_iter()
        .last()
        .map(|(path, text)| Point::new(path, text.len()))
}

/// Pulls the end of an expanded range back out of a block it only touches at
/// offset zero of that block's first leaf.
pub(crate) fn unhang(doc: &Document, range: &Range) -> Range {
    let (start, end) = range.edges();
    if range.is_collapsed() || end.offset != 0 {
        return Range::new(start, end);
    }
    let (Some(start_block), Some(end_block)) = (
        text_block_above(doc, &start.path),
        text_block_above(doc, &end.path),
    ) else {
        return Range::new(start, end);
    };
    if start_block == end_block || block_start(doc, &end_block).as_ref() != Some(&end) {
        return Range::new(start, end);
    }
    let previous = doc
        .editable_leaves()
        .into_iter()
        .rev()
        .find(|(path, _)| path.compare(&end.path) == Ordering::Less)
        .map(|(path, text)| Point::new(path, text.len()));
    match previous {
        Some(previous) if !previous.is_before(&start) => Range::new(start, previous),
        _ => Range::new(start, end),
    }
}

/// One caret step forward. Adjacent leaves of one parent share their
/// boundary; anything else between two leaves (a void, a block edge) is one
/// step.
pub(crate) fn point_after(doc: &Document, point: &Point) -> Option<Point> {
    let leaf = doc.text(&point.path)?;
    if point.offset < leaf.len() {
        return Some(Point::new(point.path.clone(), point.offset + 1));
    }
    let leaves = doc.editable_leaves();
    let position = leaves.iter().position(|(path, _)| path == &point.path)?;
    let (next, text) = leaves.get(position + 1)?;
    if point.path.next().as_ref() == Some(next) {
        Some(Point::new(next.clone(), text.len().min(1)))
    } else {
        Some(Point::new(next.clone(), 0))
    }
}

/// One caret step backward; mirror of [`point_after`].
pub(crate) fn point_before(doc: &Document, point: &Point) -> Option<Point> {
    if point.offset > 0 {
        return Some(Point::new(point.path.clone(), point.offset - 1));
    }
    let leaves = doc.editable_leaves();
    let position = leaves.iter().position(|(path, _)| path == &point.path)?;
    let (previous, text) = leaves.get(position.checked_sub(1)?)?;
    if previous.next().as_ref() == Some(&point.path) {
        Some(Point::new(previous.clone(), text.len().saturating_sub(1)))
    } else {
        Some(Point::new(previous.clone(), text.len()))
    }
}

impl Editor {
    /// Marks the next typed character would carry.
    pub fn marks(&self) -> Marks {
        if let Some(marks) = self.pending_marks() {
            return marks;
        }
        let Some(range) = self.selection() else {
            return Marks::default();
        };
        if range.is_expanded() {
            return self
                .leading_leaf(range)
                .map(|text| text.marks)
                .unwrap_or_default();
        }
        let doc = self.document();
        let point = &range.anchor;
        if point.offset == 0 {
            // At a leaf boundary the caret continues the previous run
            if let Some(previous) = point.path.previous().and_then(|p| doc.text(&p)) {
                return previous.marks;
            }
        }
        doc.text(&point.path).map(|text| text.marks).unwrap_or_default()
    }

    pub fn is_mark_active(&self, mark: Mark) -> bool {
        self.marks().get(mark)
    }

    /// True when an element of `kind` overlaps the selection.
    pub fn is_block_active(&self, kind: &ElementKind) -> bool {
        let Some(range) = self.selection() else {
            return false;
        };
        let range = unhang(self.document(), range);
        !elements_in(self.document(), &range, |k| k == kind).is_empty()
    }

    pub fn is_link_active(&self) -> bool {
        self.selection().is_some_and(|range| {
            !elements_in(self.document(), range, |k| matches!(k, ElementKind::Link { .. })).is_empty()
        })
    }

    /// Text covered by the selection; blocks are not separated.
    pub fn selected_text(&self) -> String {
        let Some(range) = self.selection() else {
            return String::new();
        };
        let (start, end) = range.edges();
        self.document()
            .editable_leaves()
            .into_iter()
            .filter(|(path, _)| intersects(path, &start, &end))
            .map(|(path, text)| {
                let from = if path == start.path { start.offset } else { 0 };
                let to = if path == end.path { end.offset } else { text.len() };
                text.slice(from, to).to_string()
            })
            .collect()
    }

    /// First leaf with selected content: the start leaf, unless the range
    /// starts at its very end.
    fn leading_leaf(&self, range: &Range) -> Option<&Text> {
        let doc = self.document();
        let (start, end) = range.edges();
        let leaf = doc.text(&start.path)?;
        if start.offset < leaf.len() {
            return Some(leaf);
        }
        doc.editable_leaves()
            .into_iter()
            .find(|(path, _)| path.compare(&start.path) == Ordering::Greater)
            .filter(|(path, _)| path.compare(&end.path) != Ordering::Greater)
            .map(|(_, text)| text)
            .or(Some(leaf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Document {
        Document::new(vec![
            Node::paragraph("ab"),
            Node::element(
                ElementKind::Paragraph,
                vec![Node::text("c"), Node::link("https://x.dev", "x"), Node::text("d")],
            ),
        ])
    }

    #[test]
    fn test_point_steps_cross_blocks_and_voids() {
        let doc = doc();
        let end_of_first = Point::new([0, 0], 2);
        assert_eq!(point_after(&doc, &end_of_first), Some(Point::new([1, 0], 0)));
        assert_eq!(
            point_after(&doc, &Point::new([1, 0], 1)),
            Some(Point::new([1, 2], 0))
        );
        assert_eq!(
            point_before(&doc, &Point::new([1, 2], 0)),
            Some(Point::new([1, 0], 1))
        );
        assert_eq!(point_before(&doc, &Point::new([0, 0], 0)), None);
        assert_eq!(point_after(&doc, &Point::new([1, 2], 1)), None);
    }

    #[test]
    fn test_unhang_drops_touched_block() {
        let doc = doc();
        let range = Range::new(Point::new([0, 0], 0), Point::new([1, 0], 0));
        let unhung = unhang(&doc, &range);
        assert_eq!(unhung.end(), Point::new([0, 0], 2));
        assert_eq!(text_blocks_in(&doc, &unhung), vec![Path::from([0])]);
    }

    #[test]
    fn test_text_block_above_leaf() {
        let doc = Document::new(vec![Node::element(
            ElementKind::BulletedList,
            vec![Node::element(ElementKind::ListItem, vec![Node::text("one")])],
        )]);
        assert_eq!(
            text_block_above(&doc, &Path::from([0, 0, 0])),
            Some(Path::from([0, 0]))
        );
    }
}
