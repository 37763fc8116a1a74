use super::parent_and_index;
use crate::editor::Editor;
use crate::mutations::{Mutation, MutationError, MutationResult, NodeProperties};
use crate::queries::{block_start, text_block_above};
use crate::undo_stack::TYPING;
use lectern_model::{ElementKind, Node, Path, Point, Range};
use std::cmp::Ordering;
use tracing::{debug, instrument};

/// Direction of a single-character deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Backward,
    Forward,
}

impl Editor {
    /// Types `text` at the caret, replacing an expanded selection.
    pub fn insert_text(&mut self, text: &str) -> bool {
        if text.is_empty() || self.selection().is_none() {
            return false;
        }
        self.transact(TYPING, |ed| {
            if let Some(range) = ed.selection().cloned().filter(Range::is_expanded) {
                ed.delete_range(&range)?;
            }
            ed.type_at_caret(text)
        })
    }

    /// Pasted text: lines become separate blocks.
    pub fn insert_plain_text(&mut self, text: &str) -> bool {
        let text = text.replace("\r\n", "\n");
        let mut changed = false;
        for (index, line) in text.split('\n').enumerate() {
            if index > 0 {
                changed |= self.insert_break();
            }
            changed |= self.insert_text(line);
        }
        changed
    }

    /// Enter: splits the text block at the caret. In an empty list item the
    /// caret leaves the list instead.
    #[instrument(skip(self))]
    pub fn insert_break(&mut self) -> bool {
        if self.selection().is_none() {
            return false;
        }
        if self.empty_list_item_at_caret().is_some() {
            return self.exit_list_item();
        }
        self.transact("insert_break", |ed| {
            if let Some(range) = ed.selection().cloned().filter(Range::is_expanded) {
                ed.delete_range(&range)?;
            }
            let caret = ed.caret()?;
            let block = text_block_above(ed.document(), &caret.path).ok_or_else(|| {
                MutationError::InvalidStructure(format!("{} is not inside a text block", caret))
            })?;
            let index = ed.split_leaf(&caret)?;
            let kind = ed
                .node(&block)?
                .kind()
                .cloned()
                .ok_or_else(|| MutationError::NotAnElement(block.clone()))?;
            ed.apply(Mutation::SplitNode {
                path: block.clone(),
                position: index,
                properties: NodeProperties::Element(kind),
            })?;
            if ed.child_count(&block)? == 0 {
                ed.insert_at(block.child(0), Node::text(""))?;
            }
            let next = block
                .next()
                .ok_or_else(|| MutationError::InvalidStructure("the root cannot be split".to_string()))?;
            let start = ed.ensure_leading_leaf(&next)?;
            ed.set_selection(Some(Range::collapsed(start)));
            Ok(())
        })
    }

    /// Turns the empty list item at the caret into a paragraph outside its
    /// list, splitting the list around it.
    #[instrument(skip(self))]
    pub fn exit_list_item(&mut self) -> bool {
        let Some(item) = self.empty_list_item_at_caret() else {
            return false;
        };
        self.transact("exit_list_item", |ed| {
            let (list, index) = parent_and_index(&item)?;
            let tracked = ed.path_ref(item.clone());
            ed.lift_children(&list, index, index)?;
            let item = ed.resolve_path(tracked)?;
            ed.set_kind(&item, ElementKind::Paragraph)?;
            Ok(())
        })
    }

    /// Backspace.
    pub fn delete_backward(&mut self) -> bool {
        self.delete(Direction::Backward)
    }

    /// Delete.
    pub fn delete_forward(&mut self) -> bool {
        self.delete(Direction::Forward)
    }

    /// Removes the selected content and collapses the selection to its start.
    pub fn delete_fragment(&mut self) -> bool {
        match self.selection().cloned() {
            Some(range) if range.is_expanded() => {
                self.transact("delete_fragment", |ed| ed.delete_range(&range))
            }
            _ => false,
        }
    }

    fn delete(&mut self, direction: Direction) -> bool {
        let Some(range) = self.selection().cloned() else {
            return false;
        };
        if range.is_expanded() {
            return self.delete_fragment();
        }
        let label = match direction {
            Direction::Backward => "delete_backward",
            Direction::Forward => "delete_forward",
        };
        self.transact(label, |ed| ed.delete_at_caret(&range.anchor, direction))
    }

    // ---- building blocks ---------------------------------------------------

    fn type_at_caret(&mut self, text: &str) -> MutationResult<()> {
        let caret = self.caret()?;
        let leaf = self.leaf(&caret.path)?;
        let pending = self.pending_marks().filter(|marks| *marks != leaf.marks);
        self.set_pending_marks(None);

        let Some(marks) = pending else {
            return self.apply(Mutation::InsertText {
                path: caret.path,
                offset: caret.offset,
                text: text.to_string(),
            });
        };

        // A new run carrying the pending marks
        let (parent, _) = parent_and_index(&caret.path)?;
        let index = self.split_leaf(&caret)?;
        let path = parent.child(index);
        self.insert_at(path.clone(), Node::marked(text, marks))?;
        self.set_selection(Some(Range::collapsed(Point::new(path, text.chars().count()))));
        Ok(())
    }

    /// Removes everything between the edges of `range`, joining the blocks
    /// at either end.
    pub(crate) fn delete_range(&mut self, range: &Range) -> MutationResult<()> {
        let (start, end) = range.edges();
        if start == end {
            return Ok(());
        }
        let start_leaf = self.leaf(&start.path)?;
        let end_leaf = self.leaf(&end.path)?;

        if start.path == end.path {
            self.apply(Mutation::RemoveText {
                path: start.path.clone(),
                offset: start.offset,
                text: start_leaf.slice(start.offset, end.offset).to_string(),
            })?;
            self.set_selection(Some(Range::collapsed(start)));
            return Ok(());
        }

        let start_block = text_block_above(self.document(), &start.path);
        let end_block = text_block_above(self.document(), &end.path);
        let end_block = end_block.map(|block| self.path_ref(block));

        if end.offset > 0 {
            self.apply(Mutation::RemoveText {
                path: end.path.clone(),
                offset: 0,
                text: end_leaf.slice(0, end.offset).to_string(),
            })?;
        }
        if start.offset < start_leaf.len() {
            self.apply(Mutation::RemoveText {
                path: start.path.clone(),
                offset: start.offset,
                text: start_leaf.slice(start.offset, start_leaf.len()).to_string(),
            })?;
        }

        // Highest nodes strictly between the two leaves, last first
        let between: Vec<Path> = self
            .document()
            .nodes()
            .into_iter()
            .map(|(path, _)| path)
            .filter(|path| {
                path.compare(&start.path) == Ordering::Greater
                    && path.compare(&end.path) == Ordering::Less
            })
            .collect();
        let highest: Vec<&Path> = between
            .iter()
            .filter(|path| !between.iter().any(|other| other.is_ancestor_of(path)))
            .collect();
        for path in highest.into_iter().rev() {
            self.remove_at(path)?;
        }

        if let (Some(start_block), Some(end_block)) = (start_block, end_block) {
            let end_block = self.resolve_path(end_block)?;
            if start_block != end_block {
                self.move_children_into(&end_block, &start_block)?;
            }
        }
        self.set_selection(Some(Range::collapsed(start)));
        Ok(())
    }

    fn delete_at_caret(&mut self, caret: &Point, direction: Direction) -> MutationResult<()> {
        let leaf = self.leaf(&caret.path)?;
        let (parent, index) = parent_and_index(&caret.path)?;

        match direction {
            Direction::Backward if caret.offset > 0 => {
                return self.apply(Mutation::RemoveText {
                    path: caret.path.clone(),
                    offset: caret.offset - 1,
                    text: leaf.slice(caret.offset - 1, caret.offset).to_string(),
                });
            }
            Direction::Forward if caret.offset < leaf.len() => {
                return self.apply(Mutation::RemoveText {
                    path: caret.path.clone(),
                    offset: caret.offset,
                    text: leaf.slice(caret.offset, caret.offset + 1).to_string(),
                });
            }
            _ => {}
        }

        // At a leaf edge: the neighbouring sibling goes next
        let neighbour = match direction {
            Direction::Backward => index.checked_sub(1).map(|i| parent.child(i)),
            Direction::Forward => Some(parent.child(index + 1)),
        };
        if let Some(neighbour) = neighbour {
            match self.document().get(&neighbour).cloned() {
                Some(Node::Element(element)) if element.kind.is_void() => {
                    return self.remove_at(&neighbour);
                }
                Some(Node::Text(text)) if !text.is_empty() => {
                    let offset = match direction {
                        Direction::Backward => text.len() - 1,
                        Direction::Forward => 0,
                    };
                    return self.apply(Mutation::RemoveText {
                        path: neighbour,
                        offset,
                        text: text.slice(offset, offset + 1).to_string(),
                    });
                }
                _ => {}
            }
        }

        // At a block edge
        let block = text_block_above(self.document(), &caret.path).ok_or_else(|| {
            MutationError::InvalidStructure(format!("{} is not inside a text block", caret))
        })?;
        match direction {
            Direction::Backward => self.join_backward(&block),
            Direction::Forward => self.join_forward(&block),
        }
    }

    fn join_backward(&mut self, block: &Path) -> MutationResult<()> {
        let Some(previous) = self.adjacent_block(block, Direction::Backward) else {
            // Start of the document: formatted blocks fall back to paragraphs
            return self.reset_to_paragraph(block);
        };
        match self.node(&previous)?.kind() {
            Some(kind) if kind.is_void() => self.remove_at(&previous),
            _ if self.is_empty_block(block) => self.remove_at(block),
            _ if self.is_empty_block(&previous) => self.remove_at(&previous),
            _ => self.move_children_into(block, &previous),
        }
    }

    fn join_forward(&mut self, block: &Path) -> MutationResult<()> {
        let Some(next) = self.adjacent_block(block, Direction::Forward) else {
            debug!(%block, "end of document; nothing to delete");
            return Ok(());
        };
        match self.node(&next)?.kind() {
            Some(kind) if kind.is_void() => self.remove_at(&next),
            _ if self.is_empty_block(block) => {
                let tracked = self.path_ref(next);
                self.remove_at(block)?;
                let next = self.resolve_path(tracked)?;
                if let Some(start) = block_start(self.document(), &next) {
                    self.set_selection(Some(Range::collapsed(start)));
                }
                Ok(())
            }
            _ if self.is_empty_block(&next) => self.remove_at(&next),
            _ => self.move_children_into(&next, block),
        }
    }

    fn reset_to_paragraph(&mut self, block: &Path) -> MutationResult<()> {
        match self.node(block)?.kind() {
            Some(ElementKind::ListItem) => {
                let (list, index) = parent_and_index(block)?;
                let tracked = self.path_ref(block.clone());
                self.lift_children(&list, index, index)?;
                let block = self.resolve_path(tracked)?;
                self.set_kind(&block, ElementKind::Paragraph).map(|_| ())
            }
            Some(_) => self.set_kind(block, ElementKind::Paragraph).map(|_| ()),
            None => Ok(()),
        }
    }

    /// The text block or block void right before (or after) `block` in
    /// document order.
    fn adjacent_block(&self, block: &Path, direction: Direction) -> Option<Path> {
        let doc = self.document();
        let candidates = doc.nodes().into_iter().filter(|(path, node)| {
            node.kind()
                .is_some_and(|kind| kind.is_text_block() || (kind.is_void() && kind.is_block()))
                && !path.contains(block)
                && !block.contains(path)
        });
        match direction {
            Direction::Backward => candidates
                .filter(|(path, _)| path.compare(block) == Ordering::Less)
                .last()
                .map(|(path, _)| path),
            Direction::Forward => candidates
                .filter(|(path, _)| path.compare(block) == Ordering::Greater)
                .map(|(path, _)| path)
                .next(),
        }
    }

    fn is_empty_block(&self, block: &Path) -> bool {
        self.document().get(block).is_some_and(|node| {
            node.string().is_empty() && node.children().is_some_and(|c| c.iter().all(Node::is_text))
        })
    }

    /// The list item holding a collapsed caret, when that item has no text.
    fn empty_list_item_at_caret(&self) -> Option<Path> {
        let caret = self.caret().ok()?;
        let block = text_block_above(self.document(), &caret.path)?;
        let node = self.document().get(&block)?;
        (node.kind() == Some(&ElementKind::ListItem) && node.string().is_empty()).then_some(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectern_model::{Document, Mark, Marks};

    fn editor_at(children: Vec<Node>, point: Point) -> Editor {
        let mut editor = Editor::new(Document::new(children));
        editor.select_point(point);
        editor
    }

    fn item(text: &str) -> Node {
        Node::element(ElementKind::ListItem, vec![Node::text(text)])
    }

    #[test]
    fn test_insert_text_moves_caret() {
        let mut editor = editor_at(vec![Node::paragraph("ac")], Point::new([0, 0], 1));
        assert!(editor.insert_text("b"));
        assert_eq!(editor.document().children[0].string(), "abc");
        assert_eq!(editor.selection().unwrap().anchor, Point::new([0, 0], 2));
    }

    #[test]
    fn test_insert_text_with_pending_marks() {
        let mut editor = editor_at(vec![Node::paragraph("ab")], Point::new([0, 0], 1));
        editor.set_pending_marks(Some(Marks::default().with(Mark::Bold)));
        assert!(editor.insert_text("X"));
        let children = editor.document().children[0].children().unwrap().to_vec();
        assert_eq!(
            children,
            vec![
                Node::text("a"),
                Node::marked("X", Marks::default().with(Mark::Bold)),
                Node::text("b"),
            ]
        );
        assert_eq!(editor.selection().unwrap().anchor, Point::new([0, 1], 1));
    }

    #[test]
    fn test_insert_break_splits_block() {
        let mut editor = editor_at(
            vec![Node::element(ElementKind::HeadingOne, vec![Node::text("Hello")])],
            Point::new([0, 0], 2),
        );
        assert!(editor.insert_break());
        let doc = editor.document();
        assert_eq!(doc.children.len(), 2);
        assert_eq!(doc.children[0].string(), "He");
        assert_eq!(doc.children[1].string(), "llo");
        assert_eq!(doc.children[1].kind(), Some(&ElementKind::HeadingOne));
        assert_eq!(editor.selection().unwrap().anchor, Point::new([1, 0], 0));
    }

    #[test]
    fn test_insert_break_at_end_creates_empty_block() {
        let mut editor = editor_at(vec![Node::paragraph("A")], Point::new([0, 0], 1));
        assert!(editor.insert_break());
        assert_eq!(
            editor.document(),
            &Document::new(vec![Node::paragraph("A"), Node::paragraph("")])
        );
        assert_eq!(editor.selection().unwrap().anchor, Point::new([1, 0], 0));
    }

    #[test]
    fn test_enter_in_empty_list_item_exits_list() {
        let mut editor = editor_at(
            vec![Node::element(ElementKind::BulletedList, vec![item("")])],
            Point::new([0, 0, 0], 0),
        );
        assert!(editor.insert_break());
        assert_eq!(editor.document(), &Document::new(vec![Node::paragraph("")]));
    }

    #[test]
    fn test_enter_in_last_empty_item_keeps_earlier_items() {
        let mut editor = editor_at(
            vec![Node::element(ElementKind::NumberedList, vec![item("one"), item("")])],
            Point::new([0, 1, 0], 0),
        );
        assert!(editor.insert_break());
        let doc = editor.document();
        assert_eq!(
            doc.children[0],
            Node::element(ElementKind::NumberedList, vec![item("one")])
        );
        assert_eq!(doc.children[1], Node::paragraph(""));
        assert_eq!(editor.selection().unwrap().anchor, Point::new([1, 0], 0));
    }

    #[test]
    fn test_delete_backward_removes_char() {
        let mut editor = editor_at(vec![Node::paragraph("héllo")], Point::new([0, 0], 2));
        assert!(editor.delete_backward());
        assert_eq!(editor.document().children[0].string(), "hllo");
        assert_eq!(editor.selection().unwrap().anchor, Point::new([0, 0], 1));
    }

    #[test]
    fn test_delete_backward_joins_blocks() {
        let mut editor = editor_at(
            vec![Node::paragraph("ab"), Node::paragraph("cd")],
            Point::new([1, 0], 0),
        );
        assert!(editor.delete_backward());
        assert_eq!(editor.document(), &Document::new(vec![Node::paragraph("abcd")]));
        assert_eq!(editor.selection().unwrap().anchor, Point::new([0, 0], 2));
    }

    #[test]
    fn test_delete_backward_removes_image_as_unit() {
        let mut editor = editor_at(
            vec![Node::paragraph("a"), Node::image("x.png", ""), Node::paragraph("b")],
            Point::new([2, 0], 0),
        );
        assert!(editor.delete_backward());
        assert_eq!(
            editor.document(),
            &Document::new(vec![Node::paragraph("a"), Node::paragraph("b")])
        );
    }

    #[test]
    fn test_delete_backward_removes_link_as_unit() {
        let mut editor = editor_at(
            vec![Node::element(
                ElementKind::Paragraph,
                vec![Node::text("go "), Node::link("https://x.dev", "here"), Node::text("")],
            )],
            Point::new([0, 2], 0),
        );
        assert!(editor.delete_backward());
        assert_eq!(editor.document(), &Document::new(vec![Node::paragraph("go ")]));
        assert_eq!(editor.selection().unwrap().anchor, Point::new([0, 0], 3));
    }

    #[test]
    fn test_backspace_at_document_start_resets_heading() {
        let mut editor = editor_at(
            vec![Node::element(ElementKind::HeadingTwo, vec![Node::text("T")])],
            Point::new([0, 0], 0),
        );
        assert!(editor.delete_backward());
        assert_eq!(editor.document(), &Document::new(vec![Node::paragraph("T")]));
    }

    #[test]
    fn test_delete_forward_joins_next_block() {
        let mut editor = editor_at(
            vec![Node::paragraph("ab"), Node::paragraph("cd")],
            Point::new([0, 0], 2),
        );
        assert!(editor.delete_forward());
        assert_eq!(editor.document(), &Document::new(vec![Node::paragraph("abcd")]));
    }

    #[test]
    fn test_delete_fragment_across_blocks() {
        let mut editor = Editor::new(Document::new(vec![
            Node::paragraph("one"),
            Node::paragraph("two"),
            Node::paragraph("three"),
        ]));
        editor.select(Range::new(Point::new([0, 0], 1), Point::new([2, 0], 2)));
        assert!(editor.delete_fragment());
        assert_eq!(editor.document(), &Document::new(vec![Node::paragraph("oree")]));
        assert_eq!(editor.selection().unwrap(), &Range::collapsed(Point::new([0, 0], 1)));
    }

    #[test]
    fn test_typing_replaces_selection() {
        let mut editor = Editor::new(Document::new(vec![Node::paragraph("hello")]));
        editor.select(Range::new(Point::new([0, 0], 1), Point::new([0, 0], 4)));
        assert!(editor.insert_text("ipp"));
        assert_eq!(editor.document().children[0].string(), "hippo");
    }

    #[test]
    fn test_paste_lines_become_blocks() {
        let mut editor = editor_at(vec![Node::paragraph("")], Point::new([0, 0], 0));
        assert!(editor.insert_plain_text("a\r\nb"));
        assert_eq!(
            editor.document(),
            &Document::new(vec![Node::paragraph("a"), Node::paragraph("b")])
        );
    }
}
