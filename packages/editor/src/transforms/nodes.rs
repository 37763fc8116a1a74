use super::parent_and_index;
use crate::editor::Editor;
use crate::mutations::{Mutation, MutationError, MutationResult};
use crate::queries::{block_end, elements_in, intersects, text_block_above, text_blocks_in, unhang};
use lectern_model::{ElementKind, Node, Path, Point, Range};
use tracing::{debug, instrument};

/// Where [`Editor::insert_node`] puts a node.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertAt {
    /// Exactly this path
    Path(Path),
    /// The current selection; the end of the document without one
    Selection,
}

impl Editor {
    /// Sets the kind of the element at `path`. Void elements keep their kind.
    /// Text blocks inside a list stay list items and list items are only
    /// made inside a list.
    #[instrument(skip(self))]
    pub fn set_node_type(&mut self, path: &Path, kind: ElementKind) -> bool {
        if self.document().get(path).is_some_and(Node::is_void) {
            debug!(%path, "void elements keep their kind");
            return false;
        }
        if kind.is_text_block() && (kind == ElementKind::ListItem) != self.in_list(path) {
            debug!(%path, kind = %kind, "list items live inside lists");
            return false;
        }
        self.transact("set_node_type", |ed| ed.set_kind(path, kind).map(|_| ()))
    }

    /// Wraps the blocks overlapping `range` (the selection when `None`) in a
    /// new `kind` element. Inline kinds wrap the selected text of each block
    /// instead.
    #[instrument(skip(self))]
    pub fn wrap_nodes(&mut self, range: Option<Range>, kind: ElementKind) -> bool {
        let Some(range) = range.or_else(|| self.selection().cloned()) else {
            return false;
        };
        self.transact("wrap_nodes", |ed| {
            if kind.is_inline() {
                ed.wrap_inline(&range, kind).map(|_| ())
            } else {
                ed.wrap_blocks(&range, kind)
            }
        })
    }

    /// Unwraps every element overlapping the selection that satisfies
    /// `matches`. With `split`, only the children inside the selection are
    /// lifted out and the rest stay wrapped.
    pub fn unwrap_nodes<F>(&mut self, matches: F, split: bool) -> bool
    where
        F: Fn(&ElementKind) -> bool,
    {
        let Some(range) = self.selection().cloned() else {
            return false;
        };
        self.transact("unwrap_nodes", |ed| ed.unwrap_matching(&range, &matches, split))
    }

    /// Inserts `node`. At the selection, blocks go next to the top-level
    /// block holding the caret (splitting it when the caret is in the
    /// middle) and inline nodes go at the caret.
    #[instrument(skip(self, node))]
    pub fn insert_node(&mut self, node: Node, at: InsertAt) -> bool {
        self.transact("insert_node", |ed| match at {
            InsertAt::Path(path) => ed.insert_at(path, node),
            InsertAt::Selection if node.is_block() => {
                let path = ed.insert_block(node)?;
                if let Some(end) = block_end(ed.document(), &path) {
                    ed.set_selection(Some(Range::collapsed(end)));
                }
                Ok(())
            }
            InsertAt::Selection => ed.insert_inline(node).map(|_| ()),
        })
    }

    #[instrument(skip(self))]
    pub fn remove_node(&mut self, path: &Path) -> bool {
        if !self.document().has(path) {
            debug!(%path, "nothing to remove");
            return false;
        }
        self.transact("remove_node", |ed| ed.remove_at(path))
    }

    // ---- building blocks ---------------------------------------------------

    fn in_list(&self, path: &Path) -> bool {
        path.parent()
            .filter(|parent| !parent.is_root())
            .and_then(|parent| self.document().get(&parent))
            .and_then(Node::kind)
            .is_some_and(ElementKind::is_list_container)
    }

    /// Wraps each run of adjacent text blocks in `range` in its own empty
    /// `kind` element inserted in place of the run. Siblings between runs,
    /// such as block voids, stay where they are.
    pub(crate) fn wrap_blocks(&mut self, range: &Range, kind: ElementKind) -> MutationResult<()> {
        let range = unhang(self.document(), range);
        let blocks = text_blocks_in(self.document(), &range);
        let (Some(first), Some(last)) = (blocks.first(), blocks.last()) else {
            return Err(MutationError::InvalidStructure(
                "no block to wrap".to_string(),
            ));
        };
        let parent = if first == last {
            parent_and_index(first)?.0
        } else {
            first.common_ancestor(last)
        };
        let depth = parent.len();

        let mut indices: Vec<usize> = blocks.iter().map(|block| block[depth]).collect();
        indices.dedup();
        let mut runs: Vec<(usize, usize)> = Vec::new();
        for index in indices {
            match runs.last_mut() {
                Some((_, end)) if *end + 1 == index => *end = index,
                _ => runs.push((index, index)),
            }
        }

        // Last run first so earlier indices stay valid
        for (start, end) in runs.into_iter().rev() {
            self.insert_at(parent.child(start), Node::element(kind.clone(), vec![]))?;
            let wrapper = parent.child(start);
            for offset in 0..=(end - start) {
                self.apply(Mutation::MoveNode {
                    path: parent.child(start + 1),
                    new_path: wrapper.child(offset),
                })?;
            }
        }
        Ok(())
    }

    /// Wraps the selected inline content of every block in `range` in its
    /// own `kind` element. Returns the wrapper paths in document order.
    pub(crate) fn wrap_inline(&mut self, range: &Range, kind: ElementKind) -> MutationResult<Vec<Path>> {
        let (start, end) = range.edges();
        let doc = self.document();
        let blocks = text_blocks_in(doc, range);
        let mut wrappers = Vec::new();

        for block in blocks.iter().rev() {
            let from = if block.is_ancestor_of(&start.path) {
                start.clone()
            } else {
                Point::new(block.child(0), 0)
            };
            let to = if block.is_ancestor_of(&end.path) {
                end.clone()
            } else {
                let size = self.child_count(block)?;
                let last = block.child(size.saturating_sub(1));
                let len = self.document().text(&last).map(|t| t.len()).unwrap_or(0);
                Point::new(last, len)
            };
            if from == to || self.document().text(&from.path).is_none() {
                continue;
            }

            // Split the end first so the start offsets stay valid
            let to_index = if self.document().text(&to.path).is_some() {
                self.split_leaf(&to)?
            } else {
                parent_and_index(&to.path)?.1 + 1
            };
            let size_before = self.child_count(block)?;
            let from_index = self.split_leaf(&from)?;
            let shift = self.child_count(block)? - size_before;
            let to_index = to_index + shift;
            if from_index >= to_index {
                continue;
            }

            self.insert_at(block.child(from_index), Node::element(kind.clone(), vec![]))?;
            let wrapper = block.child(from_index);
            for offset in 0..(to_index - from_index) {
                self.apply(Mutation::MoveNode {
                    path: block.child(from_index + 1),
                    new_path: wrapper.child(offset),
                })?;
            }
            wrappers.push(wrapper);
        }
        wrappers.reverse();
        Ok(wrappers)
    }

    pub(crate) fn unwrap_matching(
        &mut self,
        range: &Range,
        matches: &dyn Fn(&ElementKind) -> bool,
        split: bool,
    ) -> MutationResult<()> {
        let targets = elements_in(self.document(), range, matches);
        let tracked = self.range_ref(range.clone());

        // Later nodes first so earlier paths stay put
        for target in targets.into_iter().rev() {
            let size = self.child_count(&target)?;
            if size == 0 {
                self.remove_at(&target)?;
                continue;
            }
            let (first, last) = if split {
                let (start, end) = self.resolve_range(tracked)?.edges();
                let inside: Vec<usize> = (0..size)
                    .filter(|index| intersects(&target.child(*index), &start, &end))
                    .collect();
                match (inside.first(), inside.last()) {
                    (Some(first), Some(last)) => (*first, *last),
                    _ => continue,
                }
            } else {
                (0, size - 1)
            };
            self.lift_children(&target, first, last)?;
        }
        Ok(())
    }

    /// Inserts a block node next to the top-level block at the selection and
    /// returns its path; appends to the document without a selection.
    pub(crate) fn insert_block(&mut self, node: Node) -> MutationResult<Path> {
        let Some(range) = self.selection().cloned() else {
            let path = Path::from([self.document().children.len()]);
            self.insert_at(path.clone(), node)?;
            return Ok(path);
        };
        if range.is_expanded() {
            self.delete_range(&range)?;
        }
        let caret = self.caret()?;
        let top = Path::from([caret.path[0]]);
        let path = if block_end(self.document(), &top).as_ref() == Some(&caret) {
            top.next()
                .ok_or_else(|| MutationError::InvalidStructure("no top-level block".to_string()))?
        } else {
            self.split_up_to(&caret, &top)?
        };
        self.insert_at(path.clone(), node)?;
        Ok(path)
    }

    /// Inserts an inline node at the caret and moves the caret right after
    /// it. Returns the node's path.
    pub(crate) fn insert_inline(&mut self, node: Node) -> MutationResult<Path> {
        if self.selection().is_none() {
            let end = self
                .document()
                .end_point()
                .ok_or_else(|| MutationError::InvalidStructure("nowhere to insert".to_string()))?;
            self.set_selection(Some(Range::collapsed(end)));
        }
        if let Some(range) = self.selection().cloned().filter(Range::is_expanded) {
            self.delete_range(&range)?;
        }
        let caret = self.caret()?;
        if text_block_above(self.document(), &caret.path).is_none() {
            return Err(MutationError::InvalidStructure(format!(
                "{} is not inside a text block",
                caret
            )));
        }
        let (parent, _) = parent_and_index(&caret.path)?;
        let index = self.split_leaf(&caret)?;
        let path = parent.child(index);
        self.insert_at(path.clone(), node)?;
        let after = self.point_after_inline(&path)?;
        self.set_selection(Some(Range::collapsed(after)));
        Ok(path)
    }

    /// The collapsed selection point.
    pub(crate) fn caret(&self) -> MutationResult<Point> {
        match self.selection() {
            Some(range) if range.is_collapsed() => Ok(range.anchor.clone()),
            _ => Err(MutationError::InvalidStructure(
                "no collapsed selection".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectern_model::Document;

    fn paragraphs(texts: &[&str]) -> Editor {
        Editor::new(Document::new(texts.iter().map(|t| Node::paragraph(*t)).collect()))
    }

    #[test]
    fn test_set_node_type() {
        let mut editor = paragraphs(&["a"]);
        assert!(editor.set_node_type(&Path::from([0]), ElementKind::HeadingTwo));
        assert_eq!(editor.document().children[0].kind(), Some(&ElementKind::HeadingTwo));
    }

    #[test]
    fn test_set_node_type_skips_voids_and_stale_paths() {
        let mut editor = Editor::new(Document::new(vec![
            Node::paragraph("a"),
            Node::image("x.png", ""),
        ]));
        assert!(!editor.set_node_type(&Path::from([1]), ElementKind::Paragraph));
        assert!(!editor.set_node_type(&Path::from([7]), ElementKind::Paragraph));
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_set_node_type_list_item_needs_a_list() {
        let mut editor = Editor::new(Document::new(vec![
            Node::paragraph("a"),
            Node::element(ElementKind::BulletedList, vec![Node::element(ElementKind::ListItem, vec![Node::text("b")])]),
        ]));
        assert!(!editor.set_node_type(&Path::from([0]), ElementKind::ListItem));
        assert!(!editor.can_undo());

        assert!(!editor.set_node_type(&Path::from([1, 0]), ElementKind::Paragraph));
        assert!(!editor.can_undo());

        assert!(editor.set_node_type(&Path::from([1]), ElementKind::NumberedList));
        assert_eq!(editor.document().children[1].kind(), Some(&ElementKind::NumberedList));
    }

    #[test]
    fn test_wrap_blocks_in_list() {
        let mut editor = paragraphs(&["a", "b", "c"]);
        let range = Range::new(Point::new([0, 0], 0), Point::new([1, 0], 1));
        assert!(editor.wrap_nodes(Some(range), ElementKind::BulletedList));
        let doc = editor.document();
        assert_eq!(doc.children.len(), 2);
        assert_eq!(doc.children[0].kind(), Some(&ElementKind::BulletedList));
        assert_eq!(doc.children[0].children().unwrap().len(), 2);
        assert_eq!(doc.children[1].string(), "c");
    }

    #[test]
    fn test_wrap_inline_splits_text() {
        let mut editor = paragraphs(&["hello world"]);
        let range = Range::new(Point::new([0, 0], 6), Point::new([0, 0], 11));
        assert!(editor.wrap_nodes(Some(range), ElementKind::link("https://w.dev")));
        let children = editor.document().children[0].children().unwrap().to_vec();
        assert_eq!(children.len(), 3);
        assert_eq!(children[0].string(), "hello ");
        assert_eq!(children[1], Node::link("https://w.dev", "world"));
        assert_eq!(children[2], Node::text(""));
    }

    #[test]
    fn test_unwrap_with_split_keeps_siblings_listed() {
        let item = |t: &str| Node::element(ElementKind::ListItem, vec![Node::text(t)]);
        let mut editor = Editor::new(Document::new(vec![Node::element(
            ElementKind::BulletedList,
            vec![item("one"), item("two"), item("three")],
        )]));
        editor.select_point(Point::new([0, 1, 0], 1));
        assert!(editor.unwrap_nodes(ElementKind::is_list_container, true));

        let doc = editor.document();
        assert_eq!(doc.children.len(), 3);
        assert_eq!(doc.children[0].kind(), Some(&ElementKind::BulletedList));
        // A lifted list item outside a list becomes a paragraph
        assert_eq!(doc.children[1], Node::paragraph("two"));
        assert_eq!(doc.children[2].kind(), Some(&ElementKind::BulletedList));
        assert_eq!(editor.selection().unwrap().anchor, Point::new([1, 0], 1));
    }

    #[test]
    fn test_insert_block_splits_in_middle() {
        let mut editor = paragraphs(&["abcd"]);
        editor.select_point(Point::new([0, 0], 2));
        assert!(editor.insert_node(
            Node::element(ElementKind::HeadingOne, vec![Node::text("H")]),
            InsertAt::Selection
        ));
        let strings: Vec<String> = editor.document().children.iter().map(Node::string).collect();
        assert_eq!(strings, vec!["ab", "H", "cd"]);
        assert_eq!(editor.selection().unwrap().anchor, Point::new([1, 0], 1));
    }

    #[test]
    fn test_insert_block_at_start_goes_before() {
        let mut editor = paragraphs(&["abcd"]);
        editor.select_point(Point::new([0, 0], 0));
        editor.insert_node(Node::paragraph("new"), InsertAt::Selection);
        assert_eq!(editor.document().children[0].string(), "new");
        assert_eq!(editor.document().children[1].string(), "abcd");
    }

    #[test]
    fn test_insert_without_selection_appends() {
        let mut editor = paragraphs(&["a"]);
        editor.insert_node(Node::paragraph("z"), InsertAt::Selection);
        assert_eq!(editor.document().children[1].string(), "z");
    }

    #[test]
    fn test_remove_node() {
        let mut editor = paragraphs(&["a", "b"]);
        assert!(editor.remove_node(&Path::from([0])));
        assert_eq!(editor.document(), &Document::new(vec![Node::paragraph("b")]));
        assert!(!editor.remove_node(&Path::from([3])));

        // Removing the last block leaves an empty paragraph behind
        assert!(editor.remove_node(&Path::from([0])));
        assert_eq!(editor.document(), &Document::empty());
    }
}
