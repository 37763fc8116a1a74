use crate::editor::Editor;
use crate::mutations::{Mutation, MutationResult, NodeProperties};
use crate::queries::{elements_in, intersects, text_blocks_in, unhang};
use lectern_model::{ElementKind, Mark, Range};
use std::fmt;
use tracing::{instrument, warn};

/// Block formats offered by the toolbar and the block toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockFormat {
    HeadingOne,
    HeadingTwo,
    HeadingThree,
    BlockQuote,
    BulletedList,
    NumberedList,
}

impl BlockFormat {
    pub const ALL: [BlockFormat; 6] = [
        BlockFormat::HeadingOne,
        BlockFormat::HeadingTwo,
        BlockFormat::HeadingThree,
        BlockFormat::BlockQuote,
        BlockFormat::BulletedList,
        BlockFormat::NumberedList,
    ];

    pub fn kind(&self) -> ElementKind {
        match self {
            BlockFormat::HeadingOne => ElementKind::HeadingOne,
            BlockFormat::HeadingTwo => ElementKind::HeadingTwo,
            BlockFormat::HeadingThree => ElementKind::HeadingThree,
            BlockFormat::BlockQuote => ElementKind::BlockQuote,
            BlockFormat::BulletedList => ElementKind::BulletedList,
            BlockFormat::NumberedList => ElementKind::NumberedList,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, BlockFormat::BulletedList | BlockFormat::NumberedList)
    }

    /// Same as the element type name.
    pub fn name(&self) -> &'static str {
        self.kind().type_name()
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|format| format.name() == name)
    }
}

impl fmt::Display for BlockFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Editor {
    /// Flips `mark`. On a collapsed selection the flip applies to the next
    /// typed text; otherwise every selected leaf gets the same new value.
    #[instrument(skip(self))]
    pub fn toggle_mark(&mut self, mark: Mark) -> bool {
        let Some(range) = self.selection().cloned() else {
            return false;
        };
        let active = self.is_mark_active(mark);
        if range.is_collapsed() {
            let mut marks = self.marks();
            marks.set(mark, !active);
            self.set_pending_marks(Some(marks));
            return true;
        }
        self.transact("toggle_mark", |ed| ed.set_mark_in(&range, mark, !active))
    }

    #[instrument(skip(self))]
    pub fn toggle_block(&mut self, format: BlockFormat) -> bool {
        self.toggle_block_kind(format.kind())
    }

    /// Block toggle for an arbitrary kind. Voids and list items are inserted
    /// or produced by other operations and are refused here.
    pub fn toggle_block_kind(&mut self, kind: ElementKind) -> bool {
        if kind.is_void() || kind == ElementKind::ListItem {
            warn!(kind = %kind, "block toggle refused; use a dedicated insert operation");
            return false;
        }
        let Some(range) = self.selection().cloned() else {
            return false;
        };
        let active = self.is_block_active(&kind);
        self.transact("toggle_block", |ed| ed.apply_block_toggle(&range, kind, active))
    }

    fn apply_block_toggle(&mut self, range: &Range, kind: ElementKind, active: bool) -> MutationResult<()> {
        let unhung = unhang(self.document(), range);
        let tracked = self.range_ref(unhung.clone());
        let is_list = kind.is_list_container();

        self.unwrap_matching(&unhung, &ElementKind::is_list_container, true)?;

        let new_kind = if active {
            ElementKind::Paragraph
        } else if is_list {
            ElementKind::ListItem
        } else {
            kind.clone()
        };
        let range = self.resolve_range(tracked)?;
        for block in text_blocks_in(self.document(), &range) {
            self.set_kind(&block, new_kind.clone())?;
        }

        if !active && is_list {
            self.wrap_blocks(&range, kind)?;
        }
        Ok(())
    }

    fn set_mark_in(&mut self, range: &Range, mark: Mark, value: bool) -> MutationResult<()> {
        let (start, end) = range.edges();
        // End first: splitting the start leaf would shift the end leaf
        self.split_leaf(&end)?;
        self.split_leaf(&start)?;

        // The selection was carried through the splits and now sits on leaf
        // boundaries
        let selection = self.selection().cloned().unwrap_or_else(|| range.clone());
        let (start, end) = selection.edges();
        let targets: Vec<_> = self
            .document()
            .editable_leaves()
            .into_iter()
            .filter(|(path, text)| {
                intersects(path, &start, &end)
                    && !(*path == start.path && start.offset == text.len() && start.path != end.path)
                    && !(*path == end.path && end.offset == 0 && start.path != end.path)
                    && text.marks.get(mark) != value
            })
            .map(|(path, text)| (path, text.marks))
            .collect();

        for (path, marks) in targets {
            let mut updated = marks;
            updated.set(mark, value);
            self.apply(Mutation::SetNode {
                path,
                properties: NodeProperties::Text(marks),
                new_properties: NodeProperties::Text(updated),
            })?;
        }
        Ok(())
    }

    /// Links overlapping the selection, in document order.
    pub(crate) fn links_in(&self, range: &Range) -> Vec<lectern_model::Path> {
        elements_in(self.document(), range, |kind| matches!(kind, ElementKind::Link { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectern_model::{Document, Marks, Node, Point};

    fn select_all(children: Vec<Node>) -> Editor {
        let mut editor = Editor::new(Document::new(children));
        editor.select_all();
        editor
    }

    #[test]
    fn test_format_names_round_trip() {
        for format in BlockFormat::ALL {
            assert_eq!(BlockFormat::from_name(format.name()), Some(format));
        }
        assert_eq!(BlockFormat::from_name("paragraph"), None);
    }

    #[test]
    fn test_heading_toggle() {
        let mut editor = select_all(vec![Node::paragraph("Hello")]);
        assert!(editor.toggle_block(BlockFormat::HeadingOne));
        assert_eq!(
            editor.document().children[0],
            Node::element(ElementKind::HeadingOne, vec![Node::text("Hello")])
        );
        assert!(editor.toggle_block(BlockFormat::HeadingTwo));
        assert_eq!(editor.document().children[0].kind(), Some(&ElementKind::HeadingTwo));
        assert!(editor.toggle_block(BlockFormat::HeadingTwo));
        assert_eq!(editor.document().children[0], Node::paragraph("Hello"));
    }

    #[test]
    fn test_list_toggle_round_trip() {
        let mut editor = select_all(vec![Node::paragraph("A")]);
        assert!(editor.toggle_block(BlockFormat::BulletedList));
        assert_eq!(
            editor.document().children[0],
            Node::element(
                ElementKind::BulletedList,
                vec![Node::element(ElementKind::ListItem, vec![Node::text("A")])]
            )
        );
        assert!(editor.toggle_block(BlockFormat::BulletedList));
        assert_eq!(editor.document(), &Document::new(vec![Node::paragraph("A")]));
    }

    #[test]
    fn test_switch_list_kind() {
        let mut editor = select_all(vec![Node::paragraph("A"), Node::paragraph("B")]);
        editor.toggle_block(BlockFormat::BulletedList);
        editor.select_all();
        editor.toggle_block(BlockFormat::NumberedList);
        let doc = editor.document();
        assert_eq!(doc.children.len(), 1);
        assert_eq!(doc.children[0].kind(), Some(&ElementKind::NumberedList));
        assert_eq!(doc.children[0].children().unwrap().len(), 2);
    }

    #[test]
    fn test_void_toggle_refused() {
        let mut editor = select_all(vec![Node::paragraph("A")]);
        assert!(!editor.toggle_block_kind(ElementKind::image("x.png", "")));
        assert!(!editor.toggle_block_kind(ElementKind::link("https://x.dev")));
        assert_eq!(editor.document(), &Document::new(vec![Node::paragraph("A")]));
    }

    #[test]
    fn test_mark_toggle_on_range() {
        let mut editor = Editor::new(Document::new(vec![Node::paragraph("abcd")]));
        editor.select(Range::new(Point::new([0, 0], 1), Point::new([0, 0], 3)));
        assert!(editor.toggle_mark(Mark::Bold));
        assert_eq!(
            editor.document().children[0].children().unwrap(),
            &[
                Node::text("a"),
                Node::marked("bc", Marks::default().with(Mark::Bold)),
                Node::text("d"),
            ]
        );
        assert!(editor.is_mark_active(Mark::Bold));

        assert!(editor.toggle_mark(Mark::Bold));
        assert_eq!(editor.document(), &Document::new(vec![Node::paragraph("abcd")]));
    }

    #[test]
    fn test_collapsed_mark_toggle_sets_pending() {
        let mut editor = Editor::new(Document::new(vec![Node::paragraph("a")]));
        editor.select_point(Point::new([0, 0], 1));
        assert!(editor.toggle_mark(Mark::Italic));
        assert!(editor.is_mark_active(Mark::Italic));
        assert!(!editor.can_undo());
        editor.insert_text("b");
        assert_eq!(
            editor.document().children[0].children().unwrap()[1],
            Node::marked("b", Marks::default().with(Mark::Italic))
        );
    }
}
