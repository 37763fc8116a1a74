use crate::editor::Editor;
use crate::queries::{point_after, point_before};
use lectern_model::{Point, Range};

impl Editor {
    /// Moves the caret `delta` steps (negative = backward). An expanded
    /// selection collapses to its edge in the direction of travel instead.
    /// Returns whether the selection changed.
    pub fn move_selection(&mut self, delta: isize) -> bool {
        let Some(range) = self.selection().cloned() else {
            return false;
        };
        if delta == 0 {
            return false;
        }
        let target = if range.is_expanded() {
            if delta < 0 {
                range.start()
            } else {
                range.end()
            }
        } else {
            self.step(&range.focus, delta)
        };
        self.select_point(target.clone()) && Range::collapsed(target) != range
    }

    /// Moves only the focus, growing or shrinking the selection.
    pub fn extend_selection(&mut self, delta: isize) -> bool {
        let Some(range) = self.selection().cloned() else {
            return false;
        };
        let focus = self.step(&range.focus, delta);
        if focus == range.focus {
            return false;
        }
        self.select(Range::new(range.anchor, focus))
    }

    pub fn collapse_to_start(&mut self) -> bool {
        match self.selection().map(Range::start) {
            Some(start) => self.select_point(start),
            None => false,
        }
    }

    pub fn collapse_to_end(&mut self) -> bool {
        match self.selection().map(Range::end) {
            Some(end) => self.select_point(end),
            None => false,
        }
    }

    /// The point `delta` steps away, stopping at either end of the document.
    fn step(&self, from: &Point, delta: isize) -> Point {
        let mut point = from.clone();
        for _ in 0..delta.unsigned_abs() {
            let next = if delta < 0 {
                point_before(self.document(), &point)
            } else {
                point_after(self.document(), &point)
            };
            match next {
                Some(next) => point = next,
                None => break,
            }
        }
        point
    }
}

#[cfg(test)]
mod tests {
    use crate::Editor;
    use lectern_model::{Document, Node, Point, Range};

    fn editor() -> Editor {
        let mut editor = Editor::new(Document::new(vec![Node::paragraph("ab"), Node::paragraph("c")]));
        editor.select_point(Point::new([0, 0], 1));
        editor
    }

    #[test]
    fn test_move_across_block_boundary() {
        let mut editor = editor();
        assert!(editor.move_selection(2));
        assert_eq!(editor.selection().unwrap().anchor, Point::new([1, 0], 0));
        assert!(editor.move_selection(-1));
        assert_eq!(editor.selection().unwrap().anchor, Point::new([0, 0], 2));
    }

    #[test]
    fn test_move_stops_at_document_edges() {
        let mut editor = editor();
        assert!(editor.move_selection(-10));
        assert_eq!(editor.selection().unwrap().anchor, Point::new([0, 0], 0));
        assert!(!editor.move_selection(-1));
    }

    #[test]
    fn test_expanded_selection_collapses_in_direction() {
        let mut editor = editor();
        assert!(editor.extend_selection(2));
        assert_eq!(
            editor.selection().unwrap(),
            &Range::new(Point::new([0, 0], 1), Point::new([1, 0], 0))
        );
        assert!(editor.move_selection(-1));
        assert_eq!(editor.selection().unwrap(), &Range::collapsed(Point::new([0, 0], 1)));
    }
}
