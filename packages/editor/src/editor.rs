//! The editing state machine: one document, one selection.
//!
//! Every public operation runs as a transaction. The transaction applies
//! [`Mutation`]s one at a time, carrying the selection and any outstanding
//! path/range references through each of them, then normalizes the tree and
//! repairs the selection. If any step fails to resolve its location the
//! document, selection and pending marks are restored and the operation is
//! reported as skipped.

use crate::mutations::{Affinity, Mutation, MutationError, MutationResult};
use crate::options::EditorOptions;
use crate::post_effects::PostEffectEngine;
use crate::undo_stack::{MutationBatch, UndoStack};
use lectern_model::{Document, Marks, Node, Path, Point, Range};
use std::cmp::Ordering;
use tracing::{debug, trace, warn};

/// Handle to a path that follows later mutations within a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PathRef(usize);

/// Handle to a range that follows later mutations within a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RangeRef(usize);

#[derive(Debug)]
pub struct Editor {
    document: Document,
    selection: Option<Range>,
    /// Marks for the next inserted text after a collapsed mark toggle.
    pending_marks: Option<Marks>,
    focused: bool,
    version: u64,
    options: EditorOptions,
    history: UndoStack,
    normalizer: PostEffectEngine,
    applied: Vec<Mutation>,
    path_refs: Vec<Option<Path>>,
    range_refs: Vec<Option<Range>>,
}

struct Snapshot {
    document: Document,
    selection: Option<Range>,
    pending_marks: Option<Marks>,
}

impl Editor {
    pub fn new(document: Document) -> Self {
        Self::with_options(document, EditorOptions::default())
    }

    /// An editor over a single empty paragraph.
    pub fn empty() -> Self {
        Self::new(Document::empty())
    }

    /// Hydrates an editor. The document is normalized up front; that pass is
    /// not part of the undo history.
    pub fn with_options(document: Document, options: EditorOptions) -> Self {
        let mut editor = Self {
            document,
            selection: None,
            pending_marks: None,
            focused: false,
            version: 0,
            history: UndoStack::with_max_levels(options.history_depth),
            options,
            normalizer: PostEffectEngine::standard(),
            applied: Vec::new(),
            path_refs: Vec::new(),
            range_refs: Vec::new(),
        };
        if let Err(err) = editor.normalize() {
            warn!(%err, "initial document could not be fully normalized");
        }
        editor.applied.clear();
        editor
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn selection(&self) -> Option<&Range> {
        self.selection.as_ref()
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    /// Bumped once per applied transaction, undo and redo.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_read_only(&self) -> bool {
        self.options.read_only
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn focus(&mut self) {
        self.focused = true;
        if self.selection.is_none() {
            self.selection = self.document.end_point().map(Range::collapsed);
        }
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    pub(crate) fn pending_marks(&self) -> Option<Marks> {
        self.pending_marks
    }

    pub(crate) fn set_pending_marks(&mut self, marks: Option<Marks>) {
        self.pending_marks = marks;
    }

    // ---- selection -------------------------------------------------------

    /// Selects `range`. Points inside void elements snap to the nearest
    /// editable position and offsets clamp to the leaf length; a point whose
    /// path is not a leaf leaves the selection untouched.
    pub fn select(&mut self, range: Range) -> bool {
        let valid = |point: &Point| self.document.text(&point.path).is_some();
        if !valid(&range.anchor) || !valid(&range.focus) {
            debug!(%range, "selection does not resolve; ignored");
            return false;
        }
        self.selection = Some(range);
        self.repair_selection();
        self.pending_marks = None;
        true
    }

    pub fn select_point(&mut self, point: Point) -> bool {
        self.select(Range::collapsed(point))
    }

    pub fn select_all(&mut self) -> bool {
        match (self.document.start_point(), self.document.end_point()) {
            (Some(start), Some(end)) => self.select(Range::new(start, end)),
            _ => false,
        }
    }

    pub fn deselect(&mut self) {
        self.selection = None;
        self.pending_marks = None;
    }

    /// Selection write used by transforms; repaired when the transaction ends.
    pub(crate) fn set_selection(&mut self, selection: Option<Range>) {
        self.selection = selection;
    }

    // ---- transactions ----------------------------------------------------

    /// Runs `f` atomically. Returns `false` when it was rolled back.
    pub(crate) fn transact<F>(&mut self, label: &'static str, f: F) -> bool
    where
        F: FnOnce(&mut Self) -> MutationResult<()>,
    {
        let snapshot = Snapshot {
            document: self.document.clone(),
            selection: self.selection.clone(),
            pending_marks: self.pending_marks,
        };
        self.applied.clear();

        let result = f(self).and_then(|()| self.normalize());
        self.path_refs.clear();
        self.range_refs.clear();

        match result {
            Ok(()) => {
                if snapshot.selection.is_some() && self.selection.is_none() {
                    self.selection = self.document.start_point().map(Range::collapsed);
                }
                self.repair_selection();
                let mutations = std::mem::take(&mut self.applied);
                if mutations.is_empty() {
                    return true;
                }
                self.version += 1;
                debug!(label, version = self.version, mutations = mutations.len(), "transaction applied");
                match MutationBatch::from_mutations(mutations) {
                    Ok(batch) => self.history.record(
                        batch
                            .with_description(label)
                            .with_selections(snapshot.selection, self.selection.clone()),
                    ),
                    Err(err) => {
                        warn!(%err, label, "could not invert transaction; history cleared");
                        self.history.clear();
                    }
                }
                true
            }
            Err(err) => {
                debug!(label, %err, "location no longer resolves; operation skipped");
                self.document = snapshot.document;
                self.selection = snapshot.selection;
                self.pending_marks = snapshot.pending_marks;
                self.applied.clear();
                false
            }
        }
    }

    /// Applies one mutation, carrying the selection and references with it.
    pub(crate) fn apply(&mut self, mutation: Mutation) -> MutationResult<()> {
        mutation.validate(&self.document)?;

        let selection = self
            .selection
            .take()
            .and_then(|range| self.transform_range(&range, &mutation));
        let path_refs: Vec<Option<Path>> = self
            .path_refs
            .iter()
            .map(|path| path.as_ref().and_then(|p| mutation.transform_path(p)))
            .collect();
        let range_refs: Vec<Option<Range>> = self
            .range_refs
            .iter()
            .map(|range| range.as_ref().and_then(|r| self.transform_range(r, &mutation)))
            .collect();

        mutation.apply(&mut self.document)?;
        trace!(?mutation, "mutation applied");

        self.selection = selection;
        self.path_refs = path_refs;
        self.range_refs = range_refs;
        self.applied.push(mutation);
        Ok(())
    }

    pub(crate) fn apply_all(&mut self, mutations: Vec<Mutation>) -> MutationResult<()> {
        mutations.into_iter().try_for_each(|mutation| self.apply(mutation))
    }

    /// Runs the post-effects until none of them has anything to repair.
    pub(crate) fn normalize(&mut self) -> MutationResult<()> {
        let limit = 8 * self.document.nodes().len() + 32;
        for pass in 0..limit {
            let Some((rule, fixes)) = self.normalizer.next_fix(&self.document) else {
                return Ok(());
            };
            trace!(rule, pass, "normalizing");
            self.apply_all(fixes)?;
        }
        Err(MutationError::InvalidStructure(
            "normalization did not settle".to_string(),
        ))
    }

    pub(crate) fn path_ref(&mut self, path: Path) -> PathRef {
        self.path_refs.push(Some(path));
        PathRef(self.path_refs.len() - 1)
    }

    pub(crate) fn resolve_path(&self, handle: PathRef) -> MutationResult<Path> {
        self.path_refs
            .get(handle.0)
            .cloned()
            .flatten()
            .ok_or_else(|| MutationError::InvalidStructure("tracked node was removed".to_string()))
    }

    pub(crate) fn range_ref(&mut self, range: Range) -> RangeRef {
        self.range_refs.push(Some(range));
        RangeRef(self.range_refs.len() - 1)
    }

    pub(crate) fn resolve_range(&self, handle: RangeRef) -> MutationResult<Range> {
        self.range_refs
            .get(handle.0)
            .cloned()
            .flatten()
            .ok_or_else(|| MutationError::InvalidStructure("tracked range was removed".to_string()))
    }

    fn transform_range(&self, range: &Range, mutation: &Mutation) -> Option<Range> {
        // Expanded ranges hold on to their content: start moves forward,
        // end moves backward.
        let (anchor_affinity, focus_affinity) = if range.is_collapsed() {
            (Affinity::Forward, Affinity::Forward)
        } else if range.is_backward() {
            (Affinity::Backward, Affinity::Forward)
        } else {
            (Affinity::Forward, Affinity::Backward)
        };
        let anchor = self.transform_point(&range.anchor, mutation, anchor_affinity)?;
        let focus = self.transform_point(&range.focus, mutation, focus_affinity)?;
        Some(Range::new(anchor, focus))
    }

    fn transform_point(&self, point: &Point, mutation: &Mutation, affinity: Affinity) -> Option<Point> {
        if let Mutation::RemoveNode { path, .. } = mutation {
            if path.contains(&point.path) {
                let replacement = self.point_outside(path)?;
                return mutation.transform_point(&replacement, affinity);
            }
        }
        mutation.transform_point(point, affinity)
    }

    /// End of the previous editable leaf outside `removed`, else the start of
    /// the next one.
    fn point_outside(&self, removed: &Path) -> Option<Point> {
        let leaves = self.document.editable_leaves();
        let before = leaves
            .iter()
            .rev()
            .find(|(path, _)| path.compare(removed) == Ordering::Less);
        if let Some((path, text)) = before {
            return Some(Point::new(path.clone(), text.len()));
        }
        leaves
            .iter()
            .find(|(path, _)| path.compare(removed) == Ordering::Greater)
            .map(|(path, _)| Point::new(path.clone(), 0))
    }

    /// Snaps selection points onto editable leaves.
    fn repair_selection(&mut self) {
        let Some(range) = self.selection.take() else {
            return;
        };
        let anchor = self.resolve_point(&range.anchor);
        let focus = self.resolve_point(&range.focus);
        self.selection = match (anchor, focus) {
            (Some(anchor), Some(focus)) => Some(Range::new(anchor, focus)),
            _ => self.document.start_point().map(Range::collapsed),
        };
    }

    fn resolve_point(&self, point: &Point) -> Option<Point> {
        match self.document.text(&point.path) {
            Some(text) if !self.document.in_void(&point.path) => {
                Some(Point::new(point.path.clone(), point.offset.min(text.len())))
            }
            _ => self.nearest_point(&point.path),
        }
    }

    fn nearest_point(&self, path: &Path) -> Option<Point> {
        let anchor = self.void_ancestor(path).unwrap_or_else(|| path.clone());
        let leaves = self.document.editable_leaves();
        leaves
            .iter()
            .find(|(leaf, _)| anchor.contains(leaf) || leaf.compare(&anchor) == Ordering::Greater)
            .map(|(leaf, _)| Point::new(leaf.clone(), 0))
            .or_else(|| {
                leaves
                    .last()
                    .map(|(leaf, text)| Point::new(leaf.clone(), text.len()))
            })
    }

    /// Outermost void element containing `path`, if any.
    fn void_ancestor(&self, path: &Path) -> Option<Path> {
        path.ancestors()
            .into_iter()
            .chain(std::iter::once(path.clone()))
            .find(|p| self.document.get(p).is_some_and(Node::is_void))
    }

    // ---- history ---------------------------------------------------------

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    pub fn undo(&mut self) -> bool {
        self.replay_history(true)
    }

    pub fn redo(&mut self) -> bool {
        self.replay_history(false)
    }

    fn replay_history(&mut self, undo: bool) -> bool {
        let snapshot = Snapshot {
            document: self.document.clone(),
            selection: self.selection.clone(),
            pending_marks: self.pending_marks,
        };
        let mut history = std::mem::take(&mut self.history);
        let result = if undo {
            history.undo(|mutation| self.apply(mutation.clone()))
        } else {
            history.redo(|mutation| self.apply(mutation.clone()))
        };
        let result = result.map(|batch| {
            batch.map(|batch| {
                if undo {
                    batch.selection_before.clone()
                } else {
                    batch.selection_after.clone()
                }
            })
        });
        let restored = match result {
            Ok(selection) => selection,
            Err(err) => {
                warn!(%err, undo, "history replay failed; history cleared");
                history.clear();
                self.document = snapshot.document;
                None
            }
        };
        self.history = history;
        self.applied.clear();

        match restored {
            Some(selection) => {
                self.selection = selection.or(self.selection.take());
                self.repair_selection();
                self.pending_marks = None;
                self.version += 1;
                true
            }
            None => {
                self.selection = snapshot.selection;
                self.pending_marks = snapshot.pending_marks;
                false
            }
        }
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::empty()
    }
}
