//! # Undo/Redo Stack
//!
//! Tracks transaction history and enables undo/redo operations.
//!
//! ## Design
//!
//! - Each transaction is recorded as one batch with its inverses
//! - Undo applies the inverses and moves the batch to the redo stack
//! - Redo reapplies the original mutations
//! - New batches clear the redo stack
//! - Consecutive typing merges into a single batch
//!
//! The stack does not own the document. Callers pass the function that
//! applies a mutation, so selection tracking stays with the editor.

use crate::mutations::{Mutation, MutationError};
use lectern_model::Range;

/// Description given to plain typing batches, which merge with each other.
pub const TYPING: &str = "insert_text";

/// A group of mutations that should be undone/redone together
#[derive(Debug, Clone)]
pub struct MutationBatch {
    /// The mutations in this batch (in application order)
    pub mutations: Vec<Mutation>,

    /// The inverse mutations (in reverse order for undo)
    pub inverses: Vec<Mutation>,

    /// Optional description of this batch
    pub description: Option<String>,

    pub selection_before: Option<Range>,
    pub selection_after: Option<Range>,
}

impl MutationBatch {
    /// Create a batch from applied mutations, deriving the inverses
    pub fn from_mutations(mutations: Vec<Mutation>) -> Result<Self, MutationError> {
        let inverses = mutations
            .iter()
            .rev()
            .map(Mutation::inverse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            mutations,
            inverses,
            description: None,
            selection_before: None,
            selection_after: None,
        })
    }

    /// Add a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_selections(mut self, before: Option<Range>, after: Option<Range>) -> Self {
        self.selection_before = before;
        self.selection_after = after;
        self
    }

    fn is_typing(&self) -> bool {
        self.description.as_deref() == Some(TYPING)
    }

    /// Folds a later batch into this one.
    fn absorb(&mut self, later: MutationBatch) {
        self.mutations.extend(later.mutations);
        let mut inverses = later.inverses;
        inverses.append(&mut self.inverses);
        self.inverses = inverses;
        self.selection_after = later.selection_after;
    }
}

/// Undo/redo stack for document editing
#[derive(Debug)]
pub struct UndoStack {
    /// Stack of applied batches (most recent last)
    undo_stack: Vec<MutationBatch>,

    /// Stack of undone batches (most recent last)
    redo_stack: Vec<MutationBatch>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    /// Create an undo stack with custom max levels
    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
        }
    }

    /// Record an applied batch. Typing that continues where the previous
    /// typing batch left off joins that batch.
    pub fn record(&mut self, batch: MutationBatch) {
        self.redo_stack.clear();

        if let Some(last) = self.undo_stack.last_mut() {
            if last.is_typing() && batch.is_typing() && last.selection_after == batch.selection_before {
                last.absorb(batch);
                return;
            }
        }

        self.undo_stack.push(batch);

        // Trim if exceeded max levels
        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }
    }

    /// Undo the most recent batch, applying its inverses through `apply`.
    /// On failure the batch stays on the undo stack.
    pub fn undo<F>(&mut self, mut apply: F) -> Result<Option<&MutationBatch>, MutationError>
    where
        F: FnMut(&Mutation) -> Result<(), MutationError>,
    {
        let Some(batch) = self.undo_stack.pop() else {
            return Ok(None); // Nothing to undo
        };
        if let Err(err) = batch.inverses.iter().try_for_each(&mut apply) {
            self.undo_stack.push(batch);
            return Err(err);
        }
        self.redo_stack.push(batch);
        Ok(self.redo_stack.last())
    }

    /// Redo the most recently undone batch
    pub fn redo<F>(&mut self, mut apply: F) -> Result<Option<&MutationBatch>, MutationError>
    where
        F: FnMut(&Mutation) -> Result<(), MutationError>,
    {
        let Some(batch) = self.redo_stack.pop() else {
            return Ok(None); // Nothing to redo
        };
        if let Err(err) = batch.mutations.iter().try_for_each(&mut apply) {
            self.redo_stack.push(batch);
            return Err(err);
        }
        self.undo_stack.push(batch);
        Ok(self.undo_stack.last())
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Get the number of undo levels available
    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get the number of redo levels available
    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Get description of the next undo operation
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }

    /// Get description of the next redo operation
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}
