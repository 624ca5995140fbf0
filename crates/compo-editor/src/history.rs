//! Undo/redo history over immutable snapshots.
//!
//! The history holds `{past, present, future}` where every entry is a shared
//! (`Arc`) snapshot of the whole document. One `commit` is one undo step.
//!
//! Drag gestures use **batching**: the snapshot at `begin_batch` is kept and
//! every commit until the matching `end_batch` is applied live without being
//! tracked, so the whole gesture undoes in a single step.
//!
//! Writes that must never be undoable (animation playback) go through
//! [`History::amend`], which replaces the present without touching the
//! stacks.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::SystemTime;

/// A snapshot plus the label of the edit that moved away from it.
#[derive(Debug, Clone)]
struct Entry<S> {
    state: Arc<S>,
    label: String,
}

#[derive(Debug, Clone)]
pub struct History<S> {
    past: VecDeque<Entry<S>>,
    present: Arc<S>,
    future: Vec<Entry<S>>,
    /// Maximum undo depth.
    max_depth: usize,
    /// Batch nesting depth (0 = not batching).
    batch_depth: usize,
    /// Snapshot and label captured at the start of the outermost batch.
    batch_start: Option<Entry<S>>,
    /// Whether a tracked commit landed inside the open batch.
    batch_committed: bool,
    last_modified: SystemTime,
}

impl<S: PartialEq> History<S> {
    pub fn new(initial: S, max_depth: usize) -> Self {
        Self {
            past: VecDeque::with_capacity(max_depth.min(64)),
            present: Arc::new(initial),
            future: Vec::new(),
            max_depth: max_depth.max(1),
            batch_depth: 0,
            batch_start: None,
            batch_committed: false,
            last_modified: SystemTime::now(),
        }
    }

    pub fn present(&self) -> &S {
        &self.present
    }

    /// Shared handle to the present snapshot.
    pub fn snapshot(&self) -> Arc<S> {
        Arc::clone(&self.present)
    }

    /// Replace the present with `next` as one undo step; clears redo.
    pub fn commit(&mut self, next: S, label: &str) {
        self.last_modified = SystemTime::now();
        if self.batch_depth > 0 {
            // tracked once, at end_batch
            self.present = Arc::new(next);
            self.batch_committed = true;
            return;
        }

        let previous = std::mem::replace(&mut self.present, Arc::new(next));
        self.push_past(Entry {
            state: previous,
            label: label.to_string(),
        });
        self.future.clear();
        log::debug!("history: commit {label:?} ({} undo steps)", self.past.len());
    }

    /// Commit the result of `updater` applied to the present.
    pub fn commit_with(&mut self, label: &str, updater: impl FnOnce(&S) -> S) {
        let next = updater(&self.present);
        self.commit(next, label);
    }

    /// Replace the present without recording anything. An amend inside a
    /// batch does not count as a change of that batch.
    pub fn amend(&mut self, next: S) {
        self.present = Arc::new(next);
    }

    /// Step back. Returns the label of the undone edit, or `None` if there is
    /// nothing to undo.
    pub fn undo(&mut self) -> Option<String> {
        self.close_batches();
        let entry = self.past.pop_back()?;
        let current = std::mem::replace(&mut self.present, entry.state);
        self.future.push(Entry {
            state: current,
            label: entry.label.clone(),
        });
        log::debug!("history: undo {:?}", entry.label);
        Some(entry.label)
    }

    /// Step forward again. Returns the label of the redone edit.
    pub fn redo(&mut self) -> Option<String> {
        self.close_batches();
        let entry = self.future.pop()?;
        let current = std::mem::replace(&mut self.present, entry.state);
        self.push_past(Entry {
            state: current,
            label: entry.label.clone(),
        });
        log::debug!("history: redo {:?}", entry.label);
        Some(entry.label)
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.past.len()
    }

    pub fn redo_len(&self) -> usize {
        self.future.len()
    }

    /// Label the next `undo` would return.
    pub fn undo_label(&self) -> Option<&str> {
        self.past.back().map(|e| e.label.as_str())
    }

    pub fn redo_label(&self) -> Option<&str> {
        self.future.last().map(|e| e.label.as_str())
    }

    /// Time of the last commit. Undo and redo do not touch it.
    pub fn last_modified(&self) -> SystemTime {
        self.last_modified
    }

    /// Start a batch group. All commits until the matching `end_batch()`
    /// become one undo step labelled `label`.
    pub fn begin_batch(&mut self, label: &str) {
        if self.batch_depth == 0 {
            self.batch_start = Some(Entry {
                state: Arc::clone(&self.present),
                label: label.to_string(),
            });
            self.batch_committed = false;
        }
        self.batch_depth += 1;
    }

    /// End a batch group. When the outermost batch closes after at least one
    /// commit and the present differs from the batch start, one step is
    /// pushed.
    pub fn end_batch(&mut self) {
        if self.batch_depth == 0 {
            return;
        }
        self.batch_depth -= 1;
        if self.batch_depth > 0 {
            return;
        }
        let committed = std::mem::take(&mut self.batch_committed);
        if let Some(start) = self.batch_start.take()
            && committed
            && *start.state != *self.present
        {
            log::debug!("history: batch {:?} closed", start.label);
            self.push_past(start);
            self.future.clear();
        }
    }

    pub fn is_batching(&self) -> bool {
        self.batch_depth > 0
    }

    /// Drop every entry and start over from `initial`.
    pub fn clear(&mut self, initial: S) {
        self.past.clear();
        self.future.clear();
        self.batch_depth = 0;
        self.batch_start = None;
        self.batch_committed = false;
        self.present = Arc::new(initial);
        self.last_modified = SystemTime::now();
    }

    fn close_batches(&mut self) {
        if self.batch_depth > 0 {
            self.batch_depth = 1;
            self.end_batch();
        }
    }

    fn push_past(&mut self, entry: Entry<S>) {
        self.past.push_back(entry);
        if self.past.len() > self.max_depth {
            self.past.pop_front();
        }
    }
}
