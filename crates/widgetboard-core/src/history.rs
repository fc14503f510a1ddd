//! Undo/redo history of board snapshots.

use crate::layout::LayoutRecord;
use crate::widget::WidgetRecord;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// An immutable copy of the full board state at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub layouts: Vec<LayoutRecord>,
    pub items: Vec<WidgetRecord>,
}

impl Snapshot {
    pub fn new(layouts: Vec<LayoutRecord>, items: Vec<WidgetRecord>) -> Self {
        Self { layouts, items }
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty() && self.items.is_empty()
    }
}

/// Linear undo/redo history.
///
/// `past` runs oldest to newest; `future` runs nearest to furthest. There is
/// no cap on either stack.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    pub past: Vec<Snapshot>,
    pub future: VecDeque<Snapshot>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a state before a new mutation. Discards the redo branch.
    pub fn record(&mut self, snapshot: Snapshot) {
        self.past.push(snapshot);
        self.future.clear();
    }

    /// Step back: returns the previous state and parks `current` for redo.
    pub fn step_back(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.past.pop()?;
        self.future.push_front(current);
        Some(previous)
    }

    /// Step forward: returns the next state and parks `current` for undo.
    pub fn step_forward(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.future.pop_front()?;
        self.past.push(current);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.future.len()
    }
}
