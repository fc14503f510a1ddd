//! The board state store.
//!
//! [`LayoutStore`] owns the canonical `(layouts, items)` pair and its
//! undo/redo [`History`]. Every mutation goes through one of four commands:
//! [`apply`](LayoutStore::apply), [`undo`](LayoutStore::undo),
//! [`redo`](LayoutStore::redo) and [`clear`](LayoutStore::clear). Each command
//! runs to completion under `&mut self`; hosts sharing a store across threads
//! wrap the whole store in a lock.
//!
//! The store does not validate. Callers keep `layouts` and `items` in step
//! (same length, same id set) and can use [`check_consistency`] to verify a
//! proposed state before applying it.

use crate::history::{History, Snapshot};
use crate::layout::LayoutRecord;
use crate::widget::{WidgetId, WidgetRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Storage key the board is persisted under.
pub const PERSIST_ROOT_KEY: &str = "root";

/// Which command changed the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    Applied,
    Undone,
    Redone,
    Cleared,
}

/// Handle returned by [`LayoutStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&StoreEvent) + Send>;

/// A violation of the layouts/items pairing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsistencyError {
    #[error("{layouts} layouts but {items} widgets")]
    LengthMismatch { layouts: usize, items: usize },
    #[error("Duplicate layout id: {0}")]
    DuplicateLayout(WidgetId),
    #[error("Duplicate widget id: {0}")]
    DuplicateWidget(WidgetId),
    #[error("Layout {0} has no widget")]
    OrphanLayout(WidgetId),
    #[error("Widget {0} has no layout")]
    OrphanWidget(WidgetId),
}

/// Check that `layouts` and `items` have the same length and id set.
pub fn check_consistency(
    layouts: &[LayoutRecord],
    items: &[WidgetRecord],
) -> Result<(), ConsistencyError> {
    if layouts.len() != items.len() {
        return Err(ConsistencyError::LengthMismatch {
            layouts: layouts.len(),
            items: items.len(),
        });
    }

    let mut layout_ids = HashSet::with_capacity(layouts.len());
    for layout in layouts {
        if !layout_ids.insert(layout.id.as_str()) {
            return Err(ConsistencyError::DuplicateLayout(layout.id.clone()));
        }
    }

    let mut item_ids = HashSet::with_capacity(items.len());
    for item in items {
        if !item_ids.insert(item.id.as_str()) {
            return Err(ConsistencyError::DuplicateWidget(item.id.clone()));
        }
        if !layout_ids.contains(item.id.as_str()) {
            return Err(ConsistencyError::OrphanWidget(item.id.clone()));
        }
    }

    // Same length and no duplicates, so a leftover layout means an orphan.
    match layouts.iter().find(|l| !item_ids.contains(l.id.as_str())) {
        Some(layout) => Err(ConsistencyError::OrphanLayout(layout.id.clone())),
        None => Ok(()),
    }
}

/// The persisted projection of a store: current state plus history.
///
/// Restored verbatim at startup; there is no schema migration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedBoard {
    pub layouts: Vec<LayoutRecord>,
    pub items: Vec<WidgetRecord>,
    #[serde(default)]
    pub history: History,
}

impl PersistedBoard {
    /// Serialize the board to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a board from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Owner of the board state and its undo/redo history.
pub struct LayoutStore {
    layouts: Vec<LayoutRecord>,
    items: Vec<WidgetRecord>,
    history: History,
    /// Bumped on every command that changes state.
    version: u64,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl Default for LayoutStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LayoutStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutStore")
            .field("layouts", &self.layouts)
            .field("items", &self.items)
            .field("history", &self.history)
            .field("version", &self.version)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl LayoutStore {
    /// Create an empty store with no history.
    pub fn new() -> Self {
        Self {
            layouts: Vec::new(),
            items: Vec::new(),
            history: History::new(),
            version: 0,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Restore a store from its persisted projection.
    pub fn from_persisted(board: PersistedBoard) -> Self {
        if let Err(e) = check_consistency(&board.layouts, &board.items) {
            log::warn!("Restored board is inconsistent: {}", e);
        }
        Self {
            layouts: board.layouts,
            items: board.items,
            history: board.history,
            ..Self::new()
        }
    }

    /// Copy out the persisted projection.
    pub fn to_persisted(&self) -> PersistedBoard {
        PersistedBoard {
            layouts: self.layouts.clone(),
            items: self.items.clone(),
            history: self.history.clone(),
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.layouts.clone(), self.items.clone())
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.layouts = snapshot.layouts;
        self.items = snapshot.items;
    }

    fn take_current(&mut self) -> Snapshot {
        Snapshot::new(
            std::mem::take(&mut self.layouts),
            std::mem::take(&mut self.items),
        )
    }

    fn changed(&mut self, event: StoreEvent) {
        self.version += 1;
        log::debug!(
            "{:?}: {} widgets, undo depth {}, redo depth {}",
            event,
            self.items.len(),
            self.history.undo_depth(),
            self.history.redo_depth()
        );
        for (_, observer) in &mut self.observers {
            observer(&event);
        }
    }

    /// Replace the current state, recording the old one for undo.
    ///
    /// Always records history and discards the redo branch, even if the new
    /// state equals the current one. The caller is responsible for the
    /// layouts/items pairing.
    pub fn apply(&mut self, layouts: Vec<LayoutRecord>, items: Vec<WidgetRecord>) {
        let previous = self.take_current();
        self.history.record(previous);
        self.layouts = layouts;
        self.items = items;
        self.changed(StoreEvent::Applied);
    }

    /// Return to the previous state. Returns false if there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        if !self.history.can_undo() {
            return false;
        }
        let current = self.snapshot();
        match self.history.step_back(current) {
            Some(previous) => {
                self.restore(previous);
                self.changed(StoreEvent::Undone);
                true
            }
            None => false,
        }
    }

    /// Re-apply the most recently undone state. Returns false if there is
    /// nothing to redo.
    pub fn redo(&mut self) -> bool {
        if !self.history.can_redo() {
            return false;
        }
        let current = self.snapshot();
        match self.history.step_forward(current) {
            Some(next) => {
                self.restore(next);
                self.changed(StoreEvent::Redone);
                true
            }
            None => false,
        }
    }

    /// Remove every widget. Returns false (and records nothing) if the board
    /// is already empty.
    pub fn clear(&mut self) -> bool {
        if self.layouts.is_empty() && self.items.is_empty() {
            return false;
        }
        let previous = self.take_current();
        self.history.record(previous);
        self.changed(StoreEvent::Cleared);
        true
    }

    pub fn layouts(&self) -> &[LayoutRecord] {
        &self.layouts
    }

    pub fn items(&self) -> &[WidgetRecord] {
        &self.items
    }

    /// Current state as an owned snapshot.
    pub fn current(&self) -> Snapshot {
        self.snapshot()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Change counter; differs whenever the state may have changed.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Get a widget by id.
    pub fn item(&self, id: &str) -> Option<&WidgetRecord> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Get a layout by id.
    pub fn layout(&self, id: &str) -> Option<&LayoutRecord> {
        self.layouts.iter().find(|layout| layout.id == id)
    }

    /// Check the current state's layouts/items pairing.
    pub fn check_consistency(&self) -> Result<(), ConsistencyError> {
        check_consistency(&self.layouts, &self.items)
    }

    /// Register an observer called after every state-changing command.
    pub fn subscribe(&mut self, observer: impl FnMut(&StoreEvent) + Send + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }
}
