//! WidgetBoard Core Library
//!
//! State management for the WidgetBoard canvas editor: the widget model, grid
//! layouts, the undo/redo state store and its persistence.

pub mod action;
pub mod canvas;
pub mod history;
pub mod layout;
pub mod palette;
pub mod storage;
pub mod store;
pub mod widget;

pub use action::{ActionChannel, ActionEffect, ActionError, ActionEvaluator, ScriptedAction};
pub use canvas::{Canvas, CanvasError};
pub use history::{History, Snapshot};
pub use layout::{GRID_COLUMNS, LayoutRecord};
pub use palette::{DRAG_DATA_KEY, DragPayload, PaletteEntry, PayloadError, palette};
pub use store::{
    ConsistencyError, LayoutStore, PERSIST_ROOT_KEY, PersistedBoard, StoreEvent, SubscriptionId,
    check_consistency,
};
pub use widget::{
    ButtonVariant, GridSpan, ValidationError, WidgetContent, WidgetId, WidgetKind, WidgetRecord,
    suggest_size, validate,
};
