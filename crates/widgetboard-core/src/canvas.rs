//! Board controller.
//!
//! [`Canvas`] turns user gestures (drop, drag-stop, resize-stop, edit, delete,
//! click) into whole-state proposals and commits each through a single
//! [`LayoutStore::apply`]. It is the validation gate in front of the store:
//! edits are checked with [`validate`] and layout changes with
//! [`check_consistency`] before anything is applied.

use crate::action::{ActionEffect, ActionEvaluator, ScriptedAction};
use crate::layout::{DEFAULT_DROP_SPAN, LayoutRecord, drop_position};
use crate::palette::{DragPayload, PayloadError};
use crate::store::{ConsistencyError, LayoutStore, check_consistency};
use crate::widget::{
    FieldError, ValidationError, WidgetContent, WidgetId, WidgetKind, WidgetRecord, suggest_size,
    validate,
};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Errors from board operations. None of them change the store.
#[derive(Debug, Error)]
pub enum CanvasError {
    #[error(transparent)]
    Payload(#[from] PayloadError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error(transparent)]
    Inconsistent(#[from] ConsistencyError),
    #[error("No widget with id {0}")]
    UnknownWidget(WidgetId),
    #[error("Widget {0} is not a button")]
    NotAButton(WidgetId),
    #[error("Widget {0} is not a table")]
    NotATable(WidgetId),
    #[error("No widget is being edited")]
    NotEditing,
}

/// An in-progress edit of one widget.
#[derive(Debug, Clone)]
struct EditSession {
    id: WidgetId,
    draft: WidgetRecord,
}

/// The board: state store plus the gesture-level operations on it.
pub struct Canvas {
    store: LayoutStore,
    editing: Option<EditSession>,
    evaluator: Box<dyn ActionEvaluator>,
    /// Last timestamp used in a generated id, to keep ids increasing.
    last_stamp: u64,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    /// Create a canvas with an empty store.
    pub fn new() -> Self {
        Self::with_store(LayoutStore::new())
    }

    /// Create a canvas over an existing (e.g. restored) store.
    pub fn with_store(store: LayoutStore) -> Self {
        Self {
            store,
            editing: None,
            evaluator: Box::new(ScriptedAction::new()),
            last_stamp: 0,
        }
    }

    /// Replace the button action evaluator.
    pub fn with_evaluator(mut self, evaluator: Box<dyn ActionEvaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn store(&self) -> &LayoutStore {
        &self.store
    }

    fn require_item(&self, id: &str) -> Result<&WidgetRecord, CanvasError> {
        self.store
            .item(id)
            .ok_or_else(|| CanvasError::UnknownWidget(id.to_string()))
    }

    /// Generate `<kind>-<unix millis>`, bumped past earlier ids and any id on the board.
    fn next_id(&mut self, kind: WidgetKind) -> WidgetId {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0);
        let mut stamp = now.max(self.last_stamp + 1);
        loop {
            let id = format!("{}-{}", kind, stamp);
            if self.store.item(&id).is_none() && self.store.layout(&id).is_none() {
                self.last_stamp = stamp;
                return id;
            }
            stamp += 1;
        }
    }

    /// Handle a drop of raw drag data on grid cell (`cell_x`, `cell_y`).
    ///
    /// A payload that cannot be parsed abandons the drop with no state change.
    pub fn drop_widget(
        &mut self,
        payload_json: &str,
        cell_x: i64,
        cell_y: i64,
    ) -> Result<WidgetId, CanvasError> {
        let payload = DragPayload::parse(payload_json).inspect_err(|e| {
            log::warn!("Drop abandoned: {}", e);
        })?;
        Ok(self.drop_payload(&payload, cell_x, cell_y))
    }

    /// Place a new default widget of the payload's kind.
    pub fn drop_payload(&mut self, payload: &DragPayload, cell_x: i64, cell_y: i64) -> WidgetId {
        let id = self.next_id(payload.kind);
        let (x, y) = drop_position(self.store.layouts(), cell_x, cell_y);

        let mut layouts = self.store.layouts().to_vec();
        let mut items = self.store.items().to_vec();
        layouts.push(LayoutRecord::new(
            id.clone(),
            x,
            y,
            DEFAULT_DROP_SPAN.w,
            DEFAULT_DROP_SPAN.h,
        ));
        items.push(WidgetRecord::new(
            id.clone(),
            WidgetContent::default_for(payload.kind),
        ));
        self.store.apply(layouts, items);

        log::info!("{} has been added to the canvas as {}", payload.title, id);
        id
    }

    /// Commit a new set of layouts after a drag or resize.
    ///
    /// Spans below the minimum are raised to it. The layouts must cover
    /// exactly the widgets on the board.
    pub fn commit_layouts(&mut self, layouts: Vec<LayoutRecord>) -> Result<(), CanvasError> {
        let layouts: Vec<LayoutRecord> = layouts.iter().map(LayoutRecord::clamped).collect();
        check_consistency(&layouts, self.store.items())?;
        let items = self.store.items().to_vec();
        self.store.apply(layouts, items);
        Ok(())
    }

    fn update_layout(
        &mut self,
        id: &str,
        update: impl FnOnce(&mut LayoutRecord),
    ) -> Result<(), CanvasError> {
        let mut layouts = self.store.layouts().to_vec();
        let layout = layouts
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| CanvasError::UnknownWidget(id.to_string()))?;
        update(layout);
        self.commit_layouts(layouts)
    }

    /// Move a widget to a new grid cell.
    pub fn move_widget(&mut self, id: &str, x: u32, y: u32) -> Result<(), CanvasError> {
        self.update_layout(id, |layout| {
            layout.x = x;
            layout.y = y;
        })
    }

    /// Resize a widget.
    pub fn resize_widget(&mut self, id: &str, w: u32, h: u32) -> Result<(), CanvasError> {
        self.update_layout(id, |layout| {
            layout.w = w;
            layout.h = h;
        })
    }

    /// Resize a widget to the span suggested by its content.
    pub fn fit_widget(&mut self, id: &str) -> Result<(), CanvasError> {
        let span = suggest_size(self.require_item(id)?);
        self.resize_widget(id, span.w, span.h)
    }

    /// Remove a widget and its layout in one step.
    pub fn delete_widget(&mut self, id: &str) -> Result<(), CanvasError> {
        self.require_item(id)?;
        let layouts = self
            .store
            .layouts()
            .iter()
            .filter(|l| l.id != id)
            .cloned()
            .collect();
        let items = self
            .store
            .items()
            .iter()
            .filter(|item| item.id != id)
            .cloned()
            .collect();
        self.store.apply(layouts, items);

        if self.editing.as_ref().is_some_and(|s| s.id == id) {
            self.editing = None;
        }
        Ok(())
    }

    /// Start editing a widget, replacing any edit in progress.
    pub fn begin_edit(&mut self, id: &str) -> Result<(), CanvasError> {
        let draft = self.require_item(id)?.clone();
        self.editing = Some(EditSession {
            id: id.to_string(),
            draft,
        });
        Ok(())
    }

    /// Id of the widget being edited.
    pub fn editing(&self) -> Option<&str> {
        self.editing.as_ref().map(|s| s.id.as_str())
    }

    /// The uncommitted draft of the widget being edited.
    pub fn draft(&self) -> Option<&WidgetRecord> {
        self.editing.as_ref().map(|s| &s.draft)
    }

    pub fn draft_mut(&mut self) -> Option<&mut WidgetRecord> {
        self.editing.as_mut().map(|s| &mut s.draft)
    }

    fn require_draft(&mut self) -> Result<&mut WidgetRecord, CanvasError> {
        self.draft_mut().ok_or(CanvasError::NotEditing)
    }

    /// Set a named field on the draft.
    pub fn set_draft_field(&mut self, field: &str, value: &str) -> Result<(), CanvasError> {
        Ok(self.require_draft()?.set_field(field, value)?)
    }

    pub fn set_draft_header(&mut self, column: usize, value: &str) -> Result<(), CanvasError> {
        Ok(self.require_draft()?.set_header(column, value)?)
    }

    pub fn set_draft_cell(&mut self, row: usize, column: usize, value: &str) -> Result<(), CanvasError> {
        Ok(self.require_draft()?.set_cell(row, column, value)?)
    }

    fn draft_table(&mut self) -> Result<&mut crate::widget::TableContent, CanvasError> {
        let draft = self.require_draft()?;
        let id = draft.id.clone();
        match &mut draft.content {
            WidgetContent::Table(table) => Ok(table),
            _ => Err(CanvasError::NotATable(id)),
        }
    }

    /// Add an empty column to the table being edited.
    pub fn add_draft_column(&mut self) -> Result<(), CanvasError> {
        self.draft_table()?.add_column();
        Ok(())
    }

    /// Add an empty row to the table being edited.
    pub fn add_draft_row(&mut self) -> Result<(), CanvasError> {
        self.draft_table()?.add_row();
        Ok(())
    }

    /// Validate the draft and commit it.
    ///
    /// On a validation error nothing is applied and the edit stays open. If
    /// the widget has gone (e.g. removed by undo) the edit is dropped.
    pub fn save_edit(&mut self) -> Result<(), CanvasError> {
        let session = self.editing.as_ref().ok_or(CanvasError::NotEditing)?;
        validate(&session.draft)?;

        let Some(session) = self.editing.take() else {
            return Err(CanvasError::NotEditing);
        };
        if self.store.item(&session.id).is_none() {
            log::warn!("Edited widget {} no longer exists", session.id);
            return Err(CanvasError::UnknownWidget(session.id));
        }

        let layouts = self.store.layouts().to_vec();
        let items = self
            .store
            .items()
            .iter()
            .map(|item| {
                if item.id == session.id {
                    session.draft.clone()
                } else {
                    item.clone()
                }
            })
            .collect();
        self.store.apply(layouts, items);
        Ok(())
    }

    /// Discard the edit in progress. Returns false if there was none.
    pub fn cancel_edit(&mut self) -> bool {
        self.editing.take().is_some()
    }

    /// Run a button's action.
    ///
    /// Evaluation errors are logged and swallowed; the store is never touched.
    pub fn click_button(&self, id: &str) -> Result<Vec<ActionEffect>, CanvasError> {
        let WidgetContent::Button(button) = &self.require_item(id)?.content else {
            return Err(CanvasError::NotAButton(id.to_string()));
        };
        match self.evaluator.evaluate(&button.action) {
            Ok(effects) => Ok(effects),
            Err(e) => {
                log::error!("Error executing button action: {}", e);
                Ok(Vec::new())
            }
        }
    }

    pub fn undo(&mut self) -> bool {
        self.store.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.store.redo()
    }

    /// Clear the board, abandoning any edit in progress.
    pub fn clear(&mut self) -> bool {
        self.editing = None;
        self.store.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionChannel, ActionError};
    use crate::layout::MAX_DROP_COLUMN;
    use crate::palette::palette;
    use crate::widget::GridSpan;

    fn payload(kind: WidgetKind) -> String {
        palette()
            .iter()
            .find(|e| e.kind == kind)
            .unwrap()
            .payload()
            .to_json()
            .unwrap()
    }

    #[test]
    fn test_drop_creates_default_widget() {
        let mut canvas = Canvas::new();
        let id = canvas.drop_widget(&payload(WidgetKind::Card), 20, 3).unwrap();

        assert!(id.starts_with("card-"));
        let layout = canvas.store().layout(&id).unwrap();
        assert_eq!((layout.x, layout.y), (MAX_DROP_COLUMN, 0));
        assert_eq!(layout.span(), DEFAULT_DROP_SPAN);
        let item = canvas.store().item(&id).unwrap();
        assert_eq!(item.content, WidgetContent::default_for(WidgetKind::Card));
        assert_eq!(canvas.store().check_consistency(), Ok(()));
    }

    #[test]
    fn test_drop_ids_unique() {
        let mut canvas = Canvas::new();
        let a = canvas.drop_widget(&payload(WidgetKind::Text), 0, 0).unwrap();
        let b = canvas.drop_widget(&payload(WidgetKind::Text), 0, 0).unwrap();
        assert_ne!(a, b);
        assert_eq!(canvas.store().len(), 2);
    }

    #[test]
    fn test_drop_below_content_stacks() {
        let mut canvas = Canvas::new();
        canvas.drop_widget(&payload(WidgetKind::Text), 0, 0).unwrap();
        let id = canvas.drop_widget(&payload(WidgetKind::Image), 0, 40).unwrap();
        assert_eq!(canvas.store().layout(&id).unwrap().y, DEFAULT_DROP_SPAN.h);
    }

    #[test]
    fn test_malformed_drop_changes_nothing() {
        let mut canvas = Canvas::new();
        let version = canvas.store().version();
        assert!(matches!(
            canvas.drop_widget("{oops", 0, 0),
            Err(CanvasError::Payload(PayloadError::Malformed(_)))
        ));
        assert!(matches!(
            canvas.drop_widget(r#"{"type":"video"}"#, 0, 0),
            Err(CanvasError::Payload(PayloadError::UnknownKind(_)))
        ));
        assert_eq!(canvas.store().version(), version);
        assert!(!canvas.store().can_undo());
    }

    #[test]
    fn test_move_resize_and_fit() {
        let mut canvas = Canvas::new();
        let id = canvas.drop_widget(&payload(WidgetKind::Button), 0, 0).unwrap();

        canvas.move_widget(&id, 6, 2).unwrap();
        canvas.resize_widget(&id, 1, 0).unwrap();
        let layout = canvas.store().layout(&id).unwrap();
        assert_eq!((layout.x, layout.y), (6, 2));
        assert_eq!(layout.span(), GridSpan::new(2, 1));

        canvas.resize_widget(&id, 5, 5).unwrap();
        canvas.fit_widget(&id).unwrap();
        assert_eq!(canvas.store().layout(&id).unwrap().span(), GridSpan::new(2, 1));

        assert!(matches!(
            canvas.move_widget("missing", 0, 0),
            Err(CanvasError::UnknownWidget(_))
        ));
    }

    #[test]
    fn test_commit_layouts_rejects_mismatch() {
        let mut canvas = Canvas::new();
        canvas.drop_widget(&payload(WidgetKind::Text), 0, 0).unwrap();
        let version = canvas.store().version();

        let result = canvas.commit_layouts(vec![LayoutRecord::new("ghost", 0, 0, 2, 1)]);
        assert!(matches!(result, Err(CanvasError::Inconsistent(_))));
        assert_eq!(canvas.store().version(), version);
    }

    #[test]
    fn test_delete_removes_both_records() {
        let mut canvas = Canvas::new();
        let keep = canvas.drop_widget(&payload(WidgetKind::Text), 0, 0).unwrap();
        let gone = canvas.drop_widget(&payload(WidgetKind::Table), 4, 0).unwrap();

        canvas.delete_widget(&gone).unwrap();
        assert!(canvas.store().item(&gone).is_none());
        assert!(canvas.store().layout(&gone).is_none());
        assert!(canvas.store().item(&keep).is_some());
        assert_eq!(canvas.store().check_consistency(), Ok(()));

        assert!(canvas.undo());
        assert!(canvas.store().item(&gone).is_some());
    }

    #[test]
    fn test_edit_save_commits_once() {
        let mut canvas = Canvas::new();
        let id = canvas.drop_widget(&payload(WidgetKind::Text), 0, 0).unwrap();
        let depth = canvas.store().history().undo_depth();

        canvas.begin_edit(&id).unwrap();
        canvas.set_draft_field("content", "Hello board").unwrap();
        assert_eq!(
            canvas.store().item(&id).unwrap().content,
            WidgetContent::default_for(WidgetKind::Text)
        );
        canvas.save_edit().unwrap();

        assert_eq!(canvas.editing(), None);
        assert_eq!(canvas.store().history().undo_depth(), depth + 1);
        assert_eq!(canvas.store().item(&id).unwrap(), &WidgetRecord::text(id.clone(), "Hello board"));
    }

    #[test]
    fn test_invalid_edit_is_not_committed() {
        let mut canvas = Canvas::new();
        let id = canvas.drop_widget(&payload(WidgetKind::Image), 0, 0).unwrap();
        let version = canvas.store().version();

        canvas.begin_edit(&id).unwrap();
        let err = canvas.save_edit().unwrap_err();
        assert_eq!(err.to_string(), "image url is required");
        assert_eq!(canvas.store().version(), version);
        assert_eq!(canvas.editing(), Some(id.as_str()));

        canvas.set_draft_field("url", "https://example.com/cat.png").unwrap();
        canvas.save_edit().unwrap();
        assert_eq!(canvas.store().version(), version + 1);
    }

    #[test]
    fn test_table_edit_helpers() {
        let mut canvas = Canvas::new();
        let id = canvas.drop_widget(&payload(WidgetKind::Table), 0, 0).unwrap();

        canvas.begin_edit(&id).unwrap();
        canvas.add_draft_column().unwrap();
        canvas.add_draft_row().unwrap();
        assert!(matches!(
            canvas.save_edit(),
            Err(CanvasError::Validation(ValidationError::BlankHeader { column: 2 }))
        ));

        canvas.set_draft_header(2, "Header 3").unwrap();
        canvas.set_draft_cell(0, 2, "Data 3").unwrap();
        for col in 0..3 {
            canvas.set_draft_cell(1, col, "x").unwrap();
        }
        canvas.save_edit().unwrap();

        let WidgetContent::Table(table) = &canvas.store().item(&id).unwrap().content else {
            panic!("expected table");
        };
        assert_eq!(table.headers.len(), 3);
        assert_eq!(table.rows.len(), 2);
    }

    #[test]
    fn test_table_helpers_reject_other_kinds() {
        let mut canvas = Canvas::new();
        let id = canvas.drop_widget(&payload(WidgetKind::Card), 0, 0).unwrap();
        assert!(matches!(canvas.add_draft_row(), Err(CanvasError::NotEditing)));
        canvas.begin_edit(&id).unwrap();
        assert!(matches!(canvas.add_draft_row(), Err(CanvasError::NotATable(_))));
    }

    #[test]
    fn test_save_after_widget_undone() {
        let mut canvas = Canvas::new();
        let id = canvas.drop_widget(&payload(WidgetKind::Text), 0, 0).unwrap();
        canvas.begin_edit(&id).unwrap();
        canvas.undo();

        assert!(matches!(canvas.save_edit(), Err(CanvasError::UnknownWidget(_))));
        assert_eq!(canvas.editing(), None);
        assert!(canvas.store().is_empty());
    }

    #[test]
    fn test_cancel_and_delete_close_edit() {
        let mut canvas = Canvas::new();
        let id = canvas.drop_widget(&payload(WidgetKind::Card), 0, 0).unwrap();

        canvas.begin_edit(&id).unwrap();
        assert!(canvas.cancel_edit());
        assert!(!canvas.cancel_edit());

        canvas.begin_edit(&id).unwrap();
        canvas.delete_widget(&id).unwrap();
        assert_eq!(canvas.editing(), None);
    }

    #[test]
    fn test_click_default_button() {
        let mut canvas = Canvas::new();
        let id = canvas.drop_widget(&payload(WidgetKind::Button), 0, 0).unwrap();
        let version = canvas.store().version();

        let effects = canvas.click_button(&id).unwrap();
        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].channel, ActionChannel::Log);
        assert_eq!(effects[0].message, "clicked");
        assert_eq!(canvas.store().version(), version);
    }

    #[test]
    fn test_click_failing_action_is_swallowed() {
        let mut canvas = Canvas::new();
        let id = canvas.drop_widget(&payload(WidgetKind::Button), 0, 0).unwrap();
        canvas.begin_edit(&id).unwrap();
        canvas.set_draft_field("action", "window.location = 'x'").unwrap();
        canvas.save_edit().unwrap();

        assert_eq!(canvas.click_button(&id).unwrap(), vec![]);

        let text = canvas.drop_widget(&payload(WidgetKind::Text), 0, 0).unwrap();
        assert!(matches!(canvas.click_button(&text), Err(CanvasError::NotAButton(_))));
    }

    struct Rejecting;

    impl ActionEvaluator for Rejecting {
        fn evaluate(&self, _source: &str) -> Result<Vec<ActionEffect>, ActionError> {
            Err(ActionError::UnexpectedEnd)
        }
    }

    #[test]
    fn test_custom_evaluator() {
        let mut canvas = Canvas::new().with_evaluator(Box::new(Rejecting));
        let id = canvas.drop_widget(&payload(WidgetKind::Button), 0, 0).unwrap();
        assert!(canvas.click_button(&id).unwrap().is_empty());
    }

    #[test]
    fn test_clear_abandons_edit() {
        let mut canvas = Canvas::new();
        let id = canvas.drop_widget(&payload(WidgetKind::Text), 0, 0).unwrap();
        canvas.begin_edit(&id).unwrap();
        assert!(canvas.clear());
        assert_eq!(canvas.editing(), None);
        assert!(!canvas.clear());
        assert!(canvas.undo());
        assert_eq!(canvas.store().len(), 1);
    }
}
