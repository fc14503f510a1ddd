//! Line-oriented board shell.
//!
//! Reads [`Command`]s, drives a [`Canvas`] and keeps the board persisted
//! through an [`AutoSaveManager`].

use crate::commands::{Command, CommandRegistry};
use std::io::{self, BufRead, Write};
use widgetboard_core::storage::{AutoSaveManager, Storage};
use widgetboard_core::{Canvas, CanvasError, WidgetKind, palette};

/// Whether the shell keeps reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Shell<S: Storage> {
    canvas: Canvas,
    autosave: AutoSaveManager<S>,
    /// Store version last handed to auto-save.
    seen_version: u64,
}

impl<S: Storage> Shell<S> {
    pub fn new(canvas: Canvas, autosave: AutoSaveManager<S>) -> Self {
        let seen_version = canvas.store().version();
        Self {
            canvas,
            autosave,
            seen_version,
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn autosave(&self) -> &AutoSaveManager<S> {
        &self.autosave
    }

    /// Read commands until `quit` or end of input, then save pending changes.
    pub fn run(&mut self, input: impl BufRead, out: &mut impl Write) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;
            match Command::parse(&line) {
                Ok(Some(command)) => {
                    if self.execute(command, out)? == Flow::Quit {
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => writeln!(out, "error: {}", e)?,
            }
        }
        self.flush();
        Ok(())
    }

    /// Execute one command, writing its output to `out`.
    pub fn execute(&mut self, command: Command, out: &mut impl Write) -> io::Result<Flow> {
        match self.dispatch(command, out) {
            Ok(flow) => {
                self.track_changes();
                Ok(flow)
            }
            Err(ShellError::Canvas(e)) => {
                writeln!(out, "error: {}", e)?;
                Ok(Flow::Continue)
            }
            Err(ShellError::Io(e)) => Err(e),
        }
    }

    fn dispatch(&mut self, command: Command, out: &mut impl Write) -> Result<Flow, ShellError> {
        match command {
            Command::Palette => {
                for entry in palette() {
                    writeln!(out, "{:8} {:12} {}", entry.kind, entry.title, entry.description)?;
                }
            }
            Command::Drop { kind, x, y } => {
                let id = self.canvas.drop_widget(&drag_data(&kind), x, y)?;
                writeln!(out, "added {}", id)?;
            }
            Command::Move { id, x, y } => self.canvas.move_widget(&id, x, y)?,
            Command::Resize { id, w, h } => self.canvas.resize_widget(&id, w, h)?,
            Command::Fit { id } => {
                self.canvas.fit_widget(&id)?;
                if let Some(layout) = self.canvas.store().layout(&id) {
                    writeln!(out, "{} is now {}x{}", id, layout.w, layout.h)?;
                }
            }
            Command::Edit { id } => {
                self.canvas.begin_edit(&id)?;
                writeln!(out, "editing {}", id)?;
            }
            Command::Set { field, value } => self.canvas.set_draft_field(&field, &value)?,
            Command::Header { column, value } => self.canvas.set_draft_header(column, &value)?,
            Command::Cell { row, column, value } => {
                self.canvas.set_draft_cell(row, column, &value)?
            }
            Command::AddColumn => self.canvas.add_draft_column()?,
            Command::AddRow => self.canvas.add_draft_row()?,
            Command::Save => {
                let id = self.canvas.editing().map(str::to_string);
                self.canvas.save_edit()?;
                if let Some(id) = id {
                    writeln!(out, "saved {}", id)?;
                }
            }
            Command::Cancel => {
                if !self.canvas.cancel_edit() {
                    writeln!(out, "nothing to cancel")?;
                }
            }
            Command::Delete { id } => self.canvas.delete_widget(&id)?,
            Command::Click { id } => {
                for effect in self.canvas.click_button(&id)? {
                    writeln!(out, "[{:?}] {}", effect.channel, effect.message)?;
                }
            }
            Command::Undo => {
                if !self.canvas.undo() {
                    writeln!(out, "nothing to undo")?;
                }
            }
            Command::Redo => {
                if !self.canvas.redo() {
                    writeln!(out, "nothing to redo")?;
                }
            }
            Command::Clear => {
                if !self.canvas.clear() {
                    writeln!(out, "board is already empty")?;
                }
            }
            Command::List => self.list(out)?,
            Command::Show { id } => {
                let item = self
                    .canvas
                    .store()
                    .item(&id)
                    .ok_or_else(|| CanvasError::UnknownWidget(id.clone()))?;
                let json = serde_json::to_string_pretty(item)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
                writeln!(out, "{}", json)?;
            }
            Command::Status => self.status(out)?,
            Command::Persist => {
                self.track_changes();
                let board = self.canvas.store().to_persisted();
                match pollster::block_on(self.autosave.save(&board)) {
                    Ok(()) => writeln!(out, "saved board '{}'", self.autosave.key())?,
                    Err(e) => writeln!(out, "error: {}", e)?,
                }
            }
            Command::Help => write!(out, "{}", CommandRegistry::help_text())?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn list(&self, out: &mut impl Write) -> io::Result<()> {
        let store = self.canvas.store();
        if store.is_empty() {
            return writeln!(out, "(empty board)");
        }
        for layout in store.layouts() {
            let kind = store.item(&layout.id).map_or("?", |item| item.kind_name());
            writeln!(
                out,
                "{:24} {:7} x={} y={} w={} h={}",
                layout.id, kind, layout.x, layout.y, layout.w, layout.h
            )?;
        }
        Ok(())
    }

    fn status(&self, out: &mut impl Write) -> io::Result<()> {
        let store = self.canvas.store();
        writeln!(
            out,
            "{} widgets, {} undo, {} redo, editing: {}, unsaved: {}",
            store.len(),
            store.history().undo_depth(),
            store.history().redo_depth(),
            self.canvas.editing().unwrap_or("none"),
            if self.autosave.is_dirty() { "yes" } else { "no" }
        )
    }

    /// Mark the board dirty if the store changed, then auto-save if due.
    fn track_changes(&mut self) {
        let version = self.canvas.store().version();
        if version != self.seen_version {
            self.seen_version = version;
            self.autosave.mark_dirty();
        }
        if self.autosave.should_save() {
            let board = self.canvas.store().to_persisted();
            if let Err(e) = pollster::block_on(self.autosave.maybe_save(&board)) {
                log::warn!("Auto-save failed: {}", e);
            }
        }
    }

    /// Save any unsaved changes regardless of the interval.
    pub fn flush(&mut self) {
        self.track_changes();
        if !self.autosave.is_dirty() {
            return;
        }
        let board = self.canvas.store().to_persisted();
        if let Err(e) = pollster::block_on(self.autosave.save(&board)) {
            log::error!("Failed to save board on exit: {}", e);
        }
    }
}

enum ShellError {
    Canvas(CanvasError),
    Io(io::Error),
}

impl From<CanvasError> for ShellError {
    fn from(e: CanvasError) -> Self {
        ShellError::Canvas(e)
    }
}

impl From<io::Error> for ShellError {
    fn from(e: io::Error) -> Self {
        ShellError::Io(e)
    }
}

/// Drag data for a kind name. Unknown names still produce a payload so the
/// canvas rejects them the same way it rejects a foreign drag.
fn drag_data(kind: &str) -> String {
    let entry = WidgetKind::from_name(kind)
        .and_then(|kind| palette().iter().find(|entry| entry.kind == kind));
    match entry.map(|entry| entry.payload().to_json()) {
        Some(Ok(json)) => json,
        _ => serde_json::json!({ "type": kind }).to_string(),
    }
}
