//! Required-field checks run before an edit is committed.

use super::{WidgetContent, WidgetKind, WidgetRecord};
use thiserror::Error;

/// The first required field of a widget that is missing or blank.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{kind} {field} is required")]
    BlankField {
        kind: WidgetKind,
        field: &'static str,
    },
    #[error("Table header {} is required", .column + 1)]
    BlankHeader { column: usize },
    #[error("Table cell at row {}, column {} is required", .row + 1, .column + 1)]
    BlankCell { row: usize, column: usize },
    #[error("Table row {} has {found} cells, expected {expected}", .row + 1)]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

fn require(kind: WidgetKind, field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::BlankField { kind, field })
    } else {
        Ok(())
    }
}

/// Check the required fields of a widget, stopping at the first failure.
///
/// Unrecognized widgets are always valid.
pub fn validate(widget: &WidgetRecord) -> Result<(), ValidationError> {
    match &widget.content {
        WidgetContent::Text(text) => require(WidgetKind::Text, "content", &text.content),
        WidgetContent::Button(button) => {
            require(WidgetKind::Button, "content", &button.content)?;
            require(WidgetKind::Button, "action", &button.action)
        }
        WidgetContent::Image(image) => {
            require(WidgetKind::Image, "url", &image.url)?;
            require(WidgetKind::Image, "alt", &image.alt)
        }
        WidgetContent::Card(card) => {
            require(WidgetKind::Card, "title", &card.title)?;
            require(WidgetKind::Card, "description", &card.description)
        }
        WidgetContent::Table(table) => {
            if let Some(column) = table.headers.iter().position(|h| h.trim().is_empty()) {
                return Err(ValidationError::BlankHeader { column });
            }
            for (row, cells) in table.rows.iter().enumerate() {
                if let Some(column) = cells.iter().position(|c| c.trim().is_empty()) {
                    return Err(ValidationError::BlankCell { row, column });
                }
            }
            match table
                .rows
                .iter()
                .position(|cells| cells.len() != table.headers.len())
            {
                Some(row) => Err(ValidationError::RaggedRow {
                    row,
                    expected: table.headers.len(),
                    found: table.rows[row].len(),
                }),
                None => Ok(()),
            }
        }
        WidgetContent::Unrecognized { .. } => Ok(()),
    }
}
