//! Widget palette and the drag payload it hands to the board.

use crate::widget::WidgetKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Key the payload travels under in the platform drag-and-drop data channel.
pub const DRAG_DATA_KEY: &str = "widget";

/// Reasons a drag payload is rejected.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("Malformed drag payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Unknown widget kind: {0}")]
    UnknownKind(String),
}

/// One draggable entry in the palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteEntry {
    pub kind: WidgetKind,
    pub title: &'static str,
    pub description: &'static str,
}

impl PaletteEntry {
    /// The payload carried when this entry is dragged.
    pub fn payload(&self) -> DragPayload {
        DragPayload {
            kind: self.kind,
            title: self.title.to_string(),
            description: self.description.to_string(),
        }
    }
}

const PALETTE: &[PaletteEntry] = &[
    PaletteEntry {
        kind: WidgetKind::Text,
        title: "Text Block",
        description: "Add a block of text",
    },
    PaletteEntry {
        kind: WidgetKind::Image,
        title: "Image",
        description: "Insert an image",
    },
    PaletteEntry {
        kind: WidgetKind::Button,
        title: "Button",
        description: "Add a button",
    },
    PaletteEntry {
        kind: WidgetKind::Card,
        title: "Card",
        description: "Add a card component",
    },
    PaletteEntry {
        kind: WidgetKind::Table,
        title: "Table",
        description: "Insert a data table",
    },
];

/// Palette entries in display order.
pub fn palette() -> &'static [PaletteEntry] {
    PALETTE
}

/// Descriptor dragged from the palette onto the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DragPayload {
    #[serde(rename = "type")]
    pub kind: WidgetKind,
    pub title: String,
    pub description: String,
}

/// Wire form, with the kind left as a string so unknown kinds get their own error.
#[derive(Deserialize)]
struct RawPayload {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
}

impl DragPayload {
    /// Serialize for the drag data channel.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a payload read from the drag data channel.
    pub fn parse(json: &str) -> Result<Self, PayloadError> {
        let raw: RawPayload = serde_json::from_str(json)?;
        let kind = WidgetKind::from_name(&raw.kind).ok_or(PayloadError::UnknownKind(raw.kind))?;
        Ok(Self {
            kind,
            title: raw.title,
            description: raw.description,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_covers_every_kind() {
        let kinds: Vec<WidgetKind> = palette().iter().map(|e| e.kind).collect();
        assert_eq!(kinds.len(), WidgetKind::all().len());
        for kind in WidgetKind::all() {
            assert!(kinds.contains(kind));
        }
        assert_eq!(palette()[0].title, "Text Block");
    }

    #[test]
    fn test_payload_wire_format() {
        let json = palette()[2].payload().to_json().unwrap();
        assert_eq!(
            json,
            r#"{"type":"button","title":"Button","description":"Add a button"}"#
        );
        assert_eq!(DragPayload::parse(&json).unwrap(), palette()[2].payload());
    }

    #[test]
    fn test_parse_ignores_extra_fields() {
        let payload = DragPayload::parse(r#"{"type":"card","title":"Card","icon":{}}"#).unwrap();
        assert_eq!(payload.kind, WidgetKind::Card);
        assert!(payload.description.is_empty());
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(
            DragPayload::parse("not json"),
            Err(PayloadError::Malformed(_))
        ));
        assert!(matches!(
            DragPayload::parse(r#"{"title":"x"}"#),
            Err(PayloadError::Malformed(_))
        ));
        assert!(matches!(
            DragPayload::parse(r#"{"type":"slider"}"#),
            Err(PayloadError::UnknownKind(kind)) if kind == "slider"
        ));
    }
}
