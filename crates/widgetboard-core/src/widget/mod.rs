//! Widget model for the board.
//!
//! A widget is the content half of a placed element: an id plus one of five
//! kinds of payload. Its grid rectangle lives separately in a
//! [`LayoutRecord`](crate::layout::LayoutRecord) with the same id.
//!
//! Widgets are pure data. Sizing heuristics live in [`size`] and the
//! required-field check in [`validate`]; both dispatch exhaustively on kind.

mod size;
mod validate;

pub use size::{GridSpan, suggest_size};
pub use validate::{ValidationError, validate};

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Identifier shared by a widget and its layout record.
pub type WidgetId = String;

/// The five kinds of widget that can be placed on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetKind {
    Text,
    Button,
    Image,
    Card,
    Table,
}

impl WidgetKind {
    /// Name used in ids, payloads and the persisted format.
    pub fn name(&self) -> &'static str {
        match self {
            WidgetKind::Text => "text",
            WidgetKind::Button => "button",
            WidgetKind::Image => "image",
            WidgetKind::Card => "card",
            WidgetKind::Table => "table",
        }
    }

    /// Look up a kind by its name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|kind| kind.name() == name)
    }

    /// All widget kinds.
    pub fn all() -> &'static [WidgetKind] {
        &[
            WidgetKind::Text,
            WidgetKind::Button,
            WidgetKind::Image,
            WidgetKind::Card,
            WidgetKind::Table,
        ]
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Visual style of a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonVariant {
    #[default]
    Primary,
    Secondary,
    Outline,
}

impl ButtonVariant {
    /// Look up a variant by its name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "primary" => Some(ButtonVariant::Primary),
            "secondary" => Some(ButtonVariant::Secondary),
            "outline" => Some(ButtonVariant::Outline),
            _ => None,
        }
    }
}

/// Plain text block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextContent {
    pub content: String,
}

/// Clickable button with a scripted action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonContent {
    /// Button label.
    pub content: String,
    /// Behavior expression evaluated on click.
    #[serde(default)]
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<ButtonVariant>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageContent {
    pub url: String,
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardContent {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub expanded: bool,
}

/// Table with a header row and zero or more data rows.
///
/// Every row is expected to have exactly `headers.len()` cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableContent {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableContent {
    /// Append an empty column to the header and every row.
    pub fn add_column(&mut self) {
        self.headers.push(String::new());
        for row in &mut self.rows {
            row.push(String::new());
        }
    }

    /// Append an empty row sized to the header.
    pub fn add_row(&mut self) {
        self.rows.push(vec![String::new(); self.headers.len()]);
    }

    /// Check that every row matches the header length.
    pub fn is_rectangular(&self) -> bool {
        self.rows.iter().all(|row| row.len() == self.headers.len())
    }
}

/// Kind-specific payload of a widget.
///
/// Serialized internally tagged by `type`. A kind this build does not know
/// is kept as [`WidgetContent::Unrecognized`] and written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetContent {
    Text(TextContent),
    Button(ButtonContent),
    Image(ImageContent),
    Card(CardContent),
    Table(TableContent),
    Unrecognized {
        /// The `type` tag as found.
        kind: String,
        /// Every other field of the record except the id.
        fields: Map<String, Value>,
    },
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum KnownRef<'a> {
    Text(&'a TextContent),
    Button(&'a ButtonContent),
    Image(&'a ImageContent),
    Card(&'a CardContent),
    Table(&'a TableContent),
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Known {
    Text(TextContent),
    Button(ButtonContent),
    Image(ImageContent),
    Card(CardContent),
    Table(TableContent),
}

impl Serialize for WidgetContent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let known = match self {
            WidgetContent::Text(c) => KnownRef::Text(c),
            WidgetContent::Button(c) => KnownRef::Button(c),
            WidgetContent::Image(c) => KnownRef::Image(c),
            WidgetContent::Card(c) => KnownRef::Card(c),
            WidgetContent::Table(c) => KnownRef::Table(c),
            WidgetContent::Unrecognized { kind, fields } => {
                let mut map = serializer.serialize_map(Some(fields.len() + 1))?;
                map.serialize_entry("type", kind)?;
                for (key, value) in fields.iter().filter(|(key, _)| key.as_str() != "type") {
                    map.serialize_entry(key, value)?;
                }
                return map.end();
            }
        };
        known.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for WidgetContent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut fields = Map::<String, Value>::deserialize(deserializer)?;
        let kind = match fields.get("type") {
            Some(Value::String(kind)) => kind.clone(),
            Some(other) => {
                return Err(D::Error::custom(format!(
                    "widget type must be a string, got {}",
                    other
                )));
            }
            None => return Err(D::Error::missing_field("type")),
        };
        if WidgetKind::from_name(&kind).is_none() {
            fields.remove("type");
            return Ok(WidgetContent::Unrecognized { kind, fields });
        }
        let known = serde_json::from_value(Value::Object(fields)).map_err(D::Error::custom)?;
        Ok(match known {
            Known::Text(c) => WidgetContent::Text(c),
            Known::Button(c) => WidgetContent::Button(c),
            Known::Image(c) => WidgetContent::Image(c),
            Known::Card(c) => WidgetContent::Card(c),
            Known::Table(c) => WidgetContent::Table(c),
        })
    }
}

impl WidgetContent {
    /// Default content for a freshly dropped widget.
    pub fn default_for(kind: WidgetKind) -> Self {
        match kind {
            WidgetKind::Text => WidgetContent::Text(TextContent {
                content: "Double click to edit text".to_string(),
            }),
            WidgetKind::Button => WidgetContent::Button(ButtonContent {
                content: "Click me".to_string(),
                action: r#"console.log("clicked")"#.to_string(),
                variant: Some(ButtonVariant::Primary),
            }),
            WidgetKind::Image => WidgetContent::Image(ImageContent {
                url: String::new(),
                alt: "Image description".to_string(),
            }),
            WidgetKind::Card => WidgetContent::Card(CardContent {
                title: "Card Title".to_string(),
                description: "Card description".to_string(),
                expanded: false,
            }),
            WidgetKind::Table => WidgetContent::Table(TableContent {
                headers: vec!["Header 1".to_string(), "Header 2".to_string()],
                rows: vec![vec!["Data 1".to_string(), "Data 2".to_string()]],
            }),
        }
    }

    /// The kind of this content, or `None` if unrecognized.
    pub fn kind(&self) -> Option<WidgetKind> {
        match self {
            WidgetContent::Text(_) => Some(WidgetKind::Text),
            WidgetContent::Button(_) => Some(WidgetKind::Button),
            WidgetContent::Image(_) => Some(WidgetKind::Image),
            WidgetContent::Card(_) => Some(WidgetKind::Card),
            WidgetContent::Table(_) => Some(WidgetKind::Table),
            WidgetContent::Unrecognized { .. } => None,
        }
    }
}

/// Error when editing a named field of a widget.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{kind} widgets have no field '{field}'")]
    UnknownField { kind: String, field: String },
    #[error("Invalid value for '{field}': {value}")]
    InvalidValue { field: String, value: String },
    #[error("Cell ({row}, {column}) is out of range")]
    OutOfRange { row: usize, column: usize },
}

/// A placed widget: its id plus kind-specific content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetRecord {
    #[serde(rename = "i")]
    pub id: WidgetId,
    #[serde(flatten)]
    pub content: WidgetContent,
}

impl WidgetRecord {
    pub fn new(id: impl Into<WidgetId>, content: WidgetContent) -> Self {
        Self {
            id: id.into(),
            content,
        }
    }

    pub fn text(id: impl Into<WidgetId>, content: impl Into<String>) -> Self {
        Self::new(
            id,
            WidgetContent::Text(TextContent {
                content: content.into(),
            }),
        )
    }

    pub fn button(
        id: impl Into<WidgetId>,
        content: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self::new(
            id,
            WidgetContent::Button(ButtonContent {
                content: content.into(),
                action: action.into(),
                variant: None,
            }),
        )
    }

    pub fn image(id: impl Into<WidgetId>, url: impl Into<String>, alt: impl Into<String>) -> Self {
        Self::new(
            id,
            WidgetContent::Image(ImageContent {
                url: url.into(),
                alt: alt.into(),
            }),
        )
    }

    pub fn card(
        id: impl Into<WidgetId>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self::new(
            id,
            WidgetContent::Card(CardContent {
                title: title.into(),
                description: description.into(),
                expanded: false,
            }),
        )
    }

    pub fn table(id: impl Into<WidgetId>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self::new(id, WidgetContent::Table(TableContent { headers, rows }))
    }

    /// The widget kind, or `None` for unrecognized content.
    pub fn kind(&self) -> Option<WidgetKind> {
        self.content.kind()
    }

    /// Name of the kind as persisted, including unrecognized content.
    pub fn kind_name(&self) -> &str {
        match &self.content {
            WidgetContent::Unrecognized { kind, .. } => kind,
            content => content.kind().map_or("", |k| k.name()),
        }
    }

    /// Set a named string field on the widget.
    ///
    /// Field names follow the persisted format (`content`, `action`,
    /// `variant`, `url`, `alt`, `title`, `description`, `expanded`).
    pub fn set_field(&mut self, field: &str, value: &str) -> Result<(), FieldError> {
        let unknown = |kind: &str| FieldError::UnknownField {
            kind: kind.to_string(),
            field: field.to_string(),
        };
        let invalid = || FieldError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        };
        let kind = self.kind_name().to_string();

        match &mut self.content {
            WidgetContent::Text(text) => match field {
                "content" => text.content = value.to_string(),
                _ => return Err(unknown(&kind)),
            },
            WidgetContent::Button(button) => match field {
                "content" => button.content = value.to_string(),
                "action" => button.action = value.to_string(),
                "variant" => {
                    button.variant = Some(ButtonVariant::from_name(value).ok_or_else(invalid)?)
                }
                _ => return Err(unknown(&kind)),
            },
            WidgetContent::Image(image) => match field {
                "url" => image.url = value.to_string(),
                "alt" => image.alt = value.to_string(),
                _ => return Err(unknown(&kind)),
            },
            WidgetContent::Card(card) => match field {
                "title" => card.title = value.to_string(),
                "description" => card.description = value.to_string(),
                "expanded" => card.expanded = value.parse().map_err(|_| invalid())?,
                _ => return Err(unknown(&kind)),
            },
            WidgetContent::Table(_) | WidgetContent::Unrecognized { .. } => {
                return Err(unknown(&kind));
            }
        }
        Ok(())
    }

    /// Set a table header cell.
    pub fn set_header(&mut self, column: usize, value: &str) -> Result<(), FieldError> {
        let kind = self.kind_name().to_string();
        let WidgetContent::Table(table) = &mut self.content else {
            return Err(FieldError::UnknownField {
                kind,
                field: "headers".to_string(),
            });
        };
        let header = table
            .headers
            .get_mut(column)
            .ok_or(FieldError::OutOfRange { row: 0, column })?;
        *header = value.to_string();
        Ok(())
    }

    /// Set a table data cell.
    pub fn set_cell(&mut self, row: usize, column: usize, value: &str) -> Result<(), FieldError> {
        let kind = self.kind_name().to_string();
        let WidgetContent::Table(table) = &mut self.content else {
            return Err(FieldError::UnknownField {
                kind,
                field: "rows".to_string(),
            });
        };
        let cell = table
            .rows
            .get_mut(row)
            .and_then(|r| r.get_mut(column))
            .ok_or(FieldError::OutOfRange { row, column })?;
        *cell = value.to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_round_trip() {
        for kind in WidgetKind::all() {
            assert_eq!(WidgetKind::from_name(kind.name()), Some(*kind));
        }
        assert_eq!(WidgetKind::from_name("slider"), None);
    }

    #[test]
    fn test_persisted_shape() {
        let widget = WidgetRecord::text("text-1", "hello");
        let json = serde_json::to_value(&widget).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "i": "text-1", "type": "text", "content": "hello" })
        );
    }

    #[test]
    fn test_button_without_optional_fields() {
        let json = r#"{ "i": "button-1", "type": "button", "content": "Go" }"#;
        let widget: WidgetRecord = serde_json::from_str(json).unwrap();
        match widget.content {
            WidgetContent::Button(button) => {
                assert_eq!(button.content, "Go");
                assert!(button.action.is_empty());
                assert_eq!(button.variant, None);
            }
            other => panic!("expected button, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_kind_is_unrecognized() {
        let json = r#"{ "i": "slider-1", "type": "slider", "min": 0 }"#;
        let widget: WidgetRecord = serde_json::from_str(json).unwrap();
        assert_eq!(widget.id, "slider-1");
        assert_eq!(widget.kind(), None);
        assert_eq!(widget.kind_name(), "slider");
    }

    #[test]
    fn test_unknown_kind_saved_back_unchanged() {
        let json = serde_json::json!({
            "i": "slider-1",
            "type": "slider",
            "min": 0,
            "range": { "max": 10, "step": 0.5 }
        });
        let widget: WidgetRecord = serde_json::from_value(json.clone()).unwrap();
        let WidgetContent::Unrecognized { kind, fields } = &widget.content else {
            panic!("expected unrecognized content");
        };
        assert_eq!(kind, "slider");
        assert_eq!(fields.len(), 2);
        assert_eq!(serde_json::to_value(&widget).unwrap(), json);
    }

    #[test]
    fn test_bad_type_tag_rejected() {
        assert!(serde_json::from_str::<WidgetRecord>(r#"{ "i": "x", "content": "a" }"#).is_err());
        assert!(serde_json::from_str::<WidgetRecord>(r#"{ "i": "x", "type": 3 }"#).is_err());
        // A known kind still needs its own fields.
        assert!(serde_json::from_str::<WidgetRecord>(r#"{ "i": "x", "type": "image" }"#).is_err());
    }

    #[test]
    fn test_default_content_per_kind() {
        for kind in WidgetKind::all() {
            assert_eq!(WidgetContent::default_for(*kind).kind(), Some(*kind));
        }
        let WidgetContent::Table(table) = WidgetContent::default_for(WidgetKind::Table) else {
            panic!("expected table");
        };
        assert!(table.is_rectangular());
    }

    #[test]
    fn test_table_add_column_and_row() {
        let mut table = TableContent {
            headers: vec!["A".into()],
            rows: vec![vec!["1".into()]],
        };
        table.add_column();
        table.add_row();
        assert_eq!(table.headers, vec!["A".to_string(), String::new()]);
        assert_eq!(table.rows.len(), 2);
        assert!(table.is_rectangular());
    }

    #[test]
    fn test_set_field() {
        let mut widget = WidgetRecord::button("b", "Go", "alert('x')");
        widget.set_field("content", "Stop").unwrap();
        widget.set_field("variant", "outline").unwrap();
        let WidgetContent::Button(button) = &widget.content else {
            panic!("expected button");
        };
        assert_eq!(button.content, "Stop");
        assert_eq!(button.variant, Some(ButtonVariant::Outline));

        assert!(matches!(
            widget.set_field("url", "x"),
            Err(FieldError::UnknownField { .. })
        ));
        assert!(matches!(
            widget.set_field("variant", "loud"),
            Err(FieldError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_set_card_expanded() {
        let mut widget = WidgetRecord::card("c", "Title", "Body");
        widget.set_field("expanded", "true").unwrap();
        let WidgetContent::Card(card) = &widget.content else {
            panic!("expected card");
        };
        assert!(card.expanded);
        assert_eq!(
            widget.set_field("expanded", "yes"),
            Err(FieldError::InvalidValue {
                field: "expanded".to_string(),
                value: "yes".to_string()
            })
        );
    }

    #[test]
    fn test_set_cell_out_of_range() {
        let mut widget = WidgetRecord::table("t", vec!["A".into()], vec![vec!["1".into()]]);
        widget.set_cell(0, 0, "2").unwrap();
        widget.set_header(0, "B").unwrap();
        assert_eq!(
            widget.set_cell(1, 0, "x"),
            Err(FieldError::OutOfRange { row: 1, column: 0 })
        );
    }
}
