//! Grid span heuristics keyed on widget kind.

use super::{WidgetContent, WidgetRecord};
use crate::layout::{GRID_COLUMNS, ROW_HEIGHT_PX};
use serde::{Deserialize, Serialize};

/// Height of the table header row, in pixels.
const TABLE_HEADER_PX: usize = 40;
/// Height of one table data row, in pixels.
const TABLE_ROW_PX: usize = 40;
/// Fixed vertical padding around a table, in pixels.
const TABLE_PADDING_PX: usize = 20;

/// Width and height of a widget in grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpan {
    pub w: u32,
    pub h: u32,
}

impl GridSpan {
    pub const fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }
}

/// Character count, so multi-byte text sizes the same as ASCII. Characters
/// outside the Basic Multilingual Plane count once.
fn len(s: &str) -> usize {
    s.chars().count()
}

fn to_span(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Suggest a grid span for a widget based on the shape of its content.
///
/// Pure and deterministic; the result depends only on the widget value.
pub fn suggest_size(widget: &WidgetRecord) -> GridSpan {
    match &widget.content {
        WidgetContent::Text(text) => {
            let n = len(&text.content);
            GridSpan::new(
                to_span(n.div_ceil(20).clamp(2, 6)),
                to_span(n.div_ceil(60).max(1)),
            )
        }
        WidgetContent::Button(_) => GridSpan::new(2, 1),
        WidgetContent::Image(_) => GridSpan::new(4, 3),
        WidgetContent::Card(card) => {
            let title = len(&card.title);
            let description = len(&card.description);
            GridSpan::new(
                to_span((title + description).div_ceil(40).clamp(3, 6)),
                to_span((title.div_ceil(30) + description.div_ceil(60)).min(4)),
            )
        }
        WidgetContent::Table(table) => {
            let height_px = TABLE_HEADER_PX + TABLE_ROW_PX * table.rows.len() + TABLE_PADDING_PX;
            GridSpan::new(
                to_span((2 * table.headers.len()).min(GRID_COLUMNS as usize)),
                to_span(height_px.div_ceil(ROW_HEIGHT_PX as usize)),
            )
        }
        WidgetContent::Unrecognized { .. } => GridSpan::new(3, 2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("c{}", i)).collect()
    }

    #[test]
    fn test_text_width_clamped() {
        assert_eq!(suggest_size(&WidgetRecord::text("t", "")), GridSpan::new(2, 1));
        assert_eq!(suggest_size(&WidgetRecord::text("t", "a".repeat(61))), GridSpan::new(4, 2));
        assert_eq!(suggest_size(&WidgetRecord::text("t", "a".repeat(500))), GridSpan::new(6, 9));
    }

    #[test]
    fn test_text_counts_characters() {
        // 41 emoji are 82 UTF-16 units but 41 characters.
        let text = WidgetRecord::text("t", "\u{1F600}".repeat(41));
        assert_eq!(suggest_size(&text), GridSpan::new(3, 1));
    }

    #[test]
    fn test_fixed_sizes() {
        assert_eq!(suggest_size(&WidgetRecord::button("b", "x", "y")), GridSpan::new(2, 1));
        assert_eq!(suggest_size(&WidgetRecord::image("i", "u", "a")), GridSpan::new(4, 3));
        let unknown = WidgetRecord::new(
            "u",
            WidgetContent::Unrecognized {
                kind: "slider".to_string(),
                fields: Default::default(),
            },
        );
        assert_eq!(suggest_size(&unknown), GridSpan::new(3, 2));
    }

    #[test]
    fn test_card_span() {
        // Short card: minimum width, one line each for title and description.
        assert_eq!(suggest_size(&WidgetRecord::card("c", "Hi", "There")), GridSpan::new(3, 2));
        // Empty card collapses to zero height.
        assert_eq!(suggest_size(&WidgetRecord::card("c", "", "")), GridSpan::new(3, 0));
        // Long card caps at 6 wide and 4 high.
        let card = WidgetRecord::card("c", "t".repeat(100), "d".repeat(400));
        assert_eq!(suggest_size(&card), GridSpan::new(6, 4));
    }

    #[test]
    fn test_table_three_headers_two_rows() {
        let table = WidgetRecord::table("t", strings(3), vec![strings(3), strings(3)]);
        assert_eq!(suggest_size(&table), GridSpan::new(6, 2));
    }

    #[test]
    fn test_table_width_capped() {
        let table = WidgetRecord::table("t", strings(9), vec![]);
        assert_eq!(suggest_size(&table), GridSpan::new(12, 1));
    }

    #[test]
    fn test_deterministic() {
        let widget = WidgetRecord::card("c", "Title", "Some description");
        assert_eq!(suggest_size(&widget), suggest_size(&widget.clone()));
    }
}
