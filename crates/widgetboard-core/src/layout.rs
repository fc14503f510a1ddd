//! Grid layout records and placement rules.

use crate::widget::{GridSpan, WidgetId};
use serde::{Deserialize, Serialize};

/// Number of columns on the board grid.
pub const GRID_COLUMNS: u32 = 12;

/// Pixel height of one grid row.
pub const ROW_HEIGHT_PX: u32 = 100;

/// Span given to a freshly dropped widget.
pub const DEFAULT_DROP_SPAN: GridSpan = GridSpan::new(4, 2);

/// Rightmost column a dropped widget may start in.
pub const MAX_DROP_COLUMN: u32 = 8;

/// Smallest span a widget can be resized to.
pub const MIN_WIDGET_SPAN: GridSpan = GridSpan::new(2, 1);

/// The grid rectangle assigned to one widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutRecord {
    #[serde(rename = "i")]
    pub id: WidgetId,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl LayoutRecord {
    pub fn new(id: impl Into<WidgetId>, x: u32, y: u32, w: u32, h: u32) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            w,
            h,
        }
    }

    pub fn span(&self) -> GridSpan {
        GridSpan::new(self.w, self.h)
    }

    /// Row just below this record.
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.h)
    }

    /// Copy of this record with its span raised to the minimum.
    pub fn clamped(&self) -> Self {
        Self {
            w: self.w.max(MIN_WIDGET_SPAN.w),
            h: self.h.max(MIN_WIDGET_SPAN.h),
            ..self.clone()
        }
    }
}

/// Lowest occupied row edge across all layouts (0 for an empty board).
pub fn content_bottom(layouts: &[LayoutRecord]) -> u32 {
    layouts.iter().map(LayoutRecord::bottom).max().unwrap_or(0)
}

/// Where a widget dropped on grid cell (`cell_x`, `cell_y`) lands.
///
/// The column is clamped to `0..=MAX_DROP_COLUMN`. Drops below the existing
/// content are pulled up to sit directly under it.
pub fn drop_position(layouts: &[LayoutRecord], cell_x: i64, cell_y: i64) -> (u32, u32) {
    let x = cell_x.clamp(0, i64::from(MAX_DROP_COLUMN)) as u32;
    let bottom = content_bottom(layouts);
    let y = if cell_y > i64::from(bottom) {
        bottom
    } else {
        u32::try_from(cell_y.max(0)).unwrap_or(bottom)
    };
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persisted_shape() {
        let layout = LayoutRecord::new("text-1", 1, 2, 3, 4);
        let json = serde_json::to_value(&layout).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "i": "text-1", "x": 1, "y": 2, "w": 3, "h": 4 })
        );
    }

    #[test]
    fn test_content_bottom() {
        assert_eq!(content_bottom(&[]), 0);
        let layouts = vec![LayoutRecord::new("a", 0, 0, 4, 2), LayoutRecord::new("b", 4, 1, 4, 3)];
        assert_eq!(content_bottom(&layouts), 4);
    }

    #[test]
    fn test_drop_position_clamps_column() {
        assert_eq!(drop_position(&[], -3, 0), (0, 0));
        assert_eq!(drop_position(&[], 11, 0), (MAX_DROP_COLUMN, 0));
    }

    #[test]
    fn test_drop_below_content_pulls_up() {
        let layouts = vec![LayoutRecord::new("a", 0, 0, 4, 2)];
        assert_eq!(drop_position(&layouts, 2, 9), (2, 2));
        assert_eq!(drop_position(&layouts, 2, 1), (2, 1));
        assert_eq!(drop_position(&layouts, 2, -1), (2, 0));
    }

    #[test]
    fn test_clamped_span() {
        let layout = LayoutRecord::new("a", 0, 0, 1, 0).clamped();
        assert_eq!(layout.span(), MIN_WIDGET_SPAN);
    }
}
