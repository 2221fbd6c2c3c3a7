use std::ops::Range;

use crate::error::{TimelineError, TimelineResult};

use super::TimelineDataStore;

/// Vertical virtualization of the flattened row list.
///
/// Coordinates returned by `row_top` are content coordinates: `0` is the top
/// of the first row, independent of the current scroll offset.
pub trait RowSource {
    fn item_count(&self) -> usize;

    fn item_height(&self, index: usize) -> f64;

    fn row_top(&self, index: usize) -> f64;

    fn content_height(&self) -> f64;

    fn vertical_offset(&self) -> f64;

    /// Scrolls so that content coordinate `offset` is at the top of the
    /// viewport, clamped to the scrollable range.
    fn scroll_to(&mut self, offset: f64);

    /// First row intersecting the viewport.
    fn start_index(&self) -> usize;

    /// One past the last row intersecting the viewport.
    fn end_index(&self) -> usize;

    fn visible_items(&self) -> Range<usize> {
        self.start_index()..self.end_index()
    }
}

/// Row heights with a prefix-sum cache for O(log n) visibility queries.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowViewport {
    heights: Vec<f64>,
    /// `prefix[i]` is the top of row `i`; the last entry is the content height.
    prefix: Vec<f64>,
    offset: f64,
    viewport_height: f64,
}

impl RowViewport {
    pub fn new(viewport_height: f64) -> TimelineResult<Self> {
        let mut rows = Self {
            heights: Vec::new(),
            prefix: vec![0.0],
            offset: 0.0,
            viewport_height: 0.0,
        };
        rows.set_viewport_height(viewport_height)?;
        Ok(rows)
    }

    pub fn set_viewport_height(&mut self, viewport_height: f64) -> TimelineResult<()> {
        if !viewport_height.is_finite() || viewport_height < 0.0 {
            return Err(TimelineError::InvalidData(
                "row viewport height must be finite and >= 0".to_owned(),
            ));
        }
        self.viewport_height = viewport_height;
        self.scroll_to(self.offset);
        Ok(())
    }

    #[must_use]
    pub fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    /// Rebuilds the height cache from `store`, keeping the scroll offset
    /// when it is still in range.
    pub fn sync(&mut self, store: &dyn TimelineDataStore, default_height: f64) {
        self.set_heights((0..store.row_count()).map(|index| {
            store
                .row(index)
                .and_then(|row| row.row_height)
                .unwrap_or(default_height)
        }));
    }

    pub fn set_heights(&mut self, heights: impl IntoIterator<Item = f64>) {
        self.heights.clear();
        self.prefix.clear();
        self.prefix.push(0.0);
        let mut top = 0.0;
        for height in heights {
            let height = if height.is_finite() { height.max(0.0) } else { 0.0 };
            self.heights.push(height);
            top += height;
            self.prefix.push(top);
        }
        self.scroll_to(self.offset);
    }

    #[must_use]
    pub fn max_offset(&self) -> f64 {
        (self.content_height() - self.viewport_height).max(0.0)
    }

    pub fn scroll_by(&mut self, dy: f64) {
        if dy.is_finite() {
            self.scroll_to(self.offset + dy);
        }
    }

    /// Row containing content coordinate `y`.
    #[must_use]
    pub fn row_at(&self, y: f64) -> Option<usize> {
        if !y.is_finite() || y < 0.0 || y >= self.content_height() {
            return None;
        }
        let index = self.prefix[1..].partition_point(|&bottom| bottom <= y);
        (index < self.heights.len()).then_some(index)
    }
}

impl RowSource for RowViewport {
    fn item_count(&self) -> usize {
        self.heights.len()
    }

    fn item_height(&self, index: usize) -> f64 {
        self.heights.get(index).copied().unwrap_or(0.0)
    }

    fn row_top(&self, index: usize) -> f64 {
        let last = self.prefix.len() - 1;
        self.prefix[index.min(last)]
    }

    fn content_height(&self) -> f64 {
        self.prefix.last().copied().unwrap_or(0.0)
    }

    fn vertical_offset(&self) -> f64 {
        self.offset
    }

    fn scroll_to(&mut self, offset: f64) {
        let offset = if offset.is_finite() { offset } else { 0.0 };
        self.offset = offset.clamp(0.0, self.max_offset());
    }

    fn start_index(&self) -> usize {
        let offset = self.offset;
        self.prefix[1..]
            .partition_point(|&bottom| bottom <= offset)
            .min(self.heights.len())
    }

    fn end_index(&self) -> usize {
        let limit = self.offset + self.viewport_height;
        let count = self.heights.len();
        self.prefix[..count]
            .partition_point(|&top| top < limit)
            .max(self.start_index())
    }
}

#[cfg(test)]
mod tests {
    use super::{RowSource, RowViewport};

    #[test]
    fn visible_items_follow_scroll_offset() {
        let mut rows = RowViewport::new(100.0).expect("viewport");
        rows.set_heights([40.0; 10]);
        assert_eq!(rows.visible_items(), 0..3);

        rows.scroll_to(50.0);
        assert_eq!(rows.visible_items(), 1..4);
        assert_eq!(rows.row_top(3), 120.0);
    }

    #[test]
    fn scroll_is_clamped_to_content() {
        let mut rows = RowViewport::new(100.0).expect("viewport");
        rows.set_heights([40.0; 4]);
        rows.scroll_to(1_000.0);
        assert_eq!(rows.vertical_offset(), 60.0);
        rows.scroll_by(-500.0);
        assert_eq!(rows.vertical_offset(), 0.0);
    }

    #[test]
    fn row_at_uses_variable_heights() {
        let mut rows = RowViewport::new(200.0).expect("viewport");
        rows.set_heights([10.0, 30.0, 20.0]);
        assert_eq!(rows.row_at(5.0), Some(0));
        assert_eq!(rows.row_at(10.0), Some(1));
        assert_eq!(rows.row_at(45.0), Some(2));
        assert_eq!(rows.row_at(60.0), None);
    }

    #[test]
    fn empty_viewport_has_no_visible_items() {
        let rows = RowViewport::new(100.0).expect("viewport");
        assert_eq!(rows.visible_items(), 0..0);
        assert_eq!(rows.content_height(), 0.0);
    }
}
