use crate::core::{Point, Viewport};
use crate::error::{TimelineError, TimelineResult};
use crate::render::Renderer;

use super::{RowSource, TimelineEngine, TimelineEngineConfig};

impl<R: Renderer> TimelineEngine<R> {
    #[must_use]
    pub fn visible_range(&self) -> (f64, f64) {
        self.scale.visible_range()
    }

    #[must_use]
    pub fn total_range(&self) -> (f64, f64) {
        self.scale.total_range()
    }

    #[must_use]
    pub fn timestamp_to_pixel(&self, timestamp: f64) -> f64 {
        self.scale
            .timestamp_to_pixel(timestamp, self.timeline_bounds())
    }

    #[must_use]
    pub fn pixel_to_timestamp(&self, x: f64) -> f64 {
        self.scale.pixel_to_timestamp(x, self.timeline_bounds())
    }

    /// Scrolls the time window by `dx` pixels and the rows by `dy` pixels.
    ///
    /// The time window stays inside the total range. Not available while a
    /// drag gesture owns scrolling.
    pub fn scroll(&mut self, dx: f64, dy: f64) -> TimelineResult<()> {
        if !dx.is_finite() || !dy.is_finite() {
            return Err(TimelineError::InvalidData(
                "scroll deltas must be finite".to_owned(),
            ));
        }
        if self.interaction.session().is_some() {
            return Err(TimelineError::GestureInProgress);
        }
        let before = self.scale.visible_range();
        let width = self.timeline_bounds().width;
        if dx != 0.0 && width > 0.0 {
            self.scale.ratio_scroll(dx / width);
        }
        if dy != 0.0 {
            self.rows.scroll_by(dy);
        }
        self.relayout();
        self.emit_visible_range_changed(before);
        Ok(())
    }

    /// Shows `[start, end]`, clamped into the total range.
    pub fn zoom_to(&mut self, start: f64, end: f64) -> TimelineResult<()> {
        if self.interaction.session().is_some() {
            return Err(TimelineError::GestureInProgress);
        }
        let before = self.scale.visible_range();
        self.scale.zoom_to(start, end)?;
        self.relayout();
        self.emit_visible_range_changed(before);
        Ok(())
    }

    /// Scrolls vertically until `row_id` is fully inside the viewport.
    pub fn scroll_to_row(&mut self, row_id: &str) -> TimelineResult<()> {
        let row_index = self.row_index(row_id)?;
        let top = self.rows.row_top(row_index);
        let bottom = top + self.rows.item_height(row_index);
        let offset = self.rows.vertical_offset();
        let height = self.rows.viewport_height();
        if top < offset {
            self.rows.scroll_to(top);
        } else if bottom > offset + height {
            self.rows.scroll_to(bottom - height);
        }
        self.relayout();
        Ok(())
    }

    pub fn set_viewport(&mut self, viewport: Viewport) -> TimelineResult<()> {
        self.config = TimelineEngineConfig {
            viewport,
            ..self.config
        }
        .validate()?;
        self.rows
            .set_viewport_height(self.config.timeline_bounds().height)?;
        self.relayout();
        Ok(())
    }

    /// Id of the row under `point`, for hosts that draw a row header next to
    /// the timeline.
    #[must_use]
    pub fn row_id_at(&self, point: Point) -> Option<&str> {
        self.pass.row_at(point.y).map(|row| row.row_id.as_str())
    }
}
