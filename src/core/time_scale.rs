use crate::core::{Rect, TimeRange};
use crate::error::{TimelineError, TimelineResult};
use serde::{Deserialize, Serialize};

/// Share of the total range shown when a scale receives its first data range.
pub const INITIAL_VISIBLE_SHARE: f64 = 0.1;

/// Timeline scale with separate total and visible ranges.
///
/// `full_*` tracks the extent of the data (possibly widened to fit the visible
/// window). `visible_*` is the window currently mapped onto the timeline's
/// pixel width. All values are epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeScale {
    full_start: f64,
    full_end: f64,
    visible_start: f64,
    visible_end: f64,
    has_data: bool,
    has_window: bool,
    force_scrolled: bool,
}

impl Default for TimeScale {
    fn default() -> Self {
        Self {
            full_start: 0.0,
            full_end: 0.0,
            visible_start: 0.0,
            visible_end: 0.0,
            has_data: false,
            has_window: false,
            force_scrolled: false,
        }
    }
}

impl TimeScale {
    /// Creates an empty scale. Ratios map to `0` until a data range is set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scale from explicit total and visible ranges.
    ///
    /// The visible window is clamped into the total range.
    pub fn with_ranges(total: TimeRange, visible: TimeRange) -> TimelineResult<Self> {
        let mut scale = Self::new();
        scale.set_data_range(total.start, total.end)?;
        scale.zoom_to(visible.start, visible.end)?;
        Ok(scale)
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        !self.has_data
    }

    #[must_use]
    pub fn total_range(self) -> (f64, f64) {
        (self.full_start, self.full_end)
    }

    #[must_use]
    pub fn visible_range(self) -> (f64, f64) {
        (self.visible_start, self.visible_end)
    }

    #[must_use]
    pub fn visible_width(self) -> f64 {
        self.visible_end - self.visible_start
    }

    /// `true` while the window was moved past the data edges by a drag.
    #[must_use]
    pub fn is_force_scrolled(self) -> bool {
        self.force_scrolled
    }

    #[must_use]
    pub fn timestamp_to_ratio(self, timestamp: f64) -> f64 {
        let width = self.visible_width();
        if !self.has_data || width <= 0.0 {
            return 0.0;
        }
        (timestamp - self.visible_start) / width
    }

    #[must_use]
    pub fn ratio_to_timestamp(self, ratio: f64) -> f64 {
        let width = self.visible_width();
        if !self.has_data || width <= 0.0 {
            return self.visible_start;
        }
        self.visible_start + ratio * width
    }

    #[must_use]
    pub fn ratio_to_pixel(ratio: f64, bounds: Rect) -> f64 {
        bounds.left + bounds.width * ratio
    }

    #[must_use]
    pub fn pixel_to_ratio(x: f64, bounds: Rect) -> f64 {
        if bounds.width <= 0.0 {
            return 0.0;
        }
        (x - bounds.left) / bounds.width
    }

    #[must_use]
    pub fn timestamp_to_pixel(self, timestamp: f64, bounds: Rect) -> f64 {
        Self::ratio_to_pixel(self.timestamp_to_ratio(timestamp), bounds)
    }

    #[must_use]
    pub fn pixel_to_timestamp(self, x: f64, bounds: Rect) -> f64 {
        self.ratio_to_timestamp(Self::pixel_to_ratio(x, bounds))
    }

    /// Pixel distance that corresponds to `millis` at the current zoom level.
    #[must_use]
    pub fn millis_to_pixels(self, millis: f64, bounds: Rect) -> f64 {
        let width = self.visible_width();
        if width <= 0.0 {
            return 0.0;
        }
        millis / width * bounds.width
    }

    /// Updates the total range from the data extent.
    ///
    /// The first call with a non-degenerate range opens the window on the
    /// leading tenth of the data. Later calls keep the current window width.
    pub fn set_data_range(&mut self, min: f64, max: f64) -> TimelineResult<()> {
        if !min.is_finite() || !max.is_finite() {
            return Err(TimelineError::InvalidData(
                "data range must be finite".to_owned(),
            ));
        }
        if max < min {
            return Err(TimelineError::InvalidData(format!(
                "data range max ({max}) must be >= min ({min})"
            )));
        }

        self.has_data = true;
        self.full_start = min;
        self.full_end = max;

        if min == max {
            self.visible_start = min;
            self.visible_end = max;
            self.has_window = false;
            return Ok(());
        }

        let data_width = max - min;
        if !self.has_window {
            let width = (data_width * INITIAL_VISIBLE_SHARE)
                .round()
                .max(1.0)
                .min(data_width);
            self.visible_start = min;
            self.visible_end = min + width;
            self.has_window = true;
            return Ok(());
        }

        let width = self.visible_width();
        if width > data_width {
            self.full_end = self.full_start + width;
        }
        let start = self.clamp_window_start(self.visible_start, width);
        self.visible_start = start;
        self.visible_end = start + width;
        Ok(())
    }

    /// Shifts the window by `delta_ratio` window widths, staying inside the
    /// total range.
    pub fn ratio_scroll(&mut self, delta_ratio: f64) {
        if !self.has_window || !delta_ratio.is_finite() {
            return;
        }
        let width = self.visible_width();
        let start = self.clamp_window_start(self.visible_start + delta_ratio * width, width);
        self.visible_start = start;
        self.visible_end = start + width;
    }

    /// Shifts the window without clamping. Used while a drag gesture pulls the
    /// view past the data edges.
    pub fn ratio_force_scroll(&mut self, delta_ratio: f64) {
        if !self.has_window || !delta_ratio.is_finite() {
            return;
        }
        let shift = delta_ratio * self.visible_width();
        self.visible_start += shift;
        self.visible_end += shift;
        if self.visible_start < self.full_start || self.visible_end > self.full_end {
            self.force_scrolled = true;
        }
    }

    /// Ends a force-scroll episode.
    ///
    /// The total range grows to cover `committed` (the range written by the
    /// gesture, if any) and the window is then pulled back inside it.
    pub fn settle_force_scroll(&mut self, committed: Option<TimeRange>) {
        if !self.force_scrolled {
            return;
        }
        self.force_scrolled = false;
        if let Some(range) = committed {
            self.full_start = self.full_start.min(range.start);
            self.full_end = self.full_end.max(range.end);
        }
        let width = self.visible_width();
        if width > self.full_end - self.full_start {
            self.full_end = self.full_start + width;
        }
        let start = self.clamp_window_start(self.visible_start, width);
        self.visible_start = start;
        self.visible_end = start + width;
    }

    /// Sets the visible window explicitly, clamped into the total range.
    pub fn zoom_to(&mut self, start: f64, end: f64) -> TimelineResult<()> {
        if !start.is_finite() || !end.is_finite() {
            return Err(TimelineError::InvalidData(
                "zoom range must be finite".to_owned(),
            ));
        }
        if !self.has_data {
            return Err(TimelineError::InvalidData(
                "cannot zoom an empty time scale".to_owned(),
            ));
        }
        let start = start.max(self.full_start);
        let end = end.min(self.full_end);
        if end <= start {
            return Err(TimelineError::InvalidData(format!(
                "zoom range [{start}, {end}] does not intersect the data range"
            )));
        }
        self.visible_start = start;
        self.visible_end = end;
        self.has_window = true;
        Ok(())
    }

    fn clamp_window_start(self, start: f64, width: f64) -> f64 {
        let max_start = (self.full_end - width).max(self.full_start);
        start.clamp(self.full_start, max_start)
    }
}

#[cfg(test)]
mod tests {
    use super::TimeScale;

    #[test]
    fn first_data_range_opens_leading_tenth() {
        let mut scale = TimeScale::new();
        scale.set_data_range(0.0, 1_000.0).expect("data range");
        assert_eq!(scale.visible_range(), (0.0, 100.0));
        assert_eq!(scale.timestamp_to_ratio(50.0), 0.5);
        assert_eq!(scale.ratio_to_timestamp(0.5), 50.0);
    }

    #[test]
    fn later_data_ranges_keep_window_width() {
        let mut scale = TimeScale::new();
        scale.set_data_range(0.0, 1_000.0).expect("data range");
        scale.ratio_scroll(5.0);
        assert_eq!(scale.visible_range(), (500.0, 600.0));

        scale.set_data_range(0.0, 550.0).expect("shrunk range");
        assert_eq!(scale.visible_range(), (450.0, 550.0));
    }

    #[test]
    fn clamped_scroll_stays_inside_total_range() {
        let mut scale = TimeScale::new();
        scale.set_data_range(0.0, 1_000.0).expect("data range");
        scale.ratio_scroll(-3.0);
        assert_eq!(scale.visible_range(), (0.0, 100.0));
        scale.ratio_scroll(100.0);
        assert_eq!(scale.visible_range(), (900.0, 1_000.0));
    }

    #[test]
    fn force_scroll_overshoots_then_settles() {
        let mut scale = TimeScale::new();
        scale.set_data_range(0.0, 1_000.0).expect("data range");
        scale.ratio_force_scroll(-0.5);
        assert_eq!(scale.visible_range(), (-50.0, 50.0));
        assert!(scale.is_force_scrolled());

        scale.settle_force_scroll(None);
        assert!(!scale.is_force_scrolled());
        assert_eq!(scale.visible_range(), (0.0, 100.0));
    }

    #[test]
    fn zero_width_range_maps_to_single_value() {
        let mut scale = TimeScale::new();
        scale.set_data_range(42.0, 42.0).expect("degenerate range");
        assert_eq!(scale.timestamp_to_ratio(100.0), 0.0);
        assert_eq!(scale.ratio_to_timestamp(0.7), 42.0);
    }

    #[test]
    fn empty_scale_reports_empty() {
        let scale = TimeScale::new();
        assert!(scale.is_empty());
        assert_eq!(scale.timestamp_to_ratio(10.0), 0.0);
    }
}
