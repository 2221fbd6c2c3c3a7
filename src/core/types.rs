use serde::{Deserialize, Serialize};

use crate::error::{TimelineError, TimelineResult};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Full viewport area as a pixel rectangle anchored at the origin.
    #[must_use]
    pub fn bounds(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned pixel rectangle.
///
/// Width and height may be zero (milestones before expansion, empty rows) but
/// are never negative for rectangles produced by the layout code.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Builds a rectangle from two horizontal edges, normalizing their order.
    #[must_use]
    pub fn from_edges(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        let (l, r) = if left <= right {
            (left, right)
        } else {
            (right, left)
        };
        let (t, b) = if top <= bottom {
            (top, bottom)
        } else {
            (bottom, top)
        };
        Self::new(l, t, r - l, b - t)
    }

    #[must_use]
    pub fn right(self) -> f64 {
        self.left + self.width
    }

    #[must_use]
    pub fn bottom(self) -> f64 {
        self.top + self.height
    }

    #[must_use]
    pub fn center_x(self) -> f64 {
        self.left + self.width / 2.0
    }

    #[must_use]
    pub fn center_y(self) -> f64 {
        self.top + self.height / 2.0
    }

    #[must_use]
    pub fn contains(self, point: Point) -> bool {
        point.x >= self.left
            && point.x <= self.right()
            && point.y >= self.top
            && point.y <= self.bottom()
    }

    #[must_use]
    pub fn intersects(self, other: Rect) -> bool {
        self.left <= other.right()
            && other.left <= self.right()
            && self.top <= other.bottom()
            && other.top <= self.bottom()
    }

    #[must_use]
    pub fn translated(self, dx: f64, dy: f64) -> Self {
        Self::new(self.left + dx, self.top + dy, self.width, self.height)
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.left.is_finite()
            && self.top.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
    }
}

/// Closed time interval in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    /// Builds a validated range. `end == start` describes an instant.
    pub fn new(start: f64, end: f64) -> TimelineResult<Self> {
        if !start.is_finite() || !end.is_finite() {
            return Err(TimelineError::InvalidData(
                "time range bounds must be finite".to_owned(),
            ));
        }
        if end < start {
            return Err(TimelineError::InvalidData(format!(
                "time range end ({end}) must be >= start ({start})"
            )));
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub const fn instant(at: f64) -> Self {
        Self { start: at, end: at }
    }

    #[must_use]
    pub fn duration(self) -> f64 {
        self.end - self.start
    }

    #[must_use]
    pub fn is_instant(self) -> bool {
        self.end == self.start
    }

    #[must_use]
    pub fn union(self, other: TimeRange) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Point, Rect, TimeRange};

    #[test]
    fn rect_from_edges_normalizes_order() {
        let rect = Rect::from_edges(30.0, 40.0, 10.0, 20.0);
        assert_eq!(rect, Rect::new(10.0, 20.0, 20.0, 20.0));
        assert!(rect.contains(Point::new(15.0, 25.0)));
        assert!(!rect.contains(Point::new(31.0, 25.0)));
    }

    #[test]
    fn time_range_rejects_reversed_bounds() {
        assert!(TimeRange::new(10.0, 5.0).is_err());
        assert!(TimeRange::new(f64::NAN, 5.0).is_err());
        let instant = TimeRange::new(7.0, 7.0).expect("instant range");
        assert!(instant.is_instant());
        assert_eq!(instant.duration(), 0.0);
    }
}
