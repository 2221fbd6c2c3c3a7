use serde::{Deserialize, Serialize};

use crate::core::{Point, Rect};

/// Pixels scrolled per edge-scroll tick.
pub const SCROLL_STEP: f64 = 20.0;

/// Scroll request produced while the pointer is dragged past a timeline edge.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EdgeScroll {
    /// Signed horizontal step in pixels (negative scrolls towards earlier time).
    pub dx: f64,
    /// Signed vertical step in pixels.
    pub dy: f64,
}

impl EdgeScroll {
    /// Scroll direction for `pointer` relative to `bounds`, `None` while the
    /// pointer is inside.
    #[must_use]
    pub fn for_pointer(pointer: Point, bounds: Rect, step: f64, vertical: bool) -> Option<Self> {
        let dx = if pointer.x < bounds.left {
            -step
        } else if pointer.x > bounds.right() {
            step
        } else {
            0.0
        };
        let dy = if !vertical {
            0.0
        } else if pointer.y < bounds.top {
            -step
        } else if pointer.y > bounds.bottom() {
            step
        } else {
            0.0
        };
        (dx != 0.0 || dy != 0.0).then_some(Self { dx, dy })
    }

    #[must_use]
    pub fn is_horizontal(self) -> bool {
        self.dx != 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::{EdgeScroll, SCROLL_STEP};
    use crate::core::{Point, Rect};

    #[test]
    fn pointer_inside_bounds_does_not_scroll() {
        let bounds = Rect::new(0.0, 0.0, 500.0, 300.0);
        assert!(EdgeScroll::for_pointer(Point::new(10.0, 10.0), bounds, SCROLL_STEP, true).is_none());
    }

    #[test]
    fn pointer_past_corner_scrolls_both_axes() {
        let bounds = Rect::new(0.0, 0.0, 500.0, 300.0);
        let scroll = EdgeScroll::for_pointer(Point::new(520.0, -4.0), bounds, SCROLL_STEP, true)
            .expect("scroll");
        assert_eq!(scroll, EdgeScroll { dx: 20.0, dy: -20.0 });

        let horizontal_only = EdgeScroll::for_pointer(Point::new(250.0, -4.0), bounds, SCROLL_STEP, false);
        assert!(horizontal_only.is_none());
    }
}
