use serde::{Deserialize, Serialize};

use crate::core::primitives::snap_rect;
use crate::core::{Rect, TimeRange, TimeScale};
use crate::error::{TimelineError, TimelineResult};

/// Semantic kind of a timeline element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RowKind {
    Task,
    Milestone,
    /// Parent/grouping row spanning its children.
    Summary,
    Baseline,
    ResourcePeriod,
}

/// Reference point on an item rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    LeftTop,
    LeftCenter,
    LeftBottom,
    CenterTop,
    Center,
    CenterBottom,
    RightTop,
    RightCenter,
    RightBottom,
}

impl Position {
    #[must_use]
    pub fn is_top(self) -> bool {
        matches!(self, Self::LeftTop | Self::CenterTop | Self::RightTop)
    }

    #[must_use]
    pub fn is_bottom(self) -> bool {
        matches!(self, Self::LeftBottom | Self::CenterBottom | Self::RightBottom)
    }

    /// Point of `rect` selected by this position.
    #[must_use]
    pub fn point_on(self, rect: Rect) -> (f64, f64) {
        let x = match self {
            Self::LeftTop | Self::LeftCenter | Self::LeftBottom => rect.left,
            Self::CenterTop | Self::Center | Self::CenterBottom => rect.center_x(),
            Self::RightTop | Self::RightCenter | Self::RightBottom => rect.right(),
        };
        let y = if self.is_top() {
            rect.top
        } else if self.is_bottom() {
            rect.bottom()
        } else {
            rect.center_y()
        };
        (x, y)
    }
}

/// Which edge of a bar aligns to its position point.
///
/// `Auto` resolves per [`RowKind`] in [`BarLayoutResolver::resolve_anchor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Anchor {
    Auto,
    Fixed(Position),
}

/// Length resolved against a base extent (usually the row height).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Size {
    Pixels(f64),
    /// Percentage points of the base extent, `50.0` meaning half.
    Percent(f64),
}

impl Size {
    #[must_use]
    pub fn resolve(self, base: f64) -> f64 {
        match self {
            Self::Pixels(px) => px,
            Self::Percent(percent) => base * percent / 100.0,
        }
    }

    fn is_finite(self) -> bool {
        match self {
            Self::Pixels(value) | Self::Percent(value) => value.is_finite(),
        }
    }
}

/// Geometry settings for one kind of timeline element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementConfig {
    pub height: Size,
    pub anchor: Anchor,
    pub position: Position,
    pub offset: Size,
    pub stroke_thickness: f64,
}

impl ElementConfig {
    #[must_use]
    pub fn for_kind(kind: RowKind) -> Self {
        let height = match kind {
            RowKind::Task | RowKind::ResourcePeriod => Size::Percent(50.0),
            RowKind::Milestone => Size::Percent(50.0),
            RowKind::Summary => Size::Percent(60.0),
            RowKind::Baseline => Size::Percent(30.0),
        };
        Self {
            height,
            anchor: Anchor::Auto,
            position: Position::LeftCenter,
            offset: Size::Pixels(0.0),
            stroke_thickness: 1.0,
        }
    }

    /// Default progress sub-bar: full parent height, centered on the bar.
    #[must_use]
    pub fn progress() -> Self {
        Self {
            height: Size::Percent(100.0),
            anchor: Anchor::Auto,
            position: Position::LeftCenter,
            offset: Size::Pixels(0.0),
            stroke_thickness: 0.0,
        }
    }

    pub fn validate(self) -> TimelineResult<Self> {
        if !self.height.is_finite() || self.height.resolve(100.0) < 0.0 {
            return Err(TimelineError::InvalidData(
                "element height must be finite and >= 0".to_owned(),
            ));
        }
        if !self.offset.is_finite() {
            return Err(TimelineError::InvalidData(
                "element offset must be finite".to_owned(),
            ));
        }
        if !self.stroke_thickness.is_finite() || self.stroke_thickness < 0.0 {
            return Err(TimelineError::InvalidData(
                "element stroke thickness must be finite and >= 0".to_owned(),
            ));
        }
        Ok(self)
    }
}

/// Laid-out bar and its optional paired baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarPair {
    pub bar: Rect,
    pub baseline: Option<Rect>,
}

/// Resolves pixel rectangles for timeline bars.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BarLayoutResolver {
    /// Draw baselines above the actual bars when they share a row.
    pub baseline_above: bool,
}

impl BarLayoutResolver {
    #[must_use]
    pub fn new(baseline_above: bool) -> Self {
        Self { baseline_above }
    }

    /// Full-row rectangle for `range` on a row starting at `row_top`.
    #[must_use]
    pub fn item_rect(
        scale: TimeScale,
        range: TimeRange,
        timeline_bounds: Rect,
        row_top: f64,
        row_height: f64,
    ) -> Rect {
        let left = scale.timestamp_to_pixel(range.start, timeline_bounds);
        let right = scale.timestamp_to_pixel(range.end, timeline_bounds);
        Rect::new(left, row_top, (right - left).max(0.0), row_height)
    }

    /// Culls bars whose time interval lies fully outside the visible window.
    #[must_use]
    pub fn is_range_visible(scale: TimeScale, kind: RowKind, range: TimeRange) -> bool {
        let start_ratio = scale.timestamp_to_ratio(range.start);
        if kind == RowKind::Milestone || range.is_instant() {
            return (0.0..=1.0).contains(&start_ratio);
        }
        let end_ratio = scale.timestamp_to_ratio(range.end);
        end_ratio > 0.0 && start_ratio < 1.0
    }

    #[must_use]
    pub fn resolve_anchor(self, kind: RowKind, position: Position, has_baseline: bool) -> Position {
        let centered_with_baseline = has_baseline && position == Position::LeftCenter;
        match kind {
            RowKind::Baseline if position == Position::LeftCenter => {
                if self.baseline_above {
                    Position::LeftBottom
                } else {
                    Position::LeftTop
                }
            }
            RowKind::Summary if centered_with_baseline => self.actual_anchor_over_baseline(),
            RowKind::Summary => {
                if position.is_top() {
                    Position::LeftTop
                } else {
                    Position::LeftBottom
                }
            }
            RowKind::Task if centered_with_baseline => self.actual_anchor_over_baseline(),
            _ => position,
        }
    }

    fn actual_anchor_over_baseline(self) -> Position {
        if self.baseline_above {
            Position::LeftTop
        } else {
            Position::LeftBottom
        }
    }

    fn effective_anchor(
        self,
        kind: RowKind,
        config: &ElementConfig,
        has_baseline: bool,
    ) -> Position {
        match config.anchor {
            Anchor::Fixed(anchor) => anchor,
            Anchor::Auto => self.resolve_anchor(kind, config.position, has_baseline),
        }
    }

    /// Lays out one bar inside `item_rect` without pixel snapping.
    #[must_use]
    pub fn resolve_unsnapped(
        self,
        kind: RowKind,
        item_rect: Rect,
        config: &ElementConfig,
        has_baseline: bool,
    ) -> Rect {
        let base = if kind == RowKind::Summary || has_baseline {
            item_rect.height / 2.0
        } else {
            item_rect.height
        };
        let bar_height = config.height.resolve(base).max(0.0);
        let offset = config.offset.resolve(base);
        let anchor = self.effective_anchor(kind, config, has_baseline);
        let (_, y) = config.position.point_on(item_rect);
        let top = fix_bar_top(y, bar_height, anchor) + offset;
        Rect::new(item_rect.left, top, item_rect.width, bar_height)
    }

    /// Lays out one bar and snaps it to the pixel grid.
    #[must_use]
    pub fn resolve(
        self,
        kind: RowKind,
        item_rect: Rect,
        config: &ElementConfig,
        has_baseline: bool,
    ) -> Rect {
        snap_rect(
            self.resolve_unsnapped(kind, item_rect, config, has_baseline),
            config.stroke_thickness,
        )
    }

    /// Lays out an actual bar together with its baseline on the same row.
    ///
    /// When both elements resolve to the same anchor and position they would
    /// cover each other, so one of them is pushed out by the other's height
    /// plus half of both strokes.
    #[must_use]
    pub fn resolve_pair(
        self,
        kind: RowKind,
        item_rect: Rect,
        bar_config: &ElementConfig,
        baseline_rect: Rect,
        baseline_config: &ElementConfig,
    ) -> BarPair {
        let mut bar = self.resolve_unsnapped(kind, item_rect, bar_config, true);
        let mut baseline =
            self.resolve_unsnapped(RowKind::Baseline, baseline_rect, baseline_config, true);

        let bar_anchor = self.effective_anchor(kind, bar_config, true);
        let baseline_anchor = self.effective_anchor(RowKind::Baseline, baseline_config, true);
        if bar_anchor == baseline_anchor && bar_config.position == baseline_config.position {
            let strokes = bar_config.stroke_thickness / 2.0 + baseline_config.stroke_thickness / 2.0;
            match (self.baseline_above, bar_anchor.is_top()) {
                (true, true) => bar.top += baseline.height + strokes,
                (true, false) => baseline.top -= bar.height + strokes,
                (false, true) => baseline.top += bar.height + strokes,
                (false, false) => bar.top -= baseline.height + strokes,
            }
        }

        BarPair {
            bar: snap_rect(bar, bar_config.stroke_thickness),
            baseline: Some(snap_rect(baseline, baseline_config.stroke_thickness)),
        }
    }

    /// Lays out the progress sub-bar inside an already resolved parent bar.
    ///
    /// Returns `None` when the progress is zero or not finite.
    #[must_use]
    pub fn resolve_progress(self, bar: Rect, progress: f64, config: &ElementConfig) -> Option<Rect> {
        if !progress.is_finite() || progress <= 0.0 {
            return None;
        }
        let progress = progress.min(1.0);
        let item = Rect::new(bar.left, bar.top, progress * bar.width, bar.height);
        let anchor = match config.anchor {
            Anchor::Fixed(anchor) => anchor,
            Anchor::Auto => config.position,
        };
        let height = config.height.resolve(item.height).max(0.0);
        let offset = config.offset.resolve(item.height);
        let (_, y) = config.position.point_on(item);
        let top = fix_bar_top(y, height, anchor) + offset;
        Some(snap_rect(
            Rect::new(item.left, top, item.width, height),
            config.stroke_thickness,
        ))
    }

    /// Lays out a milestone marker centered on its instant.
    ///
    /// `item_rect` has zero width at the milestone's x; the marker extends by
    /// half of its resolved height on both sides.
    #[must_use]
    pub fn resolve_milestone(self, item_rect: Rect, config: &ElementConfig, has_baseline: bool) -> Rect {
        let mut bar = self.resolve_unsnapped(RowKind::Milestone, item_rect, config, has_baseline);
        let half = (bar.height / 2.0).round();
        bar.left = item_rect.left - half;
        bar.width = half * 2.0;
        snap_rect(bar, config.stroke_thickness)
    }
}

fn fix_bar_top(y: f64, bar_height: f64, anchor: Position) -> f64 {
    if anchor.is_top() {
        y
    } else if anchor.is_bottom() {
        y - bar_height
    } else {
        y - bar_height / 2.0
    }
}
