use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::primitives::snap_coordinate;
use crate::core::{Point, Rect, RowBand, TimeScale};
use crate::error::{TimelineError, TimelineResult};

/// Share of the row height a row marker spans.
pub const ROW_MARKER_HEIGHT_SHARE: f64 = 0.7;
/// Horizontal gap between a text marker's instant and its text.
pub const TEXT_MARKER_INSET_PX: f64 = 4.0;
const LINE_MARKER_THICKNESS: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MarkerShape {
    #[default]
    Diamond,
    Square,
    TriangleUp,
    TriangleDown,
}

impl MarkerShape {
    /// Outline centered on `center`, extending `size` pixels each way.
    #[must_use]
    pub fn outline(self, center: Point, size: f64) -> SmallVec<[Point; 4]> {
        let Point { x, y } = center;
        match self {
            Self::Diamond => SmallVec::from_buf([
                Point::new(x, y - size),
                Point::new(x + size, y),
                Point::new(x, y + size),
                Point::new(x - size, y),
            ]),
            Self::Square => SmallVec::from_buf([
                Point::new(x - size, y - size),
                Point::new(x + size, y - size),
                Point::new(x + size, y + size),
                Point::new(x - size, y + size),
            ]),
            Self::TriangleUp => [
                Point::new(x, y - size),
                Point::new(x + size, y + size),
                Point::new(x - size, y + size),
            ]
            .into_iter()
            .collect(),
            Self::TriangleDown => [
                Point::new(x - size, y - size),
                Point::new(x + size, y - size),
                Point::new(x, y + size),
            ]
            .into_iter()
            .collect(),
        }
    }
}

/// Point-in-time marker drawn inside one row, e.g. a review date on a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowMarker {
    pub time: f64,
    #[serde(default)]
    pub shape: MarkerShape,
}

impl RowMarker {
    #[must_use]
    pub fn new(time: f64) -> Self {
        Self {
            time,
            shape: MarkerShape::default(),
        }
    }

    #[must_use]
    pub fn with_shape(mut self, shape: MarkerShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn validate(&self) -> TimelineResult<()> {
        if !self.time.is_finite() {
            return Err(TimelineError::InvalidData(
                "row marker time must be finite".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Instant an axis marker is pinned to. `DataStart`, `DataEnd` and `Now`
/// are resolved on every layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MarkerTime {
    At(f64),
    DataStart,
    DataEnd,
    Now,
}

impl MarkerTime {
    #[must_use]
    pub fn resolve(self, scale: TimeScale, now: f64) -> f64 {
        match self {
            Self::At(time) => time,
            Self::DataStart => scale.total_range().0,
            Self::DataEnd => scale.total_range().1,
            Self::Now => now,
        }
    }

    fn validate(self, id: &str) -> TimelineResult<()> {
        match self {
            Self::At(time) if !time.is_finite() => Err(TimelineError::InvalidData(format!(
                "axis marker `{id}`: time must be finite"
            ))),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AxisMarkerKind {
    /// Vertical line across every row.
    Line { at: MarkerTime },
    /// Shaded interval across every row.
    Range { from: MarkerTime, to: MarkerTime },
    /// Caption at the top of the timeline.
    Text { at: MarkerTime, text: String },
}

/// Marker spanning the whole timeline height at a point or interval of the
/// time axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisMarker {
    pub id: String,
    pub kind: AxisMarkerKind,
}

impl AxisMarker {
    #[must_use]
    pub fn line(id: impl Into<String>, at: MarkerTime) -> Self {
        Self {
            id: id.into(),
            kind: AxisMarkerKind::Line { at },
        }
    }

    #[must_use]
    pub fn range(id: impl Into<String>, from: MarkerTime, to: MarkerTime) -> Self {
        Self {
            id: id.into(),
            kind: AxisMarkerKind::Range { from, to },
        }
    }

    #[must_use]
    pub fn text(id: impl Into<String>, at: MarkerTime, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: AxisMarkerKind::Text {
                at,
                text: text.into(),
            },
        }
    }

    pub fn validate(&self) -> TimelineResult<()> {
        if self.id.trim().is_empty() {
            return Err(TimelineError::InvalidData(
                "axis marker id must not be blank".to_owned(),
            ));
        }
        match &self.kind {
            AxisMarkerKind::Line { at } => at.validate(&self.id),
            AxisMarkerKind::Range { from, to } => {
                from.validate(&self.id)?;
                to.validate(&self.id)
            }
            AxisMarkerKind::Text { at, text } => {
                if text.trim().is_empty() {
                    return Err(TimelineError::InvalidData(format!(
                        "axis marker `{}`: text must not be blank",
                        self.id
                    )));
                }
                at.validate(&self.id)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacedRowMarker {
    pub row_index: usize,
    pub shape: MarkerShape,
    pub x: f64,
    pub top: f64,
    /// Half of the marker height.
    pub size: f64,
}

impl PlacedRowMarker {
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x, self.top + self.size)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlacedAxisMarker {
    Range {
        id: String,
        left: f64,
        right: f64,
        top: f64,
        bottom: f64,
    },
    Line {
        id: String,
        x: f64,
        top: f64,
        bottom: f64,
    },
    Text {
        id: String,
        x: f64,
        top: f64,
        text: String,
    },
}

impl PlacedAxisMarker {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Range { id, .. } | Self::Line { id, .. } | Self::Text { id, .. } => id,
        }
    }

    fn paint_rank(&self) -> u8 {
        match self {
            Self::Range { .. } => 0,
            Self::Line { .. } => 1,
            Self::Text { .. } => 2,
        }
    }

    fn anchor_x(&self) -> f64 {
        match self {
            Self::Range { left, .. } => *left,
            Self::Line { x, .. } | Self::Text { x, .. } => *x,
        }
    }
}

fn ratio_is_visible(ratio: f64) -> bool {
    (0.0..=1.0).contains(&ratio)
}

/// Projects the markers of one row into its band.
///
/// Markers whose instant falls outside the visible window are dropped. The
/// result is ordered by x so later markers paint over earlier ones.
#[must_use]
pub fn place_row_markers(
    row_index: usize,
    markers: &[RowMarker],
    band: RowBand,
    scale: TimeScale,
    bounds: Rect,
) -> SmallVec<[PlacedRowMarker; 2]> {
    let height = band.height * ROW_MARKER_HEIGHT_SHARE;
    let mut placed: SmallVec<[PlacedRowMarker; 2]> = markers
        .iter()
        .filter_map(|marker| {
            let ratio = scale.timestamp_to_ratio(marker.time);
            ratio_is_visible(ratio).then(|| PlacedRowMarker {
                row_index,
                shape: marker.shape,
                x: TimeScale::ratio_to_pixel(ratio, bounds).round(),
                top: (band.top + (band.height - height) / 2.0).round(),
                size: height / 2.0,
            })
        })
        .collect();
    placed.sort_by_key(|marker| OrderedFloat(marker.x));
    placed
}

/// Projects axis markers onto `bounds`.
///
/// Lines and texts outside the visible window are dropped; ranges are
/// clipped to it and dropped only when they do not overlap it. Output is in
/// paint order: ranges, then lines, then texts, each by x and then id.
#[must_use]
pub fn place_axis_markers(
    markers: &[AxisMarker],
    scale: TimeScale,
    bounds: Rect,
    now: f64,
) -> Vec<PlacedAxisMarker> {
    let ratio = |time: MarkerTime| scale.timestamp_to_ratio(time.resolve(scale, now));
    let mut placed: Vec<PlacedAxisMarker> = markers
        .iter()
        .filter_map(|marker| {
            let id = marker.id.clone();
            match &marker.kind {
                AxisMarkerKind::Line { at } => {
                    let at = ratio(*at);
                    ratio_is_visible(at).then(|| PlacedAxisMarker::Line {
                        id,
                        x: snap_coordinate(
                            TimeScale::ratio_to_pixel(at, bounds),
                            LINE_MARKER_THICKNESS,
                        ),
                        top: bounds.top,
                        bottom: bounds.bottom(),
                    })
                }
                AxisMarkerKind::Range { from, to } => {
                    let (a, b) = (ratio(*from), ratio(*to));
                    let (start, end) = (a.min(b), a.max(b));
                    if end < 0.0 || start > 1.0 {
                        return None;
                    }
                    let left = TimeScale::ratio_to_pixel(start.max(0.0), bounds).round();
                    let right = TimeScale::ratio_to_pixel(end.min(1.0), bounds).round();
                    (right > left).then(|| PlacedAxisMarker::Range {
                        id,
                        left,
                        right,
                        top: bounds.top,
                        bottom: bounds.bottom(),
                    })
                }
                AxisMarkerKind::Text { at, text } => {
                    let at = ratio(*at);
                    ratio_is_visible(at).then(|| PlacedAxisMarker::Text {
                        id,
                        x: TimeScale::ratio_to_pixel(at, bounds).round() + TEXT_MARKER_INSET_PX,
                        top: bounds.top + TEXT_MARKER_INSET_PX,
                        text: text.clone(),
                    })
                }
            }
        })
        .collect();

    placed.sort_by(|left, right| {
        left.paint_rank()
            .cmp(&right.paint_rank())
            .then_with(|| OrderedFloat(left.anchor_x()).cmp(&OrderedFloat(right.anchor_x())))
            .then_with(|| left.id().cmp(right.id()))
    });
    placed
}
