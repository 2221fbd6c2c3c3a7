use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::primitives::snap_coordinate;
use crate::core::{Point, Rect};

/// Gap kept between a bar edge and the connector bend next to it.
pub const ARROW_MARGIN: f64 = 5.0;
/// Length of the arrowhead legs.
pub const ARROW_SIZE: f64 = 4.0;
pub const CONNECTOR_Z_INDEX: i32 = 60;
pub const ARROW_Z_INDEX: i32 = 70;

/// Dependency kind between two bars, named `<source edge><destination edge>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RelationKind {
    #[default]
    FinishStart,
    StartStart,
    FinishFinish,
    StartFinish,
}

impl RelationKind {
    /// Kind produced by joining `source` and `destination` bar edges.
    #[must_use]
    pub fn from_edges(source: BarEdge, destination: BarEdge) -> Self {
        match (source, destination) {
            (BarEdge::Start, BarEdge::Start) => Self::StartStart,
            (BarEdge::Start, BarEdge::Finish) => Self::StartFinish,
            (BarEdge::Finish, BarEdge::Start) => Self::FinishStart,
            (BarEdge::Finish, BarEdge::Finish) => Self::FinishFinish,
        }
    }

    #[must_use]
    pub fn source_edge(self) -> BarEdge {
        match self {
            Self::StartStart | Self::StartFinish => BarEdge::Start,
            Self::FinishStart | Self::FinishFinish => BarEdge::Finish,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BarEdge {
    Start,
    Finish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArrowDirection {
    Left,
    Right,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
}

impl Segment {
    #[must_use]
    pub const fn new(from: Point, to: Point) -> Self {
        Self { from, to }
    }

    /// Strict intersection test against `bounds`; a segment lying exactly on
    /// an outer edge is not visible.
    #[must_use]
    pub fn is_visible_in(self, bounds: Rect) -> bool {
        let left = self.from.x.min(self.to.x);
        let right = self.from.x.max(self.to.x);
        let top = self.from.y.min(self.to.y);
        let bottom = self.from.y.max(self.to.y);
        left < bounds.right() && right > bounds.left && top < bounds.bottom() && bottom > bounds.top
    }

    #[must_use]
    pub fn distance_to(self, point: Point) -> f64 {
        let dx = self.to.x - self.from.x;
        let dy = self.to.y - self.from.y;
        let len_sq = dx * dx + dy * dy;
        let t = if len_sq <= 0.0 {
            0.0
        } else {
            (((point.x - self.from.x) * dx + (point.y - self.from.y) * dy) / len_sq).clamp(0.0, 1.0)
        };
        let px = self.from.x + t * dx;
        let py = self.from.y + t * dy;
        ((point.x - px).powi(2) + (point.y - py).powi(2)).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arrowhead {
    /// Logical end point of the connector on the destination bar.
    pub tip: Point,
    pub direction: ArrowDirection,
    /// Closed triangle; the first point is the drawn tip nudged 1px back.
    pub points: [Point; 3],
}

impl Arrowhead {
    #[must_use]
    pub fn new(tip: Point, direction: ArrowDirection) -> Self {
        let (x, y) = (tip.x, tip.y);
        let points = match direction {
            ArrowDirection::Left => {
                let x = x + 1.0;
                [
                    Point::new(x, y),
                    Point::new(x + ARROW_SIZE, y - ARROW_SIZE),
                    Point::new(x + ARROW_SIZE, y + ARROW_SIZE),
                ]
            }
            ArrowDirection::Up => {
                let y = y + 1.0;
                [
                    Point::new(x, y),
                    Point::new(x - ARROW_SIZE, y + ARROW_SIZE),
                    Point::new(x + ARROW_SIZE, y + ARROW_SIZE),
                ]
            }
            ArrowDirection::Right => {
                let x = x - 1.0;
                [
                    Point::new(x, y),
                    Point::new(x - ARROW_SIZE, y - ARROW_SIZE),
                    Point::new(x - ARROW_SIZE, y + ARROW_SIZE),
                ]
            }
            ArrowDirection::Down => {
                let y = y - 1.0;
                [
                    Point::new(x, y),
                    Point::new(x - ARROW_SIZE, y - ARROW_SIZE),
                    Point::new(x + ARROW_SIZE, y - ARROW_SIZE),
                ]
            }
        };
        Self {
            tip,
            direction,
            points,
        }
    }
}

/// Routed connector: up to five orthogonal segments and an arrowhead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorPath {
    pub kind: RelationKind,
    pub segments: SmallVec<[Segment; 5]>,
    pub arrow: Option<Arrowhead>,
}

impl ConnectorPath {
    #[must_use]
    pub fn start(&self) -> Option<Point> {
        self.segments.first().map(|segment| segment.from)
    }

    #[must_use]
    pub fn end(&self) -> Option<Point> {
        self.segments.last().map(|segment| segment.to)
    }

    /// Distance from `point` to the nearest segment.
    #[must_use]
    pub fn distance_to(&self, point: Point) -> f64 {
        self.segments
            .iter()
            .map(|segment| segment.distance_to(point))
            .fold(f64::INFINITY, f64::min)
    }
}

/// Vertical extent of a full row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RowBand {
    pub top: f64,
    pub height: f64,
}

/// Per-route inputs beyond the two bar rectangles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteContext {
    /// Row of the destination bar. Five-segment routes run along its top or
    /// bottom edge.
    pub to_row: RowBand,
    /// Visible pixel bounds of the timeline.
    pub clip: Rect,
    pub stroke_thickness: f64,
}

/// Computes orthogonal connector polylines between bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConnectorRouter;

impl ConnectorRouter {
    /// Routes a relation of `kind` from `from` to `to`.
    ///
    /// Returns `None` when no segment of the route is visible in the clip
    /// bounds.
    #[must_use]
    pub fn route(
        self,
        from: Rect,
        to: Rect,
        kind: RelationKind,
        context: &RouteContext,
    ) -> Option<ConnectorPath> {
        let (points, tip, direction) = route_points(from, to, kind, context);
        let segments = clip_segments(&points, context.clip);
        if segments.is_empty() {
            return None;
        }
        let arrow = context
            .clip
            .contains(tip)
            .then(|| Arrowhead::new(tip, direction));
        Some(ConnectorPath {
            kind,
            segments,
            arrow,
        })
    }

    /// Straight preview line from the source edge center to the pointer.
    #[must_use]
    pub fn route_preview(self, from: Rect, edge: BarEdge, pointer: Point, stroke_thickness: f64) -> Segment {
        let x = match edge {
            BarEdge::Start => from.left,
            BarEdge::Finish => from.right(),
        };
        let start = Point::new(
            snap_coordinate(x, stroke_thickness),
            snap_coordinate(from.center_y(), stroke_thickness),
        );
        Segment::new(start, pointer)
    }
}

fn route_points(
    from: Rect,
    to: Rect,
    kind: RelationKind,
    context: &RouteContext,
) -> (SmallVec<[Point; 6]>, Point, ArrowDirection) {
    let am = ARROW_MARGIN;
    let size = ARROW_SIZE;
    let snap = |value: f64| snap_coordinate(value, context.stroke_thickness);
    let mut points: SmallVec<[Point; 6]> = SmallVec::new();

    let from_y = snap(from.center_y());
    let to_y = snap(to.center_y());

    match kind {
        RelationKind::FinishFinish => {
            let from_x = snap(from.right());
            let to_x = snap(to.right());
            let mut direction = ArrowDirection::Left;
            points.push(Point::new(from_x, from_y));
            if from.top == to.top {
                if from_x > to_x {
                    direction = ArrowDirection::Right;
                }
            } else {
                let bend = (from_x + size + am).max(to_x + size + am);
                points.push(Point::new(bend, from_y));
                points.push(Point::new(bend, to_y));
            }
            let tip = Point::new(to_x, to_y);
            points.push(tip);
            (points, tip, direction)
        }
        RelationKind::StartFinish => {
            let from_x = snap(from.left);
            let to_x = snap(to.right());
            points.push(Point::new(from_x, from_y));
            if from_x - am - am - size > to_x {
                let bend = to_x + am + size;
                points.push(Point::new(bend, from_y));
                points.push(Point::new(bend, to_y));
            } else {
                let destination_below = to.top >= from.top;
                let bend_out = from_x - am;
                let bend_in = to_x + am + size;
                let lane = snap(if destination_below {
                    context.to_row.top
                } else {
                    context.to_row.top + context.to_row.height
                });
                points.push(Point::new(bend_out, from_y));
                points.push(Point::new(bend_out, lane));
                points.push(Point::new(bend_in, lane));
                points.push(Point::new(bend_in, to_y));
            }
            let tip = Point::new(to_x, to_y);
            points.push(tip);
            (points, tip, ArrowDirection::Left)
        }
        RelationKind::StartStart => {
            let from_x = snap(from.left);
            let to_x = snap(to.left);
            let mut direction = ArrowDirection::Right;
            points.push(Point::new(from_x, from_y));
            if from.top == to.top {
                if from_x > to_x {
                    direction = ArrowDirection::Left;
                }
            } else {
                let bend = (from_x - size - am).min(to_x - size - am);
                points.push(Point::new(bend, from_y));
                points.push(Point::new(bend, to_y));
            }
            let tip = Point::new(to_x, to_y);
            points.push(tip);
            (points, tip, direction)
        }
        RelationKind::FinishStart => {
            let from_x = snap(from.right());
            let to_left = snap(to.left);
            points.push(Point::new(from_x, from_y));
            if to_left >= from_x {
                let to_x = (to_left + am).min(snap(to.center_x()));
                if to.top > from.top {
                    let tip = Point::new(to_x, snap(to.top));
                    points.push(Point::new(to_x, from_y));
                    points.push(tip);
                    (points, tip, ArrowDirection::Down)
                } else if to.top < from.top {
                    let tip = Point::new(to_x, snap(to.bottom()));
                    points.push(Point::new(to_x, from_y));
                    points.push(tip);
                    (points, tip, ArrowDirection::Up)
                } else {
                    let tip = Point::new(to_left, to_y);
                    points.push(tip);
                    (points, tip, ArrowDirection::Right)
                }
            } else {
                let lane = snap(if to.top > from.top {
                    context.to_row.top
                } else {
                    context.to_row.top + context.to_row.height
                });
                let bend_out = from_x + am;
                let bend_in = to_left - am - size;
                points.push(Point::new(bend_out, from_y));
                points.push(Point::new(bend_out, lane));
                points.push(Point::new(bend_in, lane));
                points.push(Point::new(bend_in, to_y));
                let tip = Point::new(to_left, to_y);
                points.push(tip);
                (points, tip, ArrowDirection::Right)
            }
        }
    }
}

/// Drops leading invisible segments. Once one segment is visible every
/// following segment is kept so the polyline never turns diagonal.
fn clip_segments(points: &[Point], clip: Rect) -> SmallVec<[Segment; 5]> {
    let mut segments = SmallVec::new();
    let mut started = false;
    for pair in points.windows(2) {
        let segment = Segment::new(pair[0], pair[1]);
        if !started && !segment.is_visible_in(clip) {
            continue;
        }
        started = true;
        segments.push(segment);
    }
    segments
}
