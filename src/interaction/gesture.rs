use serde::{Deserialize, Serialize};

use crate::core::{BarEdge, ConnectorRouter, Point, Rect, RelationKind, Segment, TimeRange, TimeScale};

/// Which visual part of a row an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementPart {
    Actual,
    Baseline,
    Milestone,
    Period,
}

/// Addresses one editable element: a row's actual bar, its baseline, its
/// milestone marker or one of its resource periods.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementRef {
    pub row_id: String,
    pub part: ElementPart,
    pub period_index: Option<usize>,
}

impl ElementRef {
    #[must_use]
    pub fn actual(row_id: impl Into<String>) -> Self {
        Self {
            row_id: row_id.into(),
            part: ElementPart::Actual,
            period_index: None,
        }
    }

    #[must_use]
    pub fn baseline(row_id: impl Into<String>) -> Self {
        Self {
            row_id: row_id.into(),
            part: ElementPart::Baseline,
            period_index: None,
        }
    }

    #[must_use]
    pub fn milestone(row_id: impl Into<String>) -> Self {
        Self {
            row_id: row_id.into(),
            part: ElementPart::Milestone,
            period_index: None,
        }
    }

    #[must_use]
    pub fn period(row_id: impl Into<String>, period_index: usize) -> Self {
        Self {
            row_id: row_id.into(),
            part: ElementPart::Period,
            period_index: Some(period_index),
        }
    }

    /// Baselines can be edited but never take part in relations.
    #[must_use]
    pub fn accepts_connectors(&self) -> bool {
        self.part != ElementPart::Baseline
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GestureKind {
    Move,
    ResizeLeft,
    ResizeRight,
    AdjustProgress,
    CreateConnector { from: BarEdge },
}

/// How edge scrolling behaves while a gesture is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScrollPolicy {
    /// Window may overshoot the data edges.
    Force,
    /// Window stays inside the total range.
    Clamped,
    None,
}

impl GestureKind {
    #[must_use]
    pub fn scroll_policy(self) -> ScrollPolicy {
        match self {
            Self::Move | Self::ResizeLeft | Self::ResizeRight => ScrollPolicy::Force,
            Self::CreateConnector { .. } => ScrollPolicy::Clamped,
            Self::AdjustProgress => ScrollPolicy::None,
        }
    }

    #[must_use]
    pub fn scrolls_vertically(self) -> bool {
        matches!(self, Self::Move | Self::CreateConnector { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DragPhase {
    Idle,
    Dragging,
    Committed,
    Cancelled,
}

/// Live geometry shown while dragging.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GesturePreview {
    /// Outline of the bar at its would-be position.
    Outline(Rect),
    /// Progress fill and the fraction it represents.
    Progress { fill: Rect, value: f64 },
    Connector(Segment),
}

/// Scale and timeline bounds the gesture is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureGeometry {
    pub scale: TimeScale,
    pub timeline_bounds: Rect,
    pub connector_stroke: f64,
}

/// Element under the pointer when a connector drag is released.
#[derive(Debug, Clone, PartialEq)]
pub struct DropTarget {
    pub element: ElementRef,
    pub rect: Rect,
}

/// Data change produced by a committed gesture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Mutation {
    SetRange { element: ElementRef, range: TimeRange },
    SetProgress { element: ElementRef, progress: f64 },
    CreateRelation {
        from: ElementRef,
        to: ElementRef,
        kind: RelationKind,
    },
}

impl Mutation {
    #[must_use]
    pub fn element(&self) -> &ElementRef {
        match self {
            Self::SetRange { element, .. } | Self::SetProgress { element, .. } => element,
            Self::CreateRelation { from, .. } => from,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CancelReason {
    /// The host cancelled the gesture.
    Aborted,
    /// The computed time or progress was not a finite number.
    NotFinite,
    /// Connector released over nothing, over a baseline or over its source.
    InvalidTarget,
    /// A plugin vetoed the change.
    Vetoed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cancelled {
    pub reason: CancelReason,
}

impl Cancelled {
    #[must_use]
    pub const fn new(reason: CancelReason) -> Self {
        Self { reason }
    }
}

/// One in-flight drag edit.
///
/// Created by [`DragSession::start`], fed pointer positions through
/// [`DragSession::drag`] and consumed by [`DragSession::commit`] or
/// [`DragSession::cancel`].
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    kind: GestureKind,
    target: ElementRef,
    origin_rect: Rect,
    /// Current on-screen bounds of the target; moves when rows scroll.
    anchor: Rect,
    edge_scrolling: bool,
    origin_range: TimeRange,
    origin_progress: f64,
    pointer_origin: Point,
    grab_offset_x: f64,
    pointer: Point,
    preview: GesturePreview,
    phase: DragPhase,
}

impl DragSession {
    #[must_use]
    pub fn start(
        kind: GestureKind,
        target: ElementRef,
        origin_rect: Rect,
        origin_range: TimeRange,
        origin_progress: f64,
        pointer: Point,
        geometry: &GestureGeometry,
    ) -> Self {
        let mut session = Self {
            kind,
            target,
            origin_rect,
            anchor: origin_rect,
            edge_scrolling: false,
            origin_range,
            origin_progress: origin_progress.clamp(0.0, 1.0),
            pointer_origin: pointer,
            grab_offset_x: pointer.x - origin_rect.left,
            pointer,
            preview: GesturePreview::Outline(origin_rect),
            phase: DragPhase::Dragging,
        };
        session.preview = session.compute_preview(geometry);
        session
    }

    #[must_use]
    pub fn kind(&self) -> GestureKind {
        self.kind
    }

    #[must_use]
    pub fn target(&self) -> &ElementRef {
        &self.target
    }

    #[must_use]
    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    #[must_use]
    pub fn origin_rect(&self) -> Rect {
        self.origin_rect
    }

    #[must_use]
    pub fn origin_range(&self) -> TimeRange {
        self.origin_range
    }

    #[must_use]
    pub fn pointer(&self) -> Point {
        self.pointer
    }

    /// Horizontal pointer travel since the gesture started.
    #[must_use]
    pub fn current_delta(&self) -> f64 {
        self.pointer.x - self.pointer_origin.x
    }

    #[must_use]
    pub fn preview(&self) -> GesturePreview {
        self.preview
    }

    pub fn drag(&mut self, pointer: Point, geometry: &GestureGeometry) {
        self.pointer = pointer;
        self.preview = self.compute_preview(geometry);
    }

    /// Re-evaluates the preview for the current pointer, e.g. after the
    /// window scrolled underneath it.
    pub fn refresh(&mut self, geometry: &GestureGeometry) {
        self.preview = self.compute_preview(geometry);
    }

    /// Current on-screen bounds of the target element.
    #[must_use]
    pub fn anchor(&self) -> Rect {
        self.anchor
    }

    /// Moves the preview onto the target's current bounds. Called after
    /// rows or the window scrolled so the preview stays attached to its bar.
    pub fn rebase(&mut self, anchor: Rect, geometry: &GestureGeometry) {
        self.anchor = anchor;
        self.preview = self.compute_preview(geometry);
    }

    /// While edge scrolling, a dragged resize edge is pinned to the
    /// timeline bounds instead of following the pointer out of view.
    pub fn set_edge_scrolling(&mut self, active: bool) {
        self.edge_scrolling = active;
    }

    #[must_use]
    pub fn is_edge_scrolling(&self) -> bool {
        self.edge_scrolling
    }

    fn edge_x(&self, bounds: Rect) -> f64 {
        if self.edge_scrolling {
            self.pointer.x.clamp(bounds.left, bounds.right())
        } else {
            self.pointer.x
        }
    }

    fn compute_preview(&self, geometry: &GestureGeometry) -> GesturePreview {
        let scale = geometry.scale;
        let bounds = geometry.timeline_bounds;
        let rect = self.anchor;
        match self.kind {
            GestureKind::Move => {
                GesturePreview::Outline(Rect::new(
                    self.pointer.x - self.grab_offset_x,
                    rect.top,
                    rect.width,
                    rect.height,
                ))
            }
            GestureKind::ResizeLeft => {
                let fixed = scale.timestamp_to_pixel(self.origin_range.end, bounds);
                let left = self.edge_x(bounds).min(fixed);
                GesturePreview::Outline(Rect::new(left, rect.top, fixed - left, rect.height))
            }
            GestureKind::ResizeRight => {
                let fixed = scale.timestamp_to_pixel(self.origin_range.start, bounds);
                let right = self.edge_x(bounds).max(fixed);
                GesturePreview::Outline(Rect::new(fixed, rect.top, right - fixed, rect.height))
            }
            GestureKind::AdjustProgress => {
                let value = progress_at(rect, self.pointer.x);
                GesturePreview::Progress {
                    fill: Rect::new(rect.left, rect.top, value * rect.width, rect.height),
                    value,
                }
            }
            GestureKind::CreateConnector { from } => GesturePreview::Connector(
                ConnectorRouter.route_preview(rect, from, self.pointer, geometry.connector_stroke),
            ),
        }
    }

    /// Converts the final preview into a data change.
    pub fn commit(
        mut self,
        geometry: &GestureGeometry,
        drop: Option<&DropTarget>,
    ) -> Result<Mutation, Cancelled> {
        if !self.pointer.x.is_finite() || !self.pointer.y.is_finite() {
            return Err(Cancelled::new(CancelReason::NotFinite));
        }
        self.preview = self.compute_preview(geometry);
        let scale = geometry.scale;
        let bounds = geometry.timeline_bounds;

        let mutation = match (self.kind, self.preview) {
            (GestureKind::Move, GesturePreview::Outline(preview)) => {
                let range = if self.target.part == ElementPart::Milestone {
                    let at = scale.pixel_to_timestamp(preview.center_x(), bounds);
                    TimeRange::instant(at)
                } else {
                    let start = scale.pixel_to_timestamp(preview.left, bounds);
                    let delta = start - self.origin_range.start;
                    TimeRange {
                        start,
                        end: self.origin_range.end + delta,
                    }
                };
                Mutation::SetRange {
                    element: self.target,
                    range,
                }
            }
            (GestureKind::ResizeLeft, GesturePreview::Outline(preview)) => Mutation::SetRange {
                element: self.target,
                range: TimeRange {
                    start: scale
                        .pixel_to_timestamp(preview.left, bounds)
                        .min(self.origin_range.end),
                    end: self.origin_range.end,
                },
            },
            (GestureKind::ResizeRight, GesturePreview::Outline(preview)) => Mutation::SetRange {
                element: self.target,
                range: TimeRange {
                    start: self.origin_range.start,
                    end: scale
                        .pixel_to_timestamp(preview.right(), bounds)
                        .max(self.origin_range.start),
                },
            },
            (GestureKind::AdjustProgress, GesturePreview::Progress { value, .. }) => {
                Mutation::SetProgress {
                    element: self.target,
                    progress: (value * 100.0).round() / 100.0,
                }
            }
            (GestureKind::CreateConnector { from }, GesturePreview::Connector(_)) => {
                let Some(drop) = drop else {
                    return Err(Cancelled::new(CancelReason::InvalidTarget));
                };
                if !drop.element.accepts_connectors() || drop.element == self.target {
                    return Err(Cancelled::new(CancelReason::InvalidTarget));
                }
                let ratio = if drop.rect.width > 0.0 {
                    (self.pointer.x - drop.rect.left) / drop.rect.width
                } else {
                    0.0
                };
                let to_edge = if ratio < 0.5 {
                    BarEdge::Start
                } else {
                    BarEdge::Finish
                };
                Mutation::CreateRelation {
                    from: self.target,
                    to: drop.element.clone(),
                    kind: RelationKind::from_edges(from, to_edge),
                }
            }
            _ => return Err(Cancelled::new(CancelReason::Aborted)),
        };

        match &mutation {
            Mutation::SetRange { range, .. }
                if !range.start.is_finite() || !range.end.is_finite() =>
            {
                Err(Cancelled::new(CancelReason::NotFinite))
            }
            Mutation::SetProgress { progress, .. } if !progress.is_finite() => {
                Err(Cancelled::new(CancelReason::NotFinite))
            }
            _ => Ok(mutation),
        }
    }

    /// Drops the gesture without touching data.
    #[must_use]
    pub fn cancel(self) -> Cancelled {
        Cancelled::new(CancelReason::Aborted)
    }
}

fn progress_at(bar: Rect, x: f64) -> f64 {
    if bar.width <= 0.0 {
        return 0.0;
    }
    (x - bar.left).clamp(0.0, bar.width) / bar.width
}

#[cfg(test)]
mod tests {
    use super::{
        CancelReason, DragSession, DropTarget, ElementRef, GestureGeometry, GestureKind,
        GesturePreview, Mutation,
    };
    use crate::core::{BarEdge, Point, Rect, RelationKind, TimeRange, TimeScale};

    fn geometry() -> GestureGeometry {
        let scale = TimeScale::with_ranges(
            TimeRange::new(0.0, 10_000.0).expect("total"),
            TimeRange::new(0.0, 1_000.0).expect("visible"),
        )
        .expect("scale");
        GestureGeometry {
            scale,
            timeline_bounds: Rect::new(0.0, 0.0, 1_000.0, 400.0),
            connector_stroke: 1.0,
        }
    }

    #[test]
    fn resize_right_cannot_cross_fixed_edge() {
        let geometry = geometry();
        let range = TimeRange::new(100.0, 200.0).expect("range");
        let mut session = DragSession::start(
            GestureKind::ResizeRight,
            ElementRef::actual("a"),
            Rect::new(100.0, 10.0, 100.0, 20.0),
            range,
            0.0,
            Point::new(200.0, 20.0),
            &geometry,
        );
        session.drag(Point::new(50.0, 20.0), &geometry);
        match session.preview() {
            GesturePreview::Outline(rect) => assert_eq!(rect.width, 0.0),
            other => panic!("unexpected preview {other:?}"),
        }
        let mutation = session.commit(&geometry, None).expect("commit");
        assert_eq!(
            mutation,
            Mutation::SetRange {
                element: ElementRef::actual("a"),
                range: TimeRange::instant(100.0),
            }
        );
    }

    #[test]
    fn progress_is_clamped_and_rounded() {
        let geometry = geometry();
        let mut session = DragSession::start(
            GestureKind::AdjustProgress,
            ElementRef::actual("a"),
            Rect::new(100.0, 10.0, 300.0, 20.0),
            TimeRange::new(100.0, 400.0).expect("range"),
            0.5,
            Point::new(250.0, 30.0),
            &geometry,
        );
        session.drag(Point::new(900.0, 30.0), &geometry);
        assert!(matches!(session.preview(), GesturePreview::Progress { value, .. } if value == 1.0));
        session.drag(Point::new(200.0, 30.0), &geometry);
        let mutation = session.commit(&geometry, None).expect("commit");
        assert_eq!(
            mutation,
            Mutation::SetProgress {
                element: ElementRef::actual("a"),
                progress: 0.33,
            }
        );
    }

    #[test]
    fn connector_drop_on_right_half_targets_finish() {
        let geometry = geometry();
        let mut session = DragSession::start(
            GestureKind::CreateConnector { from: BarEdge::Finish },
            ElementRef::actual("a"),
            Rect::new(100.0, 10.0, 100.0, 20.0),
            TimeRange::new(100.0, 200.0).expect("range"),
            0.0,
            Point::new(205.0, 20.0),
            &geometry,
        );
        session.drag(Point::new(380.0, 60.0), &geometry);
        let drop = DropTarget {
            element: ElementRef::actual("b"),
            rect: Rect::new(300.0, 50.0, 100.0, 20.0),
        };
        let mutation = session.commit(&geometry, Some(&drop)).expect("commit");
        assert!(matches!(
            mutation,
            Mutation::CreateRelation { kind: RelationKind::FinishFinish, .. }
        ));
    }

    #[test]
    fn connector_to_baseline_is_rejected() {
        let geometry = geometry();
        let session = DragSession::start(
            GestureKind::CreateConnector { from: BarEdge::Start },
            ElementRef::actual("a"),
            Rect::new(100.0, 10.0, 100.0, 20.0),
            TimeRange::new(100.0, 200.0).expect("range"),
            0.0,
            Point::new(95.0, 20.0),
            &geometry,
        );
        let drop = DropTarget {
            element: ElementRef::baseline("b"),
            rect: Rect::new(300.0, 50.0, 100.0, 20.0),
        };
        let cancelled = session.commit(&geometry, Some(&drop)).expect_err("rejected");
        assert_eq!(cancelled.reason, CancelReason::InvalidTarget);
    }

    #[test]
    fn rebase_keeps_connector_preview_on_its_bar() {
        let geometry = geometry();
        let mut session = DragSession::start(
            GestureKind::CreateConnector { from: BarEdge::Finish },
            ElementRef::actual("a"),
            Rect::new(100.0, 10.0, 100.0, 20.0),
            TimeRange::new(100.0, 200.0).expect("range"),
            0.0,
            Point::new(205.0, 20.0),
            &geometry,
        );
        session.drag(Point::new(300.0, 390.0), &geometry);

        session.rebase(Rect::new(100.0, -50.0, 100.0, 20.0), &geometry);

        match session.preview() {
            GesturePreview::Connector(segment) => {
                assert_eq!(segment.from, Point::new(200.5, -39.5));
                assert_eq!(segment.to, Point::new(300.0, 390.0));
            }
            other => panic!("unexpected preview {other:?}"),
        }
    }

    #[test]
    fn resize_edge_is_pinned_while_edge_scrolling() {
        let geometry = geometry();
        let mut session = DragSession::start(
            GestureKind::ResizeRight,
            ElementRef::actual("a"),
            Rect::new(100.0, 10.0, 100.0, 20.0),
            TimeRange::new(100.0, 200.0).expect("range"),
            0.0,
            Point::new(198.0, 20.0),
            &geometry,
        );
        session.drag(Point::new(1_050.0, 20.0), &geometry);
        assert!(matches!(session.preview(), GesturePreview::Outline(rect) if rect.width == 950.0));

        session.set_edge_scrolling(true);
        session.refresh(&geometry);

        assert!(matches!(session.preview(), GesturePreview::Outline(rect) if rect.width == 900.0));
        let mutation = session.commit(&geometry, None).expect("commit");
        assert_eq!(
            mutation,
            Mutation::SetRange {
                element: ElementRef::actual("a"),
                range: TimeRange::new(100.0, 1_000.0).expect("range"),
            }
        );
    }

    #[test]
    fn nan_pointer_aborts_commit() {
        let geometry = geometry();
        let mut session = DragSession::start(
            GestureKind::Move,
            ElementRef::actual("a"),
            Rect::new(100.0, 10.0, 100.0, 20.0),
            TimeRange::new(100.0, 200.0).expect("range"),
            0.0,
            Point::new(150.0, 20.0),
            &geometry,
        );
        session.drag(Point::new(f64::NAN, 20.0), &geometry);
        let cancelled = session.commit(&geometry, None).expect_err("nan");
        assert_eq!(cancelled.reason, CancelReason::NotFinite);
    }
}
