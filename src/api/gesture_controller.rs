use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::{BarEdge, Point, Rect, RowKind, TimeRange};
use crate::error::{TimelineError, TimelineResult};
use crate::extensions::{ConnectorRequest, TimelineEvent};
use crate::interaction::{
    CancelReason, DragSession, DropTarget, EdgeScroll, ElementPart, ElementRef, GestureGeometry,
    GestureKind, Mutation, ScrollPolicy,
};
use crate::render::Renderer;

use super::layout_pass::BarVisual;
use super::validation::validate_pointer;
use super::{ConnectorSpec, TimelineEngine};

/// How a drag gesture ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GestureOutcome {
    Committed(Mutation),
    Cancelled(CancelReason),
}

impl GestureOutcome {
    #[must_use]
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }
}

impl<R: Renderer> TimelineEngine<R> {
    pub(super) fn gesture_geometry(&self) -> GestureGeometry {
        GestureGeometry {
            scale: self.scale,
            timeline_bounds: self.timeline_bounds(),
            connector_stroke: self.config.connectors.thickness,
        }
    }

    /// Finds the element and gesture a press at `point` would start.
    ///
    /// Connector markers and the progress handle sit partly outside the bar,
    /// so they are tested before the bar body.
    fn gesture_hit(&self, point: Point) -> Option<(&BarVisual, GestureKind)> {
        let edit = &self.config.edit;
        self.pass.visible_bars().rev().find_map(|bar| {
            let bounds = bar.bounds;
            if bar.element.accepts_connectors() {
                let size = edit.connector_marker_size;
                let start = square(bounds.left - size / 2.0, bounds.center_y(), size);
                let finish = square(bounds.right() + size / 2.0, bounds.center_y(), size);
                if start.contains(point) {
                    return Some((bar, GestureKind::CreateConnector { from: BarEdge::Start }));
                }
                if finish.contains(point) {
                    return Some((bar, GestureKind::CreateConnector { from: BarEdge::Finish }));
                }
            }
            if bar.kind == RowKind::Task
                && let Some(progress) = bar.progress
            {
                let x = bounds.left + progress.clamp(0.0, 1.0) * bounds.width;
                let handle = square(x, bounds.bottom(), edit.progress_handle_size);
                if handle.contains(point) {
                    return Some((bar, GestureKind::AdjustProgress));
                }
            }
            if !bounds.contains(point) {
                return None;
            }
            let thumb = edit.resize_thumb_width;
            if bar.kind != RowKind::Milestone && bounds.width >= thumb * 3.0 {
                if point.x <= bounds.left + thumb {
                    return Some((bar, GestureKind::ResizeLeft));
                }
                if point.x >= bounds.right() - thumb {
                    return Some((bar, GestureKind::ResizeRight));
                }
            }
            Some((bar, GestureKind::Move))
        })
    }

    /// Handles a primary-button press.
    ///
    /// Starts a drag gesture when the press hits a bar, a resize thumb, the
    /// progress handle or a connector marker; otherwise updates the
    /// selection. Returns the kind of the started gesture.
    pub fn pointer_down(&mut self, point: Point) -> TimelineResult<Option<GestureKind>> {
        validate_pointer(point.x, point.y)?;
        if self.interaction.session().is_some() {
            return Err(TimelineError::GestureInProgress);
        }
        if !self.timeline_bounds().contains(point) {
            return Ok(None);
        }

        let Some((bar, kind)) = self.gesture_hit(point) else {
            self.select_at(point);
            return Ok(None);
        };
        let element = bar.element.clone();
        let geometry = self.gesture_geometry();
        let session = DragSession::start(
            kind,
            element.clone(),
            bar.bounds,
            bar.range,
            bar.progress.unwrap_or(0.0),
            point,
            &geometry,
        );
        self.interaction.begin_session(session)?;
        self.select_element(&element);

        debug!(?kind, row_id = %element.row_id, "gesture started");
        self.emit(TimelineEvent::GestureStarted { kind, element });
        Ok(Some(kind))
    }

    /// Updates hover and, while dragging, the gesture preview and the
    /// edge-scroll request.
    pub fn pointer_move(&mut self, point: Point) -> TimelineResult<()> {
        validate_pointer(point.x, point.y)?;
        let hovered = self.pass.bar_at(point).map(|bar| bar.element.clone());
        self.interaction.on_pointer_move(point, hovered);

        let Some(kind) = self.interaction.session().map(DragSession::kind) else {
            return Ok(());
        };
        let geometry = self.gesture_geometry();
        self.edge_scroll = if kind.scroll_policy() == ScrollPolicy::None {
            None
        } else {
            EdgeScroll::for_pointer(
                point,
                geometry.timeline_bounds,
                self.config.edit.edge_scroll_step,
                kind.scrolls_vertically(),
            )
        };
        let edge_scrolling = self.edge_scroll.is_some();
        if let Some(session) = self.interaction.session_mut() {
            session.set_edge_scrolling(edge_scrolling);
            session.drag(point, &geometry);
        }
        Ok(())
    }

    /// Pointer left the widget. Hover is cleared; an active drag keeps
    /// running so edge scrolling can continue.
    pub fn pointer_leave(&mut self) {
        self.interaction.on_pointer_leave();
    }

    /// `true` while a drag wants the host to keep calling
    /// [`Self::edge_scroll_tick`] on its repeating timer.
    #[must_use]
    pub fn is_edge_scrolling(&self) -> bool {
        self.edge_scroll.is_some() && self.interaction.session().is_some()
    }

    /// Advances edge scrolling by one step. Returns `false` when there is
    /// nothing to scroll and the host can stop its timer.
    pub fn edge_scroll_tick(&mut self) -> bool {
        let Some(scroll) = self.edge_scroll else {
            return false;
        };
        let Some(kind) = self.interaction.session().map(DragSession::kind) else {
            self.edge_scroll = None;
            return false;
        };

        let before = self.scale.visible_range();
        let width = self.timeline_bounds().width;
        if scroll.is_horizontal() && width > 0.0 {
            let ratio = scroll.dx / width;
            match kind.scroll_policy() {
                ScrollPolicy::Force => self.scale.ratio_force_scroll(ratio),
                ScrollPolicy::Clamped => self.scale.ratio_scroll(ratio),
                ScrollPolicy::None => {}
            }
        }
        if scroll.dy != 0.0 {
            self.rows.scroll_by(scroll.dy);
        }
        self.relayout();

        let geometry = self.gesture_geometry();
        let anchor = self
            .interaction
            .session()
            .and_then(|session| self.element_bounds(session.target()));
        if let Some(session) = self.interaction.session_mut() {
            match anchor {
                Some(anchor) => session.rebase(anchor, &geometry),
                None => session.refresh(&geometry),
            }
        }
        self.emit_visible_range_changed(before);
        true
    }

    /// Ends the active gesture at `point` and writes its result.
    ///
    /// Connector creation goes through the plugins' veto first. All writes
    /// of one commit happen inside a single suspend/resume window of the
    /// store.
    pub fn pointer_up(&mut self, point: Point) -> TimelineResult<GestureOutcome> {
        let mut session = self.interaction.take_session()?;
        self.edge_scroll = None;
        let geometry = self.gesture_geometry();
        session.drag(point, &geometry);

        let drop = match session.kind() {
            GestureKind::CreateConnector { .. } => self.pass.bar_at(point).map(|bar| DropTarget {
                element: bar.element.clone(),
                rect: bar.bounds,
            }),
            _ => None,
        };

        match session.commit(&geometry, drop.as_ref()) {
            Ok(mutation) => self.apply_commit(mutation),
            Err(cancelled) => {
                self.finish_cancelled(cancelled.reason);
                Ok(GestureOutcome::Cancelled(cancelled.reason))
            }
        }
    }

    /// Cancels the active gesture without touching data.
    pub fn cancel_gesture(&mut self) -> TimelineResult<()> {
        let cancelled = self.interaction.take_session()?.cancel();
        self.edge_scroll = None;
        self.finish_cancelled(cancelled.reason);
        Ok(())
    }

    fn finish_cancelled(&mut self, reason: CancelReason) {
        let before = self.scale.visible_range();
        self.scale.settle_force_scroll(None);
        self.relayout();
        debug!(?reason, "gesture cancelled");
        self.emit(TimelineEvent::GestureCancelled { reason });
        self.emit_visible_range_changed(before);
    }

    fn apply_commit(&mut self, mutation: Mutation) -> TimelineResult<GestureOutcome> {
        if let Mutation::CreateRelation { from, to, kind } = &mutation {
            let request = ConnectorRequest {
                from: from.clone(),
                to: to.clone(),
                kind: *kind,
            };
            if !self.approve_connector(&request) {
                self.finish_cancelled(CancelReason::Vetoed);
                return Ok(GestureOutcome::Cancelled(CancelReason::Vetoed));
            }
        }

        let before = self.scale.visible_range();
        self.store.suspend_notifications();
        let written = self.write_mutation(&mutation);
        self.store.resume_notifications(written.is_ok());

        let committed_range = match &mutation {
            Mutation::SetRange { range, .. } => Some(*range),
            _ => None,
        };
        self.scale.settle_force_scroll(committed_range);
        self.relayout();

        let event = match written {
            Ok(event) => event,
            Err(err) => {
                warn!(error = %err, "gesture commit rejected by the data store");
                return Err(err);
            }
        };
        debug!(element = ?mutation.element(), "gesture committed");
        self.emit(event);
        self.emit_visible_range_changed(before);
        Ok(GestureOutcome::Committed(mutation))
    }

    fn write_mutation(&mut self, mutation: &Mutation) -> TimelineResult<TimelineEvent> {
        match mutation {
            Mutation::SetRange { element, range } => {
                let previous = self.element_range(element)?;
                let row_id = element.row_id.as_str();
                match element.part {
                    ElementPart::Actual | ElementPart::Milestone => {
                        self.store.set_actual_range(row_id, *range)?;
                    }
                    ElementPart::Baseline => self.store.set_baseline_range(row_id, *range)?,
                    ElementPart::Period => {
                        let period_index = period_index_of(element)?;
                        self.store.set_period_range(row_id, period_index, *range)?;
                    }
                }
                Ok(TimelineEvent::RangeChanged {
                    element: element.clone(),
                    previous,
                    current: *range,
                })
            }
            Mutation::SetProgress { element, progress } => {
                let row_index = self.row_index(&element.row_id)?;
                let previous = self
                    .store
                    .row(row_index)
                    .and_then(|row| row.progress)
                    .unwrap_or(0.0);
                self.store.set_progress(&element.row_id, *progress)?;
                Ok(TimelineEvent::ProgressChanged {
                    row_id: element.row_id.clone(),
                    previous,
                    current: *progress,
                })
            }
            Mutation::CreateRelation { from, to, kind } => {
                let target = self.connector_target_id(to)?;
                self.store.add_connector(
                    &from.row_id,
                    from.period_index,
                    ConnectorSpec::new(target, *kind),
                )?;
                Ok(TimelineEvent::ConnectorCreated(ConnectorRequest {
                    from: from.clone(),
                    to: to.clone(),
                    kind: *kind,
                }))
            }
        }
    }

    /// Stored time range of `element`.
    pub(super) fn element_range(&self, element: &ElementRef) -> TimelineResult<TimeRange> {
        let row_index = self.row_index(&element.row_id)?;
        let row = self
            .store
            .row(row_index)
            .ok_or_else(|| TimelineError::UnknownRow(element.row_id.clone()))?;
        let range = match element.part {
            ElementPart::Actual | ElementPart::Milestone => row.actual,
            ElementPart::Baseline => row.baseline,
            ElementPart::Period => {
                let period_index = period_index_of(element)?;
                row.periods.get(period_index).map(|period| period.range)
            }
        };
        range.ok_or_else(|| {
            TimelineError::InvalidData(format!(
                "row `{}` has no {:?} range",
                element.row_id, element.part
            ))
        })
    }

    /// Id stored in a connector pointing at `element`: the period id for
    /// resource periods, the row id otherwise.
    pub(super) fn connector_target_id(&self, element: &ElementRef) -> TimelineResult<String> {
        if element.part != ElementPart::Period {
            return Ok(element.row_id.clone());
        }
        let row_index = self.row_index(&element.row_id)?;
        let period_index = period_index_of(element)?;
        self.store
            .row(row_index)
            .and_then(|row| row.periods.get(period_index))
            .map(|period| period.id.clone())
            .ok_or_else(|| TimelineError::UnknownPeriod {
                row_id: element.row_id.clone(),
                period_index,
            })
    }
}

fn period_index_of(element: &ElementRef) -> TimelineResult<usize> {
    element.period_index.ok_or_else(|| {
        TimelineError::InvalidData(format!(
            "period element on row `{}` carries no period index",
            element.row_id
        ))
    })
}

fn square(center_x: f64, center_y: f64, size: f64) -> Rect {
    Rect::new(center_x - size / 2.0, center_y - size / 2.0, size, size)
}
