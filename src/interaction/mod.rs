//! Pointer interaction state and drag-edit state machines.

mod edge_scroll;
mod gesture;

pub use edge_scroll::{EdgeScroll, SCROLL_STEP};
pub use gesture::{
    CancelReason, Cancelled, DragPhase, DragSession, DropTarget, ElementPart, ElementRef,
    GestureGeometry, GestureKind, GesturePreview, Mutation, ScrollPolicy,
};

use serde::{Deserialize, Serialize};

use crate::core::{Point, RelationKind};
use crate::error::{TimelineError, TimelineResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractionMode {
    Idle,
    Dragging,
}

/// Connector picked by the user; identified by its endpoints and kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectorSelection {
    pub from: ElementRef,
    pub to: ElementRef,
    pub kind: RelationKind,
}

/// Pointer, hover, selection and gesture state of one timeline.
///
/// At most one [`DragSession`] exists at a time; starting a second one is an
/// error until the first is committed or cancelled.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InteractionState {
    cursor: Option<Point>,
    hovered: Option<ElementRef>,
    selected_row: Option<String>,
    selected_period: Option<usize>,
    selected_connector: Option<ConnectorSelection>,
    session: Option<DragSession>,
}

impl InteractionState {
    #[must_use]
    pub fn mode(&self) -> InteractionMode {
        if self.session.is_some() {
            InteractionMode::Dragging
        } else {
            InteractionMode::Idle
        }
    }

    #[must_use]
    pub fn cursor(&self) -> Option<Point> {
        self.cursor
    }

    #[must_use]
    pub fn hovered(&self) -> Option<&ElementRef> {
        self.hovered.as_ref()
    }

    pub fn on_pointer_move(&mut self, point: Point, hovered: Option<ElementRef>) {
        self.cursor = Some(point);
        self.hovered = hovered;
    }

    pub fn on_pointer_leave(&mut self) {
        self.cursor = None;
        self.hovered = None;
    }

    #[must_use]
    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut DragSession> {
        self.session.as_mut()
    }

    pub fn begin_session(&mut self, session: DragSession) -> TimelineResult<()> {
        if self.session.is_some() {
            return Err(TimelineError::GestureInProgress);
        }
        self.session = Some(session);
        Ok(())
    }

    pub fn take_session(&mut self) -> TimelineResult<DragSession> {
        self.session.take().ok_or(TimelineError::NoActiveGesture)
    }

    #[must_use]
    pub fn selected_row(&self) -> Option<&str> {
        self.selected_row.as_deref()
    }

    #[must_use]
    pub fn selected_period(&self) -> Option<usize> {
        self.selected_period
    }

    /// Selects a row (and optionally one of its periods), dropping any
    /// connector selection. Returns `true` when the selection changed.
    pub fn select_row(&mut self, row_id: Option<String>, period_index: Option<usize>) -> bool {
        let changed = self.selected_row != row_id
            || self.selected_period != period_index
            || self.selected_connector.is_some();
        self.selected_row = row_id;
        self.selected_period = period_index;
        self.selected_connector = None;
        changed
    }

    #[must_use]
    pub fn selected_connector(&self) -> Option<&ConnectorSelection> {
        self.selected_connector.as_ref()
    }

    pub fn select_connector(&mut self, connector: Option<ConnectorSelection>) -> bool {
        let changed = self.selected_connector != connector;
        self.selected_connector = connector;
        if changed && self.selected_connector.is_some() {
            self.selected_row = None;
            self.selected_period = None;
        }
        changed
    }

    pub fn take_selected_connector(&mut self) -> Option<ConnectorSelection> {
        self.selected_connector.take()
    }
}
