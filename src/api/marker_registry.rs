use tracing::debug;

use crate::error::{TimelineError, TimelineResult};
use crate::extensions::AxisMarker;
use crate::render::Renderer;

use super::TimelineEngine;

impl<R: Renderer> TimelineEngine<R> {
    /// Adds a line, range or text marker across the time axis and relays
    /// out. Ids must be unique among the timeline's axis markers.
    pub fn add_axis_marker(&mut self, marker: AxisMarker) -> TimelineResult<()> {
        marker.validate()?;
        if self.axis_marker(&marker.id).is_some() {
            return Err(TimelineError::InvalidData(format!(
                "axis marker `{}` is already on this timeline",
                marker.id
            )));
        }
        debug!(marker = %marker.id, "axis marker added");
        self.axis_markers.push(marker);
        self.relayout();
        Ok(())
    }

    /// Replaces the marker with the same id, keeping its paint position.
    pub fn update_axis_marker(&mut self, marker: AxisMarker) -> TimelineResult<()> {
        marker.validate()?;
        let Some(slot) = self
            .axis_markers
            .iter_mut()
            .find(|existing| existing.id == marker.id)
        else {
            return Err(TimelineError::InvalidData(format!(
                "axis marker `{}` is not on this timeline",
                marker.id
            )));
        };
        *slot = marker;
        self.relayout();
        Ok(())
    }

    pub fn remove_axis_marker(&mut self, marker_id: &str) -> bool {
        let before = self.axis_markers.len();
        self.axis_markers.retain(|marker| marker.id != marker_id);
        if self.axis_markers.len() == before {
            return false;
        }
        debug!(marker = marker_id, "axis marker removed");
        self.relayout();
        true
    }

    pub fn clear_axis_markers(&mut self) {
        if self.axis_markers.is_empty() {
            return;
        }
        self.axis_markers.clear();
        self.relayout();
    }

    #[must_use]
    pub fn axis_marker(&self, marker_id: &str) -> Option<&AxisMarker> {
        self.axis_markers.iter().find(|marker| marker.id == marker_id)
    }

    #[must_use]
    pub fn axis_markers(&self) -> &[AxisMarker] {
        &self.axis_markers
    }
}
