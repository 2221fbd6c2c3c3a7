use ordered_float::OrderedFloat;
use tracing::debug;

use crate::core::Point;
use crate::error::{TimelineError, TimelineResult};
use crate::extensions::{ConnectorRequest, TimelineEvent};
use crate::interaction::{ConnectorSelection, ElementRef};
use crate::render::Renderer;

use super::TimelineEngine;
use super::layout_pass::RoutedConnector;

impl<R: Renderer> TimelineEngine<R> {
    #[must_use]
    pub fn selected_row(&self) -> Option<&str> {
        self.interaction.selected_row()
    }

    #[must_use]
    pub fn selected_connector(&self) -> Option<&ConnectorSelection> {
        self.interaction.selected_connector()
    }

    /// Selects a row by id, or clears the selection with `None`.
    pub fn select_row(&mut self, row_id: Option<&str>) -> TimelineResult<()> {
        if let Some(row_id) = row_id {
            self.row_index(row_id)?;
        }
        self.apply_row_selection(row_id.map(str::to_owned), None);
        Ok(())
    }

    /// Selects one period of a resource row.
    pub fn select_period(&mut self, row_id: &str, period_index: usize) -> TimelineResult<()> {
        let row_index = self.row_index(row_id)?;
        let exists = self
            .store
            .row(row_index)
            .is_some_and(|row| period_index < row.periods.len());
        if !exists {
            return Err(TimelineError::UnknownPeriod {
                row_id: row_id.to_owned(),
                period_index,
            });
        }
        self.apply_row_selection(Some(row_id.to_owned()), Some(period_index));
        Ok(())
    }

    /// Routed connector nearest to `point` within the hit tolerance.
    #[must_use]
    pub fn connector_at(&self, point: Point) -> Option<&RoutedConnector> {
        let tolerance = self.config.connectors.hit_tolerance;
        self.pass
            .connectors
            .iter()
            .map(|connector| (connector, connector.path.distance_to(point)))
            .filter(|(_, distance)| *distance <= tolerance)
            .min_by_key(|(_, distance)| OrderedFloat(*distance))
            .map(|(connector, _)| connector)
    }

    /// Removes the selected connector from the store. Returns `false` when
    /// nothing was selected or the relation no longer exists.
    pub fn delete_selected_connector(&mut self) -> TimelineResult<bool> {
        let Some(selection) = self.interaction.take_selected_connector() else {
            return Ok(false);
        };
        let target = self.connector_target_id(&selection.to)?;

        self.store.suspend_notifications();
        let removed = self.store.remove_connector(
            &selection.from.row_id,
            selection.from.period_index,
            &target,
            selection.kind,
        );
        self.store
            .resume_notifications(matches!(removed, Ok(count) if count > 0));
        let removed = removed?;
        self.relayout();

        if removed == 0 {
            debug!(from = %selection.from.row_id, to = %target, "selected connector already gone");
            return Ok(false);
        }
        self.emit(TimelineEvent::ConnectorRemoved(ConnectorRequest {
            from: selection.from,
            to: selection.to,
            kind: selection.kind,
        }));
        Ok(true)
    }

    /// Click without a gesture: selects a bar's row, a connector or the row
    /// under the pointer, in that order.
    pub(super) fn select_at(&mut self, point: Point) {
        if let Some(element) = self.pass.bar_at(point).map(|bar| bar.element.clone()) {
            self.select_element(&element);
            return;
        }
        if let Some(connector) = self.connector_at(point) {
            let selection = ConnectorSelection {
                from: connector.from.clone(),
                to: connector.to.clone(),
                kind: connector.relation.kind,
            };
            if self.interaction.select_connector(Some(selection.clone())) {
                self.emit(TimelineEvent::ConnectorSelected(ConnectorRequest {
                    from: selection.from,
                    to: selection.to,
                    kind: selection.kind,
                }));
            }
            return;
        }
        let row_id = self.pass.row_at(point.y).map(|row| row.row_id.clone());
        self.apply_row_selection(row_id, None);
    }

    pub(super) fn select_element(&mut self, element: &ElementRef) {
        self.apply_row_selection(Some(element.row_id.clone()), element.period_index);
    }

    fn apply_row_selection(&mut self, row_id: Option<String>, period_index: Option<usize>) {
        if self.interaction.select_row(row_id.clone(), period_index) {
            self.emit(TimelineEvent::RowSelected {
                row_id,
                period_index,
            });
        }
    }
}
