use tracing::debug;

use crate::extensions::{ConnectorRequest, PluginContext, TimelineEvent};
use crate::render::Renderer;

use super::TimelineEngine;

impl<R: Renderer> TimelineEngine<R> {
    pub(super) fn plugin_context(&self) -> PluginContext {
        PluginContext {
            viewport: self.config.viewport,
            total_range: self.scale.total_range(),
            visible_range: self.scale.visible_range(),
            row_count: self.store.row_count(),
            data_revision: self.store.revision(),
            interaction_mode: self.interaction.mode(),
        }
    }

    /// Notifies plugins without queueing the event for the host.
    pub(super) fn emit_plugin_event(&mut self, event: &TimelineEvent) {
        let context = self.plugin_context();
        for plugin in &mut self.plugins {
            plugin.on_event(event, context);
        }
    }

    /// Notifies plugins and queues the event for [`TimelineEngine::take_events`].
    pub(super) fn emit(&mut self, event: TimelineEvent) {
        self.emit_plugin_event(&event);
        self.events.push(event);
    }

    /// Asks every plugin whether the connector may be created. The first
    /// veto wins.
    pub(super) fn approve_connector(&mut self, request: &ConnectorRequest) -> bool {
        let context = self.plugin_context();
        for plugin in &mut self.plugins {
            if !plugin.before_create_connector(request, context) {
                debug!(plugin = plugin.id(), "connector creation vetoed");
                return false;
            }
        }
        true
    }

    pub(super) fn emit_visible_range_changed(&mut self, before: (f64, f64)) {
        let (start, end) = self.scale.visible_range();
        if (start, end) != before {
            self.emit(TimelineEvent::VisibleRangeChanged { start, end });
        }
    }
}
