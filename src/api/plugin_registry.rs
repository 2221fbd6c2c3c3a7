use tracing::debug;

use crate::error::{TimelineError, TimelineResult};
use crate::extensions::TimelinePlugin;
use crate::render::Renderer;

use super::TimelineEngine;

impl<R: Renderer> TimelineEngine<R> {
    /// Adds `plugin` to the end of the dispatch order. Ids must be non-blank
    /// and unique within this timeline.
    pub fn register_plugin(&mut self, plugin: Box<dyn TimelinePlugin>) -> TimelineResult<()> {
        let plugin_id = plugin.id();
        if plugin_id.trim().is_empty() {
            return Err(TimelineError::InvalidData(
                "timeline plugin id must not be blank".to_owned(),
            ));
        }
        if self.has_plugin(plugin_id) {
            return Err(TimelineError::InvalidData(format!(
                "timeline plugin `{plugin_id}` is already attached to this timeline"
            )));
        }
        debug!(plugin = plugin_id, position = self.plugins.len(), "timeline plugin attached");
        self.plugins.push(plugin);
        Ok(())
    }

    /// Detaches the plugin with `plugin_id`. Returns `false` when no such
    /// plugin is attached.
    pub fn unregister_plugin(&mut self, plugin_id: &str) -> bool {
        let Some(position) = self.plugins.iter().position(|plugin| plugin.id() == plugin_id) else {
            return false;
        };
        self.plugins.remove(position);
        debug!(plugin = plugin_id, "timeline plugin detached");
        true
    }

    #[must_use]
    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }

    #[must_use]
    pub fn has_plugin(&self, plugin_id: &str) -> bool {
        self.plugins.iter().any(|plugin| plugin.id() == plugin_id)
    }

    /// Attached plugin ids in dispatch order.
    pub fn plugin_ids(&self) -> impl Iterator<Item = &str> {
        self.plugins.iter().map(|plugin| plugin.id())
    }
}
