use serde::{Deserialize, Serialize};

use crate::core::{RelationKind, TimeRange, Viewport};
use crate::interaction::{CancelReason, ElementRef, GestureKind, InteractionMode};

/// Read-only state snapshot passed to plugin hooks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PluginContext {
    pub viewport: Viewport,
    pub total_range: (f64, f64),
    pub visible_range: (f64, f64),
    pub row_count: usize,
    pub data_revision: u64,
    pub interaction_mode: InteractionMode,
}

/// Event stream exposed to plugins and drained by hosts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TimelineEvent {
    RangeChanged {
        element: ElementRef,
        previous: TimeRange,
        current: TimeRange,
    },
    ProgressChanged {
        row_id: String,
        previous: f64,
        current: f64,
    },
    ConnectorCreated(ConnectorRequest),
    ConnectorRemoved(ConnectorRequest),
    RowSelected {
        row_id: Option<String>,
        period_index: Option<usize>,
    },
    ConnectorSelected(ConnectorRequest),
    GestureStarted {
        kind: GestureKind,
        element: ElementRef,
    },
    GestureCancelled {
        reason: CancelReason,
    },
    VisibleRangeChanged {
        start: f64,
        end: f64,
    },
    Rendered,
}

/// Relation about to be created or just removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectorRequest {
    pub from: ElementRef,
    pub to: ElementRef,
    pub kind: RelationKind,
}

/// Extension hook interface for bounded custom logic.
///
/// Plugins observe events and read engine context without mutating core
/// internals directly. The only influence a plugin has on the data is the
/// connector-creation veto.
pub trait TimelinePlugin {
    fn id(&self) -> &str;

    fn on_event(&mut self, event: &TimelineEvent, context: PluginContext);

    /// Called before a dragged connector is written to the data store.
    /// Returning `false` cancels the creation.
    fn before_create_connector(&mut self, request: &ConnectorRequest, context: PluginContext) -> bool {
        let _ = (request, context);
        true
    }
}
