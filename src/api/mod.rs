//! Host-facing orchestration: the [`TimelineEngine`] facade, its
//! configuration and the storage/virtualization seams it consumes.

mod connector_coordinator;
mod data_store;
mod engine;
mod engine_config;
mod engine_snapshot;
mod gesture_controller;
mod layout_pass;
mod marker_registry;
mod plugin_dispatch;
mod plugin_registry;
mod render_frame_builder;
mod render_style;
mod row_source;
mod selection_controller;
mod time_scale_controller;
mod validation;

pub use connector_coordinator::{PruneReason, PrunedRelation, Relation};
pub use data_store::{ConnectorSpec, InMemoryStore, Period, RowItem, TimelineDataStore};
pub use engine::TimelineEngine;
pub use engine_config::{
    ConnectorStyle, EditConfig, LabelLayoutConfig, TimelineElementsConfig, TimelineEngineConfig,
};
pub use engine_snapshot::{BarSnapshot, ConnectorSnapshot, TimelineSnapshot};
pub use gesture_controller::GestureOutcome;
pub use layout_pass::{BarVisual, LayoutPass, RoutedConnector, RowVisual};
pub use render_style::TimelineStyle;
pub use row_source::{RowSource, RowViewport};

pub use crate::extensions::{
    AxisMarker, AxisMarkerKind, ConnectorRequest, MarkerShape, MarkerTime, PlacedAxisMarker,
    PlacedRowMarker, PluginContext, RowMarker, TimelineEvent, TimelinePlugin,
};
