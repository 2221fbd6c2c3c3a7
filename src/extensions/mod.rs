//! Plugin hooks for hosts that need to observe or veto timeline edits, and
//! the marker overlays drawn on top of rows and across the time axis.
//!
//! Keep extensions decoupled from core paths: plugins see events and a
//! read-only context, never the engine itself.

mod markers;
mod plugins;

pub use markers::{
    AxisMarker, AxisMarkerKind, MarkerShape, MarkerTime, PlacedAxisMarker, PlacedRowMarker,
    ROW_MARKER_HEIGHT_SHARE, RowMarker, TEXT_MARKER_INSET_PX, place_axis_markers,
    place_row_markers,
};
pub use plugins::{ConnectorRequest, PluginContext, TimelineEvent, TimelinePlugin};
