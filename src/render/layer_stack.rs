use serde::{Deserialize, Serialize};

use crate::core::{ARROW_Z_INDEX, CONNECTOR_Z_INDEX};

/// Drawing layers of a timeline, from back to front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimelineLayerKind {
    Background,
    Grid,
    AxisMarkers,
    Baselines,
    Bars,
    Progress,
    Milestones,
    RowMarkers,
    Connectors,
    Arrows,
    EditPreview,
    Labels,
}

impl TimelineLayerKind {
    /// Canonical back-to-front order.
    pub const ALL: [Self; 12] = [
        Self::Background,
        Self::Grid,
        Self::AxisMarkers,
        Self::Baselines,
        Self::Bars,
        Self::Progress,
        Self::Milestones,
        Self::RowMarkers,
        Self::Connectors,
        Self::Arrows,
        Self::EditPreview,
        Self::Labels,
    ];

    #[must_use]
    pub const fn z_index(self) -> i32 {
        match self {
            Self::Background => 0,
            Self::Grid => 10,
            Self::AxisMarkers => 15,
            Self::Baselines => 20,
            Self::Bars => 30,
            Self::Progress => 40,
            Self::Milestones => 50,
            Self::RowMarkers => 55,
            Self::Connectors => CONNECTOR_Z_INDEX,
            Self::Arrows => ARROW_Z_INDEX,
            Self::EditPreview => 80,
            Self::Labels => 90,
        }
    }
}
