use serde::{Deserialize, Serialize};

use crate::core::{Point, Rect, RelationKind, RowKind, Segment, Viewport};
use crate::error::{TimelineError, TimelineResult};
use crate::interaction::{ConnectorSelection, ElementRef, InteractionMode};
use crate::render::Renderer;

use super::{RowSource, TimelineEngine};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSnapshot {
    pub element: ElementRef,
    pub kind: RowKind,
    pub bounds: Rect,
    #[serde(default)]
    pub progress_bounds: Option<Rect>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorSnapshot {
    pub from: ElementRef,
    pub to: ElementRef,
    pub kind: RelationKind,
    pub segments: Vec<Segment>,
    #[serde(default)]
    pub arrow_tip: Option<Point>,
}

/// Serializable deterministic layout snapshot used by regression tests and
/// debugging tooling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineSnapshot {
    pub viewport: Viewport,
    pub total_range: (f64, f64),
    pub visible_range: (f64, f64),
    pub vertical_offset: f64,
    pub visible_rows: (usize, usize),
    pub data_revision: u64,
    pub interaction_mode: InteractionMode,
    #[serde(default)]
    pub selected_row: Option<String>,
    #[serde(default)]
    pub selected_connector: Option<ConnectorSelection>,
    pub bars: Vec<BarSnapshot>,
    pub connectors: Vec<ConnectorSnapshot>,
}

impl<R: Renderer> TimelineEngine<R> {
    #[must_use]
    pub fn snapshot(&self) -> TimelineSnapshot {
        let visible = self.rows.visible_items();
        TimelineSnapshot {
            viewport: self.config.viewport,
            total_range: self.scale.total_range(),
            visible_range: self.scale.visible_range(),
            vertical_offset: self.rows.vertical_offset(),
            visible_rows: (visible.start, visible.end),
            data_revision: self.store.revision(),
            interaction_mode: self.interaction.mode(),
            selected_row: self.interaction.selected_row().map(str::to_owned),
            selected_connector: self.interaction.selected_connector().cloned(),
            bars: self
                .pass
                .visible_bars()
                .map(|bar| BarSnapshot {
                    element: bar.element.clone(),
                    kind: bar.kind,
                    bounds: bar.bounds,
                    progress_bounds: bar.progress_bounds,
                })
                .collect(),
            connectors: self
                .pass
                .connectors
                .iter()
                .map(|connector| ConnectorSnapshot {
                    from: connector.from.clone(),
                    to: connector.to.clone(),
                    kind: connector.relation.kind,
                    segments: connector.path.segments.to_vec(),
                    arrow_tip: connector.path.arrow.map(|arrow| arrow.tip),
                })
                .collect(),
        }
    }

    pub fn snapshot_json_pretty(&self) -> TimelineResult<String> {
        serde_json::to_string_pretty(&self.snapshot())
            .map_err(|e| TimelineError::InvalidData(format!("failed to serialize snapshot: {e}")))
    }
}
