use serde::{Deserialize, Serialize};

use crate::core::{ElementConfig, LabelOrder, Rect, RowKind, Viewport};
use crate::error::{TimelineError, TimelineResult};
use crate::interaction::SCROLL_STEP;

/// Element geometry for every row kind plus the progress sub-bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineElementsConfig {
    #[serde(default = "default_task_config")]
    pub task: ElementConfig,
    #[serde(default = "default_milestone_config")]
    pub milestone: ElementConfig,
    #[serde(default = "default_summary_config")]
    pub summary: ElementConfig,
    #[serde(default = "default_baseline_config")]
    pub baseline: ElementConfig,
    #[serde(default = "default_period_config")]
    pub period: ElementConfig,
    #[serde(default = "ElementConfig::progress")]
    pub progress: ElementConfig,
}

impl Default for TimelineElementsConfig {
    fn default() -> Self {
        Self {
            task: default_task_config(),
            milestone: default_milestone_config(),
            summary: default_summary_config(),
            baseline: default_baseline_config(),
            period: default_period_config(),
            progress: ElementConfig::progress(),
        }
    }
}

impl TimelineElementsConfig {
    #[must_use]
    pub fn for_kind(&self, kind: RowKind) -> &ElementConfig {
        match kind {
            RowKind::Task => &self.task,
            RowKind::Milestone => &self.milestone,
            RowKind::Summary => &self.summary,
            RowKind::Baseline => &self.baseline,
            RowKind::ResourcePeriod => &self.period,
        }
    }

    pub fn validate(self) -> TimelineResult<Self> {
        for config in [
            self.task,
            self.milestone,
            self.summary,
            self.baseline,
            self.period,
            self.progress,
        ] {
            config.validate()?;
        }
        Ok(self)
    }
}

/// Stroke used for connector polylines and arrowheads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConnectorStyle {
    pub thickness: f64,
    /// Pointer distance in pixels within which a click selects a connector.
    #[serde(default = "default_connector_hit_tolerance")]
    pub hit_tolerance: f64,
}

impl Default for ConnectorStyle {
    fn default() -> Self {
        Self {
            thickness: 1.0,
            hit_tolerance: default_connector_hit_tolerance(),
        }
    }
}

/// Handle sizes and scrolling behavior of drag edits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EditConfig {
    /// Width of the resize thumbs at both ends of a bar.
    pub resize_thumb_width: f64,
    /// Side of the square connector markers just outside a bar's ends.
    pub connector_marker_size: f64,
    /// Side of the square progress handle on the bar's bottom edge.
    pub progress_handle_size: f64,
    /// Pixels scrolled per edge-scroll tick.
    #[serde(default = "default_edge_scroll_step")]
    pub edge_scroll_step: f64,
}

impl Default for EditConfig {
    fn default() -> Self {
        Self {
            resize_thumb_width: 6.0,
            connector_marker_size: 8.0,
            progress_handle_size: 8.0,
            edge_scroll_step: default_edge_scroll_step(),
        }
    }
}

impl EditConfig {
    pub fn validate(self) -> TimelineResult<Self> {
        for (name, value) in [
            ("resize_thumb_width", self.resize_thumb_width),
            ("connector_marker_size", self.connector_marker_size),
            ("progress_handle_size", self.progress_handle_size),
            ("edge_scroll_step", self.edge_scroll_step),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(TimelineError::InvalidData(format!(
                    "edit config `{name}` must be finite and > 0"
                )));
            }
        }
        Ok(self)
    }
}

/// Bar labels drawn next to each task and milestone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelLayoutConfig {
    /// When `false`, only the hovered row shows its label.
    pub enabled: bool,
    pub font_size_px: f64,
    /// Vertical room reserved per label when resolving overlaps.
    pub line_height: f64,
    /// Horizontal gap between a bar's right edge and its label.
    pub gap: f64,
    #[serde(default)]
    pub order: LabelOrder,
}

impl Default for LabelLayoutConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            font_size_px: 12.0,
            line_height: 16.0,
            gap: 6.0,
            order: LabelOrder::TopToBottom,
        }
    }
}

impl LabelLayoutConfig {
    pub fn validate(self) -> TimelineResult<Self> {
        if !self.font_size_px.is_finite() || self.font_size_px <= 0.0 {
            return Err(TimelineError::InvalidData(
                "label font size must be finite and > 0".to_owned(),
            ));
        }
        if !self.line_height.is_finite() || self.line_height <= 0.0 {
            return Err(TimelineError::InvalidData(
                "label line height must be finite and > 0".to_owned(),
            ));
        }
        if !self.gap.is_finite() {
            return Err(TimelineError::InvalidData(
                "label gap must be finite".to_owned(),
            ));
        }
        Ok(self)
    }
}

/// Public engine bootstrap configuration.
///
/// Serializable so hosts can persist timeline setup next to their project
/// files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineEngineConfig {
    pub viewport: Viewport,
    /// Space above the rows reserved for the host's time header.
    #[serde(default)]
    pub header_height: f64,
    #[serde(default = "default_row_height")]
    pub default_row_height: f64,
    #[serde(default)]
    pub baseline_above: bool,
    #[serde(default)]
    pub elements: TimelineElementsConfig,
    #[serde(default)]
    pub connectors: ConnectorStyle,
    #[serde(default)]
    pub edit: EditConfig,
    #[serde(default)]
    pub labels: LabelLayoutConfig,
}

impl TimelineEngineConfig {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            header_height: 0.0,
            default_row_height: default_row_height(),
            baseline_above: false,
            elements: TimelineElementsConfig::default(),
            connectors: ConnectorStyle::default(),
            edit: EditConfig::default(),
            labels: LabelLayoutConfig::default(),
        }
    }

    #[must_use]
    pub fn with_header_height(mut self, header_height: f64) -> Self {
        self.header_height = header_height;
        self
    }

    #[must_use]
    pub fn with_default_row_height(mut self, row_height: f64) -> Self {
        self.default_row_height = row_height;
        self
    }

    /// Draws baselines above the actual bars instead of below.
    #[must_use]
    pub fn with_baseline_above(mut self, baseline_above: bool) -> Self {
        self.baseline_above = baseline_above;
        self
    }

    #[must_use]
    pub fn with_elements(mut self, elements: TimelineElementsConfig) -> Self {
        self.elements = elements;
        self
    }

    #[must_use]
    pub fn with_connector_style(mut self, connectors: ConnectorStyle) -> Self {
        self.connectors = connectors;
        self
    }

    #[must_use]
    pub fn with_edit_config(mut self, edit: EditConfig) -> Self {
        self.edit = edit;
        self
    }

    #[must_use]
    pub fn with_labels(mut self, labels: LabelLayoutConfig) -> Self {
        self.labels = labels;
        self
    }

    /// Pixel area the rows are drawn in: the viewport below the header.
    #[must_use]
    pub fn timeline_bounds(&self) -> Rect {
        let bounds = self.viewport.bounds();
        let header = self.header_height.clamp(0.0, bounds.height);
        Rect::new(bounds.left, bounds.top + header, bounds.width, bounds.height - header)
    }

    pub fn validate(self) -> TimelineResult<Self> {
        if !self.viewport.is_valid() {
            return Err(TimelineError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }
        if !self.header_height.is_finite()
            || self.header_height < 0.0
            || self.header_height >= f64::from(self.viewport.height)
        {
            return Err(TimelineError::InvalidData(
                "header height must be finite, >= 0 and smaller than the viewport".to_owned(),
            ));
        }
        if !self.default_row_height.is_finite() || self.default_row_height <= 0.0 {
            return Err(TimelineError::InvalidData(
                "default row height must be finite and > 0".to_owned(),
            ));
        }
        if !self.connectors.thickness.is_finite() || self.connectors.thickness <= 0.0 {
            return Err(TimelineError::InvalidData(
                "connector thickness must be finite and > 0".to_owned(),
            ));
        }
        if !self.connectors.hit_tolerance.is_finite() || self.connectors.hit_tolerance < 0.0 {
            return Err(TimelineError::InvalidData(
                "connector hit tolerance must be finite and >= 0".to_owned(),
            ));
        }
        self.elements.validate()?;
        self.edit.validate()?;
        self.labels.validate()?;
        Ok(self)
    }

    /// Serializes config to pretty JSON.
    pub fn to_json_pretty(self) -> TimelineResult<String> {
        serde_json::to_string_pretty(&self)
            .map_err(|e| TimelineError::InvalidData(format!("failed to serialize config: {e}")))
    }

    /// Deserializes config from JSON.
    pub fn from_json_str(input: &str) -> TimelineResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| TimelineError::InvalidData(format!("failed to parse config: {e}")))
    }
}

fn default_task_config() -> ElementConfig {
    ElementConfig::for_kind(RowKind::Task)
}

fn default_milestone_config() -> ElementConfig {
    ElementConfig::for_kind(RowKind::Milestone)
}

fn default_summary_config() -> ElementConfig {
    ElementConfig::for_kind(RowKind::Summary)
}

fn default_baseline_config() -> ElementConfig {
    ElementConfig::for_kind(RowKind::Baseline)
}

fn default_period_config() -> ElementConfig {
    ElementConfig::for_kind(RowKind::ResourcePeriod)
}

fn default_row_height() -> f64 {
    32.0
}

fn default_connector_hit_tolerance() -> f64 {
    4.0
}

fn default_edge_scroll_step() -> f64 {
    SCROLL_STEP
}

#[cfg(test)]
mod tests {
    use super::TimelineEngineConfig;
    use crate::core::Viewport;

    #[test]
    fn config_json_roundtrip_keeps_defaults() {
        let config = TimelineEngineConfig::new(Viewport::new(800, 400))
            .with_header_height(24.0)
            .with_baseline_above(true);
        let json = config.to_json_pretty().expect("serialize");
        let parsed = TimelineEngineConfig::from_json_str(&json).expect("parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn minimal_json_fills_in_defaults() {
        let parsed = TimelineEngineConfig::from_json_str(
            r#"{ "viewport": { "width": 640, "height": 320 } }"#,
        )
        .expect("parse");
        assert_eq!(parsed, TimelineEngineConfig::new(Viewport::new(640, 320)));
    }

    #[test]
    fn header_taller_than_viewport_is_rejected() {
        let config = TimelineEngineConfig::new(Viewport::new(100, 50)).with_header_height(60.0);
        assert!(config.validate().is_err());
    }
}
