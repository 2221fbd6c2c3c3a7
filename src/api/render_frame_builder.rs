use crate::core::{LabelDomainResolver, LabelInput, Point, RowKind};
use crate::extensions::PlacedAxisMarker;
use crate::interaction::{ConnectorSelection, ElementRef, GesturePreview};
use crate::render::{
    LinePrimitive, LineStrokeStyle, PolygonPrimitive, RectPrimitive, RenderFrame, Renderer,
    TextHAlign, TextPrimitive, TimelineLayerKind,
};

use super::TimelineEngine;
use super::layout_pass::{BarVisual, RoutedConnector};

impl<R: Renderer> TimelineEngine<R> {
    /// Materializes the latest layout pass into a backend-agnostic frame.
    #[must_use]
    pub fn build_render_frame(&self) -> RenderFrame {
        let viewport = self.config.viewport.bounds();
        let mut frame = RenderFrame::new(self.config.viewport);
        frame
            .layer_mut(TimelineLayerKind::Background)
            .rects
            .push(RectPrimitive::new(
                viewport.left,
                viewport.top,
                viewport.width,
                viewport.height,
                self.style.background_color,
            ));

        self.push_rows(&mut frame);
        self.push_axis_markers(&mut frame);
        for bar in self.pass.visible_bars() {
            self.push_bar(&mut frame, bar);
        }
        self.push_row_markers(&mut frame);
        let selected = self.interaction.selected_connector();
        for connector in &self.pass.connectors {
            self.push_connector(&mut frame, connector, selected);
        }
        self.push_preview(&mut frame);
        self.push_labels(&mut frame);
        frame
    }

    fn push_rows(&self, frame: &mut RenderFrame) {
        let bounds = self.pass.timeline_bounds;
        let selected_row = self.interaction.selected_row();
        let grid = frame.layer_mut(TimelineLayerKind::Grid);
        for row in &self.pass.rows {
            if selected_row == Some(row.row_id.as_str()) {
                grid.rects.push(RectPrimitive::new(
                    bounds.left,
                    row.band.top,
                    bounds.width,
                    row.band.height,
                    self.style.selected_row_color,
                ));
            }
            let y = (row.band.top + row.band.height).round() - 0.5;
            if y > bounds.top && y < bounds.bottom() {
                grid.lines.push(LinePrimitive::new(
                    bounds.left,
                    y,
                    bounds.right(),
                    y,
                    1.0,
                    self.style.row_separator_color,
                ));
            }
        }
    }

    fn push_axis_markers(&self, frame: &mut RenderFrame) {
        let style = &self.style;
        let layer = frame.layer_mut(TimelineLayerKind::AxisMarkers);
        for marker in &self.pass.axis_markers {
            match marker {
                PlacedAxisMarker::Range {
                    left,
                    right,
                    top,
                    bottom,
                    ..
                } => layer.rects.push(RectPrimitive::new(
                    *left,
                    *top,
                    right - left,
                    bottom - top,
                    style.axis_range_marker_color,
                )),
                PlacedAxisMarker::Line { x, top, bottom, .. } => layer.lines.push(LinePrimitive::new(
                    *x,
                    *top,
                    *x,
                    *bottom,
                    1.0,
                    style.axis_line_marker_color,
                )),
                PlacedAxisMarker::Text { x, top, text, .. } => layer.texts.push(TextPrimitive::new(
                    text.as_str(),
                    *x,
                    top + style.axis_text_marker_font_size_px / 2.0,
                    style.axis_text_marker_font_size_px,
                    style.axis_text_marker_color,
                    TextHAlign::Left,
                )),
            }
        }
    }

    fn push_row_markers(&self, frame: &mut RenderFrame) {
        let polygons = &mut frame.layer_mut(TimelineLayerKind::RowMarkers).polygons;
        for marker in &self.pass.row_markers {
            polygons.push(PolygonPrimitive::new(
                marker.shape.outline(marker.center(), marker.size),
                self.style.row_marker_color,
            ));
        }
    }

    fn is_selected(&self, element: &ElementRef) -> bool {
        self.interaction.selected_row() == Some(element.row_id.as_str())
            && (element.period_index.is_none()
                || element.period_index == self.interaction.selected_period())
    }

    fn push_bar(&self, frame: &mut RenderFrame, bar: &BarVisual) {
        let style = &self.style;
        let bounds = bar.bounds;
        let border_color = if self.is_selected(&bar.element) {
            style.selection_border_color
        } else {
            style.task_border_color
        };

        let (layer, fill) = match bar.kind {
            RowKind::Baseline => (TimelineLayerKind::Baselines, style.baseline_fill_color),
            RowKind::Task => (TimelineLayerKind::Bars, style.task_fill_color),
            RowKind::Summary => (TimelineLayerKind::Bars, style.summary_fill_color),
            RowKind::ResourcePeriod => (TimelineLayerKind::Bars, style.period_fill_color),
            RowKind::Milestone => {
                let diamond = [
                    Point::new(bounds.center_x(), bounds.top),
                    Point::new(bounds.right(), bounds.center_y()),
                    Point::new(bounds.center_x(), bounds.bottom()),
                    Point::new(bounds.left, bounds.center_y()),
                ];
                frame.layer_mut(TimelineLayerKind::Milestones).polygons.push(
                    PolygonPrimitive::new(diamond, style.milestone_fill_color)
                        .with_border(style.bar_border_width, border_color),
                );
                return;
            }
        };

        let mut rect = RectPrimitive::new(bounds.left, bounds.top, bounds.width, bounds.height, fill)
            .with_corner_radius(style.bar_corner_radius);
        if bar.kind != RowKind::Baseline {
            rect = rect.with_border(style.bar_border_width, border_color);
        }
        frame.layer_mut(layer).rects.push(rect);

        if let Some(progress) = bar.progress_bounds {
            frame
                .layer_mut(TimelineLayerKind::Progress)
                .rects
                .push(RectPrimitive::new(
                    progress.left,
                    progress.top,
                    progress.width,
                    progress.height,
                    style.progress_fill_color,
                ));
        }
    }

    fn push_connector(
        &self,
        frame: &mut RenderFrame,
        connector: &RoutedConnector,
        selected: Option<&ConnectorSelection>,
    ) {
        let is_selected = selected.is_some_and(|selection| {
            selection.from == connector.from
                && selection.to == connector.to
                && selection.kind == connector.relation.kind
        });
        let color = if is_selected {
            self.style.selected_connector_color
        } else {
            self.style.connector_color
        };
        let thickness = self.config.connectors.thickness;

        let lines = &mut frame.layer_mut(TimelineLayerKind::Connectors).lines;
        for segment in &connector.path.segments {
            lines.push(LinePrimitive::new(
                segment.from.x,
                segment.from.y,
                segment.to.x,
                segment.to.y,
                thickness,
                color,
            ));
        }
        if let Some(arrow) = connector.path.arrow {
            frame
                .layer_mut(TimelineLayerKind::Arrows)
                .polygons
                .push(PolygonPrimitive::new(arrow.points, color));
        }
    }

    fn push_preview(&self, frame: &mut RenderFrame) {
        let Some(session) = self.interaction.session() else {
            return;
        };
        let color = self.style.preview_color;
        let layer = frame.layer_mut(TimelineLayerKind::EditPreview);
        match session.preview() {
            GesturePreview::Outline(rect) => {
                let corners = [
                    (rect.left, rect.top, rect.right(), rect.top),
                    (rect.right(), rect.top, rect.right(), rect.bottom()),
                    (rect.right(), rect.bottom(), rect.left, rect.bottom()),
                    (rect.left, rect.bottom(), rect.left, rect.top),
                ];
                for (x1, y1, x2, y2) in corners {
                    layer.lines.push(
                        LinePrimitive::new(x1, y1, x2, y2, 1.0, color)
                            .with_stroke_style(LineStrokeStyle::Dashed),
                    );
                }
            }
            GesturePreview::Progress { fill, .. } => {
                layer.rects.push(RectPrimitive::new(
                    fill.left,
                    fill.top,
                    fill.width,
                    fill.height,
                    color,
                ));
            }
            GesturePreview::Connector(segment) => {
                layer.lines.push(
                    LinePrimitive::new(
                        segment.from.x,
                        segment.from.y,
                        segment.to.x,
                        segment.to.y,
                        self.config.connectors.thickness,
                        color,
                    )
                    .with_stroke_style(LineStrokeStyle::Dashed),
                );
            }
        }
    }

    /// Bar labels, de-overlapped vertically. A hovered row shows its label
    /// even when labels are switched off.
    fn push_labels(&self, frame: &mut RenderFrame) {
        let labels = &self.config.labels;
        let hovered_row = self
            .interaction
            .hovered()
            .map(|element| element.row_id.as_str());

        let labelled: Vec<(&BarVisual, &str)> = self
            .pass
            .visible_bars()
            .filter(|bar| bar.is_labelled())
            .filter_map(|bar| {
                let name = self.store.row(bar.row_index)?.name.as_str();
                (!name.is_empty()).then_some((bar, name))
            })
            .collect();
        if labelled.is_empty() {
            return;
        }

        let inputs: Vec<LabelInput> = labelled
            .iter()
            .map(|(bar, _)| LabelInput {
                enabled: labels.enabled,
                hovered: hovered_row == Some(bar.element.row_id.as_str()),
                ..LabelInput::new(bar.bounds.center_y(), labels.line_height)
            })
            .collect();
        let placements =
            LabelDomainResolver::new(labels.order).resolve(&inputs, self.pass.timeline_bounds);

        let texts = &mut frame.layer_mut(TimelineLayerKind::Labels).texts;
        for placement in placements.iter().filter(|placement| placement.visible) {
            let (bar, name) = labelled[placement.index];
            let input = &inputs[placement.index];
            texts.push(TextPrimitive::new(
                name,
                bar.bounds.right() + labels.gap,
                placement.center_y + input.offset_y,
                labels.font_size_px,
                self.style.label_color,
                TextHAlign::Left,
            ));
        }
    }
}
