use crate::core::Viewport;
use crate::error::{TimelineError, TimelineResult};
use crate::render::{
    LinePrimitive, PolygonPrimitive, RectPrimitive, TextPrimitive, TimelineLayerKind,
};

#[derive(Debug, Clone, PartialEq)]
pub struct LayerPrimitives {
    pub kind: TimelineLayerKind,
    pub lines: Vec<LinePrimitive>,
    pub rects: Vec<RectPrimitive>,
    pub polygons: Vec<PolygonPrimitive>,
    pub texts: Vec<TextPrimitive>,
}

impl LayerPrimitives {
    #[must_use]
    pub fn new(kind: TimelineLayerKind) -> Self {
        Self {
            kind,
            lines: Vec::new(),
            rects: Vec::new(),
            polygons: Vec::new(),
            texts: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
            && self.rects.is_empty()
            && self.polygons.is_empty()
            && self.texts.is_empty()
    }
}

/// Backend-agnostic scene for one timeline draw pass.
///
/// Primitives live in layers that are always kept in canonical z-order, so
/// backends draw `layers` front to back without sorting.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub viewport: Viewport,
    pub layers: Vec<LayerPrimitives>,
}

impl RenderFrame {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            layers: TimelineLayerKind::ALL
                .iter()
                .map(|&kind| LayerPrimitives::new(kind))
                .collect(),
        }
    }

    pub fn layer_mut(&mut self, kind: TimelineLayerKind) -> &mut LayerPrimitives {
        let index = match self.layers.iter().position(|layer| layer.kind == kind) {
            Some(index) => index,
            None => {
                let at = self
                    .layers
                    .iter()
                    .position(|layer| layer.kind.z_index() > kind.z_index())
                    .unwrap_or(self.layers.len());
                self.layers.insert(at, LayerPrimitives::new(kind));
                at
            }
        };
        &mut self.layers[index]
    }

    #[must_use]
    pub fn layer(&self, kind: TimelineLayerKind) -> Option<&LayerPrimitives> {
        self.layers.iter().find(|layer| layer.kind == kind)
    }

    #[must_use]
    pub fn with_line(mut self, kind: TimelineLayerKind, line: LinePrimitive) -> Self {
        self.layer_mut(kind).lines.push(line);
        self
    }

    #[must_use]
    pub fn with_rect(mut self, kind: TimelineLayerKind, rect: RectPrimitive) -> Self {
        self.layer_mut(kind).rects.push(rect);
        self
    }

    #[must_use]
    pub fn with_polygon(mut self, kind: TimelineLayerKind, polygon: PolygonPrimitive) -> Self {
        self.layer_mut(kind).polygons.push(polygon);
        self
    }

    #[must_use]
    pub fn with_text(mut self, kind: TimelineLayerKind, text: TextPrimitive) -> Self {
        self.layer_mut(kind).texts.push(text);
        self
    }

    pub fn validate(&self) -> TimelineResult<()> {
        if !self.viewport.is_valid() {
            return Err(TimelineError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }

        for layer in &self.layers {
            for line in &layer.lines {
                line.validate()?;
            }
            for rect in &layer.rects {
                rect.validate()?;
            }
            for polygon in &layer.polygons {
                polygon.validate()?;
            }
            for text in &layer.texts {
                text.validate()?;
            }
        }

        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(LayerPrimitives::is_empty)
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.layers.iter().map(|layer| layer.lines.len()).sum()
    }

    #[must_use]
    pub fn rect_count(&self) -> usize {
        self.layers.iter().map(|layer| layer.rects.len()).sum()
    }

    #[must_use]
    pub fn polygon_count(&self) -> usize {
        self.layers.iter().map(|layer| layer.polygons.len()).sum()
    }

    #[must_use]
    pub fn text_count(&self) -> usize {
        self.layers.iter().map(|layer| layer.texts.len()).sum()
    }
}
