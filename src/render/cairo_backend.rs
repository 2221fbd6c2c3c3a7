use std::f64::consts::{FRAC_PI_2, PI};

use cairo::{Context, Format, ImageSurface};
use indexmap::IndexMap;
use pango::FontDescription;
use tracing::trace;

use crate::error::{TimelineError, TimelineResult};
use crate::render::{
    Color, LayerPrimitives, LineStrokeStyle, RectPrimitive, RenderFrame, Renderer, TextHAlign,
    TimelineLayerKind,
};

/// Dash used for edit previews: 4 px on, 3 px off.
const PREVIEW_DASH: [f64; 2] = [4.0, 3.0];
const DEFAULT_LABEL_FAMILY: &str = "Sans";

/// Primitive counts for the last frame, keyed by layer in draw order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CairoRenderStats {
    pub per_layer: IndexMap<TimelineLayerKind, usize>,
    pub skipped_layers: usize,
}

impl CairoRenderStats {
    #[must_use]
    pub fn total(&self) -> usize {
        self.per_layer.values().sum()
    }

    #[must_use]
    pub fn drawn(&self, kind: TimelineLayerKind) -> usize {
        self.per_layer.get(&kind).copied().unwrap_or(0)
    }
}

/// Renderers that can paint a timeline frame on a context owned by the host,
/// such as the one handed to a GTK `DrawingArea` draw function.
pub trait CairoContextRenderer {
    fn render_on_cairo_context(
        &mut self,
        context: &Context,
        frame: &RenderFrame,
    ) -> TimelineResult<()>;
}

/// Cairo/Pango renderer for timeline frames.
///
/// `Renderer::render` paints into an owned ARGB32 image surface; the
/// `CairoContextRenderer` path paints onto a caller-provided context. Both
/// clip to the frame viewport and skip empty layers.
#[derive(Debug)]
pub struct CairoTimelineRenderer {
    surface: ImageSurface,
    background: Color,
    label_family: String,
    last_stats: CairoRenderStats,
}

impl CairoTimelineRenderer {
    pub fn new(width: i32, height: i32) -> TimelineResult<Self> {
        if width <= 0 || height <= 0 {
            return Err(TimelineError::InvalidViewport {
                width: width.max(0).unsigned_abs(),
                height: height.max(0).unsigned_abs(),
            });
        }
        let surface = ImageSurface::create(Format::ARgb32, width, height)
            .map_err(|err| backend_error("create image surface", err))?;
        Ok(Self {
            surface,
            background: Color::rgb(1.0, 1.0, 1.0),
            label_family: DEFAULT_LABEL_FAMILY.to_owned(),
            last_stats: CairoRenderStats::default(),
        })
    }

    #[must_use]
    pub fn surface(&self) -> &ImageSurface {
        &self.surface
    }

    pub fn set_background(&mut self, color: Color) -> TimelineResult<()> {
        color.validate()?;
        self.background = color;
        Ok(())
    }

    /// Font family for bar labels. Sizes come from each text primitive.
    pub fn set_label_family(&mut self, family: impl Into<String>) -> TimelineResult<()> {
        let family = family.into();
        if family.trim().is_empty() {
            return Err(TimelineError::InvalidData(
                "label font family must not be empty".to_owned(),
            ));
        }
        self.label_family = family;
        Ok(())
    }

    #[must_use]
    pub fn last_stats(&self) -> &CairoRenderStats {
        &self.last_stats
    }

    fn paint_frame(&mut self, context: &Context, frame: &RenderFrame) -> TimelineResult<()> {
        frame.validate()?;

        context
            .save()
            .map_err(|err| backend_error("save context", err))?;
        context.rectangle(
            0.0,
            0.0,
            f64::from(frame.viewport.width),
            f64::from(frame.viewport.height),
        );
        context.clip();
        set_color(context, self.background);
        context
            .paint()
            .map_err(|err| backend_error("paint background", err))?;

        let mut stats = CairoRenderStats::default();
        for layer in &frame.layers {
            if layer.is_empty() {
                stats.skipped_layers += 1;
                continue;
            }
            let drawn = self.paint_layer(context, layer)?;
            stats.per_layer.insert(layer.kind, drawn);
        }

        context
            .restore()
            .map_err(|err| backend_error("restore context", err))?;
        trace!(
            primitives = stats.total(),
            skipped = stats.skipped_layers,
            "cairo frame painted"
        );
        self.last_stats = stats;
        Ok(())
    }

    fn paint_layer(&self, context: &Context, layer: &LayerPrimitives) -> TimelineResult<usize> {
        for rect in &layer.rects {
            trace_rect(context, *rect);
            fill_and_stroke(context, rect.fill_color, rect.border_width, rect.border_color)?;
        }

        for polygon in &layer.polygons {
            let mut points = polygon.points.iter();
            let Some(first) = points.next() else {
                continue;
            };
            context.move_to(first.x, first.y);
            for point in points {
                context.line_to(point.x, point.y);
            }
            context.close_path();
            fill_and_stroke(
                context,
                polygon.fill_color,
                polygon.border_width,
                polygon.border_color,
            )?;
        }

        let mut dashed = false;
        for line in &layer.lines {
            let wants_dash = line.stroke_style == LineStrokeStyle::Dashed;
            if wants_dash != dashed {
                let pattern: &[f64] = if wants_dash { &PREVIEW_DASH } else { &[] };
                context.set_dash(pattern, 0.0);
                dashed = wants_dash;
            }
            set_color(context, line.color);
            context.set_line_width(line.stroke_width);
            context.move_to(line.x1, line.y1);
            context.line_to(line.x2, line.y2);
            context
                .stroke()
                .map_err(|err| backend_error("stroke line", err))?;
        }
        if dashed {
            context.set_dash(&[], 0.0);
        }

        for text in &layer.texts {
            let layout = pangocairo::functions::create_layout(context);
            let font =
                FontDescription::from_string(&format!("{} {}px", self.label_family, text.font_size_px));
            layout.set_font_description(Some(&font));
            layout.set_text(&text.text);

            let (width, height) = layout.pixel_size();
            let width = f64::from(width);
            let left = match text.h_align {
                TextHAlign::Left => text.x,
                TextHAlign::Center => text.x - width / 2.0,
                TextHAlign::Right => text.x - width,
            };
            set_color(context, text.color);
            context.move_to(left, text.y - f64::from(height) / 2.0);
            pangocairo::functions::show_layout(context, &layout);
        }

        Ok(layer.rects.len() + layer.polygons.len() + layer.lines.len() + layer.texts.len())
    }
}

impl Renderer for CairoTimelineRenderer {
    fn render(&mut self, frame: &RenderFrame) -> TimelineResult<()> {
        let context =
            Context::new(&self.surface).map_err(|err| backend_error("create context", err))?;
        self.paint_frame(&context, frame)
    }
}

impl CairoContextRenderer for CairoTimelineRenderer {
    fn render_on_cairo_context(
        &mut self,
        context: &Context,
        frame: &RenderFrame,
    ) -> TimelineResult<()> {
        self.paint_frame(context, frame)
    }
}

fn set_color(context: &Context, color: Color) {
    context.set_source_rgba(color.red, color.green, color.blue, color.alpha);
}

/// Fills the current path and strokes its border when one is requested.
fn fill_and_stroke(
    context: &Context,
    fill: Color,
    border_width: f64,
    border: Color,
) -> TimelineResult<()> {
    set_color(context, fill);
    if border_width <= 0.0 {
        return context.fill().map_err(|err| backend_error("fill shape", err));
    }
    context
        .fill_preserve()
        .map_err(|err| backend_error("fill shape", err))?;
    set_color(context, border);
    context.set_line_width(border_width);
    context
        .stroke()
        .map_err(|err| backend_error("stroke shape border", err))
}

/// Bars with a corner radius get rounded corners; the radius never exceeds
/// half the bar height, so thin bars become pills.
fn trace_rect(context: &Context, rect: RectPrimitive) {
    let radius = rect.corner_radius.min(rect.width / 2.0).min(rect.height / 2.0);
    if radius <= 0.0 {
        context.rectangle(rect.x, rect.y, rect.width, rect.height);
        return;
    }

    let (left, top) = (rect.x, rect.y);
    let (right, bottom) = (rect.x + rect.width, rect.y + rect.height);
    context.new_sub_path();
    context.arc(left + radius, top + radius, radius, PI, PI + FRAC_PI_2);
    context.arc(right - radius, top + radius, radius, -FRAC_PI_2, 0.0);
    context.arc(right - radius, bottom - radius, radius, 0.0, FRAC_PI_2);
    context.arc(left + radius, bottom - radius, radius, FRAC_PI_2, PI);
    context.close_path();
}

fn backend_error(action: &str, err: cairo::Error) -> TimelineError {
    TimelineError::Backend(format!("cairo failed to {action}: {err}"))
}
