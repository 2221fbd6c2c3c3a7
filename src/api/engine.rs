use std::mem;

use chrono::Utc;
use tracing::{trace, warn};

use crate::core::{BarLayoutResolver, Rect, TimeScale};
use crate::error::{TimelineError, TimelineResult};
use crate::core::primitives::datetime_to_millis;
use crate::extensions::{
    AxisMarker, TimelineEvent, TimelinePlugin, place_axis_markers, place_row_markers,
};
use crate::interaction::{EdgeScroll, ElementRef, InteractionState};
use crate::render::Renderer;

use super::connector_coordinator::{
    ConnectorCoordinator, PrunedRelation, Relation, RelationSet, row_band,
};
use super::layout_pass::{LayoutPass, RowLayoutInputs, RowVisual};
use super::validation::validate_timeline_style;
use super::{RowSource, RowViewport, TimelineDataStore, TimelineEngineConfig, TimelineStyle};

#[cfg(feature = "cairo-backend")]
use crate::render::CairoContextRenderer;

/// Main orchestration facade consumed by host applications.
///
/// `TimelineEngine` owns the data store, the time scale, row virtualization,
/// interaction state and the renderer. Every state change ends with a new
/// [`LayoutPass`], which is what hit-testing and frame building read.
pub struct TimelineEngine<R: Renderer> {
    pub(super) renderer: R,
    pub(super) store: Box<dyn TimelineDataStore>,
    pub(super) config: TimelineEngineConfig,
    pub(super) style: TimelineStyle,
    pub(super) rows: RowViewport,
    pub(super) scale: TimeScale,
    pub(super) resolver: BarLayoutResolver,
    pub(super) interaction: InteractionState,
    pub(super) edge_scroll: Option<EdgeScroll>,
    pub(super) plugins: Vec<Box<dyn TimelinePlugin>>,
    pub(super) events: Vec<TimelineEvent>,
    pub(super) pass: LayoutPass,
    pub(super) synced_revision: Option<u64>,
    pub(super) relations: RelationSet,
    pub(super) axis_markers: Vec<AxisMarker>,
}

impl<R: Renderer> TimelineEngine<R> {
    /// Creates an engine over `store` and runs the first layout pass.
    pub fn new(
        renderer: R,
        config: TimelineEngineConfig,
        store: impl TimelineDataStore + 'static,
    ) -> TimelineResult<Self> {
        let config = config.validate()?;
        let rows = RowViewport::new(config.timeline_bounds().height)?;
        let mut engine = Self {
            renderer,
            store: Box::new(store),
            config,
            style: TimelineStyle::default(),
            rows,
            scale: TimeScale::new(),
            resolver: BarLayoutResolver::new(config.baseline_above),
            interaction: InteractionState::default(),
            edge_scroll: None,
            plugins: Vec::new(),
            events: Vec::new(),
            pass: LayoutPass::default(),
            synced_revision: None,
            relations: RelationSet::default(),
            axis_markers: Vec::new(),
        };
        engine.relayout();
        Ok(engine)
    }

    #[must_use]
    pub fn config(&self) -> &TimelineEngineConfig {
        &self.config
    }

    #[must_use]
    pub fn style(&self) -> TimelineStyle {
        self.style
    }

    pub fn set_style(&mut self, style: TimelineStyle) -> TimelineResult<()> {
        self.style = validate_timeline_style(style)?;
        Ok(())
    }

    #[must_use]
    pub fn store(&self) -> &dyn TimelineDataStore {
        self.store.as_ref()
    }

    /// Direct access for host-side edits. Call [`Self::relayout`] afterwards
    /// to pick the changes up.
    pub fn store_mut(&mut self) -> &mut dyn TimelineDataStore {
        self.store.as_mut()
    }

    #[must_use]
    pub fn time_scale(&self) -> TimeScale {
        self.scale
    }

    #[must_use]
    pub fn rows(&self) -> &RowViewport {
        &self.rows
    }

    #[must_use]
    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    #[must_use]
    pub fn layout(&self) -> &LayoutPass {
        &self.pass
    }

    /// Relations drawn by the current layout, in store order.
    pub fn relations(&self) -> impl Iterator<Item = &Relation> {
        self.relations
            .resolved
            .iter()
            .map(|resolved| &resolved.relation)
    }

    /// Stored connectors left out of the current relation set.
    #[must_use]
    pub fn pruned_relations(&self) -> &[PrunedRelation] {
        &self.relations.pruned
    }

    #[must_use]
    pub fn timeline_bounds(&self) -> Rect {
        self.config.timeline_bounds()
    }

    /// Drains events emitted since the last call.
    pub fn take_events(&mut self) -> Vec<TimelineEvent> {
        mem::take(&mut self.events)
    }

    pub fn render(&mut self) -> TimelineResult<()> {
        let frame = self.build_render_frame();
        self.renderer.render(&frame)?;
        self.emit_plugin_event(&TimelineEvent::Rendered);
        Ok(())
    }

    /// Renders the frame into an external cairo context.
    ///
    /// This path is used by GTK draw callbacks while keeping the renderer
    /// implementation decoupled from GTK-specific APIs.
    #[cfg(feature = "cairo-backend")]
    pub fn render_on_cairo_context(&mut self, context: &cairo::Context) -> TimelineResult<()>
    where
        R: CairoContextRenderer,
    {
        let frame = self.build_render_frame();
        self.renderer.render_on_cairo_context(context, &frame)?;
        self.emit_plugin_event(&TimelineEvent::Rendered);
        Ok(())
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    #[must_use]
    pub fn into_renderer(self) -> R {
        self.renderer
    }

    /// Re-reads the store when it changed and rebuilds the layout pass.
    pub fn relayout(&mut self) {
        if self.synced_revision != Some(self.store.revision()) {
            self.sync_data();
        }
        if self.relations.sync(self.store.as_ref()) {
            trace!(
                relations = self.relations.resolved.len(),
                pruned = self.relations.pruned.len(),
                "relation set rebuilt"
            );
        }
        let previous = mem::take(&mut self.pass);
        self.pass = self.build_layout_pass(&previous);
    }

    fn sync_data(&mut self) {
        self.rows
            .sync(self.store.as_ref(), self.config.default_row_height);
        if self.scale.is_force_scrolled() {
            // Picked up once the gesture settles the scale.
            return;
        }
        if let Some(extent) = self.store.data_extent()
            && let Err(err) = self.scale.set_data_range(extent.start, extent.end)
        {
            warn!(error = %err, "keeping previous time range after invalid data extent");
        }
        self.synced_revision = Some(self.store.revision());
    }

    fn layout_inputs(&self) -> RowLayoutInputs<'_> {
        RowLayoutInputs {
            scale: self.scale,
            timeline_bounds: self.timeline_bounds(),
            elements: &self.config.elements,
            resolver: self.resolver,
        }
    }

    /// Current screen bounds of `element`, laid out on demand when its row
    /// is outside the last pass.
    pub(super) fn element_bounds(&self, element: &ElementRef) -> Option<Rect> {
        if let Some(bar) = self.pass.find_bar(element) {
            return Some(bar.bounds);
        }
        let row_index = self.store.find_row(&element.row_id)?;
        let row = self.store.row(row_index)?;
        let band = row_band(&self.rows, self.timeline_bounds(), row_index);
        self.layout_inputs()
            .layout_row(row_index, row, band)
            .into_iter()
            .find(|visual| &visual.element == element)
            .map(|visual| visual.bounds)
    }

    fn build_layout_pass(&self, previous: &LayoutPass) -> LayoutPass {
        let timeline_bounds = self.timeline_bounds();
        let inputs = self.layout_inputs();
        let mut pass = LayoutPass {
            timeline_bounds,
            vertical_offset: self.rows.vertical_offset(),
            ..LayoutPass::default()
        };

        for row_index in self.rows.visible_items() {
            let Some(row) = self.store.row(row_index) else {
                continue;
            };
            let band = row_band(&self.rows, timeline_bounds, row_index);
            pass.rows.push(RowVisual {
                row_index,
                row_id: row.id.clone(),
                band,
            });
            pass.bars.extend(inputs.layout_row(row_index, row, band));
            pass.row_markers.extend(place_row_markers(
                row_index,
                &row.markers,
                band,
                self.scale,
                timeline_bounds,
            ));
        }
        if !self.axis_markers.is_empty() {
            let now = datetime_to_millis(Utc::now());
            pass.axis_markers =
                place_axis_markers(&self.axis_markers, self.scale, timeline_bounds, now);
        }

        let coordinator = ConnectorCoordinator {
            store: self.store.as_ref(),
            rows: &self.rows,
            inputs,
            stroke_thickness: self.config.connectors.thickness,
        };
        pass.connectors = coordinator.route_all(
            &self.relations.resolved,
            &pass,
            previous,
            pass.vertical_offset,
        );

        trace!(
            rows = pass.rows.len(),
            bars = pass.bars.len(),
            connectors = pass.connectors.len(),
            markers = pass.row_markers.len() + pass.axis_markers.len(),
            "layout pass"
        );
        pass
    }

    /// Resolves a row id to its index, reporting unknown ids.
    pub(super) fn row_index(&self, row_id: &str) -> TimelineResult<usize> {
        self.store
            .find_row(row_id)
            .ok_or_else(|| TimelineError::UnknownRow(row_id.to_owned()))
    }
}
