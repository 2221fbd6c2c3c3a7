use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{
    BarLayoutResolver, ConnectorPath, Point, Rect, RowBand, RowKind, TimeRange, TimeScale,
};
use crate::extensions::{PlacedAxisMarker, PlacedRowMarker};
use crate::interaction::ElementRef;

use super::{Relation, RowItem, TimelineElementsConfig};

/// Geometry of one drawable element in screen pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarVisual {
    pub row_index: usize,
    pub element: ElementRef,
    pub kind: RowKind,
    pub range: TimeRange,
    pub band: RowBand,
    pub bounds: Rect,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub progress_bounds: Option<Rect>,
    /// `false` when the element's time interval lies outside the window.
    pub visible: bool,
}

impl BarVisual {
    /// Elements that carry a text label next to them.
    #[must_use]
    pub fn is_labelled(&self) -> bool {
        matches!(self.kind, RowKind::Task | RowKind::Summary | RowKind::Milestone)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowVisual {
    pub row_index: usize,
    pub row_id: String,
    pub band: RowBand,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutedConnector {
    pub relation: Relation,
    pub from: ElementRef,
    pub to: ElementRef,
    pub path: ConnectorPath,
}

/// Result of one layout pass over the visible rows.
///
/// The engine keeps the latest pass for hit-testing and passes it back in
/// when routing the next one, so five-segment connectors keep running along
/// the row band they were drawn on while rows move.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LayoutPass {
    pub timeline_bounds: Rect,
    /// Row scroll offset the pass was built for.
    pub vertical_offset: f64,
    pub rows: Vec<RowVisual>,
    pub bars: Vec<BarVisual>,
    pub connectors: Vec<RoutedConnector>,
    #[serde(default)]
    pub row_markers: Vec<PlacedRowMarker>,
    #[serde(default)]
    pub axis_markers: Vec<PlacedAxisMarker>,
}

impl LayoutPass {
    #[must_use]
    pub fn row_band(&self, row_index: usize) -> Option<RowBand> {
        self.rows
            .iter()
            .find(|row| row.row_index == row_index)
            .map(|row| row.band)
    }

    #[must_use]
    pub fn find_bar(&self, element: &ElementRef) -> Option<&BarVisual> {
        self.bars.iter().find(|bar| &bar.element == element)
    }

    /// Topmost visible element under `point`. Actual bars are drawn after
    /// their baselines, so they win when both contain the point.
    #[must_use]
    pub fn bar_at(&self, point: Point) -> Option<&BarVisual> {
        self.bars
            .iter()
            .rev()
            .filter(|bar| bar.visible)
            .find(|bar| bar.bounds.contains(point))
    }

    #[must_use]
    pub fn row_at(&self, y: f64) -> Option<&RowVisual> {
        self.rows
            .iter()
            .find(|row| y >= row.band.top && y < row.band.top + row.band.height)
    }

    pub fn visible_bars(&self) -> impl DoubleEndedIterator<Item = &BarVisual> {
        self.bars.iter().filter(|bar| bar.visible)
    }
}

/// Inputs shared by every row laid out in one pass.
#[derive(Debug, Clone, Copy)]
pub(super) struct RowLayoutInputs<'a> {
    pub(super) scale: TimeScale,
    pub(super) timeline_bounds: Rect,
    pub(super) elements: &'a TimelineElementsConfig,
    pub(super) resolver: BarLayoutResolver,
}

impl RowLayoutInputs<'_> {
    /// Lays out every element of `row`, visible or not. Baselines come
    /// before the bar they belong to.
    pub(super) fn layout_row(
        &self,
        row_index: usize,
        row: &RowItem,
        band: RowBand,
    ) -> SmallVec<[BarVisual; 2]> {
        let mut visuals = SmallVec::new();
        let kind = row.effective_kind();
        let item = |range: TimeRange| {
            BarLayoutResolver::item_rect(
                self.scale,
                range,
                self.timeline_bounds,
                band.top,
                band.height,
            )
        };
        let visual = |element: ElementRef, kind: RowKind, range: TimeRange, bounds: Rect| BarVisual {
            row_index,
            element,
            kind,
            range,
            band,
            bounds,
            progress: None,
            progress_bounds: None,
            visible: BarLayoutResolver::is_range_visible(self.scale, kind, range),
        };

        match kind {
            RowKind::ResourcePeriod => {
                let config = self.elements.for_kind(RowKind::ResourcePeriod);
                for (period_index, period) in row.periods.iter().enumerate() {
                    let bounds =
                        self.resolver
                            .resolve(RowKind::ResourcePeriod, item(period.range), config, false);
                    visuals.push(visual(
                        ElementRef::period(row.id.clone(), period_index),
                        RowKind::ResourcePeriod,
                        period.range,
                        bounds,
                    ));
                }
            }
            RowKind::Milestone => {
                let Some(actual) = row.actual else {
                    return visuals;
                };
                let has_baseline = row.baseline.is_some();
                if let Some(baseline) = row.baseline {
                    let bounds = self.resolver.resolve(
                        RowKind::Baseline,
                        item(baseline),
                        &self.elements.baseline,
                        true,
                    );
                    visuals.push(visual(
                        ElementRef::baseline(row.id.clone()),
                        RowKind::Baseline,
                        baseline,
                        bounds,
                    ));
                }
                let at = TimeRange::instant(actual.start);
                let bounds =
                    self.resolver
                        .resolve_milestone(item(at), &self.elements.milestone, has_baseline);
                visuals.push(visual(
                    ElementRef::milestone(row.id.clone()),
                    RowKind::Milestone,
                    at,
                    bounds,
                ));
            }
            RowKind::Task | RowKind::Summary | RowKind::Baseline => {
                let Some(actual) = row.actual else {
                    return visuals;
                };
                let config = self.elements.for_kind(kind);
                let bar = match row.baseline {
                    Some(baseline) => {
                        let pair = self.resolver.resolve_pair(
                            kind,
                            item(actual),
                            config,
                            item(baseline),
                            &self.elements.baseline,
                        );
                        if let Some(bounds) = pair.baseline {
                            visuals.push(visual(
                                ElementRef::baseline(row.id.clone()),
                                RowKind::Baseline,
                                baseline,
                                bounds,
                            ));
                        }
                        pair.bar
                    }
                    None => self.resolver.resolve(kind, item(actual), config, false),
                };
                let mut actual_visual = visual(ElementRef::actual(row.id.clone()), kind, actual, bar);
                if kind == RowKind::Task {
                    let progress = row.progress.unwrap_or(0.0);
                    actual_visual.progress = Some(progress);
                    actual_visual.progress_bounds =
                        self.resolver
                            .resolve_progress(bar, progress, &self.elements.progress);
                }
                visuals.push(actual_visual);
            }
        }
        visuals
    }
}
