use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::{ConnectorRouter, Rect, RelationKind, RouteContext, RowBand, RowKind};
use crate::interaction::ElementRef;

use super::layout_pass::{LayoutPass, RoutedConnector, RowLayoutInputs};
use super::{RowSource, RowViewport, TimelineDataStore};

/// Dependency between two bars, resolved against the current rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
    pub from_row_id: String,
    pub to_row_id: String,
    pub kind: RelationKind,
    #[serde(default)]
    pub from_period_index: Option<usize>,
    #[serde(default)]
    pub to_period_index: Option<usize>,
}

/// Why a stored connector was left out of the relation working set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PruneReason {
    /// `to` names no row and no period.
    UnknownTarget,
    /// One endpoint has no bar to attach to.
    NoGeometry,
    /// Both endpoints are the same element.
    SelfReference,
}

/// Stored connector dropped while resolving relations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrunedRelation {
    pub from_row_id: String,
    pub from_period_index: Option<usize>,
    pub to: String,
    pub kind: RelationKind,
    pub reason: PruneReason,
}

#[derive(Debug, Clone)]
pub(super) struct ResolvedRelation {
    pub(super) relation: Relation,
    pub(super) from_index: usize,
    pub(super) to_index: usize,
    pub(super) from: ElementRef,
    pub(super) to: ElementRef,
}

/// Element a relation endpoint attaches to.
pub(super) fn endpoint_element(
    store: &dyn TimelineDataStore,
    row_index: usize,
    period_index: Option<usize>,
) -> Option<ElementRef> {
    let row = store.row(row_index)?;
    match period_index {
        Some(period_index) => (period_index < row.periods.len())
            .then(|| ElementRef::period(row.id.clone(), period_index)),
        None => {
            row.actual?;
            Some(match row.effective_kind() {
                RowKind::Milestone => ElementRef::milestone(row.id.clone()),
                _ => ElementRef::actual(row.id.clone()),
            })
        }
    }
}

/// Relations resolved against one store revision.
///
/// Dangling connectors are pruned once per revision and are not looked up
/// again until the data changes.
#[derive(Debug, Clone, Default)]
pub(super) struct RelationSet {
    revision: Option<u64>,
    pub(super) resolved: Vec<ResolvedRelation>,
    pub(super) pruned: Vec<PrunedRelation>,
}

impl RelationSet {
    /// Re-resolves when the store moved past the cached revision. Returns
    /// `true` when the set was rebuilt.
    pub(super) fn sync(&mut self, store: &dyn TimelineDataStore) -> bool {
        let revision = store.revision();
        if self.revision == Some(revision) {
            return false;
        }
        let (resolved, pruned) = resolve_relations(store);
        self.resolved = resolved;
        self.pruned = pruned;
        self.revision = Some(revision);
        true
    }
}

/// Reads every stored connector and resolves its endpoints.
///
/// Connectors whose target id matches no row or period, or whose endpoints
/// have nothing to draw, go to the pruned list instead.
fn resolve_relations(store: &dyn TimelineDataStore) -> (Vec<ResolvedRelation>, Vec<PrunedRelation>) {
    let mut resolved = Vec::new();
    let mut pruned = Vec::new();

    for from_index in 0..store.row_count() {
        let Some(row) = store.row(from_index) else {
            continue;
        };
        let sources = row
            .connectors
            .iter()
            .map(|spec| (None, spec))
            .chain(row.periods.iter().enumerate().flat_map(|(period_index, period)| {
                period
                    .connectors
                    .iter()
                    .map(move |spec| (Some(period_index), spec))
            }));

        for (from_period_index, spec) in sources {
            let prune = |reason| PrunedRelation {
                from_row_id: row.id.clone(),
                from_period_index,
                to: spec.to.clone(),
                kind: spec.kind,
                reason,
            };
            let target = store
                .find_row(&spec.to)
                .map(|index| (index, None))
                .or_else(|| {
                    store
                        .find_period(&spec.to)
                        .map(|(index, period_index)| (index, Some(period_index)))
                });
            let Some((to_index, to_period_index)) = target else {
                warn!(from = %row.id, to = %spec.to, "pruning connector with unknown target");
                pruned.push(prune(PruneReason::UnknownTarget));
                continue;
            };
            let endpoints = endpoint_element(store, from_index, from_period_index)
                .zip(endpoint_element(store, to_index, to_period_index));
            let Some((from, to)) = endpoints else {
                debug!(from = %row.id, to = %spec.to, "pruning connector without geometry");
                pruned.push(prune(PruneReason::NoGeometry));
                continue;
            };
            if from == to {
                debug!(row = %row.id, "pruning self connector");
                pruned.push(prune(PruneReason::SelfReference));
                continue;
            }
            let Some(to_row) = store.row(to_index) else {
                continue;
            };
            resolved.push(ResolvedRelation {
                relation: Relation {
                    from_row_id: row.id.clone(),
                    to_row_id: to_row.id.clone(),
                    kind: spec.kind,
                    from_period_index,
                    to_period_index,
                },
                from_index,
                to_index,
                from,
                to,
            });
        }
    }

    debug!(
        kept = resolved.len(),
        pruned = pruned.len(),
        revision = store.revision(),
        "resolved relations"
    );
    (resolved, pruned)
}

/// Screen-space band of `row_index` for the current scroll offset.
pub(super) fn row_band(rows: &RowViewport, timeline_bounds: Rect, row_index: usize) -> RowBand {
    RowBand {
        top: timeline_bounds.top + rows.row_top(row_index) - rows.vertical_offset(),
        height: rows.item_height(row_index),
    }
}

pub(super) struct ConnectorCoordinator<'a> {
    pub(super) store: &'a dyn TimelineDataStore,
    pub(super) rows: &'a RowViewport,
    pub(super) inputs: RowLayoutInputs<'a>,
    pub(super) stroke_thickness: f64,
}

impl ConnectorCoordinator<'_> {
    /// Routes `relations` for the pass being built in `current`.
    ///
    /// The destination row band comes from `previous` when that pass saw the
    /// row, shifted by the scroll distance since then, so lanes only move
    /// once the row layout itself has settled.
    pub(super) fn route_all(
        &self,
        relations: &[ResolvedRelation],
        current: &LayoutPass,
        previous: &LayoutPass,
        vertical_offset: f64,
    ) -> Vec<RoutedConnector> {
        let scrolled = vertical_offset - previous.vertical_offset;
        relations
            .iter()
            .filter_map(|resolved| {
                let from = self.element_rect(current, resolved.from_index, &resolved.from)?;
                let to = self.element_rect(current, resolved.to_index, &resolved.to)?;
                let to_row = previous
                    .row_band(resolved.to_index)
                    .map(|band| RowBand {
                        top: band.top - scrolled,
                        height: band.height,
                    })
                    .unwrap_or_else(|| {
                        row_band(self.rows, self.inputs.timeline_bounds, resolved.to_index)
                    });
                let context = RouteContext {
                    to_row,
                    clip: self.inputs.timeline_bounds,
                    stroke_thickness: self.stroke_thickness,
                };
                let path = ConnectorRouter.route(from, to, resolved.relation.kind, &context)?;
                Some(RoutedConnector {
                    relation: resolved.relation.clone(),
                    from: resolved.from.clone(),
                    to: resolved.to.clone(),
                    path,
                })
            })
            .collect()
    }

    fn element_rect(&self, current: &LayoutPass, row_index: usize, element: &ElementRef) -> Option<Rect> {
        if let Some(bar) = current.find_bar(element) {
            return Some(bar.bounds);
        }
        let row = self.store.row(row_index)?;
        let band = row_band(self.rows, self.inputs.timeline_bounds, row_index);
        self.inputs
            .layout_row(row_index, row, band)
            .into_iter()
            .find(|visual| &visual.element == element)
            .map(|visual| visual.bounds)
    }
}
