use std::cell::Cell;
use std::rc::Rc;

use gantt_rs::TimelineResult;
use gantt_rs::api::{
    ConnectorSpec, InMemoryStore, PruneReason, PrunedRelation, Relation, RowItem,
    TimelineDataStore, TimelineEngine, TimelineEngineConfig,
};
use gantt_rs::core::{RelationKind, TimeRange, Viewport};
use gantt_rs::render::NullRenderer;

fn range(start: f64, end: f64) -> TimeRange {
    TimeRange::new(start, end).expect("valid range")
}

/// In-memory store that counts lookups of one row id.
struct LookupCountingStore {
    inner: InMemoryStore,
    watched: &'static str,
    lookups: Rc<Cell<usize>>,
}

impl TimelineDataStore for LookupCountingStore {
    fn row_count(&self) -> usize {
        self.inner.row_count()
    }

    fn row(&self, index: usize) -> Option<&RowItem> {
        self.inner.row(index)
    }

    fn find_row(&self, id: &str) -> Option<usize> {
        if id == self.watched {
            self.lookups.set(self.lookups.get() + 1);
        }
        self.inner.find_row(id)
    }

    fn set_actual_range(&mut self, row_id: &str, range: TimeRange) -> TimelineResult<()> {
        self.inner.set_actual_range(row_id, range)
    }

    fn set_baseline_range(&mut self, row_id: &str, range: TimeRange) -> TimelineResult<()> {
        self.inner.set_baseline_range(row_id, range)
    }

    fn set_period_range(
        &mut self,
        row_id: &str,
        period_index: usize,
        range: TimeRange,
    ) -> TimelineResult<()> {
        self.inner.set_period_range(row_id, period_index, range)
    }

    fn set_progress(&mut self, row_id: &str, progress: f64) -> TimelineResult<()> {
        self.inner.set_progress(row_id, progress)
    }

    fn add_connector(
        &mut self,
        row_id: &str,
        period_index: Option<usize>,
        spec: ConnectorSpec,
    ) -> TimelineResult<()> {
        self.inner.add_connector(row_id, period_index, spec)
    }

    fn remove_connector(
        &mut self,
        row_id: &str,
        period_index: Option<usize>,
        to: &str,
        kind: RelationKind,
    ) -> TimelineResult<usize> {
        self.inner.remove_connector(row_id, period_index, to, kind)
    }

    fn suspend_notifications(&mut self) {
        self.inner.suspend_notifications();
    }

    fn resume_notifications(&mut self, dispatch: bool) {
        self.inner.resume_notifications(dispatch);
    }

    fn revision(&self) -> u64 {
        self.inner.revision()
    }
}

fn filler_rows(count: usize) -> impl Iterator<Item = RowItem> {
    (0..count).map(|i| RowItem::task(format!("f{i}"), "", range(0.0, 1_000.0)))
}

#[test]
fn dangling_relation_is_pruned_once_per_data_revision() {
    let lookups = Rc::new(Cell::new(0));
    let rows = [
        RowItem::task("a", "Alpha", range(200.0, 400.0))
            .with_connector("ghost", RelationKind::FinishStart)
            .with_connector("b", RelationKind::FinishStart),
        RowItem::task("b", "Beta", range(500.0, 700.0)),
    ]
    .into_iter()
    .chain(filler_rows(20));
    let store = LookupCountingStore {
        inner: InMemoryStore::from_rows(rows).expect("store"),
        watched: "ghost",
        lookups: Rc::clone(&lookups),
    };
    let config = TimelineEngineConfig::new(Viewport::new(1_000, 400));
    let mut engine =
        TimelineEngine::new(NullRenderer::default(), config, store).expect("engine init");
    engine.zoom_to(0.0, 1_000.0).expect("zoom");

    let resolved_lookups = lookups.get();
    assert!(resolved_lookups >= 1);
    assert_eq!(
        engine.pruned_relations(),
        &[PrunedRelation {
            from_row_id: "a".to_owned(),
            from_period_index: None,
            to: "ghost".to_owned(),
            kind: RelationKind::FinishStart,
            reason: PruneReason::UnknownTarget,
        }]
    );
    let relations: Vec<&Relation> = engine.relations().collect();
    assert_eq!(relations.len(), 1);
    assert_eq!(relations[0].to_row_id, "b");
    assert_eq!(engine.layout().connectors.len(), 1);

    for _ in 0..3 {
        engine.scroll(0.0, 10.0).expect("scroll");
        engine.relayout();
    }
    assert_eq!(lookups.get(), resolved_lookups);
    assert_eq!(engine.pruned_relations().len(), 1);

    engine
        .store_mut()
        .set_progress("b", 0.5)
        .expect("host edit");
    engine.relayout();
    assert!(lookups.get() > resolved_lookups);
    assert_eq!(engine.pruned_relations().len(), 1);
}

#[test]
fn wrap_around_lane_follows_the_destination_row_when_scrolling() {
    let rows = [
        RowItem::summary("p", "Project", range(0.0, 1_000.0)),
        RowItem::task("a", "Alpha", range(600.0, 700.0))
            .with_connector("b", RelationKind::FinishStart),
        RowItem::task("b", "Beta", range(100.0, 200.0)),
    ]
    .into_iter()
    .chain(filler_rows(20));
    let store = InMemoryStore::from_rows(rows).expect("store");
    let config = TimelineEngineConfig::new(Viewport::new(1_000, 400));
    let mut engine =
        TimelineEngine::new(NullRenderer::default(), config, store).expect("engine init");
    engine.zoom_to(0.0, 1_000.0).expect("zoom");

    let lane_y = |engine: &TimelineEngine<NullRenderer>| {
        let path = &engine.layout().connectors[0].path;
        assert_eq!(path.segments.len(), 5);
        let lane = path.segments[2];
        assert_eq!(lane.from.y, lane.to.y);
        lane.from.y
    };

    assert_eq!(lane_y(&engine), 64.5);

    engine.scroll(0.0, 32.0).expect("scroll");

    assert_eq!(lane_y(&engine), 32.5);
    let band = engine.layout().row_band(2).expect("destination row visible");
    assert_eq!(band.top, 32.0);
}
