use criterion::{Criterion, criterion_group, criterion_main};
use gantt_rs::api::{InMemoryStore, RowItem, TimelineEngine, TimelineEngineConfig};
use gantt_rs::core::{
    ConnectorRouter, LabelDomainResolver, LabelInput, Rect, RelationKind, RouteContext, RowBand,
    TimeRange, Viewport,
};
use gantt_rs::render::NullRenderer;
use std::hint::black_box;

fn chained_rows(count: usize) -> Vec<RowItem> {
    (0..count)
        .map(|i| {
            let start = i as f64 * 3_600_000.0;
            let range = TimeRange::new(start, start + 7_200_000.0).expect("valid range");
            let row = RowItem::task(format!("t{i}"), format!("Task {i}"), range)
                .with_progress((i % 10) as f64 / 10.0);
            if i + 1 < count {
                row.with_connector(format!("t{}", i + 1), RelationKind::FinishStart)
            } else {
                row
            }
        })
        .collect()
}

fn bench_engine_relayout_10k(c: &mut Criterion) {
    let store = InMemoryStore::from_rows(chained_rows(10_000)).expect("valid rows");
    let config = TimelineEngineConfig::new(Viewport::new(1920, 1080));
    let mut engine =
        TimelineEngine::new(NullRenderer::default(), config, store).expect("engine init");

    c.bench_function("engine_relayout_10k_rows", |b| {
        b.iter(|| {
            engine.scroll(0.0, 64.0).expect("scroll");
            engine.relayout();
            black_box(engine.layout().bars.len());
        })
    });
}

fn bench_connector_routing(c: &mut Criterion) {
    let from = Rect::new(300.0, 10.0, 50.0, 20.0);
    let to = Rect::new(100.0, 50.0, 50.0, 20.0);
    let context = RouteContext {
        to_row: RowBand {
            top: 40.0,
            height: 40.0,
        },
        clip: Rect::new(0.0, 0.0, 1920.0, 1080.0),
        stroke_thickness: 1.0,
    };

    c.bench_function("connector_route_backwards", |b| {
        b.iter(|| {
            let _ = ConnectorRouter.route(
                black_box(from),
                black_box(to),
                RelationKind::FinishStart,
                black_box(&context),
            );
        })
    });
}

fn bench_label_domains_1k(c: &mut Criterion) {
    let labels: Vec<LabelInput> = (0..1_000)
        .map(|i| LabelInput::new(i as f64 * 9.0, 16.0))
        .collect();
    let bounds = Rect::new(0.0, 0.0, 1920.0, 9_000.0);
    let resolver = LabelDomainResolver::default();

    c.bench_function("label_domains_1k_overlapping", |b| {
        b.iter(|| {
            let _ = resolver.resolve(black_box(&labels), black_box(bounds));
        })
    });
}

fn bench_engine_snapshot_json(c: &mut Criterion) {
    let store = InMemoryStore::from_rows(chained_rows(500)).expect("valid rows");
    let config = TimelineEngineConfig::new(Viewport::new(1600, 900));
    let mut engine =
        TimelineEngine::new(NullRenderer::default(), config, store).expect("engine init");
    engine
        .zoom_to(0.0, 100.0 * 3_600_000.0)
        .expect("zoom to the first hundred hours");

    c.bench_function("engine_snapshot_json", |b| {
        b.iter(|| {
            let _ = engine.snapshot_json_pretty().expect("snapshot json");
        })
    });
}

criterion_group!(
    benches,
    bench_engine_relayout_10k,
    bench_connector_routing,
    bench_label_domains_1k,
    bench_engine_snapshot_json
);
criterion_main!(benches);
