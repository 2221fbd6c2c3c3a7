use gantt_rs::TimelineError;
use gantt_rs::api::{
    InMemoryStore, Period, RowItem, RowSource, TimelineEngine, TimelineEngineConfig, TimelineEvent,
};
use gantt_rs::core::{Point, RelationKind, TimeRange, Viewport};
use gantt_rs::interaction::ElementRef;
use gantt_rs::render::NullRenderer;

fn range(start: f64, end: f64) -> TimeRange {
    TimeRange::new(start, end).expect("valid range")
}

fn engine_with(rows: Vec<RowItem>) -> TimelineEngine<NullRenderer> {
    let store = InMemoryStore::from_rows(rows).expect("store");
    let config = TimelineEngineConfig::new(Viewport::new(1_000, 400));
    let mut engine =
        TimelineEngine::new(NullRenderer::default(), config, store).expect("engine init");
    engine.zoom_to(0.0, 1_000.0).expect("zoom");
    engine.take_events();
    engine
}

fn linked_engine() -> TimelineEngine<NullRenderer> {
    engine_with(vec![
        RowItem::summary("p", "Project", range(0.0, 1_000.0)),
        RowItem::task("a", "Alpha", range(200.0, 400.0))
            .with_progress(0.25)
            .with_connector("b", RelationKind::FinishStart),
        RowItem::task("b", "Beta", range(500.0, 700.0)),
        RowItem::resource(
            "r",
            "Crane",
            vec![Period::new("r-1", range(100.0, 200.0))],
        ),
    ])
}

fn tall_engine(count: usize) -> TimelineEngine<NullRenderer> {
    engine_with(
        (0..count)
            .map(|index| {
                let start = index as f64 * 10.0;
                RowItem::task(format!("t{index}"), format!("Task {index}"), range(start, start + 50.0))
            })
            .collect(),
    )
}

#[test]
fn click_on_empty_row_space_selects_the_row() {
    let mut engine = linked_engine();

    assert_eq!(engine.pointer_down(Point::new(900.0, 48.0)).expect("click"), None);

    assert_eq!(engine.selected_row(), Some("a"));
    assert_eq!(
        engine.take_events(),
        vec![TimelineEvent::RowSelected {
            row_id: Some("a".to_owned()),
            period_index: None,
        }]
    );
}

#[test]
fn click_below_the_rows_clears_the_selection() {
    let mut engine = linked_engine();
    engine.select_row(Some("b")).expect("select");
    engine.take_events();

    engine.pointer_down(Point::new(900.0, 300.0)).expect("click");

    assert_eq!(engine.selected_row(), None);
    assert_eq!(
        engine.take_events(),
        vec![TimelineEvent::RowSelected {
            row_id: None,
            period_index: None,
        }]
    );
}

#[test]
fn repeated_selection_emits_once() {
    let mut engine = linked_engine();

    engine.select_row(Some("b")).expect("select");
    engine.select_row(Some("b")).expect("select again");

    assert_eq!(engine.take_events().len(), 1);
}

#[test]
fn unknown_rows_and_periods_are_rejected() {
    let mut engine = linked_engine();

    assert!(matches!(
        engine.select_row(Some("missing")),
        Err(TimelineError::UnknownRow(id)) if id == "missing"
    ));
    assert!(matches!(
        engine.select_period("r", 4),
        Err(TimelineError::UnknownPeriod { period_index: 4, .. })
    ));
    assert!(matches!(
        engine.scroll_to_row("missing"),
        Err(TimelineError::UnknownRow(_))
    ));

    engine.select_period("r", 0).expect("known period");
    assert_eq!(engine.selected_row(), Some("r"));
    assert_eq!(engine.interaction().selected_period(), Some(0));
}

#[test]
fn connector_hit_uses_tolerance_around_the_path() {
    let engine = linked_engine();

    let hit = engine
        .connector_at(Point::new(450.0, 51.0))
        .expect("near the horizontal run");
    assert_eq!(hit.from, ElementRef::actual("a"));
    assert_eq!(hit.to, ElementRef::actual("b"));
    assert_eq!(hit.relation.kind, RelationKind::FinishStart);

    assert!(engine.connector_at(Point::new(450.0, 70.0)).is_none());
}

#[test]
fn selecting_a_row_drops_the_connector_selection() {
    let mut engine = linked_engine();
    engine.pointer_down(Point::new(450.0, 49.5)).expect("click connector");
    assert!(engine.selected_connector().is_some());

    engine.select_row(Some("b")).expect("select");

    assert!(engine.selected_connector().is_none());
    assert!(!engine.delete_selected_connector().expect("nothing selected"));
    assert_eq!(engine.layout().connectors.len(), 1);
}

#[test]
fn horizontal_scroll_is_clamped_and_reported() {
    let mut engine = linked_engine();
    engine.zoom_to(0.0, 500.0).expect("zoom");
    engine.take_events();

    engine.scroll(100.0, 0.0).expect("scroll");
    let (start, end) = engine.visible_range();
    assert!((start - 50.0).abs() < 1e-9);
    assert!((end - 550.0).abs() < 1e-9);
    assert_eq!(
        engine.take_events(),
        vec![TimelineEvent::VisibleRangeChanged { start, end }]
    );

    engine.scroll(10_000.0, 0.0).expect("scroll past the end");
    assert_eq!(engine.visible_range(), (500.0, 1_000.0));

    assert!(matches!(
        engine.scroll(f64::NAN, 0.0),
        Err(TimelineError::InvalidData(_))
    ));
}

#[test]
fn vertical_scroll_moves_the_visible_rows() {
    let mut engine = tall_engine(30);
    assert_eq!(engine.rows().start_index(), 0);

    engine.scroll(0.0, 100.0).expect("scroll");

    assert_eq!(engine.rows().vertical_offset(), 100.0);
    assert_eq!(engine.rows().start_index(), 3);
    assert_eq!(engine.layout().rows[0].row_id, "t3");
    assert_eq!(engine.row_id_at(Point::new(10.0, 0.0)), Some("t3"));
    assert_eq!(engine.row_id_at(Point::new(10.0, 30.0)), Some("t4"));

    engine.scroll(0.0, 10_000.0).expect("scroll past the end");
    assert_eq!(engine.rows().vertical_offset(), 30.0 * 32.0 - 400.0);
}

#[test]
fn scroll_to_row_reveals_rows_in_both_directions() {
    let mut engine = tall_engine(30);

    engine.scroll_to_row("t29").expect("scroll down");
    assert_eq!(engine.rows().vertical_offset(), 560.0);
    assert!(engine.layout().rows.iter().any(|row| row.row_id == "t29"));

    engine.scroll_to_row("t2").expect("scroll up");
    assert_eq!(engine.rows().vertical_offset(), 64.0);

    engine.scroll_to_row("t5").expect("already visible");
    assert_eq!(engine.rows().vertical_offset(), 64.0);
}

#[test]
fn viewport_resize_rebuilds_the_layout() {
    let mut engine = tall_engine(30);
    let before = engine.layout().rows.len();

    engine
        .set_viewport(Viewport::new(1_000, 800))
        .expect("resize");

    assert!(engine.layout().rows.len() > before);
    assert!(matches!(
        engine.set_viewport(Viewport::new(0, 800)),
        Err(TimelineError::InvalidViewport { .. })
    ));
}
