use gantt_rs::TimelineError;
use gantt_rs::api::{
    InMemoryStore, LabelLayoutConfig, RowItem, TimelineEngine, TimelineEngineConfig,
    TimelineSnapshot, TimelineStyle,
};
use gantt_rs::core::{Point, RelationKind, RowKind, TimeRange, Viewport};
use gantt_rs::render::{Color, LineStrokeStyle, NullRenderer, RenderFrame, TimelineLayerKind};

fn range(start: f64, end: f64) -> TimeRange {
    TimeRange::new(start, end).expect("valid range")
}

fn rows() -> Vec<RowItem> {
    vec![
        RowItem::summary("p", "Project", range(0.0, 1_000.0)),
        RowItem::task("a", "Alpha", range(200.0, 400.0))
            .with_progress(0.25)
            .with_connector("b", RelationKind::FinishStart),
        RowItem::task("b", "Beta", range(500.0, 700.0)),
    ]
}

fn engine_with(config: TimelineEngineConfig, rows: Vec<RowItem>) -> TimelineEngine<NullRenderer> {
    let store = InMemoryStore::from_rows(rows).expect("store");
    let mut engine =
        TimelineEngine::new(NullRenderer::default(), config, store).expect("engine init");
    engine.zoom_to(0.0, 1_000.0).expect("zoom");
    engine.take_events();
    engine
}

fn engine() -> TimelineEngine<NullRenderer> {
    engine_with(TimelineEngineConfig::new(Viewport::new(1_000, 400)), rows())
}

fn texts(frame: &RenderFrame) -> Vec<(String, f64)> {
    frame
        .layer(TimelineLayerKind::Labels)
        .map(|layer| {
            layer
                .texts
                .iter()
                .map(|text| (text.text.clone(), text.x))
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn render_smoke_counts_primitives() {
    let mut engine = engine();

    engine.render().expect("render");

    let renderer = engine.renderer();
    assert_eq!(renderer.frames_rendered, 1);
    assert_eq!(renderer.last_text_count, 3);
    assert_eq!(renderer.last_polygon_count, 1);
    assert!(renderer.last_rect_count >= 5);
}

#[test]
fn frame_places_elements_on_their_layers() {
    let engine = engine();

    let frame = engine.build_render_frame();

    let layer = |kind| frame.layer(kind).expect("layer exists");
    assert_eq!(layer(TimelineLayerKind::Bars).rects.len(), 3);
    assert_eq!(layer(TimelineLayerKind::Progress).rects.len(), 1);
    assert_eq!(layer(TimelineLayerKind::Connectors).lines.len(), 2);
    assert_eq!(layer(TimelineLayerKind::Arrows).polygons.len(), 1);
    assert!(layer(TimelineLayerKind::EditPreview).is_empty());

    let progress = layer(TimelineLayerKind::Progress).rects[0];
    assert_eq!(progress.x, 201.0);
    assert_eq!(progress.width, 50.0);
}

#[test]
fn layers_follow_back_to_front_order() {
    let frame = engine().build_render_frame();

    let kinds: Vec<TimelineLayerKind> = frame.layers.iter().map(|layer| layer.kind).collect();
    let mut sorted = kinds.clone();
    sorted.sort_by_key(|kind| kind.z_index());
    assert_eq!(kinds, sorted);
    assert!(kinds.first() == Some(&TimelineLayerKind::Background));
}

#[test]
fn labels_sit_right_of_their_bars() {
    let frame = engine().build_render_frame();

    let labels = texts(&frame);
    assert_eq!(labels.len(), 3);
    assert!(labels.contains(&("Alpha".to_owned(), 406.5)));
    assert!(labels.contains(&("Beta".to_owned(), 706.5)));
}

#[test]
fn disabled_labels_still_show_for_the_hovered_row() {
    let config = TimelineEngineConfig::new(Viewport::new(1_000, 400)).with_labels(
        LabelLayoutConfig {
            enabled: false,
            ..LabelLayoutConfig::default()
        },
    );
    let mut engine = engine_with(config, rows());
    assert!(texts(&engine.build_render_frame()).is_empty());

    engine.pointer_move(Point::new(300.0, 48.0)).expect("hover");

    assert_eq!(
        texts(&engine.build_render_frame()),
        vec![("Alpha".to_owned(), 406.5)]
    );

    engine.pointer_leave();
    assert!(texts(&engine.build_render_frame()).is_empty());
}

#[test]
fn unnamed_and_resource_rows_carry_no_label() {
    let mut rows = rows();
    rows.push(RowItem::task("n", "", range(100.0, 150.0)));
    let engine = engine_with(TimelineEngineConfig::new(Viewport::new(1_000, 400)), rows);

    assert_eq!(texts(&engine.build_render_frame()).len(), 3);
}

#[test]
fn move_gesture_draws_a_dashed_outline() {
    let mut engine = engine();
    engine.pointer_down(Point::new(300.0, 48.0)).expect("press");
    engine.pointer_move(Point::new(330.0, 48.0)).expect("drag");

    let frame = engine.build_render_frame();
    let preview = frame
        .layer(TimelineLayerKind::EditPreview)
        .expect("preview layer");

    assert_eq!(preview.lines.len(), 4);
    assert!(
        preview
            .lines
            .iter()
            .all(|line| line.stroke_style == LineStrokeStyle::Dashed)
    );
    let left = preview
        .lines
        .iter()
        .map(|line| line.x1.min(line.x2))
        .fold(f64::INFINITY, f64::min);
    assert_eq!(left, 230.5);
}

#[test]
fn progress_gesture_previews_the_fill() {
    let mut engine = engine();
    engine.pointer_down(Point::new(250.5, 56.0)).expect("press");
    engine.pointer_move(Point::new(300.5, 56.0)).expect("drag");

    let frame = engine.build_render_frame();
    let preview = frame
        .layer(TimelineLayerKind::EditPreview)
        .expect("preview layer");

    assert_eq!(preview.rects.len(), 1);
    assert_eq!(preview.rects[0].width, 100.0);
}

#[test]
fn selected_connector_uses_highlight_color() {
    let mut engine = engine();
    let style = engine.style();

    engine.pointer_down(Point::new(450.0, 49.5)).expect("click");
    let frame = engine.build_render_frame();

    let connectors = frame
        .layer(TimelineLayerKind::Connectors)
        .expect("connector layer");
    assert!(
        connectors
            .lines
            .iter()
            .all(|line| line.color == style.selected_connector_color)
    );
    let arrows = frame.layer(TimelineLayerKind::Arrows).expect("arrow layer");
    assert_eq!(arrows.polygons[0].fill_color, style.selected_connector_color);
}

#[test]
fn selected_row_is_highlighted_on_the_grid() {
    let mut engine = engine();
    let before = engine
        .build_render_frame()
        .layer(TimelineLayerKind::Grid)
        .map_or(0, |layer| layer.rects.len());

    engine.select_row(Some("b")).expect("select");

    let frame = engine.build_render_frame();
    let grid = frame.layer(TimelineLayerKind::Grid).expect("grid layer");
    assert_eq!(grid.rects.len(), before + 1);
    assert_eq!(grid.rects[0].y, 64.0);
    assert_eq!(grid.rects[0].fill_color, engine.style().selected_row_color);
}

#[test]
fn milestones_are_drawn_as_diamonds() {
    let mut rows = rows();
    rows.push(RowItem::milestone("m", "Gate", 800.0));
    let engine = engine_with(TimelineEngineConfig::new(Viewport::new(1_000, 400)), rows);

    let frame = engine.build_render_frame();
    let milestones = frame
        .layer(TimelineLayerKind::Milestones)
        .expect("milestone layer");

    assert_eq!(milestones.polygons.len(), 1);
    assert_eq!(milestones.polygons[0].points.len(), 4);
}

#[test]
fn invalid_style_is_rejected() {
    let mut engine = engine();

    let nan_color = TimelineStyle {
        connector_color: Color::rgb(f64::NAN, 0.0, 0.0),
        ..TimelineStyle::default()
    };
    assert!(matches!(
        engine.set_style(nan_color),
        Err(TimelineError::InvalidData(_))
    ));

    let negative_border = TimelineStyle {
        bar_border_width: -1.0,
        ..TimelineStyle::default()
    };
    assert!(engine.set_style(negative_border).is_err());

    let style = TimelineStyle {
        task_fill_color: Color::rgb(0.2, 0.4, 0.6),
        ..TimelineStyle::default()
    };
    engine.set_style(style).expect("valid style");
    let frame = engine.build_render_frame();
    let bars = frame.layer(TimelineLayerKind::Bars).expect("bar layer");
    assert!(
        bars.rects
            .iter()
            .any(|rect| rect.fill_color == Color::rgb(0.2, 0.4, 0.6))
    );
}

#[test]
fn snapshot_json_round_trips() {
    let mut engine = engine();
    engine.select_row(Some("a")).expect("select");

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.bars.len(), 3);
    assert_eq!(snapshot.connectors.len(), 1);
    assert_eq!(snapshot.selected_row.as_deref(), Some("a"));
    assert_eq!(snapshot.visible_rows, (0, 3));
    let summary = snapshot
        .bars
        .iter()
        .find(|bar| bar.kind == RowKind::Summary)
        .expect("summary bar");
    assert!(summary.progress_bounds.is_none());

    let json = engine.snapshot_json_pretty().expect("json");
    let parsed: TimelineSnapshot = serde_json::from_str(&json).expect("parse snapshot");
    assert_eq!(parsed, snapshot);
}
