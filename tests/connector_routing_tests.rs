use gantt_rs::core::{
    ArrowDirection, BarEdge, ConnectorRouter, Point, Rect, RelationKind, RouteContext, RowBand,
};
use proptest::prelude::*;

fn context(to_row: RowBand, stroke_thickness: f64) -> RouteContext {
    RouteContext {
        to_row,
        clip: Rect::new(0.0, 0.0, 1_000.0, 500.0),
        stroke_thickness,
    }
}

fn band_of(rect: Rect) -> RowBand {
    RowBand {
        top: rect.top - 10.0,
        height: rect.height + 20.0,
    }
}

#[test]
fn finish_start_on_same_row_is_one_crisp_segment() {
    let from = Rect::new(100.0, 10.0, 50.0, 20.0);
    let to = Rect::new(200.0, 10.0, 50.0, 20.0);

    let path = ConnectorRouter
        .route(from, to, RelationKind::FinishStart, &context(band_of(to), 1.0))
        .expect("visible path");

    assert_eq!(path.segments.len(), 1);
    assert_eq!(path.start(), Some(Point::new(150.5, 20.5)));
    assert_eq!(path.end(), Some(Point::new(200.5, 20.5)));
    let arrow = path.arrow.expect("arrow");
    assert_eq!(arrow.direction, ArrowDirection::Right);
    assert_eq!(arrow.points[0], Point::new(199.5, 20.5));
}

#[test]
fn finish_start_backwards_runs_along_destination_row_edge() {
    let from = Rect::new(300.0, 10.0, 50.0, 20.0);
    let to = Rect::new(100.0, 50.0, 50.0, 20.0);
    let to_row = RowBand {
        top: 40.0,
        height: 40.0,
    };

    let path = ConnectorRouter
        .route(from, to, RelationKind::FinishStart, &context(to_row, 0.0))
        .expect("visible path");

    let points: Vec<Point> = path
        .segments
        .iter()
        .map(|segment| segment.from)
        .chain(path.end())
        .collect();
    assert_eq!(
        points,
        vec![
            Point::new(350.0, 20.0),
            Point::new(355.0, 20.0),
            Point::new(355.0, 40.0),
            Point::new(91.0, 40.0),
            Point::new(91.0, 60.0),
            Point::new(100.0, 60.0),
        ]
    );
    assert_eq!(path.arrow.expect("arrow").direction, ArrowDirection::Right);
}

#[test]
fn finish_start_forward_to_lower_row_drops_onto_bar_top() {
    let from = Rect::new(100.0, 10.0, 50.0, 20.0);
    let to = Rect::new(300.0, 50.0, 100.0, 20.0);

    let path = ConnectorRouter
        .route(from, to, RelationKind::FinishStart, &context(band_of(to), 0.0))
        .expect("visible path");

    assert_eq!(path.segments.len(), 2);
    assert_eq!(path.end(), Some(Point::new(305.0, 50.0)));
    assert_eq!(path.arrow.expect("arrow").direction, ArrowDirection::Down);
}

#[test]
fn finish_start_forward_to_upper_row_rises_to_bar_bottom() {
    let from = Rect::new(100.0, 50.0, 50.0, 20.0);
    let to = Rect::new(300.0, 10.0, 100.0, 20.0);

    let path = ConnectorRouter
        .route(from, to, RelationKind::FinishStart, &context(band_of(to), 0.0))
        .expect("visible path");

    assert_eq!(path.end(), Some(Point::new(305.0, 30.0)));
    assert_eq!(path.arrow.expect("arrow").direction, ArrowDirection::Up);
}

#[test]
fn start_start_bends_left_of_both_bars() {
    let from = Rect::new(200.0, 10.0, 50.0, 20.0);
    let to = Rect::new(100.0, 50.0, 50.0, 20.0);

    let path = ConnectorRouter
        .route(from, to, RelationKind::StartStart, &context(band_of(to), 0.0))
        .expect("visible path");

    assert_eq!(path.segments.len(), 3);
    assert_eq!(path.segments[0].to, Point::new(91.0, 20.0));
    assert_eq!(path.end(), Some(Point::new(100.0, 60.0)));
    assert_eq!(path.arrow.expect("arrow").direction, ArrowDirection::Right);
}

#[test]
fn finish_finish_bends_right_of_both_bars() {
    let from = Rect::new(100.0, 10.0, 100.0, 20.0);
    let to = Rect::new(150.0, 50.0, 200.0, 20.0);

    let path = ConnectorRouter
        .route(from, to, RelationKind::FinishFinish, &context(band_of(to), 0.0))
        .expect("visible path");

    assert_eq!(path.segments.len(), 3);
    assert_eq!(path.segments[1].from, Point::new(359.0, 20.0));
    assert_eq!(path.end(), Some(Point::new(350.0, 60.0)));
    assert_eq!(path.arrow.expect("arrow").direction, ArrowDirection::Left);
}

fn route_points(path: &gantt_rs::core::ConnectorPath) -> Vec<Point> {
    path.segments
        .iter()
        .map(|segment| segment.from)
        .chain(path.end())
        .collect()
}

#[test]
fn start_finish_without_room_wraps_along_top_of_lower_row() {
    let from = Rect::new(100.0, 10.0, 50.0, 20.0);
    let to = Rect::new(150.0, 50.0, 50.0, 20.0);
    let to_row = RowBand {
        top: 40.0,
        height: 40.0,
    };

    let path = ConnectorRouter
        .route(from, to, RelationKind::StartFinish, &context(to_row, 0.0))
        .expect("visible path");

    assert_eq!(
        route_points(&path),
        vec![
            Point::new(100.0, 20.0),
            Point::new(95.0, 20.0),
            Point::new(95.0, 40.0),
            Point::new(209.0, 40.0),
            Point::new(209.0, 60.0),
            Point::new(200.0, 60.0),
        ]
    );
    assert_eq!(path.arrow.expect("arrow").direction, ArrowDirection::Left);
}

#[test]
fn start_finish_without_room_wraps_along_bottom_of_upper_row() {
    let from = Rect::new(100.0, 50.0, 50.0, 20.0);
    let to = Rect::new(150.0, 10.0, 50.0, 20.0);
    let to_row = RowBand {
        top: 0.0,
        height: 36.0,
    };

    let path = ConnectorRouter
        .route(from, to, RelationKind::StartFinish, &context(to_row, 0.0))
        .expect("visible path");

    assert_eq!(
        route_points(&path),
        vec![
            Point::new(100.0, 60.0),
            Point::new(95.0, 60.0),
            Point::new(95.0, 36.0),
            Point::new(209.0, 36.0),
            Point::new(209.0, 20.0),
            Point::new(200.0, 20.0),
        ]
    );
    assert_eq!(path.arrow.expect("arrow").direction, ArrowDirection::Left);
}

#[test]
fn leading_invisible_segments_are_dropped() {
    let from = Rect::new(100.0, 10.0, 50.0, 10.0);
    let to = Rect::new(300.0, 50.0, 100.0, 20.0);
    let context = RouteContext {
        to_row: band_of(to),
        clip: Rect::new(0.0, 30.0, 1_000.0, 500.0),
        stroke_thickness: 0.0,
    };

    let path = ConnectorRouter
        .route(from, to, RelationKind::FinishStart, &context)
        .expect("partly visible path");

    assert_eq!(path.segments.len(), 1);
    assert_eq!(path.start(), Some(Point::new(305.0, 15.0)));
    assert!(path.arrow.is_some());
}

#[test]
fn fully_clipped_route_is_none() {
    let from = Rect::new(500.0, 10.0, 50.0, 20.0);
    let to = Rect::new(700.0, 10.0, 50.0, 20.0);
    let context = RouteContext {
        to_row: band_of(to),
        clip: Rect::new(0.0, 0.0, 100.0, 100.0),
        stroke_thickness: 0.0,
    };

    assert!(
        ConnectorRouter
            .route(from, to, RelationKind::FinishStart, &context)
            .is_none()
    );
}

#[test]
fn preview_starts_on_the_dragged_edge() {
    let from = Rect::new(100.0, 10.0, 50.0, 20.0);
    let pointer = Point::new(400.0, 300.0);

    let start = ConnectorRouter.route_preview(from, BarEdge::Start, pointer, 0.0);
    let finish = ConnectorRouter.route_preview(from, BarEdge::Finish, pointer, 0.0);

    assert_eq!(start.from, Point::new(100.0, 20.0));
    assert_eq!(finish.from, Point::new(150.0, 20.0));
    assert_eq!(finish.to, pointer);
}

#[test]
fn path_distance_measures_nearest_segment() {
    let from = Rect::new(100.0, 10.0, 50.0, 20.0);
    let to = Rect::new(300.0, 50.0, 100.0, 20.0);
    let path = ConnectorRouter
        .route(from, to, RelationKind::FinishStart, &context(band_of(to), 0.0))
        .expect("visible path");

    assert_eq!(path.distance_to(Point::new(200.0, 20.0)), 0.0);
    assert_eq!(path.distance_to(Point::new(200.0, 23.0)), 3.0);
    assert_eq!(path.distance_to(Point::new(310.0, 40.0)), 5.0);
}

fn kind_strategy() -> impl Strategy<Value = RelationKind> {
    prop_oneof![
        Just(RelationKind::FinishStart),
        Just(RelationKind::StartStart),
        Just(RelationKind::FinishFinish),
        Just(RelationKind::StartFinish),
    ]
}

fn rect_strategy() -> impl Strategy<Value = Rect> {
    (100.0f64..1_500.0, 20.0f64..800.0, 1.0f64..200.0, 4.0f64..40.0)
        .prop_map(|(left, top, width, height)| Rect::new(left, top, width, height))
}

fn near(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1.0
}

fn on_boundary(point: Point, rect: Rect) -> bool {
    let within_x = point.x >= rect.left - 1.0 && point.x <= rect.right() + 1.0;
    let within_y = point.y >= rect.top - 1.0 && point.y <= rect.bottom() + 1.0;
    ((near(point.x, rect.left) || near(point.x, rect.right())) && within_y)
        || ((near(point.y, rect.top) || near(point.y, rect.bottom())) && within_x)
}

proptest! {
    #[test]
    fn routes_are_orthogonal_and_attach_to_both_bars(
        from in rect_strategy(),
        to in rect_strategy(),
        kind in kind_strategy()
    ) {
        let context = RouteContext {
            to_row: band_of(to),
            clip: Rect::new(0.0, 0.0, 2_000.0, 1_000.0),
            stroke_thickness: 0.0,
        };
        let path = ConnectorRouter.route(from, to, kind, &context);
        prop_assume!(path.is_some());
        let path = path.expect("checked above");

        prop_assert!(path.segments.len() <= 5);
        for segment in &path.segments {
            prop_assert!(segment.from.x == segment.to.x || segment.from.y == segment.to.y);
        }
        for pair in path.segments.windows(2) {
            prop_assert_eq!(pair[0].to, pair[1].from);
        }

        let start = path.start().expect("start");
        let source_x = match kind.source_edge() {
            BarEdge::Start => from.left,
            BarEdge::Finish => from.right(),
        };
        prop_assert!(near(start.x, source_x));
        prop_assert!(near(start.y, from.center_y()));

        let end = path.end().expect("end");
        prop_assert!(on_boundary(end, to));
        prop_assert_eq!(path.arrow.map(|arrow| arrow.tip), Some(end));
    }
}
