use freedraw::adapter::TileAdapter;
use freedraw::events::RecordingSink;
use freedraw::render::RecordingRenderer;
use freedraw::{
    BackendKind, CoordinateAdapter, DrawEvent, DrawOptions, FreeDraw, GeoPoint, KeyCode,
    MapHost, MemoryPolygonStore, Mode, PolygonStore, RenderCommand, ScreenPoint,
    StaticMapHost, Viewport,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

struct CountingAdapter {
    inner: TileAdapter,
    to_screen_calls: AtomicUsize,
}

impl CoordinateAdapter for CountingAdapter {
    fn to_screen(&self, geo: GeoPoint) -> ScreenPoint {
        self.to_screen_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.to_screen(geo)
    }

    fn to_geo(&self, point: ScreenPoint) -> GeoPoint {
        self.inner.to_geo(point)
    }
}

struct CountingHost {
    adapter: Arc<CountingAdapter>,
    dragging: AtomicBool,
}

impl CountingHost {
    fn new() -> Self {
        Self {
            adapter: Arc::new(CountingAdapter {
                inner: TileAdapter::new(&Viewport::default()),
                to_screen_calls: AtomicUsize::new(0),
            }),
            dragging: AtomicBool::new(true),
        }
    }

    fn simplifier_inputs(&self) -> usize {
        self.adapter.to_screen_calls.load(Ordering::SeqCst)
    }
}

impl MapHost for CountingHost {
    fn coordinate_adapter(&self) -> Arc<dyn CoordinateAdapter> {
        self.adapter.clone()
    }

    fn set_dragging(&self, enabled: bool) {
        self.dragging.store(enabled, Ordering::SeqCst);
    }

    fn set_container_class(&self, _class: &str, _enabled: bool) {}
}

struct Harness {
    host: Arc<CountingHost>,
    renderer: Arc<RecordingRenderer>,
    store: Arc<MemoryPolygonStore>,
    sink: Arc<RecordingSink>,
    draw: FreeDraw,
}

fn harness(options: DrawOptions) -> Harness {
    let host = Arc::new(CountingHost::new());
    let renderer = Arc::new(RecordingRenderer::default());
    let store = Arc::new(MemoryPolygonStore::default());
    let sink = Arc::new(RecordingSink::default());
    let mut draw = FreeDraw::new_with_collaborators(
        host.clone(),
        renderer.clone(),
        store.clone(),
        sink.clone(),
        options,
    );
    draw.attach();
    Harness {
        host,
        renderer,
        store,
        sink,
        draw,
    }
}

fn stroke(draw: &mut FreeDraw, points: &[(f64, f64)]) {
    let (first, rest) = points.split_first().unwrap();
    assert!(draw.pointer_down(ScreenPoint::from(*first)));
    for point in rest {
        draw.pointer_move(ScreenPoint::from(*point));
    }
}

#[test]
fn create_only_stroke_commits_one_polygon() {
    let mut h = harness(DrawOptions::default());
    assert_eq!(h.draw.mode(), Mode::ALL);

    h.draw.set_only_mode(Mode::CREATE);
    assert_eq!(h.draw.mode(), Mode::CREATE);

    assert!(h.draw.pointer_down(ScreenPoint::new(400.0, 300.0)));
    assert!(h.draw.is_drawing());
    h.draw.pointer_move(ScreenPoint::new(420.0, 300.0));
    h.draw.pointer_move(ScreenPoint::new(560.0, 300.0));
    h.draw.pointer_move(ScreenPoint::new(480.0, 420.0));
    assert_eq!(h.draw.session_len(), Some(3));

    let handles = h.draw.pointer_up();

    assert_eq!(h.host.simplifier_inputs(), 3);
    assert_eq!(handles.len(), 1);
    assert_eq!(h.store.create_calls(), 1);
    assert!(h.store.all()[0].latlngs.len() >= 3);

    let markers = h.sink.markers();
    assert_eq!(markers.len(), 1);
    assert!(matches!(
        &markers[0],
        DrawEvent::Markers { polygon_count: 1, latlngs, .. } if latlngs.len() == 1
    ));
    assert!(!h.draw.is_drawing());
}

#[test]
fn release_without_moves_skips_store() {
    let mut h = harness(DrawOptions::default());
    h.draw.pointer_down(ScreenPoint::new(100.0, 100.0));
    assert!(h.draw.pointer_up().is_empty());

    assert_eq!(h.store.create_calls(), 0);
    assert_eq!(h.host.simplifier_inputs(), 0);
    assert!(h.sink.markers().is_empty());
    assert_eq!(
        h.renderer.commands(),
        vec![
            RenderCommand::Begin {
                at: ScreenPoint::new(100.0, 100.0)
            },
            RenderCommand::Clear
        ]
    );
}

#[test]
fn cancelled_stroke_never_simplifies() {
    let mut h = harness(DrawOptions::default());
    stroke(
        &mut h.draw,
        &[(100.0, 100.0), (300.0, 100.0), (300.0, 300.0), (100.0, 300.0)],
    );
    assert!(h.draw.cancel());
    h.draw.pointer_up();

    assert_eq!(h.host.simplifier_inputs(), 0);
    assert_eq!(h.store.create_calls(), 0);
    assert_eq!(h.draw.size(), 0);
}

#[test]
fn escape_key_cancels_and_other_keys_do_not() {
    let mut h = harness(DrawOptions::default());
    stroke(&mut h.draw, &[(100.0, 100.0), (300.0, 100.0)]);

    h.draw.key_down(KeyCode::from_name("a"));
    assert!(h.draw.is_drawing());

    h.draw.key_down(KeyCode::from_name("Escape"));
    assert!(!h.draw.is_drawing());
    assert_eq!(h.host.simplifier_inputs(), 0);
}

#[test]
fn pointer_leave_commits_like_release() {
    let mut h = harness(DrawOptions::default());
    stroke(
        &mut h.draw,
        &[(100.0, 100.0), (100.0, 100.0), (300.0, 100.0), (200.0, 300.0)],
    );
    let handles = h.draw.pointer_leave();
    assert_eq!(handles.len(), 1);
    assert_eq!(h.draw.size(), 1);
}

#[test]
fn pointer_down_ignored_while_create_disabled() {
    let mut h = harness(DrawOptions::default());
    h.draw.toggle_mode(Mode::CREATE);
    assert!(h.host.dragging.load(Ordering::SeqCst));

    assert!(!h.draw.pointer_down(ScreenPoint::new(10.0, 10.0)));
    h.draw.pointer_move(ScreenPoint::new(50.0, 50.0));
    h.draw.pointer_up();

    assert!(h.renderer.commands().is_empty());
    assert_eq!(h.store.create_calls(), 0);
}

#[test]
fn moves_render_one_segment_each() {
    let mut h = harness(DrawOptions::default());
    stroke(
        &mut h.draw,
        &[(10.0, 10.0), (20.0, 10.0), (20.0, 10.0), (30.0, 40.0)],
    );
    // the repeated sample still draws, but is stored once
    assert_eq!(h.renderer.segment_count(), 3);
    assert_eq!(h.draw.session_len(), Some(2));
}

#[test]
fn maximum_polygons_keeps_one_ring_of_a_bow_tie() {
    let bow_tie = [(300.0, 200.0), (500.0, 400.0), (500.0, 200.0), (300.0, 400.0)];

    let mut unlimited = harness(DrawOptions::default());
    stroke(&mut unlimited.draw, &bow_tie);
    assert_eq!(unlimited.draw.pointer_up().len(), 2);

    let mut limited = harness(DrawOptions {
        maximum_polygons: Some(1),
        ..DrawOptions::default()
    });
    stroke(&mut limited.draw, &bow_tie);
    assert_eq!(limited.draw.pointer_up().len(), 1);
    assert_eq!(limited.draw.size(), 1);
}

#[test]
fn leave_mode_after_create_ends_drawing_mode() {
    let mut h = harness(DrawOptions {
        mode: Mode::CREATE,
        leave_mode_after_create: true,
        ..DrawOptions::default()
    });
    stroke(
        &mut h.draw,
        &[(100.0, 100.0), (100.0, 100.0), (300.0, 100.0), (200.0, 300.0)],
    );
    h.draw.pointer_up();

    assert_eq!(h.draw.mode(), Mode::NONE);
    assert!(h.host.dragging.load(Ordering::SeqCst));
    assert!(!h.draw.pointer_down(ScreenPoint::new(10.0, 10.0)));
}

#[test]
fn options_snapshot_is_taken_at_pointer_down() {
    let mut h = harness(DrawOptions::default());
    stroke(
        &mut h.draw,
        &[(100.0, 100.0), (100.0, 100.0), (300.0, 100.0), (200.0, 300.0)],
    );
    h.draw.set_options(DrawOptions {
        maximum_polygons: Some(0),
        ..DrawOptions::default()
    });
    assert_eq!(h.draw.pointer_up().len(), 1);
}

#[test]
fn viewport_change_mid_gesture_keeps_session_adapter() {
    let triangle = [(100.0, 100.0), (300.0, 100.0), (200.0, 300.0)];
    let panned = Viewport {
        zoom: 8.0,
        center: GeoPoint::new(0.5, 0.5),
        ..Viewport::default()
    };

    let steady_host = Arc::new(StaticMapHost::new(BackendKind::Tile, Viewport::default()));
    let mut steady = FreeDraw::new(steady_host, DrawOptions::default());
    steady.attach();
    stroke(&mut steady, &triangle);
    assert_eq!(steady.pointer_up().len(), 1);

    let moving_host = Arc::new(StaticMapHost::new(BackendKind::Tile, Viewport::default()));
    let mut moving = FreeDraw::new(moving_host.clone(), DrawOptions::default());
    moving.attach();
    stroke(&mut moving, &triangle[..2]);
    moving_host.set_viewport(panned);
    moving.pointer_move(ScreenPoint::from(triangle[2]));
    assert_eq!(moving.pointer_up().len(), 1);
    assert_eq!(moving.all()[0].latlngs, steady.all()[0].latlngs);

    // the next gesture picks up the new viewport
    stroke(&mut moving, &triangle);
    assert_eq!(moving.pointer_up().len(), 1);
    assert_ne!(moving.all()[1].latlngs, steady.all()[0].latlngs);
}
