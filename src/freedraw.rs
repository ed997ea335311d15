use crate::capture::{CaptureState, KeyCode, Session, SessionEnd};
use crate::events::{DrawEvent, EventSink, MarkersKind, NoopSink};
use crate::geo::{GeoPoint, GeoPolygon, ScreenPoint};
use crate::host::MapHost;
use crate::mode::{Mode, ModeRegister};
use crate::render::{NoopRenderer, RenderCommand, Renderer};
use crate::settings::DrawOptions;
use crate::simplify::simplify;
use crate::store::{MemoryPolygonStore, PolygonHandle, PolygonStore, StoredPolygon};
use std::sync::Arc;

/// Freehand drawing layer bound to one map.
///
/// Pointer and key events are fed in by the host in arrival order; all work
/// happens synchronously inside those calls.
pub struct FreeDraw {
    options: DrawOptions,
    modes: ModeRegister,
    capture: CaptureState,
    host: Arc<dyn MapHost>,
    renderer: Arc<dyn Renderer>,
    store: Arc<dyn PolygonStore>,
    sink: Arc<dyn EventSink>,
    attached: bool,
}

impl FreeDraw {
    pub fn new(host: Arc<dyn MapHost>, options: DrawOptions) -> Self {
        Self::new_with_collaborators(
            host,
            Arc::new(NoopRenderer),
            Arc::new(MemoryPolygonStore::default()),
            Arc::new(NoopSink),
            options,
        )
    }

    pub fn new_with_collaborators(
        host: Arc<dyn MapHost>,
        renderer: Arc<dyn Renderer>,
        store: Arc<dyn PolygonStore>,
        sink: Arc<dyn EventSink>,
        options: DrawOptions,
    ) -> Self {
        Self {
            modes: ModeRegister::new(options.mode, Arc::clone(&sink)),
            options,
            capture: CaptureState::Idle,
            host,
            renderer,
            store,
            sink,
            attached: false,
        }
    }

    /// Starts handling events and applies the configured starting mode.
    pub fn attach(&mut self) {
        if self.attached {
            return;
        }
        self.attached = true;
        self.set_mode(self.options.mode);
        tracing::debug!(mode = %self.mode(), "freedraw attached");
    }

    /// Cancels any gesture in progress and restores the host map.
    pub fn detach(&mut self) {
        if !self.attached {
            return;
        }
        self.cancel();
        for (class, _) in Mode::ALL.class_names() {
            self.host.set_container_class(&class, false);
        }
        self.host.set_dragging(true);
        self.attached = false;
        tracing::debug!("freedraw detached");
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn options(&self) -> &DrawOptions {
        &self.options
    }

    /// Replaces the options used by gestures started from now on.
    pub fn set_options(&mut self, options: DrawOptions) {
        self.options = options;
    }

    pub fn mode(&self) -> Mode {
        self.modes.get()
    }

    pub fn set_mode(&mut self, mode: Mode) -> Mode {
        let mode = self.modes.set(mode);
        self.sync_host();
        mode
    }

    pub fn toggle_mode(&mut self, mode: Mode) -> Mode {
        let mode = self.modes.toggle(mode);
        self.sync_host();
        mode
    }

    pub fn set_only_mode(&mut self, mode: Mode) -> Mode {
        let mode = self.modes.set_only(mode);
        self.sync_host();
        mode
    }

    pub fn is_mode_disabled(&self, mode: Mode) -> bool {
        self.modes.is_disabled(mode)
    }

    fn sync_host(&self) {
        let mode = self.modes.get();
        self.host.set_dragging(!mode.intersects(Mode::CREATE));
        for (class, enabled) in mode.class_names() {
            self.host.set_container_class(&class, enabled);
        }
    }

    pub fn is_drawing(&self) -> bool {
        self.capture.is_active()
    }

    /// Number of distinct points sampled by the active gesture.
    pub fn session_len(&self) -> Option<usize> {
        self.capture.session().map(Session::len)
    }

    /// Starts a gesture when CREATE is enabled. Returns whether one started.
    pub fn pointer_down(&mut self, at: ScreenPoint) -> bool {
        if !self.attached || self.modes.is_disabled(Mode::CREATE) {
            return false;
        }
        if self.capture.is_active() {
            tracing::debug!("pointer down during active gesture; discarding stale gesture");
            self.end_session(SessionEnd::Cancel);
        }

        let (session, command) =
            Session::begin(at, self.options.clone(), self.host.coordinate_adapter());
        self.renderer.render(&command, session.style());
        self.capture = CaptureState::Active(session);
        tracing::debug!(x = at.x, y = at.y, "freehand gesture started");
        true
    }

    pub fn pointer_move(&mut self, at: ScreenPoint) {
        let Some(session) = self.capture.session_mut() else {
            return;
        };
        let command = session.sample(at);
        self.renderer.render(&command, session.style());
    }

    pub fn pointer_up(&mut self) -> Vec<PolygonHandle> {
        self.end_session(SessionEnd::Commit)
    }

    /// The pointer left the page; the gesture commits like a release.
    pub fn pointer_leave(&mut self) -> Vec<PolygonHandle> {
        self.end_session(SessionEnd::Commit)
    }

    pub fn key_down(&mut self, key: KeyCode) {
        if key == KeyCode::Escape {
            self.cancel();
        }
    }

    /// Discards the gesture in progress. Returns false when none was active.
    pub fn cancel(&mut self) -> bool {
        if !self.capture.is_active() {
            return false;
        }
        self.end_session(SessionEnd::Cancel);
        true
    }

    fn end_session(&mut self, end: SessionEnd) -> Vec<PolygonHandle> {
        let Some(session) = self.capture.take() else {
            return Vec::new();
        };
        self.renderer.render(&RenderCommand::Clear, session.style());

        if end == SessionEnd::Cancel {
            tracing::debug!(points = session.len(), "freehand gesture cancelled");
            return Vec::new();
        }

        let handles = if session.is_empty() {
            tracing::debug!("freehand gesture ended without samples");
            Vec::new()
        } else {
            let polygons = simplify(
                session.adapter().as_ref(),
                session.points(),
                session.options(),
            );
            self.commit_polygons(polygons, session.options())
        };

        if session.options().leave_mode_after_create && !self.modes.is_disabled(Mode::CREATE) {
            self.toggle_mode(Mode::CREATE);
        }
        handles
    }

    fn commit_polygons(
        &mut self,
        polygons: Vec<GeoPolygon>,
        options: &DrawOptions,
    ) -> Vec<PolygonHandle> {
        if polygons.is_empty() {
            return Vec::new();
        }
        let handles = self.store.create(polygons, options);
        if !handles.is_empty() {
            tracing::info!(created = handles.len(), total = self.store.len(), "polygons created");
            self.notify_markers(MarkersKind::Create);
        }
        handles
    }

    /// Creates polygons from `points` without a gesture. Concave-hull
    /// processing is off unless requested through [`FreeDraw::create_with`].
    pub fn create(&mut self, points: &[GeoPoint]) -> Vec<PolygonHandle> {
        let options = DrawOptions {
            concave_polygon: false,
            ..self.options.clone()
        };
        self.create_with(points, &options)
    }

    pub fn create_with(
        &mut self,
        points: &[GeoPoint],
        options: &DrawOptions,
    ) -> Vec<PolygonHandle> {
        let adapter = self.host.coordinate_adapter();
        let polygons = simplify(adapter.as_ref(), points, options);
        self.commit_polygons(polygons, options)
    }

    pub fn size(&self) -> usize {
        self.store.len()
    }

    pub fn all(&self) -> Vec<StoredPolygon> {
        self.store.all()
    }

    pub fn remove(&mut self, handle: PolygonHandle) -> bool {
        let removed = self.store.remove(handle);
        if removed {
            self.notify_markers(MarkersKind::Remove);
        }
        removed
    }

    pub fn clear(&mut self) -> usize {
        let removed = self.store.clear();
        if removed > 0 {
            self.notify_markers(MarkersKind::Clear);
        }
        removed
    }

    fn notify_markers(&self, kind: MarkersKind) {
        let latlngs: Vec<Vec<GeoPoint>> = self
            .store
            .all()
            .into_iter()
            .map(|polygon| polygon.latlngs)
            .collect();
        let polygon_count = latlngs.len();
        self.sink.dispatch(DrawEvent::Markers {
            kind,
            latlngs,
            polygon_count,
        });
    }
}

impl Drop for FreeDraw {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::BackendKind;
    use crate::events::RecordingSink;
    use crate::geo::Viewport;
    use crate::host::StaticMapHost;
    use crate::render::RecordingRenderer;

    struct Fixture {
        host: Arc<StaticMapHost>,
        renderer: Arc<RecordingRenderer>,
        store: Arc<MemoryPolygonStore>,
        sink: Arc<RecordingSink>,
        draw: FreeDraw,
    }

    fn fixture(options: DrawOptions) -> Fixture {
        let host = Arc::new(StaticMapHost::new(BackendKind::Tile, Viewport::default()));
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
        Fixture {
            host,
            renderer,
            store,
            sink,
            draw,
        }
    }

    fn drag_triangle(draw: &mut FreeDraw) {
        draw.pointer_down(ScreenPoint::new(100.0, 100.0));
        draw.pointer_move(ScreenPoint::new(100.0, 100.0));
        draw.pointer_move(ScreenPoint::new(300.0, 100.0));
        draw.pointer_move(ScreenPoint::new(200.0, 300.0));
    }

    #[test]
    fn pointer_down_ignored_without_create() {
        let mut fx = fixture(DrawOptions {
            mode: Mode::EDIT,
            ..DrawOptions::default()
        });
        assert!(!fx.draw.pointer_down(ScreenPoint::new(10.0, 10.0)));
        assert!(!fx.draw.is_drawing());
        assert!(fx.renderer.commands().is_empty());
    }

    #[test]
    fn create_mode_disables_dragging_and_sets_classes() {
        let mut fx = fixture(DrawOptions::default());
        assert!(!fx.host.dragging());
        assert!(fx.host.classes().contains(&"mode-create".to_string()));

        fx.draw.set_only_mode(Mode::EDIT);
        assert!(fx.host.dragging());
        assert_eq!(fx.host.classes(), vec!["mode-edit".to_string()]);
    }

    #[test]
    fn commit_clears_trace_and_creates_polygon() {
        let mut fx = fixture(DrawOptions::default());
        drag_triangle(&mut fx.draw);
        let handles = fx.draw.pointer_up();

        assert_eq!(handles.len(), 1);
        assert_eq!(fx.draw.size(), 1);
        assert_eq!(fx.renderer.segment_count(), 3);
        assert_eq!(fx.renderer.commands().last(), Some(&RenderCommand::Clear));
        assert!(!fx.draw.is_drawing());
    }

    #[test]
    fn leave_mode_after_create_turns_create_off() {
        let mut fx = fixture(DrawOptions {
            leave_mode_after_create: true,
            ..DrawOptions::default()
        });
        drag_triangle(&mut fx.draw);
        fx.draw.pointer_up();

        assert!(fx.draw.is_mode_disabled(Mode::CREATE));
        assert_eq!(fx.draw.mode(), Mode::EDIT | Mode::DELETE | Mode::APPEND);
        assert!(fx.host.dragging());
        assert!(matches!(
            fx.sink.events().last(),
            Some(DrawEvent::Mode { mode }) if !mode.intersects(Mode::CREATE)
        ));
    }

    #[test]
    fn escape_cancels_without_store_call() {
        let mut fx = fixture(DrawOptions::default());
        drag_triangle(&mut fx.draw);
        fx.draw.key_down(KeyCode::Escape);

        assert!(!fx.draw.is_drawing());
        assert_eq!(fx.store.create_calls(), 0);
        assert!(fx.sink.markers().is_empty());
        assert!(!fx.draw.cancel());
    }

    #[test]
    fn second_pointer_down_replaces_stale_gesture() {
        let mut fx = fixture(DrawOptions::default());
        drag_triangle(&mut fx.draw);
        assert!(fx.draw.pointer_down(ScreenPoint::new(5.0, 5.0)));
        assert_eq!(fx.draw.session_len(), Some(0));
        assert_eq!(fx.store.create_calls(), 0);
    }

    #[test]
    fn direct_create_turns_concave_off() {
        let mut fx = fixture(DrawOptions::default());
        let handles = fx.draw.create(&[
            GeoPoint::new(51.50, -0.10),
            GeoPoint::new(51.51, -0.08),
            GeoPoint::new(51.49, -0.07),
        ]);
        assert_eq!(handles.len(), 1);
        assert!(!fx.draw.all()[0].concave_polygon);
    }

    #[test]
    fn remove_and_clear_notify_markers() {
        let mut fx = fixture(DrawOptions::default());
        drag_triangle(&mut fx.draw);
        let handles = fx.draw.pointer_up();
        drag_triangle(&mut fx.draw);
        fx.draw.pointer_up();

        assert!(fx.draw.remove(handles[0]));
        assert_eq!(fx.draw.clear(), 1);
        let kinds: Vec<MarkersKind> = fx
            .sink
            .markers()
            .into_iter()
            .filter_map(|event| match event {
                DrawEvent::Markers { kind, .. } => Some(kind),
                DrawEvent::Mode { .. } => None,
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                MarkersKind::Create,
                MarkersKind::Create,
                MarkersKind::Remove,
                MarkersKind::Clear
            ]
        );
    }

    #[test]
    fn detach_restores_host() {
        let mut fx = fixture(DrawOptions::default());
        drag_triangle(&mut fx.draw);
        fx.draw.detach();

        assert!(fx.host.dragging());
        assert!(fx.host.classes().is_empty());
        assert!(!fx.draw.is_drawing());
        assert!(!fx.draw.pointer_down(ScreenPoint::new(1.0, 1.0)));
    }
}
