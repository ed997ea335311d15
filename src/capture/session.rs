use crate::adapter::CoordinateAdapter;
use crate::capture::tracer::PathTracer;
use crate::geo::{GeoPoint, ScreenPoint};
use crate::render::{RenderCommand, TraceStyle};
use crate::settings::DrawOptions;
use hashlink::LinkedHashSet;
use std::sync::Arc;

/// One freehand drag, from a qualifying pointer-down to commit or cancel.
///
/// The options and adapter are snapshots taken when the drag began.
pub struct Session {
    options: DrawOptions,
    style: TraceStyle,
    adapter: Arc<dyn CoordinateAdapter>,
    points: LinkedHashSet<GeoPoint>,
    tracer: PathTracer,
}

impl Session {
    pub fn begin(
        origin: ScreenPoint,
        options: DrawOptions,
        adapter: Arc<dyn CoordinateAdapter>,
    ) -> (Self, RenderCommand) {
        let (tracer, command) = PathTracer::start(origin);
        let style = TraceStyle::from(&options);
        (
            Self {
                options,
                style,
                adapter,
                points: LinkedHashSet::new(),
                tracer,
            },
            command,
        )
    }

    /// Records a pointer sample and returns the segment to draw for it.
    pub fn sample(&mut self, point: ScreenPoint) -> RenderCommand {
        let geo = self.adapter.to_geo(point);
        // repeated samples collapse; insertion order of the first one is kept
        if !self.points.contains(&geo) {
            self.points.insert(geo);
        }
        self.tracer.advance(point)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = &GeoPoint> {
        self.points.iter()
    }

    pub fn options(&self) -> &DrawOptions {
        &self.options
    }

    pub fn style(&self) -> &TraceStyle {
        &self.style
    }

    pub fn adapter(&self) -> &Arc<dyn CoordinateAdapter> {
        &self.adapter
    }

    pub fn last_rendered(&self) -> ScreenPoint {
        self.tracer.last_rendered()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::TileAdapter;
    use crate::geo::Viewport;

    fn session() -> Session {
        let adapter: Arc<dyn CoordinateAdapter> = Arc::new(TileAdapter::new(&Viewport::default()));
        Session::begin(ScreenPoint::new(10.0, 10.0), DrawOptions::default(), adapter).0
    }

    #[test]
    fn duplicate_samples_collapse() {
        let mut session = session();
        session.sample(ScreenPoint::new(20.0, 20.0));
        session.sample(ScreenPoint::new(30.0, 20.0));
        session.sample(ScreenPoint::new(20.0, 20.0));
        assert_eq!(session.len(), 2);
    }

    #[test]
    fn down_point_is_not_sampled() {
        let session = session();
        assert!(session.is_empty());
        assert_eq!(session.last_rendered(), ScreenPoint::new(10.0, 10.0));
    }

    #[test]
    fn duplicate_sample_still_renders_segment() {
        let mut session = session();
        session.sample(ScreenPoint::new(20.0, 20.0));
        let command = session.sample(ScreenPoint::new(20.0, 20.0));
        assert!(matches!(command, RenderCommand::Segment { .. }));
    }
}
