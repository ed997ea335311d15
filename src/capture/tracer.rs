use crate::geo::ScreenPoint;
use crate::render::RenderCommand;

/// Incremental path tracer. Holds the last rendered point so each new
/// sample yields exactly one segment from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathTracer {
    last_rendered: ScreenPoint,
}

impl PathTracer {
    pub fn start(origin: ScreenPoint) -> (Self, RenderCommand) {
        (
            Self {
                last_rendered: origin,
            },
            RenderCommand::Begin { at: origin },
        )
    }

    pub fn advance(&mut self, point: ScreenPoint) -> RenderCommand {
        let from = std::mem::replace(&mut self.last_rendered, point);
        RenderCommand::Segment { from, to: point }
    }

    pub fn last_rendered(&self) -> ScreenPoint {
        self.last_rendered
    }
}
