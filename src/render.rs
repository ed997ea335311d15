use crate::geo::ScreenPoint;
use crate::settings::DrawOptions;
use serde::Serialize;
use std::sync::Mutex;

/// Style of the live trace, taken from the gesture's options snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceStyle {
    pub stroke_width: f64,
    pub fill_color: String,
    pub smooth_factor: f64,
}

impl From<&DrawOptions> for TraceStyle {
    fn from(options: &DrawOptions) -> Self {
        Self {
            stroke_width: options.stroke_width,
            fill_color: options.fill_color.clone(),
            smooth_factor: options.smooth_factor,
        }
    }
}

/// One step of live feedback while a gesture is being drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RenderCommand {
    Begin { at: ScreenPoint },
    Segment { from: ScreenPoint, to: ScreenPoint },
    Clear,
}

/// Live-trace surface on top of the map container.
pub trait Renderer: Send + Sync {
    fn render(&self, command: &RenderCommand, style: &TraceStyle);
}

#[derive(Debug, Default)]
pub struct NoopRenderer;

impl Renderer for NoopRenderer {
    fn render(&self, _command: &RenderCommand, _style: &TraceStyle) {}
}

/// Keeps the issued commands so the trace can be inspected or replayed.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    commands: Mutex<Vec<RenderCommand>>,
}

impl RecordingRenderer {
    pub fn commands(&self) -> Vec<RenderCommand> {
        self.commands.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn segment_count(&self) -> usize {
        self.commands()
            .iter()
            .filter(|c| matches!(c, RenderCommand::Segment { .. }))
            .count()
    }
}

impl Renderer for RecordingRenderer {
    fn render(&self, command: &RenderCommand, _style: &TraceStyle) {
        if let Ok(mut guard) = self.commands.lock() {
            guard.push(*command);
        }
    }
}
