//! Recorded pointer traces fed through a headless drawing layer.

use crate::capture::KeyCode;
use crate::events::{DrawEvent, RecordingSink};
use crate::freedraw::FreeDraw;
use crate::geo::ScreenPoint;
use crate::host::StaticMapHost;
use crate::mode::Mode;
use crate::render::{RecordingRenderer, RenderCommand};
use crate::settings::Settings;
use crate::store::{MemoryPolygonStore, StoredPolygon};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

pub const TRACE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TraceEvent {
    Down { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up,
    Leave,
    Key { key: String },
    SetMode { mode: Mode },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub version: u32,
    #[serde(default)]
    pub events: Vec<TraceEvent>,
}

pub fn load_trace(path: &Path) -> anyhow::Result<Trace> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading trace {}", path.display()))?;
    let trace: Trace = serde_json::from_str(&content)
        .with_context(|| format!("parsing trace {}", path.display()))?;
    if trace.version != TRACE_VERSION {
        bail!(
            "unsupported trace version {} (expected {TRACE_VERSION})",
            trace.version
        );
    }
    Ok(trace)
}

/// Everything observable after a replay.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayReport {
    pub mode: Mode,
    pub polygons: Vec<StoredPolygon>,
    pub events: Vec<DrawEvent>,
    pub render: Vec<RenderCommand>,
}

pub fn replay(settings: &Settings, trace: &Trace) -> ReplayReport {
    let host = Arc::new(StaticMapHost::new(settings.backend, settings.viewport));
    let renderer = Arc::new(RecordingRenderer::default());
    let store = Arc::new(MemoryPolygonStore::default());
    let sink = Arc::new(RecordingSink::default());
    let mut draw = FreeDraw::new_with_collaborators(
        host,
        renderer.clone(),
        store,
        sink.clone(),
        settings.options.clone(),
    );
    draw.attach();

    for event in &trace.events {
        match event {
            TraceEvent::Down { x, y } => {
                if !draw.pointer_down(ScreenPoint::new(*x, *y)) {
                    tracing::debug!(x, y, "pointer down ignored");
                }
            }
            TraceEvent::Move { x, y } => draw.pointer_move(ScreenPoint::new(*x, *y)),
            TraceEvent::Up => {
                draw.pointer_up();
            }
            TraceEvent::Leave => {
                draw.pointer_leave();
            }
            TraceEvent::Key { key } => draw.key_down(KeyCode::from_name(key)),
            TraceEvent::SetMode { mode } => {
                draw.set_mode(*mode);
            }
        }
    }

    let report = ReplayReport {
        mode: draw.mode(),
        polygons: draw.all(),
        events: sink.events(),
        render: renderer.commands(),
    };
    tracing::info!(
        events = trace.events.len(),
        polygons = report.polygons.len(),
        "replay finished"
    );
    report
}
