use crate::geo::GeoPoint;
use crate::mode::Mode;
use serde::Serialize;
use std::sync::Mutex;

/// Why the committed polygon set changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkersKind {
    Create,
    Remove,
    Clear,
}

/// Notifications emitted towards the outer integration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DrawEvent {
    Mode {
        mode: Mode,
    },
    Markers {
        kind: MarkersKind,
        latlngs: Vec<Vec<GeoPoint>>,
        polygon_count: usize,
    },
}

pub trait EventSink: Send + Sync {
    fn dispatch(&self, event: DrawEvent);
}

#[derive(Debug, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn dispatch(&self, _event: DrawEvent) {}
}

/// Keeps every dispatched event; used by the replay tool and tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<DrawEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<DrawEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn markers(&self) -> Vec<DrawEvent> {
        self.events()
            .into_iter()
            .filter(|event| matches!(event, DrawEvent::Markers { .. }))
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn dispatch(&self, event: DrawEvent) {
        if let Ok(mut guard) = self.events.lock() {
            guard.push(event);
        }
    }
}
