use crate::adapter::{adapter_for, BackendKind, CoordinateAdapter};
use crate::geo::Viewport;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Capabilities the drawing layer needs from the host map.
pub trait MapHost: Send + Sync {
    /// Adapter for the viewport as currently rendered.
    fn coordinate_adapter(&self) -> Arc<dyn CoordinateAdapter>;
    fn set_dragging(&self, enabled: bool);
    fn set_container_class(&self, class: &str, enabled: bool);
}

/// Host with a fixed backend whose viewport is moved explicitly.
pub struct StaticMapHost {
    backend: BackendKind,
    adapter: Mutex<Arc<dyn CoordinateAdapter>>,
    dragging: AtomicBool,
    classes: Mutex<BTreeSet<String>>,
}

impl StaticMapHost {
    pub fn new(backend: BackendKind, viewport: Viewport) -> Self {
        Self {
            backend,
            adapter: Mutex::new(adapter_for(backend, &viewport)),
            dragging: AtomicBool::new(true),
            classes: Mutex::new(BTreeSet::new()),
        }
    }

    pub fn set_viewport(&self, viewport: Viewport) {
        if let Ok(mut adapter) = self.adapter.lock() {
            *adapter = adapter_for(self.backend, &viewport);
        }
    }

    pub fn dragging(&self) -> bool {
        self.dragging.load(Ordering::SeqCst)
    }

    pub fn classes(&self) -> Vec<String> {
        self.classes
            .lock()
            .map(|c| c.iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl MapHost for StaticMapHost {
    fn coordinate_adapter(&self) -> Arc<dyn CoordinateAdapter> {
        match self.adapter.lock() {
            Ok(adapter) => Arc::clone(&adapter),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    fn set_dragging(&self, enabled: bool) {
        self.dragging.store(enabled, Ordering::SeqCst);
    }

    fn set_container_class(&self, class: &str, enabled: bool) {
        if let Ok(mut classes) = self.classes.lock() {
            if enabled {
                classes.insert(class.to_string());
            } else {
                classes.remove(class);
            }
        }
    }
}
