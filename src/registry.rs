use crate::freedraw::FreeDraw;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Identity of a host map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MapId(pub u64);

/// Drawing layers keyed by the map they are attached to. At most one layer
/// per map.
#[derive(Default)]
pub struct MapRegistry {
    layers: HashMap<MapId, FreeDraw>,
}

impl MapRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches `draw` to `map`. Returns false, leaving the existing layer in
    /// place, when the map already has one.
    pub fn attach(&mut self, map: MapId, mut draw: FreeDraw) -> bool {
        if self.layers.contains_key(&map) {
            tracing::warn!(map = map.0, "map already has a drawing layer");
            return false;
        }
        draw.attach();
        self.layers.insert(map, draw);
        true
    }

    /// Tears down and returns the layer attached to `map`.
    pub fn detach(&mut self, map: MapId) -> Option<FreeDraw> {
        let mut draw = self.layers.remove(&map)?;
        draw.detach();
        Some(draw)
    }

    pub fn get(&self, map: MapId) -> Option<&FreeDraw> {
        self.layers.get(&map)
    }

    pub fn get_mut(&mut self, map: MapId) -> Option<&mut FreeDraw> {
        self.layers.get_mut(&map)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}
