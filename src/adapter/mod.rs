pub mod mercator;
pub mod tile;
pub mod vector;

pub use tile::TileAdapter;
pub use vector::{visible_bounds, VectorAdapter};

use crate::geo::{GeoPoint, ScreenPoint, Viewport};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Conversion between geographic coordinates and container pixels for the
/// currently rendered viewport.
///
/// Both directions must agree within a pixel for points inside the
/// viewport. Points outside it are extrapolated, never rejected.
pub trait CoordinateAdapter: Send + Sync {
    fn to_screen(&self, geo: GeoPoint) -> ScreenPoint;
    fn to_geo(&self, point: ScreenPoint) -> GeoPoint;
}

impl<T: CoordinateAdapter + ?Sized> CoordinateAdapter for Arc<T> {
    fn to_screen(&self, geo: GeoPoint) -> ScreenPoint {
        (**self).to_screen(geo)
    }

    fn to_geo(&self, point: ScreenPoint) -> GeoPoint {
        (**self).to_geo(point)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Projected tile map with a native pixel projection.
    #[default]
    Tile,
    /// Vector map where pixels are derived from the visible bounds.
    Vector,
}

pub fn adapter_for(kind: BackendKind, viewport: &Viewport) -> Arc<dyn CoordinateAdapter> {
    match kind {
        BackendKind::Tile => Arc::new(TileAdapter::new(viewport)),
        BackendKind::Vector => Arc::new(VectorAdapter::from_viewport(viewport)),
    }
}
