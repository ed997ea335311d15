use crate::adapter::mercator::{self, WorldPoint};
use crate::adapter::CoordinateAdapter;
use crate::geo::{GeoPoint, ScreenPoint, Viewport};

/// Projected tile map: the host exposes its pixel projection natively, so
/// conversion is the mercator projection at `256 * 2^zoom` offset by the
/// container's pixel origin.
#[derive(Debug, Clone, PartialEq)]
pub struct TileAdapter {
    scale: f64,
    origin: ScreenPoint,
}

impl TileAdapter {
    pub fn new(viewport: &Viewport) -> Self {
        let scale = mercator::zoom_scale(viewport.zoom);
        let centre = mercator::project(viewport.center);
        let origin = ScreenPoint::new(
            centre.x * scale - viewport.width / 2.0,
            centre.y * scale - viewport.height / 2.0,
        );
        Self { scale, origin }
    }
}

impl CoordinateAdapter for TileAdapter {
    fn to_screen(&self, geo: GeoPoint) -> ScreenPoint {
        let world = mercator::project(geo);
        ScreenPoint::new(
            world.x * self.scale - self.origin.x,
            world.y * self.scale - self.origin.y,
        )
    }

    fn to_geo(&self, point: ScreenPoint) -> GeoPoint {
        mercator::unproject(WorldPoint {
            x: (point.x + self.origin.x) / self.scale,
            y: (point.y + self.origin.y) / self.scale,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centre_maps_to_container_middle() {
        let viewport = Viewport::default();
        let adapter = TileAdapter::new(&viewport);
        let centre = adapter.to_screen(viewport.center);
        assert!((centre.x - 400.0).abs() < 1e-6);
        assert!((centre.y - 300.0).abs() < 1e-6);
    }
}
