use crate::adapter::mercator::{self, WorldPoint, WORLD_SIZE};
use crate::adapter::CoordinateAdapter;
use crate::geo::{GeoBounds, GeoPoint, ScreenPoint, Viewport};

/// Vector/satellite map without a public pixel API.
///
/// Only the visible bounds and zoom are known, so container pixels are
/// derived from the world coordinates of the north-east and south-west
/// corners: `x` is measured from the south-west edge, `y` from the
/// north-east edge, both scaled by `2^zoom`.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorAdapter {
    scale: f64,
    north_east: WorldPoint,
    south_west: WorldPoint,
    wraps: bool,
}

impl VectorAdapter {
    pub fn new(bounds: GeoBounds, zoom: f64) -> Self {
        let north_east = mercator::project(bounds.north_east);
        let south_west = mercator::project(bounds.south_west);
        Self {
            scale: mercator::zoom_scale(zoom),
            north_east,
            south_west,
            // viewport straddles the antimeridian
            wraps: south_west.x > north_east.x,
        }
    }

    /// Builds the adapter from the bounds a host would report for `viewport`.
    pub fn from_viewport(viewport: &Viewport) -> Self {
        Self::new(visible_bounds(viewport), viewport.zoom)
    }
}

impl CoordinateAdapter for VectorAdapter {
    fn to_screen(&self, geo: GeoPoint) -> ScreenPoint {
        let world = mercator::project(geo);
        let mut dx = world.x - self.south_west.x;
        if self.wraps && dx < 0.0 {
            dx += WORLD_SIZE;
        }
        ScreenPoint::new(dx * self.scale, (world.y - self.north_east.y) * self.scale)
    }

    fn to_geo(&self, point: ScreenPoint) -> GeoPoint {
        let world = WorldPoint {
            x: point.x / self.scale + self.south_west.x,
            y: point.y / self.scale + self.north_east.y,
        };
        let geo = mercator::unproject(world);
        if self.wraps && geo.lng >= 180.0 {
            GeoPoint::new(geo.lat, geo.lng - 360.0)
        } else {
            geo
        }
    }
}

/// Geographic bounds of the container for a centre/zoom/size viewport.
pub fn visible_bounds(viewport: &Viewport) -> GeoBounds {
    let scale = mercator::zoom_scale(viewport.zoom);
    let centre = mercator::project(viewport.center);
    let half_w = viewport.width / 2.0 / scale;
    let half_h = viewport.height / 2.0 / scale;
    GeoBounds {
        south_west: mercator::unproject(WorldPoint {
            x: centre.x - half_w,
            y: centre.y + half_h,
        }),
        north_east: mercator::unproject(WorldPoint {
            x: centre.x + half_w,
            y: centre.y - half_h,
        }),
    }
}
