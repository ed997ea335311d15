//! Spherical mercator projection into a 256-unit square world.

use crate::geo::GeoPoint;
use std::f64::consts::PI;

pub const WORLD_SIZE: f64 = 256.0;
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_6;

/// World coordinate: `x` grows east, `y` grows south, both in `0..WORLD_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
}

pub fn project(geo: GeoPoint) -> WorldPoint {
    let lat = geo.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = WORLD_SIZE * (geo.lng + 180.0) / 360.0;
    let psi = (0.5 * (PI * 0.5 + lat)).tan().ln();
    let y = WORLD_SIZE * (0.5 - psi / (2.0 * PI));
    WorldPoint { x, y }
}

pub fn unproject(world: WorldPoint) -> GeoPoint {
    let lng = world.x / WORLD_SIZE * 360.0 - 180.0;
    let psi = PI - 2.0 * PI * world.y / WORLD_SIZE;
    let lat = psi.sinh().atan().to_degrees();
    GeoPoint::new(lat, lng)
}

/// Pixels per world unit at `zoom`.
pub fn zoom_scale(zoom: f64) -> f64 {
    2f64.powf(zoom)
}
