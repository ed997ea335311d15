//! Turns a raw sampled point set into clean polygons.

mod clean;
mod nonzero;

pub use clean::clean_ring;
pub use nonzero::{resolve_nonzero, PathPolygon};

use crate::adapter::CoordinateAdapter;
use crate::geo::{GeoPoint, GeoPolygon, ScreenPoint};
use crate::settings::DrawOptions;

/// Screen pixels are multiplied by this before rounding to integers.
pub const PATH_SCALE: f64 = 1000.0;

/// Integer point in the clipping domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PathPoint {
    pub x: i64,
    pub y: i64,
}

impl PathPoint {
    pub fn from_screen(point: ScreenPoint) -> Self {
        Self {
            x: (point.x * PATH_SCALE).round() as i64,
            y: (point.y * PATH_SCALE).round() as i64,
        }
    }

    pub fn to_screen(self) -> ScreenPoint {
        ScreenPoint::new(self.x as f64 / PATH_SCALE, self.y as f64 / PATH_SCALE)
    }
}

/// Cleans and untangles the ring described by `points`, in order.
///
/// `options.simplify_factor` is the minimum vertex spacing in screen pixels.
/// The result holds zero or more polygons, largest exterior first, each with
/// the holes the non-zero rule leaves inside it. Fewer than two input points
/// or a degenerate shape yield none.
pub fn simplify<'a, I>(
    adapter: &dyn CoordinateAdapter,
    points: I,
    options: &DrawOptions,
) -> Vec<GeoPolygon>
where
    I: IntoIterator<Item = &'a GeoPoint>,
{
    let path: Vec<PathPoint> = points
        .into_iter()
        .map(|geo| PathPoint::from_screen(adapter.to_screen(*geo)))
        .collect();
    if path.len() < 2 {
        tracing::debug!(points = path.len(), "too few points to simplify");
        return Vec::new();
    }

    let cleaned = clean_ring(&path, options.simplify_factor * PATH_SCALE);
    if cleaned.is_empty() {
        tracing::debug!(points = path.len(), "ring collapsed during clean pass");
        return Vec::new();
    }

    let polygons = resolve_nonzero(&cleaned);
    tracing::debug!(
        input = path.len(),
        cleaned = cleaned.len(),
        polygons = polygons.len(),
        holes = polygons.iter().map(|p| p.holes.len()).sum::<usize>(),
        "simplified freehand ring"
    );

    let to_geo = |ring: Vec<PathPoint>| -> Vec<GeoPoint> {
        ring.into_iter()
            .map(|p| adapter.to_geo(p.to_screen()))
            .collect()
    };
    polygons
        .into_iter()
        .map(|polygon| GeoPolygon {
            exterior: to_geo(polygon.exterior),
            holes: polygon.holes.into_iter().map(&to_geo).collect(),
        })
        .collect()
}
