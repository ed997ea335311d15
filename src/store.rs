use crate::geo::{GeoPoint, GeoPolygon};
use crate::settings::DrawOptions;
use serde::Serialize;
use slab::Slab;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Identifier of a committed polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PolygonHandle(pub usize);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredPolygon {
    pub handle: PolygonHandle,
    /// Exterior ring.
    pub latlngs: Vec<GeoPoint>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub holes: Vec<Vec<GeoPoint>>,
    pub merge_polygons: bool,
    pub concave_polygon: bool,
}

/// Owner of committed polygons. Merging, concave hulls and edit handles are
/// the implementation's business; the options are passed through for that.
pub trait PolygonStore: Send + Sync {
    fn create(&self, polygons: Vec<GeoPolygon>, options: &DrawOptions) -> Vec<PolygonHandle>;
    fn remove(&self, handle: PolygonHandle) -> bool;
    fn clear(&self) -> usize;
    fn len(&self) -> usize;
    fn all(&self) -> Vec<StoredPolygon>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Slab-backed store creating one polygon per exterior ring, holes kept with
/// it, until `maximum_polygons` is reached.
#[derive(Debug, Default)]
pub struct MemoryPolygonStore {
    polygons: Mutex<Slab<StoredPolygon>>,
    create_calls: AtomicUsize,
}

impl MemoryPolygonStore {
    /// Number of times `create` was invoked, including calls that added nothing.
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }
}

impl PolygonStore for MemoryPolygonStore {
    fn create(&self, polygons: Vec<GeoPolygon>, options: &DrawOptions) -> Vec<PolygonHandle> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let Ok(mut stored) = self.polygons.lock() else {
            tracing::error!("polygon store lock poisoned");
            return Vec::new();
        };

        let mut created = Vec::new();
        for polygon in polygons {
            if polygon.exterior.len() < 3 {
                continue;
            }
            if options
                .maximum_polygons
                .is_some_and(|max| stored.len() >= max)
            {
                tracing::info!(
                    maximum = options.maximum_polygons,
                    "polygon limit reached; dropping polygon"
                );
                break;
            }
            let entry = stored.vacant_entry();
            let handle = PolygonHandle(entry.key());
            entry.insert(StoredPolygon {
                handle,
                latlngs: polygon.exterior,
                holes: polygon.holes,
                merge_polygons: options.merge_polygons,
                concave_polygon: options.concave_polygon,
            });
            created.push(handle);
        }
        created
    }

    fn remove(&self, handle: PolygonHandle) -> bool {
        match self.polygons.lock() {
            Ok(mut polygons) => polygons.try_remove(handle.0).is_some(),
            Err(_) => false,
        }
    }

    fn clear(&self) -> usize {
        match self.polygons.lock() {
            Ok(mut polygons) => {
                let removed = polygons.len();
                polygons.clear();
                removed
            }
            Err(_) => 0,
        }
    }

    fn len(&self) -> usize {
        self.polygons.lock().map(|p| p.len()).unwrap_or(0)
    }

    fn all(&self) -> Vec<StoredPolygon> {
        self.polygons
            .lock()
            .map(|p| p.iter().map(|(_, polygon)| polygon.clone()).collect())
            .unwrap_or_default()
    }
}
