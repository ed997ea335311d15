pub mod adapter;
pub mod capture;
pub mod events;
pub mod freedraw;
pub mod geo;
pub mod host;
pub mod logging;
pub mod mode;
pub mod registry;
pub mod render;
pub mod replay;
pub mod settings;
pub mod simplify;
pub mod store;

pub use adapter::{adapter_for, BackendKind, CoordinateAdapter};
pub use capture::KeyCode;
pub use events::{DrawEvent, EventSink, MarkersKind};
pub use freedraw::FreeDraw;
pub use geo::{GeoBounds, GeoPoint, GeoPolygon, ScreenPoint, Viewport};
pub use host::{MapHost, StaticMapHost};
pub use mode::{Mode, ModeRegister};
pub use registry::{MapId, MapRegistry};
pub use render::{RenderCommand, Renderer, TraceStyle};
pub use settings::{DrawOptions, Settings};
pub use store::{MemoryPolygonStore, PolygonHandle, PolygonStore, StoredPolygon};
