pub mod base;
pub mod cluster;
pub mod heatmap;
pub mod key;
pub mod marker;
pub mod polygon;
pub mod registry;

pub use base::{IdAllocator, Layer, LayerId, LayerKind, LayerSource, ScaleKind, Shape, SizeEncoding};
pub use cluster::{ClusterLayers, ClusterOptions};
pub use heatmap::{HeatSample, HeatmapLayer, HeatmapOptions};
pub use key::{EntityKey, RegistryKey, TypeLabel};
pub use marker::{Icon, IconState, Marker, MarkerElement, MarkerLayer, MarkerOptions};
pub use polygon::{PolygonClick, PolygonGroup, PolygonOptions};
pub use registry::Registry;
