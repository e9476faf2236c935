//! Prelude module for common mapoverlay types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use mapoverlay::prelude::*;`

pub use crate::core::{
    config::{BaseMapProfile, MapOptions, SessionConfig},
    crs::{geo_transform, point_transform, CoordinateSystem},
    geo::{LngLat, LngLatBounds},
    session::MapSession,
};

pub use crate::layers::{
    base::{Layer, LayerId, LayerKind, LayerSource, Shape, SizeEncoding},
    cluster::{ClusterLayers, ClusterOptions},
    heatmap::{HeatSample, HeatmapLayer, HeatmapOptions},
    key::{EntityKey, RegistryKey, TypeLabel},
    marker::{IconState, Marker, MarkerElement, MarkerLayer, MarkerOptions},
    polygon::{PolygonClick, PolygonGroup, PolygonOptions},
    registry::Registry,
};

pub use crate::data::{
    geojson::{Feature, FeatureCollection, GeoJson, Geometry, Properties},
    records::Detail,
};

pub use crate::input::events::{ClickHandler, EventHandled, OverlayEvent};

pub use crate::plugins::draw::{ControlId, DrawerId};

pub use crate::rendering::{engine::RenderEngine, headless::HeadlessEngine};

pub use crate::traits::{CoordinateTransform, EngineResource};

pub use crate::ui::{
    icon::{IconResolver, PathIconResolver},
    popup::{Popup, PopupOptions},
};

pub use crate::{Error as OverlayError, Result};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
