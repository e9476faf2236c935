//! # mapoverlay
//!
//! Stateful overlay management for a map rendering engine.
//!
//! The crate tracks markers, popups, polygon grid groups, clustered point layers
//! and heatmaps, keyed by namespace, and keeps them in sync with user interaction
//! and the coordinate reference system of the underlying engine. Drawing itself is
//! delegated to a [`RenderEngine`] implementation.

pub mod core;
pub mod data;
pub mod input;
pub mod layers;
pub mod plugins;
pub mod prelude;
pub mod rendering;
pub mod traits;
pub mod ui;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    config::{BaseMapProfile, MapOptions, SessionConfig},
    crs::{geo_transform, point_transform, CoordinateSystem},
    geo::{LngLat, LngLatBounds},
    session::MapSession,
};

pub use crate::layers::{
    base::{Layer, LayerId, LayerKind},
    cluster::{ClusterLayers, ClusterOptions},
    heatmap::{HeatSample, HeatmapLayer, HeatmapOptions},
    key::{EntityKey, TypeLabel},
    marker::{IconState, Marker, MarkerElement, MarkerLayer, MarkerOptions},
    polygon::{PolygonGroup, PolygonOptions},
    registry::Registry,
};

pub use crate::data::{
    geojson::{Feature, FeatureCollection, GeoJson, Geometry},
    records::Detail,
};

pub use crate::input::events::{EventHandled, OverlayEvent};

pub use crate::ui::{icon::IconResolver, popup::Popup};

pub use crate::rendering::{engine::RenderEngine, headless::HeadlessEngine};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, OverlayError>;

/// Common error types
///
/// None of these are fatal to a map session: every overlay operation that fails
/// leaves the registries and the engine as they were.
#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    #[error("entity has no unique id")]
    MissingIdentity,

    #[error("entity has no location")]
    MissingLocation,

    #[error("unsupported coordinate transform: {from} -> {to}")]
    UnsupportedTransform {
        from: CoordinateSystem,
        to: CoordinateSystem,
    },

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error type alias for convenience
pub type Error = OverlayError;

/// Installs `env_logger` as the `log` backend, honouring `RUST_LOG`.
///
/// Safe to call more than once; later calls are ignored.
#[cfg(feature = "debug")]
pub fn init_logging() {
    let _ = env_logger::builder().try_init();
}
