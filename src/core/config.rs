//! Session configuration
//!
//! A session is configured with the coordinate system its callers speak, the one
//! the engine draws in, and a base map profile. Profiles resolve to concrete
//! [`MapOptions`] presets that are handed to the engine when the map is created.

use crate::{
    core::{
        constants::{DEFAULT_CENTER, MAX_ZOOM, MIN_ZOOM, TILE_SIZE},
        crs::CoordinateSystem,
        geo::LngLat,
    },
    Result,
};
use serde::{Deserialize, Serialize};

/// Base map the engine should draw under the overlays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BaseMapProfile {
    /// Raster tiles from a `{z}/{x}/{y}` template
    Tile { url: String },
    /// An engine-provided vector style
    Vector {
        style: String,
        #[serde(default)]
        token: Option<String>,
    },
}

impl BaseMapProfile {
    pub fn resolve(&self, center: LngLat) -> MapOptions {
        match self {
            Self::Tile { url } => MapOptions {
                zoom: 10.0,
                min_zoom: MIN_ZOOM,
                max_zoom: MAX_ZOOM,
                pitch: 0.0,
                rotation: 0.0,
                style: Some("blank".to_string()),
                token: None,
                center,
                base_tiles: Some(url.clone()),
                tile_size: TILE_SIZE,
            },
            Self::Vector { style, token } => MapOptions {
                zoom: 12.0,
                min_zoom: MIN_ZOOM,
                max_zoom: MAX_ZOOM,
                pitch: 45.0,
                rotation: 0.0,
                style: Some(style.clone()),
                token: token.clone(),
                center,
                base_tiles: None,
                tile_size: TILE_SIZE,
            },
        }
    }

    pub fn is_tiled(&self) -> bool {
        matches!(self, Self::Tile { .. })
    }
}

impl Default for BaseMapProfile {
    fn default() -> Self {
        Self::Tile {
            url: "https://webrd01.is.autonavi.com/appmaptile?lang=zh_cn&size=1&scale=1&style=8&x={x}&y={y}&z={z}"
                .to_string(),
        }
    }
}

/// Everything the engine needs to create the scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapOptions {
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub pitch: f64,
    pub rotation: f64,
    pub style: Option<String>,
    pub token: Option<String>,
    /// Initial center in the engine's coordinate system
    pub center: LngLat,
    /// Raster tile template of the base layer, if any
    pub base_tiles: Option<String>,
    pub tile_size: u32,
}

impl Default for MapOptions {
    fn default() -> Self {
        BaseMapProfile::default().resolve(LngLat::new(DEFAULT_CENTER.0, DEFAULT_CENTER.1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    /// System caller coordinates are expressed in
    pub source_crs: CoordinateSystem,
    /// System the engine draws in
    pub target_crs: CoordinateSystem,
    /// Initial center in the source system
    pub center: LngLat,
    pub base_map: BaseMapProfile,
    /// Directory marker icons are served from
    pub icon_base: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            source_crs: CoordinateSystem::WGS84,
            target_crs: CoordinateSystem::GCJ02,
            center: LngLat::new(DEFAULT_CENTER.0, DEFAULT_CENTER.1),
            base_map: BaseMapProfile::default(),
            icon_base: "/icons".to_string(),
        }
    }
}

impl SessionConfig {
    /// Same source and target system: coordinates pass through untouched
    pub fn identity(crs: CoordinateSystem) -> Self {
        Self {
            source_crs: crs,
            target_crs: crs,
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_base_map(mut self, base_map: BaseMapProfile) -> Self {
        self.base_map = base_map;
        self
    }

    pub fn with_center(mut self, center: LngLat) -> Self {
        self.center = center;
        self
    }

    /// Engine options; `center` must already be in the target system
    pub fn map_options(&self, center: LngLat) -> MapOptions {
        self.base_map.resolve(center)
    }
}
