use crate::{
    data::geojson::FeatureCollection, rendering::engine::RenderEngine, traits::EngineResource,
    Result,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Engine-facing identity of one layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(pub u64);

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "layer-{}", self.0)
    }
}

/// Hands out session-unique ids for layers, controls and drawers
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> u64 {
        self.next += 1;
        self.next
    }

    pub fn next_layer(&mut self) -> LayerId {
        LayerId(self.next_id())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Raster,
    Polygon,
    Line,
    Point,
    Heatmap,
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerKind::Raster => write!(f, "raster"),
            LayerKind::Polygon => write!(f, "polygon"),
            LayerKind::Line => write!(f, "line"),
            LayerKind::Point => write!(f, "point"),
            LayerKind::Heatmap => write!(f, "heatmap"),
        }
    }
}

/// Data a layer draws
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LayerSource {
    /// Slippy-map raster tiles
    RasterTile { url: String, tile_size: u32 },
    /// Transformed GeoJSON; `cluster` asks the engine to aggregate points
    GeoJson { data: FeatureCollection, cluster: bool },
}

impl LayerSource {
    pub fn geojson(data: FeatureCollection) -> Self {
        LayerSource::GeoJson {
            data,
            cluster: false,
        }
    }

    pub fn clustered(data: FeatureCollection) -> Self {
        LayerSource::GeoJson {
            data,
            cluster: true,
        }
    }

    pub fn features(&self) -> Option<&FeatureCollection> {
        match self {
            LayerSource::GeoJson { data, .. } => Some(data),
            LayerSource::RasterTile { .. } => None,
        }
    }
}

/// How the engine draws each feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Shape {
    Raster,
    Extrude,
    Wall,
    Line,
    Circle,
    /// Text taken from a feature property
    Text { field: String },
    #[serde(rename = "heatmap3D")]
    Heatmap3D,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleKind {
    Linear,
    Quantile,
}

/// Size channel of a layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SizeEncoding {
    Fixed { value: f64 },
    Field {
        field: String,
        range: Vec<f64>,
        scale: Option<ScaleKind>,
    },
}

impl SizeEncoding {
    pub fn fixed(value: f64) -> Self {
        SizeEncoding::Fixed { value }
    }
}

/// A finished layer, ready to be handed to the render engine.
///
/// `style` is an opaque payload: the overlay layer never interprets it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    pub id: LayerId,
    pub kind: LayerKind,
    pub source: Arc<LayerSource>,
    pub shape: Shape,
    pub size: Option<SizeEncoding>,
    pub color: Option<String>,
    pub style: serde_json::Value,
    pub z_index: i32,
    pub auto_fit: bool,
    pub active: bool,
}

impl Layer {
    pub fn new(id: LayerId, kind: LayerKind, source: Arc<LayerSource>, shape: Shape) -> Self {
        Self {
            id,
            kind,
            source,
            shape,
            size: None,
            color: None,
            style: serde_json::Value::Null,
            z_index: 0,
            auto_fit: false,
            active: false,
        }
    }

    pub fn with_size(mut self, size: SizeEncoding) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_style(mut self, style: serde_json::Value) -> Self {
        self.style = style;
        self
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    pub fn auto_fit(mut self, auto_fit: bool) -> Self {
        self.auto_fit = auto_fit;
        self
    }

    /// Highlight on hover
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}

impl EngineResource for Layer {
    fn detach(&self, engine: &mut dyn RenderEngine) -> Result<()> {
        engine.remove_layer(self.id)
    }
}
