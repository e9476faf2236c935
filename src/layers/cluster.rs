use crate::{
    core::constants::CLUSTER_COUNT_FIELD,
    data::geojson::FeatureCollection,
    layers::{
        base::{IdAllocator, Layer, LayerKind, LayerSource, ScaleKind, Shape, SizeEncoding},
        key::TypeLabel,
    },
    rendering::engine::RenderEngine,
    traits::EngineResource,
    Result,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Where to find coordinates in cluster records and how to paint the bubbles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClusterOptions {
    pub x_field: String,
    pub y_field: String,
    pub color: String,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            x_field: "deviceLon".to_string(),
            y_field: "deviceLat".to_string(),
            color: "rgb(73,167,86)".to_string(),
        }
    }
}

/// Engine-side clustering of one point set: bubbles scaled by count, with the count
/// written on top.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterLayers {
    pub label: TypeLabel,
    pub points: Layer,
    pub counts: Layer,
}

impl ClusterLayers {
    pub fn compose(label: TypeLabel, data: FeatureCollection, options: &ClusterOptions, ids: &mut IdAllocator) -> Self {
        let source = Arc::new(LayerSource::clustered(data));

        let points = Layer::new(ids.next_layer(), LayerKind::Point, source.clone(), Shape::Circle)
            .with_size(SizeEncoding::Field {
                field: CLUSTER_COUNT_FIELD.to_string(),
                range: vec![20.0],
                scale: Some(ScaleKind::Quantile),
            })
            .with_color(options.color.clone())
            .with_style(json!({ "strokeWidth": 1, "stroke": "#fff" }));

        let counts = Layer::new(
            ids.next_layer(),
            LayerKind::Point,
            source,
            Shape::Text {
                field: CLUSTER_COUNT_FIELD.to_string(),
            },
        )
        .with_size(SizeEncoding::fixed(12.0))
        .with_color("#fff")
        .with_style(json!({ "strokeWidth": 0, "stroke": "#fff" }))
        .auto_fit(false);

        Self { label, points, counts }
    }

    pub fn layers(&self) -> [&Layer; 2] {
        [&self.points, &self.counts]
    }

    /// Number of input points, before the engine aggregates them
    pub fn point_count(&self) -> usize {
        self.points.source.features().map_or(0, |data| data.features.len())
    }
}

impl EngineResource for ClusterLayers {
    fn detach(&self, engine: &mut dyn RenderEngine) -> Result<()> {
        let points = engine.remove_layer(self.points.id);
        let counts = engine.remove_layer(self.counts.id);
        points.and(counts)
    }
}
