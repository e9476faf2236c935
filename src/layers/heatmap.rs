use crate::{
    core::{constants::HEATMAP_Z_INDEX, geo::LngLat},
    data::{
        geojson::{Feature, FeatureCollection, Geometry, Properties},
        records::coerce_number,
    },
    layers::{
        base::{IdAllocator, Layer, LayerKind, LayerSource, Shape, SizeEncoding},
        key::TypeLabel,
    },
    rendering::engine::RenderEngine,
    traits::EngineResource,
    Result,
};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// Properties every heat point starts out with
static DEFAULT_HEAT_PROPERTIES: Lazy<Properties> = Lazy::new(|| {
    let value = json!({
        "annualCarbon": 29.15,
        "capacity": 6720,
        "coalType": "Bituminous",
        "country": "China",
        "plant": "Datang Tuoketuo power station",
        "status": "Operating",
        "type": "Subcritical",
        "retire1": 2100,
        "retire2": 2100,
        "retire3": 2100,
        "start1": 2003,
        "start2": 2017,
        "year1": 2017,
        "year2": 2019,
        "startLabel": "2003 - 2017",
        "regionLabel": "China",
    });
    match value {
        Value::Object(map) => map,
        _ => Properties::new(),
    }
});

/// One heat sample. Coordinates may be numbers or numeric text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatSample {
    pub longitude: Value,
    pub latitude: Value,
    /// Overrides the default properties of the same name
    #[serde(flatten)]
    pub properties: Properties,
}

impl HeatSample {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self {
            longitude: lng.into(),
            latitude: lat.into(),
            properties: Properties::new(),
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn position(&self) -> Option<LngLat> {
        Some(LngLat::new(coerce_number(&self.longitude)?, coerce_number(&self.latitude)?))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeatmapOptions {
    pub size_field: String,
    pub size_range: [f64; 2],
    /// Passed to the engine untouched
    pub style: Value,
    pub z_index: i32,
    pub default_properties: Properties,
}

impl Default for HeatmapOptions {
    fn default() -> Self {
        Self {
            size_field: "capacity".to_string(),
            size_range: [0.0, 1.0],
            style: json!({
                "intensity": 5,
                "radius": 10,
                "rampColors": {
                    "colors": ["#2E8AE6", "#69D1AB", "#DAF291", "#FFD591", "#FF7A45", "#CF1D49"],
                    "positions": [0, 0.2, 0.4, 0.6, 0.8, 1.0],
                },
            }),
            z_index: HEATMAP_Z_INDEX,
            default_properties: DEFAULT_HEAT_PROPERTIES.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapLayer {
    pub label: TypeLabel,
    pub layer: Layer,
}

impl HeatmapLayer {
    /// Builds the heat layer. `project` maps sample positions into the engine CRS.
    pub fn compose<F>(
        label: TypeLabel,
        samples: &[HeatSample],
        options: &HeatmapOptions,
        project: F,
        ids: &mut IdAllocator,
    ) -> Self
    where
        F: Fn(LngLat) -> LngLat,
    {
        let features = samples
            .iter()
            .filter_map(|sample| {
                let Some(position) = sample.position() else {
                    log::debug!("skipping heat sample without a usable position in {}", label);
                    return None;
                };

                let mut properties = options.default_properties.clone();
                properties.extend(sample.properties.clone());

                Some(Feature {
                    id: None,
                    geometry: Some(Geometry::Point {
                        coordinates: project(position).to_position(),
                    }),
                    properties: Some(properties),
                })
            })
            .collect();

        let source = Arc::new(LayerSource::geojson(FeatureCollection::new(features)));
        let layer = Layer::new(ids.next_layer(), LayerKind::Heatmap, source, Shape::Heatmap3D)
            .with_size(SizeEncoding::Field {
                field: options.size_field.clone(),
                range: options.size_range.to_vec(),
                scale: None,
            })
            .with_style(options.style.clone())
            .with_z_index(options.z_index);

        Self { label, layer }
    }
}

impl EngineResource for HeatmapLayer {
    fn detach(&self, engine: &mut dyn RenderEngine) -> Result<()> {
        engine.remove_layer(self.layer.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(heatmap: &HeatmapLayer) -> &[Feature] {
        &heatmap.layer.source.features().unwrap().features
    }

    #[test]
    fn test_sample_fields_override_defaults() {
        let samples = vec![
            HeatSample::new(120.1, 30.2).with_property("capacity", 100),
            HeatSample::new(120.3, 30.4),
        ];
        let mut ids = IdAllocator::new();
        let heatmap = HeatmapLayer::compose(
            TypeLabel::new("plants"),
            &samples,
            &HeatmapOptions::default(),
            |p| p,
            &mut ids,
        );

        let features = features(&heatmap);
        assert_eq!(features.len(), 2);

        let first = features[0].properties.as_ref().unwrap();
        assert_eq!(first["capacity"], 100);
        assert_eq!(first["plant"], "Datang Tuoketuo power station");

        let second = features[1].properties.as_ref().unwrap();
        assert_eq!(second["capacity"], 6720);
    }

    #[test]
    fn test_layer_recipe() {
        let mut ids = IdAllocator::new();
        let heatmap = HeatmapLayer::compose(
            TypeLabel::new("plants"),
            &[HeatSample::new(120.1, 30.2)],
            &HeatmapOptions::default(),
            |p| p,
            &mut ids,
        );

        assert_eq!(heatmap.layer.kind, LayerKind::Heatmap);
        assert_eq!(heatmap.layer.shape, Shape::Heatmap3D);
        assert_eq!(heatmap.layer.z_index, 2);
        assert_eq!(heatmap.layer.style["intensity"], 5);
        assert_eq!(
            heatmap.layer.size,
            Some(SizeEncoding::Field {
                field: "capacity".to_string(),
                range: vec![0.0, 1.0],
                scale: None,
            })
        );
    }

    #[test]
    fn test_text_coordinates_and_bad_samples() {
        let samples: Vec<HeatSample> = serde_json::from_value(json!([
            { "longitude": "120.5", "latitude": "30.5", "status": "Retired" },
            { "longitude": "n/a", "latitude": 30.0 },
        ]))
        .unwrap();
        let mut ids = IdAllocator::new();
        let heatmap = HeatmapLayer::compose(
            TypeLabel::new("plants"),
            &samples,
            &HeatmapOptions::default(),
            |p| LngLat::new(p.lng + 1.0, p.lat),
            &mut ids,
        );

        let features = features(&heatmap);
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].geometry, Some(Geometry::Point { coordinates: [121.5, 30.5] }));
        assert_eq!(features[0].properties.as_ref().unwrap()["status"], "Retired");
    }
}
