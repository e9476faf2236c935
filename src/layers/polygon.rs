//! Grid groups: one polygon drawn as a stack of extruded fill, wall skirt, two
//! outline rings and an optional text label.

use crate::{
    core::{
        constants::{DEFAULT_GRID_COLOR, GRID_HEIGHT, GRID_TOP_BORDER_HEIGHT, LABEL_Z_INDEX},
        geo::LngLat,
    },
    data::geojson::{Feature, FeatureCollection, Geometry, Properties},
    input::events::ClickHandler,
    layers::{
        base::{IdAllocator, Layer, LayerId, LayerKind, LayerSource, Shape, SizeEncoding},
        key::EntityKey,
    },
    rendering::engine::RenderEngine,
    traits::EngineResource,
    Error, Result,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Payload handed to a polygon group's click handler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonClick {
    pub key: EntityKey,
    pub layer: LayerId,
    pub position: Option<LngLat>,
    pub properties: Option<serde_json::Value>,
}

#[derive(Debug)]
pub struct PolygonOptions {
    pub color: String,
    pub show_label: bool,
    /// Open a popup at the centroid as soon as the group is drawn
    pub show_popup: bool,
    /// Feature property holding the label text
    pub label_property: String,
    pub on_click: Option<ClickHandler<PolygonClick>>,
}

impl PolygonOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn show_label(mut self, show: bool) -> Self {
        self.show_label = show;
        self
    }

    pub fn show_popup(mut self, show: bool) -> Self {
        self.show_popup = show;
        self
    }

    pub fn label_property(mut self, property: impl Into<String>) -> Self {
        self.label_property = property.into();
        self
    }

    pub fn on_click<F>(mut self, handler: F) -> Self
    where
        F: FnMut(&PolygonClick) + 'static,
    {
        self.on_click = Some(ClickHandler::new(handler));
        self
    }
}

impl Default for PolygonOptions {
    fn default() -> Self {
        Self {
            color: DEFAULT_GRID_COLOR.to_string(),
            show_label: false,
            show_popup: false,
            label_property: "groupName".to_string(),
            on_click: None,
        }
    }
}

/// The layers that draw one grid polygon.
///
/// Fill, wall and both borders read the same source.
#[derive(Debug)]
pub struct PolygonGroup {
    pub key: EntityKey,
    pub fill: Layer,
    pub wall: Layer,
    pub border_bottom: Layer,
    pub border_top: Layer,
    pub label: Option<Layer>,
    /// Bounding-box centre of the drawn geometry
    pub centroid: LngLat,
    pub(crate) on_click: Option<ClickHandler<PolygonClick>>,
}

impl PolygonGroup {
    /// Builds the group from an already transformed collection.
    ///
    /// Nothing reaches the engine here; see [`PolygonGroup::layers`] for the order
    /// the layers are meant to be added in.
    pub fn compose(
        key: EntityKey,
        data: FeatureCollection,
        options: PolygonOptions,
        ids: &mut IdAllocator,
    ) -> Result<Self> {
        let centroid = data
            .bbox_center()
            .ok_or_else(|| Error::InvalidGeometry(format!("grid {} has no coordinates", key)))?;

        let label_text = data.features.first().and_then(|feature| {
            feature
                .property_text(&options.label_property)
                .or_else(|| feature.property_text("name"))
        });

        let color = options.color;
        let source = Arc::new(LayerSource::geojson(data));

        let fill = Layer::new(ids.next_layer(), LayerKind::Polygon, source.clone(), Shape::Extrude)
            .with_size(SizeEncoding::fixed(GRID_HEIGHT))
            .with_color(color.clone())
            .with_style(json!({
                "opacity": 0.8,
                "heightfixed": true,
                "pickLight": true,
                "raisingHeight": 20,
            }))
            .auto_fit(true)
            .active(true);

        let wall = Layer::new(ids.next_layer(), LayerKind::Line, source.clone(), Shape::Wall)
            .with_size(SizeEncoding::fixed(GRID_HEIGHT))
            .with_style(json!({
                "heightfixed": true,
                "opacity": 0.6,
                "sourceColor": color,
                "targetColor": "rgba(255,255,255,0)",
            }));

        let border_bottom = Layer::new(ids.next_layer(), LayerKind::Line, source.clone(), Shape::Line)
            .with_size(SizeEncoding::fixed(1.0))
            .with_color(color.clone())
            .with_style(json!({ "raisingHeight": 0 }));

        let border_top = Layer::new(ids.next_layer(), LayerKind::Line, source, Shape::Line)
            .with_size(SizeEncoding::fixed(1.0))
            .with_color(color)
            .with_style(json!({ "raisingHeight": GRID_TOP_BORDER_HEIGHT }))
            .with_z_index(1);

        let label = options.show_label.then(|| {
            let name = label_text.unwrap_or_else(|| key.to_string());
            label_layer(ids.next_layer(), &name, centroid)
        });

        log::debug!("composed grid {} around {:?}", key, centroid);

        Ok(Self {
            key,
            fill,
            wall,
            border_bottom,
            border_top,
            label,
            centroid,
            on_click: options.on_click,
        })
    }

    /// Sub-layers in drawing order, bottom first
    pub fn layers(&self) -> Vec<&Layer> {
        let mut layers = vec![&self.fill, &self.wall, &self.border_bottom, &self.border_top];
        if let Some(label) = &self.label {
            layers.push(label);
        }
        layers
    }

    /// Whether a click on `layer` belongs to this group
    pub fn is_clickable(&self, layer: LayerId) -> bool {
        self.fill.id == layer
    }
}

impl EngineResource for PolygonGroup {
    fn detach(&self, engine: &mut dyn RenderEngine) -> Result<()> {
        let mut first_error = None;
        for layer in self.layers() {
            if let Err(e) = engine.remove_layer(layer.id) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

fn label_layer(id: LayerId, name: &str, at: LngLat) -> Layer {
    let mut properties = Properties::new();
    properties.insert("name".to_string(), name.into());
    properties.insert("lng".to_string(), at.lng.into());
    properties.insert("lat".to_string(), at.lat.into());

    let feature = Feature {
        id: None,
        geometry: Some(Geometry::Point {
            coordinates: at.to_position(),
        }),
        properties: Some(properties),
    };
    let source = Arc::new(LayerSource::geojson(FeatureCollection::new(vec![feature])));

    Layer::new(
        id,
        LayerKind::Point,
        source,
        Shape::Text {
            field: "name".to_string(),
        },
    )
    .with_size(SizeEncoding::fixed(20.0))
    .with_color("#fff")
    .with_style(json!({
        "fontWeight": 20,
        "textAnchor": "center",
        "textOffset": [0, 0],
        "spacing": 2,
        "padding": [1, 1],
        "strokeColor": "#fff",
        "strokeWidth": 1,
        "strokeOpacity": 1.0,
    }))
    .with_z_index(LABEL_Z_INDEX)
}
