use crate::{
    core::geo::{LngLat, LngLatBounds},
    traits::CoordinateTransform,
};
use geo::BoundingRect;
use serde::{Deserialize, Serialize};

/// Free-form feature properties, kept in insertion order
pub type Properties = serde_json::Map<String, serde_json::Value>;

/// GeoJSON geometry types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point {
        coordinates: [f64; 2],
    },
    LineString {
        coordinates: Vec<[f64; 2]>,
    },
    Polygon {
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    MultiPoint {
        coordinates: Vec<[f64; 2]>,
    },
    MultiLineString {
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<[f64; 2]>>>,
    },
    GeometryCollection {
        geometries: Vec<Geometry>,
    },
}

/// GeoJSON feature with geometry and properties
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub properties: Option<Properties>,
}

/// GeoJSON feature collection
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

/// Root GeoJSON object
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GeoJson {
    Feature(Feature),
    FeatureCollection(FeatureCollection),
    Geometry(Geometry),
}

// Dispatch on the "type" member; an untagged derive would accept a collection as
// an empty feature.
impl<'de> Deserialize<'de> for GeoJson {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        let kind = value.get("type").and_then(|t| t.as_str()).map(str::to_owned);

        match kind.as_deref() {
            Some("Feature") => serde_json::from_value(value).map(GeoJson::Feature),
            Some("FeatureCollection") => {
                serde_json::from_value(value).map(GeoJson::FeatureCollection)
            }
            _ => serde_json::from_value(value).map(GeoJson::Geometry),
        }
        .map_err(serde::de::Error::custom)
    }
}

impl GeoJson {
    /// Parses GeoJSON text
    pub fn from_str(geojson_str: &str) -> crate::Result<Self> {
        serde_json::from_str(geojson_str)
            .map_err(|e| crate::Error::InvalidGeometry(format!("Invalid GeoJSON: {}", e)))
    }

    /// Bounding box of every geometry in the object
    pub fn bounds(&self) -> Option<LngLatBounds> {
        match self {
            GeoJson::Feature(feature) => feature.bounds(),
            GeoJson::FeatureCollection(collection) => collection.bounds(),
            GeoJson::Geometry(geometry) => geometry.bounds(),
        }
    }
}

impl Geometry {
    /// Converts to the `geo` crate's geometry model
    pub fn to_geo(&self) -> geo_types::Geometry<f64> {
        match self {
            Geometry::Point { coordinates } => geo_types::Point::from(*coordinates).into(),
            Geometry::LineString { coordinates } => line_string(coordinates).into(),
            Geometry::Polygon { coordinates } => polygon(coordinates).into(),
            Geometry::MultiPoint { coordinates } => geo_types::MultiPoint(
                coordinates.iter().map(|c| geo_types::Point::from(*c)).collect(),
            )
            .into(),
            Geometry::MultiLineString { coordinates } => {
                geo_types::MultiLineString(coordinates.iter().map(|l| line_string(l)).collect())
                    .into()
            }
            Geometry::MultiPolygon { coordinates } => {
                geo_types::MultiPolygon(coordinates.iter().map(|p| polygon(p)).collect()).into()
            }
            Geometry::GeometryCollection { geometries } => {
                geo_types::Geometry::GeometryCollection(geo_types::GeometryCollection(
                    geometries.iter().map(Geometry::to_geo).collect(),
                ))
            }
        }
    }

    /// Axis-aligned bounding box, `None` for empty geometries
    pub fn bounds(&self) -> Option<LngLatBounds> {
        self.to_geo().bounding_rect().map(LngLatBounds::from)
    }
}

impl Feature {
    /// A feature with geometry and no properties
    pub fn from_geometry(geometry: Geometry) -> Self {
        Self {
            id: None,
            geometry: Some(geometry),
            properties: None,
        }
    }

    pub fn bounds(&self) -> Option<LngLatBounds> {
        self.geometry.as_ref().and_then(Geometry::bounds)
    }

    /// A string property, numbers are rendered as text
    pub fn property_text(&self, name: &str) -> Option<String> {
        match self.properties.as_ref()?.get(name)? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    /// Bounding box of all features
    pub fn bounds(&self) -> Option<LngLatBounds> {
        let mut bounds: Option<LngLatBounds> = None;

        for feature_bounds in self.features.iter().filter_map(Feature::bounds) {
            if let Some(ref mut b) = bounds {
                b.extend(&feature_bounds.south_west);
                b.extend(&feature_bounds.north_east);
            } else {
                bounds = Some(feature_bounds);
            }
        }

        bounds
    }

    /// Center of the bounding box. This is not an area-weighted centroid.
    pub fn bbox_center(&self) -> Option<LngLat> {
        self.bounds().map(|b| b.center())
    }
}

fn line_string(coordinates: &[[f64; 2]]) -> geo_types::LineString<f64> {
    geo_types::LineString::from(coordinates.to_vec())
}

fn polygon(rings: &[Vec<[f64; 2]>]) -> geo_types::Polygon<f64> {
    let exterior = rings.first().map(|r| line_string(r)).unwrap_or_else(|| line_string(&[]));
    let interiors = rings.iter().skip(1).map(|r| line_string(r)).collect();
    geo_types::Polygon::new(exterior, interiors)
}

impl CoordinateTransform for Geometry {
    fn map_coords<F>(&self, f: &F) -> Self
    where
        F: Fn(LngLat) -> LngLat,
    {
        match self {
            Geometry::Point { coordinates } => Geometry::Point {
                coordinates: coordinates.map_coords(f),
            },
            Geometry::LineString { coordinates } => Geometry::LineString {
                coordinates: coordinates.map_coords(f),
            },
            Geometry::Polygon { coordinates } => Geometry::Polygon {
                coordinates: coordinates.map_coords(f),
            },
            Geometry::MultiPoint { coordinates } => Geometry::MultiPoint {
                coordinates: coordinates.map_coords(f),
            },
            Geometry::MultiLineString { coordinates } => Geometry::MultiLineString {
                coordinates: coordinates.map_coords(f),
            },
            Geometry::MultiPolygon { coordinates } => Geometry::MultiPolygon {
                coordinates: coordinates.map_coords(f),
            },
            Geometry::GeometryCollection { geometries } => Geometry::GeometryCollection {
                geometries: geometries.map_coords(f),
            },
        }
    }
}

impl CoordinateTransform for Feature {
    fn map_coords<F>(&self, f: &F) -> Self
    where
        F: Fn(LngLat) -> LngLat,
    {
        Feature {
            id: self.id.clone(),
            geometry: self.geometry.as_ref().map(|g| g.map_coords(f)),
            properties: self.properties.clone(),
        }
    }
}

impl CoordinateTransform for FeatureCollection {
    fn map_coords<F>(&self, f: &F) -> Self
    where
        F: Fn(LngLat) -> LngLat,
    {
        FeatureCollection {
            features: self.features.map_coords(f),
        }
    }
}

impl CoordinateTransform for GeoJson {
    fn map_coords<F>(&self, f: &F) -> Self
    where
        F: Fn(LngLat) -> LngLat,
    {
        match self {
            GeoJson::Feature(feature) => GeoJson::Feature(feature.map_coords(f)),
            GeoJson::FeatureCollection(collection) => {
                GeoJson::FeatureCollection(collection.map_coords(f))
            }
            GeoJson::Geometry(geometry) => GeoJson::Geometry(geometry.map_coords(f)),
        }
    }
}
