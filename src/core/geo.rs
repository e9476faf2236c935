use serde::{Deserialize, Serialize};

/// Represents a geographical coordinate, longitude first as in GeoJSON
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    /// Creates a new LngLat coordinate
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Component-wise closeness, in degrees
    pub fn approx_eq(&self, other: &LngLat, tolerance: f64) -> bool {
        (self.lng - other.lng).abs() <= tolerance && (self.lat - other.lat).abs() <= tolerance
    }

    /// GeoJSON position `[lng, lat]`
    pub fn to_position(self) -> [f64; 2] {
        [self.lng, self.lat]
    }
}

impl Default for LngLat {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl From<[f64; 2]> for LngLat {
    fn from(position: [f64; 2]) -> Self {
        Self::new(position[0], position[1])
    }
}

impl From<LngLat> for [f64; 2] {
    fn from(point: LngLat) -> Self {
        point.to_position()
    }
}

impl From<geo_types::Coord<f64>> for LngLat {
    fn from(coord: geo_types::Coord<f64>) -> Self {
        Self::new(coord.x, coord.y)
    }
}

/// Represents a bounding box of geographical coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLatBounds {
    pub south_west: LngLat,
    pub north_east: LngLat,
}

impl LngLatBounds {
    pub fn new(south_west: LngLat, north_east: LngLat) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    /// Extends the bounds to include a point
    pub fn extend(&mut self, point: &LngLat) {
        self.south_west.lat = self.south_west.lat.min(point.lat);
        self.south_west.lng = self.south_west.lng.min(point.lng);
        self.north_east.lat = self.north_east.lat.max(point.lat);
        self.north_east.lng = self.north_east.lng.max(point.lng);
    }

    /// Gets the center point of the bounds
    pub fn center(&self) -> LngLat {
        LngLat::new(
            (self.south_west.lng + self.north_east.lng) / 2.0,
            (self.south_west.lat + self.north_east.lat) / 2.0,
        )
    }
}

impl From<geo_types::Rect<f64>> for LngLatBounds {
    fn from(rect: geo_types::Rect<f64>) -> Self {
        Self::new(rect.min().into(), rect.max().into())
    }
}
