//! Conversions between the three coordinate encodings used by Chinese map
//! providers: WGS84 (GPS), GCJ02 (the state-mandated offset datum) and BD09
//! (Baidu's further rotation of GCJ02).
//!
//! Only the six ordered pairs of distinct systems are defined. Everything else,
//! including a system paired with itself, yields `None`.

use crate::{core::geo::LngLat, data::geojson::GeoJson, traits::CoordinateTransform};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Semi-major axis of the Krasovsky 1940 ellipsoid used by GCJ02
const KRASOVSKY_A: f64 = 6378245.0;
/// First eccentricity squared of the Krasovsky 1940 ellipsoid
const KRASOVSKY_EE: f64 = 0.006_693_421_622_965_943;
/// Baidu's rotation constant
const X_PI: f64 = PI * 3000.0 / 180.0;

/// Coordinate reference system definitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoordinateSystem {
    /// Baidu coordinates
    BD09,
    /// "Mars" coordinates, used by AMap/Gaode and Tencent
    GCJ02,
    /// World Geodetic System 1984 (WGS84) - standard GPS lng/lat
    WGS84,
}

impl std::fmt::Display for CoordinateSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoordinateSystem::BD09 => write!(f, "BD09"),
            CoordinateSystem::GCJ02 => write!(f, "GCJ02"),
            CoordinateSystem::WGS84 => write!(f, "WGS84"),
        }
    }
}

impl std::str::FromStr for CoordinateSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BD09" => Ok(CoordinateSystem::BD09),
            "GCJ02" => Ok(CoordinateSystem::GCJ02),
            "WGS84" => Ok(CoordinateSystem::WGS84),
            other => Err(format!("unknown coordinate system: {}", other)),
        }
    }
}

/// A point-wise conversion between two systems
pub type PointTransformFn = fn(LngLat) -> LngLat;

/// Looks up the conversion for an ordered pair of systems
pub fn pair_transform(from: CoordinateSystem, to: CoordinateSystem) -> Option<PointTransformFn> {
    use CoordinateSystem::*;

    match (from, to) {
        (BD09, GCJ02) => Some(bd09_to_gcj02),
        (GCJ02, BD09) => Some(gcj02_to_bd09),
        (WGS84, GCJ02) => Some(wgs84_to_gcj02),
        (GCJ02, WGS84) => Some(gcj02_to_wgs84),
        (BD09, WGS84) => Some(bd09_to_wgs84),
        (WGS84, BD09) => Some(wgs84_to_bd09),
        _ => None,
    }
}

/// Converts one point. `None` when the pair is not one of the six supported ones.
pub fn point_transform(
    lng: f64,
    lat: f64,
    from: CoordinateSystem,
    to: CoordinateSystem,
) -> Option<LngLat> {
    pair_transform(from, to).map(|transform| transform(LngLat::new(lng, lat)))
}

/// Converts every position of a GeoJSON object, leaving ids and properties untouched.
pub fn geo_transform(geojson: &GeoJson, from: CoordinateSystem, to: CoordinateSystem) -> Option<GeoJson> {
    pair_transform(from, to).map(|transform| geojson.map_coords(&transform))
}

/// Outside this box the GCJ02 offset is not applied
fn out_of_china(point: LngLat) -> bool {
    !(point.lng > 73.66 && point.lng < 135.05 && point.lat > 3.86 && point.lat < 53.55)
}

fn offset_lat(x: f64, y: f64) -> f64 {
    let mut ret = -100.0 + 2.0 * x + 3.0 * y + 0.2 * y * y + 0.1 * x * y + 0.2 * x.abs().sqrt();
    ret += (20.0 * (6.0 * x * PI).sin() + 20.0 * (2.0 * x * PI).sin()) * 2.0 / 3.0;
    ret += (20.0 * (y * PI).sin() + 40.0 * (y / 3.0 * PI).sin()) * 2.0 / 3.0;
    ret += (160.0 * (y / 12.0 * PI).sin() + 320.0 * (y * PI / 30.0).sin()) * 2.0 / 3.0;
    ret
}

fn offset_lng(x: f64, y: f64) -> f64 {
    let mut ret = 300.0 + x + 2.0 * y + 0.1 * x * x + 0.1 * x * y + 0.1 * x.abs().sqrt();
    ret += (20.0 * (6.0 * x * PI).sin() + 20.0 * (2.0 * x * PI).sin()) * 2.0 / 3.0;
    ret += (20.0 * (x * PI).sin() + 40.0 * (x / 3.0 * PI).sin()) * 2.0 / 3.0;
    ret += (150.0 * (x / 12.0 * PI).sin() + 300.0 * (x / 30.0 * PI).sin()) * 2.0 / 3.0;
    ret
}

/// GCJ02 displacement (dlng, dlat) at a WGS84-ish position
fn gcj02_delta(point: LngLat) -> (f64, f64) {
    let dlat = offset_lat(point.lng - 105.0, point.lat - 35.0);
    let dlng = offset_lng(point.lng - 105.0, point.lat - 35.0);

    let rad_lat = point.lat / 180.0 * PI;
    let magic = 1.0 - KRASOVSKY_EE * rad_lat.sin().powi(2);
    let sqrt_magic = magic.sqrt();

    let dlat = (dlat * 180.0) / ((KRASOVSKY_A * (1.0 - KRASOVSKY_EE)) / (magic * sqrt_magic) * PI);
    let dlng = (dlng * 180.0) / (KRASOVSKY_A / sqrt_magic * rad_lat.cos() * PI);
    (dlng, dlat)
}

pub fn wgs84_to_gcj02(point: LngLat) -> LngLat {
    if out_of_china(point) {
        return point;
    }
    let (dlng, dlat) = gcj02_delta(point);
    LngLat::new(point.lng + dlng, point.lat + dlat)
}

/// Single-step inverse; accurate to roughly a metre
pub fn gcj02_to_wgs84(point: LngLat) -> LngLat {
    if out_of_china(point) {
        return point;
    }
    let (dlng, dlat) = gcj02_delta(point);
    LngLat::new(point.lng - dlng, point.lat - dlat)
}

pub fn bd09_to_gcj02(point: LngLat) -> LngLat {
    let x = point.lng - 0.0065;
    let y = point.lat - 0.006;
    let z = (x * x + y * y).sqrt() - 0.00002 * (y * X_PI).sin();
    let theta = y.atan2(x) - 0.000003 * (x * X_PI).cos();
    LngLat::new(z * theta.cos(), z * theta.sin())
}

pub fn gcj02_to_bd09(point: LngLat) -> LngLat {
    let (x, y) = (point.lng, point.lat);
    let z = (x * x + y * y).sqrt() + 0.00002 * (y * X_PI).sin();
    let theta = y.atan2(x) + 0.000003 * (x * X_PI).cos();
    LngLat::new(z * theta.cos() + 0.0065, z * theta.sin() + 0.006)
}

pub fn bd09_to_wgs84(point: LngLat) -> LngLat {
    gcj02_to_wgs84(bd09_to_gcj02(point))
}

pub fn wgs84_to_bd09(point: LngLat) -> LngLat {
    gcj02_to_bd09(wgs84_to_gcj02(point))
}
