//! Raw caller records: entity details and loosely typed point rows.

use crate::{
    core::geo::LngLat,
    data::geojson::{Feature, FeatureCollection, Geometry, Properties},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque description of an entity supplied by the caller.
///
/// Only `uniqueId` and `location` are interpreted; everything else is carried
/// through untouched and echoed back to click handlers and popups.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Detail {
    #[serde(rename = "uniqueId", default, skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<[f64; 2]>,
    #[serde(flatten)]
    pub extra: Properties,
}

impl Detail {
    pub fn new(unique_id: impl Into<String>) -> Self {
        Self {
            unique_id: Some(unique_id.into()),
            ..Self::default()
        }
    }

    pub fn with_location(mut self, lng: f64, lat: f64) -> Self {
        self.location = Some([lng, lat]);
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    /// Reads a detail from any JSON value
    pub fn from_value(value: Value) -> crate::Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

/// Reads a number the way loosely typed backends send it: as a JSON number or as
/// numeric text.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

/// Reads a `(lng, lat)` pair out of a record's named fields
pub fn record_position(record: &Value, x_field: &str, y_field: &str) -> Option<LngLat> {
    let lng = coerce_number(record.get(x_field)?)?;
    let lat = coerce_number(record.get(y_field)?)?;
    Some(LngLat::new(lng, lat))
}

/// Turns point rows into a feature collection.
///
/// Every row becomes one Point feature whose properties are the row's own fields.
/// Rows without a usable position are skipped.
pub fn records_to_points<F>(records: &[Value], x_field: &str, y_field: &str, project: F) -> FeatureCollection
where
    F: Fn(LngLat) -> LngLat,
{
    let features = records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            let Some(position) = record_position(record, x_field, y_field) else {
                log::debug!("skipping record {} without {}/{}", index, x_field, y_field);
                return None;
            };
            Some(Feature {
                id: None,
                geometry: Some(Geometry::Point {
                    coordinates: project(position).to_position(),
                }),
                properties: record.as_object().cloned(),
            })
        })
        .collect();

    FeatureCollection::new(features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detail_round_trips_extra_fields() {
        let value = json!({
            "uniqueId": "device_42",
            "location": [120.21, 30.29],
            "name": "Pump station",
            "status": 1
        });

        let detail = Detail::from_value(value.clone()).unwrap();
        assert_eq!(detail.unique_id.as_deref(), Some("device_42"));
        assert_eq!(detail.location, Some([120.21, 30.29]));
        assert_eq!(detail.extra["name"], "Pump station");
        assert_eq!(serde_json::to_value(&detail).unwrap(), value);
    }

    #[test]
    fn test_detail_without_identity() {
        let detail = Detail::from_value(json!({ "location": [1.0, 2.0] })).unwrap();
        assert!(detail.unique_id.is_none());
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(&json!(120.5)), Some(120.5));
        assert_eq!(coerce_number(&json!(" 30.25 ")), Some(30.25));
        assert_eq!(coerce_number(&json!("north")), None);
        assert_eq!(coerce_number(&json!(null)), None);
    }

    #[test]
    fn test_records_to_points_skips_unusable_rows() {
        let records = vec![
            json!({ "deviceLon": 120.1, "deviceLat": "30.2", "name": "a" }),
            json!({ "deviceLon": 120.3 }),
            json!("not a record"),
        ];

        let collection = records_to_points(&records, "deviceLon", "deviceLat", |p| p);
        assert_eq!(collection.features.len(), 1);
        assert_eq!(
            collection.features[0].geometry,
            Some(Geometry::Point {
                coordinates: [120.1, 30.2]
            })
        );
        assert_eq!(collection.features[0].property_text("name").as_deref(), Some("a"));
    }
}
