pub mod geojson;
pub mod records;

pub use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Properties};
pub use records::{coerce_number, records_to_points, Detail};
