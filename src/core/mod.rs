pub mod config;
pub mod constants;
pub mod crs;
pub mod geo;
pub mod session;

pub use config::{BaseMapProfile, MapOptions, SessionConfig};
pub use crs::CoordinateSystem;
pub use geo::{LngLat, LngLatBounds};
pub use session::MapSession;
