//! Shared trait abstractions for common patterns
//!
//! These traits are the seams between the registries, the geometry model and
//! the render engine collaborator.

use crate::{core::geo::LngLat, rendering::engine::RenderEngine, Result};

/// Trait for coordinate transformation operations
/// Unifies the coordinate mapping of points and every GeoJSON shape
pub trait CoordinateTransform: Sized {
    /// Returns a copy with every position passed through `f`
    fn map_coords<F>(&self, f: &F) -> Self
    where
        F: Fn(LngLat) -> LngLat;
}

impl CoordinateTransform for LngLat {
    fn map_coords<F>(&self, f: &F) -> Self
    where
        F: Fn(LngLat) -> LngLat,
    {
        f(*self)
    }
}

impl CoordinateTransform for [f64; 2] {
    fn map_coords<F>(&self, f: &F) -> Self
    where
        F: Fn(LngLat) -> LngLat,
    {
        f(LngLat::from(*self)).to_position()
    }
}

impl<T: CoordinateTransform> CoordinateTransform for Vec<T> {
    fn map_coords<F>(&self, f: &F) -> Self
    where
        F: Fn(LngLat) -> LngLat,
    {
        self.iter().map(|item| item.map_coords(f)).collect()
    }
}

/// Something the render engine holds on our behalf
///
/// Registries call [`EngineResource::detach`] before dropping an entry so that no
/// engine object outlives its registry record.
pub trait EngineResource {
    /// Removes every engine-side object backing this value
    fn detach(&self, engine: &mut dyn RenderEngine) -> Result<()>;
}
