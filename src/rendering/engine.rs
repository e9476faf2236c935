//! The render engine seam.
//!
//! Everything that actually draws (scene creation, tile loading, projection,
//! pixels) lives behind [`RenderEngine`]. The overlay layer only hands it finished
//! values: layers, markers, popups and controls.

use crate::{
    core::{config::MapOptions, geo::LngLat},
    layers::{
        base::{Layer, LayerId},
        key::EntityKey,
        marker::{Marker, MarkerLayer},
    },
    plugins::draw::{CircleDrawOptions, Control, ControlId, DrawerId},
    ui::popup::Popup,
    Result,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Screen padding kept clear when the view is re-centered
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CenterOptions {
    pub padding: Padding,
}

/// Operations consumed from the underlying map rendering engine
#[async_trait]
pub trait RenderEngine: Send {
    /// Creates the scene and its base map
    fn create_map(&mut self, options: &MapOptions) -> Result<()>;

    /// Resolves once the engine fired its one-time "loaded" notification
    async fn loaded(&mut self) -> Result<()>;

    fn add_layer(&mut self, layer: &Layer) -> Result<()>;
    fn remove_layer(&mut self, id: LayerId) -> Result<()>;

    fn add_marker_layer(&mut self, layer: &MarkerLayer) -> Result<()>;
    fn remove_marker_layer(&mut self, id: LayerId) -> Result<()>;

    fn add_marker(&mut self, layer: LayerId, marker: &Marker) -> Result<()>;
    /// Re-renders a marker whose element changed
    fn update_marker(&mut self, layer: LayerId, marker: &Marker) -> Result<()>;
    fn remove_marker(&mut self, layer: LayerId, key: &EntityKey) -> Result<()>;

    fn open_popup(&mut self, popup: &Popup) -> Result<()>;
    fn close_popup(&mut self, key: &EntityKey) -> Result<()>;

    fn add_control(&mut self, control: &Control) -> Result<()>;
    fn remove_control(&mut self, id: ControlId) -> Result<()>;

    fn create_circle_drawer(&mut self, id: DrawerId, options: &CircleDrawOptions) -> Result<()>;
    fn clear_drawer(&mut self, id: DrawerId) -> Result<()>;
    fn delete_current_feature(&mut self, id: DrawerId) -> Result<()>;

    fn zoom(&self) -> f64;
    fn center(&self) -> LngLat;
    fn pitch(&self) -> f64;

    fn set_style(&mut self, style: &str) -> Result<()>;
    fn set_center(&mut self, center: LngLat, options: &CenterOptions) -> Result<()>;
    fn set_rotation(&mut self, degrees: f64) -> Result<()>;
    fn set_zoom_and_center(&mut self, zoom: f64, center: LngLat) -> Result<()>;
    fn zoom_in(&mut self) -> Result<()>;
    fn zoom_out(&mut self) -> Result<()>;
    fn pan_to(&mut self, center: LngLat) -> Result<()>;
}

/// Adds a group of layers as a unit.
///
/// If the engine rejects one of them, the layers already added are removed again
/// and the original error is returned.
pub fn add_layers_atomic(engine: &mut dyn RenderEngine, layers: &[&Layer]) -> Result<()> {
    for (index, layer) in layers.iter().enumerate() {
        if let Err(e) = engine.add_layer(layer) {
            log::warn!("engine rejected {}, rolling back {} layers", layer.id, index);
            for added in &layers[..index] {
                if let Err(rollback) = engine.remove_layer(added.id) {
                    log::warn!("Failed to roll back {}: {}", added.id, rollback);
                }
            }
            return Err(e);
        }
    }
    Ok(())
}
