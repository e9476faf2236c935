//! An in-memory [`RenderEngine`] that draws nothing.
//!
//! It keeps every object the overlay layer hands it, so hosts can run a session
//! without a GPU or browser and tests can inspect what would be on screen.

use crate::{
    core::{
        config::MapOptions,
        constants::{MAX_ZOOM, MIN_ZOOM},
        geo::LngLat,
    },
    layers::{
        base::{Layer, LayerId},
        key::EntityKey,
        marker::{IconState, Marker, MarkerLayer},
    },
    plugins::draw::{CircleDrawOptions, Control, ControlId, DrawerId},
    prelude::HashMap,
    rendering::engine::{CenterOptions, RenderEngine},
    ui::popup::Popup,
    Error, Result,
};
use async_trait::async_trait;
use futures::channel::oneshot;

/// What a marker looks like on the headless map
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerView {
    pub key: EntityKey,
    pub location: LngLat,
    /// Source of the icon on display
    pub icon: String,
    pub state: IconState,
}

impl MarkerView {
    fn of(marker: &Marker) -> Self {
        Self {
            key: marker.key.clone(),
            location: marker.location,
            icon: marker.element.visible_icon().src.clone(),
            state: marker.element.state,
        }
    }
}

/// Fires the one-time "loaded" notification of a gated [`HeadlessEngine`]
#[derive(Debug)]
pub struct LoadSignal(oneshot::Sender<()>);

impl LoadSignal {
    pub fn fire(self) {
        // The engine may already be gone; nothing is waiting then.
        let _ = self.0.send(());
    }
}

#[derive(Debug)]
struct MarkerLayerState {
    layer: MarkerLayer,
    markers: Vec<MarkerView>,
}

#[derive(Debug, Default, Clone, Copy)]
struct DrawerState {
    clears: usize,
    deletes: usize,
}

#[derive(Debug)]
pub struct HeadlessEngine {
    loaded: bool,
    load_gate: Option<oneshot::Receiver<()>>,
    map_options: Option<MapOptions>,

    layers: HashMap<LayerId, Layer>,
    /// Layer ids sorted by z-index, insertion order within a z-index
    render_order: Vec<LayerId>,
    marker_layers: HashMap<LayerId, MarkerLayerState>,
    open_popups: HashMap<EntityKey, LngLat>,
    controls: Vec<ControlId>,
    drawers: HashMap<DrawerId, DrawerState>,

    zoom: f64,
    min_zoom: f64,
    max_zoom: f64,
    center: LngLat,
    pitch: f64,
    rotation: f64,
    style: Option<String>,
    last_center_options: Option<CenterOptions>,
    pan_history: Vec<LngLat>,

    fail_layer_add_in: Option<usize>,
    fail_marker_add_in: Option<usize>,
    fail_popup_open_in: Option<usize>,
}

impl HeadlessEngine {
    /// An engine that reports itself loaded as soon as it is asked
    pub fn new() -> Self {
        Self {
            loaded: false,
            load_gate: None,
            map_options: None,
            layers: HashMap::default(),
            render_order: Vec::new(),
            marker_layers: HashMap::default(),
            open_popups: HashMap::default(),
            controls: Vec::new(),
            drawers: HashMap::default(),
            zoom: 0.0,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            center: LngLat::default(),
            pitch: 0.0,
            rotation: 0.0,
            style: None,
            last_center_options: None,
            pan_history: Vec::new(),
            fail_layer_add_in: None,
            fail_marker_add_in: None,
            fail_popup_open_in: None,
        }
    }

    /// An engine that already went through its load notification
    pub fn loaded_now() -> Self {
        Self {
            loaded: true,
            ..Self::new()
        }
    }

    /// An engine whose load notification is fired by the returned signal
    pub fn with_load_gate() -> (Self, LoadSignal) {
        let (sender, receiver) = oneshot::channel();
        let engine = Self {
            load_gate: Some(receiver),
            ..Self::new()
        };
        (engine, LoadSignal(sender))
    }

    /// Makes the `index`-th upcoming `add_layer` call fail, counting from zero
    pub fn fail_layer_add_at(&mut self, index: usize) {
        self.fail_layer_add_in = Some(index);
    }

    /// Makes the `index`-th upcoming `add_marker` call fail, counting from zero
    pub fn fail_marker_add_at(&mut self, index: usize) {
        self.fail_marker_add_in = Some(index);
    }

    /// Makes the `index`-th upcoming `open_popup` call fail, counting from zero
    pub fn fail_popup_open_at(&mut self, index: usize) {
        self.fail_popup_open_in = Some(index);
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn map_options(&self) -> Option<&MapOptions> {
        self.map_options.as_ref()
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(&id)
    }

    pub fn has_layer(&self, id: LayerId) -> bool {
        self.layers.contains_key(&id)
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Layers bottom to top
    pub fn layers(&self) -> Vec<&Layer> {
        self.render_order
            .iter()
            .filter_map(|id| self.layers.get(id))
            .collect()
    }

    pub fn marker_layer(&self, id: LayerId) -> Option<&MarkerLayer> {
        self.marker_layers.get(&id).map(|state| &state.layer)
    }

    pub fn marker_layer_count(&self) -> usize {
        self.marker_layers.len()
    }

    pub fn markers(&self, layer: LayerId) -> Vec<&MarkerView> {
        self.marker_layers
            .get(&layer)
            .map(|state| state.markers.iter().collect())
            .unwrap_or_default()
    }

    /// Looks a marker up across every marker layer
    pub fn marker(&self, key: &EntityKey) -> Option<&MarkerView> {
        self.marker_layers
            .values()
            .flat_map(|state| state.markers.iter())
            .find(|view| &view.key == key)
    }

    pub fn marker_count(&self) -> usize {
        self.marker_layers.values().map(|state| state.markers.len()).sum()
    }

    pub fn is_popup_open(&self, key: &EntityKey) -> bool {
        self.open_popups.contains_key(key)
    }

    pub fn popup_anchor(&self, key: &EntityKey) -> Option<LngLat> {
        self.open_popups.get(key).copied()
    }

    pub fn open_popup_count(&self) -> usize {
        self.open_popups.len()
    }

    pub fn controls(&self) -> Vec<ControlId> {
        self.controls.clone()
    }

    pub fn has_drawer(&self, id: DrawerId) -> bool {
        self.drawers.contains_key(&id)
    }

    pub fn drawer_clears(&self, id: DrawerId) -> usize {
        self.drawers.get(&id).map_or(0, |state| state.clears)
    }

    pub fn drawer_deletes(&self, id: DrawerId) -> usize {
        self.drawers.get(&id).map_or(0, |state| state.deletes)
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    pub fn last_center_options(&self) -> Option<&CenterOptions> {
        self.last_center_options.as_ref()
    }

    /// Every `pan_to` target, oldest first
    pub fn pan_history(&self) -> &[LngLat] {
        &self.pan_history
    }

    fn require_loaded(&self, operation: &str) -> Result<()> {
        if self.loaded {
            Ok(())
        } else {
            Err(Error::Engine(format!("{} before the map finished loading", operation)))
        }
    }

    fn marker_layer_mut(&mut self, id: LayerId) -> Result<&mut MarkerLayerState> {
        self.marker_layers
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("marker layer {}", id)))
    }

    fn drawer_mut(&mut self, id: DrawerId) -> Result<&mut DrawerState> {
        self.drawers
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("drawer {:?}", id)))
    }

    fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}

impl Default for HeadlessEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RenderEngine for HeadlessEngine {
    fn create_map(&mut self, options: &MapOptions) -> Result<()> {
        self.zoom = options.zoom;
        self.min_zoom = options.min_zoom;
        self.max_zoom = options.max_zoom;
        self.center = options.center;
        self.pitch = options.pitch;
        self.rotation = options.rotation;
        self.style = options.style.clone();
        self.map_options = Some(options.clone());
        log::debug!("headless map created at {:?}, zoom {}", options.center, options.zoom);
        Ok(())
    }

    async fn loaded(&mut self) -> Result<()> {
        if let Some(gate) = self.load_gate.take() {
            gate.await
                .map_err(|_| Error::Engine("load signal dropped before firing".to_string()))?;
        }
        self.loaded = true;
        Ok(())
    }

    fn add_layer(&mut self, layer: &Layer) -> Result<()> {
        self.require_loaded("add_layer")?;

        if injected_failure(&mut self.fail_layer_add_in) {
            return Err(Error::Engine(format!("injected failure adding {}", layer.id)));
        }

        if self.layers.insert(layer.id, layer.clone()).is_some() {
            self.render_order.retain(|id| *id != layer.id);
        }

        let z_index = layer.z_index;
        let position = self
            .render_order
            .iter()
            .position(|id| self.layers.get(id).map(|l| l.z_index > z_index).unwrap_or(false))
            .unwrap_or(self.render_order.len());
        self.render_order.insert(position, layer.id);
        Ok(())
    }

    fn remove_layer(&mut self, id: LayerId) -> Result<()> {
        self.layers
            .remove(&id)
            .ok_or_else(|| Error::NotFound(format!("layer {}", id)))?;
        self.render_order.retain(|existing| *existing != id);
        Ok(())
    }

    fn add_marker_layer(&mut self, layer: &MarkerLayer) -> Result<()> {
        self.require_loaded("add_marker_layer")?;
        self.marker_layers.insert(
            layer.id,
            MarkerLayerState {
                layer: layer.clone(),
                markers: Vec::new(),
            },
        );
        Ok(())
    }

    fn remove_marker_layer(&mut self, id: LayerId) -> Result<()> {
        self.marker_layers
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(format!("marker layer {}", id)))
    }

    /// A marker whose key is already on the layer is replaced
    fn add_marker(&mut self, layer: LayerId, marker: &Marker) -> Result<()> {
        if injected_failure(&mut self.fail_marker_add_in) {
            return Err(Error::Engine(format!("injected failure adding marker {}", marker.key)));
        }
        let state = self.marker_layer_mut(layer)?;
        state.markers.retain(|view| view.key != marker.key);
        state.markers.push(MarkerView::of(marker));
        Ok(())
    }

    fn update_marker(&mut self, layer: LayerId, marker: &Marker) -> Result<()> {
        let state = self.marker_layer_mut(layer)?;
        let view = state
            .markers
            .iter_mut()
            .find(|view| view.key == marker.key)
            .ok_or_else(|| Error::NotFound(format!("marker {}", marker.key)))?;
        *view = MarkerView::of(marker);
        Ok(())
    }

    fn remove_marker(&mut self, layer: LayerId, key: &EntityKey) -> Result<()> {
        let state = self.marker_layer_mut(layer)?;
        let before = state.markers.len();
        state.markers.retain(|view| &view.key != key);
        if state.markers.len() == before {
            return Err(Error::NotFound(format!("marker {}", key)));
        }
        Ok(())
    }

    fn open_popup(&mut self, popup: &Popup) -> Result<()> {
        if injected_failure(&mut self.fail_popup_open_in) {
            return Err(Error::Engine(format!("injected failure opening popup {}", popup.key)));
        }
        self.open_popups.insert(popup.key.clone(), popup.anchor);
        Ok(())
    }

    fn close_popup(&mut self, key: &EntityKey) -> Result<()> {
        self.open_popups.remove(key);
        Ok(())
    }

    fn add_control(&mut self, control: &Control) -> Result<()> {
        self.controls.push(control.id);
        Ok(())
    }

    fn remove_control(&mut self, id: ControlId) -> Result<()> {
        let before = self.controls.len();
        self.controls.retain(|existing| *existing != id);
        if self.controls.len() == before {
            return Err(Error::NotFound(format!("control {:?}", id)));
        }
        Ok(())
    }

    fn create_circle_drawer(&mut self, id: DrawerId, _options: &CircleDrawOptions) -> Result<()> {
        self.drawers.insert(id, DrawerState::default());
        Ok(())
    }

    fn clear_drawer(&mut self, id: DrawerId) -> Result<()> {
        self.drawer_mut(id)?.clears += 1;
        Ok(())
    }

    fn delete_current_feature(&mut self, id: DrawerId) -> Result<()> {
        self.drawer_mut(id)?.deletes += 1;
        Ok(())
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn center(&self) -> LngLat {
        self.center
    }

    fn pitch(&self) -> f64 {
        self.pitch
    }

    fn set_style(&mut self, style: &str) -> Result<()> {
        self.style = Some(style.to_string());
        Ok(())
    }

    fn set_center(&mut self, center: LngLat, options: &CenterOptions) -> Result<()> {
        self.center = center;
        self.last_center_options = Some(*options);
        Ok(())
    }

    fn set_rotation(&mut self, degrees: f64) -> Result<()> {
        self.rotation = degrees;
        Ok(())
    }

    fn set_zoom_and_center(&mut self, zoom: f64, center: LngLat) -> Result<()> {
        self.zoom = self.clamp_zoom(zoom);
        self.center = center;
        Ok(())
    }

    fn zoom_in(&mut self) -> Result<()> {
        self.zoom = self.clamp_zoom(self.zoom + 1.0);
        Ok(())
    }

    fn zoom_out(&mut self) -> Result<()> {
        self.zoom = self.clamp_zoom(self.zoom - 1.0);
        Ok(())
    }

    fn pan_to(&mut self, center: LngLat) -> Result<()> {
        self.center = center;
        self.pan_history.push(center);
        Ok(())
    }
}

/// Counts down an armed failure slot, true when it fires
fn injected_failure(slot: &mut Option<usize>) -> bool {
    match *slot {
        Some(0) => {
            *slot = None;
            true
        }
        Some(n) => {
            *slot = Some(n - 1);
            false
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::geojson::FeatureCollection,
        layers::base::{LayerKind, LayerSource, Shape},
    };
    use std::sync::Arc;

    fn layer(id: u64, z_index: i32) -> Layer {
        let source = Arc::new(LayerSource::geojson(FeatureCollection::default()));
        Layer::new(LayerId(id), LayerKind::Line, source, Shape::Line).with_z_index(z_index)
    }

    #[test]
    fn test_layers_rejected_before_load() {
        let mut engine = HeadlessEngine::new();
        assert!(matches!(engine.add_layer(&layer(1, 0)), Err(Error::Engine(_))));
        assert_eq!(engine.layer_count(), 0);
    }

    #[test]
    fn test_render_order_follows_z_index() {
        let mut engine = HeadlessEngine::loaded_now();
        engine.add_layer(&layer(1, 500)).unwrap();
        engine.add_layer(&layer(2, 0)).unwrap();
        engine.add_layer(&layer(3, 1)).unwrap();
        engine.add_layer(&layer(4, 0)).unwrap();

        let order: Vec<u64> = engine.layers().iter().map(|l| l.id.0).collect();
        assert_eq!(order, vec![2, 4, 3, 1]);

        engine.remove_layer(LayerId(3)).unwrap();
        assert!(engine.remove_layer(LayerId(3)).is_err());
        assert_eq!(engine.layer_count(), 3);
    }

    #[test]
    fn test_injected_failure_fires_once() {
        let mut engine = HeadlessEngine::loaded_now();
        engine.fail_layer_add_at(1);

        assert!(engine.add_layer(&layer(1, 0)).is_ok());
        assert!(engine.add_layer(&layer(2, 0)).is_err());
        assert!(engine.add_layer(&layer(3, 0)).is_ok());
        assert!(!engine.has_layer(LayerId(2)));
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut engine = HeadlessEngine::loaded_now();
        engine.set_zoom_and_center(25.0, LngLat::new(1.0, 2.0)).unwrap();
        assert_eq!(engine.zoom(), MAX_ZOOM);
        engine.zoom_in().unwrap();
        assert_eq!(engine.zoom(), MAX_ZOOM);

        engine.set_zoom_and_center(MIN_ZOOM, LngLat::new(1.0, 2.0)).unwrap();
        engine.zoom_out().unwrap();
        assert_eq!(engine.zoom(), MIN_ZOOM);
    }

    #[tokio::test]
    async fn test_load_gate() {
        let (mut engine, signal) = HeadlessEngine::with_load_gate();
        signal.fire();
        engine.loaded().await.unwrap();
        assert!(engine.is_loaded());
    }

    #[tokio::test]
    async fn test_dropped_signal_is_an_error() {
        let (mut engine, signal) = HeadlessEngine::with_load_gate();
        drop(signal);
        assert!(engine.loaded().await.is_err());
        assert!(!engine.is_loaded());
    }
}
