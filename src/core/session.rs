//! A map session: the overlay state of one engine instance.
//!
//! Every overlay lives in a registry owned by the session and is mirrored into the
//! render engine. Callers speak `SessionConfig::source_crs`; everything handed to
//! the engine is in `SessionConfig::target_crs`.

use crate::{
    core::{
        config::SessionConfig,
        constants::CENTER_PADDING_TOP,
        crs::{geo_transform, pair_transform, CoordinateSystem, PointTransformFn},
        geo::LngLat,
    },
    data::{
        geojson::{Feature, FeatureCollection, GeoJson},
        records::{records_to_points, Detail},
    },
    input::events::{ClickHandler, EventHandled, OverlayEvent},
    layers::{
        base::{IdAllocator, Layer, LayerId, LayerKind, LayerSource, Shape},
        cluster::{ClusterLayers, ClusterOptions},
        heatmap::{HeatSample, HeatmapLayer, HeatmapOptions},
        key::{EntityKey, TypeLabel},
        marker::{IconState, Marker, MarkerElement, MarkerLayer, MarkerOptions},
        polygon::{PolygonClick, PolygonGroup, PolygonOptions},
        registry::Registry,
    },
    plugins::draw::{ControlId, DrawTools, DrawerId},
    prelude::HashMap,
    rendering::engine::{add_layers_atomic, CenterOptions, Padding, RenderEngine},
    ui::{
        icon::{IconResolver, PathIconResolver},
        popup::Popup,
    },
    Error, Result,
};
use std::sync::Arc;

fn identity(point: LngLat) -> LngLat {
    point
}

pub struct MapSession<E: RenderEngine> {
    engine: E,
    config: SessionConfig,
    icons: Box<dyn IconResolver>,
    ids: IdAllocator,
    base_layer: Option<Layer>,

    marker_layers: Registry<TypeLabel, MarkerLayer>,
    markers: Registry<EntityKey, Marker>,
    popups: Registry<EntityKey, Popup>,
    polygons: Registry<EntityKey, PolygonGroup>,
    clusters: Registry<TypeLabel, ClusterLayers>,
    heatmaps: Registry<TypeLabel, HeatmapLayer>,
    draw: DrawTools,

    on_map_click: Option<ClickHandler<LngLat>>,
}

impl<E: RenderEngine> MapSession<E> {
    /// Creates the map and waits for the engine's load notification.
    ///
    /// The session only exists once the engine is loaded, so no overlay can be
    /// added to a map that is not ready for it.
    pub async fn attach<I>(mut engine: E, config: SessionConfig, icons: I) -> Result<Self>
    where
        I: IconResolver + 'static,
    {
        let project = project_with(config.source_crs, config.target_crs)?;
        let options = config.map_options(project(config.center));

        engine.create_map(&options)?;
        engine.loaded().await?;
        log::debug!("map loaded ({} -> {})", config.source_crs, config.target_crs);

        let mut ids = IdAllocator::new();
        let base_layer = match &options.base_tiles {
            Some(url) => {
                let source = LayerSource::RasterTile {
                    url: url.clone(),
                    tile_size: options.tile_size,
                };
                let layer = Layer::new(ids.next_layer(), LayerKind::Raster, Arc::new(source), Shape::Raster);
                engine.add_layer(&layer)?;
                Some(layer)
            }
            None => None,
        };

        Ok(Self {
            engine,
            config,
            icons: Box::new(icons),
            ids,
            base_layer,
            marker_layers: Registry::new(),
            markers: Registry::new(),
            popups: Registry::new(),
            polygons: Registry::new(),
            clusters: Registry::new(),
            heatmaps: Registry::new(),
            draw: DrawTools::new(),
            on_map_click: None,
        })
    }

    /// Attaches with icons served from `SessionConfig::icon_base`
    pub async fn attach_with_icon_base(engine: E, config: SessionConfig) -> Result<Self> {
        let icons = PathIconResolver::new(config.icon_base.clone());
        Self::attach(engine, config, icons).await
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn base_layer(&self) -> Option<&Layer> {
        self.base_layer.as_ref()
    }

    /// Maps a caller position into the engine's coordinate system
    pub fn project(&self, point: LngLat) -> Result<LngLat> {
        let project = self.projection()?;
        Ok(project(point))
    }

    fn projection(&self) -> Result<PointTransformFn> {
        project_with(self.config.source_crs, self.config.target_crs)
    }

    fn project_geojson(&self, geojson: &GeoJson) -> Result<GeoJson> {
        let (from, to) = (self.config.source_crs, self.config.target_crs);
        if from == to {
            return Ok(geojson.clone());
        }
        geo_transform(geojson, from, to).ok_or(Error::UnsupportedTransform { from, to })
    }

    // ---- markers ----------------------------------------------------------

    /// Places a marker for `detail`, replacing any marker with the same id.
    ///
    /// The view pans to every new marker.
    pub fn add_marker(&mut self, detail: Detail, options: MarkerOptions) -> Result<EntityKey> {
        let Some(key) = identity_of(&detail) else {
            log::warn!("add_marker: detail has no uniqueId, ignored");
            return Err(Error::MissingIdentity);
        };
        let Some(position) = detail.location else {
            log::warn!("add_marker: {} has no location, ignored", key);
            return Err(Error::MissingLocation);
        };
        let location = self.project(LngLat::from(position))?;

        let (layer, created) = self.ensure_marker_layer(key.namespace(), options.cluster)?;
        let marker = Marker {
            key: key.clone(),
            layer,
            location,
            element: MarkerElement::new(&options.marker_type, &*self.icons),
            detail: detail.clone(),
            popup: options.popup.then(|| key.clone()),
            on_click: options.on_click,
        };

        // The engine swaps a marker with the same key in place, so the old one is
        // only dropped from the registry once the new one is on the map
        if let Err(e) = self.engine.add_marker(layer, &marker) {
            if created {
                self.marker_layers.remove_namespace(key.namespace(), &mut self.engine);
            }
            return Err(e);
        }
        self.markers.insert(key.clone(), marker);

        self.popups.detach_one(&key, &mut self.engine);
        if options.popup {
            let popup = Popup::new(key.clone(), location, detail).linked_to(key.clone());
            self.popups.insert(key.clone(), popup);
        }

        if let Err(e) = self.engine.pan_to(location) {
            log::warn!("marker {} placed but the view did not pan: {}", key, e);
        }
        log::debug!("marker {} placed at {:?}", key, location);
        Ok(key)
    }

    /// The first marker of a namespace fixes its layer's clustering.
    ///
    /// Also reports whether the layer was created by this call.
    fn ensure_marker_layer(&mut self, namespace: &str, cluster: bool) -> Result<(LayerId, bool)> {
        let label = TypeLabel::new(namespace);
        if let Some(existing) = self.marker_layers.get(&label) {
            if existing.cluster != cluster {
                log::warn!(
                    "marker layer {} already exists with cluster={}, ignoring cluster={}",
                    namespace,
                    existing.cluster,
                    cluster
                );
            }
            return Ok((existing.id, false));
        }

        let layer = MarkerLayer {
            id: self.ids.next_layer(),
            namespace: namespace.to_string(),
            cluster,
        };
        self.engine.add_marker_layer(&layer)?;
        let id = layer.id;
        self.marker_layers.insert(label, layer);
        log::debug!("created marker layer {} ({})", namespace, id);
        Ok((id, true))
    }

    pub fn get_marker(&self, unique_id: &str) -> Option<&Marker> {
        self.markers.get(&EntityKey::parse(unique_id)?)
    }

    /// Markers of one namespace; `None` if the namespace was never used
    pub fn get_all_markers(&self, namespace: &str) -> Option<&HashMap<EntityKey, Marker>> {
        self.markers.namespace(namespace)
    }

    pub fn marker_layer(&self, namespace: &str) -> Option<&MarkerLayer> {
        self.marker_layers.get(&TypeLabel::new(namespace))
    }

    /// Removes the markers and marker layer of one namespace, or of every namespace.
    ///
    /// Returns how many markers were removed.
    pub fn clear_marker(&mut self, namespace: Option<&str>) -> usize {
        let removed = match namespace {
            Some(ns) => {
                let removed = self.markers.remove_namespace(ns, &mut self.engine).unwrap_or(0);
                self.marker_layers.remove_namespace(ns, &mut self.engine);
                removed
            }
            None => {
                let removed = self.markers.remove_all(&mut self.engine);
                self.marker_layers.remove_all(&mut self.engine);
                removed
            }
        };
        log::debug!("cleared {} markers", removed);
        removed
    }

    // ---- popups -----------------------------------------------------------

    pub fn get_popup(&self, unique_id: &str) -> Option<&Popup> {
        self.popups.get(&EntityKey::parse(unique_id)?)
    }

    pub fn get_all_popups(&self, namespace: &str) -> Option<&HashMap<EntityKey, Popup>> {
        self.popups.namespace(namespace)
    }

    /// Opens a registered popup and activates its marker's icon
    pub fn open_popup(&mut self, key: &EntityKey) -> Result<()> {
        let popup = self
            .popups
            .get_mut(key)
            .ok_or_else(|| Error::NotFound(format!("popup {}", key)))?;
        self.engine.open_popup(popup)?;
        popup.show();
        let linked = popup.linked_marker.clone();
        self.show_marker_icon(linked.as_ref(), IconState::Active)
    }

    pub fn close_popup(&mut self, key: &EntityKey) -> Result<()> {
        let popup = self
            .popups
            .get_mut(key)
            .ok_or_else(|| Error::NotFound(format!("popup {}", key)))?;
        self.engine.close_popup(key)?;
        popup.hide();
        let linked = popup.linked_marker.clone();
        self.show_marker_icon(linked.as_ref(), IconState::Default)
    }

    /// Closes and deletes the popups of one namespace, or all of them.
    ///
    /// Markers linked to a deleted popup go back to their default icon.
    pub fn clear_info_window(&mut self, namespace: Option<&str>) -> usize {
        let linked: Vec<EntityKey> = match namespace {
            Some(ns) => self
                .popups
                .namespace(ns)
                .map(|bucket| bucket.values().filter_map(|p| p.linked_marker.clone()).collect())
                .unwrap_or_default(),
            None => self
                .popups
                .iter()
                .filter_map(|(_, p)| p.linked_marker.clone())
                .collect(),
        };

        let removed = match namespace {
            Some(ns) => self.popups.remove_namespace(ns, &mut self.engine).unwrap_or(0),
            None => self.popups.remove_all(&mut self.engine),
        };

        for key in &linked {
            if let Err(e) = self.show_marker_icon(Some(key), IconState::Default) {
                log::warn!("Failed to reset icon of {}: {}", key, e);
            }
        }
        removed
    }

    fn show_marker_icon(&mut self, key: Option<&EntityKey>, state: IconState) -> Result<()> {
        let Some(marker) = key.and_then(|key| self.markers.get_mut(key)) else {
            return Ok(());
        };
        if marker.element.show(state) {
            self.engine.update_marker(marker.layer, marker)?;
        }
        Ok(())
    }

    // ---- events -----------------------------------------------------------

    /// Feeds a host interaction event into the session
    pub fn dispatch(&mut self, event: OverlayEvent) -> Result<EventHandled> {
        match event {
            OverlayEvent::MarkerClick { key } => self.click_marker(&key),
            OverlayEvent::PopupOpened { key } => Ok(self.popup_state_changed(&key, true)),
            OverlayEvent::PopupClosed { key } => Ok(self.popup_state_changed(&key, false)),
            OverlayEvent::LayerClick {
                layer,
                position,
                properties,
            } => Ok(self.click_layer(layer, position, properties)),
            OverlayEvent::MapClick { position } => match self.on_map_click.as_mut() {
                Some(handler) => {
                    handler.call(&position);
                    Ok(EventHandled::Handled)
                }
                None => Ok(EventHandled::NotHandled),
            },
        }
    }

    /// Pan, open the popup, then run the caller's handler
    fn click_marker(&mut self, key: &EntityKey) -> Result<EventHandled> {
        let Some(marker) = self.markers.get(key) else {
            return Ok(EventHandled::NotHandled);
        };
        let location = marker.location;
        let popup = marker.popup.clone().filter(|popup| self.popups.contains(popup));

        self.engine.pan_to(location)?;
        if let Some(popup) = popup {
            self.open_popup(&popup)?;
        }

        if let Some(Marker {
            on_click: Some(handler),
            detail,
            ..
        }) = self.markers.get_mut(key)
        {
            handler.call(detail);
        }
        Ok(EventHandled::Handled)
    }

    /// The engine opened or closed a popup by itself
    fn popup_state_changed(&mut self, key: &EntityKey, open: bool) -> EventHandled {
        let Some(popup) = self.popups.get_mut(key) else {
            return EventHandled::NotHandled;
        };
        if open {
            popup.show();
        } else {
            popup.hide();
        }
        let linked = popup.linked_marker.clone();
        let state = if open { IconState::Active } else { IconState::Default };

        if let Err(e) = self.show_marker_icon(linked.as_ref(), state) {
            log::warn!("Failed to update icon for popup {}: {}", key, e);
        }
        EventHandled::Handled
    }

    fn click_layer(
        &mut self,
        layer: LayerId,
        position: Option<LngLat>,
        properties: Option<serde_json::Value>,
    ) -> EventHandled {
        let Some(group) = self.polygons.values_mut().find(|group| group.is_clickable(layer)) else {
            return EventHandled::NotHandled;
        };
        let click = PolygonClick {
            key: group.key.clone(),
            layer,
            position,
            properties,
        };
        match group.on_click.as_mut() {
            Some(handler) => {
                handler.call(&click);
                EventHandled::Handled
            }
            None => EventHandled::NotHandled,
        }
    }

    /// Runs `handler` with the clicked position for every map background click
    pub fn on_map_click<F>(&mut self, handler: F)
    where
        F: FnMut(&LngLat) + 'static,
    {
        self.on_map_click = Some(ClickHandler::new(handler));
    }

    // ---- polygon groups ---------------------------------------------------

    /// Draws one grid polygon, replacing a group with the same id.
    ///
    /// Returns the id of the fill layer, the one that receives clicks. Either every
    /// sub-layer reaches the engine or none does.
    ///
    /// The label and popup sit at the bounding-box center of the geometry after it
    /// was converted to the engine's coordinate system. A popup that fails to open
    /// is logged and the group stays drawn.
    pub fn add_polygon_group(&mut self, feature: Feature, options: PolygonOptions, detail: Detail) -> Result<LayerId> {
        let Some(key) = identity_of(&detail) else {
            log::warn!("add_polygon_group: detail has no uniqueId, ignored");
            return Err(Error::MissingIdentity);
        };

        let data = match self.project_geojson(&GeoJson::FeatureCollection(FeatureCollection::new(vec![feature])))? {
            GeoJson::FeatureCollection(data) => data,
            other => {
                return Err(Error::InvalidGeometry(format!(
                    "expected a feature collection, got {:?}",
                    other
                )))
            }
        };

        let show_popup = options.show_popup;
        let group = PolygonGroup::compose(key.clone(), data, options, &mut self.ids)?;
        add_layers_atomic(&mut self.engine, &group.layers())?;

        let fill = group.fill.id;
        let centroid = group.centroid;
        self.polygons.replace(key.clone(), group, &mut self.engine);

        if show_popup {
            let mut detail = detail;
            detail.extra.insert("longitude".to_string(), centroid.lng.into());
            detail.extra.insert("latitude".to_string(), centroid.lat.into());
            detail.location = Some(centroid.to_position());

            self.popups.detach_one(&key, &mut self.engine);
            self.popups.insert(key.clone(), Popup::new(key.clone(), centroid, detail));
            if let Err(e) = self.open_popup(&key) {
                log::warn!("grid {} drawn but its popup did not open: {}", key, e);
            }
        }

        log::debug!("grid {} drawn with fill {}", key, fill);
        Ok(fill)
    }

    pub fn get_polygon_group(&self, unique_id: &str) -> Option<&PolygonGroup> {
        self.polygons.get(&EntityKey::parse(unique_id)?)
    }

    /// Removes every polygon group
    pub fn delete_polygon_groups(&mut self) -> usize {
        self.polygons.remove_all(&mut self.engine)
    }

    /// Removes one polygon group; returns whether it existed
    pub fn delete_polygon_group(&mut self, unique_id: &str) -> bool {
        match EntityKey::parse(unique_id) {
            Some(key) => self.polygons.detach_one(&key, &mut self.engine),
            None => false,
        }
    }

    // ---- clusters and heatmaps -------------------------------------------

    /// Draws engine-clustered points for `records` under `label`.
    ///
    /// Returns how many records had a usable position.
    pub fn add_cluster(&mut self, records: &[serde_json::Value], label: &str, options: ClusterOptions) -> Result<usize> {
        let project = self.projection()?;
        let data = records_to_points(records, &options.x_field, &options.y_field, project);

        let label = TypeLabel::new(label);
        let cluster = ClusterLayers::compose(label.clone(), data, &options, &mut self.ids);
        add_layers_atomic(&mut self.engine, &cluster.layers())?;

        let count = cluster.point_count();
        self.clusters.replace(label.clone(), cluster, &mut self.engine);
        log::debug!("cluster {} drawn with {} of {} records", label, count, records.len());
        Ok(count)
    }

    pub fn get_cluster(&self, label: &str) -> Option<&ClusterLayers> {
        self.clusters.get(&TypeLabel::new(label))
    }

    pub fn clear_cluster(&mut self, label: Option<&str>) -> usize {
        match label {
            Some(label) => self.clusters.remove_namespace(label, &mut self.engine).unwrap_or(0),
            None => self.clusters.remove_all(&mut self.engine),
        }
    }

    pub fn add_heatmap(&mut self, label: &str, samples: &[HeatSample], options: HeatmapOptions) -> Result<LayerId> {
        let project = self.projection()?;
        let label = TypeLabel::new(label);
        let heatmap = HeatmapLayer::compose(label.clone(), samples, &options, project, &mut self.ids);
        self.engine.add_layer(&heatmap.layer)?;

        let id = heatmap.layer.id;
        self.heatmaps.replace(label, heatmap, &mut self.engine);
        Ok(id)
    }

    pub fn get_heatmap(&self, label: &str) -> Option<&HeatmapLayer> {
        self.heatmaps.get(&TypeLabel::new(label))
    }

    pub fn clear_heatmap(&mut self, label: Option<&str>) -> usize {
        match label {
            Some(label) => self.heatmaps.remove_namespace(label, &mut self.engine).unwrap_or(0),
            None => self.heatmaps.remove_all(&mut self.engine),
        }
    }

    // ---- view -------------------------------------------------------------
    // Positions below are in the engine's coordinate system.

    pub fn zoom(&self) -> f64 {
        self.engine.zoom()
    }

    pub fn center(&self) -> LngLat {
        self.engine.center()
    }

    pub fn pitch(&self) -> f64 {
        self.engine.pitch()
    }

    pub fn set_style(&mut self, style: &str) -> Result<()> {
        self.engine.set_style(style)
    }

    pub fn set_center(&mut self, center: LngLat) -> Result<()> {
        let options = CenterOptions {
            padding: Padding {
                top: CENTER_PADDING_TOP,
                ..Padding::default()
            },
        };
        self.engine.set_center(center, &options)
    }

    /// Rotates the map; any angle is normalized into `[0, 360)`
    pub fn set_rotation(&mut self, degrees: f64) -> Result<()> {
        self.engine.set_rotation(degrees.rem_euclid(360.0))
    }

    pub fn set_zoom_and_center(&mut self, zoom: f64, center: LngLat) -> Result<()> {
        self.engine.set_zoom_and_center(zoom, center)
    }

    pub fn zoom_in(&mut self) -> Result<()> {
        self.engine.zoom_in()
    }

    pub fn zoom_out(&mut self) -> Result<()> {
        self.engine.zoom_out()
    }

    pub fn pan_to(&mut self, center: LngLat) -> Result<()> {
        self.engine.pan_to(center)
    }

    // ---- drawing tools ----------------------------------------------------

    pub fn add_circle(&mut self) -> Result<DrawerId> {
        self.draw.add_circle(&mut self.engine, &mut self.ids)
    }

    pub fn clear_circle(&mut self) -> Result<()> {
        self.draw.clear_circle(&mut self.engine)
    }

    pub fn add_map_util(&mut self) -> Result<ControlId> {
        self.draw.add_map_util(&mut self.engine, &mut self.ids)
    }

    pub fn clear_map_util(&mut self) -> Result<()> {
        self.draw.clear_map_util(&mut self.engine)
    }

    // ---- teardown ---------------------------------------------------------

    /// Removes every overlay. The base map stays.
    pub fn clear_all(&mut self) {
        self.clear_info_window(None);
        self.clear_marker(None);
        self.delete_polygon_groups();
        self.clear_cluster(None);
        self.clear_heatmap(None);

        if let Err(e) = self.draw.clear_circle(&mut self.engine) {
            log::warn!("Failed to clear circle drawer: {}", e);
        }
        if let Err(e) = self.draw.clear_map_util(&mut self.engine) {
            log::warn!("Failed to remove draw control: {}", e);
        }
    }

    /// Tears the session down and hands the engine back
    pub fn detach(mut self) -> E {
        self.clear_all();
        if let Some(base) = self.base_layer.take() {
            if let Err(e) = self.engine.remove_layer(base.id) {
                log::warn!("Failed to remove base layer: {}", e);
            }
        }
        self.engine
    }
}

fn identity_of(detail: &Detail) -> Option<EntityKey> {
    detail.unique_id.as_deref().and_then(EntityKey::parse)
}

/// A session whose source and target agree needs no transform
fn project_with(from: CoordinateSystem, to: CoordinateSystem) -> Result<PointTransformFn> {
    if from == to {
        return Ok(identity);
    }
    pair_transform(from, to).ok_or(Error::UnsupportedTransform { from, to })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::headless::HeadlessEngine;
    use futures::executor::block_on;

    fn session(config: SessionConfig) -> MapSession<HeadlessEngine> {
        block_on(MapSession::attach(HeadlessEngine::new(), config, PathIconResolver::default())).unwrap()
    }

    #[test]
    fn test_attach_creates_map_in_target_crs() {
        let session = session(SessionConfig::default());
        let options = session.engine().map_options().unwrap();

        let expected = crate::core::crs::wgs84_to_gcj02(LngLat::new(120.21289, 30.291124));
        assert!(options.center.approx_eq(&expected, 1e-9));
        assert!(session.engine().is_loaded());
        assert!(session.base_layer().is_some());
        assert_eq!(session.engine().layer_count(), 1);
    }

    #[test]
    fn test_vector_profile_has_no_base_layer() {
        let config = SessionConfig::default().with_base_map(crate::core::config::BaseMapProfile::Vector {
            style: "dark".to_string(),
            token: None,
        });
        let session = session(config);
        assert!(session.base_layer().is_none());
        assert_eq!(session.pitch(), 45.0);
    }

    #[test]
    fn test_same_crs_passes_through() {
        let session = session(SessionConfig::identity(CoordinateSystem::GCJ02));
        let point = LngLat::new(120.0, 30.0);
        assert_eq!(session.project(point).unwrap(), point);
    }

    #[test]
    fn test_rotation_is_normalized() {
        let mut session = session(SessionConfig::default());
        session.set_rotation(-90.0).unwrap();
        assert_eq!(session.engine().rotation(), 270.0);
        session.set_rotation(720.0).unwrap();
        assert_eq!(session.engine().rotation(), 0.0);
    }

    #[test]
    fn test_set_center_pads_top() {
        let mut session = session(SessionConfig::default());
        session.set_center(LngLat::new(121.0, 31.0)).unwrap();

        assert_eq!(session.center(), LngLat::new(121.0, 31.0));
        assert_eq!(session.engine().last_center_options().map(|o| o.padding.top), Some(10.0));
    }

    #[test]
    fn test_marker_without_location_touches_nothing() {
        let mut session = session(SessionConfig::default());
        let result = session.add_marker(Detail::new("device_42"), MarkerOptions::default());

        assert!(matches!(result, Err(Error::MissingLocation)));
        assert!(session.get_all_markers("device").is_none());
        assert_eq!(session.engine().marker_layer_count(), 0);
    }

    #[test]
    fn test_unknown_popup_is_not_found() {
        let mut session = session(SessionConfig::default());
        let result = session.open_popup(&EntityKey::new("device", "1"));
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_detach_returns_a_clean_engine() {
        let mut session = session(SessionConfig::default());
        session
            .add_marker(Detail::new("device_1").with_location(120.0, 30.0), MarkerOptions::default())
            .unwrap();
        session.add_map_util().unwrap();

        let engine = session.detach();
        assert_eq!(engine.layer_count(), 0);
        assert_eq!(engine.marker_layer_count(), 0);
        assert!(engine.controls().is_empty());
    }
}
