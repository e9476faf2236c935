use mapoverlay::prelude::*;
use mapoverlay::core::crs::wgs84_to_gcj02;
use std::cell::RefCell;
use std::rc::Rc;

/// Marker and popup lifecycle driven through a headless engine
#[cfg(test)]
mod session_tests {
    use super::*;

    async fn attached(config: SessionConfig) -> MapSession<HeadlessEngine> {
        mapoverlay::init_logging();
        MapSession::attach(HeadlessEngine::new(), config, PathIconResolver::new("/icons"))
            .await
            .unwrap()
    }

    fn key(id: &str) -> EntityKey {
        EntityKey::parse(id).unwrap()
    }

    #[tokio::test]
    async fn test_attach_waits_for_load() {
        let (engine, signal) = HeadlessEngine::with_load_gate();
        let mut attach = Box::pin(MapSession::attach(
            engine,
            SessionConfig::default(),
            PathIconResolver::default(),
        ));

        assert!(futures::poll!(attach.as_mut()).is_pending());
        assert!(futures::poll!(attach.as_mut()).is_pending());

        signal.fire();
        let session = attach.await.unwrap();
        assert!(session.engine().is_loaded());
    }

    #[tokio::test]
    async fn test_marker_location_is_transformed() {
        let mut session = attached(SessionConfig::default()).await;
        let detail = Detail::new("station_1").with_location(120.21289, 30.291124);

        session.add_marker(detail, MarkerOptions::default()).unwrap();

        let expected = wgs84_to_gcj02(LngLat::new(120.21289, 30.291124));
        let marker = session.get_marker("station_1").unwrap();
        assert!(marker.location.approx_eq(&expected, 1e-9));
        assert_eq!(session.get_all_markers("station").map(|m| m.len()), Some(1));

        let view = session.engine().marker(&key("station_1")).unwrap();
        assert!(view.location.approx_eq(&expected, 1e-9));
        assert_eq!(session.engine().pan_history().last(), Some(&marker.location));
    }

    #[tokio::test]
    async fn test_markers_share_namespace_layer() {
        let mut session = attached(SessionConfig::identity(CoordinateSystem::GCJ02)).await;
        session
            .add_marker(Detail::new("device_42").with_location(120.1, 30.1), MarkerOptions::new("pump"))
            .unwrap();
        session
            .add_marker(Detail::new("device_43").with_location(120.2, 30.2), MarkerOptions::new("pump"))
            .unwrap();

        let markers = session.get_all_markers("device").unwrap();
        assert_eq!(markers.len(), 2);
        assert!(markers.contains_key(&key("device_42")));
        assert!(markers.contains_key(&key("device_43")));

        let layer = session.marker_layer("device").unwrap().id;
        assert_eq!(session.engine().marker_layer_count(), 1);
        assert_eq!(session.engine().markers(layer).len(), 2);

        let marker = session.get_marker("device_42").unwrap();
        assert_eq!(marker.element.default_icon.src, "/icons/pump_default.png");
        assert_eq!(marker.element.active_icon.src, "/icons/pump_active.png");
    }

    #[tokio::test]
    async fn test_missing_identity_leaves_state_unchanged() {
        let mut session = attached(SessionConfig::default()).await;
        let mut detail = Detail::default().with_location(120.0, 30.0);

        let result = session.add_marker(detail.clone(), MarkerOptions::default().popup(true));
        assert!(matches!(result, Err(OverlayError::MissingIdentity)));

        detail.unique_id = Some(String::new());
        let result = session.add_marker(detail, MarkerOptions::default());
        assert!(matches!(result, Err(OverlayError::MissingIdentity)));

        assert_eq!(session.engine().marker_layer_count(), 0);
        assert_eq!(session.engine().marker_count(), 0);
        assert!(session.engine().pan_history().is_empty());
    }

    #[tokio::test]
    async fn test_trailing_separator_names_another_entity() {
        let mut session = attached(SessionConfig::identity(CoordinateSystem::GCJ02)).await;
        session
            .add_marker(Detail::new("device").with_location(120.0, 30.0), MarkerOptions::default())
            .unwrap();
        session
            .add_marker(Detail::new("device_").with_location(121.0, 31.0), MarkerOptions::default())
            .unwrap();

        assert_eq!(session.get_all_markers("device").map(|m| m.len()), Some(2));
        assert_eq!(session.get_marker("device").unwrap().location, LngLat::new(120.0, 30.0));
        assert_eq!(session.get_marker("device_").unwrap().location, LngLat::new(121.0, 31.0));
        assert_eq!(session.engine().marker_count(), 2);
    }

    #[tokio::test]
    async fn test_rejected_marker_rolls_back_its_new_layer() {
        let mut engine = HeadlessEngine::new();
        engine.fail_marker_add_at(0);
        let mut session = MapSession::attach(engine, SessionConfig::default(), PathIconResolver::default())
            .await
            .unwrap();

        let result = session.add_marker(
            Detail::new("device_1").with_location(120.0, 30.0),
            MarkerOptions::default().popup(true),
        );

        assert!(matches!(result, Err(OverlayError::Engine(_))));
        assert!(session.get_all_markers("device").is_none());
        assert!(session.get_popup("device_1").is_none());
        assert!(session.marker_layer("device").is_none());
        assert_eq!(session.engine().marker_layer_count(), 0);
        assert!(session.engine().pan_history().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_replacement_keeps_the_old_marker() {
        let mut engine = HeadlessEngine::new();
        engine.fail_marker_add_at(1);
        let mut session = MapSession::attach(
            engine,
            SessionConfig::identity(CoordinateSystem::WGS84),
            PathIconResolver::default(),
        )
        .await
        .unwrap();

        session
            .add_marker(
                Detail::new("device_1").with_location(1.0, 1.0),
                MarkerOptions::default().popup(true),
            )
            .unwrap();
        session.open_popup(&key("device_1")).unwrap();

        let result = session.add_marker(
            Detail::new("device_1").with_location(2.0, 2.0),
            MarkerOptions::default(),
        );

        assert!(matches!(result, Err(OverlayError::Engine(_))));
        assert_eq!(session.get_marker("device_1").unwrap().location, LngLat::new(1.0, 1.0));
        assert!(session.get_popup("device_1").unwrap().open);
        assert!(session.engine().is_popup_open(&key("device_1")));
        assert_eq!(session.engine().marker_count(), 1);
        let view = session.engine().marker(&key("device_1")).unwrap();
        assert_eq!(view.location, LngLat::new(1.0, 1.0));
        assert!(session.marker_layer("device").is_some());
    }

    #[tokio::test]
    async fn test_popups_are_grouped_by_namespace() {
        let mut session = attached(SessionConfig::default()).await;
        for id in ["device_1", "device_2", "station_1"] {
            session
                .add_marker(Detail::new(id).with_location(120.0, 30.0), MarkerOptions::default().popup(true))
                .unwrap();
        }
        session
            .add_marker(Detail::new("device_3").with_location(120.0, 30.0), MarkerOptions::default())
            .unwrap();

        let devices = session.get_all_popups("device").unwrap();
        assert_eq!(devices.len(), 2);
        assert!(devices.contains_key(&key("device_1")));
        assert!(!devices.contains_key(&key("device_3")));
        assert_eq!(session.get_all_popups("station").map(|p| p.len()), Some(1));
        assert!(session.get_all_popups("pump").is_none());
    }

    #[tokio::test]
    async fn test_icon_base_from_config() {
        let config = SessionConfig::from_json_str(r#"{ "iconBase": "/static/markers" }"#).unwrap();
        let mut session = MapSession::attach_with_icon_base(HeadlessEngine::new(), config)
            .await
            .unwrap();
        session
            .add_marker(Detail::new("pump_1").with_location(120.0, 30.0), MarkerOptions::new("pump"))
            .unwrap();

        let marker = session.get_marker("pump_1").unwrap();
        assert_eq!(marker.element.default_icon.src, "/static/markers/pump_default.png");
    }

    #[tokio::test]
    async fn test_first_cluster_flag_wins() {
        let mut session = attached(SessionConfig::default()).await;
        session
            .add_marker(
                Detail::new("device_1").with_location(120.0, 30.0),
                MarkerOptions::default().cluster(true),
            )
            .unwrap();
        session
            .add_marker(
                Detail::new("device_2").with_location(120.0, 30.0),
                MarkerOptions::default().cluster(false),
            )
            .unwrap();

        assert!(session.marker_layer("device").unwrap().cluster);
        assert_eq!(session.engine().marker_layer_count(), 1);
    }

    #[tokio::test]
    async fn test_replacing_a_marker_detaches_the_old_one() {
        let mut session = attached(SessionConfig::identity(CoordinateSystem::WGS84)).await;
        session
            .add_marker(Detail::new("device_42").with_location(1.0, 1.0), MarkerOptions::default())
            .unwrap();
        session
            .add_marker(Detail::new("device_42").with_location(2.0, 2.0), MarkerOptions::default())
            .unwrap();

        assert_eq!(session.get_all_markers("device").map(|m| m.len()), Some(1));
        assert_eq!(session.engine().marker_count(), 1);
        let view = session.engine().marker(&key("device_42")).unwrap();
        assert_eq!(view.location, LngLat::new(2.0, 2.0));
    }

    #[tokio::test]
    async fn test_click_opens_popup_and_swaps_icon() {
        let mut session = attached(SessionConfig::default()).await;
        let clicked = Rc::new(RefCell::new(Vec::new()));
        let sink = clicked.clone();

        session
            .add_marker(
                Detail::new("device_42")
                    .with_location(120.0, 30.0)
                    .with_field("name", "Pump 42"),
                MarkerOptions::new("pump")
                    .popup(true)
                    .on_click(move |detail: &Detail| sink.borrow_mut().push(detail.extra["name"].clone())),
            )
            .unwrap();

        let handled = session
            .dispatch(OverlayEvent::MarkerClick { key: key("device_42") })
            .unwrap();
        assert_eq!(handled, EventHandled::Handled);
        assert_eq!(clicked.borrow().len(), 1);
        assert_eq!(clicked.borrow()[0], "Pump 42");

        assert!(session.get_popup("device_42").unwrap().open);
        assert!(session.engine().is_popup_open(&key("device_42")));
        assert_eq!(session.get_marker("device_42").unwrap().element.state, IconState::Active);
        let view = session.engine().marker(&key("device_42")).unwrap();
        assert_eq!(view.icon, "/icons/pump_active.png");

        // The user dismisses the popup through its close button
        session
            .dispatch(OverlayEvent::PopupClosed { key: key("device_42") })
            .unwrap();
        assert!(!session.get_popup("device_42").unwrap().open);
        assert_eq!(session.get_marker("device_42").unwrap().element.state, IconState::Default);
        let view = session.engine().marker(&key("device_42")).unwrap();
        assert_eq!(view.icon, "/icons/pump_default.png");

        // Every click reopens it
        session
            .dispatch(OverlayEvent::MarkerClick { key: key("device_42") })
            .unwrap();
        assert_eq!(clicked.borrow().len(), 2);
        assert!(session.get_popup("device_42").unwrap().open);
    }

    #[tokio::test]
    async fn test_engine_opened_popup_activates_icon() {
        let mut session = attached(SessionConfig::default()).await;
        session
            .add_marker(
                Detail::new("device_1").with_location(120.0, 30.0),
                MarkerOptions::default().popup(true),
            )
            .unwrap();

        session
            .dispatch(OverlayEvent::PopupOpened { key: key("device_1") })
            .unwrap();
        assert_eq!(session.get_marker("device_1").unwrap().element.state, IconState::Active);

        let unknown = session
            .dispatch(OverlayEvent::PopupOpened { key: key("device_9") })
            .unwrap();
        assert_eq!(unknown, EventHandled::NotHandled);
    }

    #[tokio::test]
    async fn test_clear_info_window_resets_icons() {
        let mut session = attached(SessionConfig::default()).await;
        for id in ["device_1", "device_2", "station_1"] {
            session
                .add_marker(Detail::new(id).with_location(120.0, 30.0), MarkerOptions::default().popup(true))
                .unwrap();
            session.open_popup(&key(id)).unwrap();
        }
        assert_eq!(session.engine().open_popup_count(), 3);

        assert_eq!(session.clear_info_window(Some("device")), 2);
        assert!(session.get_all_popups("device").is_none());
        assert!(session.get_popup("station_1").is_some());
        assert_eq!(session.engine().open_popup_count(), 1);
        assert_eq!(session.get_marker("device_1").unwrap().element.state, IconState::Default);

        // Clicking a marker whose popup is gone still pans
        session
            .dispatch(OverlayEvent::MarkerClick { key: key("device_1") })
            .unwrap();
        assert_eq!(session.engine().open_popup_count(), 1);

        assert_eq!(session.clear_info_window(None), 1);
        assert_eq!(session.engine().open_popup_count(), 0);
        assert_eq!(session.get_marker("station_1").unwrap().element.state, IconState::Default);
    }

    #[tokio::test]
    async fn test_clear_marker_detaches_and_deletes() {
        let mut session = attached(SessionConfig::default()).await;
        for id in ["device_1", "device_2", "station_1"] {
            session
                .add_marker(Detail::new(id).with_location(120.0, 30.0), MarkerOptions::default())
                .unwrap();
        }

        assert_eq!(session.clear_marker(Some("device")), 2);
        assert!(session.get_all_markers("device").is_none());
        assert!(session.marker_layer("device").is_none());
        assert_eq!(session.engine().marker_layer_count(), 1);
        assert_eq!(session.engine().marker_count(), 1);

        assert_eq!(session.clear_marker(Some("device")), 0);
        assert_eq!(session.clear_marker(None), 1);
        assert_eq!(session.engine().marker_layer_count(), 0);
    }

    #[tokio::test]
    async fn test_map_click_handler() {
        let mut session = attached(SessionConfig::default()).await;
        let event = OverlayEvent::MapClick {
            position: LngLat::new(120.0, 30.0),
        };
        assert_eq!(session.dispatch(event.clone()).unwrap(), EventHandled::NotHandled);

        let seen = Rc::new(RefCell::new(None));
        let sink = seen.clone();
        session.on_map_click(move |position: &LngLat| *sink.borrow_mut() = Some(*position));

        assert_eq!(session.dispatch(event).unwrap(), EventHandled::Handled);
        assert_eq!(*seen.borrow(), Some(LngLat::new(120.0, 30.0)));
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let mut first = attached(SessionConfig::default()).await;
        let second = attached(SessionConfig::default()).await;

        first
            .add_marker(Detail::new("device_1").with_location(120.0, 30.0), MarkerOptions::default())
            .unwrap();

        assert!(first.get_marker("device_1").is_some());
        assert!(second.get_marker("device_1").is_none());
    }

    #[tokio::test]
    async fn test_view_controls_and_drawing_tools() {
        let mut session = attached(SessionConfig::default()).await;
        assert_eq!(session.zoom(), 10.0);

        session.zoom_in().unwrap();
        assert_eq!(session.zoom(), 11.0);
        session.set_zoom_and_center(3.0, LngLat::new(100.0, 20.0)).unwrap();
        session.zoom_out().unwrap();
        session.zoom_out().unwrap();
        assert_eq!(session.zoom(), 2.0);
        assert_eq!(session.center(), LngLat::new(100.0, 20.0));

        session.set_style("dark").unwrap();
        assert_eq!(session.engine().style(), Some("dark"));

        let drawer = session.add_circle().unwrap();
        session.clear_circle().unwrap();
        assert_eq!(session.engine().drawer_clears(drawer), 1);
        assert_eq!(session.engine().drawer_deletes(drawer), 1);

        session.add_map_util().unwrap();
        session.add_map_util().unwrap();
        assert_eq!(session.engine().controls().len(), 1);
        session.clear_map_util().unwrap();
        assert!(session.engine().controls().is_empty());
    }
}
