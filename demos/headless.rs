//! Drives a session against the headless engine and prints what would be drawn.
//!
//! Run with `RUST_LOG=debug` to see the overlay lifecycle.

use mapoverlay::prelude::*;
use serde_json::json;

fn main() -> Result<()> {
    mapoverlay::init_logging();
    futures::executor::block_on(run())
}

async fn run() -> Result<()> {
    let config = SessionConfig::from_json_str(
        r#"{
            "sourceCrs": "WGS84",
            "targetCrs": "GCJ02",
            "baseMap": { "kind": "tile", "url": "https://tiles.example.com/{z}/{x}/{y}.png" }
        }"#,
    )?;
    let mut session = MapSession::attach_with_icon_base(HeadlessEngine::new(), config).await?;

    session.add_marker(
        Detail::new("station_1")
            .with_location(120.21289, 30.291124)
            .with_field("name", "West Lake station"),
        MarkerOptions::new("station")
            .popup(true)
            .on_click(|detail: &Detail| println!("clicked {:?}", detail.unique_id)),
    )?;
    session.dispatch(OverlayEvent::MarkerClick {
        key: EntityKey::new("station", "1"),
    })?;

    let grid: Feature = serde_json::from_value(json!({
        "type": "Feature",
        "properties": { "groupName": "Block A" },
        "geometry": {
            "type": "Polygon",
            "coordinates": [[[120.10, 30.20], [120.15, 30.20], [120.15, 30.25], [120.10, 30.25], [120.10, 30.20]]]
        }
    }))?;
    session.add_polygon_group(grid, PolygonOptions::new().show_label(true), Detail::new("grid_A"))?;

    let devices = vec![
        json!({ "deviceLon": 120.11, "deviceLat": 30.21 }),
        json!({ "deviceLon": "120.12", "deviceLat": "30.22" }),
    ];
    session.add_cluster(&devices, "devices", ClusterOptions::default())?;
    session.add_heatmap(
        "plants",
        &[HeatSample::new(120.13, 30.23).with_property("capacity", 3200)],
        HeatmapOptions::default(),
    )?;

    let marker = session.get_marker("station_1").map(|m| (m.location, m.element.state));
    println!("station_1: {:?}", marker);

    let engine = session.detach();
    for layer in engine.layers() {
        println!("left behind: {} ({})", layer.id, layer.kind);
    }
    println!("layers after detach: {}", engine.layer_count());
    Ok(())
}
