//! Overlay defaults taken from the reference map shell.
//! Keeping them in a single place makes it easier to tweak session-wide magic numbers.

/// Default map center (longitude, latitude) in the source CRS.
pub const DEFAULT_CENTER: (f64, f64) = (120.21289, 30.291124);

/// Top padding applied whenever the view is re-centered.
pub const CENTER_PADDING_TOP: f64 = 10.0;

/// Zoom range shared by every base map profile.
pub const MIN_ZOOM: f64 = 2.0;
pub const MAX_ZOOM: f64 = 19.0;

/// Raster tile size of the base layer, in pixels.
pub const TILE_SIZE: u32 = 256;

/// Pixel offset of a popup relative to its anchor.
pub const POPUP_OFFSETS: [f64; 2] = [0.0, 60.0];

/// Marker type used when the caller does not name one.
pub const DEFAULT_MARKER_TYPE: &str = "default";

/// Default fill/border color of a grid polygon group.
pub const DEFAULT_GRID_COLOR: &str = "#0DCCFF";

/// Extrusion height of a grid fill and its wall.
pub const GRID_HEIGHT: f64 = 200.0;

/// The upper border floats just above the extrusion.
pub const GRID_TOP_BORDER_HEIGHT: f64 = 201.0;

/// z-index of grid labels, above every other overlay.
pub const LABEL_Z_INDEX: i32 = 500;

/// z-index of heatmap layers.
pub const HEATMAP_Z_INDEX: i32 = 2;

/// Field carrying the aggregate count on clustered features.
pub const CLUSTER_COUNT_FIELD: &str = "point_count";
