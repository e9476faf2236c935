use crate::{
    core::{constants::DEFAULT_MARKER_TYPE, geo::LngLat},
    data::records::Detail,
    input::events::ClickHandler,
    layers::{base::LayerId, key::EntityKey},
    rendering::engine::RenderEngine,
    traits::EngineResource,
    ui::icon::{IconResolver, IconVariant},
    Result,
};
use serde::{Deserialize, Serialize};

/// One image of a marker element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Icon {
    pub src: String,
    pub class_name: String,
}

/// Which icon a marker currently shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconState {
    #[default]
    Default,
    Active,
}

/// Visual element of a marker.
///
/// Carries both icon variants; exactly one of them is shown at any time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerElement {
    pub class_name: String,
    pub default_icon: Icon,
    pub active_icon: Icon,
    pub state: IconState,
}

impl MarkerElement {
    pub fn new(marker_type: &str, icons: &dyn IconResolver) -> Self {
        let icon = |variant: IconVariant, class_name: &str| Icon {
            src: icons.resolve_icon(&variant.asset_name(marker_type)),
            class_name: class_name.to_string(),
        };

        Self {
            class_name: "marker-label".to_string(),
            default_icon: icon(IconVariant::Default, "marker-default-image"),
            active_icon: icon(IconVariant::Active, "marker-active-image"),
            state: IconState::Default,
        }
    }

    /// The icon on display
    pub fn visible_icon(&self) -> &Icon {
        match self.state {
            IconState::Default => &self.default_icon,
            IconState::Active => &self.active_icon,
        }
    }

    /// Switches icons; returns whether anything changed
    pub fn show(&mut self, state: IconState) -> bool {
        let changed = self.state != state;
        self.state = state;
        changed
    }
}

/// Engine-side container of every marker of one namespace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerLayer {
    pub id: LayerId,
    pub namespace: String,
    /// Fixed when the layer is created
    pub cluster: bool,
}

impl EngineResource for MarkerLayer {
    fn detach(&self, engine: &mut dyn RenderEngine) -> Result<()> {
        engine.remove_marker_layer(self.id)
    }
}

/// A placed marker
#[derive(Debug)]
pub struct Marker {
    pub key: EntityKey,
    pub layer: LayerId,
    /// Position in the engine's coordinate system
    pub location: LngLat,
    pub element: MarkerElement,
    /// Caller payload, echoed back on click
    pub detail: Detail,
    /// Popup opened by a click, if one was requested
    pub popup: Option<EntityKey>,
    pub(crate) on_click: Option<ClickHandler<Detail>>,
}

impl EngineResource for Marker {
    fn detach(&self, engine: &mut dyn RenderEngine) -> Result<()> {
        engine.remove_marker(self.layer, &self.key)
    }
}

/// How `add_marker` should place a marker
#[derive(Debug)]
pub struct MarkerOptions {
    /// Selects the icon pair
    pub marker_type: String,
    /// Only honoured by the first marker of a namespace
    pub cluster: bool,
    /// Create a popup that opens on click
    pub popup: bool,
    pub on_click: Option<ClickHandler<Detail>>,
}

impl MarkerOptions {
    pub fn new(marker_type: impl Into<String>) -> Self {
        Self {
            marker_type: marker_type.into(),
            ..Self::default()
        }
    }

    pub fn cluster(mut self, cluster: bool) -> Self {
        self.cluster = cluster;
        self
    }

    pub fn popup(mut self, popup: bool) -> Self {
        self.popup = popup;
        self
    }

    pub fn on_click<F>(mut self, handler: F) -> Self
    where
        F: FnMut(&Detail) + 'static,
    {
        self.on_click = Some(ClickHandler::new(handler));
        self
    }
}

impl Default for MarkerOptions {
    fn default() -> Self {
        Self {
            marker_type: DEFAULT_MARKER_TYPE.to_string(),
            cluster: false,
            popup: false,
            on_click: None,
        }
    }
}
