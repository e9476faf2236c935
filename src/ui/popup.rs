use crate::{
    core::{constants::POPUP_OFFSETS, geo::LngLat},
    data::records::Detail,
    layers::key::EntityKey,
    rendering::engine::RenderEngine,
    traits::EngineResource,
    Result,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopupOptions {
    /// Pixel offset from the anchor
    pub offsets: [f64; 2],
    pub close_button: bool,
    pub close_on_click: bool,
}

impl Default for PopupOptions {
    fn default() -> Self {
        Self {
            offsets: POPUP_OFFSETS,
            close_button: true,
            close_on_click: true,
        }
    }
}

/// An information window anchored to a map position.
///
/// The host renders `detail`; the session only tracks identity and open state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Popup {
    pub key: EntityKey,
    pub anchor: LngLat,
    pub options: PopupOptions,
    pub detail: Detail,
    pub open: bool,
    /// Marker whose icon follows this popup's open state
    pub linked_marker: Option<EntityKey>,
}

impl Popup {
    pub fn new(key: EntityKey, anchor: LngLat, detail: Detail) -> Self {
        Self {
            key,
            anchor,
            options: PopupOptions::default(),
            detail,
            open: false,
            linked_marker: None,
        }
    }

    pub fn with_options(mut self, options: PopupOptions) -> Self {
        self.options = options;
        self
    }

    pub fn linked_to(mut self, marker: EntityKey) -> Self {
        self.linked_marker = Some(marker);
        self
    }

    pub fn show(&mut self) {
        self.open = true;
    }

    pub fn hide(&mut self) {
        self.open = false;
    }
}

impl EngineResource for Popup {
    fn detach(&self, engine: &mut dyn RenderEngine) -> Result<()> {
        if self.open {
            engine.close_popup(&self.key)
        } else {
            Ok(())
        }
    }
}
