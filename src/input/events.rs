use crate::{
    core::geo::LngLat,
    layers::{base::LayerId, key::EntityKey},
};
use serde::{Deserialize, Serialize};

/// Interaction events the host feeds back into a session.
///
/// The render engine and UI shell observe clicks and popup state; translating them
/// into these values is the host's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OverlayEvent {
    /// A marker element was clicked
    MarkerClick { key: EntityKey },
    /// A popup became visible (user or engine initiated)
    PopupOpened { key: EntityKey },
    /// A popup was dismissed, e.g. through its close button
    PopupClosed { key: EntityKey },
    /// A feature of a layer was clicked
    LayerClick {
        layer: LayerId,
        position: Option<LngLat>,
        properties: Option<serde_json::Value>,
    },
    /// The map background was clicked
    MapClick { position: LngLat },
}

/// Whether an event was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventHandled {
    Handled,
    NotHandled,
}

/// A caller-supplied callback invoked synchronously from event dispatch
pub struct ClickHandler<T>(Box<dyn FnMut(&T)>);

impl<T> ClickHandler<T> {
    pub fn new<F>(handler: F) -> Self
    where
        F: FnMut(&T) + 'static,
    {
        Self(Box::new(handler))
    }

    pub fn call(&mut self, value: &T) {
        (self.0)(value)
    }
}

impl<T> std::fmt::Debug for ClickHandler<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ClickHandler(..)")
    }
}
