//! Pass-throughs to the engine's drawing tools: a freehand circle drawer and a
//! generic draw control. Shapes drawn with them are owned by the engine.

use crate::{layers::base::IdAllocator, rendering::engine::RenderEngine, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DrawerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControlId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlKind {
    /// Toolbar with the engine's drawing modes
    Draw,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Control {
    pub id: ControlId,
    pub kind: ControlKind,
    pub options: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircleDrawOptions {
    /// Allow more than one circle at a time
    pub multiple: bool,
    pub editable: bool,
    pub adsorb_options: serde_json::Value,
}

impl Default for CircleDrawOptions {
    fn default() -> Self {
        Self {
            multiple: false,
            editable: false,
            adsorb_options: serde_json::json!({}),
        }
    }
}

/// Drawing tools currently installed on a map
#[derive(Debug, Default)]
pub struct DrawTools {
    circle: Option<DrawerId>,
    control: Option<Control>,
}

impl DrawTools {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn circle_drawer(&self) -> Option<DrawerId> {
        self.circle
    }

    pub fn control(&self) -> Option<&Control> {
        self.control.as_ref()
    }

    /// Installs a single-circle drawer, discarding the shape of a previous one
    pub fn add_circle(&mut self, engine: &mut dyn RenderEngine, ids: &mut IdAllocator) -> Result<DrawerId> {
        self.clear_circle(engine)?;

        let id = DrawerId(ids.next_id());
        engine.create_circle_drawer(id, &CircleDrawOptions::default())?;
        self.circle = Some(id);
        log::debug!("circle drawer {:?} installed", id);
        Ok(id)
    }

    /// Clears the drawer and deletes the feature being drawn. The drawer stays.
    pub fn clear_circle(&mut self, engine: &mut dyn RenderEngine) -> Result<()> {
        if let Some(id) = self.circle {
            engine.clear_drawer(id)?;
            engine.delete_current_feature(id)?;
        }
        Ok(())
    }

    /// Replaces the draw control
    pub fn add_map_util(&mut self, engine: &mut dyn RenderEngine, ids: &mut IdAllocator) -> Result<ControlId> {
        self.clear_map_util(engine)?;

        let control = Control {
            id: ControlId(ids.next_id()),
            kind: ControlKind::Draw,
            options: serde_json::json!({}),
        };
        engine.add_control(&control)?;
        let id = control.id;
        self.control = Some(control);
        Ok(id)
    }

    pub fn clear_map_util(&mut self, engine: &mut dyn RenderEngine) -> Result<()> {
        if let Some(control) = self.control.take() {
            engine.remove_control(control.id)?;
        }
        Ok(())
    }
}
