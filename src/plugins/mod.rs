pub mod draw;

pub use draw::{CircleDrawOptions, Control, ControlId, ControlKind, DrawTools, DrawerId};
