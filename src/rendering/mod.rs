pub mod engine;
pub mod headless;

// Re-export main types
pub use engine::{add_layers_atomic, CenterOptions, Padding, RenderEngine};
pub use headless::{HeadlessEngine, LoadSignal, MarkerView};
