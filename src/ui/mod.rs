pub mod icon;
pub mod popup;

pub use icon::{IconResolver, IconVariant, PathIconResolver};
pub use popup::{Popup, PopupOptions};
