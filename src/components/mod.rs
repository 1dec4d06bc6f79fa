//! Built-in UI components

pub mod animated_image;
pub mod button;
pub mod label;
pub mod panel;

pub use animated_image::AnimatedImage;
pub use button::Button;
pub use label::Label;
pub use panel::{FlowPanel, Panel};
