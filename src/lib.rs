//! keelson - a retained-mode UI core with dirty-region repainting
//!
//! Components live in an arena owned by [`Ui`] and form a tree under a
//! root panel. Each frame:
//! - input is routed to the component under the pointer or with focus
//! - components update with the elapsed time
//! - only components marked dirty repaint onto the [`Canvas`]
//! - only the regions that changed are presented
//!
//! Presentation goes through the [`Display`] trait. The `tui` feature
//! (on by default) adds a terminal display using Kitty graphics or
//! Unicode half blocks.

pub mod app;
pub mod canvas;
pub mod color;
pub mod component;
pub mod components;
pub mod config;
pub mod event;
#[cfg(feature = "tui")]
pub mod graphics;
pub mod layout;
pub mod render;
pub mod router;
pub mod style;
#[cfg(feature = "tui")]
pub mod terminal;
pub mod text;
pub mod tree;

// Re-export commonly used types
pub use app::{App, FrameClock, Scene};
pub use canvas::Canvas;
pub use color::Color;
pub use component::{ComponentId, DrawContext, EventContext, Widget};
pub use components::{AnimatedImage, Button, FlowPanel, Label, Panel};
pub use config::Config;
#[cfg(feature = "tui")]
pub use event::EventPoller;
pub use event::{Event, InputQueue, InputSource, Key, KeyPress, Modifiers, MouseButton};
#[cfg(feature = "tui")]
pub use graphics::GraphicsBackend;
pub use layout::{Axis, FlowLayout, Point, Rect};
#[cfg(feature = "tui")]
pub use render::TerminalDisplay;
pub use render::{DirtyRegion, Display, HeadlessDisplay};
pub use router::EventRouter;
pub use style::Style;
#[cfg(feature = "tui")]
pub use terminal::{TerminalCapabilities, TerminalContext, TerminalGeometry};
pub use text::Font;
pub use tree::{HostRequest, Ui};
