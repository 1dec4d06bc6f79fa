//! Component styles
//!
//! A [`Style`] is a plain value describing how the default paint routine
//! draws a component. Components share styles through `Arc<Style>` and never
//! mutate a shared one: a component that needs its own look gets a new value.

use crate::color::Color;
use crate::text::Font;
use image::RgbaImage;
use std::sync::Arc;

/// Visual parameters of a component
#[derive(Debug, Clone)]
pub struct Style {
    /// Fill behind the component, `None` for no fill
    pub background_color: Option<Color>,
    /// Image scaled over the component rectangle, `None` for no image
    pub background_image: Option<Arc<RgbaImage>>,
    /// Multiplicative tint applied while hovered
    pub hover_tint: Color,
    /// Main foreground color
    pub primary_color: Color,
    /// Alternate foreground color
    pub secondary_color: Color,
    /// Border color, `None` for no border
    pub border_color: Option<Color>,
    /// Border thickness in pixels, 0 for no border
    pub border_width: u32,
    /// Font for any displayed text
    pub font: Font,
    /// Whether redrawing this component repaints its parent first
    pub force_parent_redraw: bool,
}

impl Default for Style {
    fn default() -> Self {
        Style {
            background_color: Some(Color::white()),
            background_image: None,
            hover_tint: Color::light_gray(),
            primary_color: Color::black(),
            secondary_color: Color::black(),
            border_color: Some(Color::black()),
            border_width: 1,
            font: Font::default(),
            force_parent_redraw: false,
        }
    }
}

impl Style {
    /// Create the default style
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the background fill
    pub fn background(mut self, color: impl Into<Option<Color>>) -> Self {
        self.background_color = color.into();
        self
    }

    /// Set the background image
    pub fn background_image(mut self, image: RgbaImage) -> Self {
        self.background_image = Some(Arc::new(image));
        self
    }

    /// Set the hover tint
    pub fn hover_tint(mut self, color: Color) -> Self {
        self.hover_tint = color;
        self
    }

    /// Set the primary foreground color
    pub fn primary(mut self, color: Color) -> Self {
        self.primary_color = color;
        self
    }

    /// Set the secondary foreground color
    pub fn secondary(mut self, color: Color) -> Self {
        self.secondary_color = color;
        self
    }

    /// Set border color and width
    pub fn border(mut self, color: impl Into<Option<Color>>, width: u32) -> Self {
        self.border_color = color.into();
        self.border_width = width;
        self
    }

    /// Remove the border
    pub fn borderless(mut self) -> Self {
        self.border_width = 0;
        self
    }

    /// Set the font
    pub fn font(mut self, font: Font) -> Self {
        self.font = font;
        self
    }

    /// Repaint the parent whenever this component is redrawn
    pub fn force_parent_redraw(mut self, force: bool) -> Self {
        self.force_parent_redraw = force;
        self
    }

    /// Border color if a border should be drawn at all
    pub fn visible_border(&self) -> Option<Color> {
        match self.border_color {
            Some(color) if self.border_width > 0 => Some(color),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_style() {
        let style = Style::default();
        assert_eq!(style.background_color, Some(Color::white()));
        assert_eq!(style.hover_tint, Color::rgb(190, 190, 190));
        assert_eq!(style.border_width, 1);
        assert!(!style.force_parent_redraw);
        assert!(style.background_image.is_none());
    }

    #[test]
    fn test_zero_width_hides_border() {
        let style = Style::new().border(Color::rgb(255, 0, 0), 0);
        assert_eq!(style.visible_border(), None);

        let style = Style::new().border(None, 3);
        assert_eq!(style.visible_border(), None);

        let style = Style::new().border(Color::rgb(255, 0, 0), 2);
        assert_eq!(style.visible_border(), Some(Color::rgb(255, 0, 0)));
    }

    #[test]
    fn test_builder_chain() {
        let style = Style::new()
            .background(None)
            .primary(Color::rgb(0, 0, 255))
            .force_parent_redraw(true)
            .borderless();

        assert_eq!(style.background_color, None);
        assert_eq!(style.primary_color, Color::rgb(0, 0, 255));
        assert!(style.force_parent_redraw);
        assert_eq!(style.visible_border(), None);
    }
}
