//! Text label component

use crate::color::Color;
use crate::component::{DrawContext, Widget};
use crate::style::Style;
use crate::text::Font;
use anyhow::Result;
use image::RgbaImage;

/// Rasterized text, reused while text, color and font stay the same
struct CachedText {
    text: String,
    color: Color,
    font: Font,
    image: Option<RgbaImage>,
}

/// Single line of text centered in the component
///
/// Text is drawn with the style's font and primary color and clipped to the
/// component rectangle.
pub struct Label {
    text: String,
    cache: Option<CachedText>,
}

impl Label {
    pub fn new(text: impl Into<String>) -> Self {
        Label {
            text: text.into(),
            cache: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the text. Use [`crate::Ui::edit`] so the label repaints.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    fn raster(&mut self, style: &Style) -> Option<&RgbaImage> {
        let color = style.primary_color;
        let font = &style.font;
        let stale = match &self.cache {
            Some(cached) => {
                cached.text != self.text
                    || cached.color != color
                    || cached.font.size() != font.size()
                    || !cached.font.same_face(font)
            }
            None => true,
        };

        if stale {
            self.cache = Some(CachedText {
                text: self.text.clone(),
                color,
                font: font.clone(),
                image: font.render(&self.text, color),
            });
        }

        self.cache.as_ref().and_then(|cached| cached.image.as_ref())
    }

    /// Draw the text centered on the component, clipped to it
    pub(crate) fn draw_text(&mut self, cx: &mut DrawContext<'_>) {
        let style = cx.style();
        if let Some(image) = self.raster(style) {
            cx.blit_centered(image);
        }
    }
}

impl Widget for Label {
    fn name(&self) -> &str {
        "Label"
    }

    fn draw(&mut self, cx: &mut DrawContext<'_>) -> Result<()> {
        cx.paint_base();
        self.draw_text(cx);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use crate::layout::Rect;
    use crate::tree::Ui;

    #[test]
    fn test_set_text_through_edit_repaints() {
        let mut ui = Ui::new(Rect::new(0.0, 0.0, 100.0, 50.0));
        let root = ui.root();
        let label = ui.spawn(root, Rect::new(0.0, 0.0, 100.0, 50.0), None, Label::new("Play"));

        ui.render(&mut Canvas::new(100, 50), &mut Vec::new()).unwrap();
        assert!(!ui.is_dirty(label));

        ui.edit::<Label, _>(label, |label| label.set_text("Quit"));

        assert!(ui.is_dirty(label));
        assert_eq!(ui.widget::<Label>(label).map(Label::text), Some("Quit"));
    }

    #[test]
    fn test_faceless_label_paints_base_only() {
        let mut ui = Ui::new(Rect::new(0.0, 0.0, 100.0, 50.0));
        let root = ui.root();
        ui.spawn(
            root,
            Rect::new(0.0, 0.0, 100.0, 50.0),
            Some(Style::new().borderless()),
            Label::new("Play"),
        );

        let mut canvas = Canvas::new(100, 50);
        let mut changed = Vec::new();
        ui.render(&mut canvas, &mut changed).unwrap();

        // root background and border, then the label background
        assert_eq!(changed.len(), 6);
        assert_eq!(canvas.pixel(50, 25), Some(Color::white()));
    }

    #[test]
    fn test_new_face_invalidates_raster() {
        let Ok(face) = Font::load("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf", 30.0) else {
            return;
        };

        let mut ui = Ui::new(Rect::new(0.0, 0.0, 100.0, 50.0));
        let root = ui.root();
        let label = ui.spawn(root, Rect::new(0.0, 0.0, 100.0, 50.0), None, Label::new("Play"));
        let mut canvas = Canvas::new(100, 50);
        ui.render(&mut canvas, &mut Vec::new()).unwrap();
        let cached = |ui: &Ui| {
            ui.widget::<Label>(label)
                .and_then(|l| l.cache.as_ref())
                .map(|c| c.image.is_some())
        };
        assert_eq!(cached(&ui), Some(false));

        // same size and color, only the face differs
        ui.set_style(label, Some(Style::new().font(face)));
        ui.render(&mut canvas, &mut Vec::new()).unwrap();
        assert_eq!(cached(&ui), Some(true));
    }
}
