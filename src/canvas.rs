//! Pixel surface the component tree paints into

use crate::color::Color;
use crate::layout::{Point, Rect};
use image::imageops::{self, FilterType};
use image::{Pixel, RgbaImage};

/// RGBA pixel canvas
///
/// All drawing operations clip against the canvas bounds and an optional
/// caller clip rectangle. Rectangle edges are rounded to whole pixels.
#[derive(Debug, Clone)]
pub struct Canvas {
    image: RgbaImage,
}

/// Pixel span `[x0, x1) x [y0, y1)` of a rect clipped to the canvas
struct Span {
    x0: u32,
    y0: u32,
    x1: u32,
    y1: u32,
}

impl Span {
    fn rect(&self) -> Rect {
        Rect::new(
            self.x0 as f32,
            self.y0 as f32,
            (self.x1 - self.x0) as f32,
            (self.y1 - self.y0) as f32,
        )
    }
}

impl Canvas {
    /// Create a transparent canvas
    pub fn new(width: u32, height: u32) -> Self {
        Canvas {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Canvas bounds as a rectangle
    pub fn bounds(&self) -> Rect {
        Rect::fullscreen(self.width(), self.height())
    }

    /// Resize, discarding the current contents
    pub fn resize(&mut self, width: u32, height: u32) {
        if width != self.width() || height != self.height() {
            self.image = RgbaImage::new(width, height);
        }
    }

    /// Color at a pixel, `None` outside the canvas
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.image.get_pixel_checked(x, y).map(|p| Color::from_pixel(*p))
    }

    /// Underlying image
    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    fn span(&self, rect: &Rect) -> Option<Span> {
        let clipped = rect.clip(&self.bounds())?;
        let span = Span {
            x0: clipped.x.round().max(0.0) as u32,
            y0: clipped.y.round().max(0.0) as u32,
            x1: (clipped.right().round() as u32).min(self.width()),
            y1: (clipped.bottom().round() as u32).min(self.height()),
        };
        if span.x1 > span.x0 && span.y1 > span.y0 {
            Some(span)
        } else {
            None
        }
    }

    /// Overwrite a rectangle with a color
    ///
    /// Returns the pixel rectangle actually touched.
    pub fn fill(&mut self, color: Color, rect: Rect) -> Option<Rect> {
        let span = self.span(&rect)?;
        let pixel = color.to_pixel();
        for y in span.y0..span.y1 {
            for x in span.x0..span.x1 {
                self.image.put_pixel(x, y, pixel);
            }
        }
        Some(span.rect())
    }

    /// Multiply the RGB channels of a rectangle by a tint
    pub fn fill_multiply(&mut self, tint: Color, rect: Rect) -> Option<Rect> {
        let span = self.span(&rect)?;
        for y in span.y0..span.y1 {
            for x in span.x0..span.x1 {
                let current = Color::from_pixel(*self.image.get_pixel(x, y));
                self.image.put_pixel(x, y, current.multiply(tint).to_pixel());
            }
        }
        Some(span.rect())
    }

    /// Alpha-blend an image with its top-left corner at `origin`
    ///
    /// Only pixels inside `clip` are written.
    pub fn blit(&mut self, source: &RgbaImage, origin: Point, clip: Rect) -> Option<Rect> {
        let target = Rect::new(
            origin.x.round(),
            origin.y.round(),
            source.width() as f32,
            source.height() as f32,
        );
        let span = self.span(&target.clip(&clip)?)?;
        let ox = target.x as i64;
        let oy = target.y as i64;

        for y in span.y0..span.y1 {
            for x in span.x0..span.x1 {
                let sx = (x as i64 - ox) as u32;
                let sy = (y as i64 - oy) as u32;
                let src = source.get_pixel(sx, sy);
                if src.0[3] == 0 {
                    continue;
                }
                self.image.get_pixel_mut(x, y).blend(src);
            }
        }
        Some(span.rect())
    }

    /// Scale an image to `rect` and alpha-blend it there
    pub fn blit_scaled(&mut self, source: &RgbaImage, rect: Rect) -> Option<Rect> {
        let width = rect.width.round();
        let height = rect.height.round();
        if width < 1.0 || height < 1.0 {
            return None;
        }
        let (width, height) = (width as u32, height as u32);

        if source.width() == width && source.height() == height {
            return self.blit(source, Point::new(rect.x, rect.y), rect);
        }

        let scaled = imageops::resize(source, width, height, FilterType::Triangle);
        self.blit(&scaled, Point::new(rect.x, rect.y), rect)
    }
}
