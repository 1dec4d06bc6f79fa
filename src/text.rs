//! Font handle and single-line text rasterization

use crate::color::Color;
use anyhow::{anyhow, Context, Result};
use fontdue::layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle};
use fontdue::FontSettings;
use image::RgbaImage;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Default text size in pixels
pub const DEFAULT_FONT_SIZE: f32 = 30.0;

/// Text-shaping handle: an optional font face plus a pixel size
///
/// A font without a face measures and renders nothing. Faces are parsed once
/// and shared between clones.
#[derive(Clone)]
pub struct Font {
    face: Option<Arc<fontdue::Font>>,
    size: f32,
}

impl Font {
    /// Font of the given size with no face
    pub fn new(size: f32) -> Self {
        Font { face: None, size }
    }

    /// Parse a font face from memory
    pub fn from_bytes(bytes: &[u8], size: f32) -> Result<Self> {
        let face = fontdue::Font::from_bytes(bytes, FontSettings::default())
            .map_err(|e| anyhow!("failed to parse font: {}", e))?;
        Ok(Font {
            face: Some(Arc::new(face)),
            size,
        })
    }

    /// Load a font face from a file
    pub fn load(path: impl AsRef<Path>, size: f32) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            std::fs::read(path).with_context(|| format!("failed to read font {}", path.display()))?;
        Self::from_bytes(&bytes, size).with_context(|| format!("invalid font {}", path.display()))
    }

    /// Same face at a different size
    pub fn with_size(&self, size: f32) -> Self {
        Font {
            face: self.face.clone(),
            size,
        }
    }

    /// Pixel size
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Whether a face is loaded
    /// Whether both fonts use the same parsed face (or both have none)
    pub fn same_face(&self, other: &Font) -> bool {
        match (&self.face, &other.face) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    pub fn has_face(&self) -> bool {
        self.face.is_some()
    }

    /// Rasterize one line of text onto a transparent image
    ///
    /// Returns `None` for empty text or when no face is loaded.
    pub fn render(&self, text: &str, color: Color) -> Option<RgbaImage> {
        let face: &fontdue::Font = self.face.as_deref()?;
        if text.is_empty() {
            return None;
        }

        let mut layout = Layout::new(CoordinateSystem::PositiveYDown);
        layout.reset(&LayoutSettings::default());
        layout.append(&[face], &TextStyle::new(text, self.size, 0));

        let width = layout
            .glyphs()
            .iter()
            .map(|glyph| (glyph.x + glyph.width as f32).ceil() as i64)
            .max()
            .unwrap_or(0)
            .max(1) as u32;
        let height = layout.height().ceil().max(1.0) as u32;

        let mut image = RgbaImage::new(width, height);

        for glyph in layout.glyphs() {
            if glyph.width == 0 || glyph.height == 0 {
                continue;
            }

            let (metrics, bitmap) = face.rasterize_config(glyph.key);
            let gx = glyph.x.round() as i64;
            let gy = glyph.y.round() as i64;

            for (i, coverage) in bitmap.iter().enumerate() {
                if *coverage == 0 {
                    continue;
                }
                let px = gx + (i % metrics.width) as i64;
                let py = gy + (i / metrics.width) as i64;
                if px < 0 || py < 0 || px >= width as i64 || py >= height as i64 {
                    continue;
                }
                let alpha = (*coverage as u16 * color.a as u16 / 255) as u8;
                image.put_pixel(
                    px as u32,
                    py as u32,
                    Color::rgba(color.r, color.g, color.b, alpha).to_pixel(),
                );
            }
        }

        Some(image)
    }
}

impl Default for Font {
    fn default() -> Self {
        Font::new(DEFAULT_FONT_SIZE)
    }
}

impl fmt::Debug for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Font")
            .field("has_face", &self.has_face())
            .field("size", &self.size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_faceless_font_renders_nothing() {
        let font = Font::default();
        assert!(!font.has_face());
        assert_eq!(font.size(), DEFAULT_FONT_SIZE);
        assert!(font.render("hello", Color::black()).is_none());
    }

    #[test]
    fn test_invalid_font_bytes_fail() {
        assert!(Font::from_bytes(b"not a font", 12.0).is_err());
    }

    #[test]
    fn test_missing_font_file_fails() {
        let err = Font::load("/nonexistent/font.ttf", 12.0).unwrap_err();
        assert!(err.to_string().contains("failed to read font"));
    }

    #[test]
    fn test_same_face_tracks_identity() {
        let faceless = Font::new(12.0);
        assert!(faceless.same_face(&Font::new(30.0)));

        let Ok(face) = Font::load("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf", 12.0) else {
            return;
        };
        assert!(face.same_face(&face.with_size(40.0)));
        assert!(!face.same_face(&faceless));
    }

    #[test]
    fn test_with_size_keeps_face() {
        let font = Font::new(10.0).with_size(20.0);
        assert_eq!(font.size(), 20.0);
        assert!(!font.has_face());
    }
}
