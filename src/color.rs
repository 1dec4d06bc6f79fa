//! Color type with terminal degradation support

use image::Rgba;

/// RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Create an opaque color from RGB values
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 255 }
    }

    /// Create a color with alpha
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color { r, g, b, a }
    }

    pub const fn white() -> Self {
        Color::rgb(255, 255, 255)
    }

    pub const fn black() -> Self {
        Color::rgb(0, 0, 0)
    }

    pub const fn light_gray() -> Self {
        Color::rgb(190, 190, 190)
    }

    /// Channel-wise multiply of the RGB components, alpha kept
    pub fn multiply(&self, tint: Color) -> Color {
        let mul = |a: u8, b: u8| ((a as u16 * b as u16) / 255) as u8;
        Color::rgba(
            mul(self.r, tint.r),
            mul(self.g, tint.g),
            mul(self.b, tint.b),
            self.a,
        )
    }

    /// Convert to an `image` pixel
    pub fn to_pixel(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, self.a])
    }

    /// Convert from an `image` pixel
    pub fn from_pixel(pixel: Rgba<u8>) -> Self {
        let [r, g, b, a] = pixel.0;
        Color::rgba(r, g, b, a)
    }

    /// Foreground escape sequence, truecolor or 256-color
    pub fn fg_code(&self, truecolor: bool) -> String {
        if truecolor {
            format!("\x1b[38;2;{};{};{}m", self.r, self.g, self.b)
        } else {
            format!("\x1b[38;5;{}m", rgb_to_256(self.r, self.g, self.b))
        }
    }

    /// Background escape sequence, truecolor or 256-color
    pub fn bg_code(&self, truecolor: bool) -> String {
        if truecolor {
            format!("\x1b[48;2;{};{};{}m", self.r, self.g, self.b)
        } else {
            format!("\x1b[48;5;{}m", rgb_to_256(self.r, self.g, self.b))
        }
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Color::rgb(r, g, b)
    }
}

/// Convert RGB to 256-color palette index
pub(crate) fn rgb_to_256(r: u8, g: u8, b: u8) -> u8 {
    if r == g && g == b {
        if r < 8 {
            return 16;
        }
        if r > 248 {
            return 231;
        }
        return ((r - 8) / 10) + 232;
    }

    let r_idx = (r as u16 * 5 / 255) as u8;
    let g_idx = (g as u16 * 5 / 255) as u8;
    let b_idx = (b as u16 * 5 / 255) as u8;

    16 + 36 * r_idx + 6 * g_idx + b_idx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_to_256() {
        assert_eq!(rgb_to_256(255, 255, 255), 231);
        assert_eq!(rgb_to_256(0, 0, 0), 16);
        assert_eq!(rgb_to_256(255, 0, 0), 196);

        let gray_idx = rgb_to_256(128, 128, 128);
        assert!((232..=255).contains(&gray_idx));
    }

    #[test]
    fn test_escape_codes() {
        let white = Color::white();
        assert!(white.fg_code(true).contains("38;2;255;255;255"));
        assert!(white.bg_code(false).contains("48;5;231"));
    }

    #[test]
    fn test_multiply() {
        let c = Color::rgb(200, 100, 0).multiply(Color::light_gray());
        assert_eq!(c, Color::rgb(149, 74, 0));
        assert_eq!(Color::white().multiply(Color::black()), Color::black());
    }
}
