//! Kitty graphics protocol rendering backend
//!
//! The whole canvas is transmitted as one PNG under a fixed image id, so a
//! new transmission replaces the previous picture in place.

use super::Presenter;
use crate::canvas::Canvas;
use anyhow::{Context, Result};
use std::fmt::Write as FmtWrite;
use std::io::{Cursor, Write};

const CHUNK_SIZE: usize = 4096;
const IMAGE_ID: u32 = 1;

impl Presenter {
    pub(super) fn present_kitty<W: Write>(&mut self, writer: &mut W, canvas: &Canvas) -> Result<()> {
        let png_data = encode_png(canvas)?;
        let encoded = encode_base64(&png_data);

        let cols = canvas.width().div_ceil(self.cell_size.0);
        let rows = canvas.height().div_ceil(self.cell_size.1);

        self.escape_buffer.clear();
        write!(
            self.escape_buffer,
            "a=T,f=100,t=d,i={},c={},r={},C=1,q=2",
            IMAGE_ID, cols, rows
        )
        .ok();

        write!(writer, "\x1b[1;1H")?;

        let total_chunks = encoded.len().div_ceil(CHUNK_SIZE);
        for (i, chunk) in encoded.as_bytes().chunks(CHUNK_SIZE).enumerate() {
            let m = if i + 1 == total_chunks { 0 } else { 1 };

            self.line_buffer.clear();
            if i == 0 {
                write!(self.line_buffer, "\x1b_G{},m={};", self.escape_buffer, m).ok();
            } else {
                write!(self.line_buffer, "\x1b_Gm={};", m).ok();
            }
            // Base64 output is always ASCII
            self.line_buffer.push_str(&String::from_utf8_lossy(chunk));
            self.line_buffer.push_str("\x1b\\");

            self.write_command(writer, &self.line_buffer)?;
        }

        Ok(())
    }
}

fn encode_png(canvas: &Canvas) -> Result<Vec<u8>> {
    let mut png_data = Vec::new();
    canvas
        .as_image()
        .write_to(&mut Cursor::new(&mut png_data), image::ImageFormat::Png)
        .context("failed to encode canvas as PNG")?;
    Ok(png_data)
}

/// Encode raw bytes to base64 with pre-sized buffer
fn encode_base64(data: &[u8]) -> String {
    let encoded_size = (data.len() * 4 / 3) + 4;
    let mut encoded = String::with_capacity(encoded_size);
    base64::Engine::encode_string(
        &base64::engine::general_purpose::STANDARD,
        data,
        &mut encoded,
    );
    encoded
}

#[cfg(test)]
mod tests {
    use super::super::GraphicsBackend;
    use super::*;
    use crate::color::Color;
    use crate::layout::Rect;

    #[test]
    fn test_kitty_transmission() {
        let mut canvas = Canvas::new(40, 40);
        canvas.fill(Color::rgb(10, 20, 30), canvas.bounds());

        let mut presenter = Presenter::new(GraphicsBackend::Kitty, true, false, (10, 20));
        let mut out = Vec::new();
        presenter
            .present(&mut out, &canvas, &[Rect::new(0.0, 0.0, 1.0, 1.0)])
            .unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("\x1b[1;1H\x1b_Ga=T,f=100,t=d,i=1,c=4,r=2,C=1,q=2,m=0;"));
        assert!(text.ends_with("\x1b\\"));
    }

    #[test]
    fn test_large_canvas_is_chunked() {
        // Noise does not compress, so the PNG is well over one chunk
        let mut canvas = Canvas::new(64, 64);
        let mut state: u32 = 12345;
        for y in 0..64 {
            for x in 0..64 {
                state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                let [_, r, g, b] = state.to_le_bytes();
                canvas.fill(Color::rgb(r, g, b), Rect::new(x as f32, y as f32, 1.0, 1.0));
            }
        }

        let mut presenter = Presenter::new(GraphicsBackend::Kitty, true, false, (10, 20));
        let mut out = Vec::new();
        presenter.present(&mut out, &canvas, &[canvas.bounds()]).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains(",m=1;"));
        assert!(text.contains("\x1b_Gm=0;"));
    }
}
