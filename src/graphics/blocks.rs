//! Unicode half-block rendering backend (universal fallback)
//!
//! Each cell shows two vertically stacked pixels: `▀` with the top pixel as
//! foreground and the bottom pixel as background.

use super::Presenter;
use crate::canvas::Canvas;
use crate::color::Color;
use crate::layout::Rect;
use anyhow::Result;
use std::fmt::Write as FmtWrite;
use std::io::Write;

const HALF_BLOCK: char = '▀';

impl Presenter {
    /// Re-emit every cell overlapping `region`
    ///
    /// Optimized to batch character writes per line and to skip color codes
    /// that repeat the previous cell's.
    pub(super) fn present_blocks<W: Write>(
        &mut self,
        writer: &mut W,
        canvas: &Canvas,
        region: &Rect,
    ) -> Result<()> {
        let Some(region) = region.clip(&canvas.bounds()) else {
            return Ok(());
        };

        let col0 = region.x.floor() as u32;
        let col1 = (region.right().ceil() as u32).min(canvas.width());
        let row0 = (region.y / 2.0).floor() as u32;
        let row1 = ((region.bottom() / 2.0).ceil() as u32).min(canvas.height().div_ceil(2));

        for row in row0..row1 {
            self.line_buffer.clear();
            write!(self.line_buffer, "\x1b[{};{}H", row + 1, col0 + 1).ok();

            let mut last: Option<(Color, Color)> = None;
            for col in col0..col1 {
                let top = canvas.pixel(col, row * 2).unwrap_or(Color::black());
                let bottom = canvas.pixel(col, row * 2 + 1).unwrap_or(top);

                if last != Some((top, bottom)) {
                    self.line_buffer.push_str(&top.fg_code(self.truecolor));
                    self.line_buffer.push_str(&bottom.bg_code(self.truecolor));
                    last = Some((top, bottom));
                }
                self.line_buffer.push(HALF_BLOCK);
            }

            self.line_buffer.push_str("\x1b[0m");
            writer.write_all(self.line_buffer.as_bytes())?;
        }

        Ok(())
    }
}
