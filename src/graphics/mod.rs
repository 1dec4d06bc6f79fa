//! Graphics backend abstraction - presents the pixel canvas on a terminal
//!
//! Performance optimizations:
//! - Pre-allocated buffers for escape sequence building
//! - Only changed regions are re-emitted by the block backend
//! - Efficient base64 encoding with pre-sized buffers

mod blocks;
mod kitty;

use crate::canvas::Canvas;
use crate::layout::Rect;
use anyhow::{bail, Result};
use std::io::Write;
use std::str::FromStr;

/// Graphics rendering backend types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphicsBackend {
    /// Kitty graphics protocol
    Kitty,
    /// Unicode half blocks, two pixels per cell (universal fallback)
    Blocks,
}

impl GraphicsBackend {
    /// Detect the best available graphics backend
    pub fn detect() -> Self {
        if Self::has_kitty() {
            return GraphicsBackend::Kitty;
        }

        GraphicsBackend::Blocks
    }

    /// Check if Kitty graphics protocol is supported
    fn has_kitty() -> bool {
        std::env::var("KITTY_WINDOW_ID").is_ok()
            || std::env::var("TERM").unwrap_or_default().contains("kitty")
    }

    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            GraphicsBackend::Kitty => "Kitty Graphics",
            GraphicsBackend::Blocks => "Unicode Blocks",
        }
    }

    /// Canvas pixels covered by one terminal cell
    pub fn cell_size(&self, char_width: u16, char_height: u16) -> (u32, u32) {
        match self {
            GraphicsBackend::Kitty => (char_width.max(1) as u32, char_height.max(1) as u32),
            GraphicsBackend::Blocks => (1, 2),
        }
    }
}

impl FromStr for GraphicsBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kitty" => Ok(GraphicsBackend::Kitty),
            "blocks" => Ok(GraphicsBackend::Blocks),
            other => bail!("unknown graphics backend '{}' (expected kitty or blocks)", other),
        }
    }
}

/// Default capacity for line buffer in block rendering
pub(super) const LINE_BUFFER_CAPACITY: usize = 512;

/// Default capacity for escape sequence building
pub(super) const ESCAPE_BUFFER_CAPACITY: usize = 256;

/// Writes canvas contents to a terminal with the selected backend
///
/// Uses pre-allocated buffers to minimize allocations during presentation.
pub struct Presenter {
    pub(super) backend: GraphicsBackend,
    pub(super) truecolor: bool,
    pub(super) in_tmux: bool,
    pub(super) cell_size: (u32, u32),
    /// Pre-allocated buffer for building escape sequences
    pub(super) line_buffer: String,
    /// Pre-allocated buffer for command parameters
    pub(super) escape_buffer: String,
}

impl Presenter {
    pub fn new(backend: GraphicsBackend, truecolor: bool, in_tmux: bool, cell_size: (u32, u32)) -> Self {
        Presenter {
            backend,
            truecolor,
            in_tmux,
            cell_size,
            line_buffer: String::with_capacity(LINE_BUFFER_CAPACITY),
            escape_buffer: String::with_capacity(ESCAPE_BUFFER_CAPACITY),
        }
    }

    /// Get the current backend
    pub fn backend(&self) -> GraphicsBackend {
        self.backend
    }

    /// Canvas pixels per terminal cell
    pub fn cell_size(&self) -> (u32, u32) {
        self.cell_size
    }

    /// Write the changed regions of `canvas`
    pub fn present<W: Write>(&mut self, writer: &mut W, canvas: &Canvas, regions: &[Rect]) -> Result<()> {
        if regions.is_empty() {
            return Ok(());
        }

        match self.backend {
            GraphicsBackend::Kitty => self.present_kitty(writer, canvas),
            GraphicsBackend::Blocks => {
                for region in regions {
                    self.present_blocks(writer, canvas, region)?;
                }
                Ok(())
            }
        }
    }

    /// Delete the transmitted image, if the backend keeps one
    pub fn delete_images<W: Write>(&mut self, writer: &mut W) -> Result<()> {
        if self.backend != GraphicsBackend::Kitty {
            return Ok(());
        }

        let delete_cmd = "\x1b_Ga=d,d=I,i=1,q=2\x1b\\";
        self.write_command(writer, delete_cmd)
    }

    /// Write a graphics command, wrapped for tmux passthrough when needed
    pub(super) fn write_command<W: Write>(&self, writer: &mut W, command: &str) -> Result<()> {
        if self.in_tmux {
            let escaped = command.replace('\x1b', "\x1b\x1b");
            write!(writer, "\x1bPtmux;{}\x1b\\", escaped)?;
        } else {
            write!(writer, "{}", command)?;
        }
        Ok(())
    }
}
