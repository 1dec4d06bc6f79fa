//! Terminal abstraction - geometry, capabilities, and context

use anyhow::{Context, Result};

/// Terminal geometry and sizing information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalGeometry {
    /// Terminal width in columns (characters)
    pub cols: u16,
    /// Terminal height in rows (lines)
    pub rows: u16,
    /// Estimated character width in pixels
    pub char_width: u16,
    /// Estimated character height in pixels
    pub char_height: u16,
}

impl TerminalGeometry {
    /// Get current terminal geometry
    pub fn detect() -> Result<Self> {
        let (cols, rows) = crossterm::terminal::size().context("Failed to get terminal size")?;

        // Prefer the pixel size reported by the terminal, fall back to a
        // typical monospace cell
        let (char_width, char_height) = match crossterm::terminal::window_size() {
            Ok(size) if size.width > 0 && size.height > 0 && cols > 0 && rows > 0 => {
                ((size.width / cols).max(1), (size.height / rows).max(1))
            }
            _ => (10, 20),
        };

        Ok(Self::with_char_size(cols, rows, char_width, char_height))
    }

    /// Get geometry with custom pixel estimates
    pub fn with_char_size(cols: u16, rows: u16, char_width: u16, char_height: u16) -> Self {
        TerminalGeometry {
            cols,
            rows,
            char_width,
            char_height,
        }
    }

    /// Estimated size in pixels
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            self.cols as u32 * self.char_width as u32,
            self.rows as u32 * self.char_height as u32,
        )
    }
}

/// Terminal capability detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalCapabilities {
    /// Supports Kitty graphics protocol
    pub kitty_graphics: bool,
    /// Supports 24-bit true color
    pub truecolor: bool,
    /// Inside tmux/screen multiplexer
    pub in_multiplexer: bool,
}

impl TerminalCapabilities {
    /// Detect terminal capabilities
    pub fn detect() -> Self {
        let term = std::env::var("TERM").unwrap_or_default();
        let colorterm = std::env::var("COLORTERM").unwrap_or_default();
        let tmux = std::env::var("TMUX").is_ok();
        let kitty_window = std::env::var("KITTY_WINDOW_ID").is_ok();

        let kitty_graphics = kitty_window || term.contains("kitty");
        let truecolor =
            colorterm.contains("truecolor") || colorterm.contains("24bit") || kitty_window;

        TerminalCapabilities {
            kitty_graphics,
            truecolor,
            in_multiplexer: tmux,
        }
    }

    /// Check if we need tmux passthrough for Kitty graphics
    pub fn needs_kitty_passthrough(&self) -> bool {
        self.kitty_graphics && self.in_multiplexer
    }
}

/// Complete terminal context combining geometry and capabilities
#[derive(Debug, Clone)]
pub struct TerminalContext {
    pub geometry: TerminalGeometry,
    pub capabilities: TerminalCapabilities,
}

impl TerminalContext {
    /// Create a new terminal context by detecting current environment
    pub fn detect() -> Result<Self> {
        Ok(TerminalContext {
            geometry: TerminalGeometry::detect()?,
            capabilities: TerminalCapabilities::detect(),
        })
    }

    /// Refresh geometry (e.g., after terminal resize)
    pub fn refresh_geometry(&mut self) -> Result<()> {
        self.geometry = TerminalGeometry::detect()?;
        Ok(())
    }
}
