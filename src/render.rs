//! Presentation - displays that show the canvas, and dirty-region tracking
//!
//! Performance optimizations:
//! - Write buffering to minimize syscalls
//! - Only regions reported by the render pass are presented
//! - Many small regions are coalesced into their bounding box

use crate::canvas::Canvas;
use crate::config::Config;
use crate::layout::Rect;
use anyhow::Result;

/// Past this many regions a frame is presented as one bounding box
pub const COALESCE_THRESHOLD: usize = 32;

/// Output surface for a frame
pub trait Display {
    /// Current surface size in pixels
    fn size(&self) -> (u32, u32);

    /// Show the given regions of the canvas
    fn present(&mut self, canvas: &Canvas, regions: &[Rect]) -> Result<()>;

    /// Adapt to a new surface size
    fn resize(&mut self, width: u32, height: u32) -> Result<()>;
}

/// Dirty region accumulator for one frame
#[derive(Debug, Clone, Default)]
pub struct DirtyRegion {
    rects: Vec<Rect>,
    bounds: Option<Rect>,
}

impl DirtyRegion {
    /// Create a new empty (clean) region
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the entire surface as dirty
    pub fn mark_all(&mut self, width: u32, height: u32) {
        let all = Rect::fullscreen(width, height);
        self.rects.clear();
        self.rects.push(all);
        self.bounds = Some(all);
    }

    /// Mark a specific region as dirty
    pub fn mark(&mut self, rect: Rect) {
        if rect.is_empty() {
            return;
        }
        self.bounds = Some(match self.bounds {
            Some(bounds) => bounds.union(&rect),
            None => rect,
        });
        self.rects.push(rect);
    }

    /// Clear the dirty region (mark as clean)
    pub fn clear(&mut self) {
        self.rects.clear();
        self.bounds = None;
    }

    pub fn is_dirty(&self) -> bool {
        self.bounds.is_some()
    }

    /// Bounding box of everything marked
    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    /// Regions to present, coalesced once there are too many
    pub fn regions(&self) -> Vec<Rect> {
        match self.bounds {
            Some(bounds) if self.rects.len() > COALESCE_THRESHOLD => vec![bounds],
            _ => self.rects.clone(),
        }
    }
}

/// Display that keeps what it was asked to present, for tests and
/// offscreen runs
#[derive(Debug, Clone)]
pub struct HeadlessDisplay {
    width: u32,
    height: u32,
    frames: Vec<Vec<Rect>>,
    last_image: Option<image::RgbaImage>,
}

impl HeadlessDisplay {
    pub fn new(width: u32, height: u32) -> Self {
        HeadlessDisplay {
            width,
            height,
            frames: Vec::new(),
            last_image: None,
        }
    }

    /// Display of the configured surface size
    pub fn from_config(config: &Config) -> Self {
        let (width, height) = config.size;
        Self::new(width, height)
    }

    /// Regions of every non-empty presentation, oldest first
    pub fn frames(&self) -> &[Vec<Rect>] {
        &self.frames
    }

    /// Canvas contents at the last presentation
    pub fn last_image(&self) -> Option<&image::RgbaImage> {
        self.last_image.as_ref()
    }
}

impl Display for HeadlessDisplay {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn present(&mut self, canvas: &Canvas, regions: &[Rect]) -> Result<()> {
        if regions.is_empty() {
            return Ok(());
        }
        self.frames.push(regions.to_vec());
        self.last_image = Some(canvas.as_image().clone());
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.width = width;
        self.height = height;
        Ok(())
    }
}

#[cfg(feature = "tui")]
pub use self::terminal_display::TerminalDisplay;

#[cfg(feature = "tui")]
mod terminal_display {
    use super::{DirtyRegion, Display};
    use crate::canvas::Canvas;
    use crate::graphics::{GraphicsBackend, Presenter};
    use crate::layout::Rect;
    use crate::terminal::TerminalContext;
    use anyhow::Result;
    use std::io::{self, BufWriter, Write};
    use tracing::debug;

    /// Default buffer capacity for write batching (64KB)
    const WRITE_BUFFER_CAPACITY: usize = 64 * 1024;

    /// Terminal display on the alternate screen
    ///
    /// The canvas maps onto the terminal through the backend's cell size:
    /// two pixels per cell with half blocks, the estimated font cell with
    /// Kitty graphics.
    pub struct TerminalDisplay {
        /// Buffered writer for batching terminal output
        writer: BufWriter<io::Stdout>,
        context: TerminalContext,
        presenter: Presenter,
        in_alt_screen: bool,
        dirty: DirtyRegion,
    }

    impl TerminalDisplay {
        /// Create a display with a detected or forced graphics backend
        pub fn new(backend: Option<GraphicsBackend>) -> Result<Self> {
            let context = TerminalContext::detect()?;
            let backend = backend.unwrap_or_else(GraphicsBackend::detect);
            let cell_size = backend.cell_size(
                context.geometry.char_width,
                context.geometry.char_height,
            );

            debug!(backend = backend.name(), ?cell_size, "terminal display");

            let presenter = Presenter::new(
                backend,
                context.capabilities.truecolor,
                context.capabilities.in_multiplexer,
                cell_size,
            );

            let mut display = TerminalDisplay {
                writer: BufWriter::with_capacity(WRITE_BUFFER_CAPACITY, io::stdout()),
                context,
                presenter,
                in_alt_screen: false,
                dirty: DirtyRegion::new(),
            };
            display.enter_alt_screen()?;
            Ok(display)
        }

        /// Get the current graphics backend
        pub fn graphics_backend(&self) -> GraphicsBackend {
            self.presenter.backend()
        }

        /// Canvas pixels per terminal cell
        pub fn cell_size(&self) -> (u32, u32) {
            self.presenter.cell_size()
        }

        /// Get current terminal context
        pub fn context(&self) -> &TerminalContext {
            &self.context
        }

        /// Enter alternative screen buffer
        ///
        /// Note: This immediately flushes to ensure the screen switch happens.
        fn enter_alt_screen(&mut self) -> Result<()> {
            if !self.in_alt_screen {
                write!(self.writer, "\x1b[?1049h\x1b[?25l\x1b[2J")?;
                self.writer.flush()?;
                self.in_alt_screen = true;
            }
            Ok(())
        }

        /// Exit alternative screen buffer
        fn exit_alt_screen(&mut self) -> Result<()> {
            if self.in_alt_screen {
                self.presenter.delete_images(&mut self.writer)?;
                write!(self.writer, "\x1b[?25h\x1b[?1049l")?;
                self.writer.flush()?;
                self.in_alt_screen = false;
            }
            Ok(())
        }
    }

    impl Display for TerminalDisplay {
        fn size(&self) -> (u32, u32) {
            let (cell_w, cell_h) = self.cell_size();
            (
                self.context.geometry.cols as u32 * cell_w,
                self.context.geometry.rows as u32 * cell_h,
            )
        }

        fn present(&mut self, canvas: &Canvas, regions: &[Rect]) -> Result<()> {
            for region in regions {
                self.dirty.mark(*region);
            }
            if !self.dirty.is_dirty() {
                return Ok(());
            }

            let regions = self.dirty.regions();
            self.presenter.present(&mut self.writer, canvas, &regions)?;
            self.writer.flush()?;
            self.dirty.clear();
            Ok(())
        }

        fn resize(&mut self, _width: u32, _height: u32) -> Result<()> {
            self.context.refresh_geometry()?;
            self.presenter.delete_images(&mut self.writer)?;
            write!(self.writer, "\x1b[2J")?;
            self.writer.flush()?;

            // The screen was wiped, so the next present covers all of it
            let (width, height) = self.size();
            self.dirty.mark_all(width, height);
            Ok(())
        }
    }

    impl Drop for TerminalDisplay {
        fn drop(&mut self) {
            // Restore the terminal even while unwinding
            let _ = self.exit_alt_screen();
            let _ = self.writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirty_region_bounds() {
        let mut dirty = DirtyRegion::new();
        assert!(!dirty.is_dirty());

        dirty.mark(Rect::new(0.0, 0.0, 10.0, 10.0));
        dirty.mark(Rect::new(20.0, 5.0, 5.0, 5.0));
        dirty.mark(Rect::new(3.0, 3.0, 0.0, 4.0));

        assert_eq!(dirty.bounds(), Some(Rect::new(0.0, 0.0, 25.0, 10.0)));
        assert_eq!(dirty.regions().len(), 2);

        dirty.clear();
        assert!(!dirty.is_dirty());
        assert!(dirty.regions().is_empty());
    }

    #[test]
    fn test_many_regions_coalesce() {
        let mut dirty = DirtyRegion::new();
        for i in 0..=COALESCE_THRESHOLD {
            dirty.mark(Rect::new(i as f32, 0.0, 1.0, 1.0));
        }

        assert_eq!(
            dirty.regions(),
            vec![Rect::new(0.0, 0.0, COALESCE_THRESHOLD as f32 + 1.0, 1.0)]
        );
    }

    #[test]
    fn test_mark_all() {
        let mut dirty = DirtyRegion::new();
        dirty.mark(Rect::new(1.0, 1.0, 1.0, 1.0));
        dirty.mark_all(80, 48);
        assert_eq!(dirty.regions(), vec![Rect::new(0.0, 0.0, 80.0, 48.0)]);
    }

    #[test]
    fn test_headless_records_presentations() {
        let mut display = HeadlessDisplay::new(8, 8);
        let canvas = Canvas::new(8, 8);

        display.present(&canvas, &[]).unwrap();
        assert!(display.frames().is_empty());
        assert!(display.last_image().is_none());

        display.present(&canvas, &[Rect::new(0.0, 0.0, 2.0, 2.0)]).unwrap();
        assert_eq!(display.frames().len(), 1);
        assert!(display.last_image().is_some());

        display.resize(16, 4).unwrap();
        assert_eq!(display.size(), (16, 4));
    }

    #[test]
    fn test_headless_size_from_config() {
        let display = HeadlessDisplay::from_config(&Config::default());
        assert_eq!(display.size(), crate::config::DEFAULT_SIZE);

        let display = HeadlessDisplay::from_config(&Config::new().size(320, 200));
        assert_eq!(display.size(), (320, 200));
    }
}
