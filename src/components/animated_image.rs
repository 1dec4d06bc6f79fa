//! Looping frame animation component

use crate::component::{DrawContext, EventContext, Widget};
use crate::layout::{Point, Rect};
use anyhow::{bail, Context, Result};
use image::imageops::{self, FilterType};
use image::RgbaImage;
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Plays a sequence of frames over a fixed duration, looping forever
///
/// Frames are scaled to the component size whenever its rectangle changes;
/// until then the originals are shown.
pub struct AnimatedImage {
    raw_frames: Vec<RgbaImage>,
    scaled: Vec<RgbaImage>,
    time_per_frame: Duration,
    since_last_frame: Duration,
    index: usize,
}

impl AnimatedImage {
    /// Load every image in `folder`, ordered by file name
    pub fn load(folder: impl AsRef<Path>, duration: Duration) -> Result<Self> {
        let folder = folder.as_ref();
        let mut paths = std::fs::read_dir(folder)
            .with_context(|| format!("failed to read animation folder {}", folder.display()))?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()
            .with_context(|| format!("failed to list animation folder {}", folder.display()))?;
        paths.sort();

        let frames = paths
            .iter()
            .map(|path| {
                image::open(path)
                    .map(|img| img.to_rgba8())
                    .with_context(|| format!("failed to load animation frame {}", path.display()))
            })
            .collect::<Result<Vec<_>>>()?;

        Self::from_frames(frames, duration)
            .with_context(|| format!("invalid animation in {}", folder.display()))
    }

    /// Build from frames already in memory
    pub fn from_frames(frames: Vec<RgbaImage>, duration: Duration) -> Result<Self> {
        if frames.is_empty() {
            bail!("animation has no frames");
        }

        let time_per_frame = duration / frames.len() as u32;
        Ok(AnimatedImage {
            raw_frames: frames,
            scaled: Vec::new(),
            time_per_frame,
            since_last_frame: Duration::ZERO,
            index: 0,
        })
    }

    /// Index of the frame currently shown
    pub fn frame_index(&self) -> usize {
        self.index
    }

    pub fn frame_count(&self) -> usize {
        self.raw_frames.len()
    }

    fn current_frame(&self) -> Option<&RgbaImage> {
        self.scaled
            .get(self.index)
            .or_else(|| self.raw_frames.get(self.index))
    }
}

impl fmt::Debug for AnimatedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimatedImage")
            .field("frames", &self.raw_frames.len())
            .field("time_per_frame", &self.time_per_frame)
            .field("index", &self.index)
            .finish()
    }
}

impl Widget for AnimatedImage {
    fn name(&self) -> &str {
        "AnimatedImage"
    }

    fn on_rect_changed(&mut self, rect: Rect) {
        let width = rect.width.round();
        let height = rect.height.round();
        if width < 1.0 || height < 1.0 {
            return;
        }
        let (width, height) = (width as u32, height as u32);

        self.scaled = self
            .raw_frames
            .iter()
            .map(|frame| {
                if frame.dimensions() == (width, height) {
                    frame.clone()
                } else {
                    imageops::resize(frame, width, height, FilterType::Triangle)
                }
            })
            .collect();
    }

    fn update(&mut self, cx: &mut EventContext<'_>, dt: Duration) {
        self.since_last_frame += dt;
        if self.since_last_frame > self.time_per_frame {
            self.since_last_frame -= self.time_per_frame;
            self.index = (self.index + 1) % self.raw_frames.len();
            cx.redraw();
        }
    }

    fn draw(&mut self, cx: &mut DrawContext<'_>) -> Result<()> {
        cx.paint_base();
        if let Some(frame) = self.current_frame() {
            let rect = cx.rect();
            cx.blit(frame, Point::new(rect.x, rect.y));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use crate::color::Color;
    use crate::tree::Ui;

    fn solid(color: Color) -> RgbaImage {
        RgbaImage::from_pixel(2, 2, color.to_pixel())
    }

    #[test]
    fn test_empty_animation_fails() {
        assert!(AnimatedImage::from_frames(Vec::new(), Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_missing_folder_fails() {
        let err = AnimatedImage::load("/nonexistent/frames", Duration::from_secs(1)).unwrap_err();
        assert!(err.to_string().contains("failed to read animation folder"));
    }

    #[test]
    fn test_originals_shown_until_placed() {
        let anim =
            AnimatedImage::from_frames(vec![solid(Color::black())], Duration::from_secs(1)).unwrap();

        assert!(anim.scaled.is_empty());
        assert_eq!(anim.frame_count(), 1);
        assert_eq!(anim.current_frame().map(|f| f.dimensions()), Some((2, 2)));
        assert!(format!("{:?}", anim).contains("frames: 1"));
    }

    #[test]
    fn test_frames_advance_and_loop() {
        let frames = vec![solid(Color::rgb(255, 0, 0)), solid(Color::rgb(0, 0, 255))];
        let anim = AnimatedImage::from_frames(frames, Duration::from_millis(200)).unwrap();

        let mut ui = Ui::new(Rect::new(0.0, 0.0, 20.0, 20.0));
        let root = ui.root();
        let id = ui.spawn(root, Rect::new(0.0, 0.0, 10.0, 10.0), None, anim);
        assert_eq!(ui.widget::<AnimatedImage>(id).map(|a| a.scaled[0].dimensions()), Some((10, 10)));

        let mut canvas = Canvas::new(20, 20);
        ui.render(&mut canvas, &mut Vec::new()).unwrap();
        assert_eq!(canvas.pixel(5, 5), Some(Color::rgb(255, 0, 0)));

        ui.update(Duration::from_millis(50));
        assert_eq!(ui.widget::<AnimatedImage>(id).map(AnimatedImage::frame_index), Some(0));
        assert!(!ui.is_dirty(id));

        ui.update(Duration::from_millis(60));
        assert_eq!(ui.widget::<AnimatedImage>(id).map(AnimatedImage::frame_index), Some(1));
        assert!(ui.is_dirty(id));

        ui.render(&mut canvas, &mut Vec::new()).unwrap();
        assert_eq!(canvas.pixel(5, 5), Some(Color::rgb(0, 0, 255)));

        ui.update(Duration::from_millis(150));
        assert_eq!(ui.widget::<AnimatedImage>(id).map(AnimatedImage::frame_index), Some(0));
    }
}
