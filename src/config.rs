//! Runtime configuration from the environment

#[cfg(feature = "tui")]
use crate::graphics::GraphicsBackend;
use anyhow::{anyhow, bail, Context, Result};
use std::path::PathBuf;

/// Default headless surface size
pub const DEFAULT_SIZE: (u32, u32) = (960, 540);

/// Frame driver and host settings
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Forced graphics backend, detected when `None`
    #[cfg(feature = "tui")]
    pub backend: Option<GraphicsBackend>,
    /// Frame rate cap, uncapped when `None`
    pub fps_cap: Option<u32>,
    /// Show the frame-rate counter
    pub show_fps: bool,
    /// Font file for the default style
    pub font: Option<PathBuf>,
    /// Surface size for headless displays
    pub size: (u32, u32),
}

impl Default for Config {
    fn default() -> Self {
        Config {
            #[cfg(feature = "tui")]
            backend: None,
            fps_cap: None,
            show_fps: true,
            font: None,
            size: DEFAULT_SIZE,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `KEELSON_*` variables from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Config::default();

        #[cfg(feature = "tui")]
        if let Some(value) = lookup("KEELSON_BACKEND") {
            config.backend = Some(value.parse().context("invalid KEELSON_BACKEND")?);
        }

        if let Some(value) = lookup("KEELSON_FPS_CAP") {
            let cap: u32 = value
                .trim()
                .parse()
                .with_context(|| format!("invalid KEELSON_FPS_CAP '{}'", value))?;
            config.fps_cap = (cap > 0).then_some(cap);
        }

        if let Some(value) = lookup("KEELSON_SHOW_FPS") {
            config.show_fps = match value.trim() {
                "1" | "true" => true,
                "0" | "false" => false,
                other => bail!("invalid KEELSON_SHOW_FPS '{}' (expected 0 or 1)", other),
            };
        }

        if let Some(value) = lookup("KEELSON_FONT") {
            if !value.is_empty() {
                config.font = Some(PathBuf::from(value));
            }
        }

        if let Some(value) = lookup("KEELSON_SIZE") {
            config.size = parse_size(&value).context("invalid KEELSON_SIZE")?;
        }

        Ok(config)
    }

    #[cfg(feature = "tui")]
    pub fn backend(mut self, backend: GraphicsBackend) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn fps_cap(mut self, cap: Option<u32>) -> Self {
        self.fps_cap = cap;
        self
    }

    pub fn show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }

    pub fn font(mut self, path: impl Into<PathBuf>) -> Self {
        self.font = Some(path.into());
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }
}

/// Parse `WIDTHxHEIGHT`
fn parse_size(value: &str) -> Result<(u32, u32)> {
    let (width, height) = value
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(|| anyhow!("expected WIDTHxHEIGHT, got '{}'", value))?;
    let width: u32 = width.trim().parse().context("bad width")?;
    let height: u32 = height.trim().parse().context("bad height")?;
    if width == 0 || height == 0 {
        bail!("size must be non-zero, got '{}'", value);
    }
    Ok((width, height))
}
