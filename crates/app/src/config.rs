//! JSON configuration

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::Context;
use overlay::ReticleSettings;
use serde::Deserialize;
use zoom::{Size, ZoomFactor, DEFAULT_VIEWPORT};

/// Environment variable naming the config file when no argument is given.
pub const CONFIG_ENV: &str = "ZOOMIN_CONFIG";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ZoominConfig {
    pub zoom: ZoomConfig,
    pub reticle: ReticleSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub factor: i32,
    pub viewport: Viewport,
    /// Cursor polling interval.
    pub tick_ms: u32,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            factor: ZoomFactor::default().get(),
            viewport: Viewport::default(),
            tick_ms: 16,
        }
    }
}

/// Magnifier client area in pixels at 96 DPI.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: i32,
    pub height: i32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: DEFAULT_VIEWPORT.width,
            height: DEFAULT_VIEWPORT.height,
        }
    }
}

impl From<Viewport> for Size {
    fn from(v: Viewport) -> Self {
        Size::new(v.width.max(0), v.height.max(0))
    }
}

impl ZoominConfig {
    /// Defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = Self::parse(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;

        tracing::info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        Ok(config.normalized())
    }

    fn normalized(mut self) -> Self {
        self.zoom.factor = ZoomFactor::new(self.zoom.factor).get();
        self.zoom.tick_ms = self.zoom.tick_ms.max(1);
        self.reticle = self.reticle.normalized();
        self
    }

    pub fn factor(&self) -> ZoomFactor {
        ZoomFactor::new(self.zoom.factor)
    }
}

/// First CLI argument, else `ZOOMIN_CONFIG`.
pub fn config_path(arg: Option<OsString>, env: Option<OsString>) -> Option<PathBuf> {
    arg.or(env).filter(|p| !p.is_empty()).map(PathBuf::from)
}
