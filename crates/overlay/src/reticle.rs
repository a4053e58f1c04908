//! Mode selection and the overlay handle the magnifier drives

use std::fmt;

use zoom::{Point, Size};

use crate::composition::CompositedReticle;
use crate::edges::EdgeReticle;
use crate::platform::OverlayPlatform;
use crate::settings::ReticleSettings;
use crate::xor::XorReticle;
use crate::OverlayResult;

/// How the reticle is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReticleMode {
    Composited,
    FourWindow,
    Xor,
}

impl fmt::Display for ReticleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReticleMode::Composited => write!(f, "composited"),
            ReticleMode::FourWindow => write!(f, "four-window"),
            ReticleMode::Xor => write!(f, "xor"),
        }
    }
}

enum Reticle<P: OverlayPlatform> {
    Composited(CompositedReticle<P::Scene>),
    FourWindow(EdgeReticle<P::Edges>),
    Xor(XorReticle<P::Surface>),
}

/// A reticle in its chosen mode, fixed for its lifetime.
pub struct Overlay<P: OverlayPlatform> {
    reticle: Reticle<P>,
    initialized: bool,
}

impl<P: OverlayPlatform> Overlay<P> {
    fn from_reticle(reticle: Reticle<P>) -> Self {
        Self {
            reticle,
            initialized: false,
        }
    }

    pub fn mode(&self) -> ReticleMode {
        match self.reticle {
            Reticle::Composited(_) => ReticleMode::Composited,
            Reticle::FourWindow(_) => ReticleMode::FourWindow,
            Reticle::Xor(_) => ReticleMode::Xor,
        }
    }

    /// Mode-specific setup. Only the first successful call does any work.
    pub fn init_reticle(&mut self) -> OverlayResult<()> {
        if self.initialized {
            return Ok(());
        }

        match &mut self.reticle {
            Reticle::Composited(r) => r.init()?,
            Reticle::FourWindow(r) => r.init()?,
            Reticle::Xor(_) => {}
        }

        self.initialized = true;
        Ok(())
    }

    /// Frame the capture area centred on `pt` (screen coordinates).
    pub fn update_reticle_position(&mut self, pt: Point) {
        match &mut self.reticle {
            Reticle::Composited(r) => r.update(pt),
            Reticle::FourWindow(r) => r.update(pt),
            Reticle::Xor(r) => r.update(pt),
        }
    }

    /// Run `callback` once the reticle's pending drawing is queued.
    ///
    /// Composited reticles post it to their dispatcher queue; everything
    /// else runs it before returning.
    pub fn invoke<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        match &self.reticle {
            Reticle::Composited(r) => r.invoke(Box::new(callback)),
            Reticle::FourWindow(_) | Reticle::Xor(_) => callback(),
        }
    }

    pub fn is_visible(&self) -> bool {
        match &self.reticle {
            Reticle::Composited(r) => r.is_visible(),
            Reticle::FourWindow(r) => r.is_visible(),
            Reticle::Xor(r) => r.is_visible(),
        }
    }
}

/// Open and initialise the best reticle available.
///
/// Modes are tried composited, four-window, then XOR; a mode that opens but
/// fails to initialise is dropped (releasing its resources) and the next one
/// is tried. `None` means no reticle can be shown at all.
pub fn create_overlay<P: OverlayPlatform>(
    platform: &mut P,
    width: i32,
    height: i32,
    settings: ReticleSettings,
) -> Option<Overlay<P>> {
    let size = Size::new(width, height);
    let settings = settings.normalized();

    let candidates: [fn(&mut P, Size, ReticleSettings) -> OverlayResult<Overlay<P>>; 3] = [
        |p, size, settings| {
            let scene = p.open_scene()?;
            Ok(Overlay::from_reticle(Reticle::Composited(CompositedReticle::new(
                scene, size, settings,
            ))))
        },
        |p, size, settings| {
            let edges = p.open_edges()?;
            Ok(Overlay::from_reticle(Reticle::FourWindow(EdgeReticle::new(
                edges, size, settings,
            ))))
        },
        |p, size, _| {
            let surface = p.open_surface()?;
            Ok(Overlay::from_reticle(Reticle::Xor(XorReticle::new(surface, size))))
        },
    ];

    for open in candidates {
        let mut overlay = match open(platform, size, settings) {
            Ok(overlay) => overlay,
            Err(err) => {
                tracing::debug!(%err, "reticle mode unavailable");
                continue;
            }
        };

        match overlay.init_reticle() {
            Ok(()) => {
                tracing::info!(mode = %overlay.mode(), "reticle ready");
                return Some(overlay);
            }
            Err(err) => {
                tracing::warn!(mode = %overlay.mode(), %err, "reticle failed to initialise");
            }
        }
    }

    None
}
