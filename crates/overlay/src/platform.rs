//! Seams between the reticle modes and the windowing system
//!
//! Each mode drives one of these traits; the Win32 implementations live in
//! `win32`, and tests substitute recording fakes.

use dpi::{DpiScaler, BASE_DPI};
use zoom::{Point, Rect};

use crate::layout::{EdgePlacements, EdgeThickness, SpriteLayout};
use crate::settings::ReticleSettings;
use crate::OverlayResult;

/// Work deferred to the compositor's dispatcher thread.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

pub trait MonitorLookup {
    /// Effective DPI of the monitor nearest `pt`; `None` when there is no
    /// monitor at all.
    fn monitor_dpi(&self, pt: Point) -> Option<u16>;

    /// Scaler for the monitor nearest `pt`. A zero DPI counts as unscaled.
    fn monitor_scaler(&self, pt: Point) -> Option<DpiScaler> {
        self.monitor_dpi(pt)
            .map(|dpi| DpiScaler::new(if dpi == 0 { BASE_DPI } else { dpi }))
    }
}

/// Direct framebuffer inversion.
pub trait XorSurface: MonitorLookup {
    /// Invert every pixel of the four strips.
    fn invert(&mut self, strips: &[Rect; 4]);
}

/// Four always-on-top translucent edge windows.
pub trait EdgeWindows: MonitorLookup {
    /// Apply colours and opacity to all four windows.
    fn init(&mut self, settings: &ReticleSettings) -> OverlayResult<()>;

    /// Move all four windows in one batch, repainting with `thickness`.
    fn place(&mut self, placements: &EdgePlacements, thickness: EdgeThickness)
        -> OverlayResult<()>;

    /// Show without activating and paint immediately.
    fn show(&mut self);
}

/// A full-screen composition host with eight sprites.
pub trait CompositionScene: MonitorLookup {
    /// Build the visual tree: root opacity, border layer, main layer.
    fn init(&mut self, settings: &ReticleSettings) -> OverlayResult<()>;

    fn show(&mut self);

    /// Stretch the host over the virtual screen, inset by one pixel.
    fn cover_virtual_screen(&mut self);

    fn screen_to_client(&self, pt: Point) -> Point;

    fn apply(&mut self, layout: &SpriteLayout);

    /// Hand `task` to the dispatcher queue, or give it back when the queue
    /// is missing or refuses it.
    fn enqueue(&self, task: Task) -> Result<(), Task>;
}

/// Opens the resources behind each mode.
///
/// Every `open_*` either returns a complete resource or releases whatever it
/// acquired before failing.
pub trait OverlayPlatform {
    type Surface: XorSurface;
    type Edges: EdgeWindows;
    type Scene: CompositionScene;

    fn open_scene(&mut self) -> OverlayResult<Self::Scene>;
    fn open_edges(&mut self) -> OverlayResult<Self::Edges>;
    fn open_surface(&mut self) -> OverlayResult<Self::Surface>;
}
