//! Four-window reticle

use zoom::{Point, Rect, Size};

use crate::layout::{edge_placements, EdgeThickness};
use crate::platform::EdgeWindows;
use crate::settings::ReticleSettings;
use crate::OverlayResult;

pub struct EdgeReticle<E: EdgeWindows> {
    windows: E,
    settings: ReticleSettings,
    size: Size,
    last: Option<Point>,
    visible: bool,
}

impl<E: EdgeWindows> EdgeReticle<E> {
    pub fn new(windows: E, size: Size, settings: ReticleSettings) -> Self {
        Self {
            windows,
            settings,
            size,
            last: None,
            visible: false,
        }
    }

    pub fn init(&mut self) -> OverlayResult<()> {
        self.windows.init(&self.settings)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn update(&mut self, pt: Point) {
        if self.last == Some(pt) {
            return;
        }
        self.last = Some(pt);

        let dpi = self.windows.monitor_scaler(pt).unwrap_or_default();
        let thickness = EdgeThickness::scaled(&self.settings, dpi);
        let rect = Rect::centered(pt, self.size);
        let placements = edge_placements(&rect, thickness.total());

        tracing::trace!(?rect, dpi = dpi.dpi(), thick = thickness.total(), "edge reticle");

        if let Err(err) = self.windows.place(&placements, thickness) {
            tracing::warn!(%err, "could not move reticle edges");
            return;
        }

        if !self.visible {
            self.windows.show();
            self.visible = true;
        }
    }
}
