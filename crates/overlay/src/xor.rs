//! Framebuffer-inversion reticle

use zoom::{Point, Rect, Size};

use crate::layout::xor_strips;
use crate::platform::XorSurface;

pub struct XorReticle<S: XorSurface> {
    surface: S,
    size: Size,
    last: Option<Point>,
    thick: i32,
    visible: bool,
}

impl<S: XorSurface> XorReticle<S> {
    pub fn new(surface: S, size: Size) -> Self {
        Self {
            surface,
            size,
            last: None,
            thick: 1,
            visible: false,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn update(&mut self, pt: Point) {
        if self.last == Some(pt) {
            return;
        }

        if self.visible {
            self.invert();
        }

        self.last = Some(pt);
        if let Some(dpi) = self.surface.monitor_scaler(pt) {
            self.thick = dpi.scale(1);
        }

        self.invert();
    }

    fn invert(&mut self) {
        let Some(center) = self.last else {
            return;
        };

        let rect = Rect::centered(center, self.size);
        tracing::trace!(?rect, thick = self.thick, "xor reticle");
        self.surface.invert(&xor_strips(&rect, self.thick));
        self.visible = !self.visible;
    }
}

impl<S: XorSurface> Drop for XorReticle<S> {
    fn drop(&mut self) {
        if self.visible {
            self.invert();
        }
    }
}
