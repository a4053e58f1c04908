//! Magnifier state driven by the cursor timer

use dpi::DpiScaler;
use zoom::{
    capture_size, clamp_focus, zoom_area, Point, Rect, ScrollAction, Size, ZoomArea, ZoomFactor,
    MAX_ZOOM, MIN_ZOOM,
};

/// Keys the demo reacts to, sampled once per tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Keys {
    pub zoom_in: bool,
    pub zoom_out: bool,
    pub page_up: bool,
    pub page_down: bool,
    pub home: bool,
    pub end: bool,
    pub quit: bool,
}

/// What the caller must do after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Nothing changed.
    Idle,
    /// Move the reticle to the area.
    Track(ZoomArea),
    /// The capture size changed; the reticle must be recreated first.
    Resize(ZoomArea),
    Quit,
}

pub struct MagnifierState {
    factor: ZoomFactor,
    viewport: Size,
    dpi: DpiScaler,
    last_focus: Option<Point>,
    held: Keys,
}

impl MagnifierState {
    pub fn new(factor: ZoomFactor, viewport: Size, dpi: DpiScaler) -> Self {
        Self {
            factor,
            viewport,
            dpi,
            last_focus: None,
            held: Keys::default(),
        }
    }

    pub fn factor(&self) -> ZoomFactor {
        self.factor
    }

    /// Source rectangle size for the current factor and DPI.
    pub fn capture_size(&self) -> Size {
        capture_size(self.viewport, self.factor, self.dpi)
    }

    /// Advance one tick with the cursor at `cursor` on `monitor`.
    pub fn tick(&mut self, cursor: Point, monitor: &Rect, keys: Keys) -> Action {
        if keys.quit {
            return Action::Quit;
        }

        // Zoom keys act on press, not while held.
        let before = self.factor;
        let held = self.held;
        if keys.zoom_in && !held.zoom_in {
            self.factor = self.factor.zoom_in();
        }
        if keys.zoom_out && !held.zoom_out {
            self.factor = self.factor.zoom_out();
        }
        for (down, was_down, action) in [
            (keys.page_up, held.page_up, ScrollAction::PageUp),
            (keys.page_down, held.page_down, ScrollAction::PageDown),
            (keys.home, held.home, ScrollAction::Thumb(MIN_ZOOM)),
            (keys.end, held.end, ScrollAction::Thumb(MAX_ZOOM)),
        ] {
            if down && !was_down {
                self.factor = self.factor.scroll(action);
            }
        }
        self.held = keys;

        let resized = self.factor != before;
        let focus = clamp_focus(cursor, monitor);
        if !resized && self.last_focus == Some(focus) {
            return Action::Idle;
        }
        self.last_focus = Some(focus);

        match zoom_area(focus, self.capture_size(), monitor) {
            Some(area) if resized => Action::Resize(area),
            Some(area) => Action::Track(area),
            None => Action::Idle,
        }
    }
}
