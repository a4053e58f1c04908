//! Capture-rectangle calculation

use crate::{Point, Rect, Size};
use dpi::DpiScaler;

pub const MIN_ZOOM: i32 = 1;
pub const MAX_ZOOM: i32 = 32;

/// Client size the magnifier opens with.
pub const DEFAULT_VIEWPORT: Size = Size {
    width: 480,
    height: 320,
};

/// Integer magnification, always within `MIN_ZOOM..=MAX_ZOOM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ZoomFactor(i32);

impl Default for ZoomFactor {
    fn default() -> Self {
        Self(4)
    }
}

/// Scroll-bar style adjustments to the zoom factor. Down is more zoom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAction {
    LineUp,
    LineDown,
    PageUp,
    PageDown,
    Thumb(i32),
}

impl ZoomFactor {
    pub fn new(factor: i32) -> Self {
        Self(factor.clamp(MIN_ZOOM, MAX_ZOOM))
    }

    pub fn get(self) -> i32 {
        self.0
    }

    pub fn zoom_in(self) -> Self {
        self.scroll(ScrollAction::LineDown)
    }

    pub fn zoom_out(self) -> Self {
        self.scroll(ScrollAction::LineUp)
    }

    pub fn scroll(self, action: ScrollAction) -> Self {
        match action {
            ScrollAction::LineUp => Self::new(self.0 - 1),
            ScrollAction::LineDown => Self::new(self.0 + 1),
            ScrollAction::PageUp => Self::new(self.0 - 2),
            ScrollAction::PageDown => Self::new(self.0 + 2),
            ScrollAction::Thumb(pos) => Self::new(pos),
        }
    }
}

/// Source pixels needed to fill `viewport` at `factor`.
///
/// The factor is scaled by the window DPI so one source pixel covers the same
/// physical area on every monitor.
pub fn capture_size(viewport: Size, factor: ZoomFactor, dpi: DpiScaler) -> Size {
    let effective = dpi.scale(factor.get()).max(1);
    Size::new(
        (viewport.width.max(0) + effective - 1) / effective,
        (viewport.height.max(0) + effective - 1) / effective,
    )
}

/// Keep a focus point on its monitor.
pub fn clamp_focus(pt: Point, monitor: &Rect) -> Point {
    Point::new(
        pin(pt.x, monitor.x, monitor.right() - 1),
        pin(pt.y, monitor.y, monitor.bottom() - 1),
    )
}

/// Clamp `value` into `low..=high`; `low` wins when the range is empty.
fn pin(value: i32, low: i32, high: i32) -> i32 {
    if value < low || low > high {
        low
    } else if value > high {
        high
    } else {
        value
    }
}

/// The capture rectangle and the reticle centre that matches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoomArea {
    pub rect: Rect,
    pub center: Point,
}

/// Centre a `size` rectangle on `focus`, shifted (never resized) to lie on
/// `monitor`.
///
/// Returns `None` when there is nothing to capture.
pub fn zoom_area(focus: Point, size: Size, monitor: &Rect) -> Option<ZoomArea> {
    if size.is_empty() {
        return None;
    }

    let half_w = size.width / 2;
    let half_h = size.height / 2;
    let x = pin(
        focus.x,
        monitor.x + half_w,
        monitor.right() - (size.width - half_w),
    );
    let y = pin(
        focus.y,
        monitor.y + half_h,
        monitor.bottom() - (size.height - half_h),
    );

    let rect = Rect::centered(Point::new(x, y), size);
    let center = Point::new(rect.x + rect.width / 2, rect.y + rect.height / 2);

    Some(ZoomArea { rect, center })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MONITOR: Rect = Rect {
        x: 0,
        y: 0,
        width: 1920,
        height: 1080,
    };

    #[test]
    fn factor_is_clamped() {
        assert_eq!(ZoomFactor::new(0).get(), MIN_ZOOM);
        assert_eq!(ZoomFactor::new(99).get(), MAX_ZOOM);
        assert_eq!(ZoomFactor::new(32).zoom_in().get(), 32);
        assert_eq!(ZoomFactor::new(1).zoom_out().get(), 1);
    }

    #[test]
    fn scroll_actions_step_like_the_scroll_bar() {
        let f = ZoomFactor::new(8);
        assert_eq!(f.scroll(ScrollAction::LineUp).get(), 7);
        assert_eq!(f.scroll(ScrollAction::LineDown).get(), 9);
        assert_eq!(f.scroll(ScrollAction::PageUp).get(), 6);
        assert_eq!(f.scroll(ScrollAction::PageDown).get(), 10);
        assert_eq!(f.scroll(ScrollAction::Thumb(40)).get(), 32);
    }

    #[test]
    fn capture_size_rounds_up() {
        let size = capture_size(Size::new(481, 320), ZoomFactor::new(4), DpiScaler::default());
        assert_eq!(size, Size::new(121, 80));
    }

    #[test]
    fn capture_size_follows_window_dpi() {
        let size = capture_size(DEFAULT_VIEWPORT, ZoomFactor::new(4), DpiScaler::new(144));
        assert_eq!(size, Size::new(80, 54));
    }

    #[test]
    fn corner_focus_is_pinned_to_origin() {
        let size = capture_size(DEFAULT_VIEWPORT, ZoomFactor::new(4), DpiScaler::default());
        assert_eq!(size, Size::new(120, 80));

        let area = zoom_area(Point::new(10, 10), size, &MONITOR).unwrap();
        assert_eq!(area.rect, Rect::new(0, 0, 120, 80));
        assert_eq!(area.center, Point::new(60, 40));
    }

    #[test]
    fn inside_focus_stays_centered() {
        let area = zoom_area(Point::new(500, 500), Size::new(120, 80), &MONITOR).unwrap();
        assert_eq!(area.rect, Rect::new(440, 460, 120, 80));
        assert_eq!(area.center, Point::new(500, 500));
    }

    #[test]
    fn always_contained_with_exact_size() {
        for factor in MIN_ZOOM..=MAX_ZOOM {
            let size = capture_size(DEFAULT_VIEWPORT, ZoomFactor::new(factor), DpiScaler::default());
            let expected = Size::new(
                (480 + factor - 1) / factor,
                (320 + factor - 1) / factor,
            );
            assert_eq!(size, expected);

            for x in (1..1919).step_by(97) {
                for y in (1..1079).step_by(83) {
                    let area = zoom_area(Point::new(x, y), size, &MONITOR).unwrap();
                    assert!(MONITOR.contains_rect(&area.rect), "{factor} ({x},{y})");
                    assert_eq!(area.rect.size(), size);
                }
            }
        }
    }

    #[test]
    fn edges_pin_without_resizing() {
        let size = Size::new(121, 81);
        let monitor = Rect::new(-1280, 0, 1280, 1024);

        let area = zoom_area(Point::new(-1275, 1020), size, &monitor).unwrap();
        assert_eq!(area.rect.x, -1280);
        assert_eq!(area.rect.bottom(), 1024);
        assert_eq!(area.rect.size(), size);

        let area = zoom_area(Point::new(-2, 3), size, &monitor).unwrap();
        assert_eq!(area.rect.right(), 0);
        assert_eq!(area.rect.y, 0);
        assert_eq!(area.rect.size(), size);
    }

    #[test]
    fn oversized_area_pins_to_top_left() {
        let area = zoom_area(Point::new(1000, 600), Size::new(2000, 1200), &MONITOR).unwrap();
        assert_eq!(area.rect.x, 0);
        assert_eq!(area.rect.y, 0);
        assert_eq!(area.rect.size(), Size::new(2000, 1200));
    }

    #[test]
    fn empty_area_is_nothing_to_capture() {
        assert!(zoom_area(Point::new(5, 5), Size::new(0, 80), &MONITOR).is_none());
        let size = capture_size(Size::new(0, 0), ZoomFactor::new(4), DpiScaler::default());
        assert!(zoom_area(Point::new(5, 5), size, &MONITOR).is_none());
    }

    #[test]
    fn focus_clamps_inside_monitor() {
        assert_eq!(clamp_focus(Point::new(-5, 2000), &MONITOR), Point::new(0, 1079));
        assert_eq!(clamp_focus(Point::new(7, 8), &MONITOR), Point::new(7, 8));
    }
}
