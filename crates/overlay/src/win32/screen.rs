//! XOR drawing straight onto the screen DC

use windows::Win32::Graphics::Gdi::{GetDC, PatBlt, ReleaseDC, RestoreDC, SaveDC, DSTINVERT};
use zoom::{Point, Rect};

use super::monitor_dpi_at;
use crate::platform::{MonitorLookup, XorSurface};

pub struct ScreenSurface;

impl MonitorLookup for ScreenSurface {
    fn monitor_dpi(&self, pt: Point) -> Option<u16> {
        monitor_dpi_at(pt)
    }
}

impl XorSurface for ScreenSurface {
    fn invert(&mut self, strips: &[Rect; 4]) {
        unsafe {
            let hdc = GetDC(None);
            if hdc.is_invalid() {
                tracing::warn!("screen DC unavailable, reticle not drawn");
                return;
            }
            SaveDC(hdc);

            for strip in strips {
                let _ = PatBlt(hdc, strip.x, strip.y, strip.width, strip.height, DSTINVERT);
            }

            let _ = RestoreDC(hdc, -1);
            ReleaseDC(None, hdc);
        }
    }
}
