//! Win32 implementation of the overlay platform

mod composition;
mod edges;
mod screen;

pub use composition::CompositionHost;
pub use edges::EdgeWindowSet;
pub use screen::ScreenSurface;

use std::ffi::c_void;
use std::sync::Once;

use windows::core::PCWSTR;
use windows::Win32::Foundation::{HINSTANCE, HWND, POINT};
use windows::Win32::Graphics::Gdi::{MonitorFromPoint, MONITOR_DEFAULTTONEAREST};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    DestroyWindow, GetSystemMetrics, RegisterClassExW, SM_CXVIRTUALSCREEN, SM_CYVIRTUALSCREEN,
    SM_XVIRTUALSCREEN, SM_YVIRTUALSCREEN, WNDCLASSEXW, WNDPROC,
};
use zoom::{Point, Rect};

use crate::platform::OverlayPlatform;
use crate::{OverlayError, OverlayResult};

pub(crate) const WINDOW_TITLE: PCWSTR = windows::core::w!("Zoomin Reticle");

/// Opens reticle resources for the calling thread.
pub struct Win32Platform {
    hinstance: HINSTANCE,
}

impl Win32Platform {
    pub fn new() -> OverlayResult<Self> {
        let hmodule = unsafe { GetModuleHandleW(None)? };
        Ok(Self {
            hinstance: HINSTANCE(hmodule.0),
        })
    }
}

impl OverlayPlatform for Win32Platform {
    type Surface = ScreenSurface;
    type Edges = EdgeWindowSet;
    type Scene = CompositionHost;

    fn open_scene(&mut self) -> OverlayResult<CompositionHost> {
        CompositionHost::open(self.hinstance)
    }

    fn open_edges(&mut self) -> OverlayResult<EdgeWindowSet> {
        EdgeWindowSet::open(self.hinstance)
    }

    fn open_surface(&mut self) -> OverlayResult<ScreenSurface> {
        Ok(ScreenSurface)
    }
}

/// Effective DPI of the monitor nearest `pt`.
pub(crate) fn monitor_dpi_at(pt: Point) -> Option<u16> {
    let hmonitor = unsafe { MonitorFromPoint(POINT { x: pt.x, y: pt.y }, MONITOR_DEFAULTTONEAREST) };
    if hmonitor.is_invalid() {
        return None;
    }
    Some(dpi::bridge().dpi_for_monitor(hmonitor.0 as isize))
}

pub(crate) fn virtual_screen_rect() -> Rect {
    unsafe {
        Rect::new(
            GetSystemMetrics(SM_XVIRTUALSCREEN),
            GetSystemMetrics(SM_YVIRTUALSCREEN),
            GetSystemMetrics(SM_CXVIRTUALSCREEN),
            GetSystemMetrics(SM_CYVIRTUALSCREEN),
        )
    }
}

/// Register `class` once per process.
pub(crate) fn register_class(
    once: &'static Once,
    hinstance: HINSTANCE,
    class: PCWSTR,
    wnd_proc: WNDPROC,
) -> OverlayResult<()> {
    let mut result = Ok(());
    once.call_once(|| unsafe {
        let wc = WNDCLASSEXW {
            cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
            lpfnWndProc: wnd_proc,
            hInstance: hinstance,
            lpszClassName: class,
            ..Default::default()
        };

        if RegisterClassExW(&wc) == 0 {
            result = Err(OverlayError::Windows(windows::core::Error::from_win32()));
        }
    });

    result
}

/// Top-level window destroyed on drop.
pub(crate) struct OwnedWindow(pub(crate) HWND);

impl Drop for OwnedWindow {
    fn drop(&mut self) {
        if !self.0.is_invalid() {
            unsafe {
                let _ = DestroyWindow(self.0);
            }
        }
    }
}

pub(crate) fn hwnd_param<T>(state: &T) -> Option<*const c_void> {
    Some(state as *const T as *const c_void)
}
