//! Layered, click-through edge windows

use std::cell::Cell;
use std::sync::Once;

use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{COLORREF, HINSTANCE, HWND, LPARAM, LRESULT, RECT, WPARAM};
use windows::Win32::Graphics::Gdi::{
    BeginPaint, CreateSolidBrush, DeleteObject, EndPaint, FillRect, UpdateWindow, HDC,
    PAINTSTRUCT,
};
use windows::Win32::System::SystemInformation::{
    VerSetConditionMask, VerifyVersionInfoW, OSVERSIONINFOEXW, VER_MAJORVERSION,
    VER_MINORVERSION,
};
use windows::Win32::UI::WindowsAndMessaging::{
    BeginDeferWindowPos, CreateWindowExW, DefWindowProcW, DeferWindowPos, EndDeferWindowPos,
    GetClientRect, GetWindowLongPtrW, SetLayeredWindowAttributes, SetWindowLongPtrW,
    SetWindowPos, ShowWindow, CREATESTRUCTW, GWLP_USERDATA, HTTRANSPARENT, HWND_TOPMOST,
    LWA_ALPHA, SWP_NOACTIVATE, SW_SHOWNOACTIVATE, WM_ERASEBKGND, WM_NCCREATE, WM_NCDESTROY,
    WM_NCHITTEST, WM_PAINT, WS_EX_LAYERED, WS_EX_NOACTIVATE, WS_EX_TOOLWINDOW, WS_EX_TOPMOST,
    WS_EX_TRANSPARENT, WS_POPUP,
};
use zoom::{Point, Rect, Size};

use super::{hwnd_param, monitor_dpi_at, register_class, OwnedWindow, WINDOW_TITLE};
use crate::layout::{edge_paint, Edge, EdgePlacements, EdgeThickness};
use crate::platform::{EdgeWindows, MonitorLookup};
use crate::settings::{Color, ReticleSettings};
use crate::{OverlayError, OverlayResult};

const EDGE_CLASS: PCWSTR = w!("ZoominReticleEdge");
const VER_GREATER_EQUAL: u8 = 3;

static REGISTER: Once = Once::new();

/// Paint state reached from the window procedure through `GWLP_USERDATA`.
struct EdgeState {
    edge: Edge,
    main_color: Cell<Color>,
    border_color: Cell<Color>,
    thickness: Cell<EdgeThickness>,
}

struct EdgeWindow {
    // Declared first so the window goes before the state it points at.
    window: OwnedWindow,
    state: Box<EdgeState>,
}

impl EdgeWindow {
    fn create(hinstance: HINSTANCE, edge: Edge) -> OverlayResult<Self> {
        let settings = ReticleSettings::default();
        let state = Box::new(EdgeState {
            edge,
            main_color: Cell::new(settings.main_color),
            border_color: Cell::new(settings.border_color),
            thickness: Cell::new(EdgeThickness::default()),
        });

        let hwnd = unsafe {
            CreateWindowExW(
                WS_EX_LAYERED
                    | WS_EX_TOPMOST
                    | WS_EX_TOOLWINDOW
                    | WS_EX_TRANSPARENT
                    | WS_EX_NOACTIVATE,
                EDGE_CLASS,
                WINDOW_TITLE,
                WS_POPUP,
                0,
                0,
                10,
                10,
                None,
                None,
                hinstance,
                hwnd_param(&*state),
            )?
        };

        Ok(Self {
            window: OwnedWindow(hwnd),
            state,
        })
    }

    fn hwnd(&self) -> HWND {
        self.window.0
    }
}

/// The four edge windows, created together and destroyed together.
pub struct EdgeWindowSet {
    windows: [EdgeWindow; 4],
}

impl EdgeWindowSet {
    pub fn open(hinstance: HINSTANCE) -> OverlayResult<Self> {
        if !is_windows8_or_greater() {
            return Err(OverlayError::Unsupported("layered edge windows need Windows 8"));
        }

        register_class(&REGISTER, hinstance, EDGE_CLASS, Some(edge_wnd_proc))?;

        // Any failure drops the windows created so far.
        let left = EdgeWindow::create(hinstance, Edge::Left)?;
        let top = EdgeWindow::create(hinstance, Edge::Top)?;
        let right = EdgeWindow::create(hinstance, Edge::Right)?;
        let bottom = EdgeWindow::create(hinstance, Edge::Bottom)?;

        Ok(Self {
            windows: [left, top, right, bottom],
        })
    }
}

impl MonitorLookup for EdgeWindowSet {
    fn monitor_dpi(&self, pt: Point) -> Option<u16> {
        monitor_dpi_at(pt)
    }
}

impl EdgeWindows for EdgeWindowSet {
    fn init(&mut self, settings: &ReticleSettings) -> OverlayResult<()> {
        let alpha = settings.alpha();
        for window in &self.windows {
            window.state.main_color.set(settings.main_color);
            window.state.border_color.set(settings.border_color);
            unsafe { SetLayeredWindowAttributes(window.hwnd(), COLORREF(0), alpha, LWA_ALPHA)? };
        }
        Ok(())
    }

    fn place(&mut self, placements: &EdgePlacements, thickness: EdgeThickness) -> OverlayResult<()> {
        for window in &self.windows {
            window.state.thickness.set(thickness);
        }

        unsafe {
            // Without a batch the windows move one at a time.
            let mut batch = BeginDeferWindowPos(4).ok();

            for window in &self.windows {
                let rect = placements.get(window.state.edge);
                match batch {
                    Some(hdwp) => {
                        let next = DeferWindowPos(
                            hdwp,
                            window.hwnd(),
                            HWND_TOPMOST,
                            rect.x,
                            rect.y,
                            rect.width,
                            rect.height,
                            SWP_NOACTIVATE,
                        )
                        .map_err(|_| OverlayError::Placement)?;
                        batch = Some(next);
                    }
                    None => {
                        let _ = SetWindowPos(
                            window.hwnd(),
                            HWND_TOPMOST,
                            rect.x,
                            rect.y,
                            rect.width,
                            rect.height,
                            SWP_NOACTIVATE,
                        );
                    }
                }
            }

            if let Some(hdwp) = batch {
                EndDeferWindowPos(hdwp)?;
            }
        }

        Ok(())
    }

    fn show(&mut self) {
        unsafe {
            for window in &self.windows {
                let _ = ShowWindow(window.hwnd(), SW_SHOWNOACTIVATE);
            }
            for window in &self.windows {
                let _ = UpdateWindow(window.hwnd());
            }
        }
    }
}

fn is_windows8_or_greater() -> bool {
    unsafe {
        let mut info = OSVERSIONINFOEXW {
            dwOSVersionInfoSize: std::mem::size_of::<OSVERSIONINFOEXW>() as u32,
            dwMajorVersion: 6,
            dwMinorVersion: 2,
            ..Default::default()
        };
        let mask = VerSetConditionMask(
            VerSetConditionMask(0, VER_MAJORVERSION, VER_GREATER_EQUAL),
            VER_MINORVERSION,
            VER_GREATER_EQUAL,
        );
        VerifyVersionInfoW(&mut info, VER_MAJORVERSION | VER_MINORVERSION, mask).is_ok()
    }
}

unsafe fn state_of<'a>(hwnd: HWND) -> Option<&'a EdgeState> {
    (GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *const EdgeState).as_ref()
}

unsafe fn fill(hdc: HDC, rect: Rect, color: Color) {
    if rect.is_empty() {
        return;
    }
    let brush = CreateSolidBrush(COLORREF(color.to_colorref()));
    let rc = RECT {
        left: rect.x,
        top: rect.y,
        right: rect.right(),
        bottom: rect.bottom(),
    };
    FillRect(hdc, &rc, brush);
    let _ = DeleteObject(brush);
}

unsafe fn paint(hwnd: HWND, state: &EdgeState) {
    let mut ps = PAINTSTRUCT::default();
    let hdc = BeginPaint(hwnd, &mut ps);

    let mut rc = RECT::default();
    if GetClientRect(hwnd, &mut rc).is_ok() {
        let client = Size::new(rc.right - rc.left, rc.bottom - rc.top);
        let plan = edge_paint(state.edge, client, state.thickness.get());

        fill(hdc, plan.background, state.border_color.get());
        for band in plan.bands {
            fill(hdc, band, state.main_color.get());
        }
    }

    let _ = EndPaint(hwnd, &ps);
}

unsafe extern "system" fn edge_wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_NCCREATE => {
            let create = &*(lparam.0 as *const CREATESTRUCTW);
            SetWindowLongPtrW(hwnd, GWLP_USERDATA, create.lpCreateParams as isize);
            DefWindowProcW(hwnd, msg, wparam, lparam)
        }
        WM_NCDESTROY => {
            SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0);
            DefWindowProcW(hwnd, msg, wparam, lparam)
        }
        WM_NCHITTEST => LRESULT(HTTRANSPARENT as isize),
        WM_ERASEBKGND => LRESULT(1),
        WM_PAINT => match state_of(hwnd) {
            Some(state) => {
                paint(hwnd, state);
                LRESULT(0)
            }
            None => DefWindowProcW(hwnd, msg, wparam, lparam),
        },
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}
