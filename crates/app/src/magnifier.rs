//! Win32 message loop that keeps the reticle on the cursor

use anyhow::Context;
use dpi::{
    DpiAwarenessContext, DpiScaler, SystemParameter, SystemParameterValue,
    ThreadDpiAwarenessContext,
};
use overlay::{create_overlay, Overlay, ReticleSettings, Win32Platform};
use windows::Win32::Foundation::POINT;
use windows::Win32::Graphics::Gdi::{
    GetMonitorInfoW, MonitorFromPoint, MONITORINFO, MONITOR_DEFAULTTONEAREST,
};
use windows::Win32::System::WinRT::{RoInitialize, RoUninitialize, RO_INIT_SINGLETHREADED};
use windows::Win32::UI::Input::KeyboardAndMouse::{
    GetAsyncKeyState, VIRTUAL_KEY, VK_ADD, VK_END, VK_ESCAPE, VK_HOME, VK_NEXT, VK_OEM_MINUS,
    VK_OEM_PLUS, VK_PRIOR, VK_SUBTRACT,
};
use windows::Win32::UI::WindowsAndMessaging::{
    DispatchMessageW, GetCursorPos, GetMessageW, KillTimer, PostQuitMessage, SetTimer,
    TranslateMessage, MSG, WM_TIMER,
};
use zoom::{Point, Rect, ZoomArea};

use crate::config::ZoominConfig;
use crate::state::{Action, Keys, MagnifierState};

pub fn run(config: ZoominConfig) -> anyhow::Result<()> {
    unsafe {
        // Composition needs a WinRT apartment; an existing one is fine too.
        let _ = RoInitialize(RO_INIT_SINGLETHREADED);
    }

    let result = run_loop(&config);

    unsafe { RoUninitialize() };
    result
}

fn run_loop(config: &ZoominConfig) -> anyhow::Result<()> {
    let bridge = dpi::bridge();
    if let Some(err) = bridge.init_error() {
        tracing::info!(%err, "running with DPI fallbacks");
    }

    let awareness =
        ThreadDpiAwarenessContext::new(bridge, DpiAwarenessContext::PER_MONITOR_AWARE_V2);
    tracing::debug!(previous = %awareness.previous(), "thread DPI awareness set");
    let system_dpi = bridge.dpi_for_system();
    log_fonts(DpiScaler::new(system_dpi));

    let mut platform = Win32Platform::new().context("opening overlay platform")?;
    let mut state = MagnifierState::new(
        config.factor(),
        config.zoom.viewport.into(),
        DpiScaler::new(system_dpi),
    );
    let mut overlay = open_overlay(&mut platform, &state, config.reticle);

    let timer = unsafe { SetTimer(None, 0, config.zoom.tick_ms, None) };
    if timer == 0 {
        anyhow::bail!("could not start the cursor timer");
    }
    tracing::info!(factor = state.factor().get(), "following the cursor, Esc quits");

    let mut msg = MSG::default();
    unsafe {
        while GetMessageW(&mut msg, None, 0, 0).as_bool() {
            if msg.message == WM_TIMER && msg.wParam.0 == timer {
                if !on_tick(&mut platform, &mut state, &mut overlay, config.reticle) {
                    PostQuitMessage(0);
                }
                continue;
            }
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }

        let _ = KillTimer(None, timer);
    }

    Ok(())
}

/// Returns `false` once the user asked to quit.
fn on_tick(
    platform: &mut Win32Platform,
    state: &mut MagnifierState,
    overlay: &mut Option<Overlay<Win32Platform>>,
    settings: ReticleSettings,
) -> bool {
    let Some((cursor, monitor)) = cursor_and_monitor() else {
        return true;
    };

    match state.tick(cursor, &monitor, sample_keys()) {
        Action::Idle => {}
        Action::Track(area) => track(overlay, area),
        Action::Resize(area) => {
            tracing::info!(factor = state.factor().get(), "zoom changed");
            // Undraw the old reticle before the new one opens.
            *overlay = None;
            *overlay = open_overlay(platform, state, settings);
            track(overlay, area);
        }
        Action::Quit => return false,
    }

    true
}

/// `None` when no reticle mode works; the magnifier carries on without one.
fn open_overlay(
    platform: &mut Win32Platform,
    state: &MagnifierState,
    settings: ReticleSettings,
) -> Option<Overlay<Win32Platform>> {
    let size = state.capture_size();
    let overlay = create_overlay(platform, size.width, size.height, settings);
    if overlay.is_none() {
        tracing::warn!("no reticle mode could be initialised, running without one");
    }
    overlay
}

fn track(overlay: &mut Option<Overlay<Win32Platform>>, area: ZoomArea) {
    let rect = area.rect;
    let capture = move || {
        tracing::debug!(
            x = rect.x,
            y = rect.y,
            width = rect.width,
            height = rect.height,
            "capture"
        );
    };

    match overlay {
        Some(overlay) => {
            overlay.update_reticle_position(area.center);
            overlay.invoke(capture);
        }
        None => capture(),
    }
}

fn cursor_and_monitor() -> Option<(Point, Rect)> {
    unsafe {
        let mut pt = POINT::default();
        GetCursorPos(&mut pt).ok()?;

        let hmonitor = MonitorFromPoint(pt, MONITOR_DEFAULTTONEAREST);
        if hmonitor.is_invalid() {
            return None;
        }
        let mut info = MONITORINFO {
            cbSize: std::mem::size_of::<MONITORINFO>() as u32,
            ..Default::default()
        };
        if !GetMonitorInfoW(hmonitor, &mut info).as_bool() {
            return None;
        }

        let rc = info.rcMonitor;
        Some((
            Point::new(pt.x, pt.y),
            Rect::from_ltrb(rc.left, rc.top, rc.right, rc.bottom),
        ))
    }
}

fn is_down(key: VIRTUAL_KEY) -> bool {
    unsafe { (GetAsyncKeyState(key.0 as i32) as u16) & 0x8000 != 0 }
}

fn sample_keys() -> Keys {
    Keys {
        zoom_in: is_down(VK_ADD) || is_down(VK_OEM_PLUS),
        zoom_out: is_down(VK_SUBTRACT) || is_down(VK_OEM_MINUS),
        page_up: is_down(VK_PRIOR),
        page_down: is_down(VK_NEXT),
        home: is_down(VK_HOME),
        end: is_down(VK_END),
        quit: is_down(VK_ESCAPE),
    }
}

fn face_name(face: &[u16]) -> String {
    let len = face.iter().position(|&c| c == 0).unwrap_or(face.len());
    String::from_utf16_lossy(&face[..len])
}

fn log_fonts(dpi: DpiScaler) {
    match dpi.system_parameters_info(SystemParameter::NonClientMetrics) {
        Some(SystemParameterValue::NonClientMetrics(metrics)) => {
            let font = &metrics.lfMessageFont;
            let face = face_name(&font.lfFaceName);
            tracing::debug!(%face, height = font.lfHeight, dpi = dpi.dpi(), "message font");
        }
        _ => tracing::debug!("non-client metrics unavailable"),
    }

    if let Some(SystemParameterValue::IconTitleFont(font)) =
        dpi.system_parameters_info(SystemParameter::IconTitleFont)
    {
        let face = face_name(&font.lfFaceName);
        tracing::debug!(%face, height = font.lfHeight, "icon title font");
    }

    if let Some(SystemParameterValue::IconMetrics(metrics)) =
        dpi.system_parameters_info(SystemParameter::IconMetrics)
    {
        tracing::debug!(
            spacing = metrics.iHorzSpacing,
            height = metrics.lfFont.lfHeight,
            "icon metrics"
        );
    }
}
