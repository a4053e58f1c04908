//! DPI entry points resolved from user32/shcore at run time

use crate::awareness::DpiAwarenessContext;
use crate::bridge::{
    rescale_font_height, DeviceTarget, DpiBridge, DpiFunctions, SystemParameter,
};
use crate::scaler::DpiScaler;
use once_cell::sync::Lazy;
use std::ffi::c_void;
use windows::core::{s, w, HRESULT, PCSTR};
use windows::Win32::Foundation::{BOOL, HMODULE, HWND};
use windows::Win32::Graphics::Gdi::{
    GetDC, GetDeviceCaps, ReleaseDC, HMONITOR, LOGFONTW, LOGPIXELSX, LOGPIXELSY,
};
use windows::Win32::System::LibraryLoader::{GetProcAddress, LoadLibraryW};
use windows::Win32::UI::WindowsAndMessaging::{
    GetSystemMetrics, SystemParametersInfoW, ICONMETRICSW, NONCLIENTMETRICSW,
    SYSTEM_METRICS_INDEX, SYSTEM_PARAMETERS_INFO_ACTION, SYSTEM_PARAMETERS_INFO_UPDATE_FLAGS,
};

type GetDpiForSystemFn = unsafe extern "system" fn() -> u32;
type GetDpiForWindowFn = unsafe extern "system" fn(HWND) -> u32;
type GetSystemMetricsForDpiFn = unsafe extern "system" fn(i32, u32) -> i32;
type SystemParametersInfoForDpiFn =
    unsafe extern "system" fn(u32, u32, *mut c_void, u32, u32) -> BOOL;
type IsValidDpiAwarenessContextFn = unsafe extern "system" fn(isize) -> BOOL;
type AreDpiAwarenessContextsEqualFn = unsafe extern "system" fn(isize, isize) -> BOOL;
type SetThreadDpiAwarenessContextFn = unsafe extern "system" fn(isize) -> isize;
type GetWindowDpiAwarenessContextFn = unsafe extern "system" fn(HWND) -> isize;
type EnableNonClientDpiScalingFn = unsafe extern "system" fn(HWND) -> BOOL;
type EnablePerMonitorMenuScalingFn = unsafe extern "system" fn() -> BOOL;
type GetDpiForMonitorFn = unsafe extern "system" fn(HMONITOR, i32, *mut u32, *mut u32) -> HRESULT;

const MDT_EFFECTIVE_DPI: i32 = 0;

/// Resolve a required entry point, recording it when absent.
macro_rules! required {
    ($module:expr, $name:literal, $missing:expr) => {
        resolve($module, s!($name)).or_else(|| {
            $missing.push($name);
            None
        })
    };
}

unsafe fn resolve<T: Copy>(module: HMODULE, name: PCSTR) -> Option<T> {
    debug_assert_eq!(
        std::mem::size_of::<T>(),
        std::mem::size_of::<unsafe extern "system" fn() -> isize>()
    );
    GetProcAddress(module, name).map(|proc| std::mem::transmute_copy(&proc))
}

fn hwnd(raw: isize) -> HWND {
    HWND(raw as *mut c_void)
}

/// Function table loaded once per process.
#[derive(Default)]
pub struct User32Functions {
    get_dpi_for_system: Option<GetDpiForSystemFn>,
    get_dpi_for_window: Option<GetDpiForWindowFn>,
    get_system_metrics_for_dpi: Option<GetSystemMetricsForDpiFn>,
    system_parameters_info_for_dpi: Option<SystemParametersInfoForDpiFn>,
    is_valid_dpi_awareness_context: Option<IsValidDpiAwarenessContextFn>,
    are_dpi_awareness_contexts_equal: Option<AreDpiAwarenessContextsEqualFn>,
    set_thread_dpi_awareness_context: Option<SetThreadDpiAwarenessContextFn>,
    get_window_dpi_awareness_context: Option<GetWindowDpiAwarenessContextFn>,
    enable_non_client_dpi_scaling: Option<EnableNonClientDpiScalingFn>,
    enable_per_monitor_menu_scaling: Option<EnablePerMonitorMenuScalingFn>,
    get_dpi_for_monitor: Option<GetDpiForMonitorFn>,
    missing: Vec<&'static str>,
}

impl User32Functions {
    pub fn load() -> Self {
        let mut table = Self::default();

        unsafe {
            match LoadLibraryW(w!("user32.dll")) {
                Ok(user32) => {
                    let missing = &mut table.missing;
                    table.get_dpi_for_system = required!(user32, "GetDpiForSystem", missing);
                    table.get_dpi_for_window = required!(user32, "GetDpiForWindow", missing);
                    table.get_system_metrics_for_dpi =
                        required!(user32, "GetSystemMetricsForDpi", missing);
                    table.system_parameters_info_for_dpi =
                        required!(user32, "SystemParametersInfoForDpi", missing);
                    table.is_valid_dpi_awareness_context =
                        required!(user32, "IsValidDpiAwarenessContext", missing);
                    table.are_dpi_awareness_contexts_equal =
                        required!(user32, "AreDpiAwarenessContextsEqual", missing);
                    table.set_thread_dpi_awareness_context =
                        required!(user32, "SetThreadDpiAwarenessContext", missing);
                    table.get_window_dpi_awareness_context =
                        required!(user32, "GetWindowDpiAwarenessContext", missing);
                    table.enable_non_client_dpi_scaling =
                        required!(user32, "EnableNonClientDpiScaling", missing);
                    // Optional: not an error if it's missing.
                    table.enable_per_monitor_menu_scaling =
                        resolve(user32, s!("EnablePerMonitorMenuScaling"));
                }
                Err(err) => {
                    tracing::warn!(%err, "user32.dll could not be loaded");
                    table.missing.push("user32.dll");
                }
            }

            // Optional as well; the device context answers on older systems.
            if let Ok(shcore) = LoadLibraryW(w!("shcore.dll")) {
                table.get_dpi_for_monitor = resolve(shcore, s!("GetDpiForMonitor"));
            }
        }

        table
    }
}

impl DpiFunctions for User32Functions {
    fn missing_entry_points(&self) -> Vec<&'static str> {
        self.missing.clone()
    }

    fn get_dpi_for_system(&self) -> Option<u32> {
        self.get_dpi_for_system.map(|f| unsafe { f() })
    }

    fn get_dpi_for_window(&self, hwnd_raw: isize) -> Option<u32> {
        self.get_dpi_for_window.map(|f| unsafe { f(hwnd(hwnd_raw)) })
    }

    fn get_dpi_for_monitor(&self, hmonitor: isize) -> Option<u32> {
        let f = self.get_dpi_for_monitor?;
        let (mut x, mut y) = (0u32, 0u32);
        let hr = unsafe { f(HMONITOR(hmonitor as _), MDT_EFFECTIVE_DPI, &mut x, &mut y) };
        hr.is_ok().then_some(x)
    }

    fn get_system_metrics_for_dpi(&self, index: i32, dpi: u32) -> Option<i32> {
        self.get_system_metrics_for_dpi
            .map(|f| unsafe { f(index, dpi) })
    }

    fn is_valid_dpi_awareness_context(&self, context: DpiAwarenessContext) -> Option<bool> {
        self.is_valid_dpi_awareness_context
            .map(|f| unsafe { f(context.0) }.as_bool())
    }

    fn are_dpi_awareness_contexts_equal(
        &self,
        a: DpiAwarenessContext,
        b: DpiAwarenessContext,
    ) -> Option<bool> {
        self.are_dpi_awareness_contexts_equal
            .map(|f| unsafe { f(a.0, b.0) }.as_bool())
    }

    fn set_thread_dpi_awareness_context(
        &self,
        context: DpiAwarenessContext,
    ) -> Option<DpiAwarenessContext> {
        self.set_thread_dpi_awareness_context
            .map(|f| DpiAwarenessContext(unsafe { f(context.0) }))
    }

    fn get_window_dpi_awareness_context(&self, hwnd_raw: isize) -> Option<DpiAwarenessContext> {
        self.get_window_dpi_awareness_context
            .map(|f| DpiAwarenessContext(unsafe { f(hwnd(hwnd_raw)) }))
    }

    fn enable_non_client_dpi_scaling(&self, hwnd_raw: isize) -> Option<bool> {
        self.enable_non_client_dpi_scaling
            .map(|f| unsafe { f(hwnd(hwnd_raw)) }.as_bool())
    }

    fn enable_per_monitor_menu_scaling(&self) -> Option<bool> {
        self.enable_per_monitor_menu_scaling
            .map(|f| unsafe { f() }.as_bool())
    }

    fn device_log_pixels(&self, target: DeviceTarget) -> (u32, u32) {
        // Monitors share the screen DC; pre-8.1 systems have one DPI anyway.
        let window = match target {
            DeviceTarget::Window(raw) => hwnd(raw),
            DeviceTarget::Screen | DeviceTarget::Monitor(_) => HWND::default(),
        };

        unsafe {
            let hdc = GetDC(window);
            if hdc.is_invalid() {
                return (96, 96);
            }
            let x = GetDeviceCaps(hdc, LOGPIXELSX) as u32;
            let y = GetDeviceCaps(hdc, LOGPIXELSY) as u32;
            ReleaseDC(window, hdc);
            (x, y)
        }
    }

    fn get_system_metrics(&self, index: i32) -> i32 {
        unsafe { GetSystemMetrics(SYSTEM_METRICS_INDEX(index)) }
    }
}

static BRIDGE: Lazy<DpiBridge<User32Functions>> =
    Lazy::new(|| DpiBridge::new(User32Functions::load()));

/// The process-wide bridge over the running system's DPI entry points.
pub fn bridge() -> &'static DpiBridge<User32Functions> {
    &BRIDGE
}

/// Result of [`DpiScaler::system_parameters_info`].
#[derive(Clone, Copy)]
pub enum SystemParameterValue {
    IconTitleFont(LOGFONTW),
    IconMetrics(ICONMETRICSW),
    NonClientMetrics(NONCLIENTMETRICSW),
}

impl DpiBridge<User32Functions> {
    /// Fill `value` for `parameter`. `Some(true)` means the system already
    /// scaled it for `dpi`; `Some(false)` means it is still at system DPI.
    ///
    /// # Safety
    /// `T` must be the structure `parameter` writes, with `cbSize` set where
    /// it has one.
    unsafe fn system_parameter<T>(
        &self,
        parameter: SystemParameter,
        value: &mut T,
        dpi: u16,
    ) -> Option<bool> {
        let size = std::mem::size_of::<T>() as u32;
        let param = value as *mut T as *mut c_void;

        if let Some(f) = self.functions().system_parameters_info_for_dpi {
            if f(parameter.action(), size, param, 0, dpi as u32).as_bool() {
                return Some(true);
            }
        }

        SystemParametersInfoW(
            SYSTEM_PARAMETERS_INFO_ACTION(parameter.action()),
            size,
            Some(param),
            SYSTEM_PARAMETERS_INFO_UPDATE_FLAGS(0),
        )
        .ok()?;
        Some(false)
    }

    fn rescale_fonts(&self, fonts: &mut [&mut LOGFONTW], dpi: u16) {
        let system_dpi = self.dpi_for_system();
        for font in fonts {
            font.lfHeight = rescale_font_height(font.lfHeight, dpi, system_dpi);
        }
    }

    /// Icon title font with its height expressed for `dpi`.
    pub fn icon_title_font_for_dpi(&self, dpi: u16) -> Option<LOGFONTW> {
        let mut font = LOGFONTW::default();
        let native =
            unsafe { self.system_parameter(SystemParameter::IconTitleFont, &mut font, dpi)? };
        if !native {
            self.rescale_fonts(&mut [&mut font], dpi);
        }
        Some(font)
    }

    /// Icon metrics with the font height expressed for `dpi`.
    pub fn icon_metrics_for_dpi(&self, dpi: u16) -> Option<ICONMETRICSW> {
        let mut metrics = ICONMETRICSW {
            cbSize: std::mem::size_of::<ICONMETRICSW>() as u32,
            ..Default::default()
        };
        let native =
            unsafe { self.system_parameter(SystemParameter::IconMetrics, &mut metrics, dpi)? };
        if !native {
            self.rescale_fonts(&mut [&mut metrics.lfFont], dpi);
        }
        Some(metrics)
    }

    /// Non-client metrics with font heights expressed for `dpi`.
    pub fn non_client_metrics_for_dpi(&self, dpi: u16) -> Option<NONCLIENTMETRICSW> {
        let mut ncm = NONCLIENTMETRICSW {
            cbSize: std::mem::size_of::<NONCLIENTMETRICSW>() as u32,
            ..Default::default()
        };
        let native =
            unsafe { self.system_parameter(SystemParameter::NonClientMetrics, &mut ncm, dpi)? };
        if !native {
            self.rescale_fonts(
                &mut [
                    &mut ncm.lfCaptionFont,
                    &mut ncm.lfSmCaptionFont,
                    &mut ncm.lfMenuFont,
                    &mut ncm.lfStatusFont,
                    &mut ncm.lfMessageFont,
                ],
                dpi,
            );
        }
        Some(ncm)
    }
}

impl DpiScaler {
    /// System metric scaled for this DPI.
    pub fn system_metrics(&self, index: i32) -> i32 {
        bridge().system_metrics_for_dpi(index, self.dpi() as u32)
    }

    /// DPI-dependent system parameters, fonts scaled for this DPI.
    pub fn system_parameters_info(
        &self,
        parameter: SystemParameter,
    ) -> Option<SystemParameterValue> {
        let bridge = bridge();
        let dpi = self.dpi();
        match parameter {
            SystemParameter::IconTitleFont => bridge
                .icon_title_font_for_dpi(dpi)
                .map(SystemParameterValue::IconTitleFont),
            SystemParameter::IconMetrics => bridge
                .icon_metrics_for_dpi(dpi)
                .map(SystemParameterValue::IconMetrics),
            SystemParameter::NonClientMetrics => bridge
                .non_client_metrics_for_dpi(dpi)
                .map(SystemParameterValue::NonClientMetrics),
        }
    }
}
