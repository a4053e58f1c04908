//! Degrading bridge over the optional DPI entry points

use crate::awareness::DpiAwarenessContext;
use crate::scaler::{mul_div, DpiScaler, BASE_DPI};
use crate::{DpiError, SM_CXFOCUSBORDER, SM_CYFOCUSBORDER};

/// Device context to read logical pixels from when the DPI entry points are
/// missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceTarget {
    Screen,
    Window(isize),
    Monitor(isize),
}

/// Raw DPI capability surface.
///
/// Each optional entry point returns `None` when the running system doesn't
/// export it. `device_log_pixels` and `get_system_metrics` exist everywhere.
pub trait DpiFunctions {
    /// Required entry points that could not be resolved.
    fn missing_entry_points(&self) -> Vec<&'static str>;

    fn get_dpi_for_system(&self) -> Option<u32>;
    fn get_dpi_for_window(&self, hwnd: isize) -> Option<u32>;
    fn get_dpi_for_monitor(&self, hmonitor: isize) -> Option<u32>;
    fn get_system_metrics_for_dpi(&self, index: i32, dpi: u32) -> Option<i32>;
    fn is_valid_dpi_awareness_context(&self, context: DpiAwarenessContext) -> Option<bool>;
    fn are_dpi_awareness_contexts_equal(
        &self,
        a: DpiAwarenessContext,
        b: DpiAwarenessContext,
    ) -> Option<bool>;
    fn set_thread_dpi_awareness_context(
        &self,
        context: DpiAwarenessContext,
    ) -> Option<DpiAwarenessContext>;
    fn get_window_dpi_awareness_context(&self, hwnd: isize) -> Option<DpiAwarenessContext>;
    fn enable_non_client_dpi_scaling(&self, hwnd: isize) -> Option<bool>;
    fn enable_per_monitor_menu_scaling(&self) -> Option<bool>;

    /// `(LOGPIXELSX, LOGPIXELSY)` of a device context for `target`.
    fn device_log_pixels(&self, target: DeviceTarget) -> (u32, u32);
    /// Unscaled `GetSystemMetrics`.
    fn get_system_metrics(&self, index: i32) -> i32;
}

/// `SystemParametersInfo` queries whose fonts depend on DPI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemParameter {
    IconTitleFont,
    IconMetrics,
    NonClientMetrics,
}

impl SystemParameter {
    /// The `SPI_GET*` action code.
    pub fn action(self) -> u32 {
        match self {
            SystemParameter::IconTitleFont => 0x001F,
            SystemParameter::IconMetrics => 0x002D,
            SystemParameter::NonClientMetrics => 0x0029,
        }
    }
}

/// Rescale a font height reported at the system DPI to `dpi`.
pub fn rescale_font_height(height: i32, dpi: u16, system_dpi: u16) -> i32 {
    DpiScaler::new(dpi).scale_from(height, system_dpi)
}

pub struct DpiBridge<F: DpiFunctions> {
    functions: F,
    init_error: Option<DpiError>,
}

impl<F: DpiFunctions> DpiBridge<F> {
    pub fn new(functions: F) -> Self {
        let missing = functions.missing_entry_points();
        let init_error = if missing.is_empty() {
            None
        } else {
            tracing::debug!(?missing, "DPI entry points unavailable, using fallbacks");
            Some(DpiError::MissingEntryPoints(missing))
        };

        Self {
            functions,
            init_error,
        }
    }

    /// Set when a required entry point was missing at start-up. Never fatal.
    pub fn init_error(&self) -> Option<&DpiError> {
        self.init_error.as_ref()
    }

    pub fn functions(&self) -> &F {
        &self.functions
    }

    fn device_dpi(&self, target: DeviceTarget) -> u16 {
        let (x, y) = self.functions.device_log_pixels(target);
        debug_assert_eq!(x, y, "non-square logical pixels");
        match x {
            // GetDeviceCaps failed.
            0 => BASE_DPI,
            x => x as u16,
        }
    }

    pub fn dpi_for_system(&self) -> u16 {
        match self.functions.get_dpi_for_system() {
            Some(dpi) => dpi as u16,
            None => self.device_dpi(DeviceTarget::Screen),
        }
    }

    pub fn dpi_for_window(&self, hwnd: isize) -> u16 {
        match self.functions.get_dpi_for_window(hwnd) {
            Some(dpi) => dpi as u16,
            None => self.device_dpi(DeviceTarget::Window(hwnd)),
        }
    }

    pub fn dpi_for_monitor(&self, hmonitor: isize) -> u16 {
        match self.functions.get_dpi_for_monitor(hmonitor) {
            Some(dpi) if dpi != 0 => dpi as u16,
            _ => self.device_dpi(DeviceTarget::Monitor(hmonitor)),
        }
    }

    pub fn system_metrics_for_dpi(&self, index: i32, dpi: u32) -> i32 {
        if index == SM_CXFOCUSBORDER || index == SM_CYFOCUSBORDER {
            // The native call hands these back unscaled, so scale them either way.
            let unscaled = self.functions.get_system_metrics(index);
            return mul_div(unscaled, dpi as i32, BASE_DPI as i32);
        }

        self.functions
            .get_system_metrics_for_dpi(index, dpi)
            .unwrap_or_else(|| self.functions.get_system_metrics(index))
    }

    pub fn is_valid_awareness_context(&self, context: DpiAwarenessContext) -> bool {
        self.functions
            .is_valid_dpi_awareness_context(context)
            .unwrap_or(false)
    }

    pub fn are_awareness_contexts_equal(
        &self,
        a: DpiAwarenessContext,
        b: DpiAwarenessContext,
    ) -> bool {
        self.functions
            .are_dpi_awareness_contexts_equal(a, b)
            .unwrap_or(a == b)
    }

    /// Returns the previous context; a no-op returning `UNAWARE` when the
    /// system has no per-thread awareness.
    pub fn set_thread_awareness_context(
        &self,
        context: DpiAwarenessContext,
    ) -> DpiAwarenessContext {
        self.functions
            .set_thread_dpi_awareness_context(context)
            .unwrap_or(DpiAwarenessContext::UNAWARE)
    }

    pub fn window_awareness_context(&self, hwnd: isize) -> DpiAwarenessContext {
        self.functions
            .get_window_dpi_awareness_context(hwnd)
            .unwrap_or(DpiAwarenessContext::UNAWARE)
    }

    pub fn is_window_per_monitor_aware(&self, hwnd: isize) -> bool {
        let context = self.window_awareness_context(hwnd);
        self.are_awareness_contexts_equal(context, DpiAwarenessContext::PER_MONITOR_AWARE)
            || self.are_awareness_contexts_equal(
                context,
                DpiAwarenessContext::PER_MONITOR_AWARE_V2,
            )
    }

    pub fn enable_non_client_dpi_scaling(&self, hwnd: isize) -> bool {
        self.functions
            .enable_non_client_dpi_scaling(hwnd)
            .unwrap_or(true)
    }

    /// Best effort; `false` when unsupported.
    pub fn enable_per_monitor_menu_scaling(&self) -> bool {
        self.functions
            .enable_per_monitor_menu_scaling()
            .unwrap_or(false)
    }
}


#[cfg(test)]
mod tests {
    use super::fake::FakeFunctions;
    use super::*;

    #[test]
    fn native_dpi_queries_win() {
        let bridge = DpiBridge::new(FakeFunctions::modern());
        assert!(bridge.init_error().is_none());
        assert_eq!(bridge.dpi_for_system(), 144);
        assert_eq!(bridge.dpi_for_window(1), 144);
        assert_eq!(bridge.dpi_for_monitor(1), 144);
    }

    #[test]
    fn missing_dpi_queries_read_device_context() {
        let bridge = DpiBridge::new(FakeFunctions::legacy());
        assert!(matches!(
            bridge.init_error(),
            Some(DpiError::MissingEntryPoints(names)) if names.len() == 2
        ));
        assert_eq!(bridge.dpi_for_system(), 96);
        assert_eq!(bridge.dpi_for_window(1), 96);
        assert_eq!(bridge.dpi_for_monitor(1), 96);
    }

    #[test]
    fn failed_device_query_falls_back_to_base_dpi() {
        let bridge = DpiBridge::new(FakeFunctions {
            device_dpi: 0,
            ..FakeFunctions::legacy()
        });
        assert_eq!(bridge.dpi_for_system(), BASE_DPI);
        assert_eq!(bridge.dpi_for_monitor(1), BASE_DPI);
    }

    #[test]
    fn focus_border_metrics_are_always_rescaled() {
        let bridge = DpiBridge::new(FakeFunctions::modern());
        assert_eq!(bridge.system_metrics_for_dpi(SM_CXFOCUSBORDER, 192), 2);
        assert_eq!(bridge.system_metrics_for_dpi(SM_CYFOCUSBORDER, 288), 3);
        assert_eq!(bridge.system_metrics_for_dpi(5, 192), 40);
    }

    #[test]
    fn missing_scaled_metrics_return_unscaled() {
        let bridge = DpiBridge::new(FakeFunctions::legacy());
        assert_eq!(bridge.system_metrics_for_dpi(5, 192), 20);
    }

    #[test]
    fn focus_border_metrics_rescale_without_native_call() {
        let bridge = DpiBridge::new(FakeFunctions::legacy());
        assert_eq!(bridge.system_metrics_for_dpi(SM_CXFOCUSBORDER, 192), 2);
        assert_eq!(bridge.system_metrics_for_dpi(SM_CYFOCUSBORDER, 144), 1);
        assert_eq!(bridge.system_metrics_for_dpi(SM_CYFOCUSBORDER, 96), 1);
    }

    #[test]
    fn missing_awareness_functions_degrade() {
        let bridge = DpiBridge::new(FakeFunctions::legacy());
        assert_eq!(
            bridge.set_thread_awareness_context(DpiAwarenessContext::PER_MONITOR_AWARE),
            DpiAwarenessContext::UNAWARE
        );
        assert!(!bridge.is_valid_awareness_context(DpiAwarenessContext::SYSTEM_AWARE));
        assert!(bridge.are_awareness_contexts_equal(
            DpiAwarenessContext::SYSTEM_AWARE,
            DpiAwarenessContext::SYSTEM_AWARE
        ));
        assert!(!bridge.is_window_per_monitor_aware(1));
        assert!(bridge.enable_non_client_dpi_scaling(1));
    }

    #[test]
    fn per_monitor_window_detected() {
        let bridge = DpiBridge::new(FakeFunctions::modern());
        assert!(bridge.is_window_per_monitor_aware(1));
        assert!(!bridge.enable_non_client_dpi_scaling(1));
    }

    #[test]
    fn menu_scaling_is_optional() {
        let bridge = DpiBridge::new(FakeFunctions::modern());
        assert!(bridge.init_error().is_none());
        assert!(!bridge.enable_per_monitor_menu_scaling());

        let bridge = DpiBridge::new(FakeFunctions {
            menu_scaling: true,
            ..FakeFunctions::modern()
        });
        assert!(bridge.enable_per_monitor_menu_scaling());
    }

    #[test]
    fn system_parameter_actions() {
        assert_eq!(SystemParameter::IconTitleFont.action(), 0x1F);
        assert_eq!(SystemParameter::IconMetrics.action(), 0x2D);
        assert_eq!(SystemParameter::NonClientMetrics.action(), 0x29);
    }

    #[test]
    fn font_heights_rescale_from_system_dpi() {
        assert_eq!(rescale_font_height(-12, 144, 96), -18);
        assert_eq!(rescale_font_height(-18, 96, 144), -12);
    }
}
