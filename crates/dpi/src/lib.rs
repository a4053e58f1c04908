//! DPI module for Zoomin
//!
//! Provides integer DPI scaling that matches the platform's rounding, and a
//! bridge over the per-monitor DPI entry points that older systems lack.

pub mod awareness;
pub mod bridge;
pub mod scaler;
#[cfg(windows)]
pub mod user32;

pub use awareness::{DpiAwarenessContext, ThreadDpiAwarenessContext};
pub use bridge::{
    rescale_font_height, DeviceTarget, DpiBridge, DpiFunctions, SystemParameter,
};
pub use scaler::{mul_div, DpiScaler, BASE_DPI, ROUNDING_BIAS_SHIFT};

#[cfg(windows)]
pub use user32::{bridge, SystemParameterValue, User32Functions};

use thiserror::Error;

/// `SM_CXFOCUSBORDER`
pub const SM_CXFOCUSBORDER: i32 = 83;
/// `SM_CYFOCUSBORDER`
pub const SM_CYFOCUSBORDER: i32 = 84;

#[derive(Error, Debug)]
pub enum DpiError {
    #[cfg(windows)]
    #[error("Windows API error: {0}")]
    Windows(#[from] windows::core::Error),

    #[error("Library unavailable: {0}")]
    LibraryUnavailable(&'static str),

    #[error("Missing DPI entry points: {}", .0.join(", "))]
    MissingEntryPoints(Vec<&'static str>),
}

pub type DpiResult<T> = Result<T, DpiError>;
