//! Overlay module for Zoomin
//!
//! Draws the reticle that frames the magnifier's capture area, in whichever
//! of three modes the system supports.

pub mod composition;
pub mod edges;
pub mod layout;
pub mod platform;
pub mod reticle;
pub mod settings;
#[cfg(windows)]
pub mod win32;
pub mod xor;

pub use layout::{Edge, EdgePlacements, EdgeThickness, SpriteLayout, SpriteRect};
pub use platform::{
    CompositionScene, EdgeWindows, MonitorLookup, OverlayPlatform, Task, XorSurface,
};
pub use reticle::{create_overlay, Overlay, ReticleMode};
pub use settings::{Color, ParseColorError, ReticleSettings};

#[cfg(windows)]
pub use win32::Win32Platform;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OverlayError {
    #[cfg(windows)]
    #[error("Windows API error: {0}")]
    Windows(#[from] windows::core::Error),

    #[error("Unsupported: {0}")]
    Unsupported(&'static str),

    #[error("Window placement failed")]
    Placement,

    #[error("Composition failed: {0}")]
    Composition(String),
}

pub type OverlayResult<T> = Result<T, OverlayError>;
