//! Reticle appearance settings

use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const MIN_OPACITY: u8 = 10;
pub const MAX_OPACITY: u8 = 100;

/// Opaque RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `COLORREF` layout: 0x00BBGGRR.
    pub fn to_colorref(self) -> u32 {
        (self.r as u32) | ((self.g as u32) << 8) | ((self.b as u32) << 16)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid colour {0:?}, expected #RRGGBB")]
pub struct ParseColorError(String);

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(ParseColorError(s.to_owned()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ParseColorError(s.to_owned()))
        };
        Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Colours, thicknesses (at 96 DPI) and opacity of the reticle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReticleSettings {
    pub main_color: Color,
    pub border_color: Color,
    pub main_thickness: i32,
    pub border_thickness: i32,
    /// Percent, clamped to 10..=100.
    pub opacity: u8,
}

impl Default for ReticleSettings {
    fn default() -> Self {
        Self {
            main_color: Color::rgb(255, 0, 0),
            border_color: Color::rgb(255, 255, 255),
            main_thickness: 2,
            border_thickness: 1,
            opacity: 75,
        }
    }
}

impl ReticleSettings {
    /// Opacity clamped and thicknesses kept non-negative.
    pub fn normalized(mut self) -> Self {
        self.opacity = self.opacity.clamp(MIN_OPACITY, MAX_OPACITY);
        self.main_thickness = self.main_thickness.max(0);
        self.border_thickness = self.border_thickness.max(0);
        self
    }

    /// Layered-window alpha, 0..=255.
    pub fn alpha(&self) -> u8 {
        let opacity = self.opacity.clamp(MIN_OPACITY, MAX_OPACITY) as u32;
        (255 * opacity / 100) as u8
    }

    /// Compositor opacity, 0.0..=1.0.
    pub fn opacity_fraction(&self) -> f32 {
        self.opacity.clamp(MIN_OPACITY, MAX_OPACITY) as f32 / 100.0
    }
}
