//! 8-bit RGBA color with Android-style hex notation.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ConfigError;

/// Straight (non-premultiplied) 8-bit RGBA color.
///
/// Layout matches one pixel of an `image::RgbaImage`, so slices of colors
/// can be cast to raw bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::new(0, 0, 0, 255);
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Android `Color.argb` argument order
    pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with a different alpha
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Same color with alpha taken from a 0..1 fraction of 255
    pub fn with_opacity(self, opacity: f32) -> Self {
        self.with_alpha(unit_to_byte(opacity))
    }

    /// Parse `#AARRGGBB` or `#RRGGBB` (leading `#` optional)
    pub fn parse_hex(hex: &str) -> Result<Self, ConfigError> {
        let clean = hex.trim().trim_start_matches('#');
        let invalid = || ConfigError::InvalidColor(hex.to_string());

        let value = u32::from_str_radix(clean, 16).map_err(|_| invalid())?;
        match clean.len() {
            6 => Ok(Self::argb(
                0xFF,
                (value >> 16) as u8,
                (value >> 8) as u8,
                value as u8,
            )),
            8 => Ok(Self::argb(
                (value >> 24) as u8,
                (value >> 16) as u8,
                (value >> 8) as u8,
                value as u8,
            )),
            _ => Err(invalid()),
        }
    }

    /// Linear interpolation per channel, `t` in 0..1
    pub fn lerp(self, other: Rgba, t: f32) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgba::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }
}

/// Map a 0..1 fraction onto 0..255, saturating out-of-range input
pub fn unit_to_byte(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    (value * 255.0).clamp(0.0, 255.0) as u8
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}{:02X}", self.a, self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Rgba {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rgba::parse_hex(&value)
    }
}

impl From<Rgba> for String {
    fn from(color: Rgba) -> Self {
        color.to_string()
    }
}
