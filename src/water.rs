//! Water layer: one capability, two implementations.
//!
//! - [`RippleField`]: height grid advanced by a damped wave stencil and
//!   rendered to a small raster
//! - [`PondField`]: closed-form wavy surface carrying [`FloatingBodies`]
//!
//! The engine holds whichever one the configuration selects behind
//! `Box<dyn WaterField>` and rebuilds it on structural changes.

mod bodies;
mod pond;
mod ripple;

pub use bodies::{FloatingBodies, FloatingBody};
pub use pond::PondField;
pub use ripple::RippleField;

use glam::Vec2;

use crate::color::Rgba;
use crate::config::{ConfigSnapshot, WaterStyle};
use crate::force::Forces;
use crate::frame::DrawCommand;
use crate::params::{BodyParams, PondParams, RippleParams};

/// Continuous (per-tick) water appearance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterLook {
    /// Resting level as a fraction of screen height
    pub level: f32,
    pub color: Rgba,
}

impl WaterLook {
    pub fn from_config(config: &ConfigSnapshot) -> Self {
        Self {
            level: config.water_level.clamp(0.0, 1.0),
            color: config.water_color,
        }
    }
}

/// A simulated water surface
pub trait WaterField: Send {
    /// Advance by `dt` seconds under the current forces
    fn step(&mut self, forces: &Forces, dt: f32);

    /// Append draw commands for the current state; never mutates
    fn render(&self, look: &WaterLook, out: &mut Vec<DrawCommand>);

    fn style(&self) -> WaterStyle;
}

/// Build the water implementation selected by `config` for a surface of
/// `size` pixels
pub fn build_water(config: &ConfigSnapshot, size: Vec2) -> Box<dyn WaterField> {
    match config.water_style {
        WaterStyle::Ripple => Box::new(RippleField::new(size, RippleParams::default())),
        WaterStyle::Pond => Box::new(PondField::new(
            size,
            config.body_count(),
            config.seed,
            PondParams::default(),
            BodyParams::default(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_honours_style() {
        let size = Vec2::new(360.0, 640.0);
        let mut config = ConfigSnapshot {
            water_enabled: true,
            ..ConfigSnapshot::default()
        };
        assert_eq!(build_water(&config, size).style(), WaterStyle::Pond);
        config.water_style = WaterStyle::Ripple;
        assert_eq!(build_water(&config, size).style(), WaterStyle::Ripple);
    }
}
