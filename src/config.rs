//! Configuration snapshot handed in by the settings layer.
//!
//! A snapshot is immutable once built. The engine compares each new snapshot
//! against the current one and rebuilds simulators wholesale when a
//! structural field changed; every other field is picked up on the next tick.

use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use tracing::warn;

use crate::color::Rgba;
use crate::error::ConfigError;
use crate::particles::ParticleArchetype;

/// Upper bound on the particle pool size
pub const MAX_PARTICLES: usize = 2_000;

/// Upper bound on the number of floating bodies
pub const MAX_BODIES: usize = 5;

/// Upper bound on the base layer blur radius (pixels)
pub const MAX_BLUR: f32 = 25.0;

/// Which water implementation runs when water is enabled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaterStyle {
    /// Analytic wavy surface with floating bodies
    #[default]
    Pond,
    /// Height-field ripple grid
    Ripple,
}

/// Every user-facing setting the engine reads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigSnapshot {
    /// Parallax strength multiplier (> 0)
    pub sensitivity: f32,
    pub gyro_enabled: bool,

    pub water_enabled: bool,
    pub water_style: WaterStyle,
    /// Resting water level as a fraction of screen height (0..1)
    pub water_level: f32,
    pub water_color: Rgba,
    /// Number of floating bodies on the pond (0..=5)
    #[serde(deserialize_with = "lenient_count")]
    pub body_count: i64,

    pub color_overlay_enabled: bool,
    pub overlay_color: Rgba,

    pub blur_enabled: bool,
    /// Gaussian sigma applied to the base layer (pixels, 0..=25)
    pub blur_amount: f32,

    pub particles_enabled: bool,
    /// Archetype index; out-of-range values clamp to the nearest archetype
    #[serde(deserialize_with = "lenient_count")]
    pub particle_archetype: i64,
    #[serde(deserialize_with = "lenient_count")]
    pub particle_count: i64,

    /// Seed for particle and body random streams
    pub seed: u64,
}

impl Default for ConfigSnapshot {
    fn default() -> Self {
        Self {
            sensitivity: 1.0,
            gyro_enabled: true,
            water_enabled: false,
            water_style: WaterStyle::Pond,
            water_level: 0.2,
            water_color: Rgba::argb(153, 0, 191, 255),
            body_count: 3,
            color_overlay_enabled: false,
            overlay_color: Rgba::argb(50, 25, 25, 112),
            blur_enabled: false,
            blur_amount: 0.0,
            particles_enabled: false,
            particle_archetype: 0,
            particle_count: 50,
            seed: 42,
        }
    }
}

/// Fields whose change requires rebuilding a simulator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructuralKey {
    pub particles: Option<(ParticleArchetype, usize)>,
    pub water: Option<(WaterStyle, usize)>,
    pub seed: u64,
}

impl ConfigSnapshot {
    /// Load a snapshot from a JSON document; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a snapshot from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Clamp every field into its valid range, logging each correction
    pub fn sanitized(&self) -> Self {
        let mut out = self.clone();

        if !(out.sensitivity.is_finite() && out.sensitivity > 0.0) {
            warn!(value = out.sensitivity, "sensitivity out of range, using 1.0");
            out.sensitivity = 1.0;
        }
        out.sensitivity = out.sensitivity.min(10.0);

        out.water_level = clamp_unit("water_level", out.water_level, 0.2);

        if out.body_count < 0 || out.body_count > MAX_BODIES as i64 {
            warn!(value = out.body_count, "body_count out of range, clamping");
            out.body_count = out.body_count.clamp(0, MAX_BODIES as i64);
        }

        if !out.blur_amount.is_finite() || !(0.0..=MAX_BLUR).contains(&out.blur_amount) {
            warn!(value = out.blur_amount, "blur_amount out of range, clamping");
            out.blur_amount = if out.blur_amount.is_finite() {
                out.blur_amount.clamp(0.0, MAX_BLUR)
            } else {
                0.0
            };
        }

        let archetype = ParticleArchetype::from_index_clamped(out.particle_archetype);
        if archetype as i64 != out.particle_archetype {
            warn!(
                requested = out.particle_archetype,
                using = ?archetype,
                "particle archetype out of range"
            );
            out.particle_archetype = archetype as i64;
        }

        if out.particle_count < 0 || out.particle_count > MAX_PARTICLES as i64 {
            warn!(value = out.particle_count, "particle_count out of range, clamping");
            out.particle_count = out.particle_count.clamp(0, MAX_PARTICLES as i64);
        }

        out
    }

    pub fn archetype(&self) -> ParticleArchetype {
        ParticleArchetype::from_index_clamped(self.particle_archetype)
    }

    pub fn particle_count(&self) -> usize {
        self.particle_count.clamp(0, MAX_PARTICLES as i64) as usize
    }

    pub fn body_count(&self) -> usize {
        self.body_count.clamp(0, MAX_BODIES as i64) as usize
    }

    /// The structural part of this snapshot
    ///
    /// Body count only shapes the pond; the ripple grid ignores it.
    pub fn structural_key(&self) -> StructuralKey {
        let bodies = match self.water_style {
            WaterStyle::Pond => self.body_count(),
            WaterStyle::Ripple => 0,
        };
        StructuralKey {
            particles: (self.particles_enabled && self.particle_count() > 0)
                .then(|| (self.archetype(), self.particle_count())),
            water: self.water_enabled.then_some((self.water_style, bodies)),
            seed: self.seed,
        }
    }

    /// Effective blur sigma, zero when blur is off
    pub fn blur_sigma(&self) -> f32 {
        if self.blur_enabled {
            self.blur_amount.clamp(0.0, MAX_BLUR)
        } else {
            0.0
        }
    }
}

/// Accept any JSON number for a count; `sanitized` clamps it afterwards.
/// Fractions truncate toward zero and out-of-range magnitudes saturate.
fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Int(i64),
        Float(f64),
    }
    Ok(match Count::deserialize(deserializer)? {
        Count::Int(n) => n,
        Count::Float(f) => f as i64,
    })
}

fn clamp_unit(name: &str, value: f32, fallback: f32) -> f32 {
    if !value.is_finite() {
        warn!(field = name, "non-finite value, using {}", fallback);
        return fallback;
    }
    if !(0.0..=1.0).contains(&value) {
        warn!(field = name, value, "value outside 0..1, clamping");
    }
    value.clamp(0.0, 1.0)
}
