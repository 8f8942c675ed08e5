//! The simulation engine: owns every simulator and produces one frame per
//! tick.
//!
//! All mutation happens through `&mut self`, so the owner decides which
//! thread it runs on. The only shared state is the [`ForceSource`].

use glam::UVec2;
use image::RgbaImage;
use std::sync::Arc;
use tracing::{debug, info};

use crate::compositor::{Compositor, LayerInputs};
use crate::config::{ConfigSnapshot, StructuralKey};
use crate::force::ForceSource;
use crate::frame::Frame;
use crate::params::{ParticleTable, RenderConfig};
use crate::particles::ParticleField;
use crate::water::{build_water, WaterField};

pub struct Engine {
    config: ConfigSnapshot,
    key: StructuralKey,
    size: UVec2,
    forces: Arc<ForceSource>,
    table: ParticleTable,
    particles: Option<ParticleField>,
    water: Option<Box<dyn WaterField>>,
    base: Option<Arc<RgbaImage>>,
    compositor: Compositor,
    /// Seconds simulated since the last rebuild
    elapsed: f64,
    frame_count: u64,
}

impl Engine {
    /// Engine with no surface yet; nothing is simulated until [`resize`]
    /// reports non-zero dimensions
    ///
    /// [`resize`]: Engine::resize
    pub fn new(config: ConfigSnapshot, forces: Arc<ForceSource>, render: &RenderConfig) -> Self {
        let config = config.sanitized();
        forces.set_sensitivity(config.sensitivity);
        Self {
            key: config.structural_key(),
            config,
            size: UVec2::ZERO,
            forces,
            table: ParticleTable::default(),
            particles: None,
            water: None,
            base: None,
            compositor: Compositor::new(render.base_margin_px),
            elapsed: 0.0,
            frame_count: 0,
        }
    }

    pub fn config(&self) -> &ConfigSnapshot {
        &self.config
    }

    pub fn size(&self) -> UVec2 {
        self.size
    }

    pub fn forces(&self) -> &Arc<ForceSource> {
        &self.forces
    }

    pub fn particles(&self) -> Option<&ParticleField> {
        self.particles.as_ref()
    }

    pub fn water(&self) -> Option<&dyn WaterField> {
        self.water.as_deref()
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Adopt a new configuration snapshot.
    ///
    /// Continuous fields apply from the next tick. Simulators are rebuilt
    /// only when the structural part changed; returns whether that happened.
    pub fn apply_config(&mut self, config: ConfigSnapshot) -> bool {
        let config = config.sanitized();
        let key = config.structural_key();
        self.forces.set_sensitivity(config.sensitivity);
        self.config = config;
        if key == self.key {
            return false;
        }
        info!(?key, "structural configuration change");
        self.key = key;
        self.rebuild();
        true
    }

    /// Surface dimensions changed; rebuilds all simulators for the new size
    pub fn resize(&mut self, width: u32, height: u32) {
        let size = UVec2::new(width, height);
        if size == self.size {
            return;
        }
        info!(width, height, "surface resized");
        self.size = size;
        self.rebuild();
    }

    /// Swap the decoded base image; `None` falls back to a black background
    pub fn set_base_layer(&mut self, image: Option<Arc<RgbaImage>>) {
        if let Some(image) = &image {
            debug!(width = image.width(), height = image.height(), "base layer set");
        }
        self.base = image;
    }

    /// Rebuild every simulator from the current configuration
    pub fn reseed(&mut self) {
        self.rebuild();
    }

    fn rebuild(&mut self) {
        self.particles = None;
        self.water = None;
        self.elapsed = 0.0;
        if self.size.x == 0 || self.size.y == 0 {
            debug!("surface not ready, simulators left empty");
            return;
        }
        let bounds = self.size.as_vec2();

        if let Some((archetype, count)) = self.key.particles {
            self.particles = Some(ParticleField::new(
                count,
                archetype,
                bounds,
                self.table.clone(),
                self.key.seed,
            ));
        }
        if self.key.water.is_some() {
            self.water = Some(build_water(&self.config, bounds));
        }
        info!(
            particles = self.particles.as_ref().map_or(0, ParticleField::len),
            water = ?self.water.as_ref().map(|w| w.style()),
            "simulators rebuilt"
        );
    }

    /// Advance every simulator by `dt` seconds and compose a frame.
    ///
    /// Returns `None` while the surface has zero size.
    pub fn tick(&mut self, dt: f32) -> Option<Frame> {
        if self.size.x == 0 || self.size.y == 0 {
            return None;
        }
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let forces = self.forces.snapshot();

        if let Some(particles) = &mut self.particles {
            particles.step(forces.gravity_normalized, dt);
        }
        if let Some(water) = &mut self.water {
            water.step(&forces, dt);
        }
        self.elapsed += dt as f64;
        self.frame_count += 1;

        let inputs = LayerInputs {
            config: &self.config,
            base: self.base.as_ref(),
            parallax: forces.tilt,
            particles: self.particles.as_ref(),
            water: self.water.as_deref(),
        };
        Some(self.compositor.render(self.size, &inputs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WaterStyle;
    use crate::frame::DrawCommand;

    const DT: f32 = 0.016;

    fn engine(config: ConfigSnapshot) -> Engine {
        let mut engine = Engine::new(
            config,
            Arc::new(ForceSource::default()),
            &RenderConfig::default(),
        );
        engine.resize(360, 640);
        engine
    }

    fn busy_config() -> ConfigSnapshot {
        ConfigSnapshot {
            particles_enabled: true,
            particle_count: 30,
            water_enabled: true,
            ..ConfigSnapshot::default()
        }
    }

    #[test]
    fn test_zero_surface_produces_no_frame() {
        let mut engine = Engine::new(
            busy_config(),
            Arc::new(ForceSource::default()),
            &RenderConfig::default(),
        );
        assert!(engine.tick(DT).is_none());
        assert!(engine.particles().is_none());

        engine.resize(100, 0);
        assert!(engine.tick(DT).is_none());
    }

    #[test]
    fn test_builds_enabled_simulators() {
        let engine = engine(busy_config());
        assert_eq!(engine.particles().map(ParticleField::len), Some(30));
        assert_eq!(engine.water().map(|w| w.style()), Some(WaterStyle::Pond));
    }

    #[test]
    fn test_same_config_does_not_rebuild() {
        let mut engine = engine(busy_config());
        for _ in 0..20 {
            engine.tick(DT);
        }
        let before = engine.particles().map(|p| p.particles().to_vec());
        assert!(!engine.apply_config(busy_config()));
        assert!(!engine.apply_config(busy_config()));
        assert_eq!(engine.particles().map(|p| p.particles().to_vec()), before);
        assert!((engine.elapsed() - 20.0 * DT as f64).abs() < 1e-5);
    }

    #[test]
    fn test_continuous_change_does_not_rebuild() {
        let mut engine = engine(busy_config());
        engine.tick(DT);
        let tweaked = ConfigSnapshot {
            water_level: 0.6,
            sensitivity: 2.0,
            ..busy_config()
        };
        assert!(!engine.apply_config(tweaked));
        assert_eq!(engine.config().water_level, 0.6);
    }

    #[test]
    fn test_structural_change_rebuilds() {
        let mut engine = engine(busy_config());
        let fewer = ConfigSnapshot {
            particle_count: 5,
            water_style: WaterStyle::Ripple,
            ..busy_config()
        };
        assert!(engine.apply_config(fewer));
        assert_eq!(engine.particles().map(ParticleField::len), Some(5));
        assert_eq!(engine.water().map(|w| w.style()), Some(WaterStyle::Ripple));

        let off = ConfigSnapshot::default();
        assert!(engine.apply_config(off));
        assert!(engine.particles().is_none());
        assert!(engine.water().is_none());
    }

    #[test]
    fn test_body_count_leaves_ripple_running() {
        let ripple = ConfigSnapshot {
            water_style: WaterStyle::Ripple,
            ..busy_config()
        };
        let mut engine = engine(ripple.clone());
        for _ in 0..10 {
            engine.tick(DT);
        }
        let more_bodies = ConfigSnapshot {
            body_count: 5,
            ..ripple
        };
        assert!(!engine.apply_config(more_bodies.clone()));
        assert!(engine.elapsed() > 0.0);

        let pond = ConfigSnapshot {
            water_style: WaterStyle::Pond,
            ..more_bodies
        };
        assert!(engine.apply_config(pond.clone()));
        let fewer = ConfigSnapshot {
            body_count: -3,
            ..pond
        };
        assert!(engine.apply_config(fewer));
        assert_eq!(engine.config().body_count, 0);
    }

    #[test]
    fn test_resize_rebuilds_for_new_bounds() {
        let mut engine = engine(busy_config());
        engine.resize(1080, 1920);
        assert_eq!(
            engine.particles().map(|p| p.bounds()),
            Some(glam::Vec2::new(1080.0, 1920.0))
        );
        assert_eq!(engine.size(), UVec2::new(1080, 1920));
    }

    #[test]
    fn test_invalid_config_is_clamped() {
        let engine = engine(ConfigSnapshot {
            particles_enabled: true,
            particle_archetype: 17,
            particle_count: 1_000_000,
            ..ConfigSnapshot::default()
        });
        assert_eq!(engine.config().particle_archetype, 5);
        assert_eq!(engine.particles().map(ParticleField::len), Some(2_000));
    }

    #[test]
    fn test_frame_without_image_is_black_then_layers() {
        let mut engine = engine(busy_config());
        let frame = engine.tick(DT).unwrap();
        assert_eq!((frame.width, frame.height), (360, 640));
        assert_eq!(frame.commands[0], DrawCommand::Clear(crate::color::Rgba::BLACK));
        assert!(frame.commands.len() > 30);
        assert_eq!(engine.frame_count(), 1);
    }
}
