//! Long-running properties of the simulators, exercised through the public API.

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

use tiltscape::config::{ConfigSnapshot, WaterStyle};
use tiltscape::engine::Engine;
use tiltscape::force::{ForceSource, Forces};
use tiltscape::params::{
    BodyParams, ForceParams, ParticleTable, PondParams, RenderConfig, RippleParams,
};
use tiltscape::particles::{ParticleArchetype, ParticleField};
use tiltscape::water::{FloatingBodies, PondField, RippleField, WaterField};

const DT: f32 = 0.016;

fn random_forces(rng: &mut StdRng) -> Forces {
    let gravity = Vec2::new(rng.gen_range(-19.6..19.6), rng.gen_range(-19.6..19.6));
    Forces {
        tilt: Vec2::new(rng.gen_range(-60.0..60.0), rng.gen_range(-60.0..60.0)),
        gravity,
        gravity_normalized: (gravity / 10.0).clamp(Vec2::NEG_ONE, Vec2::ONE),
    }
}

#[test]
fn ripple_grid_stays_bounded_for_10k_ticks() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut field = RippleField::new(Vec2::new(360.0, 640.0), RippleParams::default());
    for _ in 0..10_000 {
        let forces = random_forces(&mut rng);
        field.step(&forces, DT);
    }
    assert!(field
        .heights()
        .iter()
        .all(|h| h.is_finite() && h.abs() <= 20.0));
}

#[test]
fn particles_never_escape_the_margin() {
    let mut rng = StdRng::seed_from_u64(2);
    let bounds = Vec2::new(360.0, 640.0);
    for archetype in ParticleArchetype::ALL {
        let mut field = ParticleField::new(80, archetype, bounds, ParticleTable::default(), 5);
        for _ in 0..1_500 {
            let g = Vec2::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
            field.step(g, DT);
            for p in field.particles() {
                let pos = p.pos();
                assert!(
                    (-40.0..=bounds.x + 40.0).contains(&pos.x)
                        && (-40.0..=bounds.y + 40.0).contains(&pos.y),
                    "{archetype:?} escaped to {pos}"
                );
            }
        }
    }
}

#[test]
fn snow_completes_a_fall_and_respawn_cycle_within_a_second() {
    let mut field = ParticleField::new(
        50,
        ParticleArchetype::Snow,
        Vec2::new(360.0, 640.0),
        ParticleTable::default(),
        42,
    );
    // Screen-space gravity (0, 9.8) normalized by 10
    let gravity = Vec2::new(0.0, 0.98);
    let mut respawned = false;
    for _ in 0..60 {
        let before: Vec<f32> = field.particles().iter().map(|p| p.position[1]).collect();
        field.step(gravity, DT);
        respawned |= field
            .particles()
            .iter()
            .zip(before)
            .any(|(p, y0)| y0 > 600.0 && p.position[1] < 0.0);
    }
    assert!(respawned);
}

#[test]
fn pond_tilt_ramp_skews_surface_monotonically() {
    let size = Vec2::new(400.0, 800.0);
    let mut pond = PondField::new(size, 0, 42, PondParams::default(), BodyParams::default());
    let mut forces = Forces::at_rest(&ForceParams::default());
    let level = 0.2;

    let skew =
        |pond: &PondField| pond.surface_height(0.0, level) - pond.surface_height(size.x, level);
    let mut previous = skew(&pond);
    for tick in 1..=60 {
        forces.gravity.x = 9.81 * tick as f32 / 60.0;
        pond.step(&forces, DT);
        let current = skew(&pond);
        assert!(current < previous + 1e-3, "tick {tick}: {current} after {previous}");
        previous = current;
    }
    assert!(pond.tilt() > 0.3);
}

#[test]
fn three_bodies_keep_their_distance_at_rest() {
    let mut bodies = FloatingBodies::new(3, 42, BodyParams::default());
    for _ in 0..500 {
        bodies.step(0.0);
    }
    let b = bodies.bodies();
    for (i, body) in b.iter().enumerate() {
        assert!((0.06..=0.94).contains(&body.x));
        for other in &b[i + 1..] {
            assert!((body.x - other.x).abs() >= 0.16 - 1e-5);
        }
    }
}

#[test]
fn five_bodies_stay_separated_under_random_tilt() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut bodies = FloatingBodies::new(5, 7, BodyParams::default());
    let min = bodies.effective_min_separation();
    for _ in 0..5_000 {
        bodies.step(rng.gen_range(-1.0..1.0));
        let b = bodies.bodies();
        for i in 0..b.len() {
            assert!((0.06 - 1e-6..=0.94 + 1e-6).contains(&b[i].x));
            for j in i + 1..b.len() {
                assert!((b[i].x - b[j].x).abs() >= min - 1e-5);
            }
        }
    }
}

fn scene() -> ConfigSnapshot {
    ConfigSnapshot {
        particles_enabled: true,
        particle_archetype: 3,
        particle_count: 40,
        water_enabled: true,
        body_count: 3,
        color_overlay_enabled: true,
        ..ConfigSnapshot::default()
    }
}

fn engine(config: ConfigSnapshot) -> (Engine, Arc<ForceSource>) {
    let forces = Arc::new(ForceSource::default());
    let mut engine = Engine::new(config, Arc::clone(&forces), &RenderConfig::default());
    engine.resize(360, 640);
    engine.set_base_layer(Some(Arc::new(image::RgbaImage::new(200, 300))));
    (engine, forces)
}

fn feed(forces: &ForceSource, rng: &mut StdRng) {
    forces.on_orientation_sample([rng.gen_range(-2.0..2.0), rng.gen_range(-2.0..2.0), 0.0], 0.02);
    forces.on_acceleration_sample(
        [rng.gen_range(-9.8..9.8), rng.gen_range(-9.8..9.8), 0.0],
        0.02,
    );
}

#[test]
fn identical_inputs_give_identical_frames() {
    for style in [WaterStyle::Pond, WaterStyle::Ripple] {
        let config = ConfigSnapshot {
            water_style: style,
            ..scene()
        };
        let (mut a, forces_a) = engine(config.clone());
        let (mut b, forces_b) = engine(config);
        let mut rng_a = StdRng::seed_from_u64(9);
        let mut rng_b = StdRng::seed_from_u64(9);
        for _ in 0..120 {
            feed(&forces_a, &mut rng_a);
            feed(&forces_b, &mut rng_b);
            assert_eq!(a.tick(DT), b.tick(DT));
        }
    }
}

#[test]
fn reapplying_the_same_config_is_invisible() {
    let (mut steady, forces_steady) = engine(scene());
    let (mut poked, forces_poked) = engine(scene());
    let mut rng_steady = StdRng::seed_from_u64(4);
    let mut rng_poked = StdRng::seed_from_u64(4);
    for tick in 0..90 {
        feed(&forces_steady, &mut rng_steady);
        feed(&forces_poked, &mut rng_poked);
        if tick % 10 == 0 {
            assert!(!poked.apply_config(scene()));
            assert!(!poked.apply_config(scene()));
        }
        assert_eq!(steady.tick(DT), poked.tick(DT));
    }
}

#[test]
fn extreme_sensor_spikes_are_absorbed() {
    let (mut engine, forces) = engine(ConfigSnapshot {
        water_style: WaterStyle::Ripple,
        ..scene()
    });
    for i in 0..300 {
        let spike = if i % 2 == 0 { 1e6 } else { -1e6 };
        forces.on_orientation_sample([spike, -spike, spike], 0.02);
        forces.on_acceleration_sample([spike, spike, 0.0], 0.02);
        forces.on_acceleration_sample([f32::NAN, 0.0, 0.0], 0.02);
        assert!(engine.tick(DT).is_some());
    }
    let snapshot = forces.snapshot();
    assert!(snapshot.tilt.abs().max_element() <= 60.0);
    assert!(snapshot.gravity.length() <= 19.6 + 1e-3);
    for p in engine.particles().unwrap().particles() {
        assert!(p.pos().is_finite());
    }
}

#[test]
fn pond_waves_keep_moving_after_a_week_of_uptime() {
    let size = Vec2::new(400.0, 800.0);
    let mut pond = PondField::new(size, 3, 42, PondParams::default(), BodyParams::default());
    let forces = Forces::at_rest(&ForceParams::default());
    pond.step(&forces, 7.0 * 86_400.0);

    let before = pond.phase();
    let heights: Vec<f32> = (0..5).map(|i| pond.surface_y(i as f32 * 100.0, 0.2)).collect();
    for _ in 0..60 {
        pond.step(&forces, DT);
    }
    let advance = pond.phase() - before;
    let expected = 60.0 * DT as f64 * std::f64::consts::TAU / 12.0;
    assert!((advance - expected).abs() < 1e-6, "phase advanced {advance}");
    let moved = (0..5)
        .map(|i| pond.surface_y(i as f32 * 100.0, 0.2))
        .zip(heights)
        .any(|(now, then)| (now - then).abs() > 0.1);
    assert!(moved);
}

#[test]
fn stars_keep_twinkling_after_a_week_of_uptime() {
    let mut field = ParticleField::new(
        30,
        ParticleArchetype::Stars,
        Vec2::new(360.0, 640.0),
        ParticleTable::default(),
        8,
    );
    field.step(Vec2::ZERO, 7.0 * 86_400.0);
    let before: Vec<f32> = field.particles().iter().map(|p| p.alpha).collect();
    for _ in 0..30 {
        field.step(Vec2::ZERO, DT);
    }
    let changed = field
        .particles()
        .iter()
        .zip(before)
        .filter(|(p, a0)| (p.alpha - a0).abs() > 1e-3)
        .count();
    assert!(changed >= 10, "only {changed} stars changed");
}

#[test]
fn out_of_range_json_counts_clamp_instead_of_failing() {
    let config = ConfigSnapshot::from_json(
        r#"{
            "water_enabled": true,
            "body_count": -1,
            "particles_enabled": true,
            "particle_count": -20,
            "particle_archetype": 9.7
        }"#,
    )
    .unwrap();
    let (mut engine, _forces) = engine(config);
    assert_eq!(engine.config().body_count, 0);
    assert_eq!(engine.config().particle_count, 0);
    assert_eq!(engine.config().particle_archetype, 5);
    let key = engine.config().structural_key();
    assert_eq!(key.water, Some((WaterStyle::Pond, 0)));
    assert!(key.particles.is_none());
    assert!(engine.tick(DT).is_some());
    assert!(engine.particles().is_none());

    let crowded = ConfigSnapshot::from_json(r#"{ "water_enabled": true, "body_count": 40 }"#)
        .unwrap()
        .sanitized();
    assert_eq!(crowded.body_count(), 5);
}
