//! Fixed-size particle pool with six visual archetypes.
//!
//! The pool never grows or shrinks after construction. A particle that
//! leaves the screen (plus margin) is respawned in its own slot with freshly
//! drawn values, so stepping allocates nothing.

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

use crate::color::{unit_to_byte, Rgba};
use crate::frame::{DrawCommand, Paint};
use crate::geometry::cycle;
use crate::params::{ArchetypeParams, MotionRule, ParticleTable, SpawnEdge};

/// Visual archetype, in settings-index order
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticleArchetype {
    Snow = 0,
    Rain = 1,
    Fireflies = 2,
    Leaves = 3,
    Bubbles = 4,
    Stars = 5,
}

impl ParticleArchetype {
    pub const COUNT: usize = 6;

    pub const ALL: [ParticleArchetype; Self::COUNT] = [
        ParticleArchetype::Snow,
        ParticleArchetype::Rain,
        ParticleArchetype::Fireflies,
        ParticleArchetype::Leaves,
        ParticleArchetype::Bubbles,
        ParticleArchetype::Stars,
    ];

    /// Map a settings index to an archetype, clamping out-of-range values
    pub fn from_index_clamped(index: i64) -> Self {
        Self::ALL[index.clamp(0, Self::COUNT as i64 - 1) as usize]
    }
}

/// One particle. Plain data so the pool is a flat array.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Particle {
    pub position: [f32; 2],
    pub velocity: [f32; 2],
    pub alpha: f32,
    pub size: f32,
    /// Radians, drives per-particle oscillation
    pub phase: f32,
    /// [`ParticleArchetype`] discriminant
    pub archetype: u32,
}

impl Particle {
    pub fn pos(&self) -> Vec2 {
        Vec2::from_array(self.position)
    }

    pub fn vel(&self) -> Vec2 {
        Vec2::from_array(self.velocity)
    }

    fn archetype(&self) -> ParticleArchetype {
        ParticleArchetype::from_index_clamped(self.archetype as i64)
    }
}

/// Particle pool bound to one screen size
pub struct ParticleField {
    particles: Vec<Particle>,
    table: ParticleTable,
    bounds: Vec2,
    rng: StdRng,
    /// Seconds since the pool was built
    time: f64,
}

impl ParticleField {
    /// Build a pool of `count` particles scattered over the whole screen
    pub fn new(
        count: usize,
        archetype: ParticleArchetype,
        bounds: Vec2,
        table: ParticleTable,
        seed: u64,
    ) -> Self {
        let mut field = Self {
            particles: vec![
                Particle {
                    archetype: archetype as u32,
                    ..Particle::default()
                };
                count
            ],
            table,
            bounds,
            rng: StdRng::seed_from_u64(seed),
            time: 0.0,
        };
        for i in 0..count {
            field.spawn(i, true);
        }
        field
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn bounds(&self) -> Vec2 {
        self.bounds
    }

    /// Advance every particle by `dt` seconds under normalized gravity
    /// (each axis in [-1, 1], +y down)
    pub fn step(&mut self, gravity: Vec2, dt: f32) {
        let k = self.table.kinematics.clone();
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let scale = dt / k.nominal_tick_s;
        let gravity = if gravity.is_finite() {
            gravity.clamp(Vec2::NEG_ONE, Vec2::ONE)
        } else {
            Vec2::ZERO
        };
        self.time += dt as f64;
        let t = self.time;
        let margin = k.respawn_margin_px;

        for i in 0..self.particles.len() {
            let p = &mut self.particles[i];
            let motion = self.table.get(p.archetype()).motion;
            let mut pos = p.pos();
            let mut vel = p.vel();

            match motion {
                MotionRule::Falling => {
                    vel += gravity * k.fall_gravity_gain * scale;
                    vel.x = vel.x.clamp(-k.fall_max_vx, k.fall_max_vx);
                    vel.y = vel.y.clamp(k.fall_vy_range.0, k.fall_vy_range.1);
                    pos += vel * scale;
                }
                MotionRule::Drifting => {
                    let wander = Vec2::new(
                        (cycle(t, 1.0) + p.phase).sin(),
                        (cycle(t, 0.7) + p.phase).cos(),
                    ) * k.drift_wander_px;
                    pos += (vel + wander) * scale;
                    p.alpha = (0.4 + (cycle(t, 1.5) + p.phase).sin() * 0.4)
                        .clamp(k.drift_alpha_range.0, k.drift_alpha_range.1);
                }
                MotionRule::Rising => {
                    vel.x += gravity.x * k.rise_lateral_gain * scale;
                    vel.y -= gravity.y.abs() * k.rise_lift_gain * scale;
                    vel = vel.clamp(
                        Vec2::splat(-k.rise_max_speed),
                        Vec2::splat(k.rise_max_speed),
                    );
                    let sway = (cycle(t, 1.0) + p.phase).sin() * k.rise_sway_px;
                    pos += (vel + Vec2::new(sway, 0.0)) * scale;
                }
                MotionRule::Twinkling => {
                    p.alpha = (0.5 + (cycle(t, k.twinkle_rate) + p.phase).sin() * 0.5)
                        .clamp(k.twinkle_alpha_range.0, k.twinkle_alpha_range.1);
                }
            }

            p.position = pos.to_array();
            p.velocity = vel.to_array();
            p.alpha = p.alpha.clamp(0.0, 1.0);

            let out_of_bounds = !pos.is_finite()
                || !vel.is_finite()
                || pos.x < -margin
                || pos.x > self.bounds.x + margin
                || pos.y < -margin
                || pos.y > self.bounds.y + margin;
            if out_of_bounds {
                self.spawn(i, false);
            }
        }
    }

    /// Redraw slot `i` from its archetype's distributions
    fn spawn(&mut self, i: usize, initial: bool) {
        let k = &self.table.kinematics;
        let rng = &mut self.rng;
        let p = &mut self.particles[i];
        let params: &ArchetypeParams = self.table.get(p.archetype());
        let previous_size = p.size;

        let x = rng.gen::<f32>() * self.bounds.x;
        let y = if initial {
            rng.gen::<f32>() * self.bounds.y
        } else {
            match params.spawn_edge {
                SpawnEdge::Top => k.top_spawn_y_px,
                // Just below the bottom edge, inside the respawn margin
                SpawnEdge::Bottom => self.bounds.y + previous_size.min(k.respawn_margin_px * 0.5),
            }
        };

        p.position = [x, y];
        p.velocity = [
            (rng.gen::<f32>() - 0.5) * params.spawn_vx_spread,
            sample(rng, params.spawn_vy),
        ];
        p.alpha = sample(rng, params.alpha);
        p.size = sample(rng, params.size_px);
        p.phase = rng.gen::<f32>() * TAU;
    }

    /// Draw primitives for the current state, in pool order
    pub fn render(&self, out: &mut Vec<DrawCommand>) {
        for p in &self.particles {
            let pos = p.pos();
            let s = p.size;
            let a = p.alpha;
            match p.archetype() {
                ParticleArchetype::Snow => out.push(DrawCommand::Circle {
                    center: pos,
                    radius: s,
                    paint: Paint::Fill(Rgba::new(255, 255, 255, scaled_alpha(a, 200.0))),
                }),
                ParticleArchetype::Rain => out.push(DrawCommand::Line {
                    from: pos,
                    to: pos - p.vel() * 2.0,
                    color: Rgba::argb(scaled_alpha(a, 180.0), 180, 200, 255),
                    width: 1.5,
                }),
                ParticleArchetype::Fireflies => {
                    out.push(DrawCommand::Circle {
                        center: pos,
                        radius: s,
                        paint: Paint::Fill(Rgba::argb(scaled_alpha(a, 255.0), 200, 255, 80)),
                    });
                    out.push(DrawCommand::Circle {
                        center: pos,
                        radius: s * 2.5,
                        paint: Paint::Fill(Rgba::argb(scaled_alpha(a, 80.0), 200, 255, 80)),
                    });
                }
                ParticleArchetype::Leaves => {
                    let red = 180 + ((p.phase * 20.0) as u32 % 60) as u8;
                    let green = 80 + ((p.phase * 10.0) as u32 % 40) as u8;
                    out.push(DrawCommand::Ellipse {
                        center: pos,
                        radii: Vec2::new(s, s * 0.6),
                        rotation: 0.0,
                        color: Rgba::argb(scaled_alpha(a, 200.0), red, green, 10),
                    });
                }
                ParticleArchetype::Bubbles => {
                    out.push(DrawCommand::Circle {
                        center: pos,
                        radius: s,
                        paint: Paint::Fill(Rgba::argb(scaled_alpha(a, 60.0), 180, 210, 255)),
                    });
                    out.push(DrawCommand::Circle {
                        center: pos,
                        radius: s,
                        paint: Paint::Stroke {
                            color: Rgba::argb(scaled_alpha(a, 150.0), 255, 255, 255),
                            width: 1.5,
                        },
                    });
                }
                ParticleArchetype::Stars => out.push(DrawCommand::Circle {
                    center: pos,
                    radius: s,
                    paint: Paint::Fill(Rgba::WHITE.with_opacity(a)),
                }),
            }
        }
    }
}

fn sample(rng: &mut StdRng, range: (f32, f32)) -> f32 {
    range.0 + rng.gen::<f32>() * (range.1 - range.0)
}

fn scaled_alpha(alpha: f32, max: f32) -> u8 {
    unit_to_byte(alpha * max / 255.0)
}
