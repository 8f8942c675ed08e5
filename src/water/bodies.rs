//! Floating ice bodies riding the pond surface.
//!
//! Only the horizontal position is integrated. Height and angle are read off
//! the surface function at draw time, so a body can never drift away from
//! the water it sits on.

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

use crate::color::Rgba;
use crate::frame::{DrawCommand, Fill, GradientStop};
use crate::geometry::{self, cycle, Path};
use crate::params::BodyParams;

/// One rectangular body
#[derive(Debug, Clone, PartialEq)]
pub struct FloatingBody {
    /// Horizontal centre as a fraction of screen width
    pub x: f32,
    /// Fraction of width per tick
    pub vx: f32,
    /// Width and height in pixels
    pub size: Vec2,
    pub bob_phase: f32,
    pub bob_speed: f32,
    pub bob_amp: f32,
    pub crack_seed: u32,
}

impl FloatingBody {
    /// Centre (pixels) and rotation (radians) on a surface
    pub fn pose(
        &self,
        surface_y: impl Fn(f32) -> f32,
        phase: f64,
        width: f32,
        params: &BodyParams,
    ) -> (Vec2, f32) {
        let cx = self.x * width;
        let bob = (cycle(phase, self.bob_speed) + self.bob_phase).sin() * self.bob_amp;
        let probe = params.slope_probe_px;
        let rise = surface_y(cx + probe) - surface_y(cx - probe);
        let angle = rise.atan2(2.0 * probe) * params.slope_follow;
        let centre = Vec2::new(cx, surface_y(cx) + bob - self.size.y * params.draft);
        (centre, angle)
    }
}

/// Ice gradient, top-left to bottom-right
const ICE_STOPS: [(f32, Rgba); 4] = [
    (0.0, Rgba::argb(238, 240, 248, 255)),
    (0.30, Rgba::argb(221, 224, 239, 248)),
    (0.60, Rgba::argb(204, 208, 232, 245)),
    (1.0, Rgba::argb(187, 192, 224, 240)),
];

/// The set of bodies on one pond
#[derive(Debug, Clone)]
pub struct FloatingBodies {
    bodies: Vec<FloatingBody>,
    params: BodyParams,
    /// Scratch for the separation sweep, sized once
    order: Vec<usize>,
}

impl FloatingBodies {
    /// `count` bodies (capped at `params.max_count`) spread evenly across the
    /// spawn band, with sizes and bob terms drawn from `seed`
    pub fn new(count: usize, seed: u64, params: BodyParams) -> Self {
        let count = count.min(params.max_count);
        let mut rng = StdRng::seed_from_u64(seed);
        let (lo, hi) = params.spawn_band;

        let bodies = (0..count)
            .map(|i| {
                let (w, h) = params.size_classes[i % params.size_classes.len()];
                let x = if count == 1 {
                    0.5
                } else {
                    lo + (i as f32 / (count - 1) as f32) * (hi - lo)
                };
                FloatingBody {
                    x,
                    vx: 0.0,
                    size: Vec2::new(
                        w + rng.gen::<f32>() * params.size_jitter.0,
                        h + rng.gen::<f32>() * params.size_jitter.1,
                    ),
                    bob_phase: rng.gen::<f32>() * TAU,
                    bob_speed: lerp(params.bob_speed, rng.gen()),
                    bob_amp: lerp(params.bob_amp_px, rng.gen()),
                    crack_seed: rng.gen_range(0..params.crack_seed_range.max(1)),
                }
            })
            .collect();

        Self {
            bodies,
            params,
            order: (0..count).collect(),
        }
    }

    pub fn bodies(&self) -> &[FloatingBody] {
        &self.bodies
    }

    pub fn params(&self) -> &BodyParams {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Smallest separation the band can hold for the current body count
    pub fn effective_min_separation(&self) -> f32 {
        let (lo, hi) = self.params.margin;
        match self.bodies.len() {
            0 | 1 => self.params.min_separation,
            n => self.params.min_separation.min((hi - lo) / (n - 1) as f32),
        }
    }

    /// One tick of drift against `tilt` (-1..1), damping, soft bounce and
    /// separation
    pub fn step(&mut self, tilt: f32) {
        let p = &self.params;
        let tilt = if tilt.is_finite() { tilt.clamp(-1.0, 1.0) } else { 0.0 };
        let (lo, hi) = p.margin;

        for body in &mut self.bodies {
            body.vx -= tilt * p.drift_gain;
            body.vx *= p.damping;
            if !body.vx.is_finite() {
                body.vx = 0.0;
            }
            body.x += body.vx;
            if body.x < lo {
                body.x = lo;
                body.vx = body.vx.abs() * p.bounce_retain;
            }
            if body.x > hi {
                body.x = hi;
                body.vx = -body.vx.abs() * p.bounce_retain;
            }
        }

        self.repel();
        self.enforce_separation();
    }

    /// Soft pairwise push proportional to the overlap
    fn repel(&mut self) {
        let min_sep = self.params.min_separation;
        let strength = self.params.repulsion;
        let n = self.bodies.len();
        for a in 0..n {
            for b in a + 1..n {
                let diff = self.bodies[a].x - self.bodies[b].x;
                if diff.abs() < min_sep {
                    let push = (min_sep - diff.abs()) * strength * 0.5;
                    let dir = if diff >= 0.0 { 1.0 } else { -1.0 };
                    self.bodies[a].x += push * dir;
                    self.bodies[b].x -= push * dir;
                }
            }
        }
    }

    /// Exact sweep over the bodies in x order: after this every neighbour
    /// pair is at least the effective minimum apart and all stay in the band
    fn enforce_separation(&mut self) {
        if self.bodies.is_empty() {
            return;
        }
        let (lo, hi) = self.params.margin;
        let min_sep = self.effective_min_separation();

        let bodies = &mut self.bodies;
        let order = &mut self.order;
        order.sort_by(|&a, &b| bodies[a].x.total_cmp(&bodies[b].x));

        let mut prev = f32::NEG_INFINITY;
        for &i in order.iter() {
            let x = bodies[i].x.clamp(lo, hi).max(prev + min_sep);
            bodies[i].x = x;
            prev = x;
        }
        let mut next = f32::INFINITY;
        for &i in order.iter().rev() {
            let x = bodies[i].x.min(hi).min(next - min_sep);
            bodies[i].x = x;
            next = x;
        }
    }

    /// Draw every body on the given surface; `water` tints the submerged part
    pub fn render(
        &self,
        surface_y: impl Fn(f32) -> f32,
        phase: f64,
        width: f32,
        water: Rgba,
        out: &mut Vec<DrawCommand>,
    ) {
        for body in &self.bodies {
            let (centre, angle) = body.pose(&surface_y, phase, width, &self.params);
            self.render_body(body, centre, angle, water, out);
        }
    }

    fn render_body(
        &self,
        body: &FloatingBody,
        centre: Vec2,
        angle: f32,
        water: Rgba,
        out: &mut Vec<DrawCommand>,
    ) {
        let p = &self.params;
        let half = body.size * 0.5;
        let outline = geometry::rounded_rect(half, p.corner_radius_px);
        let placed = geometry::place(&outline, centre, angle);
        let corners = geometry::place(&[-half, half], centre, angle);

        out.push(DrawCommand::FillPath {
            path: Path::polygon(&placed),
            fill: Fill::Linear {
                start: corners[0],
                end: corners[1],
                stops: ICE_STOPS
                    .iter()
                    .map(|&(offset, color)| GradientStop { offset, color })
                    .collect(),
            },
        });
        out.push(DrawCommand::StrokePath {
            path: Path::polygon(&placed),
            color: Rgba::WHITE.with_alpha(140),
            width: 1.0,
        });

        let mut cracks = StdRng::seed_from_u64(body.crack_seed as u64);
        let crack_color = Rgba::WHITE.with_alpha(75);
        for _ in 0..3 {
            let mut r = || cracks.gen::<f32>() - 0.5;
            let start = Vec2::new(r() * body.size.x * 0.6, r() * body.size.y * 0.5);
            let end = start + Vec2::new(r() * body.size.x * 0.45, r() * body.size.y * 0.45);
            let ends = geometry::place(&[start, end], centre, angle);
            out.push(DrawCommand::Line {
                from: ends[0],
                to: ends[1],
                color: crack_color,
                width: 0.6,
            });
        }

        let gloss_radii = Vec2::new(body.size.x * 0.19, body.size.y * 0.14);
        let gloss_local = Vec2::new(-half.x * 0.45, -half.y * 0.55) + gloss_radii;
        out.push(DrawCommand::Ellipse {
            center: geometry::place(&[gloss_local], centre, angle)[0],
            radii: gloss_radii,
            rotation: angle,
            color: Rgba::WHITE.with_alpha(90),
        });

        let submerged = geometry::clip_below(&outline, body.size.y * p.waterline);
        if submerged.len() >= 3 {
            out.push(DrawCommand::FillPath {
                path: Path::polygon(&geometry::place(&submerged, centre, angle)),
                fill: Fill::Solid(water.with_alpha(55)),
            });
        }
    }
}

fn lerp(range: (f32, f32), t: f32) -> f32 {
    range.0 + (range.1 - range.0) * t
}
