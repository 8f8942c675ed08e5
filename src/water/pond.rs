//! Analytic pond: a closed-form wavy surface with floating bodies.
//!
//! There is no grid state. The surface is recomputed from the phase, the
//! smoothed tilt and the water level whenever it is needed, and the bodies
//! read the same function so they always sit on the drawn surface.

use glam::Vec2;
use std::f64::consts::TAU;

use super::{FloatingBodies, WaterField, WaterLook};
use crate::color::Rgba;
use crate::config::WaterStyle;
use crate::force::Forces;
use crate::frame::{DrawCommand, Fill, GradientStop};
use crate::geometry::{cycle, Path};
use crate::params::{BodyParams, PondParams};

pub struct PondField {
    params: PondParams,
    size: Vec2,
    /// Seconds of simulated time; f64 so a days-long run still advances
    time: f64,
    /// Smoothed tilt, -1..1
    tilt: f32,
    bodies: FloatingBodies,
}

impl PondField {
    pub fn new(
        size: Vec2,
        body_count: usize,
        seed: u64,
        params: PondParams,
        body_params: BodyParams,
    ) -> Self {
        Self {
            params,
            size,
            time: 0.0,
            tilt: 0.0,
            bodies: FloatingBodies::new(body_count, seed, body_params),
        }
    }

    pub fn bodies(&self) -> &FloatingBodies {
        &self.bodies
    }

    pub fn tilt(&self) -> f32 {
        self.tilt
    }

    /// Surface phase in radians
    pub fn phase(&self) -> f64 {
        self.time * TAU / self.params.phase_period_s as f64
    }

    /// Screen y of the surface at column `x` for a resting `level`
    pub fn surface_y(&self, x: f32, level: f32) -> f32 {
        self.surface_y_at(x, self.phase(), level)
    }

    /// Water depth above the bottom edge at column `x`
    pub fn surface_height(&self, x: f32, level: f32) -> f32 {
        self.size.y - self.surface_y(x, level)
    }

    fn surface_y_at(&self, x: f32, phase: f64, level: f32) -> f32 {
        let Vec2 { x: w, y: h } = self.size;
        let skew = if w > 0.0 {
            (x / w - 0.5) * self.tilt * h * self.params.tilt_skew
        } else {
            0.0
        };
        let waves: f32 = self
            .params
            .waves
            .iter()
            .map(|wave| {
                let arg = cycle(phase, wave.phase_rate) + wave.spatial_freq * x + wave.offset;
                wave.amplitude_px * if wave.cosine { arg.cos() } else { arg.sin() }
            })
            .sum();
        h * (1.0 - level) - skew + waves
    }

    /// Smooth curve through surface samples taken every `sample_step_px`
    fn surface_path(&self, phase: f64, level: f32, offset: f32) -> Path {
        let width = self.size.x;
        let step = self.params.sample_step_px.max(1.0);
        let mut points = Vec::with_capacity((width / step) as usize + 2);
        let mut x = 0.0;
        while x <= width {
            points.push(Vec2::new(x, self.surface_y_at(x, phase, level) + offset));
            x += step;
        }
        if points.last().map_or(true, |p| p.x < width) {
            points.push(Vec2::new(width, self.surface_y_at(width, phase, level) + offset));
        }
        Path::catmull_rom(&points)
    }

    /// Close a surface curve down to the bottom corners
    fn filled(&self, surface: &Path) -> Path {
        let mut body = surface.clone();
        body.line_to(self.size).line_to(Vec2::new(0.0, self.size.y)).close();
        body
    }
}

impl WaterField for PondField {
    fn step(&mut self, forces: &Forces, dt: f32) {
        if dt.is_finite() && dt > 0.0 {
            self.time += dt as f64;
        }
        let target = if forces.gravity.x.is_finite() {
            (forces.gravity.x / self.params.full_tilt_gravity_m_s2).clamp(-1.0, 1.0)
        } else {
            self.tilt
        };
        self.tilt += self.params.tilt_alpha * (target - self.tilt);
        self.bodies.step(self.tilt);
    }

    fn render(&self, look: &WaterLook, out: &mut Vec<DrawCommand>) {
        let p = &self.params;
        let Vec2 { x: w, y: h } = self.size;
        let phase = self.phase();
        let level = look.level;
        let color = look.color;
        let alpha_base = color.a.max(p.min_alpha) as f32;
        let tinted = |mult: f32| color.with_alpha((alpha_base * mult).clamp(0.0, 255.0) as u8);

        let surface = self.surface_path(phase, level, 0.0);
        let top_y = h * (1.0 - level) - h * p.gradient_lead;
        let stops = [0.0, 0.30, 0.65, 1.0]
            .iter()
            .zip(p.gradient_alpha)
            .map(|(&offset, mult)| GradientStop {
                offset,
                color: tinted(mult),
            })
            .collect();
        out.push(DrawCommand::FillPath {
            path: self.filled(&surface),
            fill: Fill::Linear {
                start: Vec2::new(w * 0.5, top_y),
                end: Vec2::new(w * 0.5, h),
                stops,
            },
        });

        let deep = self.surface_path(phase + p.deep_phase_lead as f64, level, p.deep_offset_px);
        out.push(DrawCommand::FillPath {
            path: self.filled(&deep),
            fill: Fill::Solid(tinted(p.deep_alpha)),
        });

        out.push(DrawCommand::StrokePath {
            path: surface.clone(),
            color: Rgba::WHITE.with_alpha(65),
            width: 1.8,
        });
        out.push(DrawCommand::StrokePath {
            path: surface,
            color: Rgba::WHITE.with_alpha(35),
            width: 0.6,
        });

        self.bodies.render(
            |x| self.surface_y_at(x, phase, level),
            phase,
            w,
            color,
            out,
        );
    }

    fn style(&self) -> WaterStyle {
        WaterStyle::Pond
    }
}
