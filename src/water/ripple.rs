//! Height-field ripple water.
//!
//! Two equally sized grids hold the current and previous heights. Each
//! stencil step writes the next heights into the previous buffer and swaps,
//! so no cell is read after it was overwritten in the same pass.

use glam::Vec2;
use image::{Rgba as Pixel, RgbaImage};
use std::sync::Arc;

use super::{WaterField, WaterLook};
use crate::config::WaterStyle;
use crate::force::Forces;
use crate::frame::DrawCommand;
use crate::params::RippleParams;

pub struct RippleField {
    params: RippleParams,
    cols: usize,
    rows: usize,
    /// Row-major, `rows * cols`
    current: Vec<f32>,
    previous: Vec<f32>,
    size: Vec2,
}

impl RippleField {
    /// Grid sized to the aspect ratio of a `size` pixel surface
    pub fn new(size: Vec2, params: RippleParams) -> Self {
        let cols = params.cols.max(3);
        let aspect = if size.x > 0.0 { size.y / size.x } else { 1.0 };
        let rows = ((cols as f32 * aspect) as usize).max(params.min_rows).max(3);
        Self {
            cols,
            rows,
            current: vec![0.0; cols * rows],
            previous: vec![0.0; cols * rows],
            size,
            params,
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Height of cell (x, y) in the current buffer
    pub fn height(&self, x: usize, y: usize) -> f32 {
        self.current[y * self.cols + x]
    }

    pub fn heights(&self) -> &[f32] {
        &self.current
    }

    /// Inject height along the edge the force points toward.
    ///
    /// `force` is normalized gravity; each axis acts independently and only
    /// above the configured threshold.
    pub fn apply_force(&mut self, force: Vec2) {
        if !force.is_finite() {
            return;
        }
        let p = &self.params;
        let strength = p.impulse_strength * force.length().min(1.0);
        let limit = p.max_height;
        let cols = self.cols;

        if force.x.abs() > p.impulse_threshold {
            let edge_x = if force.x > 0.0 { cols - 2 } else { 1 };
            let step = (self.rows / 10).max(1);
            for y in (step..self.rows.saturating_sub(step)).step_by((step / 2).max(1)) {
                let cell = &mut self.current[y * cols + edge_x];
                *cell = (*cell + strength).clamp(-limit, limit);
            }
        }
        if force.y.abs() > p.impulse_threshold {
            let edge_y = if force.y > 0.0 { self.rows - 2 } else { 1 };
            let step = (cols / 10).max(1);
            for x in (step..cols.saturating_sub(step)).step_by((step / 2).max(1)) {
                let cell = &mut self.current[edge_y * cols + x];
                *cell = (*cell + strength).clamp(-limit, limit);
            }
        }
    }

    /// One damped wave-equation update over interior cells
    pub fn stencil_step(&mut self) {
        let cols = self.cols;
        let damping = self.params.damping;
        let limit = self.params.max_height;
        for y in 1..self.rows - 1 {
            let row = y * cols;
            for x in 1..cols - 1 {
                let i = row + x;
                let sum = self.current[i - 1]
                    + self.current[i + 1]
                    + self.current[i - cols]
                    + self.current[i + cols];
                let next = (sum * 0.5 - self.previous[i]) * damping;
                self.previous[i] = if next.is_finite() {
                    next.clamp(-limit, limit)
                } else {
                    0.0
                };
            }
        }
        std::mem::swap(&mut self.current, &mut self.previous);
    }

    /// Shade the grid into a `cols × rows` image
    pub fn render_image(&self, look: &WaterLook) -> RgbaImage {
        let p = &self.params;
        let (lo, hi) = p.base_alpha_range;
        let base_alpha = (look.level * p.level_alpha_gain).clamp(lo as f32, hi as f32);
        let color = look.color;
        let toward_white =
            |c: u8, shine: f32| (c as f32 + shine * (255.0 - c as f32)).clamp(0.0, 255.0) as u8;

        let mut image = RgbaImage::new(self.cols as u32, self.rows as u32);
        for y in 0..self.rows {
            for x in 0..self.cols {
                let h = self.height(x, y);
                let norm = (h / p.shade_height).clamp(-1.0, 1.0);
                let nx = if x > 0 && x < self.cols - 1 {
                    self.height(x + 1, y) - self.height(x - 1, y)
                } else {
                    0.0
                };
                let ny = if y > 0 && y < self.rows - 1 {
                    self.height(x, y + 1) - self.height(x, y - 1)
                } else {
                    0.0
                };
                let shine = ((nx + ny + 2.0) / 4.0).clamp(0.0, 1.0);
                let alpha = (base_alpha + norm * p.height_alpha + shine * p.specular_alpha)
                    .clamp(0.0, p.max_alpha as f32) as u8;
                image.put_pixel(
                    x as u32,
                    y as u32,
                    Pixel([
                        toward_white(color.r, shine),
                        toward_white(color.g, shine),
                        toward_white(color.b, shine),
                        alpha,
                    ]),
                );
            }
        }
        image
    }
}

impl WaterField for RippleField {
    fn step(&mut self, forces: &Forces, _dt: f32) {
        self.apply_force(forces.gravity_normalized);
        for _ in 0..self.params.steps_per_tick {
            self.stencil_step();
        }
    }

    fn render(&self, look: &WaterLook, out: &mut Vec<DrawCommand>) {
        out.push(DrawCommand::Raster {
            image: Arc::new(self.render_image(look)),
            min: Vec2::ZERO,
            max: self.size,
        });
    }

    fn style(&self) -> WaterStyle {
        WaterStyle::Ripple
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;
    use crate::params::ForceParams;

    fn field() -> RippleField {
        RippleField::new(Vec2::new(400.0, 800.0), RippleParams::default())
    }

    fn look() -> WaterLook {
        WaterLook {
            level: 0.2,
            color: Rgba::argb(153, 0, 191, 255),
        }
    }

    #[test]
    fn test_grid_follows_aspect_ratio() {
        let f = field();
        assert_eq!(f.cols(), 80);
        assert_eq!(f.rows(), 160);

        let wide = RippleField::new(Vec2::new(800.0, 400.0), RippleParams::default());
        assert_eq!(wide.rows(), 40);
    }

    #[test]
    fn test_force_injects_on_facing_edge() {
        let mut f = field();
        f.apply_force(Vec2::new(1.0, 0.0));
        let right: f32 = (0..f.rows()).map(|y| f.height(f.cols() - 2, y)).sum();
        let left: f32 = (0..f.rows()).map(|y| f.height(1, y)).sum();
        assert!(right > 0.0);
        assert_eq!(left, 0.0);
    }

    #[test]
    fn test_small_force_injects_nothing() {
        let mut f = field();
        f.apply_force(Vec2::new(0.04, -0.04));
        assert!(f.heights().iter().all(|&h| h == 0.0));
    }

    #[test]
    fn test_impulse_scales_with_force() {
        let mut weak = field();
        let mut strong = field();
        weak.apply_force(Vec2::new(0.3, 0.0));
        strong.apply_force(Vec2::new(0.9, 0.0));
        let y = weak.rows() / 2;
        let x = weak.cols() - 2;
        assert!(strong.height(x, y) > weak.height(x, y));
    }

    #[test]
    fn test_stencil_spreads_and_damps() {
        let mut f = field();
        let (cx, cy) = (40, 80);
        f.current[cy * f.cols + cx] = 10.0;
        f.stencil_step();
        assert!(f.height(cx + 1, cy) > 0.0);
        for _ in 0..5_000 {
            f.stencil_step();
        }
        let energy: f32 = f.heights().iter().map(|h| h.abs()).sum();
        assert!(energy < 1.0, "energy {energy}");
    }

    #[test]
    fn test_flat_water_renders_base_shade() {
        let f = field();
        let image = f.render_image(&look());
        assert_eq!(image.dimensions(), (80, 160));
        // Flat surface: shine = 0.5, base alpha = 0.2 * 400 = 80
        let px = image.get_pixel(10, 10).0;
        assert_eq!(px[3], 120);
        assert_eq!(px[0], 127);
    }

    #[test]
    fn test_step_under_full_tilt_stays_bounded() {
        let mut f = field();
        let mut forces = Forces::at_rest(&ForceParams::default());
        forces.gravity_normalized = Vec2::new(1.0, 1.0);
        for _ in 0..2_000 {
            f.step(&forces, 0.016);
        }
        assert!(f.heights().iter().all(|h| h.is_finite() && h.abs() <= 20.0));
    }

    #[test]
    fn test_render_emits_fullscreen_raster() {
        let f = field();
        let mut out = Vec::new();
        f.render(&look(), &mut out);
        match &out[..] {
            [DrawCommand::Raster { min, max, image }] => {
                assert_eq!(*min, Vec2::ZERO);
                assert_eq!(*max, Vec2::new(400.0, 800.0));
                assert_eq!(image.width(), 80);
            }
            other => panic!("unexpected commands: {other:?}"),
        }
    }
}
