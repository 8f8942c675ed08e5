//! CPU rasterizer for [`Frame`] command lists.
//!
//! Straight-alpha source-over blending into an `image::RgbaImage`. Edges get
//! one pixel of coverage falloff; polygons are filled even-odd at pixel
//! centres. Good enough for recording and inspection, not a general 2D
//! renderer.

use glam::Vec2;
use image::imageops::{self, FilterType};
use image::{Rgba as Pixel, RgbaImage};

use crate::color::Rgba;
use crate::frame::{DrawCommand, Frame, Paint};

pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    /// Rasterize a whole frame
    pub fn render(frame: &Frame) -> RgbaImage {
        let mut canvas = Canvas::new(frame.width, frame.height);
        for command in &frame.commands {
            canvas.draw(command);
        }
        canvas.into_image()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn draw(&mut self, command: &DrawCommand) {
        match command {
            DrawCommand::Clear(color) => {
                let pixels: &mut [Rgba] = bytemuck::cast_slice_mut(&mut *self.image);
                pixels.fill(*color);
            }
            DrawCommand::Blit { image, top_left } => self.blit(image, *top_left),
            DrawCommand::FillRect { min, max, color } => {
                let points = [*min, Vec2::new(max.x, min.y), *max, Vec2::new(min.x, max.y)];
                self.fill_polygon(&points, |_| *color);
            }
            DrawCommand::Circle {
                center,
                radius,
                paint,
            } => self.circle(*center, *radius, *paint),
            DrawCommand::Line {
                from,
                to,
                color,
                width,
            } => self.line(*from, *to, *color, *width),
            DrawCommand::Ellipse {
                center,
                radii,
                rotation,
                color,
            } => self.ellipse(*center, *radii, *rotation, *color),
            DrawCommand::FillPath { path, fill } => {
                let points = path.flatten();
                self.fill_polygon(&points, |p| fill.color_at(p));
            }
            DrawCommand::StrokePath { path, color, width } => {
                let points = path.flatten();
                for pair in points.windows(2) {
                    self.line(pair[0], pair[1], *color, *width);
                }
                if path.closed && points.len() > 2 {
                    self.line(points[points.len() - 1], points[0], *color, *width);
                }
            }
            DrawCommand::Raster { image, min, max } => {
                let size = (*max - *min).round();
                if size.x >= 1.0 && size.y >= 1.0 {
                    let (w, h) = (size.x as u32, size.y as u32);
                    let scaled = imageops::resize(&**image, w, h, FilterType::Triangle);
                    self.blit(&scaled, *min);
                }
            }
        }
    }

    fn blend(&mut self, x: i64, y: i64, color: Rgba, coverage: f32) {
        if x < 0 || y < 0 || x >= self.image.width() as i64 || y >= self.image.height() as i64 {
            return;
        }
        let src_a = color.a as f32 / 255.0 * coverage.clamp(0.0, 1.0);
        if src_a <= 0.0 {
            return;
        }
        let dst = self.image.get_pixel_mut(x as u32, y as u32);
        let dst_a = dst.0[3] as f32 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        let mix = |s: u8, d: u8| {
            ((s as f32 * src_a + d as f32 * dst_a * (1.0 - src_a)) / out_a).round() as u8
        };
        *dst = Pixel([
            mix(color.r, dst.0[0]),
            mix(color.g, dst.0[1]),
            mix(color.b, dst.0[2]),
            (out_a * 255.0).round() as u8,
        ]);
    }

    fn blit(&mut self, src: &RgbaImage, top_left: Vec2) {
        let ox = top_left.x.round() as i64;
        let oy = top_left.y.round() as i64;
        let width = src.width() as usize;
        if width == 0 {
            return;
        }
        let pixels: &[Rgba] = bytemuck::cast_slice(src.as_raw());
        for (row, line) in pixels.chunks_exact(width).enumerate() {
            for (col, &color) in line.iter().enumerate() {
                self.blend(ox + col as i64, oy + row as i64, color, 1.0);
            }
        }
    }

    /// Pixel range (inclusive start, exclusive end) covering `lo..hi`
    fn span(&self, lo: f32, hi: f32, limit: u32) -> (i64, i64) {
        let start = (lo.floor() as i64).max(0);
        let end = (hi.ceil() as i64 + 1).min(limit as i64);
        (start, end)
    }

    fn circle(&mut self, center: Vec2, radius: f32, paint: Paint) {
        if !(radius.is_finite() && radius > 0.0 && center.is_finite()) {
            return;
        }
        let reach = match paint {
            Paint::Fill(_) => radius + 1.0,
            Paint::Stroke { width, .. } => radius + width + 1.0,
        };
        let (x0, x1) = self.span(center.x - reach, center.x + reach, self.image.width());
        let (y0, y1) = self.span(center.y - reach, center.y + reach, self.image.height());
        for y in y0..y1 {
            for x in x0..x1 {
                let d = (Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - center).length();
                let (color, coverage) = match paint {
                    Paint::Fill(color) => (color, radius + 0.5 - d),
                    Paint::Stroke { color, width } => {
                        (color, width * 0.5 + 0.5 - (d - radius).abs())
                    }
                };
                if coverage > 0.0 {
                    self.blend(x, y, color, coverage);
                }
            }
        }
    }

    fn line(&mut self, from: Vec2, to: Vec2, color: Rgba, width: f32) {
        if !(from.is_finite() && to.is_finite()) {
            return;
        }
        let half = width.max(0.0) * 0.5;
        let reach = half + 1.0;
        let lo = from.min(to) - Vec2::splat(reach);
        let hi = from.max(to) + Vec2::splat(reach);
        let (x0, x1) = self.span(lo.x, hi.x, self.image.width());
        let (y0, y1) = self.span(lo.y, hi.y, self.image.height());
        let axis = to - from;
        let len_sq = axis.length_squared();
        for y in y0..y1 {
            for x in x0..x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let t = if len_sq > f32::EPSILON {
                    ((p - from).dot(axis) / len_sq).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let d = (p - (from + axis * t)).length();
                // Hairlines keep a minimum footprint and fade by width instead
                let coverage = (half.max(0.5) + 0.5 - d).min(1.0) * width.min(1.0);
                if coverage > 0.0 {
                    self.blend(x, y, color, coverage);
                }
            }
        }
    }

    fn ellipse(&mut self, center: Vec2, radii: Vec2, rotation: f32, color: Rgba) {
        if !(center.is_finite() && radii.x > 0.0 && radii.y > 0.0) {
            return;
        }
        let reach = radii.max_element() + 1.0;
        let (x0, x1) = self.span(center.x - reach, center.x + reach, self.image.width());
        let (y0, y1) = self.span(center.y - reach, center.y + reach, self.image.height());
        let unrotate = Vec2::from_angle(-rotation);
        for y in y0..y1 {
            for x in x0..x1 {
                let local = unrotate.rotate(Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - center);
                let r = (local / radii).length();
                // Approximate distance to the edge in pixels along the minor radius
                let coverage = (1.0 - r) * radii.min_element() + 0.5;
                if coverage > 0.0 {
                    self.blend(x, y, color, coverage);
                }
            }
        }
    }

    /// Even-odd scanline fill sampled at pixel centres
    fn fill_polygon(&mut self, points: &[Vec2], color_at: impl Fn(Vec2) -> Rgba) {
        if points.len() < 3 || points.iter().any(|p| !p.is_finite()) {
            return;
        }
        let (min_y, max_y) = points
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| (lo.min(p.y), hi.max(p.y)));
        let (y0, y1) = self.span(min_y, max_y, self.image.height());
        let width = self.image.width() as i64;
        let mut crossings: Vec<f32> = Vec::with_capacity(8);

        for y in y0..y1 {
            let sy = y as f32 + 0.5;
            crossings.clear();
            let mut prev = points[points.len() - 1];
            for &curr in points {
                if (prev.y <= sy) != (curr.y <= sy) {
                    let t = (sy - prev.y) / (curr.y - prev.y);
                    crossings.push(prev.x + t * (curr.x - prev.x));
                }
                prev = curr;
            }
            crossings.sort_by(f32::total_cmp);
            for pair in crossings.chunks_exact(2) {
                let start = ((pair[0] - 0.5).ceil() as i64).max(0);
                let end = ((pair[1] - 0.5).ceil() as i64).min(width);
                for x in start..end {
                    let color = color_at(Vec2::new(x as f32 + 0.5, sy));
                    self.blend(x, y, color, 1.0);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Fill;
    use crate::frame::GradientStop;
    use crate::geometry::Path;
    use std::sync::Arc;

    fn px(image: &RgbaImage, x: u32, y: u32) -> [u8; 4] {
        image.get_pixel(x, y).0
    }

    fn frame(commands: Vec<DrawCommand>) -> Frame {
        Frame {
            width: 32,
            height: 32,
            commands,
        }
    }

    #[test]
    fn test_clear_fills_everything() {
        let image = Canvas::render(&frame(vec![DrawCommand::Clear(Rgba::BLACK)]));
        assert!(image.pixels().all(|p| p.0 == [0, 0, 0, 255]));
    }

    #[test]
    fn test_half_alpha_over_black() {
        let image = Canvas::render(&frame(vec![
            DrawCommand::Clear(Rgba::BLACK),
            DrawCommand::FillRect {
                min: Vec2::ZERO,
                max: Vec2::splat(32.0),
                color: Rgba::new(200, 100, 0, 128),
            },
        ]));
        let [r, g, b, a] = px(&image, 16, 16);
        assert_eq!(a, 255);
        assert!((r as i32 - 100).abs() <= 1);
        assert!((g as i32 - 50).abs() <= 1);
        assert_eq!(b, 0);
    }

    #[test]
    fn test_circle_covers_centre_not_corner() {
        let image = Canvas::render(&frame(vec![DrawCommand::Circle {
            center: Vec2::splat(16.0),
            radius: 5.0,
            paint: Paint::Fill(Rgba::WHITE),
        }]));
        assert_eq!(px(&image, 16, 16), [255, 255, 255, 255]);
        assert_eq!(px(&image, 0, 0)[3], 0);
    }

    #[test]
    fn test_stroked_circle_is_hollow() {
        let image = Canvas::render(&frame(vec![DrawCommand::Circle {
            center: Vec2::splat(16.0),
            radius: 10.0,
            paint: Paint::Stroke {
                color: Rgba::WHITE,
                width: 1.5,
            },
        }]));
        assert_eq!(px(&image, 16, 16)[3], 0);
        assert!(px(&image, 26, 16)[3] > 0);
    }

    #[test]
    fn test_polygon_gradient_fill() {
        let path = Path::polygon(&[
            Vec2::new(0.0, 0.0),
            Vec2::new(32.0, 0.0),
            Vec2::new(32.0, 32.0),
            Vec2::new(0.0, 32.0),
        ]);
        let fill = Fill::Linear {
            start: Vec2::new(0.0, 0.0),
            end: Vec2::new(0.0, 32.0),
            stops: vec![
                GradientStop {
                    offset: 0.0,
                    color: Rgba::new(0, 0, 0, 255),
                },
                GradientStop {
                    offset: 1.0,
                    color: Rgba::new(255, 255, 255, 255),
                },
            ],
        };
        let image = Canvas::render(&frame(vec![DrawCommand::FillPath { path, fill }]));
        assert!(px(&image, 5, 2)[0] < px(&image, 5, 30)[0]);
        assert_eq!(px(&image, 5, 2)[3], 255);
    }

    #[test]
    fn test_raster_is_stretched_over_destination() {
        let small = RgbaImage::from_pixel(4, 4, Pixel([0, 0, 255, 255]));
        let image = Canvas::render(&frame(vec![DrawCommand::Raster {
            image: Arc::new(small),
            min: Vec2::ZERO,
            max: Vec2::splat(32.0),
        }]));
        assert_eq!(px(&image, 0, 0), [0, 0, 255, 255]);
        assert_eq!(px(&image, 31, 31), [0, 0, 255, 255]);
    }

    #[test]
    fn test_blit_clips_at_edges() {
        let src = RgbaImage::from_pixel(10, 10, Pixel([255, 0, 0, 255]));
        let image = Canvas::render(&frame(vec![DrawCommand::Blit {
            image: Arc::new(src),
            top_left: Vec2::new(-5.0, 27.0),
        }]));
        assert_eq!(px(&image, 0, 31), [255, 0, 0, 255]);
        assert_eq!(px(&image, 5, 31)[3], 0);
        assert_eq!(px(&image, 0, 26)[3], 0);
    }

    #[test]
    fn test_line_is_drawn_between_endpoints() {
        let image = Canvas::render(&frame(vec![DrawCommand::Line {
            from: Vec2::new(2.0, 16.0),
            to: Vec2::new(30.0, 16.0),
            color: Rgba::WHITE,
            width: 2.0,
        }]));
        assert!(px(&image, 16, 15)[3] > 200);
        assert_eq!(px(&image, 16, 5)[3], 0);
    }
}
