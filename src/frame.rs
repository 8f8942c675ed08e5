//! Composited frame: an ordered list of draw commands.
//!
//! Layers append commands; nothing here touches pixels. `raster::Canvas`
//! turns a frame into an RGBA buffer, and a platform surface can replay the
//! same list against its own canvas.

use glam::Vec2;
use image::RgbaImage;
use std::sync::Arc;

use crate::color::Rgba;
use crate::geometry::Path;

/// Solid or stroked shape paint
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Paint {
    Fill(Rgba),
    Stroke { color: Rgba, width: f32 },
}

/// Color stop of a linear gradient, `offset` in 0..1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Rgba,
}

/// Path fill
#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    Solid(Rgba),
    /// Linear gradient from `start` to `end`, clamped beyond both ends
    Linear {
        start: Vec2,
        end: Vec2,
        stops: Vec<GradientStop>,
    },
}

impl Fill {
    /// Gradient color at `point`
    pub fn color_at(&self, point: Vec2) -> Rgba {
        match self {
            Fill::Solid(color) => *color,
            Fill::Linear { start, end, stops } => {
                let axis = *end - *start;
                let len_sq = axis.length_squared();
                let t = if len_sq > f32::EPSILON {
                    ((point - *start).dot(axis) / len_sq).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                sample_stops(stops, t)
            }
        }
    }
}

fn sample_stops(stops: &[GradientStop], t: f32) -> Rgba {
    let Some(first) = stops.first() else {
        return Rgba::TRANSPARENT;
    };
    if t <= first.offset {
        return first.color;
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = b.offset - a.offset;
            let local = if span > f32::EPSILON {
                (t - a.offset) / span
            } else {
                1.0
            };
            return a.color.lerp(b.color, local);
        }
    }
    stops[stops.len() - 1].color
}

/// One drawing operation, in screen pixels
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Replace every pixel
    Clear(Rgba),
    /// Draw an image unscaled with its top-left corner at `top_left`
    Blit {
        image: Arc<RgbaImage>,
        top_left: Vec2,
    },
    FillRect {
        min: Vec2,
        max: Vec2,
        color: Rgba,
    },
    Circle {
        center: Vec2,
        radius: f32,
        paint: Paint,
    },
    Line {
        from: Vec2,
        to: Vec2,
        color: Rgba,
        width: f32,
    },
    /// Filled ellipse, `rotation` in radians
    Ellipse {
        center: Vec2,
        radii: Vec2,
        rotation: f32,
        color: Rgba,
    },
    FillPath {
        path: Path,
        fill: Fill,
    },
    StrokePath {
        path: Path,
        color: Rgba,
        width: f32,
    },
    /// Low-resolution image stretched (bilinear) over `min..max`
    Raster {
        image: Arc<RgbaImage>,
        min: Vec2,
        max: Vec2,
    },
}

/// Everything needed to present one tick
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub commands: Vec<DrawCommand>,
}

impl Frame {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }
}
