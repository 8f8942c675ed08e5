//! Frame composition.
//!
//! Layer order is fixed: black clear, base layer shifted by parallax, flat
//! color overlay, particles, water. Each layer only sees what is passed in
//! for it.

use glam::{UVec2, Vec2};
use image::imageops::{self, FilterType};
use image::RgbaImage;
use std::sync::Arc;
use tracing::debug;

use crate::color::Rgba;
use crate::config::ConfigSnapshot;
use crate::frame::{DrawCommand, Frame};
use crate::particles::ParticleField;
use crate::water::{WaterField, WaterLook};

/// Everything one tick contributes to a frame
pub struct LayerInputs<'a> {
    pub config: &'a ConfigSnapshot,
    pub base: Option<&'a Arc<RgbaImage>>,
    /// Parallax offset in pixels; ignored when gyro is disabled
    pub parallax: Vec2,
    pub particles: Option<&'a ParticleField>,
    pub water: Option<&'a dyn WaterField>,
}

/// Base image scaled to the surface and blurred, kept until an input changes
struct PreparedBase {
    source: Arc<RgbaImage>,
    surface: UVec2,
    margin_bits: u32,
    sigma_bits: u32,
    image: Arc<RgbaImage>,
}

pub struct Compositor {
    /// Extra pixels per axis the base layer covers beyond the surface
    base_margin_px: f32,
    prepared: Option<PreparedBase>,
}

impl Compositor {
    pub fn new(base_margin_px: f32) -> Self {
        Self {
            base_margin_px: base_margin_px.max(0.0),
            prepared: None,
        }
    }

    /// Compose one frame for a `size` pixel surface
    pub fn render(&mut self, size: UVec2, inputs: &LayerInputs<'_>) -> Frame {
        let mut frame = Frame::new(size.x, size.y);
        let surface = size.as_vec2();
        let config = inputs.config;

        frame.commands.push(DrawCommand::Clear(Rgba::BLACK));

        match inputs.base {
            Some(source) => {
                let margin = self.base_margin_px * config.sensitivity.max(0.0);
                let image = self.prepare_base(source, size, margin, config.blur_sigma());
                let image_size = Vec2::new(image.width() as f32, image.height() as f32);
                let parallax = if config.gyro_enabled && inputs.parallax.is_finite() {
                    inputs.parallax
                } else {
                    Vec2::ZERO
                };
                frame.commands.push(DrawCommand::Blit {
                    image,
                    top_left: (surface - image_size) * 0.5 + parallax,
                });
            }
            // No image yet: the cleared black frame stands in for it
            None => self.prepared = None,
        }

        if config.color_overlay_enabled {
            frame.commands.push(DrawCommand::FillRect {
                min: Vec2::ZERO,
                max: surface,
                color: config.overlay_color,
            });
        }

        if let Some(particles) = inputs.particles {
            particles.render(&mut frame.commands);
        }

        if let Some(water) = inputs.water {
            water.render(&WaterLook::from_config(config), &mut frame.commands);
        }

        frame
    }

    /// Scaled and blurred base image, recomputed only when the source image,
    /// the surface size, the margin or the blur amount changed
    fn prepare_base(
        &mut self,
        source: &Arc<RgbaImage>,
        surface: UVec2,
        margin: f32,
        sigma: f32,
    ) -> Arc<RgbaImage> {
        if let Some(prepared) = &self.prepared {
            if Arc::ptr_eq(&prepared.source, source)
                && prepared.surface == surface
                && prepared.margin_bits == margin.to_bits()
                && prepared.sigma_bits == sigma.to_bits()
            {
                return Arc::clone(&prepared.image);
            }
        }

        let image = Arc::new(scale_and_blur(source, surface, margin, sigma));
        debug!(
            width = image.width(),
            height = image.height(),
            sigma,
            "prepared base layer"
        );
        self.prepared = Some(PreparedBase {
            source: Arc::clone(source),
            surface,
            margin_bits: margin.to_bits(),
            sigma_bits: sigma.to_bits(),
            image: Arc::clone(&image),
        });
        image
    }
}

/// Scale `source` to cover the surface plus `margin` on every side, keeping
/// its aspect ratio, then blur with `sigma` (0 disables blur)
pub fn scale_and_blur(source: &RgbaImage, surface: UVec2, margin: f32, sigma: f32) -> RgbaImage {
    let (w, h) = source.dimensions();
    if w == 0 || h == 0 {
        return source.clone();
    }
    let target = surface.as_vec2() + Vec2::splat(2.0 * margin);
    let scale = (target.x / w as f32).max(target.y / h as f32);
    let nw = ((w as f32 * scale).round() as u32).max(1);
    let nh = ((h as f32 * scale).round() as u32).max(1);

    let scaled = if (nw, nh) == (w, h) {
        source.clone()
    } else {
        imageops::resize(source, nw, nh, FilterType::Triangle)
    };
    if sigma > 0.0 {
        imageops::blur(&scaled, sigma)
    } else {
        scaled
    }
}
