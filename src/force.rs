//! Sensor smoothing: raw gyroscope/accelerometer samples in, smoothed
//! parallax and gravity vectors out.
//!
//! Samples arrive on the sensor thread and are read on the tick thread.
//! Each scalar lives in its own atomic, so a reader never sees a torn float,
//! but may see the x of one sample with the y of the next. That mismatch
//! disappears within a frame or two and is not visible.

use glam::Vec2;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use tracing::warn;

use crate::params::ForceParams;

/// Lock-free `f32` cell
#[derive(Debug, Default)]
pub struct AtomicF32(AtomicU32);

impl AtomicF32 {
    pub fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    #[inline]
    pub fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Acquire))
    }

    #[inline]
    pub fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Release);
    }
}

/// Two independent atomic scalars
#[derive(Debug, Default)]
struct AtomicVec2 {
    x: AtomicF32,
    y: AtomicF32,
}

impl AtomicVec2 {
    fn new(v: Vec2) -> Self {
        Self {
            x: AtomicF32::new(v.x),
            y: AtomicF32::new(v.y),
        }
    }

    fn load(&self) -> Vec2 {
        Vec2::new(self.x.load(), self.y.load())
    }

    fn store(&self, v: Vec2) {
        self.x.store(v.x);
        self.y.store(v.y);
    }
}

/// Smoothed device forces, shared between the sensor producer and the
/// tick thread behind an `Arc`.
///
/// The smoothing state is written only by the producer; the tick thread only
/// reads. One producer per channel is assumed.
#[derive(Debug)]
pub struct ForceSource {
    params: ForceParams,
    sensitivity: AtomicF32,
    rate: AtomicVec2,
    tilt: AtomicVec2,
    gravity: AtomicVec2,
    warned_non_finite: AtomicBool,
}

/// One consistent-enough read of both channels for a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Forces {
    /// Parallax offset (pixels), already scaled and clamped
    pub tilt: Vec2,
    /// Screen-space gravity (m/s², +y down)
    pub gravity: Vec2,
    /// Gravity mapped to [-1, 1] per axis
    pub gravity_normalized: Vec2,
}

impl Forces {
    /// Forces with the device upright and still
    pub fn at_rest(params: &ForceParams) -> Self {
        let gravity = Vec2::from_array(params.initial_gravity_m_s2);
        Self {
            tilt: Vec2::ZERO,
            gravity,
            gravity_normalized: normalize_gravity(gravity, params),
        }
    }
}

impl ForceSource {
    pub fn new(params: ForceParams) -> Self {
        let gravity = Vec2::from_array(params.initial_gravity_m_s2);
        Self {
            params,
            sensitivity: AtomicF32::new(1.0),
            rate: AtomicVec2::default(),
            tilt: AtomicVec2::default(),
            gravity: AtomicVec2::new(gravity),
            warned_non_finite: AtomicBool::new(false),
        }
    }

    pub fn params(&self) -> &ForceParams {
        &self.params
    }

    /// Update the user sensitivity; non-positive values are ignored
    pub fn set_sensitivity(&self, sensitivity: f32) {
        if sensitivity.is_finite() && sensitivity > 0.0 {
            self.sensitivity.store(sensitivity);
        }
    }

    /// Absorb a gyroscope sample (rad/s around device x, y, z)
    ///
    /// Rotation around the device y axis pans horizontally, around x pans
    /// vertically.
    pub fn on_orientation_sample(&self, values: [f32; 3], dt: f32) {
        if !self.accept(&values) {
            return;
        }
        let alpha = effective_alpha(self.params.tilt_alpha, dt, &self.params);
        let raw = Vec2::new(values[1], values[0]);
        let smoothed = self.rate.load() * (1.0 - alpha) + raw * alpha;
        self.rate.store(smoothed);

        let sensitivity = self.sensitivity.load();
        let limit = self.params.max_parallax_px * sensitivity;
        let offset = (smoothed * self.params.parallax_gain_px * sensitivity)
            .clamp(Vec2::splat(-limit), Vec2::splat(limit));
        self.tilt.store(offset);
    }

    /// Absorb an accelerometer sample (m/s² along device x, y, z)
    pub fn on_acceleration_sample(&self, values: [f32; 3], dt: f32) {
        if !self.accept(&values) {
            return;
        }
        let alpha = effective_alpha(self.params.gravity_alpha, dt, &self.params);
        // Device +x is screen right, device +y is screen up; the sensor reports
        // the reaction to gravity, so x flips and y keeps its sign.
        let raw = Vec2::new(-values[0], values[1]);
        let smoothed = self.gravity.load() * (1.0 - alpha) + raw * alpha;
        self.gravity
            .store(smoothed.clamp_length_max(self.params.max_gravity_m_s2));
    }

    /// Current parallax offset in pixels
    pub fn tilt(&self) -> Vec2 {
        self.tilt.load()
    }

    /// Current screen-space gravity in m/s²
    pub fn gravity(&self) -> Vec2 {
        self.gravity.load()
    }

    /// Read both channels for one tick
    pub fn snapshot(&self) -> Forces {
        let gravity = self.gravity();
        Forces {
            tilt: self.tilt(),
            gravity,
            gravity_normalized: normalize_gravity(gravity, &self.params),
        }
    }

    /// Forget all smoothing history
    pub fn reset(&self) {
        self.rate.store(Vec2::ZERO);
        self.tilt.store(Vec2::ZERO);
        self.gravity
            .store(Vec2::from_array(self.params.initial_gravity_m_s2));
    }

    fn accept(&self, values: &[f32; 3]) -> bool {
        if values.iter().all(|v| v.is_finite()) {
            return true;
        }
        if !self.warned_non_finite.swap(true, Ordering::Relaxed) {
            warn!(?values, "dropping non-finite sensor sample");
        }
        false
    }
}

impl Default for ForceSource {
    fn default() -> Self {
        Self::new(ForceParams::default())
    }
}

/// Rescale a per-sample coefficient for a sample interval of `dt` seconds.
///
/// Equal to `alpha` when `dt` is the nominal interval; unknown or invalid
/// intervals fall back to `alpha`.
pub fn effective_alpha(alpha: f32, dt: f32, params: &ForceParams) -> f32 {
    if !(dt.is_finite() && dt > 0.0) {
        return alpha;
    }
    let ratio = dt / params.nominal_sample_interval_s;
    (1.0 - (1.0 - alpha).powf(ratio)).clamp(f32::EPSILON, 1.0 - f32::EPSILON)
}

fn normalize_gravity(gravity: Vec2, params: &ForceParams) -> Vec2 {
    (gravity / params.normalize_divisor_m_s2).clamp(Vec2::NEG_ONE, Vec2::ONE)
}
