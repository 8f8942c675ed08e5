//! Sensor smoothing and force-scaling parameters.

/// Low-pass filter and clamping parameters for the orientation and
/// acceleration channels.
#[derive(Debug, Clone)]
pub struct ForceParams {
    /// Low-pass coefficient for the gyroscope (parallax) channel, in (0, 1)
    /// Reference value: 0.12
    pub tilt_alpha: f32,

    /// Low-pass coefficient for the accelerometer (gravity) channel, in (0, 1)
    /// Still-image wallpaper used 0.15, video wallpaper used 0.2
    pub gravity_alpha: f32,

    /// Sample interval the coefficients were tuned for (seconds)
    /// Samples arriving at a different rate get an equivalent coefficient
    pub nominal_sample_interval_s: f32,

    /// Parallax displacement per unit of smoothed angular rate (pixels per rad/s)
    pub parallax_gain_px: f32,

    /// Maximum parallax displacement at sensitivity 1.0 (pixels per axis)
    pub max_parallax_px: f32,

    /// Upper bound on the reported gravity magnitude (m/s²)
    pub max_gravity_m_s2: f32,

    /// Gravity reported before the first accelerometer sample (screen space, m/s²)
    pub initial_gravity_m_s2: [f32; 2],

    /// Divisor mapping gravity to the normalized [-1, 1] particle force
    pub normalize_divisor_m_s2: f32,
}

impl Default for ForceParams {
    fn default() -> Self {
        Self {
            tilt_alpha: 0.12,
            gravity_alpha: 0.15,
            nominal_sample_interval_s: 0.02, // SENSOR_DELAY_GAME
            parallax_gain_px: 20.0,
            max_parallax_px: 60.0,
            max_gravity_m_s2: 19.6, // 2 g: shakes beyond this add nothing visible
            initial_gravity_m_s2: [0.0, 9.8],
            normalize_divisor_m_s2: 10.0,
        }
    }
}

impl ForceParams {
    /// Parameters matching the video wallpaper's faster gravity response
    pub fn video() -> Self {
        Self {
            gravity_alpha: 0.2,
            ..Self::default()
        }
    }

    /// Validate that both filter coefficients are usable
    pub fn validate(&self) -> Result<(), String> {
        for (name, alpha) in [
            ("tilt_alpha", self.tilt_alpha),
            ("gravity_alpha", self.gravity_alpha),
        ] {
            if !(alpha > 0.0 && alpha < 1.0) {
                return Err(format!("{} must be in (0, 1), got {}", name, alpha));
            }
        }
        if self.nominal_sample_interval_s <= 0.0 {
            return Err("nominal_sample_interval_s must be > 0".to_string());
        }
        Ok(())
    }
}
