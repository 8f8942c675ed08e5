//! Water surface and floating body parameters.

/// Height-field ripple simulation parameters
#[derive(Debug, Clone)]
pub struct RippleParams {
    /// Grid columns (fixed; rows follow the surface aspect ratio)
    pub cols: usize,

    /// Lower bound on grid rows
    pub min_rows: usize,

    /// Stencil damping applied to every new height (dimensionless, < 1)
    pub damping: f32,

    /// Stability clamp on every cell (height units, ±)
    pub max_height: f32,

    /// Height added per injection cell at full tilt
    pub impulse_strength: f32,

    /// Normalized force below which nothing is injected
    pub impulse_threshold: f32,

    /// Stencil steps per tick (more = faster visual propagation)
    pub steps_per_tick: u32,

    /// Height that maps to full alpha swing in the raster
    pub shade_height: f32,

    /// Alpha swing contributed by height (0..255 scale)
    pub height_alpha: f32,

    /// Alpha swing contributed by the specular term (0..255 scale)
    pub specular_alpha: f32,

    /// Highest alpha any raster pixel may reach
    pub max_alpha: u8,

    /// Base alpha = water_level * this, clamped to `base_alpha_range`
    pub level_alpha_gain: f32,
    pub base_alpha_range: (u8, u8),
}

impl Default for RippleParams {
    fn default() -> Self {
        Self {
            cols: 80,
            min_rows: 40,
            damping: 0.985,
            max_height: 20.0,
            impulse_strength: 3.0,
            impulse_threshold: 0.05,
            steps_per_tick: 2,
            shade_height: 8.0,
            height_alpha: 70.0,
            specular_alpha: 80.0,
            max_alpha: 220,
            level_alpha_gain: 400.0,
            base_alpha_range: (20, 200),
        }
    }
}

/// Analytic pond surface parameters.
///
/// Surface y (screen space, +y down) at column x:
/// `H(1 - level) - (x/W - 0.5) * tilt * H * tilt_skew + Σ waves`
#[derive(Debug, Clone)]
pub struct PondParams {
    /// Seconds per full phase revolution
    pub phase_period_s: f32,

    /// Fraction of the screen height the surface skews across at full tilt
    pub tilt_skew: f32,

    /// Per-tick low-pass coefficient for the water tilt
    pub tilt_alpha: f32,

    /// Gravity magnitude corresponding to full tilt (m/s²)
    pub full_tilt_gravity_m_s2: f32,

    /// Sinusoidal detail terms summed onto the skewed base level
    pub waves: [SurfaceWave; 3],

    /// Horizontal distance between surface samples (pixels)
    pub sample_step_px: f32,

    /// Minimum alpha of the main water body (0..255)
    pub min_alpha: u8,

    /// Gradient start above the resting level (fraction of screen height)
    pub gradient_lead: f32,

    /// Gradient alpha multipliers at stops 0, 0.30, 0.65, 1.0
    pub gradient_alpha: [f32; 4],

    /// Secondary wave: phase lead (rad), depth (px) and alpha multiplier
    pub deep_phase_lead: f32,
    pub deep_offset_px: f32,
    pub deep_alpha: f32,
}

/// One sinusoidal term of the pond surface:
/// `amplitude * sin(phase_rate * φ + spatial_freq * x + offset)` (or cos)
#[derive(Debug, Clone, Copy)]
pub struct SurfaceWave {
    pub amplitude_px: f32,
    pub phase_rate: f32,
    pub spatial_freq: f32,
    pub offset: f32,
    pub cosine: bool,
}

impl Default for PondParams {
    fn default() -> Self {
        Self {
            phase_period_s: 12.0,
            tilt_skew: 0.55,
            tilt_alpha: 0.12,
            full_tilt_gravity_m_s2: 9.81,
            waves: [
                SurfaceWave {
                    amplitude_px: 6.0,
                    phase_rate: 0.35,
                    spatial_freq: 0.008,
                    offset: 0.0,
                    cosine: false,
                },
                SurfaceWave {
                    amplitude_px: 3.5,
                    phase_rate: 0.8,
                    spatial_freq: 0.018,
                    offset: 2.0,
                    cosine: false,
                },
                SurfaceWave {
                    amplitude_px: 1.5,
                    phase_rate: 1.5,
                    spatial_freq: 0.04,
                    offset: -1.0,
                    cosine: true,
                },
            ],
            sample_step_px: 24.0,
            min_alpha: 140,
            gradient_lead: 0.12,
            gradient_alpha: [0.55, 0.72, 0.88, 0.96],
            deep_phase_lead: 1.8,
            deep_offset_px: 20.0,
            deep_alpha: 0.15,
        }
    }
}

/// Floating body (ice) parameters
#[derive(Debug, Clone)]
pub struct BodyParams {
    /// Hard upper bound on the number of bodies
    pub max_count: usize,

    /// Horizontal band bodies stay within (fraction of width)
    pub margin: (f32, f32),

    /// Band the initial positions are spread across (fraction of width)
    pub spawn_band: (f32, f32),

    /// Base sizes of the three size classes (pixels, w × h)
    pub size_classes: [(f32, f32); 3],

    /// Random extra added to each size class (pixels, w × h)
    pub size_jitter: (f32, f32),

    /// Drift acceleration per unit tilt (fraction of width per tick²)
    pub drift_gain: f32,

    /// Velocity multiplier applied every tick
    pub damping: f32,

    /// Fraction of speed retained when bouncing off the margin
    pub bounce_retain: f32,

    /// Minimum horizontal separation between any two bodies (fraction of width)
    pub min_separation: f32,

    /// Fraction of the overlap each body of a close pair is pushed away
    pub repulsion: f32,

    /// Bob speed range (multiplier on the surface phase)
    pub bob_speed: (f32, f32),

    /// Bob amplitude range (pixels)
    pub bob_amp_px: (f32, f32),

    /// Exclusive upper bound on crack seeds
    pub crack_seed_range: u32,

    /// How far below the surface the body centre sits (fraction of height)
    pub draft: f32,

    /// Half-distance of the slope probe either side of the centre (pixels)
    pub slope_probe_px: f32,

    /// Fraction of the surface slope angle the body follows
    pub slope_follow: f32,

    /// Corner radius of the body outline (pixels)
    pub corner_radius_px: f32,

    /// Local y (fraction of height) below which the submerged tint applies
    pub waterline: f32,
}

impl Default for BodyParams {
    fn default() -> Self {
        Self {
            max_count: 5,
            margin: (0.06, 0.94),
            spawn_band: (0.12, 0.88),
            size_classes: [(30.0, 20.0), (48.0, 30.0), (68.0, 42.0)],
            size_jitter: (10.0, 6.0),
            drift_gain: 0.001,
            damping: 0.975,
            bounce_retain: 0.15,
            min_separation: 0.16,
            repulsion: 0.5,
            bob_speed: (0.25, 0.55),
            bob_amp_px: (1.0, 2.5),
            crack_seed_range: 10_000,
            draft: 0.58,
            slope_probe_px: 8.0,
            slope_follow: 0.6,
            corner_radius_px: 6.0,
            waterline: 0.10,
        }
    }
}
