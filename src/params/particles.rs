//! Particle archetype table and shared kinematic constants.
//!
//! Velocities are in pixels per nominal tick (16 ms); the simulator scales
//! them by `dt / nominal_tick_s`.

use crate::particles::ParticleArchetype;

/// Kinematic rule an archetype follows each tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionRule {
    /// Gravity-driven with a clamped velocity box (snow, rain, leaves)
    Falling,
    /// Ignores gravity, wanders on a sinusoidal path (fireflies)
    Drifting,
    /// Floats against gravity with a lateral sway (bubbles)
    Rising,
    /// Stationary, only alpha changes (stars)
    Twinkling,
}

/// Edge a recycled particle re-enters from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnEdge {
    Top,
    Bottom,
}

/// Spawn distribution for one archetype.
///
/// Ranges are `(value at r=0, value at r=1)` for a uniform draw `r`, so a
/// reversed pair is a valid negative range.
#[derive(Debug, Clone)]
pub struct ArchetypeParams {
    pub motion: MotionRule,
    pub spawn_edge: SpawnEdge,

    /// Horizontal spawn speed spread: vx = (r - 0.5) * spread
    pub spawn_vx_spread: f32,

    /// Vertical spawn speed range (pixels per tick)
    pub spawn_vy: (f32, f32),

    /// Radius range (pixels)
    pub size_px: (f32, f32),

    /// Opacity range (0..1)
    pub alpha: (f32, f32),
}

/// Constants shared by every archetype
#[derive(Debug, Clone)]
pub struct ParticleKinematics {
    /// Tick length the per-tick velocities were tuned for (seconds)
    pub nominal_tick_s: f32,

    /// Distance outside the screen at which a particle is recycled (pixels)
    pub respawn_margin_px: f32,

    /// Y coordinate for top-edge respawns (pixels, negative = above screen)
    pub top_spawn_y_px: f32,

    /// Falling: velocity gained per tick per unit normalized gravity
    pub fall_gravity_gain: f32,
    /// Falling: horizontal speed limit (pixels per tick)
    pub fall_max_vx: f32,
    /// Falling: vertical speed limits (pixels per tick)
    pub fall_vy_range: (f32, f32),

    /// Drifting: amplitude of the sinusoidal wander (pixels per tick)
    pub drift_wander_px: f32,
    /// Drifting: alpha pulse bounds
    pub drift_alpha_range: (f32, f32),

    /// Rising: lateral acceleration per unit gravity x
    pub rise_lateral_gain: f32,
    /// Rising: upward acceleration per unit gravity magnitude on y
    pub rise_lift_gain: f32,
    /// Rising: horizontal sway amplitude (pixels per tick)
    pub rise_sway_px: f32,
    /// Rising: speed limit on either axis (pixels per tick)
    pub rise_max_speed: f32,

    /// Twinkling: alpha oscillation rate (radians per second of elapsed time)
    pub twinkle_rate: f32,
    /// Twinkling: alpha bounds
    pub twinkle_alpha_range: (f32, f32),
}

impl Default for ParticleKinematics {
    fn default() -> Self {
        Self {
            nominal_tick_s: 0.016,
            respawn_margin_px: 40.0,
            top_spawn_y_px: -20.0,
            fall_gravity_gain: 0.05,
            fall_max_vx: 15.0,
            fall_vy_range: (-15.0, 20.0),
            drift_wander_px: 0.5,
            drift_alpha_range: (0.1, 0.9),
            rise_lateral_gain: 0.005,
            rise_lift_gain: 0.01,
            rise_sway_px: 0.3,
            rise_max_speed: 15.0,
            twinkle_rate: 2.0,
            twinkle_alpha_range: (0.2, 1.0),
        }
    }
}

/// Complete archetype table, indexed by [`ParticleArchetype`]
#[derive(Debug, Clone)]
pub struct ParticleTable {
    pub archetypes: [ArchetypeParams; ParticleArchetype::COUNT],
    pub kinematics: ParticleKinematics,
}

impl ParticleTable {
    pub fn get(&self, archetype: ParticleArchetype) -> &ArchetypeParams {
        &self.archetypes[archetype as usize]
    }
}

impl Default for ParticleTable {
    fn default() -> Self {
        Self {
            archetypes: [
                // Snow
                ArchetypeParams {
                    motion: MotionRule::Falling,
                    spawn_edge: SpawnEdge::Top,
                    spawn_vx_spread: 1.5,
                    spawn_vy: (0.5, 2.0),
                    size_px: (3.0, 8.0),
                    alpha: (0.7, 1.0),
                },
                // Rain
                ArchetypeParams {
                    motion: MotionRule::Falling,
                    spawn_edge: SpawnEdge::Top,
                    spawn_vx_spread: 2.0,
                    spawn_vy: (8.0, 16.0),
                    size_px: (1.5, 2.5),
                    alpha: (0.7, 1.0),
                },
                // Fireflies
                ArchetypeParams {
                    motion: MotionRule::Drifting,
                    spawn_edge: SpawnEdge::Top,
                    spawn_vx_spread: 1.5,
                    spawn_vy: (-0.5, 0.5),
                    size_px: (4.0, 10.0),
                    alpha: (0.0, 1.0),
                },
                // Leaves
                ArchetypeParams {
                    motion: MotionRule::Falling,
                    spawn_edge: SpawnEdge::Top,
                    spawn_vx_spread: 3.0,
                    spawn_vy: (1.0, 3.0),
                    size_px: (5.0, 13.0),
                    alpha: (0.7, 1.0),
                },
                // Bubbles
                ArchetypeParams {
                    motion: MotionRule::Rising,
                    spawn_edge: SpawnEdge::Bottom,
                    spawn_vx_spread: 1.5,
                    spawn_vy: (-0.5, -2.0),
                    size_px: (4.0, 12.0),
                    alpha: (0.7, 1.0),
                },
                // Stars
                ArchetypeParams {
                    motion: MotionRule::Twinkling,
                    spawn_edge: SpawnEdge::Top,
                    spawn_vx_spread: 1.5,
                    spawn_vy: (0.0, 0.0),
                    size_px: (1.5, 4.5),
                    alpha: (0.0, 1.0),
                },
            ],
            kinematics: ParticleKinematics::default(),
        }
    }
}
