//! Parameter definitions with units and documented semantics.
//!
//! All tuning constants live here with:
//! - Units (pixels, pixels per tick, seconds, m/s²)
//! - Documented ranges and meanings
//! - Reference values as `Default`

mod force;
mod particles;
mod render;
mod water;

// Re-export all types
pub use force::ForceParams;
pub use particles::{ArchetypeParams, MotionRule, ParticleKinematics, ParticleTable, SpawnEdge};
pub use render::{RecordingConfig, RenderConfig};
pub use water::{BodyParams, PondParams, RippleParams, SurfaceWave};
