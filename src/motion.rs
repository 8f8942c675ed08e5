//! Synthetic device motion for recording without real sensors.
//!
//! A slow OpenSimplex walk rolls the device left and right while gravity
//! stays at 1 g, and a faster walk supplies the gyroscope rates.

use noise::{NoiseFn, OpenSimplex};

/// Standard gravity (m/s²)
const G: f32 = 9.81;

/// One pair of raw sensor readings, device axes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSample {
    /// Angular rate around x, y, z (rad/s)
    pub orientation: [f32; 3],
    /// Acceleration along x, y, z (m/s²)
    pub acceleration: [f32; 3],
}

/// Noise-driven stand-in for a handheld device
pub struct SyntheticMotion {
    simplex: OpenSimplex,
    /// Largest roll angle away from upright (radians)
    pub max_roll_rad: f32,
    /// Peak gyroscope rate (rad/s)
    pub max_rate: f32,
    /// Noise frequency of the roll walk (1/s)
    pub roll_frequency: f64,
    /// Noise frequency of the rate walk (1/s)
    pub rate_frequency: f64,
}

impl SyntheticMotion {
    pub fn new(seed: u32) -> Self {
        Self {
            simplex: OpenSimplex::new(seed),
            max_roll_rad: 0.9,
            max_rate: 1.5,
            roll_frequency: 0.15,
            rate_frequency: 0.6,
        }
    }

    fn walk(&self, t: f64, frequency: f64, lane: f64) -> f32 {
        (self.simplex.get([t * frequency, lane, 0.5]) as f32).clamp(-1.0, 1.0)
    }

    /// Readings at `time_s` seconds
    pub fn sample(&self, time_s: f64) -> MotionSample {
        let roll = self.walk(time_s, self.roll_frequency, 0.5) * self.max_roll_rad;
        let jitter = self.walk(time_s, self.rate_frequency, 30.0) * 0.3;
        MotionSample {
            orientation: [
                self.walk(time_s, self.rate_frequency, 10.0) * self.max_rate,
                self.walk(time_s, self.rate_frequency, 20.0) * self.max_rate,
                0.0,
            ],
            // Rolling right pulls gravity toward the device's -x side
            acceleration: [-G * roll.sin(), G * roll.cos(), jitter],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_are_bounded() {
        let motion = SyntheticMotion::new(3);
        for i in 0..2_000 {
            let s = motion.sample(i as f64 * 0.02);
            let [ax, ay, _] = s.acceleration;
            assert!(((ax * ax + ay * ay).sqrt() - G).abs() < 1e-3);
            assert!(s.orientation.iter().all(|v| v.abs() <= 1.5 + 1e-3));
        }
    }

    #[test]
    fn test_same_seed_same_motion() {
        let a = SyntheticMotion::new(8);
        let b = SyntheticMotion::new(8);
        assert_eq!(a.sample(12.5), b.sample(12.5));
    }

    #[test]
    fn test_motion_actually_moves() {
        let motion = SyntheticMotion::new(1);
        let rolls: Vec<f32> = (0..200)
            .map(|i| motion.sample(i as f64 * 0.5).acceleration[0])
            .collect();
        let spread = rolls.iter().cloned().fold(f32::MIN, f32::max)
            - rolls.iter().cloned().fold(f32::MAX, f32::min);
        assert!(spread > 1.0);
    }
}
