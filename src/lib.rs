//! Dream Dash - a side-scrolling star catcher
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, lifecycle)
//! - `config`: Variant presets and tunable constants
//! - `game`: Host-facing facade with score notifications and snapshots
//! - `platform`: Browser/native input plumbing

pub mod config;
pub mod game;
pub mod platform;
pub mod sim;

pub use config::{ConfigError, SimConfig, Variant};
pub use game::{Game, Snapshot};

use glam::Vec3;
use rand::Rng;

/// Game timing constants
pub mod consts {
    /// Frames longer than this (seconds) are dropped instead of simulated
    pub const MAX_FRAME_DT: f32 = 0.05;
    /// Nominal frame length used by headless runners
    pub const FRAME_DT: f32 = 1.0 / 60.0;

    /// Level-up banner lifetime (seconds)
    pub const BANNER_SECS: f32 = 1.6;
    /// Score flash lifetime (seconds)
    pub const FLASH_SECS: f32 = 0.18;
    /// Minimum gap between two fast-fall impulses (seconds)
    pub const FAST_FALL_INTERVAL: f32 = 0.12;
    /// Post-hit invulnerability window (seconds)
    pub const INVULNERABILITY_SECS: f32 = 1.0;
}

/// Uniform sample in `[lo, hi)`, or `lo` when the range is empty
#[inline]
pub fn random_between<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi > lo { rng.random_range(lo..hi) } else { lo }
}

/// Bernoulli trial that tolerates out-of-range probabilities
#[inline]
pub fn chance<R: Rng + ?Sized>(rng: &mut R, p: f32) -> bool {
    let p = if p.is_finite() { p.clamp(0.0, 1.0) } else { 0.0 };
    rng.random_bool(p as f64)
}

/// Closest point of the box `[min, max]` to `point`
#[inline]
pub fn closest_point_on_box(point: Vec3, min: Vec3, max: Vec3) -> Vec3 {
    point.clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_random_between_empty_range() {
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(random_between(&mut rng, 5.0, 5.0), 5.0);
        assert_eq!(random_between(&mut rng, 5.0, 2.0), 5.0);
        for _ in 0..100 {
            let v = random_between(&mut rng, -1.0, 1.0);
            assert!((-1.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_chance_clamps() {
        let mut rng = Pcg32::seed_from_u64(2);
        assert!(!chance(&mut rng, 0.0));
        assert!(!chance(&mut rng, -3.0));
        assert!(!chance(&mut rng, f32::NAN));
        assert!(chance(&mut rng, 1.0));
        assert!(chance(&mut rng, 7.5));
    }

    #[test]
    fn test_closest_point_on_box() {
        let min = Vec3::ZERO;
        let max = Vec3::splat(2.0);
        assert_eq!(closest_point_on_box(Vec3::splat(1.0), min, max), Vec3::splat(1.0));
        assert_eq!(
            closest_point_on_box(Vec3::new(5.0, -1.0, 1.0), min, max),
            Vec3::new(2.0, 0.0, 1.0)
        );
    }
}
