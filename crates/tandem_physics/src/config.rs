//! # Physics Configuration
//!
//! Cadence and unit conversion for the simulation thread. Loaded as the
//! `[physics]` table of a scene config; every field has a default.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{PhysicsError, PhysicsResult};

/// Fixed simulation step (seconds).
pub const DEFAULT_FIXED_DELTA: f32 = 1.0 / 60.0;
/// Constraint solver velocity passes per step.
pub const DEFAULT_VELOCITY_ITERATIONS: u32 = 8;
/// Constraint solver position passes per step.
pub const DEFAULT_POSITION_ITERATIONS: u32 = 3;
/// Sleep between loop iterations (milliseconds).
pub const DEFAULT_SLEEP_INTERVAL_MS: u64 = 16;
/// Pixels per physics meter.
pub const DEFAULT_PIXELS_PER_METER: f32 = 50.0;

/// Simulation thread configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Seconds simulated per step.
    pub fixed_delta: f32,
    /// Velocity solver passes per step.
    pub velocity_iterations: u32,
    /// Position solver passes per step.
    pub position_iterations: u32,
    /// Wall-clock pause between iterations; zero would spin the thread.
    pub sleep_interval_ms: u64,
    /// Conversion between entity pixel space and body meters.
    pub pixels_per_meter: f32,
    /// World gravity (meters per second squared).
    pub gravity: Vec2,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            fixed_delta: DEFAULT_FIXED_DELTA,
            velocity_iterations: DEFAULT_VELOCITY_ITERATIONS,
            position_iterations: DEFAULT_POSITION_ITERATIONS,
            sleep_interval_ms: DEFAULT_SLEEP_INTERVAL_MS,
            pixels_per_meter: DEFAULT_PIXELS_PER_METER,
            gravity: Vec2::ZERO,
        }
    }
}

impl PhysicsConfig {
    /// Pause between loop iterations.
    #[inline]
    #[must_use]
    pub const fn sleep_interval(&self) -> Duration {
        Duration::from_millis(self.sleep_interval_ms)
    }

    /// Wall-clock budget of one iteration: one fixed step.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::InvalidConfig`] when `fixed_delta` is not a
    /// representable duration.
    pub fn step_budget(&self) -> PhysicsResult<Duration> {
        Duration::try_from_secs_f32(self.fixed_delta).map_err(|err| {
            PhysicsError::InvalidConfig(format!(
                "fixed_delta {} is not a duration: {err}",
                self.fixed_delta
            ))
        })
    }

    /// Rejects values the loop cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> PhysicsResult<()> {
        if !(self.fixed_delta.is_finite() && self.fixed_delta > 0.0) {
            return Err(PhysicsError::InvalidConfig(format!(
                "fixed_delta must be positive, got {}",
                self.fixed_delta
            )));
        }
        self.step_budget()?;
        if self.sleep_interval_ms == 0 {
            return Err(PhysicsError::InvalidConfig(
                "sleep_interval_ms must be at least 1".into(),
            ));
        }
        if !(self.pixels_per_meter.is_finite() && self.pixels_per_meter > 0.0) {
            return Err(PhysicsError::InvalidConfig(format!(
                "pixels_per_meter must be positive, got {}",
                self.pixels_per_meter
            )));
        }
        if self.velocity_iterations == 0 || self.position_iterations == 0 {
            return Err(PhysicsError::InvalidConfig(
                "solver iterations must be at least 1".into(),
            ));
        }
        if !self.gravity.is_finite() {
            return Err(PhysicsError::InvalidConfig("gravity must be finite".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PhysicsConfig::default();
        assert!((config.fixed_delta - 1.0 / 60.0).abs() < f32::EPSILON);
        assert_eq!(config.velocity_iterations, 8);
        assert_eq!(config.position_iterations, 3);
        assert_eq!(config.sleep_interval(), Duration::from_millis(16));
        assert!((config.pixels_per_meter - 50.0).abs() < f32::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_ratio() {
        let config = PhysicsConfig {
            pixels_per_meter: 0.0,
            ..PhysicsConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PhysicsError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_sleep_interval() {
        let config = PhysicsConfig {
            sleep_interval_ms: 0,
            ..PhysicsConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PhysicsError::InvalidConfig(message)) if message.contains("sleep_interval_ms")
        ));
    }

    #[test]
    fn test_validate_rejects_unrepresentable_step() {
        let config = PhysicsConfig {
            fixed_delta: f32::MAX,
            ..PhysicsConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PhysicsError::InvalidConfig(message)) if message.contains("not a duration")
        ));
        assert!(config.step_budget().is_err());
        assert_eq!(
            PhysicsConfig::default().step_budget(),
            Ok(Duration::from_secs_f32(1.0 / 60.0))
        );
    }

    #[test]
    fn test_validate_rejects_zero_iterations() {
        let config = PhysicsConfig {
            position_iterations: 0,
            ..PhysicsConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
